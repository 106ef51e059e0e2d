//! A software authenticator that enrolls credentials and signs assertions the
//! way a security key would, for end-to-end tests.

use ring::{
    rand::SystemRandom,
    signature::{EcdsaKeyPair, KeyPair, ECDSA_P256_SHA256_ASN1_SIGNING},
};

use crate::{
    cose::{CoseAlgorithm, CoseCurve, CoseKey},
    crypto::ed25519::{self, SecretKey},
    webauthn::{
        challenge_hash, signed_data, Aaguid, AttestedCredentialData, AuthenticatorData,
        AuthenticatorDataFlags, CredentialId,
    },
};

pub const CHALLENGE: &[u8] = b"This is a test.";

/// OpenSSH uses "ssh:" as the relying party of FIDO keys.
pub const RP_ID: &str = "ssh:";

pub const AAGUID: Aaguid = Aaguid([0x5E; 16]);

pub fn rp_id_hash() -> [u8; 32] {
    challenge_hash(RP_ID.as_bytes())
}

enum CredentialKeyPair {
    P256(EcdsaKeyPair),
    Ed25519(SecretKey),
}

pub struct Credential {
    key_pair: CredentialKeyPair,
    id: CredentialId,
}

impl Credential {
    pub fn p256() -> Self {
        let rng = SystemRandom::new();
        let doc = EcdsaKeyPair::generate_pkcs8(&ECDSA_P256_SHA256_ASN1_SIGNING, &rng).unwrap();
        let key = EcdsaKeyPair::from_pkcs8(&ECDSA_P256_SHA256_ASN1_SIGNING, doc.as_ref()).unwrap();
        Credential {
            key_pair: CredentialKeyPair::P256(key),
            id: CredentialId(vec![0x01; 16]),
        }
    }

    pub fn ed25519() -> Self {
        let (_, secret_key) = ed25519::generate_key().unwrap();
        Credential {
            key_pair: CredentialKeyPair::Ed25519(secret_key),
            id: CredentialId(vec![0x02; 16]),
        }
    }

    pub fn public_key(&self) -> CoseKey {
        match &self.key_pair {
            CredentialKeyPair::P256(key) => {
                // 0x04 || x || y
                let (x, y) = key.public_key().as_ref()[1..].split_at(32);
                CoseKey::ec2(CoseAlgorithm::Es256, CoseCurve::P256, x, y).unwrap()
            }
            CredentialKeyPair::Ed25519(secret_key) => CoseKey::okp(
                CoseAlgorithm::EdDsa,
                CoseCurve::Ed25519,
                &secret_key.public_key(),
            )
            .unwrap(),
        }
    }

    /// Signs `data`, returning the signature in its wire format.
    pub fn sign(&self, data: &[u8]) -> Vec<u8> {
        match &self.key_pair {
            CredentialKeyPair::P256(key) => {
                let rng = SystemRandom::new();
                key.sign(&rng, data).unwrap().as_ref().to_vec()
            }
            CredentialKeyPair::Ed25519(secret_key) => {
                ed25519::sign(secret_key.as_ref(), data).unwrap().to_vec()
            }
        }
    }

    /// The authenticator data produced at registration.
    pub fn attestation_auth_data(&self) -> Vec<u8> {
        AuthenticatorData {
            rp_id_hash: rp_id_hash(),
            flags: AuthenticatorDataFlags::new().with_user_present(true),
            sign_count: 0,
            attested_credential_data: Some(AttestedCredentialData {
                aaguid: AAGUID,
                credential_id: self.id.clone(),
                credential_public_key: self.public_key(),
            }),
            extensions: None,
        }
        .to_bytes()
        .unwrap()
    }

    /// Produces assertion authenticator data with the given flags byte and a
    /// signature over it and `challenge`.
    pub fn assertion(&self, challenge: &[u8], flags: u8) -> (Vec<u8>, Vec<u8>) {
        let auth_data = AuthenticatorData {
            rp_id_hash: rp_id_hash(),
            flags: AuthenticatorDataFlags::from_byte(flags),
            sign_count: 1,
            attested_credential_data: None,
            extensions: None,
        }
        .to_bytes()
        .unwrap();
        let signature = self.sign(&signed_data(&auth_data, challenge));
        (auth_data, signature)
    }
}
