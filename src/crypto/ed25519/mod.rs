//! Ed25519 (RFC 8032) key generation, signing and verification.
//!
//! Secret keys use the 64-byte `seed || public key` layout. Signing writes the
//! classic "signed message" encoding `R || S || message` into a scratch buffer
//! and takes the leading 64 bytes as the signature; verification builds the same
//! layout from the detached signature before opening it. Every buffer holding
//! secret or secret-derived bytes is zeroed before the call returns, on success,
//! on failure and while unwinding.

mod field;
mod point;
mod scalar;

use ring::{
    digest,
    rand::{SecureRandom, SystemRandom},
};
use tracing::{error, instrument, trace};
use zeroize::{Zeroize, Zeroizing};

use super::constant_time::constant_time_equals;
use super::secret::{Scratch, StackGuard};
use crate::error::{Error, Result};

pub const PUBLIC_KEY_LENGTH: usize = 32;
pub const SECRET_KEY_LENGTH: usize = 64;
pub const SEED_LENGTH: usize = 32;
pub const SIGNATURE_LENGTH: usize = 64;

/// An Ed25519 secret key, `seed || public key`. Wiped on drop.
pub struct SecretKey([u8; SECRET_KEY_LENGTH]);

impl SecretKey {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != SECRET_KEY_LENGTH {
            return Err(Error::InvalidKeyLength {
                expected: SECRET_KEY_LENGTH,
                actual: bytes.len(),
            });
        }
        let mut key = SecretKey([0u8; SECRET_KEY_LENGTH]);
        key.0.copy_from_slice(bytes);
        Ok(key)
    }

    pub fn as_bytes(&self) -> &[u8; SECRET_KEY_LENGTH] {
        &self.0
    }

    pub fn public_key(&self) -> [u8; PUBLIC_KEY_LENGTH] {
        let mut public = [0u8; PUBLIC_KEY_LENGTH];
        public.copy_from_slice(&self.0[SEED_LENGTH..]);
        public
    }
}

impl AsRef<[u8]> for SecretKey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Drop for SecretKey {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl std::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("SecretKey").field(&"<redacted>").finish()
    }
}

/// Generates a keypair from a seed drawn from the system CSPRNG.
pub fn generate_key() -> Result<([u8; PUBLIC_KEY_LENGTH], SecretKey)> {
    let rng = SystemRandom::new();
    let mut seed = Zeroizing::new([0u8; SEED_LENGTH]);
    rng.fill(&mut seed[..]).map_err(|_| {
        error!("System randomness source failed");
        Error::RandomnessUnavailable
    })?;
    Ok(keypair_from_seed(&seed))
}

/// Derives the keypair belonging to a 32-byte seed.
pub fn keypair_from_seed(seed: &[u8; SEED_LENGTH]) -> ([u8; PUBLIC_KEY_LENGTH], SecretKey) {
    let _guard = StackGuard;
    let a = secret_scalar(&expand_seed(seed));
    let public = point::pack(&point::scalar_base(&a));

    let mut secret = SecretKey([0u8; SECRET_KEY_LENGTH]);
    secret.0[..SEED_LENGTH].copy_from_slice(seed);
    secret.0[SEED_LENGTH..].copy_from_slice(&public);
    (public, secret)
}

/// Deterministically signs `message` with a 64-byte secret key.
#[instrument(level = "trace", skip_all, fields(message_len = message.len()))]
pub fn sign(secret_key: &[u8], message: &[u8]) -> Result<[u8; SIGNATURE_LENGTH]> {
    if secret_key.len() != SECRET_KEY_LENGTH {
        return Err(Error::InvalidKeyLength {
            expected: SECRET_KEY_LENGTH,
            actual: secret_key.len(),
        });
    }
    let mut sm = Scratch::zeroed(SIGNATURE_LENGTH + message.len());

    let d = expand_seed(&secret_key[..SEED_LENGTH]);
    let a = secret_scalar(&d);

    // r = H(prefix || M)
    sm[SIGNATURE_LENGTH..].copy_from_slice(message);
    sm[32..64].copy_from_slice(&d[32..]);
    let r = Zeroizing::new(scalar::reduce(&sha512(&sm[32..])));

    // k = H(R || A || M)
    sm[..32].copy_from_slice(&point::pack(&point::scalar_base(&r)));
    sm[32..64].copy_from_slice(&secret_key[SEED_LENGTH..]);
    let k = scalar::reduce(&sha512(&sm));

    // S = r + k * a
    scalar::mul_add(&mut sm[32..64], &r, &k, &a);

    let mut signature = [0u8; SIGNATURE_LENGTH];
    signature.copy_from_slice(&sm[..SIGNATURE_LENGTH]);
    Ok(signature)
}

/// Verifies a detached signature.
///
/// A public key of the wrong size is a caller error; a signature of the wrong
/// size, an undecodable key point or a failed check all return `Ok(false)`.
#[instrument(level = "trace", skip_all, fields(message_len = message.len()))]
pub fn verify(public_key: &[u8], message: &[u8], signature: &[u8]) -> Result<bool> {
    let public_key: &[u8; PUBLIC_KEY_LENGTH] =
        public_key.try_into().map_err(|_| Error::InvalidKeyLength {
            expected: PUBLIC_KEY_LENGTH,
            actual: public_key.len(),
        })?;
    if signature.len() != SIGNATURE_LENGTH {
        trace!(len = signature.len(), "Signature has the wrong length");
        return Ok(false);
    }

    let mut sm = Scratch::zeroed(SIGNATURE_LENGTH + message.len());
    sm[..SIGNATURE_LENGTH].copy_from_slice(signature);
    sm[SIGNATURE_LENGTH..].copy_from_slice(message);
    Ok(open(&sm, public_key))
}

/// Checks the `R || S || message` layout in `sm` against `public_key`.
fn open(sm: &[u8], public_key: &[u8; PUBLIC_KEY_LENGTH]) -> bool {
    let mut r = [0u8; 32];
    r.copy_from_slice(&sm[..32]);
    let mut s = [0u8; 32];
    s.copy_from_slice(&sm[32..64]);

    if !scalar::is_canonical(&s) {
        trace!("Rejecting signature with non-canonical S");
        return false;
    }
    let Some(mut q) = point::unpack_negated(public_key) else {
        trace!("Public key is not a curve point");
        return false;
    };

    let mut ctx = digest::Context::new(&digest::SHA512);
    ctx.update(&r);
    ctx.update(public_key);
    ctx.update(&sm[SIGNATURE_LENGTH..]);
    let mut h = [0u8; 64];
    h.copy_from_slice(ctx.finish().as_ref());
    let k = scalar::reduce(&h);

    // [S]B - [k]A must equal R
    let mut p = point::scalar_mult(&mut q, &k);
    point::add(&mut p, &point::scalar_base(&s));
    constant_time_equals(&r, &point::pack(&p))
}

fn sha512(data: &[u8]) -> Zeroizing<[u8; 64]> {
    let hash = digest::digest(&digest::SHA512, data);
    let mut out = Zeroizing::new([0u8; 64]);
    out.copy_from_slice(hash.as_ref());
    out
}

/// SHA-512 of the seed with the scalar half clamped.
fn expand_seed(seed: &[u8]) -> Zeroizing<[u8; 64]> {
    let mut d = sha512(seed);
    d[0] &= 248;
    d[31] &= 127;
    d[31] |= 64;
    d
}

fn secret_scalar(d: &[u8; 64]) -> Zeroizing<[u8; 32]> {
    let mut a = Zeroizing::new([0u8; 32]);
    a.copy_from_slice(&d[..32]);
    a
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;
    use ring::signature::{Ed25519KeyPair, KeyPair, UnparsedPublicKey, ED25519};

    const RFC8032_SEED_1: [u8; 32] =
        hex!("9d61b19deffd5a60ba844af492ec2cc44449c5697b326919703bac031cae7f60");
    const RFC8032_PUBLIC_1: [u8; 32] =
        hex!("d75a980182b10ab7d54bfed3c964073a0ee172f3daa62325af021a68f707511a");
    const RFC8032_SIGNATURE_1: [u8; 64] = hex!(
        "e5564300c360ac729086e2cc806e828a84877f1eb8e5d974d873e065224901555fb8821590a33bacc61e39701cf9b46bd25bf5f0595bbe24655141438e7a100b"
    );

    const RFC8032_SEED_2: [u8; 32] =
        hex!("4ccd089b28ff96da9db6c346ec114e0f5b8a319f35aba624da8cf6ed4fb8a6fb");
    const RFC8032_PUBLIC_2: [u8; 32] =
        hex!("3d4017c3e843895a92b70aa74d1b7ebc9c982ccf2ec4968cc0cd55f12af4660c");
    const RFC8032_SIGNATURE_2: [u8; 64] = hex!(
        "92a009a9f0d4cab8720e820b5f642540a2b27b5416503f8fb3762223ebdb69da085ac1e43e15996e458f3613d0f11d8c387b2eaeb4302aeeb00d291612bb0c00"
    );

    #[test]
    fn test_rfc8032_vector_1() {
        let (public, secret) = keypair_from_seed(&RFC8032_SEED_1);
        assert_eq!(public, RFC8032_PUBLIC_1);
        assert_eq!(secret.public_key(), RFC8032_PUBLIC_1);

        let signature = sign(secret.as_ref(), b"").unwrap();
        assert_eq!(signature, RFC8032_SIGNATURE_1);
        assert!(verify(&public, b"", &signature).unwrap());
    }

    #[test]
    fn test_rfc8032_vector_2() {
        let (public, secret) = keypair_from_seed(&RFC8032_SEED_2);
        assert_eq!(public, RFC8032_PUBLIC_2);

        let signature = sign(secret.as_ref(), &[0x72]).unwrap();
        assert_eq!(signature, RFC8032_SIGNATURE_2);
        assert!(verify(&public, &[0x72], &signature).unwrap());
        assert!(!verify(&public, &[0x73], &signature).unwrap());
    }

    #[test]
    fn test_round_trip_generated_keys() {
        let (public, secret) = generate_key().unwrap();
        let long_message: Vec<u8> = (0..5000u32).map(|i| (i * 31 % 251) as u8).collect();
        for message in [&b""[..], &b"x"[..], &long_message[..]] {
            let signature = sign(secret.as_ref(), message).unwrap();
            assert!(verify(&public, message, &signature).unwrap());
        }
    }

    #[test]
    fn test_generated_keys_differ() {
        let (public_1, _) = generate_key().unwrap();
        let (public_2, _) = generate_key().unwrap();
        assert_ne!(public_1, public_2);
    }

    #[test]
    fn test_flipped_bits_fail() {
        let (public, secret) = keypair_from_seed(&RFC8032_SEED_1);
        let message = b"ssh-ed25519-sk challenge";
        let signature = sign(secret.as_ref(), message).unwrap();

        for byte in 0..SIGNATURE_LENGTH {
            let mut tampered = signature;
            tampered[byte] ^= 1 << (byte % 8);
            assert!(
                !verify(&public, message, &tampered).unwrap(),
                "Flipped bit in signature byte {} verified",
                byte
            );
        }

        let mut tampered_message = message.to_vec();
        tampered_message[3] ^= 0x10;
        assert!(!verify(&public, &tampered_message, &signature).unwrap());

        let mut tampered_key = public;
        tampered_key[0] ^= 0x01;
        assert!(!verify(&tampered_key, message, &signature).unwrap());
    }

    #[test]
    fn test_non_canonical_s_is_rejected() {
        let (public, secret) = keypair_from_seed(&RFC8032_SEED_2);
        let signature = sign(secret.as_ref(), b"malleable").unwrap();

        // S + L is congruent to S but is not the canonical encoding.
        let mut malleated = signature;
        let mut carry = 0u16;
        for i in 0..32 {
            let sum = malleated[32 + i] as u16 + scalar::L[i] as u16 + carry;
            malleated[32 + i] = sum as u8;
            carry = sum >> 8;
        }
        assert_eq!(carry, 0);
        assert!(verify(&public, b"malleable", &signature).unwrap());
        assert!(!verify(&public, b"malleable", &malleated).unwrap());
    }

    #[test]
    fn test_length_contracts() {
        let (public, secret) = keypair_from_seed(&RFC8032_SEED_1);
        let signature = sign(secret.as_ref(), b"m").unwrap();

        assert_eq!(
            verify(&public[..31], b"m", &signature),
            Err(Error::InvalidKeyLength {
                expected: 32,
                actual: 31
            })
        );
        assert_eq!(verify(&public, b"m", &signature[..63]), Ok(false));
        assert_eq!(verify(&public, b"m", &[]), Ok(false));
        assert_eq!(
            sign(&secret.as_ref()[..32], b"m"),
            Err(Error::InvalidKeyLength {
                expected: 64,
                actual: 32
            })
        );
        assert!(SecretKey::from_bytes(&[0u8; 63]).is_err());
    }

    #[test]
    fn test_off_curve_public_key() {
        let (_, secret) = keypair_from_seed(&RFC8032_SEED_1);
        let signature = sign(secret.as_ref(), b"m").unwrap();
        let mut off_curve = [0u8; 32];
        off_curve[0] = 2;
        assert_eq!(verify(&off_curve, b"m", &signature), Ok(false));
    }

    #[test]
    fn test_matches_ring() {
        for seed_byte in [0x00u8, 0x42, 0xFF] {
            let seed = [seed_byte; 32];
            let (public, secret) = keypair_from_seed(&seed);
            let ring_key = Ed25519KeyPair::from_seed_unchecked(&seed).unwrap();
            assert_eq!(&public[..], ring_key.public_key().as_ref());

            let message = [seed_byte; 200];
            let signature = sign(secret.as_ref(), &message).unwrap();
            assert_eq!(&signature[..], ring_key.sign(&message).as_ref());
            assert!(UnparsedPublicKey::new(&ED25519, &public)
                .verify(&message, &signature)
                .is_ok());
        }
    }

    #[test]
    fn test_secret_key_round_trip_and_debug() {
        let (public, secret) = keypair_from_seed(&RFC8032_SEED_1);
        let restored = SecretKey::from_bytes(secret.as_ref()).unwrap();
        assert_eq!(restored.public_key(), public);
        assert_eq!(&restored.as_bytes()[..32], &RFC8032_SEED_1);
        assert!(!format!("{:?}", restored).contains("9d"));
    }

    #[test]
    fn test_scratch_is_wiped_on_every_exit() {
        use crate::crypto::secret::take_dropped;

        let (public, secret) = keypair_from_seed(&RFC8032_SEED_1);
        take_dropped();

        let signature = sign(secret.as_ref(), b"0123456789").unwrap();
        assert_eq!(take_dropped(), vec![(74, true)]);

        assert!(verify(&public, b"0123456789", &signature).unwrap());
        assert_eq!(take_dropped(), vec![(74, true)]);

        // failed check and early rejection of a non-canonical S
        assert!(!verify(&public, b"0123456788", &signature).unwrap());
        let mut malleated = signature;
        malleated[63] |= 0xF0;
        assert!(!verify(&public, b"0123456789", &malleated).unwrap());
        assert_eq!(take_dropped(), vec![(74, true), (74, true)]);
    }
}
