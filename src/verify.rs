use tracing::{debug, instrument, warn};

use crate::{
    cose::{CoseKey, CoseSignature},
    crypto::{ed25519, P256Verifier, RingP256Verifier},
    error::{Error, Result},
};

/// Routes a key, signature and signed data to the primitive for their
/// algorithm: the crate's own Ed25519, or the host's P-256 capability.
#[derive(Debug, Clone, Default)]
pub struct Verifier<P = RingP256Verifier> {
    p256: P,
}

impl<P: P256Verifier> Verifier<P> {
    pub fn new(p256: P) -> Self {
        Verifier { p256 }
    }

    /// Returns `Ok(false)` for a signature that does not verify. Errors are only
    /// for a key and signature that cannot belong together.
    #[instrument(level = "debug", skip_all, fields(algorithm = ?key.algorithm(), len = signed_data.len()))]
    pub fn verify(
        &self,
        key: &CoseKey,
        signature: &CoseSignature,
        signed_data: &[u8],
    ) -> Result<bool> {
        if key.algorithm() != signature.algorithm() || key.curve() != signature.curve() {
            warn!(
                key_algorithm = ?key.algorithm(),
                signature_algorithm = ?signature.algorithm(),
                "Key and signature algorithms differ"
            );
            return Err(Error::KeySignatureMismatch);
        }
        let valid = match (key, signature) {
            (CoseKey::Ec2 { x, y, .. }, CoseSignature::Ecdsa { r, s, .. }) => {
                self.p256.verify_p256(x, y, signed_data, r, s)
            }
            (CoseKey::Okp { x, .. }, CoseSignature::EdDsa { rs, .. }) => {
                ed25519::verify(x, signed_data, rs)?
            }
            _ => {
                warn!("Key and signature are of different types");
                return Err(Error::KeySignatureMismatch);
            }
        };
        debug!(valid, "Verified signature");
        Ok(valid)
    }
}

/// Verifies with the default P-256 provider.
pub fn verify(key: &CoseKey, signature: &CoseSignature, signed_data: &[u8]) -> Result<bool> {
    Verifier::<RingP256Verifier>::default().verify(key, signature, signed_data)
}
