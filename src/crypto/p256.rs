use ring::signature::{UnparsedPublicKey, ECDSA_P256_SHA256_FIXED};
use tracing::trace;

/// Size in bytes of a P-256 coordinate or scalar.
pub const P256_COORDINATE_SIZE: usize = 32;

/// The ECDSA P-256 / SHA-256 verification capability supplied by the host.
///
/// Implementations hash `message` with SHA-256 and must reject malformed or
/// out-of-range inputs by returning `false`. `r` and `s` are big-endian and
/// left-padded to the coordinate size.
pub trait P256Verifier {
    fn verify_p256(
        &self,
        x: &[u8; P256_COORDINATE_SIZE],
        y: &[u8; P256_COORDINATE_SIZE],
        message: &[u8],
        r: &[u8; P256_COORDINATE_SIZE],
        s: &[u8; P256_COORDINATE_SIZE],
    ) -> bool;
}

impl<F> P256Verifier for F
where
    F: Fn(&[u8; 32], &[u8; 32], &[u8], &[u8; 32], &[u8; 32]) -> bool,
{
    fn verify_p256(
        &self,
        x: &[u8; 32],
        y: &[u8; 32],
        message: &[u8],
        r: &[u8; 32],
        s: &[u8; 32],
    ) -> bool {
        self(x, y, message, r, s)
    }
}

/// Default provider backed by ring's P-256 implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct RingP256Verifier;

impl P256Verifier for RingP256Verifier {
    fn verify_p256(
        &self,
        x: &[u8; 32],
        y: &[u8; 32],
        message: &[u8],
        r: &[u8; 32],
        s: &[u8; 32],
    ) -> bool {
        // ring wants the SEC1 uncompressed point: 0x04 || x || y
        let mut point = [0u8; 1 + 2 * P256_COORDINATE_SIZE];
        point[0] = 0x04;
        point[1..33].copy_from_slice(x);
        point[33..].copy_from_slice(y);

        let mut signature = [0u8; 2 * P256_COORDINATE_SIZE];
        signature[..32].copy_from_slice(r);
        signature[32..].copy_from_slice(s);

        let result = UnparsedPublicKey::new(&ECDSA_P256_SHA256_FIXED, &point[..])
            .verify(message, &signature);
        if result.is_err() {
            trace!("ring rejected the P-256 signature");
        }
        result.is_ok()
    }
}
