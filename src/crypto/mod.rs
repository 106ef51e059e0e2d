pub mod constant_time;
pub mod ed25519;
pub mod p256;
pub mod secret;

pub use constant_time::constant_time_equals;
pub use p256::{P256Verifier, RingP256Verifier};
