//! The COSE subset used by FIDO2 credentials: ES256 on P-256 and EdDSA on
//! Ed25519.

pub mod algorithm;
pub mod key;
pub mod signature;

pub use algorithm::{CoseAlgorithm, CoseCurve, CoseKeyType};
pub use key::{CoseKey, COORDINATE_SIZE};
pub use signature::CoseSignature;
