//! Verification core for FIDO2 security key credentials used as SSH keys:
//! COSE keys and signatures, WebAuthn authenticator data, and a self-contained
//! Ed25519.

pub mod assertion;
pub mod cbor;
pub mod codec;
pub mod cose;
pub mod crypto;
pub mod error;
pub mod verify;
pub mod webauthn;

#[cfg(test)]
mod testing;

pub use assertion::{AssertionVerifier, VerifierConfig};
pub use cose::{CoseKey, CoseSignature};
pub use error::{Error, Result};
pub use verify::{verify, Verifier};
pub use webauthn::AuthenticatorData;
