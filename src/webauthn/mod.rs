//! WebAuthn structures an authenticator produces and signs.

pub mod authenticator_data;
pub mod signed_data;

pub use authenticator_data::{
    Aaguid, AttestedCredentialData, AuthenticatorData, AuthenticatorDataFlags, CredentialId,
};
pub use signed_data::{challenge_hash, signed_data};
