use ring::digest::{digest, SHA256, SHA256_OUTPUT_LEN};

/// Hashes a challenge the way the client does before handing it to the
/// authenticator.
pub fn challenge_hash(challenge: &[u8]) -> [u8; SHA256_OUTPUT_LEN] {
    let mut out = [0u8; SHA256_OUTPUT_LEN];
    out.copy_from_slice(digest(&SHA256, challenge).as_ref());
    out
}

/// The exact bytes an authenticator signs: `authenticator_data || SHA-256(challenge)`.
pub fn signed_data(authenticator_data: &[u8], challenge: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(authenticator_data.len() + SHA256_OUTPUT_LEN);
    out.extend_from_slice(authenticator_data);
    out.extend_from_slice(&challenge_hash(challenge));
    out
}
