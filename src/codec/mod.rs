//! Wire formats of signatures: DER for ECDSA, raw `r || s` for EdDSA.

pub mod der;

use tracing::{instrument, trace};

use crate::{
    cose::{CoseKey, CoseSignature, COORDINATE_SIZE},
    error::{Error, Result},
};

/// Length of an EdDSA signature on the wire.
pub const EDDSA_SIGNATURE_SIZE: usize = 2 * COORDINATE_SIZE;

/// Parses `bytes` as a signature made by `key`, returning it and the number of
/// bytes used. Which wire format is expected depends only on the key.
#[instrument(level = "debug", skip_all, fields(algorithm = ?key.algorithm(), len = bytes.len()))]
pub fn parse(key: &CoseKey, bytes: &[u8]) -> Result<(CoseSignature, usize)> {
    let signature = match key {
        CoseKey::Ec2 {
            algorithm, curve, ..
        } => {
            let (r, s) = der::parse::<COORDINATE_SIZE>(bytes)?;
            CoseSignature::Ecdsa {
                algorithm: *algorithm,
                curve: *curve,
                r,
                s,
            }
        }
        CoseKey::Okp {
            algorithm, curve, ..
        } => {
            if bytes.len() != EDDSA_SIGNATURE_SIZE {
                return Err(Error::malformed_signature(format!(
                    "EdDSA signature is {} bytes, expected {}",
                    bytes.len(),
                    EDDSA_SIGNATURE_SIZE
                )));
            }
            let mut rs = [0u8; EDDSA_SIGNATURE_SIZE];
            rs.copy_from_slice(bytes);
            CoseSignature::EdDsa {
                algorithm: *algorithm,
                curve: *curve,
                rs,
            }
        }
    };
    trace!("Parsed signature");
    Ok((signature, bytes.len()))
}

/// Produces the wire encoding [`parse`] accepts.
pub fn encode(signature: &CoseSignature) -> Vec<u8> {
    match signature {
        CoseSignature::Ecdsa { r, s, .. } => der::encode(r, s),
        CoseSignature::EdDsa { rs, .. } => rs.to_vec(),
    }
}
