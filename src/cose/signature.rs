use super::algorithm::{CoseAlgorithm, CoseCurve};
use super::key::COORDINATE_SIZE;

/// A signature in the shape the verifier consumes, produced by
/// [`crate::codec::parse`] for a specific key.
#[derive(Clone, PartialEq, Eq)]
pub enum CoseSignature {
    /// `r` and `s` are unsigned big-endian, left-padded to the coordinate size.
    Ecdsa {
        algorithm: CoseAlgorithm,
        curve: CoseCurve,
        r: [u8; COORDINATE_SIZE],
        s: [u8; COORDINATE_SIZE],
    },
    EdDsa {
        algorithm: CoseAlgorithm,
        curve: CoseCurve,
        rs: [u8; 2 * COORDINATE_SIZE],
    },
}

impl CoseSignature {
    pub fn algorithm(&self) -> CoseAlgorithm {
        match self {
            CoseSignature::Ecdsa { algorithm, .. } | CoseSignature::EdDsa { algorithm, .. } => {
                *algorithm
            }
        }
    }

    pub fn curve(&self) -> CoseCurve {
        match self {
            CoseSignature::Ecdsa { curve, .. } | CoseSignature::EdDsa { curve, .. } => *curve,
        }
    }
}

impl std::fmt::Debug for CoseSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CoseSignature::Ecdsa {
                algorithm,
                curve,
                r,
                s,
            } => f
                .debug_struct("Ecdsa")
                .field("algorithm", algorithm)
                .field("curve", curve)
                .field("r", &hex::encode(r))
                .field("s", &hex::encode(s))
                .finish(),
            CoseSignature::EdDsa {
                algorithm,
                curve,
                rs,
            } => f
                .debug_struct("EdDsa")
                .field("algorithm", algorithm)
                .field("curve", curve)
                .field("rs", &hex::encode(rs))
                .finish(),
        }
    }
}
