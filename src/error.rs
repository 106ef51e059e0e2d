use thiserror::Error;

/// Errors raised by the verification core.
///
/// A signature that simply fails to verify is not an error: verification
/// entry points return `Ok(false)` for that case.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Malformed data: {0}")]
    MalformedData(String),

    #[error("Malformed signature: {0}")]
    MalformedSignature(String),

    #[error("COSE key type {0} is unsupported")]
    UnsupportedKeyType(i64),

    #[error("COSE algorithm {0} is unsupported")]
    UnsupportedAlgorithm(i64),

    #[error("COSE curve {0} is unsupported")]
    UnsupportedCurve(i64),

    #[error("Expected a key of {expected} bytes, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("Key and signature are of incompatible types")]
    KeySignatureMismatch,

    #[error("Input of {actual} bytes exceeds the limit of {limit} bytes")]
    InputTooLarge { limit: usize, actual: usize },

    #[error("Secure randomness is unavailable")]
    RandomnessUnavailable,
}

impl Error {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Error::MalformedData(reason.into())
    }

    pub(crate) fn malformed_signature(reason: impl Into<String>) -> Self {
        Error::MalformedSignature(reason.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
