use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::error::Error;

/// COSE key type (`kty`, label 1).
/// [See more](https://www.iana.org/assignments/cose/cose.xhtml#key-type)
#[repr(i64)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
pub enum CoseKeyType {
    Okp = 1,
    Ec2 = 2,
}

/// COSE algorithm identifier (`alg`, label 3).
/// [See more](https://w3c.github.io/webauthn/#typedefdef-cosealgorithmidentifier)
#[repr(i64)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
pub enum CoseAlgorithm {
    /// ECDSA with SHA-256
    Es256 = -7,
    EdDsa = -8,
}

/// COSE elliptic curve (`crv`, label -1).
#[repr(i64)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
pub enum CoseCurve {
    P256 = 1,
    Ed25519 = 6,
}

impl CoseKeyType {
    pub fn from_label(value: i64) -> Result<Self, Error> {
        Self::try_from(value).map_err(|_| Error::UnsupportedKeyType(value))
    }
}

impl CoseAlgorithm {
    pub fn from_label(value: i64) -> Result<Self, Error> {
        Self::try_from(value).map_err(|_| Error::UnsupportedAlgorithm(value))
    }

    /// The key type and curve this algorithm is supported with.
    pub fn key_type_and_curve(self) -> (CoseKeyType, CoseCurve) {
        match self {
            CoseAlgorithm::Es256 => (CoseKeyType::Ec2, CoseCurve::P256),
            CoseAlgorithm::EdDsa => (CoseKeyType::Okp, CoseCurve::Ed25519),
        }
    }
}

impl CoseCurve {
    pub fn from_label(value: i64) -> Result<Self, Error> {
        Self::try_from(value).map_err(|_| Error::UnsupportedCurve(value))
    }

    /// Size in bytes of each public key coordinate on this curve.
    pub fn coordinate_size(self) -> usize {
        match self {
            CoseCurve::P256 => 32,
            CoseCurve::Ed25519 => 32,
        }
    }
}
