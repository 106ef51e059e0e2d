use std::collections::BTreeMap;

use ciborium::value::Value;
use coset::{
    iana::{self, EnumI64},
    Algorithm, AsCborValue, CoseKeyBuilder, KeyType, Label,
};
use tracing::{debug, instrument};

use super::algorithm::{CoseAlgorithm, CoseCurve, CoseKeyType};
use crate::{
    cbor,
    error::{Error, Result},
};

const KTY: i64 = 1;
const ALG: i64 = 3;
const CRV: i64 = -1;
const X: i64 = -2;
const Y: i64 = -3;

/// Size of every coordinate this crate supports (P-256 and Ed25519).
pub const COORDINATE_SIZE: usize = 32;

/// A COSE public key, restricted to the ES256/P-256 and EdDSA/Ed25519 pairs.
/// [See more](https://www.w3.org/TR/webauthn/#sctn-attested-credential-data)
/// [RFC 8152](https://datatracker.ietf.org/doc/html/rfc8152#section-7)
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CoseKey {
    Ec2 {
        algorithm: CoseAlgorithm,
        curve: CoseCurve,
        x: [u8; COORDINATE_SIZE],
        y: [u8; COORDINATE_SIZE],
    },
    Okp {
        algorithm: CoseAlgorithm,
        curve: CoseCurve,
        x: [u8; COORDINATE_SIZE],
    },
}

fn check_combination(kty: CoseKeyType, algorithm: CoseAlgorithm, curve: CoseCurve) -> Result<()> {
    let (expected_kty, expected_curve) = algorithm.key_type_and_curve();
    if expected_kty != kty {
        return Err(Error::UnsupportedAlgorithm(algorithm.into()));
    }
    if expected_curve != curve {
        return Err(Error::UnsupportedCurve(curve.into()));
    }
    Ok(())
}

fn coordinate(curve: CoseCurve, name: &str, bytes: &[u8]) -> Result<[u8; COORDINATE_SIZE]> {
    if bytes.len() != curve.coordinate_size() {
        return Err(Error::malformed(format!(
            "COSE key coordinate {} is {} bytes, expected {}",
            name,
            bytes.len(),
            curve.coordinate_size()
        )));
    }
    let mut out = [0u8; COORDINATE_SIZE];
    out.copy_from_slice(bytes);
    Ok(out)
}

impl CoseKey {
    /// An EC2 key. Fails unless `algorithm` and `curve` are a supported EC2 pair
    /// and both coordinates have the curve's width.
    pub fn ec2(algorithm: CoseAlgorithm, curve: CoseCurve, x: &[u8], y: &[u8]) -> Result<Self> {
        check_combination(CoseKeyType::Ec2, algorithm, curve)?;
        Ok(CoseKey::Ec2 {
            algorithm,
            curve,
            x: coordinate(curve, "x", x)?,
            y: coordinate(curve, "y", y)?,
        })
    }

    /// An OKP key, under the same rules as [`CoseKey::ec2`].
    pub fn okp(algorithm: CoseAlgorithm, curve: CoseCurve, x: &[u8]) -> Result<Self> {
        check_combination(CoseKeyType::Okp, algorithm, curve)?;
        Ok(CoseKey::Okp {
            algorithm,
            curve,
            x: coordinate(curve, "x", x)?,
        })
    }

    pub fn key_type(&self) -> CoseKeyType {
        match self {
            CoseKey::Ec2 { .. } => CoseKeyType::Ec2,
            CoseKey::Okp { .. } => CoseKeyType::Okp,
        }
    }

    pub fn algorithm(&self) -> CoseAlgorithm {
        match self {
            CoseKey::Ec2 { algorithm, .. } | CoseKey::Okp { algorithm, .. } => *algorithm,
        }
    }

    pub fn curve(&self) -> CoseCurve {
        match self {
            CoseKey::Ec2 { curve, .. } | CoseKey::Okp { curve, .. } => *curve,
        }
    }

    /// Decodes the COSE_Key map at the start of `bytes`, returning the key and
    /// the number of bytes the map occupied.
    #[instrument(level = "debug", skip_all, fields(len = bytes.len()))]
    pub fn decode(bytes: &[u8]) -> Result<(Self, usize)> {
        let (value, consumed) = cbor::decode_prefix(bytes)?;
        let params = int_keyed_map(value)?;

        let kty = CoseKeyType::from_label(int_param(&params, KTY, "kty")?)?;
        let algorithm = CoseAlgorithm::from_label(int_param(&params, ALG, "alg")?)?;
        let curve = CoseCurve::from_label(int_param(&params, CRV, "crv")?)?;
        let x = bytes_param(&params, X, "x")?;

        let key = match kty {
            CoseKeyType::Ec2 => CoseKey::ec2(algorithm, curve, x, bytes_param(&params, Y, "y")?)?,
            CoseKeyType::Okp => CoseKey::okp(algorithm, curve, x)?,
        };
        debug!(?kty, ?algorithm, consumed, "Decoded COSE key");
        Ok((key, consumed))
    }

    /// Builds the coset representation of this key.
    pub fn to_coset(&self) -> coset::CoseKey {
        match self {
            CoseKey::Ec2 { x, y, .. } => {
                CoseKeyBuilder::new_ec2_pub_key(iana::EllipticCurve::P_256, x.to_vec(), y.to_vec())
                    .algorithm(iana::Algorithm::ES256)
                    .build()
            }
            CoseKey::Okp { x, .. } => coset::CoseKey {
                kty: KeyType::Assigned(iana::KeyType::OKP),
                alg: Some(Algorithm::Assigned(iana::Algorithm::EdDSA)),
                params: vec![
                    (
                        Label::Int(iana::OkpKeyParameter::Crv.to_i64()),
                        Value::from(iana::EllipticCurve::Ed25519.to_i64()),
                    ),
                    (
                        Label::Int(iana::OkpKeyParameter::X.to_i64()),
                        Value::Bytes(x.to_vec()),
                    ),
                ],
                ..Default::default()
            },
        }
    }

    /// Encodes this key as a CTAP2 canonical COSE_Key map.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let value = self
            .to_coset()
            .to_cbor_value()
            .map_err(|e| Error::malformed(format!("failed to encode COSE key: {:?}", e)))?;
        cbor::to_canonical_bytes(value)
    }
}

/// Collects the integer-labelled entries of a COSE_Key map. Text labels are
/// not used by any supported key type and are skipped.
fn int_keyed_map(value: Value) -> Result<BTreeMap<i64, Value>> {
    let entries = match value {
        Value::Map(entries) => entries,
        other => {
            return Err(Error::malformed(format!(
                "COSE key must be a map, got {:?}",
                other
            )))
        }
    };
    let mut params = BTreeMap::new();
    for (label, value) in entries {
        let label = match label {
            Value::Integer(i) => i64::try_from(i)
                .map_err(|_| Error::malformed("COSE key label out of range"))?,
            Value::Text(_) => continue,
            other => {
                return Err(Error::malformed(format!(
                    "invalid COSE key label {:?}",
                    other
                )))
            }
        };
        if params.insert(label, value).is_some() {
            return Err(Error::malformed(format!(
                "duplicate COSE key label {}",
                label
            )));
        }
    }
    Ok(params)
}

fn int_param(params: &BTreeMap<i64, Value>, label: i64, name: &str) -> Result<i64> {
    match params.get(&label) {
        Some(Value::Integer(i)) => {
            i64::try_from(*i).map_err(|_| Error::malformed(format!("COSE {} out of range", name)))
        }
        Some(_) => Err(Error::malformed(format!("COSE {} must be an integer", name))),
        None => Err(Error::malformed(format!("COSE key is missing {}", name))),
    }
}

fn bytes_param<'a>(params: &'a BTreeMap<i64, Value>, label: i64, name: &str) -> Result<&'a [u8]> {
    match params.get(&label) {
        Some(Value::Bytes(b)) => Ok(b.as_slice()),
        Some(_) => Err(Error::malformed(format!("COSE {} must be a byte string", name))),
        None => Err(Error::malformed(format!("COSE key is missing {}", name))),
    }
}
