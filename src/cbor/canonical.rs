use std::cmp::Ordering;

use ciborium::value::Value;

use super::encode;
use crate::error::Result;

/// CTAP2 canonical key order: shorter encodings first, then bytewise
/// lexicographic. This puts unsigned integers before negative ones and
/// sorts text keys by length.
fn cmp_encoded(k1: &[u8], k2: &[u8]) -> Ordering {
    k1.len().cmp(&k2.len()).then_with(|| k1.cmp(k2))
}

/// Given a CBOR value, modifies it such that any map within it is ordered according to
/// the CTAP2 canonical CBOR encoding scheme.
pub fn make_canonical(value: &mut Value) -> Result<()> {
    match value {
        Value::Tag(_t, v) => make_canonical(v)?,
        Value::Array(vals) => {
            for v in vals {
                make_canonical(v)?;
            }
        }
        Value::Map(m) => {
            let mut entries = Vec::with_capacity(m.len());
            for (mut k, mut v) in m.drain(..) {
                make_canonical(&mut k)?;
                make_canonical(&mut v)?;
                entries.push((encode(&k)?, k, v));
            }
            entries.sort_by(|(k1, ..), (k2, ..)| cmp_encoded(k1, k2));
            m.extend(entries.into_iter().map(|(_, k, v)| (k, v)));
        }
        _ => {}
    }
    Ok(())
}
