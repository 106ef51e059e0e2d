//! The small amount of CBOR handling the verification core needs: reading one
//! self-delimiting item off the front of a buffer, and canonical encoding.

mod canonical;

use std::io::Cursor;

use ciborium::value::Value;

pub use canonical::make_canonical;

use crate::error::{Error, Result};

/// Decodes the single CBOR item at the start of `bytes`, returning it along
/// with the number of bytes it occupied. Bytes after the item are left alone.
pub fn decode_prefix(bytes: &[u8]) -> Result<(Value, usize)> {
    let mut cursor = Cursor::new(bytes);
    let value: Value = ciborium::de::from_reader(&mut cursor)
        .map_err(|e| Error::malformed(format!("invalid CBOR item: {:?}", e)))?;
    let consumed = usize::try_from(cursor.position())
        .map_err(|_| Error::malformed("CBOR item length overflows usize"))?;
    Ok((value, consumed))
}

/// Encodes `value` as is, without reordering maps.
pub fn encode(value: &Value) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    ciborium::ser::into_writer(value, &mut out)
        .map_err(|e| Error::malformed(format!("failed to encode CBOR: {:?}", e)))?;
    Ok(out)
}

/// Encodes `value` in CTAP2 canonical form.
pub fn to_canonical_bytes(mut value: Value) -> Result<Vec<u8>> {
    make_canonical(&mut value)?;
    encode(&value)
}
