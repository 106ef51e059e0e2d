//! Strict DER for the one structure ECDSA signatures use:
//! `SEQUENCE { INTEGER r, INTEGER s }`.

use crate::error::{Error, Result};

const SEQUENCE: u8 = 0x30;
const INTEGER: u8 = 0x02;

/// Long-form lengths above this many octets cannot occur in a signature.
const MAX_LENGTH_OCTETS: usize = 2;

/// Reads a definite, minimally encoded length. Returns the length and the
/// number of octets it took.
fn read_length(input: &[u8]) -> Result<(usize, usize)> {
    let first = *input
        .first()
        .ok_or_else(|| Error::malformed_signature("missing DER length"))?;
    if first < 0x80 {
        return Ok((first as usize, 1));
    }
    if first == 0x80 {
        return Err(Error::malformed_signature("indefinite DER length"));
    }
    let octets = (first & 0x7f) as usize;
    if octets > MAX_LENGTH_OCTETS {
        return Err(Error::malformed_signature(format!(
            "DER length of {} octets",
            octets
        )));
    }
    let encoded = input
        .get(1..1 + octets)
        .ok_or_else(|| Error::malformed_signature("truncated DER length"))?;
    if encoded[0] == 0 {
        return Err(Error::malformed_signature("non-minimal DER length"));
    }
    let length = encoded
        .iter()
        .fold(0usize, |acc, b| (acc << 8) | *b as usize);
    if length < 0x80 {
        return Err(Error::malformed_signature("non-minimal DER length"));
    }
    Ok((length, 1 + octets))
}

/// Reads one tag-length-value, returning its content and total size.
fn read_tlv<'a>(input: &'a [u8], tag: u8, what: &str) -> Result<(&'a [u8], usize)> {
    match input.first() {
        Some(t) if *t == tag => {}
        Some(t) => {
            return Err(Error::malformed_signature(format!(
                "expected {} tag {:#04x}, got {:#04x}",
                what, tag, t
            )))
        }
        None => return Err(Error::malformed_signature(format!("missing {}", what))),
    }
    let (length, length_octets) = read_length(&input[1..])?;
    let start = 1 + length_octets;
    let content = input
        .get(start..start + length)
        .ok_or_else(|| Error::malformed_signature(format!("truncated {}", what)))?;
    Ok((content, start + length))
}

/// Converts the content of a positive INTEGER to a big-endian unsigned value
/// left-padded to `N` bytes.
fn unsigned_integer<const N: usize>(content: &[u8], what: &str) -> Result<[u8; N]> {
    let magnitude = match content {
        [] => return Err(Error::malformed_signature(format!("empty {}", what))),
        [first, ..] if first & 0x80 != 0 => {
            return Err(Error::malformed_signature(format!("negative {}", what)))
        }
        [0, next, ..] if next & 0x80 == 0 => {
            return Err(Error::malformed_signature(format!(
                "non-minimal encoding of {}",
                what
            )))
        }
        [0, rest @ ..] if !rest.is_empty() => rest,
        _ => content,
    };
    if magnitude.len() > N {
        return Err(Error::malformed_signature(format!(
            "{} is {} bytes, at most {} allowed",
            what,
            magnitude.len(),
            N
        )));
    }
    let mut out = [0u8; N];
    out[N - magnitude.len()..].copy_from_slice(magnitude);
    Ok(out)
}

/// Parses a DER ECDSA signature that must span all of `bytes`. Returns `r` and
/// `s` padded to `N` bytes.
pub fn parse<const N: usize>(bytes: &[u8]) -> Result<([u8; N], [u8; N])> {
    let (sequence, consumed) = read_tlv(bytes, SEQUENCE, "SEQUENCE")?;
    if consumed != bytes.len() {
        return Err(Error::malformed_signature(format!(
            "{} trailing bytes after SEQUENCE",
            bytes.len() - consumed
        )));
    }
    let (r, r_len) = read_tlv(sequence, INTEGER, "INTEGER r")?;
    let (s, s_len) = read_tlv(&sequence[r_len..], INTEGER, "INTEGER s")?;
    if r_len + s_len != sequence.len() {
        return Err(Error::malformed_signature(
            "SEQUENCE length does not match its contents",
        ));
    }
    Ok((unsigned_integer(r, "r")?, unsigned_integer(s, "s")?))
}

fn push_length(out: &mut Vec<u8>, length: usize) {
    if length < 0x80 {
        out.push(length as u8);
    } else {
        let octets: Vec<u8> = length
            .to_be_bytes()
            .iter()
            .copied()
            .skip_while(|b| *b == 0)
            .collect();
        out.push(0x80 | octets.len() as u8);
        out.extend_from_slice(&octets);
    }
}

fn push_integer(out: &mut Vec<u8>, value: &[u8]) {
    let first_nonzero = value.iter().position(|b| *b != 0).unwrap_or(value.len());
    let trimmed = &value[first_nonzero..];
    let pad = trimmed.first().map_or(true, |b| b & 0x80 != 0);
    out.push(INTEGER);
    push_length(out, trimmed.len() + pad as usize);
    if pad {
        out.push(0);
    }
    out.extend_from_slice(trimmed);
}

/// Encodes `r` and `s` (unsigned big-endian) as a minimal DER signature.
pub fn encode(r: &[u8], s: &[u8]) -> Vec<u8> {
    let mut content = Vec::with_capacity(r.len() + s.len() + 6);
    push_integer(&mut content, r);
    push_integer(&mut content, s);

    let mut out = Vec::with_capacity(content.len() + 4);
    out.push(SEQUENCE);
    push_length(&mut out, content.len());
    out.extend_from_slice(&content);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    fn parse32(bytes: &[u8]) -> Result<([u8; 32], [u8; 32])> {
        parse::<32>(bytes)
    }

    fn assert_malformed(bytes: &[u8]) {
        match parse32(bytes) {
            Err(Error::MalformedSignature(_)) => {}
            other => panic!(
                "expected MalformedSignature for {}, got {:?}",
                hex::encode(bytes),
                other
            ),
        }
    }

    #[test]
    fn test_parse_full_width() {
        let r = hex!("8f1e2c3b6f3ad9b8e5d0e6e5e7f1a4c1b5e0d9e6e1b6c9d3c9b1a2d3e4f5a6b7");
        let s = hex!("1f1e2c3b6f3ad9b8e5d0e6e5e7f1a4c1b5e0d9e6e1b6c9d3c9b1a2d3e4f5a6b7");
        let der = encode(&r, &s);
        // r needs a sign byte, s does not
        assert_eq!(der[..4], hex!("30 45 02 21"));
        assert_eq!(der[4], 0x00);
        assert_eq!(parse32(&der).unwrap(), (r, s));
    }

    #[test]
    fn test_parse_short_integers_are_padded() {
        let der = hex!("30 08 02 02 00 80 02 02 01 00");
        let (r, s) = parse32(&der).unwrap();
        let mut expected_r = [0u8; 32];
        expected_r[31] = 0x80;
        let mut expected_s = [0u8; 32];
        expected_s[30] = 0x01;
        assert_eq!(r, expected_r);
        assert_eq!(s, expected_s);
        assert_eq!(encode(&expected_r, &expected_s), der.to_vec());
    }

    #[test]
    fn test_rejects_non_minimal_integer() {
        assert_malformed(&hex!("30 07 02 02 00 01 02 01 01"));
        assert_malformed(&hex!("30 07 02 01 01 02 02 00 7f"));
    }

    #[test]
    fn test_rejects_bad_integers() {
        // negative r
        assert_malformed(&hex!("30 06 02 01 80 02 01 01"));
        // empty r
        assert_malformed(&hex!("30 05 02 00 02 01 01"));
        // wrong tag for s
        assert_malformed(&hex!("30 06 02 01 01 04 01 01"));
        // 33 byte magnitude
        let mut der = vec![0x30, 0x26, 0x02, 0x21];
        der.extend_from_slice(&[0x01; 33]);
        der.extend_from_slice(&hex!("02 01 01"));
        assert_malformed(&der);
    }

    #[test]
    fn test_rejects_wrong_outer_length() {
        // too long
        assert_malformed(&hex!("30 07 02 01 01 02 01 01"));
        // too short: leaves s outside the SEQUENCE
        assert_malformed(&hex!("30 03 02 01 01 02 01 01"));
        // slack inside the SEQUENCE
        assert_malformed(&hex!("30 08 02 01 01 02 01 01 00 00"));
        // wrong outer tag
        assert_malformed(&hex!("31 06 02 01 01 02 01 01"));
        assert_malformed(&[]);
    }

    #[test]
    fn test_rejects_trailing_bytes() {
        assert!(parse32(&hex!("30 06 02 01 01 02 01 01")).is_ok());
        assert_malformed(&hex!("30 06 02 01 01 02 01 01 00"));
    }

    #[test]
    fn test_rejects_indefinite_and_non_minimal_length() {
        assert_malformed(&hex!("30 80 02 01 01 02 01 01 00 00"));
        assert_malformed(&hex!("30 81 06 02 01 01 02 01 01"));
        assert_malformed(&hex!("30 82 00 06 02 01 01 02 01 01"));
    }

    #[test]
    fn test_encode_zero() {
        assert_eq!(encode(&[0; 32], &[]), hex!("30 06 02 01 00 02 01 00").to_vec());
    }
}
