//! Arithmetic modulo the group order L = 2^252 + 27742317777372353535851937790883648493.

use zeroize::Zeroizing;

/// L, little-endian.
pub const L: [i64; 32] = [
    0xed, 0xd3, 0xf5, 0x5c, 0x1a, 0x63, 0x12, 0x58, 0xd6, 0x9c, 0xf7, 0xa2, 0xde, 0xf9, 0xde, 0x14,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0x10,
];

/// Reduces the 64 limbs of `x` (each a signed multiple-of-a-byte partial sum)
/// modulo L and writes the canonical 32-byte result to `r`. `x` is consumed
/// as working space.
pub fn mod_l(r: &mut [u8], x: &mut [i64; 64]) {
    for i in (32..64).rev() {
        let mut carry = 0i64;
        for j in (i - 32)..(i - 12) {
            x[j] += carry - 16 * x[i] * L[j - (i - 32)];
            carry = (x[j] + 128) >> 8;
            x[j] -= carry << 8;
        }
        x[i - 12] += carry;
        x[i] = 0;
    }
    let mut carry = 0i64;
    for j in 0..32 {
        x[j] += carry - (x[31] >> 4) * L[j];
        carry = x[j] >> 8;
        x[j] &= 255;
    }
    for j in 0..32 {
        x[j] -= carry * L[j];
    }
    for i in 0..32 {
        x[i + 1] += x[i] >> 8;
        r[i] = (x[i] & 255) as u8;
    }
}

/// Reduces a 64-byte hash output modulo L.
pub fn reduce(h: &[u8; 64]) -> [u8; 32] {
    let mut x: Zeroizing<[i64; 64]> = Zeroizing::new([0; 64]);
    for i in 0..64 {
        x[i] = h[i] as i64;
    }
    let mut r = [0u8; 32];
    mod_l(&mut r, &mut x);
    r
}

/// Computes (a + b * c) mod L into `out`.
pub fn mul_add(out: &mut [u8], a: &[u8; 32], b: &[u8; 32], c: &[u8; 32]) {
    let mut x: Zeroizing<[i64; 64]> = Zeroizing::new([0; 64]);
    for i in 0..32 {
        x[i] = a[i] as i64;
    }
    for i in 0..32 {
        for j in 0..32 {
            x[i + j] += b[i] as i64 * c[j] as i64;
        }
    }
    mod_l(out, &mut x);
}

/// Whether `s` encodes an integer strictly below L.
pub fn is_canonical(s: &[u8; 32]) -> bool {
    for i in (0..32).rev() {
        let limb = s[i] as i64;
        if limb < L[i] {
            return true;
        }
        if limb > L[i] {
            return false;
        }
    }
    false
}
