//! Arithmetic in GF(2^255 - 19).
//!
//! An element is sixteen signed 64-bit limbs of 16 bits each, little-endian.
//! Limbs may temporarily leave the 16-bit range between carries; every function
//! here keeps them far from i64 overflow.

use crate::crypto::constant_time::constant_time_equals;

pub type Gf = [i64; 16];

pub const ZERO: Gf = [0; 16];

pub const ONE: Gf = [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0];

/// Edwards curve constant d = -121665/121666.
pub const D: Gf = [
    0x78a3, 0x1359, 0x4dca, 0x75eb, 0xd8ab, 0x4141, 0x0a4d, 0x0070, 0xe898, 0x7779, 0x4079, 0x8cc7,
    0xfe73, 0x2b6f, 0x6cee, 0x5203,
];

/// 2 * d
pub const D2: Gf = [
    0xf159, 0x26b2, 0x9b94, 0xebd6, 0xb156, 0x8283, 0x149a, 0x00e0, 0xd130, 0xeef3, 0x80f2, 0x198e,
    0xfce7, 0x56df, 0xd9dc, 0x2406,
];

/// sqrt(-1)
pub const SQRT_M1: Gf = [
    0xa0b0, 0x4a0e, 0x1b27, 0xc4ee, 0xe478, 0xad2f, 0x1806, 0x2f43, 0xd7a7, 0x3dfb, 0x0099, 0x2b4d,
    0xdf0b, 0x4fc1, 0x2480, 0x2b83,
];

/// x coordinate of the base point.
pub const BASE_X: Gf = [
    0xd51a, 0x8f25, 0x2d60, 0xc956, 0xa7b2, 0x9525, 0xc760, 0x692c, 0xdc5c, 0xfdd6, 0xe231, 0xc0a4,
    0x53fe, 0xcd6e, 0x36d3, 0x2169,
];

/// y coordinate of the base point (4/5).
pub const BASE_Y: Gf = [
    0x6658, 0x6666, 0x6666, 0x6666, 0x6666, 0x6666, 0x6666, 0x6666, 0x6666, 0x6666, 0x6666, 0x6666,
    0x6666, 0x6666, 0x6666, 0x6666,
];

/// Propagates carries so every limb is back in [0, 2^16), folding the top
/// carry into limb 0 as 2^256 = 38 (mod p).
pub fn carry(o: &mut Gf) {
    for i in 0..16 {
        o[i] += 1 << 16;
        let c = o[i] >> 16;
        if i < 15 {
            o[i + 1] += c - 1;
        } else {
            o[0] += 38 * (c - 1);
        }
        o[i] -= c << 16;
    }
}

/// Swaps `p` and `q` when `b == 1`, leaves them when `b == 0`, without
/// branching on `b`.
pub fn conditional_swap(p: &mut Gf, q: &mut Gf, b: i64) {
    let mask = !(b - 1);
    for i in 0..16 {
        let t = mask & (p[i] ^ q[i]);
        p[i] ^= t;
        q[i] ^= t;
    }
}

/// Fully reduces `n` and serializes it as 32 little-endian bytes.
pub fn pack(n: &Gf) -> [u8; 32] {
    let mut t = *n;
    carry(&mut t);
    carry(&mut t);
    carry(&mut t);
    let mut m = ZERO;
    for _ in 0..2 {
        m[0] = t[0] - 0xffed;
        for i in 1..15 {
            m[i] = t[i] - 0xffff - ((m[i - 1] >> 16) & 1);
            m[i - 1] &= 0xffff;
        }
        m[15] = t[15] - 0x7fff - ((m[14] >> 16) & 1);
        let b = (m[15] >> 16) & 1;
        m[14] &= 0xffff;
        // keep t - p unless it borrowed
        conditional_swap(&mut t, &mut m, 1 - b);
    }
    let mut o = [0u8; 32];
    for i in 0..16 {
        o[2 * i] = (t[i] & 0xff) as u8;
        o[2 * i + 1] = (t[i] >> 8) as u8;
    }
    o
}

/// Loads 32 little-endian bytes, ignoring the top bit.
pub fn unpack(n: &[u8; 32]) -> Gf {
    let mut o = ZERO;
    for i in 0..16 {
        o[i] = n[2 * i] as i64 + ((n[2 * i + 1] as i64) << 8);
    }
    o[15] &= 0x7fff;
    o
}

pub fn not_equal(a: &Gf, b: &Gf) -> bool {
    !constant_time_equals(&pack(a), &pack(b))
}

/// Low bit of the canonical encoding, the "sign" of x in point compression.
pub fn parity(a: &Gf) -> u8 {
    pack(a)[0] & 1
}

pub fn add(a: &Gf, b: &Gf) -> Gf {
    let mut o = ZERO;
    for i in 0..16 {
        o[i] = a[i] + b[i];
    }
    o
}

pub fn sub(a: &Gf, b: &Gf) -> Gf {
    let mut o = ZERO;
    for i in 0..16 {
        o[i] = a[i] - b[i];
    }
    o
}

pub fn mul(a: &Gf, b: &Gf) -> Gf {
    let mut t = [0i64; 31];
    for i in 0..16 {
        for j in 0..16 {
            t[i + j] += a[i] * b[j];
        }
    }
    for i in 0..15 {
        t[i] += 38 * t[i + 16];
    }
    let mut o = ZERO;
    o.copy_from_slice(&t[..16]);
    carry(&mut o);
    carry(&mut o);
    o
}

pub fn square(a: &Gf) -> Gf {
    mul(a, a)
}

/// a^(p - 2)
pub fn invert(a: &Gf) -> Gf {
    let mut c = *a;
    for i in (0..=253).rev() {
        c = square(&c);
        if i != 2 && i != 4 {
            c = mul(&c, a);
        }
    }
    c
}

/// a^((p - 5) / 8), the core of the square root in point decompression.
pub fn pow2523(a: &Gf) -> Gf {
    let mut c = *a;
    for i in (0..=250).rev() {
        c = square(&c);
        if i != 1 {
            c = mul(&c, a);
        }
    }
    c
}
