//! Points on edwards25519 in extended coordinates (X, Y, Z, T), x = X/Z,
//! y = Y/Z, x*y = T/Z.

use zeroize::Zeroizing;

use super::field::{self, Gf, BASE_X, BASE_Y, D, D2, ONE, SQRT_M1, ZERO};

pub type Point = [Gf; 4];

pub const IDENTITY: Point = [ZERO, ONE, ONE, ZERO];

/// p += q, unified addition (also valid for doubling).
pub fn add(p: &mut Point, q: &Point) {
    let a = field::mul(&field::sub(&p[1], &p[0]), &field::sub(&q[1], &q[0]));
    let b = field::mul(&field::add(&p[0], &p[1]), &field::add(&q[0], &q[1]));
    let c = field::mul(&field::mul(&p[3], &q[3]), &D2);
    let d = field::mul(&p[2], &q[2]);
    let d = field::add(&d, &d);
    let e = field::sub(&b, &a);
    let f = field::sub(&d, &c);
    let g = field::add(&d, &c);
    let h = field::add(&b, &a);

    p[0] = field::mul(&e, &f);
    p[1] = field::mul(&h, &g);
    p[2] = field::mul(&g, &f);
    p[3] = field::mul(&e, &h);
}

fn conditional_swap(p: &mut Point, q: &mut Point, b: i64) {
    for i in 0..4 {
        field::conditional_swap(&mut p[i], &mut q[i], b);
    }
}

/// Compresses a point to its 32-byte encoding: y with the sign of x in the
/// top bit.
pub fn pack(p: &Point) -> [u8; 32] {
    let zi = field::invert(&p[2]);
    let tx = field::mul(&p[0], &zi);
    let ty = field::mul(&p[1], &zi);
    let mut r = field::pack(&ty);
    r[31] ^= field::parity(&tx) << 7;
    r
}

/// Computes s * q with a fixed sequence of operations for every scalar.
/// `q` is used as the ladder's second register and is left modified.
pub fn scalar_mult(q: &mut Point, s: &[u8; 32]) -> Zeroizing<Point> {
    let mut p = Zeroizing::new(IDENTITY);
    for i in (0..256).rev() {
        let b = ((s[i / 8] >> (i & 7)) & 1) as i64;
        conditional_swap(&mut p, q, b);
        add(q, &p);
        let doubled = *p;
        add(&mut p, &doubled);
        conditional_swap(&mut p, q, b);
    }
    p
}

pub fn scalar_base(s: &[u8; 32]) -> Zeroizing<Point> {
    let mut q = Zeroizing::new([BASE_X, BASE_Y, ONE, field::mul(&BASE_X, &BASE_Y)]);
    scalar_mult(&mut q, s)
}

/// Decompresses `encoded` and returns the negation of the point, the form the
/// verification equation needs. `None` when the encoding is not on the curve.
pub fn unpack_negated(encoded: &[u8; 32]) -> Option<Point> {
    let z = ONE;
    let y = field::unpack(encoded);
    let num = field::square(&y);
    let den = field::mul(&num, &D);
    let num = field::sub(&num, &z);
    let den = field::add(&z, &den);

    let den2 = field::square(&den);
    let den4 = field::square(&den2);
    let den6 = field::mul(&den4, &den2);
    let mut t = field::mul(&den6, &num);
    t = field::mul(&t, &den);

    t = field::pow2523(&t);
    t = field::mul(&t, &num);
    t = field::mul(&t, &den);
    t = field::mul(&t, &den);
    let mut x = field::mul(&t, &den);

    let chk = field::mul(&field::square(&x), &den);
    if field::not_equal(&chk, &num) {
        x = field::mul(&x, &SQRT_M1);
    }

    let chk = field::mul(&field::square(&x), &den);
    if field::not_equal(&chk, &num) {
        return None;
    }

    if field::parity(&x) == (encoded[31] >> 7) {
        x = field::sub(&ZERO, &x);
    }

    let t = field::mul(&x, &y);
    Some([x, y, z, t])
}
