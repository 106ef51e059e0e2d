use std::hint::black_box;

/// Compares two equally sized byte arrays in time independent of their
/// contents.
///
/// All byte-wise differences are folded into one accumulator and the result is
/// derived from it arithmetically, so there is neither an early exit nor a
/// branch on the data.
pub fn constant_time_equals<const N: usize>(a: &[u8; N], b: &[u8; N]) -> bool {
    let mut acc = 0u8;
    for i in 0..N {
        acc |= a[i] ^ b[i];
    }
    // (acc - 1) borrows into bit 8 only when acc == 0
    let equal = ((black_box(acc) as u32).wrapping_sub(1) >> 8) & 1;
    equal == 1
}
