//! Scoped handling of memory that holds secret or secret-derived bytes.
//!
//! [`Scratch`] owns a heap buffer that is allocated once at its final size and
//! wiped when it goes out of scope, including during unwinding. Dropping it also
//! scrubs a span of the stack below the caller, which is where the field and
//! hash temporaries of the operation that used it were living.

use std::ops::{Deref, DerefMut};

use zeroize::Zeroize;

/// Bytes of stack overwritten after every secret-handling operation.
pub const STACK_SCRUB_BYTES: usize = 16 * 1024;

pub struct Scratch {
    buf: Vec<u8>,
}

impl Scratch {
    /// Allocates a zeroed buffer of exactly `len` bytes. It is never grown, so
    /// its contents are never copied to a second allocation.
    pub fn zeroed(len: usize) -> Self {
        Scratch { buf: vec![0u8; len] }
    }

    /// Overwrites the whole buffer with zeros, keeping its length.
    pub fn wipe(&mut self) {
        self.buf.as_mut_slice().zeroize();
    }
}

#[cfg(test)]
thread_local! {
    /// What each dropped `Scratch` looked like after its wipe: (len, all zero).
    static DROPPED: std::cell::RefCell<Vec<(usize, bool)>> = std::cell::RefCell::new(Vec::new());
}

/// Drains the record of scratch buffers dropped on this thread.
#[cfg(test)]
pub(crate) fn take_dropped() -> Vec<(usize, bool)> {
    DROPPED.with(|dropped| dropped.take())
}

impl Deref for Scratch {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.buf
    }
}

impl DerefMut for Scratch {
    fn deref_mut(&mut self) -> &mut [u8] {
        &mut self.buf
    }
}

impl Drop for Scratch {
    fn drop(&mut self) {
        self.wipe();
        #[cfg(test)]
        DROPPED.with(|dropped| {
            let all_zero = self.buf.iter().all(|b| *b == 0);
            dropped.borrow_mut().push((self.buf.len(), all_zero))
        });
        self.buf.zeroize();
        scrub_stack();
    }
}

impl std::fmt::Debug for Scratch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scratch").field("len", &self.buf.len()).finish()
    }
}

/// Scrubs the stack when dropped, for operations whose secrets live only in
/// fixed-size locals.
pub struct StackGuard;

impl Drop for StackGuard {
    fn drop(&mut self) {
        scrub_stack();
    }
}

/// Overwrites [`STACK_SCRUB_BYTES`] of stack with zeros.
#[inline(never)]
pub fn scrub_stack() {
    let mut frame = [0u8; STACK_SCRUB_BYTES];
    frame.zeroize();
    std::hint::black_box(&frame);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scratch_is_zeroed_and_sized() {
        let mut scratch = Scratch::zeroed(100);
        assert_eq!(scratch.len(), 100);
        assert!(scratch.iter().all(|b| *b == 0));
        scratch[..4].copy_from_slice(&[1, 2, 3, 4]);
        assert_eq!(&scratch[..4], &[1, 2, 3, 4]);
    }

    #[test]
    fn test_wipe() {
        let mut scratch = Scratch::zeroed(32);
        scratch.copy_from_slice(&[0xAA; 32]);
        scratch.wipe();
        assert_eq!(scratch.len(), 32);
        assert!(scratch.iter().all(|b| *b == 0));
    }

    #[test]
    fn test_scratch_wipes_on_drop() {
        take_dropped();
        {
            let mut scratch = Scratch::zeroed(32);
            scratch.copy_from_slice(&[0xAA; 32]);
        }
        assert_eq!(take_dropped(), vec![(32, true)]);
    }

    #[test]
    fn test_scratch_wipes_while_unwinding() {
        take_dropped();
        let result = std::panic::catch_unwind(|| {
            let mut scratch = Scratch::zeroed(8);
            scratch.copy_from_slice(&[0x55; 8]);
            panic!("fault while holding secrets");
        });
        assert!(result.is_err());
        assert_eq!(take_dropped(), vec![(8, true)]);
    }

    #[test]
    fn test_debug_does_not_print_contents() {
        let mut scratch = Scratch::zeroed(4);
        scratch.copy_from_slice(&[0xDE, 0xAD, 0xBE, 0xEF]);
        let printed = format!("{:?}", scratch);
        assert_eq!(printed, "Scratch { len: 4 }");
    }
}
