//! Power-of-two alignment helpers.
//!
//! Everything here is pure integer math on `u64` sizes and `usize`
//! addresses. Rounding up saturates instead of wrapping, so a cursor close to
//! the top of the address space never aliases back to a low address.

use crate::saturate;

/// Default alignment used for chunk sizes and typed helpers when nothing
/// better is known.
pub const ALIGN_DEFAULT: usize = 16;

/// Cache line size on x86 and most ARM cores. Used when the arena is created
/// with [`ArenaFlags::ENFORCE_ALIGNMENT`](crate::ArenaFlags::ENFORCE_ALIGNMENT).
pub const ALIGN_CACHELINE: usize = 64;

/// Rounds `value` up to `alignment`, which must be a power of two.
///
/// ```rust
/// use rarena::align_to;
///
/// assert_eq!(align_to!(1, 64), 64);
/// assert_eq!(align_to!(128, 64), 128);
/// ```
#[macro_export]
macro_rules! align_to {
  ($value:expr, $alignment:expr) => {
    $crate::align::align_up_usize($value, $alignment)
  };
}

/// `true` for 1, 2, 4, 8, ... and `false` for zero and everything else.
#[inline]
pub const fn is_pow2(value: usize) -> bool {
  value != 0 && (value & (value - 1)) == 0
}

/// Whether `value` is a multiple of `alignment`. Zero alignment is never
/// satisfied.
#[inline]
pub const fn is_aligned_to(
  value: u64,
  alignment: usize,
) -> bool {
  alignment > 0 && value % alignment as u64 == 0
}

/// Rounds `value` up to the next multiple of `alignment`.
///
/// A zero alignment returns `value` untouched. The addition saturates at
/// `u64::MAX` before masking.
#[inline]
pub const fn align_up(
  value: u64,
  alignment: usize,
) -> u64 {
  if alignment == 0 {
    return value;
  }

  let mask = alignment as u64 - 1;
  saturate::sadd(value, mask, u64::MAX) & !mask
}

/// [`align_up`] for native sized values such as addresses.
#[inline]
pub const fn align_up_usize(
  value: usize,
  alignment: usize,
) -> usize {
  if alignment == 0 {
    return value;
  }

  let mask = alignment - 1;
  value.saturating_add(mask) & !mask
}

/// Bytes needed to move `address` forward to the next multiple of
/// `alignment`. Never overflows, even for addresses at the top of the
/// address space.
#[inline]
pub const fn padding_for(
  address: usize,
  alignment: usize,
) -> usize {
  if alignment == 0 {
    return 0;
  }

  address.wrapping_neg() & (alignment - 1)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_is_pow2() {
    assert!(!is_pow2(0));
    assert!(!is_pow2(3));
    assert!(!is_pow2(12));
    for shift in 0..usize::BITS {
      assert!(is_pow2(1 << shift));
    }
  }

  #[test]
  fn test_align_up() {
    assert_eq!(align_up(0, 16), 0);
    assert_eq!(align_up(1, 16), 16);
    assert_eq!(align_up(16, 16), 16);
    assert_eq!(align_up(17, 64), 64);
    assert_eq!(align_up(33, 0), 33);
    assert_eq!(align_to!(5, 4), 8);
  }

  #[test]
  fn test_align_up_saturates() {
    let top = align_up(u64::MAX - 3, 8);
    assert_eq!(top, u64::MAX & !7);
    assert_eq!(align_up_usize(usize::MAX, 16), usize::MAX & !15);
  }

  #[test]
  fn test_is_aligned_to() {
    assert!(is_aligned_to(128, 64));
    assert!(!is_aligned_to(100, 64));
    assert!(!is_aligned_to(64, 0));
  }

  #[test]
  fn test_padding_for() {
    assert_eq!(padding_for(0x1001, 16), 15);
    assert_eq!(padding_for(0x1000, 16), 0);
    assert_eq!(padding_for(0x1003, 4), 1);
    assert_eq!(padding_for(usize::MAX, 16), 1);
    assert_eq!(padding_for(7, 0), 0);
  }
}
