//! Overflow-safe size arithmetic.
//!
//! Sizes are carried as `u64` regardless of the target so that capacity
//! configuration behaves the same everywhere. Every operation clamps to a
//! caller supplied ceiling instead of wrapping.

/// `a + b`, clamped to `max`.
#[inline]
pub const fn sadd(
  a: u64,
  b: u64,
  max: u64,
) -> u64 {
  if b > max || a > max - b { max } else { a + b }
}

/// `a * b`, clamped to `max`. A zero factor yields zero.
#[inline]
pub const fn smul(
  a: u64,
  b: u64,
  max: u64,
) -> u64 {
  if b == 0 {
    return 0;
  }

  if a > max / b { max } else { a * b }
}

/// `a - b`, floored at zero.
#[inline]
pub const fn ssub(
  a: u64,
  b: u64,
) -> u64 {
  if b > a { 0 } else { a - b }
}

/// Narrows a `u64` size to the native pointer width.
///
/// Returns the narrowed value and whether it had to be clamped to
/// `usize::MAX`. On 64 bit targets this never clamps.
#[inline]
pub fn downcast_size(value: u64) -> (usize, bool) {
  match usize::try_from(value) {
    Ok(size) => (size, false),
    Err(_) => (usize::MAX, true),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_sadd() {
    assert_eq!(sadd(1, 2, 10), 3);
    assert_eq!(sadd(8, 2, 10), 10);
    assert_eq!(sadd(9, 2, 10), 10);
    assert_eq!(sadd(u64::MAX - 1, 5, u64::MAX), u64::MAX);
    assert_eq!(sadd(0, 20, 10), 10);
  }

  #[test]
  fn test_smul() {
    assert_eq!(smul(1024, 2, 1 << 20), 2048);
    assert_eq!(smul(1 << 19, 4, 1 << 20), 1 << 20);
    assert_eq!(smul(u64::MAX / 2, 3, u64::MAX), u64::MAX);
    assert_eq!(smul(7, 0, 100), 0);
  }

  #[test]
  fn test_ssub() {
    assert_eq!(ssub(10, 3), 7);
    assert_eq!(ssub(3, 10), 0);
  }

  #[test]
  fn test_downcast_size() {
    assert_eq!(downcast_size(4096), (4096, false));

    #[cfg(target_pointer_width = "64")]
    assert_eq!(downcast_size(u64::MAX), (usize::MAX, false));

    #[cfg(target_pointer_width = "32")]
    assert_eq!(downcast_size(1 << 33), (usize::MAX, true));
  }
}
