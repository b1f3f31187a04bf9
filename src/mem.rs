//! Bulk memory primitives: copy, fill and string length.
//!
//! All three work a machine word at a time over the aligned middle of the
//! slice and fall back to single bytes for the misaligned prefix and the
//! tail. They operate on slices, so the bounds are always known and nothing
//! here reads past the memory it was given.

use std::{mem, ptr::NonNull, slice};

use crate::{
  Arena,
  error::{ArenaError, Result},
};

const WORD: usize = mem::size_of::<usize>();

/// Lengths at or above this are filled 4 bytes at a time.
pub const FILL_WORD32_THRESHOLD: usize = 0x4000;

/// Lengths at or above this are filled 8 bytes at a time.
pub const FILL_WORD64_THRESHOLD: usize = 0x10000;

const LO_BYTES: u64 = 0x0101_0101_0101_0101;
const HI_BYTES: u64 = 0x8080_8080_8080_8080;

/// Copies `min(dst.len(), src.len())` bytes from `src` into `dst` and returns
/// the number of bytes copied.
pub fn copy(
  dst: &mut [u8],
  src: &[u8],
) -> usize {
  let count = dst.len().min(src.len());
  let (dst, src) = (&mut dst[..count], &src[..count]);

  let mut dst_words = dst.chunks_exact_mut(WORD);
  let mut src_words = src.chunks_exact(WORD);

  for (d, s) in (&mut dst_words).zip(&mut src_words) {
    d.copy_from_slice(s);
  }

  for (d, s) in dst_words.into_remainder().iter_mut().zip(src_words.remainder()) {
    *d = *s;
  }

  count
}

/// Sets every byte of `dst` to `value`.
///
/// Short slices are filled byte by byte. Past [`FILL_WORD32_THRESHOLD`] a 4
/// byte broadcast pattern is used and past [`FILL_WORD64_THRESHOLD`] an 8 byte
/// one; the misaligned prefix and the tail are still written byte-wise.
pub fn fill(
  dst: &mut [u8],
  value: u8,
) {
  if dst.len() >= FILL_WORD64_THRESHOLD {
    let pattern = u64::from_ne_bytes([value; 8]);
    let (prefix, words, tail) = unsafe { dst.align_to_mut::<u64>() };

    fill_bytes(prefix, value);
    words.iter_mut().for_each(|w| *w = pattern);
    fill_bytes(tail, value);
  } else if dst.len() >= FILL_WORD32_THRESHOLD {
    let pattern = u32::from_ne_bytes([value; 4]);
    let (prefix, words, tail) = unsafe { dst.align_to_mut::<u32>() };

    fill_bytes(prefix, value);
    words.iter_mut().for_each(|w| *w = pattern);
    fill_bytes(tail, value);
  } else {
    fill_bytes(dst, value);
  }
}

#[inline]
fn fill_bytes(
  dst: &mut [u8],
  value: u8,
) {
  for byte in dst {
    *byte = value;
  }
}

/// Whether any byte of `word` is zero, without branching per byte.
#[inline]
pub const fn has_zero_byte(word: u64) -> bool {
  (word.wrapping_sub(LO_BYTES) & !word & HI_BYTES) != 0
}

/// Position of the first NUL byte in `bytes`, or `bytes.len()` if there is
/// none.
///
/// Scans the misaligned prefix byte-wise, then 8 bytes at a time using
/// [`has_zero_byte`], and pins down the exact byte inside the word that
/// tripped the check.
pub fn strlen(bytes: &[u8]) -> usize {
  let (prefix, words, _) = unsafe { bytes.align_to::<u64>() };

  if let Some(pos) = prefix.iter().position(|&b| b == 0) {
    return pos;
  }

  let mut scanned = prefix.len();

  for &word in words {
    if has_zero_byte(word) {
      break;
    }
    scanned += 8;
  }

  match bytes[scanned..].iter().position(|&b| b == 0) {
    Some(pos) => scanned + pos,
    None => bytes.len(),
  }
}

impl Arena {
  /// [`copy`] restricted to memory this arena has handed out. Both ranges
  /// must lie in the used part of a chunk; overlapping ranges are allowed.
  pub fn copy_within(
    &mut self,
    dst: NonNull<u8>,
    src: NonNull<u8>,
    count: usize,
  ) -> Result<()> {
    let result = self.checked_copy(dst, src, count);
    self.record(result)
  }

  /// [`fill`] restricted to memory this arena has handed out. The whole
  /// destination range must lie in the used part of a chunk.
  pub fn fill_within(
    &mut self,
    dst: NonNull<u8>,
    value: u8,
    count: usize,
  ) -> Result<()> {
    let result = self.checked_fill(dst, value, count);
    self.record(result)
  }

  /// Copies `src` up to its first NUL (or all of it) into the arena and
  /// terminates the copy with a NUL.
  pub fn strdup(
    &mut self,
    src: &[u8],
  ) -> Result<NonNull<u8>> {
    let len = strlen(src);
    let dst = self.alloc_raw(len as u64 + 1, 1)?;

    let out = unsafe { slice::from_raw_parts_mut(dst.as_ptr(), len + 1) };
    copy(&mut out[..len], &src[..len]);
    out[len] = 0;

    Ok(dst)
  }

  fn holds(
    &self,
    address: NonNull<u8>,
    count: usize,
  ) -> bool {
    let address = address.as_ptr() as usize;

    self.chunks.iter().any(|chunk| chunk.holds(address, count))
  }

  fn checked_copy(
    &self,
    dst: NonNull<u8>,
    src: NonNull<u8>,
    count: usize,
  ) -> Result<()> {
    if !self.holds(dst, count) || !self.holds(src, count) {
      return Err(ArenaError::OutOfBounds { count });
    }

    let (d, s) = (dst.as_ptr() as usize, src.as_ptr() as usize);

    unsafe {
      if d < s + count && s < d + count {
        std::ptr::copy(src.as_ptr(), dst.as_ptr(), count);
      } else {
        copy(
          slice::from_raw_parts_mut(dst.as_ptr(), count),
          slice::from_raw_parts(src.as_ptr(), count),
        );
      }
    }

    Ok(())
  }

  fn checked_fill(
    &self,
    dst: NonNull<u8>,
    value: u8,
    count: usize,
  ) -> Result<()> {
    if !self.holds(dst, count) {
      return Err(ArenaError::OutOfBounds { count });
    }

    fill(unsafe { slice::from_raw_parts_mut(dst.as_ptr(), count) }, value);

    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::KB;

  #[test]
  fn test_copy_word_and_tail() {
    let src: Vec<u8> = (0..=100).collect();
    let mut dst = vec![0u8; 101];

    assert_eq!(copy(&mut dst, &src), 101);
    assert_eq!(dst, src);
  }

  #[test]
  fn test_copy_shorter_side_wins() {
    let src = [7u8; 5];
    let mut dst = [0u8; 12];

    assert_eq!(copy(&mut dst, &src), 5);
    assert_eq!(&dst[..5], &[7; 5]);
    assert_eq!(&dst[5..], &[0; 7]);
  }

  #[test]
  fn test_fill_small() {
    let mut buf = [0u8; 33];
    fill(&mut buf[1..], 0x5A);

    assert_eq!(buf[0], 0);
    assert!(buf[1..].iter().all(|&b| b == 0x5A));
  }

  #[test]
  fn test_fill_thresholds_misaligned() {
    for len in [FILL_WORD32_THRESHOLD + 3, FILL_WORD64_THRESHOLD + 5] {
      let mut buf = vec![0u8; len + 2];
      fill(&mut buf[1..len + 1], 0xCD);

      assert_eq!(buf[0], 0);
      assert_eq!(buf[len + 1], 0);
      assert!(buf[1..len + 1].iter().all(|&b| b == 0xCD));
    }
  }

  #[test]
  fn test_has_zero_byte() {
    assert!(!has_zero_byte(u64::from_ne_bytes(*b"abcdefgh")));
    assert!(has_zero_byte(u64::from_ne_bytes(*b"abc\0efgh")));
    assert!(has_zero_byte(0));
    assert!(!has_zero_byte(u64::MAX));
  }

  #[test]
  fn test_strlen() {
    assert_eq!(strlen(b"\0"), 0);
    assert_eq!(strlen(b"hello\0world"), 5);
    assert_eq!(strlen(b"no terminator"), 13);
    assert_eq!(strlen(b""), 0);
  }

  #[test]
  fn test_strlen_long_misaligned() {
    let mut buf = vec![b'A'; 1000];
    buf[777] = 0;

    for start in 0..8 {
      assert_eq!(strlen(&buf[start..]), 777 - start);
    }
  }

  #[test]
  fn test_copy_within_bounds() {
    let mut arena = Arena::new(KB).unwrap();
    let a = arena.alloc_raw(32, 8).unwrap();
    let b = arena.alloc_raw(32, 8).unwrap();

    arena.fill_within(a, 0x61, 32).unwrap();
    arena.copy_within(b, a, 32).unwrap();
    assert!(arena.used_bytes(0).iter().all(|&x| x == 0x61));

    let past = unsafe { b.add(16) };
    assert_eq!(arena.copy_within(past, a, 32), Err(ArenaError::OutOfBounds { count: 32 }));
    assert_eq!(arena.error(), Some(ArenaError::OutOfBounds { count: 32 }));

    let mut outside = [0u8; 8];
    let foreign = NonNull::new(outside.as_mut_ptr()).unwrap();
    assert!(arena.copy_within(foreign, a, 8).is_err());
    assert!(arena.copy_within(a, foreign, 8).is_err());
  }

  #[test]
  fn test_copy_within_overlap() {
    let mut arena = Arena::new(KB).unwrap();
    let p = arena.alloc_raw(16, 1).unwrap();
    unsafe {
      for i in 0..16 {
        p.as_ptr().add(i).write(i as u8);
      }
    }

    arena.copy_within(unsafe { p.add(4) }, p, 12).unwrap();

    let bytes = arena.used_bytes(0);
    assert_eq!(&bytes[..4], &[0, 1, 2, 3]);
    assert_eq!(&bytes[4..], &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11]);
  }

  #[test]
  fn test_fill_within_checks_whole_range() {
    let mut arena = Arena::new(KB).unwrap();
    let p = arena.alloc_raw(100, 1).unwrap();

    assert_eq!(arena.fill_within(p, 0xEE, 101), Err(ArenaError::OutOfBounds { count: 101 }));
    assert!(arena.fill_within(unsafe { p.add(50) }, 0xEE, 50).is_ok());
    assert!(arena.used_bytes(0)[50..].iter().all(|&b| b == 0xEE));
  }

  #[test]
  fn test_strdup() {
    let mut arena = Arena::new(KB).unwrap();
    arena.alloc_raw(3, 1).unwrap();

    let dup = arena.strdup(b"arena\0ignored").unwrap();
    let bytes = unsafe { slice::from_raw_parts(dup.as_ptr(), 6) };
    assert_eq!(bytes, b"arena\0");

    let unterminated = arena.strdup(b"xyz").unwrap();
    let bytes = unsafe { slice::from_raw_parts(unterminated.as_ptr(), 4) };
    assert_eq!(bytes, b"xyz\0");

    assert_eq!(arena.used(), 3 + 6 + 4);
  }
}
