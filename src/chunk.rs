use std::{ptr::NonNull, slice};

use crate::{
  align,
  platform::{AllocKind, CHUNK_ALIGN},
};

/// One contiguously owned backing block with its own write cursor.
///
/// The block is owned exclusively by the chunk and is given back to its
/// provider exactly once, in [`Chunk::release`]. `offset <= capacity` holds
/// at all times.
#[derive(Debug)]
pub(crate) struct Chunk {
  /// Start of the backing block.
  pub base: NonNull<u8>,
  /// Usable bytes in the block.
  pub capacity: usize,
  /// Bytes currently in use, also the next write cursor.
  pub offset: usize,
}

impl Chunk {
  /// Obtains a fresh block of `capacity` bytes from `kind`'s provider.
  pub fn reserve(
    kind: AllocKind,
    capacity: usize,
    zero_fill: bool,
  ) -> Option<Self> {
    let base = unsafe { kind.provider().reserve(capacity)? };
    debug_assert!(align::is_aligned_to(base.as_ptr() as u64, CHUNK_ALIGN));

    let mut chunk = Self {
      base,
      capacity,
      offset: 0,
    };

    if zero_fill {
      crate::mem::fill(chunk.storage_mut(0, capacity), 0);
    }

    Some(chunk)
  }

  /// Trades the backing block for a bigger one, keeping the used bytes.
  /// Leaves the chunk untouched when the provider fails.
  pub fn relocate(
    &mut self,
    kind: AllocKind,
    new_capacity: usize,
    zero_fill: bool,
  ) -> bool {
    let grown = unsafe {
      kind
        .provider()
        .regrow(self.base, self.capacity, self.offset, new_capacity)
    };

    let Some(base) = grown else {
      return false;
    };
    debug_assert!(align::is_aligned_to(base.as_ptr() as u64, CHUNK_ALIGN));

    let old_capacity = self.capacity;
    self.base = base;
    self.capacity = new_capacity;

    if zero_fill {
      crate::mem::fill(self.storage_mut(old_capacity, new_capacity - old_capacity), 0);
    }

    true
  }

  /// Gives the block back to the provider it came from.
  pub fn release(
    self,
    kind: AllocKind,
  ) {
    unsafe { kind.provider().release(self.base, self.capacity) }
  }

  /// Address of the next byte the cursor would hand out.
  #[inline]
  pub fn cursor(&self) -> usize {
    self.base.as_ptr() as usize + self.offset
  }

  #[inline]
  pub fn remaining(&self) -> usize {
    self.capacity - self.offset
  }

  /// Whether `[address, address + count)` lies inside the used part of the
  /// block.
  pub fn holds(
    &self,
    address: usize,
    count: usize,
  ) -> bool {
    let start = self.base.as_ptr() as usize;

    match address.checked_add(count) {
      Some(end) => address >= start && end <= start + self.offset,
      None => false,
    }
  }

  pub fn storage(
    &self,
    offset: usize,
    count: usize,
  ) -> &[u8] {
    debug_assert!(offset + count <= self.capacity);

    unsafe { slice::from_raw_parts(self.base.as_ptr().add(offset), count) }
  }

  pub fn storage_mut(
    &mut self,
    offset: usize,
    count: usize,
  ) -> &mut [u8] {
    debug_assert!(offset + count <= self.capacity);

    unsafe { slice::from_raw_parts_mut(self.base.as_ptr().add(offset), count) }
  }
}
