use std::{ptr::NonNull, slice};

use crate::{
  Arena,
  config::GrowthContract,
  error::{ArenaError, Result},
};

/// Relocation safe reference to an allocation.
///
/// Stores where the allocation lives as `(chunk, offset)` instead of an
/// address, plus the arena epoch it was issued in. Resolving it after a
/// [`GrowthContract::Relocate`] growth yields the new address; resolving it
/// after a reset or restore fails with [`ArenaError::StaleEpoch`].
///
/// A handle does not borrow the arena and owns nothing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct MemoryHandle {
  chunk: usize,
  offset: usize,
  size: usize,
  alignment: usize,
  epoch: u64,
}

impl MemoryHandle {
  /// Refers to nothing and never resolves.
  pub const EMPTY: Self = Self {
    chunk: 0,
    offset: 0,
    size: 0,
    alignment: 0,
    epoch: 0,
  };

  #[inline]
  pub fn is_valid(&self) -> bool {
    self.size != 0
  }

  pub fn chunk(&self) -> usize {
    self.chunk
  }

  pub fn offset(&self) -> usize {
    self.offset
  }

  pub fn size(&self) -> usize {
    self.size
  }

  pub fn alignment(&self) -> usize {
    self.alignment
  }

  pub fn epoch(&self) -> u64 {
    self.epoch
  }
}

impl Arena {
  /// Like [`Arena::alloc_raw`] but returns a [`MemoryHandle`] stamped with
  /// the epoch current after the allocation.
  pub fn alloc(
    &mut self,
    size: u64,
    alignment: usize,
  ) -> Result<MemoryHandle> {
    let result = self.allocate(size, alignment).map(|placement| MemoryHandle {
      chunk: placement.chunk,
      offset: placement.offset,
      size: placement.end - placement.offset,
      alignment: placement.alignment,
      epoch: self.epoch,
    });

    self.record(result)
  }

  /// [`Arena::alloc`] with the allocated bytes zeroed.
  pub fn alloc_zero(
    &mut self,
    size: u64,
    alignment: usize,
  ) -> Result<MemoryHandle> {
    let handle = self.alloc(size, alignment)?;

    let chunk = &mut self.chunks[handle.chunk];
    crate::mem::fill(chunk.storage_mut(handle.offset, handle.size), 0);

    Ok(handle)
  }

  /// Current address of the allocation `handle` refers to.
  ///
  /// Under [`GrowthContract::Relocate`] the arena only ever has one chunk,
  /// so the handle is re-rooted to the head before the address is computed.
  pub fn resolve(
    &self,
    handle: &MemoryHandle,
  ) -> Result<NonNull<u8>> {
    let (chunk, offset) = self.locate(handle)?;

    Ok(unsafe { self.chunks[chunk].base.add(offset) })
  }

  /// The allocated bytes behind `handle`.
  pub fn bytes(
    &self,
    handle: &MemoryHandle,
  ) -> Result<&[u8]> {
    let (chunk, offset) = self.locate(handle)?;

    Ok(self.chunks[chunk].storage(offset, handle.size))
  }

  pub fn bytes_mut(
    &mut self,
    handle: &MemoryHandle,
  ) -> Result<&mut [u8]> {
    let (chunk, offset) = self.locate(handle)?;

    Ok(self.chunks[chunk].storage_mut(offset, handle.size))
  }

  /// Views the allocation behind `handle` as `count` values of `T`.
  ///
  /// # Safety
  ///
  /// The bytes must hold `count` initialised `T`s and `handle` must have been
  /// allocated with at least `T`'s alignment.
  pub unsafe fn slice_of<T>(
    &self,
    handle: &MemoryHandle,
    count: usize,
  ) -> Result<&[T]> {
    let bytes = self.bytes(handle)?;

    if count.checked_mul(size_of::<T>()).is_none_or(|needed| needed > bytes.len()) {
      return Err(ArenaError::OutOfBounds { count });
    }

    Ok(unsafe { slice::from_raw_parts(bytes.as_ptr().cast(), count) })
  }

  fn locate(
    &self,
    handle: &MemoryHandle,
  ) -> Result<(usize, usize)> {
    if !handle.is_valid() {
      return Err(ArenaError::InvalidHandle);
    }

    if handle.epoch != self.epoch {
      return Err(ArenaError::StaleEpoch {
        issued: handle.epoch,
        current: self.epoch,
      });
    }

    let chunk = match self.growth_contract {
      GrowthContract::Relocate => 0,
      GrowthContract::Fixed | GrowthContract::Append => handle.chunk,
    };

    let Some(target) = self.chunks.get(chunk) else {
      return Err(ArenaError::InvalidHandle);
    };

    match handle.offset.checked_add(handle.size) {
      Some(end) if end <= target.offset => Ok((chunk, handle.offset)),
      _ => Err(ArenaError::InvalidHandle),
    }
  }
}
