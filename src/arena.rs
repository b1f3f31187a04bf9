use std::{fmt, marker::PhantomData, mem, ptr::NonNull};

use crate::{
  align::{self, ALIGN_CACHELINE},
  chunk::Chunk,
  config::{ArenaConfig, ArenaFlags, GrowthContract},
  error::{ArenaError, Result},
  platform::AllocKind,
  saturate,
};

/// Bookkeeping collected while [`ArenaFlags::DEBUG`] is set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DebugInfo {
  /// Address one past the last committed allocation.
  pub end: usize,
  /// Bytes skipped to satisfy alignment.
  pub bytes_lost: u64,
  pub total_allocations: u64,
}

/// Where a successful bump landed.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Placement {
  pub chunk: usize,
  pub offset: usize,
  pub end: usize,
  /// Alignment actually applied, after [`ArenaFlags::ENFORCE_ALIGNMENT`].
  pub alignment: usize,
  pub lost: usize,
}

/// Region allocator owning a chain of chunks.
///
/// Objects are never freed one by one. Memory comes back in bulk through
/// [`Arena::reset`], [`Arena::restore`] or [`Arena::destroy`] (which also
/// runs on drop).
///
/// The chain is kept in creation order, `chunks[0]` is the head and
/// `chunks[current]` is the chunk new allocations are bumped from.
///
/// The arena is `!Send` and `!Sync`, it is meant to be owned by a single
/// thread and passed around by `&mut`.
#[derive(Default)]
pub struct Arena {
  pub(crate) chunks: Vec<Chunk>,
  pub(crate) current: usize,
  /// Sum of every chunk capacity.
  pub(crate) reserved: u64,
  pub(crate) max_capacity: u64,
  pub(crate) growth_contract: GrowthContract,
  pub(crate) growth_factor: u64,
  pub(crate) flags: ArenaFlags,
  pub(crate) error: Option<ArenaError>,
  /// Fixed at creation, every chunk goes back through this path.
  pub(crate) alloc_kind: AllocKind,
  pub(crate) epoch: u64,
  pub(crate) debug: DebugInfo,
  _not_send_sync: PhantomData<*mut u8>,
}

impl Arena {
  /// Creates a fixed size arena. A zero capacity picks the default (4 KiB).
  /// Debug accounting is on.
  pub fn new(capacity: u64) -> Result<Self> {
    Self::with_config(ArenaConfig::new(capacity).flags(ArenaFlags::DEBUG))
  }

  /// Creates an arena from `config` after normalising it, see
  /// [`ArenaConfig::normalized`]. Fails with [`ArenaError::OutOfMemory`] if
  /// the platform cannot supply the first chunk.
  pub fn with_config(config: ArenaConfig) -> Result<Self> {
    let mut config = config.normalized();

    let (capacity, overflow) = saturate::downcast_size(config.capacity);
    if overflow {
      tracing::warn!(
        requested = config.capacity,
        clamped = capacity,
        "capacity does not fit the address space, clamping"
      );
      config.max_capacity = capacity as u64;
    }

    let alloc_kind = AllocKind::for_size(capacity);
    let zero_fill = config.flags.contains(ArenaFlags::ZERO_FILL);

    let Some(chunk) = Chunk::reserve(alloc_kind, capacity, zero_fill) else {
      return Err(ArenaError::OutOfMemory {
        requested: capacity as u64,
        available: 0,
      });
    };

    tracing::debug!(
      capacity,
      max_capacity = config.max_capacity,
      contract = ?config.growth_contract,
      growth_factor = config.growth_factor,
      kind = ?alloc_kind,
      "arena created"
    );

    Ok(Self {
      chunks: vec![chunk],
      current: 0,
      reserved: capacity as u64,
      max_capacity: config.max_capacity,
      growth_contract: config.growth_contract,
      growth_factor: config.growth_factor,
      flags: config.flags,
      error: None,
      alloc_kind,
      epoch: 0,
      debug: DebugInfo::default(),
      _not_send_sync: PhantomData,
    })
  }

  /// Releases every chunk and zeroes all fields. A destroyed arena looks
  /// exactly like [`Arena::default`], destroying it again does nothing.
  pub fn destroy(&mut self) {
    if self.chunks.is_empty() {
      return;
    }

    let kind = self.alloc_kind;
    let count = self.chunks.len();
    for chunk in self.chunks.drain(..) {
      chunk.release(kind);
    }

    self.current = 0;
    self.reserved = 0;
    self.max_capacity = 0;
    self.growth_contract = GrowthContract::Fixed;
    self.growth_factor = 0;
    self.flags = ArenaFlags::NONE;
    self.error = None;
    self.alloc_kind = AllocKind::Heap;
    self.epoch = 0;
    self.debug = DebugInfo::default();

    tracing::debug!(chunks = count, "arena destroyed");
  }

  /// Bumps `size` bytes aligned to `alignment` and returns their address.
  ///
  /// The address stays valid until the next reset or restore. Under
  /// [`GrowthContract::Relocate`] it also dies on the next growth, hold a
  /// [`MemoryHandle`](crate::MemoryHandle) across calls that may grow.
  pub fn alloc_raw(
    &mut self,
    size: u64,
    alignment: usize,
  ) -> Result<NonNull<u8>> {
    let result = self.allocate(size, alignment).map(|placement| self.address_of(&placement));
    self.record(result)
  }

  /// [`Arena::alloc_raw`] followed by zeroing exactly `size` bytes.
  pub fn alloc_zero_raw(
    &mut self,
    size: u64,
    alignment: usize,
  ) -> Result<NonNull<u8>> {
    let result = self.allocate(size, alignment).map(|placement| {
      let chunk = &mut self.chunks[placement.chunk];
      crate::mem::fill(chunk.storage_mut(placement.offset, placement.end - placement.offset), 0);
      self.address_of(&placement)
    });

    self.record(result)
  }

  /// Room for one `T`. The memory is uninitialised.
  pub fn alloc_struct<T>(&mut self) -> Result<NonNull<T>> {
    self
      .alloc_raw(mem::size_of::<T>() as u64, mem::align_of::<T>())
      .map(NonNull::cast)
  }

  pub fn alloc_struct_zero<T>(&mut self) -> Result<NonNull<T>> {
    self
      .alloc_zero_raw(mem::size_of::<T>() as u64, mem::align_of::<T>())
      .map(NonNull::cast)
  }

  /// Room for `count` consecutive `T`s. The memory is uninitialised.
  pub fn alloc_array<T>(
    &mut self,
    count: usize,
  ) -> Result<NonNull<T>> {
    let size = self.array_size::<T>(count)?;

    self.alloc_raw(size, mem::align_of::<T>()).map(NonNull::cast)
  }

  pub fn alloc_array_zero<T>(
    &mut self,
    count: usize,
  ) -> Result<NonNull<T>> {
    let size = self.array_size::<T>(count)?;

    self.alloc_zero_raw(size, mem::align_of::<T>()).map(NonNull::cast)
  }

  /// Moves `value` into the arena. `T`'s destructor never runs.
  pub fn alloc_value<T>(
    &mut self,
    value: T,
  ) -> Result<&mut T> {
    let ptr = self.alloc_struct::<T>()?;

    unsafe {
      ptr.as_ptr().write(value);
      Ok(&mut *ptr.as_ptr())
    }
  }

  /// Rewinds every cursor to zero and bumps the epoch. Keeps all backing
  /// storage and the chain as they are.
  ///
  /// O(1) for single chunk arenas, O(chunks) for a
  /// [`GrowthContract::Append`] chain, where allocation restarts from the
  /// head.
  pub fn reset(&mut self) {
    if self.chunks.is_empty() {
      return;
    }

    if let [only] = self.chunks.as_mut_slice() {
      only.offset = 0;
    } else {
      for chunk in &mut self.chunks {
        chunk.offset = 0;
      }
      self.current = 0;
    }

    self.epoch += 1;
    self.error = None;

    tracing::debug!(epoch = self.epoch, "arena reset");
  }

  /// Switches the growth policy of a live arena. The factor gets the same
  /// defaults and range as at creation. Leaving `Fixed` lifts a
  /// `max_capacity` that was only defaulted to the capacity.
  pub fn set_growth_contract(
    &mut self,
    contract: GrowthContract,
    growth_factor: u64,
  ) -> Result<()> {
    let result = self.apply_growth_contract(contract, growth_factor);
    self.record(result)
  }

  fn apply_growth_contract(
    &mut self,
    contract: GrowthContract,
    growth_factor: u64,
  ) -> Result<()> {
    if self.chunks.is_empty() {
      return Err(ArenaError::Contract("arena has no backing storage"));
    }

    if contract == GrowthContract::Relocate && self.chunks.len() > 1 {
      return Err(ArenaError::Contract("relocation needs a single chunk"));
    }

    if self.growth_contract == GrowthContract::Fixed
      && contract != GrowthContract::Fixed
      && self.max_capacity <= self.reserved
    {
      self.max_capacity = crate::config::CAPACITY_MAX.max(self.reserved);
    }

    self.growth_contract = contract;
    self.growth_factor = crate::config::clamp_growth_factor(contract, growth_factor, self.max_capacity);

    Ok(())
  }

  /// Error of the last fallible call, `None` if it succeeded.
  pub fn error(&self) -> Option<ArenaError> {
    self.error
  }

  /// Whether the chain is empty, i.e. the arena was destroyed or never
  /// created successfully.
  pub fn is_empty(&self) -> bool {
    self.chunks.is_empty()
  }

  /// Total bytes of backing storage across every chunk.
  pub fn reserved(&self) -> u64 {
    self.reserved
  }

  pub fn max_capacity(&self) -> u64 {
    self.max_capacity
  }

  /// Capacity of the chunk allocations are currently bumped from.
  pub fn capacity(&self) -> usize {
    self.chunks.get(self.current).map_or(0, |chunk| chunk.capacity)
  }

  /// Bytes in use (including alignment padding) across every chunk.
  pub fn used(&self) -> usize {
    self.chunks.iter().map(|chunk| chunk.offset).sum()
  }

  pub fn chunk_count(&self) -> usize {
    self.chunks.len()
  }

  pub fn epoch(&self) -> u64 {
    self.epoch
  }

  pub fn growth_contract(&self) -> GrowthContract {
    self.growth_contract
  }

  pub fn growth_factor(&self) -> u64 {
    self.growth_factor
  }

  pub fn flags(&self) -> ArenaFlags {
    self.flags
  }

  pub fn alloc_kind(&self) -> AllocKind {
    self.alloc_kind
  }

  pub fn debug_info(&self) -> DebugInfo {
    self.debug
  }

  /// Validates the request, bumps the cursor, growing first if needed.
  /// Nothing is mutated unless the whole call succeeds.
  pub(crate) fn allocate(
    &mut self,
    size: u64,
    alignment: usize,
  ) -> Result<Placement> {
    if size == 0 {
      return Err(ArenaError::ZeroSize);
    }

    if !align::is_pow2(alignment) {
      return Err(ArenaError::InvalidAlignment(alignment));
    }

    let alignment = if self.flags.contains(ArenaFlags::ENFORCE_ALIGNMENT) {
      ALIGN_CACHELINE
    } else {
      alignment
    };

    let (size, overflow) = saturate::downcast_size(size);
    if overflow || self.chunks.is_empty() {
      return Err(self.out_of_memory(size));
    }

    let placement = match self.fit(size, alignment) {
      Some(placement) => placement,
      None => {
        self.grow(size, alignment)?;
        self.fit(size, alignment).ok_or_else(|| self.out_of_memory(size))?
      }
    };

    self.commit(&placement);

    Ok(placement)
  }

  /// Computes where `size` bytes would land in the current chunk.
  fn fit(
    &self,
    size: usize,
    alignment: usize,
  ) -> Option<Placement> {
    let chunk = &self.chunks[self.current];

    let lost = align::padding_for(chunk.cursor(), alignment);
    let offset = chunk.offset.checked_add(lost)?;
    let end = offset.checked_add(size)?;
    if end > chunk.capacity {
      return None;
    }

    Some(Placement {
      chunk: self.current,
      offset,
      end,
      alignment,
      lost,
    })
  }

  fn commit(
    &mut self,
    placement: &Placement,
  ) {
    let chunk = &mut self.chunks[placement.chunk];
    chunk.offset = placement.end;

    if self.flags.contains(ArenaFlags::DEBUG) {
      self.debug.end = chunk.base.as_ptr() as usize + placement.end;
      self.debug.bytes_lost += placement.lost as u64;
      self.debug.total_allocations += 1;
    }

    tracing::trace!(
      chunk = placement.chunk,
      offset = placement.offset,
      size = placement.end - placement.offset,
      alignment = placement.alignment,
      lost = placement.lost,
      "committed"
    );
  }

  pub(crate) fn address_of(
    &self,
    placement: &Placement,
  ) -> NonNull<u8> {
    let chunk = &self.chunks[placement.chunk];

    unsafe { chunk.base.add(placement.offset) }
  }

  pub(crate) fn out_of_memory(
    &self,
    requested: usize,
  ) -> ArenaError {
    let remaining = self.chunks.get(self.current).map_or(0, Chunk::remaining) as u64;
    let headroom = match self.growth_contract {
      GrowthContract::Fixed => 0,
      GrowthContract::Relocate | GrowthContract::Append => saturate::ssub(self.max_capacity, self.reserved),
    };

    ArenaError::OutOfMemory {
      requested: requested as u64,
      available: remaining + headroom,
    }
  }

  /// Stores the outcome of a public call in the error slot.
  pub(crate) fn record<T>(
    &mut self,
    result: Result<T>,
  ) -> Result<T> {
    self.error = result.as_ref().err().copied();
    result
  }

  fn array_size<T>(
    &mut self,
    count: usize,
  ) -> Result<u64> {
    if count == 0 {
      return self.record(Err(ArenaError::ZeroSize));
    }

    match mem::size_of::<T>().checked_mul(count) {
      Some(size) => Ok(size as u64),
      None => {
        let error = self.out_of_memory(usize::MAX);
        self.record(Err(error))
      }
    }
  }

  #[cfg(test)]
  pub(crate) fn used_bytes(
    &self,
    index: usize,
  ) -> &[u8] {
    let chunk = &self.chunks[index];
    chunk.storage(0, chunk.offset)
  }
}

impl Drop for Arena {
  fn drop(&mut self) {
    self.destroy();
  }
}

impl fmt::Debug for Arena {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    f.debug_struct("Arena")
      .field("chunks", &self.chunk_count())
      .field("current", &self.current)
      .field("used", &self.used())
      .field("reserved", &self.reserved)
      .field("max_capacity", &self.max_capacity)
      .field("growth_contract", &self.growth_contract)
      .field("growth_factor", &self.growth_factor)
      .field("epoch", &self.epoch)
      .field("error", &self.error)
      .finish()
  }
}

#[cfg(test)]
mod tests {
  use std::slice;

  use super::*;
  use crate::config::{CAPACITY_DEFAULT, KB, MB};

  /// Tiny LCG, good enough to shuffle sizes and alignments.
  struct Lcg(u32);

  impl Lcg {
    fn next(&mut self) -> u32 {
      self.0 = self.0.wrapping_mul(0x0033_3222).wrapping_add(1_013_904_223);
      self.0
    }
  }

  #[test]
  fn test_create_destroy() {
    let mut arena = Arena::new(4 * KB).unwrap();
    assert_eq!(arena.chunk_count(), 1);
    assert!(arena.capacity() >= 4 * KB as usize);
    assert_eq!(arena.alloc_kind(), AllocKind::Heap);

    arena.destroy();
    assert!(arena.is_empty());
    assert_eq!(arena.reserved(), 0);
    assert_eq!(arena.capacity(), 0);
    assert_eq!(arena.used(), 0);
    assert_eq!(arena.max_capacity(), 0);

    arena.destroy();
    assert!(arena.is_empty());
  }

  #[test]
  fn test_default_capacity() {
    let arena = Arena::new(0).unwrap();

    assert_eq!(arena.reserved(), CAPACITY_DEFAULT);
    assert_eq!(arena.max_capacity(), CAPACITY_DEFAULT);
    assert!(arena.flags().contains(ArenaFlags::DEBUG));
  }

  #[test]
  fn test_create_fails_when_platform_refuses() {
    let result = Arena::with_config(ArenaConfig::new(1 << 62));

    assert!(matches!(
      result,
      Err(ArenaError::OutOfMemory { requested, available: 0 }) if requested == 1 << 62
    ));
  }

  #[test]
  fn test_big_arena_uses_pages() {
    let arena = Arena::new(MB).unwrap();
    assert_eq!(arena.alloc_kind(), AllocKind::Pages);
  }

  #[test]
  fn test_two_ints_back_to_back() {
    let mut arena = Arena::with_config(ArenaConfig::new(4 * KB)).unwrap();
    let base = arena.chunks[0].base.as_ptr() as usize;

    let a = arena.alloc_raw(4, 4).unwrap();
    let b = arena.alloc_raw(4, 4).unwrap();

    assert_eq!(a.as_ptr() as usize, base);
    assert_eq!(b.as_ptr() as usize, base + 4);

    arena.destroy();
    assert_eq!(arena.chunk_count(), 0);
  }

  #[test]
  fn test_alignment() {
    let mut arena = Arena::new(2 * KB).unwrap();

    let a = arena.alloc_raw(1, 64).unwrap();
    let b = arena.alloc_raw(13, 64).unwrap();
    let c = arena.alloc_raw(3, 2).unwrap();
    let d = arena.alloc_raw(8, 8).unwrap();

    assert_eq!(a.as_ptr() as usize % 64, 0);
    assert_eq!(b.as_ptr() as usize % 64, 0);
    assert_eq!(c.as_ptr() as usize % 2, 0);
    assert_eq!(d.as_ptr() as usize % 8, 0);
  }

  #[test]
  fn test_invalid_alignment_leaves_cursor() {
    let mut arena = Arena::new(KB).unwrap();
    arena.alloc_raw(3, 1).unwrap();
    let used = arena.used();

    assert_eq!(arena.alloc_raw(8, 0), Err(ArenaError::InvalidAlignment(0)));
    assert_eq!(arena.error(), Some(ArenaError::InvalidAlignment(0)));
    assert_eq!(arena.alloc_raw(8, 3), Err(ArenaError::InvalidAlignment(3)));
    assert_eq!(arena.used(), used);

    assert_eq!(arena.alloc_raw(0, 8), Err(ArenaError::ZeroSize));
    assert_eq!(arena.used(), used);

    arena.alloc_raw(8, 8).unwrap();
    assert_eq!(arena.error(), None);
  }

  #[test]
  fn test_fixed_overflow() {
    let mut arena = Arena::new(2 * KB).unwrap();
    arena.alloc_raw(KB, 8).unwrap();
    let used = arena.used();

    let err = arena.alloc_raw(0x4000, 8).unwrap_err();
    assert!(matches!(err, ArenaError::OutOfMemory { requested: 0x4000, .. }));
    assert_eq!(arena.used(), used);
    assert_eq!(arena.chunk_count(), 1);
    assert_eq!(arena.reserved(), 2 * KB);

    assert!(arena.alloc_raw(KB + 1, 1).is_err());
    assert!(arena.alloc_raw(KB, 1).is_ok());
  }

  #[test]
  fn test_reset_determinism() {
    let mut arena = Arena::new(2 * KB).unwrap();

    let a = arena.alloc_raw(0x400, 64).unwrap();
    arena.reset();
    let b = arena.alloc_raw(0x400, 64).unwrap();

    assert_eq!(a, b);
    assert_eq!(arena.epoch(), 1);
  }

  #[test]
  fn test_non_overlap_stress() {
    let mut arena = Arena::with_config(ArenaConfig::new(MB).flags(ArenaFlags::DEBUG)).unwrap();
    let mut rng = Lcg(7);
    let alignments = [8, 16, 32, 64];
    let mut ranges = Vec::new();

    loop {
      let size = 1 + (rng.next() % 0x1000) as u64;
      let alignment = alignments[(rng.next() % 4) as usize];

      let Ok(ptr) = arena.alloc_raw(size, alignment) else {
        break;
      };

      let start = ptr.as_ptr() as usize;
      assert_eq!(start % alignment, 0);
      ranges.push((start, start + size as usize));
    }

    ranges.sort();
    for pair in ranges.windows(2) {
      assert!(pair[0].1 <= pair[1].0);
    }

    let debug = arena.debug_info();
    assert_eq!(debug.total_allocations, ranges.len() as u64);
    assert!(debug.end > 0);
    assert_eq!(debug.end, arena.chunks[0].cursor());
  }

  #[test]
  fn test_debug_accounting_counts_padding() {
    let mut arena = Arena::new(KB).unwrap();

    arena.alloc_raw(1, 1).unwrap();
    arena.alloc_raw(8, 16).unwrap();

    let debug = arena.debug_info();
    assert_eq!(debug.total_allocations, 2);
    assert_eq!(debug.bytes_lost, 15);
  }

  #[test]
  fn test_debug_accounting_off() {
    let mut arena = Arena::with_config(ArenaConfig::new(KB)).unwrap();
    arena.alloc_raw(1, 1).unwrap();

    assert_eq!(arena.debug_info(), DebugInfo::default());
  }

  #[test]
  fn test_enforce_alignment() {
    let config = ArenaConfig::new(KB).flags(ArenaFlags::ENFORCE_ALIGNMENT);
    let mut arena = Arena::with_config(config).unwrap();

    arena.alloc_raw(1, 1).unwrap();
    let p = arena.alloc_raw(1, 1).unwrap();

    assert_eq!(p.as_ptr() as usize % ALIGN_CACHELINE, 0);
    assert_eq!(arena.alloc_raw(1, 3), Err(ArenaError::InvalidAlignment(3)));
  }

  #[test]
  fn test_zero_fill_flag() {
    let config = ArenaConfig::new(KB).flags(ArenaFlags::ZERO_FILL);
    let mut arena = Arena::with_config(config).unwrap();

    let p = arena.alloc_raw(KB, 1).unwrap();
    let bytes = unsafe { slice::from_raw_parts(p.as_ptr(), KB as usize) };

    assert!(bytes.iter().all(|&b| b == 0));
  }

  #[test]
  fn test_alloc_zero() {
    let mut arena = Arena::new(KB).unwrap();

    let dirty = arena.alloc_raw(64, 8).unwrap();
    unsafe { dirty.as_ptr().write_bytes(0xFF, 64) };
    arena.reset();

    let clean = arena.alloc_zero_raw(64, 8).unwrap();
    assert_eq!(clean, dirty);
    assert!(arena.used_bytes(0).iter().all(|&b| b == 0));
  }

  #[test]
  fn test_typed_helpers() {
    #[derive(Debug, PartialEq)]
    struct Point {
      x: f64,
      y: f64,
    }

    let mut arena = Arena::new(KB).unwrap();

    let p = arena.alloc_value(Point { x: 1.0, y: 2.0 }).unwrap();
    assert_eq!(*p, Point { x: 1.0, y: 2.0 });

    let n = arena.alloc_struct_zero::<u64>().unwrap();
    assert_eq!(n.as_ptr() as usize % mem::align_of::<u64>(), 0);
    assert_eq!(unsafe { *n.as_ptr() }, 0);

    let xs = arena.alloc_array_zero::<u32>(16).unwrap();
    let xs = unsafe { slice::from_raw_parts(xs.as_ptr(), 16) };
    assert_eq!(xs, &[0u32; 16]);

    let ys = arena.alloc_array::<u16>(6).unwrap();
    unsafe {
      for i in 0..6 {
        ys.as_ptr().add(i).write(i as u16 + 1);
      }
      assert_eq!(*ys.as_ptr().add(5), 6);
    }

    assert_eq!(arena.alloc_array::<u8>(0), Err(ArenaError::ZeroSize));
    assert_eq!(arena.alloc_struct::<()>(), Err(ArenaError::ZeroSize));
    assert!(matches!(
      arena.alloc_array::<u64>(usize::MAX),
      Err(ArenaError::OutOfMemory { .. })
    ));
  }

  #[test]
  fn test_destroyed_arena_rejects_allocations() {
    let mut arena = Arena::new(KB).unwrap();
    arena.destroy();

    assert!(matches!(arena.alloc_raw(8, 8), Err(ArenaError::OutOfMemory { .. })));

    let mut empty = Arena::default();
    assert!(empty.is_empty());
    assert!(empty.alloc_raw(8, 8).is_err());
    empty.reset();
    assert_eq!(empty.epoch(), 0);
  }

  #[test]
  fn test_set_growth_contract() {
    let mut arena = Arena::new(KB).unwrap();
    assert!(arena.alloc_raw(2 * KB, 8).is_err());

    arena.set_growth_contract(GrowthContract::Relocate, 0).unwrap();
    assert_eq!(arena.growth_factor(), 2);
    assert!(arena.alloc_raw(2 * KB, 8).is_ok());

    arena.set_growth_contract(GrowthContract::Fixed, 123).unwrap();
    assert_eq!(arena.growth_factor(), 0);

    let mut empty = Arena::default();
    assert!(matches!(
      empty.set_growth_contract(GrowthContract::Append, 0),
      Err(ArenaError::Contract(_))
    ));
  }
}
