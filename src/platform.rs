use std::{
  alloc::{self, Layout},
  ptr::NonNull,
  slice,
  sync::OnceLock,
};

use crate::mem;

/// Chunks at or below this size come from the general purpose heap, bigger
/// ones are mapped as whole pages.
pub const PAGE_ALIGN_THRESHOLD: usize = 0x2000;

/// Fallback when the platform refuses to tell us its page size.
pub const PAGE_DEFAULT_SIZE: usize = 0x1000;

/// Every block handed out by a provider starts at a multiple of this value.
/// Padding for alignments up to this size therefore does not depend on where
/// a block ends up after relocation.
pub const CHUNK_ALIGN: usize = 64;

/// Source of raw backing blocks. The arena only needs to obtain blocks,
/// give them back, and (for relocating growth) trade a block for a larger
/// one that starts with the same bytes.
///
/// Arenas reach their provider through [`AllocKind::provider`], which only
/// knows the built-in [`Heap`] and [`Pages`]. The trait is public so the
/// providers can be used and tested on their own. Implementing it outside
/// this crate does not plug anything into an [`Arena`](crate::Arena).
pub trait PlatformMemory {
  /// Requests a block where `size` bytes can be written safely. Returned
  /// address is aligned to at least [`CHUNK_ALIGN`].
  ///
  /// # Safety
  ///
  /// `size` must be non-zero.
  unsafe fn reserve(
    &self,
    size: usize,
  ) -> Option<NonNull<u8>>;

  /// Gives back a block obtained from [`PlatformMemory::reserve`].
  ///
  /// # Safety
  ///
  /// `block` must come from this provider with exactly `size` bytes and must
  /// not be used afterwards.
  unsafe fn release(
    &self,
    block: NonNull<u8>,
    size: usize,
  );

  /// Replaces `block` with a block of `new_size` bytes whose first `used`
  /// bytes equal the old contents. On failure the old block is untouched and
  /// still owned by the caller.
  ///
  /// # Safety
  ///
  /// Same as [`PlatformMemory::release`] for `block`/`old_size`, plus
  /// `used <= old_size < new_size`.
  unsafe fn regrow(
    &self,
    block: NonNull<u8>,
    old_size: usize,
    used: usize,
    new_size: usize,
  ) -> Option<NonNull<u8>> {
    unsafe {
      let new_block = self.reserve(new_size)?;

      let src = slice::from_raw_parts(block.as_ptr(), used);
      let dst = slice::from_raw_parts_mut(new_block.as_ptr(), used);
      mem::copy(dst, src);

      self.release(block, old_size);

      Some(new_block)
    }
  }
}

/// General purpose heap, used for small chunks.
pub struct Heap;

/// Page granular virtual memory, used for big chunks.
pub struct Pages;

/// Which provider a chunk chain was built with. Decided once when the arena
/// is created and never re-derived afterwards, every chunk of the arena is
/// released through the same path it was obtained from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AllocKind {
  #[default]
  Heap,
  Pages,
  /// Refuses every request. Used to exercise platform failures on arenas
  /// whose chunks came from the heap.
  #[cfg(test)]
  Exhausted,
}

static HEAP: Heap = Heap;
static PAGES: Pages = Pages;

/// Provider whose platform is out of memory. Blocks handed to it for release
/// are returned to the heap, so an arena switched to it after creation still
/// tears down cleanly.
#[cfg(test)]
pub(crate) struct Exhausted;

#[cfg(test)]
static EXHAUSTED: Exhausted = Exhausted;

impl AllocKind {
  /// Picks the provider for a first chunk of `size` bytes.
  pub fn for_size(size: usize) -> Self {
    if size > PAGE_ALIGN_THRESHOLD {
      AllocKind::Pages
    } else {
      AllocKind::Heap
    }
  }

  pub fn provider(self) -> &'static dyn PlatformMemory {
    match self {
      AllocKind::Heap => &HEAP,
      AllocKind::Pages => &PAGES,
      #[cfg(test)]
      AllocKind::Exhausted => &EXHAUSTED,
    }
  }
}

/// Virtual memory page size in bytes, 4096 on most computers. Only known at
/// runtime, so it is queried once and cached.
pub fn page_size() -> usize {
  static PAGE_SIZE: OnceLock<usize> = OnceLock::new();

  *PAGE_SIZE.get_or_init(query_page_size)
}

#[cfg(all(unix, not(miri)))]
fn query_page_size() -> usize {
  match unsafe { libc::sysconf(libc::_SC_PAGESIZE) } {
    size if size > 0 => size as usize,
    _ => PAGE_DEFAULT_SIZE,
  }
}

#[cfg(not(all(unix, not(miri))))]
fn query_page_size() -> usize {
  PAGE_DEFAULT_SIZE
}

fn heap_layout(size: usize) -> Option<Layout> {
  if size == 0 {
    return None;
  }

  Layout::from_size_align(size, CHUNK_ALIGN).ok()
}

impl PlatformMemory for Heap {
  unsafe fn reserve(
    &self,
    size: usize,
  ) -> Option<NonNull<u8>> {
    let layout = heap_layout(size)?;

    NonNull::new(unsafe { alloc::alloc(layout) })
  }

  unsafe fn release(
    &self,
    block: NonNull<u8>,
    size: usize,
  ) {
    if let Some(layout) = heap_layout(size) {
      unsafe { alloc::dealloc(block.as_ptr(), layout) }
    }
  }

  unsafe fn regrow(
    &self,
    block: NonNull<u8>,
    old_size: usize,
    _used: usize,
    new_size: usize,
  ) -> Option<NonNull<u8>> {
    let layout = heap_layout(old_size)?;
    heap_layout(new_size)?;

    // Native resize: may extend in place, otherwise copies the old block.
    NonNull::new(unsafe { alloc::realloc(block.as_ptr(), layout, new_size) })
  }
}

#[cfg(all(unix, not(miri)))]
impl PlatformMemory for Pages {
  unsafe fn reserve(
    &self,
    size: usize,
  ) -> Option<NonNull<u8>> {
    if size == 0 {
      return None;
    }

    let length = align_to!(size, page_size());

    // Memory protection. Read-Write only.
    let protection = libc::PROT_READ | libc::PROT_WRITE;

    // Memory should be private to our process and not mapped to any file.
    let flags = libc::MAP_PRIVATE | libc::MAP_ANONYMOUS;

    match unsafe { libc::mmap(std::ptr::null_mut(), length, protection, flags, -1, 0) } {
      libc::MAP_FAILED => None,
      address => NonNull::new(address.cast()),
    }
  }

  unsafe fn release(
    &self,
    block: NonNull<u8>,
    size: usize,
  ) {
    let length = align_to!(size, page_size());

    if unsafe { libc::munmap(block.as_ptr().cast(), length) } != 0 {
      tracing::warn!(address = ?block, length, "munmap failed, mapping leaked");
    }
  }
}

/// Without `mmap` (or under Miri, which has no FFI) pages are emulated with
/// page aligned heap blocks.
#[cfg(not(all(unix, not(miri))))]
impl PlatformMemory for Pages {
  unsafe fn reserve(
    &self,
    size: usize,
  ) -> Option<NonNull<u8>> {
    if size == 0 {
      return None;
    }

    let layout = Layout::from_size_align(align_to!(size, page_size()), page_size()).ok()?;

    NonNull::new(unsafe { alloc::alloc(layout) })
  }

  unsafe fn release(
    &self,
    block: NonNull<u8>,
    size: usize,
  ) {
    if let Ok(layout) = Layout::from_size_align(align_to!(size, page_size()), page_size()) {
      unsafe { alloc::dealloc(block.as_ptr(), layout) }
    }
  }
}

#[cfg(test)]
impl PlatformMemory for Exhausted {
  unsafe fn reserve(
    &self,
    _size: usize,
  ) -> Option<NonNull<u8>> {
    None
  }

  unsafe fn release(
    &self,
    block: NonNull<u8>,
    size: usize,
  ) {
    unsafe { HEAP.release(block, size) }
  }

  unsafe fn regrow(
    &self,
    _block: NonNull<u8>,
    _old_size: usize,
    _used: usize,
    _new_size: usize,
  ) -> Option<NonNull<u8>> {
    None
  }
}
