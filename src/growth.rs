//! Growth policy engine.
//!
//! Called by the allocation path when the current chunk cannot hold a
//! request. Each contract either makes room or fails without touching the
//! arena:
//!
//! ```text
//!   Fixed     ┌──────────┐
//!             │ chunk 0  │  full -> OOM
//!             └──────────┘
//!
//!   Relocate  ┌──────────┐          ┌────────────────────┐
//!             │ chunk 0  │  ──x2──▶ │ chunk 0 (new base) │   data copied
//!             └──────────┘          └────────────────────┘
//!
//!   Append    ┌──────────┐    ┌──────────────┐
//!             │ chunk 0  │ ─▶ │ chunk 1      │   nothing moves
//!             └──────────┘    └──────────────┘
//! ```

use crate::{
  Arena,
  align::{self, ALIGN_DEFAULT},
  chunk::Chunk,
  config::{ArenaFlags, GrowthContract},
  error::Result,
  platform::CHUNK_ALIGN,
  saturate,
};

impl Arena {
  /// Makes room for `size` bytes at `alignment` in the current chunk, or
  /// fails leaving the arena exactly as it was.
  pub(crate) fn grow(
    &mut self,
    size: usize,
    alignment: usize,
  ) -> Result<()> {
    match self.growth_contract {
      GrowthContract::Fixed => return Err(self.out_of_memory(size)),
      GrowthContract::Relocate => self.grow_relocate(size, alignment)?,
      GrowthContract::Append => self.grow_append(size, alignment)?,
    }

    if self.flags.contains(ArenaFlags::RESET_AFTER_GROW) {
      // Keep bumping from the chunk growth just picked.
      let target = self.current;
      self.reset();
      self.current = target;
    }

    Ok(())
  }

  /// Worst case padding in front of an allocation on a fresh block. Blocks
  /// start at [`CHUNK_ALIGN`], so only bigger alignments need slack.
  fn slack(alignment: usize) -> u64 {
    if alignment <= CHUNK_ALIGN {
      0
    } else {
      alignment as u64 - 1
    }
  }

  fn grow_relocate(
    &mut self,
    size: usize,
    alignment: usize,
  ) -> Result<()> {
    let chunk = &self.chunks[self.current];

    let start = if alignment <= CHUNK_ALIGN {
      align::align_up(chunk.offset as u64, alignment)
    } else {
      saturate::sadd(chunk.offset as u64, Self::slack(alignment), u64::MAX)
    };
    let required = saturate::sadd(start, size as u64, u64::MAX);

    if required > self.max_capacity {
      return Err(self.out_of_memory(size));
    }

    let mut capacity = chunk.capacity as u64;
    while capacity < required && capacity < self.max_capacity {
      capacity = saturate::smul(capacity.max(1), self.growth_factor, self.max_capacity);
    }

    if capacity < required {
      return Err(self.out_of_memory(size));
    }

    let (new_capacity, overflow) = saturate::downcast_size(capacity);
    if overflow {
      return Err(self.out_of_memory(size));
    }

    let old_capacity = chunk.capacity;
    let kind = self.alloc_kind;
    let zero_fill = self.flags.contains(ArenaFlags::ZERO_FILL);

    if !self.chunks[self.current].relocate(kind, new_capacity, zero_fill) {
      return Err(self.out_of_memory(size));
    }

    self.reserved = capacity;

    tracing::debug!(
      from = old_capacity,
      to = new_capacity,
      required,
      "arena relocated"
    );

    Ok(())
  }

  fn grow_append(
    &mut self,
    size: usize,
    alignment: usize,
  ) -> Result<()> {
    let needed = saturate::sadd(size as u64, Self::slack(alignment), u64::MAX);

    // After a reset or restore the chain past the cursor is empty and can be
    // reused before asking the platform for more. A reset after growth
    // empties the whole chain, so the search starts from the head.
    let first = if self.flags.contains(ArenaFlags::RESET_AFTER_GROW) {
      0
    } else {
      self.current + 1
    };

    let reusable = (first..self.chunks.len())
      .find(|&index| self.chunks[index].capacity as u64 >= needed);

    if let Some(index) = reusable {
      tracing::debug!(chunk = index, "reusing linked chunk");
      self.current = index;
      return Ok(());
    }

    let capacity = self.growth_factor.max(align::align_up(needed, ALIGN_DEFAULT));

    if saturate::sadd(self.reserved, capacity, u64::MAX) > self.max_capacity {
      return Err(self.out_of_memory(size));
    }

    let (new_capacity, overflow) = saturate::downcast_size(capacity);
    if overflow {
      return Err(self.out_of_memory(size));
    }

    let zero_fill = self.flags.contains(ArenaFlags::ZERO_FILL);
    let Some(chunk) = Chunk::reserve(self.alloc_kind, new_capacity, zero_fill) else {
      return Err(self.out_of_memory(size));
    };

    self.chunks.push(chunk);
    self.current = self.chunks.len() - 1;
    self.reserved += capacity;

    tracing::debug!(
      chunk = self.current,
      capacity = new_capacity,
      reserved = self.reserved,
      "chunk appended"
    );

    Ok(())
  }
}
