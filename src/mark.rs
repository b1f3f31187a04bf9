use crate::{
  Arena,
  config::GrowthContract,
  error::{ArenaError, Result},
};

/// Written over memory reclaimed by [`Arena::restore`] when poisoning is
/// requested.
pub const POISON_RESET: u8 = 0xDD;

/// Checkpoint of the allocation cursor.
///
/// Only meaningful for the arena and epoch it was taken in. Restoring bumps
/// the epoch, so a mark can be restored at most once.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Mark {
  chunk: usize,
  offset: usize,
  epoch: u64,
}

impl Mark {
  pub fn chunk(&self) -> usize {
    self.chunk
  }

  pub fn offset(&self) -> usize {
    self.offset
  }

  pub fn epoch(&self) -> u64 {
    self.epoch
  }
}

impl Arena {
  /// Captures the current chunk, its cursor and the epoch.
  pub fn mark(&self) -> Mark {
    Mark {
      chunk: self.current,
      offset: self.chunks.get(self.current).map_or(0, |chunk| chunk.offset),
      epoch: self.epoch,
    }
  }

  /// Frees everything allocated since `mark`, keeping what came before.
  ///
  /// The marked chunk's cursor goes back to the marked offset, every chunk
  /// after it is emptied, and allocation resumes in the marked chunk. With
  /// `poison` the reclaimed bytes are overwritten with [`POISON_RESET`]
  /// first.
  ///
  /// Fails with [`ArenaError::StaleEpoch`] if the arena was reset, restored
  /// or reset by growth since the mark was taken. The epoch is bumped on
  /// success, so every handle issued before the restore goes stale.
  pub fn restore(
    &mut self,
    mark: &Mark,
    poison: bool,
  ) -> Result<()> {
    let result = self.rollback(mark, poison);
    self.record(result)
  }

  fn rollback(
    &mut self,
    mark: &Mark,
    poison: bool,
  ) -> Result<()> {
    if mark.epoch != self.epoch {
      return Err(ArenaError::StaleEpoch {
        issued: mark.epoch,
        current: self.epoch,
      });
    }

    let marked = match self.growth_contract {
      GrowthContract::Relocate => 0,
      GrowthContract::Fixed | GrowthContract::Append => mark.chunk,
    };

    match self.chunks.get(marked) {
      Some(chunk) if mark.offset <= chunk.offset => {}
      _ => return Err(ArenaError::InvalidHandle),
    }

    let mut reclaimed = 0;
    for (index, chunk) in self.chunks.iter_mut().enumerate().skip(marked) {
      let keep = if index == marked { mark.offset } else { 0 };

      if poison {
        crate::mem::fill(chunk.storage_mut(keep, chunk.offset - keep), POISON_RESET);
      }

      reclaimed += chunk.offset - keep;
      chunk.offset = keep;
    }

    self.current = marked;
    self.epoch += 1;

    tracing::debug!(
      chunk = marked,
      offset = mark.offset,
      reclaimed,
      poison,
      epoch = self.epoch,
      "arena restored"
    );

    Ok(())
  }
}
