use thiserror::Error;

/// Shorter syntax for fallible arena operations.
pub type Result<T> = std::result::Result<T, ArenaError>;

/// Everything that can go wrong while talking to an [`Arena`](crate::Arena).
///
/// A failed call never leaves a half-applied mutation behind, so every
/// variant can be handled locally by retrying with different arguments or by
/// recreating the arena with more room.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArenaError {
  /// Growth is disallowed by the contract, would exceed `max_capacity`, or
  /// the platform could not supply a block.
  #[error("out of memory: requested {requested} bytes, {available} bytes available")]
  OutOfMemory { requested: u64, available: u64 },

  /// Alignment is zero or not a power of two.
  #[error("invalid alignment {0}, must be a non-zero power of two")]
  InvalidAlignment(usize),

  #[error("zero sized allocation")]
  ZeroSize,

  /// The arena was reset or restored after the handle or mark was taken.
  #[error("stale epoch: issued at {issued}, arena is at {current}")]
  StaleEpoch { issued: u64, current: u64 },

  /// Handle is the empty sentinel, or a handle or mark points outside the
  /// chunk chain.
  #[error("invalid memory handle")]
  InvalidHandle,

  /// A bounds-checked primitive touched memory outside the allocated region.
  #[error("range of {count} bytes is outside the allocated region")]
  OutOfBounds { count: usize },

  /// Requested growth contract change cannot be applied to this arena.
  #[error("cannot switch growth contract: {0}")]
  Contract(&'static str),
}
