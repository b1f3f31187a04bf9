//! # rarena - A Region Allocator Library
//!
//! This crate provides an **arena allocator** (also known as a region
//! allocator): a reusable building block that hands out sub-allocations from
//! one or more large backing blocks and reclaims them in bulk instead of one
//! by one.
//!
//! ## Overview
//!
//! Allocation bumps a cursor forward inside the current chunk:
//!
//! ```text
//!   Arena Concept:
//!
//!   ┌──────────────────────────────────────────────────────────────────────┐
//!   │                            CHUNK                                     │
//!   │                                                                      │
//!   │   ┌─────┬──┬─────┬─────┬────┬───────────────────────────────────┐    │
//!   │   │ A1  │░░│ A2  │ A3  │ A4 │            Free Space             │    │
//!   │   └─────┴──┴─────┴─────┴────┴───────────────────────────────────┘    │
//!   │   ▲      ▲                  ▲                                   ▲    │
//!   │   │      │                  │                                   │    │
//!   │  base  padding            offset                            capacity │
//!   │        (alignment)     (next alloc)                                  │
//!   └──────────────────────────────────────────────────────────────────────┘
//!
//!   Each allocation "bumps" the offset forward.
//!   Fast allocation: O(1) - align, compare, add.
//!   Bulk reclaim: reset, restore to a mark, or destroy.
//! ```
//!
//! ## Growth Contracts
//!
//! What happens when the current chunk is full is decided once, at creation,
//! by a [`GrowthContract`]:
//!
//! ```text
//!   Fixed:     ┌──────────┐
//!              │ chunk 0  │ ──▶ OutOfMemory
//!              └──────────┘
//!
//!   Relocate:  ┌──────────┐        ┌──────────────────────┐
//!              │ chunk 0  │ ──x──▶ │ chunk 0 (moved)      │
//!              └──────────┘        └──────────────────────┘
//!              raw addresses die, handles re-resolve
//!
//!   Append:    ┌──────────┐   ┌──────────────┐   ┌──────────────┐
//!              │ chunk 0  │ ─▶│ chunk 1      │ ─▶│ chunk 2      │
//!              └──────────┘   └──────────────┘   └──────────────┘
//!              nothing moves, raw addresses stay valid
//! ```
//!
//! ## Epochs
//!
//! Every [`Arena::reset`] and [`Arena::restore`] bumps the arena epoch.
//! [`MemoryHandle`]s and [`Mark`]s remember the epoch they were issued in and
//! refuse to resolve (or restore) once it moved on:
//!
//! ```text
//!   epoch 0                      epoch 1
//!   ───────────────────┬───────────────────────▶
//!     h = alloc()      │ reset()
//!     resolve(h) -> ok │   resolve(h) -> StaleEpoch
//! ```
//!
//! ## Crate Structure
//!
//! ```text
//!   rarena
//!   ├── align      - Alignment macro (align_to!) and helpers
//!   ├── saturate   - Overflow safe size arithmetic
//!   ├── platform   - Backing block providers (heap, pages)
//!   ├── chunk      - Backing block with its cursor (internal)
//!   ├── config     - ArenaConfig, GrowthContract, ArenaFlags
//!   ├── error      - ArenaError
//!   ├── arena      - Arena lifecycle, allocation, reset
//!   ├── growth     - Growth engine (internal)
//!   ├── handle     - MemoryHandle and resolution
//!   ├── mark       - Mark and restore
//!   └── mem        - copy, fill, strlen and their bounds checked variants
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use rarena::{Arena, ArenaConfig, GrowthContract};
//!
//! let config = ArenaConfig::new(1024)
//!   .max_capacity(1 << 20)
//!   .growth(GrowthContract::Relocate, 2);
//! let mut arena = Arena::with_config(config).unwrap();
//!
//! let handle = arena.alloc(64, 8).unwrap();
//! arena.bytes_mut(&handle).unwrap()[0] = 42;
//!
//! // Forces the chunk to move.
//! arena.alloc(4096, 8).unwrap();
//!
//! assert_eq!(arena.bytes(&handle).unwrap()[0], 42);
//! ```
//!
//! ## Limitations
//!
//! - **Single-threaded only**: `Arena` is neither `Send` nor `Sync`
//! - **No individual frees**: memory comes back in bulk
//! - **Destructors never run** for values moved into the arena
//!
//! ## Safety
//!
//! Raw addresses returned by the `alloc_raw` family are plain pointers. They
//! are valid until the next reset, restore or destroy, and under
//! [`GrowthContract::Relocate`] until the next growth. Hold a
//! [`MemoryHandle`] when that is not enough.

#[macro_use]
pub mod align;
pub mod config;
pub mod error;
pub mod mem;
pub mod platform;
pub mod saturate;

mod arena;
mod chunk;
mod growth;
mod handle;
mod mark;

pub use arena::{Arena, DebugInfo};
pub use config::{
  ArenaConfig, ArenaFlags, CAPACITY_DEFAULT, CAPACITY_MAX, CAPACITY_MIN, GrowthContract, capacity_str,
};
pub use error::{ArenaError, Result};
pub use handle::MemoryHandle;
pub use mark::{Mark, POISON_RESET};
pub use platform::{AllocKind, PlatformMemory, page_size};
