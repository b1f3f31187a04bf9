use std::ptr::NonNull;

use rarena::{Arena, ArenaConfig, ArenaError, ArenaFlags, GrowthContract, capacity_str};
use tracing_subscriber::EnvFilter;

/// Prints where an allocation landed relative to the previous one.
fn print_alloc(
  label: &str,
  size: u64,
  alignment: usize,
  address: NonNull<u8>,
) {
  let address = address.as_ptr() as usize;

  println!(
    "[{}] size = {}, align = {}, address = {:#X}, addr % align = {}",
    label,
    size,
    alignment,
    address,
    address % alignment,
  );
}

fn print_arena(
  label: &str,
  arena: &Arena,
) {
  println!(
    "[{}] chunks = {}, used = {}, reserved = {} ({}), epoch = {}",
    label,
    arena.chunk_count(),
    arena.used(),
    arena.reserved(),
    capacity_str(arena.reserved()),
    arena.epoch(),
  );
}

fn main() -> Result<(), ArenaError> {
  // RUST_LOG=rarena=trace shows every committed allocation.
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("rarena=debug")))
    .init();

  // --------------------------------------------------------------------
  // 1) Fixed arena: two u32 land back to back, overflow fails cleanly.
  // --------------------------------------------------------------------
  let mut fixed = Arena::new(4096)?;

  let a = fixed.alloc_raw(4, 4)?;
  let b = fixed.alloc_raw(4, 4)?;
  print_alloc("1a", 4, 4, a);
  print_alloc("1b", 4, 4, b);

  match fixed.alloc_raw(8192, 8) {
    Err(err) => println!("[1] overflow rejected: {}", err),
    Ok(_) => println!("[1] overflow unexpectedly succeeded"),
  }
  print_arena("1", &fixed);

  // --------------------------------------------------------------------
  // 2) Mark and restore: the second allocation after the mark reuses the
  //    address of the first.
  // --------------------------------------------------------------------
  let mark = fixed.mark();
  let scratch = fixed.alloc_raw(128, 16)?;
  fixed.restore(&mark, true)?;
  let again = fixed.alloc_raw(128, 16)?;
  println!("\n[2] same address after restore? {}", scratch == again);

  // --------------------------------------------------------------------
  // 3) Append arena: a new chunk is linked, old addresses stay put.
  // --------------------------------------------------------------------
  let config = ArenaConfig::new(1024)
    .max_capacity(8192)
    .growth(GrowthContract::Append, 4096)
    .flags(ArenaFlags::DEBUG);
  let mut append = Arena::with_config(config)?;

  let first = append.alloc_value(0xDEAD_BEEFu32)?;
  let first = NonNull::from(first);
  append.alloc_raw(2048, 8)?;
  println!("\n[3] first value after growth = {:#X}", unsafe { *first.as_ptr() });
  print_arena("3", &append);

  // --------------------------------------------------------------------
  // 4) Relocate arena: the chunk moves, a handle follows it.
  // --------------------------------------------------------------------
  let config = ArenaConfig::new(1024)
    .max_capacity(1 << 20)
    .growth(GrowthContract::Relocate, 2);
  let mut relocate = Arena::with_config(config)?;

  let handle = relocate.alloc(731, 8)?;
  relocate.bytes_mut(&handle)?[..8].copy_from_slice(b"sentinel");
  let before = relocate.resolve(&handle)?;

  relocate.alloc(999, 8)?;
  relocate.alloc(1024, 8)?;

  let after = relocate.resolve(&handle)?;
  println!(
    "\n[4] moved {:?} -> {:?}, sentinel = {:?}",
    before,
    after,
    String::from_utf8_lossy(&relocate.bytes(&handle)?[..8]),
  );
  print_arena("4", &relocate);

  // --------------------------------------------------------------------
  // 5) Reset invalidates every handle.
  // --------------------------------------------------------------------
  relocate.reset();
  match relocate.resolve(&handle) {
    Err(err) => println!("\n[5] after reset: {}", err),
    Ok(_) => println!("\n[5] handle unexpectedly survived the reset"),
  }

  let text = relocate.strdup(b"bye\0")?;
  println!("[5] strdup -> {:?}", unsafe { std::ffi::CStr::from_ptr(text.as_ptr().cast()) });

  Ok(())
}
