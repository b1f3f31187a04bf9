use std::ops::{BitOr, BitOrAssign};

pub const KB: u64 = 0x400;
pub const MB: u64 = KB * 0x400;
pub const GB: u64 = MB * 0x400;

pub const CAPACITY_MIN: u64 = 512;
pub const CAPACITY_DEFAULT: u64 = 4 * KB;
pub const CAPACITY_MAX: u64 = 8 * GB;

/// Multiplier used by [`GrowthContract::Relocate`] when none is given.
pub const GROWTH_FACTOR_RELOCATE: u64 = 2;
pub const GROWTH_FACTOR_RELOCATE_MAX: u64 = 16;

/// Chunk size used by [`GrowthContract::Append`] when none is given.
pub const GROWTH_FACTOR_APPEND: u64 = 4 * KB;

/// How an arena acquires more backing storage once its last chunk is full.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GrowthContract {
  /// Never grows. Overflow fails in O(1).
  #[default]
  Fixed,
  /// Single chunk, multiplied by the growth factor until big enough. Moves
  /// the data, so raw addresses die and only handles survive.
  Relocate,
  /// Links new chunks of `max(growth_factor, request)` bytes. Nothing moves.
  Append,
}

/// Behavioural switches, independently combinable with `|`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ArenaFlags(u32);

impl ArenaFlags {
  pub const NONE: Self = Self(0);
  /// Zero every freshly obtained backing region.
  pub const ZERO_FILL: Self = Self(1);
  /// Track end address, alignment loss and allocation count.
  pub const DEBUG: Self = Self(1 << 1);
  /// Ignore caller alignment and align everything to a cache line.
  pub const ENFORCE_ALIGNMENT: Self = Self(1 << 2);
  /// Reset the arena right after every successful growth.
  pub const RESET_AFTER_GROW: Self = Self(1 << 3);

  #[inline]
  pub const fn contains(
    self,
    other: Self,
  ) -> bool {
    self.0 & other.0 == other.0
  }

  #[inline]
  pub const fn bits(self) -> u32 {
    self.0
  }
}

impl BitOr for ArenaFlags {
  type Output = Self;

  fn bitor(
    self,
    rhs: Self,
  ) -> Self {
    Self(self.0 | rhs.0)
  }
}

impl BitOrAssign for ArenaFlags {
  fn bitor_assign(
    &mut self,
    rhs: Self,
  ) {
    self.0 |= rhs.0;
  }
}

/// Policy bundle consumed by [`Arena::with_config`](crate::Arena::with_config).
///
/// Zero means "pick for me" for `capacity`, `max_capacity` and
/// `growth_factor`. The values are normalised once at creation, see
/// [`ArenaConfig::normalized`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArenaConfig {
  pub capacity: u64,
  pub max_capacity: u64,
  pub growth_contract: GrowthContract,
  /// Multiplier for `Relocate`, chunk size in bytes for `Append`.
  pub growth_factor: u64,
  pub flags: ArenaFlags,
}

impl Default for ArenaConfig {
  fn default() -> Self {
    Self::new(CAPACITY_DEFAULT)
  }
}

impl ArenaConfig {
  pub fn new(capacity: u64) -> Self {
    Self {
      capacity,
      max_capacity: 0,
      growth_contract: GrowthContract::Fixed,
      growth_factor: 0,
      flags: ArenaFlags::NONE,
    }
  }

  pub fn max_capacity(
    mut self,
    max_capacity: u64,
  ) -> Self {
    self.max_capacity = max_capacity;
    self
  }

  pub fn growth(
    mut self,
    contract: GrowthContract,
    factor: u64,
  ) -> Self {
    self.growth_contract = contract;
    self.growth_factor = factor;
    self
  }

  pub fn flags(
    mut self,
    flags: ArenaFlags,
  ) -> Self {
    self.flags = flags;
    self
  }

  /// Fills in defaults and clamps every field into its valid range.
  ///
  /// * capacity 0 becomes [`CAPACITY_DEFAULT`].
  /// * `Fixed` caps at the capacity itself unless told otherwise.
  /// * growing contracts default to [`CAPACITY_MAX`].
  /// * `max_capacity` never ends up below `capacity`.
  pub fn normalized(mut self) -> Self {
    if self.capacity == 0 {
      self.capacity = CAPACITY_DEFAULT;
    }

    if self.max_capacity == 0 {
      self.max_capacity = match self.growth_contract {
        GrowthContract::Fixed => self.capacity,
        GrowthContract::Relocate | GrowthContract::Append => CAPACITY_MAX,
      };
    }

    self.max_capacity = self.max_capacity.max(self.capacity);
    self.growth_factor = clamp_growth_factor(self.growth_contract, self.growth_factor, self.max_capacity);

    self
  }
}

/// Applies the per contract default and valid range to a growth factor.
pub(crate) fn clamp_growth_factor(
  contract: GrowthContract,
  factor: u64,
  max_capacity: u64,
) -> u64 {
  match contract {
    GrowthContract::Fixed => 0,
    GrowthContract::Relocate if factor == 0 => GROWTH_FACTOR_RELOCATE,
    GrowthContract::Relocate => factor.clamp(GROWTH_FACTOR_RELOCATE, GROWTH_FACTOR_RELOCATE_MAX),
    GrowthContract::Append if factor == 0 => GROWTH_FACTOR_APPEND.min(max_capacity.max(CAPACITY_MIN)),
    GrowthContract::Append => factor.clamp(CAPACITY_MIN, max_capacity.max(CAPACITY_MIN)),
  }
}

/// Human readable name of a standard capacity, `"Custom"` for anything else.
pub fn capacity_str(capacity: u64) -> &'static str {
  match capacity {
    0x200 => "512B",
    0x400 => "1KB",
    0x800 => "2KB",
    0x1000 => "4KB",
    0x2000 => "8KB",
    0x4000 => "16KB",
    0x8000 => "32KB",
    0x10000 => "64KB",
    0x20000 => "128KB",
    0x40000 => "256KB",
    0x80000 => "512KB",
    0x100000 => "1MB",
    0x200000 => "2MB",
    0x400000 => "4MB",
    0x800000 => "8MB",
    0x1000000 => "16MB",
    0x2000000 => "32MB",
    0x4000000 => "64MB",
    0x8000000 => "128MB",
    0x10000000 => "256MB",
    0x20000000 => "512MB",
    0x40000000 => "1GB",
    0x80000000 => "2GB",
    0x100000000 => "4GB",
    0x200000000 => "8GB",
    _ => "Custom",
  }
}
