//! Per-table sizing configuration.

use crate::error::Error;
use crate::error::Result;

/// Capacity used when none is requested.
pub const DEFAULT_INITIAL_CAPACITY: usize = 32;

/// Smallest slot array a table will ever allocate.
pub const MIN_CAPACITY: usize = 4;

cfg_if::cfg_if! {
    if #[cfg(feature = "density-ninety")] {
        const DEFAULT_LOAD_FACTOR: LoadFactor = LoadFactor { numerator: 9, denominator: 10 };
    } else if #[cfg(feature = "density-seventy-five")] {
        const DEFAULT_LOAD_FACTOR: LoadFactor = LoadFactor { numerator: 3, denominator: 4 };
    } else {
        const DEFAULT_LOAD_FACTOR: LoadFactor = LoadFactor { numerator: 4, denominator: 5 };
    }
}

/// The fraction of the slot array that live entries may fill before the
/// table doubles.
///
/// Stored as a ratio so threshold math stays in integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadFactor {
    numerator: u32,
    denominator: u32,
}

impl LoadFactor {
    /// Creates a load factor of `numerator / denominator`.
    ///
    /// The ratio must lie strictly between zero and one; a full table would
    /// leave probe walks without a terminating empty slot.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use tri_table::LoadFactor;
    ///
    /// assert!(LoadFactor::new(3, 4).is_ok());
    /// assert!(LoadFactor::new(4, 4).is_err());
    /// assert!(LoadFactor::new(0, 4).is_err());
    /// ```
    pub fn new(numerator: u32, denominator: u32) -> Result<Self> {
        if numerator == 0 || numerator >= denominator {
            return Err(Error::InvalidArgument {
                requested: numerator as usize,
                len: denominator as usize,
            });
        }

        Ok(Self {
            numerator,
            denominator,
        })
    }

    /// Numerator of the ratio.
    pub fn numerator(self) -> u32 {
        self.numerator
    }

    /// Denominator of the ratio.
    pub fn denominator(self) -> u32 {
        self.denominator
    }

    /// The live count at or above which the next insert into a table of
    /// `capacity` slots doubles it.
    ///
    /// This is one below `floor(capacity * ratio)`, kept within
    /// `1..=capacity - 2` so that at least one slot stays unused after the
    /// insert that follows a passing check.
    #[inline]
    pub fn growth_threshold(self, capacity: usize) -> usize {
        debug_assert!(capacity >= MIN_CAPACITY);
        let fill =
            ((capacity as u128 * self.numerator as u128) / self.denominator as u128) as usize;
        fill.saturating_sub(1).clamp(1, capacity - 2)
    }

    /// Smallest slot count whose growth threshold admits `entries` live
    /// entries.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use tri_table::LoadFactor;
    ///
    /// let lf = LoadFactor::new(4, 5).unwrap();
    /// assert_eq!(lf.slots_for(0), 4);
    /// assert_eq!(lf.slots_for(5), 8);
    /// assert_eq!(lf.slots_for(6), 16);
    /// ```
    pub fn slots_for(self, entries: usize) -> usize {
        let mut capacity = MIN_CAPACITY;
        while self.growth_threshold(capacity) < entries {
            capacity = capacity.checked_mul(2).expect("capacity overflow");
        }
        capacity
    }
}

impl Default for LoadFactor {
    fn default() -> Self {
        DEFAULT_LOAD_FACTOR
    }
}

/// Construction-time settings for a [`HashTable`](crate::HashTable).
///
/// # Examples
///
/// ```rust
/// use tri_table::LoadFactor;
/// use tri_table::TableConfig;
///
/// let config = TableConfig::default()
///     .with_initial_capacity(100)
///     .with_load_factor(LoadFactor::new(1, 2).unwrap());
/// assert_eq!(config.initial_capacity(), 100);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableConfig {
    initial_capacity: usize,
    load_factor: LoadFactor,
}

impl TableConfig {
    /// Sets the requested slot count. It is rounded up to a power of two of
    /// at least [`MIN_CAPACITY`] when the table is built.
    pub fn with_initial_capacity(mut self, initial_capacity: usize) -> Self {
        self.initial_capacity = initial_capacity;
        self
    }

    /// Sets the load factor used by the table for its whole lifetime.
    pub fn with_load_factor(mut self, load_factor: LoadFactor) -> Self {
        self.load_factor = load_factor;
        self
    }

    /// The requested slot count.
    pub fn initial_capacity(&self) -> usize {
        self.initial_capacity
    }

    /// The configured load factor.
    pub fn load_factor(&self) -> LoadFactor {
        self.load_factor
    }
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            load_factor: LoadFactor::default(),
        }
    }
}

/// Rounds a requested slot count to the slot array length actually used.
#[inline]
pub(crate) fn capacity_for(requested: usize) -> usize {
    requested
        .max(MIN_CAPACITY)
        .checked_next_power_of_two()
        .expect("capacity overflow")
}
