//! The triangular probe sequence shared by every table operation.

/// Mask applied to comparer output before it is stored or used for
/// indexing. Stored hashes always have the top bit of a `u32` clear.
pub const HASH_MASK: u32 = 0x7FFF_FFFF;

/// Reduces a comparer hash to the 31-bit value the table works with.
#[inline(always)]
pub fn reduce(hash: u64) -> u32 {
    hash as u32 & HASH_MASK
}

/// A triangular probe sequence.
///
/// Starting at `hash & mask`, each step moves one slot further than the
/// last: +1, +2, +3, ... so the cumulative displacement runs 1, 3, 6, 10.
/// Over a power-of-two table the first `mask + 1` positions visit every
/// bucket exactly once.
///
/// # Examples
///
/// ```rust
/// use tri_table::probe::Probe;
///
/// let mut probe = Probe::start(5, 7);
/// let mut order = vec![probe.pos];
/// for _ in 1..8 {
///     probe.next();
///     order.push(probe.pos);
/// }
/// assert_eq!(order, [5, 6, 0, 3, 7, 4, 2, 1]);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Probe {
    /// The current bucket.
    pub pos: usize,
    /// Steps taken so far; zero at the starting bucket.
    pub len: usize,
    mask: usize,
}

impl Probe {
    /// Begins a probe for `hash` in a table of `mask + 1` slots.
    #[inline]
    pub fn start(hash: u32, mask: usize) -> Self {
        debug_assert!((mask + 1).is_power_of_two());
        Probe {
            pos: hash as usize & mask,
            len: 0,
            mask,
        }
    }

    /// Advances to the next bucket.
    #[inline]
    pub fn next(&mut self) {
        self.len += 1;
        self.pos = (self.pos + self.len) & self.mask;
    }

    /// Returns `true` once every bucket has been visited.
    ///
    /// Table invariants guarantee an unused slot, so walks terminate well
    /// before this; it exists for debug assertions.
    #[inline]
    pub fn exhausted(&self) -> bool {
        self.len > self.mask
    }
}
