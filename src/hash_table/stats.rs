use alloc::vec::Vec;

use super::HashTable;
use super::Slot;
use crate::probe::Probe;

/// Counts of live entries by probe length.
///
/// `bins[n]` is the number of entries that sit `n` probe steps away from
/// their home bucket. The last bin is always non-zero unless the table is
/// empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeHistogram {
    /// Entry counts indexed by probe length.
    pub bins: Vec<usize>,
}

impl ProbeHistogram {
    /// Total number of entries counted.
    pub fn entries(&self) -> usize {
        self.bins.iter().sum()
    }

    /// Longest probe length present, or `None` for an empty table.
    pub fn max_probe(&self) -> Option<usize> {
        self.bins.len().checked_sub(1)
    }

    /// Mean probe length over all entries.
    pub fn mean_probe(&self) -> f64 {
        let entries = self.entries();
        if entries == 0 {
            return 0.0;
        }

        let total: usize = self.bins.iter().enumerate().map(|(len, &n)| len * n).sum();
        total as f64 / entries as f64
    }

    /// Pretty-prints the histogram as a horizontal bar chart on stdout.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        let max = self.bins.iter().copied().max().unwrap_or(0);
        if max == 0 {
            println!("probe histogram: empty");
            return;
        }

        let max_bar = 60usize;
        let total_units = max_bar * 8;
        println!("probe histogram ({} entries):", self.entries());

        let make_bar = |count: usize| -> alloc::string::String {
            if count == 0 {
                return alloc::string::String::new();
            }
            let units = (count as u128 * total_units as u128).div_ceil(max as u128) as usize;
            let mut bar = "█".repeat(units / 8);
            let partial = match units % 8 {
                0 => None,
                1 => Some('▏'),
                2 => Some('▎'),
                3 => Some('▍'),
                4 => Some('▌'),
                5 => Some('▋'),
                6 => Some('▊'),
                7 => Some('▉'),
                _ => unreachable!(),
            };
            bar.extend(partial);
            bar
        };

        for (len, &count) in self.bins.iter().enumerate() {
            println!("{len:>3} | {} ({count})", make_bar(count));
        }
    }
}

/// A snapshot of a table's occupancy for debugging and tuning.
#[derive(Debug, Clone)]
pub struct DebugStats {
    /// Live entries.
    pub len: usize,
    /// Slots allocated.
    pub capacity: usize,
    /// Slots holding a live entry or a tombstone.
    pub used: usize,
    /// Tombstones.
    pub deleted: usize,
    /// Live count at which the next insert grows the table.
    pub growth_threshold: usize,
    /// Live entries over capacity.
    pub occupancy: f64,
    /// Longest probe length of any live entry.
    pub max_probe: usize,
    /// Mean probe length over live entries.
    pub mean_probe: f64,
    /// Bytes held by the slot array.
    pub total_bytes: usize,
    /// Bytes held by slots without a live entry.
    pub wasted_bytes: usize,
}

impl DebugStats {
    /// Pretty-print the debug statistics.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        println!("=== Hash Table Debug Statistics ===");
        println!(
            "Population: {}/{} slots ({:.2}% occupancy, grows at {})",
            self.len,
            self.capacity,
            self.occupancy * 100.0,
            self.growth_threshold
        );
        println!("Slot Usage: {} used, {} tombstones", self.used, self.deleted);
        println!(
            "Probe Length: max {}, mean {:.3}",
            self.max_probe, self.mean_probe
        );
        println!("Total Allocated: {} bytes", self.total_bytes);
        println!(
            "Memory: {} bytes wasted ({:.02}%)",
            self.wasted_bytes,
            if self.total_bytes == 0 {
                0.0
            } else {
                (self.wasted_bytes as f64 / self.total_bytes as f64) * 100.0
            }
        );
    }
}

impl<K, V, C> HashTable<K, V, C> {
    /// Computes a histogram of probe lengths for the current table state.
    ///
    /// The probe length of an entry is the number of steps its home probe
    /// sequence takes to reach the slot it occupies. It is recomputed from
    /// the stored hash, so the comparer is not consulted.
    pub fn probe_histogram(&self) -> ProbeHistogram {
        let mut bins = Vec::new();
        let mask = self.mask();

        for (index, slot) in self.slots.iter().enumerate() {
            let Slot::Occupied { hash, .. } = slot else {
                continue;
            };

            let mut probe = Probe::start(*hash, mask);
            while probe.pos != index {
                debug_assert!(!probe.exhausted());
                probe.next();
            }

            if bins.len() <= probe.len {
                bins.resize(probe.len + 1, 0);
            }
            bins[probe.len] += 1;
        }

        ProbeHistogram { bins }
    }

    /// Returns occupancy and probe-length statistics.
    pub fn debug_stats(&self) -> DebugStats {
        let histogram = self.probe_histogram();
        let slot_size = core::mem::size_of::<Slot<K, V>>();
        let capacity = self.capacity();

        DebugStats {
            len: self.len,
            capacity,
            used: self.used,
            deleted: self.deleted,
            growth_threshold: self.growth_threshold,
            occupancy: self.len as f64 / capacity as f64,
            max_probe: histogram.max_probe().unwrap_or(0),
            mean_probe: histogram.mean_probe(),
            total_bytes: capacity * slot_size,
            wasted_bytes: (capacity - self.len) * slot_size,
        }
    }
}
