use alloc::boxed::Box;
use core::fmt::Debug;

use crate::comparer::Comparer;
use crate::config::LoadFactor;
use crate::config::TableConfig;
use crate::config::capacity_for;
use crate::error::Error;
use crate::error::Result;
use crate::probe::Probe;
use crate::probe::reduce;

mod entry;
mod iter;
#[cfg(any(test, feature = "stats"))]
mod stats;

pub use entry::Entry;
pub use entry::OccupiedEntry;
pub use entry::VacantEntry;
pub use iter::Cursor;
pub use iter::Drain;
pub use iter::IntoIter;
pub use iter::Iter;
pub use iter::IterMut;
pub use iter::Keys;
pub use iter::Values;
pub use iter::ValuesMut;
#[cfg(any(test, feature = "stats"))]
pub use stats::DebugStats;
#[cfg(any(test, feature = "stats"))]
pub use stats::ProbeHistogram;

/// One position in the slot array.
#[derive(Clone)]
enum Slot<K, V> {
    /// Never held an entry since the last rehash or clear. Terminates
    /// every probe walk.
    Unused,
    /// Held an entry that was removed. Probe walks continue past it.
    Deleted,
    Occupied {
        /// Low 31 bits of the comparer hash.
        hash: u32,
        key: K,
        value: V,
    },
}

impl<K, V> Slot<K, V> {
    #[inline(always)]
    fn is_unused(&self) -> bool {
        matches!(self, Slot::Unused)
    }

    #[inline(always)]
    fn entry(&self) -> Option<(&K, &V)> {
        match self {
            Slot::Occupied { key, value, .. } => Some((key, value)),
            _ => None,
        }
    }

    #[inline(always)]
    fn entry_mut(&mut self) -> Option<(&K, &mut V)> {
        match self {
            Slot::Occupied { key, value, .. } => Some((key, value)),
            _ => None,
        }
    }
}

impl<K: Debug, V: Debug> Debug for Slot<K, V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Slot::Unused => f.write_str(".."),
            Slot::Deleted => f.write_str("<deleted>"),
            Slot::Occupied { hash, key, value } => {
                write!(f, "{hash:08x} {key:?} => {value:?}")
            }
        }
    }
}

/// Where a probe walk ended.
enum Probed {
    /// The key lives at this index.
    Found(usize),
    /// The key is absent; this is where it should go.
    Vacant(usize),
}

fn alloc_slots<K, V>(capacity: usize) -> Box<[Slot<K, V>]> {
    (0..capacity).map(|_| Slot::Unused).collect()
}

/// An open-addressing hash table with triangular probing and tombstone
/// deletion.
///
/// `HashTable<K, V, C>` maps keys of type `K` to values of type `V`, hashing
/// and comparing keys through the [`Comparer`] `C` supplied at construction.
/// Entries live directly in a power-of-two slot array; removing an entry
/// leaves a tombstone so that probe chains running through it stay intact.
/// Tombstones are reused by later inserts and dropped wholesale whenever the
/// array is rebuilt.
///
/// ## Example
///
/// ```rust
/// use tri_table::HashComparer;
/// use tri_table::HashTable;
/// use tri_table::error::Error;
/// # use siphasher::sip::SipHasher;
/// # #[derive(Default)]
/// # struct SipBuilder;
/// # impl core::hash::BuildHasher for SipBuilder {
/// #     type Hasher = SipHasher;
/// #     fn build_hasher(&self) -> SipHasher {
/// #         SipHasher::new()
/// #     }
/// # }
///
/// let mut table = HashTable::with_capacity(4, HashComparer::new(SipBuilder));
/// table.add(1, "a").unwrap();
/// table.add(2, "b").unwrap();
/// table.add(3, "c").unwrap();
/// assert_eq!(table.capacity(), 8);
///
/// assert_eq!(table.try_get(&2), Some(&"b"));
/// assert_eq!(table.remove(&2), Ok(true));
/// assert_eq!(table.try_get(&2), None);
/// assert_eq!(table.len(), 2);
///
/// assert_eq!(table.add(1, "z"), Err(Error::DuplicateKey));
/// ```
#[derive(Clone)]
pub struct HashTable<K, V, C> {
    slots: Box<[Slot<K, V>]>,

    len: usize,
    used: usize,
    deleted: usize,
    growth_threshold: usize,
    load_factor: LoadFactor,
    version: u64,

    comparer: C,
}

impl<K, V, C> Debug for HashTable<K, V, C>
where
    K: Debug,
    V: Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HashTable")
            .field("len", &self.len)
            .field("used", &self.used)
            .field("deleted", &self.deleted)
            .field("capacity", &self.capacity())
            .field("growth_threshold", &self.growth_threshold)
            .field("slots", &self.slots)
            .finish()
    }
}

impl<K, V, C> HashTable<K, V, C> {
    /// Creates an empty table with the default configuration: 32 slots and
    /// the crate's default load factor.
    pub fn new(comparer: C) -> Self {
        Self::with_config(TableConfig::default(), comparer)
    }

    /// Creates an empty table with room for at least `capacity` slots.
    ///
    /// The slot count is rounded up to a power of two, and is never below 4.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use tri_table::HashComparer;
    /// # use tri_table::HashTable;
    /// # use tri_table::DefaultHashBuilder;
    /// let table: HashTable<u32, u32, _> =
    ///     HashTable::with_capacity(100, HashComparer::<DefaultHashBuilder>::default());
    /// assert_eq!(table.capacity(), 128);
    ///
    /// let tiny: HashTable<u32, u32, _> =
    ///     HashTable::with_capacity(1, HashComparer::<DefaultHashBuilder>::default());
    /// assert_eq!(tiny.capacity(), 4);
    /// ```
    pub fn with_capacity(capacity: usize, comparer: C) -> Self {
        Self::with_config(TableConfig::default().with_initial_capacity(capacity), comparer)
    }

    /// Creates an empty table from an explicit [`TableConfig`].
    pub fn with_config(config: TableConfig, comparer: C) -> Self {
        let capacity = capacity_for(config.initial_capacity());
        let load_factor = config.load_factor();

        Self {
            slots: alloc_slots(capacity),
            len: 0,
            used: 0,
            deleted: 0,
            growth_threshold: load_factor.growth_threshold(capacity),
            load_factor,
            version: 0,
            comparer,
        }
    }

    /// Returns the number of live entries.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the table holds no live entries.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the length of the slot array. Always a power of two.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns the comparer the table was built with.
    pub fn comparer(&self) -> &C {
        &self.comparer
    }

    /// Returns the load factor the table was built with.
    pub fn load_factor(&self) -> LoadFactor {
        self.load_factor
    }

    /// Returns the live count at or above which the next insert doubles the
    /// slot array.
    pub fn growth_threshold(&self) -> usize {
        self.growth_threshold
    }

    /// Returns the number of tombstones currently in the slot array.
    pub fn deleted_count(&self) -> usize {
        self.deleted
    }

    /// Returns the number of slots that are not unused: live entries plus
    /// tombstones.
    pub fn used_count(&self) -> usize {
        self.used
    }

    /// Returns the structural version stamp.
    ///
    /// Bumped by every insert of a new key, every removal, every clear and
    /// every rehash. Overwriting the value of an existing key is not a
    /// structural change by itself, but [`set`](Self::set) and
    /// [`entry`](Self::entry) check capacity before probing. At the growth
    /// threshold, or with enough tombstones, that check rehashes the table
    /// and bumps the version even when the key turns out to be present.
    pub fn version(&self) -> u64 {
        self.version
    }

    #[inline(always)]
    fn mask(&self) -> usize {
        self.slots.len() - 1
    }

    #[inline(always)]
    fn bump_version(&mut self) {
        self.version = self.version.wrapping_add(1);
    }

    /// Resets every slot to unused without reallocating.
    ///
    /// All entries are dropped; capacity is unchanged.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use tri_table::HashComparer;
    /// # use tri_table::HashTable;
    /// # use tri_table::DefaultHashBuilder;
    /// let mut table = HashTable::new(HashComparer::<DefaultHashBuilder>::default());
    /// for i in 0..100 {
    ///     table.add(i, i).unwrap();
    /// }
    /// let capacity = table.capacity();
    ///
    /// table.clear();
    /// assert!(table.is_empty());
    /// assert_eq!(table.capacity(), capacity);
    /// ```
    pub fn clear(&mut self) {
        if self.used > 0 {
            for slot in self.slots.iter_mut() {
                *slot = Slot::Unused;
            }
        }

        self.len = 0;
        self.used = 0;
        self.deleted = 0;
        self.bump_version();
    }

    /// Ensures the slot array holds at least `minimum_capacity` slots,
    /// doubling as often as needed and rehashing once.
    ///
    /// Does nothing if the table is already large enough.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use tri_table::HashComparer;
    /// # use tri_table::HashTable;
    /// # use tri_table::DefaultHashBuilder;
    /// let mut table: HashTable<u32, u32, _> =
    ///     HashTable::with_capacity(8, HashComparer::<DefaultHashBuilder>::default());
    /// table.reserve(100);
    /// assert_eq!(table.capacity(), 128);
    ///
    /// table.reserve(10);
    /// assert_eq!(table.capacity(), 128);
    /// ```
    pub fn reserve(&mut self, minimum_capacity: usize) {
        let mut capacity = self.capacity();
        if capacity >= minimum_capacity {
            return;
        }

        while capacity < minimum_capacity {
            capacity = capacity.checked_mul(2).expect("capacity overflow");
        }
        self.grow(capacity);
    }

    /// Ensures `additional` more entries can be inserted without the table
    /// growing.
    pub fn reserve_additional(&mut self, additional: usize) {
        let required = self.len.checked_add(additional).expect("capacity overflow");
        let capacity = self.fitted_capacity(required, required);
        if capacity > self.capacity() {
            self.grow(capacity);
        }
    }

    /// Shrinks the slot array to the smallest power of two that fits the
    /// live entries, dropping all tombstones on the way.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use tri_table::HashComparer;
    /// # use tri_table::HashTable;
    /// # use tri_table::DefaultHashBuilder;
    /// let mut table = HashTable::with_capacity(1024, HashComparer::<DefaultHashBuilder>::default());
    /// table.add("a", 1).unwrap();
    /// table.add("b", 2).unwrap();
    ///
    /// table.shrink();
    /// assert_eq!(table.capacity(), 4);
    /// assert_eq!(table.try_get(&"b"), Some(&2));
    /// ```
    pub fn shrink(&mut self) {
        self.shrink_rehash(self.len);
    }

    /// Shrinks the slot array towards `target` slots.
    ///
    /// The resulting capacity is the smallest power of two of at least
    /// `max(target, 4)` that still fits the live entries under the load
    /// factor. The table never grows here.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `target` is smaller than the
    /// number of live entries.
    pub fn shrink_to(&mut self, target: usize) -> Result<()> {
        if target < self.len {
            return Err(Error::InvalidArgument {
                requested: target,
                len: self.len,
            });
        }

        self.shrink_rehash(target);
        Ok(())
    }

    fn shrink_rehash(&mut self, target: usize) {
        let capacity = self.fitted_capacity(target, self.len).min(self.capacity());
        if capacity < self.capacity() || self.deleted > 0 {
            log::trace!(
                "shrinking table towards {target} slots: {} -> {capacity}",
                self.capacity()
            );
            self.rehash(capacity);
        }
    }

    /// Smallest capacity of at least `target` slots whose growth threshold
    /// admits `entries` live entries.
    fn fitted_capacity(&self, target: usize, entries: usize) -> usize {
        capacity_for(target).max(self.load_factor.slots_for(entries))
    }

    /// Checked before every insertion.
    #[inline]
    fn grow_if_needed(&mut self) {
        if self.len >= self.growth_threshold {
            self.grow(self.capacity() * 2);
        } else if self.used >= self.growth_threshold {
            log::trace!(
                "purging {} tombstones from {} slots",
                self.deleted,
                self.capacity()
            );
            self.rehash(self.capacity());
        }
    }

    #[cold]
    fn grow(&mut self, new_capacity: usize) {
        debug_assert!(new_capacity >= self.capacity());
        self.rehash(capacity_for(new_capacity));
    }

    /// Moves every live entry into a fresh array of `capacity` slots.
    ///
    /// Entries are placed with their stored hash, so the comparer is not
    /// consulted. Tombstones are not carried over.
    fn rehash(&mut self, capacity: usize) {
        debug_assert!(capacity.is_power_of_two());
        debug_assert!(capacity > self.len);

        let old_slots = core::mem::replace(&mut self.slots, alloc_slots(capacity));
        let old_capacity = old_slots.len();
        let purged = self.deleted;
        let mask = capacity - 1;

        for slot in old_slots.into_vec() {
            if let Slot::Occupied { hash, key, value } = slot {
                let index = find_unused(&self.slots, hash, mask);
                self.slots[index] = Slot::Occupied { hash, key, value };
            }
        }

        self.used = self.len;
        self.deleted = 0;
        self.growth_threshold = self.load_factor.growth_threshold(capacity);
        self.bump_version();

        log::debug!(
            "rehashed table: {old_capacity} -> {capacity} slots, {} entries, {purged} tombstones dropped",
            self.len
        );
    }

    /// Marks `index` occupied, updating counters from its previous tag.
    fn occupy(&mut self, index: usize, hash: u32, key: K, value: V) -> &mut V {
        match self.slots[index] {
            Slot::Unused => self.used += 1,
            Slot::Deleted => self.deleted -= 1,
            Slot::Occupied { .. } => unreachable!("occupying a live slot"),
        }
        self.len += 1;
        self.bump_version();

        self.slots[index] = Slot::Occupied { hash, key, value };
        match &mut self.slots[index] {
            Slot::Occupied { value, .. } => value,
            _ => unreachable!(),
        }
    }

    /// Turns the live entry at `index` into a tombstone and returns it.
    fn vacate(&mut self, index: usize) -> (K, V) {
        let Slot::Occupied { key, value, .. } =
            core::mem::replace(&mut self.slots[index], Slot::Deleted)
        else {
            unreachable!("vacating a slot without an entry")
        };

        self.len -= 1;
        self.deleted += 1;
        self.bump_version();
        (key, value)
    }

    /// Removes every entry for which `keep` returns `false`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use tri_table::HashComparer;
    /// # use tri_table::HashTable;
    /// # use tri_table::DefaultHashBuilder;
    /// let mut table = HashTable::new(HashComparer::<DefaultHashBuilder>::default());
    /// for i in 0..10 {
    ///     table.add(i, i * 10).unwrap();
    /// }
    /// table.retain(|k, _| k % 2 == 0);
    /// assert_eq!(table.len(), 5);
    /// assert_eq!(table.try_get(&3), None);
    /// ```
    pub fn retain(&mut self, mut keep: impl FnMut(&K, &mut V) -> bool) {
        for index in 0..self.slots.len() {
            let drop_entry = match self.slots[index].entry_mut() {
                Some((key, value)) => !keep(key, value),
                None => false,
            };
            if drop_entry {
                self.vacate(index);
            }
        }
    }
}

/// Probe to the first unused slot. Only valid while filling a fresh array,
/// where keys are already known to be unique.
fn find_unused<K, V>(slots: &[Slot<K, V>], hash: u32, mask: usize) -> usize {
    let mut probe = Probe::start(hash, mask);
    while !slots[probe.pos].is_unused() {
        debug_assert!(!probe.exhausted());
        probe.next();
    }
    probe.pos
}

impl<K, V, C> HashTable<K, V, C>
where
    C: Comparer<K>,
{
    #[inline]
    fn check_key(&self, key: &K) -> Result<()> {
        if self.comparer.is_null(key) {
            return Err(Error::NullKey);
        }
        Ok(())
    }

    #[inline(always)]
    fn hash(&self, key: &K) -> u32 {
        reduce(self.comparer.hash(key))
    }

    /// Lookup walk: stops at a matching entry or the first unused slot.
    fn find_index(&self, hash: u32, key: &K) -> Option<usize> {
        let mut probe = Probe::start(hash, self.mask());
        loop {
            match &self.slots[probe.pos] {
                Slot::Unused => return None,
                Slot::Occupied {
                    hash: stored,
                    key: candidate,
                    ..
                } if *stored == hash && self.comparer.equals(candidate, key) => {
                    return Some(probe.pos);
                }
                _ => {}
            }

            debug_assert!(!probe.exhausted());
            probe.next();
        }
    }

    /// Insertion walk: like [`find_index`](Self::find_index), but an absent
    /// key resolves to the first tombstone passed on the way, or to the
    /// terminating unused slot if there was none.
    fn find_insert_slot(&self, hash: u32, key: &K) -> Probed {
        let mut probe = Probe::start(hash, self.mask());
        let mut first_deleted = None;
        loop {
            match &self.slots[probe.pos] {
                Slot::Unused => return Probed::Vacant(first_deleted.unwrap_or(probe.pos)),
                Slot::Deleted => {
                    first_deleted.get_or_insert(probe.pos);
                }
                Slot::Occupied {
                    hash: stored,
                    key: candidate,
                    ..
                } => {
                    if *stored == hash && self.comparer.equals(candidate, key) {
                        return Probed::Found(probe.pos);
                    }
                }
            }

            debug_assert!(!probe.exhausted());
            probe.next();
        }
    }

    /// Inserts a new entry, failing if the key is already present.
    ///
    /// Returns a mutable reference to the inserted value.
    ///
    /// # Errors
    ///
    /// - [`Error::NullKey`] if the comparer reports `key` as null.
    /// - [`Error::DuplicateKey`] if an equal key is present. The table is
    ///   left unchanged.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use tri_table::HashComparer;
    /// # use tri_table::HashTable;
    /// # use tri_table::DefaultHashBuilder;
    /// # use tri_table::error::Error;
    /// let mut table = HashTable::new(HashComparer::<DefaultHashBuilder>::default());
    /// *table.add("k", 1).unwrap() += 1;
    /// assert_eq!(table.try_get(&"k"), Some(&2));
    /// assert_eq!(table.add("k", 5), Err(Error::DuplicateKey));
    /// ```
    pub fn add(&mut self, key: K, value: V) -> Result<&mut V> {
        self.check_key(&key)?;
        let hash = self.hash(&key);
        if self.find_index(hash, &key).is_some() {
            return Err(Error::DuplicateKey);
        }

        self.grow_if_needed();
        match self.find_insert_slot(hash, &key) {
            Probed::Vacant(index) => Ok(self.occupy(index, hash, key, value)),
            Probed::Found(_) => unreachable!("key appeared during growth"),
        }
    }

    /// Inserts or overwrites the value for `key`.
    ///
    /// Returns the previous value if the key was present.
    ///
    /// Growth is checked before the key is looked up, so overwriting an
    /// existing key in a table at its growth threshold still doubles it.
    ///
    /// # Errors
    ///
    /// [`Error::NullKey`] if the comparer reports `key` as null.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use tri_table::HashComparer;
    /// # use tri_table::HashTable;
    /// # use tri_table::DefaultHashBuilder;
    /// let mut table = HashTable::new(HashComparer::<DefaultHashBuilder>::default());
    /// assert_eq!(table.set(37, "a"), Ok(None));
    /// assert_eq!(table.set(37, "b"), Ok(Some("a")));
    /// assert_eq!(table.try_get(&37), Some(&"b"));
    /// ```
    pub fn set(&mut self, key: K, value: V) -> Result<Option<V>> {
        self.check_key(&key)?;
        self.grow_if_needed();

        let hash = self.hash(&key);
        match self.find_insert_slot(hash, &key) {
            Probed::Found(index) => match &mut self.slots[index] {
                Slot::Occupied { value: old, .. } => Ok(Some(core::mem::replace(old, value))),
                _ => unreachable!(),
            },
            Probed::Vacant(index) => {
                self.occupy(index, hash, key, value);
                Ok(None)
            }
        }
    }

    /// Gets the entry for `key` for in-place manipulation.
    ///
    /// Growth is checked up front, so inserting through a vacant entry never
    /// resizes.
    ///
    /// # Errors
    ///
    /// [`Error::NullKey`] if the comparer reports `key` as null.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use tri_table::HashComparer;
    /// # use tri_table::HashTable;
    /// # use tri_table::DefaultHashBuilder;
    /// let mut table = HashTable::new(HashComparer::<DefaultHashBuilder>::default());
    /// for word in ["a", "b", "a"] {
    ///     *table.entry(word).unwrap().or_insert(0) += 1;
    /// }
    /// assert_eq!(table.try_get(&"a"), Some(&2));
    /// ```
    pub fn entry(&mut self, key: K) -> Result<Entry<'_, K, V, C>> {
        self.check_key(&key)?;
        self.grow_if_needed();

        let hash = self.hash(&key);
        Ok(match self.find_insert_slot(hash, &key) {
            Probed::Found(index) => Entry::Occupied(OccupiedEntry::new(self, index)),
            Probed::Vacant(index) => Entry::Vacant(VacantEntry::new(self, index, hash, key)),
        })
    }

    /// Returns the value for `key`.
    ///
    /// # Errors
    ///
    /// - [`Error::NullKey`] if the comparer reports `key` as null.
    /// - [`Error::KeyNotFound`] if the key is absent.
    pub fn get(&self, key: &K) -> Result<&V> {
        self.check_key(key)?;
        self.try_get(key).ok_or(Error::KeyNotFound)
    }

    /// Returns the value for `key`, or `None` if it is absent.
    ///
    /// Never fails and never mutates the table. A null key is simply absent.
    pub fn try_get(&self, key: &K) -> Option<&V> {
        self.get_key_value(key).map(|(_, v)| v)
    }

    /// Returns the stored key and value for `key`.
    pub fn get_key_value(&self, key: &K) -> Option<(&K, &V)> {
        if self.len == 0 || self.comparer.is_null(key) {
            return None;
        }

        let index = self.find_index(self.hash(key), key)?;
        self.slots[index].entry()
    }

    /// Returns a mutable reference to the value for `key`.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        if self.len == 0 || self.comparer.is_null(key) {
            return None;
        }

        let index = self.find_index(self.hash(key), key)?;
        self.slots[index].entry_mut().map(|(_, v)| v)
    }

    /// Returns `true` if `key` is present.
    ///
    /// # Errors
    ///
    /// [`Error::NullKey`] if the comparer reports `key` as null.
    pub fn contains(&self, key: &K) -> Result<bool> {
        self.check_key(key)?;
        Ok(self.try_get(key).is_some())
    }

    /// Removes `key`, leaving a tombstone in its slot.
    ///
    /// Returns `true` if an entry was removed; `false` leaves the table
    /// untouched.
    ///
    /// # Errors
    ///
    /// [`Error::NullKey`] if the comparer reports `key` as null.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use tri_table::HashComparer;
    /// # use tri_table::HashTable;
    /// # use tri_table::DefaultHashBuilder;
    /// let mut table = HashTable::new(HashComparer::<DefaultHashBuilder>::default());
    /// table.add(42, "x").unwrap();
    ///
    /// assert_eq!(table.remove(&42), Ok(true));
    /// assert_eq!(table.remove(&42), Ok(false));
    /// assert_eq!(table.deleted_count(), 1);
    /// ```
    pub fn remove(&mut self, key: &K) -> Result<bool> {
        Ok(self.take(key)?.is_some())
    }

    /// Removes `key` and returns the stored key and value.
    ///
    /// # Errors
    ///
    /// [`Error::NullKey`] if the comparer reports `key` as null.
    pub fn take(&mut self, key: &K) -> Result<Option<(K, V)>> {
        self.check_key(key)?;
        if self.len == 0 {
            return Ok(None);
        }

        Ok(self
            .find_index(self.hash(key), key)
            .map(|index| self.vacate(index)))
    }
}
