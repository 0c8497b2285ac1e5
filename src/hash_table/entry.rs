use super::HashTable;
use super::Slot;

/// A view into a single entry of a [`HashTable`], which may be vacant or
/// occupied.
///
/// Constructed by [`HashTable::entry`].
///
/// # Examples
///
/// ```rust
/// # use tri_table::HashComparer;
/// # use tri_table::HashTable;
/// # use tri_table::DefaultHashBuilder;
/// use tri_table::hash_table::Entry;
///
/// let mut table = HashTable::new(HashComparer::<DefaultHashBuilder>::default());
/// match table.entry("hello").unwrap() {
///     Entry::Vacant(entry) => {
///         entry.insert(1);
///     }
///     Entry::Occupied(mut entry) => {
///         *entry.get_mut() += 1;
///     }
/// }
/// assert_eq!(table.try_get(&"hello"), Some(&1));
/// ```
pub enum Entry<'a, K, V, C> {
    /// The key is absent.
    Vacant(VacantEntry<'a, K, V, C>),
    /// The key is present.
    Occupied(OccupiedEntry<'a, K, V, C>),
}

impl<'a, K, V, C> Entry<'a, K, V, C> {
    /// Inserts `default` if the entry is vacant, then returns a mutable
    /// reference to the value.
    pub fn or_insert(self, default: V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default),
        }
    }

    /// Like [`or_insert`](Self::or_insert), computing the value only when
    /// needed.
    pub fn or_insert_with(self, default: impl FnOnce() -> V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default()),
        }
    }

    /// Runs `f` on the value if the entry is occupied.
    pub fn and_modify(self, f: impl FnOnce(&mut V)) -> Self {
        match self {
            Entry::Occupied(mut entry) => {
                f(entry.get_mut());
                Entry::Occupied(entry)
            }
            Entry::Vacant(entry) => Entry::Vacant(entry),
        }
    }

    /// Returns the key this entry is for.
    pub fn key(&self) -> &K {
        match self {
            Entry::Occupied(entry) => entry.key(),
            Entry::Vacant(entry) => entry.key(),
        }
    }
}

impl<'a, K, V, C> Entry<'a, K, V, C>
where
    V: Default,
{
    /// Inserts `V::default()` if the entry is vacant.
    pub fn or_default(self) -> &'a mut V {
        self.or_insert_with(Default::default)
    }
}

/// A vacant entry: the key is absent and its insertion slot is known.
pub struct VacantEntry<'a, K, V, C> {
    table: &'a mut HashTable<K, V, C>,
    index: usize,
    hash: u32,
    key: K,
}

impl<'a, K, V, C> VacantEntry<'a, K, V, C> {
    pub(super) fn new(table: &'a mut HashTable<K, V, C>, index: usize, hash: u32, key: K) -> Self {
        Self {
            table,
            index,
            hash,
            key,
        }
    }

    /// The key that will be inserted.
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Gives the key back without inserting.
    pub fn into_key(self) -> K {
        self.key
    }

    /// Inserts `value` and returns a mutable reference to it.
    pub fn insert(self, value: V) -> &'a mut V {
        let table = self.table;
        table.occupy(self.index, self.hash, self.key, value)
    }
}

/// An occupied entry: the key is present at a known slot.
pub struct OccupiedEntry<'a, K, V, C> {
    table: &'a mut HashTable<K, V, C>,
    index: usize,
}

impl<'a, K, V, C> OccupiedEntry<'a, K, V, C> {
    pub(super) fn new(table: &'a mut HashTable<K, V, C>, index: usize) -> Self {
        debug_assert!(table.slots[index].entry().is_some());
        Self { table, index }
    }

    fn slot(&self) -> (&K, &V) {
        match &self.table.slots[self.index] {
            Slot::Occupied { key, value, .. } => (key, value),
            _ => unreachable!(),
        }
    }

    /// The stored key.
    pub fn key(&self) -> &K {
        self.slot().0
    }

    /// The stored value.
    pub fn get(&self) -> &V {
        self.slot().1
    }

    /// The stored value, mutably.
    pub fn get_mut(&mut self) -> &mut V {
        match &mut self.table.slots[self.index] {
            Slot::Occupied { value, .. } => value,
            _ => unreachable!(),
        }
    }

    /// Converts the entry into a mutable reference tied to the table borrow.
    pub fn into_mut(self) -> &'a mut V {
        let table = self.table;
        match &mut table.slots[self.index] {
            Slot::Occupied { value, .. } => value,
            _ => unreachable!(),
        }
    }

    /// Replaces the value, returning the old one.
    pub fn insert(&mut self, value: V) -> V {
        core::mem::replace(self.get_mut(), value)
    }

    /// Removes the entry, leaving a tombstone, and returns the value.
    pub fn remove(self) -> V {
        self.remove_entry().1
    }

    /// Removes the entry, leaving a tombstone, and returns key and value.
    pub fn remove_entry(self) -> (K, V) {
        let table = self.table;
        table.vacate(self.index)
    }
}
