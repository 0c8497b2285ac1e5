use alloc::vec;
use core::iter::FusedIterator;

use super::HashTable;
use super::Slot;
use crate::error::Error;
use crate::error::Result;

impl<K, V, C> HashTable<K, V, C> {
    /// Returns an iterator over all entries.
    ///
    /// Entries are yielded in slot order, which depends on hashes and on the
    /// table's history; treat it as unspecified. Each call starts a fresh
    /// scan.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use tri_table::HashComparer;
    /// # use tri_table::HashTable;
    /// # use tri_table::DefaultHashBuilder;
    /// let mut table = HashTable::new(HashComparer::<DefaultHashBuilder>::default());
    /// table.add("a", 1).unwrap();
    /// table.add("b", 2).unwrap();
    ///
    /// let mut sum = 0;
    /// for (_, value) in table.iter() {
    ///     sum += value;
    /// }
    /// assert_eq!(sum, 3);
    /// ```
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            slots: self.slots.iter(),
            remaining: self.len,
        }
    }

    /// Returns an iterator over all entries with mutable access to values.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            slots: self.slots.iter_mut(),
            remaining: self.len,
        }
    }

    /// Returns an iterator over all keys.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    /// Returns an iterator over all values.
    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// Returns an iterator over all values, mutably.
    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut {
            inner: self.iter_mut(),
        }
    }

    /// Removes and yields every entry.
    ///
    /// The table is empty once the iterator is dropped, whether or not it
    /// was run to completion. Capacity is unchanged.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use tri_table::HashComparer;
    /// # use tri_table::HashTable;
    /// # use tri_table::DefaultHashBuilder;
    /// let mut table = HashTable::new(HashComparer::<DefaultHashBuilder>::default());
    /// table.add(1, "one").unwrap();
    /// table.add(2, "two").unwrap();
    ///
    /// let mut drained: Vec<_> = table.drain().collect();
    /// drained.sort();
    /// assert_eq!(drained, [(1, "one"), (2, "two")]);
    /// assert!(table.is_empty());
    /// ```
    pub fn drain(&mut self) -> Drain<'_, K, V, C> {
        Drain {
            table: self,
            index: 0,
        }
    }

    /// Returns a detached cursor positioned before the first slot.
    ///
    /// Unlike [`iter`](Self::iter), a cursor does not borrow the table
    /// between steps, so the table may be mutated while one is alive. Any
    /// structural change is detected on the next step, which then fails with
    /// [`Error::ConcurrentModification`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use tri_table::HashComparer;
    /// # use tri_table::HashTable;
    /// # use tri_table::DefaultHashBuilder;
    /// # use tri_table::error::Error;
    /// let mut table = HashTable::new(HashComparer::<DefaultHashBuilder>::default());
    /// table.add(1, "one").unwrap();
    /// table.add(2, "two").unwrap();
    ///
    /// let mut cursor = table.cursor();
    /// assert!(cursor.advance(&table).unwrap().is_some());
    ///
    /// table.add(3, "three").unwrap();
    /// assert!(matches!(
    ///     cursor.advance(&table),
    ///     Err(Error::ConcurrentModification { .. })
    /// ));
    /// ```
    pub fn cursor(&self) -> Cursor {
        Cursor {
            index: 0,
            version: self.version,
        }
    }
}

/// An iterator over the entries of a [`HashTable`].
///
/// Created by [`HashTable::iter`].
pub struct Iter<'a, K, V> {
    slots: core::slice::Iter<'a, Slot<K, V>>,
    remaining: usize,
}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            slots: self.slots.clone(),
            remaining: self.remaining,
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        for slot in self.slots.by_ref() {
            if let Some(entry) = slot.entry() {
                self.remaining -= 1;
                return Some(entry);
            }
        }

        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

/// A mutable iterator over the entries of a [`HashTable`].
///
/// Created by [`HashTable::iter_mut`].
pub struct IterMut<'a, K, V> {
    slots: core::slice::IterMut<'a, Slot<K, V>>,
    remaining: usize,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        for slot in self.slots.by_ref() {
            if let Some(entry) = slot.entry_mut() {
                self.remaining -= 1;
                return Some(entry);
            }
        }

        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}

impl<K, V> FusedIterator for IterMut<'_, K, V> {}

/// An iterator over the keys of a [`HashTable`].
pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}

/// An iterator over the values of a [`HashTable`].
pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}

/// A mutable iterator over the values of a [`HashTable`].
pub struct ValuesMut<'a, K, V> {
    inner: IterMut<'a, K, V>,
}

impl<'a, K, V> Iterator for ValuesMut<'a, K, V> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

/// A draining iterator over the entries of a [`HashTable`].
///
/// Created by [`HashTable::drain`]. Each yielded entry is tombstoned as it
/// is taken, so the table stays consistent even if the iterator is leaked;
/// dropping the iterator clears the table.
pub struct Drain<'a, K, V, C> {
    table: &'a mut HashTable<K, V, C>,
    index: usize,
}

impl<K, V, C> Drop for Drain<'_, K, V, C> {
    fn drop(&mut self) {
        self.table.clear();
    }
}

impl<K, V, C> Iterator for Drain<'_, K, V, C> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        while self.index < self.table.slots.len() {
            let index = self.index;
            self.index += 1;
            if self.table.slots[index].entry().is_some() {
                return Some(self.table.vacate(index));
            }
        }

        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.table.len, Some(self.table.len))
    }
}

impl<K, V, C> ExactSizeIterator for Drain<'_, K, V, C> {}

/// An owning iterator over the entries of a [`HashTable`].
pub struct IntoIter<K, V> {
    slots: vec::IntoIter<Slot<K, V>>,
    remaining: usize,
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        for slot in self.slots.by_ref() {
            if let Slot::Occupied { key, value, .. } = slot {
                self.remaining -= 1;
                return Some((key, value));
            }
        }

        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}

impl<K, V, C> IntoIterator for HashTable<K, V, C> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            remaining: self.len,
            slots: self.slots.into_vec().into_iter(),
        }
    }
}

impl<'a, K, V, C> IntoIterator for &'a HashTable<K, V, C> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V, C> IntoIterator for &'a mut HashTable<K, V, C> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

/// A slot scan that is checked against the table's version stamp on every
/// step.
///
/// Created by [`HashTable::cursor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    index: usize,
    version: u64,
}

impl Cursor {
    /// Yields the next entry at or after the cursor's position.
    ///
    /// # Errors
    ///
    /// [`Error::ConcurrentModification`] if `table` has been structurally
    /// modified since the cursor was created or last [`reset`](Self::reset).
    pub fn advance<'a, K, V, C>(
        &mut self,
        table: &'a HashTable<K, V, C>,
    ) -> Result<Option<(&'a K, &'a V)>> {
        if table.version != self.version {
            return Err(Error::ConcurrentModification {
                expected: self.version,
                found: table.version,
            });
        }

        while let Some(slot) = table.slots.get(self.index) {
            self.index += 1;
            if let Some(entry) = slot.entry() {
                return Ok(Some(entry));
            }
        }

        Ok(None)
    }

    /// Restarts the scan at slot zero and adopts the table's current
    /// version.
    pub fn reset<K, V, C>(&mut self, table: &HashTable<K, V, C>) {
        self.index = 0;
        self.version = table.version;
    }
}
