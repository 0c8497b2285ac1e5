use core::hash::BuildHasher;
use core::hash::Hash;

/// The hasher builder used by [`HashComparer`] when none is named.
#[cfg(feature = "foldhash")]
pub type DefaultHashBuilder = foldhash::fast::RandomState;

/// Hashing and equality for the keys of a [`HashTable`](crate::HashTable).
///
/// Implementations must be consistent: `equals(a, b)` implies
/// `hash(a) == hash(b)`, and both must be stable for as long as a key is
/// stored. The table only looks at the low 31 bits of `hash`, so those bits
/// need to be well mixed.
///
/// # Examples
///
/// ```rust
/// use tri_table::Comparer;
/// use tri_table::HashTable;
///
/// // Case-insensitive ASCII keys.
/// struct NoCase;
///
/// impl Comparer<String> for NoCase {
///     fn hash(&self, key: &String) -> u64 {
///         key.bytes().fold(0xcbf29ce484222325, |h, b| {
///             (h ^ b.to_ascii_lowercase() as u64).wrapping_mul(0x100000001b3)
///         })
///     }
///
///     fn equals(&self, a: &String, b: &String) -> bool {
///         a.eq_ignore_ascii_case(b)
///     }
/// }
///
/// let mut table = HashTable::new(NoCase);
/// table.add("Hello".to_string(), 1).unwrap();
/// assert_eq!(table.try_get(&"HELLO".to_string()), Some(&1));
/// ```
pub trait Comparer<K> {
    /// Hashes a key. Only the low 31 bits are used.
    fn hash(&self, key: &K) -> u64;

    /// Returns `true` if both keys identify the same entry.
    fn equals(&self, a: &K, b: &K) -> bool;

    /// Returns `true` if `key` is this key type's null value, which the
    /// table refuses to store.
    ///
    /// Defaults to `false`. Comparers for key types with a null-like value,
    /// such as `Option<T>`, can override this to reject it.
    #[inline]
    fn is_null(&self, key: &K) -> bool {
        let _ = key;
        false
    }
}

impl<K, C> Comparer<K> for &C
where
    C: Comparer<K> + ?Sized,
{
    #[inline]
    fn hash(&self, key: &K) -> u64 {
        (**self).hash(key)
    }

    #[inline]
    fn equals(&self, a: &K, b: &K) -> bool {
        (**self).equals(a, b)
    }

    #[inline]
    fn is_null(&self, key: &K) -> bool {
        (**self).is_null(key)
    }
}

/// A [`Comparer`] for any `Hash + Eq` key, hashing through a
/// [`BuildHasher`].
#[derive(Debug, Clone, Default)]
pub struct HashComparer<S> {
    hash_builder: S,
}

impl<S> HashComparer<S> {
    /// Wraps a hasher builder.
    pub fn new(hash_builder: S) -> Self {
        Self { hash_builder }
    }

    /// The wrapped hasher builder.
    pub fn hasher(&self) -> &S {
        &self.hash_builder
    }
}

impl<K, S> Comparer<K> for HashComparer<S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    #[inline]
    fn hash(&self, key: &K) -> u64 {
        self.hash_builder.hash_one(key)
    }

    #[inline]
    fn equals(&self, a: &K, b: &K) -> bool {
        a == b
    }
}

/// Wraps a comparer for `T` so it can key a table by `Option<T>`, treating
/// `None` as the null key.
#[derive(Debug, Clone, Default)]
pub struct NullableComparer<C> {
    inner: C,
}

impl<C> NullableComparer<C> {
    /// Wraps `inner`.
    pub fn new(inner: C) -> Self {
        Self { inner }
    }
}

impl<T, C> Comparer<Option<T>> for NullableComparer<C>
where
    C: Comparer<T>,
{
    #[inline]
    fn hash(&self, key: &Option<T>) -> u64 {
        key.as_ref().map_or(0, |k| self.inner.hash(k))
    }

    #[inline]
    fn equals(&self, a: &Option<T>, b: &Option<T>) -> bool {
        match (a, b) {
            (Some(a), Some(b)) => self.inner.equals(a, b),
            (None, None) => true,
            _ => false,
        }
    }

    #[inline]
    fn is_null(&self, key: &Option<T>) -> bool {
        key.is_none()
    }
}
