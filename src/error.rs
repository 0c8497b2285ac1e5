use thiserror::Error;

/// Errors reported by [`HashTable`](crate::HashTable) operations.
///
/// Every variant signals a contract violation at the call site. The table
/// never fails transiently, so none of these are worth retrying.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    /// The comparer classified the key as its null value.
    #[error("key is null")]
    NullKey,
    /// `add` was called with a key that is already present.
    #[error("an entry with the same key already exists")]
    DuplicateKey,
    /// A direct lookup was made for a key that is not present.
    #[error("the given key was not present in the table")]
    KeyNotFound,
    /// A capacity or configuration argument was out of range.
    #[error("invalid argument: requested {requested}, but the table holds {len} entries")]
    InvalidArgument {
        /// The value that was asked for.
        requested: usize,
        /// The live entry count at the time of the call.
        len: usize,
    },
    /// The table was structurally modified while a [`Cursor`](crate::hash_table::Cursor)
    /// was walking it.
    #[error("table was modified during iteration (expected version {expected}, found {found})")]
    ConcurrentModification {
        /// Version captured when the cursor was created.
        expected: u64,
        /// Version of the table at the failing step.
        found: u64,
    },
}

/// Shorthand for results carrying an [`Error`].
pub type Result<T> = core::result::Result<T, Error>;

/// Unwraps a table result whose only failure mode is [`Error::NullKey`],
/// for callers whose comparer never reports a null key.
#[inline(always)]
pub(crate) fn never_null<T>(result: Result<T>) -> T {
    match result {
        Ok(value) => value,
        Err(err) => unreachable!("comparer without null keys failed: {err}"),
    }
}
