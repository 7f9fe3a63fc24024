use std::collections::TryReserveError;

use crate::Equivalent;

/// [`Bucket`] is an unordered, duplicate-free collection of entries sharing a bucket index.
///
/// Each entry caches the hash value of its key; the hash value is compared before the key, and
/// relocating an entry during a resize never calls into user-provided
/// [`Hash`](std::hash::Hash) code.
pub(crate) struct Bucket<K> {
    entries: Vec<(u64, K)>,
}

impl<K> Bucket<K> {
    /// Creates an empty [`Bucket`].
    #[inline]
    pub(crate) const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Returns the number of entries in the [`Bucket`].
    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the [`Bucket`] holds an entry equivalent to the key.
    #[inline]
    pub(crate) fn contains<Q>(&self, key: &Q, hash: u64) -> bool
    where
        Q: Equivalent<K> + ?Sized,
    {
        self.search(key, hash).is_some()
    }

    /// Appends the key unless an equal key is already present.
    ///
    /// Returns `false` and drops `key` if the key exists.
    #[inline]
    pub(crate) fn insert(&mut self, key: K, hash: u64) -> bool
    where
        K: Eq,
    {
        if self.search(&key, hash).is_some() {
            return false;
        }
        self.entries.push((hash, key));
        true
    }

    /// Removes the first entry equivalent to the key, and returns it.
    #[inline]
    pub(crate) fn remove<Q>(&mut self, key: &Q, hash: u64) -> Option<K>
    where
        Q: Equivalent<K> + ?Sized,
    {
        let position = self.search(key, hash)?;
        Some(self.entries.swap_remove(position).1)
    }

    /// Reserves room for exactly `additional` more entries.
    #[inline]
    pub(crate) fn try_reserve_exact(&mut self, additional: usize) -> Result<(), TryReserveError> {
        self.entries.try_reserve_exact(additional)
    }

    /// Appends an entry whose key is known to be absent.
    ///
    /// Never allocates if enough room was reserved beforehand.
    #[inline]
    pub(crate) fn push_entry(&mut self, hash: u64, key: K) {
        debug_assert!(self.entries.len() < self.entries.capacity());
        self.entries.push((hash, key));
    }

    /// Moves every entry out of the [`Bucket`].
    #[inline]
    pub(crate) fn drain(&mut self) -> impl Iterator<Item = (u64, K)> + '_ {
        self.entries.drain(..)
    }

    /// Returns an iterator over the cached hash values.
    #[inline]
    pub(crate) fn hashes(&self) -> impl Iterator<Item = u64> + '_ {
        self.entries.iter().map(|(hash, _)| *hash)
    }

    fn search<Q>(&self, key: &Q, hash: u64) -> Option<usize>
    where
        Q: Equivalent<K> + ?Sized,
    {
        self.entries
            .iter()
            .position(|(h, k)| *h == hash && key.equivalent(k))
    }
}
