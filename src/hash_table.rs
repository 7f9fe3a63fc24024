pub(crate) mod bucket;
pub(crate) mod bucket_array;

use std::hash::{BuildHasher, Hash};

use crate::Error;

/// The number of buckets a set gets when built through [`Default`].
pub const DEFAULT_CAPACITY: usize = 16;

/// The average number of entries per bucket that a set tolerates before doubling its capacity.
pub const LOAD_FACTOR: usize = 4;

/// [`HashTable`] defines common functions for the hash set implementations.
pub(crate) trait HashTable<H: BuildHasher> {
    /// Returns a reference to its [`BuildHasher`].
    fn hasher(&self) -> &H;

    /// Returns the hash value of the key.
    ///
    /// The [`BuildHasher`] is assumed to be deterministic: the same key always produces the same
    /// hash value for the lifetime of the set.
    #[inline]
    fn hash<Q>(&self, key: &Q) -> u64
    where
        Q: Hash + ?Sized,
    {
        self.hasher().hash_one(key)
    }
}

/// Returns the index of the bucket that holds the hash value among `capacity` buckets.
#[allow(clippy::cast_possible_truncation)]
#[inline]
pub(crate) const fn bucket_index(hash: u64, capacity: usize) -> usize {
    // The remainder is smaller than `capacity`, therefore it fits in a `usize`.
    (hash % capacity as u64) as usize
}

/// Returns the index of the lock that protects the hash value among `lock_count` locks.
#[allow(clippy::cast_possible_truncation)]
#[inline]
pub(crate) const fn lock_index(hash: u64, lock_count: usize) -> usize {
    (hash % lock_count as u64) as usize
}

/// Checks whether a table holding `len` entries in `capacity` buckets has to grow.
#[inline]
pub(crate) const fn needs_growth(len: usize, capacity: usize) -> bool {
    len / capacity > LOAD_FACTOR
}

/// Returns the capacity after a resize.
#[inline]
pub(crate) fn grown_capacity(capacity: usize) -> Result<usize, Error> {
    capacity.checked_mul(2).ok_or(Error::CapacityOverflow)
}

/// Validates the capacity given to a constructor.
#[inline]
pub(crate) fn check_capacity(capacity: usize) -> Result<usize, Error> {
    if capacity == 0 {
        return Err(Error::ZeroCapacity);
    }
    Ok(capacity)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn index_formulas_diverge_after_growth() {
        let lock_count = 4;
        let capacity = 16;
        for hash in 0..64_u64 {
            let bucket = bucket_index(hash, capacity);
            let lock = lock_index(hash, lock_count);
            assert!(bucket < capacity);
            assert!(lock < lock_count);
            // Every bucket of a stripe is a fixed subset of the bucket indices.
            assert_eq!(bucket % lock_count, lock);
        }
        assert_eq!(bucket_index(13, capacity), 13);
        assert_eq!(lock_index(13, lock_count), 1);
        assert_eq!(bucket_index(u64::MAX, 3), (u64::MAX % 3) as usize);
    }

    #[test]
    fn growth_policy() {
        assert!(!needs_growth(0, 1));
        assert!(!needs_growth(5, 2));
        assert!(!needs_growth(9, 2));
        assert!(needs_growth(10, 2));
        assert!(needs_growth(5, 1));
        assert_eq!(grown_capacity(2), Ok(4));
        assert_eq!(grown_capacity(usize::MAX), Err(Error::CapacityOverflow));
        assert_eq!(check_capacity(0), Err(Error::ZeroCapacity));
        assert_eq!(check_capacity(3), Ok(3));
    }
}
