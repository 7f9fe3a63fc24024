use crate::hash_table::bucket_array::BucketArray;
use crate::maybe_std::{lock, Mutex, MutexGuard};
use crate::Error;

/// [`LockPartition`] is a fixed-length array of stripe locks.
///
/// Each lock owns the buckets of its stripe: with `L` locks, stripe `s` holds every bucket `b`
/// such that `b mod L == s`, at slot `b / L`. The number of locks is set at construction and
/// never changes, while the number of buckets per stripe doubles on every resize.
pub(crate) struct LockPartition<K> {
    stripes: Box<[Mutex<BucketArray<K>>]>,
}

/// Exclusive access to every stripe, acquired in ascending order.
pub(crate) type AllStripes<'p, K> = Vec<MutexGuard<'p, BucketArray<K>>>;

impl<K> LockPartition<K> {
    /// Creates a new [`LockPartition`] of `lock_count` stripes, each holding one bucket.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfMemory`] if memory could not be allocated.
    pub(crate) fn try_new(lock_count: usize) -> Result<Self, Error> {
        let mut stripes = Vec::new();
        stripes.try_reserve_exact(lock_count)?;
        for _ in 0..lock_count {
            stripes.push(Mutex::new(BucketArray::try_new(1)?));
        }
        Ok(Self {
            stripes: stripes.into_boxed_slice(),
        })
    }

    /// Returns the number of locks.
    #[inline]
    pub(crate) fn lock_count(&self) -> usize {
        self.stripes.len()
    }

    /// Locks the stripe at the index.
    #[inline]
    pub(crate) fn lock(&self, index: usize) -> MutexGuard<'_, BucketArray<K>> {
        lock(&self.stripes[index])
    }

    /// Locks every stripe in ascending index order.
    ///
    /// This is the only place where a thread holds more than one stripe lock; the fixed order
    /// rules out deadlocks between concurrent callers.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfMemory`] if the guards could not be allocated; no lock is held in
    /// that case.
    pub(crate) fn lock_all(&self) -> Result<AllStripes<'_, K>, Error> {
        let mut guards = Vec::new();
        guards.try_reserve_exact(self.stripes.len())?;
        for stripe in self.stripes.iter() {
            guards.push(lock(stripe));
        }
        Ok(guards)
    }
}
