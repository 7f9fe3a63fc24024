//! [`CoarseGrainedHashSet`] is a concurrent hash set guarded by a single lock.

use std::collections::hash_map::RandomState;
use std::fmt::{self, Debug};
use std::hash::{BuildHasher, Hash};
use std::sync::atomic::Ordering::Relaxed;

use super::hash_table::bucket_array::BucketArray;
use super::hash_table::{
    bucket_index, check_capacity, needs_growth, HashTable, DEFAULT_CAPACITY,
};
use super::maybe_std::{lock, AtomicUsize, Mutex};
use super::{Equivalent, Error, Set};

/// Concurrent hash set with coarse-grained locking.
///
/// Every operation holds one global lock for its entire duration, therefore all operations are
/// serialized and trivially linearizable, at the cost of any parallelism. A resize runs while the
/// inserting thread holds the global lock.
///
/// ## Locking behavior
///
/// The bucket array is only reachable through the global [`Mutex`]. The number of keys is
/// mirrored in an atomic counter that is only modified under the lock, thus [`len`](Self::len)
/// never blocks.
pub struct CoarseGrainedHashSet<K, H = RandomState>
where
    H: BuildHasher,
{
    array: Mutex<BucketArray<K>>,
    len: AtomicUsize,
    build_hasher: H,
}

impl<K, H> CoarseGrainedHashSet<K, H>
where
    K: Eq + Hash,
    H: BuildHasher,
{
    /// Creates an empty [`CoarseGrainedHashSet`] with the specified capacity and
    /// [`BuildHasher`].
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero or memory allocation fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use striped_hash_set::CoarseGrainedHashSet;
    /// use std::collections::hash_map::RandomState;
    ///
    /// let hashset: CoarseGrainedHashSet<u64, RandomState> =
    ///     CoarseGrainedHashSet::with_capacity_and_hasher(8, RandomState::new());
    /// assert_eq!(hashset.capacity(), 8);
    /// ```
    #[inline]
    pub fn with_capacity_and_hasher(capacity: usize, build_hasher: H) -> Self {
        match Self::try_with_capacity_and_hasher(capacity, build_hasher) {
            Ok(hashset) => hashset,
            Err(error) => panic!("{error}"),
        }
    }

    /// Creates an empty [`CoarseGrainedHashSet`] with the specified capacity and
    /// [`BuildHasher`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::ZeroCapacity`] if `capacity` is zero, or [`Error::OutOfMemory`] if the
    /// bucket array could not be allocated.
    #[inline]
    pub fn try_with_capacity_and_hasher(capacity: usize, build_hasher: H) -> Result<Self, Error> {
        Ok(Self {
            array: Mutex::new(BucketArray::try_new(check_capacity(capacity)?)?),
            len: AtomicUsize::new(0),
            build_hasher,
        })
    }

    /// Inserts a key into the [`CoarseGrainedHashSet`].
    ///
    /// Returns `false` if the key exists.
    ///
    /// # Panics
    ///
    /// Panics if the set has to grow and memory allocation fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use striped_hash_set::CoarseGrainedHashSet;
    ///
    /// let hashset: CoarseGrainedHashSet<u64> = CoarseGrainedHashSet::default();
    ///
    /// assert!(hashset.insert(1));
    /// assert!(!hashset.insert(1));
    /// ```
    #[inline]
    pub fn insert(&self, key: K) -> bool {
        match self.try_insert(key) {
            Ok(inserted) => inserted,
            Err(error) => panic!("{error}"),
        }
    }

    /// Inserts a key into the [`CoarseGrainedHashSet`], reporting growth failures.
    ///
    /// # Errors
    ///
    /// Returns an error if the insertion triggered a resize that could not complete. The key is
    /// inserted nonetheless, and the set stays valid with its previous capacity.
    #[inline]
    pub fn try_insert(&self, key: K) -> Result<bool, Error> {
        let hash = self.hash(&key);
        let mut array = lock(&self.array);
        let index = bucket_index(hash, array.len());
        if !array.bucket_mut(index).insert(key, hash) {
            return Ok(false);
        }
        let len = self.len.fetch_add(1, Relaxed) + 1;
        if needs_growth(len, array.len()) {
            array.try_grow()?;
        }
        Ok(true)
    }

    /// Removes a key if the key exists.
    ///
    /// # Examples
    ///
    /// ```
    /// use striped_hash_set::CoarseGrainedHashSet;
    ///
    /// let hashset: CoarseGrainedHashSet<u64> = CoarseGrainedHashSet::default();
    ///
    /// assert!(!hashset.remove(&1));
    /// assert!(hashset.insert(1));
    /// assert!(hashset.remove(&1));
    /// ```
    #[inline]
    pub fn remove<Q>(&self, key: &Q) -> bool
    where
        Q: Equivalent<K> + Hash + ?Sized,
    {
        let hash = self.hash(key);
        let mut array = lock(&self.array);
        let index = bucket_index(hash, array.len());
        if array.bucket_mut(index).remove(key, hash).is_none() {
            return false;
        }
        self.len.fetch_sub(1, Relaxed);
        true
    }

    /// Checks whether the key exists.
    ///
    /// # Examples
    ///
    /// ```
    /// use striped_hash_set::CoarseGrainedHashSet;
    ///
    /// let hashset: CoarseGrainedHashSet<u64> = CoarseGrainedHashSet::default();
    ///
    /// assert!(!hashset.contains(&1));
    /// assert!(hashset.insert(1));
    /// assert!(hashset.contains(&1));
    /// ```
    #[inline]
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        Q: Equivalent<K> + Hash + ?Sized,
    {
        let hash = self.hash(key);
        let array = lock(&self.array);
        array
            .bucket(bucket_index(hash, array.len()))
            .contains(key, hash)
    }

    /// Returns the number of keys in the [`CoarseGrainedHashSet`].
    #[inline]
    pub fn len(&self) -> usize {
        self.len.load(Relaxed)
    }

    /// Returns `true` if the [`CoarseGrainedHashSet`] is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of buckets.
    #[inline]
    pub fn capacity(&self) -> usize {
        lock(&self.array).len()
    }
}

impl<K> CoarseGrainedHashSet<K, RandomState>
where
    K: Eq + Hash,
{
    /// Creates an empty [`CoarseGrainedHashSet`] with the specified capacity.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero or memory allocation fails.
    #[inline]
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, RandomState::new())
    }

    /// Creates an empty [`CoarseGrainedHashSet`] with the specified capacity.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ZeroCapacity`] if `capacity` is zero.
    #[inline]
    pub fn try_with_capacity(capacity: usize) -> Result<Self, Error> {
        Self::try_with_capacity_and_hasher(capacity, RandomState::new())
    }
}

impl<K, H> Debug for CoarseGrainedHashSet<K, H>
where
    H: BuildHasher,
{
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoarseGrainedHashSet")
            .field("capacity", &lock(&self.array).len())
            .field("len", &self.len.load(Relaxed))
            .finish()
    }
}

impl<K, H> Default for CoarseGrainedHashSet<K, H>
where
    K: Eq + Hash,
    H: BuildHasher + Default,
{
    /// Creates an empty [`CoarseGrainedHashSet`] with [`DEFAULT_CAPACITY`] buckets.
    #[inline]
    fn default() -> Self {
        Self::with_capacity_and_hasher(DEFAULT_CAPACITY, H::default())
    }
}

impl<K, H> FromIterator<K> for CoarseGrainedHashSet<K, H>
where
    K: Eq + Hash,
    H: BuildHasher + Default,
{
    #[inline]
    fn from_iter<T: IntoIterator<Item = K>>(iter: T) -> Self {
        let hashset = Self::default();
        for key in iter {
            hashset.insert(key);
        }
        hashset
    }
}

impl<K, H> HashTable<H> for CoarseGrainedHashSet<K, H>
where
    H: BuildHasher,
{
    #[inline]
    fn hasher(&self) -> &H {
        &self.build_hasher
    }
}

impl<K, H> Set<K> for CoarseGrainedHashSet<K, H>
where
    K: Eq + Hash,
    H: BuildHasher,
{
    #[inline]
    fn insert(&mut self, key: K) -> bool {
        CoarseGrainedHashSet::insert(self, key)
    }

    #[inline]
    fn remove<Q>(&mut self, key: &Q) -> bool
    where
        Q: Equivalent<K> + Hash + ?Sized,
    {
        CoarseGrainedHashSet::remove(self, key)
    }

    #[inline]
    fn contains<Q>(&self, key: &Q) -> bool
    where
        Q: Equivalent<K> + Hash + ?Sized,
    {
        CoarseGrainedHashSet::contains(self, key)
    }

    #[inline]
    fn len(&self) -> usize {
        self.len.load(Relaxed)
    }
}
