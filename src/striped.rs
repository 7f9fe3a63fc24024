//! [`StripedHashSet`] is a concurrent hash set with a fixed partition of locks.

mod lock_partition;

use std::collections::hash_map::RandomState;
use std::fmt::{self, Debug};
use std::hash::{BuildHasher, Hash};
use std::sync::atomic::Ordering::Relaxed;

use lock_partition::LockPartition;

use super::hash_table::{
    bucket_index, check_capacity, grown_capacity, lock_index, needs_growth, HashTable,
    DEFAULT_CAPACITY,
};
use super::maybe_std::AtomicUsize;
use super::{Equivalent, Error, Set};

/// Concurrent hash set with lock striping.
///
/// [`StripedHashSet`] partitions its keys into a fixed number of stripes, each guarded by its own
/// lock, so that operations on keys of different stripes proceed in parallel.
///
/// ## Addressing
///
/// * The lock of a key is `hash mod lock_count`; `lock_count` equals the initial capacity and
///   never changes, so a key is protected by the same lock for the lifetime of the set.
/// * The bucket of a key is `hash mod capacity`; the capacity doubles on every resize.
///
/// The capacity is always `lock_count * 2^n`, therefore bucket `b` always belongs to stripe
/// `b mod lock_count`, and a stripe lock covers a fixed subset of the bucket indices however
/// large the table grows.
///
/// ## Locking behavior
///
/// ### Key access
///
/// [`insert`](Self::insert), [`remove`](Self::remove), and [`contains`](Self::contains) hold
/// exactly one stripe lock while reading or modifying a bucket. Keys that collide modulo
/// `lock_count` are serialized even after the table has grown.
///
/// ### Resize
///
/// A resize acquires every stripe lock in ascending order, doubles the capacity, and replaces the
/// buckets of every stripe with a freshly built set of buckets. No other operation can observe a
/// partially relocated table. An [`insert`](Self::insert) checks the load factor after releasing
/// its stripe lock, thus several threads may request a resize for the same capacity; only the
/// first one doubles the table, the others find the capacity changed and give up.
///
/// ### Size
///
/// The number of keys is an atomic counter independent of the stripe locks.
pub struct StripedHashSet<K, H = RandomState>
where
    H: BuildHasher,
{
    stripes: LockPartition<K>,
    capacity: AtomicUsize,
    len: AtomicUsize,
    build_hasher: H,
}

impl<K, H> StripedHashSet<K, H>
where
    K: Eq + Hash,
    H: BuildHasher,
{
    /// Creates an empty [`StripedHashSet`] with the specified capacity and [`BuildHasher`].
    ///
    /// `capacity` is both the initial number of buckets and the number of stripe locks.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero or memory allocation fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use striped_hash_set::StripedHashSet;
    /// use std::collections::hash_map::RandomState;
    ///
    /// let hashset: StripedHashSet<u64, RandomState> =
    ///     StripedHashSet::with_capacity_and_hasher(8, RandomState::new());
    /// assert_eq!(hashset.capacity(), 8);
    /// assert_eq!(hashset.lock_count(), 8);
    /// ```
    #[inline]
    pub fn with_capacity_and_hasher(capacity: usize, build_hasher: H) -> Self {
        match Self::try_with_capacity_and_hasher(capacity, build_hasher) {
            Ok(hashset) => hashset,
            Err(error) => panic!("{error}"),
        }
    }

    /// Creates an empty [`StripedHashSet`] with the specified capacity and [`BuildHasher`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::ZeroCapacity`] if `capacity` is zero, or [`Error::OutOfMemory`] if the
    /// stripes could not be allocated.
    ///
    /// # Examples
    ///
    /// ```
    /// use striped_hash_set::{Error, StripedHashSet};
    /// use std::collections::hash_map::RandomState;
    ///
    /// let result: Result<StripedHashSet<u64>, Error> =
    ///     StripedHashSet::try_with_capacity_and_hasher(0, RandomState::new());
    /// assert_eq!(result.err(), Some(Error::ZeroCapacity));
    /// ```
    #[inline]
    pub fn try_with_capacity_and_hasher(capacity: usize, build_hasher: H) -> Result<Self, Error> {
        let capacity = check_capacity(capacity)?;
        Ok(Self {
            stripes: LockPartition::try_new(capacity)?,
            capacity: AtomicUsize::new(capacity),
            len: AtomicUsize::new(0),
            build_hasher,
        })
    }

    /// Inserts a key into the [`StripedHashSet`].
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
    /// use striped_hash_set::StripedHashSet;
    ///
    /// let hashset: StripedHashSet<u64> = StripedHashSet::default();
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

    /// Inserts a key into the [`StripedHashSet`], reporting growth failures.
    ///
    /// # Errors
    ///
    /// Returns an error if the insertion triggered a resize that could not complete. The key is
    /// inserted nonetheless, and the set stays valid with its previous capacity.
    ///
    /// # Examples
    ///
    /// ```
    /// use striped_hash_set::StripedHashSet;
    ///
    /// let hashset: StripedHashSet<u64> = StripedHashSet::with_capacity(1);
    ///
    /// assert_eq!(hashset.try_insert(1), Ok(true));
    /// assert_eq!(hashset.try_insert(1), Ok(false));
    /// ```
    #[inline]
    pub fn try_insert(&self, key: K) -> Result<bool, Error> {
        let hash = self.hash(&key);
        {
            let mut stripe = self.stripes.lock(self.lock_index(hash));
            let slot = self.slot(hash, self.capacity.load(Relaxed));
            if !stripe.bucket_mut(slot).insert(key, hash) {
                return Ok(false);
            }
            self.len.fetch_add(1, Relaxed);
        }

        // The load factor is checked without holding any lock.
        let capacity = self.capacity.load(Relaxed);
        if needs_growth(self.len.load(Relaxed), capacity) {
            self.resize(capacity)?;
        }
        Ok(true)
    }

    /// Removes a key if the key exists.
    ///
    /// # Examples
    ///
    /// ```
    /// use striped_hash_set::StripedHashSet;
    ///
    /// let hashset: StripedHashSet<String> = StripedHashSet::default();
    ///
    /// assert!(!hashset.remove("a"));
    /// assert!(hashset.insert("a".to_owned()));
    /// assert!(hashset.remove("a"));
    /// assert!(!hashset.remove("a"));
    /// ```
    #[inline]
    pub fn remove<Q>(&self, key: &Q) -> bool
    where
        Q: Equivalent<K> + Hash + ?Sized,
    {
        let hash = self.hash(key);
        let mut stripe = self.stripes.lock(self.lock_index(hash));
        let slot = self.slot(hash, self.capacity.load(Relaxed));
        if stripe.bucket_mut(slot).remove(key, hash).is_none() {
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
    /// use striped_hash_set::StripedHashSet;
    ///
    /// let hashset: StripedHashSet<u64> = StripedHashSet::default();
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
        let stripe = self.stripes.lock(self.lock_index(hash));
        let slot = self.slot(hash, self.capacity.load(Relaxed));
        stripe.bucket(slot).contains(key, hash)
    }

    /// Returns the number of keys in the [`StripedHashSet`].
    ///
    /// # Examples
    ///
    /// ```
    /// use striped_hash_set::StripedHashSet;
    ///
    /// let hashset: StripedHashSet<u64> = StripedHashSet::default();
    ///
    /// assert!(hashset.insert(1));
    /// assert!(hashset.insert(2));
    /// assert_eq!(hashset.len(), 2);
    /// ```
    #[inline]
    pub fn len(&self) -> usize {
        self.len.load(Relaxed)
    }

    /// Returns `true` if the [`StripedHashSet`] is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of buckets.
    ///
    /// # Examples
    ///
    /// ```
    /// use striped_hash_set::StripedHashSet;
    ///
    /// let hashset: StripedHashSet<u64> = StripedHashSet::with_capacity(2);
    /// for k in 0..10 {
    ///     assert!(hashset.insert(k));
    /// }
    /// assert_eq!(hashset.capacity(), 4);
    /// assert_eq!(hashset.lock_count(), 2);
    /// ```
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity.load(Relaxed)
    }

    /// Returns the number of stripe locks.
    #[inline]
    pub fn lock_count(&self) -> usize {
        self.stripes.lock_count()
    }

    /// Doubles the capacity unless another thread already resized the table since
    /// `observed_capacity` was read.
    ///
    /// Returns `true` if the table was resized by this call.
    ///
    /// # Errors
    ///
    /// Returns an error if the new capacity overflows or memory could not be reserved; the old
    /// buckets are kept in place in that case.
    pub(crate) fn resize(&self, observed_capacity: usize) -> Result<bool, Error> {
        let mut stripes = self.stripes.lock_all()?;

        let capacity = self.capacity.load(Relaxed);
        if capacity != observed_capacity {
            return Ok(false);
        }
        let new_capacity = grown_capacity(capacity)?;
        let lock_count = stripes.len();
        let slot = move |hash| bucket_index(hash, new_capacity) / lock_count;

        // Every new bucket array is allocated before any key is moved.
        let mut grown = Vec::new();
        grown.try_reserve_exact(lock_count)?;
        for stripe in &stripes {
            grown.push(stripe.try_reserve_relocation(new_capacity / lock_count, slot)?);
        }

        for (stripe, mut new_array) in stripes.iter_mut().zip(grown) {
            stripe.relocate_into(&mut new_array, slot);
            **stripe = new_array;
        }
        self.capacity.store(new_capacity, Relaxed);
        Ok(true)
    }

    /// Returns the index of the lock protecting the hash value.
    #[inline]
    fn lock_index(&self, hash: u64) -> usize {
        lock_index(hash, self.stripes.lock_count())
    }

    /// Returns the position of the bucket of the hash value in its stripe.
    ///
    /// The caller must hold the stripe lock for `capacity` to be current.
    #[inline]
    fn slot(&self, hash: u64, capacity: usize) -> usize {
        bucket_index(hash, capacity) / self.stripes.lock_count()
    }
}

impl<K> StripedHashSet<K, RandomState>
where
    K: Eq + Hash,
{
    /// Creates an empty [`StripedHashSet`] with the specified capacity.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero or memory allocation fails.
    #[inline]
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, RandomState::new())
    }

    /// Creates an empty [`StripedHashSet`] with the specified capacity.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ZeroCapacity`] if `capacity` is zero.
    #[inline]
    pub fn try_with_capacity(capacity: usize) -> Result<Self, Error> {
        Self::try_with_capacity_and_hasher(capacity, RandomState::new())
    }
}

impl<K, H> Debug for StripedHashSet<K, H>
where
    H: BuildHasher,
{
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StripedHashSet")
            .field("capacity", &self.capacity.load(Relaxed))
            .field("lock_count", &self.stripes.lock_count())
            .field("len", &self.len.load(Relaxed))
            .finish()
    }
}

impl<K, H> Default for StripedHashSet<K, H>
where
    K: Eq + Hash,
    H: BuildHasher + Default,
{
    /// Creates an empty [`StripedHashSet`] with [`DEFAULT_CAPACITY`] buckets and locks.
    #[inline]
    fn default() -> Self {
        Self::with_capacity_and_hasher(DEFAULT_CAPACITY, H::default())
    }
}

impl<K, H> FromIterator<K> for StripedHashSet<K, H>
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

impl<K, H> HashTable<H> for StripedHashSet<K, H>
where
    H: BuildHasher,
{
    #[inline]
    fn hasher(&self) -> &H {
        &self.build_hasher
    }
}

impl<K, H> Set<K> for StripedHashSet<K, H>
where
    K: Eq + Hash,
    H: BuildHasher,
{
    #[inline]
    fn insert(&mut self, key: K) -> bool {
        StripedHashSet::insert(self, key)
    }

    #[inline]
    fn remove<Q>(&mut self, key: &Q) -> bool
    where
        Q: Equivalent<K> + Hash + ?Sized,
    {
        StripedHashSet::remove(self, key)
    }

    #[inline]
    fn contains<Q>(&self, key: &Q) -> bool
    where
        Q: Equivalent<K> + Hash + ?Sized,
    {
        StripedHashSet::contains(self, key)
    }

    #[inline]
    fn len(&self) -> usize {
        self.len.load(Relaxed)
    }
}
