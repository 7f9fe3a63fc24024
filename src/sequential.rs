//! [`SequentialHashSet`] is a single-threaded hash set.

use std::collections::hash_map::RandomState;
use std::fmt::{self, Debug};
use std::hash::{BuildHasher, Hash};

use super::hash_table::bucket_array::BucketArray;
use super::hash_table::{
    bucket_index, check_capacity, needs_growth, HashTable, DEFAULT_CAPACITY,
};
use super::{Equivalent, Error, Set};

/// Single-threaded hash set.
///
/// [`SequentialHashSet`] is the reference implementation of the [`Set`] contract: no locks, an
/// array of buckets addressed by `hash mod capacity`, and a capacity that doubles once the number
/// of keys per bucket exceeds [`LOAD_FACTOR`](crate::LOAD_FACTOR).
pub struct SequentialHashSet<K, H = RandomState>
where
    H: BuildHasher,
{
    array: BucketArray<K>,
    len: usize,
    build_hasher: H,
}

impl<K, H> SequentialHashSet<K, H>
where
    K: Eq + Hash,
    H: BuildHasher,
{
    /// Creates an empty [`SequentialHashSet`] with the specified capacity and [`BuildHasher`].
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero or memory allocation fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use striped_hash_set::SequentialHashSet;
    /// use std::collections::hash_map::RandomState;
    ///
    /// let hashset: SequentialHashSet<u64, RandomState> =
    ///     SequentialHashSet::with_capacity_and_hasher(16, RandomState::new());
    /// assert_eq!(hashset.capacity(), 16);
    /// ```
    #[inline]
    pub fn with_capacity_and_hasher(capacity: usize, build_hasher: H) -> Self {
        match Self::try_with_capacity_and_hasher(capacity, build_hasher) {
            Ok(hashset) => hashset,
            Err(error) => panic!("{error}"),
        }
    }

    /// Creates an empty [`SequentialHashSet`] with the specified capacity and [`BuildHasher`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::ZeroCapacity`] if `capacity` is zero, or [`Error::OutOfMemory`] if the
    /// bucket array could not be allocated.
    ///
    /// # Examples
    ///
    /// ```
    /// use striped_hash_set::{Error, SequentialHashSet};
    /// use std::collections::hash_map::RandomState;
    ///
    /// let result: Result<SequentialHashSet<u64>, Error> =
    ///     SequentialHashSet::try_with_capacity_and_hasher(0, RandomState::new());
    /// assert_eq!(result.err(), Some(Error::ZeroCapacity));
    /// ```
    #[inline]
    pub fn try_with_capacity_and_hasher(capacity: usize, build_hasher: H) -> Result<Self, Error> {
        Ok(Self {
            array: BucketArray::try_new(check_capacity(capacity)?)?,
            len: 0,
            build_hasher,
        })
    }

    /// Inserts a key into the [`SequentialHashSet`].
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
    /// use striped_hash_set::SequentialHashSet;
    ///
    /// let mut hashset: SequentialHashSet<u64> = SequentialHashSet::default();
    ///
    /// assert!(hashset.insert(1));
    /// assert!(!hashset.insert(1));
    /// ```
    #[inline]
    pub fn insert(&mut self, key: K) -> bool {
        match self.try_insert(key) {
            Ok(inserted) => inserted,
            Err(error) => panic!("{error}"),
        }
    }

    /// Inserts a key into the [`SequentialHashSet`], reporting growth failures.
    ///
    /// # Errors
    ///
    /// Returns an error if the insertion triggered a resize that could not complete. The key is
    /// inserted nonetheless, and the set stays valid with its previous capacity.
    #[inline]
    pub fn try_insert(&mut self, key: K) -> Result<bool, Error> {
        let hash = self.hash(&key);
        let index = bucket_index(hash, self.array.len());
        if !self.array.bucket_mut(index).insert(key, hash) {
            return Ok(false);
        }
        self.len += 1;
        if needs_growth(self.len, self.array.len()) {
            self.array.try_grow()?;
        }
        Ok(true)
    }

    /// Removes a key if the key exists.
    ///
    /// # Examples
    ///
    /// ```
    /// use striped_hash_set::SequentialHashSet;
    ///
    /// let mut hashset: SequentialHashSet<String> = SequentialHashSet::default();
    ///
    /// assert!(!hashset.remove("a"));
    /// assert!(hashset.insert("a".to_owned()));
    /// assert!(hashset.remove("a"));
    /// ```
    #[inline]
    pub fn remove<Q>(&mut self, key: &Q) -> bool
    where
        Q: Equivalent<K> + Hash + ?Sized,
    {
        let hash = self.hash(key);
        let index = bucket_index(hash, self.array.len());
        if self.array.bucket_mut(index).remove(key, hash).is_none() {
            return false;
        }
        self.len -= 1;
        true
    }

    /// Checks whether the key exists.
    ///
    /// # Examples
    ///
    /// ```
    /// use striped_hash_set::SequentialHashSet;
    ///
    /// let mut hashset: SequentialHashSet<u64> = SequentialHashSet::default();
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
        self.array
            .bucket(bucket_index(hash, self.array.len()))
            .contains(key, hash)
    }

    /// Returns the number of keys in the [`SequentialHashSet`].
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the [`SequentialHashSet`] is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of buckets.
    ///
    /// # Examples
    ///
    /// ```
    /// use striped_hash_set::SequentialHashSet;
    ///
    /// let mut hashset: SequentialHashSet<u64> = SequentialHashSet::with_capacity(2);
    /// for k in 0..9 {
    ///     assert!(hashset.insert(k));
    /// }
    /// assert_eq!(hashset.capacity(), 2);
    /// assert!(hashset.insert(9));
    /// assert_eq!(hashset.capacity(), 4);
    /// ```
    #[inline]
    pub fn capacity(&self) -> usize {
        self.array.len()
    }
}

impl<K> SequentialHashSet<K, RandomState>
where
    K: Eq + Hash,
{
    /// Creates an empty [`SequentialHashSet`] with the specified capacity.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero or memory allocation fails.
    #[inline]
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, RandomState::new())
    }

    /// Creates an empty [`SequentialHashSet`] with the specified capacity.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ZeroCapacity`] if `capacity` is zero.
    #[inline]
    pub fn try_with_capacity(capacity: usize) -> Result<Self, Error> {
        Self::try_with_capacity_and_hasher(capacity, RandomState::new())
    }
}

impl<K, H> Debug for SequentialHashSet<K, H>
where
    H: BuildHasher,
{
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SequentialHashSet")
            .field("capacity", &self.array.len())
            .field("len", &self.len)
            .finish()
    }
}

impl<K, H> Default for SequentialHashSet<K, H>
where
    K: Eq + Hash,
    H: BuildHasher + Default,
{
    /// Creates an empty [`SequentialHashSet`] with [`DEFAULT_CAPACITY`] buckets.
    ///
    /// # Examples
    ///
    /// ```
    /// use striped_hash_set::SequentialHashSet;
    ///
    /// let hashset: SequentialHashSet<u64> = SequentialHashSet::default();
    /// assert_eq!(hashset.capacity(), 16);
    /// ```
    #[inline]
    fn default() -> Self {
        Self::with_capacity_and_hasher(DEFAULT_CAPACITY, H::default())
    }
}

impl<K, H> Extend<K> for SequentialHashSet<K, H>
where
    K: Eq + Hash,
    H: BuildHasher,
{
    #[inline]
    fn extend<T: IntoIterator<Item = K>>(&mut self, iter: T) {
        for key in iter {
            self.insert(key);
        }
    }
}

impl<K, H> FromIterator<K> for SequentialHashSet<K, H>
where
    K: Eq + Hash,
    H: BuildHasher + Default,
{
    #[inline]
    fn from_iter<T: IntoIterator<Item = K>>(iter: T) -> Self {
        let mut hashset = Self::default();
        hashset.extend(iter);
        hashset
    }
}

impl<K, H> HashTable<H> for SequentialHashSet<K, H>
where
    H: BuildHasher,
{
    #[inline]
    fn hasher(&self) -> &H {
        &self.build_hasher
    }
}

impl<K, H> Set<K> for SequentialHashSet<K, H>
where
    K: Eq + Hash,
    H: BuildHasher,
{
    #[inline]
    fn insert(&mut self, key: K) -> bool {
        SequentialHashSet::insert(self, key)
    }

    #[inline]
    fn remove<Q>(&mut self, key: &Q) -> bool
    where
        Q: Equivalent<K> + Hash + ?Sized,
    {
        SequentialHashSet::remove(self, key)
    }

    #[inline]
    fn contains<Q>(&self, key: &Q) -> bool
    where
        Q: Equivalent<K> + Hash + ?Sized,
    {
        SequentialHashSet::contains(self, key)
    }

    #[inline]
    fn len(&self) -> usize {
        self.len
    }
}
