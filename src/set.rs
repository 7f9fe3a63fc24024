//! [`Set`] is the contract shared by every hash set in the crate.

use std::hash::Hash;

use crate::Equivalent;

/// The four operations every hash set in this crate provides.
///
/// Mutating methods take `&mut self` so that the single-threaded [`SequentialHashSet`] can
/// implement the trait; the concurrent sets additionally provide every operation through `&self`.
///
/// All implementations behave identically under single-threaded use: duplicates are rejected,
/// the size is exact, and the growth threshold is the same.
///
/// # Examples
///
/// ```
/// use striped_hash_set::{CoarseGrainedHashSet, SequentialHashSet, Set, StripedHashSet};
///
/// fn fill<S: Set<u64>>(set: &mut S) {
///     for k in 0..64 {
///         assert!(set.insert(k));
///     }
///     assert!(!set.insert(7));
///     assert_eq!(set.len(), 64);
/// }
///
/// fill(&mut SequentialHashSet::with_capacity(4));
/// fill(&mut CoarseGrainedHashSet::with_capacity(4));
/// fill(&mut StripedHashSet::with_capacity(4));
/// ```
///
/// [`SequentialHashSet`]: crate::SequentialHashSet
pub trait Set<K: Eq + Hash> {
    /// Inserts a key.
    ///
    /// Returns `false` if an equal key exists, in which case the set is unchanged.
    fn insert(&mut self, key: K) -> bool;

    /// Removes a key.
    ///
    /// Returns `false` if the key does not exist.
    fn remove<Q>(&mut self, key: &Q) -> bool
    where
        Q: Equivalent<K> + Hash + ?Sized;

    /// Returns `true` if the key exists.
    fn contains<Q>(&self, key: &Q) -> bool
    where
        Q: Equivalent<K> + Hash + ?Sized;

    /// Returns the number of keys.
    fn len(&self) -> usize;

    /// Returns `true` if the set is empty.
    #[inline]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
