use super::bucket::Bucket;
use super::{bucket_index, grown_capacity};
use crate::Error;

/// [`BucketArray`] is a fixed-length array of [`Bucket`] instances.
///
/// The array never changes its length; a resize builds a new [`BucketArray`] and replaces the old
/// one as a whole.
pub(crate) struct BucketArray<K> {
    buckets: Vec<Bucket<K>>,
}

impl<K> BucketArray<K> {
    /// Creates a new [`BucketArray`] of `len` empty buckets.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfMemory`] if the array could not be allocated.
    pub(crate) fn try_new(len: usize) -> Result<Self, Error> {
        let mut buckets = Vec::new();
        buckets.try_reserve_exact(len)?;
        buckets.resize_with(len, Bucket::new);
        Ok(Self { buckets })
    }

    /// Returns the number of [`Bucket`] instances in the [`BucketArray`].
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Returns the number of entries across all the buckets.
    #[cfg(test)]
    pub(crate) fn num_entries(&self) -> usize {
        self.buckets.iter().map(Bucket::len).sum()
    }

    /// Returns a reference to the [`Bucket`] at the index.
    #[inline]
    pub(crate) fn bucket(&self, index: usize) -> &Bucket<K> {
        &self.buckets[index]
    }

    /// Returns a mutable reference to the [`Bucket`] at the index.
    #[inline]
    pub(crate) fn bucket_mut(&mut self, index: usize) -> &mut Bucket<K> {
        &mut self.buckets[index]
    }

    /// Allocates a [`BucketArray`] of `len` buckets that can accommodate every entry in `self`
    /// once relocated according to `slot`, without any further allocation.
    ///
    /// `self` is left untouched, so it remains usable if the allocation fails.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfMemory`] if memory could not be reserved.
    pub(crate) fn try_reserve_relocation<F: Fn(u64) -> usize>(
        &self,
        len: usize,
        slot: F,
    ) -> Result<Self, Error> {
        let mut counts: Vec<usize> = Vec::new();
        counts.try_reserve_exact(len)?;
        counts.resize(len, 0);
        for bucket in &self.buckets {
            for hash in bucket.hashes() {
                counts[slot(hash)] += 1;
            }
        }

        let mut target = Self::try_new(len)?;
        for (bucket, count) in target.buckets.iter_mut().zip(counts) {
            bucket.try_reserve_exact(count)?;
        }
        Ok(target)
    }

    /// Moves every entry into `target` according to `slot`.
    ///
    /// `target` must have been returned by [`Self::try_reserve_relocation`] with the same `slot`,
    /// thus this never allocates and never fails.
    pub(crate) fn relocate_into<F: Fn(u64) -> usize>(&mut self, target: &mut Self, slot: F) {
        for bucket in &mut self.buckets {
            for (hash, key) in bucket.drain() {
                target.buckets[slot(hash)].push_entry(hash, key);
            }
        }
    }

    /// Doubles the number of buckets, relocating every entry to `hash mod new_len`.
    ///
    /// # Errors
    ///
    /// Returns an error if the new length overflows or memory could not be reserved; the
    /// [`BucketArray`] is unchanged in that case.
    pub(crate) fn try_grow(&mut self) -> Result<(), Error> {
        let new_len = grown_capacity(self.len())?;
        let slot = move |hash| bucket_index(hash, new_len);
        let mut target = self.try_reserve_relocation(new_len, slot)?;
        self.relocate_into(&mut target, slot);
        *self = target;
        Ok(())
    }
}
