#![warn(missing_docs, clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! Resizable hash sets under three concurrency strategies.
//!
//! # [`SequentialHashSet`]
//! A single-threaded hash set; the reference implementation of the [`Set`] contract.
//!
//! # [`CoarseGrainedHashSet`]
//! A concurrent hash set that serializes every operation behind one lock.
//!
//! # [`StripedHashSet`]
//! A concurrent hash set that partitions its keys into a fixed number of independently locked
//! stripes, and grows its bucket array while holding every stripe lock.
//!
//! All three sets double their capacity once the number of keys divided by the number of buckets
//! exceeds [`LOAD_FACTOR`], and never shrink.

mod coarse_grained;
pub use coarse_grained::CoarseGrainedHashSet;

mod sequential;
pub use sequential::SequentialHashSet;

mod striped;
pub use striped::StripedHashSet;

mod set;
pub use set::Set;

mod error;
pub use error::Error;

mod hash_table;
pub use hash_table::{DEFAULT_CAPACITY, LOAD_FACTOR};

#[cfg(not(feature = "equivalent"))]
mod equivalent;
#[cfg(not(feature = "equivalent"))]
pub use equivalent::Equivalent;
#[cfg(feature = "equivalent")]
pub use equivalent::Equivalent;

mod maybe_std;
