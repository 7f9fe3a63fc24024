//! Synchronization primitives, taken from `loom` when model checking.

use std::sync::PoisonError;

#[cfg(feature = "loom")]
pub(crate) use loom::sync::atomic::AtomicUsize;
#[cfg(feature = "loom")]
pub(crate) use loom::sync::{Mutex, MutexGuard};

#[cfg(not(feature = "loom"))]
pub(crate) use std::sync::atomic::AtomicUsize;
#[cfg(not(feature = "loom"))]
pub(crate) use std::sync::{Mutex, MutexGuard};

/// Locks the [`Mutex`], ignoring poison.
///
/// Buckets are valid after every step of a mutation, therefore a panic that unwound through a
/// guard cannot have left the protected data in an inconsistent state.
#[inline]
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
