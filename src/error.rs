//! [`Error`] reported by fallible constructors and by growth of the bucket array.

use std::collections::TryReserveError;
use std::error;
use std::fmt;

/// [`Error`] types.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Error {
    /// ZeroCapacity: a set cannot be built without any bucket.
    ZeroCapacity,
    /// CapacityOverflow: doubling the number of buckets would overflow `usize`.
    CapacityOverflow,
    /// OutOfMemory: the memory for a new bucket array could not be reserved.
    OutOfMemory,
}

impl error::Error for Error {}

impl fmt::Display for Error {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ZeroCapacity => f.write_str("initial capacity must be positive"),
            Error::CapacityOverflow => f.write_str("capacity overflow"),
            Error::OutOfMemory => f.write_str("memory allocation failure"),
        }
    }
}

impl From<TryReserveError> for Error {
    #[inline]
    fn from(_: TryReserveError) -> Self {
        Error::OutOfMemory
    }
}
