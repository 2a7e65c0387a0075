use std::fmt::{self, Debug, Display, Formatter};
use std::ops::Deref;
use std::sync::Arc;

mod lifecycle;
pub(crate) use lifecycle::{ErrorFn, Lifecycle};

mod operation;
pub use operation::{Callback, Completion};
pub(crate) use operation::{callback_pair, from_async, from_callback, from_fn, Operation};

/// A shared handle to the live resource of a [`Reuser`](crate::Reuser).
///
/// Every consumer entered during the same epoch receives a clone of the same
/// lease, and the teardown callback receives it last.
pub struct Lease<T> {
    value: Arc<T>,
}

impl<T> Lease<T> {
    pub(crate) fn new(value: T) -> Self {
        Self {
            value: Arc::new(value),
        }
    }

    /// Check whether two leases refer to the same resource instance.
    pub fn ptr_eq(lease: &Self, other: &Self) -> bool {
        Arc::ptr_eq(&lease.value, &other.value)
    }

    /// Take ownership of the resource if no other lease is outstanding.
    pub fn try_unwrap(lease: Self) -> Result<T, Self> {
        Arc::try_unwrap(lease.value).map_err(|value| Self { value })
    }
}

impl<T> Clone for Lease<T> {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
        }
    }
}

impl<T: Debug> Debug for Lease<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            f.debug_struct("Lease")
                .field("value", &self.deref())
                .field("leases", &Arc::strong_count(&self.value))
                .finish()
        } else {
            Debug::fmt(self.deref(), f)
        }
    }
}

impl<T: Display> Display for Lease<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(self.deref(), f)
    }
}

impl<T> Deref for Lease<T> {
    type Target = T;
    fn deref(&self) -> &Self::Target {
        &*self.value
    }
}

impl<T> AsRef<T> for Lease<T> {
    fn as_ref(&self) -> &T {
        &*self.value
    }
}
