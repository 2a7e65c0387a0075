use std::sync::Arc;

use futures_util::future::{self, FutureExt};

use super::operation::{OpFuture, Operation};
use super::Lease;

pub(crate) type ErrorFn<E> = Arc<dyn Fn(E) + Send + Sync>;

pub(crate) struct Lifecycle<T, E> {
    pub setup: Operation<(), T, E>,
    pub teardown: Option<Operation<Lease<T>, (), E>>,
    pub handle_error: ErrorFn<E>,
}

impl<T, E> Lifecycle<T, E>
where
    T: Send + Sync + 'static,
    E: Send + 'static,
{
    pub fn setup(&self) -> OpFuture<T, E> {
        (self.setup)(())
    }

    pub fn teardown(&self, lease: Lease<T>) -> OpFuture<(), E> {
        if let Some(handler) = self.teardown.as_ref() {
            handler(lease)
        } else {
            future::ok(()).boxed()
        }
    }

    /// The background failure channel, for errors with no waiting caller.
    pub fn handle_error(&self, err: E) {
        (self.handle_error)(err)
    }
}
