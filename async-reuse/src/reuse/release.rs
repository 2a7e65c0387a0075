use std::fmt::{self, Debug, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_util::future::{BoxFuture, Shared};

use super::reuser::Inner;

/// The in-flight teardown of an epoch, shared by everyone waiting on it.
pub(crate) type Teardown = Shared<BoxFuture<'static, ()>>;

/// A `Future` completing once the resource of an epoch has been torn down
/// and the slot cleared.
pub(crate) struct Release<T: Send + Sync + 'static, E: Send + Sync + 'static> {
    epoch: u64,
    inner: Arc<Inner<T, E>>,
    teardown: Teardown,
}

impl<T, E> Release<T, E>
where
    T: Send + Sync + 'static,
    E: Send + Sync + 'static,
{
    pub fn new(epoch: u64, teardown: Teardown, inner: Arc<Inner<T, E>>) -> Self {
        Self {
            epoch,
            inner,
            teardown,
        }
    }
}

impl<T, E> Clone for Release<T, E>
where
    T: Send + Sync + 'static,
    E: Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            epoch: self.epoch,
            inner: self.inner.clone(),
            teardown: self.teardown.clone(),
        }
    }
}

impl<T, E> Debug for Release<T, E>
where
    T: Send + Sync + 'static,
    E: Send + Sync + 'static,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Release")
            .field("epoch", &self.epoch)
            .finish()
    }
}

impl<T, E> Future for Release<T, E>
where
    T: Send + Sync + 'static,
    E: Send + Sync + 'static,
{
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        match Pin::new(&mut self.teardown).poll(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(()) => {
                self.inner.complete_release(self.epoch);
                Poll::Ready(())
            }
        }
    }
}
