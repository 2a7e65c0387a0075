use std::sync::Arc;

use super::reuser::Inner;

/// Registers one in-flight `enter` call with the reuser. A claim is settled
/// exactly once: explicitly when the call completes, or on drop when the
/// calling future is abandoned.
pub(crate) struct Claim<T: Send + Sync + 'static, E: Send + Sync + 'static> {
    inner: Option<Arc<Inner<T, E>>>,
    marker: u64,
}

impl<T, E> Claim<T, E>
where
    T: Send + Sync + 'static,
    E: Send + Sync + 'static,
{
    pub fn new(marker: u64, inner: Arc<Inner<T, E>>) -> Self {
        Self {
            inner: Some(inner),
            marker,
        }
    }

    pub fn marker(&self) -> u64 {
        self.marker
    }

    /// Settle the claim after the consumer has completed. Without a teardown
    /// delay, any teardown started here is finished before returning.
    pub async fn settle(mut self) {
        if let Some(inner) = self.inner.take() {
            if let Some(latest) = inner.settle(self.marker) {
                if inner.teardown_delay().is_some() {
                    inner.schedule_release(latest);
                } else if let Some(release) = inner.release(latest) {
                    release.await;
                }
            }
        }
    }
}

impl<T, E> Drop for Claim<T, E>
where
    T: Send + Sync + 'static,
    E: Send + Sync + 'static,
{
    fn drop(&mut self) {
        if let Some(inner) = self.inner.take() {
            if let Some(latest) = inner.settle(self.marker) {
                inner.schedule_release(latest);
            }
        }
    }
}
