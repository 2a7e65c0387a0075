use std::fmt::{self, Debug, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use async_io::Timer;

/// Create a `Future` which resolves to `value` once `duration` has elapsed.
///
/// This is the timer behind a reuser's teardown delay, and is also handy for
/// waiting out a teardown window.
pub fn delay<T>(duration: Duration, value: T) -> Delay<T> {
    Delay {
        timer: Timer::after(duration),
        value: Some(value),
    }
}

/// A `Future` returned by [`delay`].
pub struct Delay<T> {
    timer: Timer,
    value: Option<T>,
}

// the value is never pinned
impl<T> Unpin for Delay<T> {}

impl<T> Debug for Delay<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Delay")
            .field("done", &self.value.is_none())
            .finish()
    }
}

impl<T> Future for Delay<T> {
    type Output = T;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.timer).poll(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(_) => Poll::Ready(
                self.value
                    .take()
                    .expect("Delay polled after completion"),
            ),
        }
    }
}
