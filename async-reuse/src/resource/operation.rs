use std::fmt::{self, Debug, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_channel::oneshot;
use futures_util::future::{self, BoxFuture, FutureExt, TryFuture, TryFutureExt};

use crate::reuse::Canceled;

pub(crate) type OpFuture<T, E> = BoxFuture<'static, Result<T, E>>;

/// A lifecycle callback normalized to a single asynchronous contract: invoke
/// with an argument, obtain one eventual success value or one failure.
pub(crate) type Operation<A, T, E> = Box<dyn Fn(A) -> OpFuture<T, E> + Send + Sync>;

pub(crate) fn from_async<A, C, F, T, E>(op: C) -> Operation<A, T, E>
where
    A: 'static,
    C: Fn(A) -> F + Send + Sync + 'static,
    F: TryFuture<Ok = T, Error = E> + Send + 'static,
{
    Box::new(move |arg| op(arg).into_future().boxed())
}

pub(crate) fn from_fn<A, C, T, E>(op: C) -> Operation<A, T, E>
where
    A: 'static,
    C: Fn(A) -> Result<T, E> + Send + Sync + 'static,
    T: Send + 'static,
    E: Send + 'static,
{
    Box::new(move |arg| future::ready(op(arg)).boxed())
}

pub(crate) fn from_callback<A, C, T, E>(op: C) -> Operation<A, T, E>
where
    A: 'static,
    C: Fn(A, Callback<T, E>) + Send + Sync + 'static,
    T: Send + 'static,
    E: From<Canceled> + Send + 'static,
{
    Box::new(move |arg| {
        let (callback, completion) = callback_pair();
        op(arg, callback);
        completion.boxed()
    })
}

pub(crate) fn callback_pair<T, E>() -> (Callback<T, E>, Completion<T, E>) {
    let (sender, receiver) = oneshot::channel();
    (Callback { sender }, Completion { receiver })
}

/// The completion handle passed to callback-style operations. It must be
/// called exactly once; dropping it uncalled fails the operation with
/// [`Canceled`].
pub struct Callback<T, E> {
    sender: oneshot::Sender<Result<T, E>>,
}

impl<T, E> Callback<T, E> {
    pub fn call(self, result: Result<T, E>) {
        // the receiver is gone if the waiting future was dropped
        self.sender.send(result).unwrap_or(())
    }

    pub fn ok(self, value: T) {
        self.call(Ok(value))
    }

    pub fn err(self, err: E) {
        self.call(Err(err))
    }
}

impl<T, E> Debug for Callback<T, E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callback")
            .field("is_canceled", &self.sender.is_canceled())
            .finish()
    }
}

/// A `Future` resolving to the result passed to a [`Callback`].
pub struct Completion<T, E> {
    receiver: oneshot::Receiver<Result<T, E>>,
}

impl<T, E> Debug for Completion<T, E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completion").finish()
    }
}

impl<T, E: From<Canceled>> Future for Completion<T, E> {
    type Output = Result<T, E>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.receiver).poll(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(canceled)) => Poll::Ready(Err(E::from(canceled))),
        }
    }
}
