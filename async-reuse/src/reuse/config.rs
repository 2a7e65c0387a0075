use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::TryFuture;
use log::error;

use super::error::{Canceled, ConfigError};
use super::generation::{Counter, Generation};
use super::reuser::{Inner, Reuser};
use crate::executor::{default_executor, Executor};
use crate::resource::{
    from_async, from_callback, from_fn, Callback, ErrorFn, Lease, Lifecycle, Operation,
};

/// Configuration for a [`Reuser`]: how to set up and tear down the resource,
/// and how long an unused resource is kept around for reuse.
pub struct ReuseConfig<T, E> {
    executor: Option<Box<dyn Executor>>,
    generation: Option<Box<dyn Generation>>,
    handle_error: Option<ErrorFn<E>>,
    setup: Operation<(), T, E>,
    teardown: Option<Operation<Lease<T>, (), E>>,
    teardown_delay: Option<Duration>,
}

impl<T, E> ReuseConfig<T, E>
where
    T: Send + Sync + 'static,
    E: Send + Sync + 'static,
{
    /// Create a configuration from an async setup function.
    pub fn new<C, F>(setup: C) -> Self
    where
        C: Fn() -> F + Send + Sync + 'static,
        F: TryFuture<Ok = T, Error = E> + Send + 'static,
    {
        Self::with_setup(from_async(move |()| setup()))
    }

    /// Create a configuration from a setup function returning the resource
    /// directly.
    pub fn from_fn<C>(setup: C) -> Self
    where
        C: Fn() -> Result<T, E> + Send + Sync + 'static,
    {
        Self::with_setup(from_fn(move |()| setup()))
    }

    /// Create a configuration from a setup function which reports the
    /// resource through a [`Callback`].
    pub fn from_callback<C>(setup: C) -> Self
    where
        C: Fn(Callback<T, E>) + Send + Sync + 'static,
        E: From<Canceled>,
    {
        Self::with_setup(from_callback(move |(), callback| setup(callback)))
    }

    fn with_setup(setup: Operation<(), T, E>) -> Self {
        Self {
            executor: None,
            generation: None,
            handle_error: None,
            setup,
            teardown: None,
            teardown_delay: None,
        }
    }

    pub fn executor<X>(mut self, executor: X) -> Self
    where
        X: Executor + 'static,
    {
        self.executor.replace(Box::new(executor));
        self
    }

    /// Override the source of generation markers. Markers must be strictly
    /// increasing for the lifetime of the reuser.
    pub fn generation<G>(mut self, generation: G) -> Self
    where
        G: Generation + 'static,
    {
        self.generation.replace(Box::new(generation));
        self
    }

    /// Receive teardown failures, which have no waiting caller. By default
    /// they are logged.
    pub fn handle_error<F>(mut self, handler: F) -> Self
    where
        F: Fn(E) + Send + Sync + 'static,
    {
        self.handle_error.replace(Arc::new(handler));
        self
    }

    pub fn teardown<D, F>(mut self, teardown: D) -> Self
    where
        D: Fn(Lease<T>) -> F + Send + Sync + 'static,
        F: TryFuture<Ok = (), Error = E> + Send + 'static,
    {
        self.teardown.replace(from_async(teardown));
        self
    }

    pub fn teardown_fn<D>(mut self, teardown: D) -> Self
    where
        D: Fn(Lease<T>) -> Result<(), E> + Send + Sync + 'static,
    {
        self.teardown.replace(from_fn(teardown));
        self
    }

    pub fn teardown_callback<D>(mut self, teardown: D) -> Self
    where
        D: Fn(Lease<T>, Callback<(), E>) + Send + Sync + 'static,
        E: From<Canceled>,
    {
        self.teardown.replace(from_callback(teardown));
        self
    }

    /// Keep the resource alive for `val` after the last consumer completes,
    /// so that a caller arriving in the meantime can reuse it.
    pub fn teardown_delay(mut self, val: Duration) -> Self {
        if val > Duration::from_secs(0) {
            self.teardown_delay.replace(val);
        } else {
            self.teardown_delay.take();
        }
        self
    }

    pub fn build(self) -> Result<Reuser<T, E>, ConfigError>
    where
        E: Debug,
    {
        let executor = match self.executor {
            Some(executor) => executor,
            None => default_executor()?,
        };
        let handle_error: ErrorFn<E> = match self.handle_error {
            Some(handler) => handler,
            None => Arc::new(|err: E| error!("Unhandled resource teardown error: {:?}", err)),
        };
        let lifecycle = Lifecycle {
            setup: self.setup,
            teardown: self.teardown,
            handle_error,
        };
        let generation: Box<dyn Generation> = match self.generation {
            Some(generation) => generation,
            None => Box::new(Counter::default()),
        };
        let inner = Inner::new(
            executor,
            generation,
            lifecycle,
            self.teardown_delay,
        );
        Ok(Reuser::new(inner))
    }
}
