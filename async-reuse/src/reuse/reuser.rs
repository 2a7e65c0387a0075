use std::fmt::{self, Debug, Formatter};
use std::mem;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures_util::future::{self, BoxFuture, FutureExt, Shared, TryFuture, TryFutureExt};
use log::{debug, error, trace};

use super::claim::Claim;
use super::config::ReuseConfig;
use super::error::{Canceled, ConfigError, UseError};
use super::generation::Generation;
use super::release::{Release, Teardown};
use crate::executor::Executor;
use crate::resource::{callback_pair, Callback, Lease, Lifecycle};
use crate::util::delay;

type Setup<T, E> = Shared<BoxFuture<'static, Result<Lease<T>, Arc<E>>>>;

/// The resource slot. Each variant other than `Absent` carries the epoch it
/// belongs to, which is the marker of the claim that started the setup.
enum Slot<T, E> {
    Absent,
    Pending(u64, Setup<T, E>),
    Live(u64, Lease<T>),
    Releasing(u64, Teardown),
}

impl<T, E> Slot<T, E> {
    fn is_pending(&self, epoch: u64) -> bool {
        matches!(self, Self::Pending(e, _) if *e == epoch)
    }

    fn is_releasing(&self, epoch: u64) -> bool {
        matches!(self, Self::Releasing(e, _) if *e == epoch)
    }
}

struct State<T, E> {
    active: usize,
    last: u64,
    slot: Slot<T, E>,
}

enum Step<T: Send + Sync + 'static, E: Send + Sync + 'static> {
    Release(Release<T, E>),
    Setup(u64, Setup<T, E>),
}

pub(crate) struct Inner<T, E> {
    executor: Box<dyn Executor>,
    generation: Box<dyn Generation>,
    lifecycle: Arc<Lifecycle<T, E>>,
    state: Mutex<State<T, E>>,
    teardown_delay: Option<Duration>,
}

impl<T, E> Inner<T, E>
where
    T: Send + Sync + 'static,
    E: Send + Sync + 'static,
{
    pub fn new(
        executor: Box<dyn Executor>,
        generation: Box<dyn Generation>,
        lifecycle: Lifecycle<T, E>,
        teardown_delay: Option<Duration>,
    ) -> Self {
        Self {
            executor,
            generation,
            lifecycle: Arc::new(lifecycle),
            state: Mutex::new(State {
                active: 0,
                last: 0,
                slot: Slot::Absent,
            }),
            teardown_delay,
        }
    }

    // setup, teardown and consumers never run while the lock is held. The
    // generation source does, so it must not call back into the reuser.
    fn state(&self) -> MutexGuard<'_, State<T, E>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn teardown_delay(&self) -> Option<Duration> {
        self.teardown_delay
    }

    /// Issue a new marker, making the caller the most recent claimant.
    pub fn claim(self: &Arc<Self>) -> Claim<T, E> {
        let mut state = self.state();
        let marker = self.generation.next();
        debug_assert!(
            marker > state.last,
            "Generation markers must be strictly increasing"
        );
        state.last = marker;
        state.active += 1;
        trace!("Claim {} ({} active)", marker, state.active);
        Claim::new(marker, self.clone())
    }

    /// Returns the most recent marker when no claims remain active, which is
    /// the marker a staleness check must be run against.
    pub fn settle(&self, marker: u64) -> Option<u64> {
        let mut state = self.state();
        state.active -= 1;
        trace!("Settled claim {} ({} active)", marker, state.active);
        if state.active == 0 {
            Some(state.last)
        } else {
            None
        }
    }

    pub async fn acquire(self: &Arc<Self>, marker: u64) -> Result<Lease<T>, UseError<E>> {
        loop {
            let step = {
                let mut state = self.state();
                let found = match &state.slot {
                    Slot::Absent => None,
                    Slot::Pending(epoch, setup) => Some(Step::Setup(*epoch, setup.clone())),
                    Slot::Live(_, lease) => return Ok(lease.clone()),
                    Slot::Releasing(epoch, teardown) => Some(Step::Release(Release::new(
                        *epoch,
                        teardown.clone(),
                        self.clone(),
                    ))),
                };
                match found {
                    Some(step) => step,
                    None => {
                        debug!("Setting up resource for epoch {}", marker);
                        let lifecycle = self.lifecycle.clone();
                        let setup = async move { lifecycle.setup().await }
                            .map_ok(Lease::new)
                            .map_err(Arc::new)
                            .boxed()
                            .shared();
                        state.slot = Slot::Pending(marker, setup.clone());
                        Step::Setup(marker, setup)
                    }
                }
            };

            match step {
                Step::Setup(epoch, setup) => {
                    let result = setup.await;
                    self.complete_setup(epoch, &result);
                    return result.map_err(UseError::Setup);
                }
                Step::Release(release) => {
                    // the previous epoch must be gone before a new one starts
                    release.await;
                }
            }
        }
    }

    fn complete_setup(&self, epoch: u64, result: &Result<Lease<T>, Arc<E>>) {
        let mut state = self.state();
        if state.slot.is_pending(epoch) {
            state.slot = match result {
                Ok(lease) => {
                    debug!("Resource ready for epoch {}", epoch);
                    Slot::Live(epoch, lease.clone())
                }
                Err(_) => {
                    debug!("Resource setup failed for epoch {}", epoch);
                    Slot::Absent
                }
            };
        }
    }

    /// The staleness check. Starts the teardown of the live resource only if
    /// no claim has been issued since `marker` and none remain active.
    pub fn release(self: &Arc<Self>, marker: u64) -> Option<Release<T, E>> {
        let mut state = self.state();
        if state.last != marker || state.active != 0 {
            trace!(
                "Skipped stale release {} (latest {}, {} active)",
                marker,
                state.last,
                state.active
            );
            return None;
        }
        let (epoch, lease) = match mem::replace(&mut state.slot, Slot::Absent) {
            Slot::Live(epoch, lease) => (epoch, lease),
            Slot::Pending(epoch, setup) => {
                let ready = match setup.peek() {
                    Some(Ok(lease)) => Some(lease.clone()),
                    _ => None,
                };
                match ready {
                    Some(lease) => (epoch, lease),
                    None => {
                        drop(state);
                        debug!("Abandoned resource setup for epoch {}", epoch);
                        drop(setup);
                        return None;
                    }
                }
            }
            other => {
                state.slot = other;
                return None;
            }
        };

        debug!("Tearing down resource for epoch {}", epoch);
        let lifecycle = self.lifecycle.clone();
        let teardown = async move {
            let run = async move {
                if let Err(err) = lifecycle.teardown(lease).await {
                    lifecycle.handle_error(err);
                }
            };
            // a panicking teardown still clears the slot
            if AssertUnwindSafe(run).catch_unwind().await.is_err() {
                error!("Resource teardown panicked for epoch {}", epoch);
            }
        }
        .boxed()
        .shared();
        state.slot = Slot::Releasing(epoch, teardown.clone());
        drop(state);

        let release = Release::new(epoch, teardown, self.clone());
        // finish the teardown even if the caller stops waiting on it
        self.executor.spawn_obj(release.clone().boxed());
        Some(release)
    }

    pub fn complete_release(&self, epoch: u64) {
        let mut state = self.state();
        if state.slot.is_releasing(epoch) {
            debug!("Resource released for epoch {}", epoch);
            state.slot = Slot::Absent;
        }
    }

    /// Run the staleness check for `marker` in the background, after the
    /// teardown delay if one is configured.
    pub fn schedule_release(self: &Arc<Self>, marker: u64) {
        let inner = self.clone();
        let wait = self.teardown_delay;
        self.executor.spawn_obj(
            async move {
                if let Some(wait) = wait {
                    delay(wait, ()).await;
                }
                if let Some(release) = inner.release(marker) {
                    release.await;
                }
            }
            .boxed(),
        );
    }

    fn status(&self) -> &'static str {
        match self.state().slot {
            Slot::Absent => "absent",
            Slot::Pending(..) => "pending",
            Slot::Live(..) => "live",
            Slot::Releasing(..) => "releasing",
        }
    }
}

/// Manages a single lazily-created resource which is shared between
/// overlapping consumers, and torn down once no consumer remains.
pub struct Reuser<T, E> {
    inner: Arc<Inner<T, E>>,
}

impl<T, E> Reuser<T, E>
where
    T: Send + Sync + 'static,
    E: Send + Sync + 'static,
{
    pub(crate) fn new(inner: Inner<T, E>) -> Self {
        Self {
            inner: Arc::new(inner),
        }
    }

    /// Create a reuser with an async setup function, no teardown and no
    /// teardown delay.
    pub fn from_setup<C, F>(setup: C) -> Result<Self, ConfigError>
    where
        C: Fn() -> F + Send + Sync + 'static,
        F: TryFuture<Ok = T, Error = E> + Send + 'static,
        E: Debug,
    {
        ReuseConfig::new(setup).build()
    }

    /// Run `consumer` with the shared resource, creating it first if
    /// necessary, and resolve to the consumer's result.
    ///
    /// Once the last active consumer completes the resource is torn down,
    /// unless another call is made within the teardown delay. Without a
    /// delay, the teardown completes before this future resolves; with a
    /// delay the result is returned as soon as the consumer completes.
    pub async fn enter<C, F, R>(&self, consumer: C) -> Result<R, UseError<E>>
    where
        C: FnOnce(Lease<T>) -> F,
        F: TryFuture<Ok = R, Error = E>,
    {
        let claim = self.inner.claim();
        let result = match self.inner.acquire(claim.marker()).await {
            Ok(lease) => consumer(lease)
                .into_future()
                .await
                .map_err(UseError::Consumer),
            Err(err) => Err(err),
        };
        claim.settle().await;
        result
    }

    /// Run a consumer which returns its result directly.
    pub async fn enter_fn<C, R>(&self, consumer: C) -> Result<R, UseError<E>>
    where
        C: FnOnce(Lease<T>) -> Result<R, E>,
    {
        self.enter(|lease| future::ready(consumer(lease))).await
    }

    /// Run a consumer which reports its result through a [`Callback`].
    pub async fn enter_callback<C, R>(&self, consumer: C) -> Result<R, UseError<E>>
    where
        C: FnOnce(Lease<T>, Callback<R, E>),
        E: From<Canceled>,
    {
        self.enter(|lease| {
            let (callback, completion) = callback_pair();
            consumer(lease, callback);
            completion
        })
        .await
    }

    pub fn teardown_delay(&self) -> Duration {
        self.inner.teardown_delay().unwrap_or_default()
    }
}

impl<T, E> Clone for Reuser<T, E> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T, E> Debug for Reuser<T, E>
where
    T: Send + Sync + 'static,
    E: Send + Sync + 'static,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reuser")
            .field("status", &self.inner.status())
            .field("teardown_delay", &self.teardown_delay())
            .finish()
    }
}
