use std::sync::Arc;

use futures_lite::future::Boxed as BoxFuture;

use crate::reuse::ConfigError;

#[cfg(feature = "global-exec")]
mod global;

#[cfg(feature = "global-exec")]
pub use self::global::GlobalExecutor;

#[cfg(feature = "global-exec")]
/// Returns a default [`Executor`] instance to use when constructing a
/// reuser.
pub fn default_executor() -> Result<Box<dyn Executor>, ConfigError> {
    Ok(Box::new(self::global::GlobalExecutor))
}

#[cfg(not(any(feature = "global-exec")))]
/// Returns a default [`Executor`] instance to use when constructing a
/// reuser.
pub fn default_executor() -> Result<Box<dyn Executor>, ConfigError> {
    Err(ConfigError("No default executor is provided".to_owned()))
}

/// Defines a pluggable executor for the detached teardown work of a reuser.
pub trait Executor: Send + Sync {
    /// Spawn a static, boxed Future with no return value
    fn spawn_obj(&self, task: BoxFuture<()>);
}

impl<X: Executor + ?Sized> Executor for Arc<X> {
    fn spawn_obj(&self, task: BoxFuture<()>) {
        (**self).spawn_obj(task)
    }
}
