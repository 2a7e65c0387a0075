//! Lazily created, shared, and debounced async resources.
//!
//! A [`Reuser`] owns at most one instance of an expensive resource. The
//! resource is created on the first call to [`Reuser::enter`], shared by every
//! call which overlaps with it, and torn down once the last of them completes,
//! optionally after a delay which lets a call arriving shortly afterward reuse
//! the live instance.
//!
//! ```
//! use std::time::Duration;
//!
//! use async_reuse::{delay, ReuseConfig, UseError};
//! use futures_lite::future::block_on;
//!
//! let reuser = ReuseConfig::<String, ()>::from_fn(|| Ok("connection".to_owned()))
//!     .teardown_fn(|conn| {
//!         println!("closing {}", conn);
//!         Ok(())
//!     })
//!     .teardown_delay(Duration::from_millis(50))
//!     .build()
//!     .unwrap();
//!
//! block_on(async {
//!     let len = reuser.enter_fn(|conn| Ok(conn.len())).await?;
//!     assert_eq!(len, 10);
//!     // wait out the teardown window
//!     delay(Duration::from_millis(100), ()).await;
//!     Result::<(), UseError<()>>::Ok(())
//! })
//! .unwrap();
//! ```

mod executor;
#[cfg(feature = "global-exec")]
pub use self::executor::GlobalExecutor;
pub use self::executor::{default_executor, Executor};

mod resource;
pub use self::resource::{Callback, Completion, Lease};

mod reuse;
pub use self::reuse::{
    Canceled, ConfigError, Counter, Generation, ReuseConfig, Reuser, UseError,
};

mod util;
pub use self::util::{delay, Delay};
