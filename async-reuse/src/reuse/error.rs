use std::fmt::{self, Debug, Display, Formatter};
use std::sync::Arc;

pub use futures_channel::oneshot::Canceled;

/// An error returned from [`Reuser::enter`](crate::Reuser::enter).
pub enum UseError<E> {
    /// Wraps an error result from the `setup` callback. The error is shared
    /// between every caller which was waiting on the same setup.
    Setup(Arc<E>),
    /// Wraps an error result from the consumer
    Consumer(E),
}

impl<E> UseError<E> {
    /// Returns true if the resource could not be created.
    pub fn is_setup(&self) -> bool {
        matches!(self, Self::Setup(..))
    }

    /// Unwrap the consumer error, if any.
    pub fn into_consumer(self) -> Option<E> {
        match self {
            Self::Consumer(err) => Some(err),
            Self::Setup(..) => None,
        }
    }
}

impl<E: Debug> Debug for UseError<E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self {
            Self::Setup(err) => f.debug_tuple("UseError::Setup").field(err).finish(),
            Self::Consumer(err) => f.debug_tuple("UseError::Consumer").field(err).finish(),
        }
    }
}

impl<E: Display> Display for UseError<E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self {
            Self::Setup(err) => write!(f, "Resource setup error: {}", err),
            Self::Consumer(err) => write!(f, "{}", err),
        }
    }
}

impl<E: Debug + Display> std::error::Error for UseError<E> {}

/// A configuration error.
#[derive(Debug)]
pub struct ConfigError(pub String);

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Config error: {}", &self.0)
    }
}

impl std::error::Error for ConfigError {}
