mod claim;

mod config;
pub use config::ReuseConfig;

mod error;
pub use error::{Canceled, ConfigError, UseError};

mod generation;
pub use generation::{Counter, Generation};

mod release;

mod reuser;
pub use reuser::Reuser;
