mod delay;
pub use delay::{delay, Delay};
