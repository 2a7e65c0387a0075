use std::sync::atomic::{AtomicU64, Ordering};

/// A source of generation markers for [`Reuser::enter`](crate::Reuser::enter)
/// calls. Each call to `next` must return a value strictly greater than every
/// value previously returned, including for concurrent callers.
pub trait Generation: Send + Sync {
    fn next(&self) -> u64;
}

/// The default generation source, a counter owned by a single reuser.
#[derive(Debug, Default)]
pub struct Counter {
    value: AtomicU64,
}

impl Counter {
    pub fn new(start: u64) -> Self {
        Self {
            value: AtomicU64::new(start),
        }
    }
}

impl Generation for Counter {
    fn next(&self) -> u64 {
        self.value.fetch_add(1, Ordering::AcqRel) + 1
    }
}

impl<G: Generation + ?Sized> Generation for Box<G> {
    fn next(&self) -> u64 {
        (**self).next()
    }
}
