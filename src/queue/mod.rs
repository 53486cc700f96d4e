//! FIFO queue variants.
//!
//! Three synchronization strategies over the same abstract contract:
//!
//! - [`CoarseQueue`]: one mutex guards the whole sequence; simplest correct
//!   implementation, supports `wait_pop` and an exact `len`.
//! - [`SplitQueue`]: separate front and back mutexes over a sentinel-
//!   terminated node chain, so one producer and one consumer can proceed in
//!   parallel; supports `wait_pop`.
//! - [`LockFreeQueue`]: atomic tail exchange plus head CAS over the same
//!   sentinel chain; never blocks, `try_pop` only. The
//!   [`RelaxedLockFreeQueue`] alias runs it under weakened orderings for
//!   benchmarking.
//!
//! All three preserve per-producer FIFO order: values pushed by one thread
//! are observed by any consumer in push order.

pub mod coarse;
pub mod lock_free;
pub mod split;

pub use coarse::CoarseQueue;
pub use lock_free::{LockFreeQueue, RelaxedLockFreeQueue};
pub use split::SplitQueue;

#[cfg(test)]
mod proptests;
