//! LIFO stack variants.
//!
//! Two synchronization strategies over the same abstract contract:
//!
//! - [`CoarseStack`]: one mutex guards the whole sequence; supports
//!   `wait_pop` and an exact `len`.
//! - [`LockFreeStack`]: a Treiber stack, CAS on the top pointer; never
//!   blocks, `try_pop` only. The [`RelaxedLockFreeStack`] alias runs it
//!   under weakened orderings for benchmarking.
//!
//! Stacks need no sentinel node: push and pop act on the same end, and the
//! CAS loop naturally publishes a node's payload before its link becomes
//! reachable.

pub mod coarse;
pub mod lock_free;

pub use coarse::CoarseStack;
pub use lock_free::{LockFreeStack, RelaxedLockFreeStack};
