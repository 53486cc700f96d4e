//! Property-based tests over the queue variants.
//!
//! Single-threaded properties: FIFO order for arbitrary inputs, agreement
//! with a model queue under arbitrary push/pop mixes, and payload
//! conservation through destruction. The concurrent behavior is covered by
//! the integration suite.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use proptest::prelude::*;
use proptest::test_runner::TestCaseError;

use crate::queue::{CoarseQueue, LockFreeQueue, RelaxedLockFreeQueue, SplitQueue};
use crate::Container;

/// Payload that counts its drops, for conservation checks.
struct Tracked(Arc<AtomicUsize>);

impl Drop for Tracked {
    fn drop(&mut self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }
}

fn assert_fifo<C: Container<i32>>(queue: &C, values: &[i32]) -> Result<(), TestCaseError> {
    for &value in values {
        queue.push(value);
    }
    for &value in values {
        prop_assert_eq!(queue.try_pop(), Some(value));
    }
    prop_assert_eq!(queue.try_pop(), None);
    Ok(())
}

/// `Some(v)` pushes, `None` pops; the variant must agree with a `VecDeque`
/// model at every step and on the remainder.
fn assert_matches_model<C: Container<i32>>(
    queue: &C,
    ops: &[Option<i32>],
) -> Result<(), TestCaseError> {
    let mut model: VecDeque<i32> = VecDeque::new();
    for op in ops {
        match *op {
            Some(value) => {
                queue.push(value);
                model.push_back(value);
            }
            None => {
                prop_assert_eq!(queue.try_pop(), model.pop_front());
            }
        }
        prop_assert_eq!(queue.is_empty(), model.is_empty());
    }
    while let Some(expected) = model.pop_front() {
        prop_assert_eq!(queue.try_pop(), Some(expected));
    }
    prop_assert_eq!(queue.try_pop(), None);
    Ok(())
}

proptest! {
    #[test]
    fn coarse_queue_preserves_push_order(values in prop::collection::vec(any::<i32>(), 0..200)) {
        assert_fifo(&CoarseQueue::new(), &values)?;
    }

    #[test]
    fn split_queue_preserves_push_order(values in prop::collection::vec(any::<i32>(), 0..200)) {
        assert_fifo(&SplitQueue::new(), &values)?;
    }

    #[test]
    fn lock_free_queue_preserves_push_order(values in prop::collection::vec(any::<i32>(), 0..200)) {
        assert_fifo(&LockFreeQueue::new(), &values)?;
    }

    #[test]
    fn relaxed_queue_preserves_push_order(values in prop::collection::vec(any::<i32>(), 0..200)) {
        assert_fifo(&RelaxedLockFreeQueue::default(), &values)?;
    }

    #[test]
    fn split_queue_matches_model(ops in prop::collection::vec(any::<Option<i32>>(), 0..300)) {
        assert_matches_model(&SplitQueue::new(), &ops)?;
    }

    #[test]
    fn lock_free_queue_matches_model(ops in prop::collection::vec(any::<Option<i32>>(), 0..300)) {
        assert_matches_model(&LockFreeQueue::new(), &ops)?;
    }

    #[test]
    fn split_queue_releases_every_payload(pushes in 1usize..150, pops in 0usize..200) {
        let drops = Arc::new(AtomicUsize::new(0));
        let queue = SplitQueue::new();
        for _ in 0..pushes {
            queue.push(Tracked(Arc::clone(&drops)));
        }
        for _ in 0..pops {
            let _ = queue.try_pop();
        }
        drop(queue);
        prop_assert_eq!(drops.load(Ordering::Relaxed), pushes);
    }

    #[test]
    fn lock_free_queue_releases_every_payload(pushes in 1usize..150, pops in 0usize..200) {
        let drops = Arc::new(AtomicUsize::new(0));
        let queue = LockFreeQueue::new();
        for _ in 0..pushes {
            queue.push(Tracked(Arc::clone(&drops)));
        }
        for _ in 0..pops {
            let _ = queue.try_pop();
        }
        drop(queue);
        prop_assert_eq!(drops.load(Ordering::Relaxed), pushes);
    }
}
