//! Lock-free queue with an atomic tail exchange and a CAS-retried head.

use std::cell::UnsafeCell;
use std::fmt;
use std::marker::PhantomData;
use std::sync::atomic::Ordering;

use crossbeam_epoch::{self as epoch, Atomic, Owned};

use crate::ordering::{MemoryProfile, Relaxed, Strict};
use crate::util::CachePadded;
use crate::Container;

struct Node<T> {
    value: UnsafeCell<Option<T>>,
    next: Atomic<Node<T>>,
}

impl<T> Node<T> {
    /// Allocate an empty placeholder node.
    fn sentinel() -> Owned<Node<T>> {
        Owned::new(Node {
            value: UnsafeCell::new(None),
            next: Atomic::null(),
        })
    }
}

/// An unbounded lock-free FIFO queue.
///
/// The node chain ends in an empty sentinel, exactly as in
/// [`SplitQueue`](crate::SplitQueue), but both ends are atomic pointers
/// instead of locked cells.
///
/// A push swaps the back pointer to a freshly allocated sentinel. The
/// exchange hands each producer a *unique* predecessor node, so filling its
/// payload slot and publishing its successor link happen without any
/// contention: the producer side is wait-free. A pop snapshots the front
/// node, checks its successor link (no successor means empty), and
/// compare-exchanges the front pointer forward, retrying on interference:
/// the consumer side is lock-free.
///
/// A consumer can catch up to a node whose payload has been claimed by the
/// tail exchange but whose successor link is not yet published; it observes
/// no successor and reports empty. That is the correct answer at that
/// instant (the element is not yet reachable) and the caller simply
/// retries.
///
/// Detached nodes are reclaimed through epoch-based deferral, so a snapshot
/// held by a stalled consumer stays valid while other consumers advance the
/// front, and a recycled allocation can never satisfy a stale
/// compare-exchange.
///
/// The `P` parameter selects the memory-ordering profile; see
/// [`ordering`](crate::ordering) and the [`RelaxedLockFreeQueue`] alias.
///
/// # Examples
///
/// ```rust
/// use tandem::LockFreeQueue;
///
/// let queue = LockFreeQueue::new();
/// queue.push(1);
/// queue.push(2);
///
/// assert_eq!(queue.try_pop(), Some(1));
/// assert_eq!(queue.try_pop(), Some(2));
/// assert_eq!(queue.try_pop(), None);
/// ```
pub struct LockFreeQueue<T, P: MemoryProfile = Strict> {
    front: CachePadded<Atomic<Node<T>>>,
    back: CachePadded<Atomic<Node<T>>>,
    _profile: PhantomData<P>,
}

/// [`LockFreeQueue`] under the weakened ordering profile.
///
/// Experimental: kept so the cost of sequential consistency is measurable.
/// Prefer [`LockFreeQueue`] outside of benchmarks. Construct with
/// `RelaxedLockFreeQueue::default()`.
pub type RelaxedLockFreeQueue<T> = LockFreeQueue<T, Relaxed>;

// The payload cells are handed off through the atomic protocol: a cell is
// written only by the producer that claimed its node and read only by the
// consumer that detached it.
unsafe impl<T: Send, P: MemoryProfile> Send for LockFreeQueue<T, P> {}
unsafe impl<T: Send, P: MemoryProfile> Sync for LockFreeQueue<T, P> {}

impl<T> LockFreeQueue<T> {
    /// Create an empty queue under the sequentially consistent profile.
    pub fn new() -> Self {
        Self::with_profile()
    }
}

impl<T, P: MemoryProfile> LockFreeQueue<T, P> {
    /// Create an empty queue: a single sentinel addressed by both ends.
    fn with_profile() -> Self {
        let queue = Self {
            front: CachePadded::new(Atomic::null()),
            back: CachePadded::new(Atomic::null()),
            _profile: PhantomData,
        };
        // Not yet shared; no other thread can observe the initialization.
        unsafe {
            let guard = epoch::unprotected();
            let sentinel = Node::sentinel().into_shared(guard);
            queue.front.get().store(sentinel, Ordering::Relaxed);
            queue.back.get().store(sentinel, Ordering::Relaxed);
        }
        queue
    }

    /// Append `value` to the back of the queue.
    pub fn push(&self, value: T) {
        let guard = epoch::pin();
        let sentinel = Node::sentinel().into_shared(&guard);
        let claimed = self.back.get().swap(sentinel, P::SWAP, &guard);
        // The exchange made `claimed` ours alone: no other producer holds
        // it, and consumers stop short of it until the link below is
        // published.
        unsafe {
            *claimed.deref().value.get() = Some(value);
            claimed.deref().next.store(sentinel, P::PUBLISH);
        }
    }

    /// Construct a value at the push site and append it.
    pub fn push_with<F: FnOnce() -> T>(&self, make: F) {
        self.push(make());
    }

    /// Remove and return the front element, or `None` if the queue is empty.
    pub fn try_pop(&self) -> Option<T> {
        let guard = epoch::pin();
        loop {
            let head = self.front.get().load(P::LOAD, &guard);
            let next = unsafe { head.deref().next.load(P::LOAD, &guard) };
            if next.is_null() {
                return None;
            }
            if self
                .front
                .get()
                .compare_exchange(head, next, P::CAS_OK, P::CAS_FAIL, &guard)
                .is_ok()
            {
                unsafe {
                    let value = (*head.deref().value.get()).take();
                    guard.defer_destroy(head);
                    return value;
                }
            }
        }
    }

    /// Whether the queue appears empty.
    ///
    /// Advisory only: a concurrent push or pop may invalidate the answer
    /// before the caller acts on it.
    pub fn is_empty(&self) -> bool {
        let guard = epoch::pin();
        let head = self.front.get().load(P::LOAD, &guard);
        unsafe { head.deref().next.load(P::LOAD, &guard).is_null() }
    }
}

impl<T, P: MemoryProfile> Default for LockFreeQueue<T, P> {
    fn default() -> Self {
        Self::with_profile()
    }
}

impl<T, P: MemoryProfile> Drop for LockFreeQueue<T, P> {
    fn drop(&mut self) {
        // Destruction is quiescent: no thread holds a guard into this
        // queue, so the chain can be freed eagerly.
        unsafe {
            let guard = epoch::unprotected();
            let mut node = self.front.get().load(Ordering::Relaxed, guard);
            while !node.is_null() {
                let next = node.deref().next.load(Ordering::Relaxed, guard);
                drop(node.into_owned());
                node = next;
            }
        }
    }
}

impl<T, P: MemoryProfile> fmt::Debug for LockFreeQueue<T, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LockFreeQueue").field("empty", &self.is_empty()).finish()
    }
}

impl<T: Send, P: MemoryProfile> Container<T> for LockFreeQueue<T, P> {
    fn push(&self, value: T) {
        LockFreeQueue::push(self, value);
    }

    fn try_pop(&self) -> Option<T> {
        LockFreeQueue::try_pop(self)
    }

    fn is_empty(&self) -> bool {
        LockFreeQueue::is_empty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn delivers_in_push_order() {
        let queue = LockFreeQueue::new();
        for i in 0..10 {
            queue.push(i);
        }
        for i in 0..10 {
            assert_eq!(queue.try_pop(), Some(i));
        }
        assert_eq!(queue.try_pop(), None);
    }

    #[test]
    fn empty_agrees_with_try_pop() {
        let queue: LockFreeQueue<u8> = LockFreeQueue::new();
        assert!(queue.is_empty());
        assert_eq!(queue.try_pop(), None);

        queue.push(1);
        assert!(!queue.is_empty());
        assert_eq!(queue.try_pop(), Some(1));
        assert!(queue.is_empty());
    }

    #[test]
    fn push_with_constructs_at_push_site() {
        let queue = LockFreeQueue::new();
        queue.push_with(|| String::from("built in place"));
        assert_eq!(queue.try_pop().as_deref(), Some("built in place"));
    }

    #[test]
    fn relaxed_profile_delivers_in_push_order() {
        let queue: RelaxedLockFreeQueue<usize> = RelaxedLockFreeQueue::default();
        for i in 0..10 {
            queue.push(i);
        }
        for i in 0..10 {
            assert_eq!(queue.try_pop(), Some(i));
        }
        assert_eq!(queue.try_pop(), None);
    }

    #[test]
    fn concurrent_pushes_and_pops_conserve_elements() {
        let queue = Arc::new(LockFreeQueue::new());
        let popped = Arc::new(AtomicUsize::new(0));
        const PER_PRODUCER: usize = 10_000;
        const PRODUCERS: usize = 4;
        const CONSUMERS: usize = 4;

        let mut handles = Vec::new();
        for p in 0..PRODUCERS {
            let queue = Arc::clone(&queue);
            handles.push(thread::spawn(move || {
                for i in 0..PER_PRODUCER {
                    queue.push(p * PER_PRODUCER + i);
                }
            }));
        }
        for _ in 0..CONSUMERS {
            let queue = Arc::clone(&queue);
            let popped = Arc::clone(&popped);
            handles.push(thread::spawn(move || {
                while popped.load(Ordering::Relaxed) < PRODUCERS * PER_PRODUCER {
                    if queue.try_pop().is_some() {
                        popped.fetch_add(1, Ordering::Relaxed);
                    } else {
                        thread::yield_now();
                    }
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(popped.load(Ordering::Relaxed), PRODUCERS * PER_PRODUCER);
        assert!(queue.is_empty());
    }

    #[test]
    fn unpopped_elements_are_dropped_with_the_queue() {
        struct Tracked(Arc<AtomicUsize>);
        impl Drop for Tracked {
            fn drop(&mut self) {
                self.0.fetch_add(1, Ordering::Relaxed);
            }
        }

        let drops = Arc::new(AtomicUsize::new(0));
        let queue = LockFreeQueue::new();
        for _ in 0..100 {
            queue.push(Tracked(Arc::clone(&drops)));
        }
        for _ in 0..50 {
            queue.try_pop();
        }
        drop(queue);

        // Popped payloads were dropped by the consumers, the rest by the
        // queue itself.
        assert_eq!(drops.load(Ordering::Relaxed), 100);
    }
}
