//! Lock-free Treiber stack.

use std::fmt;
use std::marker::PhantomData;
use std::mem::ManuallyDrop;
use std::ptr;
use std::sync::atomic::Ordering;

use crossbeam_epoch::{self as epoch, Atomic, Owned};

use crate::ordering::{MemoryProfile, Relaxed, Strict};
use crate::util::CachePadded;
use crate::Container;

struct Node<T> {
    value: ManuallyDrop<T>,
    next: Atomic<Node<T>>,
}

/// An unbounded lock-free LIFO stack.
///
/// A singly-linked chain whose top pointer is the only shared mutable
/// state. A push builds its node privately, records the observed top as the
/// node's successor, and compare-exchanges the top pointer; on failure the
/// freshly observed top is written back into the node and the exchange is
/// retried. A pop compare-exchanges the top to its successor and moves the
/// payload out of the detached node.
///
/// Detached nodes are reclaimed through epoch-based deferral: a node
/// snapshot held by a concurrent reader keeps the memory alive, and an
/// address cannot be recycled while any reader might still compare against
/// it, which rules out the ABA hazard of a naive CAS.
///
/// The `P` parameter selects the memory-ordering profile; see
/// [`ordering`](crate::ordering) and the [`RelaxedLockFreeStack`] alias.
///
/// # Examples
///
/// ```rust
/// use tandem::LockFreeStack;
///
/// let stack = LockFreeStack::new();
/// stack.push(1);
/// stack.push(2);
///
/// assert_eq!(stack.try_pop(), Some(2));
/// assert_eq!(stack.try_pop(), Some(1));
/// assert_eq!(stack.try_pop(), None);
/// ```
pub struct LockFreeStack<T, P: MemoryProfile = Strict> {
    top: CachePadded<Atomic<Node<T>>>,
    _profile: PhantomData<P>,
}

/// [`LockFreeStack`] under the weakened ordering profile.
///
/// Experimental: kept so the cost of sequential consistency is measurable.
/// Prefer [`LockFreeStack`] outside of benchmarks. Construct with
/// `RelaxedLockFreeStack::default()`.
pub type RelaxedLockFreeStack<T> = LockFreeStack<T, Relaxed>;

// Payloads are moved in by the pushing thread and moved out by exactly one
// popping thread, with the top-pointer CAS ordering the handoff.
unsafe impl<T: Send, P: MemoryProfile> Send for LockFreeStack<T, P> {}
unsafe impl<T: Send, P: MemoryProfile> Sync for LockFreeStack<T, P> {}

impl<T> LockFreeStack<T> {
    /// Create an empty stack under the sequentially consistent profile.
    pub fn new() -> Self {
        Self::with_profile()
    }
}

impl<T, P: MemoryProfile> LockFreeStack<T, P> {
    /// Create an empty stack.
    fn with_profile() -> Self {
        Self {
            top: CachePadded::new(Atomic::null()),
            _profile: PhantomData,
        }
    }

    /// Place `value` on top of the stack.
    pub fn push(&self, value: T) {
        let mut node = Owned::new(Node {
            value: ManuallyDrop::new(value),
            next: Atomic::null(),
        });
        let guard = epoch::pin();
        loop {
            let top = self.top.get().load(P::LOAD, &guard);
            // The node is still private; a plain store suffices.
            node.next.store(top, Ordering::Relaxed);
            match self
                .top
                .get()
                .compare_exchange(top, node, P::CAS_OK, P::CAS_FAIL, &guard)
            {
                Ok(_) => return,
                Err(err) => node = err.new,
            }
        }
    }

    /// Construct a value at the push site and place it on top.
    pub fn push_with<F: FnOnce() -> T>(&self, make: F) {
        self.push(make());
    }

    /// Remove and return the top element, or `None` if the stack is empty.
    pub fn try_pop(&self) -> Option<T> {
        let guard = epoch::pin();
        loop {
            let top = self.top.get().load(P::LOAD, &guard);
            let observed = unsafe { top.as_ref() }?;
            let next = observed.next.load(P::LOAD, &guard);
            if self
                .top
                .get()
                .compare_exchange(top, next, P::CAS_OK, P::CAS_FAIL, &guard)
                .is_ok()
            {
                // This thread won the detach; it is the only one that will
                // ever read the payload out of this node.
                unsafe {
                    let value = ManuallyDrop::into_inner(ptr::read(&observed.value));
                    guard.defer_destroy(top);
                    return Some(value);
                }
            }
        }
    }

    /// Whether the stack appears empty.
    ///
    /// Advisory only: a concurrent push or pop may invalidate the answer
    /// before the caller acts on it.
    pub fn is_empty(&self) -> bool {
        let guard = epoch::pin();
        self.top.get().load(P::LOAD, &guard).is_null()
    }
}

impl<T, P: MemoryProfile> Default for LockFreeStack<T, P> {
    fn default() -> Self {
        Self::with_profile()
    }
}

impl<T, P: MemoryProfile> Drop for LockFreeStack<T, P> {
    fn drop(&mut self) {
        // Destruction is quiescent: no thread holds a guard into this
        // stack, so the chain can be freed eagerly. Payloads still in the
        // chain are dropped here; popped ones were moved out already.
        unsafe {
            let guard = epoch::unprotected();
            let mut node = self.top.get().load(Ordering::Relaxed, guard);
            while !node.is_null() {
                let next = node.deref().next.load(Ordering::Relaxed, guard);
                let mut owned = node.into_owned();
                ManuallyDrop::drop(&mut owned.value);
                drop(owned);
                node = next;
            }
        }
    }
}

impl<T, P: MemoryProfile> fmt::Debug for LockFreeStack<T, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LockFreeStack").field("empty", &self.is_empty()).finish()
    }
}

impl<T: Send, P: MemoryProfile> Container<T> for LockFreeStack<T, P> {
    fn push(&self, value: T) {
        LockFreeStack::push(self, value);
    }

    fn try_pop(&self) -> Option<T> {
        LockFreeStack::try_pop(self)
    }

    fn is_empty(&self) -> bool {
        LockFreeStack::is_empty(self)
    }
}
