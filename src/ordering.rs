//! Memory-ordering profiles for the lock-free containers.
//!
//! The lock-free queue and stack each come in two flavors that run the same
//! algorithm under different atomic orderings. Rather than duplicating the
//! sources, the orderings are factored into a sealed trait of constants and
//! selected with a marker type parameter.
//!
//! [`Strict`] is the correctness baseline: every atomic operation is
//! sequentially consistent.
//!
//! [`Relaxed`] is a benchmarking experiment that weakens everything it can
//! without introducing undefined behavior. The payload handoff still needs
//! one Release/Acquire edge: the producer publishes the successor link
//! after writing the payload, and a consumer must observe that link before
//! reading the payload. So the publication store stays `Release`, snapshot
//! loads stay `Acquire`, and the tail exchange stays `AcqRel`; weakening
//! those as well would make the payload write a data race. Everything else
//! (CAS failure orderings) drops to `Relaxed`.

use core::sync::atomic::Ordering;

mod private {
    pub trait Sealed {}
    impl Sealed for super::Strict {}
    impl Sealed for super::Relaxed {}
}

/// Atomic orderings used by the lock-free container protocols.
///
/// Sealed: the two profiles exhaust the configurations this crate supports.
pub trait MemoryProfile: private::Sealed + Send + Sync + 'static {
    /// Snapshot loads of the head/tail pointers and successor links.
    const LOAD: Ordering;
    /// The tail exchange that claims a unique predecessor node.
    const SWAP: Ordering;
    /// The store that publishes a node's successor link.
    const PUBLISH: Ordering;
    /// Success ordering of the detaching compare-exchange.
    const CAS_OK: Ordering;
    /// Failure ordering of the detaching compare-exchange.
    const CAS_FAIL: Ordering;
}

/// Sequentially consistent orderings throughout.
#[derive(Debug)]
pub enum Strict {}

impl MemoryProfile for Strict {
    const LOAD: Ordering = Ordering::SeqCst;
    const SWAP: Ordering = Ordering::SeqCst;
    const PUBLISH: Ordering = Ordering::SeqCst;
    const CAS_OK: Ordering = Ordering::SeqCst;
    const CAS_FAIL: Ordering = Ordering::SeqCst;
}

/// The weakest orderings that keep the payload handoff race-free.
///
/// Experimental: exists so the cost of sequential consistency can be
/// measured, not as a recommended configuration.
#[derive(Debug)]
pub enum Relaxed {}

impl MemoryProfile for Relaxed {
    const LOAD: Ordering = Ordering::Acquire;
    const SWAP: Ordering = Ordering::AcqRel;
    const PUBLISH: Ordering = Ordering::Release;
    const CAS_OK: Ordering = Ordering::AcqRel;
    const CAS_FAIL: Ordering = Ordering::Relaxed;
}
