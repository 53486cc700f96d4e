//! Throughput comparison driver for the queue variants.
//!
//! Runs the same producer/consumer workload against every queue variant and
//! reports per-variant timing statistics:
//!
//! ```text
//! queue_throughput <elements> <producers> <consumers> <head-start-ms> <iterations>
//! ```

use std::mem;
use std::time::Duration;

use clap::Parser;
use tracing::info;

use tandem::bench::{run_trial, Summary, Workload};
use tandem::{CoarseQueue, LockFreeQueue, RelaxedLockFreeQueue, SplitQueue};

/// Compare queue implementations under a concurrent workload.
#[derive(Debug, Parser)]
#[command(name = "queue_throughput", version, about)]
struct Cli {
    /// Number of elements each producer pushes and each consumer tries to pop
    elements: usize,
    /// Number of producer threads
    producers: usize,
    /// Number of consumer threads
    consumers: usize,
    /// Head start in milliseconds granted to producers before consumers spawn
    head_start_ms: u64,
    /// Number of timed iterations per variant
    iterations: usize,
}

const SEPARATOR: &str = "--------------------------------------------------";

fn report(name: &str, empty_size: usize, iterations: usize, summary: Summary) {
    println!("{SEPARATOR}");
    println!("{name} (avg of {iterations} runs)");
    println!("{:<25}{:<10} [bytes]", "Size of empty queue:", empty_size);
    println!("{:<25}{:<10} [ms]", "Test duration:", summary.to_string());
    println!("{SEPARATOR}");
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let workload = Workload {
        elements: cli.elements,
        producers: cli.producers,
        consumers: cli.consumers,
        head_start: Duration::from_millis(cli.head_start_ms),
        iterations: cli.iterations,
    };

    println!("elements: {}", workload.elements);
    println!("producers: {}", workload.producers);
    println!("consumers: {}", workload.consumers);
    println!("head start [ms]: {}", cli.head_start_ms);
    println!("iterations: {}", workload.iterations);

    info!(variant = "coarse", "running trial");
    report(
        "coarse queue (single mutex)",
        mem::size_of::<CoarseQueue<usize>>(),
        workload.iterations,
        run_trial(&workload, CoarseQueue::<usize>::new),
    );

    info!(variant = "split", "running trial");
    report(
        "split queue (front/back mutexes)",
        mem::size_of::<SplitQueue<usize>>(),
        workload.iterations,
        run_trial(&workload, SplitQueue::<usize>::new),
    );

    info!(variant = "lock-free", "running trial");
    report(
        "lock-free queue (seq-cst)",
        mem::size_of::<LockFreeQueue<usize>>(),
        workload.iterations,
        run_trial(&workload, LockFreeQueue::<usize>::new),
    );

    info!(variant = "lock-free-relaxed", "running trial");
    report(
        "lock-free queue (relaxed, experimental)",
        mem::size_of::<RelaxedLockFreeQueue<usize>>(),
        workload.iterations,
        run_trial(&workload, RelaxedLockFreeQueue::<usize>::default),
    );
}
