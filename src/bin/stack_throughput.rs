//! Throughput comparison driver for the stack variants.
//!
//! Runs the same producer/consumer workload against every stack variant and
//! reports per-variant timing statistics:
//!
//! ```text
//! stack_throughput <elements> <producers> <consumers> <head-start-ms> <iterations>
//! ```

use std::mem;
use std::time::Duration;

use clap::Parser;
use tracing::info;

use tandem::bench::{run_trial, Summary, Workload};
use tandem::{CoarseStack, LockFreeStack, RelaxedLockFreeStack};

/// Compare stack implementations under a concurrent workload.
#[derive(Debug, Parser)]
#[command(name = "stack_throughput", version, about)]
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
    println!("{:<25}{:<10} [bytes]", "Size of empty stack:", empty_size);
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
        "coarse stack (single mutex)",
        mem::size_of::<CoarseStack<usize>>(),
        workload.iterations,
        run_trial(&workload, CoarseStack::<usize>::new),
    );

    info!(variant = "lock-free", "running trial");
    report(
        "lock-free stack (seq-cst)",
        mem::size_of::<LockFreeStack<usize>>(),
        workload.iterations,
        run_trial(&workload, LockFreeStack::<usize>::new),
    );

    info!(variant = "lock-free-relaxed", "running trial");
    report(
        "lock-free stack (relaxed, experimental)",
        mem::size_of::<RelaxedLockFreeStack<usize>>(),
        workload.iterations,
        run_trial(&workload, RelaxedLockFreeStack::<usize>::default),
    );
}
