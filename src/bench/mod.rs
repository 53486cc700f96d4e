//! Producer/consumer trial harness shared by the throughput binaries.
//!
//! A trial constructs a fresh container per iteration, spawns the producer
//! threads, gives them a configurable head start, spawns the consumer
//! threads, and times the whole run. Consumers use `try_pop` and tolerate
//! empty returns, so the harness drives the blocking and lock-free variants
//! identically through the [`Container`] trait.

pub mod stopwatch;

pub use stopwatch::Stopwatch;

use std::fmt;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::Container;

/// Workload parameters for one trial.
#[derive(Debug, Clone, Copy)]
pub struct Workload {
    /// Number of elements each producer pushes and each consumer attempts
    /// to pop.
    pub elements: usize,
    /// Number of producer threads.
    pub producers: usize,
    /// Number of consumer threads.
    pub consumers: usize,
    /// Head start granted to producers before consumers spawn.
    pub head_start: Duration,
    /// Number of timed iterations.
    pub iterations: usize,
}

/// Timing summary over the iterations of one trial.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    /// Mean duration across iterations, in milliseconds.
    pub mean_ms: f64,
    /// Sample standard deviation across iterations, in milliseconds.
    pub stddev_ms: f64,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3} ± {:.3}", self.mean_ms, self.stddev_ms)
    }
}

/// Aggregate per-iteration timings into mean ± sample standard deviation.
///
/// With fewer than two samples the deviation is reported as zero.
pub fn summarize(timings_ms: &[u64]) -> Summary {
    if timings_ms.is_empty() {
        return Summary {
            mean_ms: 0.0,
            stddev_ms: 0.0,
        };
    }

    let sum: u64 = timings_ms.iter().sum();
    let mean = sum as f64 / timings_ms.len() as f64;

    let stddev = if timings_ms.len() < 2 {
        0.0
    } else {
        let squared_error: f64 = timings_ms
            .iter()
            .map(|&ms| {
                let diff = ms as f64 - mean;
                diff * diff
            })
            .sum();
        (squared_error / (timings_ms.len() - 1) as f64).sqrt()
    };

    Summary {
        mean_ms: mean,
        stddev_ms: stddev,
    }
}

/// Run the workload against containers produced by `make`, once per
/// iteration, and summarize the timings.
///
/// Each iteration times the span from the first producer spawn to the last
/// join, then subtracts the head start so the reported figure covers the
/// contended phase.
pub fn run_trial<C, F>(workload: &Workload, make: F) -> Summary
where
    C: Container<usize> + 'static,
    F: Fn() -> C,
{
    let mut timings = Vec::with_capacity(workload.iterations);

    for _ in 0..workload.iterations {
        let container = Arc::new(make());
        let mut workers = Vec::with_capacity(workload.producers + workload.consumers);
        let mut stopwatch = Stopwatch::new();

        stopwatch.start();

        for _ in 0..workload.producers {
            let container = Arc::clone(&container);
            let elements = workload.elements;
            workers.push(thread::spawn(move || {
                for value in 0..elements {
                    container.push(value);
                }
            }));
        }

        thread::sleep(workload.head_start);

        for _ in 0..workload.consumers {
            let container = Arc::clone(&container);
            let elements = workload.elements;
            workers.push(thread::spawn(move || {
                for _ in 0..elements {
                    let _ = container.try_pop();
                }
            }));
        }

        for worker in workers {
            worker.join().unwrap();
        }

        stopwatch.stop();
        timings.push(
            stopwatch
                .elapsed_ms()
                .saturating_sub(workload.head_start.as_millis() as u64),
        );
    }

    summarize(&timings)
}
