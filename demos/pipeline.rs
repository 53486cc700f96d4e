//! A two-stage producer/consumer pipeline.
//!
//! Stage one parses "requests" from a shared lock-free queue; stage two
//! aggregates results from a second queue. Demonstrates driving several
//! containers together and draining with `try_pop` plus a completion
//! counter.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use tandem::LockFreeQueue;

const REQUESTS: usize = 10_000;
const WORKERS: usize = 4;

fn main() {
    println!("tandem pipeline example");
    println!("=======================");

    let requests: Arc<LockFreeQueue<usize>> = Arc::new(LockFreeQueue::new());
    let results: Arc<LockFreeQueue<usize>> = Arc::new(LockFreeQueue::new());
    let processed = Arc::new(AtomicUsize::new(0));

    // Feed the first stage.
    let feeder = thread::spawn({
        let requests = Arc::clone(&requests);
        move || {
            for i in 0..REQUESTS {
                requests.push(i);
            }
        }
    });

    // Stage one: transform requests into results.
    let workers: Vec<_> = (0..WORKERS)
        .map(|_| {
            let requests = Arc::clone(&requests);
            let results = Arc::clone(&results);
            let processed = Arc::clone(&processed);
            thread::spawn(move || {
                while processed.load(Ordering::Relaxed) < REQUESTS {
                    if let Some(value) = requests.try_pop() {
                        results.push(value * 2);
                        processed.fetch_add(1, Ordering::Relaxed);
                    } else {
                        thread::yield_now();
                    }
                }
            })
        })
        .collect();

    feeder.join().unwrap();
    for worker in workers {
        worker.join().unwrap();
    }

    // Stage two: aggregate.
    let mut count = 0usize;
    let mut sum = 0usize;
    while let Some(value) = results.try_pop() {
        count += 1;
        sum += value;
    }

    println!("processed {count} requests");
    println!("aggregate: {sum}");
    assert_eq!(count, REQUESTS);
    assert_eq!(sum, (0..REQUESTS).map(|i| i * 2).sum::<usize>());
    println!("pipeline drained cleanly");
}
