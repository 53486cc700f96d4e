//! Basic usage walkthrough.
//!
//! Shows the shared surface of the container variants: plain push/pop, the
//! blocking `wait_pop`, and sharing one container across producer and
//! consumer threads.

use std::sync::Arc;
use std::thread;

use tandem::{CoarseStack, LockFreeQueue, SplitQueue};

fn main() {
    println!("tandem usage example");
    println!("====================");

    // Plain FIFO on the lock-free queue.
    println!("\n1. Push/pop on a lock-free queue:");
    let queue = LockFreeQueue::new();
    queue.push(42);
    queue.push(24);
    println!("   pushed: 42, 24");
    println!("   popped: {:?}, {:?}", queue.try_pop(), queue.try_pop());

    // LIFO on the coarse stack, with an exact length.
    println!("\n2. LIFO on a coarse stack:");
    let stack = CoarseStack::new();
    for word in ["first", "second", "third"] {
        stack.push(word);
    }
    println!("   len after three pushes: {}", stack.len());
    while let Some(word) = stack.try_pop() {
        println!("   popped: {word}");
    }

    // Blocking consumption on the split queue.
    println!("\n3. wait_pop on a split queue:");
    let shared = Arc::new(SplitQueue::new());

    let consumer = thread::spawn({
        let shared = Arc::clone(&shared);
        move || {
            let mut total = 0u64;
            for _ in 0..4 {
                let value = shared.wait_pop();
                println!("   consumer received {value}");
                total += value;
            }
            total
        }
    });

    let producer = thread::spawn({
        let shared = Arc::clone(&shared);
        move || {
            for value in 1..=4u64 {
                shared.push(value * 10);
            }
        }
    });

    producer.join().unwrap();
    let total = consumer.join().unwrap();
    println!("   consumer total: {total}");

    // In-place construction at the push site.
    println!("\n4. push_with builds the value at the push site:");
    let queue = LockFreeQueue::new();
    queue.push_with(|| "constructed on demand".to_string());
    println!("   popped: {:?}", queue.try_pop());
}
