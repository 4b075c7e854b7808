// examples/pipeline.rs
//
// Run with: RUST_LOG=info,fibre_queue=debug cargo run --example pipeline

use fibre_queue::{BoundedQueue, EnqueueError};
use std::{
  sync::atomic::{AtomicUsize, Ordering},
  sync::Arc,
  thread,
  time::Duration,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

const CAPACITY: usize = 5;

fn producer(queue: &BoundedQueue<usize, CAPACITY>, produced: &AtomicUsize, id: usize, items: usize) {
  for i in 0..items {
    info!(thread = id, item = i, "enqueueing");
    if let Err(EnqueueError::Closed(item)) = queue.enqueue(i) {
      info!(thread = id, item, "queue closed, stopping");
      return;
    }
    produced.fetch_add(1, Ordering::SeqCst);
  }
}

fn consumer(queue: &BoundedQueue<usize, CAPACITY>, consumed: &AtomicUsize, id: usize) {
  loop {
    info!(thread = id, "WAIT");
    match queue.dequeue() {
      Some(value) => {
        info!(thread = id, value, "dequeued");
        consumed.fetch_add(1, Ordering::SeqCst);
      }
      None => {
        info!(thread = id, "DONE");
        return;
      }
    }
  }
}

fn run(num_producers: usize, num_consumers: usize, items_per_producer: usize) {
  let queue = Arc::new(BoundedQueue::<usize, CAPACITY>::with_name("pipeline"));
  let produced = Arc::new(AtomicUsize::new(0));
  let consumed = Arc::new(AtomicUsize::new(0));

  let producers: Vec<_> = (0..num_producers)
    .map(|id| {
      let queue = Arc::clone(&queue);
      let produced = Arc::clone(&produced);
      thread::spawn(move || producer(&queue, &produced, id, items_per_producer))
    })
    .collect();

  let consumers: Vec<_> = (num_producers..num_producers + num_consumers)
    .map(|id| {
      let queue = Arc::clone(&queue);
      let consumed = Arc::clone(&consumed);
      thread::spawn(move || consumer(&queue, &consumed, id))
    })
    .collect();

  for handle in producers {
    handle.join().unwrap();
  }

  // Whoever owns shutdown closes only after every producer has returned.
  while consumed.load(Ordering::SeqCst) < produced.load(Ordering::SeqCst) {
    thread::sleep(Duration::from_millis(1));
  }
  info!("CLOSING");
  queue.close();

  for handle in consumers {
    handle.join().unwrap();
  }

  println!("Produced items: {}", produced.load(Ordering::SeqCst));
  println!("Consumed items: {}", consumed.load(Ordering::SeqCst));
  assert_eq!(produced.load(Ordering::SeqCst), consumed.load(Ordering::SeqCst));
}

fn main() {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
    .with_thread_names(true)
    .init();

  println!("--- More consumers than producers ---");
  run(4, 10, 100);

  println!("\n--- More producers than consumers ---");
  run(10, 2, 100);

  fibre_queue::telemetry::print_telemetry_report();
}
