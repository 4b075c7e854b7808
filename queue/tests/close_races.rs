// tests/close_races.rs

mod common;
use common::*;

use fibre_queue::{BoundedQueue, EnqueueError};

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Runs `scenario` on its own thread and fails the test if it has not finished within
/// `limit`. A hang in the wait/notify protocol shows up here instead of stalling the
/// whole suite.
fn with_watchdog<F>(limit: Duration, scenario: F)
where
  F: FnOnce() + Send + 'static,
{
  let finished = Arc::new(AtomicBool::new(false));
  let finished_clone = Arc::clone(&finished);
  let handle = thread::spawn(move || {
    scenario();
    finished_clone.store(true, Ordering::SeqCst);
  });

  let start = Instant::now();
  while !finished.load(Ordering::SeqCst) {
    if handle.is_finished() {
      break;
    }
    if start.elapsed() > limit {
      panic!("Scenario timed out after {:?}. Likely deadlock or lost wakeup.", limit);
    }
    thread::sleep(Duration::from_millis(10));
  }
  handle.join().expect("Scenario panicked");
}

#[test]
fn close_during_in_flight_enqueue_and_dequeue() {
  init_tracing();
  with_watchdog(STRESS_TIMEOUT, || {
    for round in 0..20 {
      let queue = Arc::new(BoundedQueue::<usize, 2>::with_name("close-race"));
      let accepted = Arc::new(AtomicUsize::new(0));
      let rejected = Arc::new(AtomicUsize::new(0));

      let producers: Vec<_> = (0..4)
        .map(|p| {
          let queue = Arc::clone(&queue);
          let accepted = Arc::clone(&accepted);
          let rejected = Arc::clone(&rejected);
          thread::spawn(move || {
            for i in 0.. {
              match queue.enqueue(p * 1_000_000 + i) {
                Ok(()) => {
                  accepted.fetch_add(1, Ordering::SeqCst);
                }
                Err(EnqueueError::Closed(_)) => {
                  rejected.fetch_add(1, Ordering::SeqCst);
                  return;
                }
              }
            }
          })
        })
        .collect();

      let consumers: Vec<_> = (0..3)
        .map(|_| {
          let queue = Arc::clone(&queue);
          thread::spawn(move || queue.iter().count())
        })
        .collect();

      // Vary how far the race has progressed before close lands.
      thread::sleep(Duration::from_micros(200 * (round % 5) as u64));
      queue.close();

      for handle in producers {
        handle.join().unwrap();
      }
      let consumed: usize = consumers.into_iter().map(|h| h.join().unwrap()).sum();

      assert_eq!(rejected.load(Ordering::SeqCst), 4);
      assert_eq!(consumed, accepted.load(Ordering::SeqCst));
      assert_eq!(queue.dequeue(), None);
    }
  });
}

#[test]
fn close_releases_consumers_parked_on_empty_queue() {
  with_watchdog(LONG_TIMEOUT, || {
    let queue = Arc::new(BoundedQueue::<u64, 4>::new());
    let consumers: Vec<_> = (0..8)
      .map(|_| {
        let queue = Arc::clone(&queue);
        thread::spawn(move || queue.dequeue())
      })
      .collect();

    thread::sleep(SHORT_TIMEOUT);
    queue.close();
    for handle in consumers {
      assert_eq!(handle.join().unwrap(), None);
    }
  });
}

#[test]
fn close_releases_producers_parked_on_full_queue() {
  with_watchdog(LONG_TIMEOUT, || {
    let queue = Arc::new(BoundedQueue::<u64, 1>::new());
    queue.enqueue(0).unwrap();

    let producers: Vec<_> = (1..=4)
      .map(|i| {
        let queue = Arc::clone(&queue);
        thread::spawn(move || queue.enqueue(i))
      })
      .collect();

    thread::sleep(SHORT_TIMEOUT);
    queue.close();

    let mut returned: Vec<u64> = producers
      .into_iter()
      .map(|h| h.join().unwrap().unwrap_err().into_inner())
      .collect();
    returned.sort_unstable();
    assert_eq!(returned, vec![1, 2, 3, 4]);
    assert_eq!(queue.dequeue(), Some(0));
    assert_eq!(queue.dequeue(), None);
  });
}

#[test]
fn consumers_racing_close_with_partial_buffer_drain_everything() {
  with_watchdog(LONG_TIMEOUT, || {
    for _ in 0..ITEMS_LOW {
      let queue = Arc::new(BoundedQueue::<u32, 8>::new());
      for i in 0..8 {
        queue.enqueue(i).unwrap();
      }
      let closer = {
        let queue = Arc::clone(&queue);
        thread::spawn(move || queue.close())
      };
      let consumers: Vec<_> = (0..4)
        .map(|_| {
          let queue = Arc::clone(&queue);
          thread::spawn(move || queue.iter().collect::<Vec<_>>())
        })
        .collect();

      closer.join().unwrap();
      let mut all: Vec<u32> = consumers.into_iter().flat_map(|h| h.join().unwrap()).collect();
      all.sort_unstable();
      assert_eq!(all, (0..8).collect::<Vec<_>>());
    }
  });
}
