// Requires the `fibre_telemetry` feature; the collector is global, so every test here
// runs serially and starts from a cleared state.

use fibre_queue::{telemetry, BoundedQueue};

use serial_test::serial;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[test]
#[serial]
fn close_is_counted_once() {
  telemetry::clear_telemetry();
  let queue = BoundedQueue::<u8, 2>::new();
  queue.close();
  queue.close();
  assert_eq!(telemetry::counter_value("BoundedQueue::close", "closed"), 1);

  let events = telemetry::events();
  assert_eq!(events.len(), 1);
  assert_eq!(events[0].event_type, "Closed");
  assert_eq!(events[0].message.as_deref(), Some("remaining=0"));
}

#[test]
#[serial]
fn end_of_stream_observations_are_counted() {
  telemetry::clear_telemetry();
  let queue = BoundedQueue::<u8, 2>::new();
  queue.close();
  for _ in 0..3 {
    assert_eq!(queue.dequeue(), None);
  }
  assert!(queue.try_dequeue().is_err());
  assert_eq!(telemetry::counter_value("BoundedQueue::dequeue", "end_of_stream"), 4);
}

#[test]
#[serial]
fn parked_consumer_is_counted() {
  telemetry::clear_telemetry();
  let queue = Arc::new(BoundedQueue::<u8, 2>::new());
  let consumer = {
    let queue = Arc::clone(&queue);
    thread::spawn(move || queue.dequeue())
  };

  thread::sleep(Duration::from_millis(100));
  queue.enqueue(7).unwrap();
  assert_eq!(consumer.join().unwrap(), Some(7));
  assert!(telemetry::counter_value("BoundedQueue::dequeue", "park") >= 1);
  assert_eq!(telemetry::counter_value("BoundedQueue::enqueue", "park"), 0);
  telemetry::print_telemetry_report();
}
