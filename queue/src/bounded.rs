// src/bounded.rs

//! A fixed-capacity, blocking MPMC queue with an explicit, one-way close.
//!
//! `BoundedQueue` embeds one [`CircularBuffer`] and guards it, together with a
//! `closed` flag, behind a single `parking_lot::Mutex`. Two condition variables
//! carry the wait/notify protocol:
//!
//! - `producers` ("space available"): `enqueue` parks here while the buffer is full
//!   and the queue is open.
//! - `consumers` ("item available"): `dequeue` parks here while the buffer is empty
//!   and the queue is open.
//!
//! ### Protocol
//!
//! 1.  **One lock, one resource group**: the buffer, its indices and `closed` are
//!     only read or written while holding `state`. Every push and pop is therefore
//!     totally ordered and the queue is globally FIFO.
//! 2.  **Notify after unlock**: the guard is dropped before the opposite condition
//!     variable is signalled, so a woken thread never immediately blocks on the lock
//!     it was woken to take.
//! 3.  **One wake per slot**: a successful enqueue makes exactly one item available
//!     and wakes exactly one consumer; a successful dequeue frees exactly one slot and
//!     wakes exactly one producer.
//! 4.  **Broadcast on close**: `close` wakes every consumer and every producer. A
//!     consumer that finds the queue closed and drained re-broadcasts to the other
//!     consumers, so end-of-stream reaches every blocked reader.
//!
//! There is no fairness among threads parked on the same condition, and no blocking
//! call takes a timeout. The only way to release a parked consumer from outside is
//! [`BoundedQueue::close`].

use crate::error::{EnqueueError, TryDequeueError, TryEnqueueError};
use crate::ring::CircularBuffer;
use crate::telemetry;

use parking_lot::{Condvar, Mutex};
use std::fmt;
use std::iter::FusedIterator;
use tracing::{debug, error, trace};

/// State guarded by the queue's mutex.
struct QueueState<T, const N: usize> {
  buffer: CircularBuffer<T, N>,
  /// Write-once: flips from `false` to `true` in `close` and never back.
  closed: bool,
}

impl<T, const N: usize> QueueState<T, N> {
  /// Pushes into a buffer the caller has already checked is not full.
  fn push_unchecked(&mut self, value: T) {
    if self.buffer.push(value).is_err() {
      unreachable!("pushed into a full buffer while holding the queue lock");
    }
  }

  /// Pops from a buffer the caller has already checked is not empty.
  fn pop_unchecked(&mut self) -> T {
    match self.buffer.pop() {
      Some(value) => value,
      None => unreachable!("popped from an empty buffer while holding the queue lock"),
    }
  }
}

/// A fixed-capacity, thread-safe, multi-producer/multi-consumer blocking queue.
///
/// The queue is shared by reference (typically through an `Arc` or a scoped
/// thread). Producers call [`enqueue`](Self::enqueue), consumers call
/// [`dequeue`](Self::dequeue), and whichever party owns shutdown calls
/// [`close`](Self::close) once no more input will arrive. Consumers keep draining
/// the remaining items and then receive `None`.
///
/// # Example
/// ```
/// use fibre_queue::BoundedQueue;
/// use std::thread;
///
/// let queue = BoundedQueue::<u32, 4>::new();
///
/// thread::scope(|s| {
///   s.spawn(|| {
///     for i in 0..16 {
///       queue.enqueue(i).unwrap();
///     }
///     queue.close();
///   });
///
///   let received: Vec<u32> = queue.iter().collect();
///   assert_eq!(received, (0..16).collect::<Vec<_>>());
/// });
/// ```
pub struct BoundedQueue<T, const N: usize> {
  state: Mutex<QueueState<T, N>>,
  /// Parked producers, signalled when a slot frees up or the queue closes.
  producers: Condvar,
  /// Parked consumers, signalled when an item arrives or the queue closes.
  consumers: Condvar,
  name: Option<String>,
}

impl<T, const N: usize> BoundedQueue<T, N> {
  /// Creates a new, open, empty queue.
  pub fn new() -> Self {
    BoundedQueue {
      state: Mutex::new(QueueState {
        buffer: CircularBuffer::new(),
        closed: false,
      }),
      producers: Condvar::new(),
      consumers: Condvar::new(),
      name: None,
    }
  }

  /// Creates a new, open, empty queue labelled `name` in log output.
  pub fn with_name(name: impl Into<String>) -> Self {
    BoundedQueue {
      name: Some(name.into()),
      ..Self::new()
    }
  }

  /// Returns the label given at construction, if any.
  pub fn name(&self) -> Option<&str> {
    self.name.as_deref()
  }

  #[inline]
  fn label(&self) -> &str {
    self.name.as_deref().unwrap_or("unnamed")
  }

  /// Enqueues `value`, blocking the current thread while the queue is full.
  ///
  /// Returns once the value has been written, or fails with
  /// [`EnqueueError::Closed`] if the queue is (or becomes, while waiting) closed.
  /// A closed queue means the producer side already declared end-of-input, so this
  /// error indicates a synchronization bug in the caller rather than a race worth
  /// retrying.
  pub fn enqueue(&self, value: T) -> Result<(), EnqueueError<T>> {
    let mut guard = self.state.lock();
    while !guard.closed && guard.buffer.is_full() {
      telemetry::increment_counter("BoundedQueue::enqueue", "park");
      trace!(queue = self.label(), "producer parked on full queue");
      self.producers.wait(&mut guard);
    }

    if guard.closed {
      drop(guard);
      error!(queue = self.label(), "enqueue on closed queue");
      return Err(EnqueueError::Closed(value));
    }

    guard.push_unchecked(value);
    drop(guard);
    self.consumers.notify_one();
    Ok(())
  }

  /// Attempts to enqueue `value` without blocking.
  pub fn try_enqueue(&self, value: T) -> Result<(), TryEnqueueError<T>> {
    let mut guard = self.state.lock();
    if guard.closed {
      return Err(TryEnqueueError::Closed(value));
    }
    if guard.buffer.is_full() {
      return Err(TryEnqueueError::Full(value));
    }

    guard.push_unchecked(value);
    drop(guard);
    self.consumers.notify_one();
    Ok(())
  }

  /// Dequeues the oldest item, blocking the current thread while the queue is empty
  /// and open.
  ///
  /// Returns `None` once the queue is closed and drained. This is the end-of-stream
  /// signal, not an error: every later call returns `None` as well, and consumers
  /// should exit their loop on it.
  pub fn dequeue(&self) -> Option<T> {
    let mut guard = self.state.lock();
    while !guard.closed && guard.buffer.is_empty() {
      telemetry::increment_counter("BoundedQueue::dequeue", "park");
      trace!(queue = self.label(), "consumer parked on empty queue");
      self.consumers.wait(&mut guard);
    }

    if guard.buffer.is_empty() {
      debug_assert!(guard.closed);
      drop(guard);
      self.end_of_stream();
      return None;
    }

    let value = guard.pop_unchecked();
    drop(guard);
    self.producers.notify_one();
    Some(value)
  }

  /// Attempts to dequeue the oldest item without blocking.
  pub fn try_dequeue(&self) -> Result<T, TryDequeueError> {
    let mut guard = self.state.lock();
    if guard.buffer.is_empty() {
      let closed = guard.closed;
      drop(guard);
      if closed {
        self.end_of_stream();
        return Err(TryDequeueError::Closed);
      }
      return Err(TryDequeueError::Empty);
    }

    let value = guard.pop_unchecked();
    drop(guard);
    self.producers.notify_one();
    Ok(value)
  }

  // Closed and drained: pass the news on to every other parked consumer.
  fn end_of_stream(&self) {
    telemetry::increment_counter("BoundedQueue::dequeue", "end_of_stream");
    trace!(queue = self.label(), "consumer observed end-of-stream");
    self.consumers.notify_all();
  }

  /// Closes the queue. No further items are accepted; items already buffered can
  /// still be dequeued, after which consumers receive end-of-stream.
  ///
  /// Every parked consumer and every parked producer is woken. Producers observe the
  /// closed flag and fail with [`EnqueueError::Closed`] instead of staying parked
  /// until some consumer frees a slot.
  ///
  /// Closing is one-way. Calling this on an already closed queue does nothing.
  pub fn close(&self) {
    let mut guard = self.state.lock();
    if guard.closed {
      drop(guard);
      trace!(queue = self.label(), "close on already closed queue");
      return;
    }
    guard.closed = true;
    let remaining = guard.buffer.size();
    drop(guard);

    debug!(queue = self.label(), remaining, "queue closed");
    telemetry::increment_counter("BoundedQueue::close", "closed");
    telemetry::log_event(
      None,
      "BoundedQueue::close",
      "Closed",
      Some(format!("remaining={}", remaining)),
    );

    self.consumers.notify_all();
    self.producers.notify_all();
  }

  /// Returns the number of buffered items.
  ///
  /// This is a snapshot taken under the lock; with concurrent producers or consumers
  /// it may be stale by the time it is read. Use it for diagnostics, not for flow
  /// control.
  pub fn size(&self) -> usize {
    self.state.lock().buffer.size()
  }

  /// Returns `true` if the queue holds no items. Advisory, like [`size`](Self::size).
  #[inline]
  pub fn is_empty(&self) -> bool {
    self.size() == 0
  }

  /// Returns `true` if every slot is occupied. Advisory, like [`size`](Self::size).
  #[inline]
  pub fn is_full(&self) -> bool {
    self.size() == N
  }

  /// Returns `true` once [`close`](Self::close) has been called. Unlike the
  /// occupancy queries this never goes stale in the other direction: a closed queue
  /// stays closed.
  pub fn is_closed(&self) -> bool {
    self.state.lock().closed
  }

  /// Returns the fixed capacity `N`.
  #[inline]
  pub const fn capacity(&self) -> usize {
    N
  }

  /// Returns a blocking iterator that dequeues until end-of-stream.
  pub fn iter(&self) -> Iter<'_, T, N> {
    Iter { queue: self }
  }
}

impl<T, const N: usize> Default for BoundedQueue<T, N> {
  fn default() -> Self {
    Self::new()
  }
}

impl<T, const N: usize> fmt::Debug for BoundedQueue<T, N> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mut s = f.debug_struct("BoundedQueue");
    s.field("name", &self.name).field("capacity", &N);
    match self.state.try_lock() {
      Some(guard) => s.field("size", &guard.buffer.size()).field("closed", &guard.closed),
      None => s.field("state", &"<locked>"),
    };
    s.finish_non_exhaustive()
  }
}

/// A blocking iterator over the items of a [`BoundedQueue`].
///
/// Each call to `next` is a [`dequeue`](BoundedQueue::dequeue); iteration ends at
/// end-of-stream. Several consumers may iterate the same queue concurrently, each
/// item is yielded to exactly one of them.
#[derive(Debug)]
pub struct Iter<'a, T, const N: usize> {
  queue: &'a BoundedQueue<T, N>,
}

impl<T, const N: usize> Iterator for Iter<'_, T, N> {
  type Item = T;

  fn next(&mut self) -> Option<T> {
    self.queue.dequeue()
  }
}

// End-of-stream is terminal: nothing can be enqueued after close.
impl<T, const N: usize> FusedIterator for Iter<'_, T, N> {}

impl<'a, T, const N: usize> IntoIterator for &'a BoundedQueue<T, N> {
  type Item = T;
  type IntoIter = Iter<'a, T, N>;

  fn into_iter(self) -> Self::IntoIter {
    self.iter()
  }
}
