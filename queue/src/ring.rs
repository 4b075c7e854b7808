// src/ring.rs

//! A fixed-capacity circular buffer with wraparound read and write indices.
//!
//! `CircularBuffer` does no synchronization of its own. Every mutating method takes
//! `&mut self`, so sharing one between threads requires an external lock; inside this
//! crate it is only ever reached through the `MutexGuard` of a
//! [`BoundedQueue`](crate::BoundedQueue).
//!
//! ### Layout
//!
//! - `slots`: `N` storage cells. An occupied cell is `Some`, a free one `None`.
//! - `back`: the next slot to write.
//! - `front`: the next slot to read.
//! - `count`: the number of occupied slots, `0 ..= N`.
//!
//! Both indices advance modulo `N` exactly once per successful write or read.

use crate::error::PushError;

use std::fmt;

/// A fixed-capacity FIFO ring of `N` slots holding values of type `T`.
///
/// A capacity of `0` is rejected at compile time.
///
/// # Example
/// ```
/// use fibre_queue::CircularBuffer;
///
/// let mut buf = CircularBuffer::<u32, 2>::new();
/// buf.push(1).unwrap();
/// buf.push(2).unwrap();
/// assert!(buf.is_full());
/// assert_eq!(buf.pop(), Some(1));
/// assert_eq!(buf.pop(), Some(2));
/// assert!(buf.is_empty());
/// ```
pub struct CircularBuffer<T, const N: usize> {
  slots: [Option<T>; N],
  front: usize,
  back: usize,
  count: usize,
}

impl<T, const N: usize> CircularBuffer<T, N> {
  const NONZERO_CAPACITY: () = assert!(N > 0, "CircularBuffer capacity must be greater than 0");

  /// Creates an empty buffer with all `N` slots free.
  pub fn new() -> Self {
    #[allow(clippy::let_unit_value)]
    let () = Self::NONZERO_CAPACITY;
    CircularBuffer {
      slots: std::array::from_fn(|_| None),
      front: 0,
      back: 0,
      count: 0,
    }
  }

  /// Writes `value` into the next free slot.
  ///
  /// The caller must ensure the buffer is not full. If it is, nothing is written,
  /// the indices are untouched, and the value comes back inside the error.
  pub fn push(&mut self, value: T) -> Result<(), PushError<T>> {
    if self.is_full() {
      return Err(PushError(value));
    }
    debug_assert!(self.slots[self.back].is_none(), "write slot {} still occupied", self.back);
    self.slots[self.back] = Some(value);
    self.back = (self.back + 1) % N;
    self.count += 1;
    Ok(())
  }

  /// Removes and returns the oldest value, or `None` if the buffer is empty.
  ///
  /// Like [`push`](Self::push), calling this on an empty buffer is a caller bug;
  /// `None` is reported instead of touching any index.
  pub fn pop(&mut self) -> Option<T> {
    if self.is_empty() {
      return None;
    }
    let value = self.slots[self.front].take();
    debug_assert!(value.is_some(), "read slot {} was empty with count {}", self.front, self.count);
    self.front = (self.front + 1) % N;
    self.count -= 1;
    value
  }

  #[inline]
  pub fn is_full(&self) -> bool {
    self.count == N
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.count == 0
  }

  /// Returns the number of occupied slots.
  #[inline]
  pub fn size(&self) -> usize {
    self.count
  }

  /// Returns the fixed capacity `N`.
  #[inline]
  pub const fn capacity(&self) -> usize {
    N
  }
}

impl<T, const N: usize> Default for CircularBuffer<T, N> {
  fn default() -> Self {
    Self::new()
  }
}

impl<T, const N: usize> fmt::Debug for CircularBuffer<T, N> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("CircularBuffer")
      .field("capacity", &N)
      .field("front", &self.front)
      .field("back", &self.back)
      .field("count", &self.count)
      .finish_non_exhaustive()
  }
}
