// src/error.rs

use core::fmt;
use thiserror::Error;

/// Error returned by [`CircularBuffer::push`](crate::CircularBuffer::push) when the
/// buffer already holds `N` items. The rejected value is handed back.
///
/// Pushing into a full buffer is a caller bug: the owner of the buffer is expected
/// to check `is_full()` (under whatever lock it holds) before writing.
#[derive(Error, PartialEq, Eq, Clone)]
#[error("circular buffer full")]
pub struct PushError<T>(pub T);

impl<T> PushError<T> {
  /// Consumes the error, returning the value that could not be pushed.
  #[inline]
  pub fn into_inner(self) -> T {
    self.0
  }
}

impl<T> fmt::Debug for PushError<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "PushError(..)")
  }
}

/// Error returned by the blocking [`BoundedQueue::enqueue`](crate::BoundedQueue::enqueue).
///
/// Closing a queue is the producer side's own promise that no more input will
/// arrive, so seeing this error means the producers are not synchronized with
/// whoever owns shutdown. It is not a transient condition and retrying is
/// pointless: a closed queue never reopens.
#[derive(Error, PartialEq, Eq, Clone)]
pub enum EnqueueError<T> {
  /// The queue was closed before or while the producer was waiting for space.
  /// The value being enqueued is returned.
  #[error("enqueue on closed queue")]
  Closed(T),
}

impl<T> EnqueueError<T> {
  /// Consumes the error, returning the value that was not enqueued.
  #[inline]
  pub fn into_inner(self) -> T {
    match self {
      EnqueueError::Closed(v) => v,
    }
  }
}

impl<T> fmt::Debug for EnqueueError<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      EnqueueError::Closed(_) => write!(f, "EnqueueError::Closed(..)"),
    }
  }
}

/// Error returned by [`BoundedQueue::try_enqueue`](crate::BoundedQueue::try_enqueue)
/// when the value could not be enqueued immediately.
#[derive(Error, PartialEq, Eq, Clone)]
pub enum TryEnqueueError<T> {
  /// The queue is open but every slot is occupied.
  #[error("queue full")]
  Full(T),
  /// The queue has been closed.
  #[error("enqueue on closed queue")]
  Closed(T),
}

impl<T> TryEnqueueError<T> {
  /// Consumes the error, returning the value that was not enqueued.
  #[inline]
  pub fn into_inner(self) -> T {
    match self {
      TryEnqueueError::Full(v) | TryEnqueueError::Closed(v) => v,
    }
  }

  /// Returns `true` if the queue was full rather than closed.
  #[inline]
  pub fn is_full(&self) -> bool {
    matches!(self, TryEnqueueError::Full(_))
  }

  /// Returns `true` if the queue was closed.
  #[inline]
  pub fn is_closed(&self) -> bool {
    matches!(self, TryEnqueueError::Closed(_))
  }
}

impl<T> fmt::Debug for TryEnqueueError<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      TryEnqueueError::Full(_) => write!(f, "TryEnqueueError::Full(..)"),
      TryEnqueueError::Closed(_) => write!(f, "TryEnqueueError::Closed(..)"),
    }
  }
}

impl<T> From<EnqueueError<T>> for TryEnqueueError<T> {
  fn from(err: EnqueueError<T>) -> Self {
    match err {
      EnqueueError::Closed(v) => TryEnqueueError::Closed(v),
    }
  }
}

/// Error returned by [`BoundedQueue::try_dequeue`](crate::BoundedQueue::try_dequeue)
/// when no item could be taken immediately.
#[derive(Error, Debug, PartialEq, Eq, Clone, Copy)]
pub enum TryDequeueError {
  /// The queue is open but currently holds no items.
  #[error("queue empty")]
  Empty,
  /// The queue is closed and fully drained. This is end-of-stream, and every
  /// later attempt will report the same.
  #[error("queue closed and drained")]
  Closed,
}
