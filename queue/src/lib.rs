//! A fixed-capacity, blocking MPMC queue with explicit close/drain semantics.
//!
//! `fibre_queue` provides two layers:
//!
//! - [`CircularBuffer`]: a const-generic ring of `N` slots. It is not synchronized and
//!   is meant to be used under a lock the caller owns.
//! - [`BoundedQueue`]: wraps one `CircularBuffer` with a `parking_lot::Mutex` and two
//!   condition variables. Producers block while it is full, consumers block while it is
//!   empty, and a one-way [`close`](BoundedQueue::close) lets producers announce the end
//!   of input. Consumers drain what is left and then receive `None`.
//!
//! ```
//! use fibre_queue::BoundedQueue;
//! use std::sync::Arc;
//! use std::thread;
//!
//! let queue = Arc::new(BoundedQueue::<u64, 8>::new());
//!
//! let consumers: Vec<_> = (0..2)
//!   .map(|_| {
//!     let queue = Arc::clone(&queue);
//!     thread::spawn(move || queue.iter().sum::<u64>())
//!   })
//!   .collect();
//!
//! for i in 1..=100 {
//!   queue.enqueue(i).unwrap();
//! }
//! queue.close();
//!
//! let total: u64 = consumers.into_iter().map(|h| h.join().unwrap()).sum();
//! assert_eq!(total, 5050);
//! ```

pub mod bounded;
pub mod error;
pub mod ring;
pub mod telemetry;

pub use bounded::{BoundedQueue, Iter};
pub use error::{EnqueueError, PushError, TryDequeueError, TryEnqueueError};
pub use ring::CircularBuffer;
