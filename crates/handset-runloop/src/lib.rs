//! # Handset RunLoop
//!
//! Thread-bound dispatch loops for the handset service architecture.
//!
//! ## Model
//!
//! - A [`Looper`] is bound to exactly one thread (the one that called
//!   [`Looper::prepare`]) and owns a [`MessageQueue`] ordered by scheduled
//!   time, then by enqueue sequence.
//! - A [`Handler`] is the only way to enqueue work onto a looper. Handlers
//!   are cheap to clone and may be used from any thread.
//! - Only the bound thread dequeues and runs tasks, so no two tasks of one
//!   looper ever run concurrently.
//! - One looper per process is the distinguished main looper, created once
//!   by [`Looper::prepare_main`] and fetched with [`Looper::main`].
//!
//! ## Example
//!
//! ```rust
//! use handset_runloop::Looper;
//! use std::time::Duration;
//!
//! let looper = Looper::prepare().unwrap();
//! let handler = looper.handler();
//!
//! handler.post(|| println!("first")).unwrap();
//! handler
//!     .post_delayed(|| println!("later"), Duration::from_millis(5))
//!     .unwrap();
//!
//! looper.run_for(Duration::from_millis(20)).unwrap();
//! ```

pub mod error;
pub mod handler;
pub mod looper;
pub mod message;
pub mod message_queue;
pub mod stats;

pub use error::{LooperError, LooperResult};
pub use handler::Handler;
pub use looper::{panic_message, Looper};
pub use message::{Message, Task};
pub use message_queue::{MessageQueue, Poll};
pub use stats::{LooperStats, LooperStatsSnapshot};
