//! Cadence Core Runtime
//!
//! This crate provides the foundational primitives for the Cadence animation
//! engine:
//!
//! - **Listener Dispatch**: Ordered handler sets that tolerate re-entrant calls
//! - **Clocks**: Monotonic time sources, real or manually advanced
//! - **Tick Sources**: The host event loop's timer contract
//!
//! # Example
//!
//! ```rust
//! use cadence_core::events::{dispatch, Listeners};
//!
//! struct Counter {
//!     hits: u32,
//!     listeners: Listeners<Counter, u32>,
//! }
//!
//! let mut counter = Counter { hits: 0, listeners: Listeners::new() };
//! counter.listeners.connect(|c: &mut Counter, step: &u32| c.hits += step);
//!
//! dispatch(&mut counter, &3, |c| Some(&mut c.listeners));
//! assert_eq!(counter.hits, 3);
//! ```

pub mod clock;
pub mod events;
pub mod ticker;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use events::{dispatch, Handler, ListenerId, Listeners};
pub use ticker::{FrameTicker, TickSource};
