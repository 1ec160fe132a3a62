//! Cadence Animation System
//!
//! Timed animations, easing curves and animation groups, all driven by one
//! shared timer per scheduler.
//!
//! # Features
//!
//! - **Easing Curves**: The standard Penner family plus elastic, back and
//!   bounce variants with tunable parameters
//! - **Timed Animations**: Looping, reversible, seekable timelines
//! - **Groups**: Sequential and parallel composition, nested to any depth
//! - **Synchronized Start**: Animations started together join the timer
//!   together
//!
//! # Example
//!
//! ```rust
//! use cadence_animation::{AnimationScheduler, EasingType, ManualClock, SchedulerConfig};
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let clock = ManualClock::new();
//! let mut scheduler = AnimationScheduler::with_clock(SchedulerConfig::default(), clock.clone());
//!
//! let opacity = Rc::new(Cell::new(0.0));
//! let target = opacity.clone();
//! let fade = scheduler.add_animation(200, EasingType::Linear, move |_, frame| {
//!     target.set(frame.progress);
//! });
//!
//! scheduler.start(fade);
//! scheduler.pump();
//!
//! clock.advance_ms(100);
//! scheduler.pump();
//! assert!((opacity.get() - 0.5).abs() < 1e-9);
//! ```

pub mod animation;
pub mod config;
pub mod easing;
pub mod error;
mod group;
mod parallel;
pub mod scheduler;
mod sequential;

pub use animation::{
    Animation, AnimationEvent, AnimationId, AnimationState, AnimationType, DeletionPolicy,
    Direction, Frame, Msecs,
};
pub use cadence_core::{FrameTicker, ManualClock};
pub use config::SchedulerConfig;
pub use easing::{ease, EasingCurve, EasingType};
pub use error::{AnimationError, ConfigError};
pub use scheduler::AnimationScheduler;
