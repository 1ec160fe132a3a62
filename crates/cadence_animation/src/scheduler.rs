//! Animation scheduler
//!
//! Owns every animation of one execution context and drives the running
//! ones from a single shared timer.
//!
//! Starting an animation does not touch the timer directly: the animation is
//! queued and an admission pass is requested from the [`TickSource`]. All
//! animations started before that pass runs join the running set together,
//! so a batch of animations started from the same callback stays in sync.
//! The periodic timer only runs while the running set is non-empty.

use cadence_core::clock::{Clock, MonotonicClock};
use cadence_core::ticker::{FrameTicker, TickSource};
use rustc_hash::FxHashSet;
use slotmap::SlotMap;
use std::time::Duration;

use crate::animation::{
    Animation, AnimationId, AnimationKind, AnimationState, AnimationType, ApplyFn, Direction,
    Frame, Leaf, Msecs,
};
use crate::config::SchedulerConfig;
use crate::easing::EasingCurve;

/// The animation scheduler that ticks all running animations
pub struct AnimationScheduler {
    pub(crate) animations: SlotMap<AnimationId, Animation>,
    /// Animations receiving time deltas, in admission order
    running: Vec<AnimationId>,
    running_set: FxHashSet<AnimationId>,
    /// Registered animations waiting for the next admission pass
    pending: Vec<AnimationId>,
    pending_deletions: Vec<AnimationId>,
    /// Milliseconds since `time_origin` at the previous tick
    last_tick: Msecs,
    /// Clock reading when the periodic timer was started
    time_origin: Option<Duration>,
    inside_tick: bool,
    config: SchedulerConfig,
    clock: Box<dyn Clock>,
    ticker: Box<dyn TickSource>,
}

impl AnimationScheduler {
    /// Scheduler with the default configuration, wall-clock time and an
    /// in-process [`FrameTicker`]
    pub fn new() -> Self {
        Self::with_config(SchedulerConfig::default())
    }

    pub fn with_config(config: SchedulerConfig) -> Self {
        Self::with_parts(config, MonotonicClock::new(), FrameTicker::new())
    }

    /// Scheduler reading time from `clock`, e.g. a shared
    /// [`ManualClock`](cadence_core::ManualClock)
    pub fn with_clock(config: SchedulerConfig, clock: impl Clock + 'static) -> Self {
        Self::with_parts(config, clock, FrameTicker::new())
    }

    /// Scheduler built from explicit parts. A zero tick interval is raised
    /// to 1 ms.
    pub fn with_parts(
        mut config: SchedulerConfig,
        clock: impl Clock + 'static,
        ticker: impl TickSource + 'static,
    ) -> Self {
        if config.validate().is_err() {
            tracing::warn!("scheduler config: zero timer interval, using 1 ms");
            config.timer_interval_ms = 1;
        }
        Self {
            animations: SlotMap::with_key(),
            running: Vec::new(),
            running_set: FxHashSet::default(),
            pending: Vec::new(),
            pending_deletions: Vec::new(),
            last_tick: 0,
            time_origin: None,
            inside_tick: false,
            config,
            clock: Box::new(clock),
            ticker: Box::new(ticker),
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Switch consistent timing on or off. Takes effect at the next tick.
    pub fn set_consistent_timing(&mut self, enabled: bool) {
        self.config.consistent_timing = enabled;
    }

    /// Change the tick interval. A running timer is restarted with it.
    pub fn set_timer_interval(&mut self, ms: u64) {
        if ms == 0 {
            tracing::warn!("set_timer_interval: interval must be at least 1 ms");
            return;
        }
        self.config.timer_interval_ms = ms;
        if self.ticker.is_periodic_active() {
            self.ticker.start_periodic(self.config.timer_interval());
        }
    }

    pub fn ticker(&self) -> &dyn TickSource {
        self.ticker.as_ref()
    }

    // ------------------------------------------------------------------------
    // Creation and removal
    // ------------------------------------------------------------------------

    fn insert_leaf(&mut self, leaf: Leaf) -> AnimationId {
        let ty = leaf.ty;
        let id = self.animations.insert(Animation::new(AnimationKind::Leaf(leaf)));
        tracing::trace!("added {:?} animation {:?}", ty, id);
        id
    }

    /// Add a timed animation that eases its progress and hands it to `apply`
    pub fn add_animation<F>(
        &mut self,
        duration: Msecs,
        easing: impl Into<EasingCurve>,
        apply: F,
    ) -> AnimationId
    where
        F: FnMut(&mut AnimationScheduler, Frame) + 'static,
    {
        self.insert_leaf(Leaf {
            ty: AnimationType::Timed,
            duration: Some(duration.max(0)),
            easing: easing.into(),
            apply: Some(Box::new(apply) as ApplyFn),
        })
    }

    /// Add an animation that does nothing for `duration`
    pub fn add_pause(&mut self, duration: Msecs) -> AnimationId {
        self.insert_leaf(Leaf {
            ty: AnimationType::Pause,
            duration: Some(duration.max(0)),
            easing: EasingCurve::default(),
            apply: None,
        })
    }

    /// Add an animation with no defined duration. It runs until something
    /// calls [`stop`](Self::stop) on it; `apply` sees the elapsed time and a
    /// progress of 0.
    pub fn add_uncontrolled<F>(&mut self, apply: F) -> AnimationId
    where
        F: FnMut(&mut AnimationScheduler, Frame) + 'static,
    {
        self.insert_leaf(Leaf {
            ty: AnimationType::Uncontrolled,
            duration: None,
            easing: EasingCurve::default(),
            apply: Some(Box::new(apply) as ApplyFn),
        })
    }

    /// Remove an animation, and its children if it is a group.
    ///
    /// The animation is taken out of its group first. A running animation
    /// is dropped without notifications. Returns false for unknown ids.
    pub fn remove(&mut self, id: AnimationId) -> bool {
        let Some(anim) = self.animations.get_mut(id) else {
            return false;
        };
        anim.state = AnimationState::Stopped;
        let group = anim.group;
        self.unregister(id);

        if let Some(group) = group {
            if let Some(index) = self.index_of_animation(group, id) {
                self.detach_child(group, index);
            }
        }

        for child in self.children(id).to_vec() {
            if let Some(child_anim) = self.animations.get_mut(child) {
                child_anim.group = None;
                child_anim.completion_subscriber = None;
            }
            self.remove(child);
        }

        self.pending_deletions.retain(|&pending| pending != id);
        tracing::trace!("removed animation {:?}", id);
        self.animations.remove(id).is_some()
    }

    pub fn get(&self, id: AnimationId) -> Option<&Animation> {
        self.animations.get(id)
    }

    pub fn contains(&self, id: AnimationId) -> bool {
        self.animations.contains_key(id)
    }

    /// Number of animations owned by the scheduler
    pub fn len(&self) -> usize {
        self.animations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.animations.is_empty()
    }

    /// Iterate over all animations
    pub fn iter(&self) -> impl Iterator<Item = (AnimationId, &Animation)> {
        self.animations.iter()
    }

    // ------------------------------------------------------------------------
    // Registration
    // ------------------------------------------------------------------------

    /// Queue a running top-level animation for the next admission pass
    pub(crate) fn register(&mut self, id: AnimationId) {
        if self.is_registered(id) {
            return;
        }
        self.pending.push(id);
        self.ticker.request_admission();
    }

    pub(crate) fn unregister(&mut self, id: AnimationId) {
        if self.running_set.remove(&id) {
            self.running.retain(|&running| running != id);
        } else {
            self.pending.retain(|&pending| pending != id);
        }

        if self.running.is_empty() && self.pending.is_empty() && self.ticker.is_periodic_active()
        {
            self.stop_timer();
        }
    }

    pub(crate) fn schedule_deletion(&mut self, id: AnimationId) {
        if !self.pending_deletions.contains(&id) {
            self.pending_deletions.push(id);
        }
        self.ticker.request_admission();
    }

    /// Whether `id` is running or waiting for admission
    pub fn is_registered(&self, id: AnimationId) -> bool {
        self.running_set.contains(&id) || self.pending.contains(&id)
    }

    pub fn running_count(&self) -> usize {
        self.running.len()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Whether the periodic timer is running
    pub fn is_clock_active(&self) -> bool {
        self.ticker.is_periodic_active()
    }

    fn stop_timer(&mut self) {
        self.ticker.stop_periodic();
        self.time_origin = None;
        tracing::debug!("animation timer stopped");
    }

    // ------------------------------------------------------------------------
    // Timer callbacks
    // ------------------------------------------------------------------------

    /// The zero-delay admission callback: performs deferred deletions, moves
    /// queued animations into the running set and starts or stops the
    /// periodic timer to match.
    pub fn on_admission_tick(&mut self) {
        for id in std::mem::take(&mut self.pending_deletions) {
            let stopped = self
                .animations
                .get(id)
                .is_some_and(|anim| anim.state == AnimationState::Stopped && anim.delete_when_stopped);
            if stopped {
                tracing::debug!("deleting stopped animation {:?}", id);
                self.remove(id);
            }
        }

        let admitted = self.pending.len();
        for id in std::mem::take(&mut self.pending) {
            if self.running_set.insert(id) {
                self.running.push(id);
            }
        }

        if self.running.is_empty() {
            if self.ticker.is_periodic_active() {
                self.stop_timer();
            }
            return;
        }

        let interval = self.config.timer_interval();
        self.ticker.start_periodic(interval);
        if self.time_origin.is_none() {
            self.last_tick = 0;
            self.time_origin = Some(self.clock.now());
            tracing::debug!("animation timer started ({:?})", interval);
        }
        tracing::debug!(
            "admitted {} animations, {} running",
            admitted,
            self.running.len()
        );
    }

    /// The periodic callback: advances every running animation by the time
    /// elapsed since the previous tick.
    pub fn on_periodic_tick(&mut self) {
        if self.inside_tick {
            return;
        }
        let Some(origin) = self.time_origin else {
            return;
        };

        let previous = self.last_tick;
        self.last_tick = if self.config.consistent_timing {
            previous + self.config.timer_interval_ms as Msecs
        } else {
            self.clock.now().saturating_sub(origin).as_millis() as Msecs
        };
        let delta = self.last_tick - previous;
        if delta == 0 {
            return;
        }
        tracing::trace!("tick: delta {}ms, {} running", delta, self.running.len());

        self.inside_tick = true;
        for id in self.running.clone() {
            // Stopped or removed by an earlier animation's callback
            if !self.running_set.contains(&id) {
                continue;
            }
            let Some(anim) = self.animations.get(id) else {
                continue;
            };
            let elapsed = match anim.direction {
                Direction::Forward => anim.total_current_time + delta,
                Direction::Backward => anim.total_current_time - delta,
            };
            self.set_current_time(id, elapsed);
        }
        self.inside_tick = false;
    }

    /// Drive the scheduler from a frame loop polling a [`FrameTicker`].
    ///
    /// Runs a periodic tick if the timer is running, then a requested
    /// admission pass. Animations admitted now get their first delta at the
    /// next call, measured from this one.
    pub fn pump(&mut self) {
        if self.ticker.is_periodic_active() {
            self.on_periodic_tick();
        }
        if self.ticker.take_admission_request() {
            self.on_admission_tick();
        }
    }
}

impl Default for AnimationScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for AnimationScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimationScheduler")
            .field("animations", &self.animations.len())
            .field("running", &self.running.len())
            .field("pending", &self.pending.len())
            .field("clock_active", &self.ticker.is_periodic_active())
            .field("config", &self.config)
            .finish()
    }
}
