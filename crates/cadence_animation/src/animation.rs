//! Animation state machine
//!
//! Every animation, leaf or group, shares the same playback model: a state
//! (stopped, paused, running), a loop count, a direction and a position on
//! its timeline. What the position *means* is decided by the animation's
//! kind: a timed leaf eases it and hands it to an apply callback, a group
//! maps it onto its children.
//!
//! Animations live in the [`AnimationScheduler`] arena and are addressed by
//! [`AnimationId`]. All operations are methods on the scheduler so callbacks,
//! which receive `&mut AnimationScheduler`, can drive any animation,
//! including the one currently being updated.

use cadence_core::events::{dispatch, Listeners};
use slotmap::new_key_type;

use crate::easing::EasingCurve;
use crate::parallel::ParallelGroup;
use crate::scheduler::AnimationScheduler;
use crate::sequential::SequentialGroup;

new_key_type! {
    /// Handle to an animation owned by an [`AnimationScheduler`]
    pub struct AnimationId;
}

/// Milliseconds on an animation timeline
pub type Msecs = i64;

/// Playback state
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AnimationState {
    #[default]
    Stopped,
    Paused,
    Running,
}

/// Direction in which time moves while running
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Direction {
    #[default]
    Forward,
    Backward,
}

/// What happens to an animation once it stops
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DeletionPolicy {
    #[default]
    KeepWhenStopped,
    /// Remove the animation from the scheduler at the next admission pass
    DeleteWhenStopped,
}

/// Notifications delivered to listeners connected with
/// [`AnimationScheduler::connect`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnimationEvent {
    StateChanged {
        new: AnimationState,
        old: AnimationState,
    },
    CurrentLoopChanged(i32),
    DirectionChanged(Direction),
    /// The animation stopped at the end of its timeline. Always delivered
    /// after the matching `StateChanged`.
    Finished,
    /// A sequential group switched its current child
    CurrentAnimationChanged(Option<AnimationId>),
}

/// Position handed to a leaf's apply callback
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Frame {
    pub id: AnimationId,
    /// Time within the current loop
    pub local_time: Msecs,
    /// Eased progress through the current loop
    pub progress: f64,
}

/// Callback that applies a leaf's progress to the application
pub type ApplyFn = Box<dyn FnMut(&mut AnimationScheduler, Frame)>;

/// Listener set attached to every animation
pub type EventListeners = Listeners<AnimationScheduler, AnimationEvent>;

/// Kind of animation behind an id
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AnimationType {
    /// Fixed duration, eased progress, apply callback
    Timed,
    /// Fixed duration, no effect
    Pause,
    /// Undefined duration, completes when stopped
    Uncontrolled,
    Sequential,
    Parallel,
}

pub(crate) struct Leaf {
    pub(crate) ty: AnimationType,
    pub(crate) duration: Option<Msecs>,
    pub(crate) easing: EasingCurve,
    /// `None` for pauses, and while the callback is executing
    pub(crate) apply: Option<ApplyFn>,
}

pub(crate) enum AnimationKind {
    Leaf(Leaf),
    Sequential(SequentialGroup),
    Parallel(ParallelGroup),
}

/// One animation in the scheduler arena.
///
/// Read-only access is available through [`AnimationScheduler::get`]; all
/// mutation goes through the scheduler.
pub struct Animation {
    pub(crate) state: AnimationState,
    pub(crate) direction: Direction,
    pub(crate) loop_count: i32,
    pub(crate) current_loop: i32,
    /// Time within the current loop
    pub(crate) current_time: Msecs,
    /// Time since the start of the first loop
    pub(crate) total_current_time: Msecs,
    pub(crate) delete_when_stopped: bool,
    pub(crate) group: Option<AnimationId>,
    pub(crate) listeners: EventListeners,
    /// Group waiting for this animation's `Finished`
    pub(crate) completion_subscriber: Option<AnimationId>,
    pub(crate) kind: AnimationKind,
}

impl Animation {
    pub(crate) fn new(kind: AnimationKind) -> Self {
        Self {
            state: AnimationState::Stopped,
            direction: Direction::Forward,
            loop_count: 1,
            current_loop: 0,
            current_time: 0,
            total_current_time: 0,
            delete_when_stopped: false,
            group: None,
            listeners: Listeners::new(),
            completion_subscriber: None,
            kind,
        }
    }

    pub fn state(&self) -> AnimationState {
        self.state
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Number of loops, -1 for infinite
    pub fn loop_count(&self) -> i32 {
        self.loop_count
    }

    pub fn current_loop(&self) -> i32 {
        self.current_loop
    }

    /// Time since the start of the first loop
    pub fn current_time(&self) -> Msecs {
        self.total_current_time
    }

    /// Time within the current loop
    pub fn current_loop_time(&self) -> Msecs {
        self.current_time
    }

    /// Containing group, `None` for top-level animations
    pub fn group(&self) -> Option<AnimationId> {
        self.group
    }

    pub fn animation_type(&self) -> AnimationType {
        match &self.kind {
            AnimationKind::Leaf(leaf) => leaf.ty,
            AnimationKind::Sequential(_) => AnimationType::Sequential,
            AnimationKind::Parallel(_) => AnimationType::Parallel,
        }
    }

    pub fn is_group(&self) -> bool {
        !matches!(self.kind, AnimationKind::Leaf(_))
    }

    /// Whether the animation is removed once it stops
    pub fn deletes_when_stopped(&self) -> bool {
        self.delete_when_stopped
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl std::fmt::Debug for Animation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Animation")
            .field("type", &self.animation_type())
            .field("state", &self.state)
            .field("direction", &self.direction)
            .field("loop_count", &self.loop_count)
            .field("current_loop", &self.current_loop)
            .field("current_time", &self.current_time)
            .field("group", &self.group)
            .finish()
    }
}

/// Split a total time into `(loop, time within loop)`.
///
/// Loop boundaries belong to the loop that just ended: with a duration of
/// 1000, time 1000 is the end of loop 0 and 1001 is 1 ms into loop 1.
pub(crate) fn split_time(total: Msecs, duration: Option<Msecs>) -> (i32, Msecs) {
    match duration {
        None => (0, total),
        Some(d) if d <= 0 || total <= 0 => (0, 0),
        Some(d) => (((total - 1) / d) as i32, (total - 1) % d + 1),
    }
}

// ============================================================================
// Playback control
// ============================================================================

impl AnimationScheduler {
    /// Start (or resume) an animation. Does nothing if it is already running.
    pub fn start(&mut self, id: AnimationId) {
        self.start_with_policy(id, DeletionPolicy::KeepWhenStopped);
    }

    pub fn start_with_policy(&mut self, id: AnimationId, policy: DeletionPolicy) {
        let Some(anim) = self.animations.get_mut(id) else {
            tracing::warn!("start: unknown animation {:?}", id);
            return;
        };
        if anim.state == AnimationState::Running {
            return;
        }
        anim.delete_when_stopped = policy == DeletionPolicy::DeleteWhenStopped;
        self.set_state(id, AnimationState::Running);
    }

    pub fn stop(&mut self, id: AnimationId) {
        match self.animations.get(id) {
            Some(anim) if anim.state == AnimationState::Stopped => {}
            Some(_) => self.set_state(id, AnimationState::Stopped),
            None => tracing::warn!("stop: unknown animation {:?}", id),
        }
    }

    pub fn pause(&mut self, id: AnimationId) {
        match self.animations.get(id) {
            Some(anim) if anim.state == AnimationState::Stopped => {
                tracing::warn!("pause: cannot pause stopped animation {:?}", id);
            }
            Some(_) => self.set_state(id, AnimationState::Paused),
            None => tracing::warn!("pause: unknown animation {:?}", id),
        }
    }

    pub fn resume(&mut self, id: AnimationId) {
        match self.animations.get(id) {
            Some(anim) if anim.state != AnimationState::Paused => {
                tracing::warn!("resume: animation {:?} is not paused", id);
            }
            Some(_) => self.set_state(id, AnimationState::Running),
            None => tracing::warn!("resume: unknown animation {:?}", id),
        }
    }

    /// `pause` when `paused`, `resume` otherwise
    pub fn set_paused(&mut self, id: AnimationId, paused: bool) {
        if paused {
            self.pause(id);
        } else {
            self.resume(id);
        }
    }

    pub(crate) fn set_state(&mut self, id: AnimationId, new_state: AnimationState) {
        let Some(anim) = self.animations.get(id) else {
            return;
        };
        if anim.state == new_state {
            return;
        }

        let old_state = anim.state;
        let old_time = anim.current_time;
        let old_loop = anim.current_loop;
        let old_direction = anim.direction;
        let loop_count = anim.loop_count;
        let group = anim.group;

        // Leaving Stopped rewinds to the start of the timeline for the
        // active direction. The time is not applied yet.
        if old_state == AnimationState::Stopped {
            let duration = self.duration(id);
            let start = match old_direction {
                Direction::Forward => 0,
                Direction::Backward if loop_count == -1 => duration.unwrap_or(0),
                Direction::Backward => self.total_duration(id).unwrap_or(0),
            };
            let (current_loop, current_time) = split_time(start, duration);
            if let Some(anim) = self.animations.get_mut(id) {
                anim.total_current_time = start;
                anim.current_loop = current_loop;
                anim.current_time = current_time;
            }
        }

        if let Some(anim) = self.animations.get_mut(id) {
            anim.state = new_state;
        }
        tracing::debug!("animation {:?}: {:?} -> {:?}", id, old_state, new_state);

        // Children of an active group are driven by the group, not the timer
        let is_top_level = group
            .and_then(|g| self.animations.get(g))
            .map_or(true, |g| g.state == AnimationState::Stopped);

        if old_state == AnimationState::Running {
            self.unregister(id);
        } else if new_state == AnimationState::Running && is_top_level {
            self.register(id);
        }

        self.update_state_hook(id, new_state, old_state);
        if self.state(id) != Some(new_state) {
            return;
        }

        self.emit(
            id,
            AnimationEvent::StateChanged {
                new: new_state,
                old: old_state,
            },
        );
        if self.state(id) != Some(new_state) {
            return;
        }

        match new_state {
            AnimationState::Paused => {}
            AnimationState::Running => {
                if old_state == AnimationState::Stopped && is_top_level {
                    if let Some(total) = self.animations.get(id).map(|a| a.total_current_time) {
                        self.set_current_time(id, total);
                    }
                }
            }
            AnimationState::Stopped => {
                let duration = self.duration(id);
                let loop_count = self.animations.get(id).map_or(loop_count, |a| a.loop_count);
                if self
                    .animations
                    .get(id)
                    .is_some_and(|anim| anim.delete_when_stopped)
                {
                    self.schedule_deletion(id);
                }

                let reached_end = match duration {
                    None => true,
                    Some(_) if loop_count < 0 => true,
                    Some(d) => match old_direction {
                        Direction::Forward => {
                            old_time * (old_loop as Msecs + 1) == d * loop_count as Msecs
                        }
                        Direction::Backward => old_time == 0,
                    },
                };
                if reached_end {
                    self.emit(id, AnimationEvent::Finished);
                    self.notify_completion(id);
                }
            }
        }
    }

    /// Move to an absolute position on the timeline.
    ///
    /// The position is clamped to `[0, total_duration]`. Reaching the end of
    /// the timeline for the active direction stops the animation.
    pub fn set_current_time(&mut self, id: AnimationId, msecs: Msecs) {
        if !self.animations.contains_key(id) {
            tracing::warn!("set_current_time: unknown animation {:?}", id);
            return;
        }

        let duration = self.duration(id);
        let total_duration = self.total_duration(id);
        let msecs = match total_duration {
            Some(total) => msecs.clamp(0, total),
            None => msecs.max(0),
        };
        let (current_loop, current_time) = split_time(msecs, duration);

        let Some(anim) = self.animations.get_mut(id) else {
            return;
        };
        let old_loop = anim.current_loop;
        anim.total_current_time = msecs;
        anim.current_loop = current_loop;
        anim.current_time = current_time;

        self.update_current_time_hook(id, current_time);

        let Some(anim) = self.animations.get(id) else {
            return;
        };
        if anim.current_loop != old_loop {
            let current_loop = anim.current_loop;
            self.emit(id, AnimationEvent::CurrentLoopChanged(current_loop));
        }

        let Some(anim) = self.animations.get(id) else {
            return;
        };
        let at_end = match anim.direction {
            Direction::Forward => Some(anim.total_current_time) == total_duration,
            Direction::Backward => anim.total_current_time == 0,
        };
        if at_end {
            self.stop(id);
        }
    }

    /// Change the direction of travel.
    ///
    /// A stopped animation is repositioned to the start of its timeline for
    /// the new direction. A running or paused one keeps its position.
    pub fn set_direction(&mut self, id: AnimationId, direction: Direction) {
        let Some(anim) = self.animations.get(id) else {
            tracing::warn!("set_direction: unknown animation {:?}", id);
            return;
        };
        if anim.direction == direction {
            return;
        }

        if anim.state == AnimationState::Stopped {
            let loop_count = anim.loop_count;
            let duration = self.duration(id).unwrap_or(0);
            if let Some(anim) = self.animations.get_mut(id) {
                match direction {
                    Direction::Backward => {
                        anim.current_time = duration;
                        anim.current_loop = (loop_count - 1).max(0);
                        anim.total_current_time = (anim.current_loop as Msecs)
                            .saturating_mul(duration)
                            .saturating_add(duration);
                    }
                    Direction::Forward => {
                        anim.current_time = 0;
                        anim.current_loop = 0;
                        anim.total_current_time = 0;
                    }
                }
            }
        }

        if let Some(anim) = self.animations.get_mut(id) {
            anim.direction = direction;
        }
        self.update_direction_hook(id, direction);
        self.emit(id, AnimationEvent::DirectionChanged(direction));
    }

    /// Set the number of loops, -1 for infinite
    pub fn set_loop_count(&mut self, id: AnimationId, loop_count: i32) {
        match self.animations.get_mut(id) {
            Some(anim) => anim.loop_count = loop_count,
            None => tracing::warn!("set_loop_count: unknown animation {:?}", id),
        }
    }

    /// Current state, `None` for unknown ids
    pub fn state(&self, id: AnimationId) -> Option<AnimationState> {
        self.animations.get(id).map(|anim| anim.state)
    }

    /// Duration of one loop. `None` means undefined (or an unknown id).
    pub fn duration(&self, id: AnimationId) -> Option<Msecs> {
        let anim = self.animations.get(id)?;
        match &anim.kind {
            AnimationKind::Leaf(leaf) => leaf.duration,
            AnimationKind::Sequential(group) => group
                .children
                .iter()
                .try_fold(0 as Msecs, |sum, &child| {
                    Some(sum.saturating_add(self.total_duration(child)?))
                }),
            AnimationKind::Parallel(group) => {
                let mut longest = 0;
                for &child in &group.children {
                    longest = longest.max(self.total_duration(child)?);
                }
                Some(longest)
            }
        }
    }

    /// Duration of all loops, `None` if unbounded
    pub fn total_duration(&self, id: AnimationId) -> Option<Msecs> {
        let duration = self.duration(id)?;
        let loop_count = self.animations.get(id)?.loop_count;
        if duration <= 0 {
            Some(duration)
        } else if loop_count < 0 {
            None
        } else {
            Some(duration.saturating_mul(loop_count as Msecs))
        }
    }

    // ------------------------------------------------------------------------
    // Leaf properties
    // ------------------------------------------------------------------------

    /// Change the duration of a timed leaf or a pause
    pub fn set_duration(&mut self, id: AnimationId, duration: Msecs) {
        if duration < 0 {
            tracing::warn!("set_duration: negative duration {} ignored", duration);
            return;
        }
        match self.animations.get_mut(id).map(|anim| &mut anim.kind) {
            Some(AnimationKind::Leaf(leaf)) if leaf.ty != AnimationType::Uncontrolled => {
                leaf.duration = Some(duration);
            }
            Some(_) => tracing::warn!("set_duration: {:?} has no settable duration", id),
            None => tracing::warn!("set_duration: unknown animation {:?}", id),
        }
    }

    /// Change the duration of a pause
    pub fn set_pause_duration(&mut self, id: AnimationId, duration: Msecs) {
        match self.animations.get(id).map(|anim| anim.animation_type()) {
            Some(AnimationType::Pause) => self.set_duration(id, duration),
            Some(_) => tracing::warn!("set_pause_duration: {:?} is not a pause", id),
            None => tracing::warn!("set_pause_duration: unknown animation {:?}", id),
        }
    }

    pub fn easing_curve(&self, id: AnimationId) -> Option<EasingCurve> {
        match &self.animations.get(id)?.kind {
            AnimationKind::Leaf(leaf) if leaf.ty == AnimationType::Timed => Some(leaf.easing),
            _ => None,
        }
    }

    pub fn set_easing_curve(&mut self, id: AnimationId, easing: impl Into<EasingCurve>) {
        match self.animations.get_mut(id).map(|anim| &mut anim.kind) {
            Some(AnimationKind::Leaf(leaf)) if leaf.ty == AnimationType::Timed => {
                leaf.easing = easing.into();
            }
            Some(_) => tracing::warn!("set_easing_curve: {:?} is not a timed animation", id),
            None => tracing::warn!("set_easing_curve: unknown animation {:?}", id),
        }
    }

    // ------------------------------------------------------------------------
    // Notifications
    // ------------------------------------------------------------------------

    /// Listen to an animation's events. Returns `None` for unknown ids.
    pub fn connect<F>(&mut self, id: AnimationId, handler: F) -> Option<cadence_core::ListenerId>
    where
        F: FnMut(&mut AnimationScheduler, &AnimationEvent) + 'static,
    {
        Some(self.animations.get_mut(id)?.listeners.connect(handler))
    }

    pub fn disconnect(&mut self, id: AnimationId, listener: cadence_core::ListenerId) -> bool {
        self.animations
            .get_mut(id)
            .is_some_and(|anim| anim.listeners.disconnect(listener))
    }

    pub(crate) fn emit(&mut self, id: AnimationId, event: AnimationEvent) {
        dispatch(self, &event, |sched| {
            sched.animations.get_mut(id).map(|anim| &mut anim.listeners)
        });
    }

    /// Tell the group waiting on `id` that it finished
    fn notify_completion(&mut self, id: AnimationId) {
        let Some(group) = self.animations.get(id).and_then(|a| a.completion_subscriber) else {
            return;
        };
        match self.animations.get(group).map(|g| g.animation_type()) {
            Some(AnimationType::Sequential) => self.sequential_child_finished(group, id),
            Some(AnimationType::Parallel) => self.parallel_child_finished(group, id),
            _ => {}
        }
    }

    // ------------------------------------------------------------------------
    // Kind hooks
    // ------------------------------------------------------------------------

    fn update_current_time_hook(&mut self, id: AnimationId, current_time: Msecs) {
        match self.animations.get(id).map(|a| a.animation_type()) {
            Some(AnimationType::Sequential) => self.sequential_update(id, current_time),
            Some(AnimationType::Parallel) => self.parallel_update(id, current_time),
            Some(_) => self.leaf_update(id, current_time),
            None => {}
        }
    }

    fn update_state_hook(&mut self, id: AnimationId, new: AnimationState, old: AnimationState) {
        match self.animations.get(id).map(|a| a.animation_type()) {
            Some(AnimationType::Sequential) => self.sequential_update_state(id, new, old),
            Some(AnimationType::Parallel) => self.parallel_update_state(id, new, old),
            _ => {}
        }
    }

    fn update_direction_hook(&mut self, id: AnimationId, direction: Direction) {
        match self.animations.get(id).map(|a| a.animation_type()) {
            Some(AnimationType::Sequential) => self.sequential_update_direction(id, direction),
            Some(AnimationType::Parallel) => self.parallel_update_direction(id, direction),
            _ => {}
        }
    }

    fn leaf_update(&mut self, id: AnimationId, local_time: Msecs) {
        let Some(AnimationKind::Leaf(leaf)) = self.animations.get_mut(id).map(|a| &mut a.kind)
        else {
            return;
        };
        let progress = match (leaf.ty, leaf.duration) {
            (AnimationType::Timed, Some(0)) => leaf.easing.value_for_progress(1.0),
            (AnimationType::Timed, Some(d)) => {
                leaf.easing.value_for_progress(local_time as f64 / d as f64)
            }
            _ => 0.0,
        };
        // Already running further up the stack when `None`
        let Some(mut apply) = leaf.apply.take() else {
            return;
        };

        apply(
            self,
            Frame {
                id,
                local_time,
                progress,
            },
        );

        if let Some(AnimationKind::Leaf(leaf)) = self.animations.get_mut(id).map(|a| &mut a.kind) {
            if leaf.apply.is_none() {
                leaf.apply = Some(apply);
            }
        }
    }
}
