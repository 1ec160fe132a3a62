//! Sequential animation groups
//!
//! A sequential group plays its children one after another. Exactly one
//! child is current at a time; the group maps its own time onto the current
//! child by subtracting the durations of the children before it.
//!
//! Jumping forward over several children does not skip them: every child
//! passed over is activated and taken to its end so its own `Finished`
//! fires, in order. Jumping backward rewinds skipped children to 0 in the
//! same way.
//!
//! A child with no defined duration is waited on. The group listens for its
//! `Finished`, remembers how long it actually ran and moves on. That
//! remembered value stands in for the child's duration when mapping times,
//! while the group's own duration stays undefined.

use smallvec::SmallVec;

use crate::animation::{
    AnimationEvent, AnimationId, AnimationKind, AnimationState, Direction, Msecs,
};
use crate::error::{AnimationError, Result};
use crate::scheduler::AnimationScheduler;

#[derive(Debug, Default)]
pub(crate) struct SequentialGroup {
    pub(crate) children: SmallVec<[AnimationId; 4]>,
    pub(crate) current: Option<AnimationId>,
    pub(crate) current_index: usize,
    /// Elapsed time of finished children whose duration is undefined,
    /// indexed like `children`
    pub(crate) actual_durations: Vec<Option<Msecs>>,
    pub(crate) last_loop: i32,
}

impl AnimationScheduler {
    fn sequential(&self, group: AnimationId) -> Option<&SequentialGroup> {
        match &self.animations.get(group)?.kind {
            AnimationKind::Sequential(seq) => Some(seq),
            _ => None,
        }
    }

    fn sequential_mut(&mut self, group: AnimationId) -> Option<&mut SequentialGroup> {
        match &mut self.animations.get_mut(group)?.kind {
            AnimationKind::Sequential(seq) => Some(seq),
            _ => None,
        }
    }

    /// The child a sequential group is currently playing
    pub fn current_animation(&self, group: AnimationId) -> Option<AnimationId> {
        self.sequential(group)?.current
    }

    /// Index of the current child of a sequential group
    pub fn current_animation_index(&self, group: AnimationId) -> Option<usize> {
        let seq = self.sequential(group)?;
        seq.current.map(|_| seq.current_index)
    }

    /// Total duration of the child at `index`, or the time it actually ran
    /// if its duration is undefined and it already finished
    fn actual_total_duration(&self, group: AnimationId, index: usize) -> Option<Msecs> {
        let seq = self.sequential(group)?;
        let child = *seq.children.get(index)?;
        self.total_duration(child)
            .or_else(|| seq.actual_durations.get(index).copied().flatten())
    }

    /// Map a group time onto `(child index, time offset of that child)`.
    ///
    /// A boundary between two children belongs to the earlier child when
    /// moving forward and to the later child when moving backward. The end
    /// of the last child always belongs to the last child.
    pub(crate) fn sequential_index_for_time(
        &self,
        group: AnimationId,
        msecs: Msecs,
    ) -> Option<(usize, Msecs)> {
        let direction = self.animations.get(group)?.direction;
        let len = self.sequential(group)?.children.len();
        if len == 0 {
            return None;
        }

        let mut offset = 0;
        for index in 0..len {
            let Some(duration) = self.actual_total_duration(group, index) else {
                // Undefined duration: current once reached
                return Some((index, offset));
            };
            let end = offset.saturating_add(duration);
            let is_last = index + 1 == len;
            let here = match direction {
                Direction::Forward => msecs <= end,
                Direction::Backward => msecs < end || (is_last && msecs == end),
            };
            if here {
                return Some((index, offset));
            }
            offset = end;
        }

        // Past every child, possible once an undefined child has finished
        let last = len - 1;
        offset -= self.actual_total_duration(group, last).unwrap_or(0);
        Some((last, offset))
    }

    pub(crate) fn sequential_update(&mut self, group: AnimationId, current_time: Msecs) {
        if self.current_animation(group).is_none() {
            return;
        }
        let Some((new_index, offset)) = self.sequential_index_for_time(group, current_time) else {
            return;
        };
        let Some(current_loop) = self.animations.get(group).map(|a| a.current_loop) else {
            return;
        };

        let Some(seq) = self.sequential_mut(group) else {
            return;
        };
        seq.actual_durations.truncate(new_index);
        let last_loop = seq.last_loop;
        let current_index = seq.current_index;

        // Advancing forward is rewinding backward and vice versa; both walk
        // the skipped children in timeline order
        if last_loop < current_loop || (last_loop == current_loop && current_index < new_index) {
            self.sequential_advance(group, new_index);
        } else if last_loop > current_loop
            || (last_loop == current_loop && current_index > new_index)
        {
            self.sequential_rewind(group, new_index);
        }

        self.set_current_animation(group, new_index, false);

        let child_time = current_time - offset;
        match self.current_animation(group) {
            Some(child) => {
                self.set_current_time(child, child_time);
                if self.sequential_at_end(group) {
                    // Do not run past what the last child actually used
                    let consumed = self.get(child).map_or(child_time, |c| c.current_time());
                    if let Some(anim) = self.animations.get_mut(group) {
                        anim.current_time += consumed - child_time;
                        anim.total_current_time += consumed - child_time;
                    }
                    self.stop(group);
                }
            }
            None => {
                if let Some(anim) = self.animations.get_mut(group) {
                    anim.current_time = 0;
                }
                if self.contains(group) {
                    self.stop(group);
                }
            }
        }

        let current_loop = self.animations.get(group).map_or(current_loop, |a| a.current_loop);
        if let Some(seq) = self.sequential_mut(group) {
            seq.last_loop = current_loop;
        }
    }

    /// Take the child at `index` to its end as an intermediate step
    fn fast_forward_child(&mut self, group: AnimationId, index: usize) -> bool {
        let Some(child) = self.animation_at(group, index) else {
            return false;
        };
        self.set_current_animation(group, index, true);
        let end = self.actual_total_duration(group, index).unwrap_or(0);
        self.set_current_time(child, end);
        true
    }

    /// Take the child at `index` back to its start as an intermediate step
    fn rewind_child(&mut self, group: AnimationId, index: usize) -> bool {
        let Some(child) = self.animation_at(group, index) else {
            return false;
        };
        self.set_current_animation(group, index, true);
        self.set_current_time(child, 0);
        true
    }

    fn sequential_advance(&mut self, group: AnimationId, new_index: usize) {
        let Some(seq) = self.sequential(group) else {
            return;
        };
        let (last_loop, from, len) = (seq.last_loop, seq.current_index, seq.children.len());
        let current_loop = self.animations.get(group).map_or(0, |a| a.current_loop);

        if last_loop < current_loop {
            // Finish the previous loop, then start over from the first child
            for index in from..len {
                if !self.fast_forward_child(group, index) {
                    break;
                }
            }
            if self.animation_count(group) == 1 {
                self.activate_current_animation(group, false);
            } else {
                self.set_current_animation(group, 0, true);
            }
        }

        let from = self.sequential(group).map_or(new_index, |s| s.current_index);
        for index in from..new_index {
            if !self.fast_forward_child(group, index) {
                break;
            }
        }
    }

    fn sequential_rewind(&mut self, group: AnimationId, new_index: usize) {
        let Some(seq) = self.sequential(group) else {
            return;
        };
        let (last_loop, from) = (seq.last_loop, seq.current_index);
        let current_loop = self.animations.get(group).map_or(0, |a| a.current_loop);

        if last_loop > current_loop {
            // Rewind the later loop, then continue from the last child
            for index in (0..=from).rev() {
                if !self.rewind_child(group, index) {
                    break;
                }
            }
            let len = self.animation_count(group);
            if len == 1 {
                self.activate_current_animation(group, false);
            } else if len > 1 {
                self.set_current_animation(group, len - 1, true);
            }
        }

        let from = self.sequential(group).map_or(new_index, |s| s.current_index);
        for index in (new_index + 1..=from).rev() {
            if !self.rewind_child(group, index) {
                break;
            }
        }
    }

    /// Make the child at `index` current. `intermediate` children are being
    /// passed over and are never left paused.
    fn set_current_animation(&mut self, group: AnimationId, index: usize, intermediate: bool) {
        let Some(seq) = self.sequential(group) else {
            return;
        };
        if seq.children.is_empty() {
            self.clear_current_animation(group);
            return;
        }
        let index = index.min(seq.children.len() - 1);
        let target = seq.children[index];
        if index == seq.current_index && seq.current == Some(target) {
            return;
        }

        let previous = seq.current;
        if let Some(previous) = previous.filter(|&p| self.contains(p)) {
            self.stop(previous);
        }

        let Some(seq) = self.sequential_mut(group) else {
            return;
        };
        seq.current = Some(target);
        seq.current_index = index;
        tracing::trace!("group {:?}: current animation {} ({:?})", group, index, target);

        self.emit(group, AnimationEvent::CurrentAnimationChanged(Some(target)));
        self.activate_current_animation(group, intermediate);
    }

    fn clear_current_animation(&mut self, group: AnimationId) {
        let Some(seq) = self.sequential_mut(group) else {
            return;
        };
        seq.current_index = 0;
        if seq.current.take().is_some() {
            self.emit(group, AnimationEvent::CurrentAnimationChanged(None));
        }
    }

    /// Restart the current child in step with the group
    fn activate_current_animation(&mut self, group: AnimationId, intermediate: bool) {
        let Some(child) = self.current_animation(group) else {
            return;
        };
        let Some(anim) = self.animations.get(group) else {
            return;
        };
        if anim.state == AnimationState::Stopped {
            return;
        }
        let direction = anim.direction;

        self.stop(child);
        self.set_direction(child, direction);
        if self.total_duration(child).is_none() {
            if let Some(child_anim) = self.animations.get_mut(child) {
                child_anim.completion_subscriber = Some(group);
            }
        }
        self.start(child);

        if !intermediate && self.state(group) == Some(AnimationState::Paused) {
            self.pause(child);
        }
    }

    /// Last loop, moving forward, last child, and that child at its end
    fn sequential_at_end(&self, group: AnimationId) -> bool {
        let (Some(anim), Some(seq)) = (self.animations.get(group), self.sequential(group)) else {
            return false;
        };
        let Some(child) = seq.current.and_then(|c| self.animations.get(c)) else {
            return false;
        };
        anim.current_loop == anim.loop_count - 1
            && anim.direction == Direction::Forward
            && seq.current_index + 1 == seq.children.len()
            && Some(child.current_time()) == self.actual_total_duration(group, seq.current_index)
    }

    /// An undefined-duration child reported `Finished`
    pub(crate) fn sequential_child_finished(&mut self, group: AnimationId, child: AnimationId) {
        let Some(seq) = self.sequential(group) else {
            return;
        };
        if seq.current != Some(child) {
            return;
        }
        let index = seq.current_index;
        let len = seq.children.len();
        let elapsed = self.get(child).map_or(0, |c| c.current_time());

        let Some(seq) = self.sequential_mut(group) else {
            return;
        };
        if seq.actual_durations.len() <= index {
            seq.actual_durations.resize(index + 1, None);
        }
        seq.actual_durations[index] = Some(elapsed);
        if let Some(child_anim) = self.animations.get_mut(child) {
            child_anim.completion_subscriber = None;
        }
        tracing::debug!("group {:?}: child {} ran for {}ms", group, index, elapsed);

        let Some(anim) = self.animations.get(group) else {
            return;
        };
        if anim.state == AnimationState::Stopped {
            return;
        }
        match anim.direction {
            Direction::Forward if index + 1 == len => self.stop(group),
            Direction::Backward if index == 0 => self.stop(group),
            Direction::Forward => self.set_current_animation(group, index + 1, false),
            Direction::Backward => self.set_current_animation(group, index - 1, false),
        }
    }

    pub(crate) fn sequential_update_state(
        &mut self,
        group: AnimationId,
        new_state: AnimationState,
        old_state: AnimationState,
    ) {
        let Some(child) = self.current_animation(group) else {
            return;
        };
        let child_state = self.state(child);

        // A current child already stopped at its end (the group time sits on
        // a child boundary) is left alone until the group moves on.
        match new_state {
            AnimationState::Stopped => self.stop(child),
            _ if old_state == AnimationState::Stopped => self.sequential_restart(group),
            AnimationState::Paused => {
                if child_state == Some(AnimationState::Running) {
                    self.pause(child);
                }
            }
            AnimationState::Running => {
                if child_state == Some(AnimationState::Paused) {
                    self.start(child);
                }
            }
        }
    }

    /// Make the first (forward) or last (backward) child current and start it
    fn sequential_restart(&mut self, group: AnimationId) {
        let Some(anim) = self.animations.get(group) else {
            return;
        };
        let (direction, loop_count) = (anim.direction, anim.loop_count);
        let Some(seq) = self.sequential_mut(group) else {
            return;
        };
        let target = match direction {
            Direction::Forward => {
                seq.last_loop = 0;
                0
            }
            Direction::Backward => {
                seq.last_loop = (loop_count - 1).max(0);
                seq.children.len().saturating_sub(1)
            }
        };

        if seq.current_index == target && seq.current.is_some() {
            self.activate_current_animation(group, false);
        } else {
            self.set_current_animation(group, target, false);
        }
    }

    pub(crate) fn sequential_update_direction(&mut self, group: AnimationId, direction: Direction) {
        if self.state(group) == Some(AnimationState::Stopped) {
            return;
        }
        if let Some(child) = self.current_animation(group) {
            self.set_direction(child, direction);
        }
    }

    /// Refuse insertions at or before a child the group already played
    pub(crate) fn sequential_check_insert(&self, group: AnimationId, index: usize) -> Result<()> {
        let (Some(anim), Some(seq)) = (self.animations.get(group), self.sequential(group)) else {
            return Ok(());
        };
        if anim.state == AnimationState::Stopped {
            return Ok(());
        }
        let Some(current) = seq.current.and_then(|c| self.animations.get(c)) else {
            return Ok(());
        };

        let current_started = current.current_time() != 0;
        if index < seq.current_index
            || (index == seq.current_index && current_started)
            || anim.current_loop != 0
        {
            return Err(AnimationError::InsertBeforeCurrent {
                index,
                current: seq.current_index,
            });
        }
        Ok(())
    }

    pub(crate) fn sequential_inserted(&mut self, group: AnimationId, index: usize) {
        let Some(seq) = self.sequential_mut(group) else {
            return;
        };
        if index < seq.actual_durations.len() {
            seq.actual_durations.insert(index, None);
        }

        if seq.current.is_none() {
            self.set_current_animation(group, 0, false);
            return;
        }

        // Inserted in front of a current child that has not started yet:
        // the new child takes over
        let current = seq.current;
        let current_index = seq.current_index;
        let not_started = current
            .and_then(|c| self.animations.get(c))
            .is_some_and(|c| c.current_time() == 0);
        if current_index == index && not_started {
            self.set_current_animation(group, index, false);
        }

        if let Some(seq) = self.sequential_mut(group) {
            if let Some(position) = seq.current.and_then(|c| seq.children.iter().position(|&x| x == c)) {
                seq.current_index = position;
            }
        }
    }

    pub(crate) fn sequential_removed(&mut self, group: AnimationId, index: usize, child: AnimationId) {
        let Some(seq) = self.sequential_mut(group) else {
            return;
        };
        if index < seq.actual_durations.len() {
            seq.actual_durations.remove(index);
        }

        let removed_current = seq.current == Some(child);
        if removed_current {
            let len = seq.children.len();
            if index < len {
                self.set_current_animation(group, index, false);
            } else if index > 0 {
                self.set_current_animation(group, index - 1, false);
            } else {
                self.clear_current_animation(group);
            }
        } else if seq.current_index > index {
            seq.current_index -= 1;
        }

        // Group time is everything before the current child, plus the
        // current child's own progress if it survived
        let Some(seq) = self.sequential(group) else {
            return;
        };
        let current_index = seq.current_index;
        let current = seq.current;
        let mut time: Msecs = (0..current_index)
            .map(|i| self.actual_total_duration(group, i).unwrap_or(0))
            .sum();
        if !removed_current {
            time += current
                .and_then(|c| self.animations.get(c))
                .map_or(0, |c| c.current_time());
        }
        let duration = self.duration(group).unwrap_or(0);
        if let Some(anim) = self.animations.get_mut(group) {
            anim.current_time = time;
            anim.total_current_time = time + anim.current_loop as Msecs * duration;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::easing::EasingType;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn group_of(sched: &mut AnimationScheduler, durations: &[Msecs]) -> (AnimationId, Vec<AnimationId>) {
        let group = sched.add_sequential_group();
        let children: Vec<_> = durations.iter().map(|&d| sched.add_pause(d)).collect();
        for &child in &children {
            sched.add_to_group(group, child).unwrap();
        }
        (group, children)
    }

    #[test]
    fn test_duration_is_sum_of_children() {
        let mut sched = AnimationScheduler::new();
        let (group, children) = group_of(&mut sched, &[100, 200, 50]);
        assert_eq!(sched.duration(group), Some(350));

        sched.set_loop_count(children[1], 2);
        assert_eq!(sched.duration(group), Some(550));

        let open = sched.add_uncontrolled(|_, _| {});
        sched.add_to_group(group, open).unwrap();
        assert_eq!(sched.duration(group), None);
    }

    #[test]
    fn test_index_for_time_boundaries() {
        let mut sched = AnimationScheduler::new();
        let (group, _) = group_of(&mut sched, &[100, 200, 100]);

        assert_eq!(sched.sequential_index_for_time(group, 0), Some((0, 0)));
        assert_eq!(sched.sequential_index_for_time(group, 100), Some((0, 0)));
        assert_eq!(sched.sequential_index_for_time(group, 101), Some((1, 100)));
        assert_eq!(sched.sequential_index_for_time(group, 300), Some((1, 100)));
        assert_eq!(sched.sequential_index_for_time(group, 400), Some((2, 300)));

        sched.set_direction(group, Direction::Backward);
        assert_eq!(sched.sequential_index_for_time(group, 100), Some((1, 100)));
        assert_eq!(sched.sequential_index_for_time(group, 99), Some((0, 0)));
        assert_eq!(sched.sequential_index_for_time(group, 400), Some((2, 300)));
    }

    #[test]
    fn test_first_child_is_current_once_added() {
        let mut sched = AnimationScheduler::new();
        let (group, children) = group_of(&mut sched, &[100, 100]);
        assert_eq!(sched.current_animation(group), Some(children[0]));
        assert_eq!(sched.current_animation_index(group), Some(0));
    }

    #[test]
    fn test_plays_children_in_order() {
        let mut sched = AnimationScheduler::new();
        let (group, children) = group_of(&mut sched, &[100, 200]);
        sched.start(group);
        assert_eq!(sched.state(children[0]), Some(AnimationState::Running));
        assert_eq!(sched.state(children[1]), Some(AnimationState::Stopped));

        sched.set_current_time(group, 150);
        assert_eq!(sched.current_animation(group), Some(children[1]));
        assert_eq!(sched.state(children[0]), Some(AnimationState::Stopped));
        assert_eq!(sched.get(children[0]).unwrap().current_time(), 100);
        assert_eq!(sched.get(children[1]).unwrap().current_time(), 50);

        sched.set_current_time(group, 300);
        assert_eq!(sched.state(group), Some(AnimationState::Stopped));
        assert_eq!(sched.state(children[1]), Some(AnimationState::Stopped));
    }

    #[test]
    fn test_only_group_is_registered() {
        let mut sched = AnimationScheduler::new();
        let (group, children) = group_of(&mut sched, &[100, 100]);
        sched.start(group);
        assert!(sched.is_registered(group));
        assert!(!sched.is_registered(children[0]));
    }

    #[test]
    fn test_pause_and_resume_current_child() {
        let mut sched = AnimationScheduler::new();
        let (group, children) = group_of(&mut sched, &[100, 100]);
        sched.start(group);
        sched.set_current_time(group, 30);

        sched.pause(group);
        assert_eq!(sched.state(children[0]), Some(AnimationState::Paused));

        sched.resume(group);
        assert_eq!(sched.state(children[0]), Some(AnimationState::Running));
        assert_eq!(sched.get(children[0]).unwrap().current_time(), 30);
    }

    #[test]
    fn test_rewinding_moves_back_through_children() {
        let mut sched = AnimationScheduler::new();
        let (group, children) = group_of(&mut sched, &[100, 100, 100]);
        sched.start(group);
        sched.set_current_time(group, 250);
        assert_eq!(sched.current_animation_index(group), Some(2));

        sched.set_current_time(group, 50);
        assert_eq!(sched.current_animation_index(group), Some(0));
        assert_eq!(sched.get(children[2]).unwrap().current_time(), 0);
        assert_eq!(sched.get(children[1]).unwrap().current_time(), 0);
        assert_eq!(sched.get(children[0]).unwrap().current_time(), 50);
        assert_eq!(sched.state(children[0]), Some(AnimationState::Running));
    }

    #[test]
    fn test_backward_group_starts_from_last_child() {
        let mut sched = AnimationScheduler::new();
        let (group, children) = group_of(&mut sched, &[100, 100]);
        sched.set_direction(group, Direction::Backward);
        sched.start(group);

        assert_eq!(sched.current_animation(group), Some(children[1]));
        assert_eq!(sched.get(children[1]).unwrap().direction(), Direction::Backward);
        assert_eq!(sched.get(children[1]).unwrap().current_time(), 100);

        sched.set_current_time(group, 60);
        assert_eq!(sched.current_animation(group), Some(children[0]));
        assert_eq!(sched.get(children[0]).unwrap().current_time(), 60);

        sched.set_current_time(group, 0);
        assert_eq!(sched.state(group), Some(AnimationState::Stopped));
    }

    #[test]
    fn test_looping_group_restarts_first_child() {
        let mut sched = AnimationScheduler::new();
        let (group, children) = group_of(&mut sched, &[100, 100]);
        sched.set_loop_count(group, 2);
        sched.start(group);

        sched.set_current_time(group, 150);
        sched.set_current_time(group, 230);
        let anim = sched.get(group).unwrap();
        assert_eq!(anim.current_loop(), 1);
        assert_eq!(sched.current_animation(group), Some(children[0]));
        assert_eq!(sched.get(children[0]).unwrap().current_time(), 30);
        assert_eq!(sched.state(children[0]), Some(AnimationState::Running));
    }

    #[test]
    fn test_uncontrolled_child_advances_group() {
        let mut sched = AnimationScheduler::new();
        let group = sched.add_sequential_group();
        let first = sched.add_pause(100);
        let open = sched.add_uncontrolled(|_, _| {});
        let last = sched.add_pause(100);
        for child in [first, open, last] {
            sched.add_to_group(group, child).unwrap();
        }

        sched.start(group);
        sched.set_current_time(group, 180);
        assert_eq!(sched.current_animation(group), Some(open));
        assert_eq!(sched.get(open).unwrap().current_time(), 80);

        sched.stop(open);
        assert_eq!(sched.current_animation(group), Some(last));
        assert_eq!(sched.state(last), Some(AnimationState::Running));
        assert_eq!(sched.duration(group), None);

        // The uncontrolled child now counts as 80ms
        sched.set_current_time(group, 200);
        assert_eq!(sched.get(last).unwrap().current_time(), 20);
    }

    #[test]
    fn test_insert_before_current_rejected() {
        let mut sched = AnimationScheduler::new();
        let (group, _) = group_of(&mut sched, &[100, 100]);
        sched.start(group);
        sched.set_current_time(group, 150);

        let late = sched.add_pause(10);
        assert_eq!(
            sched.insert_into_group(group, 0, late),
            Err(AnimationError::InsertBeforeCurrent {
                index: 0,
                current: 1
            })
        );
        assert_eq!(sched.animation_count(group), 2);

        // After the current child is fine
        sched.insert_into_group(group, 2, late).unwrap();
        assert_eq!(sched.animation_count(group), 3);
        assert_eq!(sched.duration(group), Some(210));
    }

    #[test]
    fn test_removing_current_child_promotes_next() {
        let mut sched = AnimationScheduler::new();
        let (group, children) = group_of(&mut sched, &[100, 100, 100]);
        sched.start(group);
        sched.set_current_time(group, 150);

        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = log.clone();
        sched.connect(group, move |_, event| {
            if let AnimationEvent::CurrentAnimationChanged(current) = event {
                sink.borrow_mut().push(*current);
            }
        });

        sched.remove_from_group(group, children[1]).unwrap();
        assert_eq!(sched.current_animation(group), Some(children[2]));
        assert_eq!(sched.current_animation_index(group), Some(1));
        assert_eq!(*log.borrow(), vec![Some(children[2])]);
        // Only the first child's duration precedes the new current child
        assert_eq!(sched.get(group).unwrap().current_loop_time(), 100);
    }

    #[test]
    fn test_removing_earlier_child_shifts_index() {
        let mut sched = AnimationScheduler::new();
        let (group, children) = group_of(&mut sched, &[100, 100, 100]);
        sched.start(group);
        sched.set_current_time(group, 250);

        sched.remove(children[0]);
        assert_eq!(sched.current_animation(group), Some(children[2]));
        assert_eq!(sched.current_animation_index(group), Some(1));
        assert_eq!(sched.get(group).unwrap().current_loop_time(), 150);
    }

    #[test]
    fn test_child_apply_can_stop_group() {
        let mut sched = AnimationScheduler::new();
        let group = sched.add_sequential_group();
        let child = sched.add_animation(100, EasingType::Linear, move |sched, frame| {
            if frame.local_time >= 50 {
                if let Some(group) = sched.get(frame.id).and_then(|a| a.group()) {
                    sched.stop(group);
                }
            }
        });
        sched.add_to_group(group, child).unwrap();

        sched.start(group);
        sched.set_current_time(group, 60);
        assert_eq!(sched.state(group), Some(AnimationState::Stopped));
        assert_eq!(sched.state(child), Some(AnimationState::Stopped));
    }

    #[test]
    fn test_pause_on_child_boundary_keeps_position() {
        let mut sched = AnimationScheduler::new();
        let (group, children) = group_of(&mut sched, &[100, 200]);
        let finished = Rc::new(RefCell::new(0));
        let count = finished.clone();
        sched.connect(children[0], move |_, event| {
            if *event == AnimationEvent::Finished {
                *count.borrow_mut() += 1;
            }
        });

        sched.start(group);
        sched.set_current_time(group, 100);
        assert_eq!(sched.state(children[0]), Some(AnimationState::Stopped));

        sched.pause(group);
        assert_eq!(sched.current_animation(group), Some(children[0]));
        assert_eq!(sched.state(children[0]), Some(AnimationState::Stopped));
        assert_eq!(sched.get(children[0]).unwrap().current_time(), 100);
        assert_eq!(sched.get(group).unwrap().current_time(), 100);

        sched.resume(group);
        assert_eq!(sched.state(children[0]), Some(AnimationState::Stopped));

        sched.set_current_time(group, 150);
        assert_eq!(sched.current_animation(group), Some(children[1]));
        assert_eq!(sched.get(children[1]).unwrap().current_time(), 50);
        assert_eq!(*finished.borrow(), 1);
    }

    #[test]
    fn test_backward_pause_on_child_boundary_keeps_position() {
        let mut sched = AnimationScheduler::new();
        let (group, children) = group_of(&mut sched, &[100, 200]);
        sched.set_direction(group, Direction::Backward);
        sched.start(group);

        sched.set_current_time(group, 100);
        assert_eq!(sched.current_animation(group), Some(children[1]));
        assert_eq!(sched.get(children[1]).unwrap().current_time(), 0);

        sched.pause(group);
        assert_eq!(sched.state(children[1]), Some(AnimationState::Stopped));
        assert_eq!(sched.get(children[1]).unwrap().current_time(), 0);
        assert_eq!(sched.get(group).unwrap().current_time(), 100);

        sched.resume(group);
        sched.set_current_time(group, 50);
        assert_eq!(sched.current_animation(group), Some(children[0]));
        assert_eq!(sched.get(children[0]).unwrap().current_time(), 50);
        assert_eq!(sched.get(children[1]).unwrap().current_time(), 0);
    }

    #[test]
    fn test_backward_seek_into_earlier_loop() {
        let mut sched = AnimationScheduler::new();
        let (group, children) = group_of(&mut sched, &[100, 100]);
        sched.set_loop_count(group, 2);
        sched.set_direction(group, Direction::Backward);
        sched.start(group);
        assert_eq!(sched.get(group).unwrap().current_time(), 400);

        sched.set_current_time(group, 250);
        assert_eq!(sched.current_animation_index(group), Some(0));
        assert_eq!(sched.get(children[0]).unwrap().current_time(), 50);

        sched.set_current_time(group, 150);
        assert_eq!(sched.get(group).unwrap().current_loop(), 0);
        assert_eq!(sched.current_animation_index(group), Some(1));
        assert_eq!(sched.get(children[1]).unwrap().current_time(), 50);
        assert_eq!(sched.state(children[0]), Some(AnimationState::Stopped));
        assert_eq!(sched.get(children[0]).unwrap().current_time(), 0);

        sched.set_current_time(group, 50);
        assert_eq!(sched.current_animation_index(group), Some(0));
        assert_eq!(sched.get(children[0]).unwrap().current_time(), 50);
        assert_eq!(sched.get(children[1]).unwrap().current_time(), 0);

        sched.set_current_time(group, 0);
        assert_eq!(sched.state(group), Some(AnimationState::Stopped));
        assert_eq!(sched.state(children[0]), Some(AnimationState::Stopped));
    }
}
