//! Parallel animation groups
//!
//! All children start together and receive the same time. The group lasts
//! as long as its longest child; shorter children stop on their own when
//! the group time passes their end.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::animation::{AnimationId, AnimationKind, AnimationState, Direction, Msecs};
use crate::scheduler::AnimationScheduler;

#[derive(Debug, Default)]
pub(crate) struct ParallelGroup {
    pub(crate) children: SmallVec<[AnimationId; 4]>,
    pub(crate) last_loop: i32,
    pub(crate) last_current_time: Msecs,
    /// Undefined-duration children being waited on, with the time they ran
    /// for once finished
    pub(crate) uncontrolled_finish_time: FxHashMap<AnimationId, Option<Msecs>>,
}

impl AnimationScheduler {
    fn parallel(&self, group: AnimationId) -> Option<&ParallelGroup> {
        match &self.animations.get(group)?.kind {
            AnimationKind::Parallel(par) => Some(par),
            _ => None,
        }
    }

    fn parallel_mut(&mut self, group: AnimationId) -> Option<&mut ParallelGroup> {
        match &mut self.animations.get_mut(group)?.kind {
            AnimationKind::Parallel(par) => Some(par),
            _ => None,
        }
    }

    pub(crate) fn parallel_update(&mut self, group: AnimationId, current_time: Msecs) {
        let Some(par) = self.parallel(group) else {
            return;
        };
        if par.children.is_empty() {
            return;
        }
        let children = par.children.clone();
        let (last_loop, last_current_time) = (par.last_loop, par.last_current_time);
        let Some(current_loop) = self.animations.get(group).map(|a| a.current_loop) else {
            return;
        };

        if current_loop > last_loop {
            // Finish whatever was still running in the previous loop
            if let Some(duration) = self.duration(group).filter(|&d| d > 0) {
                for &child in &children {
                    if self.state(child).is_some_and(|s| s != AnimationState::Stopped) {
                        self.set_current_time(child, duration);
                    }
                }
            }
        } else if current_loop < last_loop {
            // Moving back into an earlier loop: rewind everything
            for &child in &children {
                self.apply_group_state(group, child);
                self.set_current_time(child, 0);
                self.stop(child);
            }
        }

        for &child in &children {
            if !self.contains(child) {
                continue;
            }
            let child_total = self.total_duration(child);
            let start_if_at_end = child_total.map_or(true, |d| last_current_time > d);
            if current_loop > last_loop
                || self.parallel_should_start(group, child, current_time, start_if_at_end)
            {
                self.apply_group_state(group, child);
            }

            let Some(group_state) = self.state(group) else {
                return;
            };
            if self.state(child) == Some(group_state) {
                self.set_current_time(child, current_time);
                if child_total.is_some_and(|d| d > 0 && current_time > d) {
                    self.stop(child);
                }
            }
        }

        if let Some(par) = self.parallel_mut(group) {
            par.last_loop = current_loop;
            par.last_current_time = current_time;
        }
        self.parallel_check_uncontrolled_done(group);
    }

    /// Whether `child` should be running at group time `current_time`
    fn parallel_should_start(
        &self,
        group: AnimationId,
        child: AnimationId,
        current_time: Msecs,
        start_if_at_end: bool,
    ) -> bool {
        let Some(total) = self.total_duration(child) else {
            return !self.parallel_uncontrolled_finished(group, child);
        };
        if start_if_at_end {
            return current_time <= total;
        }
        match self.animations.get(group).map(|a| a.direction) {
            Some(Direction::Backward) => current_time > 0 && current_time <= total,
            _ => current_time < total,
        }
    }

    fn parallel_uncontrolled_finished(&self, group: AnimationId, child: AnimationId) -> bool {
        self.parallel(group)
            .and_then(|par| par.uncontrolled_finish_time.get(&child).copied())
            .flatten()
            .is_some()
    }

    /// Bring a child into the group's state
    fn apply_group_state(&mut self, group: AnimationId, child: AnimationId) {
        match self.state(group) {
            Some(AnimationState::Running) => self.start(child),
            Some(AnimationState::Paused) => {
                if self.state(child) == Some(AnimationState::Running) {
                    self.pause(child);
                }
            }
            _ => {}
        }
    }

    /// Stop a group with undefined duration once every undefined child has
    /// finished and the group time is past every defined child
    fn parallel_check_uncontrolled_done(&mut self, group: AnimationId) {
        let Some(par) = self.parallel(group) else {
            return;
        };
        if par.uncontrolled_finish_time.is_empty()
            || par.uncontrolled_finish_time.values().any(|t| t.is_none())
        {
            return;
        }
        let longest = par
            .children
            .iter()
            .filter_map(|&child| self.total_duration(child))
            .max()
            .unwrap_or(0);
        let Some(anim) = self.animations.get(group) else {
            return;
        };
        if anim.state != AnimationState::Stopped && anim.current_time >= longest {
            tracing::debug!("group {:?}: all uncontrolled children finished", group);
            self.stop(group);
        }
    }

    pub(crate) fn parallel_child_finished(&mut self, group: AnimationId, child: AnimationId) {
        if self.total_duration(child).is_some() {
            return;
        }
        let elapsed = self.get(child).map_or(0, |c| c.current_time());
        let Some(par) = self.parallel_mut(group) else {
            return;
        };
        if let Some(slot) = par.uncontrolled_finish_time.get_mut(&child) {
            *slot = Some(elapsed);
        }
        self.parallel_check_uncontrolled_done(group);
    }

    fn parallel_connect_uncontrolled(&mut self, group: AnimationId, child: AnimationId) {
        if self.total_duration(child).is_some() {
            return;
        }
        if let Some(par) = self.parallel_mut(group) {
            par.uncontrolled_finish_time.entry(child).or_insert(None);
        }
        if let Some(anim) = self.animations.get_mut(child) {
            anim.completion_subscriber = Some(group);
        }
    }

    fn parallel_disconnect_uncontrolled(&mut self, group: AnimationId) {
        let Some(par) = self.parallel_mut(group) else {
            return;
        };
        let waiting: Vec<_> = par.uncontrolled_finish_time.drain().map(|(c, _)| c).collect();
        for child in waiting {
            if let Some(anim) = self.animations.get_mut(child) {
                anim.completion_subscriber = None;
            }
        }
    }

    pub(crate) fn parallel_update_state(
        &mut self,
        group: AnimationId,
        new_state: AnimationState,
        old_state: AnimationState,
    ) {
        let Some(par) = self.parallel(group) else {
            return;
        };
        let children = par.children.clone();

        match new_state {
            AnimationState::Stopped => {
                for &child in &children {
                    if self.contains(child) {
                        self.stop(child);
                    }
                }
                self.parallel_disconnect_uncontrolled(group);
            }
            AnimationState::Paused => {
                for &child in &children {
                    if self.state(child) == Some(AnimationState::Running) {
                        self.pause(child);
                    }
                }
            }
            AnimationState::Running => {
                for &child in &children {
                    self.parallel_connect_uncontrolled(group, child);
                }
                let Some(anim) = self.animations.get(group) else {
                    return;
                };
                let (direction, current_time) = (anim.direction, anim.current_time);
                for &child in &children {
                    if !self.contains(child) {
                        continue;
                    }
                    if old_state == AnimationState::Stopped {
                        self.stop(child);
                    }
                    self.set_direction(child, direction);
                    let from_stopped = old_state == AnimationState::Stopped;
                    if self.parallel_should_start(group, child, current_time, from_stopped) {
                        self.start(child);
                    }
                }
            }
        }
    }

    pub(crate) fn parallel_update_direction(&mut self, group: AnimationId, direction: Direction) {
        let Some(anim) = self.animations.get(group) else {
            return;
        };
        if anim.state != AnimationState::Stopped {
            for child in self.children(group).to_vec() {
                self.set_direction(child, direction);
            }
            return;
        }

        let loop_count = anim.loop_count;
        let duration = self.duration(group).unwrap_or(0);
        if let Some(par) = self.parallel_mut(group) {
            match direction {
                Direction::Forward => {
                    par.last_loop = 0;
                    par.last_current_time = 0;
                }
                Direction::Backward => {
                    par.last_loop = if loop_count == -1 { 0 } else { loop_count - 1 };
                    par.last_current_time = duration;
                }
            }
        }
    }

    pub(crate) fn parallel_inserted(&mut self, group: AnimationId, child: AnimationId) {
        match self.state(group) {
            Some(AnimationState::Stopped) | None => {}
            Some(_) => {
                self.parallel_connect_uncontrolled(group, child);
                if let Some(direction) = self.get(group).map(|a| a.direction()) {
                    self.set_direction(child, direction);
                }
            }
        }
    }

    pub(crate) fn parallel_removed(&mut self, group: AnimationId, child: AnimationId) {
        if let Some(par) = self.parallel_mut(group) {
            par.uncontrolled_finish_time.remove(&child);
        }
    }
}
