//! Child-list management shared by sequential and parallel groups
//!
//! A group owns its children: removing a group removes them too, and an
//! animation belongs to at most one group at a time. Inserting an animation
//! that is already in a group moves it.

use crate::animation::{Animation, AnimationId, AnimationKind, AnimationState, AnimationType};
use crate::error::{AnimationError, Result};
use crate::parallel::ParallelGroup;
use crate::scheduler::AnimationScheduler;
use crate::sequential::SequentialGroup;

impl AnimationScheduler {
    /// Add an empty group that plays its children one after another
    pub fn add_sequential_group(&mut self) -> AnimationId {
        let kind = AnimationKind::Sequential(SequentialGroup::default());
        self.animations.insert(Animation::new(kind))
    }

    /// Add an empty group that plays its children at the same time
    pub fn add_parallel_group(&mut self) -> AnimationId {
        let kind = AnimationKind::Parallel(ParallelGroup::default());
        self.animations.insert(Animation::new(kind))
    }

    /// Children of a group, in order. Empty for leaves and unknown ids.
    pub fn children(&self, group: AnimationId) -> &[AnimationId] {
        match self.animations.get(group).map(|anim| &anim.kind) {
            Some(AnimationKind::Sequential(seq)) => seq.children.as_slice(),
            Some(AnimationKind::Parallel(par)) => par.children.as_slice(),
            _ => &[],
        }
    }

    pub fn animation_count(&self, group: AnimationId) -> usize {
        self.children(group).len()
    }

    pub fn animation_at(&self, group: AnimationId, index: usize) -> Option<AnimationId> {
        self.children(group).get(index).copied()
    }

    pub fn index_of_animation(&self, group: AnimationId, child: AnimationId) -> Option<usize> {
        self.children(group).iter().position(|&c| c == child)
    }

    /// Append `child` to `group`
    pub fn add_to_group(&mut self, group: AnimationId, child: AnimationId) -> Result<()> {
        let index = self.group_len(group)?;
        let index = match self.animations.get(child).and_then(|a| a.group) {
            // Moving to the end of its own group
            Some(current) if current == group => index - 1,
            _ => index,
        };
        self.insert_into_group(group, index, child)
    }

    /// Insert `child` at `index`.
    ///
    /// A child of another group is moved out of it first; for a child of
    /// `group` itself, `index` refers to the list without it. A running
    /// top-level animation is stopped before it joins.
    pub fn insert_into_group(
        &mut self,
        group: AnimationId,
        index: usize,
        child: AnimationId,
    ) -> Result<()> {
        let result = self.try_insert_into_group(group, index, child);
        if let Err(err) = &result {
            tracing::warn!("insert_into_group: {}", err);
        }
        result
    }

    fn try_insert_into_group(
        &mut self,
        group: AnimationId,
        index: usize,
        child: AnimationId,
    ) -> Result<()> {
        let len = self.group_len(group)?;
        let Some(child_anim) = self.animations.get(child) else {
            return Err(AnimationError::UnknownAnimation(child));
        };
        let previous_group = child_anim.group;

        let mut ancestor = Some(group);
        while let Some(current) = ancestor {
            if current == child {
                return Err(AnimationError::CyclicGroup { group, child });
            }
            ancestor = self.animations.get(current).and_then(|a| a.group);
        }

        let len = if previous_group == Some(group) { len - 1 } else { len };
        if index > len {
            return Err(AnimationError::IndexOutOfBounds { index, len });
        }
        if self.animations.get(group).map(|a| a.animation_type()) == Some(AnimationType::Sequential)
        {
            self.sequential_check_insert(group, index)?;
        }

        if let Some(previous) = previous_group {
            if let Some(old_index) = self.index_of_animation(previous, child) {
                self.detach_child(previous, old_index);
            }
        }
        if self.state(child).is_some_and(|s| s != AnimationState::Stopped) {
            self.stop(child);
        }

        // Stopping may have run callbacks
        if !self.contains(child) || !self.contains(group) {
            return Err(AnimationError::UnknownAnimation(child));
        }
        let index = index.min(self.animation_count(group));
        match self.animations.get_mut(group).map(|a| &mut a.kind) {
            Some(AnimationKind::Sequential(seq)) => seq.children.insert(index, child),
            Some(AnimationKind::Parallel(par)) => par.children.insert(index, child),
            _ => return Err(AnimationError::NotAGroup(group)),
        }
        if let Some(anim) = self.animations.get_mut(child) {
            anim.group = Some(group);
        }
        tracing::trace!("inserted {:?} into group {:?} at {}", child, group, index);

        match self.animations.get(group).map(|a| a.animation_type()) {
            Some(AnimationType::Sequential) => self.sequential_inserted(group, index),
            Some(AnimationType::Parallel) => self.parallel_inserted(group, child),
            _ => {}
        }
        Ok(())
    }

    /// Detach `child` from `group`. The child becomes a stopped top-level
    /// animation.
    pub fn remove_from_group(&mut self, group: AnimationId, child: AnimationId) -> Result<()> {
        self.group_len(group)?;
        let Some(index) = self.index_of_animation(group, child) else {
            let err = AnimationError::NotAChild { group, child };
            tracing::warn!("remove_from_group: {}", err);
            return Err(err);
        };
        self.take_from_group(group, index).map(|_| ())
    }

    /// Detach the child at `index` and return it
    pub fn take_from_group(&mut self, group: AnimationId, index: usize) -> Result<AnimationId> {
        let len = self.group_len(group)?;
        if index >= len {
            let err = AnimationError::IndexOutOfBounds { index, len };
            tracing::warn!("take_from_group: {}", err);
            return Err(err);
        }

        let child = self
            .detach_child(group, index)
            .ok_or(AnimationError::IndexOutOfBounds { index, len })?;
        if self.state(child).is_some_and(|s| s != AnimationState::Stopped) {
            self.stop(child);
        }
        Ok(child)
    }

    /// Remove every child of `group` from the scheduler
    pub fn clear_group(&mut self, group: AnimationId) -> Result<()> {
        self.group_len(group)?;
        while let Some(&last) = self.children(group).last() {
            self.remove(last);
        }
        Ok(())
    }

    fn group_len(&self, group: AnimationId) -> Result<usize> {
        match self.animations.get(group) {
            None => Err(AnimationError::UnknownAnimation(group)),
            Some(anim) if !anim.is_group() => Err(AnimationError::NotAGroup(group)),
            Some(_) => Ok(self.animation_count(group)),
        }
    }

    /// Unlink the child at `index` and let the group react.
    ///
    /// The child keeps its state; callers decide whether to stop it.
    pub(crate) fn detach_child(&mut self, group: AnimationId, index: usize) -> Option<AnimationId> {
        let child = match self.animations.get_mut(group).map(|a| &mut a.kind) {
            Some(AnimationKind::Sequential(seq)) if index < seq.children.len() => {
                seq.children.remove(index)
            }
            Some(AnimationKind::Parallel(par)) if index < par.children.len() => {
                par.children.remove(index)
            }
            _ => return None,
        };
        if let Some(anim) = self.animations.get_mut(child) {
            anim.group = None;
            anim.completion_subscriber = None;
        }
        tracing::trace!("detached {:?} from group {:?}", child, group);

        match self.animations.get(group).map(|a| a.animation_type()) {
            Some(AnimationType::Sequential) => self.sequential_removed(group, index, child),
            Some(AnimationType::Parallel) => self.parallel_removed(group, child),
            _ => {}
        }

        if self.animation_count(group) == 0 {
            if let Some(anim) = self.animations.get_mut(group) {
                anim.current_time = 0;
                anim.total_current_time = 0;
                anim.current_loop = 0;
            }
            if self.contains(group) {
                self.stop(group);
            }
        }
        Some(child)
    }
}
