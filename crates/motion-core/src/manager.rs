//! Animation manager for coordinating transitions and keyframe animations.
//!
//! The `AnimationManager` advances every active animation of a render
//! surface. It handles:
//! - Starting and tracking transitions (property value changes)
//! - Starting and tracking keyframe animations
//! - Updating all active animations each frame
//! - Providing current animated values for rendering
//! - Handling transition interruption (retargeting)
//!
//! Lifecycle events are queued during `update()` and `cleanup()` and drained
//! by the owner with `drain_events()`.
//!
//! # Usage
//!
//! ```
//! use motion_core::manager::AnimationManager;
//! use motion_core::transition::TransitionSpec;
//! use motion_core::types::{AnimatableProperty, AnimatableValue};
//!
//! let mut manager = AnimationManager::new();
//! manager.start_transition(
//!     "box",
//!     AnimatableProperty::Opacity,
//!     AnimatableValue::Number { value: 0.0 },
//!     AnimatableValue::Number { value: 1.0 },
//!     &TransitionSpec::new(300.0),
//! );
//!
//! manager.update(16.0);
//! assert!(manager.get_animated_value("box", AnimatableProperty::Opacity).is_some());
//! ```

use std::collections::HashMap;

use tracing::trace;

use crate::events::{AnimationEvent, Lifecycle};
use crate::keyframes::{
    ActiveKeyframeAnimation, AnimationPlayState, KeyframePlayback, KeyframeRule,
};
use crate::transition::{ActiveTransition, TransitionSpec};
use crate::types::{AnimatableProperty, AnimatableValue, AnimationId, AnimationState, PropertyMap};

/// Central manager for all active animations on a surface.
#[derive(Debug, Default)]
pub struct AnimationManager {
    transitions: HashMap<AnimationId, ActiveTransition>,

    keyframe_animations: HashMap<AnimationId, ActiveKeyframeAnimation>,

    /// Only one transition can be active per (node, property) pair.
    node_property_index: HashMap<(String, AnimatableProperty), AnimationId>,

    /// Keyframe animation IDs per node, in start order.
    node_keyframe_index: HashMap<String, Vec<AnimationId>>,

    /// Lifecycle events not yet drained, in emission order.
    events: Vec<AnimationEvent>,
}

impl AnimationManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a transition for a property.
    ///
    /// A transition already running for this (node, property) pair is
    /// retargeted to the new value without new events. An instant spec
    /// cancels any running transition and starts nothing, and so does an
    /// assignment that does not change the value. Returns the ID of the new
    /// or retargeted transition.
    pub fn start_transition(
        &mut self,
        node_id: &str,
        property: AnimatableProperty,
        start: AnimatableValue,
        end: AnimatableValue,
        spec: &TransitionSpec,
    ) -> Option<AnimationId> {
        let key = (node_id.to_string(), property);

        if spec.is_instant() {
            if let Some(&existing_id) = self.node_property_index.get(&key) {
                self.cancel_transition(existing_id);
            }
            return None;
        }

        if let Some(&existing_id) = self.node_property_index.get(&key) {
            if let Some(existing) = self.transitions.get_mut(&existing_id) {
                if existing.is_active() {
                    existing.retarget(end, spec);
                    trace!(node_id, %property, "retargeted transition");
                    return Some(existing_id);
                }
            }
        }

        if start == end {
            return None;
        }

        let transition =
            ActiveTransition::new(node_id.to_string(), property, start, end, spec);
        let id = transition.id;

        self.events.push(AnimationEvent::new(
            id,
            node_id,
            Lifecycle::TransitionStarted { property },
        ));

        self.transitions.insert(id, transition);
        self.node_property_index.insert(key, id);

        Some(id)
    }

    /// Start a keyframe animation on a node.
    ///
    /// `base` holds the node's current values; properties named on only one
    /// side of the rule interpolate against them.
    pub fn start_keyframe_animation(
        &mut self,
        node_id: &str,
        rule: KeyframeRule,
        playback: KeyframePlayback,
        base: PropertyMap,
    ) -> AnimationId {
        let name = playback.name.clone();
        let active = ActiveKeyframeAnimation::new(node_id.to_string(), rule, playback, base);
        let id = active.id;

        self.events
            .push(AnimationEvent::new(id, node_id, Lifecycle::KeyframesStarted { name }));

        self.keyframe_animations.insert(id, active);
        self.node_keyframe_index
            .entry(node_id.to_string())
            .or_default()
            .push(id);

        id
    }

    /// Advance all active animations by `delta_ms` and reap finished ones.
    pub fn update(&mut self, delta_ms: f32) {
        if self.transitions.is_empty() && self.keyframe_animations.is_empty() {
            return;
        }

        for transition in self.transitions.values_mut() {
            transition.update(delta_ms);
        }

        let mut ids: Vec<AnimationId> = self.keyframe_animations.keys().copied().collect();
        ids.sort_by_key(|id| id.0);
        for id in ids {
            let Some(animation) = self.keyframe_animations.get_mut(&id) else {
                continue;
            };
            let before = animation.completed_iterations();
            let active = animation.update(delta_ms);
            let mut after = animation.completed_iterations();
            if !active && animation.is_finished() {
                // The last boundary is reported as the end, not an iteration
                after = after.saturating_sub(1);
            }
            for iteration in before..after {
                self.events.push(AnimationEvent::new(
                    id,
                    animation.node_id.as_str(),
                    Lifecycle::KeyframesIteration {
                        name: animation.playback.name.clone(),
                        iteration,
                    },
                ));
            }
        }

        self.cleanup();
    }

    /// Remove finished and cancelled animations, queueing their end or
    /// cancel events. Does not advance time.
    pub fn cleanup(&mut self) {
        for (id, transition) in reap(&mut self.transitions, ActiveTransition::is_active) {
            let key = (transition.node_id.clone(), transition.property);
            if self.node_property_index.get(&key) == Some(&id) {
                self.node_property_index.remove(&key);
            }

            let property = transition.property;
            let lifecycle = if transition.state == AnimationState::Cancelled {
                Lifecycle::TransitionCancelled { property }
            } else {
                Lifecycle::TransitionEnded { property }
            };
            self.events
                .push(AnimationEvent::new(id, transition.node_id, lifecycle));
        }

        for (id, animation) in reap(&mut self.keyframe_animations, ActiveKeyframeAnimation::is_active) {
            if let Some(ids) = self.node_keyframe_index.get_mut(&animation.node_id) {
                ids.retain(|i| *i != id);
                if ids.is_empty() {
                    self.node_keyframe_index.remove(&animation.node_id);
                }
            }

            let name = animation.playback.name;
            let lifecycle = if animation.state == AnimationState::Cancelled {
                Lifecycle::KeyframesCancelled { name }
            } else {
                Lifecycle::KeyframesEnded { name }
            };
            self.events
                .push(AnimationEvent::new(id, animation.node_id, lifecycle));
        }
    }

    /// Current animated value for a property.
    ///
    /// Transitions take priority over keyframe animations; later keyframe
    /// animations win over earlier ones.
    pub fn get_animated_value(
        &self,
        node_id: &str,
        property: AnimatableProperty,
    ) -> Option<AnimatableValue> {
        let key = (node_id.to_string(), property);
        if let Some(transition) = self
            .node_property_index
            .get(&key)
            .and_then(|id| self.transitions.get(id))
        {
            return Some(transition.current_value());
        }

        self.node_keyframe_index
            .get(node_id)?
            .iter()
            .rev()
            .filter_map(|id| self.keyframe_animations.get(id))
            .find_map(|animation| animation.current_value(property))
    }

    pub fn cancel_transition(&mut self, id: AnimationId) {
        if let Some(transition) = self.transitions.get_mut(&id) {
            transition.cancel();
        }
    }

    pub fn cancel_transition_for(&mut self, node_id: &str, property: AnimatableProperty) {
        let key = (node_id.to_string(), property);
        if let Some(&id) = self.node_property_index.get(&key) {
            self.cancel_transition(id);
        }
    }

    pub fn cancel_keyframe_animation(&mut self, id: AnimationId) {
        if let Some(animation) = self.keyframe_animations.get_mut(&id) {
            animation.cancel();
        }
    }

    pub fn pause_keyframe_animation(&mut self, id: AnimationId) {
        if let Some(animation) = self.keyframe_animations.get_mut(&id) {
            animation.pause();
        }
    }

    /// Cancel every transition and keyframe animation on a node.
    pub fn cancel_all_for_node(&mut self, node_id: &str) {
        let on_node = |owner: &str, active: bool| active && owner == node_id;
        for transition in self
            .transitions
            .values_mut()
            .filter(|t| on_node(&t.node_id, t.is_active()))
        {
            transition.cancel();
        }
        for animation in self
            .keyframe_animations
            .values_mut()
            .filter(|a| on_node(&a.node_id, a.is_active()))
        {
            animation.cancel();
        }
    }

    /// Whether the node has an active transition or an unpaused keyframe
    /// animation.
    pub fn is_node_animating(&self, node_id: &str) -> bool {
        let transitioning = self
            .transitions
            .values()
            .any(|t| t.node_id == node_id && t.is_active());
        let playing = self.node_keyframe_index.get(node_id).is_some_and(|ids| {
            ids.iter()
                .filter_map(|id| self.keyframe_animations.get(id))
                .any(|a| a.is_active() && a.play_state == AnimationPlayState::Running)
        });
        transitioning || playing
    }

    pub fn has_active_animations(&self) -> bool {
        self.transitions.values().any(|t| t.is_active())
            || self.keyframe_animations.values().any(|a| a.is_active())
    }

    /// Drain all pending events in emission order.
    pub fn drain_events(&mut self) -> impl Iterator<Item = AnimationEvent> + '_ {
        self.events.drain(..)
    }
}

/// Take the entries that are no longer active out of `map`, oldest first.
fn reap<T>(
    map: &mut HashMap<AnimationId, T>,
    active: impl Fn(&T) -> bool,
) -> Vec<(AnimationId, T)> {
    let mut ids: Vec<AnimationId> = map
        .iter()
        .filter(|(_, entry)| !active(entry))
        .map(|(id, _)| *id)
        .collect();
    ids.sort_by_key(|id| id.0);
    ids.into_iter()
        .filter_map(|id| map.remove(&id).map(|entry| (id, entry)))
        .collect()
}

// The manager holds no Rc state and can move to a render thread
static_assertions::assert_impl_all!(AnimationManager: Send);
