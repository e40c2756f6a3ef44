//! Keyframe animations.
//!
//! - `KeyframeRule`: a named `from`/`to` rule, as inserted into a style sheet
//! - `KeyframePlayback`: how a rule is played (duration, delay, easing,
//!   iteration count, direction), like the CSS `animation` shorthand
//! - `ActiveKeyframeAnimation`: runtime state for an in-progress animation
//!
//! Animations use fill mode `none`: once finished they stop contributing
//! values and the node's assigned style shows through again.
//!
//! # Example
//!
//! ```
//! use motion_core::keyframes::{IterationCount, KeyframePlayback, KeyframeRule};
//! use motion_core::types::{AnimatableProperty, AnimatableValue};
//!
//! let rule = KeyframeRule::new("fade-in")
//!     .from(AnimatableProperty::Opacity, AnimatableValue::Number { value: 0.0 })
//!     .to(AnimatableProperty::Opacity, AnimatableValue::Number { value: 1.0 });
//! let playback = KeyframePlayback::new(&rule.name, 500.0)
//!     .iterations(IterationCount::Times(2));
//! assert_eq!(playback.name, "fade-in");
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::easing::EasingFunction;
use crate::interpolate::Interpolate;
use crate::timeline::Timeline;
use crate::types::{AnimatableProperty, AnimatableValue, AnimationId, AnimationState, PropertyMap};

/// How many times an animation should repeat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "count", rename_all = "snake_case")]
pub enum IterationCount {
    Times(u32),
    Infinite,
}

impl Default for IterationCount {
    fn default() -> Self {
        Self::Times(1)
    }
}

impl IterationCount {
    /// Whether `played` iterations reach the end of the animation.
    pub fn completed_by(&self, played: f32) -> bool {
        match self {
            Self::Infinite => false,
            Self::Times(count) => played >= *count as f32,
        }
    }
}

/// Direction of animation playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimationDirection {
    #[default]
    Normal,
    /// Even iterations play forward, odd iterations backward.
    Alternate,
}

impl AnimationDirection {
    pub fn is_reversed(&self, iteration: u32) -> bool {
        match self {
            Self::Normal => false,
            Self::Alternate => iteration % 2 == 1,
        }
    }
}

/// Current play state of an animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimationPlayState {
    #[default]
    Running,
    Paused,
}

/// A named two-keyframe rule.
///
/// A property present on only one side takes the node's base value on the
/// other side.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeyframeRule {
    pub name: String,
    pub from: PropertyMap,
    pub to: PropertyMap,
}

impl KeyframeRule {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn from(mut self, property: AnimatableProperty, value: AnimatableValue) -> Self {
        self.from.insert(property, value);
        self
    }

    pub fn to(mut self, property: AnimatableProperty, value: AnimatableValue) -> Self {
        self.to.insert(property, value);
        self
    }

    /// Every property named on either side, in canonical order.
    pub fn animated_properties(&self) -> Vec<AnimatableProperty> {
        let props: BTreeSet<AnimatableProperty> =
            self.from.keys().chain(self.to.keys()).copied().collect();
        props.into_iter().collect()
    }

    /// Value of `property` at `offset` (0.0 = from, 1.0 = to), eased.
    pub fn value_at(
        &self,
        property: AnimatableProperty,
        offset: f32,
        easing: EasingFunction,
        base: &PropertyMap,
    ) -> Option<AnimatableValue> {
        let fallback = || base.get(&property).cloned().unwrap_or_else(|| property.initial_value());
        let (from, to) = match (self.from.get(&property), self.to.get(&property)) {
            (None, None) => return None,
            (Some(from), Some(to)) => (from.clone(), to.clone()),
            (Some(from), None) => (from.clone(), fallback()),
            (None, Some(to)) => (fallback(), to.clone()),
        };
        Some(from.interpolate(&to, easing.evaluate(offset.clamp(0.0, 1.0))))
    }
}

/// Playback parameters for a keyframe rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyframePlayback {
    /// Name of the rule in the style sheet.
    pub name: String,
    pub duration_ms: f32,
    pub delay_ms: f32,
    pub easing: EasingFunction,
    pub iterations: IterationCount,
    pub direction: AnimationDirection,
}

impl KeyframePlayback {
    pub fn new(name: impl Into<String>, duration_ms: f32) -> Self {
        Self {
            name: name.into(),
            duration_ms,
            delay_ms: 0.0,
            easing: EasingFunction::Linear,
            iterations: IterationCount::default(),
            direction: AnimationDirection::Normal,
        }
    }

    pub fn delay_ms(mut self, delay: f32) -> Self {
        self.delay_ms = delay;
        self
    }

    pub fn easing(mut self, easing: EasingFunction) -> Self {
        self.easing = easing;
        self
    }

    pub fn iterations(mut self, count: IterationCount) -> Self {
        self.iterations = count;
        self
    }

    pub fn direction(mut self, direction: AnimationDirection) -> Self {
        self.direction = direction;
        self
    }
}

/// A rule playing on one node.
#[derive(Debug, Clone)]
pub struct ActiveKeyframeAnimation {
    pub id: AnimationId,
    pub node_id: String,
    pub rule: KeyframeRule,
    pub playback: KeyframePlayback,
    /// Node values captured at start, used for one-sided properties.
    pub base: PropertyMap,
    pub state: AnimationState,
    pub play_state: AnimationPlayState,
    timeline: Timeline,
    /// Iterations played, fractional and capped at the iteration count.
    played: f32,
}

impl ActiveKeyframeAnimation {
    pub fn new(
        node_id: String,
        rule: KeyframeRule,
        playback: KeyframePlayback,
        base: PropertyMap,
    ) -> Self {
        let timeline = Timeline::new(playback.duration_ms, playback.delay_ms);
        let state = if timeline.waiting() {
            AnimationState::Pending
        } else {
            AnimationState::Running
        };

        Self {
            id: AnimationId::new(),
            node_id,
            rule,
            playback,
            base,
            state,
            play_state: AnimationPlayState::Running,
            timeline,
            played: 0.0,
        }
    }

    /// Offset within the rule (0.0 = from, 1.0 = to) after direction.
    pub fn current_offset(&self) -> f32 {
        let (iteration, offset) = self.timeline.position();
        if self.playback.direction.is_reversed(iteration) {
            1.0 - offset
        } else {
            offset
        }
    }

    /// Current value of a property, or `None` outside the active phase.
    pub fn current_value(&self, property: AnimatableProperty) -> Option<AnimatableValue> {
        if self.state != AnimationState::Running {
            return None;
        }
        self.rule.value_at(
            property,
            self.current_offset(),
            self.playback.easing,
            &self.base,
        )
    }

    /// Advance time. Returns `true` while the animation is still active.
    pub fn update(&mut self, delta_ms: f32) -> bool {
        if !self.is_active() {
            return false;
        }
        if self.play_state == AnimationPlayState::Paused {
            return true;
        }

        self.timeline.tick(delta_ms);
        if self.timeline.waiting() {
            return true;
        }
        self.state = AnimationState::Running;

        let passes = self.timeline.passes();
        let iterations = self.playback.iterations;
        // A zero-length iteration cannot repeat, even when infinite.
        let done = iterations.completed_by(passes) || self.timeline.is_zero_length();
        self.played = match iterations {
            IterationCount::Times(n) => passes.min(n as f32),
            IterationCount::Infinite if done => 1.0,
            IterationCount::Infinite => passes,
        };
        if done {
            self.state = AnimationState::Finished;
        }
        !done
    }

    /// Number of whole iterations completed so far.
    pub fn completed_iterations(&self) -> u32 {
        self.played.floor() as u32
    }

    pub fn pause(&mut self) {
        self.play_state = AnimationPlayState::Paused;
    }

    pub fn cancel(&mut self) {
        self.state = AnimationState::Cancelled;
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, AnimationState::Pending | AnimationState::Running)
    }

    pub fn is_finished(&self) -> bool {
        self.state == AnimationState::Finished
    }
}
