//! Property transitions.
//!
//! A node carries one `TransitionSpec` that times every property assignment
//! made while it is set, like CSS `transition: all`. Each assignment that
//! changes a value becomes an `ActiveTransition`.
//!
//! ```
//! use motion_core::easing::EasingFunction;
//! use motion_core::transition::TransitionSpec;
//!
//! let spec = TransitionSpec::new(300.0)
//!     .with_delay(100.0)
//!     .with_easing(EasingFunction::EaseOut);
//! assert!(!spec.is_instant());
//! assert!(TransitionSpec::new(200.0).with_delay(-200.0).is_instant());
//! ```

use serde::{Deserialize, Serialize};

use crate::easing::EasingFunction;
use crate::interpolate::Interpolate;
use crate::timeline::Timeline;
use crate::types::{AnimatableProperty, AnimatableValue, AnimationId, AnimationState};

/// Timing for property transitions on a node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransitionSpec {
    pub duration_ms: f32,
    pub delay_ms: f32,
    pub easing: EasingFunction,
}

impl Default for TransitionSpec {
    fn default() -> Self {
        Self::new(300.0)
    }
}

impl TransitionSpec {
    pub fn new(duration_ms: f32) -> Self {
        Self {
            duration_ms,
            delay_ms: 0.0,
            easing: EasingFunction::Linear,
        }
    }

    pub fn with_delay(mut self, delay_ms: f32) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    pub fn with_easing(mut self, easing: EasingFunction) -> Self {
        self.easing = easing;
        self
    }

    /// A spec whose combined duration is not positive never runs; the value
    /// is applied at once and no events are emitted.
    pub fn is_instant(&self) -> bool {
        self.duration_ms.max(0.0) + self.delay_ms <= 0.0
    }

    fn timeline(&self) -> Timeline {
        Timeline::new(self.duration_ms, self.delay_ms)
    }
}

/// One property of one node moving from `start` to `end`.
#[derive(Debug, Clone)]
pub struct ActiveTransition {
    pub id: AnimationId,
    pub node_id: String,
    pub property: AnimatableProperty,
    pub start: AnimatableValue,
    pub end: AnimatableValue,
    pub easing: EasingFunction,
    pub state: AnimationState,
    timeline: Timeline,
}

impl ActiveTransition {
    pub fn new(
        node_id: String,
        property: AnimatableProperty,
        start: AnimatableValue,
        end: AnimatableValue,
        spec: &TransitionSpec,
    ) -> Self {
        let mut transition = Self {
            id: AnimationId::new(),
            node_id,
            property,
            start,
            end,
            easing: spec.easing,
            state: AnimationState::Pending,
            timeline: spec.timeline(),
        };
        transition.sync_state();
        transition
    }

    fn sync_state(&mut self) {
        self.state = if self.timeline.passes() >= 1.0 {
            AnimationState::Finished
        } else if self.timeline.waiting() {
            AnimationState::Pending
        } else {
            AnimationState::Running
        };
    }

    /// Linear progress in 0.0..=1.0.
    pub fn progress(&self) -> f32 {
        self.timeline.passes().min(1.0)
    }

    /// Value to render now. A cancelled transition falls back to its start.
    pub fn current_value(&self) -> AnimatableValue {
        match self.state {
            AnimationState::Finished => self.end.clone(),
            AnimationState::Running => {
                self.start.interpolate(&self.end, self.easing.evaluate(self.progress()))
            }
            AnimationState::Pending | AnimationState::Cancelled => self.start.clone(),
        }
    }

    /// Advance time. Returns `true` while the transition is still active.
    pub fn update(&mut self, delta_ms: f32) -> bool {
        if !self.is_active() {
            return false;
        }
        self.timeline.tick(delta_ms);
        self.sync_state();
        self.is_active()
    }

    pub fn cancel(&mut self) {
        self.state = AnimationState::Cancelled;
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, AnimationState::Pending | AnimationState::Running)
    }

    /// Head for `end` from wherever the transition is now, on fresh timing.
    pub fn retarget(&mut self, end: AnimatableValue, spec: &TransitionSpec) {
        self.start = self.current_value();
        self.end = end;
        self.easing = spec.easing;
        self.timeline = spec.timeline();
        self.sync_state();
    }
}
