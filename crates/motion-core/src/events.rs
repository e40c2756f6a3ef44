//! Lifecycle notifications.
//!
//! The `AnimationManager` records one `AnimationEvent` per lifecycle change
//! while it advances. Owners drain them after each update and route them to
//! whoever listens on `node_id`.

use serde::{Deserialize, Serialize};

use crate::types::{AnimatableProperty, AnimationId};

/// What happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Lifecycle {
    TransitionStarted { property: AnimatableProperty },
    TransitionEnded { property: AnimatableProperty },
    TransitionCancelled { property: AnimatableProperty },
    KeyframesStarted { name: String },
    /// A non-final iteration boundary was crossed (0-indexed).
    KeyframesIteration { name: String, iteration: u32 },
    KeyframesEnded { name: String },
    KeyframesCancelled { name: String },
}

impl Lifecycle {
    /// The keyframe animation is gone after this event.
    pub fn ends_keyframes(&self) -> bool {
        matches!(self, Self::KeyframesEnded { .. } | Self::KeyframesCancelled { .. })
    }

    pub fn is_cancel(&self) -> bool {
        matches!(
            self,
            Self::TransitionCancelled { .. } | Self::KeyframesCancelled { .. }
        )
    }
}

/// A lifecycle change of one animation on one node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimationEvent {
    pub id: AnimationId,
    pub node_id: String,
    #[serde(flatten)]
    pub lifecycle: Lifecycle,
}

impl AnimationEvent {
    pub fn new(id: AnimationId, node_id: impl Into<String>, lifecycle: Lifecycle) -> Self {
        Self {
            id,
            node_id: node_id.into(),
            lifecycle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ends_keyframes() {
        let name = "fade".to_string();
        assert!(Lifecycle::KeyframesEnded { name: name.clone() }.ends_keyframes());
        assert!(Lifecycle::KeyframesCancelled { name: name.clone() }.ends_keyframes());
        assert!(!Lifecycle::KeyframesIteration { name, iteration: 0 }.ends_keyframes());
        assert!(!Lifecycle::TransitionEnded {
            property: AnimatableProperty::Opacity
        }
        .ends_keyframes());
    }

    #[test]
    fn test_event_serializes_flat() {
        let event = AnimationEvent::new(
            AnimationId(7),
            "box",
            Lifecycle::KeyframesIteration {
                name: "fade".to_string(),
                iteration: 1,
            },
        );
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["kind"], "keyframes_iteration");
        assert_eq!(json["node_id"], "box");
        assert_eq!(json["iteration"], 1);
    }
}
