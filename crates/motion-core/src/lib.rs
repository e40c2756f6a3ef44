//! Render model shared by the motion engine and its render targets.
//!
//! This crate provides:
//! - **Values**: animatable properties, lengths, colors and transform lists,
//!   parsed from CSS-like text
//! - **Timing**: CSS easing functions, delay/duration timelines and
//!   transition specs
//! - **Keyframes**: named `from`/`to` rules and their playback parameters
//! - **Runtime**: the `AnimationManager` that advances transitions and
//!   keyframe animations and reports lifecycle events
//!
//! # Architecture
//!
//! ```text
//! AnimationManager
//!   ├── Active Transitions (node, property) → value interpolation
//!   ├── Active Keyframe Animations (rule + playback per node)
//!   └── AnimationEvent log (started / iteration / ended / cancelled)
//! ```

pub mod easing;
pub mod error;
pub mod events;
pub mod interpolate;
pub mod keyframes;
pub mod manager;
pub mod timeline;
pub mod transform;
pub mod transition;
pub mod types;

pub use easing::{EasingFunction, StepPosition};
pub use error::{Result, ValueError};
pub use events::{AnimationEvent, Lifecycle};
pub use interpolate::Interpolate;
pub use keyframes::{
    ActiveKeyframeAnimation, AnimationDirection, AnimationPlayState, IterationCount,
    KeyframePlayback, KeyframeRule,
};
pub use manager::AnimationManager;
pub use timeline::Timeline;
pub use transform::{DecomposedTransform, Transform2D, TransformFn, TransformKind, TransformList};
pub use transition::{ActiveTransition, TransitionSpec};
pub use types::{
    AnimatableProperty, AnimatableValue, AnimatableValueType, AnimationId, AnimationState, Length,
    LengthUnit, PropertyMap,
};
