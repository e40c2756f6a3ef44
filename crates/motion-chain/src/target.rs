//! Render target collaborators and target selection.
//!
//! The engine never touches a concrete render tree. It talks to:
//! - `RenderTarget`: one animatable element (style assignment, transition
//!   timing, keyframe playback, lifecycle notifications)
//! - `StyleSurface`: the shared sheet keyframe rules are inserted into
//! - `TargetResolver`: turns a selector string into targets

use std::fmt;
use std::rc::Rc;

use motion_core::keyframes::{KeyframePlayback, KeyframeRule};
use motion_core::transition::TransitionSpec;
use motion_core::types::{AnimatableProperty, AnimatableValue};

use crate::error::{ChainError, Result};

/// Lifecycle notification delivered by a render target.
#[derive(Debug, Clone, PartialEq)]
pub enum TargetEvent {
    TransitionStart { property: AnimatableProperty },
    TransitionEnd { property: AnimatableProperty },
    TransitionCancel { property: AnimatableProperty },
    AnimationStart { name: String },
    AnimationIteration { name: String, iteration: u32 },
    AnimationEnd { name: String },
    AnimationCancel { name: String },
    /// The target left its render tree. No further events follow.
    Detached,
}

/// Handle returned by `RenderTarget::subscribe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Callback invoked for every lifecycle notification of a target.
pub type Listener = Rc<dyn Fn(&TargetEvent)>;

/// One animatable element.
///
/// Implementations must not invoke listeners synchronously from inside these
/// methods; notifications are delivered later from the render loop.
pub trait RenderTarget {
    /// Stable identifier, used in logs.
    fn id(&self) -> &str;

    /// Whether the target is still attached to its render tree.
    fn is_connected(&self) -> bool;

    /// Whether a transition or an unpaused keyframe animation is running.
    fn is_animating(&self) -> bool;

    /// The assigned (not the animated) value of a property.
    fn style(&self, property: AnimatableProperty) -> AnimatableValue;

    /// Assign a property value. Returns whether the value changed.
    fn set_style(&self, property: AnimatableProperty, value: AnimatableValue) -> bool;

    /// Timing applied to later assignments; `None` disables transitions.
    fn set_transition(&self, spec: Option<TransitionSpec>);

    /// Play a keyframe rule already inserted into the style surface.
    fn play_animation(&self, playback: KeyframePlayback);

    /// Pause the current keyframe animation (CSS `animation-play-state: paused`).
    fn pause_animation(&self);

    fn subscribe(&self, listener: Listener) -> ListenerId;

    fn unsubscribe(&self, id: ListenerId);
}

/// The shared style sheet.
pub trait StyleSurface {
    fn insert_keyframes(&self, rule: &KeyframeRule);
}

/// Selector resolution.
pub trait TargetResolver {
    fn resolve(&self, selector: &str) -> Vec<Rc<dyn RenderTarget>>;
}

/// Shared, ordered set of targets a chain operates on.
pub type TargetSet = Rc<[Rc<dyn RenderTarget>]>;

/// What a chain can be started from.
#[derive(Clone)]
pub enum TargetSpec {
    Target(Rc<dyn RenderTarget>),
    Targets(Vec<Rc<dyn RenderTarget>>),
    Selector(String),
}

impl fmt::Debug for TargetSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Target(t) => f.debug_tuple("Target").field(&t.id()).finish(),
            Self::Targets(ts) => f
                .debug_tuple("Targets")
                .field(&ts.iter().map(|t| t.id()).collect::<Vec<_>>())
                .finish(),
            Self::Selector(s) => f.debug_tuple("Selector").field(s).finish(),
        }
    }
}

impl From<Rc<dyn RenderTarget>> for TargetSpec {
    fn from(target: Rc<dyn RenderTarget>) -> Self {
        Self::Target(target)
    }
}

impl From<Vec<Rc<dyn RenderTarget>>> for TargetSpec {
    fn from(targets: Vec<Rc<dyn RenderTarget>>) -> Self {
        Self::Targets(targets)
    }
}

impl From<&[Rc<dyn RenderTarget>]> for TargetSpec {
    fn from(targets: &[Rc<dyn RenderTarget>]) -> Self {
        Self::Targets(targets.to_vec())
    }
}

impl From<&str> for TargetSpec {
    fn from(selector: &str) -> Self {
        Self::Selector(selector.to_string())
    }
}

impl From<String> for TargetSpec {
    fn from(selector: String) -> Self {
        Self::Selector(selector)
    }
}

/// Resolve a target spec into a non-empty target set.
pub(crate) fn select(resolver: &dyn TargetResolver, spec: TargetSpec) -> Result<TargetSet> {
    let targets = match spec {
        TargetSpec::Target(target) => vec![target],
        TargetSpec::Targets(targets) => {
            if targets.is_empty() {
                return Err(ChainError::TypeMismatch(
                    "an empty target collection cannot be animated".to_string(),
                ));
            }
            targets
        }
        TargetSpec::Selector(selector) => {
            if selector.trim().is_empty() {
                return Err(ChainError::TypeMismatch(
                    "a blank selector cannot be animated".to_string(),
                ));
            }
            let targets = resolver.resolve(&selector);
            if targets.is_empty() {
                return Err(ChainError::Selector { selector });
            }
            targets
        }
    };
    Ok(targets.into())
}
