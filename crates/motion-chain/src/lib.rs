//! Fluent animation chains for render targets.
//!
//! An `Animator` selects targets and hands back a `Chain`. Each setter on the
//! chain returns a new chain with an updated parameter snapshot; `execute`
//! starts the animation and returns a future that resolves when every target
//! finished.
//!
//! ```no_run
//! # use std::rc::Rc;
//! # use motion_chain::{Animator, StyleSurface, TargetResolver};
//! # fn demo(resolver: Rc<dyn TargetResolver>, surface: Rc<dyn StyleSurface>) -> motion_chain::Result<()> {
//! let animator = Animator::new(resolver, surface);
//! let completion = animator
//!     .select("#box")?
//!     .translate_x("120px")?
//!     .rotate("45deg")?
//!     .duration(0.5)?
//!     .easing("ease-out")?
//!     .execute();
//! # drop(completion);
//! # Ok(())
//! # }
//! ```
//!
//! Targets, the shared style surface and selector resolution are supplied by
//! the host through the traits in [`target`].

pub mod arg;
pub mod cache;
pub mod chain;
pub mod engine;
pub mod error;
pub mod latch;
pub mod looping;
pub mod params;
pub mod plugin;
pub mod registry;
pub mod target;

#[cfg(test)]
mod test_support;

use std::rc::Rc;

use motion_config::AnimationDefaults;
use motion_core::easing::EasingFunction;

pub use arg::Arg;
pub use cache::KeyframeCache;
pub use chain::Chain;
pub use engine::Completion;
pub use error::{ChainError, Result};
pub use latch::{CompletionLatch, Settled};
pub use looping::{LoopController, LoopCount, LoopPhase};
pub use params::{ActionState, OptionState, ParameterSnapshot, ParameterValue, PerTarget, ResolvedOptions};
pub use plugin::{plugin_names, register_plugin, unregister_plugin, PluginFn};
pub use registry::{list_actions, list_options};
pub use target::{
    Listener, ListenerId, RenderTarget, StyleSurface, TargetEvent, TargetResolver, TargetSet,
    TargetSpec,
};

/// Entry point: selects targets and owns the keyframe cache shared by every
/// chain it creates.
pub struct Animator {
    resolver: Rc<dyn TargetResolver>,
    cache: Rc<KeyframeCache>,
    defaults: ResolvedOptions,
}

impl Animator {
    pub fn new(resolver: Rc<dyn TargetResolver>, surface: Rc<dyn StyleSurface>) -> Self {
        Self {
            resolver,
            cache: Rc::new(KeyframeCache::new(surface)),
            defaults: ResolvedOptions::default(),
        }
    }

    /// Options every new chain starts with.
    pub fn with_defaults(mut self, defaults: ResolvedOptions) -> Self {
        self.defaults = defaults;
        self
    }

    /// Build an animator whose chain defaults come from configuration.
    pub fn from_config(
        resolver: Rc<dyn TargetResolver>,
        surface: Rc<dyn StyleSurface>,
        config: &AnimationDefaults,
    ) -> Result<Self> {
        Ok(Self::new(resolver, surface).with_defaults(defaults_from_config(config)?))
    }

    /// Start a chain on a target, a list of targets or a selector.
    pub fn select(&self, spec: impl Into<TargetSpec>) -> Result<Chain> {
        let targets = target::select(self.resolver.as_ref(), spec.into())?;
        Ok(Chain::new(
            targets,
            ParameterSnapshot::with_options(self.defaults.into()),
            Rc::clone(&self.cache),
        ))
    }

    pub fn defaults(&self) -> ResolvedOptions {
        self.defaults
    }

    pub fn cache(&self) -> &KeyframeCache {
        &self.cache
    }
}

fn defaults_from_config(config: &AnimationDefaults) -> Result<ResolvedOptions> {
    if !config.duration.is_finite() || config.duration < 0.0 {
        return Err(ChainError::validation(
            "duration",
            format!("'{}' value is not a non-negative number", config.duration),
        ));
    }
    if !config.delay.is_finite() {
        return Err(ChainError::validation(
            "delay",
            format!("'{}' value is not a number", config.delay),
        ));
    }
    let easing =
        EasingFunction::parse(&config.easing).map_err(|e| ChainError::validation("easing", e))?;
    let looping = if config.loop_forever {
        LoopCount::Infinite
    } else {
        LoopCount::Times(config.loop_count)
    };
    Ok(ResolvedOptions {
        duration: config.duration,
        delay: config.delay,
        easing,
        looping,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MockResolver, MockSurface, MockTarget};

    fn resolver() -> Rc<MockResolver> {
        Rc::new(MockResolver {
            targets: vec![
                Rc::new(MockTarget::new("a").with_class("item")),
                Rc::new(MockTarget::new("b").with_class("item")),
            ],
        })
    }

    #[test]
    fn test_select_shapes() {
        let animator = Animator::new(resolver(), Rc::new(MockSurface::default()));
        assert_eq!(animator.select(".item").unwrap().targets().len(), 2);
        assert_eq!(animator.select("#b").unwrap().targets().len(), 1);

        let handle: Rc<dyn RenderTarget> = Rc::new(MockTarget::new("loose"));
        assert_eq!(animator.select(handle.clone()).unwrap().targets().len(), 1);
        assert_eq!(
            animator.select(vec![handle.clone(), handle]).unwrap().targets().len(),
            2
        );
    }

    #[test]
    fn test_select_errors() {
        let animator = Animator::new(resolver(), Rc::new(MockSurface::default()));
        let err = animator.select("#missing").unwrap_err();
        assert_eq!(
            err.to_string(),
            "'#missing' selector is not valid or the element does not exist"
        );
        assert!(matches!(animator.select("  "), Err(ChainError::TypeMismatch(_))));
        assert!(matches!(
            animator.select(Vec::<Rc<dyn RenderTarget>>::new()),
            Err(ChainError::TypeMismatch(_))
        ));
    }

    #[test]
    fn test_from_config() {
        let config = AnimationDefaults {
            duration: 1.5,
            easing: "ease-in".to_string(),
            loop_forever: true,
            ..AnimationDefaults::default()
        };
        let animator =
            Animator::from_config(resolver(), Rc::new(MockSurface::default()), &config).unwrap();
        let options = animator.select("#a").unwrap().snapshot().options.resolve(0);
        assert_eq!(options.duration, 1.5);
        assert_eq!(options.easing, EasingFunction::EaseIn);
        assert_eq!(options.looping, LoopCount::Infinite);

        let bad = AnimationDefaults {
            easing: "wobbly".to_string(),
            ..AnimationDefaults::default()
        };
        assert!(Animator::from_config(resolver(), Rc::new(MockSurface::default()), &bad).is_err());
    }

    #[test]
    fn test_defaults_match_config_defaults() {
        let from_config = defaults_from_config(&AnimationDefaults::default()).unwrap();
        assert_eq!(from_config, ResolvedOptions::default());
    }
}
