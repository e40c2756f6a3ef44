//! The chain value returned by `Animator::select` and by every setter.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::rc::Rc;

use tracing::trace;

use crate::arg::Arg;
use crate::cache::KeyframeCache;
use crate::engine::{self, Completion};
use crate::error::{ChainError, Result};
use crate::params::{ParameterSnapshot, ParameterValue};
use crate::plugin;
use crate::registry::{self, list_actions, list_options};
use crate::target::TargetSet;

/// Name of the terminal operation, listed by `capabilities`.
pub const EXECUTE: &str = "execute";

/// Targets plus the parameters accumulated so far.
///
/// Setters never change `self`; each returns a new chain, so chains derived
/// from the same parent do not see each other's settings.
#[derive(Clone)]
pub struct Chain {
    targets: TargetSet,
    snapshot: ParameterSnapshot,
    cache: Rc<KeyframeCache>,
}

impl Chain {
    pub(crate) fn new(targets: TargetSet, snapshot: ParameterSnapshot, cache: Rc<KeyframeCache>) -> Self {
        Self {
            targets,
            snapshot,
            cache,
        }
    }

    fn with_snapshot(&self, snapshot: ParameterSnapshot) -> Self {
        Self {
            targets: Rc::clone(&self.targets),
            snapshot,
            cache: Rc::clone(&self.cache),
        }
    }

    /// Call a setter by name. Plugins shadow built-in actions and options.
    pub fn invoke(&self, name: &str, args: &[Arg]) -> Result<Chain> {
        trace!(setter = name, ?args, "invoke");

        if let Some(plugin) = plugin::find_plugin(name) {
            let mut snapshot = self.snapshot.clone();
            plugin(&self.targets, &mut snapshot, args).map_err(ChainError::Plugin)?;
            return Ok(self.with_snapshot(snapshot));
        }
        if let Some(action) = registry::find_action(name) {
            let snapshot = self.snapshot.with_action(action, args, &self.targets)?;
            return Ok(self.with_snapshot(snapshot));
        }
        if let Some(option) = registry::find_option(name) {
            let snapshot = self.snapshot.with_option(option, args, &self.targets)?;
            return Ok(self.with_snapshot(snapshot));
        }
        Err(ChainError::UnknownSetter(name.to_string()))
    }

    fn call(&self, name: &str, arg: impl Into<Arg>) -> Result<Chain> {
        self.invoke(name, &[arg.into()])
    }

    // Keyframe actions

    pub fn from(&self, values: impl Into<Arg>) -> Result<Chain> {
        self.call("from", values)
    }

    pub fn to(&self, values: impl Into<Arg>) -> Result<Chain> {
        self.call("to", values)
    }

    // Property actions

    pub fn width(&self, value: impl Into<Arg>) -> Result<Chain> {
        self.call("width", value)
    }

    pub fn height(&self, value: impl Into<Arg>) -> Result<Chain> {
        self.call("height", value)
    }

    pub fn top(&self, value: impl Into<Arg>) -> Result<Chain> {
        self.call("top", value)
    }

    pub fn left(&self, value: impl Into<Arg>) -> Result<Chain> {
        self.call("left", value)
    }

    pub fn right(&self, value: impl Into<Arg>) -> Result<Chain> {
        self.call("right", value)
    }

    pub fn bottom(&self, value: impl Into<Arg>) -> Result<Chain> {
        self.call("bottom", value)
    }

    pub fn opacity(&self, value: impl Into<Arg>) -> Result<Chain> {
        self.call("opacity", value)
    }

    pub fn background_color(&self, value: impl Into<Arg>) -> Result<Chain> {
        self.call("backgroundColor", value)
    }

    pub fn color(&self, value: impl Into<Arg>) -> Result<Chain> {
        self.call("color", value)
    }

    pub fn border_color(&self, value: impl Into<Arg>) -> Result<Chain> {
        self.call("borderColor", value)
    }

    pub fn border_width(&self, value: impl Into<Arg>) -> Result<Chain> {
        self.call("borderWidth", value)
    }

    pub fn border_radius(&self, value: impl Into<Arg>) -> Result<Chain> {
        self.call("borderRadius", value)
    }

    pub fn font_size(&self, value: impl Into<Arg>) -> Result<Chain> {
        self.call("fontSize", value)
    }

    // Transform actions (accumulate)

    pub fn translate_x(&self, value: impl Into<Arg>) -> Result<Chain> {
        self.call("translateX", value)
    }

    pub fn translate_y(&self, value: impl Into<Arg>) -> Result<Chain> {
        self.call("translateY", value)
    }

    pub fn translate(&self, x: impl Into<Arg>, y: impl Into<Arg>) -> Result<Chain> {
        self.invoke("translate", &[x.into(), y.into()])
    }

    pub fn scale(&self, factor: impl Into<Arg>) -> Result<Chain> {
        self.call("scale", factor)
    }

    pub fn scale_x(&self, factor: impl Into<Arg>) -> Result<Chain> {
        self.call("scaleX", factor)
    }

    pub fn scale_y(&self, factor: impl Into<Arg>) -> Result<Chain> {
        self.call("scaleY", factor)
    }

    pub fn rotate(&self, angle: impl Into<Arg>) -> Result<Chain> {
        self.call("rotate", angle)
    }

    pub fn skew_x(&self, angle: impl Into<Arg>) -> Result<Chain> {
        self.call("skewX", angle)
    }

    pub fn skew_y(&self, angle: impl Into<Arg>) -> Result<Chain> {
        self.call("skewY", angle)
    }

    // Options

    /// Duration in seconds.
    pub fn duration(&self, seconds: impl Into<Arg>) -> Result<Chain> {
        self.call("duration", seconds)
    }

    /// Delay in seconds.
    pub fn delay(&self, seconds: impl Into<Arg>) -> Result<Chain> {
        self.call("delay", seconds)
    }

    /// CSS timing function, e.g. `ease-in-out` or `steps(4)`.
    pub fn easing(&self, easing: impl Into<Arg>) -> Result<Chain> {
        self.call("easing", easing)
    }

    /// Number of forward+backward cycles; 0 plays once and keeps the end
    /// values.
    pub fn loop_count(&self, cycles: impl Into<Arg>) -> Result<Chain> {
        self.call("loop", cycles)
    }

    /// Loop until the targets are detached.
    pub fn loop_forever(&self) -> Result<Chain> {
        self.invoke("loop", &[])
    }

    /// Start the animation on every target.
    pub fn execute(&self) -> Completion {
        engine::execute(&self.targets, &self.snapshot, &self.cache)
    }

    /// Every action and option name with its current value.
    pub fn current_parameters(&self) -> BTreeMap<&'static str, ParameterValue> {
        self.snapshot.parameters()
    }

    pub fn snapshot(&self) -> &ParameterSnapshot {
        &self.snapshot
    }

    pub fn targets(&self) -> &TargetSet {
        &self.targets
    }

    /// Every name `invoke` accepts, plus `execute`.
    pub fn capabilities(&self) -> BTreeSet<String> {
        list_actions()
            .into_iter()
            .chain(list_options())
            .map(str::to_string)
            .chain(plugin::plugin_names())
            .chain([EXECUTE.to_string()])
            .collect()
    }
}

impl fmt::Debug for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chain")
            .field(
                "targets",
                &self.targets.iter().map(|t| t.id()).collect::<Vec<_>>(),
            )
            .field("snapshot", &self.snapshot)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::looping::LoopCount;
    use crate::params::{ActionState, PerTarget};
    use crate::test_support::{MockResolver, MockSurface, MockTarget};
    use crate::{register_plugin, unregister_plugin, Animator};
    use motion_core::types::AnimatableProperty;

    fn animator(ids: &[&str]) -> Animator {
        let targets = ids
            .iter()
            .map(|id| Rc::new(MockTarget::new(id).with_class("item")))
            .collect();
        Animator::new(
            Rc::new(MockResolver { targets }),
            Rc::new(MockSurface::default()),
        )
    }

    fn expected_capabilities() -> BTreeSet<String> {
        let mut names: BTreeSet<String> = list_actions()
            .into_iter()
            .chain(list_options())
            .map(str::to_string)
            .collect();
        names.insert(EXECUTE.to_string());
        names
    }

    #[test]
    fn test_every_setter_returns_full_capabilities() {
        let chain = animator(&["a"]).select("#a").unwrap();
        let expected = expected_capabilities();
        assert!(chain.capabilities().is_superset(&expected));

        let chain = chain
            .width("10px")
            .unwrap()
            .rotate(45)
            .unwrap()
            .duration(1)
            .unwrap()
            .loop_forever()
            .unwrap();
        assert!(chain.capabilities().is_superset(&expected));
    }

    #[test]
    fn test_parameter_keys_equal_registries() {
        let expected: BTreeSet<&str> = list_actions().into_iter().chain(list_options()).collect();
        let chain = animator(&["a"]).select("#a").unwrap();
        for chain in [
            chain.clone(),
            chain.to([("width", "10px")]).unwrap(),
            chain.opacity(0.5).unwrap().scale(2).unwrap().easing("ease").unwrap(),
        ] {
            let keys: BTreeSet<&str> = chain.current_parameters().keys().copied().collect();
            assert_eq!(keys, expected);
        }
    }

    #[test]
    fn test_to_overwrites() {
        let chain = animator(&["a"]).select("#a").unwrap();
        let chain = chain
            .to([("width", "10px")])
            .unwrap()
            .to([("width", "20px")])
            .unwrap();
        match &chain.current_parameters()["to"] {
            ParameterValue::Keyframes(PerTarget::Uniform(map)) => {
                assert_eq!(map[&AnimatableProperty::Width].to_string(), "20px");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_sibling_chains_are_isolated() {
        let base = animator(&["a"]).select("#a").unwrap();
        let one = base.duration(1).unwrap();
        let two = base.duration(2).unwrap();
        assert_eq!(one.snapshot().options.resolve(0).duration, 1.0);
        assert_eq!(two.snapshot().options.resolve(0).duration, 2.0);
        assert_eq!(base.snapshot().options.resolve(0).duration, 0.3);
    }

    #[test]
    fn test_duration_rejects_text() {
        let chain = animator(&["a"]).select("#a").unwrap();
        let err = chain.duration("fast").unwrap_err();
        assert!(matches!(err, ChainError::TypeValidation { .. }));
    }

    #[test]
    fn test_unknown_setter() {
        let chain = animator(&["a"]).select("#a").unwrap();
        assert!(matches!(
            chain.invoke("wobble", &[]),
            Err(ChainError::UnknownSetter(name)) if name == "wobble"
        ));
    }

    #[test]
    fn test_plugin_mutates_next_snapshot_only() {
        register_plugin("chain_test_slow", |targets, snapshot, args| {
            let factor = args.first().and_then(Arg::as_number).unwrap_or(2.0);
            snapshot.options.duration = PerTarget::Each(
                (0..targets.len()).map(|i| factor * (i + 1) as f64).collect(),
            );
            Ok(())
        });

        let base = animator(&["a", "b"]).select(".item").unwrap();
        let slowed = base.invoke("chain_test_slow", &[Arg::from(3)]).unwrap();
        assert_eq!(slowed.snapshot().options.resolve(1).duration, 6.0);
        assert_eq!(base.snapshot().options.resolve(1).duration, 0.3);
        assert!(slowed.capabilities().contains("chain_test_slow"));

        unregister_plugin("chain_test_slow");
    }

    #[test]
    fn test_plugin_errors_propagate_unchanged() {
        register_plugin("chain_test_fail", |_, _, _| anyhow::bail!("plugin refused"));
        let chain = animator(&["a"]).select("#a").unwrap();
        let err = chain.invoke("chain_test_fail", &[]).unwrap_err();
        assert!(matches!(err, ChainError::Plugin(_)));
        assert_eq!(err.to_string(), "plugin refused");
        unregister_plugin("chain_test_fail");
    }

    #[test]
    fn test_typed_setters_forward_to_registry() {
        let chain = animator(&["a"]).select("#a").unwrap();
        let chain = chain
            .translate(10, "20%")
            .unwrap()
            .background_color("red")
            .unwrap()
            .loop_count(2)
            .unwrap();
        assert_eq!(
            chain.snapshot().options.resolve(0).looping,
            LoopCount::Times(2)
        );
        let ActionState::Properties { values, transform } = &chain.snapshot().actions else {
            panic!("expected property mode");
        };
        assert!(values.contains_key(&AnimatableProperty::BackgroundColor));
        assert_eq!(
            transform.as_ref().and_then(|t| t.get(0)).unwrap().to_string(),
            "translate(10px, 20%)"
        );
    }
}
