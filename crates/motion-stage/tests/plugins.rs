use std::rc::Rc;

use anyhow::{Context, Result};
use futures::executor::LocalPool;

use motion_chain::registry::find_action;
use motion_chain::{Animator, Arg, plugin_names, register_plugin, unregister_plugin};
use motion_core::types::{AnimatableProperty, AnimatableValue};
use motion_stage::Stage;

fn opacity_of(chain: &motion_chain::Chain) -> Option<AnimatableValue> {
    chain
        .snapshot()
        .actions
        .values_for(0)
        .and_then(|values| values.get(&AnimatableProperty::Opacity).cloned())
}

// Plugins live in a process-wide registry, so shadowing a builtin setter is
// kept to a single test in its own binary.
#[test]
fn plugin_shadows_builtin_until_unregistered() -> Result<()> {
    let stage = Stage::new();
    stage.add_node("box", "div", &[]);
    let animator = Animator::new(Rc::new(stage.clone()), Rc::new(stage.clone()));

    register_plugin("opacity", |targets, snapshot, args| {
        let halved: Vec<Arg> = args
            .iter()
            .map(|arg| arg.as_number().map_or_else(|| arg.clone(), |n| Arg::from(n / 2.0)))
            .collect();
        let decl = find_action("opacity").context("builtin opacity action")?;
        *snapshot = snapshot.with_action(decl, &halved, targets)?;
        Ok(())
    });
    assert!(plugin_names().contains(&"opacity".to_string()));

    let chain = animator.select("#box")?.opacity(0.8)?.duration(0)?;
    assert_eq!(opacity_of(&chain), Some(AnimatableValue::from(0.4)));
    assert!(chain.capabilities().contains("opacity"));

    let mut pool = LocalPool::new();
    pool.run_until(chain.execute());
    assert_eq!(
        stage.computed("box", AnimatableProperty::Opacity),
        Some(AnimatableValue::from(0.4))
    );

    assert!(unregister_plugin("opacity"));
    assert!(!unregister_plugin("opacity"));

    let chain = animator.select("#box")?.opacity(0.8)?;
    assert_eq!(opacity_of(&chain), Some(AnimatableValue::from(0.8)));
    Ok(())
}
