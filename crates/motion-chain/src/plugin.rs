//! Plugin registry.
//!
//! Plugins add setters to every chain. A plugin receives the chain's targets,
//! a copy of its parameter snapshot it may change freely, and the call's
//! arguments; the changed copy becomes the next chain's snapshot. Plugin
//! names take precedence over built-in setters.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};

use tracing::debug;

use crate::arg::Arg;
use crate::params::ParameterSnapshot;
use crate::target::TargetSet;

/// Signature of a plugin setter.
pub type PluginFn =
    dyn Fn(&TargetSet, &mut ParameterSnapshot, &[Arg]) -> anyhow::Result<()> + Send + Sync;

fn registry() -> &'static RwLock<HashMap<String, Arc<PluginFn>>> {
    static PLUGINS: OnceLock<RwLock<HashMap<String, Arc<PluginFn>>>> = OnceLock::new();
    PLUGINS.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Register a plugin, replacing any earlier plugin of the same name.
pub fn register_plugin<F>(name: impl Into<String>, plugin: F)
where
    F: Fn(&TargetSet, &mut ParameterSnapshot, &[Arg]) -> anyhow::Result<()> + Send + Sync + 'static,
{
    let name = name.into();
    debug!(plugin = %name, "plugin registered");
    let mut plugins = registry().write().unwrap_or_else(|e| e.into_inner());
    plugins.insert(name, Arc::new(plugin));
}

/// Remove a plugin. Returns whether it was registered.
pub fn unregister_plugin(name: &str) -> bool {
    let mut plugins = registry().write().unwrap_or_else(|e| e.into_inner());
    plugins.remove(name).is_some()
}

/// Names of every registered plugin, sorted.
pub fn plugin_names() -> Vec<String> {
    let plugins = registry().read().unwrap_or_else(|e| e.into_inner());
    let mut names: Vec<String> = plugins.keys().cloned().collect();
    names.sort();
    names
}

pub(crate) fn find_plugin(name: &str) -> Option<Arc<PluginFn>> {
    let plugins = registry().read().unwrap_or_else(|e| e.into_inner());
    plugins.get(name).cloned()
}
