//! Headless render stage.
//!
//! A `Stage` holds a flat set of nodes with assigned styles and drives their
//! transitions and keyframe animations with an `AnimationManager`. It
//! implements the three collaborator traits of `motion-chain`:
//! - `TargetResolver`: selector lookup over its nodes
//! - `StyleSurface`: its keyframe sheet
//! - `RenderTarget`: through `StageNode` handles
//!
//! Time only moves in `advance`, which also delivers lifecycle notifications
//! to node listeners.
//!
//! # Usage
//!
//! ```
//! use motion_stage::Stage;
//! use motion_chain::RenderTarget;
//! use motion_core::types::{AnimatableProperty, AnimatableValue};
//! use motion_core::transition::TransitionSpec;
//!
//! let stage = Stage::new();
//! let node = stage.add_node("box", "div", &["card"]);
//! node.set_transition(Some(TransitionSpec::new(100.0)));
//! node.set_style(AnimatableProperty::Opacity, AnimatableValue::Number { value: 0.0 });
//!
//! stage.advance(50.0);
//! let mid = stage.computed("box", AnimatableProperty::Opacity).unwrap();
//! assert!((mid.as_number().unwrap() - 0.5).abs() < 1e-6);
//! ```

mod node;
pub mod selector;

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use tracing::{debug, warn};

use motion_chain::target::{Listener, ListenerId, RenderTarget, StyleSurface, TargetEvent, TargetResolver};
use motion_core::events::{AnimationEvent, Lifecycle};
use motion_core::keyframes::KeyframeRule;
use motion_core::manager::AnimationManager;
use motion_core::transition::TransitionSpec;
use motion_core::types::{AnimatableProperty, AnimatableValue, AnimationId, PropertyMap};

pub use node::StageNode;

pub(crate) struct NodeRecord {
    tag: String,
    classes: Vec<String>,
    pub(crate) styles: PropertyMap,
    pub(crate) transition: Option<TransitionSpec>,
    /// Keyframe animation most recently played on the node.
    pub(crate) animation: Option<AnimationId>,
    pub(crate) listeners: Vec<(ListenerId, Listener)>,
    pub(crate) connected: bool,
}

pub(crate) struct StageState {
    /// Insertion order, for selector results.
    order: Vec<String>,
    pub(crate) nodes: HashMap<String, NodeRecord>,
    pub(crate) manager: AnimationManager,
    pub(crate) sheet: HashMap<String, KeyframeRule>,
    insertions: usize,
    pub(crate) next_listener: u64,
    elapsed_ms: f64,
}

fn target_event(lifecycle: Lifecycle) -> TargetEvent {
    match lifecycle {
        Lifecycle::TransitionStarted { property } => TargetEvent::TransitionStart { property },
        Lifecycle::TransitionEnded { property } => TargetEvent::TransitionEnd { property },
        Lifecycle::TransitionCancelled { property } => TargetEvent::TransitionCancel { property },
        Lifecycle::KeyframesStarted { name } => TargetEvent::AnimationStart { name },
        Lifecycle::KeyframesIteration { name, iteration } => {
            TargetEvent::AnimationIteration { name, iteration }
        }
        Lifecycle::KeyframesEnded { name } => TargetEvent::AnimationEnd { name },
        Lifecycle::KeyframesCancelled { name } => TargetEvent::AnimationCancel { name },
    }
}

impl StageState {
    pub(crate) fn assigned(&self, node_id: &str, property: AnimatableProperty) -> AnimatableValue {
        self.nodes
            .get(node_id)
            .and_then(|node| node.styles.get(&property).cloned())
            .unwrap_or_else(|| property.initial_value())
    }

    pub(crate) fn computed(&self, node_id: &str, property: AnimatableProperty) -> AnimatableValue {
        self.manager
            .get_animated_value(node_id, property)
            .unwrap_or_else(|| self.assigned(node_id, property))
    }

    /// Translate queued manager events into target events, paired with the
    /// listeners that must receive them.
    fn take_deliveries(&mut self) -> Vec<(Vec<Listener>, TargetEvent)> {
        let events: Vec<AnimationEvent> = self.manager.drain_events().collect();
        let mut deliveries = Vec::with_capacity(events.len());

        for event in events {
            let Some(node) = self.nodes.get_mut(&event.node_id) else {
                continue;
            };
            if event.lifecycle.ends_keyframes() && node.animation == Some(event.id) {
                node.animation = None;
            }
            let listeners = node.listeners.iter().map(|(_, l)| Rc::clone(l)).collect();
            deliveries.push((listeners, target_event(event.lifecycle)));
        }
        deliveries
    }
}

fn deliver(deliveries: Vec<(Vec<Listener>, TargetEvent)>) {
    for (listeners, event) in deliveries {
        for listener in listeners {
            listener(&event);
        }
    }
}

/// Headless stage. Clones share the same nodes.
#[derive(Clone)]
pub struct Stage {
    state: Rc<RefCell<StageState>>,
}

impl Default for Stage {
    fn default() -> Self {
        Self::new()
    }
}

impl Stage {
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(StageState {
                order: Vec::new(),
                nodes: HashMap::new(),
                manager: AnimationManager::new(),
                sheet: HashMap::new(),
                insertions: 0,
                next_listener: 0,
                elapsed_ms: 0.0,
            })),
        }
    }

    /// Add a node and return a handle to it. Re-adding an id replaces the
    /// previous node.
    pub fn add_node(&self, id: &str, tag: &str, classes: &[&str]) -> Rc<StageNode> {
        let mut state = self.state.borrow_mut();
        let record = NodeRecord {
            tag: tag.to_string(),
            classes: classes.iter().map(|c| c.to_string()).collect(),
            styles: PropertyMap::new(),
            transition: None,
            animation: None,
            listeners: Vec::new(),
            connected: true,
        };
        if state.nodes.insert(id.to_string(), record).is_none() {
            state.order.push(id.to_string());
        }
        drop(state);
        self.handle(id)
    }

    /// Handle to an existing node.
    pub fn node(&self, id: &str) -> Option<Rc<StageNode>> {
        self.state
            .borrow()
            .nodes
            .contains_key(id)
            .then(|| self.handle(id))
    }

    fn handle(&self, id: &str) -> Rc<StageNode> {
        Rc::new(StageNode {
            state: Rc::clone(&self.state),
            id: id.to_string(),
        })
    }

    /// Advance time by `delta_ms` and deliver the resulting notifications.
    pub fn advance(&self, delta_ms: f32) {
        let deliveries = {
            let mut state = self.state.borrow_mut();
            state.elapsed_ms += delta_ms as f64;
            state.manager.update(delta_ms);
            state.take_deliveries()
        };
        deliver(deliveries);
    }

    /// Remove a node from the render tree. Its animations are cancelled, the
    /// cancel notifications and a final `Detached` are delivered, and its
    /// listeners are dropped.
    pub fn detach(&self, id: &str) {
        let deliveries = {
            let mut state = self.state.borrow_mut();
            let Some(node) = state.nodes.get_mut(id) else {
                warn!(node = id, "detach of unknown node");
                return;
            };
            if !node.connected {
                return;
            }
            node.connected = false;
            state.manager.cancel_all_for_node(id);
            state.manager.cleanup();
            let mut deliveries = state.take_deliveries();
            if let Some(node) = state.nodes.get_mut(id) {
                let listeners = std::mem::take(&mut node.listeners);
                deliveries.push((
                    listeners.into_iter().map(|(_, l)| l).collect(),
                    TargetEvent::Detached,
                ));
            }
            deliveries
        };
        debug!(node = id, "node detached");
        deliver(deliveries);
    }

    /// Value a renderer would draw: the animated value when an animation is
    /// active, else the assigned style.
    pub fn computed(&self, id: &str, property: AnimatableProperty) -> Option<AnimatableValue> {
        let state = self.state.borrow();
        state
            .nodes
            .contains_key(id)
            .then(|| state.computed(id, property))
    }

    /// Number of keyframe rules inserted into the sheet.
    pub fn keyframe_insertions(&self) -> usize {
        self.state.borrow().insertions
    }

    pub fn keyframe_rule(&self, name: &str) -> Option<KeyframeRule> {
        self.state.borrow().sheet.get(name).cloned()
    }

    pub fn has_active_animations(&self) -> bool {
        self.state.borrow().manager.has_active_animations()
    }

    pub fn listener_count(&self, id: &str) -> usize {
        self.state
            .borrow()
            .nodes
            .get(id)
            .map_or(0, |node| node.listeners.len())
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.state.borrow().elapsed_ms
    }
}

impl TargetResolver for Stage {
    fn resolve(&self, selector: &str) -> Vec<Rc<dyn RenderTarget>> {
        let Some(compounds) = selector::parse(selector) else {
            debug!(selector, "malformed selector");
            return Vec::new();
        };
        let state = self.state.borrow();
        let ids: Vec<String> = state
            .order
            .iter()
            .filter(|id| {
                state.nodes.get(*id).is_some_and(|node| {
                    node.connected
                        && compounds
                            .iter()
                            .any(|c| c.matches(id, &node.tag, &node.classes))
                })
            })
            .cloned()
            .collect();
        drop(state);
        ids.iter()
            .map(|id| self.handle(id) as Rc<dyn RenderTarget>)
            .collect()
    }
}

impl StyleSurface for Stage {
    fn insert_keyframes(&self, rule: &KeyframeRule) {
        let mut state = self.state.borrow_mut();
        state.sheet.insert(rule.name.clone(), rule.clone());
        state.insertions += 1;
    }
}

static_assertions::assert_not_impl_any!(Stage: Send, Sync);
