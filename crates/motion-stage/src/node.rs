//! Render target handle for a stage node.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::{trace, warn};

use motion_chain::target::{Listener, ListenerId, RenderTarget};
use motion_core::keyframes::KeyframePlayback;
use motion_core::transition::TransitionSpec;
use motion_core::types::{AnimatableProperty, AnimatableValue, PropertyMap};

use crate::StageState;

/// Handle to one node of a `Stage`. Cheap to create; all state lives in the
/// stage.
pub struct StageNode {
    pub(crate) state: Rc<RefCell<StageState>>,
    pub(crate) id: String,
}

impl StageNode {
    /// The animated value when an animation is active, else the assigned one.
    pub fn computed(&self, property: AnimatableProperty) -> AnimatableValue {
        self.state.borrow().computed(&self.id, property)
    }
}

impl RenderTarget for StageNode {
    fn id(&self) -> &str {
        &self.id
    }

    fn is_connected(&self) -> bool {
        self.state
            .borrow()
            .nodes
            .get(&self.id)
            .is_some_and(|node| node.connected)
    }

    fn is_animating(&self) -> bool {
        self.state.borrow().manager.is_node_animating(&self.id)
    }

    fn style(&self, property: AnimatableProperty) -> AnimatableValue {
        self.state.borrow().assigned(&self.id, property)
    }

    fn set_style(&self, property: AnimatableProperty, value: AnimatableValue) -> bool {
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        let from = state.computed(&self.id, property);
        let Some(node) = state.nodes.get_mut(&self.id) else {
            return false;
        };
        if !node.connected {
            return false;
        }
        let previous = node
            .styles
            .insert(property, value.clone())
            .unwrap_or_else(|| property.initial_value());
        if previous == value {
            return false;
        }

        match node.transition {
            Some(spec) => {
                state
                    .manager
                    .start_transition(&self.id, property, from, value, &spec);
            }
            None => state.manager.cancel_transition_for(&self.id, property),
        }
        trace!(node = %self.id, %property, "style assigned");
        true
    }

    fn set_transition(&self, spec: Option<TransitionSpec>) {
        if let Some(node) = self.state.borrow_mut().nodes.get_mut(&self.id) {
            node.transition = spec;
        }
    }

    fn play_animation(&self, playback: KeyframePlayback) {
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        let Some(rule) = state.sheet.get(&playback.name).cloned() else {
            warn!(node = %self.id, rule = %playback.name, "unknown keyframe rule, not played");
            return;
        };
        let base: PropertyMap = rule
            .animated_properties()
            .into_iter()
            .map(|p| (p, state.computed(&self.id, p)))
            .collect();
        let Some(node) = state.nodes.get_mut(&self.id) else {
            return;
        };
        if !node.connected {
            return;
        }
        if let Some(previous) = node.animation.take() {
            state.manager.cancel_keyframe_animation(previous);
        }
        let id = state
            .manager
            .start_keyframe_animation(&self.id, rule, playback, base);
        node.animation = Some(id);
    }

    fn pause_animation(&self) {
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        if let Some(id) = state.nodes.get(&self.id).and_then(|node| node.animation) {
            state.manager.pause_keyframe_animation(id);
        }
    }

    fn subscribe(&self, listener: Listener) -> ListenerId {
        let mut state = self.state.borrow_mut();
        state.next_listener += 1;
        let id = ListenerId(state.next_listener);
        if let Some(node) = state.nodes.get_mut(&self.id) {
            node.listeners.push((id, listener));
        }
        id
    }

    fn unsubscribe(&self, id: ListenerId) {
        if let Some(node) = self.state.borrow_mut().nodes.get_mut(&self.id) {
            node.listeners.retain(|(l, _)| *l != id);
        }
    }
}
