//! In-memory collaborators for unit tests.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use motion_core::keyframes::{KeyframePlayback, KeyframeRule};
use motion_core::transition::TransitionSpec;
use motion_core::types::{AnimatableProperty, AnimatableValue, PropertyMap};

use crate::target::{
    Listener, ListenerId, RenderTarget, StyleSurface, TargetEvent, TargetResolver,
};

/// Target that records calls and delivers events only through `emit`.
pub struct MockTarget {
    id: String,
    classes: Vec<String>,
    styles: RefCell<PropertyMap>,
    transition: Cell<Option<TransitionSpec>>,
    playbacks: RefCell<Vec<KeyframePlayback>>,
    paused: Cell<bool>,
    connected: Cell<bool>,
    animating: Cell<bool>,
    listeners: RefCell<Vec<(ListenerId, Listener)>>,
    next_listener: Cell<u64>,
}

impl MockTarget {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            classes: Vec::new(),
            styles: RefCell::new(PropertyMap::new()),
            transition: Cell::new(None),
            playbacks: RefCell::new(Vec::new()),
            paused: Cell::new(false),
            connected: Cell::new(true),
            animating: Cell::new(false),
            listeners: RefCell::new(Vec::new()),
            next_listener: Cell::new(1),
        }
    }

    pub fn with_class(mut self, class: &str) -> Self {
        self.classes.push(class.to_string());
        self
    }

    pub fn emit(&self, event: TargetEvent) {
        let listeners: Vec<Listener> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, l)| Rc::clone(l))
            .collect();
        for listener in listeners {
            listener(&event);
        }
    }

    pub fn set_connected(&self, connected: bool) {
        self.connected.set(connected);
    }

    pub fn set_animating(&self, animating: bool) {
        self.animating.set(animating);
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    pub fn last_playback(&self) -> Option<KeyframePlayback> {
        self.playbacks.borrow().last().cloned()
    }

    pub fn is_paused(&self) -> bool {
        self.paused.get()
    }

    pub fn transition(&self) -> Option<TransitionSpec> {
        self.transition.get()
    }
}

impl RenderTarget for MockTarget {
    fn id(&self) -> &str {
        &self.id
    }

    fn is_connected(&self) -> bool {
        self.connected.get()
    }

    fn is_animating(&self) -> bool {
        self.animating.get()
    }

    fn style(&self, property: AnimatableProperty) -> AnimatableValue {
        self.styles
            .borrow()
            .get(&property)
            .cloned()
            .unwrap_or_else(|| property.initial_value())
    }

    fn set_style(&self, property: AnimatableProperty, value: AnimatableValue) -> bool {
        let changed = self.style(property) != value;
        self.styles.borrow_mut().insert(property, value);
        changed
    }

    fn set_transition(&self, spec: Option<TransitionSpec>) {
        self.transition.set(spec);
    }

    fn play_animation(&self, playback: KeyframePlayback) {
        self.paused.set(false);
        self.playbacks.borrow_mut().push(playback);
    }

    fn pause_animation(&self) {
        self.paused.set(true);
    }

    fn subscribe(&self, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next_listener.get());
        self.next_listener.set(id.0 + 1);
        self.listeners.borrow_mut().push((id, listener));
        id
    }

    fn unsubscribe(&self, id: ListenerId) {
        self.listeners.borrow_mut().retain(|(l, _)| *l != id);
    }
}

#[derive(Default)]
pub struct MockSurface {
    pub rules: RefCell<Vec<KeyframeRule>>,
}

impl StyleSurface for MockSurface {
    fn insert_keyframes(&self, rule: &KeyframeRule) {
        self.rules.borrow_mut().push(rule.clone());
    }
}

/// Resolves `#id` and `.class` selectors against a fixed target list.
pub struct MockResolver {
    pub targets: Vec<Rc<MockTarget>>,
}

impl TargetResolver for MockResolver {
    fn resolve(&self, selector: &str) -> Vec<Rc<dyn RenderTarget>> {
        self.targets
            .iter()
            .filter(|t| match selector.strip_prefix('#') {
                Some(id) => t.id == id,
                None => selector
                    .strip_prefix('.')
                    .is_some_and(|class| t.classes.iter().any(|c| c == class)),
            })
            .map(|t| Rc::clone(t) as Rc<dyn RenderTarget>)
            .collect()
    }
}
