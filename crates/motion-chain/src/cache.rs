//! Keyframe rule cache.
//!
//! Rules are named after a SHA-256 digest of their content, so identical
//! `from`/`to` sets share one rule in the style surface no matter how many
//! chains play them.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use sha2::{Digest, Sha256};
use tracing::debug;

use motion_core::keyframes::KeyframeRule;
use motion_core::types::PropertyMap;

use crate::target::StyleSurface;

/// Prefix of every generated rule name.
pub const RULE_PREFIX: &str = "motion-";

/// Hex digits of the content digest kept in a rule name.
const NAME_DIGITS: usize = 12;

/// Content identity of a `from`/`to` pair: hex SHA-256 over both sides'
/// canonical JSON, each side labelled.
pub fn content_key(from: &PropertyMap, to: &PropertyMap) -> String {
    let mut hasher = Sha256::new();
    hasher.update(b"from:");
    hasher.update(canonical_json(from).as_bytes());
    hasher.update(b"\nto:");
    hasher.update(canonical_json(to).as_bytes());
    hex::encode(hasher.finalize())
}

fn canonical_json(map: &PropertyMap) -> String {
    // PropertyMap is ordered, so the output is canonical.
    serde_json::to_string(map).unwrap_or_else(|_| format!("{map:?}"))
}

/// Creates keyframe rules on demand and inserts each one into the style
/// surface exactly once.
pub struct KeyframeCache {
    surface: Rc<dyn StyleSurface>,
    rules: RefCell<HashMap<String, String>>,
    created: Cell<usize>,
}

impl KeyframeCache {
    pub fn new(surface: Rc<dyn StyleSurface>) -> Self {
        Self {
            surface,
            rules: RefCell::new(HashMap::new()),
            created: Cell::new(0),
        }
    }

    /// Name of the rule for `(from, to)`, creating and inserting it on first
    /// use.
    pub fn obtain(&self, from: &PropertyMap, to: &PropertyMap) -> String {
        let key = content_key(from, to);
        if let Some(name) = self.rules.borrow().get(&key) {
            debug!(rule = %name, "keyframe cache hit");
            return name.clone();
        }

        let name = format!("{RULE_PREFIX}{}", &key[..NAME_DIGITS]);
        let rule = KeyframeRule {
            name: name.clone(),
            from: from.clone(),
            to: to.clone(),
        };
        self.surface.insert_keyframes(&rule);
        self.rules.borrow_mut().insert(key, name.clone());
        self.created.set(self.created.get() + 1);
        debug!(rule = %name, "keyframe rule created");
        name
    }

    /// Number of rules created so far.
    pub fn created(&self) -> usize {
        self.created.get()
    }

    pub fn len(&self) -> usize {
        self.rules.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.borrow().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use motion_core::types::{AnimatableProperty, AnimatableValue};

    #[derive(Default)]
    struct RecordingSurface {
        inserted: RefCell<Vec<KeyframeRule>>,
    }

    impl StyleSurface for RecordingSurface {
        fn insert_keyframes(&self, rule: &KeyframeRule) {
            self.inserted.borrow_mut().push(rule.clone());
        }
    }

    fn opacity(value: f64) -> PropertyMap {
        PropertyMap::from([(AnimatableProperty::Opacity, AnimatableValue::Number { value })])
    }

    #[test]
    fn test_identical_content_creates_one_rule() {
        let surface = Rc::new(RecordingSurface::default());
        let cache = KeyframeCache::new(surface.clone());

        let a = cache.obtain(&opacity(0.0), &opacity(1.0));
        let b = cache.obtain(&opacity(0.0), &opacity(1.0));
        assert_eq!(a, b);
        assert_eq!(cache.created(), 1);
        assert_eq!(surface.inserted.borrow().len(), 1);
        assert_eq!(surface.inserted.borrow()[0].name, a);
        assert!(a.starts_with(RULE_PREFIX));
        assert_eq!(a.len(), RULE_PREFIX.len() + NAME_DIGITS);
    }

    #[test]
    fn test_sides_are_distinguished() {
        let cache = KeyframeCache::new(Rc::new(RecordingSurface::default()));
        let forward = cache.obtain(&opacity(0.0), &opacity(1.0));
        let backward = cache.obtain(&opacity(1.0), &opacity(0.0));
        let only_to = cache.obtain(&PropertyMap::new(), &opacity(1.0));
        let only_from = cache.obtain(&opacity(1.0), &PropertyMap::new());
        assert_ne!(forward, backward);
        assert_ne!(only_to, only_from);
        assert_eq!(cache.created(), 4);
    }

    #[test]
    fn test_content_key_is_stable() {
        let key = content_key(&opacity(0.0), &opacity(1.0));
        assert_eq!(key, content_key(&opacity(0.0), &opacity(1.0)));
        assert_eq!(key.len(), 64);
    }
}
