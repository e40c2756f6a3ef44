//! Action and option registries.
//!
//! Every setter a chain exposes is declared here once, with its parameter
//! signature. `Chain::invoke` dispatches through these tables; the typed
//! methods on `Chain` are thin wrappers around them.

use motion_core::transform::TransformKind;
use motion_core::types::AnimatableProperty;

use crate::arg::Arg;
use crate::error::{ChainError, Result};

/// Shape a single setter argument must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// Property name to value map.
    Map,
    /// Finite number.
    Number,
    /// Text.
    Text,
    /// Number or CSS text, interpreted by the target property.
    Value,
    /// Non-negative integer.
    Count,
}

impl ParamKind {
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Map => "map",
            Self::Number => "number",
            Self::Text => "string",
            Self::Value => "number or string",
            Self::Count => "non-negative integer",
        }
    }

    /// Whether a resolved (per-target scalar) argument fits this kind.
    pub fn accepts(&self, arg: &Arg) -> bool {
        match (self, arg) {
            (Self::Map, Arg::Map(_)) => true,
            (Self::Number, Arg::Number(n)) => n.is_finite(),
            (Self::Text, Arg::Text(_)) => true,
            (Self::Value, Arg::Number(n)) => n.is_finite(),
            (Self::Value, Arg::Text(_)) => true,
            (Self::Count, Arg::Number(n)) => *n >= 0.0 && n.fract() == 0.0 && *n <= u32::MAX as f64,
            _ => false,
        }
    }
}

/// Parameter list of a setter. The first `required` parameters are mandatory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    pub params: &'static [ParamKind],
    pub required: usize,
}

impl Signature {
    const fn exactly(params: &'static [ParamKind]) -> Self {
        Self {
            params,
            required: params.len(),
        }
    }

    /// Check the argument count.
    pub fn check_arity(&self, setter: &str, found: usize) -> Result<()> {
        let max = self.params.len();
        if found < self.required || found > max {
            let expected = if self.required == max {
                format!("{max}")
            } else {
                format!("{} to {max}", self.required)
            };
            return Err(ChainError::validation(
                setter,
                format!("expected {expected} argument(s), got {found}"),
            ));
        }
        Ok(())
    }

    /// Check one resolved argument against its parameter slot.
    pub fn check_arg(&self, setter: &str, position: usize, arg: &Arg) -> Result<()> {
        let Some(kind) = self.params.get(position) else {
            return Err(ChainError::validation(setter, "too many arguments"));
        };
        if kind.accepts(arg) {
            Ok(())
        } else {
            Err(ChainError::validation(
                setter,
                format!("'{arg}' value is not a {}", kind.describe()),
            ))
        }
    }
}

/// Which side of a keyframe rule a map action fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    From,
    To,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    /// `from` / `to`: discrete property sets, played as a keyframe rule.
    Keyframes(Side),
    /// One property, animated with a transition.
    Property(AnimatableProperty),
    /// One transform function, appended to the accumulated transform list.
    Transform(TransformKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionDecl {
    pub name: &'static str,
    pub kind: ActionKind,
    pub signature: Signature,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    Duration,
    Delay,
    Easing,
    Loop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionDecl {
    pub name: &'static str,
    pub kind: OptionKind,
    pub signature: Signature,
    /// Calling the setter without arguments enables the option's flag value.
    pub flag: bool,
}

const MAP: &[ParamKind] = &[ParamKind::Map];
const VALUE: &[ParamKind] = &[ParamKind::Value];
const VALUE_PAIR: &[ParamKind] = &[ParamKind::Value, ParamKind::Value];
const NUMBER: &[ParamKind] = &[ParamKind::Number];
const TEXT: &[ParamKind] = &[ParamKind::Text];
const COUNT: &[ParamKind] = &[ParamKind::Count];

const fn keyframes(name: &'static str, side: Side) -> ActionDecl {
    ActionDecl {
        name,
        kind: ActionKind::Keyframes(side),
        signature: Signature::exactly(MAP),
    }
}

const fn property(name: &'static str, property: AnimatableProperty) -> ActionDecl {
    ActionDecl {
        name,
        kind: ActionKind::Property(property),
        signature: Signature::exactly(VALUE),
    }
}

const fn transform(name: &'static str, kind: TransformKind) -> ActionDecl {
    ActionDecl {
        name,
        kind: ActionKind::Transform(kind),
        signature: Signature::exactly(VALUE),
    }
}

const fn transform_pair(name: &'static str, kind: TransformKind) -> ActionDecl {
    ActionDecl {
        name,
        kind: ActionKind::Transform(kind),
        signature: Signature {
            params: VALUE_PAIR,
            required: 1,
        },
    }
}

/// Every action, in listing order.
pub static ACTIONS: &[ActionDecl] = &[
    keyframes("from", Side::From),
    keyframes("to", Side::To),
    property("width", AnimatableProperty::Width),
    property("height", AnimatableProperty::Height),
    property("top", AnimatableProperty::Top),
    property("left", AnimatableProperty::Left),
    property("right", AnimatableProperty::Right),
    property("bottom", AnimatableProperty::Bottom),
    property("opacity", AnimatableProperty::Opacity),
    property("backgroundColor", AnimatableProperty::BackgroundColor),
    property("color", AnimatableProperty::Color),
    property("borderColor", AnimatableProperty::BorderColor),
    property("borderWidth", AnimatableProperty::BorderWidth),
    property("borderRadius", AnimatableProperty::BorderRadius),
    property("fontSize", AnimatableProperty::FontSize),
    transform("translateX", TransformKind::TranslateX),
    transform("translateY", TransformKind::TranslateY),
    transform_pair("translate", TransformKind::Translate),
    transform_pair("scale", TransformKind::Scale),
    transform("scaleX", TransformKind::ScaleX),
    transform("scaleY", TransformKind::ScaleY),
    transform("rotate", TransformKind::Rotate),
    transform("skewX", TransformKind::SkewX),
    transform("skewY", TransformKind::SkewY),
];

/// Every option, in listing order.
pub static OPTIONS: &[OptionDecl] = &[
    OptionDecl {
        name: "duration",
        kind: OptionKind::Duration,
        signature: Signature::exactly(NUMBER),
        flag: false,
    },
    OptionDecl {
        name: "delay",
        kind: OptionKind::Delay,
        signature: Signature::exactly(NUMBER),
        flag: false,
    },
    OptionDecl {
        name: "easing",
        kind: OptionKind::Easing,
        signature: Signature::exactly(TEXT),
        flag: false,
    },
    OptionDecl {
        name: "loop",
        kind: OptionKind::Loop,
        signature: Signature::exactly(COUNT),
        flag: true,
    },
];

/// Names of every action, in registry order.
pub fn list_actions() -> Vec<&'static str> {
    ACTIONS.iter().map(|a| a.name).collect()
}

/// Names of every option, in registry order.
pub fn list_options() -> Vec<&'static str> {
    OPTIONS.iter().map(|o| o.name).collect()
}

pub fn find_action(name: &str) -> Option<&'static ActionDecl> {
    ACTIONS.iter().find(|a| a.name == name)
}

pub fn find_option(name: &str) -> Option<&'static OptionDecl> {
    OPTIONS.iter().find(|o| o.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_names_are_unique_across_registries() {
        let mut seen = HashSet::new();
        for name in list_actions().into_iter().chain(list_options()) {
            assert!(seen.insert(name), "duplicate setter name {name}");
        }
        assert!(!seen.contains("execute"));
    }

    #[test]
    fn test_registry_order() {
        assert_eq!(&list_actions()[..2], &["from", "to"]);
        assert_eq!(list_options(), vec!["duration", "delay", "easing", "loop"]);
    }

    #[test]
    fn test_transform_actions_match_kind_names() {
        for action in ACTIONS {
            if let ActionKind::Transform(kind) = action.kind {
                assert_eq!(kind.name(), action.name);
                let (min, max) = kind.arity();
                assert_eq!(action.signature.required, min);
                assert_eq!(action.signature.params.len(), max);
            }
        }
    }

    #[test]
    fn test_property_actions_resolve_by_name() {
        for action in ACTIONS {
            if let ActionKind::Property(property) = action.kind {
                assert_eq!(AnimatableProperty::from_name(action.name).unwrap(), property);
            }
        }
    }

    #[test]
    fn test_param_kinds() {
        assert!(ParamKind::Number.accepts(&Arg::from(1.5)));
        assert!(!ParamKind::Number.accepts(&Arg::from("fast")));
        assert!(!ParamKind::Number.accepts(&Arg::from(f64::NAN)));
        assert!(ParamKind::Value.accepts(&Arg::from("10px")));
        assert!(ParamKind::Count.accepts(&Arg::from(3)));
        assert!(!ParamKind::Count.accepts(&Arg::from(-1)));
        assert!(!ParamKind::Count.accepts(&Arg::from(1.5)));
        assert!(!ParamKind::Map.accepts(&Arg::from("width")));
    }

    #[test]
    fn test_arity() {
        let translate = find_action("translate").unwrap();
        assert!(translate.signature.check_arity("translate", 1).is_ok());
        assert!(translate.signature.check_arity("translate", 2).is_ok());
        assert!(translate.signature.check_arity("translate", 0).is_err());
        assert!(translate.signature.check_arity("translate", 3).is_err());

        let err = find_option("duration")
            .unwrap()
            .signature
            .check_arg("duration", 0, &Arg::from("fast"))
            .unwrap_err();
        assert_eq!(err.to_string(), "duration(): 'fast' value is not a number");
    }
}
