//! Parameter store.
//!
//! A `ParameterSnapshot` holds everything a chain accumulated: the actions
//! (what to animate) and the options (how). Setters never mutate a snapshot
//! in place; `with_action` and `with_option` return an updated copy.

use std::collections::BTreeMap;
use std::rc::Rc;

use serde::Serialize;
use tracing::warn;

use motion_core::easing::EasingFunction;
use motion_core::transform::{TransformFn, TransformKind, TransformList};
use motion_core::transition::TransitionSpec;
use motion_core::types::{AnimatableProperty, AnimatableValue, AnimatableValueType, Length, PropertyMap};

use crate::arg::Arg;
use crate::error::{ChainError, Result};
use crate::looping::LoopCount;
use crate::registry::{self, ActionDecl, ActionKind, OptionDecl, OptionKind, Side, Signature};
use crate::target::RenderTarget;

/// A value that is either shared by every target or given per target index.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PerTarget<T> {
    Uniform(T),
    Each(Vec<T>),
}

impl<T> PerTarget<T> {
    /// Value for the target at `index`.
    pub fn get(&self, index: usize) -> Option<&T> {
        match self {
            Self::Uniform(value) => Some(value),
            Self::Each(values) => values.get(index),
        }
    }

    pub fn is_uniform(&self) -> bool {
        matches!(self, Self::Uniform(_))
    }

    pub fn map<U>(&self, mut f: impl FnMut(&T) -> U) -> PerTarget<U> {
        match self {
            Self::Uniform(value) => PerTarget::Uniform(f(value)),
            Self::Each(values) => PerTarget::Each(values.iter().map(f).collect()),
        }
    }

    fn try_map<U>(self, mut f: impl FnMut(T) -> Result<U>) -> Result<PerTarget<U>> {
        Ok(match self {
            Self::Uniform(value) => PerTarget::Uniform(f(value)?),
            Self::Each(values) => {
                PerTarget::Each(values.into_iter().map(f).collect::<Result<_>>()?)
            }
        })
    }
}

impl<T: Clone> PerTarget<T> {
    /// Combine two values target by target.
    fn zip_with(&self, other: &Self, count: usize, f: impl Fn(&T, &T) -> T) -> Self {
        match (self, other) {
            (Self::Uniform(a), Self::Uniform(b)) => Self::Uniform(f(a, b)),
            _ => Self::Each(
                (0..count)
                    .filter_map(|i| Some(f(self.get(i)?, other.get(i)?)))
                    .collect(),
            ),
        }
    }
}

/// What a chain animates.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ActionState {
    /// Discrete `from`/`to` property sets, played as a keyframe rule.
    Keyframes {
        from: PerTarget<PropertyMap>,
        to: PerTarget<PropertyMap>,
    },
    /// Flat property values plus an accumulated transform list, applied
    /// with transitions.
    Properties {
        values: BTreeMap<AnimatableProperty, PerTarget<AnimatableValue>>,
        transform: Option<PerTarget<TransformList>>,
    },
}

impl Default for ActionState {
    fn default() -> Self {
        Self::Properties {
            values: BTreeMap::new(),
            transform: None,
        }
    }
}

impl ActionState {
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Keyframes { .. } => false,
            Self::Properties { values, transform } => values.is_empty() && transform.is_none(),
        }
    }

    /// Property values for the target at `index`, in transition mode.
    /// Returns `None` for keyframe mode.
    pub fn values_for(&self, index: usize) -> Option<PropertyMap> {
        let Self::Properties { values, transform } = self else {
            return None;
        };
        let mut out = PropertyMap::new();
        for (property, value) in values {
            match value.get(index) {
                Some(value) => {
                    out.insert(*property, value.clone());
                }
                None => warn!(%property, index, "no value for target, property skipped"),
            }
        }
        if let Some(transform) = transform {
            match transform.get(index) {
                Some(list) => {
                    out.insert(AnimatableProperty::Transform, list.clone().into());
                }
                None => warn!(index, "no transform for target, skipped"),
            }
        }
        Some(out)
    }
}

/// How a chain animates. Every option always holds a value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionState {
    /// Seconds.
    pub duration: PerTarget<f64>,
    /// Seconds.
    pub delay: PerTarget<f64>,
    pub easing: PerTarget<EasingFunction>,
    #[serde(rename = "loop")]
    pub looping: PerTarget<LoopCount>,
}

impl Default for OptionState {
    fn default() -> Self {
        ResolvedOptions::default().into()
    }
}

impl From<ResolvedOptions> for OptionState {
    fn from(options: ResolvedOptions) -> Self {
        Self {
            duration: PerTarget::Uniform(options.duration),
            delay: PerTarget::Uniform(options.delay),
            easing: PerTarget::Uniform(options.easing),
            looping: PerTarget::Uniform(options.looping),
        }
    }
}

impl OptionState {
    /// Options for the target at `index`.
    ///
    /// Plugins may leave sequences shorter than the target set; missing
    /// entries fall back to the built-in defaults.
    pub fn resolve(&self, index: usize) -> ResolvedOptions {
        let defaults = ResolvedOptions::default();
        ResolvedOptions {
            duration: pick(&self.duration, index, "duration", defaults.duration),
            delay: pick(&self.delay, index, "delay", defaults.delay),
            easing: pick(&self.easing, index, "easing", defaults.easing),
            looping: pick(&self.looping, index, "loop", defaults.looping),
        }
    }
}

fn pick<T: Clone>(value: &PerTarget<T>, index: usize, option: &str, default: T) -> T {
    match value.get(index) {
        Some(v) => v.clone(),
        None => {
            warn!(option, index, "no option value for target, using default");
            default
        }
    }
}

/// Options of a single target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResolvedOptions {
    pub duration: f64,
    pub delay: f64,
    pub easing: EasingFunction,
    pub looping: LoopCount,
}

impl Default for ResolvedOptions {
    fn default() -> Self {
        Self {
            duration: 0.3,
            delay: 0.0,
            easing: EasingFunction::Linear,
            looping: LoopCount::Times(0),
        }
    }
}

impl ResolvedOptions {
    pub fn duration_ms(&self) -> f32 {
        (self.duration * 1000.0) as f32
    }

    pub fn delay_ms(&self) -> f32 {
        (self.delay * 1000.0) as f32
    }

    pub fn transition_spec(&self) -> TransitionSpec {
        TransitionSpec::new(self.duration_ms())
            .with_delay(self.delay_ms())
            .with_easing(self.easing)
    }

    /// Nothing runs and no notification will ever arrive.
    pub fn is_instant(&self) -> bool {
        self.transition_spec().is_instant()
    }
}

/// Everything a chain accumulated.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParameterSnapshot {
    pub actions: ActionState,
    pub options: OptionState,
}

/// One entry of `Chain::current_parameters`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ParameterValue {
    Unset,
    Keyframes(PerTarget<PropertyMap>),
    Value(PerTarget<AnimatableValue>),
    Transform(PerTarget<TransformList>),
    Seconds(PerTarget<f64>),
    Easing(PerTarget<EasingFunction>),
    Loop(PerTarget<LoopCount>),
}

impl ParameterSnapshot {
    pub fn with_options(options: OptionState) -> Self {
        Self {
            actions: ActionState::default(),
            options,
        }
    }

    /// Apply an action setter, returning the updated copy.
    pub fn with_action(
        &self,
        decl: &ActionDecl,
        args: &[Arg],
        targets: &[Rc<dyn RenderTarget>],
    ) -> Result<Self> {
        let setter = decl.name;
        let resolved = expand_args(setter, &decl.signature, args, targets)?;
        let mut next = self.clone();

        match decl.kind {
            ActionKind::Keyframes(side) => {
                let map = resolved.try_map(|args| property_map(setter, &args[0]))?;
                next.actions = match (&self.actions, side) {
                    (ActionState::Keyframes { to, .. }, Side::From) => ActionState::Keyframes {
                        from: map,
                        to: to.clone(),
                    },
                    (ActionState::Keyframes { from, .. }, Side::To) => ActionState::Keyframes {
                        from: from.clone(),
                        to: map,
                    },
                    (state, _) if state.is_empty() => {
                        let empty = PerTarget::Uniform(PropertyMap::new());
                        match side {
                            Side::From => ActionState::Keyframes { from: map, to: empty },
                            Side::To => ActionState::Keyframes { from: empty, to: map },
                        }
                    }
                    _ => {
                        return Err(ChainError::validation(
                            setter,
                            "cannot be combined with property or transform setters",
                        ));
                    }
                };
            }
            ActionKind::Property(property) => {
                let value = resolved.try_map(|args| property_value(setter, property, &args[0]))?;
                match &mut next.actions {
                    ActionState::Properties { values, .. } => {
                        values.insert(property, value);
                    }
                    ActionState::Keyframes { .. } => return Err(mixed_modes(setter)),
                }
            }
            ActionKind::Transform(kind) => {
                let list = resolved.try_map(|args| transform_fn(setter, kind, &args).map(TransformList::from))?;
                match &mut next.actions {
                    ActionState::Properties { transform, .. } => {
                        *transform = Some(match transform.take() {
                            Some(existing) => {
                                existing.zip_with(&list, targets.len(), |a, b| a.concat(b))
                            }
                            None => list,
                        });
                    }
                    ActionState::Keyframes { .. } => return Err(mixed_modes(setter)),
                }
            }
        }
        Ok(next)
    }

    /// Apply an option setter, returning the updated copy.
    pub fn with_option(
        &self,
        decl: &OptionDecl,
        args: &[Arg],
        targets: &[Rc<dyn RenderTarget>],
    ) -> Result<Self> {
        let setter = decl.name;
        let mut next = self.clone();

        if args.is_empty() {
            if !decl.flag {
                return Err(ChainError::validation(setter, "expected 1 argument(s), got 0"));
            }
            // `loop()` is the only flag option.
            next.options.looping = PerTarget::Uniform(LoopCount::Infinite);
            return Ok(next);
        }

        let resolved = expand_args(setter, &decl.signature, args, targets)?;
        match decl.kind {
            OptionKind::Duration => {
                next.options.duration = resolved.try_map(|args| {
                    let seconds = number(&args[0]);
                    if seconds < 0.0 {
                        return Err(ChainError::validation(setter, "must not be negative"));
                    }
                    Ok(seconds)
                })?;
            }
            OptionKind::Delay => {
                next.options.delay = resolved.try_map(|args| Ok(number(&args[0])))?;
            }
            OptionKind::Easing => {
                next.options.easing = resolved.try_map(|args| {
                    EasingFunction::parse(args[0].as_text().unwrap_or_default())
                        .map_err(|e| ChainError::validation(setter, e))
                })?;
            }
            OptionKind::Loop => {
                // `check_arg` admitted only whole numbers in `0..=u32::MAX`, so the
                // cast is exact.
                next.options.looping =
                    resolved.try_map(|args| Ok(LoopCount::Times(number(&args[0]) as u32)))?;
            }
        }
        Ok(next)
    }

    /// Every action and option name mapped to its current value.
    pub fn parameters(&self) -> BTreeMap<&'static str, ParameterValue> {
        let mut out = BTreeMap::new();

        for action in registry::ACTIONS {
            let value = match (action.kind, &self.actions) {
                (ActionKind::Keyframes(Side::From), ActionState::Keyframes { from, .. }) => {
                    ParameterValue::Keyframes(from.clone())
                }
                (ActionKind::Keyframes(Side::To), ActionState::Keyframes { to, .. }) => {
                    ParameterValue::Keyframes(to.clone())
                }
                (ActionKind::Property(property), ActionState::Properties { values, .. }) => values
                    .get(&property)
                    .map(|v| ParameterValue::Value(v.clone()))
                    .unwrap_or(ParameterValue::Unset),
                (
                    ActionKind::Transform(kind),
                    ActionState::Properties {
                        transform: Some(list),
                        ..
                    },
                ) => {
                    let filtered = list.map(|l| {
                        TransformList(
                            l.functions()
                                .iter()
                                .filter(|f| f.kind() == kind)
                                .copied()
                                .collect(),
                        )
                    });
                    let any = match &filtered {
                        PerTarget::Uniform(l) => !l.is_empty(),
                        PerTarget::Each(ls) => ls.iter().any(|l| !l.is_empty()),
                    };
                    if any {
                        ParameterValue::Transform(filtered)
                    } else {
                        ParameterValue::Unset
                    }
                }
                _ => ParameterValue::Unset,
            };
            out.insert(action.name, value);
        }

        for option in registry::OPTIONS {
            let value = match option.kind {
                OptionKind::Duration => ParameterValue::Seconds(self.options.duration.clone()),
                OptionKind::Delay => ParameterValue::Seconds(self.options.delay.clone()),
                OptionKind::Easing => ParameterValue::Easing(self.options.easing.clone()),
                OptionKind::Loop => ParameterValue::Loop(self.options.looping.clone()),
            };
            out.insert(option.name, value);
        }

        out
    }
}

fn mixed_modes(setter: &str) -> ChainError {
    ChainError::validation(setter, "cannot be combined with from/to")
}

/// Validate `args` and resolve per-target arguments.
///
/// Returns a uniform argument list when no argument varies per target,
/// otherwise one list per target index.
fn expand_args(
    setter: &str,
    signature: &Signature,
    args: &[Arg],
    targets: &[Rc<dyn RenderTarget>],
) -> Result<PerTarget<Vec<Arg>>> {
    signature.check_arity(setter, args.len())?;

    let per_target = args
        .iter()
        .any(|a| matches!(a, Arg::List(_) | Arg::Each(_)));
    if !per_target {
        for (position, arg) in args.iter().enumerate() {
            signature.check_arg(setter, position, arg)?;
        }
        return Ok(PerTarget::Uniform(args.to_vec()));
    }

    for arg in args {
        if let Arg::List(items) = arg {
            if items.len() < targets.len() {
                return Err(ChainError::validation(
                    setter,
                    format!(
                        "expected one value per target ({}), got {}",
                        targets.len(),
                        items.len()
                    ),
                ));
            }
        }
    }

    let mut each = Vec::with_capacity(targets.len());
    for (index, target) in targets.iter().enumerate() {
        let mut resolved = Vec::with_capacity(args.len());
        for (position, arg) in args.iter().enumerate() {
            let value = match arg {
                Arg::List(items) => items[index].clone(),
                Arg::Each(f) => f(index, target.as_ref()),
                scalar => scalar.clone(),
            };
            signature.check_arg(setter, position, &value)?;
            resolved.push(value);
        }
        each.push(resolved);
    }
    Ok(PerTarget::Each(each))
}

fn number(arg: &Arg) -> f64 {
    arg.as_number().unwrap_or_default()
}

fn property_map(setter: &str, arg: &Arg) -> Result<PropertyMap> {
    let Arg::Map(entries) = arg else {
        return Err(ChainError::validation(setter, format!("'{arg}' value is not a map")));
    };
    let mut map = PropertyMap::new();
    for (name, value) in entries {
        let property =
            AnimatableProperty::from_name(name).map_err(|e| ChainError::validation(setter, e))?;
        map.insert(property, property_value(setter, property, value)?);
    }
    Ok(map)
}

/// Convert a number or CSS text into a value for `property`. Bare numbers
/// are pixels for length properties.
fn property_value(setter: &str, property: AnimatableProperty, arg: &Arg) -> Result<AnimatableValue> {
    match arg {
        Arg::Text(text) => {
            AnimatableValue::parse_for(property, text).map_err(|e| ChainError::validation(setter, e))
        }
        Arg::Number(n) => match property.value_type() {
            AnimatableValueType::Number => Ok(AnimatableValue::Number { value: *n }),
            AnimatableValueType::Length => Ok(Length::px(*n).into()),
            other => Err(ChainError::validation(
                setter,
                format!("'{n}' value is not a {} for {property}", other.describe()),
            )),
        },
        other => Err(ChainError::validation(
            setter,
            format!("'{other}' value is not a number or string"),
        )),
    }
}

/// Build one transform function. Bare numbers are pixels for translations
/// and degrees for rotations and skews.
fn transform_fn(setter: &str, kind: TransformKind, args: &[Arg]) -> Result<TransformFn> {
    let unit = match kind {
        TransformKind::TranslateX | TransformKind::TranslateY | TransformKind::Translate => "px",
        TransformKind::Rotate | TransformKind::SkewX | TransformKind::SkewY => "deg",
        _ => "",
    };
    let texts: Vec<String> = args
        .iter()
        .map(|arg| match arg {
            Arg::Number(n) => format!("{n}{unit}"),
            other => other.to_string(),
        })
        .collect();
    let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
    kind.parse_with(&refs)
        .map_err(|e| ChainError::validation(setter, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{find_action, find_option};
    use crate::test_support::MockTarget;

    fn targets(n: usize) -> Vec<Rc<dyn RenderTarget>> {
        (0..n)
            .map(|i| Rc::new(MockTarget::new(&format!("t{i}"))) as Rc<dyn RenderTarget>)
            .collect()
    }

    fn action(
        snapshot: &ParameterSnapshot,
        name: &str,
        args: &[Arg],
        targets: &[Rc<dyn RenderTarget>],
    ) -> Result<ParameterSnapshot> {
        snapshot.with_action(find_action(name).unwrap(), args, targets)
    }

    fn option(
        snapshot: &ParameterSnapshot,
        name: &str,
        args: &[Arg],
        targets: &[Rc<dyn RenderTarget>],
    ) -> Result<ParameterSnapshot> {
        snapshot.with_option(find_option(name).unwrap(), args, targets)
    }

    #[test]
    fn test_property_setter_overwrites() {
        let ts = targets(1);
        let s = ParameterSnapshot::default();
        let s = action(&s, "width", &["10px".into()], &ts).unwrap();
        let s = action(&s, "width", &[20.into()], &ts).unwrap();

        let params = s.parameters();
        match &params["width"] {
            ParameterValue::Value(PerTarget::Uniform(v)) => assert_eq!(v.to_string(), "20px"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_transform_setters_concatenate() {
        let ts = targets(1);
        let s = ParameterSnapshot::default();
        let s = action(&s, "translateX", &[10.into()], &ts).unwrap();
        let s = action(&s, "rotate", &["45deg".into()], &ts).unwrap();
        let s = action(&s, "translateX", &["5%".into()], &ts).unwrap();

        let values = s.actions.values_for(0).unwrap();
        let list = values[&AnimatableProperty::Transform].as_transform().unwrap();
        assert_eq!(list.to_string(), "translateX(10px) rotate(45deg) translateX(5%)");

        match &s.parameters()["translateX"] {
            ParameterValue::Transform(PerTarget::Uniform(l)) => assert_eq!(l.len(), 2),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(s.parameters()["scale"], ParameterValue::Unset);
    }

    #[test]
    fn test_keyframe_setters_overwrite_side() {
        let ts = targets(1);
        let s = ParameterSnapshot::default();
        let s = action(&s, "to", &[Arg::from([("width", "10px")])], &ts).unwrap();
        let s = action(&s, "to", &[Arg::from([("width", "20px")])], &ts).unwrap();
        let s = action(&s, "from", &[Arg::from([("opacity", 0.0)])], &ts).unwrap();

        match &s.parameters()["to"] {
            ParameterValue::Keyframes(PerTarget::Uniform(map)) => {
                assert_eq!(map[&AnimatableProperty::Width].to_string(), "20px");
            }
            other => panic!("unexpected {other:?}"),
        }
        match &s.parameters()["from"] {
            ParameterValue::Keyframes(PerTarget::Uniform(map)) => {
                assert_eq!(map[&AnimatableProperty::Opacity].as_number(), Some(0.0));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_mixing_modes_is_rejected() {
        let ts = targets(1);
        let s = ParameterSnapshot::default();
        let keyframes = action(&s, "to", &[Arg::from([("width", "10px")])], &ts).unwrap();
        assert!(matches!(
            action(&keyframes, "opacity", &[0.5.into()], &ts),
            Err(ChainError::TypeValidation { .. })
        ));

        let props = action(&s, "opacity", &[0.5.into()], &ts).unwrap();
        assert!(action(&props, "from", &[Arg::from([("width", "1px")])], &ts).is_err());
    }

    #[test]
    fn test_invalid_values() {
        let ts = targets(1);
        let s = ParameterSnapshot::default();
        assert!(action(&s, "to", &[Arg::from([("wobble", "1px")])], &ts).is_err());
        assert!(action(&s, "width", &["red".into()], &ts).is_err());
        assert!(action(&s, "backgroundColor", &[3.into()], &ts).is_err());
        assert!(action(&s, "translate", &[1.into(), 2.into(), 3.into()], &ts).is_err());
        assert!(action(&s, "to", &["width".into()], &ts).is_err());
    }

    #[test]
    fn test_wrongly_typed_option_fails() {
        let ts = targets(1);
        let s = ParameterSnapshot::default();
        let err = option(&s, "duration", &["fast".into()], &ts).unwrap_err();
        assert!(matches!(err, ChainError::TypeValidation { ref setter, .. } if setter == "duration"));
        assert!(option(&s, "duration", &[(-1).into()], &ts).is_err());
        assert!(option(&s, "easing", &["bouncy".into()], &ts).is_err());
        assert!(option(&s, "easing", &[1.into()], &ts).is_err());
        assert!(option(&s, "loop", &[1.5.into()], &ts).is_err());
        assert!(option(&s, "duration", &[], &ts).is_err());
    }

    #[test]
    fn test_loop_flag() {
        let ts = targets(1);
        let s = option(&ParameterSnapshot::default(), "loop", &[], &ts).unwrap();
        assert_eq!(s.options.looping, PerTarget::Uniform(LoopCount::Infinite));
        let s = option(&s, "loop", &[2.into()], &ts).unwrap();
        assert_eq!(s.options.resolve(0).looping, LoopCount::Times(2));
    }

    #[test]
    fn test_loop_count_bounds() {
        let ts = targets(1);
        let s = ParameterSnapshot::default();
        let max = option(&s, "loop", &[u32::MAX.into()], &ts).unwrap();
        assert_eq!(max.options.resolve(0).looping, LoopCount::Times(u32::MAX));
        assert!(option(&s, "loop", &[(u32::MAX as f64 + 1.0).into()], &ts).is_err());
        assert!(option(&s, "loop", &[(-1).into()], &ts).is_err());
    }

    #[test]
    fn test_per_target_options() {
        let ts = targets(3);
        let s = ParameterSnapshot::default();
        let s = option(&s, "duration", &[vec![1.0, 2.0, 3.0, 4.0].into()], &ts).unwrap();
        assert_eq!(s.options.resolve(2).duration, 3.0);

        let s = option(&s, "delay", &[Arg::each(|i, _| Arg::from(i as f64 * 0.5))], &ts).unwrap();
        assert_eq!(s.options.resolve(1).delay, 0.5);

        let err = option(&s, "duration", &[vec![1.0, 2.0].into()], &ts).unwrap_err();
        assert!(err.to_string().contains("one value per target"));
    }

    #[test]
    fn test_per_target_function_results_are_validated() {
        let ts = targets(2);
        let s = ParameterSnapshot::default();
        let err = option(
            &s,
            "duration",
            &[Arg::each(|i, _| if i == 0 { Arg::from(1.0) } else { Arg::from("slow") })],
            &ts,
        )
        .unwrap_err();
        assert!(err.to_string().contains("'slow'"));
    }

    #[test]
    fn test_per_target_action_values() {
        let ts = targets(2);
        let s = ParameterSnapshot::default();
        let s = action(&s, "width", &[Arg::each(|i, t| Arg::from(format!("{}px", (i + 1) * 10 + t.id().len())))], &ts).unwrap();
        let s = action(&s, "rotate", &[vec![90, 180].into()], &ts).unwrap();
        let s = action(&s, "rotate", &[45.into()], &ts).unwrap();

        let second = s.actions.values_for(1).unwrap();
        assert_eq!(second[&AnimatableProperty::Width].to_string(), "22px");
        assert_eq!(
            second[&AnimatableProperty::Transform].to_string(),
            "rotate(180deg) rotate(45deg)"
        );
    }

    #[test]
    fn test_short_plugin_sequence_falls_back_to_default() {
        let mut options = OptionState::default();
        options.duration = PerTarget::Each(vec![1.0]);
        assert_eq!(options.resolve(0).duration, 1.0);
        assert_eq!(options.resolve(5).duration, 0.3);
    }

    #[test]
    fn test_resolved_options_timing() {
        let options = ResolvedOptions {
            duration: 0.5,
            delay: 0.1,
            ..ResolvedOptions::default()
        };
        let spec = options.transition_spec();
        assert_eq!(spec.duration_ms, 500.0);
        assert!((spec.delay_ms - 100.0).abs() < 1e-3);
        assert!(!options.is_instant());
        assert!(ResolvedOptions {
            duration: 0.0,
            ..ResolvedOptions::default()
        }
        .is_instant());
    }

    #[test]
    fn test_parameters_serialize() {
        let ts = targets(1);
        let s = action(&ParameterSnapshot::default(), "opacity", &[0.5.into()], &ts).unwrap();
        let json = serde_json::to_value(s.parameters()).unwrap();
        assert_eq!(json["opacity"]["type"], "value");
        assert_eq!(json["width"]["type"], "unset");
        assert_eq!(json["loop"]["value"]["uniform"]["type"], "times");
    }
}
