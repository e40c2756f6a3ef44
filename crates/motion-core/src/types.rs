//! Core animation types and data structures.
//!
//! This module defines the fundamental types of the render model:
//! - `AnimatableProperty`: the style properties a chain may animate
//! - `AnimatableValue`: a parsed property value (number, length, color, transform)
//! - `PropertyMap`: property name to value mapping used by keyframes and chains
//! - `AnimationId` / `AnimationState`: runtime bookkeeping for active animations

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{Result, ValueError};
use crate::transform::TransformList;

/// Mapping of property to value. Ordering is canonical, which keeps content
/// hashing of keyframe rules stable.
pub type PropertyMap = BTreeMap<AnimatableProperty, AnimatableValue>;

/// Unique identifier for an animation instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnimationId(pub u64);

impl AnimationId {
    /// Generate a new unique animation ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for AnimationId {
    fn default() -> Self {
        Self::new()
    }
}

/// Current state of an animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimationState {
    /// Created but waiting for its delay to elapse.
    #[default]
    Pending,
    /// Actively running.
    Running,
    /// Completed normally.
    Finished,
    /// Cancelled before completion.
    Cancelled,
}

/// Unit attached to a length value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LengthUnit {
    #[default]
    Px,
    Percent,
    Em,
    Rem,
    Vw,
    Vh,
}

impl LengthUnit {
    /// CSS suffix for this unit.
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::Px => "px",
            Self::Percent => "%",
            Self::Em => "em",
            Self::Rem => "rem",
            Self::Vw => "vw",
            Self::Vh => "vh",
        }
    }

    fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "px" => Some(Self::Px),
            "%" => Some(Self::Percent),
            "em" => Some(Self::Em),
            "rem" => Some(Self::Rem),
            "vw" => Some(Self::Vw),
            "vh" => Some(Self::Vh),
            _ => None,
        }
    }
}

/// A length with its unit, e.g. `12px` or `50%`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Length {
    pub value: f64,
    pub unit: LengthUnit,
}

impl Length {
    pub fn px(value: f64) -> Self {
        Self {
            value,
            unit: LengthUnit::Px,
        }
    }

    /// Parse a CSS length. A bare `0` is accepted as `0px`.
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim();
        let split = text
            .find(|c: char| c.is_ascii_alphabetic() || c == '%')
            .unwrap_or(text.len());
        let (number, suffix) = text.split_at(split);
        let value = parse_number(number).map_err(|_| ValueError::invalid(text, "length"))?;

        if suffix.is_empty() {
            if value == 0.0 {
                return Ok(Self::px(0.0));
            }
            return Err(ValueError::invalid(text, "length"));
        }

        let unit = LengthUnit::from_suffix(&suffix.to_ascii_lowercase())
            .ok_or_else(|| ValueError::invalid(text, "length"))?;
        Ok(Self { value, unit })
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value, self.unit.suffix())
    }
}

/// Parse a finite CSS number.
pub fn parse_number(text: &str) -> Result<f64> {
    let text = text.trim();
    match text.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(ValueError::invalid(text, "number")),
    }
}

/// Parse a CSS angle into degrees. A bare `0` is accepted.
pub fn parse_angle(text: &str) -> Result<f64> {
    let text = text.trim();
    let split = text
        .find(|c: char| c.is_ascii_alphabetic())
        .unwrap_or(text.len());
    let (number, suffix) = text.split_at(split);
    let value = parse_number(number).map_err(|_| ValueError::invalid(text, "angle"))?;

    match suffix.to_ascii_lowercase().as_str() {
        "deg" => Ok(value),
        "rad" => Ok(value.to_degrees()),
        "turn" => Ok(value * 360.0),
        "grad" => Ok(value * 0.9),
        "" if value == 0.0 => Ok(0.0),
        _ => Err(ValueError::invalid(text, "angle")),
    }
}

/// The kind of value a property accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimatableValueType {
    Number,
    Length,
    Color,
    Transform,
}

impl AnimatableValueType {
    /// Human-readable name used in error messages.
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Number => "number",
            Self::Length => "length",
            Self::Color => "color",
            Self::Transform => "transform list",
        }
    }
}

/// Enum representing all animatable value types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnimatableValue {
    /// Unitless number (opacity).
    Number { value: f64 },
    /// Length with unit (width, top, font size, ...).
    Length {
        #[serde(flatten)]
        length: Length,
    },
    /// Straight-alpha sRGB color, components in 0..=1.
    Color { rgba: [f32; 4] },
    /// Ordered list of transform functions.
    Transform { list: TransformList },
}

impl AnimatableValue {
    /// Parse `text` as a value of the given type.
    pub fn parse(value_type: AnimatableValueType, text: &str) -> Result<Self> {
        match value_type {
            AnimatableValueType::Number => Ok(Self::Number {
                value: parse_number(text)?,
            }),
            AnimatableValueType::Length => Ok(Self::Length {
                length: Length::parse(text)?,
            }),
            AnimatableValueType::Color => {
                let color = csscolorparser::parse(text.trim())
                    .map_err(|_| ValueError::invalid(text, "color"))?;
                Ok(Self::Color {
                    rgba: [
                        color.r as f32,
                        color.g as f32,
                        color.b as f32,
                        color.a as f32,
                    ],
                })
            }
            AnimatableValueType::Transform => Ok(Self::Transform {
                list: TransformList::parse(text)?,
            }),
        }
    }

    /// Parse `text` as a value for `property`.
    pub fn parse_for(property: AnimatableProperty, text: &str) -> Result<Self> {
        Self::parse(property.value_type(), text)
    }

    /// The type of this value.
    pub fn value_type(&self) -> AnimatableValueType {
        match self {
            Self::Number { .. } => AnimatableValueType::Number,
            Self::Length { .. } => AnimatableValueType::Length,
            Self::Color { .. } => AnimatableValueType::Color,
            Self::Transform { .. } => AnimatableValueType::Transform,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number { value } => Some(*value),
            _ => None,
        }
    }

    pub fn as_length(&self) -> Option<Length> {
        match self {
            Self::Length { length } => Some(*length),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<[f32; 4]> {
        match self {
            Self::Color { rgba } => Some(*rgba),
            _ => None,
        }
    }

    pub fn as_transform(&self) -> Option<&TransformList> {
        match self {
            Self::Transform { list } => Some(list),
            _ => None,
        }
    }
}

impl fmt::Display for AnimatableValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number { value } => write!(f, "{}", value),
            Self::Length { length } => write!(f, "{}", length),
            Self::Color { rgba } => {
                let [r, g, b, a] = rgba.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8);
                if a == 255 {
                    write!(f, "#{:02x}{:02x}{:02x}", r, g, b)
                } else {
                    write!(f, "#{:02x}{:02x}{:02x}{:02x}", r, g, b, a)
                }
            }
            Self::Transform { list } => write!(f, "{}", list),
        }
    }
}

impl From<f64> for AnimatableValue {
    fn from(value: f64) -> Self {
        Self::Number { value }
    }
}

impl From<Length> for AnimatableValue {
    fn from(length: Length) -> Self {
        Self::Length { length }
    }
}

impl From<[f32; 4]> for AnimatableValue {
    fn from(rgba: [f32; 4]) -> Self {
        Self::Color { rgba }
    }
}

impl From<TransformList> for AnimatableValue {
    fn from(list: TransformList) -> Self {
        Self::Transform { list }
    }
}

/// Style properties that chains may animate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimatableProperty {
    // Geometry
    Width,
    Height,
    Top,
    Left,
    Right,
    Bottom,

    // Visual
    Opacity,
    BackgroundColor,
    Color,
    BorderColor,
    BorderWidth,
    BorderRadius,

    // Text
    FontSize,

    // Transform (composed list)
    Transform,
}

impl AnimatableProperty {
    /// Every animatable property, in declaration order.
    pub const ALL: [AnimatableProperty; 14] = [
        Self::Width,
        Self::Height,
        Self::Top,
        Self::Left,
        Self::Right,
        Self::Bottom,
        Self::Opacity,
        Self::BackgroundColor,
        Self::Color,
        Self::BorderColor,
        Self::BorderWidth,
        Self::BorderRadius,
        Self::FontSize,
        Self::Transform,
    ];

    /// Returns the expected value type for this property.
    pub fn value_type(&self) -> AnimatableValueType {
        match self {
            Self::Width
            | Self::Height
            | Self::Top
            | Self::Left
            | Self::Right
            | Self::Bottom
            | Self::BorderWidth
            | Self::BorderRadius
            | Self::FontSize => AnimatableValueType::Length,
            Self::Opacity => AnimatableValueType::Number,
            Self::BackgroundColor | Self::Color | Self::BorderColor => AnimatableValueType::Color,
            Self::Transform => AnimatableValueType::Transform,
        }
    }

    /// Dash-case CSS name.
    pub fn css_name(&self) -> &'static str {
        match self {
            Self::Width => "width",
            Self::Height => "height",
            Self::Top => "top",
            Self::Left => "left",
            Self::Right => "right",
            Self::Bottom => "bottom",
            Self::Opacity => "opacity",
            Self::BackgroundColor => "background-color",
            Self::Color => "color",
            Self::BorderColor => "border-color",
            Self::BorderWidth => "border-width",
            Self::BorderRadius => "border-radius",
            Self::FontSize => "font-size",
            Self::Transform => "transform",
        }
    }

    /// Look up a property by CSS (`background-color`) or camelCase
    /// (`backgroundColor`) name.
    pub fn from_name(name: &str) -> Result<Self> {
        let dashed = camel_to_dash(name.trim());
        Self::ALL
            .into_iter()
            .find(|p| p.css_name() == dashed)
            .ok_or_else(|| ValueError::UnknownProperty(name.to_string()))
    }

    /// Value a target reports before anything was assigned.
    pub fn initial_value(&self) -> AnimatableValue {
        match self.value_type() {
            AnimatableValueType::Number => AnimatableValue::Number { value: 1.0 },
            AnimatableValueType::Length => AnimatableValue::Length {
                length: Length::px(0.0),
            },
            AnimatableValueType::Color => match self {
                Self::Color => AnimatableValue::Color {
                    rgba: [0.0, 0.0, 0.0, 1.0],
                },
                _ => AnimatableValue::Color {
                    rgba: [0.0, 0.0, 0.0, 0.0],
                },
            },
            AnimatableValueType::Transform => AnimatableValue::Transform {
                list: TransformList::default(),
            },
        }
    }
}

impl fmt::Display for AnimatableProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.css_name())
    }
}

fn camel_to_dash(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            out.push('-');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}
