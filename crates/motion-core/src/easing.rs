//! Easing functions for animation timing.
//!
//! CSS-compatible timing functions, parsed from their CSS text form:
//! - `linear`
//! - `ease`, `ease-in`, `ease-out`, `ease-in-out`
//! - `cubic-bezier(x1, y1, x2, y2)`
//! - `steps(n[, start | end | jump-both | jump-none])`
//!
//! # Usage
//!
//! ```
//! use motion_core::easing::EasingFunction;
//!
//! let ease: EasingFunction = "ease-out".parse().unwrap();
//! let progress = ease.evaluate(0.5);
//! assert!(progress > 0.5);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, ValueError};

/// Position for stepped animations.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepPosition {
    /// Jump at the start of each interval (CSS `jump-start` / `start`).
    Start,
    /// Jump at the end of each interval (CSS `jump-end` / `end`).
    #[default]
    End,
    /// Jump at both start and end (CSS `jump-both`).
    Both,
    /// No jump at start or end (CSS `jump-none`).
    None,
}

impl StepPosition {
    fn keyword(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::End => "end",
            Self::Both => "jump-both",
            Self::None => "jump-none",
        }
    }
}

/// Easing function for animation timing.
///
/// Maps linear progress (0.0 to 1.0) to eased progress.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EasingFunction {
    /// No easing. This is the chain default.
    #[default]
    Linear,

    /// CSS `ease`, equivalent to `cubic-bezier(0.25, 0.1, 0.25, 1.0)`.
    Ease,

    /// CSS `ease-in`, equivalent to `cubic-bezier(0.42, 0, 1, 1)`.
    EaseIn,

    /// CSS `ease-out`, equivalent to `cubic-bezier(0, 0, 0.58, 1)`.
    EaseOut,

    /// CSS `ease-in-out`, equivalent to `cubic-bezier(0.42, 0, 0.58, 1)`.
    EaseInOut,

    /// Custom cubic bezier curve. x values are in [0, 1].
    CubicBezier { x1: f32, y1: f32, x2: f32, y2: f32 },

    /// Stepped animation with `count >= 1` intervals.
    Steps { count: u32, position: StepPosition },
}

impl EasingFunction {
    /// Evaluate the easing function at the given progress.
    pub fn evaluate(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);

        match self {
            Self::Linear => t,
            Self::Ease => cubic_bezier(0.25, 0.1, 0.25, 1.0, t),
            Self::EaseIn => cubic_bezier(0.42, 0.0, 1.0, 1.0, t),
            Self::EaseOut => cubic_bezier(0.0, 0.0, 0.58, 1.0, t),
            Self::EaseInOut => cubic_bezier(0.42, 0.0, 0.58, 1.0, t),
            Self::CubicBezier { x1, y1, x2, y2 } => cubic_bezier(*x1, *y1, *x2, *y2, t),
            Self::Steps { count, position } => stepped(*count, *position, t),
        }
    }

    /// Create a custom cubic bezier easing function.
    pub fn cubic_bezier(x1: f32, y1: f32, x2: f32, y2: f32) -> Result<Self> {
        if !(0.0..=1.0).contains(&x1) || !(0.0..=1.0).contains(&x2) {
            return Err(ValueError::Easing(format!(
                "cubic-bezier({}, {}, {}, {})",
                x1, y1, x2, y2
            )));
        }
        Ok(Self::CubicBezier { x1, y1, x2, y2 })
    }

    /// Create a stepped easing function.
    pub fn steps(count: u32, position: StepPosition) -> Result<Self> {
        if count == 0 || (count == 1 && position == StepPosition::None) {
            return Err(ValueError::Easing(format!(
                "steps({}, {})",
                count,
                position.keyword()
            )));
        }
        Ok(Self::Steps { count, position })
    }

    /// Parse a CSS timing function.
    pub fn parse(text: &str) -> Result<Self> {
        let trimmed = text.trim();
        let lower = trimmed.to_ascii_lowercase();
        let err = || ValueError::Easing(trimmed.to_string());

        match lower.as_str() {
            "linear" => return Ok(Self::Linear),
            "ease" => return Ok(Self::Ease),
            "ease-in" => return Ok(Self::EaseIn),
            "ease-out" => return Ok(Self::EaseOut),
            "ease-in-out" => return Ok(Self::EaseInOut),
            "step-start" => return Self::steps(1, StepPosition::Start),
            "step-end" => return Self::steps(1, StepPosition::End),
            _ => {}
        }

        let (name, args) = lower
            .strip_suffix(')')
            .and_then(|s| s.split_once('('))
            .ok_or_else(err)?;
        let args: Vec<&str> = args.split(',').map(str::trim).collect();

        match name.trim() {
            "cubic-bezier" => {
                let [x1, y1, x2, y2] = args.as_slice() else {
                    return Err(err());
                };
                let num = |s: &str| s.parse::<f32>().ok().filter(|v| v.is_finite());
                match (num(x1), num(y1), num(x2), num(y2)) {
                    (Some(x1), Some(y1), Some(x2), Some(y2)) => {
                        Self::cubic_bezier(x1, y1, x2, y2).map_err(|_| err())
                    }
                    _ => Err(err()),
                }
            }
            "steps" => {
                let count = args
                    .first()
                    .and_then(|s| s.parse::<u32>().ok())
                    .ok_or_else(err)?;
                let position = match args.get(1).copied() {
                    None | Some("end") | Some("jump-end") => StepPosition::End,
                    Some("start") | Some("jump-start") => StepPosition::Start,
                    Some("jump-both") => StepPosition::Both,
                    Some("jump-none") => StepPosition::None,
                    Some(_) => return Err(err()),
                };
                if args.len() > 2 {
                    return Err(err());
                }
                Self::steps(count, position).map_err(|_| err())
            }
            _ => Err(err()),
        }
    }
}

impl FromStr for EasingFunction {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for EasingFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linear => f.write_str("linear"),
            Self::Ease => f.write_str("ease"),
            Self::EaseIn => f.write_str("ease-in"),
            Self::EaseOut => f.write_str("ease-out"),
            Self::EaseInOut => f.write_str("ease-in-out"),
            Self::CubicBezier { x1, y1, x2, y2 } => {
                write!(f, "cubic-bezier({}, {}, {}, {})", x1, y1, x2, y2)
            }
            Self::Steps { count, position } => {
                write!(f, "steps({}, {})", count, position.keyword())
            }
        }
    }
}

/// Evaluate a cubic bezier curve at time t.
///
/// Uses Newton-Raphson iteration to find the curve parameter for the input
/// progress, then evaluates the y coordinate there.
fn cubic_bezier(x1: f32, y1: f32, x2: f32, y2: f32, progress: f32) -> f32 {
    if progress <= 0.0 {
        return 0.0;
    }
    if progress >= 1.0 {
        return 1.0;
    }

    let t = solve_bezier_x(x1, x2, progress);
    bezier_y(y1, y2, t)
}

fn solve_bezier_x(x1: f32, x2: f32, target_x: f32) -> f32 {
    let mut t = target_x;

    for _ in 0..8 {
        let x = bezier_x(x1, x2, t) - target_x;
        if x.abs() < 1e-6 {
            break;
        }

        let dx = bezier_x_derivative(x1, x2, t);
        if dx.abs() < 1e-6 {
            break;
        }

        t -= x / dx;
        t = t.clamp(0.0, 1.0);
    }

    t
}

/// x(t) = 3(1-t)²t·x1 + 3(1-t)t²·x2 + t³
#[inline]
fn bezier_x(x1: f32, x2: f32, t: f32) -> f32 {
    let mt = 1.0 - t;
    3.0 * mt * mt * t * x1 + 3.0 * mt * t * t * x2 + t * t * t
}

#[inline]
fn bezier_y(y1: f32, y2: f32, t: f32) -> f32 {
    let mt = 1.0 - t;
    3.0 * mt * mt * t * y1 + 3.0 * mt * t * t * y2 + t * t * t
}

/// dx/dt = 3(1-t)²·x1 + 6(1-t)t·(x2-x1) + 3t²·(1-x2)
#[inline]
fn bezier_x_derivative(x1: f32, x2: f32, t: f32) -> f32 {
    let mt = 1.0 - t;
    3.0 * mt * mt * x1 + 6.0 * mt * t * (x2 - x1) + 3.0 * t * t * (1.0 - x2)
}

fn stepped(steps: u32, position: StepPosition, t: f32) -> f32 {
    if steps == 0 {
        return t;
    }
    let steps_f = steps as f32;

    match position {
        StepPosition::Start => (t * steps_f).ceil() / steps_f,
        StepPosition::End => (t * steps_f).floor() / steps_f,
        StepPosition::Both => ((t * steps_f).floor() + 1.0).min(steps_f + 1.0) / (steps_f + 1.0),
        StepPosition::None if steps == 1 => t,
        StepPosition::None => ((t * steps_f).floor().min(steps_f - 1.0)) / (steps_f - 1.0),
    }
}
