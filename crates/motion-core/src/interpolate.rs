//! Blending between two animatable values.
//!
//! Numbers, lengths and color channels mix linearly. Colors stay in the
//! straight-alpha form the parser produces. Pairs that cannot be blended
//! (lengths in different units, values of different kinds) flip at the
//! midpoint.

use crate::types::{AnimatableValue, Length, LengthUnit};

/// Values that can be blended, `t = 0.0` giving `self` and `t = 1.0`
/// giving `to`.
pub trait Interpolate: Sized {
    fn interpolate(&self, to: &Self, t: f32) -> Self;
}

#[inline]
pub fn mix(from: f64, to: f64, t: f64) -> f64 {
    from + (to - from) * t
}

/// `from` until the midpoint, `to` from there on.
pub fn discrete<T: Clone>(from: &T, to: &T, t: f32) -> T {
    if t < 0.5 { from.clone() } else { to.clone() }
}

impl Interpolate for f64 {
    fn interpolate(&self, to: &Self, t: f32) -> Self {
        mix(*self, *to, t as f64)
    }
}

/// Unit two lengths can be mixed in. A zero length adopts the other side's
/// unit, so `0` animates to `50%`.
fn shared_unit(a: &Length, b: &Length) -> Option<LengthUnit> {
    if a.unit == b.unit || a.value == 0.0 {
        Some(b.unit)
    } else if b.value == 0.0 {
        Some(a.unit)
    } else {
        None
    }
}

impl Interpolate for Length {
    fn interpolate(&self, to: &Self, t: f32) -> Self {
        match shared_unit(self, to) {
            Some(unit) => Length {
                value: mix(self.value, to.value, t as f64),
                unit,
            },
            None => discrete(self, to, t),
        }
    }
}

fn mix_rgba(a: &[f32; 4], b: &[f32; 4], t: f32) -> [f32; 4] {
    std::array::from_fn(|channel| a[channel] + (b[channel] - a[channel]) * t)
}

impl Interpolate for AnimatableValue {
    fn interpolate(&self, to: &Self, t: f32) -> Self {
        match (self, to) {
            (Self::Number { value: a }, Self::Number { value: b }) => Self::Number {
                value: a.interpolate(b, t),
            },
            (Self::Length { length: a }, Self::Length { length: b }) => Self::Length {
                length: a.interpolate(b, t),
            },
            (Self::Color { rgba: a }, Self::Color { rgba: b }) => Self::Color {
                rgba: mix_rgba(a, b, t),
            },
            (Self::Transform { list: a }, Self::Transform { list: b }) => Self::Transform {
                list: a.interpolate(b, t),
            },
            _ => discrete(self, to, t),
        }
    }
}
