//! CSS-like transform lists.
//!
//! A `TransformList` is an ordered sequence of transform functions such as
//! `translateX(10px) rotate(45deg)`. Lists whose functions line up pairwise
//! interpolate function by function; anything else falls back to
//! interpolating decomposed 2D matrices.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;

use crate::error::{Result, ValueError};
use crate::interpolate::{Interpolate, mix};
use crate::types::{Length, parse_angle, parse_number};

/// Name of a transform function, independent of its arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformKind {
    TranslateX,
    TranslateY,
    Translate,
    Scale,
    ScaleX,
    ScaleY,
    Rotate,
    SkewX,
    SkewY,
    Matrix,
}

impl TransformKind {
    pub const ALL: [TransformKind; 10] = [
        Self::TranslateX,
        Self::TranslateY,
        Self::Translate,
        Self::Scale,
        Self::ScaleX,
        Self::ScaleY,
        Self::Rotate,
        Self::SkewX,
        Self::SkewY,
        Self::Matrix,
    ];

    /// CSS function name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::TranslateX => "translateX",
            Self::TranslateY => "translateY",
            Self::Translate => "translate",
            Self::Scale => "scale",
            Self::ScaleX => "scaleX",
            Self::ScaleY => "scaleY",
            Self::Rotate => "rotate",
            Self::SkewX => "skewX",
            Self::SkewY => "skewY",
            Self::Matrix => "matrix",
        }
    }

    /// Look up a function by its CSS name (case-insensitive).
    pub fn from_name(name: &str) -> Result<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|k| k.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| ValueError::UnknownTransform(name.to_string()))
    }

    /// Accepted argument count as `(min, max)`.
    pub fn arity(&self) -> (usize, usize) {
        match self {
            Self::Translate | Self::Scale => (1, 2),
            Self::Matrix => (6, 6),
            _ => (1, 1),
        }
    }

    /// Whether the arguments are lengths (as opposed to numbers or angles).
    pub fn takes_lengths(&self) -> bool {
        matches!(self, Self::TranslateX | Self::TranslateY | Self::Translate)
    }

    /// Build a transform function of this kind from raw argument text.
    pub fn parse_with(&self, args: &[&str]) -> Result<TransformFn> {
        let (min, max) = self.arity();
        if args.len() < min || args.len() > max {
            return Err(ValueError::TransformArity {
                function: self.name(),
                expected: match self {
                    Self::Translate | Self::Scale => "1 or 2",
                    Self::Matrix => "6",
                    _ => "1",
                },
                found: args.len(),
            });
        }

        let function = match self {
            Self::TranslateX => TransformFn::TranslateX {
                x: Length::parse(args[0])?,
            },
            Self::TranslateY => TransformFn::TranslateY {
                y: Length::parse(args[0])?,
            },
            Self::Translate => TransformFn::Translate {
                x: Length::parse(args[0])?,
                y: match args.get(1) {
                    Some(y) => Length::parse(y)?,
                    None => Length::px(0.0),
                },
            },
            Self::Scale => {
                let x = parse_number(args[0])?;
                let y = match args.get(1) {
                    Some(y) => parse_number(y)?,
                    None => x,
                };
                TransformFn::Scale { x, y }
            }
            Self::ScaleX => TransformFn::ScaleX {
                x: parse_number(args[0])?,
            },
            Self::ScaleY => TransformFn::ScaleY {
                y: parse_number(args[0])?,
            },
            Self::Rotate => TransformFn::Rotate {
                deg: parse_angle(args[0])?,
            },
            Self::SkewX => TransformFn::SkewX {
                deg: parse_angle(args[0])?,
            },
            Self::SkewY => TransformFn::SkewY {
                deg: parse_angle(args[0])?,
            },
            Self::Matrix => {
                let mut m = [0.0; 6];
                for (slot, arg) in m.iter_mut().zip(args) {
                    *slot = parse_number(arg)?;
                }
                TransformFn::Matrix(Transform2D {
                    a: m[0],
                    b: m[1],
                    c: m[2],
                    d: m[3],
                    tx: m[4],
                    ty: m[5],
                })
            }
        };
        Ok(function)
    }
}

/// A single transform function with its arguments.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "fn", rename_all = "snake_case")]
pub enum TransformFn {
    TranslateX { x: Length },
    TranslateY { y: Length },
    Translate { x: Length, y: Length },
    Scale { x: f64, y: f64 },
    ScaleX { x: f64 },
    ScaleY { y: f64 },
    /// Rotation in degrees.
    Rotate { deg: f64 },
    SkewX { deg: f64 },
    SkewY { deg: f64 },
    Matrix(Transform2D),
}

impl TransformFn {
    pub fn kind(&self) -> TransformKind {
        match self {
            Self::TranslateX { .. } => TransformKind::TranslateX,
            Self::TranslateY { .. } => TransformKind::TranslateY,
            Self::Translate { .. } => TransformKind::Translate,
            Self::Scale { .. } => TransformKind::Scale,
            Self::ScaleX { .. } => TransformKind::ScaleX,
            Self::ScaleY { .. } => TransformKind::ScaleY,
            Self::Rotate { .. } => TransformKind::Rotate,
            Self::SkewX { .. } => TransformKind::SkewX,
            Self::SkewY { .. } => TransformKind::SkewY,
            Self::Matrix(_) => TransformKind::Matrix,
        }
    }

    /// The neutral function of the same kind, used when one side of an
    /// interpolation is shorter than the other.
    pub fn identity_of(kind: TransformKind) -> Self {
        match kind {
            TransformKind::TranslateX => Self::TranslateX { x: Length::px(0.0) },
            TransformKind::TranslateY => Self::TranslateY { y: Length::px(0.0) },
            TransformKind::Translate => Self::Translate {
                x: Length::px(0.0),
                y: Length::px(0.0),
            },
            TransformKind::Scale => Self::Scale { x: 1.0, y: 1.0 },
            TransformKind::ScaleX => Self::ScaleX { x: 1.0 },
            TransformKind::ScaleY => Self::ScaleY { y: 1.0 },
            TransformKind::Rotate => Self::Rotate { deg: 0.0 },
            TransformKind::SkewX => Self::SkewX { deg: 0.0 },
            TransformKind::SkewY => Self::SkewY { deg: 0.0 },
            TransformKind::Matrix => Self::Matrix(Transform2D::identity()),
        }
    }

    /// Matrix form. Non-pixel translation units are taken at face value.
    pub fn to_matrix(&self) -> Transform2D {
        match *self {
            Self::TranslateX { x } => Transform2D::translate(x.value, 0.0),
            Self::TranslateY { y } => Transform2D::translate(0.0, y.value),
            Self::Translate { x, y } => Transform2D::translate(x.value, y.value),
            Self::Scale { x, y } => Transform2D::scale(x, y),
            Self::ScaleX { x } => Transform2D::scale(x, 1.0),
            Self::ScaleY { y } => Transform2D::scale(1.0, y),
            Self::Rotate { deg } => Transform2D::rotate_deg(deg),
            Self::SkewX { deg } => Transform2D::skew_deg(deg, 0.0),
            Self::SkewY { deg } => Transform2D::skew_deg(0.0, deg),
            Self::Matrix(m) => m,
        }
    }

    /// Interpolate against a function of the same kind.
    fn interpolate_same(&self, to: &Self, t: f64) -> Option<Self> {
        let f = match (*self, *to) {
            (Self::TranslateX { x: a }, Self::TranslateX { x: b }) => Self::TranslateX {
                x: lerp_length(a, b, t)?,
            },
            (Self::TranslateY { y: a }, Self::TranslateY { y: b }) => Self::TranslateY {
                y: lerp_length(a, b, t)?,
            },
            (Self::Translate { x: ax, y: ay }, Self::Translate { x: bx, y: by }) => {
                Self::Translate {
                    x: lerp_length(ax, bx, t)?,
                    y: lerp_length(ay, by, t)?,
                }
            }
            (Self::Scale { x: ax, y: ay }, Self::Scale { x: bx, y: by }) => Self::Scale {
                x: mix(ax, bx, t),
                y: mix(ay, by, t),
            },
            (Self::ScaleX { x: a }, Self::ScaleX { x: b }) => Self::ScaleX { x: mix(a, b, t) },
            (Self::ScaleY { y: a }, Self::ScaleY { y: b }) => Self::ScaleY { y: mix(a, b, t) },
            (Self::Rotate { deg: a }, Self::Rotate { deg: b }) => Self::Rotate {
                deg: mix(a, b, t),
            },
            (Self::SkewX { deg: a }, Self::SkewX { deg: b }) => Self::SkewX {
                deg: mix(a, b, t),
            },
            (Self::SkewY { deg: a }, Self::SkewY { deg: b }) => Self::SkewY {
                deg: mix(a, b, t),
            },
            (Self::Matrix(a), Self::Matrix(b)) => {
                Self::Matrix(a.decompose().interpolate(&b.decompose(), t as f32).to_matrix())
            }
            _ => return None,
        };
        Some(f)
    }
}

fn lerp_length(from: Length, to: Length, t: f64) -> Option<Length> {
    // 0 is unit-agnostic
    let unit = if from.value == 0.0 {
        to.unit
    } else if to.value == 0.0 || from.unit == to.unit {
        from.unit
    } else {
        return None;
    };
    Some(Length {
        value: mix(from.value, to.value, t),
        unit,
    })
}

impl fmt::Display for TransformFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.kind().name();
        match self {
            Self::TranslateX { x } => write!(f, "{}({})", name, x),
            Self::TranslateY { y } => write!(f, "{}({})", name, y),
            Self::Translate { x, y } => write!(f, "{}({}, {})", name, x, y),
            Self::Scale { x, y } if x == y => write!(f, "{}({})", name, x),
            Self::Scale { x, y } => write!(f, "{}({}, {})", name, x, y),
            Self::ScaleX { x } => write!(f, "{}({})", name, x),
            Self::ScaleY { y } => write!(f, "{}({})", name, y),
            Self::Rotate { deg } | Self::SkewX { deg } | Self::SkewY { deg } => {
                write!(f, "{}({}deg)", name, deg)
            }
            Self::Matrix(m) => write!(
                f,
                "{}({}, {}, {}, {}, {}, {})",
                name, m.a, m.b, m.c, m.d, m.tx, m.ty
            ),
        }
    }
}

/// Ordered list of transform functions. Empty means `none`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransformList(pub Vec<TransformFn>);

impl TransformList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn functions(&self) -> &[TransformFn] {
        &self.0
    }

    pub fn push(&mut self, function: TransformFn) {
        self.0.push(function);
    }

    /// Append every function of `other` after this list's functions.
    pub fn concat(&self, other: &TransformList) -> TransformList {
        let mut out = self.0.clone();
        out.extend_from_slice(&other.0);
        TransformList(out)
    }

    /// Parse `none` or a whitespace-separated list of `name(args)` functions.
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim();
        if text.is_empty() || text.eq_ignore_ascii_case("none") {
            return Ok(Self::default());
        }

        let mut list = Vec::new();
        let mut rest = text;
        while !rest.is_empty() {
            let open = rest
                .find('(')
                .ok_or_else(|| ValueError::invalid(text, "transform list"))?;
            let close = rest[open..]
                .find(')')
                .map(|i| open + i)
                .ok_or_else(|| ValueError::invalid(text, "transform list"))?;

            let kind = TransformKind::from_name(&rest[..open])?;
            let args: Vec<&str> = rest[open + 1..close]
                .split(',')
                .map(str::trim)
                .filter(|a| !a.is_empty())
                .collect();
            list.push(kind.parse_with(&args)?);

            rest = rest[close + 1..].trim_start();
        }
        Ok(Self(list))
    }

    /// Compose the whole list into one matrix (functions apply left to right
    /// as in CSS).
    pub fn to_matrix(&self) -> Transform2D {
        self.0
            .iter()
            .fold(Transform2D::identity(), |acc, f| acc.then(&f.to_matrix()))
    }
}

impl fmt::Display for TransformList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("none");
        }
        for (i, function) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", function)?;
        }
        Ok(())
    }
}

impl Interpolate for TransformList {
    fn interpolate(&self, to: &Self, t: f32) -> Self {
        let t64 = t as f64;
        let len = self.0.len().max(to.0.len());

        let pairwise: Option<Vec<TransformFn>> = (0..len)
            .map(|i| {
                let kind = self.0.get(i).or(to.0.get(i)).map(TransformFn::kind)?;
                let a = self.0.get(i).copied().unwrap_or(TransformFn::identity_of(kind));
                let b = to.0.get(i).copied().unwrap_or(TransformFn::identity_of(kind));
                a.interpolate_same(&b, t64)
            })
            .collect();

        match pairwise {
            Some(functions) => TransformList(functions),
            None => {
                let from = self.to_matrix().decompose();
                let to = to.to_matrix().decompose();
                TransformList(vec![TransformFn::Matrix(
                    from.interpolate(&to, t).to_matrix(),
                )])
            }
        }
    }
}

/// A 2D affine transformation matrix.
///
/// Stored as a 3x2 matrix (the bottom row [0, 0, 1] is implicit):
/// ```text
/// | a  c  tx |
/// | b  d  ty |
/// | 0  0  1  |
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform2D {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub tx: f64,
    pub ty: f64,
}

impl Default for Transform2D {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform2D {
    pub fn identity() -> Self {
        Self::translate(0.0, 0.0)
    }

    pub fn translate(tx: f64, ty: f64) -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            tx,
            ty,
        }
    }

    pub fn scale(sx: f64, sy: f64) -> Self {
        Self {
            a: sx,
            b: 0.0,
            c: 0.0,
            d: sy,
            tx: 0.0,
            ty: 0.0,
        }
    }

    pub fn rotate_deg(angle_deg: f64) -> Self {
        let (sin, cos) = angle_deg.to_radians().sin_cos();
        Self {
            a: cos,
            b: sin,
            c: -sin,
            d: cos,
            tx: 0.0,
            ty: 0.0,
        }
    }

    pub fn skew_deg(skew_x_deg: f64, skew_y_deg: f64) -> Self {
        Self {
            a: 1.0,
            b: skew_y_deg.to_radians().tan(),
            c: skew_x_deg.to_radians().tan(),
            d: 1.0,
            tx: 0.0,
            ty: 0.0,
        }
    }

    /// Compose this transform with another (this * other).
    ///
    /// The resulting transform applies `other` first, then `self`.
    pub fn then(&self, other: &Self) -> Self {
        Self {
            a: self.a * other.a + self.c * other.b,
            b: self.b * other.a + self.d * other.b,
            c: self.a * other.c + self.c * other.d,
            d: self.b * other.c + self.d * other.d,
            tx: self.a * other.tx + self.c * other.ty + self.tx,
            ty: self.b * other.tx + self.d * other.ty + self.ty,
        }
    }

    pub fn apply_point(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.a * x + self.c * y + self.tx,
            self.b * x + self.d * y + self.ty,
        )
    }

    /// Decompose into translate, rotate, scale and a residual X skew.
    pub fn decompose(&self) -> DecomposedTransform {
        let scale_x = (self.a * self.a + self.b * self.b).sqrt();
        if scale_x == 0.0 {
            return DecomposedTransform {
                translate_x: self.tx,
                translate_y: self.ty,
                scale_x: 0.0,
                scale_y: (self.c * self.c + self.d * self.d).sqrt(),
                rotate: 0.0,
                skew_x: 0.0,
            };
        }

        let (ux, uy) = (self.a / scale_x, self.b / scale_x);
        // Shear is the projection of the second column onto the first
        let shear = ux * self.c + uy * self.d;
        let (cx, cy) = (self.c - ux * shear, self.d - uy * shear);
        let mut scale_y = (cx * cx + cy * cy).sqrt();
        if self.determinant() < 0.0 {
            scale_y = -scale_y;
        }

        DecomposedTransform {
            translate_x: self.tx,
            translate_y: self.ty,
            scale_x,
            scale_y,
            rotate: uy.atan2(ux),
            skew_x: if scale_y != 0.0 {
                (shear / scale_y).atan()
            } else {
                0.0
            },
        }
    }

    pub fn determinant(&self) -> f64 {
        self.a * self.d - self.b * self.c
    }

    pub fn is_identity(&self, epsilon: f64) -> bool {
        (self.a - 1.0).abs() < epsilon
            && self.b.abs() < epsilon
            && self.c.abs() < epsilon
            && (self.d - 1.0).abs() < epsilon
            && self.tx.abs() < epsilon
            && self.ty.abs() < epsilon
    }
}

/// Decomposed 2D transform components. Angles are in radians.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecomposedTransform {
    pub translate_x: f64,
    pub translate_y: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    pub rotate: f64,
    pub skew_x: f64,
}

impl DecomposedTransform {
    /// Rebuild the matrix as translate * rotate * skewX * scale.
    pub fn to_matrix(&self) -> Transform2D {
        Transform2D::translate(self.translate_x, self.translate_y)
            .then(&Transform2D::rotate_deg(self.rotate.to_degrees()))
            .then(&Transform2D::skew_deg(self.skew_x.to_degrees(), 0.0))
            .then(&Transform2D::scale(self.scale_x, self.scale_y))
    }
}

impl Interpolate for DecomposedTransform {
    fn interpolate(&self, to: &Self, t: f32) -> Self {
        let t = t as f64;
        Self {
            translate_x: mix(self.translate_x, to.translate_x, t),
            translate_y: mix(self.translate_y, to.translate_y, t),
            scale_x: mix(self.scale_x, to.scale_x, t),
            scale_y: mix(self.scale_y, to.scale_y, t),
            rotate: interpolate_angle(self.rotate, to.rotate, t),
            skew_x: mix(self.skew_x, to.skew_x, t),
        }
    }
}

/// Interpolate between two angles, taking the shortest path.
fn interpolate_angle(from: f64, to: f64, t: f64) -> f64 {
    let mut diff = to - from;
    while diff > PI {
        diff -= 2.0 * PI;
    }
    while diff < -PI {
        diff += 2.0 * PI;
    }
    from + diff * t
}

impl From<TransformFn> for TransformList {
    fn from(function: TransformFn) -> Self {
        Self(vec![function])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_parse_list() {
        let list = TransformList::parse("translateX(10px) rotate(0.25turn) scale(2)").unwrap();
        assert_eq!(list.len(), 3);
        assert_eq!(list.functions()[1], TransformFn::Rotate { deg: 90.0 });
        assert_eq!(list.functions()[2], TransformFn::Scale { x: 2.0, y: 2.0 });
        assert_eq!(list.to_string(), "translateX(10px) rotate(90deg) scale(2)");
    }

    #[test]
    fn test_parse_none_and_errors() {
        assert!(TransformList::parse("none").unwrap().is_empty());
        assert!(matches!(
            TransformList::parse("wobble(3)"),
            Err(ValueError::UnknownTransform(_))
        ));
        assert!(matches!(
            TransformList::parse("rotate(1deg, 2deg)"),
            Err(ValueError::TransformArity { found: 2, .. })
        ));
        assert!(TransformList::parse("translateX(10px").is_err());
        assert!(TransformList::parse("translateX(10)").is_err());
    }

    #[test]
    fn test_concat_keeps_order() {
        let a = TransformList::parse("translateX(10px)").unwrap();
        let b = TransformList::parse("rotate(45deg)").unwrap();
        assert_eq!(a.concat(&b).to_string(), "translateX(10px) rotate(45deg)");
        assert_eq!(b.concat(&a).to_string(), "rotate(45deg) translateX(10px)");
    }

    #[test]
    fn test_interpolate_pairwise() {
        let from = TransformList::parse("translateX(0px) rotate(0deg)").unwrap();
        let to = TransformList::parse("translateX(100px) rotate(90deg)").unwrap();
        let mid = from.interpolate(&to, 0.5);
        assert_eq!(mid.to_string(), "translateX(50px) rotate(45deg)");
    }

    #[test]
    fn test_interpolate_from_none() {
        let from = TransformList::new();
        let to = TransformList::parse("scale(3)").unwrap();
        let mid = from.interpolate(&to, 0.5);
        assert_eq!(mid.functions(), &[TransformFn::Scale { x: 2.0, y: 2.0 }]);
    }

    #[test]
    fn test_interpolate_mismatched_falls_back_to_matrix() {
        let from = TransformList::parse("translateX(100px)").unwrap();
        let to = TransformList::parse("rotate(90deg)").unwrap();

        let start = from.interpolate(&to, 0.0);
        assert_eq!(start.len(), 1);
        let (x, y) = start.to_matrix().apply_point(0.0, 0.0);
        assert!(approx_eq(x, 100.0));
        assert!(approx_eq(y, 0.0));

        let end = from.interpolate(&to, 1.0).to_matrix();
        let (x, y) = end.apply_point(1.0, 0.0);
        assert!(approx_eq(x, 0.0));
        assert!(approx_eq(y, 1.0));
    }

    #[test]
    fn test_decompose_roundtrip() {
        let original = Transform2D::translate(50.0, 100.0)
            .then(&Transform2D::rotate_deg(30.0))
            .then(&Transform2D::skew_deg(10.0, 0.0))
            .then(&Transform2D::scale(2.0, 1.5));
        let rebuilt = original.decompose().to_matrix();

        let (ox, oy) = original.apply_point(100.0, 200.0);
        let (rx, ry) = rebuilt.apply_point(100.0, 200.0);
        assert!(approx_eq(ox, rx));
        assert!(approx_eq(oy, ry));
    }

    #[test]
    fn test_composition_order() {
        let t = Transform2D::scale(2.0, 2.0).then(&Transform2D::translate(10.0, 20.0));
        let (x, y) = t.apply_point(0.0, 0.0);
        assert!(approx_eq(x, 20.0));
        assert!(approx_eq(y, 40.0));
    }

    #[test]
    fn test_interpolate_angle_shortest_path() {
        let from = 350f64.to_radians();
        let to = 10f64.to_radians();
        let mid = interpolate_angle(from, to, 0.5).to_degrees();
        let normalized = ((mid % 360.0) + 360.0) % 360.0;
        assert!(normalized < 5.0 || normalized > 355.0);
    }

    #[test]
    fn test_mixed_units_fall_back() {
        let from = TransformList::parse("translateX(10%)").unwrap();
        let to = TransformList::parse("translateX(10px)").unwrap();
        let mid = from.interpolate(&to, 0.5);
        assert_eq!(mid.functions()[0].kind(), TransformKind::Matrix);
    }
}
