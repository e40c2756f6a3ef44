//! Dynamic setter arguments.
//!
//! `Chain::invoke` takes `&[Arg]` so actions, options and plugins can share
//! one dispatch path. The typed convenience methods on `Chain` build these
//! for you.

use std::fmt;
use std::rc::Rc;

use crate::target::RenderTarget;

/// Function evaluated once per target, receiving `(index, target)`.
pub type EachFn = Rc<dyn Fn(usize, &dyn RenderTarget) -> Arg>;

/// A single setter argument.
#[derive(Clone)]
pub enum Arg {
    Number(f64),
    Text(String),
    /// Property name to value pairs, as taken by `from` and `to`.
    Map(Vec<(String, Arg)>),
    /// One value per target index.
    List(Vec<Arg>),
    /// One value per target index, computed from the target.
    Each(EachFn),
}

impl Arg {
    /// Wrap a per-target function.
    pub fn each<F>(f: F) -> Self
    where
        F: Fn(usize, &dyn RenderTarget) -> Arg + 'static,
    {
        Self::Each(Rc::new(f))
    }

    /// Build a property map from `(name, value)` pairs.
    pub fn map<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<Arg>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Short name of the argument kind, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Number(_) => "number",
            Self::Text(_) => "string",
            Self::Map(_) => "map",
            Self::List(_) => "list",
            Self::Each(_) => "function",
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Debug for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s:?}"),
            Self::Map(entries) => f
                .debug_map()
                .entries(entries.iter().map(|(k, v)| (k, v)))
                .finish(),
            Self::List(items) => f.debug_list().entries(items).finish(),
            Self::Each(_) => f.write_str("<per-target fn>"),
        }
    }
}

impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
            other => write!(f, "{other:?}"),
        }
    }
}

impl From<f64> for Arg {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<f32> for Arg {
    fn from(value: f32) -> Self {
        Self::Number(value as f64)
    }
}

impl From<i32> for Arg {
    fn from(value: i32) -> Self {
        Self::Number(value as f64)
    }
}

impl From<u32> for Arg {
    fn from(value: u32) -> Self {
        Self::Number(value as f64)
    }
}

impl From<&str> for Arg {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Arg {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl<T: Into<Arg>> From<Vec<T>> for Arg {
    fn from(values: Vec<T>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

impl<K: Into<String>, V: Into<Arg>, const N: usize> From<[(K, V); N]> for Arg {
    fn from(entries: [(K, V); N]) -> Self {
        Self::map(entries)
    }
}
