use std::fmt;
use std::time::Duration;

use url::Url;

use crate::infer::format_duration;

/// The scalar kinds a declaration value can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Kind {
    Int,
    Uint,
    Float,
    Bool,
    Duration,
    Url,
    String,
    StringList,
}

impl Kind {
    pub fn type_name(self) -> &'static str {
        match self {
            Kind::Int => "int",
            Kind::Uint => "uint",
            Kind::Float => "float",
            Kind::Bool => "bool",
            Kind::Duration => "duration",
            Kind::Url => "url",
            Kind::String => "string",
            Kind::StringList => "string list",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// A typed declaration value. The variant is fixed once inference picks it.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Uint(u64),
    Float(f64),
    Bool(bool),
    Duration(Duration),
    /// `None` is the empty URL.
    Url(Option<Url>),
    String(String),
    /// Comma separated list. Only produced by registry declarations, never by inference.
    StringList(Vec<String>),
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Value::Uint(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<Duration> for Value {
    fn from(value: Duration) -> Self {
        Value::Duration(value)
    }
}

impl From<Url> for Value {
    fn from(value: Url) -> Self {
        Value::Url(Some(value))
    }
}

impl From<Option<Url>> for Value {
    fn from(value: Option<Url>) -> Self {
        Value::Url(value)
    }
}

impl From<Vec<String>> for Value {
    fn from(values: Vec<String>) -> Self {
        Value::StringList(values)
    }
}

impl Value {
    pub fn kind(&self) -> Kind {
        match self {
            Value::Int(_) => Kind::Int,
            Value::Uint(_) => Kind::Uint,
            Value::Float(_) => Kind::Float,
            Value::Bool(_) => Kind::Bool,
            Value::Duration(_) => Kind::Duration,
            Value::Url(_) => Kind::Url,
            Value::String(_) => Kind::String,
            Value::StringList(_) => Kind::StringList,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.kind().type_name()
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::Uint(n) => Some(*n),
            Value::Int(n) if *n >= 0 => Some(*n as u64),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_duration(&self) -> Option<Duration> {
        match self {
            Value::Duration(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_url(&self) -> Option<&Url> {
        match self {
            Value::Url(url) => url.as_ref(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// True when the value equals its kind's empty sentinel.
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Int(n) => *n == 0,
            Value::Uint(n) => *n == 0,
            Value::Float(f) => *f == 0.0,
            Value::Bool(_) => false,
            Value::Duration(d) => d.is_zero(),
            Value::Url(url) => url.is_none(),
            Value::String(s) => s.is_empty(),
            Value::StringList(items) => items.is_empty(),
        }
    }

    /// Render the value as text that infers back to an equal value.
    pub fn render(&self) -> String {
        match self {
            Value::Int(n) => n.to_string(),
            Value::Uint(n) => n.to_string(),
            // Debug keeps a `.0` or exponent so whole floats do not come back as integers.
            Value::Float(f) => format!("{f:?}"),
            Value::Bool(b) => b.to_string(),
            Value::Duration(d) => format_duration(*d),
            Value::Url(Some(url)) => url.as_str().to_string(),
            Value::Url(None) => String::new(),
            Value::String(s) => s.clone(),
            Value::StringList(items) => items.join(","),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
