//! Dynamically typed property values.

use serde::Serialize;
use std::fmt;

/// Declared type of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Bool,
    Int,
    UInt,
    Double,
    String,
}

impl TypeTag {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Bool => "gboolean",
            Self::Int => "gint64",
            Self::UInt => "guint64",
            Self::Double => "gdouble",
            Self::String => "gchararray",
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A property value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    UInt(u64),
    Double(f64),
    Str(String),
}

impl Value {
    pub fn type_tag(&self) -> TypeTag {
        match self {
            Self::Bool(_) => TypeTag::Bool,
            Self::Int(_) => TypeTag::Int,
            Self::UInt(_) => TypeTag::UInt,
            Self::Double(_) => TypeTag::Double,
            Self::Str(_) => TypeTag::String,
        }
    }

    /// Parses wire text into a value of the given type.
    pub fn parse(tag: TypeTag, text: &str) -> Option<Value> {
        let text = text.trim();
        match tag {
            TypeTag::Bool => match text.to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => Some(Value::Bool(true)),
                "false" | "0" | "no" => Some(Value::Bool(false)),
                _ => None,
            },
            TypeTag::Int => text.parse().ok().map(Value::Int),
            TypeTag::UInt => text.parse().ok().map(Value::UInt),
            TypeTag::Double => text.parse().ok().map(Value::Double),
            TypeTag::String => Some(Value::Str(text.to_string())),
        }
    }

    /// Converts the value into `tag`, widening numeric types where lossless.
    pub fn coerce(self, tag: TypeTag) -> Option<Value> {
        match (self, tag) {
            (v, t) if v.type_tag() == t => Some(v),
            (Value::Int(i), TypeTag::UInt) => u64::try_from(i).ok().map(Value::UInt),
            (Value::UInt(u), TypeTag::Int) => i64::try_from(u).ok().map(Value::Int),
            (Value::Int(i), TypeTag::Double) => Some(Value::Double(i as f64)),
            (Value::UInt(u), TypeTag::Double) => Some(Value::Double(u as f64)),
            (Value::Str(s), t) => Value::parse(t, &s),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::UInt(u) => write!(f, "{u}"),
            Self::Double(d) => write!(f, "{d}"),
            Self::Str(s) => write!(f, "\"{s}\""),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Self::UInt(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_by_tag() {
        assert_eq!(Value::parse(TypeTag::Bool, "TRUE"), Some(Value::Bool(true)));
        assert_eq!(Value::parse(TypeTag::UInt, "42"), Some(Value::UInt(42)));
        assert_eq!(Value::parse(TypeTag::UInt, "-1"), None);
        assert_eq!(Value::parse(TypeTag::Double, "0.5"), Some(Value::Double(0.5)));
        assert_eq!(Value::parse(TypeTag::String, " playing "), Some("playing".into()));
    }

    #[test]
    fn test_coerce() {
        assert_eq!(Value::Int(3).coerce(TypeTag::UInt), Some(Value::UInt(3)));
        assert_eq!(Value::Int(-3).coerce(TypeTag::UInt), None);
        assert_eq!(Value::from("7").coerce(TypeTag::Int), Some(Value::Int(7)));
        assert_eq!(Value::Bool(true).coerce(TypeTag::Int), None);
    }

    #[test]
    fn test_display_is_human_readable() {
        assert_eq!(Value::from("null").to_string(), "\"null\"");
        assert_eq!(Value::UInt(20).to_string(), "20");
    }
}
