use std::fmt;
use std::fmt::{Display, Formatter};

use crate::runner::ds::error::{KosError, KosResult};

pub const TYPE_STR_NULL: &str = "null";
pub const TYPE_STR_BOOLEAN: &str = "boolean";
pub const TYPE_STR_NUMBER: &str = "number";
pub const TYPE_STR_STRING: &str = "string";

/// A value held by a variable slot or passed through a binding.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Number(f64),
    String(String),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => TYPE_STR_NULL,
            Value::Boolean(_) => TYPE_STR_BOOLEAN,
            Value::Number(_) => TYPE_STR_NUMBER,
            Value::String(_) => TYPE_STR_STRING,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            Value::Null => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            Value::Number(n) => Some(*n != 0.0),
            Value::String(s) => match s.trim().to_lowercase().as_str() {
                "true" | "on" => Some(true),
                "false" | "off" => Some(false),
                _ => None,
            },
            Value::Null => None,
        }
    }

    /// Text stored next to [`type_name`](Self::type_name) when the value is
    /// persisted.
    pub fn to_persisted(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Boolean(b) => b.to_string(),
            Value::Number(n) => n.to_string(),
            Value::String(s) => s.clone(),
        }
    }

    pub fn from_persisted(type_name: &str, text: &str) -> KosResult<Value> {
        let invalid = || KosError::InvalidValue {
            key: type_name.to_string(),
            value: text.to_string(),
        };
        match type_name {
            TYPE_STR_NULL => Ok(Value::Null),
            TYPE_STR_BOOLEAN => text.parse::<bool>().map(Value::Boolean).map_err(|_| invalid()),
            TYPE_STR_NUMBER => text.parse::<f64>().map(Value::Number).map_err(|_| invalid()),
            TYPE_STR_STRING => Ok(Value::String(text.to_string())),
            _ => Err(invalid()),
        }
    }

    /// Read a literal typed at a console: `true`/`false`, a number, a
    /// double-quoted string, or anything else as a plain string.
    pub fn parse_literal(text: &str) -> Value {
        let text = text.trim();
        if text.is_empty() || text == TYPE_STR_NULL {
            return Value::Null;
        }
        if let Ok(b) = text.parse::<bool>() {
            return Value::Boolean(b);
        }
        if let Ok(n) = text.parse::<f64>() {
            return Value::Number(n);
        }
        if text.len() >= 2 && text.starts_with('"') && text.ends_with('"') {
            return Value::String(text[1..text.len() - 1].to_string());
        }
        Value::String(text.to_string())
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "{}", TYPE_STR_NULL),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "\"{}\"", s),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persisted_round_trip_per_type() {
        for v in vec![
            Value::Null,
            Value::Boolean(true),
            Value::Number(-12.5),
            Value::String("a b\nc".to_string()),
        ] {
            let back = Value::from_persisted(v.type_name(), &v.to_persisted()).unwrap();
            assert_eq!(back, v);
        }
    }

    #[test]
    fn test_from_persisted_rejects_garbage() {
        assert!(Value::from_persisted("number", "lots").is_err());
        assert!(Value::from_persisted("vector", "1,2,3").is_err());
    }

    #[test]
    fn test_parse_literal() {
        assert_eq!(Value::parse_literal("42"), Value::Number(42.0));
        assert_eq!(Value::parse_literal("false"), Value::Boolean(false));
        assert_eq!(Value::parse_literal("\"kerbin\""), Value::String("kerbin".to_string()));
        assert_eq!(Value::parse_literal("mun"), Value::String("mun".to_string()));
        assert_eq!(Value::parse_literal(""), Value::Null);
    }

    #[test]
    fn test_coercions() {
        assert_eq!(Value::String(" 0.5 ".to_string()).as_number(), Some(0.5));
        assert_eq!(Value::String("on".to_string()).as_bool(), Some(true));
        assert_eq!(Value::Null.as_number(), None);
    }
}
