use serde::{Deserialize, Serialize};

/// Declared type of an attribute value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    String,
    Integer,
    Real,
    Boolean,
    List,
}

impl ValueType {
    /// Map a declared `type` tag to a value type.
    ///
    /// Accepts the canonical tags plus the common aliases found in network
    /// exchange files (`int`, `double`, `float`, `bool`).
    ///
    /// ```
    /// use tempograph_types::value::ValueType;
    ///
    /// assert_eq!(ValueType::from_tag("double"), Some(ValueType::Real));
    /// assert_eq!(ValueType::from_tag("Boolean"), Some(ValueType::Boolean));
    /// assert_eq!(ValueType::from_tag("blob"), None);
    /// ```
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "string" | "str" => Some(Self::String),
            "integer" | "int" | "long" => Some(Self::Integer),
            "real" | "double" | "float" => Some(Self::Real),
            "boolean" | "bool" => Some(Self::Boolean),
            "list" => Some(Self::List),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Real => "real",
            Self::Boolean => "boolean",
            Self::List => "list",
        }
    }
}

impl std::fmt::Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum AttrValue {
    String(String),
    Integer(i64),
    Real(f64),
    Boolean(bool),
    List(Vec<String>),
}

impl AttrValue {
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::String(_) => ValueType::String,
            Self::Integer(_) => ValueType::Integer,
            Self::Real(_) => ValueType::Real,
            Self::Boolean(_) => ValueType::Boolean,
            Self::List(_) => ValueType::List,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric view of the value; integers widen to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(i) => Some(*i as f64),
            Self::Real(r) => Some(*r),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }
}

impl std::fmt::Display for AttrValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::String(s) => f.write_str(s),
            Self::Integer(i) => write!(f, "{}", i),
            Self::Real(r) => write!(f, "{}", r),
            Self::Boolean(b) => write!(f, "{}", b),
            Self::List(items) => write!(f, "[{}]", items.join(", ")),
        }
    }
}
