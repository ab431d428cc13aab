use std::{collections::BTreeMap, fmt};

/// The kind of a parameter [`Value`].
///
/// A [`ParameterSpec`](crate::ParameterSpec) lists the kinds it accepts, so a
/// numeric parameter can take either an integer or a float.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde-derive",
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum Kind {
    Bool,
    Int,
    Float,
    Text,
    Floats,
    Map,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kind::Bool => "bool",
            Kind::Int => "int",
            Kind::Float => "float",
            Kind::Text => "text",
            Kind::Floats => "list of floats",
            Kind::Map => "map of floats",
        };
        f.write_str(name)
    }
}

/// A configuration value assigned to a solver parameter.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde-derive",
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Floats(Vec<f64>),
    Map(BTreeMap<String, f64>),
}

impl Value {
    /// Returns the kind of this value.
    #[must_use]
    pub fn kind(&self) -> Kind {
        match self {
            Value::Bool(_) => Kind::Bool,
            Value::Int(_) => Kind::Int,
            Value::Float(_) => Kind::Float,
            Value::Text(_) => Kind::Text,
            Value::Floats(_) => Kind::Floats,
            Value::Map(_) => Kind::Map,
        }
    }

    /// Returns the value as a float if it is numeric.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(x) => Some(*x),
            _ => None,
        }
    }

    /// Returns the value as a non-negative count if it is a non-negative integer.
    #[must_use]
    pub fn as_usize(&self) -> Option<usize> {
        match self {
            Value::Int(i) => usize::try_from(*i).ok(),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_floats(&self) -> Option<&[f64]> {
        match self {
            Value::Floats(v) => Some(v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_map(&self) -> Option<&BTreeMap<String, f64>> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Compares two values, treating numerically equal ints and floats as equal.
    #[must_use]
    pub fn same_as(&self, other: &Value) -> bool {
        match (self.as_f64(), other.as_f64()) {
            (Some(a), Some(b)) => a == b,
            _ => self == other,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Text(s) => f.write_str(s),
            Value::Floats(v) => {
                f.write_str("[")?;
                for (i, x) in v.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{x}")?;
                }
                f.write_str("]")
            }
            Value::Map(m) => {
                f.write_str("{")?;
                for (i, (k, x)) in m.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{k}: {x}")?;
                }
                f.write_str("}")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Value::Int(i64::try_from(n).unwrap_or(i64::MAX))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<Vec<f64>> for Value {
    fn from(v: Vec<f64>) -> Self {
        Value::Floats(v)
    }
}

impl From<&[f64]> for Value {
    fn from(v: &[f64]) -> Self {
        Value::Floats(v.to_vec())
    }
}

impl From<BTreeMap<String, f64>> for Value {
    fn from(m: BTreeMap<String, f64>) -> Self {
        Value::Map(m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_match_variants() {
        assert_eq!(Value::from(true).kind(), Kind::Bool);
        assert_eq!(Value::from(3).kind(), Kind::Int);
        assert_eq!(Value::from(0.5).kind(), Kind::Float);
        assert_eq!(Value::from("RK4").kind(), Kind::Text);
        assert_eq!(Value::from(vec![1.0]).kind(), Kind::Floats);
        assert_eq!(Value::from(BTreeMap::new()).kind(), Kind::Map);
    }

    #[test]
    fn numeric_accessors() {
        assert_eq!(Value::Int(4).as_f64(), Some(4.0));
        assert_eq!(Value::Int(4).as_usize(), Some(4));
        assert_eq!(Value::Int(-1).as_usize(), None);
        assert_eq!(Value::Float(4.0).as_usize(), None);
        assert_eq!(Value::Text("x".into()).as_f64(), None);
    }

    #[test]
    fn int_and_float_compare_numerically() {
        assert!(Value::Int(0).same_as(&Value::Float(0.0)));
        assert!(!Value::Int(1).same_as(&Value::Float(0.5)));
        assert!(Value::from("RK4").same_as(&Value::from("RK4")));
    }

    #[test]
    fn display_is_compact() {
        assert_eq!(Value::Float(0.0).to_string(), "0");
        assert_eq!(Value::Float(0.25).to_string(), "0.25");
        assert_eq!(Value::from(vec![1.0, 2.5]).to_string(), "[1, 2.5]");

        let mut map = BTreeMap::new();
        map.insert("k".to_owned(), 2.0);
        assert_eq!(Value::Map(map).to_string(), "{k: 2}");
    }
}
