/*!
Attribute values.

Every value read from a provider is converted into [`AttributeValue`]
before any matching happens. Matching and formatting only ever look at
this enum, never at provider-native types.
*/

#![allow(missing_docs)]

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Kind of an [`AttributeValue`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
  String,
  Bool,
  Integer,
  Float,
  List,
  Map,
  Null,
}

/// Normalized attribute value.
///
/// Lists appear for attributes like `AXDOMClassList`, maps for structured
/// values a provider can't express more specifically.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum AttributeValue {
  String(String),
  Bool(bool),
  Integer(i64),
  Float(f64),
  List(Vec<AttributeValue>),
  Map(BTreeMap<String, AttributeValue>),
  #[default]
  Null,
}

impl AttributeValue {
  pub fn as_str(&self) -> Option<&str> {
    match self {
      Self::String(s) => Some(s),
      Self::Bool(_)
      | Self::Integer(_)
      | Self::Float(_)
      | Self::List(_)
      | Self::Map(_)
      | Self::Null => None,
    }
  }

  pub const fn as_bool(&self) -> Option<bool> {
    match self {
      Self::Bool(b) => Some(*b),
      Self::String(_) | Self::Integer(_) | Self::Float(_) | Self::List(_) | Self::Map(_) | Self::Null => {
        None
      }
    }
  }

  /// Get as i64. Floats with no fractional part count as integers.
  #[allow(clippy::cast_possible_truncation)] // Guarded by the fract() check
  pub fn as_i64(&self) -> Option<i64> {
    match self {
      Self::Integer(n) => Some(*n),
      Self::Float(f) if f.is_finite() && f.fract() == 0.0 => Some(*f as i64),
      Self::Float(_) | Self::String(_) | Self::Bool(_) | Self::List(_) | Self::Map(_) | Self::Null => {
        None
      }
    }
  }

  #[allow(clippy::cast_precision_loss)] // Acceptable: attribute integers are small
  pub fn as_f64(&self) -> Option<f64> {
    match self {
      Self::Float(f) => Some(*f),
      Self::Integer(n) => Some(*n as f64),
      Self::String(_) | Self::Bool(_) | Self::List(_) | Self::Map(_) | Self::Null => None,
    }
  }

  pub fn as_list(&self) -> Option<&[Self]> {
    match self {
      Self::List(items) => Some(items),
      Self::String(_) | Self::Bool(_) | Self::Integer(_) | Self::Float(_) | Self::Map(_) | Self::Null => {
        None
      }
    }
  }

  pub const fn as_map(&self) -> Option<&BTreeMap<String, Self>> {
    match self {
      Self::Map(map) => Some(map),
      Self::String(_) | Self::Bool(_) | Self::Integer(_) | Self::Float(_) | Self::List(_) | Self::Null => {
        None
      }
    }
  }

  pub const fn is_null(&self) -> bool {
    matches!(self, Self::Null)
  }

  pub const fn kind(&self) -> ValueKind {
    match self {
      Self::String(_) => ValueKind::String,
      Self::Bool(_) => ValueKind::Bool,
      Self::Integer(_) => ValueKind::Integer,
      Self::Float(_) => ValueKind::Float,
      Self::List(_) => ValueKind::List,
      Self::Map(_) => ValueKind::Map,
      Self::Null => ValueKind::Null,
    }
  }

  /// Interpret the value as a flag.
  ///
  /// Accepts booleans, integers (non-zero is true) and the strings
  /// accepted by [`parse_flag`].
  pub fn as_flag(&self) -> Option<bool> {
    match self {
      Self::Bool(b) => Some(*b),
      Self::Integer(n) => Some(*n != 0),
      Self::String(s) => parse_flag(s),
      Self::Float(_) | Self::List(_) | Self::Map(_) | Self::Null => None,
    }
  }

  /// String representation used for matching.
  ///
  /// Integral floats are written without a decimal point so that `"3"`
  /// matches a slider sitting at `3.0`.
  pub fn to_match_string(&self) -> String {
    self.to_string()
  }
}

/// Parse a boolean written the way people write booleans in locators.
///
/// ```
/// use allio_query::a11y::parse_flag;
///
/// assert_eq!(parse_flag("YES"), Some(true));
/// assert_eq!(parse_flag("0"), Some(false));
/// assert_eq!(parse_flag("maybe"), None);
/// ```
pub fn parse_flag(text: &str) -> Option<bool> {
  match text.trim().to_ascii_lowercase().as_str() {
    "true" | "yes" | "1" => Some(true),
    "false" | "no" | "0" => Some(false),
    _ => None,
  }
}

impl fmt::Display for AttributeValue {
  #[allow(clippy::cast_possible_truncation)] // Intentional: formatting display value
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::String(s) => f.write_str(s),
      Self::Bool(b) => write!(f, "{b}"),
      Self::Integer(n) => write!(f, "{n}"),
      Self::Float(n) => {
        if n.is_finite() && n.fract() == 0.0 {
          write!(f, "{}", *n as i64)
        } else {
          write!(f, "{n}")
        }
      }
      Self::List(items) => {
        f.write_str("[")?;
        for (i, item) in items.iter().enumerate() {
          if i > 0 {
            f.write_str(", ")?;
          }
          write!(f, "{item}")?;
        }
        f.write_str("]")
      }
      Self::Map(map) => {
        f.write_str("{")?;
        for (i, (key, value)) in map.iter().enumerate() {
          if i > 0 {
            f.write_str(", ")?;
          }
          write!(f, "{key}: {value}")?;
        }
        f.write_str("}")
      }
      Self::Null => Ok(()),
    }
  }
}

impl From<String> for AttributeValue {
  fn from(s: String) -> Self {
    Self::String(s)
  }
}

impl From<&str> for AttributeValue {
  fn from(s: &str) -> Self {
    Self::String(s.to_owned())
  }
}

impl From<bool> for AttributeValue {
  fn from(b: bool) -> Self {
    Self::Bool(b)
  }
}

impl From<i64> for AttributeValue {
  fn from(n: i64) -> Self {
    Self::Integer(n)
  }
}

impl From<i32> for AttributeValue {
  fn from(n: i32) -> Self {
    Self::Integer(i64::from(n))
  }
}

impl From<u32> for AttributeValue {
  fn from(n: u32) -> Self {
    Self::Integer(i64::from(n))
  }
}

impl From<f64> for AttributeValue {
  fn from(n: f64) -> Self {
    Self::Float(n)
  }
}

impl<T: Into<Self>> From<Vec<T>> for AttributeValue {
  fn from(items: Vec<T>) -> Self {
    Self::List(items.into_iter().map(Into::into).collect())
  }
}

impl<T: Into<Self>> From<Option<T>> for AttributeValue {
  fn from(value: Option<T>) -> Self {
    value.map_or(Self::Null, Into::into)
  }
}

/// JSON is the native value format of the in-memory provider and of
/// providers that speak JSON.
impl From<serde_json::Value> for AttributeValue {
  fn from(value: serde_json::Value) -> Self {
    use serde_json::Value as Json;
    match value {
      Json::Null => Self::Null,
      Json::Bool(b) => Self::Bool(b),
      Json::Number(n) => n
        .as_i64()
        .map(Self::Integer)
        .or_else(|| n.as_f64().map(Self::Float))
        .unwrap_or(Self::Null),
      Json::String(s) => Self::String(s),
      Json::Array(items) => Self::List(items.into_iter().map(Self::from).collect()),
      Json::Object(map) => Self::Map(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect()),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn string_accessors() {
    let v = AttributeValue::from("hello");
    assert_eq!(v.as_str(), Some("hello"));
    assert_eq!(v.as_f64(), None);
    assert_eq!(v.kind(), ValueKind::String);
  }

  #[test]
  fn number_accessors() {
    let int = AttributeValue::Integer(42);
    assert_eq!(int.as_i64(), Some(42));
    assert_eq!(int.as_f64(), Some(42.0));

    let whole = AttributeValue::Float(3.0);
    assert_eq!(whole.as_i64(), Some(3));

    let float = AttributeValue::Float(3.25);
    assert_eq!(float.as_i64(), None);
  }

  #[test]
  fn match_string_formats() {
    assert_eq!(AttributeValue::from("test").to_match_string(), "test");
    assert_eq!(AttributeValue::Float(42.0).to_match_string(), "42");
    assert_eq!(AttributeValue::Float(3.5).to_match_string(), "3.5");
    assert_eq!(AttributeValue::Bool(true).to_match_string(), "true");
    assert_eq!(AttributeValue::Null.to_match_string(), "");
    assert_eq!(
      AttributeValue::from(vec!["a", "b"]).to_match_string(),
      "[a, b]"
    );
  }

  #[test]
  fn flags() {
    assert_eq!(AttributeValue::Bool(false).as_flag(), Some(false));
    assert_eq!(AttributeValue::Integer(2).as_flag(), Some(true));
    assert_eq!(AttributeValue::from("Yes").as_flag(), Some(true));
    assert_eq!(AttributeValue::from("nope").as_flag(), None);
    assert_eq!(AttributeValue::Null.as_flag(), None);
  }

  #[test]
  fn from_json() {
    let value = AttributeValue::from(json!({
      "classes": ["btn", "primary"],
      "count": 3,
      "ratio": 0.5,
      "ok": true,
      "none": null
    }));
    let map = value.as_map().unwrap();
    assert_eq!(
      map["classes"],
      AttributeValue::List(vec!["btn".into(), "primary".into()])
    );
    assert_eq!(map["count"], AttributeValue::Integer(3));
    assert_eq!(map["ratio"], AttributeValue::Float(0.5));
    assert_eq!(map["ok"], AttributeValue::Bool(true));
    assert!(map["none"].is_null());
  }

  #[test]
  fn serde_is_tagged() {
    let json = serde_json::to_value(AttributeValue::Integer(5)).unwrap();
    assert_eq!(json, json!({ "type": "integer", "value": 5 }));

    let back: AttributeValue = serde_json::from_value(json).unwrap();
    assert_eq!(back, AttributeValue::Integer(5));
  }

  mod edge_cases {
    use super::*;

    #[test]
    fn empty_string() {
      let v = AttributeValue::String(String::new());
      assert_eq!(v.as_str(), Some(""));
      assert!(!v.is_null());
    }

    #[test]
    fn special_floats() {
      assert_eq!(AttributeValue::Float(f64::INFINITY).to_match_string(), "inf");
      assert_eq!(AttributeValue::Float(f64::NAN).as_i64(), None);
    }

    #[test]
    fn option_into_null() {
      let none: Option<&str> = None;
      assert!(AttributeValue::from(none).is_null());
      assert_eq!(AttributeValue::from(Some("x")), AttributeValue::from("x"));
    }

    #[test]
    fn nested_map_display() {
      let value = AttributeValue::from(json!({ "x": 1, "y": [true] }));
      assert_eq!(value.to_match_string(), "{x: 1, y: [true]}");
    }
  }
}
