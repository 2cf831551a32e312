/*! A single attribute test. */

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

/// How the expected value is compared with the actual one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub enum MatchType {
  /// Case-sensitive equality.
  #[default]
  Exact,
  /// Case-insensitive substring.
  Contains,
  /// Regular expression, found anywhere in the value.
  Regex,
  /// Case-sensitive prefix.
  Prefix,
  /// Case-sensitive suffix.
  Suffix,
  /// Comma-separated fragments, any of which is a case-insensitive substring.
  #[serde(alias = "contains_any")]
  ContainsAny,
}

impl MatchType {
  /// All match types.
  pub const ALL: &'static [Self] = &[
    Self::Exact,
    Self::Contains,
    Self::Regex,
    Self::Prefix,
    Self::Suffix,
    Self::ContainsAny,
  ];

  /// Wire name.
  pub const fn as_str(&self) -> &'static str {
    match self {
      Self::Exact => "exact",
      Self::Contains => "contains",
      Self::Regex => "regex",
      Self::Prefix => "prefix",
      Self::Suffix => "suffix",
      Self::ContainsAny => "containsAny",
    }
  }
}

impl fmt::Display for MatchType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Error parsing a [`MatchType`] from text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown match type: {0}")]
pub struct UnknownMatchType(pub String);

impl FromStr for MatchType {
  type Err = UnknownMatchType;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let normalized: String = s
      .chars()
      .filter(|c| *c != '_' && *c != '-')
      .collect::<String>()
      .to_ascii_lowercase();
    Self::ALL
      .iter()
      .copied()
      .find(|m| m.as_str().eq_ignore_ascii_case(&normalized))
      .ok_or_else(|| UnknownMatchType(s.to_owned()))
  }
}

/// One attribute test: attribute name, expected value, match type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Criterion {
  /// Attribute name, aliases allowed ("role", "title", "AXIdentifier", ...).
  pub attribute: String,
  /// Expected value, as text.
  pub value: String,
  #[serde(default, alias = "matchType")]
  pub match_type: MatchType,
}

impl Criterion {
  pub fn new(attribute: impl Into<String>, value: impl Into<String>, match_type: MatchType) -> Self {
    Self {
      attribute: attribute.into(),
      value: value.into(),
      match_type,
    }
  }

  pub fn exact(attribute: impl Into<String>, value: impl Into<String>) -> Self {
    Self::new(attribute, value, MatchType::Exact)
  }

  pub fn contains(attribute: impl Into<String>, value: impl Into<String>) -> Self {
    Self::new(attribute, value, MatchType::Contains)
  }

  pub fn regex(attribute: impl Into<String>, pattern: impl Into<String>) -> Self {
    Self::new(attribute, pattern, MatchType::Regex)
  }

  pub fn prefix(attribute: impl Into<String>, value: impl Into<String>) -> Self {
    Self::new(attribute, value, MatchType::Prefix)
  }

  pub fn suffix(attribute: impl Into<String>, value: impl Into<String>) -> Self {
    Self::new(attribute, value, MatchType::Suffix)
  }

  /// `fragments` is comma-separated.
  pub fn contains_any(attribute: impl Into<String>, fragments: impl Into<String>) -> Self {
    Self::new(attribute, fragments, MatchType::ContainsAny)
  }
}

impl fmt::Display for Criterion {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} {} {:?}", self.attribute, self.match_type, self.value)
  }
}

/// Human-readable list of criteria for error messages.
pub fn describe_criteria(criteria: &[Criterion]) -> String {
  if criteria.is_empty() {
    return "(no criteria)".to_owned();
  }
  criteria
    .iter()
    .map(ToString::to_string)
    .collect::<Vec<_>>()
    .join(" and ")
}
