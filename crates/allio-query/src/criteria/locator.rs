/*!
Locators and path hints.

Wire format (JSON):

```json
{
  "criteria": [{ "attribute": "role", "value": "AXButton", "match_type": "exact" }],
  "matchAll": true,
  "rootElementPathHint": [{ "attribute": "role", "value": "AXWindow", "depth": 1 }],
  "requireAction": "AXPress"
}
```

A path step is either the short single-criterion form above or the full
form `{ "criteria": [...], "matchAll": true, "depth": 3 }`.
*/

use serde::{Deserialize, Serialize};

use super::criterion::{Criterion, MatchType};
use crate::a11y::{roles, AttributeKey};
use crate::types::QueryResult;

/// Default search depth for one path step.
pub const DEFAULT_STEP_DEPTH: usize = 3;

const fn default_step_depth() -> usize {
  DEFAULT_STEP_DEPTH
}

const fn default_true() -> bool {
  true
}

/// One step of a path hint: the criteria a descendant of the current
/// anchor must satisfy, searched no deeper than `depth` levels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "PathStepRepr")]
pub struct PathStep {
  pub criteria: Vec<Criterion>,
  #[serde(rename = "matchAll")]
  pub match_all: bool,
  pub depth: usize,
}

/// Ordered path steps, each resolved from the previous step's result.
pub type PathHint = Vec<PathStep>;

impl PathStep {
  /// Step requiring every criterion, at the default depth.
  pub fn new(criteria: Vec<Criterion>) -> Self {
    Self {
      criteria,
      match_all: true,
      depth: DEFAULT_STEP_DEPTH,
    }
  }

  /// Step with a single criterion.
  pub fn single(criterion: Criterion) -> Self {
    Self::new(vec![criterion])
  }

  #[must_use]
  pub const fn with_depth(mut self, depth: usize) -> Self {
    self.depth = depth;
    self
  }

  /// Require any criterion instead of all of them.
  #[must_use]
  pub const fn match_any(mut self) -> Self {
    self.match_all = false;
    self
  }

  /// Whether this step names the application element itself
  /// (every criterion is an exact role test for `AXApplication`).
  pub fn is_application_marker(&self) -> bool {
    !self.criteria.is_empty()
      && self.criteria.iter().all(|c| {
        c.match_type == MatchType::Exact
          && AttributeKey::parse(&c.attribute) == AttributeKey::Role
          && (c.value == roles::APPLICATION || c.value.eq_ignore_ascii_case("application"))
      })
  }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PathStepRepr {
  Full {
    criteria: Vec<Criterion>,
    #[serde(default = "default_true", rename = "matchAll")]
    match_all: bool,
    #[serde(default = "default_step_depth")]
    depth: usize,
  },
  Single {
    attribute: String,
    value: String,
    #[serde(default, alias = "matchType")]
    match_type: MatchType,
    #[serde(default = "default_step_depth")]
    depth: usize,
  },
}

impl From<PathStepRepr> for PathStep {
  fn from(repr: PathStepRepr) -> Self {
    match repr {
      PathStepRepr::Full {
        criteria,
        match_all,
        depth,
      } => Self {
        criteria,
        match_all,
        depth,
      },
      PathStepRepr::Single {
        attribute,
        value,
        match_type,
        depth,
      } => Self::single(Criterion::new(attribute, value, match_type)).with_depth(depth),
    }
  }
}

/// Full description of the element to find.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Locator {
  #[serde(default)]
  pub criteria: Vec<Criterion>,
  /// All criteria must match (true) or any one (false).
  #[serde(default = "default_true")]
  pub match_all: bool,
  /// Navigation from the application root before the criteria search.
  #[serde(
    default,
    rename = "rootElementPathHint",
    alias = "pathHint",
    skip_serializing_if = "Option::is_none"
  )]
  pub root_path_hint: Option<PathHint>,
  /// Action a match must support to count.
  #[serde(
    default,
    rename = "requireAction",
    alias = "requiredAction",
    skip_serializing_if = "Option::is_none"
  )]
  pub required_action: Option<String>,
}

impl Default for Locator {
  fn default() -> Self {
    Self::new(Vec::new())
  }
}

impl Locator {
  pub const fn new(criteria: Vec<Criterion>) -> Self {
    Self {
      criteria,
      match_all: true,
      root_path_hint: None,
      required_action: None,
    }
  }

  /// Locator that only navigates a path.
  pub fn path(hint: PathHint) -> Self {
    Self::new(Vec::new()).with_root_path(hint)
  }

  #[must_use]
  pub fn with_root_path(mut self, hint: PathHint) -> Self {
    self.root_path_hint = Some(hint);
    self
  }

  #[must_use]
  pub fn require_action(mut self, action: impl Into<String>) -> Self {
    self.required_action = Some(action.into());
    self
  }

  #[must_use]
  pub fn match_any(mut self) -> Self {
    self.match_all = false;
    self
  }

  /// The root path hint, if present and non-empty.
  pub fn path_hint(&self) -> Option<&[PathStep]> {
    self
      .root_path_hint
      .as_deref()
      .filter(|steps| !steps.is_empty())
  }

  /// Parse the JSON wire format.
  pub fn from_json(text: &str) -> QueryResult<Self> {
    Ok(serde_json::from_str(text)?)
  }

  pub fn to_json(&self) -> QueryResult<String> {
    Ok(serde_json::to_string(self)?)
  }
}
