/*!
Query requests and results.

A [`Query`] bundles a locator with the application to search, an extra
path hint and the mode (first match or collect all). Queries are plain
data and deserialize from JSON, so hosts can forward them unchanged:

```json
{
  "application": "Mail",
  "locator": { "criteria": [{ "attribute": "role", "value": "AXButton" }] },
  "mode": { "kind": "collectAll", "limit": 20 }
}
```
*/

use serde::{Deserialize, Serialize};

use crate::criteria::{Criterion, Locator, PathHint};
use crate::types::{Diagnostics, QueryResult, SearchReport};

/// What a query returns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum QueryMode {
  /// First pre-order match.
  #[default]
  FindFirst,
  /// Every element passing the criteria, optionally capped.
  CollectAll {
    #[serde(default, rename = "includeIgnored")]
    include_ignored: bool,
    #[serde(default)]
    limit: Option<usize>,
  },
}

/// One request to the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Query {
  /// Application identifier. `None` means the focused application.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub application: Option<String>,
  #[serde(default)]
  pub locator: Locator,
  /// Followed after the locator's own root path hint.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub path_hint: Option<PathHint>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub max_depth: Option<usize>,
  #[serde(default)]
  pub mode: QueryMode,
}

impl Query {
  /// Find the first element matching `locator`.
  pub fn find(locator: Locator) -> Self {
    Self {
      locator,
      ..Self::default()
    }
  }

  /// Collect every element matching `locator`.
  pub fn collect(locator: Locator) -> Self {
    Self {
      locator,
      mode: QueryMode::CollectAll {
        include_ignored: false,
        limit: None,
      },
      ..Self::default()
    }
  }

  #[must_use]
  pub fn in_application(mut self, application: impl Into<String>) -> Self {
    self.application = Some(application.into());
    self
  }

  #[must_use]
  pub fn with_path_hint(mut self, hint: PathHint) -> Self {
    self.path_hint = Some(hint);
    self
  }

  #[must_use]
  pub const fn max_depth(mut self, depth: usize) -> Self {
    self.max_depth = Some(depth);
    self
  }

  /// Cap a collect query. No effect on find queries.
  #[must_use]
  pub fn limit(mut self, limit: usize) -> Self {
    if let QueryMode::CollectAll { limit: current, .. } = &mut self.mode {
      *current = Some(limit);
    }
    self
  }

  /// Include provider-ignored elements in a collect query.
  #[must_use]
  pub fn include_ignored(mut self) -> Self {
    if let QueryMode::CollectAll { include_ignored, .. } = &mut self.mode {
      *include_ignored = true;
    }
    self
  }

  pub fn from_json(text: &str) -> QueryResult<Self> {
    Ok(serde_json::from_str(text)?)
  }
}

/// Options for [`SearchEngine::collect_elements`](crate::SearchEngine::collect_elements).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectOptions {
  /// Filter. Empty collects everything.
  pub criteria: Vec<Criterion>,
  pub match_all: bool,
  /// `None` uses the engine's collect depth.
  pub max_depth: Option<usize>,
  pub include_ignored: bool,
  pub limit: Option<usize>,
  /// Only elements supporting this action are collected.
  pub required_action: Option<String>,
}

impl Default for CollectOptions {
  fn default() -> Self {
    Self {
      criteria: Vec::new(),
      match_all: true,
      max_depth: None,
      include_ignored: false,
      limit: None,
      required_action: None,
    }
  }
}

impl CollectOptions {
  pub fn matching(criteria: Vec<Criterion>) -> Self {
    Self {
      criteria,
      ..Self::default()
    }
  }

  #[must_use]
  pub const fn max_depth(mut self, depth: usize) -> Self {
    self.max_depth = Some(depth);
    self
  }

  #[must_use]
  pub const fn include_ignored(mut self, include: bool) -> Self {
    self.include_ignored = include;
    self
  }

  #[must_use]
  pub const fn limit(mut self, limit: usize) -> Self {
    self.limit = Some(limit);
    self
  }

  #[must_use]
  pub const fn match_any(mut self) -> Self {
    self.match_all = false;
    self
  }

  #[must_use]
  pub fn require_action(mut self, action: impl Into<String>) -> Self {
    self.required_action = Some(action.into());
    self
  }
}

/// A single element found by a search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Found<H> {
  pub element: H,
  pub report: SearchReport,
}

/// Elements gathered by a collect query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collected<H> {
  pub elements: Vec<H>,
  pub report: SearchReport,
  /// More elements matched than the limit allowed.
  pub truncated_by_limit: bool,
}

/// Result of [`SearchEngine::run`](crate::SearchEngine::run).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutput<H> {
  Found(Found<H>),
  Collected(Collected<H>),
}

impl<H> QueryOutput<H> {
  pub const fn report(&self) -> &SearchReport {
    match self {
      Self::Found(found) => &found.report,
      Self::Collected(collected) => &collected.report,
    }
  }

  /// The found element, or the first collected one.
  pub fn first(&self) -> Option<&H> {
    match self {
      Self::Found(found) => Some(&found.element),
      Self::Collected(collected) => collected.elements.first(),
    }
  }

  pub fn into_elements(self) -> Vec<H> {
    match self {
      Self::Found(found) => vec![found.element],
      Self::Collected(collected) => collected.elements,
    }
  }
}

/// One slot of a batch: the query's own outcome and diagnostics.
#[derive(Debug)]
pub struct BatchEntry<H> {
  /// Position of the query in the submitted batch.
  pub index: usize,
  pub result: QueryResult<QueryOutput<H>>,
  pub diagnostics: Diagnostics,
}
