/*! Engine configuration. */

use serde::{Deserialize, Serialize};

/// Default depth for criteria searches.
pub const DEFAULT_SEARCH_DEPTH: usize = 10;
/// Default depth for collect-all queries.
pub const DEFAULT_COLLECT_DEPTH: usize = 10;
/// Hard limit on any requested depth.
pub const DEFAULT_DEPTH_CEILING: usize = 64;

/// Depth bounds used by a [`SearchEngine`](crate::SearchEngine).
///
/// Loadable from JSON; missing fields take their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
  pub search_depth: usize,
  pub collect_depth: usize,
  /// Requested depths above this are clamped to it.
  pub depth_ceiling: usize,
}

impl Default for EngineConfig {
  fn default() -> Self {
    Self {
      search_depth: DEFAULT_SEARCH_DEPTH,
      collect_depth: DEFAULT_COLLECT_DEPTH,
      depth_ceiling: DEFAULT_DEPTH_CEILING,
    }
  }
}

/// Builder for configuring a [`SearchEngine`](crate::SearchEngine).
///
/// # Example
///
/// ```
/// use allio_query::SearchEngine;
///
/// let engine = SearchEngine::builder()
///   .search_depth(6)
///   .depth_ceiling(32)
///   .build();
/// assert_eq!(engine.config().search_depth, 6);
/// ```
#[derive(Debug, Default, Clone, Copy)]
#[must_use = "Builder does nothing until .build() is called"]
pub struct EngineBuilder {
  config: EngineConfig,
}

impl EngineBuilder {
  /// Depth used when a find names none. Default: 10.
  pub const fn search_depth(mut self, depth: usize) -> Self {
    self.config.search_depth = depth;
    self
  }

  /// Depth used when a collect names none. Default: 10.
  pub const fn collect_depth(mut self, depth: usize) -> Self {
    self.config.collect_depth = depth;
    self
  }

  /// Upper bound for every depth, including path steps. Default: 64.
  pub const fn depth_ceiling(mut self, ceiling: usize) -> Self {
    self.config.depth_ceiling = ceiling;
    self
  }

  pub const fn config(mut self, config: EngineConfig) -> Self {
    self.config = config;
    self
  }

  pub const fn build(self) -> super::SearchEngine {
    super::SearchEngine::with_config(self.config)
  }
}
