/*!
Query diagnostics and result metadata.

A [`Diagnostics`] value is created by the caller and passed down through
path resolution, traversal and matching. It is the record of everything
notable that happened during one query (partial matches, truncated
branches, fallbacks) and it survives failures, so a `NoMatchFound` can
still be explained. Entries are mirrored to the `log` facade at debug level.
*/

use derive_more::Display;
use serde::Serialize;
use ts_rs::TS;

/// Something notable that happened during a query.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum Diagnostic {
  /// A structural attribute (role, process id) was absent on `count` visited elements.
  #[display("structural attribute '{attribute}' missing on {count} visited element(s)")]
  StructuralAttributeMissing { attribute: String, count: usize },

  /// An element matched every criterion but lacks the required action.
  #[display("element matched criteria but does not support '{action}'")]
  PartialMatch { action: String },

  /// No descendant matched a path step; the current anchor matched it instead.
  #[display("path step {step_index} resolved to the current anchor")]
  SelfMatchFallback { step_index: usize },

  /// Elements at the depth limit were not expanded.
  #[display("depth limit {max_depth} reached, deeper elements not searched")]
  DepthLimitReached { max_depth: usize },

  /// Requested depth was above the engine ceiling and was clamped.
  #[display("requested depth {requested} exceeds ceiling {ceiling}, clamped")]
  MaxDepthExceeded { requested: usize, ceiling: usize },

  /// Elements already visited were reached again through another edge.
  #[display("{count} element(s) reached twice, branch skipped")]
  CycleSkipped { count: usize },
}

/// Diagnostics collected for one query.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Diagnostics {
  entries: Vec<Diagnostic>,
}

impl Diagnostics {
  /// Create an empty record.
  pub const fn new() -> Self {
    Self {
      entries: Vec::new(),
    }
  }

  /// Record a diagnostic.
  pub fn record(&mut self, diagnostic: Diagnostic) {
    log::debug!("[query] {diagnostic}");
    self.entries.push(diagnostic);
  }

  /// Count one visited element lacking a structural attribute.
  ///
  /// Each attribute keeps a single entry whose count grows.
  pub fn record_missing_structural(&mut self, attribute: &str) {
    for entry in &mut self.entries {
      if let Diagnostic::StructuralAttributeMissing {
        attribute: existing,
        count,
      } = entry
      {
        if existing.as_str() == attribute {
          *count += 1;
          return;
        }
      }
    }
    self.record(Diagnostic::StructuralAttributeMissing {
      attribute: attribute.to_owned(),
      count: 1,
    });
  }

  /// Recorded entries, in order.
  pub fn entries(&self) -> &[Diagnostic] {
    &self.entries
  }

  /// Whether nothing was recorded.
  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Number of recorded entries.
  pub fn len(&self) -> usize {
    self.entries.len()
  }

  /// Number of partial (action-less) matches recorded.
  pub fn partial_matches(&self) -> usize {
    self
      .entries
      .iter()
      .filter(|d| matches!(d, Diagnostic::PartialMatch { .. }))
      .count()
  }

  /// Whether any recorded entry satisfies `predicate`.
  pub fn any(&self, predicate: impl Fn(&Diagnostic) -> bool) -> bool {
    self.entries.iter().any(predicate)
  }

  /// Take the recorded entries.
  pub fn into_entries(self) -> Vec<Diagnostic> {
    self.entries
  }
}

/// Metadata describing how a search went.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SearchReport {
  /// Depth bound used for the criteria search (0 when no search ran).
  pub max_depth: usize,
  /// Elements handed to the visitor.
  pub visited: usize,
  /// Elements reached again through a cycle or shared child.
  pub cycles_skipped: usize,
  /// Whether some element at the depth bound was left unexpanded.
  pub depth_limit_reached: bool,
  /// Elements that matched but lacked the required action.
  pub partial_matches: usize,
}

impl SearchReport {
  /// Fold the counters of another traversal into this one.
  pub fn absorb(&mut self, other: Self) {
    self.max_depth = self.max_depth.max(other.max_depth);
    self.visited += other.visited;
    self.cycles_skipped += other.cycles_skipped;
    self.depth_limit_reached |= other.depth_limit_reached;
    self.partial_matches += other.partial_matches;
  }

  /// Record depth truncation and skipped cycles, if any.
  pub fn record_into(&self, diagnostics: &mut Diagnostics) {
    if self.depth_limit_reached {
      diagnostics.record(Diagnostic::DepthLimitReached {
        max_depth: self.max_depth,
      });
    }
    if self.cycles_skipped > 0 {
      diagnostics.record(Diagnostic::CycleSkipped {
        count: self.cycles_skipped,
      });
    }
  }
}
