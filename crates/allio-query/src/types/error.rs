/*! Error types for query operations. */

use crate::criteria::{describe_criteria, Criterion};

/// Failures reported by an accessibility provider.
///
/// These are the only errors that escape matching: a missing attribute is a
/// normal "no match", an invalidated handle is not.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
  #[error("Element is no longer valid")]
  InvalidElement,

  #[error("Provider did not respond in time")]
  Timeout,

  #[error("Provider call failed: {0}")]
  Failed(String),
}

/// Result type for provider calls.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Errors that can occur while resolving, searching or acting on elements.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
  #[error("Application not found: {0}")]
  ApplicationNotFound(String),

  #[error("Path navigation failed at step {step_index}: nothing matched {}", describe_criteria(.criteria))]
  PathNavigationFailed {
    step_index: usize,
    criteria: Vec<Criterion>,
  },

  #[error("Locator has neither criteria nor a path hint")]
  NoCriteriaOrPath,

  #[error("No element matched {}{}", describe_criteria(.criteria), depth_note(.depth_limit_reached))]
  NoMatchFound {
    criteria: Vec<Criterion>,
    /// The search hit its depth limit somewhere, so a deeper match may exist.
    depth_limit_reached: bool,
  },

  #[error("Element found but it does not support action '{action}'")]
  RequiredActionMissing { action: String },

  #[error("Attribute not readable: {0}")]
  AttributeNotReadable(String),

  #[error("Attribute not settable: {0}")]
  AttributeNotSettable(String),

  #[error("Action not supported: {0}")]
  ActionUnsupported(String),

  #[error("Invalid pattern '{pattern}': {reason}")]
  InvalidPattern { pattern: String, reason: String },

  #[error("Invalid locator: {0}")]
  InvalidLocator(#[from] serde_json::Error),

  #[error("Provider unavailable: {0}")]
  ProviderUnavailable(#[from] ProviderError),
}

impl QueryError {
  /// True for outcomes that mean "the element isn't there" rather than
  /// a broken request or provider.
  pub const fn is_not_found(&self) -> bool {
    matches!(
      self,
      Self::ApplicationNotFound(_)
        | Self::PathNavigationFailed { .. }
        | Self::NoMatchFound { .. }
        | Self::RequiredActionMissing { .. }
    )
  }
}

#[allow(clippy::trivially_copy_pass_by_ref)] // thiserror passes fields by reference
const fn depth_note(depth_limit_reached: &bool) -> &'static str {
  if *depth_limit_reached {
    " (search depth limit reached)"
  } else {
    ""
  }
}

/// Result type for query operations.
pub type QueryResult<T> = Result<T, QueryError>;
