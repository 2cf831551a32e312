/*!
Path hint resolution.

Each step searches the descendants of the current anchor (never the anchor
itself) within the step's own depth, and the first pre-order match becomes
the next anchor. When nothing below matches, the anchor is tested against
the step and kept if it matches. Otherwise resolution fails at that step
and no partial anchor is returned.

A leading step that only names the application role matches the root
without consuming a level, so hints recorded from the application element
down work unchanged.

[`PathResolver::candidates`] keeps every match of the final step instead
of the first, so a criteria search can try each in turn.
*/

use crate::criteria::{CriteriaMatcher, PathStep};
use crate::provider::ElementHandle;
use crate::traversal::{clamp_depth, traverse, SearchVisitor, TraversalState};
use crate::types::{Diagnostic, Diagnostics, QueryError, QueryResult};

/// Resolves path hints against a provider tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathResolver {
  depth_ceiling: usize,
}

impl PathResolver {
  /// Resolver clamping step depths to `depth_ceiling`.
  pub const fn new(depth_ceiling: usize) -> Self {
    Self { depth_ceiling }
  }

  /// Follow `steps` from `root`. An empty path resolves to `root`.
  pub fn resolve<H: ElementHandle>(
    &self,
    root: &H,
    steps: &[PathStep],
    diagnostics: &mut Diagnostics,
  ) -> QueryResult<H> {
    let mut anchor = root.clone();
    for (step_index, step) in steps.iter().enumerate() {
      if step_index == 0 && step.is_application_marker() {
        log::debug!("Path step 0 names the application, using root");
        continue;
      }
      anchor = self.resolve_step(&anchor, step_index, step, diagnostics)?;
      log::debug!("Path step {step_index} resolved to {anchor:?}");
    }
    Ok(anchor)
  }

  /// Every element the last of `steps` lands on, in pre-order.
  ///
  /// Leading steps resolve to their first match as in
  /// [`resolve`](Self::resolve). The final step yields all of its matches
  /// below the anchor, or the anchor alone when only the anchor matches.
  /// An empty path yields `root`.
  pub fn candidates<H: ElementHandle>(
    &self,
    root: &H,
    steps: &[PathStep],
    diagnostics: &mut Diagnostics,
  ) -> QueryResult<Vec<H>> {
    let Some((last, leading)) = steps.split_last() else {
      return Ok(vec![root.clone()]);
    };
    let anchor = self.resolve(root, leading, diagnostics)?;
    let step_index = leading.len();
    if step_index == 0 && last.is_application_marker() {
      return Ok(vec![anchor]);
    }

    let found = self.step_matches(&anchor, step_index, last, true, diagnostics)?;
    if found.is_empty() {
      return Err(navigation_failed(step_index, last));
    }
    log::debug!("Path step {step_index} has {} candidate(s)", found.len());
    Ok(found)
  }

  fn resolve_step<H: ElementHandle>(
    &self,
    anchor: &H,
    step_index: usize,
    step: &PathStep,
    diagnostics: &mut Diagnostics,
  ) -> QueryResult<H> {
    self
      .step_matches(anchor, step_index, step, false, diagnostics)?
      .into_iter()
      .next()
      .ok_or_else(|| navigation_failed(step_index, step))
  }

  /// Descendant matches of `step` below `anchor`, else the anchor itself
  /// when it matches. Empty when neither does.
  fn step_matches<H: ElementHandle>(
    &self,
    anchor: &H,
    step_index: usize,
    step: &PathStep,
    all: bool,
    diagnostics: &mut Diagnostics,
  ) -> QueryResult<Vec<H>> {
    let matcher = CriteriaMatcher::new(&step.criteria, step.match_all)?;
    let depth = clamp_depth(step.depth, self.depth_ceiling, diagnostics);

    let mut visitor = SearchVisitor::new(matcher.clone(), diagnostics).skip_root();
    if all {
      visitor = visitor.find_all();
    }
    let mut state = TraversalState::new(depth);
    traverse(anchor, &mut visitor, &mut state)?;
    let found = visitor.into_matches();
    if !found.is_empty() {
      return Ok(found);
    }

    if matcher.matches(anchor, diagnostics)? {
      diagnostics.record(Diagnostic::SelfMatchFallback { step_index });
      return Ok(vec![anchor.clone()]);
    }
    Ok(Vec::new())
  }
}

fn navigation_failed(step_index: usize, step: &PathStep) -> QueryError {
  QueryError::PathNavigationFailed {
    step_index,
    criteria: step.criteria.clone(),
  }
}
