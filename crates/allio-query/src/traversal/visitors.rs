/*! Visitors used by the search engine. */

use super::{VisitAction, Visitor};
use crate::accessor;
use crate::criteria::CriteriaMatcher;
use crate::provider::ElementHandle;
use crate::types::{Diagnostic, Diagnostics, QueryResult};

/// Finds elements satisfying compiled criteria.
///
/// When a required action is set, an element that matches the criteria but
/// doesn't support the action is a partial match: it is counted, recorded
/// as a diagnostic and never returned, and the walk goes on past it.
#[derive(Debug)]
pub struct SearchVisitor<'d, H> {
  matcher: CriteriaMatcher,
  diagnostics: &'d mut Diagnostics,
  required_action: Option<String>,
  stop_at_first: bool,
  skip_root: bool,
  matches: Vec<H>,
  partial_matches: usize,
}

impl<'d, H: ElementHandle> SearchVisitor<'d, H> {
  /// Visitor that stops at the first full match.
  pub fn new(matcher: CriteriaMatcher, diagnostics: &'d mut Diagnostics) -> Self {
    Self {
      matcher,
      diagnostics,
      required_action: None,
      stop_at_first: true,
      skip_root: false,
      matches: Vec::new(),
      partial_matches: 0,
    }
  }

  #[must_use]
  pub fn required_action(mut self, action: Option<String>) -> Self {
    self.required_action = action;
    self
  }

  /// Keep searching after the first match. Default: stop.
  #[must_use]
  pub fn find_all(mut self) -> Self {
    self.stop_at_first = false;
    self
  }

  /// Don't test the traversal root itself, only its descendants.
  #[must_use]
  pub fn skip_root(mut self) -> Self {
    self.skip_root = true;
    self
  }

  pub fn matches(&self) -> &[H] {
    &self.matches
  }

  pub fn first(&self) -> Option<&H> {
    self.matches.first()
  }

  pub fn into_matches(self) -> Vec<H> {
    self.matches
  }

  /// Elements that matched the criteria but lacked the required action.
  pub const fn partial_matches(&self) -> usize {
    self.partial_matches
  }
}

impl<H: ElementHandle> Visitor<H> for SearchVisitor<'_, H> {
  fn visit(&mut self, element: &H, depth: usize) -> QueryResult<VisitAction> {
    if self.skip_root && depth == 0 {
      return Ok(VisitAction::Continue);
    }
    if !self.matcher.matches(element, self.diagnostics)? {
      return Ok(VisitAction::Continue);
    }

    if let Some(action) = &self.required_action {
      if !accessor::supports_action(element, action)? {
        self.partial_matches += 1;
        self.diagnostics.record(Diagnostic::PartialMatch {
          action: action.clone(),
        });
        return Ok(VisitAction::Continue);
      }
    }

    log::trace!("Match at depth {depth}: {element:?}");
    self.matches.push(element.clone());
    Ok(if self.stop_at_first {
      VisitAction::Stop
    } else {
      VisitAction::Continue
    })
  }
}

/// Collects every element passing an optional filter. Never stops early.
///
/// Provider-ignored elements are left out unless included, but their
/// descendants are still visited. With a required action, elements lacking
/// it are partial matches as in [`SearchVisitor`].
#[derive(Debug)]
pub struct CollectVisitor<'d, H> {
  matcher: Option<CriteriaMatcher>,
  diagnostics: &'d mut Diagnostics,
  include_ignored: bool,
  required_action: Option<String>,
  collected: Vec<H>,
}

impl<'d, H: ElementHandle> CollectVisitor<'d, H> {
  pub fn new(matcher: Option<CriteriaMatcher>, diagnostics: &'d mut Diagnostics) -> Self {
    Self {
      matcher,
      diagnostics,
      include_ignored: false,
      required_action: None,
      collected: Vec::new(),
    }
  }

  #[must_use]
  pub fn include_ignored(mut self, include: bool) -> Self {
    self.include_ignored = include;
    self
  }

  #[must_use]
  pub fn required_action(mut self, action: Option<String>) -> Self {
    self.required_action = action;
    self
  }

  pub fn collected(&self) -> &[H] {
    &self.collected
  }

  pub fn into_collected(self) -> Vec<H> {
    self.collected
  }
}

impl<H: ElementHandle> Visitor<H> for CollectVisitor<'_, H> {
  fn visit(&mut self, element: &H, _depth: usize) -> QueryResult<VisitAction> {
    if !self.include_ignored && accessor::is_ignored(element)? {
      return Ok(VisitAction::Continue);
    }
    if let Some(matcher) = &self.matcher {
      if !matcher.matches(element, self.diagnostics)? {
        return Ok(VisitAction::Continue);
      }
    }
    if let Some(action) = &self.required_action {
      if !accessor::supports_action(element, action)? {
        self.diagnostics.record(Diagnostic::PartialMatch {
          action: action.clone(),
        });
        return Ok(VisitAction::Continue);
      }
    }
    self.collected.push(element.clone());
    Ok(VisitAction::Continue)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::criteria::Criterion;
  use crate::provider::{MemoryElement, MemoryTree, Node};
  use crate::traversal::{traverse, TraversalState};

  fn buttons() -> (MemoryTree, MemoryElement, MemoryElement) {
    let tree = MemoryTree::new(Node::new("AXApplication"));
    let group = tree.append(&tree.root(), Node::new("AXGroup"));
    let plain = tree.append(&group, Node::new("AXButton").title("Go"));
    let pressable = tree.append(&group, Node::new("AXButton").title("Go").action("AXPress"));
    (tree, plain, pressable)
  }

  fn matcher(criteria: &[Criterion]) -> CriteriaMatcher {
    CriteriaMatcher::new(criteria, true).unwrap()
  }

  #[test]
  fn stops_at_first_match() {
    let (tree, plain, _) = buttons();
    let mut diagnostics = Diagnostics::new();
    let mut visitor = SearchVisitor::new(matcher(&[Criterion::exact("role", "AXButton")]), &mut diagnostics);
    let mut state = TraversalState::new(10);

    let result = traverse(&tree.root(), &mut visitor, &mut state).unwrap();
    assert_eq!(result, VisitAction::Stop);
    assert_eq!(visitor.matches(), &[plain]);
  }

  #[test]
  fn find_all_keeps_going() {
    let (tree, plain, pressable) = buttons();
    let mut diagnostics = Diagnostics::new();
    let mut visitor =
      SearchVisitor::new(matcher(&[Criterion::exact("title", "Go")]), &mut diagnostics).find_all();
    traverse(&tree.root(), &mut visitor, &mut TraversalState::new(10)).unwrap();
    assert_eq!(visitor.into_matches(), vec![plain, pressable]);
  }

  #[test]
  fn required_action_skips_partial_matches() {
    let (tree, _, pressable) = buttons();
    let mut diagnostics = Diagnostics::new();
    let mut visitor = SearchVisitor::new(matcher(&[Criterion::exact("title", "Go")]), &mut diagnostics)
      .required_action(Some("AXPress".into()));
    traverse(&tree.root(), &mut visitor, &mut TraversalState::new(10)).unwrap();

    assert_eq!(visitor.first(), Some(&pressable));
    assert_eq!(visitor.partial_matches(), 1);
    drop(visitor);
    assert_eq!(diagnostics.partial_matches(), 1);
  }

  #[test]
  fn skip_root_ignores_anchor() {
    let (tree, ..) = buttons();
    let mut diagnostics = Diagnostics::new();
    let mut visitor = SearchVisitor::new(matcher(&[Criterion::exact("role", "AXApplication")]), &mut diagnostics)
      .skip_root();
    traverse(&tree.root(), &mut visitor, &mut TraversalState::new(10)).unwrap();
    assert!(visitor.matches().is_empty());
  }

  #[test]
  fn collect_excludes_ignored_but_descends() {
    let tree = MemoryTree::new(Node::new("AXApplication"));
    let hidden = tree.append(&tree.root(), Node::new("AXGroup").ignored());
    let inner = tree.append(&hidden, Node::new("AXButton"));

    let mut diagnostics = Diagnostics::new();
    let mut visitor = CollectVisitor::new(None, &mut diagnostics);
    traverse(&tree.root(), &mut visitor, &mut TraversalState::new(10)).unwrap();
    assert_eq!(visitor.collected(), &[tree.root(), inner.clone()]);

    let mut visitor = CollectVisitor::new(None, &mut diagnostics).include_ignored(true);
    traverse(&tree.root(), &mut visitor, &mut TraversalState::new(10)).unwrap();
    assert_eq!(visitor.into_collected(), vec![tree.root(), hidden, inner]);
  }

  #[test]
  fn collect_filters_by_criteria() {
    let (tree, plain, pressable) = buttons();
    let mut diagnostics = Diagnostics::new();
    let mut visitor = CollectVisitor::new(Some(matcher(&[Criterion::exact("role", "AXButton")])), &mut diagnostics);
    let result = traverse(&tree.root(), &mut visitor, &mut TraversalState::new(10)).unwrap();
    assert_eq!(result, VisitAction::Continue);
    assert_eq!(visitor.into_collected(), vec![plain, pressable]);
  }
}
