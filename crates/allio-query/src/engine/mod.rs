/*!
Search engine - turns locators and queries into elements.

A find goes through these stages, any of which can fail:

1. root: the application element, from an [`ApplicationResolver`]
2. anchors: the locator's root path hint, then the query's own path hint
3. search: pre-order criteria search from each anchor, anchor included

Every step of the hints but the last commits to its first match. The last
step keeps all of its matches as candidate anchors, searched in pre-order
until one holds a match. With no criteria, the first anchor is the result.
Collect queries share stages 1 and 2 and then gather every passing
element instead of the first.

# Module Structure

- `mod.rs` - [`SearchEngine`] and its operations
- `config.rs` - [`EngineConfig`] and [`EngineBuilder`]
- `query.rs` - [`Query`], [`CollectOptions`] and result types

# Example

```
use allio_query::provider::{MemoryTree, Node};
use allio_query::{Criterion, Diagnostics, Locator, SearchEngine};

let tree = MemoryTree::new(Node::new("AXApplication").title("Notes"));
let window = tree.append(&tree.root(), Node::new("AXWindow"));
let save = tree.append(&window, Node::new("AXButton").title("Save").action("AXPress"));

let engine = SearchEngine::new();
let locator = Locator::new(vec![Criterion::exact("title", "Save")]).require_action("AXPress");
let found = engine
  .find_element(&tree.root(), &locator, None, &mut Diagnostics::new())
  .unwrap();
assert_eq!(found.element, save);
```
*/

mod config;
mod query;

pub use config::{
  EngineBuilder, EngineConfig, DEFAULT_COLLECT_DEPTH, DEFAULT_DEPTH_CEILING, DEFAULT_SEARCH_DEPTH,
};
pub use query::{BatchEntry, CollectOptions, Collected, Found, Query, QueryMode, QueryOutput};

use crate::a11y::AttributeValue;
use crate::accessor;
use crate::criteria::{CriteriaMatcher, Locator, PathStep};
use crate::path::PathResolver;
use crate::provider::{ApplicationResolver, ElementHandle};
use crate::traversal::{clamp_depth, traverse, CollectVisitor, SearchVisitor, TraversalState};
use crate::types::{Diagnostics, QueryError, QueryResult, SearchReport};

/// Locator search over provider trees.
///
/// Holds only configuration; every call owns its own traversal state, so
/// one engine can serve any number of queries.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SearchEngine {
  config: EngineConfig,
}

impl SearchEngine {
  /// Engine with default depths.
  pub fn new() -> Self {
    Self::default()
  }

  pub fn builder() -> EngineBuilder {
    EngineBuilder::default()
  }

  pub const fn with_config(config: EngineConfig) -> Self {
    Self { config }
  }

  pub const fn config(&self) -> &EngineConfig {
    &self.config
  }

  const fn paths(&self) -> PathResolver {
    PathResolver::new(self.config.depth_ceiling)
  }

  /// Follow a path hint from `root`.
  pub fn resolve_path<H: ElementHandle>(
    &self,
    root: &H,
    path: &[PathStep],
    diagnostics: &mut Diagnostics,
  ) -> QueryResult<H> {
    self.paths().resolve(root, path, diagnostics)
  }

  /// Find the first element below `root` matching `locator`.
  ///
  /// `max_depth` bounds the criteria search below the anchor and defaults
  /// to the configured search depth.
  pub fn find_element<H: ElementHandle>(
    &self,
    root: &H,
    locator: &Locator,
    max_depth: Option<usize>,
    diagnostics: &mut Diagnostics,
  ) -> QueryResult<Found<H>> {
    self.find_with_hint(root, locator, None, max_depth, diagnostics)
  }

  /// Resolve `application` and find `locator` inside it.
  pub fn find_in_application<R: ApplicationResolver>(
    &self,
    resolver: &R,
    application: &str,
    locator: &Locator,
    max_depth: Option<usize>,
    diagnostics: &mut Diagnostics,
  ) -> QueryResult<Found<R::Handle>> {
    let root = application_root(resolver, Some(application))?;
    self.find_element(&root, locator, max_depth, diagnostics)
  }

  /// Gather every element below `root` (inclusive) passing `options`.
  pub fn collect_elements<H: ElementHandle>(
    &self,
    root: &H,
    options: &CollectOptions,
    diagnostics: &mut Diagnostics,
  ) -> QueryResult<Collected<H>> {
    let matcher = if options.criteria.is_empty() {
      None
    } else {
      Some(CriteriaMatcher::new(&options.criteria, options.match_all)?)
    };
    let requested = options.max_depth.unwrap_or(self.config.collect_depth);
    let depth = clamp_depth(requested, self.config.depth_ceiling, diagnostics);

    let mut visitor = CollectVisitor::new(matcher, diagnostics)
      .include_ignored(options.include_ignored)
      .required_action(options.required_action.clone());
    let mut state = TraversalState::new(depth);
    traverse(root, &mut visitor, &mut state)?;
    let mut elements = visitor.into_collected();
    state.record_into(diagnostics);

    let truncated_by_limit = options.limit.is_some_and(|limit| elements.len() > limit);
    if let Some(limit) = options.limit {
      elements.truncate(limit);
    }
    log::debug!(
      "Collected {} element(s) from {} visited (depth {depth})",
      elements.len(),
      state.visited_count()
    );

    Ok(Collected {
      elements,
      report: state.report(),
      truncated_by_limit,
    })
  }

  /// Run a query against the application it names, or the focused one.
  pub fn run<R: ApplicationResolver>(
    &self,
    resolver: &R,
    query: &Query,
    diagnostics: &mut Diagnostics,
  ) -> QueryResult<QueryOutput<R::Handle>> {
    let root = application_root(resolver, query.application.as_deref())?;
    let extra_hint = query.path_hint.as_deref().filter(|steps| !steps.is_empty());

    match query.mode {
      QueryMode::FindFirst => self
        .find_with_hint(&root, &query.locator, extra_hint, query.max_depth, diagnostics)
        .map(QueryOutput::Found),
      QueryMode::CollectAll {
        include_ignored,
        limit,
      } => {
        let anchor = self
          .navigate(&root, &query.locator, extra_hint, diagnostics)?
          .unwrap_or(root);
        let options = CollectOptions {
          criteria: query.locator.criteria.clone(),
          match_all: query.locator.match_all,
          max_depth: query.max_depth,
          include_ignored,
          limit,
          required_action: query.locator.required_action.clone(),
        };
        self
          .collect_elements(&anchor, &options, diagnostics)
          .map(QueryOutput::Collected)
      }
    }
  }

  /// Run queries one after another, in order.
  ///
  /// Each query gets its own diagnostics and result slot; a failure never
  /// affects the other queries.
  pub fn run_batch<R: ApplicationResolver>(
    &self,
    resolver: &R,
    queries: &[Query],
  ) -> Vec<BatchEntry<R::Handle>> {
    queries
      .iter()
      .enumerate()
      .map(|(index, query)| {
        let mut diagnostics = Diagnostics::new();
        let result = self.run(resolver, query, &mut diagnostics);
        if let Err(e) = &result {
          log::warn!("Batch query {index} failed: {e}");
        }
        BatchEntry {
          index,
          result,
          diagnostics,
        }
      })
      .collect()
  }

  /// Perform an action on an element, checking it is supported.
  #[allow(clippy::unused_self)] // Kept on the engine next to the finds it follows
  pub fn perform_action<H: ElementHandle>(&self, element: &H, action: &str) -> QueryResult<()> {
    accessor::perform(element, action)
  }

  /// Write an attribute, checking it is settable.
  #[allow(clippy::unused_self)] // Kept on the engine next to the finds it follows
  pub fn set_attribute<H: ElementHandle>(
    &self,
    element: &H,
    name: &str,
    value: &AttributeValue,
  ) -> QueryResult<()> {
    accessor::write(element, name, value)
  }

  /// Find an element supporting `action` and perform it.
  ///
  /// The locator's required action, when absent, becomes `action`.
  pub fn find_and_perform<H: ElementHandle>(
    &self,
    root: &H,
    locator: &Locator,
    action: &str,
    diagnostics: &mut Diagnostics,
  ) -> QueryResult<Found<H>> {
    let found = if locator.required_action.is_some() {
      self.find_element(root, locator, None, diagnostics)?
    } else {
      let gated = locator.clone().require_action(action);
      self.find_element(root, &gated, None, diagnostics)?
    };
    self.perform_action(&found.element, action)?;
    Ok(found)
  }

  /// Follow the locator's root path hint, then `extra_hint`.
  /// `None` when neither is present.
  fn navigate<H: ElementHandle>(
    &self,
    root: &H,
    locator: &Locator,
    extra_hint: Option<&[PathStep]>,
    diagnostics: &mut Diagnostics,
  ) -> QueryResult<Option<H>> {
    let mut anchor = None;
    for hint in [locator.path_hint(), extra_hint].into_iter().flatten() {
      let from = anchor.as_ref().unwrap_or(root);
      anchor = Some(self.resolve_path(from, hint, diagnostics)?);
    }
    Ok(anchor)
  }

  /// Like [`navigate`](Self::navigate), but every match of the final step
  /// is kept.
  fn candidate_anchors<H: ElementHandle>(
    &self,
    root: &H,
    locator: &Locator,
    extra_hint: Option<&[PathStep]>,
    diagnostics: &mut Diagnostics,
  ) -> QueryResult<Option<Vec<H>>> {
    let hints: Vec<&[PathStep]> = [locator.path_hint(), extra_hint].into_iter().flatten().collect();
    let Some((last, leading)) = hints.split_last() else {
      return Ok(None);
    };
    let mut anchor = root.clone();
    for hint in leading {
      anchor = self.resolve_path(&anchor, hint, diagnostics)?;
    }
    self.paths().candidates(&anchor, last, diagnostics).map(Some)
  }

  fn find_with_hint<H: ElementHandle>(
    &self,
    root: &H,
    locator: &Locator,
    extra_hint: Option<&[PathStep]>,
    max_depth: Option<usize>,
    diagnostics: &mut Diagnostics,
  ) -> QueryResult<Found<H>> {
    if locator.criteria.is_empty() && locator.path_hint().is_none() && extra_hint.is_none() {
      return Err(QueryError::NoCriteriaOrPath);
    }
    let matcher = CriteriaMatcher::new(&locator.criteria, locator.match_all)?;

    if matcher.is_empty() {
      let Some(anchor) = self.navigate(root, locator, extra_hint, diagnostics)? else {
        return Err(QueryError::NoCriteriaOrPath);
      };
      if let Some(action) = &locator.required_action {
        if !accessor::supports_action(&anchor, action)? {
          return Err(QueryError::RequiredActionMissing {
            action: action.clone(),
          });
        }
      }
      log::debug!("Path hint resolved to {anchor:?}");
      return Ok(Found {
        element: anchor,
        report: SearchReport::default(),
      });
    }

    let anchors = self
      .candidate_anchors(root, locator, extra_hint, diagnostics)?
      .unwrap_or_else(|| vec![root.clone()]);
    let requested = max_depth.unwrap_or(self.config.search_depth);
    let depth = clamp_depth(requested, self.config.depth_ceiling, diagnostics);

    let mut report = SearchReport {
      max_depth: depth,
      ..SearchReport::default()
    };
    let mut found = None;
    for anchor in &anchors {
      let mut visitor = SearchVisitor::new(matcher.clone(), diagnostics)
        .required_action(locator.required_action.clone());
      let mut state = TraversalState::new(depth);
      traverse(anchor, &mut visitor, &mut state)?;
      report.absorb(SearchReport {
        partial_matches: visitor.partial_matches(),
        ..state.report()
      });
      found = visitor.into_matches().into_iter().next();
      if found.is_some() {
        break;
      }
      log::trace!("No match below candidate {anchor:?}");
    }
    report.record_into(diagnostics);
    let partial_matches = report.partial_matches;

    match (found, &locator.required_action) {
      (Some(element), _) => {
        log::debug!("Found {element:?} after visiting {} element(s)", report.visited);
        Ok(Found { element, report })
      }
      (None, Some(action)) if partial_matches > 0 => Err(QueryError::RequiredActionMissing {
        action: action.clone(),
      }),
      (None, _) => Err(QueryError::NoMatchFound {
        criteria: locator.criteria.clone(),
        depth_limit_reached: report.depth_limit_reached,
      }),
    }
  }
}

fn application_root<R: ApplicationResolver>(resolver: &R, application: Option<&str>) -> QueryResult<R::Handle> {
  match application {
    Some(identifier) => resolver
      .application(identifier)
      .ok_or_else(|| QueryError::ApplicationNotFound(identifier.to_owned())),
    None => resolver
      .focused_application()
      .ok_or_else(|| QueryError::ApplicationNotFound("focused application".to_owned())),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::a11y::names;
  use crate::criteria::Criterion;
  use crate::provider::{MemoryElement, MemoryTree, Node};
  use crate::types::{Diagnostic, ProviderError};

  struct Dialog {
    tree: MemoryTree,
    save: MemoryElement,
    cancel: MemoryElement,
  }

  fn dialog() -> Dialog {
    let tree = MemoryTree::new(Node::new("AXApplication").title("TextEdit").pid(501));
    let window = tree.append(&tree.root(), Node::new("AXWindow").title("Untitled"));
    let sheet = tree.append(&window, Node::new("AXSheet"));
    let save = tree.append(&sheet, Node::new("AXButton").title("Save").action("AXPress"));
    let cancel = tree.append(&sheet, Node::new("AXButton").title("Cancel").action("AXPress"));
    Dialog { tree, save, cancel }
  }

  fn find(engine: &SearchEngine, root: &MemoryElement, locator: &Locator) -> QueryResult<Found<MemoryElement>> {
    engine.find_element(root, locator, None, &mut Diagnostics::new())
  }

  #[test]
  fn finds_save_not_cancel() {
    let d = dialog();
    let engine = SearchEngine::new();
    let locator = Locator::new(vec![
      Criterion::exact("role", "AXButton"),
      Criterion::exact("title", "Save"),
    ]);
    let found = find(&engine, &d.tree.root(), &locator).unwrap();
    assert_eq!(found.element, d.save);
    assert!(found.report.visited >= 4);

    let locator = Locator::new(vec![Criterion::contains("title", "cancel")]);
    assert_eq!(find(&engine, &d.tree.root(), &locator).unwrap().element, d.cancel);
  }

  #[test]
  fn path_hint_selects_second_window() {
    let tree = MemoryTree::new(Node::new("AXApplication"));
    for title in ["Drafts", "Inbox"] {
      let window = tree.append(&tree.root(), Node::new("AXWindow").title(title));
      tree.append(&window, Node::new("AXButton").title("Send").identifier(title));
    }

    let locator = Locator::from_json(
      r#"{
        "criteria": [{ "attribute": "title", "value": "Send" }],
        "rootElementPathHint": [{ "attribute": "title", "value": "Inbox", "depth": 1 }]
      }"#,
    )
    .unwrap();
    let found = find(&SearchEngine::new(), &tree.root(), &locator).unwrap();
    assert_eq!(
      found.element.attribute(names::IDENTIFIER).unwrap(),
      Some("Inbox".into())
    );
  }

  #[test]
  fn path_hint_tries_every_matching_window() {
    let tree = MemoryTree::new(Node::new("AXApplication"));
    tree.append(&tree.root(), Node::new("AXWindow").title("Empty"));
    let full = tree.append(&tree.root(), Node::new("AXWindow").title("Full"));
    let button = tree.append(&full, Node::new("AXButton"));

    let locator = Locator::from_json(
      r#"{
        "criteria": [{ "attribute": "role", "value": "AXButton" }],
        "rootElementPathHint": [{ "attribute": "role", "value": "AXWindow", "depth": 1 }]
      }"#,
    )
    .unwrap();
    let found = find(&SearchEngine::new(), &tree.root(), &locator).unwrap();
    assert_eq!(found.element, button);
    assert_eq!(found.report.visited, 3);

    // Path-only locators still resolve to the first window
    let path_only = Locator::path(locator.root_path_hint.clone().unwrap_or_default());
    let anchor = find(&SearchEngine::new(), &tree.root(), &path_only).unwrap();
    assert_ne!(anchor.element, full);
  }

  #[test]
  fn candidate_search_aggregates_misses() {
    let tree = MemoryTree::new(Node::new("AXApplication"));
    for title in ["One", "Two"] {
      let window = tree.append(&tree.root(), Node::new("AXWindow").title(title));
      tree.append(&window, Node::new("AXStaticText").title("Close"));
    }
    let locator = Locator::new(vec![Criterion::exact("title", "Close")])
      .with_root_path(vec![PathStep::single(Criterion::exact("role", "AXWindow")).with_depth(1)])
      .require_action("AXPress");

    let mut diagnostics = Diagnostics::new();
    let err = SearchEngine::new()
      .find_element(&tree.root(), &locator, None, &mut diagnostics)
      .unwrap_err();
    assert!(matches!(err, QueryError::RequiredActionMissing { .. }));
    assert_eq!(diagnostics.partial_matches(), 2);
  }

  #[test]
  fn path_only_locator_returns_anchor() {
    let d = dialog();
    let locator = Locator::path(vec![
      PathStep::single(Criterion::exact("role", "AXWindow")),
      PathStep::single(Criterion::exact("title", "Cancel")),
    ]);
    let found = find(&SearchEngine::new(), &d.tree.root(), &locator).unwrap();
    assert_eq!(found.element, d.cancel);
    assert_eq!(found.report, SearchReport::default());
  }

  #[test]
  fn required_action_gating() {
    let tree = MemoryTree::new(Node::new("AXApplication"));
    tree.append(&tree.root(), Node::new("AXStaticText").title("Delete"));
    let locator = Locator::new(vec![Criterion::exact("title", "Delete")]).require_action("AXPress");

    let mut diagnostics = Diagnostics::new();
    let err = SearchEngine::new()
      .find_element(&tree.root(), &locator, None, &mut diagnostics)
      .unwrap_err();
    assert!(matches!(err, QueryError::RequiredActionMissing { action } if action == "AXPress"));
    assert_eq!(diagnostics.partial_matches(), 1);

    let button = tree.append(&tree.root(), Node::new("AXButton").title("Delete").action("AXPress"));
    let found = find(&SearchEngine::new(), &tree.root(), &locator).unwrap();
    assert_eq!(found.element, button);
    assert_eq!(found.report.partial_matches, 1);
  }

  #[test]
  fn no_criteria_or_path() {
    let d = dialog();
    let err = find(&SearchEngine::new(), &d.tree.root(), &Locator::default()).unwrap_err();
    assert!(matches!(err, QueryError::NoCriteriaOrPath));

    let err = find(&SearchEngine::new(), &d.tree.root(), &Locator::path(Vec::new())).unwrap_err();
    assert!(matches!(err, QueryError::NoCriteriaOrPath));
  }

  #[test]
  fn no_match_reports_depth_limit() {
    let d = dialog();
    let locator = Locator::new(vec![Criterion::exact("title", "Save")]);
    let mut diagnostics = Diagnostics::new();
    let err = SearchEngine::new()
      .find_element(&d.tree.root(), &locator, Some(2), &mut diagnostics)
      .unwrap_err();
    assert!(matches!(
      err,
      QueryError::NoMatchFound {
        depth_limit_reached: true,
        ..
      }
    ));
    assert!(diagnostics.any(|d| matches!(d, Diagnostic::DepthLimitReached { max_depth: 2 })));

    let missing = Locator::new(vec![Criterion::exact("title", "Print")]);
    let err = find(&SearchEngine::new(), &d.tree.root(), &missing).unwrap_err();
    assert!(matches!(
      err,
      QueryError::NoMatchFound {
        depth_limit_reached: false,
        ..
      }
    ));
  }

  #[test]
  fn depth_is_clamped_to_ceiling() {
    let d = dialog();
    let engine = SearchEngine::builder().depth_ceiling(3).build();
    let locator = Locator::new(vec![Criterion::exact("title", "Save")]);
    let mut diagnostics = Diagnostics::new();
    let found = engine
      .find_element(&d.tree.root(), &locator, Some(100), &mut diagnostics)
      .unwrap();
    assert_eq!(found.element, d.save);
    assert_eq!(found.report.max_depth, 3);
    assert!(diagnostics.any(|d| matches!(d, Diagnostic::MaxDepthExceeded { requested: 100, ceiling: 3 })));
  }

  #[test]
  fn invalid_regex_fails_before_searching() {
    let d = dialog();
    let locator = Locator::new(vec![Criterion::regex("title", "[")]);
    let err = find(&SearchEngine::new(), &d.tree.root(), &locator).unwrap_err();
    assert!(matches!(err, QueryError::InvalidPattern { .. }));
  }

  #[test]
  fn provider_failure_propagates() {
    let d = dialog();
    let locator = Locator::new(vec![Criterion::exact("title", "Nope")]);
    d.tree.invalidate(&d.cancel);
    let err = find(&SearchEngine::new(), &d.tree.root(), &locator).unwrap_err();
    assert!(matches!(
      err,
      QueryError::ProviderUnavailable(ProviderError::InvalidElement)
    ));
  }

  #[test]
  fn collect_excludes_ignored() {
    let tree = MemoryTree::new(Node::new("AXApplication"));
    let list = tree.append(&tree.root(), Node::new("AXList"));
    tree.append(&list, Node::new("AXRow").title("one"));
    tree.append(&list, Node::new("AXRow").title("two").ignored());
    tree.append(&list, Node::new("AXRow").title("three"));

    let engine = SearchEngine::new();
    let options = CollectOptions::matching(vec![Criterion::exact("role", "AXRow")]);
    let collected = engine
      .collect_elements(&tree.root(), &options, &mut Diagnostics::new())
      .unwrap();
    assert_eq!(collected.elements.len(), 2);
    for row in &collected.elements {
      assert!(!accessor::is_ignored(row).unwrap());
    }

    let all = engine
      .collect_elements(&tree.root(), &options.include_ignored(true), &mut Diagnostics::new())
      .unwrap();
    assert_eq!(all.elements.len(), 3);
  }

  #[test]
  fn collect_everything_includes_root() {
    let d = dialog();
    let collected = SearchEngine::new()
      .collect_elements(&d.tree.root(), &CollectOptions::default(), &mut Diagnostics::new())
      .unwrap();
    assert_eq!(collected.elements.len(), d.tree.len());
    assert_eq!(collected.elements.first(), Some(&d.tree.root()));
  }

  #[test]
  fn collect_limit_caps_results() {
    let d = dialog();
    let options = CollectOptions::default().limit(2);
    let collected = SearchEngine::new()
      .collect_elements(&d.tree.root(), &options, &mut Diagnostics::new())
      .unwrap();
    assert_eq!(collected.elements.len(), 2);
    assert!(collected.truncated_by_limit);

    let options = CollectOptions::default().limit(50);
    let collected = SearchEngine::new()
      .collect_elements(&d.tree.root(), &options, &mut Diagnostics::new())
      .unwrap();
    assert!(!collected.truncated_by_limit);
  }

  #[test]
  fn find_in_named_application() {
    let d = dialog();
    let engine = SearchEngine::new();
    let locator = Locator::new(vec![Criterion::exact("title", "Save")]);

    let found = engine
      .find_in_application(&d.tree, "textedit", &locator, None, &mut Diagnostics::new())
      .unwrap();
    assert_eq!(found.element, d.save);

    let err = engine
      .find_in_application(&d.tree, "Pages", &locator, None, &mut Diagnostics::new())
      .unwrap_err();
    assert!(matches!(err, QueryError::ApplicationNotFound(name) if name == "Pages"));
  }

  #[test]
  fn run_query_with_extra_path_hint() {
    let d = dialog();
    let query = Query::find(Locator::new(vec![Criterion::exact("role", "AXButton")]))
      .in_application("501")
      .with_path_hint(vec![
        PathStep::single(Criterion::exact("role", "AXWindow")),
        PathStep::single(Criterion::exact("role", "AXSheet")),
      ]);
    let output = SearchEngine::new()
      .run(&d.tree, &query, &mut Diagnostics::new())
      .unwrap();
    assert_eq!(output.first(), Some(&d.save));
  }

  #[test]
  fn run_collect_uses_focused_application() {
    let d = dialog();
    let query = Query::collect(Locator::new(vec![Criterion::exact("role", "AXButton")])).limit(1);
    let output = SearchEngine::new()
      .run(&d.tree, &query, &mut Diagnostics::new())
      .unwrap();
    match output {
      QueryOutput::Collected(collected) => {
        assert_eq!(collected.elements, vec![d.save.clone()]);
        assert!(collected.truncated_by_limit);
      }
      QueryOutput::Found(_) => panic!("expected a collect result"),
    }
  }

  #[test]
  fn run_collect_honors_required_action() {
    let tree = MemoryTree::new(Node::new("AXApplication").title("Finder"));
    let open = tree.append(&tree.root(), Node::new("AXButton").title("Open").action("AXPress"));
    tree.append(&tree.root(), Node::new("AXButton").title("Disabled"));

    let query = Query::collect(Locator::new(vec![Criterion::exact("role", "AXButton")]).require_action("AXPress"));
    let mut diagnostics = Diagnostics::new();
    let output = SearchEngine::new().run(&tree, &query, &mut diagnostics).unwrap();
    assert_eq!(output.into_elements(), vec![open]);
    assert_eq!(diagnostics.partial_matches(), 1);
  }

  #[test]
  fn batch_isolates_failures() {
    let d = dialog();
    let queries = vec![
      Query::find(Locator::new(vec![Criterion::exact("title", "Save")])),
      Query::find(Locator::new(vec![Criterion::exact("title", "Save")])).in_application("Pages"),
      Query::find(Locator::default()),
      Query::find(Locator::new(vec![Criterion::exact("title", "Cancel")])),
    ];
    let entries = SearchEngine::new().run_batch(&d.tree, &queries);

    assert_eq!(entries.len(), 4);
    assert_eq!(entries.iter().map(|e| e.index).collect::<Vec<_>>(), vec![0, 1, 2, 3]);
    assert_eq!(entries[0].result.as_ref().unwrap().first(), Some(&d.save));
    assert!(matches!(entries[1].result, Err(QueryError::ApplicationNotFound(_))));
    assert!(matches!(entries[2].result, Err(QueryError::NoCriteriaOrPath)));
    assert_eq!(entries[3].result.as_ref().unwrap().first(), Some(&d.cancel));
  }

  #[test]
  fn perform_and_set() {
    let d = dialog();
    let engine = SearchEngine::new();
    let field = d
      .tree
      .append(&d.tree.root(), Node::new("AXTextField").settable(names::VALUE));

    engine.set_attribute(&field, "value", &"notes.txt".into()).unwrap();
    assert_eq!(field.attribute(names::VALUE).unwrap(), Some("notes.txt".into()));
    assert!(matches!(
      engine.set_attribute(&field, "title", &"x".into()),
      Err(QueryError::AttributeNotSettable(_))
    ));

    engine.perform_action(&d.save, "press").unwrap();
    assert_eq!(d.tree.performed_actions(&d.save), vec!["AXPress".to_owned()]);
    assert!(matches!(
      engine.perform_action(&field, "AXPress"),
      Err(QueryError::ActionUnsupported(_))
    ));
  }

  #[test]
  fn find_and_perform_gates_on_action() {
    let tree = MemoryTree::new(Node::new("AXApplication"));
    tree.append(&tree.root(), Node::new("AXStaticText").title("OK"));
    let button = tree.append(&tree.root(), Node::new("AXButton").title("OK").action("AXPress"));

    let locator = Locator::new(vec![Criterion::exact("title", "OK")]);
    let found = SearchEngine::new()
      .find_and_perform(&tree.root(), &locator, "AXPress", &mut Diagnostics::new())
      .unwrap();
    assert_eq!(found.element, button);
    assert_eq!(tree.performed_actions(&button), vec!["AXPress".to_owned()]);
  }

  #[test]
  fn cyclic_tree_search_terminates() {
    let d = dialog();
    d.tree.link(&d.cancel, &d.tree.root());
    let locator = Locator::new(vec![Criterion::exact("title", "Missing")]);
    let mut diagnostics = Diagnostics::new();
    let err = SearchEngine::new()
      .find_element(&d.tree.root(), &locator, Some(50), &mut diagnostics)
      .unwrap_err();
    assert!(err.is_not_found());
    assert!(diagnostics.any(|d| matches!(d, Diagnostic::CycleSkipped { count: 1 })));
  }
}
