/*!
Bounded, cycle-safe tree traversal.

[`traverse`] walks a provider tree in pre-order, handing each element to a
[`Visitor`]. Children are fetched lazily, once per element, in provider
order. The walk is bounded two ways:

- depth: the root is depth 0; an element at `max_depth` is visited but its
  children are never fetched
- identity: an element already in the visited set is not visited again,
  so cyclic or shared child edges terminate

# Module Structure

- `mod.rs` - [`traverse`], [`Visitor`], [`TraversalState`]
- `visitors.rs` - [`SearchVisitor`] and [`CollectVisitor`]
*/

mod visitors;

pub use visitors::{CollectVisitor, SearchVisitor};

use std::collections::HashSet;

use crate::accessor;
use crate::provider::ElementHandle;
use crate::types::{Diagnostic, Diagnostics, QueryResult, SearchReport};

/// What the traversal should do after visiting an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitAction {
  /// Descend into children.
  Continue,
  /// Don't descend, but keep walking siblings.
  SkipChildren,
  /// End the whole traversal.
  Stop,
}

/// Callback for [`traverse`].
pub trait Visitor<H: ElementHandle> {
  /// Called once per element, with its depth below the traversal root.
  fn visit(&mut self, element: &H, depth: usize) -> QueryResult<VisitAction>;
}

impl<H, F> Visitor<H> for F
where
  H: ElementHandle,
  F: FnMut(&H, usize) -> QueryResult<VisitAction>,
{
  fn visit(&mut self, element: &H, depth: usize) -> QueryResult<VisitAction> {
    self(element, depth)
  }
}

/// Per-traversal bookkeeping. Owned by one top-level call, never shared.
#[derive(Debug)]
pub struct TraversalState<H> {
  max_depth: usize,
  visited: HashSet<H>,
  cycles_skipped: usize,
  depth_limit_reached: bool,
}

impl<H: ElementHandle> TraversalState<H> {
  /// Fresh state bounded at `max_depth`.
  pub fn new(max_depth: usize) -> Self {
    Self {
      max_depth,
      visited: HashSet::new(),
      cycles_skipped: 0,
      depth_limit_reached: false,
    }
  }

  /// Deepest level that is visited.
  pub const fn max_depth(&self) -> usize {
    self.max_depth
  }

  /// Elements handed to the visitor so far.
  pub fn visited_count(&self) -> usize {
    self.visited.len()
  }

  /// Whether `element` was handed to the visitor.
  pub fn has_visited(&self, element: &H) -> bool {
    self.visited.contains(element)
  }

  /// Elements reached again and skipped.
  pub const fn cycles_skipped(&self) -> usize {
    self.cycles_skipped
  }

  /// Whether an element at `max_depth` was left unexpanded.
  pub const fn depth_limit_reached(&self) -> bool {
    self.depth_limit_reached
  }

  /// Counters of this traversal.
  pub fn report(&self) -> SearchReport {
    SearchReport {
      max_depth: self.max_depth,
      visited: self.visited_count(),
      cycles_skipped: self.cycles_skipped,
      depth_limit_reached: self.depth_limit_reached,
      partial_matches: 0,
    }
  }

  /// Record depth truncation and skipped cycles, if any.
  pub fn record_into(&self, diagnostics: &mut Diagnostics) {
    self.report().record_into(diagnostics);
  }
}

/// Walk the tree below `root` (inclusive) in pre-order.
///
/// Returns [`VisitAction::Stop`] if the visitor stopped the walk, otherwise
/// [`VisitAction::Continue`]. Provider failures while fetching children
/// propagate.
pub fn traverse<H, V>(root: &H, visitor: &mut V, state: &mut TraversalState<H>) -> QueryResult<VisitAction>
where
  H: ElementHandle,
  V: Visitor<H> + ?Sized,
{
  walk(root, 0, visitor, state)
}

fn walk<H, V>(element: &H, depth: usize, visitor: &mut V, state: &mut TraversalState<H>) -> QueryResult<VisitAction>
where
  H: ElementHandle,
  V: Visitor<H> + ?Sized,
{
  if depth > state.max_depth {
    return Ok(VisitAction::Continue);
  }
  if !state.visited.insert(element.clone()) {
    log::trace!("Already visited {element:?}, skipping branch");
    state.cycles_skipped += 1;
    return Ok(VisitAction::Continue);
  }

  match visitor.visit(element, depth)? {
    VisitAction::Stop => return Ok(VisitAction::Stop),
    VisitAction::SkipChildren => return Ok(VisitAction::Continue),
    VisitAction::Continue => {}
  }

  if depth == state.max_depth {
    state.depth_limit_reached = true;
    return Ok(VisitAction::Continue);
  }

  for child in accessor::children(element)? {
    if walk(&child, depth + 1, visitor, state)? == VisitAction::Stop {
      return Ok(VisitAction::Stop);
    }
  }
  Ok(VisitAction::Continue)
}

/// Clamp a requested depth to the engine ceiling, noting it when clamped.
pub(crate) fn clamp_depth(requested: usize, ceiling: usize, diagnostics: &mut Diagnostics) -> usize {
  if requested > ceiling {
    diagnostics.record(Diagnostic::MaxDepthExceeded { requested, ceiling });
    ceiling
  } else {
    requested
  }
}
