/*!
Allio Query - locator search over accessibility (A11y) element trees

Finds elements in trees owned by someone else (an OS accessibility API, a
browser bridge, an in-memory mirror) from a declarative [`Locator`]: a set
of attribute criteria, an optional path hint to narrow the search root, and
an optional action the result must support.

```
use allio_query::provider::{MemoryTree, Node};
use allio_query::{Criterion, Diagnostics, Locator, PathStep, SearchEngine};

let tree = MemoryTree::new(Node::new("AXApplication").title("Mail"));
for title in ["Drafts", "Inbox"] {
  let window = tree.append(&tree.root(), Node::new("AXWindow").title(title));
  tree.append(&window, Node::new("AXButton").title("Send").action("AXPress"));
}

// Narrow to the Inbox window, then find its Send button
let locator = Locator::new(vec![Criterion::exact("title", "Send")])
  .with_root_path(vec![PathStep::single(Criterion::exact("title", "Inbox")).with_depth(1)])
  .require_action("AXPress");

let mut diagnostics = Diagnostics::new();
let engine = SearchEngine::new();
let found = engine.find_in_application(&tree, "Mail", &locator, None, &mut diagnostics)?;
engine.perform_action(&found.element, "AXPress")?;
# Ok::<(), allio_query::QueryError>(())
```

The engine never holds provider locks and never parallelizes; every call
owns its own visited set, so cyclic provider graphs terminate.
*/

pub mod a11y;
pub mod accessor;
pub mod criteria;
pub mod provider;
pub mod traversal;

mod engine;
mod path;

mod types;
pub use types::*;

pub use crate::criteria::{Criterion, Locator, MatchType, PathHint, PathStep};
pub use crate::engine::{
  BatchEntry, CollectOptions, Collected, EngineBuilder, EngineConfig, Found, Query, QueryMode,
  QueryOutput, SearchEngine, DEFAULT_COLLECT_DEPTH, DEFAULT_DEPTH_CEILING, DEFAULT_SEARCH_DEPTH,
};
pub use crate::path::PathResolver;
