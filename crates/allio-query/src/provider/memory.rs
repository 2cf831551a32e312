/*!
In-memory element tree.

A provider that owns its nodes directly, used for tests, fixtures and hosts
that mirror a remote tree locally. Nodes live in an arena behind a
`parking_lot::RwLock`, so the tree can be mutated from another thread while
a query walks it (results are then best-effort, like with a live provider).

Child edges are arbitrary: [`MemoryTree::link`] can make a node a child of
several parents, including its own descendants, which is how cyclic
provider graphs are reproduced.

```
use allio_query::provider::{MemoryTree, Node};

let tree = MemoryTree::new(Node::new("AXApplication").title("Notes").pid(42));
let window = tree.append(&tree.root(), Node::new("AXWindow").title("Main"));
tree.append(&window, Node::new("AXButton").title("Save").action("AXPress"));
assert_eq!(tree.len(), 3);
```
*/

use parking_lot::RwLock;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use super::traits::{ApplicationResolver, ElementHandle};
use crate::a11y::{names, AttributeValue};
use crate::types::{ElementId, ProcessId, ProviderError, ProviderResult};

/// Contents of one node: attributes, writable attribute names, actions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Node {
  attributes: BTreeMap<String, AttributeValue>,
  settable: BTreeSet<String>,
  actions: Vec<String>,
  pid: Option<ProcessId>,
}

impl Node {
  /// Node with the given `AXRole`.
  pub fn new(role: &str) -> Self {
    Self::default().attr(names::ROLE, role)
  }

  /// Set an attribute by its provider name.
  #[must_use]
  pub fn attr(mut self, name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
    self.attributes.insert(name.into(), value.into());
    self
  }

  #[must_use]
  pub fn title(self, title: &str) -> Self {
    self.attr(names::TITLE, title)
  }

  #[must_use]
  pub fn identifier(self, identifier: &str) -> Self {
    self.attr(names::IDENTIFIER, identifier)
  }

  #[must_use]
  pub fn description(self, description: &str) -> Self {
    self.attr(names::DESCRIPTION, description)
  }

  #[must_use]
  pub fn value(self, value: impl Into<AttributeValue>) -> Self {
    self.attr(names::VALUE, value)
  }

  /// Set `AXDOMClassList`.
  #[must_use]
  pub fn classes(self, classes: &[&str]) -> Self {
    self.attr(names::DOM_CLASS_LIST, classes.to_vec())
  }

  /// Mark the node as ignored by the provider.
  #[must_use]
  pub fn ignored(self) -> Self {
    self.attr(names::IGNORED, true)
  }

  /// Add a supported action.
  #[must_use]
  pub fn action(mut self, action: impl Into<String>) -> Self {
    self.actions.push(action.into());
    self
  }

  /// Allow writes to an attribute.
  #[must_use]
  pub fn settable(mut self, name: impl Into<String>) -> Self {
    self.settable.insert(name.into());
    self
  }

  /// Set the owning process. Children inherit it when appended.
  #[must_use]
  pub fn pid(mut self, pid: u32) -> Self {
    self.pid = Some(ProcessId(pid));
    self
  }
}

struct Arena {
  next_id: u32,
  nodes: HashMap<ElementId, NodeState>,
  children_of: HashMap<ElementId, Vec<ElementId>>,
}

struct NodeState {
  node: Node,
  performed: Vec<String>,
}

impl Arena {
  fn insert(&mut self, node: Node) -> ElementId {
    let id = ElementId(self.next_id);
    self.next_id += 1;
    self.nodes.insert(
      id,
      NodeState {
        node,
        performed: Vec::new(),
      },
    );
    id
  }

  fn node(&self, id: ElementId) -> ProviderResult<&NodeState> {
    self.nodes.get(&id).ok_or(ProviderError::InvalidElement)
  }

  fn node_mut(&mut self, id: ElementId) -> ProviderResult<&mut NodeState> {
    self.nodes.get_mut(&id).ok_or(ProviderError::InvalidElement)
  }

  /// Remove an element and everything reachable below it.
  /// Iterative, and guarded against cycles created with `link`.
  fn remove_subtree(&mut self, root: ElementId) -> Vec<ElementId> {
    let mut removed = Vec::new();
    let mut seen = HashSet::new();
    let mut queue = vec![root];

    while let Some(id) = queue.pop() {
      if !seen.insert(id) {
        continue;
      }
      if let Some(children) = self.children_of.remove(&id) {
        queue.extend(children);
      }
      if self.nodes.remove(&id).is_some() {
        removed.push(id);
      }
    }

    // Detach removed nodes from surviving parents
    for children in self.children_of.values_mut() {
      children.retain(|child| !seen.contains(child));
    }

    removed
  }
}

/// Arena-backed element tree. Clone is cheap and shares the arena.
#[derive(Clone)]
pub struct MemoryTree {
  arena: Arc<RwLock<Arena>>,
  root: ElementId,
}

impl fmt::Debug for MemoryTree {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("MemoryTree")
      .field("root", &self.root)
      .field("len", &self.len())
      .finish_non_exhaustive()
  }
}

impl MemoryTree {
  /// Create a tree with a single root node.
  pub fn new(root: Node) -> Self {
    let mut arena = Arena {
      next_id: 1,
      nodes: HashMap::new(),
      children_of: HashMap::new(),
    };
    let root = arena.insert(root);
    Self {
      arena: Arc::new(RwLock::new(arena)),
      root,
    }
  }

  pub fn root(&self) -> MemoryElement {
    self.handle(self.root)
  }

  /// Handle for an id. The handle is stale if the id isn't in the tree.
  pub fn handle(&self, id: ElementId) -> MemoryElement {
    MemoryElement {
      arena: Arc::clone(&self.arena),
      id,
    }
  }

  /// Append a new child under `parent`, inheriting its process id.
  pub fn append(&self, parent: &MemoryElement, mut node: Node) -> MemoryElement {
    let mut arena = self.arena.write();
    if node.pid.is_none() {
      node.pid = arena.nodes.get(&parent.id).and_then(|p| p.node.pid);
    }
    let id = arena.insert(node);
    arena.children_of.entry(parent.id).or_default().push(id);
    drop(arena);
    self.handle(id)
  }

  /// Add `child` to the children of `parent` without moving it.
  ///
  /// The child keeps its other parents. Linking an ancestor creates a cycle.
  pub fn link(&self, parent: &MemoryElement, child: &MemoryElement) {
    self
      .arena
      .write()
      .children_of
      .entry(parent.id)
      .or_default()
      .push(child.id);
  }

  /// Overwrite an attribute, bypassing the settable check.
  pub fn update(&self, element: &MemoryElement, name: &str, value: impl Into<AttributeValue>) {
    if let Some(state) = self.arena.write().nodes.get_mut(&element.id) {
      state.node.attributes.insert(name.to_owned(), value.into());
    }
  }

  /// Remove an element and its descendants, detaching them from parents.
  /// Returns the removed ids.
  pub fn remove(&self, element: &MemoryElement) -> Vec<ElementId> {
    self.arena.write().remove_subtree(element.id)
  }

  /// Drop an element's data but leave every edge pointing at it, the way
  /// a provider handle goes stale under a running query.
  pub fn invalidate(&self, element: &MemoryElement) {
    self.arena.write().nodes.remove(&element.id);
  }

  /// Actions performed on an element so far, in order.
  pub fn performed_actions(&self, element: &MemoryElement) -> Vec<String> {
    self
      .arena
      .read()
      .nodes
      .get(&element.id)
      .map(|state| state.performed.clone())
      .unwrap_or_default()
  }

  /// Number of live nodes.
  pub fn len(&self) -> usize {
    self.arena.read().nodes.len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Build a tree from nested JSON.
  ///
  /// ```
  /// use allio_query::provider::MemoryTree;
  /// use serde_json::json;
  ///
  /// let tree = MemoryTree::from_json(json!({
  ///   "role": "AXApplication",
  ///   "pid": 7,
  ///   "attributes": { "AXTitle": "Finder" },
  ///   "children": [
  ///     { "role": "AXWindow", "children": [
  ///       { "role": "AXButton", "actions": ["AXPress"], "attributes": { "AXTitle": "OK" } }
  ///     ]}
  ///   ]
  /// })).unwrap();
  /// assert_eq!(tree.len(), 3);
  /// ```
  pub fn from_json(value: serde_json::Value) -> Result<Self, serde_json::Error> {
    let root: JsonNode = serde_json::from_value(value)?;
    let JsonNode { children, .. } = &root;
    let tree = Self::new(root.to_node());
    let mut pending: Vec<(MemoryElement, &JsonNode)> =
      children.iter().rev().map(|c| (tree.root(), c)).collect();

    while let Some((parent, json)) = pending.pop() {
      let element = tree.append(&parent, json.to_node());
      pending.extend(json.children.iter().rev().map(|c| (element.clone(), c)));
    }

    Ok(tree)
  }

  /// [`MemoryTree::from_json`] from a string.
  pub fn from_json_str(text: &str) -> Result<Self, serde_json::Error> {
    Self::from_json(serde_json::from_str(text)?)
  }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsonNode {
  #[serde(default)]
  role: Option<String>,
  #[serde(default)]
  attributes: BTreeMap<String, serde_json::Value>,
  #[serde(default)]
  actions: Vec<String>,
  #[serde(default)]
  settable: Vec<String>,
  #[serde(default)]
  pid: Option<u32>,
  #[serde(default)]
  children: Vec<JsonNode>,
}

impl JsonNode {
  fn to_node(&self) -> Node {
    let mut node = Node::default();
    if let Some(role) = &self.role {
      node = node.attr(names::ROLE, role.as_str());
    }
    for (name, value) in &self.attributes {
      node = node.attr(name.as_str(), value.clone());
    }
    for action in &self.actions {
      node = node.action(action.as_str());
    }
    for name in &self.settable {
      node = node.settable(name.as_str());
    }
    if let Some(pid) = self.pid {
      node = node.pid(pid);
    }
    node
  }
}

impl ApplicationResolver for MemoryTree {
  type Handle = MemoryElement;

  /// Matches the root's title (case-insensitive), identifier, or pid.
  fn application(&self, identifier: &str) -> Option<MemoryElement> {
    let arena = self.arena.read();
    let root = &arena.nodes.get(&self.root)?.node;
    let text = |name: &str| root.attributes.get(name).and_then(AttributeValue::as_str);

    let by_title = text(names::TITLE).is_some_and(|t| t.eq_ignore_ascii_case(identifier));
    let by_identifier = text(names::IDENTIFIER) == Some(identifier);
    let by_pid = root.pid.is_some() && ProcessId::parse(identifier) == root.pid;
    drop(arena);

    (by_title || by_identifier || by_pid).then(|| self.root())
  }

  fn focused_application(&self) -> Option<MemoryElement> {
    Some(self.root())
  }
}

/// Handle to a node of a [`MemoryTree`].
#[derive(Clone)]
pub struct MemoryElement {
  arena: Arc<RwLock<Arena>>,
  id: ElementId,
}

impl MemoryElement {
  pub const fn id(&self) -> ElementId {
    self.id
  }
}

impl fmt::Debug for MemoryElement {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_tuple("MemoryElement").field(&self.id).finish()
  }
}

impl PartialEq for MemoryElement {
  fn eq(&self, other: &Self) -> bool {
    self.id == other.id && Arc::ptr_eq(&self.arena, &other.arena)
  }
}

impl Eq for MemoryElement {}

impl Hash for MemoryElement {
  fn hash<H: Hasher>(&self, state: &mut H) {
    self.id.hash(state);
    std::ptr::hash(Arc::as_ptr(&self.arena), state);
  }
}

impl ElementHandle for MemoryElement {
  type Value = AttributeValue;

  fn attribute(&self, name: &str) -> ProviderResult<Option<AttributeValue>> {
    let arena = self.arena.read();
    Ok(arena.node(self.id)?.node.attributes.get(name).cloned())
  }

  fn set_attribute(&self, name: &str, value: &AttributeValue) -> ProviderResult<()> {
    let mut arena = self.arena.write();
    let state = arena.node_mut(self.id)?;
    if !state.node.settable.contains(name) {
      return Err(ProviderError::Failed(format!("{name} is read-only")));
    }
    state.node.attributes.insert(name.to_owned(), value.clone());
    Ok(())
  }

  fn is_attribute_settable(&self, name: &str) -> ProviderResult<bool> {
    let arena = self.arena.read();
    Ok(arena.node(self.id)?.node.settable.contains(name))
  }

  fn children(&self) -> ProviderResult<Vec<Self>> {
    let arena = self.arena.read();
    arena.node(self.id)?;
    let children = arena.children_of.get(&self.id).map_or(&[][..], Vec::as_slice);
    Ok(
      children
        .iter()
        .map(|&id| Self {
          arena: Arc::clone(&self.arena),
          id,
        })
        .collect(),
    )
  }

  fn supported_actions(&self) -> ProviderResult<Vec<String>> {
    let arena = self.arena.read();
    Ok(arena.node(self.id)?.node.actions.clone())
  }

  fn perform_action(&self, action: &str) -> ProviderResult<()> {
    let mut arena = self.arena.write();
    let state = arena.node_mut(self.id)?;
    if !state.node.actions.iter().any(|a| a == action) {
      return Err(ProviderError::Failed(format!("{action} not supported")));
    }
    state.performed.push(action.to_owned());
    Ok(())
  }

  fn process_id(&self) -> Option<ProcessId> {
    self.arena.read().nodes.get(&self.id).and_then(|s| s.node.pid)
  }
}
