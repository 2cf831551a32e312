/*!
Provider abstraction traits.

These traits define the contract between the query engine and whatever owns
the element tree (an OS accessibility API, a browser bridge, the in-memory
tree). The engine only uses these traits, never provider-specific types.
*/

use std::fmt::Debug;
use std::hash::Hash;

use crate::a11y::AttributeValue;
use crate::types::{ProcessId, ProviderResult};

/// Per-element operations.
///
/// Identity is `Eq + Hash`: two handles to the same provider node must
/// compare equal, since cycle detection relies on it. Clone should be cheap.
///
/// Handles may go stale at any time. Calls on a stale handle return
/// [`ProviderError::InvalidElement`](crate::ProviderError::InvalidElement).
pub trait ElementHandle: Clone + Eq + Hash + Debug {
  /// Provider-native attribute value, normalized by the accessor.
  type Value: Into<AttributeValue>;

  /// Read an attribute. `Ok(None)` when the element doesn't have it.
  fn attribute(&self, name: &str) -> ProviderResult<Option<Self::Value>>;

  /// Write an attribute.
  fn set_attribute(&self, name: &str, value: &AttributeValue) -> ProviderResult<()>;

  /// Whether the attribute accepts writes.
  fn is_attribute_settable(&self, name: &str) -> ProviderResult<bool>;

  /// Child handles in provider order. Empty if none or unsupported.
  fn children(&self) -> ProviderResult<Vec<Self>>;

  /// Names of the actions this element supports.
  fn supported_actions(&self) -> ProviderResult<Vec<String>>;

  /// Invoke an action by name.
  fn perform_action(&self, action: &str) -> ProviderResult<()>;

  /// Owning process, if the provider knows it.
  fn process_id(&self) -> Option<ProcessId>;
}

/// Application discovery: turns an identifier into a root element.
///
/// What an identifier means (bundle id, name, pid) is up to the implementor.
pub trait ApplicationResolver {
  /// Element handle type produced by this resolver.
  type Handle: ElementHandle;

  /// Root element for the named application.
  fn application(&self, identifier: &str) -> Option<Self::Handle>;

  /// Root element used when a query names no application.
  fn focused_application(&self) -> Option<Self::Handle> {
    None
  }
}
