/*!
Attribute accessor - the single gateway from the engine to a provider.

Every read goes through here so that provider-native values are normalized
into [`AttributeValue`] exactly once, and pseudo attributes (process id,
ignored flag, computed name) are resolved the same way everywhere.

- `read*` = attribute reads (missing is `Ok(None)`, not an error)
- `write` / `perform` = provider writes, checked first
- `children` / `supported_actions` = structural reads
*/

use crate::a11y::{action_names_match, AttributeKey, AttributeValue};
use crate::provider::ElementHandle;
use crate::types::{QueryError, QueryResult};

/// Keys tried, in order, for the computed accessible name.
const COMPUTED_NAME_SOURCES: [AttributeKey; 5] = [
  AttributeKey::Title,
  AttributeKey::Description,
  AttributeKey::Value,
  AttributeKey::Placeholder,
  AttributeKey::Help,
];

/// Read the attribute behind `key`.
///
/// Provider failures propagate as `ProviderUnavailable`. `Null` values are
/// reported as missing.
pub fn read<H: ElementHandle>(element: &H, key: &AttributeKey) -> QueryResult<Option<AttributeValue>> {
  let value = match key {
    AttributeKey::ProcessId => element
      .process_id()
      .map(|pid| AttributeValue::from(pid.0)),
    AttributeKey::ComputedName => computed_name(element)?.map(AttributeValue::String),
    AttributeKey::Ignored => Some(AttributeValue::Bool(is_ignored(element)?)),
    other => match other.provider_name() {
      Some(name) => read_raw(element, name)?,
      None => None,
    },
  };
  Ok(value)
}

/// Read an attribute by (possibly aliased) name.
pub fn read_named<H: ElementHandle>(element: &H, name: &str) -> QueryResult<Option<AttributeValue>> {
  read(element, &AttributeKey::parse(name))
}

/// Read an attribute that must be present.
pub fn read_required<H: ElementHandle>(element: &H, name: &str) -> QueryResult<AttributeValue> {
  read_named(element, name)?.ok_or_else(|| QueryError::AttributeNotReadable(name.to_owned()))
}

fn read_raw<H: ElementHandle>(element: &H, name: &str) -> QueryResult<Option<AttributeValue>> {
  let value = element
    .attribute(name)?
    .map(Into::into)
    .filter(|v: &AttributeValue| !v.is_null());
  Ok(value)
}

fn computed_name<H: ElementHandle>(element: &H) -> QueryResult<Option<String>> {
  for key in &COMPUTED_NAME_SOURCES {
    let Some(name) = key.provider_name() else {
      continue;
    };
    if let Some(AttributeValue::String(text)) = read_raw(element, name)? {
      if !text.trim().is_empty() {
        return Ok(Some(text));
      }
    }
  }
  Ok(None)
}

/// Whether the provider flags this element as ignored. Absent means no.
pub fn is_ignored<H: ElementHandle>(element: &H) -> QueryResult<bool> {
  let flag = AttributeKey::Ignored
    .provider_name()
    .map(|name| read_raw(element, name))
    .transpose()?
    .flatten()
    .and_then(|v| v.as_flag());
  Ok(flag.unwrap_or(false))
}

/// Write an attribute after checking it is settable.
pub fn write<H: ElementHandle>(element: &H, name: &str, value: &AttributeValue) -> QueryResult<()> {
  let key = AttributeKey::parse(name);
  let Some(provider_name) = key.provider_name() else {
    return Err(QueryError::AttributeNotSettable(key.to_string()));
  };
  if !element.is_attribute_settable(provider_name)? {
    return Err(QueryError::AttributeNotSettable(provider_name.to_owned()));
  }
  log::debug!("Setting {provider_name} ({:?}) on {element:?}", value.kind());
  element.set_attribute(provider_name, value)?;
  Ok(())
}

/// Child handles, in provider order.
pub fn children<H: ElementHandle>(element: &H) -> QueryResult<Vec<H>> {
  Ok(element.children()?)
}

pub fn supported_actions<H: ElementHandle>(element: &H) -> QueryResult<Vec<String>> {
  Ok(element.supported_actions()?)
}

/// Provider name of a supported action matching `action`, if any.
pub fn find_action<H: ElementHandle>(element: &H, action: &str) -> QueryResult<Option<String>> {
  Ok(
    supported_actions(element)?
      .into_iter()
      .find(|supported| action_names_match(supported, action)),
  )
}

pub fn supports_action<H: ElementHandle>(element: &H, action: &str) -> QueryResult<bool> {
  Ok(find_action(element, action)?.is_some())
}

/// Perform an action after checking the element supports it.
pub fn perform<H: ElementHandle>(element: &H, action: &str) -> QueryResult<()> {
  let Some(provider_action) = find_action(element, action)? else {
    return Err(QueryError::ActionUnsupported(action.to_owned()));
  };
  log::debug!("Performing {provider_action} on {element:?}");
  element.perform_action(&provider_action)?;
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::a11y::names;
  use crate::provider::{MemoryTree, Node};
  use crate::types::ProviderError;

  fn tree() -> MemoryTree {
    MemoryTree::new(Node::new("AXApplication").title("Notes").pid(42))
  }

  #[test]
  fn reads_through_aliases() {
    let tree = tree();
    let root = tree.root();
    assert_eq!(read_named(&root, "role").unwrap(), Some("AXApplication".into()));
    assert_eq!(read_named(&root, "TITLE").unwrap(), Some("Notes".into()));
    assert_eq!(read_named(&root, "pid").unwrap(), Some(AttributeValue::Integer(42)));
    assert_eq!(read_named(&root, "AXHelp").unwrap(), None);
  }

  #[test]
  fn null_counts_as_missing() {
    let tree = tree();
    tree.update(&tree.root(), names::HELP, AttributeValue::Null);
    assert_eq!(read_named(&tree.root(), "help").unwrap(), None);
  }

  #[test]
  fn computed_name_falls_back() {
    let tree = tree();
    let field = tree.append(
      &tree.root(),
      Node::new("AXTextField").attr(names::TITLE, "  ").description("Search"),
    );
    assert_eq!(read_named(&field, "name").unwrap(), Some("Search".into()));

    let bare = tree.append(&tree.root(), Node::new("AXGroup"));
    assert_eq!(read_named(&bare, "name").unwrap(), None);
  }

  #[test]
  fn ignored_defaults_to_false() {
    let tree = tree();
    let hidden = tree.append(&tree.root(), Node::new("AXGroup").ignored());
    let flagged_text = tree.append(&tree.root(), Node::new("AXGroup").attr(names::IGNORED, "yes"));
    assert!(!is_ignored(&tree.root()).unwrap());
    assert!(is_ignored(&hidden).unwrap());
    assert!(is_ignored(&flagged_text).unwrap());
  }

  #[test]
  fn required_reads() {
    let tree = tree();
    assert!(read_required(&tree.root(), "title").is_ok());
    assert!(matches!(
      read_required(&tree.root(), "AXURL"),
      Err(QueryError::AttributeNotReadable(name)) if name == "AXURL"
    ));
  }

  #[test]
  fn write_checks_settable() {
    let tree = tree();
    let field = tree.append(&tree.root(), Node::new("AXTextField").settable(names::VALUE));
    write(&field, "value", &"hello".into()).unwrap();
    assert_eq!(read_named(&field, "value").unwrap(), Some("hello".into()));

    assert!(matches!(
      write(&field, "title", &"x".into()),
      Err(QueryError::AttributeNotSettable(name)) if name == names::TITLE
    ));
    assert!(matches!(
      write(&field, "pid", &"1".into()),
      Err(QueryError::AttributeNotSettable(_))
    ));
  }

  #[test]
  fn perform_resolves_action_names() {
    let tree = tree();
    let button = tree.append(&tree.root(), Node::new("AXButton").action("AXPress"));
    assert!(supports_action(&button, "press").unwrap());
    perform(&button, "press").unwrap();
    assert_eq!(tree.performed_actions(&button), vec!["AXPress".to_owned()]);

    assert!(matches!(
      perform(&button, "AXShowMenu"),
      Err(QueryError::ActionUnsupported(_))
    ));
  }

  #[test]
  fn stale_handles_surface_as_provider_errors() {
    let tree = tree();
    let button = tree.append(&tree.root(), Node::new("AXButton"));
    tree.invalidate(&button);
    assert!(matches!(
      read_named(&button, "role"),
      Err(QueryError::ProviderUnavailable(ProviderError::InvalidElement))
    ));
    assert!(matches!(
      children(&button),
      Err(QueryError::ProviderUnavailable(_))
    ));
  }
}
