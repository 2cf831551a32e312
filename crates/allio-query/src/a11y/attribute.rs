/*!
Attribute names and their normalization.

Locators name attributes loosely ("role", "Title", "AXIdentifier"). Before
any provider lookup the name is resolved to an [`AttributeKey`]: one of the
well-known provider attributes, one of the pseudo attributes the engine
computes itself, or the original name passed through verbatim.
*/

use std::fmt;

/// Provider attribute name constants (kAX*Attribute).
#[allow(missing_docs)]
pub mod names {
  pub const ROLE: &str = "AXRole";
  pub const SUBROLE: &str = "AXSubrole";
  pub const TITLE: &str = "AXTitle";
  pub const IDENTIFIER: &str = "AXIdentifier";
  pub const DESCRIPTION: &str = "AXDescription";
  pub const VALUE: &str = "AXValue";
  pub const HELP: &str = "AXHelp";
  pub const PLACEHOLDER: &str = "AXPlaceholderValue";
  pub const ENABLED: &str = "AXEnabled";
  pub const FOCUSED: &str = "AXFocused";
  pub const DOM_CLASS_LIST: &str = "AXDOMClassList";
  pub const DOM_IDENTIFIER: &str = "AXDOMIdentifier";
  pub const IGNORED: &str = "AXIgnored";
}

/// Role values with special meaning to path resolution.
#[allow(missing_docs)]
pub mod roles {
  pub const APPLICATION: &str = "AXApplication";
}

/// Resolved attribute name.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AttributeKey {
  Role,
  Subrole,
  Title,
  Identifier,
  Description,
  Value,
  Help,
  Placeholder,
  Enabled,
  Focused,
  ClassList,
  DomIdentifier,
  /// Owning process, read through the provider's process id call.
  ProcessId,
  /// Provider "ignored" flag. Absent means not ignored.
  Ignored,
  /// First non-empty of title, description, string value, placeholder, help.
  ComputedName,
  /// Anything else, passed to the provider exactly as written.
  Other(String),
}

impl AttributeKey {
  /// Resolve an attribute name.
  ///
  /// Known aliases are matched case-insensitively, with or without the
  /// `AX` prefix. Unknown names are kept verbatim.
  ///
  /// ```
  /// use allio_query::a11y::AttributeKey;
  ///
  /// assert_eq!(AttributeKey::parse("role"), AttributeKey::Role);
  /// assert_eq!(AttributeKey::parse("AXRole"), AttributeKey::Role);
  /// assert_eq!(AttributeKey::parse("ID"), AttributeKey::Identifier);
  /// assert_eq!(
  ///   AttributeKey::parse("AXSelectedText"),
  ///   AttributeKey::Other("AXSelectedText".into())
  /// );
  /// ```
  pub fn parse(name: &str) -> Self {
    let lowered = name.trim().to_ascii_lowercase();
    Self::from_alias(&lowered)
      .or_else(|| lowered.strip_prefix("ax").and_then(Self::from_alias))
      .unwrap_or_else(|| Self::Other(name.to_owned()))
  }

  fn from_alias(alias: &str) -> Option<Self> {
    let key = match alias {
      "role" => Self::Role,
      "subrole" => Self::Subrole,
      "title" => Self::Title,
      "id" | "identifier" => Self::Identifier,
      "description" | "desc" => Self::Description,
      "value" => Self::Value,
      "help" => Self::Help,
      "placeholder" | "placeholdervalue" => Self::Placeholder,
      "enabled" => Self::Enabled,
      "focused" => Self::Focused,
      "class" | "classes" | "classlist" | "domclasslist" | "dom_class_list" => Self::ClassList,
      "domid" | "dom_id" | "domidentifier" => Self::DomIdentifier,
      "pid" | "processid" | "process_id" => Self::ProcessId,
      "ignored" | "isignored" | "is_ignored" => Self::Ignored,
      "name" | "computedname" | "computed_name" => Self::ComputedName,
      _ => return None,
    };
    Some(key)
  }

  /// Attribute name to ask the provider for. `None` for keys the engine
  /// computes without a single attribute read.
  pub fn provider_name(&self) -> Option<&str> {
    match self {
      Self::Role => Some(names::ROLE),
      Self::Subrole => Some(names::SUBROLE),
      Self::Title => Some(names::TITLE),
      Self::Identifier => Some(names::IDENTIFIER),
      Self::Description => Some(names::DESCRIPTION),
      Self::Value => Some(names::VALUE),
      Self::Help => Some(names::HELP),
      Self::Placeholder => Some(names::PLACEHOLDER),
      Self::Enabled => Some(names::ENABLED),
      Self::Focused => Some(names::FOCUSED),
      Self::ClassList => Some(names::DOM_CLASS_LIST),
      Self::DomIdentifier => Some(names::DOM_IDENTIFIER),
      Self::Ignored => Some(names::IGNORED),
      Self::Other(name) => Some(name.as_str()),
      Self::ProcessId | Self::ComputedName => None,
    }
  }

  /// Keys needed to tell elements of different apps and kinds apart.
  /// Their absence is worth a diagnostic.
  pub const fn is_structural(&self) -> bool {
    matches!(self, Self::Role | Self::ProcessId)
  }
}

impl fmt::Display for AttributeKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::ProcessId => f.write_str("pid"),
      Self::ComputedName => f.write_str("computedName"),
      other => f.write_str(other.provider_name().unwrap_or_default()),
    }
  }
}

/// Compare action names, tolerating a missing `AX` prefix and case.
///
/// ```
/// use allio_query::a11y::action_names_match;
///
/// assert!(action_names_match("AXPress", "press"));
/// assert!(action_names_match("AXShowMenu", "AXShowMenu"));
/// assert!(!action_names_match("AXPress", "AXPick"));
/// ```
pub fn action_names_match(supported: &str, wanted: &str) -> bool {
  fn bare(name: &str) -> &str {
    name.strip_prefix("AX").unwrap_or(name)
  }
  supported == wanted || bare(supported).eq_ignore_ascii_case(bare(wanted))
}
