/*!
Cross-platform accessibility vocabulary: attribute names and values.

Platform-specific value types are converted into [`AttributeValue`] at the
provider boundary; everything past it speaks only these types.
*/

mod attribute;
mod value;

pub use attribute::{action_names_match, names, roles, AttributeKey};
pub use value::{parse_flag, AttributeValue, ValueKind};
