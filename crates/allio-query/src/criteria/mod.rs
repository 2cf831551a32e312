/*!
What to look for.

- `criterion.rs` - [`Criterion`] and [`MatchType`], one attribute test
- `locator.rs` - [`Locator`] and path hints, plus the JSON wire format
- `matcher.rs` - [`CriteriaMatcher`], compiled criteria tested against elements
*/

mod criterion;
mod locator;
mod matcher;

pub use criterion::{describe_criteria, Criterion, MatchType, UnknownMatchType};
pub use locator::{Locator, PathHint, PathStep, DEFAULT_STEP_DEPTH};
pub use matcher::{matches, matches_all, matches_any, CriteriaMatcher};
