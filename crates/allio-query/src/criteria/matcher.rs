/*!
Criterion matching.

Criteria are compiled once ([`CriteriaMatcher::new`]) and then tested
against many elements. Compilation resolves attribute aliases, lowercases
the expected value for the case-insensitive modes, splits `containsAny`
fragments and compiles regexes, so a bad pattern fails before traversal.

A missing attribute is a non-match, never an error. Provider failures are
errors and propagate.
*/

use regex::Regex;

use super::criterion::{Criterion, MatchType};
use crate::a11y::{parse_flag, AttributeKey, AttributeValue};
use crate::accessor;
use crate::provider::ElementHandle;
use crate::types::{Diagnostics, QueryError, QueryResult};

#[derive(Debug, Clone)]
struct CompiledCriterion {
  key: AttributeKey,
  mode: MatchType,
  expected: String,
  expected_lower: String,
  fragments: Vec<String>,
  regex: Option<Regex>,
}

impl CompiledCriterion {
  fn compile(criterion: &Criterion) -> QueryResult<Self> {
    let regex = if criterion.match_type == MatchType::Regex {
      let compiled = Regex::new(&criterion.value).map_err(|e| QueryError::InvalidPattern {
        pattern: criterion.value.clone(),
        reason: e.to_string(),
      })?;
      Some(compiled)
    } else {
      None
    };
    let fragments = if criterion.match_type == MatchType::ContainsAny {
      criterion
        .value
        .split(',')
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(str::to_lowercase)
        .collect()
    } else {
      Vec::new()
    };

    Ok(Self {
      key: AttributeKey::parse(&criterion.attribute),
      mode: criterion.match_type,
      expected: criterion.value.clone(),
      expected_lower: criterion.value.to_lowercase(),
      fragments,
      regex,
    })
  }

  fn matches<H: ElementHandle>(&self, element: &H, diagnostics: &mut Diagnostics) -> QueryResult<bool> {
    let Some(actual) = accessor::read(element, &self.key)? else {
      if self.key.is_structural() {
        diagnostics.record_missing_structural(&self.key.to_string());
      }
      return Ok(false);
    };

    let matched = match (&self.key, self.mode) {
      (AttributeKey::ProcessId, MatchType::Exact) => self.exact_integer(&actual),
      (AttributeKey::Ignored, MatchType::Exact) => self.exact_flag(&actual),
      (AttributeKey::ComputedName, MatchType::Exact) => actual
        .as_str()
        .is_some_and(|name| name.to_lowercase() == self.expected_lower),
      _ => match actual.as_list() {
        Some(entries) => entries
          .iter()
          .any(|entry| self.test_text(&entry.to_match_string())),
        None => self.test_text(&actual.to_match_string()),
      },
    };

    log::trace!(
      "{} {} {:?} against {actual:?} on {element:?}: {matched}",
      self.key,
      self.mode,
      self.expected
    );
    Ok(matched)
  }

  fn exact_integer(&self, actual: &AttributeValue) -> bool {
    match (actual.as_i64(), self.expected.trim().parse::<i64>()) {
      (Some(actual), Ok(expected)) => actual == expected,
      _ => false,
    }
  }

  fn exact_flag(&self, actual: &AttributeValue) -> bool {
    let actual = actual.as_flag().unwrap_or(false);
    parse_flag(&self.expected).is_some_and(|expected| expected == actual)
  }

  fn test_text(&self, text: &str) -> bool {
    match self.mode {
      MatchType::Exact => text == self.expected,
      MatchType::Contains => text.to_lowercase().contains(&self.expected_lower),
      MatchType::Prefix => text.starts_with(&self.expected),
      MatchType::Suffix => text.ends_with(&self.expected),
      MatchType::ContainsAny => {
        let lower = text.to_lowercase();
        self.fragments.iter().any(|f| lower.contains(f.as_str()))
      }
      MatchType::Regex => self.regex.as_ref().is_some_and(|re| re.is_match(text)),
    }
  }
}

/// Compiled criteria plus the all/any combinator.
#[derive(Debug, Clone)]
pub struct CriteriaMatcher {
  source: Vec<Criterion>,
  compiled: Vec<CompiledCriterion>,
  match_all: bool,
}

impl CriteriaMatcher {
  /// Compile `criteria`. Fails with `InvalidPattern` on a bad regex.
  pub fn new(criteria: &[Criterion], match_all: bool) -> QueryResult<Self> {
    let compiled = criteria
      .iter()
      .map(CompiledCriterion::compile)
      .collect::<QueryResult<Vec<_>>>()?;
    Ok(Self {
      source: criteria.to_vec(),
      compiled,
      match_all,
    })
  }

  pub fn criteria(&self) -> &[Criterion] {
    &self.source
  }

  pub fn is_empty(&self) -> bool {
    self.compiled.is_empty()
  }

  pub const fn is_match_all(&self) -> bool {
    self.match_all
  }

  /// Test with the configured combinator.
  pub fn matches<H: ElementHandle>(&self, element: &H, diagnostics: &mut Diagnostics) -> QueryResult<bool> {
    if self.match_all {
      self.matches_all(element, diagnostics)
    } else {
      self.matches_any(element, diagnostics)
    }
  }

  /// Every criterion matches. True for no criteria.
  pub fn matches_all<H: ElementHandle>(&self, element: &H, diagnostics: &mut Diagnostics) -> QueryResult<bool> {
    for criterion in &self.compiled {
      if !criterion.matches(element, diagnostics)? {
        return Ok(false);
      }
    }
    Ok(true)
  }

  /// At least one criterion matches. False for no criteria.
  pub fn matches_any<H: ElementHandle>(&self, element: &H, diagnostics: &mut Diagnostics) -> QueryResult<bool> {
    for criterion in &self.compiled {
      if criterion.matches(element, diagnostics)? {
        return Ok(true);
      }
    }
    Ok(false)
  }
}

/// Test a single criterion against an element.
pub fn matches<H: ElementHandle>(
  element: &H,
  criterion: &Criterion,
  diagnostics: &mut Diagnostics,
) -> QueryResult<bool> {
  CompiledCriterion::compile(criterion)?.matches(element, diagnostics)
}

/// Every criterion matches. True for no criteria.
pub fn matches_all<H: ElementHandle>(
  element: &H,
  criteria: &[Criterion],
  diagnostics: &mut Diagnostics,
) -> QueryResult<bool> {
  CriteriaMatcher::new(criteria, true)?.matches_all(element, diagnostics)
}

/// At least one criterion matches. False for no criteria.
pub fn matches_any<H: ElementHandle>(
  element: &H,
  criteria: &[Criterion],
  diagnostics: &mut Diagnostics,
) -> QueryResult<bool> {
  CriteriaMatcher::new(criteria, false)?.matches_any(element, diagnostics)
}
