//! Scope probing.
//!
//! Hosts classify every offset with a space separated stack of dotted scope
//! names, e.g. `source.python string.quoted.double.python`. The core only
//! needs two questions answered: which scopes sit at an offset, and which
//! region around an offset matches a selector.
//!
//! Selectors are a small subset of the usual syntax: a space separated list of
//! prefixes that must all be present, optionally followed by `- <selector>`
//! naming prefixes that must be absent.
//!
//! ```ignore
//! use fly_lib::scope::Selector;
//!
//! let selector = Selector::parse("string - punctuation.definition.string");
//! assert!(selector.matches("source.python string.quoted.double.python"));
//! ```

use crate::selection::Region;

/// Scope information for a buffer.
pub trait ScopeProbe {
  /// Scope stack at `pos`, atoms separated by spaces. Empty for plain text.
  fn scope_name(&self, pos: usize) -> String;

  /// The largest region around `pos` whose scopes match `selector`.
  fn expand_to_scope(&self, pos: usize, selector: &Selector) -> Option<Region>;
}

/// Whether the scope stack `scopes` contains `prefix` as one of its atoms or
/// as a dotted prefix of one.
pub fn has_scope(scopes: &str, prefix: &str) -> bool {
  scopes.split_whitespace().any(|atom| {
    atom
      .strip_prefix(prefix)
      .is_some_and(|rest| rest.is_empty() || rest.starts_with('.'))
  })
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Selector {
  include: Vec<String>,
  exclude: Vec<String>,
}

impl Selector {
  pub fn parse(selector: &str) -> Self {
    let (include, exclude) = match selector.split_once(" - ") {
      Some((include, exclude)) => (include, exclude),
      None => (selector, ""),
    };
    let atoms = |text: &str| -> Vec<String> {
      text.split_whitespace().map(str::to_owned).collect()
    };
    Self {
      include: atoms(include),
      exclude: atoms(exclude),
    }
  }

  pub fn matches(&self, scopes: &str) -> bool {
    !self.include.is_empty()
      && self.include.iter().all(|prefix| has_scope(scopes, prefix))
      && !self.exclude.iter().any(|prefix| has_scope(scopes, prefix))
  }
}

/// Plain text: no scopes anywhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoScopes;

impl ScopeProbe for NoScopes {
  fn scope_name(&self, _pos: usize) -> String {
    String::new()
  }

  fn expand_to_scope(&self, _pos: usize, _selector: &Selector) -> Option<Region> {
    None
  }
}

/// Scopes given as explicit spans. A span covers `begin..end`; spans may
/// nest, and the scope name at an offset joins every span covering it,
/// outermost first.
#[derive(Debug, Clone, Default)]
pub struct SpanScopes {
  spans: Vec<(Region, String)>,
}

impl SpanScopes {
  pub fn new() -> Self {
    Self::default()
  }

  #[must_use]
  pub fn with_span(mut self, begin: usize, end: usize, scope: &str) -> Self {
    self.spans.push((Region::new(begin, end), scope.to_owned()));
    self
  }
}

impl ScopeProbe for SpanScopes {
  fn scope_name(&self, pos: usize) -> String {
    let mut covering: Vec<&(Region, String)> = self
      .spans
      .iter()
      .filter(|(region, _)| region.contains(pos))
      .collect();
    covering.sort_by_key(|(region, _)| std::cmp::Reverse(region.len()));
    covering
      .into_iter()
      .map(|(_, scope)| scope.as_str())
      .collect::<Vec<_>>()
      .join(" ")
  }

  fn expand_to_scope(&self, pos: usize, selector: &Selector) -> Option<Region> {
    if !selector.matches(&self.scope_name(pos)) {
      return None;
    }

    let mut begin = pos;
    while begin > 0 && selector.matches(&self.scope_name(begin - 1)) {
      begin -= 1;
    }
    let end = self
      .spans
      .iter()
      .map(|(region, _)| region.end())
      .max()
      .unwrap_or(pos);
    let mut cursor = pos;
    while cursor < end && selector.matches(&self.scope_name(cursor)) {
      cursor += 1;
    }
    Some(Region::new(begin, cursor))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn prefixes_match_whole_atoms() {
    let scopes = "source.python string.quoted.double.python";
    assert!(has_scope(scopes, "string"));
    assert!(has_scope(scopes, "string.quoted"));
    assert!(has_scope(scopes, "string.quoted.double"));
    assert!(!has_scope(scopes, "string.quoted.single"));
    assert!(!has_scope(scopes, "str"));
    assert!(!has_scope("", "string"));
  }

  #[test]
  fn selector_exclusion() {
    let selector = Selector::parse("string - punctuation.definition.string");
    assert!(selector.matches("source string.quoted.double"));
    assert!(!selector.matches(
      "source string.quoted.double punctuation.definition.string.begin"
    ));
    assert!(!selector.matches("source"));
    assert!(!Selector::parse("").matches("source"));
  }

  #[test]
  fn span_scopes_nest() {
    // s = "ab"
    let scopes = SpanScopes::new()
      .with_span(0, 8, "source.python")
      .with_span(4, 8, "string.quoted.double")
      .with_span(4, 5, "punctuation.definition.string.begin")
      .with_span(7, 8, "punctuation.definition.string.end");

    assert_eq!(scopes.scope_name(0), "source.python");
    assert_eq!(
      scopes.scope_name(4),
      "source.python string.quoted.double punctuation.definition.string.begin"
    );
    assert_eq!(scopes.scope_name(5), "source.python string.quoted.double");
    assert_eq!(scopes.scope_name(8), "");

    let selector = Selector::parse("string - punctuation.definition.string");
    assert_eq!(scopes.expand_to_scope(6, &selector), Some(Region::new(5, 7)));
    assert_eq!(scopes.expand_to_scope(2, &selector), None);
    assert_eq!(NoScopes.expand_to_scope(2, &selector), None);
  }
}
