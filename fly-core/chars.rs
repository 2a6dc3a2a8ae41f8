//! Character classification used by word motions, word-boundary contexts
//! and bracket expansion.

use crate::line_ending::LineEnding;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum CharCategory {
  Whitespace,
  Eol,
  Word,
  Punctuation,
  Unknown,
}

pub fn categorize_char(ch: char) -> CharCategory {
  match ch {
    c if char_is_line_ending(c) => CharCategory::Eol,
    c if c.is_whitespace() => CharCategory::Whitespace,
    c if char_is_word(c) => CharCategory::Word,
    c if char_is_punctuation(c) => CharCategory::Punctuation,
    _ => CharCategory::Unknown,
  }
}

#[inline]
pub fn char_is_line_ending(ch: char) -> bool {
  LineEnding::from_char(ch).is_some()
}

#[inline]
pub fn char_is_punctuation(ch: char) -> bool {
  use unicode_general_category::{
    GeneralCategory,
    get_general_category,
  };

  matches!(
    get_general_category(ch),
    GeneralCategory::OtherPunctuation
      | GeneralCategory::OpenPunctuation
      | GeneralCategory::ClosePunctuation
      | GeneralCategory::InitialPunctuation
      | GeneralCategory::FinalPunctuation
      | GeneralCategory::ConnectorPunctuation
      | GeneralCategory::DashPunctuation
      | GeneralCategory::MathSymbol
      | GeneralCategory::CurrencySymbol
      | GeneralCategory::ModifierSymbol
  )
}

#[inline]
pub fn char_is_word(ch: char) -> bool {
  ch.is_alphanumeric() || ch == '_'
}

/// Whether a position between `prev` and `next` is a word boundary in the
/// `\b` sense: exactly one side is a word character. Buffer edges count as
/// non-word characters.
#[inline]
pub fn is_word_boundary(prev: Option<char>, next: Option<char>) -> bool {
  prev.is_some_and(char_is_word) != next.is_some_and(char_is_word)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn categorize() {
    assert_eq!(categorize_char('\n'), CharCategory::Eol);
    assert_eq!(categorize_char(' '), CharCategory::Whitespace);
    assert_eq!(categorize_char('\t'), CharCategory::Whitespace);
    assert_eq!(categorize_char('a'), CharCategory::Word);
    assert_eq!(categorize_char('_'), CharCategory::Word);
    assert_eq!(categorize_char('7'), CharCategory::Word);
    assert_eq!(categorize_char('('), CharCategory::Punctuation);
    assert_eq!(categorize_char('+'), CharCategory::Punctuation);
  }

  #[test]
  fn word_boundaries() {
    assert!(is_word_boundary(None, Some('a')));
    assert!(is_word_boundary(Some('a'), None));
    assert!(is_word_boundary(Some('a'), Some(' ')));
    assert!(is_word_boundary(Some('('), Some('x')));
    assert!(!is_word_boundary(Some('a'), Some('b')));
    assert!(!is_word_boundary(Some(' '), Some('(')));
    assert!(!is_word_boundary(None, None));
  }
}
