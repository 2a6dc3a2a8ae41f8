//! Regex search over ropes.
//!
//! `regex-cursor` runs the `regex-automata` meta engine directly over rope
//! chunks, so searching never copies the buffer into a contiguous string.

use std::ops::{
  Bound,
  RangeBounds,
};

pub use regex_cursor::{
  engines::meta::{
    Builder as RegexBuilder,
    Regex,
  },
  regex_automata::{
    Match,
    util::syntax::Config,
  },
};
use regex_cursor::{
  Input as RegexInput,
  RopeyCursor,
};
pub use regex_syntax::escape;
use ropey::RopeSlice;

pub trait RopeSliceExt<'a>: Sized {
  /// The whole slice as regex input.
  fn regex_input(self) -> RegexInput<RopeyCursor<'a>>;

  /// Regex input restricted to a byte range of the slice. Match offsets stay
  /// relative to the start of the slice.
  fn regex_input_at_bytes<R: RangeBounds<usize>>(
    self,
    byte_range: R,
  ) -> RegexInput<RopeyCursor<'a>>;

  /// Regex input restricted to a char range of the slice.
  fn regex_input_at<R: RangeBounds<usize>>(self, char_range: R) -> RegexInput<RopeyCursor<'a>>;

  /// Char index of the first char on `line_idx` that is not a space, tab or
  /// line ending. `None` when the line is blank.
  fn first_non_blank_char(self, line_idx: usize) -> Option<usize>;
}

impl<'a> RopeSliceExt<'a> for RopeSlice<'a> {
  fn regex_input(self) -> RegexInput<RopeyCursor<'a>> {
    RegexInput::new(RopeyCursor::new(self))
  }

  fn regex_input_at_bytes<R: RangeBounds<usize>>(
    self,
    byte_range: R,
  ) -> RegexInput<RopeyCursor<'a>> {
    let start = match byte_range.start_bound() {
      Bound::Included(&pos) => pos,
      Bound::Excluded(&pos) => pos + 1,
      Bound::Unbounded => 0,
    };
    let end = match byte_range.end_bound() {
      Bound::Included(&pos) => pos + 1,
      Bound::Excluded(&pos) => pos,
      Bound::Unbounded => self.len_bytes(),
    };
    let end = end.min(self.len_bytes());
    let start = start.min(end);
    RegexInput::new(RopeyCursor::at(self, start)).range(start..end)
  }

  fn regex_input_at<R: RangeBounds<usize>>(self, char_range: R) -> RegexInput<RopeyCursor<'a>> {
    let start = match char_range.start_bound() {
      Bound::Included(&pos) => Bound::Included(self.char_to_byte(pos)),
      Bound::Excluded(&pos) => Bound::Excluded(self.char_to_byte(pos)),
      Bound::Unbounded => Bound::Unbounded,
    };
    let end = match char_range.end_bound() {
      Bound::Included(&pos) => Bound::Included(self.char_to_byte(pos)),
      Bound::Excluded(&pos) => Bound::Excluded(self.char_to_byte(pos)),
      Bound::Unbounded => Bound::Unbounded,
    };
    self.regex_input_at_bytes((start, end))
  }

  fn first_non_blank_char(self, line_idx: usize) -> Option<usize> {
    let start = self.line_to_char(line_idx);
    self
      .line(line_idx)
      .chars()
      .position(|ch| !matches!(ch, ' ' | '\t' | '\n' | '\r'))
      .map(|offset| start + offset)
  }
}

/// Error raised when a pattern fails to compile.
pub type BuildError = Box<dyn std::error::Error + Send + Sync>;

/// Builds a literal regex for `needle`. With `case_insensitive` the match
/// folds case.
pub fn literal_regex(needle: &str, case_insensitive: bool) -> Result<Regex, BuildError> {
  RegexBuilder::new()
    .syntax(Config::new().case_insensitive(case_insensitive))
    .build(&escape(needle))
    .map_err(Into::into)
}

#[cfg(test)]
mod tests {
  use ropey::Rope;

  use super::*;

  #[test]
  fn literal_regex_compiles_every_meta_character() {
    let text = Rope::from(r"x = a[0].b?(c|d)*+{e}^$\");
    let needle = r"[0].b?(c|d)*+{e}^$\";
    let regex = literal_regex(needle, false).unwrap();
    let found = regex.find(text.slice(..).regex_input()).unwrap();
    assert_eq!((found.start(), found.end()), (5, text.len_bytes()));
  }

  #[test]
  fn literal_regex_matches_punctuation() {
    let text = Rope::from("f(x) = a.b");
    let regex = literal_regex("a.", false).unwrap();
    let found = regex.find(text.slice(..).regex_input()).unwrap();
    assert_eq!((found.start(), found.end()), (7, 9));

    let regex = literal_regex("(", false).unwrap();
    let found = regex.find(text.slice(..).regex_input()).unwrap();
    assert_eq!(found.start(), 1);
  }

  #[test]
  fn case_folding() {
    let text = Rope::from("Foo foo");
    let regex = literal_regex("fo", true).unwrap();
    let found = regex.find(text.slice(..).regex_input()).unwrap();
    assert_eq!(found.start(), 0);

    let regex = literal_regex("Fo", false).unwrap();
    let starts: Vec<_> = regex
      .find_iter(text.slice(..).regex_input())
      .map(|m| m.start())
      .collect();
    assert_eq!(starts, vec![0]);
  }

  #[test]
  fn bounded_input() {
    let text = Rope::from("ab ab ab");
    let slice = text.slice(..);
    let regex = literal_regex("ab", false).unwrap();

    let starts: Vec<_> = regex
      .find_iter(slice.regex_input_at(1..))
      .map(|m| m.start())
      .collect();
    assert_eq!(starts, vec![3, 6]);

    let starts: Vec<_> = regex
      .find_iter(slice.regex_input_at(..5))
      .map(|m| m.start())
      .collect();
    assert_eq!(starts, vec![0, 3]);
  }

  #[test]
  fn first_non_blank() {
    let text = Rope::from("  \tx\n\n  \nend");
    let slice = text.slice(..);
    assert_eq!(slice.first_non_blank_char(0), Some(3));
    assert_eq!(slice.first_non_blank_char(1), None);
    assert_eq!(slice.first_non_blank_char(2), None);
    assert_eq!(slice.first_non_blank_char(3), Some(9));
  }
}
