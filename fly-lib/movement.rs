//! Movement direction and word motions.
//!
//! ```ignore
//! use fly_lib::movement::{Direction, next_word_start};
//!
//! let text = ropey::Rope::from("one two");
//! assert_eq!(next_word_start(text.slice(..), 0), 4);
//! ```

use fly_core::chars::{
  CharCategory,
  categorize_char,
};
use ropey::RopeSlice;

/// The direction of cursor movement or selection extension.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Direction {
  /// Moving toward the end of the document (increasing positions).
  Forward,
  /// Moving toward the start of the document (decreasing positions).
  Backward,
}

impl Direction {
  #[inline]
  pub fn from_forward(forward: bool) -> Self {
    if forward { Self::Forward } else { Self::Backward }
  }
}

// Line endings count as whitespace for word motions.
fn category(ch: char) -> CharCategory {
  match categorize_char(ch) {
    CharCategory::Eol => CharCategory::Whitespace,
    category => category,
  }
}

/// Offset of the start of the next word after `pos`, or the end of the text.
pub fn next_word_start(text: RopeSlice, pos: usize) -> usize {
  let len = text.len_chars();
  let mut pos = pos.min(len);
  if pos == len {
    return len;
  }

  let start = category(text.char(pos));
  if start != CharCategory::Whitespace {
    while pos < len && category(text.char(pos)) == start {
      pos += 1;
    }
  }
  while pos < len && category(text.char(pos)) == CharCategory::Whitespace {
    pos += 1;
  }
  pos
}

/// Offset of the start of the word before `pos`, or 0.
pub fn prev_word_start(text: RopeSlice, pos: usize) -> usize {
  let mut pos = pos.min(text.len_chars());
  while pos > 0 && category(text.char(pos - 1)) == CharCategory::Whitespace {
    pos -= 1;
  }
  if pos == 0 {
    return 0;
  }

  let word = category(text.char(pos - 1));
  while pos > 0 && category(text.char(pos - 1)) == word {
    pos -= 1;
  }
  pos
}
