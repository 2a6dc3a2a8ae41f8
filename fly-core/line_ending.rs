use ropey::RopeSlice;

/// The line breaks ropey is built to recognize (`cr_lines`, without the
/// extra unicode separators).
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub enum LineEnding {
  /// CarriageReturn followed by LineFeed.
  Crlf,

  /// U+000A -- LineFeed
  LF,

  /// U+000D -- CarriageReturn
  CR,
}

impl LineEnding {
  #[inline]
  pub const fn len_chars(&self) -> usize {
    match self {
      Self::Crlf => 2,
      _ => 1,
    }
  }

  #[inline]
  pub const fn from_char(ch: char) -> Option<LineEnding> {
    match ch {
      '\u{000A}' => Some(LineEnding::LF),
      '\u{000D}' => Some(LineEnding::CR),
      _ => None,
    }
  }
}

/// Returns the passed line's line ending, if any.
pub fn get_line_ending(line: &RopeSlice) -> Option<LineEnding> {
  let len = line.len_chars();
  let last = len.checked_sub(1).map(|idx| line.char(idx))?;
  let before_last = len.checked_sub(2).map(|idx| line.char(idx));

  match (before_last, last) {
    (Some('\u{000D}'), '\u{000A}') => Some(LineEnding::Crlf),
    (_, ch) => LineEnding::from_char(ch),
  }
}

/// Returns the char index of the end of the given line, not including its line
/// ending.
pub fn line_end_char_index(slice: &RopeSlice, line: usize) -> usize {
  slice.line_to_char(line + 1)
    - get_line_ending(&slice.line(line))
      .map(|le| le.len_chars())
      .unwrap_or(0)
}

#[cfg(test)]
mod line_ending_tests {
  use ropey::Rope;

  use super::*;

  #[test]
  fn char_to_line_ending() {
    assert_eq!(LineEnding::from_char('\r'), Some(LineEnding::CR));
    assert_eq!(LineEnding::from_char('\n'), Some(LineEnding::LF));
    assert_eq!(LineEnding::from_char('x'), None);
    assert_eq!(LineEnding::Crlf.len_chars(), 2);
    assert_eq!(LineEnding::LF.len_chars(), 1);
  }

  #[test]
  fn get_line_ending_rope_slice() {
    let r = Rope::from_str("Hello\rworld\nhow\r\nare you?");

    assert_eq!(get_line_ending(&r.slice(..6)), Some(LineEnding::CR));
    assert_eq!(get_line_ending(&r.slice(..12)), Some(LineEnding::LF));
    assert_eq!(get_line_ending(&r.slice(..17)), Some(LineEnding::Crlf));
    assert_eq!(get_line_ending(&r.slice(..)), None);
    assert_eq!(get_line_ending(&r.slice(0..0)), None);
  }

  #[test]
  fn line_end_char_index_rope_slice() {
    let r = Rope::from_str("Hello\rworld\nhow\r\nare you?");
    let s = &r.slice(..);

    assert_eq!(line_end_char_index(s, 0), 5);
    assert_eq!(line_end_char_index(s, 1), 11);
    assert_eq!(line_end_char_index(s, 2), 15);
    assert_eq!(line_end_char_index(s, 3), 25);
  }
}
