//! Read-only access to a host buffer.
//!
//! A [`Buffer`] borrows the host's text and scope information for the length
//! of one command. Offsets are char indices; every accessor clamps to the
//! buffer instead of panicking.

use std::{
  borrow::Cow,
  num::NonZeroUsize,
};

use fly_core::line_ending::line_end_char_index;
use ropey::RopeSlice;

use crate::{
  movement::Direction,
  scope::{
    ScopeProbe,
    Selector,
  },
  search::BufferSlice,
  selection::Region,
};

/// Stable identity of a buffer. Views onto the same text share it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferId(NonZeroUsize);

impl BufferId {
  pub const fn new(id: NonZeroUsize) -> Self {
    Self(id)
  }

  pub const fn get(self) -> NonZeroUsize {
    self.0
  }
}

impl From<NonZeroUsize> for BufferId {
  fn from(value: NonZeroUsize) -> Self {
    Self::new(value)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewId(NonZeroUsize);

impl ViewId {
  pub const fn new(id: NonZeroUsize) -> Self {
    Self(id)
  }

  pub const fn get(self) -> NonZeroUsize {
    self.0
  }
}

impl From<NonZeroUsize> for ViewId {
  fn from(value: NonZeroUsize) -> Self {
    Self::new(value)
  }
}

#[derive(Clone, Copy)]
pub struct Buffer<'a> {
  id:        BufferId,
  text:      RopeSlice<'a>,
  scopes:    &'a dyn ScopeProbe,
  read_only: bool,
}

impl std::fmt::Debug for Buffer<'_> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Buffer")
      .field("id", &self.id)
      .field("size", &self.size())
      .field("read_only", &self.read_only)
      .finish_non_exhaustive()
  }
}

impl<'a> Buffer<'a> {
  pub fn new(
    id: BufferId,
    text: RopeSlice<'a>,
    scopes: &'a dyn ScopeProbe,
    read_only: bool,
  ) -> Self {
    Self {
      id,
      text,
      scopes,
      read_only,
    }
  }

  #[inline]
  pub fn id(&self) -> BufferId {
    self.id
  }

  #[inline]
  pub fn text(&self) -> RopeSlice<'a> {
    self.text
  }

  /// Number of chars in the buffer.
  #[inline]
  pub fn size(&self) -> usize {
    self.text.len_chars()
  }

  #[inline]
  pub fn is_read_only(&self) -> bool {
    self.read_only
  }

  /// Text in `[a, b)`, either order.
  pub fn substr(&self, a: usize, b: usize) -> Cow<'a, str> {
    let region = Region::new(a, b).clamp(self.size());
    self.text.slice(region.begin()..region.end()).into()
  }

  pub fn char_at(&self, pos: usize) -> Option<char> {
    self.text.get_char(pos)
  }

  /// Line containing `pos`, without its line ending.
  pub fn line_of(&self, pos: usize) -> Region {
    let line = self.text.char_to_line(pos.min(self.size()));
    Region::new(
      self.text.line_to_char(line),
      line_end_char_index(&self.text, line),
    )
  }

  /// Line containing `pos`, with its line ending.
  pub fn full_line_of(&self, pos: usize) -> Region {
    let line = self.text.char_to_line(pos.min(self.size()));
    let start = self.text.line_to_char(line);
    Region::new(start, start + self.text.line(line).len_chars())
  }

  /// Zero based `(row, col)` of `pos`.
  pub fn rowcol(&self, pos: usize) -> (usize, usize) {
    let pos = pos.min(self.size());
    let row = self.text.char_to_line(pos);
    (row, pos - self.text.line_to_char(row))
  }

  /// Offset of `(row, col)`, clamped to the buffer and to the line.
  pub fn text_point(&self, row: usize, col: usize) -> usize {
    let row = row.min(self.text.len_lines().saturating_sub(1));
    let start = self.text.line_to_char(row);
    let end = line_end_char_index(&self.text, row);
    (start + col).min(end)
  }

  pub fn scope_at(&self, pos: usize) -> String {
    self.scopes.scope_name(pos)
  }

  pub fn expand_to_scope(&self, pos: usize, selector: &str) -> Option<Region> {
    self
      .scopes
      .expand_to_scope(pos, &Selector::parse(selector))
  }

  /// A fresh lazy matcher walking the buffer in `direction`.
  pub fn matcher(&self, direction: Direction) -> BufferSlice<'a> {
    BufferSlice::new(self.text, direction)
  }
}

#[cfg(test)]
mod tests {
  use ropey::Rope;

  use super::*;
  use crate::scope::NoScopes;

  fn id() -> BufferId {
    BufferId::new(NonZeroUsize::MIN)
  }

  #[test]
  fn lines() {
    let text = Rope::from("ab\ncd\r\n\nend");
    let buffer = Buffer::new(id(), text.slice(..), &NoScopes, false);

    assert_eq!(buffer.size(), 11);
    assert_eq!(buffer.line_of(1), Region::new(0, 2));
    assert_eq!(buffer.full_line_of(1), Region::new(0, 3));
    assert_eq!(buffer.line_of(4), Region::new(3, 5));
    assert_eq!(buffer.full_line_of(4), Region::new(3, 7));
    assert_eq!(buffer.line_of(7), Region::new(7, 7));
    assert_eq!(buffer.full_line_of(11), Region::new(8, 11));
    assert_eq!(buffer.substr(4, 0), "ab\nc");
    assert_eq!(buffer.substr(9, 40), "nd");
  }

  #[test]
  fn points() {
    let text = Rope::from("ab\ncd\nend");
    let buffer = Buffer::new(id(), text.slice(..), &NoScopes, true);

    assert_eq!(buffer.rowcol(4), (1, 1));
    assert_eq!(buffer.rowcol(100), (2, 3));
    assert_eq!(buffer.text_point(1, 1), 4);
    assert_eq!(buffer.text_point(1, 9), 5);
    assert_eq!(buffer.text_point(9, 0), 6);
    assert!(buffer.is_read_only());
    assert_eq!(buffer.char_at(2), Some('\n'));
    assert_eq!(buffer.char_at(9), None);
  }
}
