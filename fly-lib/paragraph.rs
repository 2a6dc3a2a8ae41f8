//! Paragraph boundaries.
//!
//! A paragraph is a run of non-blank lines. Paragraphs are separated by one
//! or more blank lines (lines holding nothing but spaces or tabs).
//!
//! [`ParagraphIndex`] records every separating run as a pair:
//!
//! - `first[i]`: offset of the newline ending the last line of the previous
//!   paragraph
//! - `last[i]`: offset just before the first non-blank char of the next one,
//!   so the paragraph starts at `last[i] + 1`
//!
//! ```text
//! alpha\n\nbeta
//!      ^  ^ ^
//!      |  | paragraph start (last + 1)
//!      |  last
//!      first
//! ```
//!
//! Both arrays are bracketed by the sentinels `(-2, -1)` and `(size, size)`
//! so every lookup lands inside them.
//!
//! [`ParagraphIndexes`] caches one index per buffer. Edits drop the cached
//! index; a deferred rebuild runs once edits have been quiet for the debounce
//! delay, and any reader that finds no index builds one on the spot.

use std::{
  collections::HashMap,
  sync::LazyLock,
  time::{
    Duration,
    Instant,
  },
};

use fly_stdx::rope::{
  Regex,
  RopeSliceExt,
};
use ropey::RopeSlice;
use tracing::{
  debug,
  trace,
};

use crate::buffer::{
  Buffer,
  BufferId,
};

/// A newline, then one or more blank lines, then the first non-blank char of
/// the next paragraph.
static SEPARATOR: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"\n(?:[ \t\r]*\n)+[ \t]*\S").expect("paragraph separator pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParagraphIndex {
  first: Vec<isize>,
  last:  Vec<isize>,
  size:  usize,
}

impl ParagraphIndex {
  pub fn build(text: RopeSlice) -> Self {
    let size = text.len_chars();
    let mut first = vec![-2];
    let mut last = vec![-1];

    for found in SEPARATOR.find_iter(text.regex_input()) {
      let start = text.byte_to_char(found.start());
      // `found.end()` is just past the opening char of the next paragraph.
      let opening = text.byte_to_char(found.end()) - 1;
      first.push(start as isize);
      last.push(opening as isize - 1);
    }

    first.push(size as isize);
    last.push(size as isize);
    trace!(size, separators = first.len() - 2, "built paragraph index");
    Self { first, last, size }
  }

  pub fn first(&self) -> &[isize] {
    &self.first
  }

  pub fn last(&self) -> &[isize] {
    &self.last
  }

  fn clamp(&self, pos: isize) -> usize {
    pos.clamp(0, self.size as isize) as usize
  }

  /// Start of the first paragraph beginning strictly after `pos`, or the end
  /// of the buffer.
  pub fn next_para_start(&self, pos: usize) -> usize {
    let pos = pos as isize;
    let idx = self.last.partition_point(|&last| last + 1 <= pos);
    self
      .last
      .get(idx)
      .map_or(self.size, |&last| self.clamp(last + 1))
  }

  /// Start of the last paragraph beginning strictly before `pos`, or 0.
  pub fn prev_para_start(&self, pos: usize) -> usize {
    let pos = pos as isize;
    let idx = self.last.partition_point(|&last| last + 1 < pos);
    idx
      .checked_sub(1)
      .map_or(0, |idx| self.clamp(self.last[idx] + 1))
  }

  /// End of the first paragraph ending strictly after `pos`, or the end of
  /// the buffer.
  pub fn next_para_end(&self, pos: usize) -> usize {
    let pos = pos as isize;
    let idx = self.first.partition_point(|&first| first <= pos);
    self
      .first
      .get(idx)
      .map_or(self.size, |&first| self.clamp(first))
  }

  /// End of the last paragraph ending strictly before `pos`, or 0.
  pub fn prev_para_end(&self, pos: usize) -> usize {
    let pos = pos as isize;
    let idx = self.first.partition_point(|&first| first < pos);
    idx
      .checked_sub(1)
      .map_or(0, |idx| self.clamp(self.first[idx]))
  }
}

#[derive(Debug, Default)]
struct Entry {
  index:   Option<ParagraphIndex>,
  /// Time of the latest modification.
  stamp:   Option<Instant>,
  /// Whether a deferred rebuild is scheduled.
  pending: bool,
}

/// Paragraph indexes of every open buffer.
#[derive(Debug)]
pub struct ParagraphIndexes {
  entries:  HashMap<BufferId, Entry>,
  debounce: Duration,
}

impl ParagraphIndexes {
  pub fn new(debounce: Duration) -> Self {
    Self {
      entries: HashMap::new(),
      debounce,
    }
  }

  pub fn debounce(&self) -> Duration {
    self.debounce
  }

  /// Cached index of `buffer`, built synchronously when missing.
  pub fn get_or_build(&mut self, buffer: &Buffer) -> &ParagraphIndex {
    let entry = self.entries.entry(buffer.id()).or_default();
    entry.index.get_or_insert_with(|| {
      debug!(buffer = ?buffer.id(), "paragraph index missing, building");
      ParagraphIndex::build(buffer.text())
    })
  }

  pub fn is_cached(&self, id: BufferId) -> bool {
    self
      .entries
      .get(&id)
      .is_some_and(|entry| entry.index.is_some())
  }

  /// Drops the index of a modified buffer. Returns the delay of the deferred
  /// rebuild when a timer has to be armed; `None` when one is already pending.
  pub fn handle_modified(&mut self, id: BufferId, now: Instant) -> Option<Duration> {
    let entry = self.entries.entry(id).or_default();
    entry.index = None;
    entry.stamp = Some(now);
    if entry.pending {
      return None;
    }
    entry.pending = true;
    Some(self.debounce)
  }

  /// Runs the deferred rebuild of `buffer`. When the buffer was modified again
  /// within the debounce delay, returns the remaining delay to re-arm with.
  pub fn finish_debounce(&mut self, buffer: &Buffer, now: Instant) -> Option<Duration> {
    let debounce = self.debounce;
    let entry = self.entries.get_mut(&buffer.id())?;
    if !entry.pending {
      return None;
    }

    if let Some(stamp) = entry.stamp {
      let elapsed = now.saturating_duration_since(stamp);
      if elapsed < debounce {
        trace!(buffer = ?buffer.id(), "buffer modified during debounce, re-arming");
        return Some(debounce - elapsed);
      }
    }

    entry.pending = false;
    if entry.index.is_none() {
      debug!(buffer = ?buffer.id(), "rebuilding paragraph index");
      entry.index = Some(ParagraphIndex::build(buffer.text()));
    }
    None
  }

  /// Forgets a closed buffer.
  pub fn remove(&mut self, id: BufferId) {
    self.entries.remove(&id);
  }
}
