//! Lazy regex matching over a buffer.
//!
//! [`BufferSlice`] is a restartable cursor: each call to [`BufferSlice::next`]
//! is seeded with an offset and a pattern and returns the nearest match on
//! the cursor's side of that offset. The cursor remembers how far it has
//! consumed, so a later seed never yields a match that was already handed
//! out, and no range is scanned twice.
//!
//! ```ignore
//! use fly_lib::{movement::Direction, search::{BufferSlice, compile}};
//!
//! let text = ropey::Rope::from("ab ab ab");
//! let regex = compile("ab")?;
//! let mut cursor = BufferSlice::new(text.slice(..), Direction::Backward);
//! assert_eq!(cursor.next(8, &regex), Some(Region::new(6, 8)));
//! assert_eq!(cursor.next(8, &regex), Some(Region::new(3, 5)));
//! ```
//!
//! Forward searches hand `regex-cursor` an input starting at the seed. The
//! engine only searches forward, so backward searches scan a window ending at
//! the seed and widen it until a match turns up or the window reaches the
//! start of the buffer.

use fly_stdx::rope::{
  self,
  Regex,
  RopeSliceExt,
};
use ropey::RopeSlice;
use thiserror::Error;
use tracing::trace;

use crate::{
  movement::Direction,
  selection::Region,
};

pub type Result<T> = std::result::Result<T, SearchError>;

#[derive(Debug, Error)]
pub enum SearchError {
  #[error("empty search")]
  EmptyPattern,
  #[error("invalid search pattern '{pattern}': {source}")]
  InvalidPattern {
    pattern: String,
    #[source]
    source:  rope::BuildError,
  },
}

const BACKWARD_WINDOW: usize = 256;

/// Smartcase: a needle without uppercase letters matches case-insensitively.
pub fn is_smartcase_insensitive(needle: &str) -> bool {
  !needle.chars().any(char::is_uppercase)
}

/// Compiles `needle` as a literal pattern with smartcase.
pub fn compile(needle: &str) -> Result<Regex> {
  if needle.is_empty() {
    return Err(SearchError::EmptyPattern);
  }
  rope::literal_regex(needle, is_smartcase_insensitive(needle)).map_err(|err| {
    SearchError::InvalidPattern {
      pattern: needle.to_owned(),
      source:  err,
    }
  })
}

/// Resumable match cursor over a buffer.
#[derive(Debug, Clone)]
pub struct BufferSlice<'a> {
  text:      RopeSlice<'a>,
  direction: Direction,
  /// End of the last forward match or start of the last backward match.
  frontier:  Option<usize>,
}

impl<'a> BufferSlice<'a> {
  pub fn new(text: RopeSlice<'a>, direction: Direction) -> Self {
    Self {
      text,
      direction,
      frontier: None,
    }
  }

  #[inline]
  pub fn direction(&self) -> Direction {
    self.direction
  }

  /// Next match starting at or after `seed` (forward) or ending at or before
  /// it (backward), skipping everything already consumed. `None` once the
  /// buffer edge is reached.
  pub fn next(&mut self, seed: usize, regex: &Regex) -> Option<Region> {
    let size = self.text.len_chars();
    let found = match self.direction {
      Direction::Forward => {
        let start = self.frontier.map_or(seed, |frontier| seed.max(frontier));
        if start > size {
          return None;
        }
        self.find_forward(start, regex)
      },
      Direction::Backward => {
        let limit = self
          .frontier
          .map_or(seed, |frontier| seed.min(frontier))
          .min(size);
        self.find_backward(limit, regex)
      },
    };

    let Some(found) = found else {
      self.frontier = Some(match self.direction {
        Direction::Forward => size + 1,
        Direction::Backward => 0,
      });
      return None;
    };
    trace!(
      start = found.begin(),
      end = found.end(),
      direction = ?self.direction,
      "buffer match"
    );
    self.frontier = Some(match self.direction {
      // An empty match still has to move the frontier.
      Direction::Forward if found.is_empty() => found.end() + 1,
      Direction::Forward => found.end(),
      Direction::Backward if found.is_empty() => found.begin().saturating_sub(1),
      Direction::Backward => found.begin(),
    });
    Some(found)
  }

  fn to_region(&self, start: usize, end: usize) -> Region {
    Region::new(self.text.byte_to_char(start), self.text.byte_to_char(end))
  }

  fn find_forward(&self, start: usize, regex: &Regex) -> Option<Region> {
    let found = regex.find(self.text.regex_input_at(start..))?;
    Some(self.to_region(found.start(), found.end()))
  }

  fn find_backward(&self, limit: usize, regex: &Regex) -> Option<Region> {
    let mut window = BACKWARD_WINDOW;
    loop {
      let start = limit.saturating_sub(window);
      let last = regex
        .find_iter(self.text.regex_input_at(start..limit))
        .last();
      if let Some(found) = last {
        return Some(self.to_region(found.start(), found.end()));
      }
      if start == 0 {
        return None;
      }
      window = window.saturating_mul(2);
    }
  }
}
