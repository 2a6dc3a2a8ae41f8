//! Expanding selections to the next enclosing pair.
//!
//! The expander grows a region to the nearest pair of `()`, `[]`, `{}`,
//! `"…"` or `'…'` that encloses it. Two scans walk away from the region, one
//! leftward from `begin - 1` and one rightward from `end`, taking one char at
//! a time in turn. The side nearer to its buffer edge goes first, so a region
//! at the edge of the buffer gives up early instead of scanning the whole
//! other side.
//!
//! Each side balances nested pairs on a stack. A delimiter that cannot be
//! balanced on its own side *resolves*: it is a candidate edge of the result.
//! A left and a right resolution of the same kind form a pair, as long as
//! the pair grows the region. Pairs that do not (an empty `()` next to the
//! caret, or the pair the region already fills) are dropped and the scan
//! goes on outward, so `((foo))` grows one pair at a time.
//!
//! Strings use the host's scopes. When the region sits inside a quoted
//! string, only that string's quote resolves, so brackets in the string are
//! plain text. Outside of one, strings met on the way are skipped whole:
//! their quotes and brackets never resolve. Only a string whose near quote a
//! scan meets first, the one around the region, can resolve.

use fly_core::chars::char_is_line_ending;
use serde::Deserialize;
use tracing::trace;

use crate::{
  buffer::Buffer,
  scope::has_scope,
  selection::{
    Region,
    Selection,
  },
};

/// Selector for the contents of a string, quotes excluded.
const STRING_CONTENTS: &str = "string - punctuation.definition.string";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExpandOptions {
  /// Include the delimiters, and runs of identical pairs around them.
  pub around:    bool,
  /// Keep the left edge at the anchor, grow only to the right.
  pub from_here: bool,
  /// Keep the right edge at the anchor, grow only to the left.
  pub to_here:   bool,
  /// Leave the caret on the left edge of the result.
  pub left:      bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
  Paren,
  Bracket,
  Brace,
  DoubleQuote,
  SingleQuote,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Delimiter {
  Open(Kind),
  Close(Kind),
  Quote(Kind),
}

impl Delimiter {
  fn classify(ch: char) -> Option<Self> {
    let delimiter = match ch {
      '(' => Self::Open(Kind::Paren),
      '[' => Self::Open(Kind::Bracket),
      '{' => Self::Open(Kind::Brace),
      ')' => Self::Close(Kind::Paren),
      ']' => Self::Close(Kind::Bracket),
      '}' => Self::Close(Kind::Brace),
      '"' => Self::Quote(Kind::DoubleQuote),
      '\'' => Self::Quote(Kind::SingleQuote),
      _ => return None,
    };
    Some(delimiter)
  }
}

/// Where the scan starts, syntactically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Context {
  Code,
  /// Inside a string quoted with the given kind.
  Quoted(Kind),
}

impl Context {
  fn classify(buffer: &Buffer, pos: usize) -> Self {
    let Some(contents) = buffer.expand_to_scope(pos, STRING_CONTENTS) else {
      return Self::Code;
    };
    let scope = buffer.scope_at(contents.end());
    if scope.contains("string.quoted.double") {
      Self::Quoted(Kind::DoubleQuote)
    } else if scope.contains("string.quoted.single") {
      Self::Quoted(Kind::SingleQuote)
    } else {
      Self::Code
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
  Left,
  Right,
}

#[derive(Debug)]
struct Scan {
  side:      Side,
  /// Next offset to look at, `None` once the buffer edge is passed.
  next:      Option<usize>,
  stack:     Vec<Kind>,
  in_string: bool,
  resolved:  Vec<(usize, Kind)>,
}

impl Scan {
  fn new(side: Side, region: Region, size: usize) -> Self {
    let next = match side {
      Side::Left => region.begin().checked_sub(1),
      Side::Right => Some(region.end()).filter(|&pos| pos < size),
    };
    Self {
      side,
      next,
      stack: Vec::new(),
      in_string: false,
      resolved: Vec::new(),
    }
  }

  fn is_done(&self) -> bool {
    self.next.is_none()
  }

  /// Looks at one more char. Returns the resolution it produced, if any.
  fn step(&mut self, buffer: &Buffer, context: Context) -> Option<(usize, Kind)> {
    let pos = self.next?;
    self.next = match self.side {
      Side::Left => pos.checked_sub(1),
      Side::Right => Some(pos + 1).filter(|&next| next < buffer.size()),
    };

    let delimiter = buffer.char_at(pos).and_then(Delimiter::classify)?;
    let kind = match (context, delimiter) {
      (Context::Quoted(quote), Delimiter::Quote(kind)) if kind == quote => kind,
      (Context::Quoted(_), _) => return None,
      (Context::Code, Delimiter::Quote(kind)) => {
        let scope = buffer.scope_at(pos);
        if scope.is_empty() {
          kind
        } else {
          // Scanning left the near quote of a string is its `begin`, scanning
          // right its `end`.
          let (near, far) = match self.side {
            Side::Left => ("string.begin", "string.end"),
            Side::Right => ("string.end", "string.begin"),
          };
          let at_near = scope.contains(near);
          if at_near && !self.in_string {
            kind
          } else {
            if at_near {
              self.in_string = false;
            } else if scope.contains(far) {
              self.in_string = true;
            }
            return None;
          }
        }
      },
      (Context::Code, Delimiter::Open(kind) | Delimiter::Close(kind)) => {
        if self.in_string || has_scope(&buffer.scope_at(pos), "string") {
          return None;
        }
        let nests = match self.side {
          Side::Left => matches!(delimiter, Delimiter::Close(_)),
          Side::Right => matches!(delimiter, Delimiter::Open(_)),
        };
        if nests {
          self.stack.push(kind);
          return None;
        }
        if self.stack.last() == Some(&kind) {
          self.stack.pop();
          return None;
        }
        kind
      },
    };

    self.resolved.push((pos, kind));
    Some((pos, kind))
  }
}

/// Grows `region` to the next enclosing pair. `None` when there is none, or
/// when the caret sits at the end of the buffer.
pub fn expand_region(buffer: &Buffer, region: Region, options: ExpandOptions) -> Option<Region> {
  let size = buffer.size();
  if region.b >= size {
    return None;
  }

  let context = Context::classify(buffer, region.b);
  let mut left = Scan::new(Side::Left, region, size);
  let mut right = Scan::new(Side::Right, region, size);
  if options.from_here {
    left.next = None;
  }
  if options.to_here {
    right.next = None;
  }
  trace!(?region, ?context, ?options, "expanding region");

  let lead = if region.begin() <= size - region.end() {
    Side::Left
  } else {
    Side::Right
  };

  while !(left.is_done() && right.is_done()) {
    for side in [lead, other(lead)] {
      let (scan, opposite) = match side {
        Side::Left => (&mut left, &mut right),
        Side::Right => (&mut right, &mut left),
      };
      let Some((pos, kind)) = scan.step(buffer, context) else {
        continue;
      };

      let found = if options.from_here || options.to_here {
        pin(buffer, region, pos, options)
      } else {
        pair(buffer, region, side, pos, kind, scan, opposite, options)
      };
      if let Some((lo, hi)) = found {
        let reversed = region.is_reversed() || options.to_here || options.left;
        return Some(if reversed {
          Region::new(hi, lo)
        } else {
          Region::new(lo, hi)
        });
      }
    }
  }
  None
}

fn other(side: Side) -> Side {
  match side {
    Side::Left => Side::Right,
    Side::Right => Side::Left,
  }
}

fn grows(region: Region, lo: usize, hi: usize) -> bool {
  lo <= region.begin() && hi >= region.end() && (lo < region.begin() || hi > region.end())
}

/// One edge stays at the anchor, the other goes to the first resolution.
fn pin(
  buffer: &Buffer,
  region: Region,
  pos: usize,
  options: ExpandOptions,
) -> Option<(usize, usize)> {
  let (lo, hi) = if options.from_here {
    (region.a, if options.around { pos + 1 } else { pos })
  } else {
    (if options.around { pos } else { pos + 1 }, region.a)
  };
  let hi = hi.min(buffer.size());
  (lo < hi && !Region::new(lo, hi).same_extent(&region)).then_some((lo, hi))
}

#[allow(clippy::too_many_arguments)]
fn pair(
  buffer: &Buffer,
  region: Region,
  side: Side,
  pos: usize,
  kind: Kind,
  scan: &mut Scan,
  opposite: &mut Scan,
  options: ExpandOptions,
) -> Option<(usize, usize)> {
  let partner = opposite
    .resolved
    .iter()
    .position(|&(_, other)| other == kind)?;
  let (other_pos, _) = opposite.resolved[partner];
  let (open, close) = match side {
    Side::Left => (pos, other_pos),
    Side::Right => (other_pos, pos),
  };

  let degenerate = !options.around && close - open == 1;
  let (lo, hi) = if options.around {
    (open, close + 1)
  } else {
    (open + 1, close)
  };
  if degenerate || !grows(region, lo, hi) {
    trace!(open, close, "dropping pair that does not grow the region");
    scan.resolved.pop();
    opposite.resolved.remove(partner);
    return None;
  }

  if !options.around {
    return Some((lo, hi));
  }
  let (mut lo, mut hi) = (lo, hi);
  while lo > 0 && hi < buffer.size() {
    let (Some(outer_open), Some(open), Some(close), Some(outer_close)) = (
      buffer.char_at(lo - 1),
      buffer.char_at(lo),
      buffer.char_at(hi - 1),
      buffer.char_at(hi),
    ) else {
      break;
    };
    if outer_open != open || outer_close != close || char_is_line_ending(open) {
      break;
    }
    lo -= 1;
    hi += 1;
  }
  Some((lo, hi))
}

/// Expands every region of `selection`. `None` when no region changed.
pub fn expand_selection(
  buffer: &Buffer,
  selection: &Selection,
  options: ExpandOptions,
) -> Option<Selection> {
  let mut changed = false;
  let expanded = selection.clone().transform(|region| {
    match expand_region(buffer, region, options) {
      Some(expanded) => {
        changed = true;
        expanded
      },
      None => region,
    }
  });
  changed.then_some(expanded)
}
