//! Regions and multi-region selections.
//!
//! A [`Region`] is a directed pair of char offsets `(a, b)`. `a` is the
//! anchor, `b` the end the caret sits on. When `a == b` the region is a caret
//! with nothing selected.
//!
//! ```text
//! a=2, b=7: "he[llo w]orld"  (forward)
//! a=7, b=2: "he]llo w[orld"  (reversed)
//! a=5, b=5: "hello|world"    (caret)
//! ```
//!
//! [`Region::begin`] and [`Region::end`] return the bounds regardless of
//! direction, [`Region::is_reversed`] tells which way the region points.
//! Every transform keeps the direction unless it says otherwise.
//!
//! A [`Selection`] contains one or more regions, kept normalized:
//!
//! - sorted by `begin`
//! - overlapping regions merged (touching regions are kept apart)
//! - never empty
//!
//! ```ignore
//! use fly_lib::selection::{Region, Selection};
//! use smallvec::smallvec;
//!
//! let selection = Selection::new(smallvec![Region::point(15), Region::new(2, 5)])?;
//! assert_eq!(selection.regions()[0], Region::new(2, 5));
//! ```
//!
//! Regions never outlive a command: the core reads the selection, computes a
//! new one and hands it back to the host in the same turn.

use smallvec::{
  SmallVec,
  smallvec,
};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SelectionError>;

#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum SelectionError {
  #[error("selection must contain at least one region")]
  EmptySelection,
  #[error("region {a}..{b} exceeds buffer size {size}")]
  RegionOutOfBounds { a: usize, b: usize, size: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Region {
  pub a: usize,
  pub b: usize,
}

impl Region {
  #[inline]
  pub const fn new(a: usize, b: usize) -> Self {
    Self { a, b }
  }

  #[inline]
  pub const fn point(pos: usize) -> Self {
    Self::new(pos, pos)
  }

  /// Start of the region.
  #[inline]
  #[must_use]
  pub fn begin(&self) -> usize {
    std::cmp::min(self.a, self.b)
  }

  /// End of the region.
  #[inline]
  #[must_use]
  pub fn end(&self) -> usize {
    std::cmp::max(self.a, self.b)
  }

  #[inline]
  #[must_use]
  pub fn len(&self) -> usize {
    self.end() - self.begin()
  }

  #[inline]
  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.a == self.b
  }

  #[inline]
  pub fn contains(&self, pos: usize) -> bool {
    self.begin() <= pos && pos < self.end()
  }

  /// Same bounds, regardless of direction.
  #[inline]
  pub fn same_extent(&self, other: &Self) -> bool {
    self.begin() == other.begin() && self.end() == other.end()
  }

  #[inline]
  pub fn is_reversed(&self) -> bool {
    self.b < self.a
  }

  /// Swaps anchor and caret.
  #[inline]
  #[must_use]
  pub fn flip(&self) -> Self {
    Self::new(self.b, self.a)
  }

  /// Check if two regions overlap. Regions that merely touch do not, two
  /// carets on the same offset do.
  pub fn overlaps(&self, other: &Self) -> bool {
    self.begin() == other.begin() || (self.end() > other.begin() && other.end() > self.begin())
  }

  /// Returns a region covering both inputs, keeping the shared direction
  /// when both point backward.
  #[must_use]
  pub fn cover(&self, other: Self) -> Self {
    if self.is_reversed() && other.is_reversed() {
      Self::new(self.a.max(other.a), self.b.min(other.b))
    } else {
      Self::new(self.begin().min(other.begin()), self.end().max(other.end()))
    }
  }

  /// Clamps both ends into `0..=size`.
  #[must_use]
  pub fn clamp(&self, size: usize) -> Self {
    Self::new(self.a.min(size), self.b.min(size))
  }
}

impl From<(usize, usize)> for Region {
  fn from(value: (usize, usize)) -> Self {
    Self::new(value.0, value.1)
  }
}

impl From<Region> for std::ops::Range<usize> {
  fn from(region: Region) -> Self {
    region.begin()..region.end()
  }
}

/// One or more regions.
/// INVARIANT: a selection is never empty and its regions are sorted and
/// pairwise non-overlapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
  regions: SmallVec<[Region; 1]>,
}

impl Selection {
  pub fn new(regions: SmallVec<[Region; 1]>) -> Result<Self> {
    if regions.is_empty() {
      return Err(SelectionError::EmptySelection);
    }
    Ok(Self { regions }.normalize())
  }

  pub fn point(pos: usize) -> Self {
    Self {
      regions: smallvec![Region::point(pos)],
    }
  }

  /// Constructs a selection holding a single region.
  #[must_use]
  pub fn single(a: usize, b: usize) -> Self {
    Self {
      regions: smallvec![Region::new(a, b)],
    }
  }

  pub fn regions(&self) -> &[Region] {
    &self.regions
  }

  #[inline(always)]
  pub fn iter(&self) -> std::slice::Iter<'_, Region> {
    self.regions.iter()
  }

  /// The first region in document order.
  pub fn first(&self) -> Region {
    self.regions[0]
  }

  /// The last region in document order; popups and scrolling follow it.
  pub fn last(&self) -> Region {
    self.regions[self.regions.len() - 1]
  }

  pub fn is_multiple(&self) -> bool {
    self.regions.len() > 1
  }

  /// Check if every region is a caret.
  pub fn is_empty(&self) -> bool {
    self.regions.iter().all(Region::is_empty)
  }

  /// Adds a region, merging it with any region it overlaps.
  pub fn push(mut self, region: Region) -> Self {
    self.regions.push(region);
    self.normalize()
  }

  /// Apply a transformation to all regions and return a new selection.
  pub fn transform<F>(mut self, mut f: F) -> Self
  where
    F: FnMut(Region) -> Region,
  {
    for region in self.regions.iter_mut() {
      *region = f(*region);
    }

    self.normalize()
  }

  /// Flips the direction of every region.
  pub fn revert(self) -> Self {
    self.transform(|region| region.flip())
  }

  /// Fails when a region points past `size`.
  pub fn check_bounds(&self, size: usize) -> Result<()> {
    match self.regions.iter().find(|region| region.end() > size) {
      Some(region) => {
        Err(SelectionError::RegionOutOfBounds {
          a: region.a,
          b: region.b,
          size,
        })
      },
      None => Ok(()),
    }
  }

  /// Clamps every region into `0..=size`.
  pub fn clamp(self, size: usize) -> Self {
    self.transform(|region| region.clamp(size))
  }

  /// Sorts by `begin` and merges overlapping regions.
  fn normalize(mut self) -> Self {
    if self.regions.len() < 2 {
      return self;
    }
    self.regions.sort_by_key(Region::begin);

    let mut regions: SmallVec<[Region; 1]> = SmallVec::with_capacity(self.regions.len());
    for region in self.regions {
      if let Some(prev) = regions.last_mut() {
        if prev.overlaps(&region) {
          *prev = prev.cover(region);
          continue;
        }
      }
      regions.push(region);
    }

    self.regions = regions;
    self
  }
}

impl<'a> IntoIterator for &'a Selection {
  type Item = &'a Region;
  type IntoIter = std::slice::Iter<'a, Region>;

  fn into_iter(self) -> std::slice::Iter<'a, Region> {
    self.regions.iter()
  }
}

impl IntoIterator for Selection {
  type Item = Region;
  type IntoIter = smallvec::IntoIter<[Region; 1]>;

  fn into_iter(self) -> smallvec::IntoIter<[Region; 1]> {
    self.regions.into_iter()
  }
}

impl From<Region> for Selection {
  fn from(region: Region) -> Self {
    Self {
      regions: smallvec![region],
    }
  }
}

#[cfg(test)]
mod test {
  use super::*;

  fn render(selection: &Selection) -> String {
    selection
      .iter()
      .map(|region| format!("{}/{}", region.a, region.b))
      .collect::<Vec<String>>()
      .join(",")
  }

  #[test]
  fn test_new_empty() {
    let err = Selection::new(smallvec![]).unwrap_err();
    assert_eq!(err, SelectionError::EmptySelection);
  }

  #[test]
  fn test_create_normalizes_and_merges() {
    let sel = Selection::new(smallvec![
      Region::new(10, 12),
      Region::new(6, 7),
      Region::new(4, 5),
      Region::new(3, 4),
      Region::new(0, 6),
      Region::new(7, 8),
      Region::new(9, 13),
      Region::new(13, 14),
    ])
    .unwrap();

    assert_eq!(render(&sel), "0/6,6/7,7/8,9/13,13/14");
  }

  #[test]
  fn test_create_merges_same_carets() {
    let sel = Selection::new(smallvec![
      Region::new(10, 12),
      Region::new(12, 12),
      Region::new(12, 12),
      Region::new(10, 10),
      Region::new(8, 10),
    ])
    .unwrap();

    assert_eq!(render(&sel), "8/10,10/12,12/12");
  }

  #[test]
  fn test_merge_keeps_backward_direction() {
    let sel = Selection::new(smallvec![Region::new(6, 2), Region::new(8, 4)]).unwrap();
    assert_eq!(sel.regions(), &[Region::new(8, 2)]);
  }

  #[test]
  fn test_contains() {
    let region = Region::new(10, 12);

    assert!(!region.contains(9));
    assert!(region.contains(10));
    assert!(region.contains(11));
    assert!(!region.contains(12));

    let region = Region::new(9, 6);
    assert!(!region.contains(9));
    assert!(region.contains(7));
    assert!(region.contains(6));
  }

  #[test]
  fn test_overlaps() {
    fn overlaps(a: (usize, usize), b: (usize, usize)) -> bool {
      Region::from(a).overlaps(&Region::from(b))
    }

    // Touching regions.
    assert!(!overlaps((0, 3), (3, 6)));
    assert!(!overlaps((3, 0), (6, 3)));
    assert!(!overlaps((0, 3), (3, 3)));

    // Sharing text.
    assert!(overlaps((0, 4), (3, 6)));
    assert!(overlaps((4, 0), (6, 3)));
    assert!(overlaps((1, 4), (3, 3)));

    // Carets.
    assert!(!overlaps((0, 0), (1, 1)));
    assert!(overlaps((1, 1), (1, 1)));
  }

  #[test]
  fn test_bounds() {
    let region = Region::new(7, 3);
    assert_eq!(region.begin(), 3);
    assert_eq!(region.end(), 7);
    assert_eq!(region.len(), 4);
    assert!(region.is_reversed());
    assert_eq!(region.flip(), Region::new(3, 7));
    assert_eq!(region.clamp(5), Region::new(5, 3));
  }

  #[test]
  fn test_revert_twice_is_identity() {
    let sel = Selection::new(smallvec![Region::new(0, 3), Region::new(9, 5), Region::point(12)])
      .unwrap();
    let reverted = sel.clone().revert();
    assert_eq!(render(&reverted), "3/0,5/9,12/12");
    assert_eq!(reverted.revert(), sel);
  }

  #[test]
  fn test_check_bounds() {
    let sel = Selection::new(smallvec![Region::new(0, 3), Region::new(9, 5)]).unwrap();
    assert!(sel.check_bounds(9).is_ok());
    assert_eq!(sel.check_bounds(8), Err(SelectionError::RegionOutOfBounds {
      a:    9,
      b:    5,
      size: 8,
    }));
    assert_eq!(render(&sel.clamp(4)), "0/3,4/4");
  }

  quickcheck::quickcheck! {
    fn normalized_regions_never_overlap(pairs: Vec<(u8, u8)>) -> bool {
      let regions: SmallVec<[Region; 1]> = pairs
        .into_iter()
        .map(|(a, b)| Region::new(a as usize, b as usize))
        .collect();
      let Ok(selection) = Selection::new(regions) else {
        return true;
      };
      selection
        .regions()
        .windows(2)
        .all(|pair| pair[0].begin() <= pair[1].begin() && !pair[0].overlaps(&pair[1]))
    }
  }
}
