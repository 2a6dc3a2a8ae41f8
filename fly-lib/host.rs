//! The interface a host editor implements.
//!
//! The core never owns text, selections or UI. Every command runs against a
//! [`Host`], reads what it needs from the active [`View`] and writes back
//! selections, highlights, phantoms and popups before returning.

use std::{
  num::NonZeroUsize,
  time::{
    Duration,
    Instant,
  },
};

use bitflags::bitflags;

use crate::{
  buffer::{
    Buffer,
    BufferId,
    ViewId,
  },
  clipboard::ClipboardProvider,
  selection::{
    Region,
    Selection,
  },
};

/// Per-view flags the host's keymap consults to route keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModalFlags {
  pub block_caret:       bool,
  pub command_mode:      bool,
  /// The next key is a character for the sneak engine.
  pub needs_char:        bool,
  pub has_stored_search: bool,
  pub multiplier:        Option<NonZeroUsize>,
}

bitflags! {
  /// How the host draws a set of highlighted regions.
  #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
  pub struct RegionFlags: u8 {
    const DRAW_NO_FILL    = 1 << 0;
    const DRAW_NO_OUTLINE = 1 << 1;
    const HIDE_ON_MINIMAP = 1 << 2;
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionStyle {
  /// Scope the host takes the color from.
  pub scope: String,
  pub flags: RegionFlags,
}

/// A popup anchored at an offset; `content` is minihtml.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Popup {
  pub location: usize,
  pub content:  String,
}

/// Replace `region` with `text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
  pub region: Region,
  pub text:   String,
}

/// Deferred work the core asks the host to schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerToken {
  ParagraphRebuild(BufferId),
}

pub trait View {
  fn id(&self) -> ViewId;

  fn buffer(&self) -> Buffer<'_>;

  /// Name of the widget this view belongs to (input panel, find results),
  /// `None` for a regular text view.
  fn element(&self) -> Option<&str>;

  fn selection(&self) -> Selection;
  fn set_selection(&mut self, selection: Selection);

  fn flags(&self) -> &ModalFlags;
  fn flags_mut(&mut self) -> &mut ModalFlags;

  /// Scrolls `pos` into view.
  fn show(&mut self, pos: usize);
  fn show_popup(&mut self, popup: Popup);

  fn add_regions(&mut self, key: &str, regions: &[Region], style: &RegionStyle);
  fn erase_regions(&mut self, key: &str);
  fn add_phantom(&mut self, key: &str, region: Region, label: &str);
  fn erase_phantoms(&mut self, key: &str);

  /// Applies edits. They arrive sorted right-to-left, so offsets of pending
  /// edits stay valid.
  fn apply_edits(&mut self, edits: &[Edit]);
  fn status_message(&mut self, message: &str);

  fn search_in_selection(&self) -> bool;
  fn has_find_results(&self) -> bool;
}

pub trait Host {
  type View: View;

  fn active_view(&self) -> &Self::View;
  fn active_view_mut(&mut self) -> &mut Self::View;

  /// Any open buffer, for deferred work that outlives the active view.
  fn buffer(&self, id: BufferId) -> Option<Buffer<'_>>;

  fn clipboard(&self) -> &dyn ClipboardProvider;

  /// Calls back into [`crate::controller::Controller::on_timeout`] with
  /// `token` after `delay`.
  fn set_timeout(&mut self, delay: Duration, token: TimerToken);
  fn now(&self) -> Instant;

  fn side_bar_visible(&self) -> bool;
  fn num_groups(&self) -> usize;
}
