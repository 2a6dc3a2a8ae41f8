//! An in-memory host.
//!
//! Keeps text, selections and everything the core draws in plain data
//! structures, so commands can be driven and inspected without an editor.
//! Timers are recorded, never fired; callers fire them by hand.

use std::{
  collections::HashMap,
  num::NonZeroUsize,
  time::{
    Duration,
    Instant,
  },
};

use ropey::Rope;

use crate::{
  buffer::{
    Buffer,
    BufferId,
    ViewId,
  },
  clipboard::{
    ClipboardProvider,
    MemoryClipboard,
    NoClipboard,
  },
  host::{
    Edit,
    Host,
    ModalFlags,
    Popup,
    RegionStyle,
    TimerToken,
    View,
  },
  scope::{
    NoScopes,
    ScopeProbe,
  },
  selection::{
    Region,
    Selection,
  },
};

pub struct HeadlessView {
  id:                  ViewId,
  buffer_id:           BufferId,
  text:                Rope,
  scopes:              Box<dyn ScopeProbe>,
  read_only:           bool,
  element:             Option<String>,
  selection:           Selection,
  flags:               ModalFlags,
  regions:             HashMap<String, (Vec<Region>, RegionStyle)>,
  phantoms:            HashMap<String, Vec<(Region, String)>>,
  popups:              Vec<Popup>,
  shown:               Option<usize>,
  status:              Option<String>,
  search_in_selection: bool,
  has_find_results:    bool,
}

impl HeadlessView {
  pub fn new(text: &str) -> Self {
    Self {
      id:                  ViewId::new(NonZeroUsize::MIN),
      buffer_id:           BufferId::new(NonZeroUsize::MIN),
      text:                Rope::from(text),
      scopes:              Box::new(NoScopes),
      read_only:           false,
      element:             None,
      selection:           Selection::point(0),
      flags:               ModalFlags::default(),
      regions:             HashMap::new(),
      phantoms:            HashMap::new(),
      popups:              Vec::new(),
      shown:               None,
      status:              None,
      search_in_selection: false,
      has_find_results:    false,
    }
  }

  #[must_use]
  pub fn with_ids(mut self, view: ViewId, buffer: BufferId) -> Self {
    self.id = view;
    self.buffer_id = buffer;
    self
  }

  #[must_use]
  pub fn with_scopes(mut self, scopes: impl ScopeProbe + 'static) -> Self {
    self.scopes = Box::new(scopes);
    self
  }

  #[must_use]
  pub fn with_element(mut self, element: &str) -> Self {
    self.element = Some(element.to_owned());
    self
  }

  #[must_use]
  pub fn read_only(mut self) -> Self {
    self.read_only = true;
    self
  }

  pub fn set_find_state(&mut self, search_in_selection: bool, has_find_results: bool) {
    self.search_in_selection = search_in_selection;
    self.has_find_results = has_find_results;
  }

  pub fn text(&self) -> String {
    self.text.to_string()
  }

  pub fn regions(&self, key: &str) -> Vec<Region> {
    self
      .regions
      .get(key)
      .map(|(regions, _)| regions.clone())
      .unwrap_or_default()
  }

  pub fn region_style(&self, key: &str) -> Option<&RegionStyle> {
    self.regions.get(key).map(|(_, style)| style)
  }

  pub fn phantoms(&self, key: &str) -> Vec<(Region, String)> {
    self.phantoms.get(key).cloned().unwrap_or_default()
  }

  pub fn last_popup(&self) -> Option<&Popup> {
    self.popups.last()
  }

  pub fn shown(&self) -> Option<usize> {
    self.shown
  }

  pub fn status(&self) -> Option<&str> {
    self.status.as_deref()
  }
}

impl View for HeadlessView {
  fn id(&self) -> ViewId {
    self.id
  }

  fn buffer(&self) -> Buffer<'_> {
    Buffer::new(
      self.buffer_id,
      self.text.slice(..),
      self.scopes.as_ref(),
      self.read_only,
    )
  }

  fn element(&self) -> Option<&str> {
    self.element.as_deref()
  }

  fn selection(&self) -> Selection {
    self.selection.clone()
  }

  /// Panics on a region past the end of the text: the core must never hand
  /// one out.
  fn set_selection(&mut self, selection: Selection) {
    if let Err(err) = selection.check_bounds(self.text.len_chars()) {
      panic!("view {:?} received an invalid selection: {err}", self.id);
    }
    self.selection = selection;
  }

  fn flags(&self) -> &ModalFlags {
    &self.flags
  }

  fn flags_mut(&mut self) -> &mut ModalFlags {
    &mut self.flags
  }

  fn show(&mut self, pos: usize) {
    self.shown = Some(pos);
  }

  fn show_popup(&mut self, popup: Popup) {
    self.popups.push(popup);
  }

  fn add_regions(&mut self, key: &str, regions: &[Region], style: &RegionStyle) {
    self
      .regions
      .insert(key.to_owned(), (regions.to_vec(), style.clone()));
  }

  fn erase_regions(&mut self, key: &str) {
    self.regions.remove(key);
  }

  fn add_phantom(&mut self, key: &str, region: Region, label: &str) {
    self
      .phantoms
      .entry(key.to_owned())
      .or_default()
      .push((region, label.to_owned()));
  }

  fn erase_phantoms(&mut self, key: &str) {
    self.phantoms.remove(key);
  }

  fn apply_edits(&mut self, edits: &[Edit]) {
    for edit in edits {
      let region = edit.region.clamp(self.text.len_chars());
      self.text.remove(region.begin()..region.end());
      self.text.insert(region.begin(), &edit.text);
    }
    self.selection = self.selection.clone().clamp(self.text.len_chars());
  }

  fn status_message(&mut self, message: &str) {
    self.status = Some(message.to_owned());
  }

  fn search_in_selection(&self) -> bool {
    self.search_in_selection
  }

  fn has_find_results(&self) -> bool {
    self.has_find_results
  }
}

/// A window with one or more views, one of them active.
pub struct HeadlessEditor {
  views:            Vec<HeadlessView>,
  active:           usize,
  clipboard:        Box<dyn ClipboardProvider>,
  timers:           Vec<(Duration, TimerToken)>,
  now:              Instant,
  side_bar_visible: bool,
  num_groups:       usize,
}

impl HeadlessEditor {
  pub fn new(view: HeadlessView) -> Self {
    Self {
      views:            vec![view],
      active:           0,
      clipboard:        Box::new(NoClipboard),
      timers:           Vec::new(),
      now:              Instant::now(),
      side_bar_visible: false,
      num_groups:       1,
    }
  }

  /// Adds a view and makes it active.
  pub fn open(&mut self, view: HeadlessView) {
    self.views.push(view);
    self.active = self.views.len() - 1;
  }

  /// Activates the view with `id`. Returns whether one was found.
  pub fn focus(&mut self, id: ViewId) -> bool {
    match self.views.iter().position(|view| view.id == id) {
      Some(idx) => {
        self.active = idx;
        true
      },
      None => false,
    }
  }

  /// Replaces the clipboard, which starts out unreadable, with one holding
  /// `contents`.
  pub fn set_clipboard(&mut self, contents: &str) {
    self.clipboard = Box::new(MemoryClipboard::new(contents));
  }

  pub fn set_layout(&mut self, side_bar_visible: bool, num_groups: usize) {
    self.side_bar_visible = side_bar_visible;
    self.num_groups = num_groups;
  }

  pub fn advance(&mut self, by: Duration) {
    self.now += by;
  }

  /// Timers armed since the last call.
  pub fn take_timers(&mut self) -> Vec<(Duration, TimerToken)> {
    std::mem::take(&mut self.timers)
  }
}

impl Host for HeadlessEditor {
  type View = HeadlessView;

  fn active_view(&self) -> &HeadlessView {
    &self.views[self.active]
  }

  fn active_view_mut(&mut self) -> &mut HeadlessView {
    &mut self.views[self.active]
  }

  fn buffer(&self, id: BufferId) -> Option<Buffer<'_>> {
    self
      .views
      .iter()
      .find(|view| view.buffer_id == id)
      .map(|view| view.buffer())
  }

  fn clipboard(&self) -> &dyn ClipboardProvider {
    self.clipboard.as_ref()
  }

  fn set_timeout(&mut self, delay: Duration, token: TimerToken) {
    self.timers.push((delay, token));
  }

  fn now(&self) -> Instant {
    self.now
  }

  fn side_bar_visible(&self) -> bool {
    self.side_bar_visible
  }

  fn num_groups(&self) -> usize {
    self.num_groups
  }
}
