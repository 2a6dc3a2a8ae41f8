//! Two character jump search.
//!
//! `sneak_listen` arms the engine, then the next one or two typed chars form
//! the search. Each selection jumps to its next match, further matches get
//! labels the user can jump to directly.
//!
//! ```text
//! sneak_listen      armed, popup shows the arrow
//! sneak('f')        labels on the next matches of `f`
//! sneak('3')        jump to label 3
//!   or sneak('o')   jump to the next `fo`
//! ```
//!
//! A single char commits right away when it is a digit or one of the
//! configured single char commits. The state outlives the command so
//! `sneak_repeat` and `go_to_nth_match` can pick it up.

use tracing::debug;

use crate::{
  Tendril,
  command::{
    CommandError,
    Result,
  },
  config::{
    Config,
    MAX_LABELS,
  },
  host::{
    Popup,
    RegionFlags,
    RegionStyle,
    View,
  },
  movement::Direction,
  search,
  selection::{
    Region,
    Selection,
  },
};

/// Regions and phantoms of the chosen cursors and the labels.
pub const SNEAK_KEY: &str = "Sneak";
/// Regions of further candidates.
pub const SNEAKS_KEY: &str = "Sneaks";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SneakState {
  search:  Tendril,
  forward: bool,
  extend:  bool,
  /// Labeled candidates, in label order.
  matches: Vec<Region>,
}

impl Default for SneakState {
  fn default() -> Self {
    Self {
      search:  Tendril::new(),
      forward: true,
      extend:  false,
      matches: Vec::new(),
    }
  }
}

impl SneakState {
  pub fn search(&self) -> &str {
    &self.search
  }

  pub fn is_forward(&self) -> bool {
    self.forward
  }

  pub fn is_extending(&self) -> bool {
    self.extend
  }

  pub fn matches(&self) -> &[Region] {
    &self.matches
  }

  /// Drops the labels. The search itself survives for `sneak_repeat`.
  pub fn retire(&mut self) {
    self.matches.clear();
  }

  fn direction(&self) -> Direction {
    Direction::from_forward(self.forward)
  }

  /// `sneak_listen`: wait for the search chars.
  pub fn listen<V: View>(&mut self, view: &mut V, config: &Config, forward: bool, extend: bool) {
    self.search.clear();
    self.forward = forward;
    self.extend = extend;
    self.matches.clear();

    let flags = view.flags_mut();
    flags.needs_char = true;
    flags.has_stored_search = false;
    self.show_popup(view, config, true);
  }

  /// `store_character`: keeps `ch` as the first search char without moving.
  pub fn store_character<V: View>(&mut self, view: &mut V, ch: char) {
    self.search.clear();
    self.search.push(ch);
    self.matches.clear();

    let flags = view.flags_mut();
    flags.needs_char = true;
    flags.has_stored_search = true;
  }

  /// `sneak`: one typed char.
  pub fn input<V: View>(&mut self, view: &mut V, config: &Config, ch: char) -> Result<()> {
    let pending = view.flags().needs_char && self.search.chars().count() == 1;
    if !pending {
      self.search.clear();
      self.search.push(ch);
      if config.sneak.commits_alone(ch) {
        return self.commit(view, config);
      }
      return self.label_pass(view, config);
    }

    if let Some(idx) = config.sneak.label_index(ch)
      && idx < self.matches.len()
    {
      return self.jump(view, config, idx);
    }
    self.search.push(ch);
    self.commit(view, config)
  }

  /// `go_to_nth_match`: `0` is the tenth label.
  pub fn go_to_nth<V: View>(&mut self, view: &mut V, config: &Config, number: usize) -> Result<()> {
    let idx = if number == 0 { MAX_LABELS - 1 } else { number - 1 };
    if idx >= self.matches.len() {
      return Err(CommandError::NoLabel(number));
    }
    self.jump(view, config, idx)
  }

  /// `sneak_repeat`: runs the last search again in `forward` direction.
  pub fn repeat<V: View>(&mut self, view: &mut V, config: &Config, forward: bool) -> Result<()> {
    if self.search.is_empty() {
      return Err(CommandError::NoStoredSearch);
    }
    self.forward = forward;
    self.matches.clear();
    self.commit(view, config)
  }

  fn target(&self, anchor: usize, found: Region) -> Region {
    match (self.extend, self.forward) {
      (true, true) => Region::new(anchor, found.end()),
      (true, false) => Region::new(anchor, found.begin()),
      (false, true) => Region::new(found.begin(), found.end()),
      (false, false) => Region::new(found.end(), found.begin()),
    }
  }

  fn label_limit(&self, config: &Config, multiple: bool) -> usize {
    if multiple {
      MAX_LABELS
    } else {
      config.sneak.labels.chars().count()
    }
  }

  /// First char typed: label the next matches without moving. With several
  /// cursors the matches are only highlighted, so no digit can collapse them
  /// onto one label.
  fn label_pass<V: View>(&mut self, view: &mut V, config: &Config) -> Result<()> {
    let regex = search::compile(&self.search)?;
    let selection = view.selection();
    let multiple = selection.is_multiple();
    let seed = if self.forward {
      selection.last().end()
    } else {
      selection.first().begin()
    };
    let limit = self.label_limit(config, multiple);
    let candidates: Vec<Region> = {
      let buffer = view.buffer();
      let mut cursor = buffer.matcher(self.direction());
      (0..limit).map_while(|_| cursor.next(seed, &regex)).collect()
    };

    let found = !candidates.is_empty();
    if multiple {
      self.matches.clear();
      view.add_regions(SNEAKS_KEY, &candidates, &accent_style(config));
    } else {
      self.matches = candidates;
      if found {
        self.place_labels(view, config);
      }
    }
    view.flags_mut().has_stored_search = found;
    self.show_popup(view, config, found);
    Ok(())
  }

  /// Moves every selection to its next match.
  fn commit<V: View>(&mut self, view: &mut V, config: &Config) -> Result<()> {
    let regex = search::compile(&self.search)?;
    let selection = view.selection();
    let multiple = selection.is_multiple();
    let limit = self.label_limit(config, multiple);

    let (moved, extras) = {
      let buffer = view.buffer();
      let mut cursor = buffer.matcher(self.direction());
      let mut ordered: Vec<Region> = selection.iter().copied().collect();
      if !self.forward {
        ordered.reverse();
      }

      let mut found = false;
      let mut seed = 0;
      let mut moved = Vec::with_capacity(ordered.len());
      for region in ordered {
        seed = if self.forward {
          region.end()
        } else {
          region.begin()
        };
        match cursor.next(seed, &regex) {
          Some(next) => {
            found = true;
            moved.push(self.target(region.a, next));
          },
          None => moved.push(region),
        }
      }

      let extras: Vec<Region> = if found {
        (0..limit).map_while(|_| cursor.next(seed, &regex)).collect()
      } else {
        Vec::new()
      };
      (found.then_some(moved), extras)
    };

    let flags = view.flags_mut();
    flags.needs_char = false;
    let Some(moved) = moved else {
      flags.has_stored_search = false;
      self.matches.clear();
      self.show_popup(view, config, false);
      return Err(CommandError::NoMatch(self.search.to_string()));
    };
    flags.has_stored_search = true;

    let selection = Selection::new(moved.into_iter().collect())?;
    debug!(search = %self.search, regions = selection.regions().len(), "sneak jump");
    view.add_regions(SNEAK_KEY, selection.regions(), &light_style(config));
    view.set_selection(selection);

    if multiple {
      self.matches.clear();
      view.add_regions(SNEAKS_KEY, &extras, &accent_style(config));
    } else {
      self.matches = extras;
      self.place_labels(view, config);
    }
    self.show_popup(view, config, true);
    Ok(())
  }

  fn jump<V: View>(&mut self, view: &mut V, config: &Config, idx: usize) -> Result<()> {
    let target = self.matches[idx];
    let selection = view.selection();
    let anchor = if self.forward {
      selection.last().a
    } else {
      selection.first().a
    };
    let region = self.target(anchor, target);
    debug!(label = idx + 1, ?region, "sneak label jump");

    self.matches.clear();
    let flags = view.flags_mut();
    flags.needs_char = false;
    flags.has_stored_search = true;
    view.set_selection(Selection::from(region));
    view.add_regions(SNEAK_KEY, &[region], &light_style(config));
    view.show(region.b);
    Ok(())
  }

  fn place_labels<V: View>(&self, view: &mut V, config: &Config) {
    for (idx, found) in self.matches.iter().enumerate() {
      if let Some(label) = config.sneak.label(idx) {
        view.add_phantom(SNEAK_KEY, Region::point(found.begin()), &label.to_string());
      }
    }
    view.add_regions(SNEAKS_KEY, &self.matches, &accent_style(config));
  }

  fn show_popup<V: View>(&self, view: &mut V, config: &Config, found: bool) {
    let location = view.selection().last().b;
    let content = popup_html(&self.search, self.forward, found, config);
    view.show(location);
    view.show_popup(Popup { location, content });
  }
}

fn light_style(config: &Config) -> RegionStyle {
  RegionStyle {
    scope: config.highlight.light.clone(),
    flags: RegionFlags::DRAW_NO_OUTLINE | RegionFlags::HIDE_ON_MINIMAP,
  }
}

fn accent_style(config: &Config) -> RegionStyle {
  RegionStyle {
    scope: config.highlight.accent.clone(),
    flags: RegionFlags::DRAW_NO_FILL | RegionFlags::HIDE_ON_MINIMAP,
  }
}

/// `search❯` or `❮search` as minihtml, tinted by `found`.
pub fn popup_html(search: &str, forward: bool, found: bool, config: &Config) -> String {
  let color = if found {
    &config.sneak.found_color
  } else {
    &config.sneak.not_found_color
  };
  let search = escape_html(search);
  let text = if forward {
    format!("{search}❯")
  } else {
    format!("❮{search}")
  };
  format!("<body id=\"sneak\"><span style=\"color: {color}\">{text}</span></body>")
}

fn escape_html(text: &str) -> String {
  let mut escaped = String::with_capacity(text.len());
  for ch in text.chars() {
    match ch {
      '&' => escaped.push_str("&amp;"),
      '<' => escaped.push_str("&lt;"),
      '>' => escaped.push_str("&gt;"),
      ' ' => escaped.push_str("&nbsp;"),
      ch => escaped.push(ch),
    }
  }
  escaped
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::headless::HeadlessView;

  fn run(text: &str, cursor: usize, keys: &str) -> (HeadlessView, SneakState) {
    let config = Config::default();
    let mut view = HeadlessView::new(text);
    view.set_selection(Selection::point(cursor));
    let mut state = SneakState::default();
    state.listen(&mut view, &config, true, false);
    for ch in keys.chars() {
      let _ = state.input(&mut view, &config, ch);
    }
    (view, state)
  }

  #[test]
  fn two_chars_jump_forward() {
    let (view, state) = run("the quick brown fox jumps", 10, "fo");
    assert_eq!(view.selection().regions(), &[Region::new(16, 18)]);
    assert!(!view.flags().needs_char);
    assert!(view.flags().has_stored_search);
    assert_eq!(state.search(), "fo");
  }

  #[test]
  fn first_char_places_labels() {
    let (view, state) = run("ab ab ab", 0, "b");
    assert_eq!(view.selection().regions(), &[Region::point(0)]);
    assert!(view.flags().needs_char);
    assert_eq!(state.matches(), &[
      Region::new(1, 2),
      Region::new(4, 5),
      Region::new(7, 8)
    ]);
    assert_eq!(view.phantoms(SNEAK_KEY), vec![
      (Region::point(1), "1".to_owned()),
      (Region::point(4), "2".to_owned()),
      (Region::point(7), "3".to_owned()),
    ]);
  }

  #[test]
  fn digit_commits_alone() {
    let (view, _) = run("a1 b1", 0, "1");
    assert_eq!(view.selection().regions(), &[Region::new(1, 2)]);
    assert!(!view.flags().needs_char);
  }

  #[test]
  fn digit_without_live_label_is_a_search_char() {
    let (view, state) = run("x a2 ab", 0, "a2");
    // `a` has two matches, so only labels 1 and 2 are live and `2` jumps.
    assert_eq!(view.selection().regions(), &[Region::new(5, 6)]);
    assert_eq!(state.search(), "a");

    let (view, state) = run("x a7 ab", 0, "a7");
    assert_eq!(view.selection().regions(), &[Region::new(2, 4)]);
    assert_eq!(state.search(), "a7");
  }

  #[test]
  fn no_match_keeps_selection() {
    let config = Config::default();
    let mut view = HeadlessView::new("hello");
    let mut state = SneakState::default();
    state.listen(&mut view, &config, true, false);
    state.input(&mut view, &config, 'z').unwrap();
    let err = state.input(&mut view, &config, 'q').unwrap_err();

    assert!(matches!(err, CommandError::NoMatch(search) if search == "zq"));
    assert_eq!(view.selection().regions(), &[Region::point(0)]);
    assert!(!view.flags().has_stored_search);
    assert!(!view.flags().needs_char);
    let popup = view.last_popup().unwrap();
    assert!(popup.content.contains(&config.sneak.not_found_color));
  }

  #[test]
  fn backward_and_extend() {
    let config = Config::default();
    let mut view = HeadlessView::new("ab xx ab xx");
    view.set_selection(Selection::point(11));
    let mut state = SneakState::default();

    state.listen(&mut view, &config, false, false);
    state.input(&mut view, &config, 'a').unwrap();
    state.input(&mut view, &config, 'b').unwrap();
    assert_eq!(view.selection().regions(), &[Region::new(8, 6)]);

    view.set_selection(Selection::single(10, 11));
    state.listen(&mut view, &config, false, true);
    state.input(&mut view, &config, 'a').unwrap();
    state.input(&mut view, &config, 'b').unwrap();
    assert_eq!(view.selection().regions(), &[Region::new(10, 6)]);
  }

  #[test]
  fn extend_keeps_anchor() {
    let config = Config::default();
    let mut view = HeadlessView::new("one two three two");
    view.set_selection(Selection::single(0, 2));
    let mut state = SneakState::default();
    state.listen(&mut view, &config, true, true);
    state.input(&mut view, &config, 't').unwrap();
    state.input(&mut view, &config, 'w').unwrap();
    assert_eq!(view.selection().regions(), &[Region::new(0, 6)]);

    state.repeat(&mut view, &config, true).unwrap();
    assert_eq!(view.selection().regions(), &[Region::new(0, 16)]);
  }

  #[test]
  fn every_selection_moves() {
    let config = Config::default();
    let mut view = HeadlessView::new("a,b a,b a,b a,b");
    view.set_selection(Selection::point(0).push(Region::point(4)));
    let mut state = SneakState::default();
    state.listen(&mut view, &config, true, false);
    state.input(&mut view, &config, ',').unwrap();

    assert_eq!(view.selection().regions(), &[Region::new(1, 2), Region::new(5, 6)]);
    assert!(state.matches().is_empty());
    assert_eq!(view.regions(SNEAKS_KEY), vec![Region::new(9, 10), Region::new(13, 14)]);
  }

  #[test]
  fn digit_after_first_char_moves_every_cursor() {
    let config = Config::default();
    let mut view = HeadlessView::new("a1 xx a1 xx a1");
    view.set_selection(Selection::point(2).push(Region::point(8)));
    let mut state = SneakState::default();
    state.listen(&mut view, &config, true, false);

    state.input(&mut view, &config, 'a').unwrap();
    assert!(state.matches().is_empty());
    assert!(view.phantoms(SNEAK_KEY).is_empty());
    assert_eq!(view.regions(SNEAKS_KEY), vec![Region::new(12, 13)]);

    state.input(&mut view, &config, '1').unwrap();
    assert_eq!(view.selection().regions(), &[Region::new(6, 8), Region::new(12, 14)]);
    assert_eq!(state.search(), "a1");
  }

  #[test]
  fn stored_character_waits_for_second() {
    let config = Config::default();
    let mut view = HeadlessView::new("xy ab xy");
    let mut state = SneakState::default();

    state.store_character(&mut view, 'x');
    assert!(view.flags().needs_char);
    assert!(view.flags().has_stored_search);
    assert_eq!(state.search(), "x");
    assert_eq!(view.selection().regions(), &[Region::point(0)]);

    state.input(&mut view, &config, 'y').unwrap();
    assert_eq!(view.selection().regions(), &[Region::new(0, 2)]);
    assert_eq!(state.search(), "xy");
    assert!(!view.flags().needs_char);
  }

  #[test]
  fn go_to_nth() {
    let config = Config::default();
    let mut view = HeadlessView::new("xxxxxxxxxxxx");
    let mut state = SneakState::default();
    state.listen(&mut view, &config, true, false);
    state.input(&mut view, &config, 'x').unwrap();
    assert_eq!(state.matches().len(), 10);

    state.go_to_nth(&mut view, &config, 0).unwrap();
    assert_eq!(view.selection().regions(), &[Region::new(9, 10)]);
    assert!(matches!(
      state.go_to_nth(&mut view, &config, 1),
      Err(CommandError::NoLabel(1))
    ));
  }

  #[test]
  fn popup_arrow() {
    let config = Config::default();
    assert_eq!(
      popup_html("a<", true, true, &config),
      "<body id=\"sneak\"><span style=\"color: #a6e22e\">a&lt;❯</span></body>"
    );
    assert!(popup_html("", false, false, &config).contains("#f92672\">❮<"));
  }
}
