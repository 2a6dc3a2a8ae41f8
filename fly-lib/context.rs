//! Context keys the host's keymap queries.
//!
//! A keymap entry is active when its context holds, e.g.
//! `{"key": "reversed_selection", "operator": "equal", "operand": true,
//! "match_all": true}`. Keys answering per region combine their answers with
//! `match_all`.

use fly_core::chars::is_word_boundary;
use serde::Deserialize;
use serde_json::Value;

use crate::host::{
  Host,
  View,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextKey {
  /// Both ends of the region sit between a word and a non-word char.
  WordBoundary,
  ReversedSelection,
  SideBarVisible,
  NumGroups,
  /// The clipboard ends with a newline.
  ClipboardNewline,
  SearchInSelection,
  /// The view is a text view; asking arms the resume action.
  CanExpand,
  HasFindResults,
}

impl ContextKey {
  pub fn from_name(name: &str) -> Option<Self> {
    serde_json::from_value(Value::String(name.to_owned())).ok()
  }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
  #[default]
  Equal,
  NotEqual,
}

/// One context entry of a key binding.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ContextQuery {
  pub key:       String,
  #[serde(default)]
  pub operator:  Operator,
  #[serde(default = "default_operand")]
  pub operand:   Value,
  #[serde(default)]
  pub match_all: bool,
}

fn default_operand() -> Value {
  Value::Bool(true)
}

/// Values of `key` in the active view, one per region for per-region keys.
pub fn values<H: Host>(host: &H, key: ContextKey) -> Vec<Value> {
  let view = host.active_view();
  match key {
    ContextKey::WordBoundary => {
      let buffer = view.buffer();
      let boundary = |pos: usize| {
        let prev = pos.checked_sub(1).and_then(|pos| buffer.char_at(pos));
        is_word_boundary(prev, buffer.char_at(pos))
      };
      view
        .selection()
        .iter()
        .map(|region| {
          let anchor = region.is_empty() || boundary(region.a);
          Value::Bool(anchor && boundary(region.b))
        })
        .collect()
    },
    ContextKey::ReversedSelection => {
      view
        .selection()
        .iter()
        .map(|region| Value::Bool(region.is_reversed()))
        .collect()
    },
    ContextKey::SideBarVisible => vec![Value::Bool(host.side_bar_visible())],
    ContextKey::NumGroups => vec![Value::from(host.num_groups())],
    ContextKey::ClipboardNewline => {
      let newline = host
        .clipboard()
        .get_contents()
        .is_ok_and(|contents| contents.ends_with('\n'));
      vec![Value::Bool(newline)]
    },
    ContextKey::SearchInSelection => vec![Value::Bool(view.search_in_selection())],
    ContextKey::CanExpand => vec![Value::Bool(view.element().is_none())],
    ContextKey::HasFindResults => vec![Value::Bool(view.has_find_results())],
  }
}

pub fn evaluate(values: &[Value], operator: Operator, operand: &Value, match_all: bool) -> bool {
  let holds = |value: &Value| {
    match operator {
      Operator::Equal => value == operand,
      Operator::NotEqual => value != operand,
    }
  };
  if match_all {
    values.iter().all(holds)
  } else {
    values.iter().any(holds)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    headless::{
      HeadlessEditor,
      HeadlessView,
    },
    selection::{
      Region,
      Selection,
    },
  };

  fn holds(host: &HeadlessEditor, key: &str, operand: Value, match_all: bool) -> bool {
    let key = ContextKey::from_name(key).unwrap();
    evaluate(&values(host, key), Operator::Equal, &operand, match_all)
  }

  #[test]
  fn key_names() {
    assert_eq!(ContextKey::from_name("can_expand"), Some(ContextKey::CanExpand));
    assert_eq!(ContextKey::from_name("num_groups"), Some(ContextKey::NumGroups));
    assert_eq!(ContextKey::from_name("unknown"), None);
  }

  #[test]
  fn per_region_keys() {
    let mut view = HeadlessView::new("foo bar");
    view.set_selection(Selection::point(3).push(Region::point(5)));
    let host = HeadlessEditor::new(view);

    assert!(holds(&host, "word_boundary", Value::Bool(true), false));
    assert!(!holds(&host, "word_boundary", Value::Bool(true), true));
    assert!(!holds(&host, "reversed_selection", Value::Bool(true), false));
  }

  #[test]
  fn word_boundary_checks_both_ends() {
    let mut view = HeadlessView::new("foo bar");
    view.set_selection(Selection::single(0, 3));
    let host = HeadlessEditor::new(view);
    assert!(holds(&host, "word_boundary", Value::Bool(true), true));

    let mut view = HeadlessView::new("foo bar");
    view.set_selection(Selection::single(1, 3));
    let host = HeadlessEditor::new(view);
    assert!(!holds(&host, "word_boundary", Value::Bool(true), false));
  }

  #[test]
  fn clipboard_newline_without_clipboard() {
    let host = HeadlessEditor::new(HeadlessView::new(""));
    assert!(holds(&host, "clipboard_newline", Value::Bool(false), true));
  }

  #[test]
  fn reversed_selection() {
    let mut view = HeadlessView::new("foo bar");
    view.set_selection(Selection::single(3, 0).push(Region::new(7, 4)));
    let host = HeadlessEditor::new(view);
    assert!(holds(&host, "reversed_selection", Value::Bool(true), true));
  }

  #[test]
  fn window_keys() {
    let mut host = HeadlessEditor::new(HeadlessView::new(""));
    host.set_layout(true, 2);
    host.set_clipboard("line\n");

    assert!(holds(&host, "side_bar_visible", Value::Bool(true), false));
    assert!(holds(&host, "num_groups", Value::from(2), false));
    assert!(holds(&host, "clipboard_newline", Value::Bool(true), false));
    assert!(holds(&host, "can_expand", Value::Bool(true), false));
    assert!(!holds(&host, "has_find_results", Value::Bool(true), false));
    assert!(evaluate(
      &values(&host, ContextKey::NumGroups),
      Operator::NotEqual,
      &Value::from(3),
      true
    ));
  }

  #[test]
  fn parse_query() {
    let query: ContextQuery = serde_json::from_str(r#"{"key": "search_in_selection"}"#).unwrap();
    assert_eq!(query.operator, Operator::Equal);
    assert_eq!(query.operand, Value::Bool(true));
    assert!(!query.match_all);
  }
}
