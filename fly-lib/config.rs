//! User configuration.
//!
//! Read from TOML. Every table and key is optional; a local file is merged
//! over the global one key by key.
//!
//! ```toml
//! [sneak]
//! labels = "asdfghjkl;"
//! single_char_commit = ",.;"
//!
//! [paragraph]
//! debounce_ms = 500
//! ```

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use toml::Value;

pub const MAX_LABELS: usize = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to parse config: {0}")]
  BadConfig(#[from] toml::de::Error),
  #[error("at most {MAX_LABELS} sneak labels are supported, got {0}")]
  TooManyLabels(usize),
  #[error("sneak label '{0}' is listed twice")]
  DuplicateLabel(char),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
  pub sneak:     SneakConfig,
  pub paragraph: ParagraphConfig,
  pub highlight: HighlightConfig,
  pub modal:     ModalConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SneakConfig {
  /// Phantom labels, in match order.
  pub labels:             String,
  /// Characters that start a jump on their own instead of waiting for a
  /// second character.
  pub single_char_commit: String,
  pub found_color:        String,
  pub not_found_color:    String,
}

impl Default for SneakConfig {
  fn default() -> Self {
    Self {
      labels:             "1234567890".to_owned(),
      single_char_commit: "()[]{}<>,;:.\"'".to_owned(),
      found_color:        "#a6e22e".to_owned(),
      not_found_color:    "#f92672".to_owned(),
    }
  }
}

impl SneakConfig {
  pub fn label(&self, idx: usize) -> Option<char> {
    self.labels.chars().nth(idx)
  }

  pub fn label_index(&self, ch: char) -> Option<usize> {
    self.labels.chars().position(|label| label == ch)
  }

  pub fn commits_alone(&self, ch: char) -> bool {
    ch.is_ascii_digit() || self.single_char_commit.contains(ch)
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParagraphConfig {
  /// Quiet time after the last edit before the index is rebuilt.
  pub debounce_ms: u64,
}

impl Default for ParagraphConfig {
  fn default() -> Self {
    Self { debounce_ms: 2000 }
  }
}

impl ParagraphConfig {
  pub fn debounce(&self) -> Duration {
    Duration::from_millis(self.debounce_ms)
  }
}

/// Scopes the host colors highlighted regions with.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HighlightConfig {
  /// Chosen cursors.
  pub light:  String,
  /// Further candidates.
  pub accent: String,
}

impl Default for HighlightConfig {
  fn default() -> Self {
    Self {
      light:  "region.bluish".to_owned(),
      accent: "region.orangish".to_owned(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModalConfig {
  /// Commands that keep a pending sneak alive.
  pub allow_list: Vec<String>,
}

impl Default for ModalConfig {
  fn default() -> Self {
    Self {
      allow_list: [
        "sneak",
        "sneak_repeat",
        "store_character",
        "revert_selection",
        "find_next",
        "find_prev",
        "go_to_nth_match",
      ]
      .into_iter()
      .map(str::to_owned)
      .collect(),
    }
  }
}

impl ModalConfig {
  pub fn allows(&self, command: &str) -> bool {
    self.allow_list.iter().any(|allowed| allowed == command)
  }
}

impl Config {
  pub fn from_toml(text: &str) -> Result<Self> {
    Self::load(Some(text), None)
  }

  /// Merges `local` over `global` and validates the result.
  pub fn load(global: Option<&str>, local: Option<&str>) -> Result<Self> {
    let parse = |text: Option<&str>| -> Result<Option<Value>> {
      text
        .map(|text| -> Result<Value> {
          Ok(Value::Table(toml::from_str::<toml::Table>(text)?))
        })
        .transpose()
    };

    let config: Config = match (parse(global)?, parse(local)?) {
      (None, None) => Config::default(),
      (Some(value), None) | (None, Some(value)) => value.try_into()?,
      (Some(global), Some(local)) => merge_toml_values(global, local, 3).try_into()?,
    };
    config.validate()?;
    Ok(config)
  }

  fn validate(&self) -> Result<()> {
    let labels: Vec<char> = self.sneak.labels.chars().collect();
    if labels.len() > MAX_LABELS {
      return Err(ConfigError::TooManyLabels(labels.len()));
    }
    for (idx, label) in labels.iter().enumerate() {
      if labels[..idx].contains(label) {
        return Err(ConfigError::DuplicateLabel(*label));
      }
    }
    Ok(())
  }
}

/// Merges `right` into `left`, recursing into tables up to `merge_depth`
/// levels. Deeper values and non-table values are taken from `right`.
pub fn merge_toml_values(left: Value, right: Value, merge_depth: usize) -> Value {
  match (left, right) {
    (Value::Table(mut left_map), Value::Table(right_map)) if merge_depth > 0 => {
      for (name, rvalue) in right_map {
        let merged = match left_map.remove(&name) {
          Some(lvalue) => merge_toml_values(lvalue, rvalue, merge_depth - 1),
          None => rvalue,
        };
        left_map.insert(name, merged);
      }
      Value::Table(left_map)
    },
    (_, value) => value,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults() {
    let config = Config::load(None, None).unwrap();
    assert_eq!(config, Config::default());
    assert_eq!(config.paragraph.debounce(), Duration::from_secs(2));
    assert_eq!(config.sneak.label(9), Some('0'));
    assert_eq!(config.sneak.label_index('3'), Some(2));
    assert!(config.modal.allows("sneak_repeat"));
    assert!(!config.modal.allows("navigate_word_forward"));
  }

  #[test]
  fn partial_tables() {
    let config = Config::from_toml("[paragraph]\ndebounce_ms = 10\n").unwrap();
    assert_eq!(config.paragraph.debounce(), Duration::from_millis(10));
    assert_eq!(config.sneak, SneakConfig::default());
  }

  #[test]
  fn local_overrides_global() {
    let global = "[sneak]\nlabels = \"abc\"\nfound_color = \"#000000\"\n";
    let local = "[sneak]\nlabels = \"xyz\"\n";
    let config = Config::load(Some(global), Some(local)).unwrap();
    assert_eq!(config.sneak.labels, "xyz");
    assert_eq!(config.sneak.found_color, "#000000");
  }

  #[test]
  fn rejects_bad_configs() {
    assert!(matches!(
      Config::from_toml("[sneak]\nunknown = 1\n"),
      Err(ConfigError::BadConfig(_))
    ));
    assert!(matches!(
      Config::from_toml("[sneak]\nlabels = \"abcdefghijk\"\n"),
      Err(ConfigError::TooManyLabels(11))
    ));
    assert!(matches!(
      Config::from_toml("[sneak]\nlabels = \"aba\"\n"),
      Err(ConfigError::DuplicateLabel('a'))
    ));
  }

  #[test]
  fn commit_set() {
    let sneak = SneakConfig::default();
    assert!(sneak.commits_alone('4'));
    assert!(sneak.commits_alone('('));
    assert!(!sneak.commits_alone('f'));
  }
}
