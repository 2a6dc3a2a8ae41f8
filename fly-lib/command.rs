//! Commands the core exposes to the host.
//!
//! Hosts send commands as `{"command": name, "args": {...}}`, the shape their
//! keymaps already use. `args` may be missing, `null` or `{}`; commands without
//! arguments ignore it and flags default to `false`.

use serde::{
  Deserialize,
  de::DeserializeOwned,
};
use serde_json::{
  Map,
  Value,
};
use thiserror::Error;

use crate::{
  clipboard::ClipboardError,
  expand::ExpandOptions,
  search::SearchError,
  selection::SelectionError,
};

#[derive(Debug, Error)]
pub enum CommandError {
  #[error("Buffer is read only")]
  ReadOnly,
  #[error("no match for '{0}'")]
  NoMatch(String),
  #[error("no stored search")]
  NoStoredSearch,
  #[error("no label {0}")]
  NoLabel(usize),
  #[error("selection did not change")]
  DegenerateSelection,
  #[error(transparent)]
  Search(#[from] SearchError),
  #[error(transparent)]
  Selection(#[from] SelectionError),
  #[error(transparent)]
  Clipboard(#[from] ClipboardError),
  #[error("unknown command '{0}'")]
  UnknownCommand(String),
  #[error("invalid command: {0}")]
  Parse(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CommandError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
  SneakListen {
    forward: bool,
    extend:  bool,
  },
  Sneak {
    character: char,
  },
  SneakRepeat {
    forward: bool,
  },
  GoToNthMatch {
    number: usize,
  },
  StoreCharacter {
    character: char,
  },
  RevertSelection,
  ExpandSelectionToNext(ExpandOptions),
  NavigateByParagraphForward,
  NavigateByParagraphBackward,
  ExtendedExpandSelectionToParagraphForward,
  ExtendedExpandSelectionToParagraphBackward,
  NavigateWordForward,
  NavigateWordBackward,
  SetMultiplier {
    digit: u32,
  },
  CommandMode,
  InsertMode,
  SmartPaste,
}

#[derive(Debug, Deserialize)]
struct Invocation {
  command: String,
  #[serde(default)]
  args:    Value,
}

#[derive(Deserialize)]
struct ListenArgs {
  forward: bool,
  #[serde(default)]
  extend:  bool,
}

#[derive(Deserialize)]
struct CharacterArgs {
  character: char,
}

#[derive(Deserialize)]
struct ForwardArgs {
  forward: bool,
}

#[derive(Deserialize)]
struct NumberArgs {
  number: usize,
}

#[derive(Deserialize)]
struct DigitArgs {
  digit: u32,
}

fn parse_args<T: DeserializeOwned>(args: Value) -> Result<T> {
  Ok(serde_json::from_value(args)?)
}

impl Command {
  pub fn from_json(json: &str) -> Result<Self> {
    let invocation: Invocation = serde_json::from_str(json)?;
    Self::from_args(&invocation.command, invocation.args)
  }

  /// Builds the command `name` from its arguments. `null` stands for no
  /// arguments.
  pub fn from_args(name: &str, args: Value) -> Result<Self> {
    let args = match args {
      Value::Null => Value::Object(Map::new()),
      args => args,
    };

    let command = match name {
      "sneak_listen" => {
        let ListenArgs { forward, extend } = parse_args(args)?;
        Self::SneakListen { forward, extend }
      },
      "sneak" => {
        let CharacterArgs { character } = parse_args(args)?;
        Self::Sneak { character }
      },
      "sneak_repeat" => {
        let ForwardArgs { forward } = parse_args(args)?;
        Self::SneakRepeat { forward }
      },
      "go_to_nth_match" => {
        let NumberArgs { number } = parse_args(args)?;
        Self::GoToNthMatch { number }
      },
      "store_character" => {
        let CharacterArgs { character } = parse_args(args)?;
        Self::StoreCharacter { character }
      },
      "revert_selection" => Self::RevertSelection,
      "expand_selection_to_next" => Self::ExpandSelectionToNext(parse_args(args)?),
      "navigate_by_paragraph_forward" => Self::NavigateByParagraphForward,
      "navigate_by_paragraph_backward" => Self::NavigateByParagraphBackward,
      "extended_expand_selection_to_paragraph_forward" => {
        Self::ExtendedExpandSelectionToParagraphForward
      },
      "extended_expand_selection_to_paragraph_backward" => {
        Self::ExtendedExpandSelectionToParagraphBackward
      },
      "navigate_word_forward" => Self::NavigateWordForward,
      "navigate_word_backward" => Self::NavigateWordBackward,
      "set_multiplier" => {
        let DigitArgs { digit } = parse_args(args)?;
        Self::SetMultiplier { digit }
      },
      "command_mode" => Self::CommandMode,
      "insert_mode" => Self::InsertMode,
      "smart_paste" => Self::SmartPaste,
      _ => return Err(CommandError::UnknownCommand(name.to_owned())),
    };
    Ok(command)
  }

  pub fn name(&self) -> &'static str {
    match self {
      Self::SneakListen { .. } => "sneak_listen",
      Self::Sneak { .. } => "sneak",
      Self::SneakRepeat { .. } => "sneak_repeat",
      Self::GoToNthMatch { .. } => "go_to_nth_match",
      Self::StoreCharacter { .. } => "store_character",
      Self::RevertSelection => "revert_selection",
      Self::ExpandSelectionToNext(_) => "expand_selection_to_next",
      Self::NavigateByParagraphForward => "navigate_by_paragraph_forward",
      Self::NavigateByParagraphBackward => "navigate_by_paragraph_backward",
      Self::ExtendedExpandSelectionToParagraphForward => {
        "extended_expand_selection_to_paragraph_forward"
      },
      Self::ExtendedExpandSelectionToParagraphBackward => {
        "extended_expand_selection_to_paragraph_backward"
      },
      Self::NavigateWordForward => "navigate_word_forward",
      Self::NavigateWordBackward => "navigate_word_backward",
      Self::SetMultiplier { .. } => "set_multiplier",
      Self::CommandMode => "command_mode",
      Self::InsertMode => "insert_mode",
      Self::SmartPaste => "smart_paste",
    }
  }

  /// Whether the multiplier repeats this command.
  pub fn repeats(&self) -> bool {
    !matches!(
      self,
      Self::SneakListen { .. }
        | Self::Sneak { .. }
        | Self::GoToNthMatch { .. }
        | Self::StoreCharacter { .. }
        | Self::SetMultiplier { .. }
        | Self::CommandMode
        | Self::InsertMode
    )
  }
}
