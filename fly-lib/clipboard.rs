//! Clipboard access.
//!
//! The core reads the host clipboard for `smart_paste` and the
//! `clipboard_newline` context key. Hosts provide the implementation.

use std::borrow::Cow;

use parking_lot::Mutex;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClipboardError {
  #[error("clipboard provider does not support reading")]
  ReadingNotSupported,
  #[error("clipboard error: {0}")]
  Platform(String),
}

pub type Result<T> = std::result::Result<T, ClipboardError>;

pub trait ClipboardProvider: Send + Sync {
  fn name(&self) -> Cow<'_, str>;
  fn get_contents(&self) -> Result<String>;
  fn set_contents(&self, content: &str) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct NoClipboard;

impl ClipboardProvider for NoClipboard {
  fn name(&self) -> Cow<'_, str> {
    "none".into()
  }

  fn get_contents(&self) -> Result<String> {
    Err(ClipboardError::ReadingNotSupported)
  }

  fn set_contents(&self, _content: &str) -> Result<()> {
    Ok(())
  }
}

/// Clipboard kept in process memory.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
  contents: Mutex<String>,
}

impl MemoryClipboard {
  pub fn new(contents: &str) -> Self {
    Self {
      contents: Mutex::new(contents.to_owned()),
    }
  }
}

impl ClipboardProvider for MemoryClipboard {
  fn name(&self) -> Cow<'_, str> {
    "memory".into()
  }

  fn get_contents(&self) -> Result<String> {
    Ok(self.contents.lock().clone())
  }

  fn set_contents(&self, content: &str) -> Result<()> {
    *self.contents.lock() = content.to_owned();
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn memory_round_trip() {
    let clipboard = MemoryClipboard::default();
    assert_eq!(clipboard.get_contents().unwrap(), "");
    clipboard.set_contents("a\nb\n").unwrap();
    assert_eq!(clipboard.get_contents().unwrap(), "a\nb\n");
    assert_eq!(clipboard.name(), "memory");
  }

  #[test]
  fn no_clipboard_cannot_read() {
    assert!(matches!(
      NoClipboard.get_contents(),
      Err(ClipboardError::ReadingNotSupported)
    ));
  }
}
