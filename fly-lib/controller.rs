//! The modal controller.
//!
//! One [`Controller`] lives for the whole editor session and owns the state
//! that outlives a single command: configuration, the sneak search, the
//! paragraph indexes and the pending resume action. The host forwards its
//! events to it:
//!
//! - `run` for the core's own commands
//! - `on_text_command` before each of the host's own text commands (`run`
//!   already calls it for core commands)
//! - `on_modified`, `on_activated` and `on_timeout`
//! - `on_query_context` for keymap contexts
//!
//! Every command error is recovered here; nothing escapes to the host.

use std::num::NonZeroUsize;

use fly_stdx::rope::RopeSliceExt;
use tracing::{
  debug,
  trace,
  warn,
};

use crate::{
  buffer::{
    BufferId,
    ViewId,
  },
  command::{
    Command,
    CommandError,
    Result,
  },
  config::Config,
  context::{
    self,
    ContextKey,
    ContextQuery,
  },
  expand::expand_selection,
  host::{
    Edit,
    Host,
    TimerToken,
    View,
  },
  movement::{
    next_word_start,
    prev_word_start,
  },
  paragraph::{
    ParagraphIndex,
    ParagraphIndexes,
  },
  selection::{
    Region,
    Selection,
  },
  sneak::{
    SNEAK_KEY,
    SNEAKS_KEY,
    SneakState,
  },
};

/// Regions a host's copy command flashes; cleared with the sneak highlights.
pub const COPY_REGIONS_KEY: &str = "copy_regions";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeAction {
  DoNothing,
  /// Move the caret to the first non-blank char of its line.
  ChangeToBol,
  /// Select from the resume point to the caret.
  Extend,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResumePoint {
  pub view:   ViewId,
  pub pos:    usize,
  pub action: ResumeAction,
}

#[derive(Debug)]
pub struct Controller {
  config:     Config,
  sneak:      SneakState,
  paragraphs: ParagraphIndexes,
  resume:     Option<ResumePoint>,
}

impl Default for Controller {
  fn default() -> Self {
    Self::new(Config::default())
  }
}

impl Controller {
  pub fn new(config: Config) -> Self {
    let paragraphs = ParagraphIndexes::new(config.paragraph.debounce());
    Self {
      config,
      sneak: SneakState::default(),
      paragraphs,
      resume: None,
    }
  }

  pub fn config(&self) -> &Config {
    &self.config
  }

  pub fn sneak(&self) -> &SneakState {
    &self.sneak
  }

  pub fn paragraphs(&self) -> &ParagraphIndexes {
    &self.paragraphs
  }

  pub fn resume_point(&self) -> Option<ResumePoint> {
    self.resume
  }

  /// Hosts call this before running one of their own text commands; `run`
  /// calls it for core commands. Clears the transient highlights, retires a
  /// pending sneak unless `name` keeps it alive, and returns how many times
  /// the command should run.
  pub fn on_text_command<H: Host>(&mut self, host: &mut H, name: &str) -> usize {
    let view = host.active_view_mut();
    for key in [SNEAK_KEY, SNEAKS_KEY, COPY_REGIONS_KEY] {
      view.erase_regions(key);
      view.erase_phantoms(key);
    }

    let flags = view.flags_mut();
    if !self.config.modal.allows(name) {
      flags.needs_char = false;
      flags.has_stored_search = false;
      self.sneak.retire();
    }

    if name == "set_multiplier" {
      return 1;
    }
    let count = flags.multiplier.take().map_or(1, NonZeroUsize::get);
    trace!(command = name, count, "text command");
    count
  }

  /// Parses and runs a command sent as JSON.
  pub fn run_json<H: Host>(&mut self, host: &mut H, json: &str) -> Result<()> {
    let command = Command::from_json(json)?;
    self.run(host, &command);
    Ok(())
  }

  pub fn run<H: Host>(&mut self, host: &mut H, command: &Command) {
    let count = self.on_text_command(host, command.name());
    let count = if command.repeats() { count } else { 1 };
    debug!(command = command.name(), count, "running command");

    for _ in 0..count {
      if let Err(err) = self.execute(host, command) {
        self.recover(host, command, err);
        break;
      }
    }
  }

  fn recover<H: Host>(&mut self, host: &mut H, command: &Command, err: CommandError) {
    match err {
      CommandError::ReadOnly => {
        host.active_view_mut().status_message(&err.to_string());
      },
      CommandError::NoMatch(_)
      | CommandError::NoStoredSearch
      | CommandError::NoLabel(_)
      | CommandError::DegenerateSelection => {
        debug!(command = command.name(), "{err}");
      },
      err => warn!(command = command.name(), "command failed: {err}"),
    }
  }

  fn execute<H: Host>(&mut self, host: &mut H, command: &Command) -> Result<()> {
    let config = &self.config;
    match *command {
      Command::SneakListen { forward, extend } => {
        self
          .sneak
          .listen(host.active_view_mut(), config, forward, extend);
        Ok(())
      },
      Command::Sneak { character } => self.sneak.input(host.active_view_mut(), config, character),
      Command::SneakRepeat { forward } => {
        self.sneak.repeat(host.active_view_mut(), config, forward)
      },
      Command::GoToNthMatch { number } => {
        self.sneak.go_to_nth(host.active_view_mut(), config, number)
      },
      Command::StoreCharacter { character } => {
        self
          .sneak
          .store_character(host.active_view_mut(), character);
        Ok(())
      },
      Command::RevertSelection => {
        let view = host.active_view_mut();
        view.set_selection(view.selection().revert());
        Ok(())
      },
      Command::ExpandSelectionToNext(options) => {
        let view = host.active_view_mut();
        let expanded = expand_selection(&view.buffer(), &view.selection(), options)
          .ok_or(CommandError::DegenerateSelection)?;
        view.set_selection(expanded);
        Ok(())
      },
      Command::NavigateByParagraphForward => {
        self.move_by_paragraph(host, |index, region| {
          Region::point(index.next_para_start(region.b))
        });
        Ok(())
      },
      Command::NavigateByParagraphBackward => {
        self.move_by_paragraph(host, |index, region| {
          Region::point(index.prev_para_start(region.b))
        });
        Ok(())
      },
      Command::ExtendedExpandSelectionToParagraphForward => {
        self.move_by_paragraph(host, |index, region| {
          Region::new(region.a, index.next_para_end(region.b))
        });
        Ok(())
      },
      Command::ExtendedExpandSelectionToParagraphBackward => {
        self.move_by_paragraph(host, |index, region| {
          Region::new(region.a, index.prev_para_start(region.b))
        });
        Ok(())
      },
      Command::NavigateWordForward => {
        move_words(host.active_view_mut(), next_word_start);
        Ok(())
      },
      Command::NavigateWordBackward => {
        move_words(host.active_view_mut(), prev_word_start);
        Ok(())
      },
      Command::SetMultiplier { digit } => {
        let flags = host.active_view_mut().flags_mut();
        let digit = digit.min(9) as usize;
        let current = flags.multiplier.map_or(0, NonZeroUsize::get);
        flags.multiplier = NonZeroUsize::new(current.saturating_mul(10).saturating_add(digit));
        Ok(())
      },
      Command::CommandMode => {
        let flags = host.active_view_mut().flags_mut();
        flags.command_mode = true;
        flags.block_caret = true;
        Ok(())
      },
      Command::InsertMode => {
        let flags = host.active_view_mut().flags_mut();
        flags.command_mode = false;
        flags.block_caret = false;
        Ok(())
      },
      Command::SmartPaste => self.smart_paste(host),
    }
  }

  fn move_by_paragraph<H, F>(&mut self, host: &mut H, f: F)
  where
    H: Host,
    F: Fn(&ParagraphIndex, Region) -> Region,
  {
    let view = host.active_view_mut();
    let selection = {
      let buffer = view.buffer();
      let index = self.paragraphs.get_or_build(&buffer);
      view.selection().transform(|region| f(index, region))
    };
    let caret = selection.last().b;
    view.set_selection(selection);
    view.show(caret);
  }

  /// Pastes the clipboard over every region. When it holds one line per
  /// region, each region gets its own line.
  fn smart_paste<H: Host>(&mut self, host: &mut H) -> Result<()> {
    let contents = host.clipboard().get_contents()?;
    let view = host.active_view_mut();
    let buffer = view.buffer();
    if buffer.is_read_only() {
      return Err(CommandError::ReadOnly);
    }
    let id = buffer.id();
    let selection = view.selection();

    let lines: Vec<&str> = contents
      .strip_suffix('\n')
      .unwrap_or(&contents)
      .split('\n')
      .collect();
    let per_region = selection.is_multiple() && lines.len() == selection.regions().len();
    let texts: Vec<&str> = if per_region {
      lines
    } else {
      vec![contents.as_str(); selection.regions().len()]
    };

    let mut carets = Vec::with_capacity(texts.len());
    let mut shift: isize = 0;
    for (region, text) in selection.iter().zip(&texts) {
      let inserted = text.chars().count() as isize;
      let begin = region.begin() as isize + shift;
      carets.push(Region::point((begin + inserted) as usize));
      shift += inserted - region.len() as isize;
    }

    let edits: Vec<Edit> = selection
      .iter()
      .zip(&texts)
      .rev()
      .map(|(region, text)| {
        Edit {
          region: Region::new(region.begin(), region.end()),
          text:   (*text).to_owned(),
        }
      })
      .collect();
    debug!(edits = edits.len(), per_region, "smart paste");
    view.apply_edits(&edits);
    view.set_selection(Selection::new(carets.into_iter().collect())?);
    self.on_modified(host, id);
    Ok(())
  }

  /// The host reports every modification of a buffer.
  pub fn on_modified<H: Host>(&mut self, host: &mut H, id: BufferId) {
    if let Some(delay) = self.paragraphs.handle_modified(id, host.now()) {
      host.set_timeout(delay, TimerToken::ParagraphRebuild(id));
    }
  }

  pub fn on_timeout<H: Host>(&mut self, host: &mut H, token: TimerToken) {
    match token {
      TimerToken::ParagraphRebuild(id) => {
        let now = host.now();
        let rearm = match host.buffer(id) {
          Some(buffer) => self.paragraphs.finish_debounce(&buffer, now),
          None => {
            self.paragraphs.remove(id);
            None
          },
        };
        if let Some(delay) = rearm {
          host.set_timeout(delay, token);
        }
      },
    }
  }

  /// The host closed a buffer.
  pub fn on_close(&mut self, id: BufferId) {
    self.paragraphs.remove(id);
  }

  /// Answers a keymap context. `None` for keys the core does not know.
  pub fn on_query_context<H: Host>(&mut self, host: &H, query: &ContextQuery) -> Option<bool> {
    let key = ContextKey::from_name(&query.key)?;
    let values = context::values(host, key);
    if key == ContextKey::CanExpand {
      self.arm_resume(host);
    }
    Some(context::evaluate(
      &values,
      query.operator,
      &query.operand,
      query.match_all,
    ))
  }

  fn arm_resume<H: Host>(&mut self, host: &H) {
    let view = host.active_view();
    if view.element().is_some() {
      return;
    }
    let selection = view.selection();
    let action = if selection.is_empty() {
      ResumeAction::ChangeToBol
    } else {
      ResumeAction::Extend
    };
    self.resume = Some(ResumePoint {
      view: view.id(),
      pos: selection.last().b,
      action,
    });
    trace!(resume = ?self.resume, "armed resume action");
  }

  /// The host activated a view. Runs the armed resume action once when the
  /// arming view comes back.
  pub fn on_activated<H: Host>(&mut self, host: &mut H) {
    let view = host.active_view_mut();
    if view.element().is_some() {
      return;
    }
    let Some(resume) = self.resume.take() else {
      return;
    };
    if resume.view != view.id() {
      debug!(armed = ?resume.view, active = ?view.id(), "resume action dropped for other view");
      return;
    }

    let caret = view.selection().last().b;
    let region = match resume.action {
      ResumeAction::DoNothing => return,
      ResumeAction::ChangeToBol => {
        let text = view.buffer().text();
        let line = text.char_to_line(caret.min(text.len_chars()));
        Region::point(
          text
            .first_non_blank_char(line)
            .unwrap_or_else(|| text.line_to_char(line)),
        )
      },
      // The buffer may have shrunk since the point was armed.
      ResumeAction::Extend => Region::new(resume.pos.min(view.buffer().size()), caret),
    };
    view.set_selection(Selection::from(region));
    view.show(region.b);
  }
}

fn move_words<V: View>(view: &mut V, motion: fn(ropey::RopeSlice, usize) -> usize) {
  let selection = {
    let text = view.buffer().text();
    view
      .selection()
      .transform(|region| Region::point(motion(text, region.b)))
  };
  let caret = selection.last().b;
  view.set_selection(selection);
  view.show(caret);
}
