//! Line editor abstraction for the console.
//!
//! The console reads through [`LineEditor`] so tests can script input while
//! the binary uses rustyline.

use std::borrow::Cow;

use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::{CmdKind, Highlighter};
use rustyline::hint::HistoryHinter;
use rustyline::history::DefaultHistory;
use rustyline::{Completer, Config, Context, Editor, Helper, Hinter, Validator};
use sigil_foundation::{Error, ErrorKind, Result};

/// Result of reading a line from the editor.
#[derive(Debug)]
pub enum ReadResult {
    /// A line was successfully read.
    Line(String),
    /// User pressed Ctrl+C.
    Interrupted,
    /// User pressed Ctrl+D (EOF).
    Eof,
}

/// Abstraction over line editing functionality.
pub trait LineEditor {
    /// Read a line with the given prompt.
    ///
    /// # Errors
    ///
    /// Returns an error if reading from the terminal fails.
    fn read_line(&mut self, prompt: &str) -> Result<ReadResult>;

    /// Add a line to history.
    fn add_history(&mut self, line: &str);

    /// Replace the verbs offered for completion.
    fn set_verbs(&mut self, verbs: Vec<String>);
}

#[derive(Helper, Completer, Hinter, Validator)]
struct SigilHelper {
    #[rustyline(Completer)]
    completer: VerbCompleter,
    #[rustyline(Hinter)]
    hinter: HistoryHinter,
}

impl Highlighter for SigilHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        let trimmed = line.trim_start();
        let indent = line.len() - trimmed.len();
        let verb_len = trimmed.find(char::is_whitespace).unwrap_or(trimmed.len());
        let verb = &trimmed[..verb_len];

        if self.completer.verbs.iter().any(|v| v.eq_ignore_ascii_case(verb)) {
            Cow::Owned(format!(
                "{}\x1b[1;36m{verb}\x1b[0m{}",
                &line[..indent],
                &trimmed[verb_len..]
            ))
        } else {
            Cow::Borrowed(line)
        }
    }

    fn highlight_prompt<'b, 's: 'b, 'p: 'b>(
        &'s self,
        prompt: &'p str,
        default: bool,
    ) -> Cow<'b, str> {
        if default {
            Cow::Owned(format!("\x1b[1;32m{prompt}\x1b[0m"))
        } else {
            Cow::Borrowed(prompt)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _kind: CmdKind) -> bool {
        true
    }

    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Cow::Owned(format!("\x1b[2m{hint}\x1b[0m"))
    }
}

/// Completes the first word of a line against the registered verbs.
#[derive(Default)]
struct VerbCompleter {
    verbs: Vec<String>,
}

impl VerbCompleter {
    fn candidates(&self, line: &str, pos: usize) -> (usize, Vec<Pair>) {
        let head = &line[..pos];
        let start = head.len() - head.trim_start().len();
        let word = &head[start..];

        // Only the verb position completes.
        if word.contains(char::is_whitespace) {
            return (pos, Vec::new());
        }

        let candidates = self
            .verbs
            .iter()
            .filter(|verb| verb.starts_with(&word.to_lowercase()))
            .map(|verb| Pair {
                display: verb.clone(),
                replacement: format!("{verb} "),
            })
            .collect();
        (start, candidates)
    }
}

impl Completer for VerbCompleter {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        Ok(self.candidates(line, pos))
    }
}

/// Line editor implementation using rustyline.
pub struct RustylineEditor {
    editor: Editor<SigilHelper, DefaultHistory>,
}

impl RustylineEditor {
    /// Creates a rustyline editor keeping `history_size` entries.
    ///
    /// # Errors
    ///
    /// Returns an error if the history size is rejected or the terminal
    /// cannot be initialized.
    pub fn new(history_size: usize) -> Result<Self> {
        let config = Config::builder()
            .auto_add_history(false)
            .max_history_size(history_size)
            .map_err(|e| Error::new(ErrorKind::Config(e.to_string())))?
            .build();

        let helper = SigilHelper {
            completer: VerbCompleter::default(),
            hinter: HistoryHinter::new(),
        };

        let mut editor = Editor::with_config(config)
            .map_err(|e| Error::new(ErrorKind::Internal(e.to_string())))?;
        editor.set_helper(Some(helper));

        Ok(Self { editor })
    }
}

impl LineEditor for RustylineEditor {
    fn read_line(&mut self, prompt: &str) -> Result<ReadResult> {
        match self.editor.readline(prompt) {
            Ok(line) => Ok(ReadResult::Line(line)),
            Err(ReadlineError::Interrupted) => Ok(ReadResult::Interrupted),
            Err(ReadlineError::Eof) => Ok(ReadResult::Eof),
            Err(e) => Err(Error::new(ErrorKind::IoError(e.to_string()))),
        }
    }

    fn add_history(&mut self, line: &str) {
        let _ = self.editor.add_history_entry(line);
    }

    fn set_verbs(&mut self, verbs: Vec<String>) {
        if let Some(helper) = self.editor.helper_mut() {
            helper.completer.verbs = verbs;
        }
    }
}
