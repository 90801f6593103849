//! The interactive console.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use sigil_foundation::{Error, ErrorKind, Result};
use sigil_parser::DispatchResult;

use crate::editor::{LineEditor, ReadResult, RustylineEditor};
use crate::render::{is_failure, render};
use crate::session::Session;

/// Reads command lines, dispatches them, and prints the replies.
pub struct Repl<E: LineEditor = RustylineEditor> {
    editor: E,
    session: Session,
    show_banner: bool,
    prompt: String,
}

impl Repl<RustylineEditor> {
    /// Creates a console with the default rustyline editor.
    ///
    /// # Errors
    ///
    /// Returns an error if the editor fails to initialize.
    pub fn new(session: Session, history_size: usize) -> Result<Self> {
        let editor = RustylineEditor::new(history_size)?;
        Ok(Self::with_editor(editor, session))
    }
}

impl<E: LineEditor> Repl<E> {
    /// Creates a console reading from `editor`.
    pub fn with_editor(editor: E, session: Session) -> Self {
        Self {
            editor,
            session,
            show_banner: true,
            prompt: "sigil> ".to_string(),
        }
    }

    /// Disables the welcome banner.
    #[must_use]
    pub const fn without_banner(mut self) -> Self {
        self.show_banner = false;
        self
    }

    /// Sets the prompt.
    #[must_use]
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    /// Returns the session.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Returns the session mutably.
    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    /// Runs until end of input.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal fails.
    pub fn run(&mut self) -> Result<()> {
        if self.show_banner {
            self.print_banner();
        }

        let verbs = self
            .session
            .dispatcher()
            .registry()
            .verbs()
            .into_iter()
            .map(String::from)
            .collect();
        self.editor.set_verbs(verbs);

        loop {
            match self.editor.read_line(&self.prompt)? {
                ReadResult::Line(line) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    self.editor.add_history(&line);
                    match self.eval_line(&line) {
                        Ok(Some(result)) => Self::print_result(&result),
                        Ok(None) => {}
                        Err(e) => Self::print_error(&e),
                    }
                }
                ReadResult::Interrupted => println!(),
                ReadResult::Eof => break,
            }
        }

        println!("\nGoodbye!");
        Ok(())
    }

    /// Dispatches one line and saves the store if it changed.
    ///
    /// Returns `None` when the line lacks the configured prefix.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be saved.
    pub fn eval_line(&mut self, line: &str) -> Result<Option<DispatchResult>> {
        let result = self.session.eval(line);
        if self.session.persist()? {
            tracing::debug!("store persisted");
        }
        Ok(result)
    }

    /// Runs every line of a script, skipping blank lines and `#` comments.
    ///
    /// Returns the number of lines that failed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the store cannot be
    /// saved.
    pub fn eval_file(&mut self, path: &Path) -> Result<usize> {
        let source = fs::read_to_string(path).map_err(|e| {
            Error::new(ErrorKind::IoError(format!(
                "failed to read {}: {e}",
                path.display()
            )))
        })?;

        let mut failures = 0;
        for (number, line) in source.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            if let Some(result) = self.eval_line(trimmed)? {
                if is_failure(&result) {
                    failures += 1;
                    tracing::warn!(path = %path.display(), line = number + 1, "script line failed");
                }
                Self::print_result(&result);
            }
        }
        Ok(failures)
    }

    /// Prints a dispatch result, failures to stderr.
    pub fn print_result(result: &DispatchResult) {
        let lines = render(result);
        if is_failure(result) {
            for line in lines {
                eprintln!("\x1b[31m{line}\x1b[0m");
            }
        } else {
            for line in lines {
                println!("{line}");
            }
        }
    }

    fn print_error(error: &Error) {
        eprintln!("\x1b[31mError: {error}\x1b[0m");
    }

    #[allow(clippy::unused_self)]
    fn print_banner(&self) {
        println!("\x1b[1;36msigil\x1b[0m v{}", env!("CARGO_PKG_VERSION"));
        println!(
            "Speaking as {} on {}. Type `help` for commands, Ctrl+D to exit.\n",
            self.session.caller(),
            self.session.channel()
        );
        let _ = io::stdout().flush();
    }
}
