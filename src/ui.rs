// UI layer: line input, hidden secret input, the "Thinking..." spinner and
// the text helpers used to print replies. The interactive loops in `menu`,
// `chat` and `reader` only see the `Prompter` trait, so they run the same
// against a real terminal or a scripted test double.

use anyhow::{Context, Result};
use crossterm::style::{StyledContent, Stylize};
use dialoguer::Password;
use indicatif::{ProgressBar, ProgressStyle};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::time::Duration;
use tracing::warn;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Width used when the terminal size cannot be queried.
pub const FALLBACK_COLUMNS: usize = 80;

/// Narrowest wrap width used for replies, however small the terminal.
pub const MIN_WRAP_WIDTH: usize = 20;

/// Result of asking the user for one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    Line(String),
    /// Ctrl+C at the prompt.
    Interrupted,
    /// Ctrl+D or closed stdin.
    Eof,
    /// A line arrived but could not be decoded (e.g. invalid UTF-8). The
    /// bytes are consumed; the loop should report it and prompt again.
    Unreadable,
}

/// Message printed when a line comes back as `ReadOutcome::Unreadable`.
pub const UNREADABLE_INPUT: &str = "Input could not be read (not valid UTF-8). Please try again.";

/// Source of user input for the interactive loops.
pub trait Prompter {
    /// Show `prompt` and read one line.
    fn read_line(&mut self, prompt: &str) -> Result<ReadOutcome>;

    /// Read a secret without echoing it. Empty input is returned as-is.
    fn read_secret(&mut self, prompt: &str) -> Result<String>;
}

/// `Prompter` backed by rustyline for lines (with history) and dialoguer for
/// hidden input.
pub struct TerminalPrompter {
    editor: DefaultEditor,
}

impl TerminalPrompter {
    pub fn new() -> Result<Self> {
        let editor = DefaultEditor::new().context("Failed to initialise line editor")?;
        Ok(TerminalPrompter { editor })
    }
}

impl Prompter for TerminalPrompter {
    fn read_line(&mut self, prompt: &str) -> Result<ReadOutcome> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    // History is a convenience; failing to record it is not an error.
                    let _ = self.editor.add_history_entry(line.as_str());
                }
                Ok(ReadOutcome::Line(line))
            }
            Err(ReadlineError::Interrupted) => Ok(ReadOutcome::Interrupted),
            Err(ReadlineError::Eof) => Ok(ReadOutcome::Eof),
            Err(ReadlineError::Io(e)) if e.kind() == std::io::ErrorKind::InvalidData => {
                warn!(error = %e, "discarding undecodable input line");
                Ok(ReadOutcome::Unreadable)
            }
            Err(e) => Err(e).context("Failed to read input"),
        }
    }

    fn read_secret(&mut self, prompt: &str) -> Result<String> {
        // `Password` hides input in the terminal.
        let secret = Password::new()
            .with_prompt(prompt)
            .allow_empty_password(true)
            .interact()
            .context("Failed to read hidden input")?;
        Ok(secret)
    }
}

/// Spinner shown while a request is in flight. Call `finish_and_clear` on it
/// once the response is in.
pub fn thinking_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message("Thinking...");
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// Current terminal size as (columns, rows), if it can be determined.
pub fn terminal_size() -> Option<(usize, usize)> {
    crossterm::terminal::size()
        .ok()
        .filter(|(cols, rows)| *cols > 0 && *rows > 0)
        .map(|(cols, rows)| (cols as usize, rows as usize))
}

/// Wrap width for replies given the terminal's column count.
pub fn reply_width(columns: usize) -> usize {
    columns.saturating_sub(2).max(MIN_WRAP_WIDTH)
}

/// Wrap width for replies in the current terminal.
pub fn current_reply_width() -> usize {
    let columns = terminal_size().map(|(c, _)| c).unwrap_or(FALLBACK_COLUMNS);
    reply_width(columns)
}

// Labels. Kept here so every loop styles them the same way.

pub fn warning_label() -> StyledContent<&'static str> {
    "Warning:".yellow().bold()
}

pub fn error_label(text: &'static str) -> StyledContent<&'static str> {
    text.red().bold()
}

pub fn speaker_label(text: &str) -> StyledContent<String> {
    format!("{}:", text).cyan().bold()
}

/// Greedy word wrap. Every output line except the very first is prefixed with
/// `indent`, and no line is wider than `width` columns. Line breaks in `text`
/// are kept; runs of spaces inside a line collapse to one. Words longer than
/// the available width are split.
pub fn wrap_text(text: &str, width: usize, indent: &str) -> String {
    let mut filler = Filler {
        width: width.max(1),
        indent,
        lines: Vec::new(),
        current: String::new(),
        current_width: 0,
    };
    for source in text.lines() {
        let mut words = source.split_whitespace().peekable();
        if words.peek().is_none() {
            filler.lines.push(String::new());
            continue;
        }
        for word in words {
            filler.push_word(word);
        }
        filler.flush();
    }
    filler.lines.join("\n")
}

struct Filler<'a> {
    width: usize,
    indent: &'a str,
    lines: Vec<String>,
    current: String,
    current_width: usize,
}

impl Filler<'_> {
    // Room available on the line being built.
    fn limit(&self) -> usize {
        if self.lines.is_empty() {
            self.width
        } else {
            self.width.saturating_sub(self.indent.width()).max(1)
        }
    }

    fn push_word(&mut self, word: &str) {
        let word_width = word.width();
        let sep = usize::from(!self.current.is_empty());
        if self.current_width + sep + word_width <= self.limit() {
            if sep == 1 {
                self.current.push(' ');
            }
            self.current.push_str(word);
            self.current_width += sep + word_width;
            return;
        }

        self.flush();
        if word_width <= self.limit() {
            self.current.push_str(word);
            self.current_width = word_width;
            return;
        }

        for ch in word.chars() {
            let w = ch.width().unwrap_or(0);
            if !self.current.is_empty() && self.current_width + w > self.limit() {
                self.flush();
            }
            self.current.push(ch);
            self.current_width += w;
        }
    }

    fn flush(&mut self) {
        if self.current.is_empty() {
            return;
        }
        let line = std::mem::take(&mut self.current);
        if self.lines.is_empty() {
            self.lines.push(line);
        } else {
            self.lines.push(format!("{}{}", self.indent, line));
        }
        self.current_width = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_untouched() {
        assert_eq!(wrap_text("hello world", 40, "  "), "hello world");
    }

    #[test]
    fn continuation_lines_are_indented_and_fit() {
        let out = wrap_text("aaa bbb ccc ddd", 7, "  ");
        assert_eq!(out, "aaa bbb\n  ccc\n  ddd");
        for line in out.lines() {
            assert!(line.width() <= 7, "line too wide: {:?}", line);
        }
    }

    #[test]
    fn paragraph_breaks_survive_wrapping() {
        let out = wrap_text("first line\n\nsecond", 40, "  ");
        assert_eq!(out, "first line\n\n  second");
    }

    #[test]
    fn long_words_are_split() {
        let out = wrap_text("abcdefghij", 4, "");
        assert_eq!(out, "abcd\nefgh\nij");
    }

    #[test]
    fn reply_width_has_a_floor() {
        assert_eq!(reply_width(80), 78);
        assert_eq!(reply_width(10), MIN_WRAP_WIDTH);
        assert_eq!(reply_width(0), MIN_WRAP_WIDTH);
    }
}
