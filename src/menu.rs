// Main menu: reads a command line, dispatches it, and repeats until the
// user exits. The loop owns nothing itself; configuration, transport and
// input source are handed in by `main` (or by a test).

use anyhow::Result;
use std::io::Write;
use tracing::debug;

use crate::api::HttpTransport;
use crate::chat::run_chat_session;
use crate::config::Config;
use crate::provider::Provider;
use crate::reader::{run_image_reader, ReaderOptions};
use crate::ui::{Prompter, ReadOutcome, UNREADABLE_INPUT};

pub const MENU_PROMPT: &str =
    "Enter 'commands' to obtain functional commands (or Ctrl+C to stop): ";
pub const INVALID_INPUT: &str = "Invalid input. Please enter 'commands' to see available commands.";
pub const FAREWELL: &str = "Exiting GPR Reader. Goodbye!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuCommand {
    Help,
    Chat(Provider),
    Exit,
    Version,
    ReadGpr,
    AnalyzeData,
    ExportResults,
    Unknown,
}

impl MenuCommand {
    /// Match a raw input line (trimmed, case-insensitive) against the vocabulary.
    pub fn parse(input: &str) -> Self {
        match input.trim().to_lowercase().as_str() {
            "help" | "commands" => MenuCommand::Help,
            "chat groq" => MenuCommand::Chat(Provider::Groq),
            "chat gemini" => MenuCommand::Chat(Provider::Gemini),
            "exit" => MenuCommand::Exit,
            "version" => MenuCommand::Version,
            "read_gpr" => MenuCommand::ReadGpr,
            "analyze_data" => MenuCommand::AnalyzeData,
            "export_results" => MenuCommand::ExportResults,
            _ => MenuCommand::Unknown,
        }
    }
}

/// Whether the menu loop should keep going after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuFlow {
    Continue,
    Quit,
}

pub fn version_line() -> String {
    format!("GPR Reader - Version {}", env!("CARGO_PKG_VERSION"))
}

fn print_commands<W: Write>(out: &mut W) -> std::io::Result<()> {
    writeln!(out)?;
    writeln!(out, "Available Commands:")?;
    writeln!(out, "read_gpr       - Load a GPR image and display it as an intensity profile.")?;
    writeln!(out, "analyze_data   - Analyze the processed data.")?;
    writeln!(out, "export_results - Export the results to a file.")?;
    writeln!(out, "exit           - Exit the GPR Reader.")?;
    writeln!(out, "commands       - Display this message with available commands.")?;
    writeln!(out, "chat groq      - Chat with Groq AI")?;
    writeln!(out, "chat gemini    - Chat with Google Gemini AI")?;
    writeln!(out, "help           - Same as 'commands'.")?;
    writeln!(out, "version        - Show version information.")?;
    writeln!(out, "Enter a command to get started.")
}

/// Everything a dispatched command may need.
pub struct MenuContext<'a, T: ?Sized, P: ?Sized> {
    pub config: &'a mut Config,
    pub transport: &'a T,
    pub prompter: &'a mut P,
    pub reader: ReaderOptions,
}

/// Run one command.
pub fn dispatch<T, P, W>(
    command: MenuCommand,
    ctx: &mut MenuContext<'_, T, P>,
    out: &mut W,
) -> Result<MenuFlow>
where
    T: HttpTransport + ?Sized,
    P: Prompter + ?Sized,
    W: Write,
{
    debug!(?command, "dispatching menu command");
    match command {
        MenuCommand::Help => print_commands(out)?,
        MenuCommand::Chat(provider) => {
            let settings = ctx.config.provider_mut(provider);
            run_chat_session(provider, settings, ctx.transport, &mut *ctx.prompter, out)?;
        }
        MenuCommand::Exit => {
            writeln!(out, "{}", FAREWELL)?;
            return Ok(MenuFlow::Quit);
        }
        MenuCommand::Version => writeln!(out, "{}", version_line())?,
        MenuCommand::ReadGpr => run_image_reader(&mut *ctx.prompter, out, ctx.reader)?,
        MenuCommand::AnalyzeData => writeln!(out, "'analyze_data' is not implemented yet.")?,
        MenuCommand::ExportResults => writeln!(out, "'export_results' is not implemented yet.")?,
        MenuCommand::Unknown => writeln!(out, "{}", INVALID_INPUT)?,
    }
    Ok(MenuFlow::Continue)
}

/// Main interactive menu. Returns once the user types `exit`, presses
/// Ctrl+C at the prompt or closes the input; the process then ends with
/// status 0.
pub fn main_menu<T, P, W>(
    config: &mut Config,
    transport: &T,
    prompter: &mut P,
    out: &mut W,
    reader: ReaderOptions,
) -> Result<()>
where
    T: HttpTransport + ?Sized,
    P: Prompter + ?Sized,
    W: Write,
{
    let mut ctx = MenuContext {
        config,
        transport,
        prompter,
        reader,
    };

    loop {
        let line = match ctx.prompter.read_line(MENU_PROMPT)? {
            ReadOutcome::Line(line) => line,
            ReadOutcome::Unreadable => {
                writeln!(out, "{}", UNREADABLE_INPUT)?;
                continue;
            }
            ReadOutcome::Interrupted | ReadOutcome::Eof => {
                writeln!(out)?;
                writeln!(out, "{}", FAREWELL)?;
                return Ok(());
            }
        };

        if dispatch(MenuCommand::parse(&line), &mut ctx, out)? == MenuFlow::Quit {
            return Ok(());
        }
        writeln!(out)?;
    }
}
