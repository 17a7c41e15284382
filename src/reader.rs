// GPR image reader: a small sub-loop reached from the main menu's
// `read_gpr`. It accepts `upload <path>`, turns the file into an intensity
// grid and draws it in the terminal.

use anyhow::Result;
use std::io::Write;
use std::path::Path;

use crate::intensity::load_intensity_grid;
use crate::render::{render_grid, RenderStyle, Viewport};
use crate::ui::{Prompter, ReadOutcome, UNREADABLE_INPUT};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReaderCommand {
    Exit,
    Upload(String),
    /// `upload` with nothing after it.
    MissingPath,
    Blank,
    Unknown,
}

impl ReaderCommand {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return ReaderCommand::Blank;
        }
        if line.eq_ignore_ascii_case("exit") {
            return ReaderCommand::Exit;
        }

        let mut parts = line.splitn(2, char::is_whitespace);
        let verb = parts.next().unwrap_or_default();
        if !verb.eq_ignore_ascii_case("upload") {
            return ReaderCommand::Unknown;
        }
        let path = clean_path(parts.next().unwrap_or_default());
        if path.is_empty() {
            ReaderCommand::MissingPath
        } else {
            ReaderCommand::Upload(path)
        }
    }
}

/// Strip every quote character from a typed path.
pub fn clean_path(raw: &str) -> String {
    raw.trim().replace(['"', '\''], "")
}

/// Options for the reader loop.
#[derive(Debug, Clone, Copy)]
pub struct ReaderOptions {
    /// Draw each loaded grid. When off, only the load report is printed.
    pub display: bool,
    pub viewport: Option<Viewport>,
    pub style: RenderStyle,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        ReaderOptions {
            display: true,
            viewport: None,
            style: RenderStyle::detect(),
        }
    }
}

fn print_intro<W: Write>(out: &mut W) -> std::io::Result<()> {
    writeln!(out, "Welcome to the GPR Image Reader.")?;
    writeln!(out, "Type 'upload <file_path>' to load an image, or 'exit' to return to the menu.")?;
    writeln!(out)?;
    writeln!(out, "Examples:")?;
    writeln!(out, "   Windows: upload C:\\Data\\profile.png")?;
    writeln!(out, "   Linux/macOS: upload /home/user/data/profile.png")
}

/// Run the reader loop until `exit`, Ctrl+C or end of input.
pub fn run_image_reader<P, W>(prompter: &mut P, out: &mut W, options: ReaderOptions) -> Result<()>
where
    P: Prompter + ?Sized,
    W: Write,
{
    print_intro(out)?;

    loop {
        writeln!(out)?;
        let line = match prompter.read_line("> ")? {
            ReadOutcome::Line(line) => line,
            ReadOutcome::Unreadable => {
                writeln!(out, "{}", UNREADABLE_INPUT)?;
                continue;
            }
            ReadOutcome::Interrupted | ReadOutcome::Eof => break,
        };

        match ReaderCommand::parse(&line) {
            ReaderCommand::Exit => break,
            ReaderCommand::Blank => continue,
            ReaderCommand::MissingPath => {
                writeln!(out, "Please provide the full path after 'upload'.")?;
            }
            ReaderCommand::Unknown => {
                writeln!(out, "Unknown input. Use 'upload <file_path>' or 'exit'.")?;
            }
            ReaderCommand::Upload(path) => {
                if let Some(grid) = load_intensity_grid(Path::new(&path), out)? {
                    writeln!(out)?;
                    writeln!(out, "Image successfully loaded and processed.")?;
                    if options.display {
                        let viewport = options.viewport.unwrap_or_else(Viewport::for_terminal);
                        render_grid(&grid, viewport, options.style, out)?;
                    }
                }
            }
        }
    }

    writeln!(out, "Leaving GPR Image Reader.")?;
    Ok(())
}
