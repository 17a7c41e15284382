// Terminal display for intensity grids. Each character cell shows two grid
// rows with an upper half block: foreground is the top row, background the
// bottom one. Values are scaled linearly from the grid's min to its max.
// When the output is not a terminal the same layout is drawn with an ASCII
// shade ramp and no escape sequences.

use crossterm::queue;
use crossterm::style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor};
use std::io::{self, IsTerminal, Write};

use crate::intensity::IntensityGrid;
use crate::ui;

pub const TITLE: &str = "Loaded GPR Profile (Intensity)";
pub const X_LABEL: &str = "Distance Axis (Pixels)";
pub const Y_LABEL: &str = "Depth/Time Axis (Pixels)";
pub const SCALE_LABEL: &str = "Amplitude/Intensity";

const SCALE_CELLS: usize = 24;

/// Shades for plain output, darkest first.
const SHADES: &[u8] = b" .:-=+*#%@";

/// How cells are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStyle {
    /// 24-bit colour half blocks.
    TrueColor,
    /// ASCII shades, no escape sequences.
    Plain,
}

impl RenderStyle {
    /// `TrueColor` when stdout is a terminal, `Plain` otherwise.
    pub fn detect() -> Self {
        if io::stdout().is_terminal() {
            RenderStyle::TrueColor
        } else {
            RenderStyle::Plain
        }
    }
}

/// Drawing area for the plot itself, in terminal cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub cols: usize,
    pub rows: usize,
}

impl Viewport {
    /// Fit the plot into the current terminal, leaving room for the tick
    /// labels, axis lines, title and colour scale.
    pub fn for_terminal() -> Self {
        let (cols, rows) = ui::terminal_size().unwrap_or((ui::FALLBACK_COLUMNS, 24));
        Viewport {
            cols: cols.saturating_sub(10).max(10),
            rows: rows.saturating_sub(8).max(4),
        }
    }
}

// Position of `value` in `lo..=hi`, mapped to 0..=1. A flat range maps to 0.
fn level(value: f64, lo: f64, hi: f64) -> f64 {
    if hi > lo {
        ((value - lo) / (hi - lo)).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

fn gray(value: f64, lo: f64, hi: f64) -> Color {
    let level = (level(value, lo, hi) * 255.0).round() as u8;
    Color::Rgb {
        r: level,
        g: level,
        b: level,
    }
}

// Nearest-neighbour lookup from plot coordinates back into the grid.
fn sample(grid: &IntensityGrid, row: usize, rows: usize, col: usize, cols: usize) -> f64 {
    let r = row * grid.rows() / rows;
    let c = col * grid.cols() / cols;
    grid.get(r, c).unwrap_or(0.0)
}

fn shade(value: f64, lo: f64, hi: f64) -> char {
    let last = SHADES.len() - 1;
    let idx = (level(value, lo, hi) * last as f64).round() as usize;
    char::from(SHADES[idx.min(last)])
}

/// Plot width in cells and height in grid rows (two per cell row).
fn plot_size(grid: &IntensityGrid, viewport: Viewport) -> (usize, usize) {
    let cols = grid.cols().min(viewport.cols.max(1));
    let pixel_rows = grid.rows().min(viewport.rows.max(1) * 2);
    (cols, pixel_rows)
}

/// Draw `grid` into `out`, resampled to fit `viewport`.
pub fn render_grid<W: Write>(
    grid: &IntensityGrid,
    viewport: Viewport,
    style: RenderStyle,
    out: &mut W,
) -> io::Result<()> {
    let (lo, hi) = match grid.range() {
        Some(range) if grid.rows() > 0 && grid.cols() > 0 => range,
        _ => {
            writeln!(out, "Image is empty; nothing to display.")?;
            return Ok(());
        }
    };

    let (plot_cols, pixel_rows) = plot_size(grid, viewport);
    let cell_rows = (pixel_rows + 1) / 2;
    let last_row = grid.rows() - 1;
    let last_col = grid.cols() - 1;
    let tick_width = last_row.to_string().len();
    let margin = " ".repeat(tick_width + 1);

    writeln!(out, "{}", TITLE)?;
    writeln!(out, "{}", Y_LABEL)?;

    for cell_row in 0..cell_rows {
        if cell_row == 0 {
            write!(out, "{:>w$} |", 0, w = tick_width)?;
        } else if cell_row + 1 == cell_rows {
            write!(out, "{:>w$} |", last_row, w = tick_width)?;
        } else {
            write!(out, "{}|", margin)?;
        }

        let top = cell_row * 2;
        for col in 0..plot_cols {
            let upper = sample(grid, top, pixel_rows, col, plot_cols);
            let lower = if top + 1 < pixel_rows {
                Some(sample(grid, top + 1, pixel_rows, col, plot_cols))
            } else {
                None
            };
            match (style, lower) {
                (RenderStyle::TrueColor, Some(lower)) => queue!(
                    out,
                    SetForegroundColor(gray(upper, lo, hi)),
                    SetBackgroundColor(gray(lower, lo, hi)),
                    Print('▀')
                )?,
                (RenderStyle::TrueColor, None) => {
                    queue!(out, SetForegroundColor(gray(upper, lo, hi)), Print('▀'))?
                }
                (RenderStyle::Plain, lower) => {
                    let value = lower.map_or(upper, |lower| (upper + lower) / 2.0);
                    write!(out, "{}", shade(value, lo, hi))?;
                }
            }
        }
        if style == RenderStyle::TrueColor {
            queue!(out, ResetColor)?;
        }
        writeln!(out)?;
    }

    writeln!(out, "{}+{}", margin, "-".repeat(plot_cols))?;
    if last_col == 0 {
        writeln!(out, "{} 0", margin)?;
    } else {
        let right = last_col.to_string();
        let gap = plot_cols.saturating_sub(1 + right.len());
        writeln!(out, "{} 0{}{}", margin, " ".repeat(gap), right)?;
    }
    writeln!(out, "{} {}", margin, X_LABEL)?;

    write!(out, "{}: {:.3} ", SCALE_LABEL, lo)?;
    for i in 0..SCALE_CELLS {
        let v = lo + (hi - lo) * i as f64 / (SCALE_CELLS - 1) as f64;
        match style {
            RenderStyle::TrueColor => {
                queue!(out, SetBackgroundColor(gray(v, lo, hi)), Print(' '))?
            }
            RenderStyle::Plain => write!(out, "{}", shade(v, lo, hi))?,
        }
    }
    if style == RenderStyle::TrueColor {
        queue!(out, ResetColor)?;
    }
    writeln!(out, " {:.3}", hi)?;
    out.flush()
}
