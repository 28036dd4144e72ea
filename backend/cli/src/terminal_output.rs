//! Terminal output for replayed runs: one-line notes and the state table.

use once_cell::sync::Lazy;
use regex::Regex;

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

static ANSI_ESCAPE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\x1b\[[0-9;]*m").unwrap());

/// Kind of note, which picks its marker and colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    /// Script step with its 1-based position
    Step(usize),
    /// Call received by the phone peer
    Peer,
    Warn,
    Error,
    Success,
}

impl Tone {
    fn color(self) -> &'static str {
        match self {
            Tone::Step(_) => "\x1b[36m",
            Tone::Peer => "\x1b[35m",
            Tone::Warn => "\x1b[33m",
            Tone::Error => "\x1b[31m",
            Tone::Success => "\x1b[32m",
        }
    }

    fn plain_marker(self) -> String {
        match self {
            Tone::Step(index) => format!("[{index}] >"),
            Tone::Peer => "    -> peer".into(),
            Tone::Warn => "WARN:".into(),
            Tone::Error => "ERROR:".into(),
            Tone::Success => "OK:".into(),
        }
    }

    fn color_marker(self) -> String {
        let color = self.color();
        match self {
            Tone::Step(index) => format!("{DIM}[{index}]{RESET} {color}{BOLD}▶{RESET}"),
            Tone::Peer => format!("    {color}→ peer{RESET}"),
            Tone::Warn => format!("{color}{BOLD}⚠{RESET}"),
            Tone::Error => format!("{color}{BOLD}✗{RESET}"),
            Tone::Success => format!("{color}{BOLD}✓{RESET}"),
        }
    }
}

/// Colour is on unless `NO_COLOR` is set or the terminal is dumb/unknown.
pub fn supports_color() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    std::env::var_os("COLORTERM").is_some()
        || std::env::var("TERM").is_ok_and(|term| term != "dumb")
}

pub fn format_note(tone: Tone, msg: &str, color: bool) -> String {
    let marker = if color {
        tone.color_marker()
    } else {
        tone.plain_marker()
    };
    format!("{marker} {msg}")
}

/// Print a note; errors go to stderr.
pub fn note(tone: Tone, msg: &str) {
    let line = format_note(tone, msg, supports_color());
    match tone {
        Tone::Error => eprintln!("{line}"),
        _ => println!("{line}"),
    }
}

/// Visible width of a cell, ignoring colour escapes.
fn visible_width(s: &str) -> usize {
    ANSI_ESCAPE.replace_all(s, "").chars().count()
}

/// A table column: header text and whether values hug the right edge.
pub struct Column {
    pub header: String,
    pub right_aligned: bool,
}

impl Column {
    pub fn left(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            right_aligned: false,
        }
    }

    pub fn right(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            right_aligned: true,
        }
    }
}

/// Render rows under a header and a dashed rule, two spaces between columns.
pub fn render_table(columns: &[Column], rows: &[Vec<String>]) -> String {
    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, column)| {
            rows.iter()
                .filter_map(|row| row.get(i))
                .map(|cell| visible_width(cell))
                .fold(visible_width(&column.header), usize::max)
        })
        .collect();

    let line = |cells: Vec<String>| format!("  {}  \n", cells.join("  "));
    let fit = |i: usize, text: &str| {
        let pad = " ".repeat(widths[i].saturating_sub(visible_width(text)));
        if columns[i].right_aligned {
            format!("{pad}{text}")
        } else {
            format!("{text}{pad}")
        }
    };

    let mut out = line(
        columns
            .iter()
            .enumerate()
            .map(|(i, column)| fit(i, &column.header))
            .collect(),
    );
    out.push_str(&line(widths.iter().map(|w| "-".repeat(*w)).collect()));
    for row in rows {
        out.push_str(&line(
            (0..columns.len())
                .map(|i| fit(i, row.get(i).map(String::as_str).unwrap_or("")))
                .collect(),
        ));
    }
    out
}
