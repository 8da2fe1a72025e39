//! Simple line-based output primitives.

use std::io::{self, Write};

/// Line width for separators.
pub const LINE_WIDTH: usize = 60;

/// Write the main header.
///
/// ```text
/// AGENTVIEW · epoch 3
/// ════════════════════════════════════════════════════════════
/// ```
pub fn write_header<W: Write>(out: &mut W, title: &str) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", title)?;
    writeln!(out, "{}", "═".repeat(LINE_WIDTH))?;
    writeln!(out)
}

/// Write a section heading.
///
/// ```text
/// FINAL CODE
/// ────────────────────────────────────────────────────────────
/// ```
pub fn write_section<W: Write>(out: &mut W, title: &str) -> io::Result<()> {
    writeln!(out, "{}", title)?;
    writeln!(out, "{}", "─".repeat(LINE_WIDTH))
}

/// Write a line within a section.
///
/// ```text
///   ✓ Round 2 · score 90
/// ```
pub fn write_line<W: Write>(out: &mut W, icon: &str, message: &str) -> io::Result<()> {
    writeln!(out, "  {} {}", icon, message)
}

/// Write a multi-line block indented under a section.
pub fn write_block<W: Write>(out: &mut W, text: &str) -> io::Result<()> {
    for line in text.lines() {
        writeln!(out, "    {}", line)?;
    }
    writeln!(out)
}

/// Write the closing rule with a status line.
pub fn write_footer<W: Write>(out: &mut W, icon: &str, message: &str) -> io::Result<()> {
    writeln!(out, "{}", "═".repeat(LINE_WIDTH))?;
    writeln!(out, "{} {}", icon, message)?;
    writeln!(out, "{}", "═".repeat(LINE_WIDTH))
}

/// Status icons
pub mod icons {
    pub const SUCCESS: &str = "✓";
    pub const FAILURE: &str = "✗";
    pub const WARNING: &str = "⚠";
    pub const LOG: &str = "›";
}
