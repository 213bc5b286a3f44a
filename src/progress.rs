//! Progress tracking module for the deskew pipeline.
//!
//! Stage names for log output, verbosity handling, and two
//! [`SearchProgress`] reporters for the angle sweep: a per-angle table on
//! stdout and an `indicatif` progress bar.

use indicatif::{ProgressBar, ProgressStyle};
use std::cell::RefCell;
use std::fmt;
use std::io::{self, Write};

use crate::search::{AngleResult, SearchProgress};

/// Processing stages for one input file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProcessingStage {
    /// Decoding the input
    #[default]
    Loading,
    /// Sweeping rotation angles
    Searching,
    /// Applying the winning rotation
    Rotating,
    /// Cutting away the border
    Cropping,
    /// Encoding the output
    Saving,
    /// Completed
    Completed,
}

impl ProcessingStage {
    /// Get the name of the stage
    pub fn name(&self) -> &'static str {
        match self {
            ProcessingStage::Loading => "Loading",
            ProcessingStage::Searching => "Searching",
            ProcessingStage::Rotating => "Rotating",
            ProcessingStage::Cropping => "Cropping",
            ProcessingStage::Saving => "Saving",
            ProcessingStage::Completed => "Completed",
        }
    }
}

impl fmt::Display for ProcessingStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Output verbosity mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// No output
    Quiet,
    /// Diagnostic table and summary
    #[default]
    Normal,
    /// Also stage messages
    Verbose,
}

impl OutputMode {
    /// Create OutputMode from the quiet flag and verbosity level
    pub fn from_verbosity(quiet: bool, level: u8) -> Self {
        match (quiet, level) {
            (true, _) => OutputMode::Quiet,
            (false, 0) => OutputMode::Normal,
            (false, _) => OutputMode::Verbose,
        }
    }

    /// Check if output should be shown at this mode
    pub fn should_show(&self, required: OutputMode) -> bool {
        use OutputMode::*;
        match (self, required) {
            (Quiet, _) => false,
            (Normal, Quiet | Normal) => true,
            (Verbose, _) => true,
            _ => false,
        }
    }
}

// ============ Table Reporter ============

/// Column header of the diagnostic table
pub const TABLE_HEADER: &str = "   Angle |    Total |      Top |    Right |   Bottom |    Left ";

/// Width of the rule under the header
const TABLE_RULE_WIDTH: usize = 63;

/// Format one table row
pub fn format_row(result: &AngleResult) -> String {
    format!(
        "{:>8} | {:>8} | {:>8} | {:>8} | {:>8} | {:>8}",
        result.angle, result.total, result.top, result.right, result.bottom, result.left
    )
}

/// Writes one row per evaluated angle
pub struct TableReporter<W: Write = io::Stdout> {
    out: RefCell<W>,
}

impl TableReporter<io::Stdout> {
    pub fn new() -> Self {
        Self::with_writer(io::stdout())
    }
}

impl Default for TableReporter<io::Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> TableReporter<W> {
    pub fn with_writer(out: W) -> Self {
        Self {
            out: RefCell::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }

    // Diagnostics only; a closed pipe must not abort the run
    fn write_line(&self, line: &str) {
        let mut out = self.out.borrow_mut();
        let _ = writeln!(out, "{}", line);
    }
}

impl<W: Write> SearchProgress for TableReporter<W> {
    fn on_sweep_start(&self, _angle_count: usize) {
        self.write_line(TABLE_HEADER);
        self.write_line(&"-".repeat(TABLE_RULE_WIDTH));
    }

    fn on_angle(&self, result: &AngleResult) {
        self.write_line(&format_row(result));
    }

    fn on_sweep_complete(&self, _best: &AngleResult) {
        let _ = self.out.borrow_mut().flush();
    }
}

// ============ Bar Reporter ============

const BAR_TEMPLATE: &str = "{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} {msg}";

/// Progress bar over the angle sweep
pub struct BarReporter {
    bar: ProgressBar,
}

impl BarReporter {
    pub fn new() -> Self {
        Self::with_bar(ProgressBar::new(0))
    }

    /// Report into an existing bar (e.g. a hidden one)
    pub fn with_bar(bar: ProgressBar) -> Self {
        let style = ProgressStyle::with_template(BAR_TEMPLATE)
            .map(|style| style.progress_chars("=>-"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(style);
        Self { bar }
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    pub fn length(&self) -> Option<u64> {
        self.bar.length()
    }
}

impl Default for BarReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchProgress for BarReporter {
    fn on_sweep_start(&self, angle_count: usize) {
        self.bar.set_length(angle_count as u64);
        self.bar.set_position(0);
    }

    fn on_angle(&self, result: &AngleResult) {
        self.bar.set_message(format!("{} (total {})", result.angle, result.total));
        self.bar.inc(1);
    }

    fn on_sweep_complete(&self, best: &AngleResult) {
        self.bar
            .finish_with_message(format!("best {} (total {})", best.angle, best.total));
    }
}
