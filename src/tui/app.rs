//! Dashboard view state.

use crate::report::UsageReport;

/// State for the report dashboard: the report and the highlighted row.
pub struct App {
    pub report: UsageReport,
    /// Index of the highlighted table row.
    pub selected: usize,
    pub quit: bool,
}

impl App {
    pub fn new(report: UsageReport) -> Self {
        Self {
            report,
            selected: 0,
            quit: false,
        }
    }

    /// Moves the highlight down, wrapping to the first row.
    pub fn select_next(&mut self) {
        let n = self.report.lines.len();
        if n > 0 {
            self.selected = (self.selected + 1) % n;
        }
    }

    /// Moves the highlight up, wrapping to the last row.
    pub fn select_previous(&mut self) {
        let n = self.report.lines.len();
        if n > 0 {
            self.selected = (self.selected + n - 1) % n;
        }
    }

    pub fn select_first(&mut self) {
        self.selected = 0;
    }

    pub fn select_last(&mut self) {
        self.selected = self.report.lines.len().saturating_sub(1);
    }
}
