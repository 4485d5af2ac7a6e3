//! Output formatters for frequency reports.
//!
//! This module provides trait-based formatters for rendering a [`Report`]
//! as CSV (the default report file) or JSON.

use crate::error::Result;
use crate::report::{FileColumn, Report, ReportRow};

/// Label of the first header column.
pub const MNEMONIC_COLUMN: &str = "instruction_name";
/// Label of the trailing totals row.
pub const TOTAL_ROW: &str = "total";
/// Suffix appended to a file name for its fraction column.
pub const FRACTION_SUFFIX: &str = " instruction frequency in %";

/// Trait for formatting frequency reports.
///
/// Implementors provide methods for rendering each component of a report,
/// plus a method to render the complete report.
pub trait ReportFormatter {
    /// Format the header line.
    fn format_header(&self, files: &[FileColumn]) -> Option<String>;

    /// Format one mnemonic row.
    fn format_row(&self, row: &ReportRow) -> Option<String>;

    /// Format the per-file totals.
    fn format_totals(&self, files: &[FileColumn]) -> Option<String>;

    /// Format the complete report.
    ///
    /// Default implementation concatenates all component outputs.
    fn format_report(&self, report: &Report) -> Result<String> {
        let mut parts = Vec::new();

        if let Some(s) = self.format_header(&report.files) {
            parts.push(s);
        }
        for row in &report.rows {
            if let Some(s) = self.format_row(row) {
                parts.push(s);
            }
        }
        if let Some(s) = self.format_totals(&report.files) {
            parts.push(s);
        }

        Ok(parts.join(""))
    }
}

/// CSV output formatter.
///
/// Each file contributes a count column and a fraction column. The
/// fraction is `count / total`, not scaled to 100.
#[derive(Debug, Clone, Default)]
pub struct CsvFormatter;

impl CsvFormatter {
    /// Create a new CSV formatter.
    pub fn new() -> Self {
        Self
    }
}

impl ReportFormatter for CsvFormatter {
    fn format_header(&self, files: &[FileColumn]) -> Option<String> {
        let mut fields = vec![MNEMONIC_COLUMN.to_string()];
        for file in files {
            fields.push(csv_field(&file.name));
            fields.push(csv_field(&format!("{}{}", file.name, FRACTION_SUFFIX)));
        }
        Some(format!("{}\n", fields.join(",")))
    }

    fn format_row(&self, row: &ReportRow) -> Option<String> {
        let mut s = csv_field(&row.mnemonic);
        for cell in &row.cells {
            s.push_str(&format!(",{},{}", cell.count, cell.fraction));
        }
        s.push('\n');
        Some(s)
    }

    fn format_totals(&self, files: &[FileColumn]) -> Option<String> {
        let mut s = String::from(TOTAL_ROW);
        for file in files {
            s.push_str(&format!(",{}", file.total));
        }
        s.push('\n');
        Some(s)
    }
}

/// Quote a field if it contains a separator, quote or line break.
fn csv_field(value: &str) -> String {
    if value.contains(|c: char| matches!(c, ',' | '"' | '\n' | '\r')) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// JSON output formatter.
#[derive(Debug, Clone)]
pub struct JsonFormatter {
    /// Pretty-print JSON
    pub pretty: bool,
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self { pretty: true }
    }
}

impl JsonFormatter {
    /// Create a new JSON formatter with pretty printing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a compact JSON formatter.
    pub fn compact() -> Self {
        Self { pretty: false }
    }
}

impl ReportFormatter for JsonFormatter {
    fn format_header(&self, _files: &[FileColumn]) -> Option<String> {
        None // Handled in format_report
    }

    fn format_row(&self, _row: &ReportRow) -> Option<String> {
        None // Handled in format_report
    }

    fn format_totals(&self, _files: &[FileColumn]) -> Option<String> {
        None // Handled in format_report
    }

    fn format_report(&self, report: &Report) -> Result<String> {
        let mut json = if self.pretty {
            serde_json::to_string_pretty(report)?
        } else {
            serde_json::to_string(report)?
        };
        json.push('\n');
        Ok(json)
    }
}
