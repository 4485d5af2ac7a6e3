//! Instruction frequency reporting.
//!
//! A run walks a directory tree, asks an [`InstructionSource`] for the
//! mnemonics of every file, and builds a [`Report`]: one row per mnemonic
//! with a (count, fraction) cell per file, plus per-file totals.
//!
//! All run state lives in a [`Scan`] value owned by the caller and handed
//! to [`Report::build`].

use crate::disasm::InstructionSource;
use crate::error::{Result, ResultExt, ToolError};
use crate::formatter::ReportFormatter;
use crate::listing::count_mnemonics;
use crate::types::{
    EmptyFilePolicy, FileEntry, FrequencyTable, MnemonicUniverse, ReporterOptions, RowOrder,
};
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};
use walkdir::WalkDir;

/// Recursively list the regular files under `root`.
///
/// Entries are visited in file-name order so reports are reproducible.
/// An empty directory yields an empty list.
pub fn discover_files(root: &Path) -> Result<Vec<FileEntry>> {
    if !root.is_dir() {
        return Err(ToolError::RootNotFound {
            path: root.to_path_buf(),
        });
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_file() {
            files.push(FileEntry::new(root, entry.path()));
        }
    }
    Ok(files)
}

/// Mutable state accumulated while scanning.
#[derive(Debug, Clone, Default)]
pub struct Scan {
    /// Per-file counts in traversal order.
    pub table: FrequencyTable,
    /// Every mnemonic seen so far.
    pub universe: MnemonicUniverse,
}

impl Scan {
    /// Create an empty scan.
    pub fn new() -> Self {
        Self::default()
    }

    /// Disassemble `file` and record its counts.
    pub fn add_file<S: InstructionSource>(&mut self, source: &S, file: FileEntry) -> Result<()> {
        let mnemonics = source.mnemonics(&file.path)?;
        let counts = count_mnemonics(mnemonics);
        debug!(
            file = %file,
            instructions = counts.total(),
            distinct = counts.len(),
            "scanned file"
        );
        self.universe.extend_from(&counts);
        self.table.insert(file, counts);
        Ok(())
    }

    /// Scan every file in order, stopping at the first failure.
    pub fn run<S: InstructionSource>(source: &S, files: Vec<FileEntry>) -> Result<Self> {
        let mut scan = Self::new();
        for file in files {
            scan.add_file(source, file)?;
        }
        debug!(
            files = scan.table.len(),
            mnemonics = scan.universe.len(),
            "scan complete"
        );
        Ok(scan)
    }
}

/// Count and fraction of one mnemonic in one file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Cell {
    /// Occurrences of the mnemonic.
    pub count: u64,
    /// `count / total` for the file.
    pub fraction: f64,
}

/// One mnemonic across all files.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    /// Row label.
    pub mnemonic: String,
    /// One cell per file, in column order.
    pub cells: Vec<Cell>,
}

impl ReportRow {
    /// Count summed over all files.
    pub fn total(&self) -> u64 {
        self.cells.iter().map(|c| c.count).sum()
    }
}

/// One file column of the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileColumn {
    /// Column label.
    pub name: String,
    /// Total instructions in the file.
    pub total: u64,
}

/// A finished frequency report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    /// File columns in traversal order.
    pub files: Vec<FileColumn>,
    /// Mnemonic rows.
    pub rows: Vec<ReportRow>,
}

impl Report {
    /// Build the report from a completed scan.
    ///
    /// Fails with [`ToolError::NoInstructions`] for a file without
    /// instructions unless the policy is [`EmptyFilePolicy::Zero`].
    pub fn build(scan: Scan, policy: EmptyFilePolicy, order: RowOrder) -> Result<Self> {
        let Scan { table, universe } = scan;

        let files: Vec<FileColumn> = table
            .iter()
            .map(|(file, counts)| FileColumn {
                name: file.name.clone(),
                total: counts.total(),
            })
            .collect();

        if policy == EmptyFilePolicy::Error {
            if let Some(empty) = files.iter().find(|f| f.total == 0) {
                return Err(ToolError::NoInstructions {
                    file: empty.name.clone(),
                });
            }
        }

        let mut rows: Vec<ReportRow> = universe
            .into_sorted()
            .into_iter()
            .map(|mnemonic| {
                let cells = table
                    .iter()
                    .map(|(_, counts)| {
                        let count = counts.get(&mnemonic);
                        let total = counts.total();
                        let fraction = if total == 0 {
                            0.0
                        } else {
                            count as f64 / total as f64
                        };
                        Cell { count, fraction }
                    })
                    .collect();
                ReportRow { mnemonic, cells }
            })
            .collect();

        if order == RowOrder::Frequency {
            // Stable sort keeps name order among equal totals.
            rows.sort_by(|a, b| b.total().cmp(&a.total()));
        }

        Ok(Self { files, rows })
    }

    /// Total instructions per file, in column order.
    pub fn totals(&self) -> Vec<u64> {
        self.files.iter().map(|f| f.total).collect()
    }
}

/// Scan `options.root` with `source` and build the report.
pub fn generate<S: InstructionSource>(source: &S, options: &ReporterOptions) -> Result<Report> {
    let files = discover_files(&options.root)?;
    info!(root = %options.root.display(), files = files.len(), "scanning binaries");

    let scan = Scan::run(source, files)?;
    let report = Report::build(scan, options.empty_file_policy, options.row_order)?;
    info!(
        files = report.files.len(),
        mnemonics = report.rows.len(),
        "built frequency report"
    );
    Ok(report)
}

/// Render `report` and write it to `options.output`, replacing any existing file.
pub fn write_report<F: ReportFormatter + ?Sized>(
    report: &Report,
    formatter: &F,
    options: &ReporterOptions,
) -> Result<()> {
    let rendered = formatter.format_report(report)?;

    if options.writes_to_stdout() {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        handle.write_all(rendered.as_bytes())?;
        handle.flush()?;
    } else {
        std::fs::write(&options.output, rendered)
            .map_err(ToolError::from)
            .context(format!("writing {}", options.output.display()))?;
        info!(output = %options.output.display(), "wrote report");
    }
    Ok(())
}
