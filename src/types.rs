//! Core types for opcode-tools.
//!
//! This module defines the run-scoped state of the frequency reporter
//! (file entries, per-file mnemonic counts, the frequency table and the
//! mnemonic universe) together with the options that configure a run.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};

// =============================================================================
// Scan State
// =============================================================================

/// One binary discovered during directory traversal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileEntry {
    /// Path used to invoke the disassembler.
    pub path: PathBuf,
    /// Column label in the report: path relative to the scanned root.
    pub name: String,
}

impl FileEntry {
    /// Create an entry whose label is `path` relative to `root`.
    ///
    /// Components are joined with `/` so labels are identical across
    /// platforms. Falls back to the file name when `path` is not under `root`.
    pub fn new(root: &Path, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = match path.strip_prefix(root) {
            Ok(rel) if !rel.as_os_str().is_empty() => rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/"),
            _ => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
        };
        Self { path, name }
    }
}

impl fmt::Display for FileEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Occurrence count per mnemonic for a single file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MnemonicCounts {
    counts: BTreeMap<String, u64>,
}

impl MnemonicCounts {
    /// Create an empty count set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `count` occurrences of `mnemonic`.
    pub fn add(&mut self, mnemonic: impl Into<String>, count: u64) {
        *self.counts.entry(mnemonic.into()).or_insert(0) += count;
    }

    /// Occurrences of `mnemonic`; zero when it never appeared.
    pub fn get(&self, mnemonic: &str) -> u64 {
        self.counts.get(mnemonic).copied().unwrap_or(0)
    }

    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Number of distinct mnemonics.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// True if no mnemonic was recorded.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Iterate over `(mnemonic, count)` in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter().map(|(m, c)| (m.as_str(), *c))
    }
}

impl FromIterator<(String, u64)> for MnemonicCounts {
    fn from_iter<I: IntoIterator<Item = (String, u64)>>(iter: I) -> Self {
        let mut counts = Self::new();
        for (mnemonic, count) in iter {
            counts.add(mnemonic, count);
        }
        counts
    }
}

/// Per-file mnemonic counts in traversal order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FrequencyTable {
    files: Vec<(FileEntry, MnemonicCounts)>,
}

impl FrequencyTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the counts for one file.
    pub fn insert(&mut self, file: FileEntry, counts: MnemonicCounts) {
        self.files.push((file, counts));
    }

    /// Number of files in the table.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// True if no file was scanned.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Iterate over files and their counts in traversal order.
    pub fn iter(&self) -> impl Iterator<Item = (&FileEntry, &MnemonicCounts)> {
        self.files.iter().map(|(f, c)| (f, c))
    }
}

/// Every distinct mnemonic seen during a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MnemonicUniverse {
    mnemonics: BTreeSet<String>,
}

impl MnemonicUniverse {
    /// Create an empty universe.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add every mnemonic of `counts`.
    pub fn extend_from(&mut self, counts: &MnemonicCounts) {
        for (mnemonic, _) in counts.iter() {
            self.mnemonics.insert(mnemonic.to_string());
        }
    }

    /// Number of distinct mnemonics.
    pub fn len(&self) -> usize {
        self.mnemonics.len()
    }

    /// True if nothing has been seen.
    pub fn is_empty(&self) -> bool {
        self.mnemonics.is_empty()
    }

    /// Freeze the universe into a lexicographically sorted list.
    pub fn into_sorted(self) -> Vec<String> {
        self.mnemonics.into_iter().collect()
    }
}

// =============================================================================
// Options
// =============================================================================

/// What to do with a file that disassembles to zero instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EmptyFilePolicy {
    /// Abort the run with [`crate::ToolError::NoInstructions`].
    #[default]
    Error,
    /// Report the file with a zero total and 0 fractions.
    Zero,
}

/// Ordering of the mnemonic rows in a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RowOrder {
    /// Lexicographic by mnemonic.
    #[default]
    Name,
    /// Descending by count summed over all files, ties by name.
    Frequency,
}

impl fmt::Display for RowOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowOrder::Name => write!(f, "name"),
            RowOrder::Frequency => write!(f, "frequency"),
        }
    }
}

/// Byte order used when splitting a 32-bit opcode into bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ByteOrder {
    /// Least-significant byte first, as in an in-memory byte array.
    #[default]
    Little,
    /// Most-significant byte first.
    Big,
}

impl fmt::Display for ByteOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ByteOrder::Little => write!(f, "little"),
            ByteOrder::Big => write!(f, "big"),
        }
    }
}

/// Options for a frequency report run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReporterOptions {
    /// Directory scanned recursively for binaries.
    pub root: PathBuf,
    /// Report destination; `-` means standard output.
    pub output: PathBuf,
    /// Handling of files without instructions.
    pub empty_file_policy: EmptyFilePolicy,
    /// Row ordering.
    pub row_order: RowOrder,
}

impl ReporterOptions {
    /// Default directory scanned when none is given.
    pub const DEFAULT_ROOT: &'static str = "tests/bin";
    /// Default report path, relative to the working directory.
    pub const DEFAULT_OUTPUT: &'static str = "frequency.csv";

    /// Create options with default settings.
    pub fn new() -> Self {
        Self {
            root: PathBuf::from(Self::DEFAULT_ROOT),
            output: PathBuf::from(Self::DEFAULT_OUTPUT),
            empty_file_policy: EmptyFilePolicy::Error,
            row_order: RowOrder::Name,
        }
    }

    /// Set the scanned directory.
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    /// Set the report destination.
    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = output.into();
        self
    }

    /// Set the zero-instruction policy.
    pub fn with_empty_file_policy(mut self, policy: EmptyFilePolicy) -> Self {
        self.empty_file_policy = policy;
        self
    }

    /// Set the row ordering.
    pub fn with_row_order(mut self, order: RowOrder) -> Self {
        self.row_order = order;
        self
    }

    /// True if the report goes to standard output.
    pub fn writes_to_stdout(&self) -> bool {
        self.output.as_os_str() == "-"
    }
}

impl Default for ReporterOptions {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_entry_relative_name() {
        let root = Path::new("/bench/bin");
        let entry = FileEntry::new(root, "/bench/bin/sub/fib.elf");
        assert_eq!(entry.name, "sub/fib.elf");
        assert_eq!(entry.to_string(), "sub/fib.elf");
    }

    #[test]
    fn test_file_entry_outside_root() {
        let entry = FileEntry::new(Path::new("/a"), "/b/c.elf");
        assert_eq!(entry.name, "c.elf");
    }

    #[test]
    fn test_counts_missing_is_zero() {
        let mut counts = MnemonicCounts::new();
        counts.add("add", 3);
        counts.add("add", 2);
        counts.add("ret", 1);
        assert_eq!(counts.get("add"), 5);
        assert_eq!(counts.get("mov"), 0);
        assert_eq!(counts.total(), 6);
        assert_eq!(counts.len(), 2);
    }

    #[test]
    fn test_universe_is_a_set() {
        let a: MnemonicCounts = vec![("ret".to_string(), 1), ("add".to_string(), 2)]
            .into_iter()
            .collect();
        let b: MnemonicCounts = vec![("add".to_string(), 7), ("b".to_string(), 1)]
            .into_iter()
            .collect();
        let mut universe = MnemonicUniverse::new();
        universe.extend_from(&a);
        universe.extend_from(&b);
        assert_eq!(universe.len(), 3);
        assert_eq!(universe.into_sorted(), vec!["add", "b", "ret"]);
    }

    #[test]
    fn test_options() {
        let opts = ReporterOptions::new();
        assert_eq!(opts.root, PathBuf::from("tests/bin"));
        assert_eq!(opts.output, PathBuf::from("frequency.csv"));
        assert_eq!(opts.empty_file_policy, EmptyFilePolicy::Error);
        assert!(!opts.writes_to_stdout());
        assert!(opts.with_output("-").writes_to_stdout());
    }

    #[test]
    fn test_options_serde() {
        let opts = ReporterOptions::new().with_row_order(RowOrder::Frequency);
        let json = serde_json::to_string(&opts).unwrap();
        assert!(json.contains("\"row_order\":\"frequency\""));
        let back: ReporterOptions = serde_json::from_str(&json).unwrap();
        assert_eq!(back, opts);
    }
}
