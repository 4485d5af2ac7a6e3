//! opcode-tools - Instruction Statistics and Opcode Conversion
//!
//! Developer utilities for AArch64 lifting work:
//!
//! - **Instruction frequency reports**: disassemble every binary under a
//!   directory with objdump and tabulate how often each mnemonic occurs,
//!   per file, as CSV or JSON.
//! - **Opcode conversion**: turn the little-endian byte arrays used in test
//!   fixtures into 32-bit binary (and back) for checking encodings against
//!   the architecture manual.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use opcode_tools::{report, CsvFormatter, ObjdumpSource, ReporterOptions};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let options = ReporterOptions::new().with_root("tests/bin");
//!     let source = ObjdumpSource::default();
//!     let report = report::generate(&source, &options)?;
//!     report::write_report(&report, &CsvFormatter::new(), &options)?;
//!     Ok(())
//! }
//! ```
//!
//! ```rust
//! use opcode_tools::convert::{process_binary, process_hex};
//!
//! let bits = process_hex("0xc0, 0x03, 0x5f, 0xd6").unwrap();
//! assert_eq!(bits, "11010110 01011111 00000011 11000000");
//! assert_eq!(process_binary(&bits).unwrap(), "0xC0, 0x03, 0x5F, 0xD6");
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::new_without_default)]

pub mod convert;
pub mod disasm;
pub mod error;
pub mod formatter;
pub mod listing;
pub mod report;
pub mod types;

pub use disasm::{InstructionSource, ObjdumpConfig, ObjdumpSource};
pub use error::{Result, ToolError};
pub use formatter::{CsvFormatter, JsonFormatter, ReportFormatter};
pub use report::{Report, Scan};
pub use types::{
    ByteOrder, EmptyFilePolicy, FileEntry, FrequencyTable, MnemonicCounts, MnemonicUniverse,
    ReporterOptions, RowOrder,
};

/// Get version information for this library.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        let v = version();
        assert!(!v.is_empty());
    }

    #[test]
    fn test_default_objdump_source() {
        let source = ObjdumpSource::default();
        assert_eq!(source.config(), &ObjdumpConfig::new());
    }
}
