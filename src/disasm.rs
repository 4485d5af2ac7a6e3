//! Instruction sources.
//!
//! The reporter only needs "the mnemonics of one file". [`InstructionSource`]
//! is that seam: [`ObjdumpSource`] shells out to a GNU objdump build, tests
//! plug in canned listings.

use crate::error::{Result, ToolError};
use crate::listing;
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::Path;
use std::process::Command;
use tracing::{debug, warn};

/// Produces the instruction mnemonics found in a binary.
pub trait InstructionSource {
    /// Return one mnemonic per disassembled instruction, in listing order.
    ///
    /// An empty vector means no instructions were found.
    fn mnemonics(&self, path: &Path) -> Result<Vec<String>>;
}

impl<S: InstructionSource + ?Sized> InstructionSource for &S {
    fn mnemonics(&self, path: &Path) -> Result<Vec<String>> {
        (**self).mnemonics(path)
    }
}

/// How objdump is invoked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjdumpConfig {
    /// Executable name or path.
    pub tool: String,
    /// Section passed to `-j`.
    pub section: String,
    /// Decode instructions as big-endian (`-EB`).
    pub big_endian: bool,
    /// Print canonical mnemonics instead of aliases (`-M no-aliases`).
    pub no_aliases: bool,
    /// Interleave source lines (`-S`).
    pub interleave_source: bool,
}

impl ObjdumpConfig {
    /// Default cross objdump for AArch64 targets.
    pub const DEFAULT_TOOL: &'static str = "aarch64-linux-gnu-objdump";

    /// Create a config with the default invocation.
    pub fn new() -> Self {
        Self {
            tool: Self::DEFAULT_TOOL.to_string(),
            section: ".text".to_string(),
            big_endian: true,
            no_aliases: true,
            interleave_source: true,
        }
    }

    /// Reject invocations that cannot produce a listing.
    pub fn validate(&self) -> Result<()> {
        if self.tool.trim().is_empty() {
            return Err(ToolError::ConfigError {
                message: "objdump tool name is empty".to_string(),
            });
        }
        if self.section.trim().is_empty() {
            return Err(ToolError::ConfigError {
                message: "section name is empty".to_string(),
            });
        }
        Ok(())
    }

    /// Arguments passed to the tool for `path`.
    pub fn args(&self, path: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["-d".into()];
        if self.interleave_source {
            args.push("-S".into());
        }
        if self.big_endian {
            args.push("-EB".into());
        }
        if self.no_aliases {
            args.push("-M".into());
            args.push("no-aliases".into());
        }
        args.push("-j".into());
        args.push(self.section.clone().into());
        args.push(path.as_os_str().to_os_string());
        args
    }
}

impl Default for ObjdumpConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Disassembles files by running objdump and parsing its listing.
#[derive(Debug, Clone, Default)]
pub struct ObjdumpSource {
    config: ObjdumpConfig,
}

impl ObjdumpSource {
    /// Create a source with the given invocation.
    pub fn new(config: ObjdumpConfig) -> Self {
        Self { config }
    }

    /// The invocation used by this source.
    pub fn config(&self) -> &ObjdumpConfig {
        &self.config
    }

    /// Run the tool and return its standard output.
    ///
    /// A non-zero exit status is logged, not returned: objdump still prints
    /// whatever it managed to decode.
    pub fn listing(&self, path: &Path) -> Result<String> {
        self.config.validate()?;
        let args = self.config.args(path);
        debug!(tool = %self.config.tool, file = %path.display(), "running disassembler");

        let output = Command::new(&self.config.tool)
            .args(&args)
            .output()
            .map_err(|e| ToolError::Disassembler {
                tool: self.config.tool.clone(),
                message: e.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!(
                tool = %self.config.tool,
                file = %path.display(),
                status = %output.status,
                stderr = %stderr.trim(),
                "disassembler exited with failure"
            );
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl InstructionSource for ObjdumpSource {
    fn mnemonics(&self, path: &Path) -> Result<Vec<String>> {
        let listing = self.listing(path)?;
        Ok(listing::mnemonics(&listing))
    }
}
