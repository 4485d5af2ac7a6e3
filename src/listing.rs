//! Disassembly listing parser.
//!
//! Parses the textual listing printed by `objdump -d`. An instruction row
//! has the shape
//!
//! ```text
//! <leading whitespace> <hex address>: <encoding> <mnemonic> [operands]
//! ```
//!
//! GNU objdump separates the address, encoding and instruction with tabs:
//!
//! ```text
//!   400078:	d2800020 	movz	x0, #0x1
//! ```
//!
//! Everything else in a listing (file banners, section headers, symbol
//! labels such as `0000000000400078 <_start>:`, interleaved source lines
//! and blank lines) is rejected by [`parse_line`].

use crate::types::MnemonicCounts;

/// One instruction row of a disassembly listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingLine<'a> {
    /// Instruction address.
    pub address: u64,
    /// Encoded bytes as printed (display order of the disassembler).
    pub encoding: Vec<u8>,
    /// Instruction mnemonic.
    pub mnemonic: &'a str,
    /// Operand text, possibly empty.
    pub operands: &'a str,
}

/// Parse a single listing line.
///
/// Returns `None` for anything that is not an instruction row, including
/// continuation rows that carry encoding bytes but no mnemonic.
pub fn parse_line(line: &str) -> Option<ListingLine<'_>> {
    // Instruction rows are indented; labels and headers start in column 0.
    if !line.starts_with(|c: char| c == ' ' || c == '\t') {
        return None;
    }
    let body = line.trim_start();

    if memchr::memchr(b'\t', body.as_bytes()).is_some() {
        parse_tabbed(body)
    } else {
        parse_spaced(body)
    }
}

/// `addr:\tencoding\tmnemonic[\toperands]`
fn parse_tabbed(body: &str) -> Option<ListingLine<'_>> {
    let mut fields = body.splitn(3, '\t');
    let address = parse_address(fields.next()?.trim())?;
    let encoding = parse_encoding(fields.next()?)?;
    let insn = fields.next()?.trim();

    let (mnemonic, operands) = match insn.find(char::is_whitespace) {
        Some(split) => (&insn[..split], insn[split..].trim()),
        None => (insn, ""),
    };
    if mnemonic.is_empty() {
        return None;
    }

    Some(ListingLine {
        address,
        encoding,
        mnemonic,
        operands,
    })
}

/// `addr: encoding mnemonic [operands]`, third whitespace field is the mnemonic.
fn parse_spaced(body: &str) -> Option<ListingLine<'_>> {
    let (address, rest) = next_token(body)?;
    let (encoding, rest) = next_token(rest)?;
    let (mnemonic, rest) = next_token(rest)?;

    Some(ListingLine {
        address: parse_address(address)?,
        encoding: parse_encoding(encoding)?,
        mnemonic,
        operands: rest.trim(),
    })
}

fn next_token(s: &str) -> Option<(&str, &str)> {
    let s = s.trim_start();
    if s.is_empty() {
        return None;
    }
    let end = s.find(char::is_whitespace).unwrap_or(s.len());
    Some(s.split_at(end))
}

fn parse_address(token: &str) -> Option<u64> {
    let hex = token.strip_suffix(':')?;
    if hex.is_empty() {
        return None;
    }
    u64::from_str_radix(hex, 16).ok()
}

fn parse_encoding(field: &str) -> Option<Vec<u8>> {
    let digits: String = field.split_whitespace().collect();
    if digits.is_empty() {
        return None;
    }
    hex::decode(digits).ok()
}

/// Iterate over the instruction rows of a listing.
pub fn parse_listing(listing: &str) -> impl Iterator<Item = ListingLine<'_>> {
    listing.lines().filter_map(parse_line)
}

/// Collect the mnemonic of every instruction row in `listing`.
pub fn mnemonics(listing: &str) -> Vec<String> {
    parse_listing(listing)
        .map(|line| line.mnemonic.to_string())
        .collect()
}

/// Count occurrences of each mnemonic.
///
/// The names are sorted first so identical mnemonics are adjacent, then
/// each run is counted and inserted once.
pub fn count_mnemonics(mut mnemonics: Vec<String>) -> MnemonicCounts {
    mnemonics.sort_unstable();

    let mut counts = MnemonicCounts::new();
    let mut iter = mnemonics.into_iter().peekable();
    while let Some(mnemonic) = iter.next() {
        let mut run = 1u64;
        while iter.peek() == Some(&mnemonic) {
            iter.next();
            run += 1;
        }
        counts.add(mnemonic, run);
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const AARCH64_LISTING: &str = "
fib.elf:     file format elf64-bigaarch64


Disassembly of section .text:

0000000000400078 <_start>:
_start():
  400078:\td2800020 \tmovz\tx0, #0x1
  40007c:\td2800041 \tmovz\tx1, #0x2
  400080:\t8b010000 \tadd\tx0, x0, x1
  // interleaved source: x = x + y;
  400084:\td65f03c0 \tret
";

    #[test]
    fn test_parse_tabbed_line() {
        let line = parse_line("  400080:\t8b010000 \tadd\tx0, x0, x1").unwrap();
        assert_eq!(line.address, 0x400080);
        assert_eq!(line.encoding, vec![0x8b, 0x01, 0x00, 0x00]);
        assert_eq!(line.mnemonic, "add");
        assert_eq!(line.operands, "x0, x0, x1");
    }

    #[test]
    fn test_parse_no_operands() {
        let line = parse_line("  400084:\td65f03c0 \tret").unwrap();
        assert_eq!(line.mnemonic, "ret");
        assert_eq!(line.operands, "");
    }

    #[test]
    fn test_parse_spaced_line() {
        let line = parse_line("  400080: 8b010000 add x0, x0, x1").unwrap();
        assert_eq!(line.address, 0x400080);
        assert_eq!(line.mnemonic, "add");
        assert_eq!(line.operands, "x0, x0, x1");
    }

    #[test]
    fn test_parse_multibyte_encoding() {
        let line = parse_line("  401000:\t48 89 e5             \tmov    %rsp,%rbp").unwrap();
        assert_eq!(line.encoding, vec![0x48, 0x89, 0xe5]);
        assert_eq!(line.mnemonic, "mov");
        assert_eq!(line.operands, "%rsp,%rbp");
    }

    #[test]
    fn test_rejects_non_instruction_lines() {
        assert!(parse_line("").is_none());
        assert!(parse_line("0000000000400078 <_start>:").is_none());
        assert!(parse_line("Disassembly of section .text:").is_none());
        assert!(parse_line("  int x = 0;").is_none());
        assert!(parse_line("  retry:").is_none());
        assert!(parse_line("  abc: x y").is_none());
        // Continuation row with bytes only.
        assert!(parse_line("  401007:\t00 00 ").is_none());
    }

    #[test]
    fn test_mnemonics_from_listing() {
        assert_eq!(
            mnemonics(AARCH64_LISTING),
            vec!["movz", "movz", "add", "ret"]
        );
    }

    #[test]
    fn test_count_mnemonics() {
        let counts = count_mnemonics(mnemonics(AARCH64_LISTING));
        assert_eq!(counts.get("movz"), 2);
        assert_eq!(counts.get("add"), 1);
        assert_eq!(counts.get("ret"), 1);
        assert_eq!(counts.total(), 4);
        assert_eq!(counts.len(), 3);
    }

    #[test]
    fn test_count_empty() {
        let counts = count_mnemonics(Vec::new());
        assert!(counts.is_empty());
        assert_eq!(counts.total(), 0);
    }
}
