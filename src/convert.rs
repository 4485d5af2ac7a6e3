//! Opcode hex/binary conversion.
//!
//! Test fixtures write AArch64 instructions as little-endian byte arrays
//! (`0x00, 0x00, 0x00, 0x14` for `b #0`) while the architecture manual
//! shows encodings as 32-bit binary with bit 31 on the left. These helpers
//! go from one to the other.

use crate::error::{Result, ToolError};
use crate::types::ByteOrder;
use byteorder::{BigEndian, ByteOrder as _, LittleEndian};

/// Number of digits in a binary opcode.
pub const OPCODE_BITS: usize = 32;

/// Parse a hex byte array such as `[0x1f, 0x20, 0x03, 0xd5],`.
///
/// `0x` prefixes, commas and brackets are optional. Bytes are returned in
/// the order written. Input without any byte token is an error.
pub fn parse_hex_array(input: &str) -> Result<Vec<u8>> {
    let bytes = input
        .split(|c: char| c == ',' || c == '[' || c == ']' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .map(|token| {
            let digits = token
                .strip_prefix("0x")
                .or_else(|| token.strip_prefix("0X"))
                .unwrap_or(token);
            u8::from_str_radix(digits, 16).map_err(|_| ToolError::InvalidHexToken {
                token: token.to_string(),
            })
        })
        .collect::<Result<Vec<u8>>>()?;

    if bytes.is_empty() {
        return Err(ToolError::EmptyHexArray);
    }
    Ok(bytes)
}

/// Render bytes as 8-digit binary groups separated by spaces.
pub fn format_binary(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:08b}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Render bytes as `0xNN` tokens separated by `, `.
pub fn format_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("0x{:02X}", b))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Convert a little-endian hex byte array into big-endian binary.
///
/// ```
/// use opcode_tools::convert::process_hex;
///
/// let bits = process_hex("0x00, 0x00, 0x00, 0x14,").unwrap();
/// assert_eq!(bits, "00010100 00000000 00000000 00000000");
/// ```
pub fn process_hex(input: &str) -> Result<String> {
    let mut bytes = parse_hex_array(input)?;
    bytes.reverse();
    Ok(format_binary(&bytes))
}

/// Parse a 32-digit binary opcode. Spaces and tabs are ignored.
pub fn parse_binary_word(input: &str) -> Result<u32> {
    let digits: String = input.chars().filter(|c| *c != ' ' && *c != '\t').collect();

    let len = digits.chars().count();
    if len != OPCODE_BITS {
        return Err(ToolError::InvalidBinaryLength { actual: len });
    }
    if let Some(digit) = digits.chars().find(|c| *c != '0' && *c != '1') {
        return Err(ToolError::InvalidBinaryDigit { digit });
    }

    u32::from_str_radix(&digits, 2).map_err(|_| ToolError::InvalidBinaryLength { actual: len })
}

/// Split an opcode into bytes.
///
/// [`ByteOrder::Little`] starts from the least-significant 8 bits, giving
/// the in-memory byte array of the instruction.
pub fn opcode_bytes(word: u32, order: ByteOrder) -> [u8; 4] {
    let mut buf = [0u8; 4];
    match order {
        ByteOrder::Little => LittleEndian::write_u32(&mut buf, word),
        ByteOrder::Big => BigEndian::write_u32(&mut buf, word),
    }
    buf
}

/// Convert a 32-bit binary opcode into a little-endian hex byte array.
///
/// Bytes are emitted least-significant first, so `...00000001` yields
/// `0x01, 0x00, 0x00, 0x00`. Use
/// [`process_binary_with_order`] with [`ByteOrder::Big`] to get the
/// most-significant byte first (`0x00, 0x00, 0x00, 0x01`).
///
/// ```
/// use opcode_tools::convert::process_binary;
///
/// let hex = process_binary("00010100 00000000 00000000 00000000").unwrap();
/// assert_eq!(hex, "0x00, 0x00, 0x00, 0x14");
/// ```
pub fn process_binary(input: &str) -> Result<String> {
    process_binary_with_order(input, ByteOrder::Little)
}

/// Convert a 32-bit binary opcode into hex bytes in the given order.
pub fn process_binary_with_order(input: &str, order: ByteOrder) -> Result<String> {
    let word = parse_binary_word(input)?;
    Ok(format_hex(&opcode_bytes(word, order)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_hex_array_forms() {
        let expected = vec![0x1f, 0x20, 0x03, 0xd5];
        assert_eq!(parse_hex_array("0x1f, 0x20, 0x03, 0xd5").unwrap(), expected);
        assert_eq!(parse_hex_array("0x1f, 0x20, 0x03, 0xd5,").unwrap(), expected);
        assert_eq!(parse_hex_array("[0x1F,0x20,0x03,0xD5]").unwrap(), expected);
        assert_eq!(parse_hex_array("1f 20 3 d5").unwrap(), expected);
        assert_eq!(parse_hex_array("0X1f\t0x20  0x03 0xd5").unwrap(), expected);
    }

    #[test]
    fn test_parse_hex_array_invalid() {
        let err = parse_hex_array("0x1f, 0xzz").unwrap_err();
        match err {
            ToolError::InvalidHexToken { token } => assert_eq!(token, "0xzz"),
            other => panic!("unexpected error: {other}"),
        }
        assert!(parse_hex_array("0x100").is_err());
    }

    #[test]
    fn test_parse_hex_array_empty() {
        for input in ["", ",", " [ , ] ", "\t"] {
            assert!(matches!(
                parse_hex_array(input),
                Err(ToolError::EmptyHexArray)
            ));
            assert!(process_hex(input).is_err());
        }
    }

    #[test]
    fn test_process_hex() {
        // movz x0, #0x1
        assert_eq!(
            process_hex("0x20, 0x00, 0x80, 0xd2,").unwrap(),
            "11010010 10000000 00000000 00100000"
        );
    }

    #[test]
    fn test_process_binary() {
        assert_eq!(
            process_binary("11010010 10000000 00000000 00100000").unwrap(),
            "0x20, 0x00, 0x80, 0xD2"
        );
    }

    #[test]
    fn test_process_binary_strips_tabs() {
        assert_eq!(
            process_binary("1101\t0010 1000\t0000 0000 0000 0010 0000").unwrap(),
            "0x20, 0x00, 0x80, 0xD2"
        );
    }

    #[test]
    fn test_process_binary_low_bit() {
        let input = "00000000 00000000 00000000 00000001";
        assert_eq!(process_binary(input).unwrap(), "0x01, 0x00, 0x00, 0x00");
        assert_eq!(
            process_binary_with_order(input, ByteOrder::Big).unwrap(),
            "0x00, 0x00, 0x00, 0x01"
        );
    }

    #[test]
    fn test_process_binary_invalid_length() {
        let short = "0".repeat(31);
        let long = format!("{} 0", "0".repeat(32));
        for input in [short.as_str(), long.as_str()] {
            match process_binary(input) {
                Err(ToolError::InvalidBinaryLength { actual }) => {
                    assert!(actual == 31 || actual == 33);
                }
                other => panic!("expected length error, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_process_binary_invalid_digit() {
        let input = format!("{}2", "0".repeat(31));
        assert!(matches!(
            process_binary(&input),
            Err(ToolError::InvalidBinaryDigit { digit: '2' })
        ));
    }

    #[test]
    fn test_hex_binary_round_trip() {
        let arrays: [[u8; 4]; 4] = [
            [0x00, 0x00, 0x00, 0x14],
            [0x21, 0x00, 0x00, 0x8b],
            [0xc0, 0x03, 0x5f, 0xd6],
            [0xff, 0xff, 0xff, 0xff],
        ];
        for bytes in arrays {
            let bits = process_hex(&format_hex(&bytes)).unwrap();
            let back = parse_hex_array(&process_binary(&bits).unwrap()).unwrap();
            assert_eq!(back, bytes.to_vec());
        }
    }
}
