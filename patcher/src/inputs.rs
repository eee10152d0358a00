//! Parsers for the three text inputs: the address list exported from
//! the disassembler, the payload bytes, and the blacklist file.

use std::io;

fn invalid_data(message: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, message)
}

fn strip_hex_prefix(token: &str) -> &str {
    token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
        .unwrap_or(token)
}

/// Parse the address list: one record per line, tab-separated fields,
/// field 0 a hex virtual address. Remaining fields (symbol names,
/// disassembly context) are ignored. Blank lines are skipped.
pub fn parse_address_list(text: &str) -> io::Result<Vec<u64>> {
    let mut addresses = Vec::new();
    for (line_number, line) in text.lines().enumerate() {
        let field = match line.split('\t').next() {
            Some(field) if !field.trim().is_empty() => field.trim(),
            _ => continue,
        };
        let address = u64::from_str_radix(strip_hex_prefix(field), 16).map_err(|e| {
            invalid_data(format!(
                "address list line {}: bad address {field:?}: {e}",
                line_number + 1
            ))
        })?;
        addresses.push(address);
    }
    Ok(addresses)
}

/// Parse the payload file: whitespace-separated hex byte tokens. An
/// empty file is an empty payload.
pub fn parse_payload(text: &str) -> io::Result<Vec<u8>> {
    text.split_whitespace()
        .map(|token| {
            u8::from_str_radix(strip_hex_prefix(token), 16)
                .map_err(|e| invalid_data(format!("bad payload byte {token:?}: {e}")))
        })
        .collect()
}

/// Parse a blacklist file: whitespace-separated decimal indices.
pub fn parse_blacklist(text: &str) -> io::Result<Vec<usize>> {
    text.split_whitespace()
        .map(|token| {
            token
                .parse::<usize>()
                .map_err(|e| invalid_data(format!("bad blacklist index {token:?}: {e}")))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_list_takes_first_tab_field() {
        let text = "180001a2f\tcall\tFUN_18000\n0x180002b40\tmov\n\n180003c51\n";
        let addresses = parse_address_list(text).unwrap();
        assert_eq!(addresses, [0x180001a2f, 0x180002b40, 0x180003c51]);
    }

    #[test]
    fn address_list_rejects_junk() {
        assert!(parse_address_list("not-hex\tfoo\n").is_err());
    }

    #[test]
    fn payload_accepts_both_hex_spellings() {
        assert_eq!(parse_payload("cc 0xcc CC").unwrap(), [0xcc, 0xcc, 0xcc]);
        assert_eq!(parse_payload("  \n").unwrap(), Vec::<u8>::new());
        assert!(parse_payload("1ff").is_err());
    }

    #[test]
    fn blacklist_is_decimal() {
        assert_eq!(parse_blacklist("3 1 4").unwrap(), [3, 1, 4]);
        assert_eq!(parse_blacklist("").unwrap(), Vec::<usize>::new());
        assert!(parse_blacklist("0x3").is_err());
    }
}
