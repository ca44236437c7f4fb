//! Input helpers shared by the command handlers

use anyhow::{Context, Result};
use std::fs;
use std::io::Read;
use std::path::Path;

/// Read a file, or stdin when no path is given
pub fn read_input(path: Option<&Path>) -> Result<Vec<u8>> {
    match path {
        Some(path) => fs::read(path).with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .context("Failed to read stdin")?;
            Ok(buf)
        }
    }
}

/// Like [`read_input`], decoding invalid UTF-8 lossily
pub fn read_text(path: Option<&Path>) -> Result<String> {
    let bytes = read_input(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Parse hex with optional whitespace and `0x` prefix
pub fn parse_hex(input: &str) -> Result<Vec<u8>> {
    let compact: String = input.split_whitespace().collect();
    let digits = compact
        .strip_prefix("0x")
        .or_else(|| compact.strip_prefix("0X"))
        .unwrap_or(&compact);
    hex::decode(digits).with_context(|| format!("Invalid hex input: {}", input))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_read_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"<p>\xFFhi</p>").unwrap();

        assert_eq!(read_input(Some(file.path())).unwrap(), b"<p>\xFFhi</p>");
        assert_eq!(read_text(Some(file.path())).unwrap(), "<p>\u{FFFD}hi</p>");
    }

    #[test]
    fn test_missing_file_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.html");
        let err = read_input(Some(&path)).unwrap_err();
        assert!(format!("{:#}", err).contains("missing.html"));
    }

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex("03 02 67 68").unwrap(), vec![0x03, 0x02, 0x67, 0x68]);
        assert_eq!(parse_hex("0x9e00").unwrap(), vec![0x9E, 0x00]);
        assert_eq!(parse_hex("  0A\n0b ").unwrap(), vec![0x0A, 0x0B]);
        assert!(parse_hex("abc").is_err());
        assert!(parse_hex("zz").is_err());
    }
}
