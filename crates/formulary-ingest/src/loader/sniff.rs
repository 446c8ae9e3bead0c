//! Cheap content sniffing for HTML saved in place of a spreadsheet.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{IngestError, Result};

/// Number of leading bytes inspected.
pub const SNIFF_BYTES: u64 = 512;

/// Returns true if the leading bytes contain an HTML document opening tag.
pub fn looks_like_markup(head: &[u8]) -> bool {
    let text = String::from_utf8_lossy(head).to_lowercase();
    text.contains("<html") || text.contains("<!doctype")
}

/// Reads the first [`SNIFF_BYTES`] of `path` and checks them for markup.
pub fn sniff_markup(path: &Path) -> Result<bool> {
    let file = File::open(path).map_err(|e| IngestError::file_read(path, e))?;
    let mut head = Vec::with_capacity(SNIFF_BYTES as usize);
    file.take(SNIFF_BYTES)
        .read_to_end(&mut head)
        .map_err(|e| IngestError::file_read(path, e))?;
    Ok(looks_like_markup(&head))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_doctype_and_html() {
        assert!(looks_like_markup(b"<!DOCTYPE html>\n<html>"));
        assert!(looks_like_markup(b"\r\n  <HTML lang=\"fr\">"));
    }

    #[test]
    fn test_binary_workbook_is_not_markup() {
        // OLE2 compound document signature
        assert!(!looks_like_markup(&[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1]));
        // zip local file header
        assert!(!looks_like_markup(b"PK\x03\x04"));
        assert!(!looks_like_markup(b"DCI;CODE\nAMOXICILLINE;1\n"));
    }
}
