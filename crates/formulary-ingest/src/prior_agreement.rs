//! Detection of substance names in the prior-agreement document.
//!
//! The document is a scanned-then-OCR'd list without structure. Lines that
//! look like upper-case names are taken as candidates; precision is low and
//! the output is meant for human review.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use encoding_rs::{UTF_16BE, WINDOWS_1252};
use lopdf::content::Content;
use lopdf::{Document, Object, ObjectId};
use regex::Regex;
use tracing::{debug, info, warn};

use crate::dedupe::Deduplicator;
use crate::error::{IngestError, Result};

/// Shortest accepted line, in characters.
const MIN_LINE_CHARS: usize = 3;

static NAME_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Z0-9][A-Z0-9 +'\-]{2,60}$").expect("valid name-line regex")
});

/// Paginated text.
pub trait PageSource {
    fn page_count(&self) -> usize;

    /// Text of the zero-based page `index`.
    fn text_of_page(&self, index: usize) -> Result<String>;
}

/// A PDF file opened with lopdf.
pub struct PdfPages {
    path: PathBuf,
    document: Document,
    pages: BTreeMap<u32, ObjectId>,
}

impl PdfPages {
    pub fn open(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(IngestError::SourceMissing {
                path: path.to_path_buf(),
            });
        }
        let document = Document::load(path).map_err(|e| IngestError::Document {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        if document.is_encrypted() {
            return Err(IngestError::Document {
                path: path.to_path_buf(),
                message: "document is encrypted".to_string(),
            });
        }
        let pages = document.get_pages();
        debug!(path = %path.display(), pages = pages.len(), "document opened");
        Ok(Self {
            path: path.to_path_buf(),
            document,
            pages,
        })
    }
}

impl PageSource for PdfPages {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn text_of_page(&self, index: usize) -> Result<String> {
        let Some((&page_number, &page_id)) = self.pages.iter().nth(index) else {
            return Err(IngestError::Document {
                path: self.path.clone(),
                message: format!("page {} out of range", index + 1),
            });
        };
        let content = self
            .document
            .get_page_content(page_id)
            .and_then(|bytes| Content::decode(&bytes))
            .map_err(|e| IngestError::Document {
                path: self.path.clone(),
                message: format!("page {page_number}: {e}"),
            })?;
        Ok(content_text(&content))
    }
}

/// Text shown by a content stream, one line per text positioning step.
fn content_text(content: &Content) -> String {
    let mut text = String::new();
    for operation in &content.operations {
        match operation.operator.as_str() {
            "Tj" | "TJ" => push_shown(&mut text, &operation.operands),
            "'" | "\"" => {
                break_line(&mut text);
                push_shown(&mut text, &operation.operands);
            }
            "Td" | "TD" | "T*" | "Tm" | "ET" => break_line(&mut text),
            _ => {}
        }
    }
    text
}

fn break_line(text: &mut String) {
    if !text.is_empty() && !text.ends_with('\n') {
        text.push('\n');
    }
}

fn push_shown(text: &mut String, operands: &[Object]) {
    for operand in operands {
        match operand {
            Object::String(bytes, _) => text.push_str(&decode_pdf_string(bytes)),
            // TJ: strings interleaved with kerning adjustments
            Object::Array(items) => push_shown(text, items),
            _ => {}
        }
    }
}

fn decode_pdf_string(bytes: &[u8]) -> String {
    match bytes {
        [0xFE, 0xFF, rest @ ..] => UTF_16BE.decode_without_bom_handling(rest).0.into_owned(),
        _ => WINDOWS_1252.decode_without_bom_handling(bytes).0.into_owned(),
    }
}

/// Text of the first `pages` pages joined by newlines.
pub fn leading_text(source: &dyn PageSource, pages: usize) -> Result<String> {
    let count = source.page_count().min(pages);
    let mut texts = Vec::with_capacity(count);
    for index in 0..count {
        texts.push(source.text_of_page(index)?);
    }
    Ok(texts.join("\n"))
}

/// Whether a trimmed line looks like a substance name.
pub fn is_candidate_line<S: AsRef<str>>(line: &str, boilerplate: &[S]) -> bool {
    if line.chars().count() < MIN_LINE_CHARS {
        return false;
    }
    if boilerplate.iter().any(|phrase| line.contains(phrase.as_ref())) {
        return false;
    }
    NAME_LINE.is_match(line)
}

/// Candidate names in order of first appearance, exact duplicates removed.
pub fn scan_text<S: AsRef<str>>(text: &str, boilerplate: &[S]) -> Vec<String> {
    let mut candidates = Deduplicator::exact();
    for line in text.lines().map(str::trim) {
        if is_candidate_line(line, boilerplate) {
            candidates.push(line);
        }
    }
    candidates.into_vec()
}

pub fn scan_pages<S: AsRef<str>>(
    source: &dyn PageSource,
    pages: usize,
    boilerplate: &[S],
) -> Result<Vec<String>> {
    let text = leading_text(source, pages)?;
    Ok(scan_text(&text, boilerplate))
}

/// Scans the document at `path`; any failure yields no candidates.
pub fn scan_document<S: AsRef<str>>(path: &Path, pages: usize, boilerplate: &[S]) -> Vec<String> {
    let result = PdfPages::open(path).and_then(|pdf| scan_pages(&pdf, pages, boilerplate));
    match result {
        Ok(candidates) => {
            info!(
                path = %path.display(),
                candidates = candidates.len(),
                "prior-agreement document scanned"
            );
            candidates
        }
        Err(error) => {
            warn!(path = %path.display(), %error, "prior-agreement scan skipped");
            Vec::new()
        }
    }
}
