//! Upload validation and text extraction for `.txt`, `.docx`, and `.pdf`.
//!
//! [`validate_upload`] runs before any bytes are parsed: size first, then
//! extension. [`extract_text`] validates and then decodes the file to plain
//! UTF-8 text. Every failure maps to a [`CheckError`] the HTTP layer can
//! return as a 4xx.

use std::io::Read;
use std::path::Path;

use quick_xml::events::Event;
use thiserror::Error;

use crate::error::{CheckError, CheckResult};

/// Extensions accepted for upload, lowercase with the leading dot.
pub const ALLOWED_EXTENSIONS: &[&str] = &[".txt", ".docx", ".pdf"];

/// Maximum decompressed bytes to read from a single ZIP entry (zip-bomb protection).
const MAX_XML_ENTRY_BYTES: u64 = 50 * 1024 * 1024;

/// An uploaded file as received from a client.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FileMetadata {
    pub filename: String,
    /// Lowercase, with the leading dot (e.g. `".pdf"`).
    pub extension: String,
    pub size: usize,
}

/// Text decoded from an upload, with the upload's metadata.
#[derive(Debug, Clone)]
pub struct ExtractedText {
    pub metadata: FileMetadata,
    pub text: String,
}

#[derive(Debug, Error)]
enum ExtractError {
    #[error("PDF extraction failed: {0}")]
    Pdf(String),
    #[error("DOCX extraction failed: {0}")]
    Docx(String),
}

/// Lowercase extension of `filename` with the leading dot, or `""`.
pub fn file_extension(filename: &str) -> String {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_lowercase()))
        .unwrap_or_default()
}

/// Checks size (strictly greater than `max_bytes` is rejected) and then extension.
pub fn validate_upload(upload: &FileUpload, max_bytes: usize) -> CheckResult<FileMetadata> {
    let size = upload.bytes.len();
    if size > max_bytes {
        return Err(CheckError::FileTooLarge {
            size,
            limit: max_bytes,
        });
    }

    let extension = file_extension(&upload.filename);
    if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        let shown = if extension.is_empty() {
            upload.filename.clone()
        } else {
            extension
        };
        return Err(CheckError::UnsupportedFileType(shown));
    }

    Ok(FileMetadata {
        filename: upload.filename.clone(),
        extension,
        size,
    })
}

/// Validates `upload` and extracts its text.
///
/// # Errors
///
/// The [`validate_upload`] errors, and [`CheckError::InvalidInput`] when the
/// file cannot be decoded or contains no text.
pub fn extract_text(upload: &FileUpload, max_bytes: usize) -> CheckResult<ExtractedText> {
    let metadata = validate_upload(upload, max_bytes)?;

    let text = match metadata.extension.as_str() {
        ".pdf" => extract_pdf(&upload.bytes),
        ".docx" => extract_docx(&upload.bytes),
        _ => Ok(extract_plain(&upload.bytes)),
    }
    .map_err(|e| {
        CheckError::invalid(format!(
            "Failed to extract text from {}: {}",
            metadata.filename, e
        ))
    })?;

    if text.trim().is_empty() {
        return Err(CheckError::invalid("No text content found"));
    }

    Ok(ExtractedText { metadata, text })
}

fn extract_plain(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    String::from_utf8_lossy(bytes).into_owned()
}

fn extract_pdf(bytes: &[u8]) -> Result<String, ExtractError> {
    pdf_extract::extract_text_from_mem(bytes).map_err(|e| ExtractError::Pdf(e.to_string()))
}

fn extract_docx(bytes: &[u8]) -> Result<String, ExtractError> {
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes))
        .map_err(|e| ExtractError::Docx(e.to_string()))?;
    let entry = archive
        .by_name("word/document.xml")
        .map_err(|_| ExtractError::Docx("word/document.xml not found".to_string()))?;

    let mut doc_xml = Vec::new();
    entry
        .take(MAX_XML_ENTRY_BYTES)
        .read_to_end(&mut doc_xml)
        .map_err(|e| ExtractError::Docx(e.to_string()))?;
    if doc_xml.len() as u64 >= MAX_XML_ENTRY_BYTES {
        return Err(ExtractError::Docx(
            "word/document.xml exceeds size limit".to_string(),
        ));
    }

    document_text(&doc_xml)
}

/// Collects `<w:t>` runs; `<w:p>` ends a line, `<w:tab/>` and `<w:br/>` map
/// to tab and newline.
fn document_text(xml: &[u8]) -> Result<String, ExtractError> {
    let mut out = String::new();
    let mut reader = quick_xml::Reader::from_reader(xml);
    reader.config_mut().trim_text(false);
    let mut buf = Vec::new();
    let mut in_text = false;
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"t" => in_text = true,
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"p" => out.push('\n'),
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"tab" => out.push('\t'),
                b"br" => out.push('\n'),
                _ => {}
            },
            Ok(Event::Text(te)) if in_text => {
                out.push_str(te.unescape().unwrap_or_default().as_ref());
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ExtractError::Docx(e.to_string())),
            _ => {}
        }
        buf.clear();
    }
    Ok(out.trim_end().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn upload(name: &str, bytes: &[u8]) -> FileUpload {
        FileUpload {
            filename: name.to_string(),
            bytes: bytes.to_vec(),
        }
    }

    fn docx(document_xml: &str) -> Vec<u8> {
        let mut cursor = std::io::Cursor::new(Vec::new());
        {
            let mut zip = zip::ZipWriter::new(&mut cursor);
            let options = zip::write::SimpleFileOptions::default();
            zip.start_file("word/document.xml", options).unwrap();
            zip.write_all(document_xml.as_bytes()).unwrap();
            zip.finish().unwrap();
        }
        cursor.into_inner()
    }

    #[test]
    fn size_is_checked_before_extension() {
        let err = validate_upload(&upload("virus.exe", &[0u8; 11]), 10).unwrap_err();
        assert!(matches!(err, CheckError::FileTooLarge { size: 11, limit: 10 }));
        assert!(validate_upload(&upload("ok.txt", &[b'a'; 10]), 10).is_ok());
    }

    #[test]
    fn rejects_unknown_extensions() {
        for name in ["file.exe", "file.doc", "noext"] {
            let err = validate_upload(&upload(name, b"abc"), 100).unwrap_err();
            assert!(matches!(err, CheckError::UnsupportedFileType(_)), "{name}");
        }
    }

    #[test]
    fn extension_match_is_case_insensitive() {
        let meta = validate_upload(&upload("Essay.TXT", b"abc"), 100).unwrap();
        assert_eq!(meta.extension, ".txt");
        assert_eq!(meta.size, 3);
        assert_eq!(meta.filename, "Essay.TXT");
    }

    #[test]
    fn plain_text_strips_bom() {
        let out = extract_text(&upload("a.txt", b"\xEF\xBB\xBFHello there"), 100).unwrap();
        assert_eq!(out.text, "Hello there");
    }

    #[test]
    fn whitespace_only_file_is_invalid() {
        let err = extract_text(&upload("a.txt", b"  \n "), 100).unwrap_err();
        assert!(matches!(err, CheckError::InvalidInput(_)));
    }

    #[test]
    fn invalid_pdf_is_invalid_input() {
        let err = extract_text(&upload("a.pdf", b"not a pdf"), 100).unwrap_err();
        assert!(matches!(err, CheckError::InvalidInput(_)));
    }

    #[test]
    fn invalid_zip_is_invalid_input() {
        let err = extract_text(&upload("a.docx", b"not a zip"), 100).unwrap_err();
        assert!(matches!(err, CheckError::InvalidInput(_)));
    }

    #[test]
    fn docx_paragraphs_become_lines() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    <w:p><w:r><w:t xml:space="preserve">First </w:t></w:r><w:r><w:t>paragraph.</w:t></w:r></w:p>
    <w:p><w:r><w:t>Second &amp; last.</w:t></w:r></w:p>
  </w:body>
</w:document>"#;
        let out = extract_text(&upload("doc.docx", &docx(xml)), 1 << 20).unwrap();
        assert_eq!(out.text, "First paragraph.\nSecond & last.");
        assert_eq!(out.metadata.extension, ".docx");
    }
}
