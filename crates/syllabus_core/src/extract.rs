//! crates/syllabus_core/src/extract.rs
//!
//! Converts an uploaded byte stream of a known document type (PDF, DOCX,
//! plain text) into one normalized text string. Dispatch is purely on the
//! filename extension; unsupported extensions fail without reading a byte.

use std::io::{Cursor, Read};

use zip::ZipArchive;

use crate::domain::UploadedDocument;

/// Errors raised while extracting text from an uploaded document.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("file type .{0} is not supported. Please use PDF, DOCX, or TXT")]
    UnsupportedFormat(String),
    #[error("could not read {format} file: {message}")]
    CorruptDocument { format: &'static str, message: String },
    #[error("the document contained no readable text")]
    EmptyContent,
}

/// Extracts the full text of an uploaded document.
///
/// A mechanically successful read that yields only whitespace is still a
/// failure: downstream stages cannot do useful work on empty input.
pub fn extract(document: &UploadedDocument) -> Result<String, ExtractionError> {
    let extension = document.extension().unwrap_or_default();

    let text = match extension.as_str() {
        "pdf" => extract_pdf(&document.bytes)?,
        "docx" => extract_docx(&document.bytes)?,
        "txt" => extract_txt(&document.bytes),
        other => return Err(ExtractionError::UnsupportedFormat(other.to_string())),
    };

    if text.trim().is_empty() {
        return Err(ExtractionError::EmptyContent);
    }
    Ok(text)
}

/// Extracts page text from a PDF, pages in document order.
///
/// `pdf-extract` concatenates pages itself; a corrupted or encrypted file
/// surfaces as `CorruptDocument` rather than silently returning partial text.
fn extract_pdf(bytes: &[u8]) -> Result<String, ExtractionError> {
    pdf_extract::extract_text_from_mem(bytes).map_err(|e| ExtractionError::CorruptDocument {
        format: "PDF",
        message: e.to_string(),
    })
}

/// Extracts paragraph text from a DOCX file.
///
/// DOCX files are ZIP archives; the body lives in `word/document.xml`. We
/// walk the XML and collect the contents of `<w:t>` runs, emitting a newline
/// at every `</w:p>` paragraph boundary. Non-text content is ignored.
fn extract_docx(bytes: &[u8]) -> Result<String, ExtractionError> {
    let corrupt = |message: String| ExtractionError::CorruptDocument {
        format: "DOCX",
        message,
    };

    let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(|e| corrupt(e.to_string()))?;
    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| corrupt(format!("word/document.xml not found: {e}")))?
        .read_to_string(&mut xml)
        .map_err(|e| corrupt(e.to_string()))?;

    Ok(document_xml_text(&xml))
}

/// Pulls the plain text out of a WordprocessingML body.
fn document_xml_text(xml: &str) -> String {
    let mut out = String::new();
    let mut in_text_run = false;
    let mut chars = xml.chars();

    while let Some(ch) = chars.next() {
        if ch != '<' {
            if in_text_run {
                out.push(ch);
            }
            continue;
        }

        // Collect the tag up to '>'.
        let mut tag = String::new();
        for c in chars.by_ref() {
            if c == '>' {
                break;
            }
            tag.push(c);
        }

        let tag = tag.trim();
        if tag == "/w:t" {
            in_text_run = false;
        } else if tag == "/w:p" {
            out.push('\n');
        } else if (tag == "w:t" || tag.starts_with("w:t ")) && !tag.ends_with('/') {
            in_text_run = true;
        }
    }

    decode_xml_entities(&out)
}

fn decode_xml_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// Reads a plain-text upload, stripping a UTF-8 BOM and falling back to a
/// lossy decode for other encodings.
fn extract_txt(bytes: &[u8]) -> String {
    let text = match String::from_utf8(bytes.to_vec()) {
        Ok(text) => text,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    };
    text.strip_prefix('\u{feff}').unwrap_or(&text).to_string()
}
