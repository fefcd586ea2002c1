//! Plain-text extraction from .docx uploads.
//!
//! A .docx file is a ZIP container; the document body lives in
//! `word/document.xml`. Text runs (`<w:t>`) are concatenated per paragraph
//! and paragraphs become lines, mirroring how word processors join runs.

use crate::error::WorkflowError;
use regex::Regex;
use std::io::{Cursor, Read};

/// Extract the paragraph text of a .docx document.
///
/// Fails with `InvalidDocument` when the bytes are not a ZIP container or
/// the container has no `word/document.xml` part.
pub fn extract_docx_text(bytes: &[u8]) -> Result<String, WorkflowError> {
    let mut archive =
        zip::ZipArchive::new(Cursor::new(bytes)).map_err(|e| WorkflowError::InvalidDocument {
            reason: format!("not a docx container: {}", e),
        })?;

    let mut document = archive
        .by_name("word/document.xml")
        .map_err(|_| WorkflowError::InvalidDocument {
            reason: "missing word/document.xml".to_string(),
        })?;

    let mut xml = String::new();
    document
        .read_to_string(&mut xml)
        .map_err(|e| WorkflowError::InvalidDocument {
            reason: format!("unreadable document body: {}", e),
        })?;

    Ok(paragraphs_to_text(&xml))
}

fn paragraphs_to_text(xml: &str) -> String {
    let run = Regex::new(r"(?s)<w:t[^>]*>(.*?)</w:t>").expect("valid regex");

    let mut lines = Vec::new();
    for paragraph in xml.split("</w:p>") {
        let mut text = String::new();
        for captures in run.captures_iter(paragraph) {
            text.push_str(&unescape_xml(&captures[1]));
        }
        lines.push(text);
    }

    // Drop trailing blank paragraphs left over from the body close tags.
    while lines.last().map(|l| l.is_empty()).unwrap_or(false) {
        lines.pop();
    }

    lines.join("\n")
}

fn unescape_xml(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn build_docx(document_xml: &str) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = zip::ZipWriter::new(&mut cursor);
            writer
                .start_file("word/document.xml", SimpleFileOptions::default())
                .unwrap();
            writer.write_all(document_xml.as_bytes()).unwrap();
            writer.finish().unwrap();
        }
        cursor.into_inner()
    }

    #[test]
    fn test_extracts_paragraphs_as_lines() {
        let xml = r#"<w:document><w:body>
            <w:p><w:r><w:t>System shall accept uploads.</w:t></w:r></w:p>
            <w:p><w:r><w:t xml:space="preserve">It shall </w:t></w:r><w:r><w:t>generate code.</w:t></w:r></w:p>
        </w:body></w:document>"#;

        let text = extract_docx_text(&build_docx(xml)).unwrap();
        assert_eq!(
            text,
            "System shall accept uploads.\nIt shall generate code."
        );
    }

    #[test]
    fn test_unescapes_entities() {
        let xml = "<w:p><w:t>a &amp; b &lt; c</w:t></w:p>";
        let text = extract_docx_text(&build_docx(xml)).unwrap();
        assert_eq!(text, "a & b < c");
    }

    #[test]
    fn test_rejects_non_zip_bytes() {
        let err = extract_docx_text(b"plain text, not a zip").unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidDocument { .. }));
    }

    #[test]
    fn test_rejects_zip_without_document_part() {
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = zip::ZipWriter::new(&mut cursor);
            writer
                .start_file("unrelated.txt", SimpleFileOptions::default())
                .unwrap();
            writer.write_all(b"nope").unwrap();
            writer.finish().unwrap();
        }

        let err = extract_docx_text(&cursor.into_inner()).unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidDocument { .. }));
    }
}
