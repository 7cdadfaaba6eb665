//! Raw text extraction from uploaded resume documents.

use std::io::{Cursor, Read};
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;

use super::ExtractError;

/// Normalized text must reach this length or extraction fails — shorter
/// output almost always means a scanned or empty document.
const MIN_TEXT_LENGTH: usize = 50;

#[derive(Debug, Clone)]
pub struct ExtractedText {
    pub text: String,
    pub pages: usize,
    pub word_count: usize,
}

/// Extracts and normalizes text from a PDF or DOCX resume.
///
/// Synchronous on purpose (pdf parsing is CPU-bound); async callers should
/// wrap this in `spawn_blocking`.
pub fn extract_resume_text(path: &Path) -> Result<ExtractedText, ExtractError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "pdf" => {
            let pages = pdf_extract::extract_text_by_pages(path)
                .map_err(|e| ExtractError::Parse(e.to_string()))?;
            let page_count = pages.len().max(1);
            normalize_extracted_text(&pages.join("\n"), page_count)
        }
        "docx" => {
            let bytes = std::fs::read(path)?;
            let text = docx_to_text(&bytes)?;
            normalize_extracted_text(&text, 1)
        }
        other => Err(ExtractError::UnsupportedFormat(if other.is_empty() {
            "unknown".to_string()
        } else {
            other.to_string()
        })),
    }
}

/// Pulls visible text out of a DOCX archive (`word/document.xml`).
fn docx_to_text(bytes: &[u8]) -> Result<String, ExtractError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| ExtractError::Parse(format!("not a DOCX archive: {e}")))?;

    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| ExtractError::Parse(format!("missing document body: {e}")))?
        .read_to_string(&mut xml)?;

    let mut reader = Reader::from_str(&xml);
    let mut out = String::new();
    loop {
        match reader.read_event() {
            Ok(Event::Text(t)) => {
                let text = t
                    .unescape()
                    .map_err(|e| ExtractError::Parse(e.to_string()))?;
                out.push_str(&text);
            }
            // Paragraph boundaries become whitespace so words don't fuse.
            Ok(Event::End(e)) if e.name().as_ref() == b"w:p" => out.push('\n'),
            Ok(Event::Eof) => break,
            Err(e) => return Err(ExtractError::Parse(e.to_string())),
            _ => {}
        }
    }
    Ok(out)
}

/// Collapses whitespace and enforces the minimum-length guard.
pub fn normalize_extracted_text(raw: &str, pages: usize) -> Result<ExtractedText, ExtractError> {
    let text = raw.split_whitespace().collect::<Vec<_>>().join(" ");

    if text.len() < MIN_TEXT_LENGTH {
        return Err(ExtractError::InsufficientText);
    }

    let word_count = text.split_whitespace().count();
    Ok(ExtractedText {
        text,
        pages,
        word_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_unsupported_extension_rejected() {
        let err = extract_resume_text(Path::new("resume.txt")).unwrap_err();
        assert!(matches!(err, ExtractError::UnsupportedFormat(ext) if ext == "txt"));
    }

    #[test]
    fn test_missing_extension_rejected() {
        let err = extract_resume_text(Path::new("resume")).unwrap_err();
        assert!(matches!(err, ExtractError::UnsupportedFormat(ext) if ext == "unknown"));
    }

    #[test]
    fn test_normalize_collapses_whitespace_and_counts_words() {
        let raw = "  Jane\u{a0}Doe \n\n Senior   Engineer with ten years of systems experience ";
        let extracted = normalize_extracted_text(raw, 2).unwrap();
        assert!(!extracted.text.contains('\n'));
        assert_eq!(extracted.pages, 2);
        assert_eq!(extracted.word_count, extracted.text.split(' ').count());
    }

    #[test]
    fn test_normalize_rejects_short_text() {
        let err = normalize_extracted_text("too short to be a resume", 1).unwrap_err();
        assert!(matches!(err, ExtractError::InsufficientText));
    }

    #[test]
    fn test_docx_round_trip() {
        // Assemble a minimal DOCX in memory: a zip with word/document.xml.
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    <w:p><w:r><w:t>Jane Doe, Senior Backend Engineer</w:t></w:r></w:p>
    <w:p><w:r><w:t>Experience: built distributed systems in Rust and Go.</w:t></w:r></w:p>
  </w:body>
</w:document>"#;

        let mut cursor = Cursor::new(Vec::new());
        {
            let mut zip = zip::ZipWriter::new(&mut cursor);
            zip.start_file("word/document.xml", zip::write::SimpleFileOptions::default())
                .unwrap();
            zip.write_all(xml.as_bytes()).unwrap();
            zip.finish().unwrap();
        }

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resume.docx");
        std::fs::write(&path, cursor.into_inner()).unwrap();

        let extracted = extract_resume_text(&path).unwrap();
        assert!(extracted.text.contains("Jane Doe, Senior Backend Engineer"));
        assert!(extracted.text.contains("distributed systems"));
        assert_eq!(extracted.pages, 1);
    }
}
