//! Paragraph text of a DOCX file: the body paragraphs of `word/document.xml`, one per line.

use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;
use thiserror::Error;

const DOCUMENT_XML: &str = "word/document.xml";

#[derive(Debug, Error)]
pub enum DocxError {
    #[error("not a DOCX archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("could not read word/document.xml: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed word/document.xml: {0}")]
    Xml(#[from] quick_xml::Error),
}

pub fn extract_docx_text(bytes: &[u8]) -> Result<String, DocxError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;
    let mut xml = String::new();
    archive.by_name(DOCUMENT_XML)?.read_to_string(&mut xml)?;
    body_paragraphs(&xml)
}

/// Joins the run text of every top-level paragraph with `\n`. Paragraphs inside tables
/// are skipped.
fn body_paragraphs(xml: &str) -> Result<String, DocxError> {
    let mut reader = Reader::from_str(xml);
    let mut paragraphs = Vec::new();
    let mut current: Option<String> = None;
    let mut table_depth = 0usize;
    let mut in_run = false;
    let mut in_text = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.name().as_ref() {
                b"w:tbl" => table_depth += 1,
                b"w:p" if table_depth == 0 => current = Some(String::new()),
                b"w:r" => in_run = true,
                b"w:t" => in_text = true,
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"w:p" if table_depth == 0 => paragraphs.push(String::new()),
                b"w:tab" if in_run => push_char(&mut current, '\t'),
                b"w:br" | b"w:cr" if in_run => push_char(&mut current, '\n'),
                _ => {}
            },
            Event::End(e) => match e.name().as_ref() {
                b"w:tbl" => table_depth = table_depth.saturating_sub(1),
                b"w:p" => {
                    if let Some(paragraph) = current.take() {
                        paragraphs.push(paragraph);
                    }
                }
                b"w:r" => in_run = false,
                b"w:t" => in_text = false,
                _ => {}
            },
            Event::Text(t) if in_text => {
                if let Some(paragraph) = current.as_mut() {
                    paragraph.push_str(&t.unescape()?);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(paragraphs.join("\n"))
}

fn push_char(current: &mut Option<String>, c: char) {
    if let Some(paragraph) = current.as_mut() {
        paragraph.push(c);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::io::Write;

    use super::*;

    /// Minimal DOCX archive holding only `word/document.xml`.
    pub(crate) fn docx_bytes(document_xml: &str) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file(DOCUMENT_XML, zip::write::FileOptions::default())
            .unwrap();
        writer.write_all(document_xml.as_bytes()).unwrap();
        writer.finish().unwrap().into_inner()
    }

    pub(crate) fn document(body: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}</w:body></w:document>"#
        )
    }

    #[test]
    fn test_paragraphs_joined_by_newline() {
        let xml = document(
            "<w:p><w:r><w:t>Senior engineer.</w:t></w:r></w:p>\
             <w:p><w:r><w:t xml:space=\"preserve\">Built </w:t></w:r><w:r><w:t>payments &amp; billing.</w:t></w:r></w:p>",
        );
        let text = extract_docx_text(&docx_bytes(&xml)).unwrap();
        assert_eq!(text, "Senior engineer.\nBuilt payments & billing.");
    }

    #[test]
    fn test_empty_paragraph_keeps_its_line() {
        let xml = document("<w:p><w:r><w:t>One</w:t></w:r></w:p><w:p/><w:p><w:r><w:t>Two</w:t></w:r></w:p>");
        assert_eq!(extract_docx_text(&docx_bytes(&xml)).unwrap(), "One\n\nTwo");
    }

    #[test]
    fn test_tabs_and_breaks_inside_runs() {
        let xml = document(
            "<w:p><w:pPr><w:tabs><w:tab w:val=\"left\" w:pos=\"720\"/></w:tabs></w:pPr>\
             <w:r><w:t>Rust</w:t><w:tab/><w:t>Go</w:t><w:br/><w:t>SQL</w:t></w:r></w:p>",
        );
        assert_eq!(extract_docx_text(&docx_bytes(&xml)).unwrap(), "Rust\tGo\nSQL");
    }

    #[test]
    fn test_table_paragraphs_are_skipped() {
        let xml = document(
            "<w:p><w:r><w:t>Summary</w:t></w:r></w:p>\
             <w:tbl><w:tr><w:tc><w:p><w:r><w:t>cell</w:t></w:r></w:p></w:tc></w:tr></w:tbl>\
             <w:p><w:r><w:t>Experience</w:t></w:r></w:p>",
        );
        assert_eq!(extract_docx_text(&docx_bytes(&xml)).unwrap(), "Summary\nExperience");
    }

    #[test]
    fn test_not_a_zip_is_archive_error() {
        assert!(matches!(
            extract_docx_text(b"PK not really"),
            Err(DocxError::Archive(_))
        ));
    }

    #[test]
    fn test_missing_document_xml() {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("word/styles.xml", zip::write::FileOptions::default())
            .unwrap();
        writer.write_all(b"<w:styles/>").unwrap();
        let bytes = writer.finish().unwrap().into_inner();

        assert!(matches!(
            extract_docx_text(&bytes),
            Err(DocxError::Archive(_))
        ));
    }
}
