//! DOCX text: the body paragraphs of `word/document.xml`, each ended by a
//! newline. Paragraphs inside tables, content controls and text boxes are
//! not part of the body and are skipped.

use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;
use zip::ZipArchive;

use super::ExtractionError;

const DOCUMENT_PART: &str = "word/document.xml";
// Inflated size cap for the document part.
const MAX_DOCUMENT_XML_BYTES: u64 = 64 * 1024 * 1024;

pub(super) fn extract_text(bytes: &[u8]) -> Result<String, ExtractionError> {
    extract_text_within(bytes, MAX_DOCUMENT_XML_BYTES)
}

fn extract_text_within(bytes: &[u8], max_xml_bytes: u64) -> Result<String, ExtractionError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| ExtractionError::CorruptFile(format!("unreadable DOCX container: {e}")))?;

    let part = archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| ExtractionError::CorruptFile(format!("missing {DOCUMENT_PART}: {e}")))?;
    let too_large = || {
        ExtractionError::CorruptFile(format!("{DOCUMENT_PART} inflates past {max_xml_bytes} bytes"))
    };
    // The declared size is only a hint; the bounded read below is what holds.
    if part.size() > max_xml_bytes {
        return Err(too_large());
    }

    let mut xml = String::new();
    part.take(max_xml_bytes + 1)
        .read_to_string(&mut xml)
        .map_err(|e| ExtractionError::CorruptFile(format!("unreadable {DOCUMENT_PART}: {e}")))?;
    if xml.len() as u64 > max_xml_bytes {
        return Err(too_large());
    }

    paragraphs_to_text(&xml)
}

fn paragraphs_to_text(xml: &str) -> Result<String, ExtractionError> {
    let mut reader = Reader::from_str(xml);
    let mut text = String::new();
    let mut paragraph = String::new();
    // Element nesting depth, and the depth of the children of `w:body`.
    let mut depth = 0usize;
    let mut body_children: Option<usize> = None;
    let mut in_body_paragraph = false;
    // Paragraphs nested inside the current body paragraph (text boxes).
    let mut nested_paragraphs = 0usize;
    let mut in_text_run = false;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| ExtractionError::CorruptFile(format!("bad document XML: {e}")))?;
        let collecting = in_body_paragraph && nested_paragraphs == 0;
        match event {
            Event::Start(e) => {
                match e.name().as_ref() {
                    b"w:body" => body_children = Some(depth + 1),
                    b"w:p" if body_children == Some(depth) => {
                        in_body_paragraph = true;
                        paragraph.clear();
                    }
                    b"w:p" if in_body_paragraph => nested_paragraphs += 1,
                    b"w:t" => in_text_run = true,
                    _ => {}
                }
                depth += 1;
            }
            Event::Empty(e) => match e.name().as_ref() {
                b"w:p" if body_children == Some(depth) => text.push('\n'),
                b"w:tab" if collecting => paragraph.push('\t'),
                b"w:br" | b"w:cr" if collecting => paragraph.push('\n'),
                _ => {}
            },
            Event::Text(e) if in_text_run && collecting => {
                let chunk = e
                    .unescape()
                    .map_err(|e| ExtractionError::CorruptFile(format!("bad document XML: {e}")))?;
                paragraph.push_str(&chunk);
            }
            Event::End(e) => {
                depth = depth.saturating_sub(1);
                match e.name().as_ref() {
                    b"w:t" => in_text_run = false,
                    b"w:p" if nested_paragraphs > 0 => nested_paragraphs -= 1,
                    b"w:p" if in_body_paragraph => {
                        in_body_paragraph = false;
                        text.push_str(&paragraph);
                        text.push('\n');
                        paragraph.clear();
                    }
                    b"w:body" => body_children = None,
                    _ => {}
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(text)
}
