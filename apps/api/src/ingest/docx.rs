//! DOCX text extraction: reads `word/document.xml` out of the zip container.
//!
//! Output is one line per non-empty paragraph, in document order. A table row
//! becomes a single line with its non-empty cells joined by ` | `; rows of a
//! table nested inside a cell stay inside that cell, with their cells joined
//! by `, `. Paragraphs nested inside another paragraph (text boxes) follow the
//! enclosing paragraph on their own lines. `mc:Fallback` branches repeat the
//! preferred `mc:Choice` content and are skipped.

use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;

use super::IngestError;

const DOCUMENT_PART: &str = "word/document.xml";
/// Upper bound on the decompressed main document part.
const MAX_DOCUMENT_XML_BYTES: u64 = 32 * 1024 * 1024;
const CELL_SEPARATOR: &str = " | ";
const NESTED_CELL_SEPARATOR: &str = ", ";

pub fn extract(bytes: &[u8]) -> Result<String, IngestError> {
    let xml = read_document_xml(bytes)?;
    let text = paragraphs_from_xml(&xml)?.join("\n");

    if text.trim().is_empty() {
        return Err(IngestError::ExtractionFailed(
            "no text found in DOCX file".to_string(),
        ));
    }
    Ok(text)
}

fn read_document_xml(bytes: &[u8]) -> Result<String, IngestError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| IngestError::ExtractionFailed(format!("error reading DOCX: {e}")))?;
    let part = archive.by_name(DOCUMENT_PART).map_err(|_| {
        IngestError::ExtractionFailed(format!("DOCX is missing {DOCUMENT_PART}"))
    })?;

    let mut xml = String::new();
    part.take(MAX_DOCUMENT_XML_BYTES + 1)
        .read_to_string(&mut xml)
        .map_err(|e| IngestError::ExtractionFailed(format!("error reading DOCX: {e}")))?;

    if xml.len() as u64 > MAX_DOCUMENT_XML_BYTES {
        return Err(IngestError::SizeLimitExceeded {
            what: "decompressed DOCX document".to_string(),
            limit: MAX_DOCUMENT_XML_BYTES as usize,
            unit: "bytes",
        });
    }
    Ok(xml)
}

/// An open container in the document body.
#[derive(Debug)]
enum Frame {
    Paragraph {
        text: String,
        /// Lines of paragraphs nested inside this one.
        nested: Vec<String>,
    },
    Table {
        row: Vec<String>,
    },
    Cell {
        parts: Vec<String>,
    },
}

/// Sends a finished line to the innermost open container, or to the output.
fn emit(frames: &mut [Frame], lines: &mut Vec<String>, line: String) {
    match frames.last_mut() {
        Some(Frame::Paragraph { nested, .. }) => nested.push(line),
        Some(Frame::Cell { parts }) => parts.push(line),
        Some(Frame::Table { .. }) | None => lines.push(line),
    }
}

/// Pops frames until one matches `is_target`, returning it.
fn pop_to(frames: &mut Vec<Frame>, is_target: fn(&Frame) -> bool) -> Option<Frame> {
    if !frames.iter().any(is_target) {
        return None;
    }
    while let Some(frame) = frames.pop() {
        if is_target(&frame) {
            return Some(frame);
        }
    }
    None
}

fn current_paragraph(frames: &mut [Frame]) -> Option<&mut String> {
    frames.iter_mut().rev().find_map(|frame| match frame {
        Frame::Paragraph { text, .. } => Some(text),
        _ => None,
    })
}

fn current_row(frames: &mut [Frame]) -> Option<&mut Vec<String>> {
    frames.iter_mut().rev().find_map(|frame| match frame {
        Frame::Table { row } => Some(row),
        _ => None,
    })
}

fn malformed(reader: &Reader<&[u8]>, e: quick_xml::Error) -> IngestError {
    IngestError::ExtractionFailed(format!(
        "malformed DOCX XML at position {}: {e}",
        reader.buffer_position()
    ))
}

/// Walks WordprocessingML and collects paragraph and table-row lines.
fn paragraphs_from_xml(xml: &str) -> Result<Vec<String>, IngestError> {
    let mut reader = Reader::from_str(xml);

    let mut lines = Vec::new();
    let mut frames: Vec<Frame> = Vec::new();
    let mut run_depth = 0usize;
    let mut in_text = false;

    loop {
        let event = reader.read_event().map_err(|e| malformed(&reader, e))?;
        match event {
            Event::Start(e) => match e.name().as_ref() {
                b"w:p" => frames.push(Frame::Paragraph {
                    text: String::new(),
                    nested: Vec::new(),
                }),
                b"w:r" => run_depth += 1,
                b"w:t" => in_text = true,
                b"w:tbl" => frames.push(Frame::Table { row: Vec::new() }),
                b"w:tr" => {
                    if let Some(row) = current_row(&mut frames) {
                        row.clear();
                    }
                }
                b"w:tc" => frames.push(Frame::Cell { parts: Vec::new() }),
                b"mc:Fallback" => {
                    reader
                        .read_to_end(e.name())
                        .map_err(|err| malformed(&reader, err))?;
                }
                _ => {}
            },
            Event::Empty(e) if run_depth > 0 => match e.name().as_ref() {
                b"w:tab" => {
                    if let Some(text) = current_paragraph(&mut frames) {
                        text.push('\t');
                    }
                }
                b"w:br" | b"w:cr" => {
                    if let Some(text) = current_paragraph(&mut frames) {
                        text.push('\n');
                    }
                }
                _ => {}
            },
            Event::Text(t) if in_text => {
                let decoded = t.unescape().map_err(|e| malformed(&reader, e))?;
                if let Some(text) = current_paragraph(&mut frames) {
                    text.push_str(&decoded);
                }
            }
            Event::End(e) => match e.name().as_ref() {
                b"w:t" => in_text = false,
                b"w:r" => run_depth = run_depth.saturating_sub(1),
                b"w:p" => {
                    let popped = pop_to(&mut frames, |f| matches!(f, Frame::Paragraph { .. }));
                    if let Some(Frame::Paragraph { text, nested }) = popped {
                        let text = text.trim();
                        if !text.is_empty() {
                            emit(&mut frames, &mut lines, text.to_string());
                        }
                        for line in nested {
                            emit(&mut frames, &mut lines, line);
                        }
                    }
                }
                b"w:tc" => {
                    let popped = pop_to(&mut frames, |f| matches!(f, Frame::Cell { .. }));
                    if let Some(Frame::Cell { parts }) = popped {
                        let cell = parts.join(" ");
                        if let Some(row) = current_row(&mut frames) {
                            if !cell.is_empty() {
                                row.push(cell);
                            }
                        }
                    }
                }
                b"w:tr" => {
                    let depth = frames
                        .iter()
                        .filter(|f| matches!(f, Frame::Table { .. }))
                        .count();
                    let Some(table_at) = frames
                        .iter()
                        .rposition(|f| matches!(f, Frame::Table { .. }))
                    else {
                        continue;
                    };
                    let (outer, table) = frames.split_at_mut(table_at);
                    if let Frame::Table { row } = &mut table[0] {
                        if !row.is_empty() {
                            let separator = if depth > 1 {
                                NESTED_CELL_SEPARATOR
                            } else {
                                CELL_SEPARATOR
                            };
                            let line = std::mem::take(row).join(separator);
                            emit(outer, &mut lines, line);
                        }
                    }
                }
                b"w:tbl" => {
                    pop_to(&mut frames, |f| matches!(f, Frame::Table { .. }));
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(lines)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use std::io::Write;

    /// Wraps a WordprocessingML body in a minimal DOCX zip container.
    pub fn build_docx(body: &str) -> Vec<u8> {
        let xml = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}</w:body></w:document>"#
        );
        let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
        writer
            .start_file("word/document.xml", zip::write::SimpleFileOptions::default())
            .expect("start docx part");
        writer.write_all(xml.as_bytes()).expect("write docx part");
        writer.finish().expect("finish docx").into_inner()
    }

    pub fn paragraph(text: &str) -> String {
        format!("<w:p><w:r><w:t>{text}</w:t></w:r></w:p>")
    }
}
