//! Document Text Extractor — turns an uploaded binary into raw text.
//!
//! Format is decided once from the filename suffix (case-insensitive):
//! - `.pdf`         → page-by-page text, concatenated with no separator
//! - `.docx`/`.doc` → body paragraphs, each followed by `\n`
//! - `.txt`         → the bytes decoded as UTF-8
//!
//! Either the whole document text comes back or an error does. There is no
//! empty-string fallback.

use std::io::{Read, Seek};
use std::panic;

use quick_xml::events::Event;
use quick_xml::Reader;
use serde::{Deserialize, Serialize};
use zip::ZipArchive;

use crate::analysis::error::AnalysisError;

const DOCX_BODY_PART: &str = "word/document.xml";

/// The four upload formats the analyzer understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Pdf,
    Docx,
    Doc,
    Txt,
}

impl DocumentFormat {
    pub const ALL: [DocumentFormat; 4] = [
        DocumentFormat::Pdf,
        DocumentFormat::Docx,
        DocumentFormat::Doc,
        DocumentFormat::Txt,
    ];

    /// Resolves the format from a declared filename. Fails before any byte
    /// of the document is looked at.
    pub fn from_filename(filename: &str) -> Result<Self, AnalysisError> {
        let lower = filename.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|f| lower.ends_with(&format!(".{}", f.extension())))
            .ok_or_else(|| AnalysisError::UnsupportedFormat {
                filename: filename.to_string(),
            })
    }

    pub fn extension(&self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "pdf",
            DocumentFormat::Docx => "docx",
            DocumentFormat::Doc => "doc",
            DocumentFormat::Txt => "txt",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "PDF",
            DocumentFormat::Docx => "DOCX",
            DocumentFormat::Doc => "DOC",
            DocumentFormat::Txt => "TXT",
        }
    }
}

/// Raw text of one uploaded document. Owned by a single analysis call.
#[derive(Debug, Clone)]
pub struct ExtractedDocument {
    pub raw_text: String,
    pub source_format: DocumentFormat,
}

/// Extracts the full text of `reader`, dispatching on `filename`.
///
/// The reader is rewound before reading, so a handle that was already
/// consumed upstream (e.g. by a size check) still yields the whole document.
pub fn extract_document<R: Read + Seek>(
    reader: &mut R,
    filename: &str,
) -> Result<ExtractedDocument, AnalysisError> {
    let format = DocumentFormat::from_filename(filename)?;

    reader
        .rewind()
        .map_err(|e| AnalysisError::extraction(format.label(), e))?;

    let raw_text = match format {
        DocumentFormat::Pdf => extract_pdf(reader)?,
        DocumentFormat::Docx | DocumentFormat::Doc => extract_docx(reader, format.label())?,
        DocumentFormat::Txt => extract_txt(reader)?,
    };

    Ok(ExtractedDocument {
        raw_text,
        source_format: format,
    })
}

fn read_all<R: Read>(reader: &mut R, label: &'static str) -> Result<Vec<u8>, AnalysisError> {
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .map_err(|e| AnalysisError::extraction(label, e))?;
    Ok(bytes)
}

fn extract_pdf<R: Read>(reader: &mut R) -> Result<String, AnalysisError> {
    let bytes = read_all(reader, "PDF")?;

    // pdf-extract panics on some malformed inputs instead of returning Err.
    let pages = panic::catch_unwind(|| pdf_extract::extract_text_from_mem_by_pages(&bytes))
        .map_err(|_| AnalysisError::extraction("PDF", "document structure could not be parsed"))?
        .map_err(|e| AnalysisError::extraction("PDF", e))?;

    Ok(pages.concat())
}

fn extract_docx<R: Read + Seek>(
    reader: &mut R,
    label: &'static str,
) -> Result<String, AnalysisError> {
    let mut archive = ZipArchive::new(reader).map_err(|e| AnalysisError::extraction(label, e))?;

    let mut xml = String::new();
    let mut body = archive
        .by_name(DOCX_BODY_PART)
        .map_err(|e| AnalysisError::extraction(label, format!("{DOCX_BODY_PART}: {e}")))?;
    body.read_to_string(&mut xml)
        .map_err(|e| AnalysisError::extraction(label, e))?;

    body_paragraph_text(&xml).map_err(|e| AnalysisError::extraction(label, e))
}

fn extract_txt<R: Read>(reader: &mut R) -> Result<String, AnalysisError> {
    let bytes = read_all(reader, "TXT")?;
    String::from_utf8(bytes).map_err(|e| AnalysisError::extraction("TXT", e.utf8_error()))
}

/// Collects the text of every paragraph that is a direct child of
/// `<w:body>`, in document order, one `\n` after each.
///
/// Paragraphs inside tables and text boxes are not body paragraphs and are
/// skipped. Within a paragraph only run content counts: `<w:t>` text,
/// `<w:tab/>` as `\t`, `<w:br/>`/`<w:cr/>` as `\n`.
fn body_paragraph_text(xml: &str) -> Result<String, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    let mut path: Vec<Vec<u8>> = Vec::new();
    let mut text = String::new();
    let mut paragraph: Option<String> = None;
    let mut nested_paragraphs = 0usize;
    let mut in_run_text = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let name = e.name().as_ref().to_vec();
                match name.as_slice() {
                    b"w:p" if paragraph.is_some() => nested_paragraphs += 1,
                    b"w:p" if parent_is(&path, b"w:body") => paragraph = Some(String::new()),
                    b"w:t" => {
                        in_run_text =
                            paragraph.is_some() && nested_paragraphs == 0 && parent_is(&path, b"w:r")
                    }
                    _ => {}
                }
                path.push(name);
            }
            Event::Empty(e) => {
                let name = e.name();
                if name.as_ref() == b"w:p" && paragraph.is_none() && parent_is(&path, b"w:body") {
                    text.push('\n');
                } else if nested_paragraphs == 0 && parent_is(&path, b"w:r") {
                    if let Some(para) = paragraph.as_mut() {
                        match name.as_ref() {
                            b"w:tab" => para.push('\t'),
                            b"w:br" | b"w:cr" => para.push('\n'),
                            _ => {}
                        }
                    }
                }
            }
            Event::Text(t) if in_run_text => {
                if let Some(para) = paragraph.as_mut() {
                    para.push_str(&t.unescape()?);
                }
            }
            Event::End(e) => {
                path.pop();
                match e.name().as_ref() {
                    b"w:t" => in_run_text = false,
                    b"w:p" if nested_paragraphs > 0 => nested_paragraphs -= 1,
                    b"w:p" => {
                        if let Some(para) = paragraph.take() {
                            text.push_str(&para);
                            text.push('\n');
                        }
                    }
                    _ => {}
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(text)
}

fn parent_is(path: &[Vec<u8>], name: &[u8]) -> bool {
    path.last().map(|p| p.as_slice() == name).unwrap_or(false)
}
