use std::io::{Cursor, Read};

use anyhow::Context;
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::info;

use super::errors::CoreError;
use super::models::{FileType, ParsedResume, RawDocument};
use super::pdf::PdfTextExtractor;
use super::resume_parser::parse_document;

pub struct ResumeDocumentParser {
    pdf_text_extractor: PdfTextExtractor,
    max_file_size_bytes: u64,
}

impl ResumeDocumentParser {
    pub fn new(pdf_text_extractor: PdfTextExtractor, max_file_size_bytes: u64) -> Self {
        Self {
            pdf_text_extractor,
            max_file_size_bytes,
        }
    }

    /// Checks size and extension before any bytes are decoded.
    pub fn validate(&self, file_name: &str, size: u64) -> Result<FileType, CoreError> {
        if size > self.max_file_size_bytes {
            return Err(CoreError::FileTooLarge {
                size,
                limit: self.max_file_size_bytes,
            });
        }

        FileType::from_file_name(file_name)
            .ok_or_else(|| CoreError::UnsupportedFileType(file_name.to_string()))
    }

    pub fn decode(&self, file_name: &str, data: &[u8]) -> anyhow::Result<RawDocument> {
        let file_type = self.validate(file_name, data.len() as u64)?;

        let text = match file_type {
            FileType::Pdf => self.pdf_text_extractor.extract_text(data)?,
            FileType::Docx => extract_docx_text(data).context("DOCX parsing failed")?,
        };

        Ok(RawDocument {
            text,
            file_type,
            file_name: file_name.to_string(),
        })
    }

    pub fn parse_resume_bytes(&self, file_name: &str, data: &[u8]) -> anyhow::Result<ParsedResume> {
        let raw = self.decode(file_name, data)?;
        let parsed = parse_document(raw)?;

        info!(
            file_name,
            sections = parsed.sections.len(),
            skills = parsed.skills.len(),
            experience = parsed.experience.len(),
            "parsed resume"
        );

        Ok(parsed)
    }
}

/// One line per `w:p` paragraph. Empty paragraphs stay as blank lines because entry splitting
/// relies on them.
fn extract_docx_text(data: &[u8]) -> anyhow::Result<String> {
    let cursor = Cursor::new(data);
    let mut archive = zip::ZipArchive::new(cursor)?;

    let mut document_file = archive.by_name("word/document.xml")?;
    let mut xml = String::new();
    document_file.read_to_string(&mut xml)?;

    let mut reader = Reader::from_str(&xml);
    reader.config_mut().trim_text(false);

    let mut buf = Vec::new();
    let mut current = String::new();
    let mut lines: Vec<String> = Vec::new();
    let mut in_paragraph = false;
    let mut in_run = false;
    let mut in_text_run = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"w:p" => {
                    in_paragraph = true;
                    current.clear();
                }
                b"w:r" => in_run = true,
                b"w:t" => in_text_run = true,
                _ => {}
            },
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"w:p" => {
                    lines.push(current.trim_end().to_string());
                    current.clear();
                    in_paragraph = false;
                }
                b"w:r" => in_run = false,
                b"w:t" => in_text_run = false,
                _ => {}
            },
            // Tab stops under `w:pPr` are layout, not content; only run-level breaks count.
            Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"w:p" => lines.push(String::new()),
                b"w:tab" if in_paragraph && in_run => current.push('\t'),
                b"w:br" | b"w:cr" if in_paragraph && in_run => current.push('\n'),
                _ => {}
            },
            Ok(Event::Text(e)) => {
                if in_paragraph && in_text_run {
                    current.push_str(&e.xml_content()?);
                }
            }
            Ok(Event::GeneralRef(e)) => {
                if in_paragraph && in_text_run {
                    if let Some(ch) = e.resolve_char_ref()? {
                        current.push(ch);
                    } else if let Some(value) = resolve_predefined_entity(&e.decode()?) {
                        current.push_str(value);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(err) => return Err(err.into()),
            _ => {}
        }

        buf.clear();
    }

    Ok(lines.join("\n"))
}
