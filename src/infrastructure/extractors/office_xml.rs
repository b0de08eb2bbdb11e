use super::TextExtractor;
use crate::domain::document::{DocumentFormat, ExtractedText, ExtractionError};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::io::{Cursor, Read};
use zip::ZipArchive;

type Archive<'a> = ZipArchive<Cursor<&'a [u8]>>;

fn open_archive<'a>(format: &str, bytes: &'a [u8]) -> Result<Archive<'a>, ExtractionError> {
    ZipArchive::new(Cursor::new(bytes)).map_err(|e| ExtractionError::failed(format, e))
}

fn read_entry(archive: &mut Archive<'_>, name: &str) -> Result<String, String> {
    let mut entry = archive.by_name(name).map_err(|e| format!("{}: {}", name, e))?;
    let mut xml = String::new();
    entry
        .read_to_string(&mut xml)
        .map_err(|e| format!("{}: {}", name, e))?;
    Ok(xml)
}

/// Element local names that carry text structure in one XML dialect
struct Vocabulary {
    paragraphs: &'static [&'static [u8]],
    /// When set, only character data inside these elements is text
    runs: Option<&'static [&'static [u8]]>,
    tabs: &'static [&'static [u8]],
    breaks: &'static [&'static [u8]],
    /// Element standing for `c` spaces
    spaces: Option<&'static [u8]>,
}

const TEXT_RUNS: &[&[u8]] = &[b"t"];

/// WordprocessingML (`w:p`, `w:t`)
const WORDPROCESSING: Vocabulary = Vocabulary {
    paragraphs: &[b"p"],
    runs: Some(TEXT_RUNS),
    tabs: &[b"tab"],
    breaks: &[b"br", b"cr"],
    spaces: None,
};

/// DrawingML text bodies inside slides (`a:p`, `a:t`)
const DRAWING: Vocabulary = Vocabulary {
    paragraphs: &[b"p"],
    runs: Some(TEXT_RUNS),
    tabs: &[],
    breaks: &[b"br"],
    spaces: None,
};

/// OpenDocument (`text:p`, `text:h`)
const OPEN_DOCUMENT: Vocabulary = Vocabulary {
    paragraphs: &[b"p", b"h"],
    runs: None,
    tabs: &[b"tab"],
    breaks: &[b"line-break"],
    spaces: Some(b"s".as_slice()),
};

fn contains(names: &[&[u8]], name: &[u8]) -> bool {
    names.iter().any(|candidate| *candidate == name)
}

impl Vocabulary {
    fn is_paragraph(&self, name: &[u8]) -> bool {
        contains(self.paragraphs, name)
    }

    fn is_run(&self, name: &[u8]) -> bool {
        self.runs.is_some_and(|runs| contains(runs, name))
    }

    /// Whitespace an element stands for, if any
    fn write_marker(&self, element: &BytesStart<'_>, out: &mut String) {
        let local = element.local_name();
        let name = local.as_ref();

        if contains(self.tabs, name) {
            out.push('\t');
        } else if contains(self.breaks, name) {
            out.push('\n');
        } else if self.spaces == Some(name) {
            let count = element
                .attributes()
                .flatten()
                .find(|attr| attr.key.local_name().as_ref() == b"c")
                .and_then(|attr| std::str::from_utf8(&attr.value).ok()?.parse::<usize>().ok())
                .unwrap_or(1);
            out.extend(std::iter::repeat(' ').take(count));
        }
    }
}

/// Collect the non-empty paragraphs of an XML part
fn paragraphs(xml: &str, vocabulary: &Vocabulary) -> Result<Vec<String>, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut paragraph_depth = 0usize;
    let mut run_depth = 0usize;

    let mut flush = |current: &mut String| {
        let text = current.trim();
        if !text.is_empty() {
            paragraphs.push(text.to_string());
        }
        current.clear();
    };

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let local = e.local_name();
                if vocabulary.is_paragraph(local.as_ref()) {
                    paragraph_depth += 1;
                } else if vocabulary.is_run(local.as_ref()) {
                    run_depth += 1;
                } else if paragraph_depth > 0 {
                    vocabulary.write_marker(&e, &mut current);
                }
            }
            Event::Empty(e) => {
                if paragraph_depth > 0 {
                    vocabulary.write_marker(&e, &mut current);
                }
            }
            Event::End(e) => {
                let local = e.local_name();
                if vocabulary.is_paragraph(local.as_ref()) {
                    paragraph_depth = paragraph_depth.saturating_sub(1);
                    flush(&mut current);
                } else if vocabulary.is_run(local.as_ref()) {
                    run_depth = run_depth.saturating_sub(1);
                }
            }
            Event::Text(e) => {
                let in_text = match vocabulary.runs {
                    Some(_) => run_depth > 0,
                    None => paragraph_depth > 0,
                };
                if in_text {
                    current.push_str(&e.unescape()?);
                }
            }
            Event::CData(e) => {
                if paragraph_depth > 0 {
                    current.push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    flush(&mut current);
    Ok(paragraphs)
}

/// Word documents: paragraphs of `word/document.xml`
pub struct DocxExtractor;

impl TextExtractor for DocxExtractor {
    fn formats(&self) -> &'static [DocumentFormat] {
        &[DocumentFormat::Docx]
    }

    fn extract(&self, bytes: &[u8]) -> Result<ExtractedText, ExtractionError> {
        let mut archive = open_archive("docx", bytes)?;
        let xml = read_entry(&mut archive, "word/document.xml")
            .map_err(|e| ExtractionError::failed("docx", e))?;
        let paragraphs =
            paragraphs(&xml, &WORDPROCESSING).map_err(|e| ExtractionError::failed("docx", e))?;

        ExtractedText::new(paragraphs.join("\n\n"), 0)
    }
}

/// OpenDocument text and presentations: paragraphs and headings of `content.xml`
pub struct OpenDocumentExtractor;

impl TextExtractor for OpenDocumentExtractor {
    fn formats(&self) -> &'static [DocumentFormat] {
        &[
            DocumentFormat::OpenDocumentText,
            DocumentFormat::OpenDocumentPresentation,
        ]
    }

    fn extract(&self, bytes: &[u8]) -> Result<ExtractedText, ExtractionError> {
        let mut archive = open_archive("opendocument", bytes)?;
        let xml = read_entry(&mut archive, "content.xml")
            .map_err(|e| ExtractionError::failed("opendocument", e))?;
        let paragraphs = paragraphs(&xml, &OPEN_DOCUMENT)
            .map_err(|e| ExtractionError::failed("opendocument", e))?;

        ExtractedText::new(paragraphs.join("\n\n"), 0)
    }
}

fn slide_number(name: &str) -> Option<u32> {
    name.strip_prefix("ppt/slides/slide")?
        .strip_suffix(".xml")?
        .parse()
        .ok()
}

/// PowerPoint decks: shape text of every slide, in slide order
pub struct PptxExtractor;

impl TextExtractor for PptxExtractor {
    fn formats(&self) -> &'static [DocumentFormat] {
        &[DocumentFormat::Pptx]
    }

    fn extract(&self, bytes: &[u8]) -> Result<ExtractedText, ExtractionError> {
        let mut archive = open_archive("pptx", bytes)?;

        let mut slides: Vec<(u32, String)> = archive
            .file_names()
            .filter_map(|name| slide_number(name).map(|number| (number, name.to_string())))
            .collect();
        slides.sort();

        if slides.is_empty() {
            return Err(ExtractionError::failed("pptx", "presentation has no slides"));
        }

        let mut texts = Vec::with_capacity(slides.len());
        let mut failures = 0;
        let mut degraded = 0;

        for (number, name) in &slides {
            let parsed = read_entry(&mut archive, name)
                .and_then(|xml| paragraphs(&xml, &DRAWING).map_err(|e| e.to_string()));

            match parsed {
                Ok(lines) if lines.is_empty() => degraded += 1,
                Ok(lines) => texts.push(lines.join("\n")),
                Err(e) => {
                    tracing::warn!(slide = number, error = %e, "Skipping unreadable slide");
                    failures += 1;
                    degraded += 1;
                }
            }
        }

        if texts.is_empty() && failures > 0 {
            return Err(ExtractionError::failed(
                "pptx",
                format!("none of the {} slides could be read", slides.len()),
            ));
        }

        ExtractedText::new(texts.join("\n\n"), degraded)
    }
}
