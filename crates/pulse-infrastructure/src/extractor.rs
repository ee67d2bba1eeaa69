//! PowerPoint content extraction.
//!
//! A `.pptx` file is a ZIP archive of XML parts. Slide text lives in the
//! text runs (`a:t` elements) of `ppt/slides/slideN.xml`, speaker notes in
//! `ppt/notesSlides/notesSlideN.xml`, and embedded media under
//! `ppt/media/`.

use std::io::Read;
use std::path::Path;

use once_cell::sync::Lazy;
use quick_xml::events::Event;
use quick_xml::Reader;
use regex::Regex;
use serde_json::{json, Map, Value};
use zip::ZipArchive;

use pulse_core::error::{PulseError, Result};

static SLIDE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^ppt/slides/slide(\d+)\.xml$").unwrap());
static NOTES_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^ppt/notesSlides/notesSlide(\d+)\.xml$").unwrap());

const MEDIA_PREFIX: &str = "ppt/media/";

/// ZIP local-file-header signature; every `.pptx` starts with it.
const PPTX_MAGIC: [u8; 4] = [0x50, 0x4b, 0x03, 0x04];
/// OLE compound-document signature of the legacy binary `.ppt` format.
const LEGACY_PPT_MAGIC: [u8; 4] = [0xd0, 0xcf, 0x11, 0xe0];

/// Content pulled out of one deck.
#[derive(Debug, Clone, Default)]
pub struct DeckContent {
    /// Per-slide text, each entry prefixed with its slide number.
    pub slides: Vec<String>,
    /// Per-slide speaker notes, each entry prefixed with its slide number.
    pub notes: Vec<String>,
    /// File names of embedded media.
    pub media: Vec<String>,
}

impl DeckContent {
    /// Human-readable extraction summary for the given source name.
    pub fn summary(&self, source: &str) -> String {
        format!(
            "PowerPoint Extraction Summary\n{}\n\n\
             Source File: {}\n\
             Text Extractions: {} slides with text\n\
             Notes Extractions: {} slides with notes\n\
             Media Files: {} files extracted",
            "=".repeat(30),
            source,
            self.slides.len(),
            self.notes.len(),
            self.media.len(),
        )
    }

    /// Content map submitted as `ppt_content`.
    pub fn to_content_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("slides".to_string(), json!(self.slides));
        map.insert("notes".to_string(), json!(self.notes));
        map.insert("media".to_string(), json!(self.media));
        map
    }
}

/// Extracts slide text, notes, and media names from `.pptx` archives.
pub struct DeckExtractor;

impl DeckExtractor {
    /// Checks the file signature before anything touches the archive.
    ///
    /// The legacy binary format gets its own message so the user knows the
    /// fix is to re-save the deck, not to find a different file.
    pub fn validate_magic(bytes: &[u8]) -> Result<()> {
        if bytes.len() >= 4 && bytes[..4] == PPTX_MAGIC {
            return Ok(());
        }
        if bytes.len() >= 4 && bytes[..4] == LEGACY_PPT_MAGIC {
            return Err(PulseError::invalid_upload(
                "This appears to be an old format PowerPoint file (.ppt). \
                 Please save it as .pptx format and try again.",
            ));
        }
        Err(PulseError::invalid_upload("Not a valid PowerPoint file"))
    }

    /// Extracts the content of the deck at `path`.
    pub fn extract(path: &Path) -> Result<DeckContent> {
        let file = std::fs::File::open(path)?;
        let mut archive = ZipArchive::new(file)
            .map_err(|e| PulseError::invalid_upload(format!("Not a valid PowerPoint file: {e}")))?;

        let names: Vec<String> = archive.file_names().map(str::to_string).collect();

        let mut content = DeckContent::default();
        for (number, name) in numbered_parts(&names, &SLIDE_RE) {
            let text = text_runs(&read_part(&mut archive, &name)?);
            if !text.is_empty() {
                content.slides.push(format!("Slide {number}:\n{text}"));
            }
        }
        for (number, name) in numbered_parts(&names, &NOTES_RE) {
            let text = text_runs(&read_part(&mut archive, &name)?);
            if !text.is_empty() {
                content.notes.push(format!("Slide {number} Notes:\n{text}"));
            }
        }

        content.media = names
            .iter()
            .filter_map(|name| name.strip_prefix(MEDIA_PREFIX))
            .filter(|rest| !rest.is_empty() && !rest.contains('/'))
            .map(str::to_string)
            .collect();
        content.media.sort();

        tracing::debug!(
            slides = content.slides.len(),
            notes = content.notes.len(),
            media = content.media.len(),
            "Deck extraction finished"
        );
        Ok(content)
    }
}

/// Archive entries matching `pattern`, sorted by their captured number.
fn numbered_parts(names: &[String], pattern: &Regex) -> Vec<(u32, String)> {
    let mut parts: Vec<(u32, String)> = names
        .iter()
        .filter_map(|name| {
            let captures = pattern.captures(name)?;
            let number = captures[1].parse().ok()?;
            Some((number, name.clone()))
        })
        .collect();
    parts.sort_by_key(|(number, _)| *number);
    parts
}

fn read_part(archive: &mut ZipArchive<std::fs::File>, name: &str) -> Result<String> {
    let mut part = archive
        .by_name(name)
        .map_err(|e| PulseError::invalid_upload(format!("Corrupt archive entry '{name}': {e}")))?;
    let mut xml = String::new();
    part.read_to_string(&mut xml)?;
    Ok(xml)
}

/// Collects the text of every `t` element (any namespace prefix), one line
/// per run. Unparseable XML yields no text rather than an error, matching
/// the tolerant behavior expected of partially malformed parts.
fn text_runs(xml: &str) -> String {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut runs: Vec<String> = Vec::new();
    let mut buf = Vec::new();
    let mut in_text = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                if e.name().local_name().as_ref() == b"t" {
                    in_text = true;
                }
            }
            Ok(Event::Text(e)) => {
                if in_text
                    && let Ok(decoded) = e.decode()
                    && let Ok(text) = quick_xml::escape::unescape(&decoded)
                {
                    let trimmed = text.trim();
                    if !trimmed.is_empty() {
                        runs.push(trimmed.to_string());
                    }
                }
            }
            Ok(Event::End(ref e)) => {
                if e.name().local_name().as_ref() == b"t" {
                    in_text = false;
                }
            }
            Ok(Event::Eof) => break,
            Err(_) => return String::new(),
            _ => {}
        }
        buf.clear();
    }

    runs.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn slide_xml(texts: &[&str]) -> String {
        let runs: String = texts
            .iter()
            .map(|t| format!("<a:r><a:t>{t}</a:t></a:r>"))
            .collect();
        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
             <p:sld xmlns:a=\"http://schemas.openxmlformats.org/drawingml/2006/main\" \
                    xmlns:p=\"http://schemas.openxmlformats.org/presentationml/2006/main\">\
             <p:cSld><p:spTree><p:sp><p:txBody><a:p>{runs}</a:p></p:txBody></p:sp>\
             </p:spTree></p:cSld></p:sld>"
        )
    }

    fn write_deck(parts: &[(&str, String)]) -> tempfile::NamedTempFile {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, body) in parts {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .unwrap();
            writer.write_all(body.as_bytes()).unwrap();
        }
        let bytes = writer.finish().unwrap().into_inner();

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&bytes).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_extracts_slides_notes_and_media() {
        let deck = write_deck(&[
            ("ppt/slides/slide1.xml", slide_xml(&["Title", "Subtitle"])),
            ("ppt/slides/slide2.xml", slide_xml(&["Agenda"])),
            (
                "ppt/notesSlides/notesSlide1.xml",
                slide_xml(&["Remember to pause"]),
            ),
            ("ppt/media/image1.png", "not-really-a-png".to_string()),
        ]);

        let content = DeckExtractor::extract(deck.path()).unwrap();
        assert_eq!(content.slides.len(), 2);
        assert_eq!(content.slides[0], "Slide 1:\nTitle\nSubtitle");
        assert_eq!(content.slides[1], "Slide 2:\nAgenda");
        assert_eq!(content.notes, vec!["Slide 1 Notes:\nRemember to pause"]);
        assert_eq!(content.media, vec!["image1.png"]);
    }

    #[test]
    fn test_slides_sort_numerically() {
        let deck = write_deck(&[
            ("ppt/slides/slide10.xml", slide_xml(&["ten"])),
            ("ppt/slides/slide2.xml", slide_xml(&["two"])),
        ]);

        let content = DeckExtractor::extract(deck.path()).unwrap();
        assert_eq!(content.slides[0], "Slide 2:\ntwo");
        assert_eq!(content.slides[1], "Slide 10:\nten");
    }

    #[test]
    fn test_empty_slides_are_skipped() {
        let deck = write_deck(&[
            ("ppt/slides/slide1.xml", slide_xml(&[])),
            ("ppt/slides/slide2.xml", slide_xml(&["kept"])),
        ]);

        let content = DeckExtractor::extract(deck.path()).unwrap();
        assert_eq!(content.slides, vec!["Slide 2:\nkept"]);
    }

    #[test]
    fn test_summary_counts() {
        let content = DeckContent {
            slides: vec!["Slide 1:\na".to_string()],
            notes: vec![],
            media: vec!["a.png".to_string(), "b.png".to_string()],
        };
        let summary = content.summary("deck.pptx");
        assert!(summary.contains("Source File: deck.pptx"));
        assert!(summary.contains("Text Extractions: 1 slides with text"));
        assert!(summary.contains("Notes Extractions: 0 slides with notes"));
        assert!(summary.contains("Media Files: 2 files extracted"));
    }

    #[test]
    fn test_magic_validation() {
        assert!(DeckExtractor::validate_magic(b"PK\x03\x04rest").is_ok());

        let legacy = DeckExtractor::validate_magic(&[0xd0, 0xcf, 0x11, 0xe0, 0x00]);
        assert!(legacy
            .unwrap_err()
            .to_string()
            .contains("save it as .pptx"));

        assert!(DeckExtractor::validate_magic(b"GIF89a").is_err());
        assert!(DeckExtractor::validate_magic(b"PK").is_err());
    }

    #[test]
    fn test_non_zip_file_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"plain text, not an archive").unwrap();
        let err = DeckExtractor::extract(file.path()).unwrap_err();
        assert!(matches!(err, PulseError::InvalidUpload(_)));
    }
}
