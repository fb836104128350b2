use crate::config::Limits;
use crate::error::CevError;
use crate::extraction::{BBox, Document, PageLayout, PdfBackend, TextLine, Word};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::fs::File;
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// PDF extraction backend using pdftotext (from poppler-utils).
///
/// Uses `pdftotext -bbox-layout` to get every word with its bounding box,
/// grouped into the visual lines poppler detects.
pub struct PdftotextBackend;

impl PdftotextBackend {
    pub fn new() -> Self {
        PdftotextBackend
    }

    /// Check if pdftotext is available on the system.
    pub fn is_available() -> bool {
        Command::new("pdftotext")
            .arg("-v")
            .output()
            .map(|o| o.status.success() || !o.stderr.is_empty())
            .unwrap_or(false)
    }
}

impl Default for PdftotextBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfBackend for PdftotextBackend {
    fn extract_document(&self, pdf_bytes: &[u8], limits: &Limits) -> Result<Document, CevError> {
        let dir = tempfile::tempdir().map_err(|e| CevError::Extraction(e.to_string()))?;
        let pdf_path = dir.path().join("input.pdf");
        let layout_path = dir.path().join("layout.html");
        let stderr_path = dir.path().join("stderr.txt");
        std::fs::write(&pdf_path, pdf_bytes).map_err(|e| CevError::Extraction(e.to_string()))?;

        // One page past the ceiling is enough to tell that the ceiling was hit.
        let last_page = limits.max_pages + 1;
        let mut child = Command::new("pdftotext")
            .arg("-bbox-layout")
            .arg("-l")
            .arg(last_page.to_string())
            .arg(&pdf_path)
            .arg(&layout_path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(File::create(&stderr_path)?)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    CevError::PdftotextNotFound
                } else {
                    CevError::Extraction(format!("pdftotext failed: {}", e))
                }
            })?;

        let status = wait_with_deadline(&mut child, limits.timeout())?;
        if !status.success() {
            let code = status.code().unwrap_or(-1);
            let stderr = read_lossy(&stderr_path).trim().to_string();
            return Err(CevError::PdftotextFailed { code, stderr });
        }

        let xml = read_lossy(&layout_path);
        parse_bbox_xml(&xml)
    }

    fn backend_name(&self) -> &str {
        "pdftotext"
    }
}

fn wait_with_deadline(child: &mut Child, timeout: Duration) -> Result<ExitStatus, CevError> {
    let started = Instant::now();
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(status);
        }
        if started.elapsed() >= timeout {
            // Already exited or unkillable; either way the result is discarded.
            let _ = child.kill();
            let _ = child.wait();
            return Err(CevError::ResourceLimit(format!(
                "pdftotext did not finish within {:.1}s",
                timeout.as_secs_f64()
            )));
        }
        std::thread::sleep(POLL_INTERVAL);
    }
}

fn read_lossy(path: &Path) -> String {
    std::fs::read(path)
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        .unwrap_or_default()
}

/// Parse the XHTML written by `pdftotext -bbox-layout`.
///
/// Only `<page>`, `<line>` and `<word>` matter; flows and blocks are
/// flattened away. Lines without any words are dropped.
fn parse_bbox_xml(xml: &str) -> Result<Document, CevError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut pages: Vec<PageLayout> = Vec::new();
    let mut current_page: Option<PageLayout> = None;
    let mut current_line: Option<TextLine> = None;
    let mut current_word: Option<BBox> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"page" => current_page = Some(page_from_tag(&e, pages.len() + 1)?),
                b"line" => current_line = Some(TextLine::default()),
                b"word" => current_word = Some(bbox_from_tag(&e)?),
                _ => {}
            },
            Ok(Event::Empty(e)) if e.name().as_ref() == b"page" => {
                pages.push(page_from_tag(&e, pages.len() + 1)?);
            }
            Ok(Event::Text(t)) => {
                if let (Some(bbox), Some(line)) = (current_word.take(), current_line.as_mut()) {
                    let text = t
                        .unescape()
                        .map_err(|e| CevError::Extraction(format!("bad word text: {}", e)))?;
                    let text = text.trim();
                    if !text.is_empty() {
                        line.words.push(Word {
                            text: text.to_string(),
                            bbox,
                        });
                    }
                }
            }
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"word" => current_word = None,
                b"line" => {
                    if let (Some(line), Some(page)) = (current_line.take(), current_page.as_mut()) {
                        if !line.words.is_empty() {
                            page.lines.push(line);
                        }
                    }
                }
                b"page" => {
                    if let Some(page) = current_page.take() {
                        pages.push(page);
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(CevError::Extraction(format!(
                    "malformed pdftotext layout at byte {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
            _ => {}
        }
    }

    Ok(Document::new(pages))
}

fn page_from_tag(tag: &BytesStart<'_>, page_number: usize) -> Result<PageLayout, CevError> {
    Ok(PageLayout {
        page_number,
        width: attr_f32(tag, "width")?,
        height: attr_f32(tag, "height")?,
        lines: Vec::new(),
    })
}

fn bbox_from_tag(tag: &BytesStart<'_>) -> Result<BBox, CevError> {
    Ok(BBox {
        x_min: attr_f32(tag, "xMin")?,
        y_min: attr_f32(tag, "yMin")?,
        x_max: attr_f32(tag, "xMax")?,
        y_max: attr_f32(tag, "yMax")?,
    })
}

fn attr_f32(tag: &BytesStart<'_>, name: &str) -> Result<f32, CevError> {
    let attr = tag
        .try_get_attribute(name)
        .map_err(|e| CevError::Extraction(e.to_string()))?
        .ok_or_else(|| CevError::Extraction(format!("missing attribute '{}'", name)))?;
    let value = attr
        .unescape_value()
        .map_err(|e| CevError::Extraction(e.to_string()))?;
    value
        .trim()
        .parse()
        .map_err(|_| CevError::Extraction(format!("attribute '{}' is not a number: {}", name, value)))
}
