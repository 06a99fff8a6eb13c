//! Additional information addendum rendering
//! Author: kartik4091
//! Created: 2025-06-08

use std::path::{Path, PathBuf};

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream, StringFormat};
use tracing::{debug, info, instrument};

use crate::error::{Error, Result};

pub const HEADING: &str = "Additional complaint information";

/// US Letter, in points
pub const PAGE_WIDTH: f32 = 612.0;
pub const PAGE_HEIGHT: f32 = 792.0;
const MARGIN: f32 = 72.0;
const HEADING_SIZE: f32 = 16.0;
const BODY_SIZE: f32 = 11.0;
const LEADING: f32 = 14.0;
const HEADING_GAP: f32 = 28.0;
/// Average Helvetica advance as a fraction of the font size
const CHAR_WIDTH: f32 = 0.55;

/// Turns addendum text into a document at `output`
pub trait AddendumRenderer: Send + Sync {
    fn render(&self, text: &str, output: &Path) -> Result<()>;
}

/// Renders `text` when there is any; blank or missing text produces no artifact
pub fn render_addendum(
    renderer: &dyn AddendumRenderer,
    text: Option<&str>,
    output: &Path,
) -> Result<Option<PathBuf>> {
    match text.filter(|t| !t.trim().is_empty()) {
        Some(text) => {
            renderer.render(text, output)?;
            Ok(Some(output.to_path_buf()))
        }
        None => {
            debug!("No additional information, skipping addendum");
            Ok(None)
        }
    }
}

/// Lays text out with the standard Helvetica fonts, no external tools involved
#[derive(Debug, Clone, Copy, Default)]
pub struct TextLayoutRenderer;

impl TextLayoutRenderer {
    pub fn new() -> Self {
        Self
    }

    fn build(&self, text: &str) -> Result<Document> {
        let lines = layout_lines(text, max_chars_per_line());
        let first_page = lines_per_page(true);
        let other_pages = lines_per_page(false);

        let mut chunks: Vec<&[String]> = Vec::new();
        let (head, mut rest) = lines.split_at(lines.len().min(first_page));
        chunks.push(head);
        while !rest.is_empty() {
            let (chunk, tail) = rest.split_at(rest.len().min(other_pages));
            chunks.push(chunk);
            rest = tail;
        }

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let regular = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let bold = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica-Bold",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => regular,
                "F2" => bold,
            },
        });

        let mut kids: Vec<Object> = Vec::with_capacity(chunks.len());
        for (index, chunk) in chunks.iter().enumerate() {
            let content = Content {
                operations: page_operations(index == 0, chunk),
            };
            let encoded = content
                .encode()
                .map_err(|e| Error::RenderError(e.to_string()))?;
            let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
            let page_id = add_page(&mut doc, pages_id, resources_id, content_id);
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.compress();
        Ok(doc)
    }
}

impl AddendumRenderer for TextLayoutRenderer {
    #[instrument(skip(self, text), fields(chars = text.len()))]
    fn render(&self, text: &str, output: &Path) -> Result<()> {
        let mut doc = self.build(text)?;
        doc.save(output)
            .map_err(|e| Error::RenderError(format!("{}: {e}", output.display())))?;
        info!("Rendered addendum to {}", output.display());
        Ok(())
    }
}

fn add_page(doc: &mut Document, pages_id: ObjectId, resources_id: ObjectId, content_id: ObjectId) -> ObjectId {
    doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Resources" => resources_id,
        "MediaBox" => vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(PAGE_WIDTH),
            Object::Real(PAGE_HEIGHT),
        ],
        "Contents" => content_id,
    })
}

fn page_operations(with_heading: bool, lines: &[String]) -> Vec<Operation> {
    let top = PAGE_HEIGHT - MARGIN;
    let mut ops = vec![Operation::new("BT", vec![])];

    if with_heading {
        ops.push(Operation::new("Tf", vec!["F2".into(), HEADING_SIZE.into()]));
        ops.push(Operation::new("Td", vec![MARGIN.into(), (top - HEADING_SIZE).into()]));
        ops.push(show(HEADING));
        ops.push(Operation::new("Td", vec![Object::Integer(0), (-HEADING_GAP).into()]));
    } else {
        ops.push(Operation::new("Td", vec![MARGIN.into(), (top - BODY_SIZE).into()]));
    }

    ops.push(Operation::new("Tf", vec!["F1".into(), BODY_SIZE.into()]));
    ops.push(Operation::new("TL", vec![LEADING.into()]));
    for line in lines {
        if !line.is_empty() {
            ops.push(show(line));
        }
        ops.push(Operation::new("T*", vec![]));
    }
    ops.push(Operation::new("ET", vec![]));
    ops
}

fn show(text: &str) -> Operation {
    Operation::new(
        "Tj",
        vec![Object::String(encode_win_ansi(text), StringFormat::Literal)],
    )
}

fn max_chars_per_line() -> usize {
    ((PAGE_WIDTH - 2.0 * MARGIN) / (BODY_SIZE * CHAR_WIDTH)) as usize
}

fn lines_per_page(with_heading: bool) -> usize {
    let mut usable = PAGE_HEIGHT - 2.0 * MARGIN;
    if with_heading {
        usable -= HEADING_SIZE + HEADING_GAP;
    }
    (usable / LEADING).max(1.0) as usize
}

/// Splits text on newlines (each one becomes an explicit line break) and wraps
/// lines longer than `max_chars` at word boundaries
pub fn layout_lines(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
    let mut lines = Vec::new();

    for raw in normalized.split('\n') {
        let raw = raw.replace('\t', "    ");
        if raw.trim().is_empty() {
            lines.push(String::new());
            continue;
        }

        let mut current = String::new();
        for word in raw.split_whitespace() {
            let mut word = word;
            while word.chars().count() > max_chars {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                let split = word
                    .char_indices()
                    .nth(max_chars)
                    .map(|(i, _)| i)
                    .unwrap_or(word.len());
                lines.push(word[..split].to_string());
                word = &word[split..];
            }
            if word.is_empty() {
                continue;
            }
            let needed = current.chars().count() + word.chars().count() + usize::from(!current.is_empty());
            if needed > max_chars && !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
        }
        if !current.is_empty() {
            lines.push(current);
        }
    }

    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines
}

/// Encodes text for the standard fonts' WinAnsi encoding; anything else becomes `?`
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\u{20}'..='\u{7e}' | '\u{a0}'..='\u{ff}' => c as u8,
            '\u{20ac}' => 0x80,
            '\u{2026}' => 0x85,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201c}' => 0x93,
            '\u{201d}' => 0x94,
            '\u{2022}' => 0x95,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            _ => b'?',
        })
        .collect()
}
