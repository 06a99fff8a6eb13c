//! Content Cleaner Implementation
//! Author: kartik4091
//! Created: 2025-06-03 09:06:55 UTC
//!
//! Rewrites the string operands of text-showing operators in page content streams
//! and Form XObjects. Producers routinely split one word over several strings (the
//! elements of a kerned `TJ` array, or back-to-back `Tj`s), so tokens are matched
//! on the joined text of each run and the edit is spread back over the pieces.
//! Strings are matched on their raw bytes, so text drawn with composite (CID)
//! fonts is not visible to the pattern.

use std::collections::{BTreeMap, BTreeSet};
use std::ops::Range;

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId};
use tracing::{debug, info, instrument};

use super::pattern::TokenPattern;

/// Operators that continue the current text line
const SHOW_OPERATORS: [&str; 2] = ["Tj", "TJ"];

/// Operators that move to the next line before showing their string
const NEXT_LINE_OPERATORS: [&str; 2] = ["'", "\""];

/// A `TJ` adjustment at least this far to the right (thousandths of an em) reads
/// as a word space
const WORD_GAP: f32 = 200.0;

/// Position of one shown string within a decoded content stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Segment {
    op: usize,
    operand: usize,
    element: Option<usize>,
}

/// One piece of a text run
#[derive(Debug, Clone, Copy)]
enum Piece {
    Text(Segment),
    Gap,
}

/// Replaces sensitive tokens in visible text
pub struct ContentCleaner<'a> {
    pattern: &'a TokenPattern,
}

impl<'a> ContentCleaner<'a> {
    /// Creates a new instance
    pub fn new(pattern: &'a TokenPattern) -> Self {
        Self { pattern }
    }

    /// Redacts every content stream of `doc`, returning the number of tokens replaced
    #[instrument(skip(self, doc))]
    pub fn clean(&self, doc: &mut Document) -> Result<usize, String> {
        if self.pattern.is_empty() {
            return Ok(0);
        }

        let mut total = 0;
        for id in content_stream_ids(doc) {
            let Ok(stream) = doc.get_object_mut(id).and_then(Object::as_stream_mut) else {
                continue;
            };
            let data = if stream.dict.has(b"Filter") {
                stream
                    .decompressed_content()
                    .map_err(|e| format!("stream {id:?}: {e}"))?
            } else {
                stream.content.clone()
            };

            if let Some((rewritten, count)) = self.clean_content(&data)? {
                debug!("Redacted {} tokens in stream {:?}", count, id);
                stream.set_plain_content(rewritten);
                total += count;
            }
        }

        info!("ContentCleaner: Total redacted tokens: {}", total);
        Ok(total)
    }

    /// Redacts one decoded content stream. `None` when nothing matched, leaving the
    /// stream byte-for-byte as it was.
    pub fn clean_content(&self, data: &[u8]) -> Result<Option<(Vec<u8>, usize)>, String> {
        let mut content = Content::decode(data).map_err(|e| e.to_string())?;
        let mut count = 0;

        for run in text_runs(&content.operations) {
            count += self.redact_run(&mut content.operations, &run);
        }

        if count == 0 {
            return Ok(None);
        }
        let encoded = content.encode().map_err(|e| e.to_string())?;
        Ok(Some((encoded, count)))
    }

    /// Matches over the joined text of `run`. The marker goes into the first string
    /// a token touches; the token's bytes in later strings are cut.
    fn redact_run(&self, operations: &mut [Operation], run: &[Piece]) -> usize {
        let mut joined = Vec::new();
        let mut spans: Vec<(Segment, Range<usize>)> = Vec::new();
        for piece in run {
            match piece {
                Piece::Text(segment) => {
                    let Some(bytes) = shown_string(operations, *segment) else {
                        continue;
                    };
                    let start = joined.len();
                    joined.extend_from_slice(bytes);
                    spans.push((*segment, start..joined.len()));
                }
                Piece::Gap => joined.push(b' '),
            }
        }

        let tokens = self.pattern.find_tokens(&joined);
        if tokens.is_empty() {
            return 0;
        }

        let mut edits: BTreeMap<Segment, Vec<(Range<usize>, bool)>> = BTreeMap::new();
        for token in &tokens {
            let mut first = true;
            for (segment, span) in &spans {
                let start = token.start.max(span.start);
                let end = token.end.min(span.end);
                if start >= end {
                    continue;
                }
                edits
                    .entry(*segment)
                    .or_default()
                    .push((start - span.start..end - span.start, first));
                first = false;
            }
        }

        for (segment, mut ranges) in edits {
            let Some(bytes) = shown_string_mut(operations, segment) else {
                continue;
            };
            ranges.sort_by(|a, b| b.0.start.cmp(&a.0.start));
            for (range, with_marker) in ranges {
                let replacement: &[u8] = if with_marker {
                    self.pattern.marker()
                } else {
                    &[]
                };
                bytes.splice(range, replacement.iter().copied());
            }
        }
        tokens.len()
    }
}

/// Groups shown strings into runs of text that render contiguously: the strings
/// of `Tj`/`TJ` operators with nothing in between. `'` and `"` start a new line
/// and so a new run; any other operator ends the current one.
fn text_runs(operations: &[Operation]) -> Vec<Vec<Piece>> {
    let mut runs = Vec::new();
    let mut current: Vec<Piece> = Vec::new();

    for (op_index, op) in operations.iter().enumerate() {
        let operator = op.operator.as_str();
        let continues = SHOW_OPERATORS.contains(&operator);
        let next_line = NEXT_LINE_OPERATORS.contains(&operator);
        if !continues && !current.is_empty() {
            runs.push(std::mem::take(&mut current));
        }
        if !continues && !next_line {
            continue;
        }

        for (operand_index, operand) in op.operands.iter().enumerate() {
            match operand {
                Object::String(..) => current.push(Piece::Text(Segment {
                    op: op_index,
                    operand: operand_index,
                    element: None,
                })),
                Object::Array(items) => {
                    for (element, item) in items.iter().enumerate() {
                        match item {
                            Object::String(..) => current.push(Piece::Text(Segment {
                                op: op_index,
                                operand: operand_index,
                                element: Some(element),
                            })),
                            Object::Integer(n) if -(*n as f32) >= WORD_GAP => {
                                current.push(Piece::Gap)
                            }
                            Object::Real(n) if -(*n as f32) >= WORD_GAP => current.push(Piece::Gap),
                            _ => {}
                        }
                    }
                }
                _ => {}
            }
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}

fn shown_string(operations: &[Operation], segment: Segment) -> Option<&[u8]> {
    let operand = operations.get(segment.op)?.operands.get(segment.operand)?;
    let object = match segment.element {
        Some(element) => operand.as_array().ok()?.get(element)?,
        None => operand,
    };
    match object {
        Object::String(bytes, _) => Some(bytes.as_slice()),
        _ => None,
    }
}

fn shown_string_mut(operations: &mut [Operation], segment: Segment) -> Option<&mut Vec<u8>> {
    let operand = operations
        .get_mut(segment.op)?
        .operands
        .get_mut(segment.operand)?;
    let object = match segment.element {
        Some(element) => operand.as_array_mut().ok()?.get_mut(element)?,
        None => operand,
    };
    match object {
        Object::String(bytes, _) => Some(bytes),
        _ => None,
    }
}

/// Page content streams plus every Form XObject, in object order
fn content_stream_ids(doc: &Document) -> BTreeSet<ObjectId> {
    let mut ids: BTreeSet<ObjectId> = doc
        .get_pages()
        .values()
        .flat_map(|page_id| doc.get_page_contents(*page_id))
        .collect();

    ids.extend(doc.objects.iter().filter_map(|(id, object)| match object {
        Object::Stream(stream) => {
            let is_form = stream
                .dict
                .get(b"Subtype")
                .and_then(Object::as_name)
                .map_or(false, |name| name == b"Form");
            is_form.then_some(*id)
        }
        _ => None,
    }));
    ids
}
