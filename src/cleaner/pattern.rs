//! Sensitive token matching
//!
//! A token is a maximal run of word characters, `.` and `@`. Any token containing a
//! configured word is replaced as a whole, so `bob` takes out `bob@example.com`
//! entirely instead of leaving correlatable fragments around it.
//!
//! Shown strings are single-byte encoded (WinAnsi, PDFDoc) as often as UTF-8, so
//! the token class works on bytes: ASCII word characters plus every byte at or
//! above `0x80`. Accented letters in either encoding stay inside their token.

use std::borrow::Cow;
use std::ops::Range;

use regex::bytes::Regex;

use crate::error::{RedactionError, Result};

/// Replacement for every redacted token
pub const MARKER: &str = "(redacted)";

/// Bytes that continue a token around a configured word
const TOKEN_CLASS: &str = r"(?-u:[\w.@\x80-\xFF])";

#[derive(Debug, Clone)]
pub struct TokenPattern {
    regex: Option<Regex>,
    words: Vec<String>,
    marker: Vec<u8>,
}

impl TokenPattern {
    /// Builds one pattern over all words. Empty words are ignored; no words at all
    /// yields a pattern that never matches.
    pub fn new<I, S>(words: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut words: Vec<String> = words
            .into_iter()
            .map(|w| w.as_ref().to_string())
            .filter(|w| !w.is_empty())
            .collect();
        words.sort();
        words.dedup();

        let regex = if words.is_empty() {
            None
        } else {
            let alternation = words
                .iter()
                .map(|w| regex::escape(w))
                .collect::<Vec<_>>()
                .join("|");
            let source = format!("{TOKEN_CLASS}*(?:{alternation}){TOKEN_CLASS}*");
            Some(Regex::new(&source).map_err(|e| RedactionError::Pattern(e.to_string()))?)
        };

        Ok(Self {
            regex,
            words,
            marker: MARKER.as_bytes().to_vec(),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.regex.is_none()
    }

    pub fn marker(&self) -> &[u8] {
        &self.marker
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// True when `text` contains any configured word as a plain substring
    pub fn mentions(&self, text: &str) -> bool {
        self.words.iter().any(|w| text.contains(w.as_str()))
    }

    /// Replaces every sensitive token in `input` with the marker.
    ///
    /// Returns the rewritten bytes and the number of tokens replaced. Tokens lying
    /// inside a marker written by an earlier pass are kept, so a second pass over
    /// its own output changes nothing.
    pub fn redact<'a>(&self, input: &'a [u8]) -> (Cow<'a, [u8]>, usize) {
        let tokens = self.find_tokens(input);
        if tokens.is_empty() {
            return (Cow::Borrowed(input), 0);
        }

        let mut out: Vec<u8> = Vec::with_capacity(input.len());
        let mut last = 0;
        for token in &tokens {
            out.extend_from_slice(&input[last..token.start]);
            out.extend_from_slice(&self.marker);
            last = token.end;
        }
        out.extend_from_slice(&input[last..]);
        (Cow::Owned(out), tokens.len())
    }

    /// Byte ranges of the sensitive tokens in `input`, in order and never
    /// overlapping. Tokens inside an existing marker are not reported.
    pub fn find_tokens(&self, input: &[u8]) -> Vec<Range<usize>> {
        let Some(regex) = &self.regex else {
            return Vec::new();
        };

        let markers = self.marker_spans(input);
        regex
            .find_iter(input)
            .filter(|m| {
                !markers
                    .iter()
                    .any(|&(start, end)| m.start() >= start && m.end() <= end)
            })
            .map(|m| m.range())
            .collect()
    }

    fn marker_spans(&self, input: &[u8]) -> Vec<(usize, usize)> {
        let len = self.marker.len();
        if input.len() < len {
            return Vec::new();
        }
        (0..=input.len() - len)
            .filter(|&i| input[i..i + len] == self.marker[..])
            .map(|i| (i, i + len))
            .collect()
    }
}
