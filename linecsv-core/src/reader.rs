use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use memchr::{memchr, memchr_iter, memmem};

use crate::QUOTE;

/// The designated null character.
///
/// Some export tools pad their output with NUL characters. When stripping is
/// enabled, every occurrence is removed from a logical line before it is
/// split into fields. This is lossy.
pub const NUL: char = '\0';

/// An error describing why a logical line could not be split into fields.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MalformedError {
    /// A quoted field was still open when the input ended.
    UnterminatedQuote,
    /// A quote inside a quoted field was not followed by a second quote.
    UnescapedQuote,
    /// A field contained a quote but was not entirely enclosed in quotes.
    QuoteInUnquotedField,
}

impl fmt::Display for MalformedError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            MalformedError::UnterminatedQuote => {
                write!(f, "quoted field is not terminated before end of input")
            }
            MalformedError::UnescapedQuote => {
                write!(f, "unescaped quote in quoted field")
            }
            MalformedError::QuoteInUnquotedField => {
                write!(f, "quote in non-quoted field")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for MalformedError {}

/// Count the quote characters in `s`.
pub fn count_quotes(s: &str) -> usize {
    count_quote_bytes(s.as_bytes())
}

fn count_quote_bytes(bytes: &[u8]) -> usize {
    memchr_iter(QUOTE as u8, bytes).count()
}

/// Remove every NUL character from `line`.
pub fn strip_nul(line: &mut String) {
    if memchr(NUL as u8, line.as_bytes()).is_some() {
        line.retain(|c| c != NUL);
    }
}

/// What happened to a physical line given to a `LineAssembler`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Assembled {
    /// The line was empty or all whitespace and no logical line was in
    /// progress, so it was dropped.
    Skipped,
    /// The logical line ends inside a quoted field. More physical lines are
    /// required.
    Incomplete,
    /// The logical line is complete and can be split.
    Complete,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum LineState {
    /// Nothing buffered.
    Empty,
    /// An odd number of quotes has been seen: a quoted field is open.
    FieldOpen,
    /// An even number of quotes has been seen and the line is complete.
    Balanced,
}

impl Default for LineState {
    fn default() -> LineState {
        LineState::Empty
    }
}

/// Joins physical lines into logical lines.
///
/// A physical line whose running quote count is odd ends inside a quoted
/// field, so the line break that terminated it is kept as field content and
/// the next physical line is appended. This repeats until the count is even.
///
/// Blank lines are only skipped between records. Once a quoted field is
/// open, every physical line is content, blank or not.
#[derive(Clone, Debug, Default)]
pub struct LineAssembler {
    line: String,
    state: LineState,
    physical: usize,
}

impl LineAssembler {
    /// Create a new assembler with no buffered data.
    pub fn new() -> LineAssembler {
        LineAssembler::default()
    }

    /// Feed one physical line.
    ///
    /// `line` must not include its terminator. `terminator` is the line break
    /// that ended it (`"\n"`, `"\r\n"` or `""` at the end of input), which
    /// is kept verbatim if the line ends inside a quoted field.
    ///
    /// Feeding a line after a `Complete` result starts a new logical line.
    pub fn push(&mut self, line: &str, terminator: &str) -> Assembled {
        if self.state == LineState::Balanced {
            self.clear();
        }
        if self.state == LineState::Empty && line.trim().is_empty() {
            return Assembled::Skipped;
        }
        self.line.push_str(line);
        self.physical += 1;

        let odd = count_quotes(line) % 2 == 1;
        let open = (self.state == LineState::FieldOpen) != odd;
        if open {
            self.line.push_str(terminator);
            self.state = LineState::FieldOpen;
            Assembled::Incomplete
        } else {
            self.state = LineState::Balanced;
            Assembled::Complete
        }
    }

    /// Signal the end of input.
    ///
    /// This fails if a quoted field is still open.
    pub fn finish(&self) -> Result<(), MalformedError> {
        if self.state == LineState::FieldOpen {
            Err(MalformedError::UnterminatedQuote)
        } else {
            Ok(())
        }
    }

    /// The logical line assembled so far.
    pub fn line(&self) -> &str {
        &self.line
    }

    /// Remove all NUL characters from the assembled logical line.
    pub fn strip_nul(&mut self) {
        strip_nul(&mut self.line);
    }

    /// The number of physical lines in the current logical line.
    pub fn physical_lines(&self) -> usize {
        self.physical
    }

    /// Returns true if a quoted field is open.
    pub fn is_open(&self) -> bool {
        self.state == LineState::FieldOpen
    }

    /// Returns true if a complete logical line is buffered.
    pub fn is_complete(&self) -> bool {
        self.state == LineState::Balanced
    }

    /// Forget any buffered data.
    pub fn clear(&mut self) {
        self.line.clear();
        self.state = LineState::Empty;
        self.physical = 0;
    }
}

/// Splits a logical line into fields.
///
/// Delimiters are scanned left to right with a running quote parity. A
/// delimiter found while the parity is odd is inside a quoted field and the
/// current span is extended to the next delimiter. The scan is linear in the
/// length of the line.
///
/// Each span is trimmed of spaces and delimiter characters. A span containing
/// a quote must be entirely enclosed in quotes, and quotes inside it must be
/// doubled. Doubled quotes collapse to one.
///
/// Text after the last delimiter becomes a field only if it is non-empty, so
/// `a,b,` yields two fields while `,a,b` yields three. This asymmetry is kept
/// for compatibility with existing data.
#[derive(Clone, Debug)]
pub struct Splitter {
    delimiter: char,
    needle: [u8; 4],
    needle_len: usize,
}

impl Splitter {
    /// Create a splitter for the given delimiter.
    pub fn new(delimiter: char) -> Splitter {
        let mut needle = [0; 4];
        let needle_len = delimiter.encode_utf8(&mut needle).len();
        Splitter { delimiter, needle, needle_len }
    }

    /// The delimiter this splitter uses.
    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    /// Split `line` and append its fields to `fields`.
    ///
    /// Returns the number of fields appended. On error, `fields` is left as
    /// it was.
    pub fn split(
        &self,
        line: &str,
        fields: &mut Vec<String>,
    ) -> Result<usize, MalformedError> {
        let before = fields.len();
        match self.split_spans(line, fields) {
            Ok(()) => Ok(fields.len() - before),
            Err(err) => {
                fields.truncate(before);
                Err(err)
            }
        }
    }

    fn split_spans(
        &self,
        line: &str,
        fields: &mut Vec<String>,
    ) -> Result<(), MalformedError> {
        let needle = &self.needle[..self.needle_len];
        let bytes = line.as_bytes();
        // `start` is where the current field begins, `scanned` is how far the
        // quote count has been taken.
        let (mut start, mut scanned, mut quotes) = (0, 0, 0);
        for pos in memmem::find_iter(bytes, needle) {
            quotes += count_quote_bytes(&bytes[scanned..pos]);
            scanned = pos + needle.len();
            if quotes % 2 == 1 {
                continue;
            }
            fields.push(self.reformat(&line[start..pos])?);
            start = scanned;
            quotes = 0;
        }
        if start < line.len() {
            quotes += count_quote_bytes(&bytes[scanned..]);
            if quotes % 2 == 1 {
                return Err(self.odd_span_error(&line[start..]));
            }
            fields.push(self.reformat(&line[start..])?);
        }
        Ok(())
    }

    /// Classify a final span with an odd number of quotes.
    fn odd_span_error(&self, span: &str) -> MalformedError {
        let delimiter = self.delimiter;
        let field = span.trim_start_matches(|c| c == ' ' || c == delimiter);
        if field.starts_with(QUOTE) {
            MalformedError::UnterminatedQuote
        } else {
            MalformedError::QuoteInUnquotedField
        }
    }

    /// Turn one raw span into field content.
    pub fn reformat(&self, span: &str) -> Result<String, MalformedError> {
        let delimiter = self.delimiter;
        let field = span.trim_matches(|c| c == ' ' || c == delimiter);
        if memchr(QUOTE as u8, field.as_bytes()).is_none() {
            return Ok(String::from(field));
        }
        if field.len() < 2
            || !field.starts_with(QUOTE)
            || !field.ends_with(QUOTE)
        {
            return Err(MalformedError::QuoteInUnquotedField);
        }
        unescape(&field[1..field.len() - 1])
    }
}

impl Default for Splitter {
    fn default() -> Splitter {
        Splitter::new(',')
    }
}

/// Collapse doubled quotes, rejecting any quote that is not doubled.
fn unescape(inner: &str) -> Result<String, MalformedError> {
    let mut out = String::with_capacity(inner.len());
    let mut last = 0;
    let mut quotes = memchr_iter(QUOTE as u8, inner.as_bytes());
    while let Some(i) = quotes.next() {
        if quotes.next() != Some(i + 1) {
            return Err(MalformedError::UnescapedQuote);
        }
        out.push_str(&inner[last..=i]);
        last = i + 2;
    }
    out.push_str(&inner[last..]);
    Ok(out)
}
