use alloc::string::String;

use memchr::{memchr, memchr3};

use crate::QUOTE;

/// A record terminator.
///
/// The default is the line break of the platform the crate is compiled for:
/// `\r\n` on Windows and `\n` everywhere else.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Terminator {
    /// Terminate records with `\r\n`.
    CRLF,
    /// Terminate records with `\n`.
    LF,
}

impl Terminator {
    /// The terminator as text.
    pub fn as_str(&self) -> &'static str {
        match *self {
            Terminator::CRLF => "\r\n",
            Terminator::LF => "\n",
        }
    }
}

impl Default for Terminator {
    fn default() -> Terminator {
        if cfg!(windows) {
            Terminator::CRLF
        } else {
            Terminator::LF
        }
    }
}

/// Returns true if `field` must be quoted when written with `delimiter`.
///
/// A field needs quotes if and only if it contains the delimiter, a quote,
/// `\r` or `\n`.
pub fn needs_quotes(field: &str, delimiter: char) -> bool {
    let bytes = field.as_bytes();
    if memchr3(QUOTE as u8, b'\r', b'\n', bytes).is_some() {
        return true;
    }
    if delimiter.is_ascii() {
        memchr(delimiter as u8, bytes).is_some()
    } else {
        field.contains(delimiter)
    }
}

/// Append `field` to `out` wrapped in quotes, doubling every quote in it.
pub fn quote_into(field: &str, out: &mut String) {
    out.reserve(field.len() + 2);
    out.push(QUOTE);
    let mut rest = field;
    while let Some(i) = memchr(QUOTE as u8, rest.as_bytes()) {
        out.push_str(&rest[..=i]);
        out.push(QUOTE);
        rest = &rest[i + 1..];
    }
    out.push_str(rest);
    out.push(QUOTE);
}

/// Serializes records one field at a time into a `String`.
///
/// Fields are quoted only when [`needs_quotes`] says so. Empty and null
/// fields are written as nothing at all, except when they are the last field
/// of a record: those are written as `""`. A bare trailing delimiter would
/// otherwise be dropped when the line is read back, and a record made of a
/// single empty field would become a blank line.
#[derive(Clone, Debug)]
pub struct Encoder {
    delimiter: char,
    term: Terminator,
    fields: usize,
    last_empty: bool,
}

impl Encoder {
    /// Create an encoder using `delimiter` and the default terminator.
    pub fn new(delimiter: char) -> Encoder {
        Encoder::with_terminator(delimiter, Terminator::default())
    }

    /// Create an encoder using `delimiter` and `term`.
    pub fn with_terminator(delimiter: char, term: Terminator) -> Encoder {
        Encoder { delimiter, term, fields: 0, last_empty: false }
    }

    /// The delimiter used between fields.
    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    /// The record terminator.
    pub fn terminator(&self) -> Terminator {
        self.term
    }

    /// Returns true if no field has been written since the last terminator.
    pub fn at_record_start(&self) -> bool {
        self.fields == 0
    }

    /// Append one field of the current record. `None` is a null field.
    pub fn encode_field(&mut self, out: &mut String, field: Option<&str>) {
        if self.fields > 0 {
            out.push(self.delimiter);
        }
        self.fields += 1;
        match field {
            None | Some("") => self.last_empty = true,
            Some(field) => {
                self.last_empty = false;
                if needs_quotes(field, self.delimiter) {
                    quote_into(field, out);
                } else {
                    out.push_str(field);
                }
            }
        }
    }

    /// End the current record.
    ///
    /// A record with no fields produces a bare terminator, which readers
    /// skip as a blank line.
    pub fn encode_terminator(&mut self, out: &mut String) {
        if self.fields > 0 && self.last_empty {
            out.push(QUOTE);
            out.push(QUOTE);
        }
        out.push_str(self.term.as_str());
        self.fields = 0;
        self.last_empty = false;
    }

    /// Append a complete record, including its terminator.
    pub fn encode_record<I, T>(&mut self, out: &mut String, record: I)
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        for field in record {
            self.encode_field(out, Some(field.as_ref()));
        }
        self.encode_terminator(out);
    }
}

impl Default for Encoder {
    fn default() -> Encoder {
        Encoder::new(',')
    }
}
