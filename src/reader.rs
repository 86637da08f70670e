use std::fmt;
use std::fs::File;
use std::io::{self, BufRead};
use std::path::Path;
use std::str;

use linecsv_core::{Assembled, LineAssembler, Splitter};
use log::{debug, trace};

use crate::error::{Error, Result};
use crate::handle::Handle;
use crate::string_record::StringRecord;

const BUF_SIZE: usize = 8 * (1 << 10);

/// Builds a CSV reader with various configuration knobs.
///
/// This builder can be used to tweak the field delimiter and NUL stripping.
/// Once a CSV `Reader` is built, its configuration cannot be changed.
#[derive(Clone, Debug)]
pub struct ReaderBuilder {
    delimiter: char,
    strip_nul: bool,
    capacity: usize,
}

impl Default for ReaderBuilder {
    fn default() -> ReaderBuilder {
        ReaderBuilder { delimiter: ',', strip_nul: false, capacity: BUF_SIZE }
    }
}

impl ReaderBuilder {
    /// Create a new builder for configuring CSV parsing.
    ///
    /// To convert a builder into a reader, call one of the methods starting
    /// with `from_`.
    pub fn new() -> ReaderBuilder {
        ReaderBuilder::default()
    }

    /// Build a CSV reader from this configuration that reads data from the
    /// given file path.
    ///
    /// If the file does not exist, then this returns
    /// `Error::SourceNotFound`. The file itself is opened when the first
    /// record is read.
    pub fn from_path<P: AsRef<Path>>(&self, path: P) -> Result<Reader<File>> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            return Err(Error::SourceNotFound { path });
        }
        let handle = Handle::lazy(path, self.capacity, open_source);
        Ok(Reader::new(self, handle))
    }

    /// Build a CSV reader from this configuration that reads data from
    /// `rdr`.
    ///
    /// Note that the CSV reader is buffered automatically, so you should not
    /// wrap `rdr` in a buffered reader like `io::BufReader`.
    pub fn from_reader<R: io::Read>(&self, rdr: R) -> Reader<R> {
        let rdr = io::BufReader::with_capacity(self.capacity, rdr);
        Reader::new(self, Handle::Open(rdr))
    }

    /// The field delimiter to use when parsing CSV.
    ///
    /// Any single character may be used. The default is `,`.
    pub fn delimiter(&mut self, delimiter: char) -> &mut ReaderBuilder {
        self.delimiter = delimiter;
        self
    }

    /// Whether to remove NUL characters from each record before parsing it.
    ///
    /// Some export tools pad their output with NUL characters. When enabled,
    /// every `'\0'` is removed from a record (after its physical lines have
    /// been joined) and before it is split into fields. Records that become
    /// blank are skipped.
    ///
    /// This is disabled by default.
    pub fn strip_nul(&mut self, yes: bool) -> &mut ReaderBuilder {
        self.strip_nul = yes;
        self
    }

    /// Set the capacity (in bytes) of the buffer used in the CSV reader.
    pub fn buffer_capacity(&mut self, capacity: usize) -> &mut ReaderBuilder {
        self.capacity = capacity;
        self
    }
}

/// The position of a record in CSV data.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct Position {
    line: u64,
    record: u64,
}

impl Position {
    /// Returns a new position initialized to the start value.
    pub fn new() -> Position {
        Position { line: 1, record: 0 }
    }

    /// The line number at which the record starts, starting at `1`.
    ///
    /// Blank lines are counted.
    pub fn line(&self) -> u64 {
        self.line
    }

    /// The record index, starting with the first record at `0`.
    pub fn record(&self) -> u64 {
        self.record
    }
}

/// A CSV reader.
///
/// The reader pulls one physical line at a time from its source. Lines that
/// end inside a quoted field are joined with the lines that follow them, so a
/// single record may span several physical lines. Empty and whitespace-only
/// lines between records are skipped.
///
/// The source is owned by the reader and released when the reader is closed
/// or dropped. Every operation on a closed reader returns `Error::Closed`.
///
/// # Example
///
/// ```
/// use linecsv::Reader;
///
/// let data = "\
/// city,note
/// Boston,\"cold, sometimes\"
///
/// Tucson,\"two
/// lines\"
/// ";
/// let mut rdr = Reader::from_reader(data.as_bytes());
/// let records = rdr.records().collect::<Result<Vec<_>, _>>().unwrap();
/// assert_eq!(records.len(), 3);
/// assert_eq!(records[1], vec!["Boston", "cold, sometimes"]);
/// assert_eq!(records[2], vec!["Tucson", "two\nlines"]);
/// ```
pub struct Reader<R> {
    /// The underlying source, opened on demand.
    handle: Handle<io::BufReader<R>>,
    /// Joins physical lines into logical lines.
    asm: LineAssembler,
    /// Splits logical lines into fields.
    splitter: Splitter,
    /// Whether to remove NUL characters before splitting.
    strip_nul: bool,
    /// The raw bytes of the current physical line.
    buf: Vec<u8>,
    /// The position of the most recent record.
    pos: Position,
    /// Physical lines consumed so far.
    lines: u64,
    /// Records returned so far.
    records: u64,
}

impl<R> fmt::Debug for Reader<R> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Reader")
            .field("handle", &self.handle)
            .field("delimiter", &self.splitter.delimiter())
            .field("strip_nul", &self.strip_nul)
            .field("pos", &self.pos)
            .finish()
    }
}

impl Reader<File> {
    /// Create a new CSV reader with a default configuration for the given
    /// file path.
    ///
    /// To customize CSV parsing, use a `ReaderBuilder`.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Reader<File>> {
        ReaderBuilder::new().from_path(path)
    }
}

impl<R: io::Read> Reader<R> {
    fn new(builder: &ReaderBuilder, handle: Handle<io::BufReader<R>>) -> Reader<R> {
        Reader {
            handle,
            asm: LineAssembler::new(),
            splitter: Splitter::new(builder.delimiter),
            strip_nul: builder.strip_nul,
            buf: Vec::with_capacity(1024),
            pos: Position::new(),
            lines: 0,
            records: 0,
        }
    }

    /// Create a new CSV reader with a default configuration for the given
    /// reader.
    ///
    /// To customize CSV parsing, use a `ReaderBuilder`.
    pub fn from_reader(rdr: R) -> Reader<R> {
        ReaderBuilder::new().from_reader(rdr)
    }

    /// Read the next record and append its fields to `record`.
    ///
    /// This returns `true` if a record was read and `false` once the end of
    /// the data has been reached, in which case `record` is not modified.
    ///
    /// The fields are *appended*: callers reusing a record should clear it
    /// before each call. If an error is returned, `record` is not modified.
    ///
    /// # Example
    ///
    /// ```
    /// use linecsv::{Reader, StringRecord};
    ///
    /// let mut rdr = Reader::from_reader("a,b\nc,d\n".as_bytes());
    /// let mut record = StringRecord::new();
    /// let mut count = 0;
    /// while rdr.read_record(&mut record).unwrap() {
    ///     assert_eq!(record.len(), 2);
    ///     record.clear();
    ///     count += 1;
    /// }
    /// assert_eq!(count, 2);
    /// ```
    pub fn read_record(&mut self, record: &mut StringRecord) -> Result<bool> {
        loop {
            if !self.read_logical_line()? {
                return Ok(false);
            }
            if self.strip_nul {
                self.asm.strip_nul();
                if self.asm.line().trim().is_empty() {
                    trace!("skipping line {} after removing NUL", self.lines);
                    continue;
                }
            }
            break;
        }

        let physical = self.asm.physical_lines() as u64;
        self.pos = Position {
            line: self.lines - physical + 1,
            record: self.records,
        };
        if physical > 1 {
            trace!(
                "record {} spans {} physical lines starting at line {}",
                self.pos.record,
                physical,
                self.pos.line
            );
        }
        let pos = &self.pos;
        self.splitter
            .split(self.asm.line(), record.fields_mut())
            .map_err(|err| Error::Malformed { pos: pos.clone(), err })?;
        self.records += 1;
        Ok(true)
    }

    /// Pull physical lines until a complete logical line is assembled.
    ///
    /// Returns `false` at the end of the data.
    fn read_logical_line(&mut self) -> Result<bool> {
        loop {
            let src = self.handle.get()?;
            self.buf.clear();
            if src.read_until(b'\n', &mut self.buf)? == 0 {
                return match self.asm.finish() {
                    Ok(()) => Ok(false),
                    Err(err) => {
                        let physical = self.asm.physical_lines() as u64;
                        let pos = Position {
                            line: self.lines - physical + 1,
                            record: self.records,
                        };
                        Err(Error::Malformed { pos, err })
                    }
                };
            }
            self.lines += 1;

            let (line, term) = split_terminator(&self.buf);
            let line = match str::from_utf8(line) {
                Ok(line) => line,
                Err(err) => {
                    let pos = Position { line: self.lines, record: self.records };
                    return Err(Error::Utf8 { pos, err });
                }
            };
            match self.asm.push(line, term) {
                Assembled::Skipped => trace!("skipping blank line {}", self.lines),
                Assembled::Incomplete => {}
                Assembled::Complete => return Ok(true),
            }
        }
    }

    /// Returns a borrowed iterator over all records as strings.
    ///
    /// The iterator stops after the first error.
    pub fn records(&mut self) -> StringRecordsIter<'_, R> {
        StringRecordsIter { rdr: self, done: false }
    }

    /// Returns an owned iterator over all records as strings.
    pub fn into_records(self) -> StringRecordsIntoIter<R> {
        StringRecordsIntoIter { rdr: self, done: false }
    }

    /// Release the underlying source.
    ///
    /// After closing, every operation on this reader returns
    /// `Error::Closed`, including a second call to `close`. Dropping a reader
    /// releases its source as well.
    pub fn close(&mut self) -> Result<()> {
        if self.handle.close()?.is_some() {
            debug!("closed CSV source after {} records", self.records);
        }
        self.asm.clear();
        Ok(())
    }
}

impl<R> Reader<R> {
    /// Return the position of the most recently read record.
    pub fn position(&self) -> &Position {
        &self.pos
    }

    /// The delimiter this reader splits fields on.
    pub fn delimiter(&self) -> char {
        self.splitter.delimiter()
    }

    /// Returns true if this reader has been closed.
    pub fn is_closed(&self) -> bool {
        self.handle.is_closed()
    }
}

/// Open a path-bound source on first read.
fn open_source(path: &Path, capacity: usize) -> Result<io::BufReader<File>> {
    match File::open(path) {
        Ok(file) => {
            debug!("opened CSV source {}", path.display());
            Ok(io::BufReader::with_capacity(capacity, file))
        }
        Err(ref err) if err.kind() == io::ErrorKind::NotFound => {
            Err(Error::SourceNotFound { path: path.to_path_buf() })
        }
        Err(err) => Err(Error::Io(err)),
    }
}

/// Split a physical line into its content and the line break ending it.
fn split_terminator(line: &[u8]) -> (&[u8], &'static str) {
    if line.ends_with(b"\r\n") {
        (&line[..line.len() - 2], "\r\n")
    } else if line.ends_with(b"\n") {
        (&line[..line.len() - 1], "\n")
    } else {
        (line, "")
    }
}

/// A borrowed iterator over records as strings.
///
/// The lifetime parameter `'r` refers to the lifetime of the underlying CSV
/// `Reader`.
pub struct StringRecordsIter<'r, R: 'r> {
    rdr: &'r mut Reader<R>,
    done: bool,
}

impl<'r, R: io::Read> Iterator for StringRecordsIter<'r, R> {
    type Item = Result<StringRecord>;

    fn next(&mut self) -> Option<Result<StringRecord>> {
        next_record(self.rdr, &mut self.done)
    }
}

/// An owned iterator over records as strings.
pub struct StringRecordsIntoIter<R> {
    rdr: Reader<R>,
    done: bool,
}

impl<R: io::Read> StringRecordsIntoIter<R> {
    /// Return a reference to the underlying CSV reader.
    pub fn reader(&self) -> &Reader<R> {
        &self.rdr
    }

    /// Drop this iterator and return the underlying CSV reader.
    pub fn into_reader(self) -> Reader<R> {
        self.rdr
    }
}

impl<R: io::Read> Iterator for StringRecordsIntoIter<R> {
    type Item = Result<StringRecord>;

    fn next(&mut self) -> Option<Result<StringRecord>> {
        next_record(&mut self.rdr, &mut self.done)
    }
}

fn next_record<R: io::Read>(
    rdr: &mut Reader<R>,
    done: &mut bool,
) -> Option<Result<StringRecord>> {
    if *done {
        return None;
    }
    let mut record = StringRecord::new();
    match rdr.read_record(&mut record) {
        Ok(true) => Some(Ok(record)),
        Ok(false) => {
            *done = true;
            None
        }
        Err(err) => {
            *done = true;
            Some(Err(err))
        }
    }
}
