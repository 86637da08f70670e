use std::fmt;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use linecsv_core::{Encoder, Terminator};
use log::debug;

use crate::error::{Error, Result};
use crate::field::ToField;
use crate::handle::Handle;

const BUF_SIZE: usize = 8 * (1 << 10);

/// Builds a CSV writer with various configuration knobs.
///
/// This builder can be used to tweak the field delimiter and the record
/// terminator. Once a CSV `Writer` is built, its configuration cannot be
/// changed.
#[derive(Debug)]
pub struct WriterBuilder {
    delimiter: char,
    term: Terminator,
    capacity: usize,
}

impl Default for WriterBuilder {
    fn default() -> WriterBuilder {
        WriterBuilder {
            delimiter: ',',
            term: Terminator::default(),
            capacity: BUF_SIZE,
        }
    }
}

impl WriterBuilder {
    /// Create a new builder for configuring CSV writing.
    ///
    /// To convert a builder into a writer, call one of the methods starting
    /// with `from_`.
    pub fn new() -> WriterBuilder {
        WriterBuilder::default()
    }

    /// Build a CSV writer from this configuration that writes data to the
    /// given file path.
    ///
    /// The file is created (or truncated) when the first field is written.
    /// If it cannot be opened then, the write fails with
    /// `Error::SinkUnavailable`.
    pub fn from_path<P: AsRef<Path>>(&self, path: P) -> Writer<File> {
        let path = path.as_ref().to_path_buf();
        let handle = Handle::lazy(path, self.capacity, open_sink);
        Writer::new(self, handle)
    }

    /// Build a CSV writer from this configuration that writes data to `wtr`.
    ///
    /// Note that the CSV writer is buffered automatically, so you should not
    /// wrap `wtr` in a buffered writer like `io::BufWriter`.
    pub fn from_writer<W: io::Write>(&self, wtr: W) -> Writer<W> {
        let wtr = io::BufWriter::with_capacity(self.capacity, wtr);
        Writer::new(self, Handle::Open(wtr))
    }

    /// The field delimiter to use when writing CSV.
    ///
    /// The default is `,`.
    pub fn delimiter(&mut self, delimiter: char) -> &mut WriterBuilder {
        self.delimiter = delimiter;
        self
    }

    /// The record terminator to use when writing CSV.
    ///
    /// The default is the line break of the current platform: `\r\n` on
    /// Windows and `\n` everywhere else.
    pub fn terminator(&mut self, term: Terminator) -> &mut WriterBuilder {
        self.term = term;
        self
    }

    /// Set the capacity (in bytes) of the internal buffer used in the CSV
    /// writer.
    pub fn buffer_capacity(&mut self, capacity: usize) -> &mut WriterBuilder {
        self.capacity = capacity;
        self
    }
}

/// A CSV writer.
///
/// A field is quoted only when it contains the delimiter, a quote or a line
/// break. Quotes inside a quoted field are doubled. Empty and null fields
/// are written as nothing.
///
/// The one exception to this quoting rule is the last field of a record.
/// When it is empty or null it is written as `""`, because readers drop
/// empty text after a trailing delimiter and skip blank lines. Without the
/// quotes, `["a", ""]` would read back as `["a"]` and `[""]` would not read
/// back at all.
///
/// All writes are buffered. Call `flush` to push buffered data to the
/// underlying sink, or `close` to flush and release it. Dropping a writer
/// flushes it as well, but any error is then ignored.
///
/// # Example
///
/// ```
/// use linecsv::{Terminator, WriterBuilder};
///
/// let mut wtr = WriterBuilder::new()
///     .terminator(Terminator::LF)
///     .from_writer(vec![]);
/// wtr.write_record(&["city", "note"]).unwrap();
/// wtr.write_record(&["Boston", "cold, sometimes"]).unwrap();
/// wtr.write_record(vec![Some("Tucson"), None]).unwrap();
///
/// let data = String::from_utf8(wtr.into_inner().unwrap()).unwrap();
/// assert_eq!(data, "city,note\nBoston,\"cold, sometimes\"\nTucson,\"\"\n");
/// ```
pub struct Writer<W: io::Write> {
    handle: Handle<io::BufWriter<W>>,
    enc: Encoder,
    /// Scratch space for the text being written.
    line: String,
    records: u64,
}

impl<W: io::Write> fmt::Debug for Writer<W> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Writer")
            .field("handle", &self.handle)
            .field("enc", &self.enc)
            .field("records", &self.records)
            .finish()
    }
}

impl Writer<File> {
    /// Build a CSV writer with a default configuration that writes data to
    /// the given file path.
    ///
    /// To customize CSV writing, use a `WriterBuilder`.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Writer<File> {
        WriterBuilder::new().from_path(path)
    }
}

impl<W: io::Write> Writer<W> {
    fn new(builder: &WriterBuilder, handle: Handle<io::BufWriter<W>>) -> Writer<W> {
        Writer {
            handle,
            enc: Encoder::with_terminator(builder.delimiter, builder.term),
            line: String::with_capacity(256),
            records: 0,
        }
    }

    /// Build a CSV writer with a default configuration that writes data to
    /// `wtr`.
    ///
    /// To customize CSV writing, use a `WriterBuilder`.
    pub fn from_writer(wtr: W) -> Writer<W> {
        WriterBuilder::new().from_writer(wtr)
    }

    /// Write a single record, followed by the record terminator.
    ///
    /// Each item is written as one field. A `None` item is a null field and
    /// is written like an empty one. A record with no fields is written as a
    /// bare terminator.
    ///
    /// If a partial record was started with `write_field`, the fields given
    /// here are appended to it.
    pub fn write_record<I, T>(&mut self, record: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: ToField,
    {
        let wtr = self.handle.get()?;
        self.line.clear();
        for field in record {
            self.enc.encode_field(&mut self.line, field.to_field().as_deref());
        }
        self.enc.encode_terminator(&mut self.line);
        wtr.write_all(self.line.as_bytes())?;
        self.records += 1;
        Ok(())
    }

    /// Write a single field.
    ///
    /// One should prefer using `write_record` over this method. It is
    /// provided for cases where writing a field at a time is more
    /// convenient.
    ///
    /// A record is not finished until `write_terminator` is called.
    pub fn write_field<T: ToField>(&mut self, field: T) -> Result<()> {
        let wtr = self.handle.get()?;
        self.line.clear();
        self.enc.encode_field(&mut self.line, field.to_field().as_deref());
        wtr.write_all(self.line.as_bytes())?;
        Ok(())
    }

    /// Finish the current record by writing the record terminator.
    pub fn write_terminator(&mut self) -> Result<()> {
        let wtr = self.handle.get()?;
        self.line.clear();
        self.enc.encode_terminator(&mut self.line);
        wtr.write_all(self.line.as_bytes())?;
        self.records += 1;
        Ok(())
    }

    /// Flush the contents of the internal buffer to the underlying writer.
    ///
    /// A writer bound to a path that has not written anything yet has nothing
    /// to flush, and its file is not created.
    pub fn flush(&mut self) -> Result<()> {
        if let Some(wtr) = self.handle.get_opened()? {
            wtr.flush()?;
        }
        Ok(())
    }

    /// Flush the internal buffer and release the underlying writer.
    ///
    /// After closing, every operation on this writer returns
    /// `Error::Closed`, including a second call to `close`. The writer is
    /// released even if the final flush fails.
    pub fn close(&mut self) -> Result<()> {
        if let Some(mut wtr) = self.handle.close()? {
            wtr.flush()?;
            debug!("closed CSV sink after {} records", self.records);
        }
        Ok(())
    }

    /// Returns true if this writer has been closed.
    pub fn is_closed(&self) -> bool {
        self.handle.is_closed()
    }

    /// Flush the internal buffer and return the underlying writer.
    pub fn into_inner(mut self) -> Result<W> {
        self.handle.get()?;
        match self.handle.close()? {
            Some(wtr) => wtr.into_inner().map_err(|err| Error::Io(err.into_error())),
            None => Err(Error::Closed),
        }
    }
}

/// Create (or truncate) a path-bound sink on first write.
fn open_sink(path: &Path, capacity: usize) -> Result<io::BufWriter<File>> {
    match File::create(path) {
        Ok(file) => {
            debug!("opened CSV sink {}", path.display());
            Ok(io::BufWriter::with_capacity(capacity, file))
        }
        Err(err) => Err(Error::SinkUnavailable { path: path.to_path_buf(), err }),
    }
}

#[cfg(test)]
mod tests {
    use std::io::{self, Write};

    use linecsv_core::Terminator;

    use super::{Writer, WriterBuilder};
    use crate::error::Error;

    fn wtr_as_string(wtr: Writer<Vec<u8>>) -> String {
        String::from_utf8(wtr.into_inner().unwrap()).unwrap()
    }

    fn lf() -> Writer<Vec<u8>> {
        WriterBuilder::new().terminator(Terminator::LF).from_writer(vec![])
    }

    #[test]
    fn one_record() {
        let mut wtr = lf();
        wtr.write_record(&["a", "b", "c"]).unwrap();
        assert_eq!(wtr_as_string(wtr), "a,b,c\n");
    }

    #[test]
    fn quoted_fields() {
        let mut wtr = lf();
        wtr.write_record(&["a,b", "say \"hi\"", "x\ny", "plain"]).unwrap();
        assert_eq!(
            wtr_as_string(wtr),
            "\"a,b\",\"say \"\"hi\"\"\",\"x\ny\",plain\n"
        );
    }

    #[test]
    fn nulls_and_empties() {
        let mut wtr = lf();
        wtr.write_record(vec![Some("a"), Some(""), None, Some("b")]).unwrap();
        wtr.write_record(vec![Some("a"), None]).unwrap();
        assert_eq!(wtr_as_string(wtr), "a,,,b\na,\"\"\n");
    }

    #[test]
    fn empty_record() {
        let mut wtr = lf();
        wtr.write_record(Vec::<&str>::new()).unwrap();
        assert_eq!(wtr_as_string(wtr), "\n");
    }

    #[test]
    fn field_by_field() {
        let mut wtr = lf();
        wtr.write_field("a").unwrap();
        wtr.write_field(1u8).unwrap();
        wtr.write_terminator().unwrap();
        wtr.write_field("b").unwrap();
        wtr.write_record(&["c"]).unwrap();
        assert_eq!(wtr_as_string(wtr), "a,1\nb,c\n");
    }

    #[test]
    fn custom_delimiter_crlf() {
        let mut wtr = WriterBuilder::new()
            .delimiter(';')
            .terminator(Terminator::CRLF)
            .from_writer(vec![]);
        wtr.write_record(&["a;b", "c,d"]).unwrap();
        assert_eq!(wtr_as_string(wtr), "\"a;b\";c,d\r\n");
    }

    #[test]
    fn closed_writer_fails() {
        let mut wtr = lf();
        wtr.write_record(&["a"]).unwrap();
        wtr.close().unwrap();
        assert!(wtr.is_closed());
        match wtr.write_record(&["b"]) {
            Err(Error::Closed) => {}
            res => panic!("expected closed error, got {:?}", res),
        }
        match wtr.flush() {
            Err(Error::Closed) => {}
            res => panic!("expected closed error, got {:?}", res),
        }
        match wtr.close() {
            Err(Error::Closed) => {}
            res => panic!("expected closed error, got {:?}", res),
        }
        match wtr.into_inner() {
            Err(Error::Closed) => {}
            res => panic!("expected closed error, got {:?}", res),
        }
    }

    struct FailingSink;

    impl Write for FailingSink {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "sink is full"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn flush_surfaces_io_errors() {
        let mut wtr = Writer::from_writer(FailingSink);
        wtr.write_record(&["a"]).unwrap();
        assert!(wtr.flush().unwrap_err().is_io_error());
    }
}
