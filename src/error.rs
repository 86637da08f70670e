use std::error;
use std::fmt;
use std::io;
use std::path::PathBuf;
use std::result;
use std::str;

use linecsv_core::MalformedError;

use crate::reader::Position;

/// A type alias for `Result<T, linecsv::Error>`.
pub type Result<T> = result::Result<T, Error>;

/// An error that can occur when reading or writing CSV data.
///
/// Every error is fatal to the operation that produced it. In particular, a
/// reader that returned `Malformed` should be treated as unreadable from that
/// point on.
#[derive(Debug)]
pub enum Error {
    /// An I/O error from the underlying source or sink.
    Io(io::Error),
    /// The file backing a reader does not exist.
    SourceNotFound {
        /// The path that was not found.
        path: PathBuf,
    },
    /// The file backing a writer could not be opened for writing.
    SinkUnavailable {
        /// The path that could not be opened.
        path: PathBuf,
        /// The error returned when opening it.
        err: io::Error,
    },
    /// The data could not be parsed into a record.
    Malformed {
        /// The position of the record in which this error occurred.
        pos: Position,
        /// What was wrong with the record.
        err: MalformedError,
    },
    /// A physical line was not valid UTF-8.
    Utf8 {
        /// The position of the record in which this error occurred.
        pos: Position,
        /// The corresponding UTF-8 error.
        err: str::Utf8Error,
    },
    /// The reader or writer was used after it was closed.
    Closed,
}

impl Error {
    /// Returns true if this is an I/O error.
    pub fn is_io_error(&self) -> bool {
        match *self {
            Error::Io(_) => true,
            _ => false,
        }
    }

    /// Returns true if this error was caused by malformed data.
    pub fn is_malformed(&self) -> bool {
        match *self {
            Error::Malformed { .. } => true,
            _ => false,
        }
    }

    /// The position of the offending record, if this is a parse error.
    pub fn position(&self) -> Option<&Position> {
        match *self {
            Error::Malformed { ref pos, .. } | Error::Utf8 { ref pos, .. } => {
                Some(pos)
            }
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<Error> for io::Error {
    fn from(err: Error) -> io::Error {
        io::Error::new(io::ErrorKind::Other, err)
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            Error::Io(ref err) => Some(err),
            Error::SinkUnavailable { ref err, .. } => Some(err),
            Error::Malformed { ref err, .. } => Some(err),
            Error::Utf8 { ref err, .. } => Some(err),
            Error::SourceNotFound { .. } | Error::Closed => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::Io(ref err) => err.fmt(f),
            Error::SourceNotFound { ref path } => {
                write!(f, "CSV source not found: {}", path.display())
            }
            Error::SinkUnavailable { ref path, ref err } => write!(
                f,
                "CSV sink unavailable: {}: {}",
                path.display(),
                err
            ),
            Error::Malformed { ref pos, ref err } => write!(
                f,
                "CSV parse error: record {} (line {}): {}",
                pos.record(),
                pos.line(),
                err
            ),
            Error::Utf8 { ref pos, ref err } => write!(
                f,
                "CSV parse error: record {} (line {}): invalid UTF-8: {}",
                pos.record(),
                pos.line(),
                err
            ),
            Error::Closed => {
                write!(f, "CSV error: reader or writer is already closed")
            }
        }
    }
}
