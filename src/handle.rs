use std::fmt;
use std::mem;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Opens the stream behind a path-bound handle.
pub(crate) type OpenFn<T> = fn(&Path, usize) -> Result<T>;

/// The lifecycle of the stream owned by a reader or writer.
///
/// A handle starts either `Open`, when the caller supplies a stream, or
/// `Unopened`, when it is bound to a path. `get` is the only way to reach the
/// stream: it opens an unopened handle on first use. A failed open leaves the
/// handle unopened so a later call may try again. Once closed, a handle
/// never reopens.
pub(crate) enum Handle<T> {
    Unopened { path: PathBuf, capacity: usize, open: OpenFn<T> },
    Open(T),
    Closed,
}

impl<T> Handle<T> {
    pub fn lazy(path: PathBuf, capacity: usize, open: OpenFn<T>) -> Handle<T> {
        Handle::Unopened { path, capacity, open }
    }

    pub fn get(&mut self) -> Result<&mut T> {
        if let Handle::Unopened { ref path, capacity, open } = *self {
            let stream = open(path, capacity)?;
            *self = Handle::Open(stream);
        }
        match *self {
            Handle::Open(ref mut stream) => Ok(stream),
            Handle::Unopened { .. } | Handle::Closed => Err(Error::Closed),
        }
    }

    /// Returns the stream only if it has already been opened.
    pub fn get_opened(&mut self) -> Result<Option<&mut T>> {
        match *self {
            Handle::Unopened { .. } => Ok(None),
            Handle::Open(ref mut stream) => Ok(Some(stream)),
            Handle::Closed => Err(Error::Closed),
        }
    }

    /// Release the stream. The handle is closed even if it was never opened.
    pub fn close(&mut self) -> Result<Option<T>> {
        match mem::replace(self, Handle::Closed) {
            Handle::Unopened { .. } => Ok(None),
            Handle::Open(stream) => Ok(Some(stream)),
            Handle::Closed => Err(Error::Closed),
        }
    }

    pub fn is_closed(&self) -> bool {
        match *self {
            Handle::Closed => true,
            _ => false,
        }
    }
}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Handle::Unopened { ref path, .. } => {
                f.debug_tuple("Unopened").field(path).finish()
            }
            Handle::Open(_) => f.write_str("Open"),
            Handle::Closed => f.write_str("Closed"),
        }
    }
}
