/*!
The `linecsv` crate reads and writes delimiter-separated records one line at
a time.

Records are read from any `io::Read` or from a file path, and written to any
`io::Write` or to a file path. A quoted field may contain the delimiter,
doubled quotes and line breaks, in which case a record spans more than one
physical line. Empty and whitespace-only lines between records are skipped.

The parsing and quoting rules themselves live in the `linecsv-core` crate,
which does no I/O and can be used without the standard library.

# Reading

```
use linecsv::ReaderBuilder;

let data = "\
name;comment
alpha;\"one; two\"

beta;\"first line
second line\"
";
let mut rdr = ReaderBuilder::new().delimiter(';').from_reader(data.as_bytes());
for result in rdr.records() {
    let record = result.unwrap();
    assert_eq!(record.len(), 2);
}
```

# Writing

```
use linecsv::{Terminator, WriterBuilder};

let mut wtr = WriterBuilder::new()
    .terminator(Terminator::LF)
    .from_writer(vec![]);
wtr.write_record(&["a", "b,c", "say \"hi\""]).unwrap();
wtr.write_record(vec![Some("d"), None]).unwrap();

let data = String::from_utf8(wtr.into_inner().unwrap()).unwrap();
assert_eq!(data, "a,\"b,c\",\"say \"\"hi\"\"\"\nd,\"\"\n");
```

# Lifecycle

A reader or writer bound to a path opens its file on first use and owns it
until `close` is called or the value is dropped. Using a closed reader or
writer fails with [`Error::Closed`].
*/

#![deny(missing_docs)]

pub use linecsv_core::{MalformedError, Terminator};

pub use crate::error::{Error, Result};
pub use crate::field::ToField;
pub use crate::reader::{
    Position, Reader, ReaderBuilder, StringRecordsIntoIter, StringRecordsIter,
};
pub use crate::string_record::{StringRecord, StringRecordIter};
pub use crate::writer::{Writer, WriterBuilder};

mod error;
mod field;
mod handle;
mod reader;
mod string_record;
#[cfg(test)]
mod tests;
mod writer;
