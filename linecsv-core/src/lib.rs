/*!
`linecsv-core` provides the allocation-only parts of a line-oriented CSV
reader and writer. It performs no I/O.

The reading side is split in two steps. A [`LineAssembler`] is fed physical
lines and decides when they form a complete *logical line*, that is, one or
more physical lines that together contain an even number of quote
characters. A [`Splitter`] then breaks a logical line into fields, honoring
delimiters that appear inside quoted fields and collapsing doubled quotes.

The writing side is the inverse: [`needs_quotes`] decides whether a field
must be quoted and an [`Encoder`] serializes whole records.

# Example

```
use linecsv_core::{Encoder, Splitter, Terminator};

let mut out = String::new();
let mut enc = Encoder::with_terminator(',', Terminator::LF);
enc.encode_record(&mut out, &["a", "b,c", "say \"hi\""]);
assert_eq!(out, "a,\"b,c\",\"say \"\"hi\"\"\"\n");

let mut fields = vec![];
Splitter::new(',').split(out.trim_end_matches('\n'), &mut fields).unwrap();
assert_eq!(fields, vec!["a", "b,c", "say \"hi\""]);
```

This crate is `no_std` (it still needs `alloc`) when the default `std`
feature is disabled.
*/

#![deny(missing_docs)]
#![cfg_attr(not(any(test, feature = "std")), no_std)]

extern crate alloc;

pub use crate::reader::{
    count_quotes, strip_nul, Assembled, LineAssembler, MalformedError,
    Splitter, NUL,
};
pub use crate::writer::{needs_quotes, quote_into, Encoder, Terminator};

mod reader;
mod writer;

/// The quote character. It is not configurable.
pub const QUOTE: char = '"';
