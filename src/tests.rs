use std::fs::File;

use quickcheck::{quickcheck, TestResult};

use linecsv_core::{Encoder, MalformedError};

use crate::{
    Error, Reader, ReaderBuilder, StringRecord, Terminator, Writer,
    WriterBuilder,
};

type Csv = Vec<Vec<String>>;

macro_rules! csv {
    ($([$($field:expr),*]),*) => {{
        #[allow(unused_mut)]
        let mut csv: Csv = vec![];
        $(
            #[allow(unused_mut)]
            let mut row: Vec<String> = vec![];
            $(row.push(String::from($field));)*
            csv.push(row);
        )*
        csv
    }}
}

fn read_all(data: &str, delimiter: char) -> Result<Csv, Error> {
    let mut rdr =
        ReaderBuilder::new().delimiter(delimiter).from_reader(data.as_bytes());
    rdr.records()
        .map(|result| result.map(StringRecord::into_vec))
        .collect()
}

fn lf_writer(delimiter: char) -> Writer<Vec<u8>> {
    WriterBuilder::new()
        .delimiter(delimiter)
        .terminator(Terminator::LF)
        .from_writer(vec![])
}

fn into_string(wtr: Writer<Vec<u8>>) -> String {
    String::from_utf8(wtr.into_inner().unwrap()).unwrap()
}

macro_rules! parses_to {
    ($name:ident, $data:expr, $expected:expr) => {
        parses_to!($name, $data, $expected, ',');
    };
    ($name:ident, $data:expr, $expected:expr, $delim:expr) => {
        #[test]
        fn $name() {
            let got = read_all($data, $delim).unwrap();
            assert_eq!($expected, got);
        }
    };
}

macro_rules! fails_with {
    ($name:ident, $data:expr, $err:expr) => {
        #[test]
        fn $name() {
            match read_all($data, ',') {
                Err(Error::Malformed { err, .. }) => assert_eq!($err, err),
                res => panic!("expected malformed error, got {:?}", res),
            }
        }
    };
}

parses_to!(simple, "a,b\nc,d\n", csv![["a", "b"], ["c", "d"]]);
parses_to!(no_final_newline, "a,b\nc,d", csv![["a", "b"], ["c", "d"]]);
parses_to!(crlf, "a,b\r\nc,d\r\n", csv![["a", "b"], ["c", "d"]]);
parses_to!(empty_input, "", csv![]);
parses_to!(only_blank_lines, "\n \n\t\r\n", csv![]);
parses_to!(
    blank_lines_between,
    "a,b\n\n   \n\t\nc,d\n",
    csv![["a", "b"], ["c", "d"]]
);
parses_to!(
    multi_line_field,
    "a,\"b\nc\",d\n",
    csv![["a", "b\nc", "d"]]
);
parses_to!(
    multi_line_field_keeps_crlf,
    "a,\"b\r\nc\",d\r\n",
    csv![["a", "b\r\nc", "d"]]
);
parses_to!(
    blank_line_inside_quotes,
    "\"a\n\n\nb\"\n",
    csv![["a\n\n\nb"]]
);
parses_to!(trailing_delimiter, "a,b,\n", csv![["a", "b"]]);
parses_to!(leading_delimiter, ",a,b\n", csv![["", "a", "b"]]);
parses_to!(interior_empty, "a,,,b\n", csv![["a", "", "", "b"]]);
parses_to!(trimmed, "  a ,  b  \n", csv![["a", "b"]]);
parses_to!(
    quoted_delimiter_and_quotes,
    "\"a,b\",\"say \"\"hi\"\"\"\n",
    csv![["a,b", "say \"hi\""]]
);
parses_to!(ragged, "a\nb,c,d\ne,f\n", csv![["a"], ["b", "c", "d"], ["e", "f"]]);
parses_to!(semicolons, "a;\"b;c\"\n", csv![["a", "b;c"]], ';');
parses_to!(tabs, "a\tb\n", csv![["a", "b"]], '\t');
parses_to!(multibyte, "a→\"b→c\"\n", csv![["a", "b→c"]], '→');

fails_with!(unterminated_at_eof, "a,\"b\nc\n", MalformedError::UnterminatedQuote);
fails_with!(quote_in_unquoted, "a\"b\",c\n", MalformedError::QuoteInUnquotedField);
fails_with!(quote_in_unquoted_eof, "a\"b,c\n", MalformedError::UnterminatedQuote);
fails_with!(unescaped_quote, "\"a\"b\"c\"\n", MalformedError::UnescapedQuote);

#[test]
fn multi_line_record_consumes_two_lines() {
    let mut rdr = Reader::from_reader("a,\"b\nc\",d\nx\n".as_bytes());
    let mut rec = StringRecord::new();

    assert!(rdr.read_record(&mut rec).unwrap());
    assert_eq!(rec, vec!["a", "b\nc", "d"]);
    assert_eq!(1, rdr.position().line());

    rec.clear();
    assert!(rdr.read_record(&mut rec).unwrap());
    assert_eq!(rec, vec!["x"]);
    assert_eq!(3, rdr.position().line());
    assert_eq!(1, rdr.position().record());
}

#[test]
fn blank_lines_yield_exactly_two_records() {
    let mut rdr = Reader::from_reader("first\n\n \t \n\nsecond\n\n".as_bytes());
    assert_eq!(2, rdr.records().count());
}

#[test]
fn nulls_and_empties_round_trip() {
    let mut wtr = lf_writer(',');
    wtr.write_record(vec![Some("a"), Some(""), None, Some("b")]).unwrap();
    let data = into_string(wtr);
    assert_eq!("a,,,b\n", data);
    assert_eq!(csv![["a", "", "", "b"]], read_all(&data, ',').unwrap());
}

#[test]
fn trailing_empty_round_trip() {
    let mut wtr = lf_writer(',');
    wtr.write_record(&["a", ""]).unwrap();
    wtr.write_record(&[""]).unwrap();
    let data = into_string(wtr);
    assert_eq!(csv![["a", ""], [""]], read_all(&data, ',').unwrap());
}

#[test]
fn writer_output_reads_back() {
    let rows = csv![
        ["plain", "with,comma", "with \"quote\""],
        ["multi\nline", "crlf\r\ninside", ""],
        ["", "", "end"]
    ];
    let mut wtr = lf_writer(',');
    for row in &rows {
        wtr.write_record(row).unwrap();
    }
    let data = into_string(wtr);
    assert_eq!(rows, read_all(&data, ',').unwrap());
}

fn encoded_line(delimiter: char, record: &[String]) -> String {
    let mut enc = Encoder::with_terminator(delimiter, Terminator::LF);
    let mut out = String::new();
    for field in record {
        enc.encode_field(&mut out, Some(field.as_str()));
    }
    out
}

/// Records that cannot survive a round trip: empty records, unquoted fields
/// with edge spaces (which the reader trims) and records whose line is blank
/// (which the reader skips).
fn unrepresentable(delimiter: char, record: &[String]) -> bool {
    record.is_empty()
        || record.iter().any(|field| {
            !linecsv_core::needs_quotes(field, delimiter)
                && field.trim_matches(' ') != field
        })
        || encoded_line(delimiter, record).trim().is_empty()
}

fn round_trips(delimiter: char, records: Csv) -> TestResult {
    let records: Csv = records
        .into_iter()
        .filter(|rec| !unrepresentable(delimiter, rec))
        .collect();
    if records.is_empty() {
        return TestResult::discard();
    }
    let mut wtr = lf_writer(delimiter);
    for rec in &records {
        if wtr.write_record(rec).is_err() {
            return TestResult::failed();
        }
    }
    let data = into_string(wtr);
    match read_all(&data, delimiter) {
        Ok(got) => TestResult::from_bool(got == records),
        Err(_) => TestResult::failed(),
    }
}

#[test]
fn round_trip_comma() {
    fn prop(records: Csv) -> TestResult {
        round_trips(',', records)
    }
    quickcheck(prop as fn(Csv) -> TestResult);
}

#[test]
fn round_trip_other_delimiters() {
    fn prop(records: Csv) -> TestResult {
        for &delimiter in &[';', '\t', '|', '→'] {
            let res = round_trips(delimiter, records.clone());
            if res.is_failure() {
                return res;
            }
        }
        TestResult::passed()
    }
    quickcheck(prop as fn(Csv) -> TestResult);
}

#[test]
fn round_trip_special_fields() {
    let special = csv![
        [",", "\"", "\r", "\n", "\r\n"],
        ["\"\"", "a\"\"b", " \"x\" ", "line\n\nbreaks"],
        ["\t", "x", "\t"]
    ];
    for &delimiter in &[',', ';', '\t', '|', '→'] {
        for rec in &special {
            let res = round_trips(delimiter, vec![rec.clone()]);
            assert!(!res.is_failure(), "{:?} with {:?}", rec, delimiter);
        }
    }
}

#[test]
fn readers_and_writers_are_send() {
    fn assert_send<T: Send>() {}

    assert_send::<Reader<&'static [u8]>>();
    assert_send::<Reader<File>>();
    assert_send::<Writer<Vec<u8>>>();
    assert_send::<Writer<File>>();
}
