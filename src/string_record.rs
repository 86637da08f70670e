use std::iter::FromIterator;
use std::ops;
use std::slice;

/// A single CSV record: an ordered list of text fields.
///
/// Fields may be empty but are never absent. Records read from the same
/// source may have different lengths.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct StringRecord(Vec<String>);

impl StringRecord {
    /// Create a new empty `StringRecord`.
    pub fn new() -> StringRecord {
        StringRecord(Vec::new())
    }

    /// Create a new empty `StringRecord` with room for `capacity` fields.
    pub fn with_capacity(capacity: usize) -> StringRecord {
        StringRecord(Vec::with_capacity(capacity))
    }

    /// Return the field at index `i`.
    ///
    /// If no field at index `i` exists, then this returns `None`.
    pub fn get(&self, i: usize) -> Option<&str> {
        self.0.get(i).map(|field| field.as_str())
    }

    /// Returns true if and only if this record is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of fields in this record.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Clear this record so that it has zero fields.
    ///
    /// The reader only ever appends to a record, so a record reused across
    /// calls to `Reader::read_record` must be cleared by the caller.
    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Add a new field to the end of this record.
    pub fn push_field(&mut self, field: &str) {
        self.0.push(field.to_string());
    }

    /// Returns an iterator over all fields in this record.
    pub fn iter(&self) -> StringRecordIter<'_> {
        StringRecordIter(self.0.iter())
    }

    /// The fields of this record as a slice.
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Consume this record and return its fields.
    pub fn into_vec(self) -> Vec<String> {
        self.0
    }

    pub(crate) fn fields_mut(&mut self) -> &mut Vec<String> {
        &mut self.0
    }
}

impl ops::Index<usize> for StringRecord {
    type Output = str;
    fn index(&self, i: usize) -> &str {
        &self.0[i]
    }
}

impl<T: AsRef<str>> PartialEq<[T]> for StringRecord {
    fn eq(&self, other: &[T]) -> bool {
        self.len() == other.len()
            && self.iter().zip(other).all(|(a, b)| a == b.as_ref())
    }
}

impl<'a, T: AsRef<str>> PartialEq<[T]> for &'a StringRecord {
    fn eq(&self, other: &[T]) -> bool {
        **self == *other
    }
}

impl<T: AsRef<str>> PartialEq<Vec<T>> for StringRecord {
    fn eq(&self, other: &Vec<T>) -> bool {
        *self == **other
    }
}

impl<'a, T: AsRef<str>> PartialEq<Vec<T>> for &'a StringRecord {
    fn eq(&self, other: &Vec<T>) -> bool {
        **self == **other
    }
}

impl<T: Into<String>> From<Vec<T>> for StringRecord {
    fn from(fields: Vec<T>) -> StringRecord {
        fields.into_iter().collect()
    }
}

impl<'a> From<&'a [&'a str]> for StringRecord {
    fn from(fields: &'a [&'a str]) -> StringRecord {
        fields.iter().map(|&field| field).collect()
    }
}

impl<T: Into<String>> FromIterator<T> for StringRecord {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> StringRecord {
        StringRecord(iter.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<String>> Extend<T> for StringRecord {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.0.extend(iter.into_iter().map(Into::into));
    }
}

impl<'a> IntoIterator for &'a StringRecord {
    type IntoIter = StringRecordIter<'a>;
    type Item = &'a str;

    fn into_iter(self) -> StringRecordIter<'a> {
        self.iter()
    }
}

/// An iterator over the fields in a string record.
#[derive(Clone, Debug)]
pub struct StringRecordIter<'a>(slice::Iter<'a, String>);

impl<'a> Iterator for StringRecordIter<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        self.0.next().map(|field| field.as_str())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl<'a> DoubleEndedIterator for StringRecordIter<'a> {
    fn next_back(&mut self) -> Option<&'a str> {
        self.0.next_back().map(|field| field.as_str())
    }
}

impl<'a> ExactSizeIterator for StringRecordIter<'a> {}

#[cfg(test)]
mod tests {
    use super::StringRecord;

    #[test]
    fn build_and_compare() {
        let mut rec = StringRecord::new();
        assert!(rec.is_empty());
        rec.push_field("a");
        rec.push_field("");
        assert_eq!(2, rec.len());
        assert_eq!(rec, vec!["a", ""]);
        assert_eq!(Some(""), rec.get(1));
        assert_eq!(None, rec.get(2));
        assert_eq!("a", &rec[0]);
    }

    #[test]
    fn from_and_collect() {
        let a = StringRecord::from(vec!["x", "y"]);
        let b: StringRecord = vec!["x".to_string(), "y".to_string()]
            .into_iter()
            .collect();
        assert_eq!(a, b);
        assert_eq!(vec!["x", "y"], a.iter().collect::<Vec<_>>());
        assert_eq!(vec!["x".to_string(), "y".to_string()], a.into_vec());
    }

    #[test]
    fn extend_appends() {
        let mut rec = StringRecord::from(vec!["a"]);
        rec.extend(vec!["b", "c"]);
        assert_eq!(rec, vec!["a", "b", "c"]);
        rec.clear();
        assert!(rec.is_empty());
    }
}
