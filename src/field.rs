use std::borrow::Cow;

/// A value that can be written as a single CSV field.
///
/// `to_field` returns `None` for a null value, which is written as an empty
/// field. Integers are formatted with `itoa` and floats with `ryu`.
///
/// ```
/// use linecsv::{Terminator, WriterBuilder};
///
/// let mut wtr = WriterBuilder::new()
///     .terminator(Terminator::LF)
///     .from_writer(vec![]);
/// wtr.write_field("n").unwrap();
/// wtr.write_field(42u32).unwrap();
/// wtr.write_field(1.5f64).unwrap();
/// wtr.write_field(None::<&str>).unwrap();
/// wtr.write_field(true).unwrap();
/// wtr.write_terminator().unwrap();
///
/// let data = String::from_utf8(wtr.into_inner().unwrap()).unwrap();
/// assert_eq!(data, "n,42,1.5,,true\n");
/// ```
pub trait ToField {
    /// The text of this field, or `None` if it is null.
    fn to_field(&self) -> Option<Cow<'_, str>>;
}

impl ToField for str {
    fn to_field(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed(self))
    }
}

impl ToField for String {
    fn to_field(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed(self.as_str()))
    }
}

impl<'a> ToField for Cow<'a, str> {
    fn to_field(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed(&**self))
    }
}

impl<'a, T: ToField + ?Sized> ToField for &'a T {
    fn to_field(&self) -> Option<Cow<'_, str>> {
        (**self).to_field()
    }
}

impl<T: ToField> ToField for Option<T> {
    fn to_field(&self) -> Option<Cow<'_, str>> {
        self.as_ref().and_then(|value| value.to_field())
    }
}

impl ToField for char {
    fn to_field(&self) -> Option<Cow<'_, str>> {
        let mut buf = [0; 4];
        Some(Cow::Owned(self.encode_utf8(&mut buf).to_string()))
    }
}

impl ToField for bool {
    fn to_field(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed(if *self { "true" } else { "false" }))
    }
}

macro_rules! int_field {
    ($($ty:ty),*) => {
        $(
            impl ToField for $ty {
                fn to_field(&self) -> Option<Cow<'_, str>> {
                    let mut buf = itoa::Buffer::new();
                    Some(Cow::Owned(buf.format(*self).to_string()))
                }
            }
        )*
    };
}

macro_rules! float_field {
    ($($ty:ty),*) => {
        $(
            impl ToField for $ty {
                fn to_field(&self) -> Option<Cow<'_, str>> {
                    let mut buf = ryu::Buffer::new();
                    Some(Cow::Owned(buf.format(*self).to_string()))
                }
            }
        )*
    };
}

int_field!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);
float_field!(f32, f64);

#[cfg(test)]
mod tests {
    use std::borrow::Cow;

    use super::ToField;

    fn text<T: ToField>(value: T) -> Option<String> {
        value.to_field().map(|field| field.into_owned())
    }

    #[test]
    fn strings() {
        assert_eq!(Some("a".to_string()), text("a"));
        assert_eq!(Some("b".to_string()), text("b".to_string()));
        assert_eq!(Some("c".to_string()), text(Cow::Borrowed("c")));
        assert_eq!(Some("é".to_string()), text('é'));
        assert_eq!(Some("".to_string()), text(""));
    }

    #[test]
    fn nulls() {
        assert_eq!(None, text(None::<&str>));
        assert_eq!(Some("x".to_string()), text(Some("x")));
        assert_eq!(None, text(Some(None::<u8>)));
    }

    #[test]
    fn numbers() {
        assert_eq!(Some("-17".to_string()), text(-17i32));
        assert_eq!(Some("18446744073709551615".to_string()), text(u64::MAX));
        assert_eq!(Some("0.25".to_string()), text(0.25f64));
        assert_eq!(Some("1.0".to_string()), text(1f32));
        assert_eq!(Some("false".to_string()), text(false));
    }
}
