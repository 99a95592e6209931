//! Field tags: `name`, `name,omitempty` or `-`.

/// Parsed field tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tag<'a> {
    /// Wire key; empty means "use the field identifier".
    pub name: &'a str,
    /// Tolerate a missing key on bind, skip empty values on encode.
    pub omit_empty: bool,
    /// Exclude the field in both directions.
    pub skip: bool,
}

impl<'a> Tag<'a> {
    /// Parses a raw tag. Unknown options are ignored.
    pub const fn parse(raw: &'a str) -> Self {
        let bytes = raw.as_bytes();
        if let [b'-'] = bytes {
            return Self {
                name: "",
                omit_empty: false,
                skip: true,
            };
        }

        let (name, mut options) = bytes.split_at(find_comma(bytes));
        let mut omit_empty = false;
        while let [b',', rest @ ..] = options {
            let (option, tail) = rest.split_at(find_comma(rest));
            if bytes_eq(option.trim_ascii(), b"omitempty") {
                omit_empty = true;
            }
            options = tail;
        }

        // Split at an ASCII comma, so the prefix is still UTF-8.
        let name = match std::str::from_utf8(name.trim_ascii()) {
            Ok(name) => name,
            Err(_) => "",
        };
        Self {
            name,
            omit_empty,
            skip: false,
        }
    }
}

const fn find_comma(bytes: &[u8]) -> usize {
    let mut i = 0;
    while i < bytes.len() && bytes[i] != b',' {
        i += 1;
    }
    i
}

const fn bytes_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut i = 0;
    while i < a.len() {
        if a[i] != b[i] {
            return false;
        }
        i += 1;
    }
    true
}

/// One entry of a record's field table.
///
/// The tag is parsed once, when the table is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Rust identifier of the field.
    pub ident: &'static str,
    /// Raw tag, if the field carries one.
    pub raw_tag: Option<&'static str>,
    tag: Tag<'static>,
}

impl FieldSpec {
    pub const fn new(ident: &'static str, raw_tag: Option<&'static str>) -> Self {
        let tag = match raw_tag {
            Some(raw) => Tag::parse(raw),
            None => Tag::parse(""),
        };
        Self { ident, raw_tag, tag }
    }

    /// Returns the parsed tag; untagged fields get the empty tag.
    pub const fn tag(&self) -> Tag<'static> {
        self.tag
    }

    /// Returns the wire key: the tag name, or the identifier when the tag
    /// has no name.
    pub const fn key(&self) -> &'static str {
        if self.tag.name.is_empty() {
            self.ident
        } else {
            self.tag.name
        }
    }
}
