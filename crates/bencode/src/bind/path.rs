//! Location of a value inside a record, for diagnostics.

use std::fmt;

/// One step into a nested value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Record field, by identifier.
    Field(&'static str),
    /// List element.
    Index(usize),
    /// Map entry.
    Key(String),
}

/// Path from the bound root to a nested value, e.g. `info.files[2].length`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldPath {
    segments: Vec<Segment>,
}

impl FieldPath {
    /// Creates the root path.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the segments from the root down.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Returns true for the root path.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Runs `f` with `segment` appended to the path.
    pub fn with<R>(&mut self, segment: Segment, f: impl FnOnce(&mut FieldPath) -> R) -> R {
        self.segments.push(segment);
        let result = f(self);
        self.segments.pop();
        result
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("<root>");
        }
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Field(name) if i == 0 => f.write_str(name)?,
                Segment::Field(name) => write!(f, ".{name}")?,
                Segment::Index(index) => write!(f, "[{index}]")?,
                Segment::Key(key) => write!(f, "[{key:?}]")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let mut path = FieldPath::new();
        assert_eq!(path.to_string(), "<root>");

        let shown = path.with(Segment::Field("info"), |p| {
            p.with(Segment::Field("files"), |p| {
                p.with(Segment::Index(2), |p| {
                    p.with(Segment::Field("length"), |p| p.to_string())
                })
            })
        });
        assert_eq!(shown, "info.files[2].length");
        assert!(path.is_root());

        let shown = path.with(Segment::Index(0), |p| {
            p.with(Segment::Key("x".into()), |p| p.to_string())
        });
        assert_eq!(shown, "[0][\"x\"]");
    }
}
