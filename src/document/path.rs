//! Resource paths, document keys and field paths
//!
//! A resource path is a `/`-separated list of segments alternating collection ids
//! and document ids. A document key is a resource path with an even, non-zero
//! number of segments. A field path addresses a (possibly nested) field inside a
//! document's field map.

use std::fmt;

/// Slash-separated path to a collection or document.
///
/// Ordering is segment-wise lexicographic, a shorter prefix ordering first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ResourcePath {
    segments: Vec<String>,
}

impl ResourcePath {
    /// Parses a path, ignoring leading, trailing and repeated `/`.
    pub fn parse(path: &str) -> Self {
        Self {
            segments: path
                .split('/')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn last_segment(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// Path without its last segment. The parent of an empty path is empty.
    pub fn parent(&self) -> ResourcePath {
        let end = self.segments.len().saturating_sub(1);
        Self {
            segments: self.segments[..end].to_vec(),
        }
    }
}

impl fmt::Display for ResourcePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("/"))
    }
}

/// Identity of a document: `collection/doc[/subcollection/doc...]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentKey {
    path: ResourcePath,
}

impl DocumentKey {
    /// Returns `None` unless the path has an even, non-zero number of segments.
    pub fn from_path(path: ResourcePath) -> Option<Self> {
        if path.is_empty() || path.len() % 2 != 0 {
            return None;
        }
        Some(Self { path })
    }

    pub fn parse(path: &str) -> Option<Self> {
        Self::from_path(ResourcePath::parse(path))
    }

    pub fn path(&self) -> &ResourcePath {
        &self.path
    }

    /// Path of the collection containing this document.
    pub fn collection_path(&self) -> ResourcePath {
        self.path.parent()
    }

    /// Id of the collection containing this document.
    pub fn collection_id(&self) -> &str {
        &self.path.segments[self.path.len() - 2]
    }

    pub fn document_id(&self) -> &str {
        &self.path.segments[self.path.len() - 1]
    }
}

impl fmt::Display for DocumentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path)
    }
}

/// Dotted path to a field. `__name__`, `__update_time__` and `__create_time__`
/// address the synthetic document fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath {
    segments: Vec<String>,
}

impl FieldPath {
    pub const KEY: &'static str = "__name__";
    pub const UPDATE_TIME: &'static str = "__update_time__";
    pub const CREATE_TIME: &'static str = "__create_time__";

    /// Parses a dotted path. A segment wrapped in backticks may contain dots.
    pub fn parse(path: &str) -> Self {
        let mut segments = Vec::new();
        let mut current = String::new();
        let mut quoted = false;

        for c in path.chars() {
            match c {
                '`' => quoted = !quoted,
                '.' if !quoted => segments.push(std::mem::take(&mut current)),
                _ => current.push(c),
            }
        }
        segments.push(current);

        Self { segments }
    }

    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    pub fn key() -> Self {
        Self::from_segments([Self::KEY])
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Name of the synthetic field this path addresses, if any.
    pub fn synthetic(&self) -> Option<&str> {
        match self.segments.as_slice() {
            [single]
                if single == Self::KEY
                    || single == Self::UPDATE_TIME
                    || single == Self::CREATE_TIME =>
            {
                Some(single.as_str())
            }
            _ => None,
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            if segment.contains('.') {
                write!(f, "`{}`", segment)?;
            } else {
                write!(f, "{}", segment)?;
            }
        }
        Ok(())
    }
}

impl From<&str> for FieldPath {
    fn from(path: &str) -> Self {
        Self::parse(path)
    }
}
