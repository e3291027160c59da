//! Entry building and the resulting collection.
//!
//! The record type is the caller's: an [`EntryBuilder`] receives each
//! rendered page (path, attributes, HTML body) and returns whatever it
//! likes. A builder error stops the compilation.
//!
//! ```rust,ignore
//! let post = |path: &Path, attrs: Attributes, body: String| -> Result<Post, BoxError> {
//!     let title = attrs.get("title").and_then(|v| v.as_str()).ok_or("missing title")?;
//!     Ok(Post { slug: slug_of(path), title: title.to_string(), body })
//! };
//! ```

use crate::types::Attributes;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Error type for builder failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Turns one rendered page into a record.
pub trait EntryBuilder {
    type Entry;

    fn build(
        &self,
        path: &Path,
        attributes: Attributes,
        body: String,
    ) -> Result<Self::Entry, BoxError>;
}

impl<F, E> EntryBuilder for F
where
    F: Fn(&Path, Attributes, String) -> Result<E, BoxError>,
{
    type Entry = E;

    fn build(&self, path: &Path, attributes: Attributes, body: String) -> Result<E, BoxError> {
        self(path, attributes, body)
    }
}

/// Ordered records under one name.
///
/// Order is discovery order of (file, record) pairs. Nothing is sorted or
/// deduplicated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection<E> {
    pub name: String,
    pub entries: Vec<E>,
}

impl<E> Collection<E> {
    pub fn new(name: impl Into<String>, entries: Vec<E>) -> Self {
        Self {
            name: name.into(),
            entries,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&E> {
        self.entries.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, E> {
        self.entries.iter()
    }

    pub fn into_entries(self) -> Vec<E> {
        self.entries
    }
}

impl<'a, E> IntoIterator for &'a Collection<E> {
    type Item = &'a E;
    type IntoIter = std::slice::Iter<'a, E>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Record kept by [`PageEntryBuilder`]: the rendered page as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageEntry {
    pub path: PathBuf,
    pub attributes: Attributes,
    pub body: String,
}

/// Builder that keeps every page unchanged. Used by the command-line tool.
#[derive(Debug, Clone, Copy, Default)]
pub struct PageEntryBuilder;

impl EntryBuilder for PageEntryBuilder {
    type Entry = PageEntry;

    fn build(&self, path: &Path, attributes: Attributes, body: String) -> Result<PageEntry, BoxError> {
        Ok(PageEntry {
            path: path.to_path_buf(),
            attributes,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn page_entry_builder_keeps_everything() {
        let mut attrs = Attributes::new();
        attrs.insert("title".into(), json!("Hello"));
        let entry = PageEntryBuilder
            .build(Path::new("posts/a.md"), attrs.clone(), "<p>x</p>".into())
            .unwrap();
        assert_eq!(entry.path, PathBuf::from("posts/a.md"));
        assert_eq!(entry.attributes, attrs);
        assert_eq!(entry.body, "<p>x</p>");
    }

    #[test]
    fn closure_builder_can_fail() {
        let needs_title = |_: &Path, attrs: Attributes, _: String| -> Result<String, BoxError> {
            attrs
                .get("title")
                .and_then(|v| v.as_str())
                .map(str::to_string)
                .ok_or_else(|| "missing title".into())
        };
        let err = needs_title
            .build(Path::new("a.md"), Attributes::new(), String::new())
            .unwrap_err();
        assert_eq!(err.to_string(), "missing title");
    }

    #[test]
    fn collection_accessors() {
        let c = Collection::new("posts", vec![3, 1, 2]);
        assert_eq!(c.len(), 3);
        assert_eq!(c.get(0), Some(&3));
        assert_eq!(c.iter().copied().collect::<Vec<_>>(), vec![3, 1, 2]);
        assert_eq!((&c).into_iter().count(), 3);
        assert_eq!(c.into_entries(), vec![3, 1, 2]);
    }
}
