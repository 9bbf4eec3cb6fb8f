//! The virtual file set threaded between pipeline tasks

use std::time::SystemTime;

use serde::{Deserialize, Serialize};

/// A single named, content-bearing record inside a [`FileSet`].
///
/// Records are values: a task that "modifies" a record produces a new one
/// that replaces the old by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    name: String,
    contents: String,
    modified: Option<SystemTime>,
}

impl FileRecord {
    /// Create a record with no source timestamp.
    pub fn new(name: impl Into<String>, contents: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            contents: contents.into(),
            modified: None,
        }
    }

    /// Attach a source modification timestamp.
    pub fn with_modified(mut self, modified: SystemTime) -> Self {
        self.modified = Some(modified);
        self
    }

    /// Produce a copy of this record with new contents, keeping name and
    /// timestamp.
    pub fn with_contents(&self, contents: impl Into<String>) -> Self {
        Self {
            name: self.name.clone(),
            contents: contents.into(),
            modified: self.modified,
        }
    }

    /// The record's path-like name, unique within a set.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The record's text payload.
    pub fn contents(&self) -> &str {
        &self.contents
    }

    /// The source modification timestamp, if one was captured.
    pub fn modified(&self) -> Option<SystemTime> {
        self.modified
    }
}

/// An ordered, name-unique collection of [`FileRecord`]s.
///
/// Ordering reflects discovery/production order. Inserting a record whose
/// name is already present replaces it *in place*, so pass-through tasks
/// never reorder records they did not touch. Sets move by value between
/// steps; a previous owner keeps no alias.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSet {
    records: Vec<FileRecord>,
}

impl FileSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record, replacing any existing record of the same name at
    /// its current position.
    pub fn insert(&mut self, record: FileRecord) {
        match self.records.iter_mut().find(|r| r.name == record.name) {
            Some(existing) => *existing = record,
            None => self.records.push(record),
        }
    }

    /// Look up a record by name.
    pub fn get(&self, name: &str) -> Option<&FileRecord> {
        self.records.iter().find(|r| r.name == name)
    }

    /// Whether a record with this name is present.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Number of records in the set.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the set holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate records in order.
    pub fn iter(&self) -> impl Iterator<Item = &FileRecord> {
        self.records.iter()
    }

    /// Record names in order.
    pub fn names(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.name.as_str()).collect()
    }

    /// Apply another set on top of this one: records absent here are
    /// appended, records present in both are replaced by `other`'s version
    /// at their current position.
    pub fn merge(&mut self, other: FileSet) {
        for record in other.records {
            self.insert(record);
        }
    }

    /// Join all record contents in order into one text.
    pub fn concatenated(&self) -> String {
        self.records
            .iter()
            .map(|r| r.contents.as_str())
            .collect::<Vec<_>>()
            .concat()
    }
}

impl IntoIterator for FileSet {
    type Item = FileRecord;
    type IntoIter = std::vec::IntoIter<FileRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl FromIterator<FileRecord> for FileSet {
    fn from_iter<I: IntoIterator<Item = FileRecord>>(iter: I) -> Self {
        let mut set = FileSet::new();
        for record in iter {
            set.insert(record);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_keeps_order_and_replaces_in_place() {
        let mut set = FileSet::new();
        set.insert(FileRecord::new("a.txt", "1"));
        set.insert(FileRecord::new("b.txt", "2"));
        set.insert(FileRecord::new("c.txt", "3"));

        set.insert(FileRecord::new("b.txt", "updated"));

        assert_eq!(set.names(), vec!["a.txt", "b.txt", "c.txt"]);
        assert_eq!(set.get("b.txt").unwrap().contents(), "updated");
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn merge_applies_other_on_top() {
        let mut base = FileSet::new();
        base.insert(FileRecord::new("x", "old"));
        base.insert(FileRecord::new("y", "keep"));

        let mut overlay = FileSet::new();
        overlay.insert(FileRecord::new("x", "new"));
        overlay.insert(FileRecord::new("z", "added"));

        base.merge(overlay);

        assert_eq!(base.names(), vec!["x", "y", "z"]);
        assert_eq!(base.get("x").unwrap().contents(), "new");
        assert_eq!(base.get("y").unwrap().contents(), "keep");
        assert_eq!(base.get("z").unwrap().contents(), "added");
    }

    #[test]
    fn concatenated_joins_in_order() {
        let set: FileSet = [
            FileRecord::new("1", "ab"),
            FileRecord::new("2", "cd"),
            FileRecord::new("3", "ef"),
        ]
        .into_iter()
        .collect();

        assert_eq!(set.concatenated(), "abcdef");
    }

    #[test]
    fn with_contents_preserves_identity() {
        let original = FileRecord::new("page.md", "# Hi").with_modified(SystemTime::UNIX_EPOCH);
        let rewritten = original.with_contents("<h1>Hi</h1>");

        assert_eq!(rewritten.name(), "page.md");
        assert_eq!(rewritten.contents(), "<h1>Hi</h1>");
        assert_eq!(rewritten.modified(), Some(SystemTime::UNIX_EPOCH));
    }

    #[test]
    fn empty_set() {
        let set = FileSet::new();
        assert!(set.is_empty());
        assert_eq!(set.len(), 0);
        assert!(!set.contains("anything"));
        assert_eq!(set.concatenated(), "");
    }
}
