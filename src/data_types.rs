// src/data_types.rs
use std::collections::BTreeMap;

/// Rows of cells as returned by the sheet, header row first.
pub type RawGrid = Vec<Vec<String>>;

/// One data row keyed by the header names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: BTreeMap<String, String>,
}

impl Record {
    pub fn new() -> Self {
        Record {
            fields: BTreeMap::new(),
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(field.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The primary display field.
    pub fn text(&self) -> Option<&str> {
        self.get("text")
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (field, value) in iter {
            record.insert(field, value);
        }
        record
    }
}

/// What the fetch pipeline asks the data source for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub generation: u64,
    pub source_id: String,
    pub access_key: String,
}

/// The record currently on screen, with the position used to tell
/// successive selections apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub key: usize,
    pub record: Record,
}

/// Shared between the two schedulers: the fetch side replaces `records`,
/// the rotation side moves `cursor`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RotationState {
    records: Vec<Record>,
    cursor: Option<usize>,
}

impl RotationState {
    pub fn new() -> Self {
        RotationState::default()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// Swaps in a new record set. The cursor is left alone; the next
    /// advance recomputes it against the new length.
    pub fn replace_records(&mut self, records: Vec<Record>) {
        self.records = records;
    }

    pub fn advance(&mut self) -> Option<Selection> {
        if self.records.is_empty() {
            self.cursor = None;
            return None;
        }

        let next = self.cursor.map_or(0, |index| index + 1);
        let index = if next >= self.records.len() { 0 } else { next };
        self.cursor = Some(index);

        Some(Selection {
            key: index,
            record: self.records[index].clone(),
        })
    }
}
