//! Flat records and column synchronization across a record set.

use std::collections::btree_map::{self, BTreeMap};
use std::collections::BTreeSet;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One flattened element: underscore-joined tag paths mapped to text values.
///
/// A `None` value is the null marker inserted by [`sync_schema`] for columns
/// that only exist in other records. Keys are kept sorted; their order carries
/// no meaning.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct FlatRecord {
    fields: BTreeMap<String, Option<String>>,
}

impl FlatRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` under `key` unless the key already holds a value.
    ///
    /// Returns `false` when the key was taken; the earlier value is kept.
    pub fn insert_first(&mut self, key: impl Into<String>, value: Option<String>) -> bool {
        match self.fields.entry(key.into()) {
            btree_map::Entry::Vacant(slot) => {
                slot.insert(value);
                true
            }
            btree_map::Entry::Occupied(_) => false,
        }
    }

    /// `None` when the key is absent, `Some(None)` for an explicit null.
    pub fn get(&self, key: &str) -> Option<Option<&str>> {
        self.fields.get(key).map(Option::as_deref)
    }

    /// Text value of `key`, treating absent keys and nulls alike.
    pub fn value(&self, key: &str) -> Option<&str> {
        self.get(key).flatten()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> + '_ {
        self.fields
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_deref()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn into_map(self) -> BTreeMap<String, Option<String>> {
        self.fields
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FlatRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = FlatRecord::new();
        for (key, value) in iter {
            record.insert_first(key, Some(value.into()));
        }
        record
    }
}

/// Records extracted from one document, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct RecordSet {
    records: Vec<FlatRecord>,
}

impl RecordSet {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&FlatRecord> {
        self.records.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FlatRecord> {
        self.records.iter()
    }

    pub fn records(&self) -> &[FlatRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<FlatRecord> {
        self.records
    }

    /// Shared column names, sorted. After synchronization every record
    /// carries exactly these keys.
    pub fn columns(&self) -> Vec<&str> {
        let columns: BTreeSet<&str> = self
            .records
            .iter()
            .flat_map(|record| record.keys())
            .collect();
        columns.into_iter().collect()
    }
}

impl std::ops::Index<usize> for RecordSet {
    type Output = FlatRecord;

    fn index(&self, index: usize) -> &FlatRecord {
        &self.records[index]
    }
}

impl IntoIterator for RecordSet {
    type Item = FlatRecord;
    type IntoIter = std::vec::IntoIter<FlatRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a RecordSet {
    type Item = &'a FlatRecord;
    type IntoIter = std::slice::Iter<'a, FlatRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Give every record the union of all keys, filling the gaps with nulls.
pub fn sync_schema(records: Vec<FlatRecord>) -> RecordSet {
    let columns: BTreeSet<String> = records
        .iter()
        .flat_map(|record| record.fields.keys().cloned())
        .collect();
    debug!(
        records = records.len(),
        columns = columns.len(),
        "synchronizing record columns"
    );
    let records = records
        .into_iter()
        .map(|mut record| {
            for column in &columns {
                if !record.fields.contains_key(column) {
                    record.fields.insert(column.clone(), None);
                }
            }
            record
        })
        .collect();
    RecordSet { records }
}
