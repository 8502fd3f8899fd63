#![cfg_attr(docsrs, feature(doc_cfg))]
//! Extract flat, column-synchronized records from XML documents.
//!
//! ```rust
//! use xmlflat_core::{extract, ExtractOptions};
//!
//! let xml = "<orders><order><id>1</id><total>9.50</total></order>\
//!            <order><id>2</id><note>gift</note></order></orders>";
//! let records = extract(xml, "orders/order", &ExtractOptions::default())?;
//! assert_eq!(records.len(), 2);
//! assert_eq!(records[0].value("orders_order_total"), Some("9.50"));
//! assert_eq!(records[0].get("orders_order_note"), Some(None));
//! # Ok::<(), xmlflat_core::FlattenError>(())
//! ```

pub mod ancestry;
pub mod flatten;
pub mod locate;
pub mod record;

use std::collections::BTreeSet;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, trace};
use xml_tree::{Document, XmlError};

pub use ancestry::{ancestor_matches, AncestorPath};
pub use flatten::flatten;
pub use locate::{locate, PathExpression};
pub use record::{sync_schema, FlatRecord, RecordSet};

/// Error type produced by record extraction.
#[derive(Debug, Error)]
pub enum FlattenError {
    /// The input text is not well-formed XML.
    #[error(transparent)]
    Parse(#[from] XmlError),
    /// The tag path contains an empty segment.
    #[error("invalid path expression: {0}")]
    InvalidPath(String),
}

/// Exact output keys permitted in a record. An empty list permits every key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct FieldAllowList {
    keys: BTreeSet<String>,
}

impl FieldAllowList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether `key` may appear in a record.
    pub fn permits(&self, key: &str) -> bool {
        self.keys.is_empty() || self.keys.contains(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.keys.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for FieldAllowList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        FieldAllowList {
            keys: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Knobs controlling how matched elements are flattened.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct ExtractOptions {
    /// Keys allowed in the output; empty keeps everything.
    pub fields: FieldAllowList,
    /// Deepest level expanded below the matched element; `0` is unlimited.
    pub max_level: usize,
    /// Emit `<key>_attr_<name>` entries for attributes.
    pub include_attributes: bool,
    /// Leave the matched element's own tag name out of every key.
    pub skip_leading_tag: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        ExtractOptions {
            fields: FieldAllowList::new(),
            max_level: 0,
            include_attributes: true,
            skip_leading_tag: false,
        }
    }
}

impl ExtractOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict the output to the given keys.
    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().collect();
        self
    }

    pub fn max_level(mut self, level: usize) -> Self {
        self.max_level = level;
        self
    }

    pub fn include_attributes(mut self, enable: bool) -> Self {
        self.include_attributes = enable;
        self
    }

    pub fn skip_leading_tag(mut self, enable: bool) -> Self {
        self.skip_leading_tag = enable;
        self
    }
}

/// Parse `xml` and flatten every element selected by `path`.
///
/// `path` is a `/`-separated tag chain such as `"tag1/tag2"`; the empty path
/// selects the top-level elements. An empty [`RecordSet`] means nothing
/// matched.
pub fn extract(
    xml: &str,
    path: &str,
    options: &ExtractOptions,
) -> Result<RecordSet, FlattenError> {
    let expr = PathExpression::parse(path)?;
    let document = Document::parse(xml)?;
    Ok(extract_from(&document, &expr, options))
}

/// Flatten the elements selected by `expr` in an already parsed document.
pub fn extract_from(
    document: &Document,
    expr: &PathExpression,
    options: &ExtractOptions,
) -> RecordSet {
    let (candidates, ancestors) = locate(document, expr);
    let prefix = ancestors.key_prefix();
    let mut records = Vec::with_capacity(candidates.len());
    for node in &candidates {
        if !ancestors.matches(document, *node) {
            trace!(node = node.index(), "candidate rejected by ancestor chain");
            continue;
        }
        let record = flatten(document, *node, &prefix, options);
        trace!(node = node.index(), keys = record.len(), "flattened element");
        records.push(record);
    }
    debug!(
        path = %expr,
        candidates = candidates.len(),
        matched = records.len(),
        "extracted records"
    );
    sync_schema(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
        <tag1>
            <tag2>
                <item1>1</item1>
                <item2>2</item2>
            </tag2>
            <tag2>
                <item1>11</item1>
                <item3>33</item3>
                <tag2>
                    <item>nested</item>
                </tag2>
            </tag2>
        </tag1>"#;

    #[test]
    fn records_share_one_schema() {
        let set = extract(FIXTURE, "tag2", &ExtractOptions::default()).expect("extract");
        assert_eq!(set.len(), 3);
        let columns = set.columns();
        for record in &set {
            let keys: Vec<&str> = record.keys().collect();
            assert_eq!(keys, columns);
        }
        assert_eq!(set[0].get("tag2_item3"), Some(None));
        assert_eq!(set[2].value("tag2_item"), Some("nested"));
    }

    #[test]
    fn ancestor_chain_filters_nested_matches() {
        let set = extract(FIXTURE, "tag1/tag2", &ExtractOptions::default()).expect("extract");
        assert_eq!(set.len(), 2);
        assert_eq!(set[0].value("tag1_tag2_item2"), Some("2"));
        assert_eq!(set[1].value("tag1_tag2_item1"), Some("11"));
        assert_eq!(set[1].value("tag1_tag2_tag2_item"), Some("nested"));
    }

    #[test]
    fn empty_path_flattens_whole_document() {
        let set = extract(FIXTURE, "", &ExtractOptions::default()).expect("extract");
        assert_eq!(set.len(), 1);
        assert_eq!(set[0].value("tag1_tag2_item1"), Some("1"));
    }

    #[test]
    fn no_match_is_empty_not_error() {
        let set = extract(FIXTURE, "missing", &ExtractOptions::default()).expect("extract");
        assert!(set.is_empty());
        let set = extract(FIXTURE, "other/tag2", &ExtractOptions::default()).expect("extract");
        assert!(set.is_empty());
    }

    #[test]
    fn malformed_input_is_reported() {
        let err = extract("<a><b></a>", "a", &ExtractOptions::default()).unwrap_err();
        assert!(matches!(err, FlattenError::Parse(_)));
        for junk in ["this is not xml", "", "<a>1</a> trailing junk"] {
            let err = extract(junk, "a", &ExtractOptions::default()).unwrap_err();
            assert!(matches!(err, FlattenError::Parse(_)), "{junk:?}");
        }
        let err = extract(FIXTURE, "tag1/", &ExtractOptions::default()).unwrap_err();
        assert!(matches!(err, FlattenError::InvalidPath(_)));
    }

    #[test]
    fn extraction_is_repeatable() {
        let options = ExtractOptions::new().max_level(2).fields(["tag2_item1"]);
        let first = extract(FIXTURE, "tag2", &options).expect("extract");
        let second = extract(FIXTURE, "tag2", &options).expect("extract");
        assert_eq!(first, second);
        assert_eq!(first.columns(), ["tag2_item1"]);
    }

    #[test]
    fn options_default_to_attributes_on() {
        let options = ExtractOptions::default();
        assert!(options.include_attributes);
        assert!(!options.skip_leading_tag);
        assert_eq!(options.max_level, 0);
        assert!(options.fields.is_empty());
        assert!(options.fields.permits("anything"));
    }
}
