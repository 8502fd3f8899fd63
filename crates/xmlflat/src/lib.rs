#![cfg_attr(docsrs, feature(doc_cfg))]
//! High level xmlflat facade that re-exports the workspace crates and
//! provides the JSON boundary used when the extractor is hosted inside a
//! database function or a service endpoint.
//!
//! ```rust
//! use xmlflat::{xml_to_json_flat, HostOptions};
//!
//! let xml = "<tag1><tag2><item1>1</item1></tag2><tag2><item2>2</item2></tag2></tag1>";
//! let json = xml_to_json_flat(xml, "tag1/tag2", &HostOptions::default())?;
//! assert_eq!(
//!     json.as_deref(),
//!     Some(r#"[{"tag1_tag2_item1":"1","tag1_tag2_item2":null},{"tag1_tag2_item1":null,"tag1_tag2_item2":"2"}]"#)
//! );
//!
//! let missing = xml_to_json_flat(xml, "nothing", &HostOptions::default())?;
//! assert_eq!(missing, None);
//! # Ok::<(), xmlflat::XmlFlatError>(())
//! ```

pub use xml_tree::{self, Document, NodeId, XmlError, DOCUMENT_NAME};
pub use xmlflat_core::{
    ancestor_matches, extract, extract_from, flatten, locate, sync_schema, AncestorPath,
    ExtractOptions, FieldAllowList, FlatRecord, FlattenError, PathExpression, RecordSet,
};

use thiserror::Error;
use tracing::debug;

/// Error type produced at the JSON boundary.
#[derive(Debug, Error)]
pub enum XmlFlatError {
    /// Extraction failed (malformed XML or path).
    #[error(transparent)]
    Flatten(#[from] FlattenError),
    /// The field list is not a JSON array of strings.
    #[error("fields: {0}")]
    Fields(String),
    /// Records could not be rendered as JSON.
    #[error("serialize: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Arguments accepted by the hosted function besides the document and path.
///
/// Field names are passed as JSON text, mirroring how a database hands over
/// a `jsonb` argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostOptions {
    /// JSON array of allowed keys; `"[]"`, `"null"` or blank disables filtering.
    pub fields_json: String,
    pub max_level: usize,
    pub use_attrs: bool,
    pub skip_first_tag: bool,
}

impl Default for HostOptions {
    fn default() -> Self {
        HostOptions {
            fields_json: "[]".to_string(),
            max_level: 0,
            use_attrs: true,
            skip_first_tag: false,
        }
    }
}

impl HostOptions {
    /// Decode the field list and build the extraction options.
    pub fn to_extract_options(&self) -> Result<ExtractOptions, XmlFlatError> {
        Ok(ExtractOptions {
            fields: parse_fields(&self.fields_json)?,
            max_level: self.max_level,
            include_attributes: self.use_attrs,
            skip_leading_tag: self.skip_first_tag,
        })
    }
}

/// Decode a JSON array of key names.
///
/// `null` and blank input mean "no filtering", like an empty array.
pub fn parse_fields(json: &str) -> Result<FieldAllowList, XmlFlatError> {
    if json.trim().is_empty() {
        return Ok(FieldAllowList::new());
    }
    let fields: Option<Vec<String>> = serde_json::from_str(json)
        .map_err(|err| XmlFlatError::Fields(format!("expected a JSON array of strings: {err}")))?;
    Ok(fields.unwrap_or_default().into_iter().collect())
}

/// Render records as a JSON array. Keys come out sorted and non-ASCII text
/// is written verbatim.
pub fn records_to_json(records: &RecordSet, pretty: bool) -> Result<String, XmlFlatError> {
    let text = if pretty {
        serde_json::to_string_pretty(records)?
    } else {
        serde_json::to_string(records)?
    };
    Ok(text)
}

/// Hosting convention: an empty record set has no JSON representation.
pub fn to_json_response(records: &RecordSet) -> Result<Option<String>, XmlFlatError> {
    if records.is_empty() {
        return Ok(None);
    }
    records_to_json(records, false).map(Some)
}

/// Extract records and return them as JSON text, or `None` when nothing
/// matched.
pub fn xml_to_json_flat(
    xml: &str,
    tag_path: &str,
    options: &HostOptions,
) -> Result<Option<String>, XmlFlatError> {
    let extract_options = options.to_extract_options()?;
    let records = extract(xml, tag_path, &extract_options)?;
    debug!(path = tag_path, records = records.len(), "hosted extraction");
    to_json_response(&records)
}
