//! Document metadata header and version gating.
//!
//! A document opens with a comment-block header of `key: value` lines.
//! The load path reads it before any structural parsing happens; a
//! declared format version outside the supported range fails fast with
//! [`VersionError`], before validation is even attempted. Recognized keys
//! are `version` and `schema` (the qualified type the document body
//! validates against); unrecognized keys ride along untouched.

use crate::container::TypedValue;
use crate::error::{DocshapeError, SchemaResult, UnknownSchemaError, VersionError};
use crate::schema::registry::{RegistryExt, SchemaRegistry};
use crate::value::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Current document format version written on save.
pub const FORMAT_VERSION: u32 = 2;

/// Oldest format version the load path accepts.
pub const MIN_SUPPORTED_VERSION: u32 = 1;

/// Parsed metadata header of a document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentHeader {
    /// Declared format version, when the header carries one.
    pub version: Option<u32>,
    /// Qualified schema type the document claims to conform to.
    pub schema_type: Option<String>,
    /// Unrecognized `key: value` entries, preserved for round-trip.
    pub extra: BTreeMap<String, String>,
}

impl DocumentHeader {
    /// Parse the leading comment block. Lines are stripped of a leading
    /// `#`; anything without a `:` is ignored as prose.
    pub fn parse(comment_block: &str) -> Self {
        let mut header = Self::default();
        for line in comment_block.lines() {
            let line = line.trim().trim_start_matches('#').trim();
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let (key, value) = (key.trim(), value.trim());
            match key {
                "version" => header.version = value.parse().ok(),
                "schema" => header.schema_type = Some(value.to_string()),
                _ => {
                    header.extra.insert(key.to_string(), value.to_string());
                }
            }
        }
        header
    }

    /// Fail fast when the declared version is outside the supported range.
    /// An absent version is read as current.
    pub fn check_version(&self) -> Result<(), VersionError> {
        if let Some(declared) = self.version {
            if !(MIN_SUPPORTED_VERSION..=FORMAT_VERSION).contains(&declared) {
                return Err(VersionError {
                    declared,
                    min: MIN_SUPPORTED_VERSION,
                    max: FORMAT_VERSION,
                });
            }
        }
        Ok(())
    }

    /// Render back to a comment block, version first.
    pub fn render(&self) -> String {
        let mut lines = Vec::new();
        lines.push(format!("# version: {}", self.version.unwrap_or(FORMAT_VERSION)));
        if let Some(schema) = &self.schema_type {
            lines.push(format!("# schema: {schema}"));
        }
        for (key, value) in &self.extra {
            lines.push(format!("# {key}: {value}"));
        }
        lines.join("\n")
    }
}

/// An in-memory document: metadata plus the validated root value.
#[derive(Debug, Clone)]
pub struct Document {
    pub header: DocumentHeader,
    pub root: TypedValue,
}

impl Document {
    /// Serialize back to the (header text, raw tree) pair handed to the
    /// document I/O adapter.
    pub fn save(&self) -> (String, Value) {
        (self.header.render(), self.root.to_value())
    }
}

/// Load a document: version gate, schema-type lookup, then validation.
///
/// `fallback_type` is used when the header declares no schema. The
/// version check runs before any validation, so an unsupported document
/// fails with [`VersionError`] rather than a confusing structural error.
pub fn load_document(
    header_text: &str,
    raw: &Value,
    registry: &Arc<SchemaRegistry>,
    fallback_type: Option<&str>,
) -> SchemaResult<Document> {
    let header = DocumentHeader::parse(header_text);
    header.check_version()?;
    let type_name = header
        .schema_type
        .as_deref()
        .or(fallback_type)
        .ok_or_else(|| {
            DocshapeError::UnknownSchema(UnknownSchemaError::MalformedReference {
                reference: "(document declares no schema type)".to_string(),
            })
        })?;
    let root = registry.validate(raw, type_name)?;
    Ok(Document { header, root })
}
