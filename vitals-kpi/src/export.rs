//! Health app XML exports: one `<Record>` element per sample, fields as attributes.

use roxmltree::{Document, ParsingOptions};
use serde_json::{Map, Value};
use vitals_core::{DashboardError, MetricKey, MetricSeries};

use crate::{summarize_records_str, summarize_rows};

/// Flatten every `<Record>` element into an object of its attributes.
///
/// Exports carry an inline DTD, so DTDs are accepted; nested elements
/// (metadata, heart-rate beat lists) are ignored.
pub fn records_from_export_xml(xml: &str) -> Result<Vec<Value>, DashboardError> {
    let mut options = ParsingOptions::default();
    options.allow_dtd = true;

    let document = Document::parse_with_options(xml, options)
        .map_err(|err| DashboardError::Parse(format!("Invalid health export: {err}")))?;

    let rows = document
        .descendants()
        .filter(|node| node.has_tag_name("Record"))
        .map(|node| {
            let row: Map<String, Value> = node
                .attributes()
                .map(|attr| (attr.name().to_string(), Value::String(attr.value().to_string())))
                .collect();
            Value::Object(row)
        })
        .collect();
    Ok(rows)
}

/// Summarize the records of `key` found in an XML export.
pub fn summarize_export_str(xml: &str, key: MetricKey) -> Result<MetricSeries, DashboardError> {
    let rows = records_from_export_xml(xml)?;
    summarize_rows(&rows, key)
}

/// Summarize either an XML export or JSON records, chosen by the first non-blank character.
pub fn summarize_input_str(input: &str, key: MetricKey) -> Result<MetricSeries, DashboardError> {
    if input.trim_start().starts_with('<') {
        summarize_export_str(input, key)
    } else {
        summarize_records_str(input, key)
    }
}
