// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Translation of metric samples into InfluxDB points.

use crate::config::{HandlerConfig, NamingMode};
use crate::error::HandlerError;
use crate::event::MetricPoint;
use crate::influx::FieldValue;
use chrono::{DateTime, TimeZone, Utc};
use std::collections::BTreeMap;

/// Field key used when the metric name carries no field part.
pub const DEFAULT_FIELD_KEY: &str = "value";

/// Maximum number of digits kept from a sample timestamp.
const TIMESTAMP_DIGITS: usize = 10;

/// A point ready to be handed to a write sink.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputPoint {
    pub measurement: String,
    pub tags: BTreeMap<String, String>,
    /// Never empty.
    pub fields: BTreeMap<String, FieldValue>,
    pub timestamp: DateTime<Utc>,
}

/// Build the output point for one sample.
pub fn build_point(
    sample: &MetricPoint,
    entity_name: &str,
    config: &HandlerConfig,
) -> Result<OutputPoint, HandlerError> {
    let name = if config.strip_host {
        strip_host(&sample.name, entity_name)
    } else {
        sample.name.as_str()
    };

    let (measurement, field_key) = split_name(name, config.naming_mode);

    let mut fields = BTreeMap::new();
    fields.insert(field_key.to_string(), FieldValue::Float(sample.value));

    let mut tags = BTreeMap::new();
    tags.insert(
        config.naming_mode.identity_tag().to_string(),
        entity_name.to_string(),
    );
    // Later duplicates win, the identity tag included
    for tag in &sample.tags {
        tags.insert(tag.name.clone(), tag.value.clone());
    }

    Ok(OutputPoint {
        measurement: measurement.to_string(),
        tags,
        fields,
        timestamp: normalize_timestamp(sample.timestamp)?,
    })
}

/// Drop a leading `<entity>.` from a metric name.
pub fn strip_host<'a>(name: &'a str, entity_name: &str) -> &'a str {
    if entity_name.is_empty() {
        return name;
    }
    name.strip_prefix(entity_name)
        .and_then(|rest| rest.strip_prefix('.'))
        .unwrap_or(name)
}

/// Split a metric name into measurement and field key.
pub fn split_name(name: &str, mode: NamingMode) -> (&str, &str) {
    match mode {
        NamingMode::Legacy => (name, DEFAULT_FIELD_KEY),
        NamingMode::Dotted => name.split_once('.').unwrap_or((name, DEFAULT_FIELD_KEY)),
    }
}

/// Coerce a timestamp to whole seconds by keeping its first ten digits.
///
/// Millisecond and finer timestamps are truncated as strings, so
/// `1234567890123` becomes `1234567890` rather than being divided.
pub fn normalize_timestamp(timestamp: i64) -> Result<DateTime<Utc>, HandlerError> {
    let rendered = timestamp.to_string();
    let truncated = rendered.get(..TIMESTAMP_DIGITS).unwrap_or(&rendered);

    let seconds: i64 = truncated
        .parse()
        .map_err(|source| HandlerError::TimestampFormat {
            value: truncated.to_string(),
            source,
        })?;

    // Ten characters always fit chrono's range
    Ok(Utc.timestamp_opt(seconds, 0).single().unwrap_or_default())
}
