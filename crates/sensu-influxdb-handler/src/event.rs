// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Inbound Sensu event model.
//!
//! Only the parts of the Sensu Go `core/v2` event the handler reads are
//! modelled; everything else in the document is ignored on decode.

use serde::Deserialize;
use std::collections::HashMap;

/// Object metadata shared by entities and checks.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ObjectMeta {
    /// Object name.
    #[serde(default)]
    pub name: String,
    /// Free-form annotations, used for per-event configuration overrides.
    #[serde(default)]
    pub annotations: HashMap<String, String>,
}

/// The entity an event was produced for.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Entity {
    #[serde(default)]
    pub metadata: ObjectMeta,
}

/// Result of a check execution.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Check {
    #[serde(default)]
    pub metadata: ObjectMeta,
    /// Exit status, 0 is OK.
    #[serde(default)]
    pub status: u32,
    /// Number of consecutive events with the same status.
    #[serde(default)]
    pub occurrences: i64,
    /// Raw check output.
    #[serde(default)]
    pub output: String,
}

/// A tag attached to a metric point.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MetricTag {
    pub name: String,
    pub value: String,
}

/// A single metric sample.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MetricPoint {
    /// Dot-delimited metric name.
    pub name: String,
    pub value: f64,
    /// Seconds since epoch, or a finer resolution the handler truncates.
    #[serde(default)]
    pub timestamp: i64,
    /// Tag names are not guaranteed to be unique.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tags: Vec<MetricTag>,
}

/// Metric samples carried by an event.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Metrics {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub points: Vec<MetricPoint>,
}

/// A Sensu event as read from stdin.
#[derive(Debug, Clone, Deserialize)]
pub struct Event {
    /// Event time in seconds since epoch.
    #[serde(default)]
    pub timestamp: i64,
    pub entity: Entity,
    #[serde(default)]
    pub check: Option<Check>,
    #[serde(default)]
    pub metrics: Option<Metrics>,
}

impl Event {
    /// Decode an event from its JSON representation.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn entity_name(&self) -> &str {
        &self.entity.metadata.name
    }

    pub fn has_check(&self) -> bool {
        self.check.is_some()
    }

    /// True when the event carries a metrics block, even an empty one.
    pub fn has_metrics(&self) -> bool {
        self.metrics.is_some()
    }

    /// Metric points in event order; empty when the event has no metrics.
    pub fn points(&self) -> &[MetricPoint] {
        self.metrics
            .as_ref()
            .map(|m| m.points.as_slice())
            .unwrap_or_default()
    }
}

/// Sensu serializes empty slices as `null`.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
