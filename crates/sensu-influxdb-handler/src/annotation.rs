// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Alert and resolution annotations.
//!
//! Dashboards built for the 1.x handler read a `sensu_event` measurement
//! carrying one point per alert or resolution. The decision only looks at
//! the current check status and its occurrence count: a first OK
//! occurrence is assumed to resolve an earlier alert.

use crate::config::HandlerConfig;
use crate::error::HandlerError;
use crate::event::{Check, Event};
use crate::influx::FieldValue;
use crate::point::{normalize_timestamp, OutputPoint};
use std::collections::BTreeMap;
use std::fmt;

/// Measurement for annotation points.
pub const ANNOTATION_MEASUREMENT: &str = "sensu_event";

/// Annotation title.
pub const ANNOTATION_TITLE: &str = "Sensu Event";

/// Longest check output kept in the description.
const MAX_OUTPUT_CHARS: usize = 100;

/// What an annotation reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnotationAction {
    Alert,
    Resolve,
}

impl AnnotationAction {
    /// Lowercase form used for the `action` tag.
    pub fn as_str(self) -> &'static str {
        match self {
            AnnotationAction::Alert => "alert",
            AnnotationAction::Resolve => "resolve",
        }
    }

    /// Label leading the description.
    pub fn label(self) -> &'static str {
        match self {
            AnnotationAction::Alert => "ALERT",
            AnnotationAction::Resolve => "RESOLVED",
        }
    }
}

impl fmt::Display for AnnotationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decide whether `event` needs an annotation point.
pub fn needs_annotation(event: &Event) -> Option<AnnotationAction> {
    let check = event.check.as_ref()?;

    if check.status != 0 {
        return Some(AnnotationAction::Alert);
    }

    // Steady OK state, already reported
    if check.occurrences > 1 {
        return None;
    }

    Some(AnnotationAction::Resolve)
}

/// Build the annotation point for `event`, if one is needed.
pub fn build_annotation(
    event: &Event,
    config: &HandlerConfig,
) -> Result<Option<OutputPoint>, HandlerError> {
    let (Some(action), Some(check)) = (needs_annotation(event), event.check.as_ref()) else {
        return Ok(None);
    };

    let mut tags = BTreeMap::new();
    tags.insert("entity".to_string(), event.entity_name().to_string());
    tags.insert("check".to_string(), check.metadata.name.clone());
    if config.annotation_action_tag {
        tags.insert("action".to_string(), action.as_str().to_string());
    }

    let mut fields = BTreeMap::new();
    fields.insert(
        "title".to_string(),
        FieldValue::String(go_quote(ANNOTATION_TITLE)),
    );
    fields.insert(
        "description".to_string(),
        FieldValue::String(go_quote(&description(event.entity_name(), check, action))),
    );
    fields.insert(
        "status".to_string(),
        FieldValue::Integer(i64::from(check.status)),
    );
    fields.insert(
        "occurrences".to_string(),
        FieldValue::Integer(check.occurrences),
    );

    Ok(Some(OutputPoint {
        measurement: ANNOTATION_MEASUREMENT.to_string(),
        tags,
        fields,
        timestamp: normalize_timestamp(event.timestamp)?,
    }))
}

/// One-line summary: `ALERT - entity/check : output`.
pub fn description(entity_name: &str, check: &Check, action: AnnotationAction) -> String {
    format!(
        "{} - {}/{} : {}",
        action.label(),
        entity_name,
        check.metadata.name,
        summarize_output(&check.output)
    )
}

/// Trim surrounding newlines and cap the output length.
fn summarize_output(output: &str) -> String {
    let output = output.trim_matches('\n');
    match output.char_indices().nth(MAX_OUTPUT_CHARS) {
        Some((end, _)) => format!("{}...", &output[..end]),
        None => output.to_string(),
    }
}

/// Double-quote a string the way the 1.x handler stored annotation text.
fn go_quote(s: &str) -> String {
    format!("{:?}", s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::fixtures;
    use crate::influx::encode_point;
    use crate::config::Precision;

    fn event_with(status: u32, occurrences: i64) -> Event {
        let mut event = fixtures::event("entity1", "check1");
        let check = event.check.as_mut().expect("check");
        check.status = status;
        check.occurrences = occurrences;
        event
    }

    #[test]
    fn test_decision_table() {
        let mut no_check = event_with(1, 1);
        no_check.check = None;
        assert_eq!(needs_annotation(&no_check), None);

        assert_eq!(needs_annotation(&event_with(1, 1)), Some(AnnotationAction::Alert));
        assert_eq!(needs_annotation(&event_with(2, 5)), Some(AnnotationAction::Alert));
        assert_eq!(needs_annotation(&event_with(0, 2)), None);
        assert_eq!(needs_annotation(&event_with(0, 1)), Some(AnnotationAction::Resolve));
        assert_eq!(needs_annotation(&event_with(0, 0)), Some(AnnotationAction::Resolve));
    }

    #[test]
    fn test_alert_annotation_line() {
        let mut event = event_with(1, 1);
        event.check.as_mut().expect("check").output = "FAILURE".into();

        let point = build_annotation(&event, &HandlerConfig::default())
            .expect("build")
            .expect("annotation");

        assert_eq!(point.measurement, "sensu_event");
        assert_eq!(point.timestamp.timestamp(), 1_550_000_000);
        assert_eq!(
            encode_point(&point, Precision::S),
            "sensu_event,check=check1,entity=entity1 \
             description=\"\\\"ALERT - entity1/check1 : FAILURE\\\"\",\
             occurrences=1i,status=1i,title=\"\\\"Sensu Event\\\"\" 1550000000"
        );
    }

    #[test]
    fn test_resolve_annotation_description() {
        let event = event_with(0, 1);
        let point = build_annotation(&event, &HandlerConfig::default())
            .expect("build")
            .expect("annotation");

        assert_eq!(
            point.fields.get("description"),
            Some(&FieldValue::String("\"RESOLVED - entity1/check1 : OK\"".into()))
        );
        assert!(!point.tags.contains_key("action"));
    }

    #[test]
    fn test_no_annotation_for_steady_ok() {
        let point = build_annotation(&event_with(0, 3), &HandlerConfig::default()).expect("build");
        assert!(point.is_none());
    }

    #[test]
    fn test_action_tag_when_enabled() {
        let config = HandlerConfig {
            annotation_action_tag: true,
            ..Default::default()
        };
        let point = build_annotation(&event_with(2, 1), &config)
            .expect("build")
            .expect("annotation");
        assert_eq!(point.tags.get("action").map(String::as_str), Some("alert"));
    }

    #[test]
    fn test_annotation_timestamp_truncated() {
        let mut event = event_with(1, 1);
        event.timestamp = 1_234_567_890_123;
        let point = build_annotation(&event, &HandlerConfig::default())
            .expect("build")
            .expect("annotation");
        assert_eq!(point.timestamp.timestamp(), 1_234_567_890);
    }

    #[test]
    fn test_summarize_output_truncates() {
        let long = format!("{}\n", "x".repeat(150));
        let summary = summarize_output(&long);
        assert_eq!(summary, format!("{}...", "x".repeat(100)));

        assert_eq!(summarize_output("\nshort\n"), "short");
        assert_eq!(summarize_output(&"y".repeat(100)), "y".repeat(100));
    }

    #[test]
    fn test_summarize_output_multibyte() {
        let output = "é".repeat(120);
        assert_eq!(summarize_output(&output), format!("{}...", "é".repeat(100)));
    }
}
