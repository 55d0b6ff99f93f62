// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Check status as a metric.

use crate::config::HandlerConfig;
use crate::event::{Event, MetricPoint};
use std::borrow::Cow;

/// Suffix appended to the check name for the status sample.
pub const STATUS_SUFFIX: &str = ".status";

/// Samples to translate for `event`.
///
/// When `check_status_metric` is enabled and the event has a check, a
/// `<check>.status` sample is appended after the event's own samples.
pub fn samples_with_status<'a>(
    event: &'a Event,
    config: &HandlerConfig,
) -> Vec<Cow<'a, MetricPoint>> {
    let mut samples: Vec<Cow<'a, MetricPoint>> =
        event.points().iter().map(Cow::Borrowed).collect();

    if !config.check_status_metric {
        return samples;
    }
    if let Some(check) = &event.check {
        samples.push(Cow::Owned(MetricPoint {
            name: format!("{}{}", check.metadata.name, STATUS_SUFFIX),
            value: f64::from(check.status),
            timestamp: event.timestamp,
            tags: Vec::new(),
        }));
    }

    samples
}
