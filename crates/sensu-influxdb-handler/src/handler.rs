// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Event handler orchestrator.
//!
//! Connects status injection, point building, the annotation decision and
//! a write sink into a single entry point.

use crate::annotation::build_annotation;
use crate::config::HandlerConfig;
use crate::error::HandlerError;
use crate::event::Event;
use crate::point::{build_point, OutputPoint};
use crate::sink::WriteSink;
use crate::status::samples_with_status;

/// All points produced for one event.
#[derive(Debug, Clone, PartialEq)]
pub struct EventPoints {
    /// One point per sample, in sample order, status sample last.
    pub metrics: Vec<OutputPoint>,
    pub annotation: Option<OutputPoint>,
}

impl EventPoints {
    /// Iterate over every point, annotation last.
    pub fn iter(&self) -> impl Iterator<Item = &OutputPoint> {
        self.metrics.iter().chain(self.annotation.iter())
    }

    pub fn len(&self) -> usize {
        self.metrics.len() + usize::from(self.annotation.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Outcome of handling one event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HandleSummary {
    /// Metric points written, the status sample included.
    pub metric_points: usize,
    /// Whether an annotation point was written.
    pub annotated: bool,
}

/// Translates one event into points and hands them to a sink.
pub struct Handler {
    config: HandlerConfig,
}

impl Handler {
    /// Create a handler from a resolved configuration.
    pub fn new(config: HandlerConfig) -> Self {
        Self { config }
    }

    /// Get a reference to the configuration.
    pub fn config(&self) -> &HandlerConfig {
        &self.config
    }

    /// Reject events that would produce no metric points.
    pub fn validate(&self, event: &Event) -> Result<(), HandlerError> {
        if event.points().is_empty() && !self.config.check_status_metric {
            return Err(HandlerError::MissingMetrics);
        }
        Ok(())
    }

    /// Build every point for `event`.
    ///
    /// Fails on the first malformed timestamp, discarding the points
    /// already built.
    pub fn build_points(&self, event: &Event) -> Result<EventPoints, HandlerError> {
        let metrics = samples_with_status(event, &self.config)
            .iter()
            .map(|sample| build_point(sample, event.entity_name(), &self.config))
            .collect::<Result<Vec<_>, _>>()?;

        let annotation = build_annotation(event, &self.config)?;

        Ok(EventPoints {
            metrics,
            annotation,
        })
    }

    /// Validate `event`, build its points, write them to `sink` and flush.
    ///
    /// Nothing reaches the sink unless every point was built.
    pub fn handle<S: WriteSink + ?Sized>(
        &self,
        event: &Event,
        sink: &mut S,
    ) -> Result<HandleSummary, HandlerError> {
        self.validate(event)?;

        let points = self.build_points(event)?;
        for point in points.iter() {
            sink.write_point(point)?;
        }
        sink.flush()?;

        let summary = HandleSummary {
            metric_points: points.metrics.len(),
            annotated: points.annotation.is_some(),
        };

        tracing::debug!(
            entity = %event.entity_name(),
            points = summary.metric_points,
            annotated = summary.annotated,
            "Event written"
        );

        Ok(summary)
    }
}
