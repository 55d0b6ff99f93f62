// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Write sinks for output points.
//!
//! The handler hands every point to a [`WriteSink`] in order and calls
//! [`WriteSink::flush`] once at the end. [`HttpWriteSink`] posts batches to
//! the InfluxDB v2 write API (also served by InfluxDB 1.8).

use crate::buffer::BatchBuffer;
use crate::config::{HandlerConfig, Precision};
use crate::influx::encode_point;
use crate::point::OutputPoint;
use reqwest::blocking::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;

const WRITE_PATH: &str = "/api/v2/write";

/// Errors reported by a write sink.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("http client build failed: {0}")]
    Client(#[source] reqwest::Error),

    #[error("write request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("write request returned status {status}: {body}")]
    Status { status: StatusCode, body: String },
}

/// Destination for output points.
pub trait WriteSink {
    /// Queue one point for delivery.
    fn write_point(&mut self, point: &OutputPoint) -> Result<(), SinkError>;

    /// Deliver everything still queued.
    fn flush(&mut self) -> Result<(), SinkError>;
}

/// Blocking HTTP sink for the InfluxDB write API.
pub struct HttpWriteSink {
    client: Client,
    write_url: String,
    org: String,
    bucket: String,
    token: String,
    precision: Precision,
    buffer: BatchBuffer,
    lines_sent: u64,
}

impl HttpWriteSink {
    /// Create a sink from a resolved configuration.
    pub fn new(config: &HandlerConfig) -> Result<Self, SinkError> {
        let client = Client::builder()
            .danger_accept_invalid_certs(config.insecure_skip_verify)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(SinkError::Client)?;

        Ok(Self {
            client,
            write_url: format!("{}{}", config.addr.trim_end_matches('/'), WRITE_PATH),
            org: config.org.clone(),
            bucket: config.bucket.clone(),
            token: config.token.clone(),
            precision: config.precision,
            buffer: BatchBuffer::new(config.batch_size),
            lines_sent: 0,
        })
    }

    /// Number of lines accepted by the server so far.
    pub fn lines_sent(&self) -> u64 {
        self.lines_sent
    }

    fn send(&mut self, lines: Vec<String>) -> Result<(), SinkError> {
        if lines.is_empty() {
            return Ok(());
        }

        tracing::debug!(lines = lines.len(), url = %self.write_url, "Sending write request");

        let response = self
            .client
            .post(&self.write_url)
            .query(&[
                ("org", self.org.as_str()),
                ("bucket", self.bucket.as_str()),
                ("precision", self.precision.as_str()),
            ])
            .header(AUTHORIZATION, format!("Token {}", self.token))
            .header(CONTENT_TYPE, "text/plain; charset=utf-8")
            .body(lines.join("\n"))
            .send()
            .map_err(SinkError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(SinkError::Status { status, body });
        }

        self.lines_sent += lines.len() as u64;
        Ok(())
    }
}

impl WriteSink for HttpWriteSink {
    fn write_point(&mut self, point: &OutputPoint) -> Result<(), SinkError> {
        let line = encode_point(point, self.precision);
        match self.buffer.add(line) {
            Some(batch) => self.send(batch),
            None => Ok(()),
        }
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        let batch = self.buffer.drain();
        self.send(batch)
    }
}
