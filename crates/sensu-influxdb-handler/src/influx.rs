// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! InfluxDB Line Protocol encoding.
//!
//! Line Protocol format:
//! ```text
//! measurement,tag1=val1,tag2=val2 field1=val1,field2=val2 timestamp
//! ```
//!
//! See: <https://docs.influxdata.com/influxdb/v2/reference/syntax/line-protocol/>

use crate::config::Precision;
use crate::point::OutputPoint;
use crate::sink::{SinkError, WriteSink};
use std::fmt;

/// A value that can be stored in an InfluxDB field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// 64-bit floating point.
    Float(f64),
    /// 64-bit signed integer.
    Integer(i64),
    /// UTF-8 string.
    String(String),
    /// Boolean value.
    Boolean(bool),
}

impl FieldValue {
    /// Format this value for InfluxDB Line Protocol.
    ///
    /// - Float: written as-is (e.g., `3.14`, `42`)
    /// - Integer: suffixed with `i` (e.g., `42i`)
    /// - String: quoted with double quotes, inner quotes escaped (e.g., `"hello"`)
    /// - Boolean: `true` or `false`
    pub fn to_line_protocol(&self) -> String {
        match self {
            FieldValue::Float(v) => format!("{}", v),
            FieldValue::Integer(v) => format!("{}i", v),
            FieldValue::String(v) => {
                let escaped = v.replace('\\', "\\\\").replace('"', "\\\"");
                format!("\"{}\"", escaped)
            }
            FieldValue::Boolean(v) => v.to_string(),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_line_protocol())
    }
}

/// Encode one point as a Line Protocol line.
///
/// Tags and fields are emitted in key order. Tags with an empty key or
/// value are left out. The timestamp is scaled to `precision`.
pub fn encode_point(point: &OutputPoint, precision: Precision) -> String {
    let mut line = escape_measurement(&point.measurement);

    for (key, value) in &point.tags {
        if key.is_empty() || value.is_empty() {
            continue;
        }
        line.push(',');
        line.push_str(&escape_key(key));
        line.push('=');
        line.push_str(&escape_key(value));
    }

    line.push(' ');

    for (i, (key, value)) in point.fields.iter().enumerate() {
        if i > 0 {
            line.push(',');
        }
        line.push_str(&escape_key(key));
        line.push('=');
        line.push_str(&value.to_line_protocol());
    }

    let timestamp = point
        .timestamp
        .timestamp()
        .saturating_mul(precision.per_second());
    line.push(' ');
    line.push_str(&timestamp.to_string());

    line
}

/// In-memory Line Protocol sink.
///
/// Accumulates encoded lines until they are taken. Used for dry runs and
/// tests.
pub struct LineProtocolWriter {
    precision: Precision,
    buffer: Vec<String>,
}

impl LineProtocolWriter {
    /// Create a new empty writer.
    pub fn new(precision: Precision) -> Self {
        Self {
            precision,
            buffer: Vec::new(),
        }
    }

    /// Take all accumulated lines.
    pub fn take_lines(&mut self) -> Vec<String> {
        std::mem::take(&mut self.buffer)
    }

    /// Get the current number of buffered lines.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

impl Default for LineProtocolWriter {
    fn default() -> Self {
        Self::new(Precision::default())
    }
}

impl WriteSink for LineProtocolWriter {
    fn write_point(&mut self, point: &OutputPoint) -> Result<(), SinkError> {
        self.buffer.push(encode_point(point, self.precision));
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Escape a measurement name for line protocol.
/// Spaces and commas are escaped with backslash, line breaks as `\n`/`\r`.
fn escape_measurement(s: &str) -> String {
    escape_line_breaks(&s.replace(',', "\\,").replace(' ', "\\ "))
}

/// Escape tag keys, tag values and field keys.
fn escape_key(s: &str) -> String {
    escape_line_breaks(
        &s.replace(',', "\\,")
            .replace('=', "\\=")
            .replace(' ', "\\ "),
    )
}

fn escape_line_breaks(s: &str) -> String {
    s.replace('\n', "\\n").replace('\r', "\\r")
}
