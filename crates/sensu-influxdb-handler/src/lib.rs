// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Sensu InfluxDB Handler
//!
//! Writes the metrics carried by a Sensu event to InfluxDB, optionally
//! with the check status as a metric and a `sensu_event` annotation for
//! alerts and resolutions.
//!
//! # Overview
//!
//! ```text
//! Event (JSON) --> status injection --> point builder --> annotation --> WriteSink
//! ```
//!
//! # Naming modes
//!
//! | metric name | dotted                          | legacy                  |
//! |-------------|---------------------------------|-------------------------|
//! | `cpu.idle`  | `cpu` measurement, `idle` field | `cpu.idle`, `value`     |
//! | `answer`    | `answer`, `value`               | `answer`, `value`       |
//!
//! Dotted mode tags points with `sensu_entity_name`, legacy mode with `host`.

pub mod annotation;
pub mod buffer;
pub mod config;
pub mod error;
pub mod event;
pub mod handler;
pub mod influx;
pub mod point;
pub mod sink;
pub mod status;

pub use config::{ConfigError, HandlerConfig, NamingMode, Precision};
pub use error::HandlerError;
pub use event::Event;
pub use handler::{EventPoints, HandleSummary, Handler};
pub use influx::{FieldValue, LineProtocolWriter};
pub use point::OutputPoint;
pub use sink::{HttpWriteSink, SinkError, WriteSink};
