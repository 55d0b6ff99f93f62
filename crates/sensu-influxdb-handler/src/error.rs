// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use crate::config::ConfigError;
use crate::sink::SinkError;
use std::num::ParseIntError;
use thiserror::Error;

/// Errors that abort handling of an event.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("event does not contain metrics")]
    MissingMetrics,

    #[error("invalid timestamp '{value}': {source}")]
    TimestampFormat {
        value: String,
        #[source]
        source: ParseIntError,
    },

    #[error("write sink error: {0}")]
    Sink(#[from] SinkError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}
