// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Sensu InfluxDB Handler CLI
//!
//! Reads one Sensu event from stdin and writes its metrics to InfluxDB.
//!
//! # Usage
//!
//! ```bash
//! # InfluxDB v2
//! sensu-influxdb-handler --addr http://influx:8086 --org ops --bucket sensu --token $TOKEN < event.json
//!
//! # InfluxDB 1.8 compatibility
//! sensu-influxdb-handler --addr http://influx:8086 --bucket sensu/autogen --token user:pass < event.json
//!
//! # Deprecated 1.x flags
//! sensu-influxdb-handler -d sensu -u user -p pass < event.json
//!
//! # Print line protocol instead of sending it
//! sensu-influxdb-handler --bucket sensu --dry-run < event.json
//! ```

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use sensu_influxdb_handler::{
    Event, HandlerConfig, Handler, HttpWriteSink, LineProtocolWriter, NamingMode, Precision,
};
use std::io::{IsTerminal, Read};
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "sensu-influxdb-handler")]
#[command(author = "naskel.com")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "An InfluxDB handler built for use with Sensu")]
#[command(long_about = None)]
struct Cli {
    /// YAML configuration file (flags and environment take precedence)
    #[arg(long)]
    config: Option<PathBuf>,

    /// URL of the InfluxDB server
    #[arg(short, long, env = "INFLUXDB_ADDR")]
    addr: Option<String>,

    /// Authentication token, use '<user>:<password>' for InfluxDB 1.8 compatibility
    #[arg(short, long, env = "INFLUXDB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Bucket, use '<database>/<retention-policy>' for InfluxDB 1.8 compatibility
    #[arg(short, long, env = "INFLUXDB_BUCKET", hide_env_values = true)]
    bucket: Option<String>,

    /// Organization, leave empty for InfluxDB 1.8 compatibility
    #[arg(short, long, env = "INFLUXDB_ORG", hide_env_values = true)]
    org: Option<String>,

    /// (Deprecated) username for the given database
    #[arg(short, long, env = "INFLUXDB_USER")]
    username: Option<String>,

    /// (Deprecated) password for the given database
    #[arg(short, long, env = "INFLUXDB_PASS", hide_env_values = true)]
    password: Option<String>,

    /// (Deprecated) InfluxDB 1.8 database to send metrics to
    #[arg(short, long)]
    db_name: Option<String>,

    /// Precision of written timestamps
    #[arg(long, value_enum)]
    precision: Option<PrecisionArg>,

    /// Skip TLS certificate verification
    #[arg(short, long)]
    insecure_skip_verify: bool,

    /// Capture the check status as a metric
    #[arg(short, long)]
    check_status_metric: bool,

    /// Strip the entity name from metric names
    #[arg(long)]
    strip_host: bool,

    /// (Deprecated) use the legacy 1.x metric naming
    #[arg(short, long)]
    legacy: bool,

    /// Tag annotation points with their action (alert or resolve)
    #[arg(long)]
    annotation_action_tag: bool,

    /// Maximum lines per write request
    #[arg(long)]
    batch_size: Option<usize>,

    /// HTTP request timeout (seconds)
    #[arg(long)]
    timeout: Option<u64>,

    /// Print line protocol to stdout instead of writing to InfluxDB
    #[arg(long)]
    dry_run: bool,

    /// Verbose mode (debug logs)
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PrecisionArg {
    Ns,
    Us,
    Ms,
    S,
}

impl From<PrecisionArg> for Precision {
    fn from(arg: PrecisionArg) -> Self {
        match arg {
            PrecisionArg::Ns => Precision::Ns,
            PrecisionArg::Us => Precision::Us,
            PrecisionArg::Ms => Precision::Ms,
            PrecisionArg::S => Precision::S,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("sensu_influxdb_handler=debug")
        } else {
            EnvFilter::new("sensu_influxdb_handler=info")
        }
    });
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let stdin = std::io::stdin();
    if stdin.is_terminal() {
        bail!("Must supply Sensu event JSON on stdin");
    }
    let mut input = String::new();
    stdin
        .lock()
        .read_to_string(&mut input)
        .context("Failed to read event from stdin")?;
    let event = Event::from_json(&input).context("Failed to parse event JSON")?;

    let config = build_config(&cli)?
        .with_event_overrides(&event)
        .context("Invalid annotation override")?
        .resolve()
        .context("Invalid configuration")?;

    tracing::debug!(?config, "Configuration resolved");

    let handler = Handler::new(config);

    if cli.dry_run {
        let mut writer = LineProtocolWriter::new(handler.config().precision);
        handler.handle(&event, &mut writer)?;
        for line in writer.take_lines() {
            println!("{}", line);
        }
        return Ok(());
    }

    let mut sink = HttpWriteSink::new(handler.config()).context("Failed to create InfluxDB client")?;
    let summary = handler.handle(&event, &mut sink)?;

    tracing::info!(
        entity = %event.entity_name(),
        check = event.check.as_ref().map(|c| c.metadata.name.as_str()).unwrap_or(""),
        points = summary.metric_points,
        annotated = summary.annotated,
        lines = sink.lines_sent(),
        "Event written to InfluxDB"
    );

    Ok(())
}

fn build_config(cli: &Cli) -> Result<HandlerConfig> {
    let mut config = match cli.config {
        Some(ref path) => HandlerConfig::from_file(path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => HandlerConfig::default(),
    };

    overlay(&mut config.addr, &cli.addr);
    overlay(&mut config.token, &cli.token);
    overlay(&mut config.bucket, &cli.bucket);
    overlay(&mut config.org, &cli.org);
    overlay(&mut config.username, &cli.username);
    overlay(&mut config.password, &cli.password);
    overlay(&mut config.db_name, &cli.db_name);

    if let Some(precision) = cli.precision {
        config.precision = precision.into();
    }
    if let Some(batch_size) = cli.batch_size {
        config.batch_size = batch_size;
    }
    if let Some(timeout) = cli.timeout {
        config.timeout_secs = timeout;
    }

    // Flags only ever switch options on
    config.insecure_skip_verify |= cli.insecure_skip_verify;
    config.check_status_metric |= cli.check_status_metric;
    config.strip_host |= cli.strip_host;
    config.annotation_action_tag |= cli.annotation_action_tag;
    if cli.legacy {
        config.naming_mode = NamingMode::Legacy;
    }

    Ok(config)
}

fn overlay(target: &mut String, value: &Option<String>) {
    if let Some(value) = value {
        target.clone_from(value);
    }
}
