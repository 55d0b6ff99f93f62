// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Handler configuration.
//!
//! Values come from built-in defaults, an optional YAML file, the command
//! line and environment, and finally per-event annotations. The resolved
//! configuration is immutable for the rest of the invocation.

use crate::event::Event;
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Annotation key prefix for per-event overrides.
pub const ANNOTATION_KEYSPACE: &str = "sensu.io/plugins/sensu-influxdb-handler/config";

/// Default InfluxDB address.
pub const DEFAULT_ADDR: &str = "http://localhost:8086";

/// Default number of lines per write request.
pub const DEFAULT_BATCH_SIZE: usize = 5000;

/// Default HTTP request timeout (seconds).
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// How metric names map onto measurements and field keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamingMode {
    /// 1.x handler scheme: full name as measurement, `value` field, `host` tag.
    Legacy,
    /// First dot segment is the measurement, the rest is the field key.
    #[default]
    Dotted,
}

impl NamingMode {
    /// Tag key carrying the entity name.
    pub fn identity_tag(self) -> &'static str {
        match self {
            NamingMode::Legacy => "host",
            NamingMode::Dotted => "sensu_entity_name",
        }
    }
}

/// Timestamp precision of written points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Precision {
    Ns,
    Us,
    Ms,
    #[default]
    S,
}

impl Precision {
    /// Query parameter value for the write API.
    pub fn as_str(self) -> &'static str {
        match self {
            Precision::Ns => "ns",
            Precision::Us => "us",
            Precision::Ms => "ms",
            Precision::S => "s",
        }
    }

    /// Units of this precision per second.
    pub fn per_second(self) -> i64 {
        match self {
            Precision::Ns => 1_000_000_000,
            Precision::Us => 1_000_000,
            Precision::Ms => 1_000,
            Precision::S => 1,
        }
    }
}

impl std::str::FromStr for Precision {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ns" => Ok(Precision::Ns),
            "us" => Ok(Precision::Us),
            "ms" => Ok(Precision::Ms),
            "s" => Ok(Precision::S),
            other => Err(ConfigError::Invalid(format!(
                "precision must be one of: ns, us, ms, s (got '{}')",
                other
            ))),
        }
    }
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Handler configuration.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct HandlerConfig {
    /// InfluxDB base URL.
    pub addr: String,
    /// v2 token, or `<user>:<password>` for 1.8 compatibility.
    pub token: String,
    /// v2 bucket, or `<database>/<retention-policy>` for 1.8 compatibility.
    pub bucket: String,
    /// v2 organization, empty for 1.8 compatibility.
    pub org: String,
    /// Deprecated 1.x username, folded into `token`.
    pub username: String,
    /// Deprecated 1.x password, folded into `token`.
    pub password: String,
    /// Deprecated 1.x database, folded into `bucket`.
    pub db_name: String,
    pub precision: Precision,
    /// Skip TLS certificate verification.
    pub insecure_skip_verify: bool,
    /// Record the check status as a `<check>.status` metric.
    pub check_status_metric: bool,
    /// Strip `<entity>.` from metric names.
    pub strip_host: bool,
    /// Also accepted as `legacy: <bool>`.
    #[serde(alias = "legacy", deserialize_with = "naming_mode_or_legacy_flag")]
    pub naming_mode: NamingMode,
    /// Add an `action` tag to annotation points.
    pub annotation_action_tag: bool,
    /// Lines per write request.
    pub batch_size: usize,
    /// HTTP request timeout in seconds.
    pub timeout_secs: u64,
}

/// Accept either a naming mode name or the 1.x `legacy` boolean.
fn naming_mode_or_legacy_flag<'de, D>(deserializer: D) -> Result<NamingMode, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Flag(bool),
        Mode(NamingMode),
    }

    Ok(match Repr::deserialize(deserializer)? {
        Repr::Flag(true) => NamingMode::Legacy,
        Repr::Flag(false) => NamingMode::Dotted,
        Repr::Mode(mode) => mode,
    })
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR.to_string(),
            token: String::new(),
            bucket: String::new(),
            org: String::new(),
            username: String::new(),
            password: String::new(),
            db_name: String::new(),
            precision: Precision::default(),
            insecure_skip_verify: false,
            check_status_metric: false,
            strip_host: false,
            naming_mode: NamingMode::default(),
            annotation_action_tag: false,
            batch_size: DEFAULT_BATCH_SIZE,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl fmt::Debug for HandlerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerConfig")
            .field("addr", &self.addr)
            .field("token", &redact(&self.token))
            .field("bucket", &self.bucket)
            .field("org", &self.org)
            .field("username", &self.username)
            .field("password", &redact(&self.password))
            .field("db_name", &self.db_name)
            .field("precision", &self.precision)
            .field("insecure_skip_verify", &self.insecure_skip_verify)
            .field("check_status_metric", &self.check_status_metric)
            .field("strip_host", &self.strip_host)
            .field("naming_mode", &self.naming_mode)
            .field("annotation_action_tag", &self.annotation_action_tag)
            .field("batch_size", &self.batch_size)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

fn redact(secret: &str) -> &'static str {
    if secret.is_empty() {
        ""
    } else {
        "<redacted>"
    }
}

impl HandlerConfig {
    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: HandlerConfig = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Parse configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Apply annotation overrides from the event's check, then its entity.
    ///
    /// Secret options (token, bucket, org, password) cannot be overridden.
    pub fn with_event_overrides(&self, event: &Event) -> Result<Self, ConfigError> {
        let mut config = self.clone();
        if let Some(check) = &event.check {
            config.apply_annotations(&check.metadata.annotations)?;
        }
        config.apply_annotations(&event.entity.metadata.annotations)?;
        Ok(config)
    }

    fn apply_annotations(&mut self, annotations: &HashMap<String, String>) -> Result<(), ConfigError> {
        for (key, value) in annotations {
            let Some(path) = key
                .strip_prefix(ANNOTATION_KEYSPACE)
                .and_then(|rest| rest.strip_prefix('/'))
            else {
                continue;
            };

            match path {
                "addr" => self.addr = value.clone(),
                "username" => self.username = value.clone(),
                "dbName" => self.db_name = value.clone(),
                "precision" => self.precision = value.parse()?,
                "insecureSkipVerify" => self.insecure_skip_verify = parse_bool(path, value)?,
                "checkStatusMetric" => self.check_status_metric = parse_bool(path, value)?,
                "stripHost" => self.strip_host = parse_bool(path, value)?,
                "legacy" => {
                    self.naming_mode = if parse_bool(path, value)? {
                        NamingMode::Legacy
                    } else {
                        NamingMode::Dotted
                    }
                }
                "token" | "bucket" | "org" | "password" => {
                    tracing::warn!(option = path, "Ignoring annotation override of secret option");
                }
                other => {
                    tracing::debug!(option = other, "Ignoring unknown annotation override");
                }
            }
        }
        Ok(())
    }

    /// Validate the configuration and fold deprecated 1.x settings into
    /// their v2 counterparts.
    pub fn resolve(mut self) -> Result<Self, ConfigError> {
        if self.addr.is_empty() {
            return Err(ConfigError::Invalid("--addr must be provided".into()));
        }
        if !self.bucket.is_empty() && !self.db_name.is_empty() {
            return Err(ConfigError::Invalid(
                "Cannot set both --bucket and --db-name".into(),
            ));
        }
        if self.bucket.is_empty() && self.db_name.is_empty() {
            return Err(ConfigError::Invalid(
                "Must specify either --bucket or --db-name".into(),
            ));
        }
        if self.batch_size == 0 {
            return Err(ConfigError::Invalid("--batch-size must be at least 1".into()));
        }

        if self.bucket.is_empty() {
            self.bucket = self.db_name.clone();
        }

        if self.token.is_empty() {
            let mut token = String::new();
            if !self.username.is_empty() {
                token.push_str(&self.username);
                token.push(':');
            }
            token.push_str(&self.password);
            self.token = token;
        }

        Ok(self)
    }
}

/// Boolean parsing compatible with Sensu annotation values.
fn parse_bool(option: &str, value: &str) -> Result<bool, ConfigError> {
    match value {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Ok(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Ok(false),
        other => Err(ConfigError::Invalid(format!(
            "annotation override for {} is not a boolean: '{}'",
            option, other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::fixtures;
    use std::io::Write;

    fn annotated(key: &str, value: &str) -> HashMap<String, String> {
        let mut map = HashMap::new();
        map.insert(format!("{}/{}", ANNOTATION_KEYSPACE, key), value.to_string());
        map
    }

    #[test]
    fn test_defaults() {
        let config = HandlerConfig::default();
        assert_eq!(config.addr, "http://localhost:8086");
        assert_eq!(config.precision, Precision::S);
        assert_eq!(config.naming_mode, NamingMode::Dotted);
        assert_eq!(config.batch_size, DEFAULT_BATCH_SIZE);
        assert!(!config.check_status_metric);
        assert!(!config.strip_host);
    }

    #[test]
    fn test_config_parse_yaml() {
        let yaml = r#"
addr: "https://influx.example.com:8086"
token: "test-token-placeholder"
bucket: "telemetry"
org: "example-org"
precision: ms
strip_host: true
naming_mode: legacy
batch_size: 100
"#;
        let config = HandlerConfig::from_yaml(yaml).expect("parse yaml");
        assert_eq!(config.addr, "https://influx.example.com:8086");
        assert_eq!(config.bucket, "telemetry");
        assert_eq!(config.org, "example-org");
        assert_eq!(config.precision, Precision::Ms);
        assert!(config.strip_host);
        assert_eq!(config.naming_mode, NamingMode::Legacy);
        assert_eq!(config.batch_size, 100);
        // Unset keys keep their defaults
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn test_config_yaml_legacy_flag() {
        let config = HandlerConfig::from_yaml("legacy: true\n").expect("parse yaml");
        assert_eq!(config.naming_mode, NamingMode::Legacy);

        let config = HandlerConfig::from_yaml("legacy: false\n").expect("parse yaml");
        assert_eq!(config.naming_mode, NamingMode::Dotted);

        let config = HandlerConfig::from_yaml("naming_mode: dotted\n").expect("parse yaml");
        assert_eq!(config.naming_mode, NamingMode::Dotted);

        assert!(HandlerConfig::from_yaml("legacy: sometimes\n").is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        writeln!(file, "db_name: sensu\ncheck_status_metric: true").expect("write");

        let config = HandlerConfig::from_file(file.path()).expect("load");
        assert_eq!(config.db_name, "sensu");
        assert!(config.check_status_metric);
    }

    #[test]
    fn test_config_rejects_unknown_precision() {
        assert!(HandlerConfig::from_yaml("precision: minutes").is_err());
        assert!("h".parse::<Precision>().is_err());
    }

    #[test]
    fn test_resolve_requires_bucket_or_db_name() {
        let err = HandlerConfig::default().resolve().unwrap_err();
        assert!(err.to_string().contains("either --bucket or --db-name"));
    }

    #[test]
    fn test_resolve_rejects_bucket_and_db_name() {
        let config = HandlerConfig {
            bucket: "b".into(),
            db_name: "d".into(),
            ..Default::default()
        };
        assert!(config.resolve().is_err());
    }

    #[test]
    fn test_resolve_rejects_empty_addr() {
        let config = HandlerConfig {
            addr: String::new(),
            bucket: "b".into(),
            ..Default::default()
        };
        assert!(config.resolve().is_err());
    }

    #[test]
    fn test_resolve_folds_legacy_credentials() {
        let config = HandlerConfig {
            db_name: "foo".into(),
            username: "bar".into(),
            password: "baz".into(),
            ..Default::default()
        }
        .resolve()
        .expect("resolve");

        assert_eq!(config.bucket, "foo");
        assert_eq!(config.token, "bar:baz");
    }

    #[test]
    fn test_resolve_keeps_explicit_token() {
        let config = HandlerConfig {
            bucket: "b".into(),
            token: "tok".into(),
            username: "ignored".into(),
            ..Default::default()
        }
        .resolve()
        .expect("resolve");

        assert_eq!(config.token, "tok");
    }

    #[test]
    fn test_resolve_password_only_token() {
        let config = HandlerConfig {
            bucket: "b".into(),
            password: "secret".into(),
            ..Default::default()
        }
        .resolve()
        .expect("resolve");

        assert_eq!(config.token, "secret");
    }

    #[test]
    fn test_event_overrides_entity_wins() {
        let mut event = fixtures::event("entity1", "check1");
        event
            .check
            .as_mut()
            .expect("check")
            .metadata
            .annotations = annotated("addr", "http://check:8086");
        event.entity.metadata.annotations = annotated("addr", "http://entity:8086");

        let config = HandlerConfig::default()
            .with_event_overrides(&event)
            .expect("overrides");
        assert_eq!(config.addr, "http://entity:8086");
    }

    #[test]
    fn test_event_overrides_flags() {
        let mut event = fixtures::event("entity1", "check1");
        let mut annotations = annotated("stripHost", "true");
        annotations.extend(annotated("legacy", "1"));
        annotations.extend(annotated("precision", "ns"));
        annotations.insert("unrelated/key".into(), "x".into());
        event.entity.metadata.annotations = annotations;

        let config = HandlerConfig::default()
            .with_event_overrides(&event)
            .expect("overrides");
        assert!(config.strip_host);
        assert_eq!(config.naming_mode, NamingMode::Legacy);
        assert_eq!(config.precision, Precision::Ns);
    }

    #[test]
    fn test_event_overrides_skip_secrets() {
        let mut event = fixtures::event("entity1", "check1");
        event.entity.metadata.annotations = annotated("token", "stolen");

        let base = HandlerConfig {
            token: "original".into(),
            ..Default::default()
        };
        let config = base.with_event_overrides(&event).expect("overrides");
        assert_eq!(config.token, "original");
    }

    #[test]
    fn test_event_overrides_reject_bad_bool() {
        let mut event = fixtures::event("entity1", "check1");
        event.entity.metadata.annotations = annotated("checkStatusMetric", "maybe");

        let err = HandlerConfig::default()
            .with_event_overrides(&event)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = HandlerConfig {
            token: "super-secret".into(),
            password: "hunter2".into(),
            ..Default::default()
        };
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("super-secret"));
        assert!(!rendered.contains("hunter2"));
    }
}
