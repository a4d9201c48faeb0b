//! Converter configuration.
//!
//! Loaded from YAML, e.g.:
//!
//! ```yaml
//! instrument: tms_rad
//! channel: "1,3,5"
//! thinning:
//!   threshold: 0.85
//! # binning:            # presence alone forces preQc to 0
//! # qc_policy: passthrough
//! # time_convention: civil
//! # obs_error: 1.5
//! ```
//!
//! Supports environment variable substitution using `${VAR}` and
//! `${VAR:-default}` syntax. Keys that belong to an outer driver (input and
//! output paths, MPI settings) are ignored.

use std::fs;
use std::path::Path;

use obs_common::TimeConvention;
use serde::{Deserialize, Deserializer, Serialize};

use crate::channels::ChannelSelection;
use crate::error::{IngestionError, Result};
use crate::instruments::{self, InstrumentDescriptor, ObsErrorSource, DEFAULT_INSTRUMENT};
use crate::quality::QcPolicy;

/// `channel:` may be written as a list string or, for one channel, a bare integer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChannelSpec {
    Single(i64),
    List(String),
}

impl ChannelSpec {
    fn as_list(&self) -> String {
        match self {
            ChannelSpec::Single(c) => c.to_string(),
            ChannelSpec::List(s) => s.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThinningConfig {
    pub threshold: Option<f64>,
}

/// Raw configuration as written in YAML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConverterConfig {
    #[serde(default = "default_instrument")]
    pub instrument: String,

    #[serde(default)]
    pub channel: Option<ChannelSpec>,

    #[serde(default)]
    pub thinning: Option<ThinningConfig>,

    /// Set when the `binning` key is present, whatever its value
    #[serde(
        default,
        deserialize_with = "key_present",
        skip_serializing_if = "std::ops::Not::not"
    )]
    pub binning: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qc_policy: Option<QcPolicy>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_convention: Option<TimeConvention>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub obs_error: Option<f32>,
}

fn default_instrument() -> String {
    DEFAULT_INSTRUMENT.to_string()
}

fn key_present<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<bool, D::Error> {
    serde_yaml::Value::deserialize(deserializer).map(|_| true)
}

impl ConverterConfig {
    /// A configuration for `instrument` selecting `channels`, with no thinning.
    pub fn new(instrument: &str, channels: &str) -> Self {
        Self {
            instrument: instrument.to_string(),
            channel: Some(ChannelSpec::List(channels.to_string())),
            thinning: None,
            binning: false,
            qc_policy: None,
            time_convention: None,
            obs_error: None,
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.thinning = Some(ThinningConfig {
            threshold: Some(threshold),
        });
        self
    }

    /// Parse YAML text, expanding `${VAR}` references first.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let expanded = expand_env_vars(content)?;
        serde_yaml::from_str(&expanded)
            .map_err(|e| IngestionError::ConfigParse(format!("invalid YAML: {}", e)))
    }

    /// Load and parse a YAML configuration file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&content)
    }

    /// Check required keys and parse values into a [`ResolvedConfig`].
    pub fn resolve(&self) -> Result<ResolvedConfig> {
        let descriptor = instruments::descriptor(&self.instrument)?;

        let channel = self
            .channel
            .as_ref()
            .ok_or(IngestionError::MissingConfigKey("channel"))?;
        let channels = ChannelSelection::parse(&channel.as_list())?;

        let threshold = if descriptor.thinned {
            let threshold = self
                .thinning
                .as_ref()
                .and_then(|t| t.threshold)
                .ok_or(IngestionError::MissingConfigKey("thinning.threshold"))?;
            if !threshold.is_finite() {
                return Err(IngestionError::ConfigParse(format!(
                    "thinning.threshold must be finite, got {}",
                    threshold
                )));
            }
            Some(threshold)
        } else {
            None
        };

        let obs_error = match self.obs_error {
            Some(value) => ObsErrorSource::Fixed(value),
            None => descriptor.obs_error,
        };

        Ok(ResolvedConfig {
            descriptor,
            channels,
            threshold,
            binning: self.binning,
            qc_policy: self.qc_policy.unwrap_or(descriptor.qc_policy),
            time_convention: self.time_convention.unwrap_or(descriptor.time_convention),
            obs_error,
        })
    }
}

/// Validated, immutable settings for one converter.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub descriptor: &'static InstrumentDescriptor,
    pub channels: ChannelSelection,
    /// `None` when the instrument is not thinned
    pub threshold: Option<f64>,
    pub binning: bool,
    pub qc_policy: QcPolicy,
    pub time_convention: TimeConvention,
    pub obs_error: ObsErrorSource,
}

/// Expand environment variables in YAML content.
/// Supports ${VAR} and ${VAR:-default} syntax.
fn expand_env_vars(content: &str) -> Result<String> {
    let mut result = String::new();
    let mut chars = content.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && chars.peek() == Some(&'{') {
            chars.next(); // consume '{'

            let mut var_expr = String::new();
            let mut brace_count = 1;

            while brace_count > 0 {
                match chars.next() {
                    Some('{') => {
                        brace_count += 1;
                        var_expr.push('{');
                    }
                    Some('}') => {
                        brace_count -= 1;
                        if brace_count > 0 {
                            var_expr.push('}');
                        }
                    }
                    Some(c) => var_expr.push(c),
                    None => {
                        return Err(IngestionError::ConfigParse(format!(
                            "unclosed variable substitution: ${{{}",
                            var_expr
                        )))
                    }
                }
            }

            result.push_str(&resolve_var_expr(&var_expr)?);
        } else {
            result.push(ch);
        }
    }

    Ok(result)
}

/// Resolve variable expression (supports VAR and VAR:-default syntax).
fn resolve_var_expr(expr: &str) -> Result<String> {
    if let Some((var_name, default)) = expr.split_once(":-") {
        match std::env::var(var_name.trim()) {
            Ok(val) if !val.is_empty() => Ok(val),
            _ => Ok(default.to_string()),
        }
    } else {
        std::env::var(expr.trim()).map_err(|_| {
            IngestionError::ConfigParse(format!("environment variable {} not set", expr))
        })
    }
}
