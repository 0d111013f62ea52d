use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use rill_api::InferMode;
use rill_api::value::FloatFormat;

use crate::error::EngineError;

/// Root configuration, parsed from TOML and then overridden from the CLI.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RillConfig {
    #[serde(default)]
    pub input: InputConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Verb chain, applied in order.
    #[serde(default)]
    pub stages: Vec<StageConfig>,

    /// Input files; standard input when empty.
    #[serde(default)]
    pub files: Vec<String>,

    /// tracing filter directive (`warn`, `rill_engine=debug`, ...).
    #[serde(default)]
    pub log_level: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    #[default]
    Dkvp,
    Nidx,
    Csv,
    Json,
    Jsonl,
}

impl Format {
    pub fn name(self) -> &'static str {
        match self {
            Format::Dkvp => "dkvp",
            Format::Nidx => "nidx",
            Format::Csv => "csv",
            Format::Json => "json",
            Format::Jsonl => "jsonl",
        }
    }

    pub fn is_json(self) -> bool {
        matches!(self, Format::Json | Format::Jsonl)
    }

    pub fn default_fs(self) -> &'static str {
        match self {
            Format::Nidx => " ",
            _ => ",",
        }
    }

    pub fn default_ps(self) -> &'static str {
        "="
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Format {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dkvp" => Ok(Format::Dkvp),
            "nidx" => Ok(Format::Nidx),
            "csv" => Ok(Format::Csv),
            "json" => Ok(Format::Json),
            "jsonl" => Ok(Format::Jsonl),
            other => Err(EngineError::Config(format!("unknown format {other:?}"))),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InputConfig {
    #[serde(default)]
    pub format: Format,
    /// Field separator; format default when unset.
    #[serde(default)]
    pub fs: Option<String>,
    /// Pair separator (DKVP).
    #[serde(default)]
    pub ps: Option<String>,
    #[serde(default)]
    pub infer: InferMode,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: Format,
    #[serde(default)]
    pub fs: Option<String>,
    #[serde(default)]
    pub ps: Option<String>,
    /// Float output format, e.g. `%.4f`.
    #[serde(default)]
    pub ofmt: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    /// Items per channel message.
    #[serde(default = "default_records_per_batch")]
    pub records_per_batch: usize,
    /// Messages buffered on each channel edge.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

fn default_records_per_batch() -> usize {
    500
}
fn default_channel_capacity() -> usize {
    16
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self { records_per_batch: default_records_per_batch(), channel_capacity: default_channel_capacity() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StageConfig {
    pub verb: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl RillConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self, EngineError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| EngineError::Config(format!("{path}: {e}")))?;
        Self::parse(&content).map_err(|e| e.with_context(path))
    }

    /// Parse configuration from a TOML string.
    pub fn parse(toml_str: &str) -> Result<Self, EngineError> {
        toml::from_str(toml_str).map_err(|e| EngineError::Config(e.to_string()))
    }

    /// Check values serde cannot: sizes and the float format.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.pipeline.records_per_batch == 0 {
            return Err(EngineError::Config("records_per_batch must be positive".into()));
        }
        if self.pipeline.channel_capacity == 0 {
            return Err(EngineError::Config("channel_capacity must be positive".into()));
        }
        if let Some(ofmt) = &self.output.ofmt {
            FloatFormat::parse(ofmt).map_err(|e| EngineError::Config(format!("ofmt: {}", e.message)))?;
        }
        for (i, stage) in self.stages.iter().enumerate() {
            if stage.verb.is_empty() {
                return Err(EngineError::Config(format!("stages[{i}]: empty verb")));
            }
        }
        Ok(())
    }

    /// Install `output.ofmt` as the process-wide float format. Call once,
    /// at startup; a second installation is a config error.
    pub fn install_float_format(&self) -> Result<(), EngineError> {
        let Some(ofmt) = &self.output.ofmt else {
            return Ok(());
        };
        let format = FloatFormat::parse(ofmt).map_err(|e| EngineError::Config(format!("ofmt: {}", e.message)))?;
        rill_api::value::set_float_output_format(format)?;
        tracing::debug!(ofmt = %ofmt, "float output format installed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        let config = RillConfig::parse("").expect("parse");
        assert_eq!(config.input.format, Format::Dkvp);
        assert_eq!(config.output.format, Format::Dkvp);
        assert_eq!(config.input.infer, InferMode::Full);
        assert_eq!(config.pipeline.records_per_batch, 500);
        assert_eq!(config.pipeline.channel_capacity, 16);
        assert!(config.stages.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn full_document() {
        let config = RillConfig::parse(
            r#"
            files = ["a.csv", "b.csv"]
            log_level = "debug"

            [input]
            format = "csv"
            fs = ";"
            infer = "no-bool"

            [output]
            format = "jsonl"
            ofmt = "%.3f"

            [pipeline]
            records_per_batch = 10

            [[stages]]
            verb = "head"
            args = ["-n", "2"]

            [[stages]]
            verb = "tac"
            "#,
        )
        .expect("parse");
        assert_eq!(config.input.format, Format::Csv);
        assert_eq!(config.input.fs.as_deref(), Some(";"));
        assert_eq!(config.input.infer, InferMode::NoBool);
        assert_eq!(config.output.format, Format::Jsonl);
        assert_eq!(config.pipeline.records_per_batch, 10);
        assert_eq!(config.pipeline.channel_capacity, 16);
        assert_eq!(config.files, ["a.csv", "b.csv"]);
        assert_eq!(
            config.stages,
            [
                StageConfig { verb: "head".into(), args: vec!["-n".into(), "2".into()] },
                StageConfig { verb: "tac".into(), args: vec![] },
            ]
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(RillConfig::parse("[input]\nseparator = \",\"").is_err());
        assert!(RillConfig::parse("[output]\nformat = \"xml\"").is_err());
    }

    #[test]
    fn validation() {
        let mut config = RillConfig::default();
        config.pipeline.records_per_batch = 0;
        assert!(config.validate().is_err());

        let mut config = RillConfig::default();
        config.output.ofmt = Some("no verb".into());
        assert!(matches!(config.validate(), Err(EngineError::Config(_))));
    }

    #[test]
    fn format_names_round_trip() {
        for format in [Format::Dkvp, Format::Nidx, Format::Csv, Format::Json, Format::Jsonl] {
            assert_eq!(format.name().parse::<Format>().expect("parse"), format);
        }
        assert!("xtab".parse::<Format>().is_err());
    }
}
