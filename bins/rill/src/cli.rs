use clap::{ArgGroup, Parser};

use rill_api::InferMode;
use rill_engine::config::{Format, RillConfig};
use rill_engine::error::EngineError;
use rill_engine::verbs;

/// Separates the verb chain from the input files.
const FILES_MARKER: &str = "--";

#[derive(Debug, Parser)]
#[command(
    name = "rill",
    version,
    about = "Streaming record processor: reads records, runs them through a chain of verbs, writes them out.",
    override_usage = "rill [OPTIONS] VERB [ARGS]... [then VERB [ARGS]...]... [-- FILE...]",
    group(ArgGroup::new("input-format").multiple(false)),
    group(ArgGroup::new("output-format").multiple(false))
)]
pub struct Cli {
    /// Path to TOML configuration file.
    #[arg(long, env = "RILL_CONFIG", value_name = "PATH")]
    pub config: Option<String>,

    #[arg(long, group = "input-format")]
    pub icsv: bool,
    #[arg(long, group = "input-format")]
    pub idkvp: bool,
    #[arg(long, group = "input-format")]
    pub inidx: bool,
    #[arg(long, group = "input-format")]
    pub ijson: bool,

    #[arg(long, group = "output-format")]
    pub ocsv: bool,
    #[arg(long, group = "output-format")]
    pub odkvp: bool,
    #[arg(long, group = "output-format")]
    pub onidx: bool,
    #[arg(long, group = "output-format")]
    pub ojson: bool,
    #[arg(long, group = "output-format")]
    pub ojsonl: bool,

    /// Input and output format at once; --iX/--oX flags take precedence.
    #[arg(long, value_name = "FORMAT")]
    pub io: Option<Format>,

    /// Input field separator (names like `tab`, `semicolon` are accepted).
    #[arg(long, value_name = "SEP")]
    pub ifs: Option<String>,
    /// Input pair separator.
    #[arg(long, value_name = "SEP")]
    pub ips: Option<String>,
    /// Output field separator.
    #[arg(long, value_name = "SEP")]
    pub ofs: Option<String>,
    /// Output pair separator.
    #[arg(long, value_name = "SEP")]
    pub ops: Option<String>,

    /// Float output format, e.g. `%.4f`.
    #[arg(long, value_name = "FORMAT")]
    pub ofmt: Option<String>,

    /// Don't infer types: every field is read as a string.
    #[arg(short = 'S', conflicts_with = "ints_as_floats")]
    pub strings: bool,

    /// Read integers as floats.
    #[arg(short = 'A')]
    pub ints_as_floats: bool,

    #[arg(long, value_name = "N")]
    pub records_per_batch: Option<usize>,

    /// tracing filter directive; `RUST_LOG` takes precedence.
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Input file; may be repeated.
    #[arg(long = "from", value_name = "FILE")]
    pub from: Vec<String>,

    /// Verb chain, then `--` and input files.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "VERB")]
    pub chain: Vec<String>,
}

impl Cli {
    fn input_format(&self) -> Option<Format> {
        let flags = [(self.icsv, Format::Csv), (self.idkvp, Format::Dkvp), (self.inidx, Format::Nidx), (self.ijson, Format::Json)];
        flags.into_iter().find_map(|(set, format)| set.then_some(format)).or(self.io)
    }

    fn output_format(&self) -> Option<Format> {
        let flags = [
            (self.ocsv, Format::Csv),
            (self.odkvp, Format::Dkvp),
            (self.onidx, Format::Nidx),
            (self.ojson, Format::Json),
            (self.ojsonl, Format::Jsonl),
        ];
        flags.into_iter().find_map(|(set, format)| set.then_some(format)).or(self.io)
    }

    /// Chain words and the files listed after `--`.
    fn split_chain(&self) -> (&[String], &[String]) {
        match self.chain.iter().position(|w| w == FILES_MARKER) {
            Some(pos) => (&self.chain[..pos], &self.chain[pos + 1..]),
            None => (self.chain.as_slice(), &[]),
        }
    }

    /// Effective configuration: the TOML file if any, overridden by flags.
    pub fn effective_config(&self) -> Result<RillConfig, EngineError> {
        let mut config = match &self.config {
            Some(path) => RillConfig::load(path)?,
            None => RillConfig::default(),
        };
        self.apply(&mut config)?;
        config.validate()?;
        Ok(config)
    }

    fn apply(&self, config: &mut RillConfig) -> Result<(), EngineError> {
        if let Some(format) = self.input_format() {
            config.input.format = format;
        }
        if let Some(format) = self.output_format() {
            config.output.format = format;
        }
        override_with(&mut config.input.fs, &self.ifs);
        override_with(&mut config.input.ps, &self.ips);
        override_with(&mut config.output.fs, &self.ofs);
        override_with(&mut config.output.ps, &self.ops);
        override_with(&mut config.output.ofmt, &self.ofmt);
        override_with(&mut config.log_level, &self.log_level);

        if self.strings {
            config.input.infer = InferMode::Strings;
        } else if self.ints_as_floats {
            config.input.infer = InferMode::IntAsFloat;
        }
        if let Some(n) = self.records_per_batch {
            config.pipeline.records_per_batch = n;
        }

        let (chain, files) = self.split_chain();
        if !chain.is_empty() {
            config.stages = verbs::parse_chain(chain)?;
        }
        let files: Vec<String> = self.from.iter().chain(files).cloned().collect();
        if !files.is_empty() {
            config.files = files;
        }
        Ok(())
    }
}

fn override_with(slot: &mut Option<String>, flag: &Option<String>) {
    if let Some(value) = flag {
        *slot = Some(value.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("rill").chain(args.iter().copied())).expect("parse")
    }

    #[test]
    fn chain_keeps_verb_flags() {
        let cli = cli(&["--icsv", "--ojson", "head", "-n", "2", "-g", "a", "then", "tac"]);
        let config = cli.effective_config().expect("config");
        assert_eq!(config.input.format, Format::Csv);
        assert_eq!(config.output.format, Format::Json);
        assert_eq!(config.stages.len(), 2);
        assert_eq!(config.stages[0].args, ["-n", "2", "-g", "a"]);
        assert_eq!(config.stages[1].verb, "tac");
    }

    #[test]
    fn files_follow_the_marker() {
        let cli = cli(&["--from", "a.csv", "cat", "-n", "--", "b.csv", "c.csv"]);
        let config = cli.effective_config().expect("config");
        assert_eq!(config.stages[0].args, ["-n"]);
        assert_eq!(config.files, ["a.csv", "b.csv", "c.csv"]);
    }

    #[test]
    fn io_sets_both_and_specific_flags_win() {
        let config = cli(&["--io", "json", "--ocsv"]).effective_config().expect("config");
        assert_eq!(config.input.format, Format::Json);
        assert_eq!(config.output.format, Format::Csv);
        assert!(config.stages.is_empty());
    }

    #[test]
    fn conflicting_format_flags_are_rejected() {
        assert!(Cli::try_parse_from(["rill", "--icsv", "--ijson", "cat"]).is_err());
        assert!(Cli::try_parse_from(["rill", "-S", "-A", "cat"]).is_err());
        assert!(Cli::try_parse_from(["rill", "--io", "xml", "cat"]).is_err());
    }

    #[test]
    fn flags_override_the_file() {
        let mut config = RillConfig::parse(
            r#"
            files = ["from-file.dkvp"]
            log_level = "info"

            [output]
            ofs = ";"

            [[stages]]
            verb = "tac"
            "#,
        )
        .expect("parse");
        cli(&["--ofs", "tab", "-S", "head", "-n", "1"]).apply(&mut config).expect("apply");
        assert_eq!(config.output.fs.as_deref(), Some("tab"));
        assert_eq!(config.input.infer, InferMode::Strings);
        assert_eq!(config.stages[0].verb, "head");
        assert_eq!(config.files, ["from-file.dkvp"]);
        assert_eq!(config.log_level.as_deref(), Some("info"));
    }

    #[test]
    fn dangling_then_is_a_config_error() {
        let err = cli(&["head", "then"]).effective_config().expect_err("dangling");
        assert!(err.is_usage(), "{err}");
    }
}
