//! Execution side of rill: the concurrent record pipeline, the reader and
//! writer boundary, the built-in verbs and the TOML configuration.

pub mod config;
pub mod error;
pub mod io;
pub mod pipeline;
pub mod verbs;

pub use config::{Format, RillConfig, StageConfig};
pub use error::EngineError;
pub use pipeline::{Input, Pipeline, PipelineOptions, Reshape, RunSummary};
