use std::collections::HashSet;

use clap::Parser;

use rill_api::{Context, Emitter, Record, RillError, Stage};

use super::parse_args;
use crate::error::EngineError;

#[derive(Debug, Parser)]
#[command(
    name = "label",
    about = "Given n comma-separated names, renames the first n fields to those names, in order."
)]
struct Args {
    #[arg(value_delimiter = ',', required = true, value_name = "NAMES")]
    names: Vec<String>,
}

pub(super) fn build(args: &[String]) -> Result<Box<dyn Stage>, EngineError> {
    let args: Args = parse_args("label", args)?;
    let mut seen = HashSet::new();
    if let Some(dup) = args.names.iter().find(|n| !seen.insert(n.as_str())) {
        return Err(EngineError::Usage { verb: "label".into(), message: format!("name {dup:?} given more than once") });
    }
    Ok(Box::new(Label { names: args.names }))
}

struct Label {
    names: Vec<String>,
}

impl Stage for Label {
    fn name(&self) -> &str {
        "label"
    }

    fn process(&mut self, mut record: Record, ctx: &Context, out: &mut Emitter) -> Result<(), RillError> {
        record.label(&self.names);
        out.record(record, ctx.clone());
        Ok(())
    }
}
