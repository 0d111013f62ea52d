use clap::Parser;

use rill_api::{Context, Emitter, Record, RillError, Stage};

use super::parse_args;
use crate::error::EngineError;

#[derive(Debug, Parser)]
#[command(name = "nothing", about = "Drops all input records. Useful after print has produced other output.")]
struct Args {}

pub(super) fn build(args: &[String]) -> Result<Box<dyn Stage>, EngineError> {
    let _: Args = parse_args("nothing", args)?;
    Ok(Box::new(Nothing))
}

struct Nothing;

impl Stage for Nothing {
    fn name(&self) -> &str {
        "nothing"
    }

    fn process(&mut self, _record: Record, _ctx: &Context, _out: &mut Emitter) -> Result<(), RillError> {
        Ok(())
    }
}
