use clap::Parser;

use rill_api::{Context, Emitter, Record, RillError, Stage};

use super::parse_args;
use crate::error::EngineError;

#[derive(Debug, Parser)]
#[command(name = "sort-within-records", about = "Outputs records sorted lexically ascending by keys.")]
struct Args {
    /// Recursively sort nested maps as well.
    #[arg(short = 'r')]
    recursive: bool,
}

pub(super) fn build(args: &[String]) -> Result<Box<dyn Stage>, EngineError> {
    let args: Args = parse_args("sort-within-records", args)?;
    Ok(Box::new(SortWithinRecords { recursive: args.recursive }))
}

struct SortWithinRecords {
    recursive: bool,
}

impl Stage for SortWithinRecords {
    fn name(&self) -> &str {
        "sort-within-records"
    }

    fn process(&mut self, mut record: Record, ctx: &Context, out: &mut Emitter) -> Result<(), RillError> {
        if self.recursive {
            record.sort_by_key_recursively();
        } else {
            record.sort_by_key();
        }
        out.record(record, ctx.clone());
        Ok(())
    }
}
