use clap::Parser;

use rill_api::{Context, Emitter, Record, RillError, Stage};

use super::{Groups, group_key, parse_args};
use crate::error::EngineError;

#[derive(Debug, Parser)]
#[command(name = "head", about = "Passes through the first n records, optionally by category.")]
struct Args {
    #[arg(short = 'n', default_value_t = 10)]
    count: u64,

    #[arg(short = 'g', value_delimiter = ',', value_name = "FIELDS")]
    group_by: Vec<String>,
}

pub(super) fn build(args: &[String]) -> Result<Box<dyn Stage>, EngineError> {
    let args: Args = parse_args("head", args)?;
    Ok(Box::new(Head { limit: args.count, group_by: args.group_by, seen: Groups::new() }))
}

struct Head {
    limit: u64,
    group_by: Vec<String>,
    seen: Groups<u64>,
}

impl Stage for Head {
    fn name(&self) -> &str {
        "head"
    }

    fn process(&mut self, record: Record, ctx: &Context, out: &mut Emitter) -> Result<(), RillError> {
        let Some(key) = group_key(&record, &self.group_by) else {
            return Ok(());
        };
        let seen = self.seen.get_or_insert_with(key, || 0);
        if *seen < self.limit {
            *seen += 1;
            out.record(record, ctx.clone());
        }
        Ok(())
    }
}
