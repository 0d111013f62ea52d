use clap::Parser;

use rill_api::{Context, Emitter, Record, RillError, Stage, Value};

use super::{Groups, group_key, parse_args};
use crate::error::EngineError;

#[derive(Debug, Parser)]
#[command(name = "cat", about = "Passes input records directly to output.")]
struct Args {
    /// Prepend field "n" with a 1-up record counter.
    #[arg(short = 'n')]
    number: bool,

    /// Prepend a counter field with the given name (implies -n).
    #[arg(short = 'N', value_name = "NAME")]
    name: Option<String>,

    /// Count per distinct value of these fields.
    #[arg(short = 'g', value_delimiter = ',', value_name = "FIELDS")]
    group_by: Vec<String>,
}

pub(super) fn build(args: &[String]) -> Result<Box<dyn Stage>, EngineError> {
    let args: Args = parse_args("cat", args)?;
    let counter_name = match (args.name, args.number) {
        (Some(name), _) => Some(name),
        (None, true) => Some("n".to_string()),
        (None, false) => None,
    };
    Ok(Box::new(Cat { counter_name, group_by: args.group_by, counts: Groups::new() }))
}

struct Cat {
    counter_name: Option<String>,
    group_by: Vec<String>,
    counts: Groups<i64>,
}

impl Stage for Cat {
    fn name(&self) -> &str {
        "cat"
    }

    fn process(&mut self, mut record: Record, ctx: &Context, out: &mut Emitter) -> Result<(), RillError> {
        let Some(key) = group_key(&record, &self.group_by) else {
            return Ok(());
        };
        if let Some(name) = &self.counter_name {
            let count = self.counts.get_or_insert_with(key, || 0);
            *count += 1;
            record.prepend_reference(name.as_str(), Value::from_int(*count));
        }
        out.record(record, ctx.clone());
        Ok(())
    }
}
