use clap::Parser;

use rill_api::{Context, Emitter, Record, RillError, Stage};

use super::parse_args;
use crate::error::EngineError;

#[derive(Debug, Parser)]
#[command(name = "reorder", about = "Moves specified names to start of record, or end with -e.")]
struct Args {
    #[arg(short = 'f', required = true, value_delimiter = ',', value_name = "FIELDS")]
    fields: Vec<String>,

    /// Put the fields at the end of the record.
    #[arg(short = 'e')]
    to_end: bool,
}

pub(super) fn build(args: &[String]) -> Result<Box<dyn Stage>, EngineError> {
    let args: Args = parse_args("reorder", args)?;
    Ok(Box::new(Reorder { fields: args.fields, to_end: args.to_end }))
}

struct Reorder {
    fields: Vec<String>,
    to_end: bool,
}

impl Stage for Reorder {
    fn name(&self) -> &str {
        "reorder"
    }

    fn process(&mut self, mut record: Record, ctx: &Context, out: &mut Emitter) -> Result<(), RillError> {
        if self.to_end {
            for field in &self.fields {
                record.move_to_tail(field);
            }
        } else {
            for field in self.fields.iter().rev() {
                record.move_to_head(field);
            }
        }
        out.record(record, ctx.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::verbs::testing::run_verb;

    #[test]
    fn to_head_keeps_argument_order() {
        assert_eq!(run_verb("reorder", &["-f", "c,b"], &["a=1,b=2,c=3,d=4"]), ["c=3,b=2,a=1,d=4"]);
    }

    #[test]
    fn to_end() {
        assert_eq!(run_verb("reorder", &["-e", "-f", "a,b"], &["a=1,b=2,c=3"]), ["c=3,a=1,b=2"]);
    }

    #[test]
    fn missing_fields_are_ignored() {
        assert_eq!(run_verb("reorder", &["-f", "z"], &["a=1"]), ["a=1"]);
    }
}
