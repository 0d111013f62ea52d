use std::collections::HashSet;

use clap::Parser;

use rill_api::{Context, Emitter, Record, RillError, Stage};

use super::parse_args;
use crate::error::EngineError;

#[derive(Debug, Parser)]
#[command(name = "cut", about = "Passes through input records with specified fields included/excluded.")]
struct Args {
    /// Field names to include (or exclude with -x).
    #[arg(short = 'f', required = true, value_delimiter = ',', value_name = "FIELDS")]
    fields: Vec<String>,

    /// Output fields in the order given with -f, not the record's order.
    #[arg(short = 'o')]
    ordered: bool,

    /// Exclude the named fields instead.
    #[arg(short = 'x', conflicts_with = "ordered")]
    exclude: bool,
}

pub(super) fn build(args: &[String]) -> Result<Box<dyn Stage>, EngineError> {
    let args: Args = parse_args("cut", args)?;
    let mode = match (args.exclude, args.ordered) {
        (true, _) => Mode::Exclude,
        (false, true) => Mode::IncludeOrdered,
        (false, false) => Mode::Include,
    };
    let set = args.fields.iter().cloned().collect();
    Ok(Box::new(Cut { fields: args.fields, set, mode }))
}

#[derive(Debug, Clone, Copy)]
enum Mode {
    Include,
    IncludeOrdered,
    Exclude,
}

struct Cut {
    fields: Vec<String>,
    set: HashSet<String>,
    mode: Mode,
}

impl Stage for Cut {
    fn name(&self) -> &str {
        "cut"
    }

    fn process(&mut self, mut record: Record, ctx: &Context, out: &mut Emitter) -> Result<(), RillError> {
        let record = match self.mode {
            Mode::Include => {
                let doomed: Vec<String> = record.keys().filter(|k| !self.set.contains(*k)).map(str::to_string).collect();
                for key in doomed {
                    record.remove(&key);
                }
                record
            }
            Mode::IncludeOrdered => {
                let mut kept = Record::with_capacity(self.fields.len());
                for field in &self.fields {
                    if let Some(value) = record.take(field) {
                        kept.put_reference(field.as_str(), value);
                    }
                }
                kept
            }
            Mode::Exclude => {
                for field in &self.fields {
                    record.remove(field);
                }
                record
            }
        };
        out.record(record, ctx.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::verbs::testing::run_verb;

    #[test]
    fn include_keeps_record_order() {
        assert_eq!(run_verb("cut", &["-f", "c,a"], &["a=1,b=2,c=3"]), ["a=1,c=3"]);
    }

    #[test]
    fn ordered_follows_the_argument() {
        assert_eq!(run_verb("cut", &["-o", "-f", "c,a,z"], &["a=1,b=2,c=3"]), ["c=3,a=1"]);
    }

    #[test]
    fn exclude() {
        assert_eq!(run_verb("cut", &["-x", "-f", "b"], &["a=1,b=2,c=3"]), ["a=1,c=3"]);
    }

    #[test]
    fn fields_are_required() {
        assert!(crate::verbs::build_stage("cut", &[]).is_err());
    }
}
