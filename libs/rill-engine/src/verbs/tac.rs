use clap::Parser;

use rill_api::{Context, Emitter, Record, RillError, Stage};

use super::parse_args;
use crate::error::EngineError;

#[derive(Debug, Parser)]
#[command(name = "tac", about = "Prints records in reverse order from the order in which they were encountered.")]
struct Args {}

pub(super) fn build(args: &[String]) -> Result<Box<dyn Stage>, EngineError> {
    let _: Args = parse_args("tac", args)?;
    Ok(Box::new(Tac { held: Vec::new() }))
}

struct Tac {
    held: Vec<(Record, Context)>,
}

impl Stage for Tac {
    fn name(&self) -> &str {
        "tac"
    }

    fn process(&mut self, record: Record, ctx: &Context, _out: &mut Emitter) -> Result<(), RillError> {
        self.held.push((record, ctx.clone()));
        Ok(())
    }

    fn finish(&mut self, _ctx: &Context, out: &mut Emitter) -> Result<(), RillError> {
        while let Some((record, ctx)) = self.held.pop() {
            out.record(record, ctx);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::verbs::testing::run_verb;

    #[test]
    fn reverses() {
        assert_eq!(run_verb("tac", &[], &["a=1", "a=2", "a=3"]), ["a=3", "a=2", "a=1"]);
    }

    #[test]
    fn takes_no_arguments() {
        assert!(crate::verbs::build_stage("tac", &["-n".to_string()]).is_err());
    }
}
