use std::collections::VecDeque;

use clap::Parser;

use rill_api::{Context, Emitter, Record, RillError, Stage};

use super::{Groups, group_key, parse_args};
use crate::error::EngineError;

#[derive(Debug, Parser)]
#[command(name = "tail", about = "Passes through the last n records, optionally by category.")]
struct Args {
    #[arg(short = 'n', default_value_t = 10)]
    count: usize,

    #[arg(short = 'g', value_delimiter = ',', value_name = "FIELDS")]
    group_by: Vec<String>,
}

pub(super) fn build(args: &[String]) -> Result<Box<dyn Stage>, EngineError> {
    let args: Args = parse_args("tail", args)?;
    Ok(Box::new(Tail { limit: args.count, group_by: args.group_by, windows: Groups::new() }))
}

struct Tail {
    limit: usize,
    group_by: Vec<String>,
    windows: Groups<VecDeque<(Record, Context)>>,
}

impl Stage for Tail {
    fn name(&self) -> &str {
        "tail"
    }

    fn process(&mut self, record: Record, ctx: &Context, _out: &mut Emitter) -> Result<(), RillError> {
        let Some(key) = group_key(&record, &self.group_by) else {
            return Ok(());
        };
        let window = self.windows.get_or_insert_with(key, VecDeque::new);
        if self.limit == 0 {
            return Ok(());
        }
        if window.len() == self.limit {
            window.pop_front();
        }
        window.push_back((record, ctx.clone()));
        Ok(())
    }

    fn finish(&mut self, _ctx: &Context, out: &mut Emitter) -> Result<(), RillError> {
        for (_, window) in self.windows.drain() {
            for (record, ctx) in window {
                out.record(record, ctx);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::verbs::testing::run_verb;

    #[test]
    fn last_n() {
        assert_eq!(run_verb("tail", &["-n", "2"], &["a=1", "a=2", "a=3"]), ["a=2", "a=3"]);
        assert!(run_verb("tail", &["-n", "0"], &["a=1"]).is_empty());
    }

    #[test]
    fn per_group_in_first_seen_order() {
        let out = run_verb("tail", &["-n", "1", "-g", "k"], &["k=b,v=1", "k=a,v=2", "k=b,v=3", "k=a,v=4"]);
        assert_eq!(out, ["k=b,v=3", "k=a,v=4"]);
    }
}
