use clap::Parser;

use rill_api::{Context, Emitter, Record, RillError, Stage, Value};

use super::{Groups, group_key, parse_args};
use crate::error::EngineError;

#[derive(Debug, Parser)]
#[command(name = "count", about = "Prints number of records, optionally grouped by distinct values for specified field names.")]
struct Args {
    /// Group-by field names.
    #[arg(short = 'g', value_delimiter = ',', value_name = "FIELDS")]
    group_by: Vec<String>,

    /// Output field name.
    #[arg(short = 'o', default_value = "count", value_name = "NAME")]
    output: String,

    /// Show only the number of distinct groups.
    #[arg(short = 'n', requires = "group_by")]
    distinct_only: bool,
}

pub(super) fn build(args: &[String]) -> Result<Box<dyn Stage>, EngineError> {
    let args: Args = parse_args("count", args)?;
    Ok(Box::new(Count {
        group_by: args.group_by,
        output: args.output,
        distinct_only: args.distinct_only,
        ungrouped: 0,
        groups: Groups::new(),
    }))
}

struct Count {
    group_by: Vec<String>,
    output: String,
    distinct_only: bool,
    ungrouped: i64,
    /// Group-by values copied from the first record of each group, and the count.
    groups: Groups<(Record, i64)>,
}

impl Stage for Count {
    fn name(&self) -> &str {
        "count"
    }

    fn process(&mut self, record: Record, _ctx: &Context, _out: &mut Emitter) -> Result<(), RillError> {
        if self.group_by.is_empty() {
            self.ungrouped += 1;
            return Ok(());
        }
        let Some(key) = group_key(&record, &self.group_by) else {
            return Ok(());
        };
        let group_by = &self.group_by;
        let (_, count) = self.groups.get_or_insert_with(key, || {
            let mut head = Record::with_capacity(group_by.len() + 1);
            for field in group_by {
                head.put_copy(field, record.get_or_absent(field));
            }
            (head, 0)
        });
        *count += 1;
        Ok(())
    }

    fn finish(&mut self, ctx: &Context, out: &mut Emitter) -> Result<(), RillError> {
        if self.group_by.is_empty() {
            let mut record = Record::new();
            record.put_reference(self.output.as_str(), Value::from_int(self.ungrouped));
            out.record(record, ctx.clone());
            return Ok(());
        }
        if self.distinct_only {
            let mut record = Record::new();
            record.put_reference(self.output.as_str(), Value::from_int(self.groups.len() as i64));
            out.record(record, ctx.clone());
            return Ok(());
        }
        for (_, (mut record, count)) in self.groups.drain() {
            record.put_reference(self.output.as_str(), Value::from_int(count));
            out.record(record, ctx.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::verbs::testing::run_verb;

    #[test]
    fn counts_all_records() {
        assert_eq!(run_verb("count", &[], &["a=1", "a=2", "b=3"]), ["count=3"]);
        assert_eq!(run_verb("count", &["-o", "n"], &[]), ["n=0"]);
    }

    #[test]
    fn counts_per_group_in_first_seen_order() {
        let out = run_verb("count", &["-g", "a"], &["a=x,v=1", "a=y,v=2", "a=x,v=3", "v=4"]);
        assert_eq!(out, ["a=x,count=2", "a=y,count=1"]);
    }

    #[test]
    fn distinct_group_count() {
        let out = run_verb("count", &["-n", "-g", "a,b"], &["a=1,b=1", "a=1,b=2", "a=1,b=1"]);
        assert_eq!(out, ["count=2"]);
    }
}
