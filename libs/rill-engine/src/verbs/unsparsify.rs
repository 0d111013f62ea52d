use std::collections::HashSet;

use clap::Parser;

use rill_api::{Context, Emitter, Record, RillError, Stage, Value};

use super::parse_args;
use crate::error::EngineError;

#[derive(Debug, Parser)]
#[command(
    name = "unsparsify",
    about = "Prints records with the union of field names over all input records.",
    long_about = "Prints records with the union of field names over all input records. \
                  For field names absent in a given record but present in others, fills in \
                  the fill-with value. Holds all records in memory unless -f is given."
)]
struct Args {
    #[arg(long = "fill-with", default_value = "", value_name = "VALUE")]
    fill_with: String,

    /// Streaming mode: only ensure these fields are present.
    #[arg(short = 'f', value_delimiter = ',', value_name = "FIELDS")]
    fields: Vec<String>,
}

pub(super) fn build(args: &[String]) -> Result<Box<dyn Stage>, EngineError> {
    let args: Args = parse_args("unsparsify", args)?;
    Ok(Box::new(Unsparsify {
        fill: Value::infer(&args.fill_with),
        streaming_fields: args.fields,
        keys: Vec::new(),
        seen: HashSet::new(),
        held: Vec::new(),
    }))
}

struct Unsparsify {
    fill: Value,
    streaming_fields: Vec<String>,
    keys: Vec<String>,
    seen: HashSet<String>,
    held: Vec<(Record, Context)>,
}

impl Stage for Unsparsify {
    fn name(&self) -> &str {
        "unsparsify"
    }

    fn process(&mut self, mut record: Record, ctx: &Context, out: &mut Emitter) -> Result<(), RillError> {
        if !self.streaming_fields.is_empty() {
            for field in &self.streaming_fields {
                if !record.has(field) {
                    record.put_copy(field, &self.fill);
                }
            }
            out.record(record, ctx.clone());
            return Ok(());
        }

        for key in record.keys() {
            if !self.seen.contains(key) {
                self.seen.insert(key.to_string());
                self.keys.push(key.to_string());
            }
        }
        self.held.push((record, ctx.clone()));
        Ok(())
    }

    fn finish(&mut self, _ctx: &Context, out: &mut Emitter) -> Result<(), RillError> {
        for (mut record, ctx) in self.held.drain(..) {
            let mut full = Record::with_capacity(self.keys.len());
            for key in &self.keys {
                let value = record.take(key).unwrap_or_else(|| self.fill.copy());
                full.put_reference(key.as_str(), value);
            }
            out.record(full, ctx);
        }
        Ok(())
    }
}
