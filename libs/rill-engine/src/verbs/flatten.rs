use clap::Parser;

use rill_api::{Context, Emitter, Record, RillError, Stage};

use super::parse_args;
use crate::error::EngineError;
use crate::io::FLATTEN_SEPARATOR;

#[derive(Debug, Parser)]
#[command(name = "flatten", about = "Flattens nested maps and arrays into keys like a.b.c.")]
struct FlattenArgs {
    #[arg(short = 's', default_value = FLATTEN_SEPARATOR, value_name = "SEPARATOR")]
    separator: String,
}

#[derive(Debug, Parser)]
#[command(name = "unflatten", about = "Turns keys like a.b.c back into nested maps and arrays.")]
struct UnflattenArgs {
    #[arg(short = 's', default_value = FLATTEN_SEPARATOR, value_name = "SEPARATOR")]
    separator: String,
}

pub(super) fn build_flatten(args: &[String]) -> Result<Box<dyn Stage>, EngineError> {
    let args: FlattenArgs = parse_args("flatten", args)?;
    Ok(Box::new(Reshape { unflatten: false, separator: non_empty("flatten", args.separator)? }))
}

pub(super) fn build_unflatten(args: &[String]) -> Result<Box<dyn Stage>, EngineError> {
    let args: UnflattenArgs = parse_args("unflatten", args)?;
    Ok(Box::new(Reshape { unflatten: true, separator: non_empty("unflatten", args.separator)? }))
}

fn non_empty(verb: &str, separator: String) -> Result<String, EngineError> {
    if separator.is_empty() {
        return Err(EngineError::Usage { verb: verb.into(), message: "separator must not be empty".into() });
    }
    Ok(separator)
}

struct Reshape {
    unflatten: bool,
    separator: String,
}

impl Stage for Reshape {
    fn name(&self) -> &str {
        if self.unflatten { "unflatten" } else { "flatten" }
    }

    fn process(&mut self, mut record: Record, ctx: &Context, out: &mut Emitter) -> Result<(), RillError> {
        if self.unflatten {
            record.unflatten(&self.separator);
        } else {
            record.flatten(&self.separator);
        }
        out.record(record, ctx.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rill_api::stage::dispatch;
    use rill_api::{Emitter, Item, Value};

    use super::*;
    use crate::verbs::build_stage;

    fn nested() -> Record {
        let mut inner = Record::new();
        inner.put_reference("b", Value::from_int(1));
        inner.put_reference("c", Value::from_array(vec![Value::from_int(2), Value::from_int(3)]));
        let mut record = Record::new();
        record.put_reference("a", Value::from_map(inner));
        record.put_reference("d", Value::from_string("x"));
        record
    }

    fn run(verb: &str, args: &[&str], record: Record) -> Record {
        let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        let mut stage = build_stage(verb, &args).expect("build");
        let mut out = Emitter::new();
        dispatch(stage.as_mut(), Item::Record(record, Context::new()), &mut out).expect("process");
        match out.into_items().pop() {
            Some(Item::Record(record, _)) => record,
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn flatten_with_separator() {
        let flat = run("flatten", &["-s", ":"], nested());
        let keys: Vec<&str> = flat.keys().collect();
        assert_eq!(keys, ["a:b", "a:c:1", "a:c:2", "d"]);
    }

    #[test]
    fn unflatten_restores_nesting() {
        let flat = run("flatten", &[], nested());
        let restored = run("unflatten", &[], flat);
        assert_eq!(restored, nested());
    }
}
