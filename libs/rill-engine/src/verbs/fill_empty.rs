use clap::Parser;

use rill_api::{Context, Emitter, Record, RillError, Stage, Value};

use super::parse_args;
use crate::error::EngineError;

#[derive(Debug, Parser)]
#[command(name = "fill-empty", about = "Fills empty-string fields with specified fill-value.")]
struct Args {
    /// Fill value.
    #[arg(short = 'v', default_value = "N/A", value_name = "VALUE")]
    value: String,

    /// Don't infer a type for the fill value: it stays a string.
    #[arg(short = 'S')]
    as_string: bool,

    /// Treat whitespace-only values as empty too.
    #[arg(long = "only-if-blank")]
    blank: bool,
}

pub(super) fn build(args: &[String]) -> Result<Box<dyn Stage>, EngineError> {
    let args: Args = parse_args("fill-empty", args)?;
    let fill = if args.as_string { Value::from_string(args.value) } else { Value::infer(&args.value) };
    Ok(Box::new(FillEmpty { fill, blank: args.blank }))
}

struct FillEmpty {
    fill: Value,
    blank: bool,
}

impl Stage for FillEmpty {
    fn name(&self) -> &str {
        "fill-empty"
    }

    fn process(&mut self, mut record: Record, ctx: &Context, out: &mut Emitter) -> Result<(), RillError> {
        record.for_each_value_mut(|_, value| {
            let empty = if self.blank { value.is_blank() } else { value.is_void() };
            if empty {
                *value = self.fill.copy();
            }
        });
        out.record(record, ctx.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::verbs::testing::run_verb;

    #[test]
    fn default_fill() {
        assert_eq!(run_verb("fill-empty", &[], &["a=,b=2"]), ["a=N/A,b=2"]);
    }

    #[test]
    fn inferred_fill_value() {
        let out = run_verb("fill-empty", &["-v", "0"], &["a=,b= "]);
        assert_eq!(out, ["a=0,b= "]);
        let out = run_verb("fill-empty", &["-v", "0", "--only-if-blank"], &["a=,b= "]);
        assert_eq!(out, ["a=0,b=0"]);
    }
}
