use clap::Parser;

use rill_api::ops::BinaryOp;
use rill_api::{Context, Emitter, Record, RillError, Stage, Value};

use super::parse_args;
use crate::error::EngineError;

#[derive(Debug, Parser)]
#[command(
    name = "filter",
    about = "Keeps records for which FIELD OP LITERAL is true. OP is one of == != < <= > >=.",
    after_help = "Example: filter '$x > 0.5'   filter -x 'name == \"bob\"'"
)]
struct Args {
    /// Keep the records for which the condition is false instead.
    #[arg(short = 'x')]
    invert: bool,

    #[arg(value_name = "CONDITION")]
    condition: String,
}

pub(super) fn build(args: &[String]) -> Result<Box<dyn Stage>, EngineError> {
    let args: Args = parse_args("filter", args)?;
    let condition = Condition::parse(&args.condition)
        .map_err(|message| EngineError::Usage { verb: "filter".into(), message })?;
    Ok(Box::new(Filter { condition, invert: args.invert, errors: 0 }))
}

const OPERATORS: [&str; 6] = ["==", "!=", "<=", ">=", "<", ">"];

#[derive(Debug)]
struct Condition {
    field: String,
    op: BinaryOp,
    literal: Value,
}

impl Condition {
    /// `FIELD OP LITERAL`. The field may carry a leading `$`, and `${...}`
    /// braces let it contain spaces or operator characters. A literal in
    /// double quotes is a string, anything else is type-inferred.
    fn parse(text: &str) -> Result<Self, String> {
        let start = match text.trim_start().strip_prefix("${") {
            Some(rest) => {
                let close = rest.find('}').ok_or_else(|| format!("unterminated ${{ in {text:?}"))?;
                text.len() - rest.len() + close + 1
            }
            None => 0,
        };
        let (pos, symbol) = text[start..]
            .char_indices()
            .find_map(|(i, _)| {
                OPERATORS.iter().find(|op| text[start + i..].starts_with(**op)).map(|op| (start + i, *op))
            })
            .ok_or_else(|| format!("no comparison operator in {text:?}"))?;

        let field = text[..pos].trim();
        let field = field.strip_prefix('$').unwrap_or(field);
        let field = field.strip_prefix('{').and_then(|f| f.strip_suffix('}')).unwrap_or(field);
        if field.is_empty() {
            return Err(format!("no field name in {text:?}"));
        }

        let literal = text[pos + symbol.len()..].trim();
        let literal = match literal.strip_prefix('"').and_then(|l| l.strip_suffix('"')) {
            Some(quoted) => Value::from_string(quoted),
            None => Value::infer(literal),
        };

        let op = BinaryOp::from_symbol(symbol).ok_or_else(|| format!("unsupported operator {symbol}"))?;
        Ok(Self { field: field.to_string(), op, literal })
    }

    fn evaluate(&self, record: &Record) -> Value {
        self.op.apply(record.get_or_absent(&self.field), &self.literal)
    }
}

struct Filter {
    condition: Condition,
    invert: bool,
    errors: u64,
}

impl Stage for Filter {
    fn name(&self) -> &str {
        "filter"
    }

    fn process(&mut self, record: Record, ctx: &Context, out: &mut Emitter) -> Result<(), RillError> {
        let keep = match self.condition.evaluate(&record) {
            Value::Bool(b) => b != self.invert,
            Value::Absent => false,
            Value::Error(reason) => {
                self.errors += 1;
                tracing::warn!(
                    field = %self.condition.field,
                    nr = ctx.nr,
                    reason = reason.as_deref().unwrap_or("invalid operands"),
                    "filter condition is an error; record dropped"
                );
                false
            }
            other => {
                tracing::warn!(nr = ctx.nr, result = %other.type_name(), "filter condition is not boolean");
                false
            }
        };
        if keep {
            out.record(record, ctx.clone());
        }
        Ok(())
    }

    fn finish(&mut self, _ctx: &Context, _out: &mut Emitter) -> Result<(), RillError> {
        if self.errors > 0 {
            tracing::warn!(errors = self.errors, "filter dropped records with erroneous conditions");
        }
        Ok(())
    }
}
