use clap::Parser;

use rill_api::ops::BinaryOp;
use rill_api::{Context, Emitter, Record, RillError, Stage, Value};

use super::{Groups, group_key, parse_args};
use crate::error::EngineError;

#[derive(Debug, Parser)]
#[command(
    name = "step",
    about = "Computes values dependent on earlier/later records, optionally grouped by category.",
    after_help = "Steppers:\n  \
                  counter     Count instances of field(s) between successive records\n  \
                  delta       Compute differences in field(s) between successive records\n  \
                  from-first  Compute differences in field(s) from first record\n  \
                  ratio       Compute ratios in field(s) between successive records\n  \
                  rsum        Compute running sums of field(s) between successive records\n  \
                  shift       Include value(s) in field(s) from the previous record, if any"
)]
struct Args {
    /// Stepper names.
    #[arg(short = 'a', required = true, value_delimiter = ',', value_name = "STEPPERS")]
    steppers: Vec<String>,

    /// Value field names.
    #[arg(short = 'f', required = true, value_delimiter = ',', value_name = "FIELDS")]
    fields: Vec<String>,

    /// Group-by field names.
    #[arg(short = 'g', value_delimiter = ',', value_name = "FIELDS")]
    group_by: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Counter,
    Delta,
    FromFirst,
    Ratio,
    Rsum,
    Shift,
}

impl Kind {
    fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "counter" => Kind::Counter,
            "delta" => Kind::Delta,
            "from-first" => Kind::FromFirst,
            "ratio" => Kind::Ratio,
            "rsum" => Kind::Rsum,
            "shift" => Kind::Shift,
            _ => return None,
        })
    }

    fn suffix(self) -> &'static str {
        match self {
            Kind::Counter => "counter",
            Kind::Delta => "delta",
            Kind::FromFirst => "from_first",
            Kind::Ratio => "ratio",
            Kind::Rsum => "rsum",
            Kind::Shift => "shift",
        }
    }
}

pub(super) fn build(args: &[String]) -> Result<Box<dyn Stage>, EngineError> {
    let args: Args = parse_args("step", args)?;
    let kinds = args
        .steppers
        .iter()
        .map(|name| {
            Kind::from_name(name).ok_or_else(|| EngineError::Usage {
                verb: "step".into(),
                message: format!("stepper \"{name}\" not found"),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    let output_names = args
        .fields
        .iter()
        .map(|field| kinds.iter().map(|kind| format!("{field}_{}", kind.suffix())).collect())
        .collect();
    Ok(Box::new(Step { kinds, fields: args.fields, output_names, group_by: args.group_by, groups: Groups::new() }))
}

/// Running state of one stepper for one field within one group.
enum Stepper {
    Counter(Value),
    Delta(Option<Value>),
    FromFirst(Option<Value>),
    Ratio(Option<Value>),
    Rsum(Value),
    Shift(Value),
}

impl Stepper {
    fn new(kind: Kind) -> Self {
        match kind {
            Kind::Counter => Stepper::Counter(Value::from_int(0)),
            Kind::Delta => Stepper::Delta(None),
            Kind::FromFirst => Stepper::FromFirst(None),
            Kind::Ratio => Stepper::Ratio(None),
            Kind::Rsum => Stepper::Rsum(Value::from_int(0)),
            Kind::Shift => Stepper::Shift(Value::Void),
        }
    }

    fn step(&mut self, current: &Value) -> Value {
        match self {
            Stepper::Counter(count) => {
                *count = BinaryOp::Plus.apply(count, &Value::from_int(1));
                count.copy()
            }
            Stepper::Delta(previous) => {
                let delta = match previous {
                    Some(p) => BinaryOp::Minus.apply(current, p),
                    None => Value::from_int(0),
                };
                *previous = Some(current.copy());
                delta
            }
            Stepper::FromFirst(first) => match first {
                Some(f) => BinaryOp::Minus.apply(current, f),
                None => {
                    *first = Some(current.copy());
                    Value::from_int(0)
                }
            },
            Stepper::Ratio(previous) => {
                let ratio = match previous {
                    Some(p) => BinaryOp::Divide.apply(current, p),
                    None => Value::from_int(1),
                };
                *previous = Some(current.copy());
                ratio
            }
            Stepper::Rsum(sum) => {
                *sum = BinaryOp::Plus.apply(current, sum);
                sum.copy()
            }
            Stepper::Shift(previous) => std::mem::replace(previous, current.copy()),
        }
    }
}

struct Step {
    kinds: Vec<Kind>,
    fields: Vec<String>,
    /// `{field}_{stepper}` per field, per stepper.
    output_names: Vec<Vec<String>>,
    group_by: Vec<String>,
    /// Per group, per field, per stepper.
    groups: Groups<Vec<Vec<Stepper>>>,
}

impl Stage for Step {
    fn name(&self) -> &str {
        "step"
    }

    fn process(&mut self, mut record: Record, ctx: &Context, out: &mut Emitter) -> Result<(), RillError> {
        let Some(key) = group_key(&record, &self.group_by) else {
            out.record(record, ctx.clone());
            return Ok(());
        };
        let (kinds, field_count) = (&self.kinds, self.fields.len());
        let state = self.groups.get_or_insert_with(key, || {
            (0..field_count).map(|_| kinds.iter().map(|kind| Stepper::new(*kind)).collect()).collect()
        });

        for ((field, steppers), names) in self.fields.iter().zip(state.iter_mut()).zip(&self.output_names) {
            let Some(current) = record.get(field).map(Value::copy) else {
                continue;
            };
            for (stepper, name) in steppers.iter_mut().zip(names) {
                let value = if current.is_void() { Value::Void } else { stepper.step(&current) };
                record.put_reference(name.as_str(), value);
            }
        }
        out.record(record, ctx.clone());
        Ok(())
    }
}
