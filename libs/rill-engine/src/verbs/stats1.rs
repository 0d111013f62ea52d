use std::collections::HashMap;

use clap::Parser;

use rill_api::ops::BinaryOp;
use rill_api::{Context, Emitter, Record, RillError, Stage, Value};

use super::{Groups, group_key, parse_args};
use crate::error::EngineError;

#[derive(Debug, Parser)]
#[command(
    name = "stats1",
    about = "Computes univariate statistics for one or more given fields, accumulated across the input record stream.",
    after_help = "Accumulators: count sum mean min max mode antimode first last var stddev\n\
                  Example: stats1 -a min,mean,max -f x,y -g a"
)]
struct Args {
    /// Accumulator names.
    #[arg(short = 'a', required = true, value_delimiter = ',', value_name = "ACCUMULATORS")]
    accumulators: Vec<String>,

    /// Value field names.
    #[arg(short = 'f', required = true, value_delimiter = ',', value_name = "FIELDS")]
    fields: Vec<String>,

    /// Group-by field names.
    #[arg(short = 'g', value_delimiter = ',', value_name = "FIELDS")]
    group_by: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Count,
    Sum,
    Mean,
    Min,
    Max,
    Mode,
    Antimode,
    First,
    Last,
    Var,
    Stddev,
}

impl Kind {
    fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "count" => Kind::Count,
            "sum" => Kind::Sum,
            "mean" => Kind::Mean,
            "min" => Kind::Min,
            "max" => Kind::Max,
            "mode" => Kind::Mode,
            "antimode" => Kind::Antimode,
            "first" => Kind::First,
            "last" => Kind::Last,
            "var" => Kind::Var,
            "stddev" => Kind::Stddev,
            _ => return None,
        })
    }
}

pub(super) fn build(args: &[String]) -> Result<Box<dyn Stage>, EngineError> {
    let args: Args = parse_args("stats1", args)?;
    let kinds = args
        .accumulators
        .iter()
        .map(|name| {
            Kind::from_name(name).map(|kind| (name.clone(), kind)).ok_or_else(|| EngineError::Usage {
                verb: "stats1".into(),
                message: format!("accumulator \"{name}\" not found"),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Box::new(Stats1 { kinds, fields: args.fields, group_by: args.group_by, groups: Groups::new() }))
}

// ═══════════════════════════════════════════════════════════════
//  Accumulators
// ═══════════════════════════════════════════════════════════════

enum Accumulator {
    Count(i64),
    Sum(Value),
    Mean { sum: Value, count: i64 },
    Min(Value),
    Max(Value),
    /// Distinct values by print representation, in first-seen order.
    Mode { index: HashMap<String, usize>, seen: Vec<(Value, u64)>, anti: bool },
    First(Option<Value>),
    Last(Option<Value>),
    /// Welford's running mean and sum of squared deviations.
    Var { count: u64, mean: f64, m2: f64, numeric: bool, stddev: bool },
}

impl Accumulator {
    fn new(kind: Kind) -> Self {
        match kind {
            Kind::Count => Accumulator::Count(0),
            Kind::Sum => Accumulator::Sum(Value::from_int(0)),
            Kind::Mean => Accumulator::Mean { sum: Value::from_int(0), count: 0 },
            Kind::Min => Accumulator::Min(Value::Absent),
            Kind::Max => Accumulator::Max(Value::Absent),
            Kind::Mode | Kind::Antimode => {
                Accumulator::Mode { index: HashMap::new(), seen: Vec::new(), anti: kind == Kind::Antimode }
            }
            Kind::First => Accumulator::First(None),
            Kind::Last => Accumulator::Last(None),
            Kind::Var | Kind::Stddev => {
                Accumulator::Var { count: 0, mean: 0.0, m2: 0.0, numeric: true, stddev: kind == Kind::Stddev }
            }
        }
    }

    fn ingest(&mut self, value: &Value) {
        match self {
            Accumulator::Count(n) => *n += 1,
            Accumulator::Sum(sum) => *sum = BinaryOp::Plus.apply(sum, value),
            Accumulator::Mean { sum, count } => {
                *sum = BinaryOp::Plus.apply(sum, value);
                *count += 1;
            }
            Accumulator::Min(min) => *min = BinaryOp::Min.apply(min, value),
            Accumulator::Max(max) => *max = BinaryOp::Max.apply(max, value),
            Accumulator::Mode { index, seen, .. } => {
                let key = value.render();
                match index.get(key.as_ref()) {
                    Some(&slot) => seen[slot].1 += 1,
                    None => {
                        index.insert(key.into_owned(), seen.len());
                        seen.push((value.copy(), 1));
                    }
                }
            }
            Accumulator::First(first) => {
                if first.is_none() {
                    *first = Some(value.copy());
                }
            }
            Accumulator::Last(last) => *last = Some(value.copy()),
            Accumulator::Var { count, mean, m2, numeric, .. } => match value.as_float() {
                Some(x) => {
                    *count += 1;
                    let delta = x - *mean;
                    *mean += delta / *count as f64;
                    *m2 += delta * (x - *mean);
                }
                None => *numeric = false,
            },
        }
    }

    fn emit(&self) -> Value {
        match self {
            Accumulator::Count(n) => Value::from_int(*n),
            Accumulator::Sum(sum) => sum.copy(),
            Accumulator::Mean { sum, count } => BinaryOp::Divide.apply(sum, &Value::from_int(*count)),
            Accumulator::Min(v) | Accumulator::Max(v) => v.copy(),
            Accumulator::Mode { seen, anti, .. } => {
                let mut best: Option<&(Value, u64)> = None;
                for entry in seen {
                    let better = match best {
                        None => true,
                        Some(b) if *anti => entry.1 < b.1,
                        Some(b) => entry.1 > b.1,
                    };
                    if better {
                        best = Some(entry);
                    }
                }
                best.map_or(Value::Void, |(v, _)| v.copy())
            }
            Accumulator::First(v) | Accumulator::Last(v) => v.as_ref().map_or(Value::Void, Value::copy),
            Accumulator::Var { count, m2, numeric, stddev, .. } => {
                if !numeric {
                    return Value::error_because("non-numeric input to var");
                }
                if *count < 2 {
                    return Value::Void;
                }
                let var = m2 / (*count - 1) as f64;
                Value::from_float(if *stddev { var.sqrt() } else { var })
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  Stage
// ═══════════════════════════════════════════════════════════════

struct GroupState {
    /// Group-by values from the group's first record.
    head: Record,
    /// Per value field, created when the field is first seen non-empty.
    fields: Vec<Option<Vec<Accumulator>>>,
}

struct Stats1 {
    kinds: Vec<(String, Kind)>,
    fields: Vec<String>,
    group_by: Vec<String>,
    groups: Groups<GroupState>,
}

impl Stage for Stats1 {
    fn name(&self) -> &str {
        "stats1"
    }

    fn process(&mut self, record: Record, _ctx: &Context, _out: &mut Emitter) -> Result<(), RillError> {
        let Some(key) = group_key(&record, &self.group_by) else {
            return Ok(());
        };
        let (group_by, field_count) = (&self.group_by, self.fields.len());
        let state = self.groups.get_or_insert_with(key, || {
            let mut head = Record::with_capacity(group_by.len());
            for field in group_by {
                head.put_copy(field, record.get_or_absent(field));
            }
            GroupState { head, fields: (0..field_count).map(|_| None).collect() }
        });

        for (field, slot) in self.fields.iter().zip(state.fields.iter_mut()) {
            let Some(value) = record.get(field) else {
                continue;
            };
            if value.is_void() {
                continue;
            }
            let accumulators =
                slot.get_or_insert_with(|| self.kinds.iter().map(|(_, kind)| Accumulator::new(*kind)).collect());
            for accumulator in accumulators.iter_mut() {
                accumulator.ingest(value);
            }
        }
        Ok(())
    }

    fn finish(&mut self, ctx: &Context, out: &mut Emitter) -> Result<(), RillError> {
        for (_, state) in self.groups.drain() {
            let mut record = state.head;
            for (field, slot) in self.fields.iter().zip(&state.fields) {
                let Some(accumulators) = slot else {
                    continue;
                };
                for ((name, _), accumulator) in self.kinds.iter().zip(accumulators) {
                    record.put_reference(format!("{field}_{name}"), accumulator.emit());
                }
            }
            if !record.is_empty() {
                out.record(record, ctx.clone());
            }
        }
        Ok(())
    }
}
