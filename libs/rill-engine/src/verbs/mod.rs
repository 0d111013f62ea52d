//! Built-in verbs: the concrete [`Stage`]s a chain is made of.
//!
//! Each verb parses its own argument vector with clap, so `head -n 4 -g a`
//! reads the same way on the command line and in a `[[stages]]` table.

mod cat;
mod count;
mod cut;
mod fill_empty;
mod filter;
mod flatten;
mod head;
mod label;
mod nothing;
mod print;
mod rename;
mod reorder;
mod sort_within_records;
mod stats1;
mod step;
mod tac;
mod tail;
mod unsparsify;

use std::collections::HashMap;

use clap::Parser;

use rill_api::{Record, Stage};

use crate::config::StageConfig;
use crate::error::EngineError;

/// Chain separator on the command line.
pub const THEN: &str = "then";

pub type BuildFn = fn(&[String]) -> Result<Box<dyn Stage>, EngineError>;

pub struct VerbInfo {
    pub name: &'static str,
    pub summary: &'static str,
    pub build: BuildFn,
}

pub static VERBS: &[VerbInfo] = &[
    VerbInfo { name: "cat", summary: "Passes records through, optionally numbering them.", build: cat::build },
    VerbInfo { name: "count", summary: "Counts records, optionally per group.", build: count::build },
    VerbInfo { name: "cut", summary: "Keeps or removes the named fields.", build: cut::build },
    VerbInfo { name: "fill-empty", summary: "Fills empty values with a constant.", build: fill_empty::build },
    VerbInfo { name: "filter", summary: "Keeps records where a field comparison holds.", build: filter::build },
    VerbInfo { name: "flatten", summary: "Flattens nested values into prefixed keys.", build: flatten::build_flatten },
    VerbInfo { name: "head", summary: "Passes the first records, optionally per group.", build: head::build },
    VerbInfo { name: "label", summary: "Renames the leading fields positionally.", build: label::build },
    VerbInfo { name: "nothing", summary: "Drops all records.", build: nothing::build },
    VerbInfo { name: "print", summary: "Prints a line per record from a template.", build: print::build },
    VerbInfo { name: "rename", summary: "Renames fields.", build: rename::build },
    VerbInfo { name: "reorder", summary: "Moves fields to the start or end of the record.", build: reorder::build },
    VerbInfo {
        name: "sort-within-records",
        summary: "Sorts fields lexically by key.",
        build: sort_within_records::build,
    },
    VerbInfo { name: "stats1", summary: "Computes per-field statistics, optionally per group.", build: stats1::build },
    VerbInfo { name: "step", summary: "Computes values relative to the previous record.", build: step::build },
    VerbInfo { name: "tac", summary: "Reverses record order.", build: tac::build },
    VerbInfo { name: "tail", summary: "Passes the last records, optionally per group.", build: tail::build },
    VerbInfo { name: "unflatten", summary: "Rebuilds nested values from prefixed keys.", build: flatten::build_unflatten },
    VerbInfo { name: "unsparsify", summary: "Gives every record the union of all keys.", build: unsparsify::build },
];

pub fn find_verb(name: &str) -> Option<&'static VerbInfo> {
    VERBS.iter().find(|v| v.name == name)
}

pub fn build_stage(verb: &str, args: &[String]) -> Result<Box<dyn Stage>, EngineError> {
    let info = find_verb(verb).ok_or_else(|| EngineError::UnknownVerb(verb.to_string()))?;
    (info.build)(args)
}

/// Build every stage of a chain. An empty chain is a single `cat`.
pub fn build_chain(stages: &[StageConfig]) -> Result<Vec<Box<dyn Stage>>, EngineError> {
    if stages.is_empty() {
        return Ok(vec![build_stage("cat", &[])?]);
    }
    stages
        .iter()
        .enumerate()
        .map(|(i, s)| build_stage(&s.verb, &s.args).map_err(|e| e.with_context(format!("stage {}", i + 1))))
        .collect()
}

/// Split `VERB ARGS then VERB ARGS ...` into stage configs.
pub fn parse_chain(words: &[String]) -> Result<Vec<StageConfig>, EngineError> {
    if words.is_empty() {
        return Ok(Vec::new());
    }
    words
        .split(|w| w == THEN)
        .map(|segment| match segment.split_first() {
            Some((verb, args)) => Ok(StageConfig { verb: verb.clone(), args: args.to_vec() }),
            None => Err(EngineError::Config(format!("empty verb around \"{THEN}\""))),
        })
        .collect()
}

// ═══════════════════════════════════════════════════════════════
//  Shared helpers
// ═══════════════════════════════════════════════════════════════

/// Parse a verb's arguments with its clap definition.
pub(crate) fn parse_args<T: Parser>(verb: &str, args: &[String]) -> Result<T, EngineError> {
    T::try_parse_from(std::iter::once(verb).chain(args.iter().map(String::as_str))).map_err(|e| {
        EngineError::Usage { verb: verb.to_string(), message: e.to_string().trim_end().to_string() }
    })
}

/// Grouping key for `fields`; None when the record lacks one of them.
pub(crate) fn group_key(record: &Record, fields: &[String]) -> Option<String> {
    record.selected_values_joined(fields)
}

/// Per-group state kept in first-seen group order.
#[derive(Debug)]
pub(crate) struct Groups<V> {
    index: HashMap<String, usize>,
    entries: Vec<(String, V)>,
}

impl<V> Groups<V> {
    pub fn new() -> Self {
        Self { index: HashMap::new(), entries: Vec::new() }
    }

    pub fn get_or_insert_with(&mut self, key: String, make: impl FnOnce() -> V) -> &mut V {
        let slot = match self.index.get(&key) {
            Some(&slot) => slot,
            None => {
                let slot = self.entries.len();
                self.index.insert(key.clone(), slot);
                self.entries.push((key, make()));
                slot
            }
        };
        &mut self.entries[slot].1
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn drain(&mut self) -> impl Iterator<Item = (String, V)> + '_ {
        self.index.clear();
        self.entries.drain(..)
    }
}

impl<V> Default for Groups<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use rill_api::stage::dispatch;
    use rill_api::{Context, Emitter, Item, Value};

    use super::*;

    /// Parse `a=1,b=2` style text into a record, with inference.
    pub fn rec(text: &str) -> Record {
        let mut record = Record::new();
        if text.is_empty() {
            return record;
        }
        for pair in text.split(',') {
            let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
            record.put_reference(k, Value::infer(v));
        }
        record
    }

    /// Render a record back to `a=1,b=2`.
    pub fn show(record: &Record) -> String {
        record.iter().map(|(k, v)| format!("{k}={}", v.render())).collect::<Vec<_>>().join(",")
    }

    /// Run records through a verb built from `args`; returns rendered output
    /// lines (records as `a=1,b=2`, text lines prefixed with `> `).
    pub fn run_verb(verb: &str, args: &[&str], inputs: &[&str]) -> Vec<String> {
        let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        let mut stage = build_stage(verb, &args).expect("build");
        let mut ctx = Context::new();
        ctx.start_source("test");
        let mut out = Emitter::new();
        for text in inputs {
            ctx.advance_record();
            dispatch(stage.as_mut(), Item::Record(rec(text), ctx.clone()), &mut out).expect("process");
        }
        assert!(dispatch(stage.as_mut(), Item::EndOfStream(ctx), &mut out).expect("finish"));

        let items = out.into_items();
        let ends = items.iter().filter(|i| matches!(i, Item::EndOfStream(_))).count();
        assert_eq!(ends, 1, "exactly one end of stream");
        items
            .into_iter()
            .filter_map(|item| match item {
                Item::Record(record, _) => Some(show(&record)),
                Item::Text(line) => Some(format!("> {line}")),
                Item::EndOfStream(_) => None,
            })
            .collect()
    }
}
