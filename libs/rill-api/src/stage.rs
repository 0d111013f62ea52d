use crate::context::Context;
use crate::error::RillError;
use crate::record::Record;

/// One unit on a pipeline channel.
///
/// Records and side-channel text share the channel so the writer sees
/// them in the order they were produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Record(Record, Context),
    /// Side-channel output line (print-style statements).
    Text(String),
    /// No further items follow. Carries the final context.
    EndOfStream(Context),
}

/// Output buffer handed to a stage for one input item.
#[derive(Debug, Default)]
pub struct Emitter {
    items: Vec<Item>,
}

impl Emitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { items: Vec::with_capacity(capacity) }
    }

    pub fn record(&mut self, record: Record, ctx: Context) {
        self.items.push(Item::Record(record, ctx));
    }

    pub fn text(&mut self, line: impl Into<String>) {
        self.items.push(Item::Text(line.into()));
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_items(self) -> Vec<Item> {
        self.items
    }

    fn end_of_stream(&mut self, ctx: Context) {
        self.items.push(Item::EndOfStream(ctx));
    }
}

/// Transformation stage: one record in, zero or more records (and/or
/// text lines) out.
///
/// Stages never emit the end-of-stream marker themselves; [`dispatch`]
/// forwards it after `finish`, so it goes downstream exactly once.
/// A stage that keeps records across calls owns them (they are moved in),
/// so nothing it buffers can alias a record still travelling downstream.
pub trait Stage: Send {
    /// Verb name, for logs and error context.
    fn name(&self) -> &str;

    fn process(&mut self, record: Record, ctx: &Context, out: &mut Emitter) -> Result<(), RillError>;

    /// Flush buffered output at end of stream.
    fn finish(&mut self, _ctx: &Context, _out: &mut Emitter) -> Result<(), RillError> {
        Ok(())
    }
}

/// Feed one item to a stage. Text passes through untouched. Returns true
/// once end of stream has been handled.
pub fn dispatch(stage: &mut dyn Stage, item: Item, out: &mut Emitter) -> Result<bool, RillError> {
    match item {
        Item::Record(record, ctx) => {
            stage.process(record, &ctx, out)?;
            Ok(false)
        }
        Item::Text(line) => {
            out.text(line);
            Ok(false)
        }
        Item::EndOfStream(ctx) => {
            stage.finish(&ctx, out)?;
            out.end_of_stream(ctx);
            Ok(true)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    /// Buffers everything and replays it in reverse at end of stream.
    struct Reverse {
        held: Vec<(Record, Context)>,
    }

    impl Stage for Reverse {
        fn name(&self) -> &str {
            "reverse"
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

    fn numbered(n: i64) -> Item {
        let mut record = Record::new();
        record.put_reference("n", Value::from_int(n));
        let mut ctx = Context::new();
        ctx.nr = n as u64;
        Item::Record(record, ctx)
    }

    #[test]
    fn buffered_output_precedes_the_single_end_marker() {
        let mut stage = Reverse { held: Vec::new() };
        let mut out = Emitter::new();
        for item in [numbered(1), Item::Text("hello".into()), numbered(2)] {
            assert!(!dispatch(&mut stage, item, &mut out).expect("process"));
        }
        assert!(dispatch(&mut stage, Item::EndOfStream(Context::new()), &mut out).expect("finish"));

        let items = out.into_items();
        assert_eq!(items.len(), 4);
        assert!(matches!(items[0], Item::Text(ref t) if t == "hello"));
        assert!(matches!(items[1], Item::Record(_, ref c) if c.nr == 2));
        assert!(matches!(items[2], Item::Record(_, ref c) if c.nr == 1));
        assert!(matches!(items[3], Item::EndOfStream(_)));
        assert_eq!(items.iter().filter(|i| matches!(i, Item::EndOfStream(_))).count(), 1);
    }
}
