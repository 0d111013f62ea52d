use std::sync::Arc;

/// Name given to standard input in the context.
pub const STDIN_NAME: &str = "(stdin)";

/// Per-stream and per-record position, copied alongside every record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Context {
    /// Current input source.
    pub filename: Arc<str>,
    /// 1-up index of the current source; 0 before the first one starts.
    pub filenum: u64,
    /// Records seen across all sources.
    pub nr: u64,
    /// Records seen within the current source.
    pub fnr: u64,
}

impl Context {
    pub fn new() -> Self {
        Self { filename: Arc::from(""), filenum: 0, nr: 0, fnr: 0 }
    }

    pub fn start_source(&mut self, name: &str) {
        self.filename = Arc::from(name);
        self.filenum += 1;
        self.fnr = 0;
    }

    pub fn advance_record(&mut self) {
        self.nr += 1;
        self.fnr += 1;
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_across_sources() {
        let mut ctx = Context::new();
        ctx.start_source("a.csv");
        ctx.advance_record();
        ctx.advance_record();
        assert_eq!((ctx.filenum, ctx.nr, ctx.fnr), (1, 2, 2));

        let snapshot = ctx.clone();
        ctx.start_source(STDIN_NAME);
        ctx.advance_record();
        assert_eq!(&*ctx.filename, "(stdin)");
        assert_eq!((ctx.filenum, ctx.nr, ctx.fnr), (2, 3, 1));
        assert_eq!(&*snapshot.filename, "a.csv");
        assert_eq!(snapshot.fnr, 2);
    }
}
