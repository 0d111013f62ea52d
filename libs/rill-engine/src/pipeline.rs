//! Reader → stage 1 → … → stage N → writer, one bounded channel per edge.
//!
//! Channel messages are batches of [`Item`]s. The reader and writer run on
//! blocking threads (file I/O); stages run as async tasks. The first fatal
//! error is kept and cancels the remaining tasks.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use rill_api::context::STDIN_NAME;
use rill_api::stage::dispatch;
use rill_api::{Context, Emitter, Item, Record, Stage};

use crate::config::{Format, RillConfig};
use crate::error::EngineError;
use crate::io::{self, FLATTEN_SEPARATOR, ReaderOptions, RecordReader, RecordWriter, WriterOptions};
use crate::verbs;

type Batch = Vec<Item>;

// ═══════════════════════════════════════════════════════════════
//  Inputs and options
// ═══════════════════════════════════════════════════════════════

/// One input source, opened when the reader reaches it.
pub enum Input {
    Stdin,
    Path(PathBuf),
    /// Already-open stream, e.g. in-memory data.
    Reader { name: String, reader: Box<dyn BufRead + Send> },
}

impl Input {
    fn open(self) -> Result<(String, Box<dyn BufRead + Send>), EngineError> {
        match self {
            Input::Stdin => Ok((STDIN_NAME.to_string(), Box::new(BufReader::new(std::io::stdin())))),
            Input::Path(path) => {
                let name = path.display().to_string();
                let file = File::open(&path).map_err(|e| EngineError::from(e).with_context(&name))?;
                Ok((name, Box::new(BufReader::new(file))))
            }
            Input::Reader { name, reader } => Ok((name, reader)),
        }
    }
}

impl std::fmt::Debug for Input {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Input::Stdin => f.write_str(STDIN_NAME),
            Input::Path(path) => write!(f, "{}", path.display()),
            Input::Reader { name, .. } => write!(f, "{name}"),
        }
    }
}

/// Record reshaping applied just before writing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Reshape {
    #[default]
    None,
    Flatten(String),
    Unflatten(String),
}

impl Reshape {
    /// Non-JSON output cannot hold nested values, so they are flattened.
    /// JSON output from non-JSON input regains its nesting.
    pub fn for_formats(input: Format, output: Format) -> Self {
        if !output.is_json() {
            Reshape::Flatten(FLATTEN_SEPARATOR.to_string())
        } else if !input.is_json() {
            Reshape::Unflatten(FLATTEN_SEPARATOR.to_string())
        } else {
            Reshape::None
        }
    }

    fn apply(&self, record: &mut Record) {
        match self {
            Reshape::None => {}
            Reshape::Flatten(separator) => record.flatten(separator),
            Reshape::Unflatten(separator) => record.unflatten(separator),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOptions {
    pub records_per_batch: usize,
    pub channel_capacity: usize,
    pub reshape: Reshape,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self { records_per_batch: 500, channel_capacity: 16, reshape: Reshape::None }
    }
}

/// Counters reported when the pipeline completes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub records_read: u64,
    pub records_written: u64,
    pub lines_written: u64,
}

// ═══════════════════════════════════════════════════════════════
//  First-error slot
// ═══════════════════════════════════════════════════════════════

/// Keeps the first fatal error and cancels everything else.
#[derive(Clone)]
struct Failure {
    first: Arc<Mutex<Option<EngineError>>>,
    token: CancellationToken,
}

impl Failure {
    fn new(token: CancellationToken) -> Self {
        Self { first: Arc::new(Mutex::new(None)), token }
    }

    /// Unwrap a task result, recording the error if there is one.
    fn guard<T>(&self, task: &str, result: Result<T, EngineError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(EngineError::Cancelled) => {
                tracing::debug!(task, "task cancelled");
                None
            }
            Err(e) => {
                tracing::error!(task, error = %e, "pipeline task failed");
                if let Ok(mut slot) = self.first.lock() {
                    slot.get_or_insert(e);
                }
                self.token.cancel();
                None
            }
        }
    }

    fn take(&self) -> Option<EngineError> {
        self.first.lock().ok().and_then(|mut slot| slot.take())
    }
}

// ═══════════════════════════════════════════════════════════════
//  Pipeline
// ═══════════════════════════════════════════════════════════════

pub struct Pipeline {
    inputs: Vec<Input>,
    reader: Box<dyn RecordReader>,
    stages: Vec<Box<dyn Stage>>,
    writer: Box<dyn RecordWriter>,
    output: Box<dyn Write + Send>,
    options: PipelineOptions,
}

impl Pipeline {
    pub fn new(reader: Box<dyn RecordReader>, writer: Box<dyn RecordWriter>, output: Box<dyn Write + Send>) -> Self {
        Self {
            inputs: Vec::new(),
            reader,
            stages: Vec::new(),
            writer,
            output,
            options: PipelineOptions::default(),
        }
    }

    /// Build everything a configuration names, writing to `output`.
    /// Verb usage errors surface here, before any input is read.
    pub fn from_config(config: &RillConfig, output: Box<dyn Write + Send>) -> Result<Self, EngineError> {
        config.validate()?;
        let reader = io::reader_for(&ReaderOptions::from_config(&config.input)?);
        let writer = io::writer_for(&WriterOptions::from_config(&config.output)?);
        let stages = verbs::build_chain(&config.stages)?;

        let mut pipeline = Pipeline::new(reader, writer, output).options(PipelineOptions {
            records_per_batch: config.pipeline.records_per_batch,
            channel_capacity: config.pipeline.channel_capacity,
            reshape: Reshape::for_formats(config.input.format, config.output.format),
        });
        for stage in stages {
            pipeline = pipeline.stage(stage);
        }
        for file in &config.files {
            pipeline = pipeline.input(Input::Path(PathBuf::from(file)));
        }
        Ok(pipeline)
    }

    pub fn input(mut self, input: Input) -> Self {
        self.inputs.push(input);
        self
    }

    pub fn stage(mut self, stage: Box<dyn Stage>) -> Self {
        self.stages.push(stage);
        self
    }

    pub fn options(mut self, options: PipelineOptions) -> Self {
        self.options = options;
        self
    }

    /// Run to completion. Returns the first fatal error of any task.
    pub async fn run(self) -> Result<RunSummary, EngineError> {
        let Pipeline { mut inputs, reader, stages, writer, output, options } = self;
        if inputs.is_empty() {
            inputs.push(Input::Stdin);
        }
        let batch_size = options.records_per_batch.max(1);
        let capacity = options.channel_capacity.max(1);

        let token = CancellationToken::new();
        let failure = Failure::new(token.clone());

        tracing::info!(inputs = inputs.len(), stages = stages.len(), batch_size, "pipeline started");

        let (tx, mut rx) = mpsc::channel::<Batch>(capacity);
        let reader_handle: JoinHandle<Option<u64>> = {
            let failure = failure.clone();
            let token = token.clone();
            tokio::task::spawn_blocking(move || {
                failure.guard("reader", read_inputs(inputs, reader, &tx, batch_size, &token))
            })
        };

        let mut stage_handles: Vec<JoinHandle<Option<()>>> = Vec::with_capacity(stages.len());
        for (i, stage) in stages.into_iter().enumerate() {
            let (next_tx, next_rx) = mpsc::channel::<Batch>(capacity);
            let failure = failure.clone();
            let token = token.clone();
            let upstream = std::mem::replace(&mut rx, next_rx);
            stage_handles.push(tokio::spawn(async move {
                let label = format!("stage {} ({})", i + 1, stage.name());
                let result = run_stage(stage, upstream, next_tx, batch_size, &token).await;
                failure.guard(&label, result)
            }));
        }

        let writer_handle: JoinHandle<Option<(u64, u64)>> = {
            let failure = failure.clone();
            let token = token.clone();
            let reshape = options.reshape.clone();
            tokio::task::spawn_blocking(move || {
                failure.guard("writer", write_outputs(writer, output, rx, &reshape, &token))
            })
        };

        let records_read = reader_handle.await?;
        for handle in stage_handles {
            handle.await?;
        }
        let written = writer_handle.await?;

        if let Some(e) = failure.take() {
            return Err(e);
        }
        match (records_read, written) {
            (Some(records_read), Some((records_written, lines_written))) => {
                let summary = RunSummary { records_read, records_written, lines_written };
                tracing::info!(
                    records_read,
                    records_written,
                    lines_written,
                    "pipeline finished"
                );
                Ok(summary)
            }
            _ => Err(EngineError::Cancelled),
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tasks
// ═══════════════════════════════════════════════════════════════

/// Reader: every input in turn, then exactly one end-of-stream marker.
fn read_inputs(
    inputs: Vec<Input>,
    mut reader: Box<dyn RecordReader>,
    tx: &mpsc::Sender<Batch>,
    batch_size: usize,
    token: &CancellationToken,
) -> Result<u64, EngineError> {
    let mut ctx = Context::new();
    let mut batch: Batch = Vec::with_capacity(batch_size);

    for input in inputs {
        if token.is_cancelled() {
            return Err(EngineError::Cancelled);
        }
        let (name, mut source) = input.open()?;
        ctx.start_source(&name);
        reader.begin_source(&name);
        tracing::debug!(source = %name, filenum = ctx.filenum, "reading source");

        while let Some(record) = reader.read_record(&mut *source).map_err(|e| EngineError::from(e).with_context(&name))? {
            ctx.advance_record();
            batch.push(Item::Record(record, ctx.clone()));
            if batch.len() >= batch_size {
                let full = std::mem::replace(&mut batch, Vec::with_capacity(batch_size));
                send_blocking(tx, full, token)?;
            }
        }
    }

    batch.push(Item::EndOfStream(ctx.clone()));
    send_blocking(tx, batch, token)?;
    tracing::debug!(records = ctx.nr, sources = ctx.filenum, "reader finished");
    Ok(ctx.nr)
}

fn send_blocking(tx: &mpsc::Sender<Batch>, batch: Batch, token: &CancellationToken) -> Result<(), EngineError> {
    tx.blocking_send(batch).map_err(|_| closed("first stage", token))
}

/// Downstream hung up: a cancellation if someone failed, else a broken pipeline.
fn closed(peer: &str, token: &CancellationToken) -> EngineError {
    if token.is_cancelled() {
        EngineError::Cancelled
    } else {
        EngineError::ChannelClosed(peer.to_string())
    }
}

async fn run_stage(
    mut stage: Box<dyn Stage>,
    mut rx: mpsc::Receiver<Batch>,
    tx: mpsc::Sender<Batch>,
    batch_size: usize,
    token: &CancellationToken,
) -> Result<(), EngineError> {
    let name = stage.name().to_string();
    let mut out = Emitter::with_capacity(batch_size);
    let mut processed: u64 = 0;

    loop {
        let batch = tokio::select! {
            batch = rx.recv() => batch,
            _ = token.cancelled() => return Err(EngineError::Cancelled),
        };
        let Some(batch) = batch else {
            return Err(closed(&format!("{name} input"), token));
        };

        let mut finished = false;
        for item in batch {
            if matches!(item, Item::Record(..)) {
                processed += 1;
            }
            finished = dispatch(stage.as_mut(), item, &mut out).map_err(|e| EngineError::from(e).with_context(&name))?;
            if out.len() >= batch_size {
                forward(&tx, &mut out, batch_size, &name, token).await?;
            }
        }
        if !out.is_empty() {
            forward(&tx, &mut out, batch_size, &name, token).await?;
        }
        if finished {
            tracing::debug!(stage = %name, records = processed, "stage finished");
            return Ok(());
        }
    }
}

async fn forward(
    tx: &mpsc::Sender<Batch>,
    out: &mut Emitter,
    batch_size: usize,
    name: &str,
    token: &CancellationToken,
) -> Result<(), EngineError> {
    let items = std::mem::replace(out, Emitter::with_capacity(batch_size)).into_items();
    tx.send(items).await.map_err(|_| closed(&format!("{name} output"), token))
}

/// Writer: the single owner of the output stream. Flushes once per batch.
fn write_outputs(
    mut writer: Box<dyn RecordWriter>,
    output: Box<dyn Write + Send>,
    mut rx: mpsc::Receiver<Batch>,
    reshape: &Reshape,
    token: &CancellationToken,
) -> Result<(u64, u64), EngineError> {
    let mut out = BufWriter::new(output);
    let mut records: u64 = 0;
    let mut lines: u64 = 0;

    while let Some(batch) = rx.blocking_recv() {
        for item in batch {
            match item {
                Item::Record(mut record, _) => {
                    reshape.apply(&mut record);
                    writer.write_record(&record, &mut out)?;
                    records += 1;
                }
                Item::Text(line) => {
                    writer.write_text(&line, &mut out)?;
                    lines += 1;
                }
                Item::EndOfStream(ctx) => {
                    writer.finish(&mut out)?;
                    out.flush()?;
                    tracing::debug!(records, lines, nr = ctx.nr, "writer finished");
                    return Ok((records, lines));
                }
            }
        }
        out.flush()?;
    }
    Err(closed("writer input", token))
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::io::{DkvpReader, DkvpWriter, JsonReader, SharedBuffer};
    use rill_api::{InferMode, RillError, Value};

    struct Identity;

    impl Stage for Identity {
        fn name(&self) -> &str {
            "identity"
        }

        fn process(&mut self, record: Record, ctx: &Context, out: &mut Emitter) -> Result<(), RillError> {
            out.record(record, ctx.clone());
            Ok(())
        }
    }

    /// Appends the context counters to each record.
    struct Stamp;

    impl Stage for Stamp {
        fn name(&self) -> &str {
            "stamp"
        }

        fn process(&mut self, mut record: Record, ctx: &Context, out: &mut Emitter) -> Result<(), RillError> {
            record.put_reference("file", Value::from_string(&*ctx.filename));
            record.put_reference("nr", Value::from_int(ctx.nr as i64));
            record.put_reference("fnr", Value::from_int(ctx.fnr as i64));
            out.record(record, ctx.clone());
            Ok(())
        }
    }

    /// Announces every record on the side channel before passing it on.
    struct Announce;

    impl Stage for Announce {
        fn name(&self) -> &str {
            "announce"
        }

        fn process(&mut self, record: Record, ctx: &Context, out: &mut Emitter) -> Result<(), RillError> {
            out.text(format!("about to emit {}", record.get_or_absent("n")));
            out.record(record, ctx.clone());
            Ok(())
        }
    }

    struct FailAt(u64);

    impl Stage for FailAt {
        fn name(&self) -> &str {
            "fail"
        }

        fn process(&mut self, record: Record, ctx: &Context, out: &mut Emitter) -> Result<(), RillError> {
            if ctx.nr == self.0 {
                return Err(RillError::logic(format!("record {} rejected", ctx.nr)));
            }
            out.record(record, ctx.clone());
            Ok(())
        }
    }

    /// Writer double recording what it was handed.
    struct Capture {
        log: Arc<Mutex<Vec<String>>>,
    }

    impl RecordWriter for Capture {
        fn write_record(&mut self, record: &Record, _out: &mut dyn Write) -> Result<(), RillError> {
            if let Ok(mut log) = self.log.lock() {
                log.push(format!("n={}", record.get_or_absent("n")));
            }
            Ok(())
        }

        fn finish(&mut self, _out: &mut dyn Write) -> Result<(), RillError> {
            if let Ok(mut log) = self.log.lock() {
                log.push("end".to_string());
            }
            Ok(())
        }
    }

    fn text_input(name: &str, text: &str) -> Input {
        Input::Reader { name: name.to_string(), reader: Box::new(Cursor::new(text.as_bytes().to_vec())) }
    }

    fn dkvp_pipeline(output: &SharedBuffer) -> Pipeline {
        Pipeline::new(
            Box::new(DkvpReader::new(",", "=", InferMode::Full)),
            Box::new(DkvpWriter::new(",", "=")),
            Box::new(output.clone()),
        )
    }

    #[tokio::test]
    async fn identity_stage_preserves_order_and_ends_once() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let summary = Pipeline::new(
            Box::new(DkvpReader::new(",", "=", InferMode::Full)),
            Box::new(Capture { log: log.clone() }),
            Box::new(std::io::sink()),
        )
        .input(text_input("mem", "n=1\nn=2\nn=3\n"))
        .stage(Box::new(Identity))
        .run()
        .await
        .expect("run");

        assert_eq!(summary, RunSummary { records_read: 3, records_written: 3, lines_written: 0 });
        let log = log.lock().expect("log").clone();
        assert_eq!(log, ["n=1", "n=2", "n=3", "end"]);
    }

    #[tokio::test]
    async fn small_batches_across_several_stages_keep_order() {
        let input: String = (1..=50).map(|n| format!("n={n}\n")).collect();
        let output = SharedBuffer::new();
        let summary = dkvp_pipeline(&output)
            .input(text_input("mem", &input))
            .stage(Box::new(Identity))
            .stage(Box::new(Identity))
            .stage(Box::new(Identity))
            .options(PipelineOptions { records_per_batch: 3, channel_capacity: 1, reshape: Reshape::None })
            .run()
            .await
            .expect("run");

        assert_eq!(summary.records_written, 50);
        assert_eq!(output.contents(), input);
    }

    #[tokio::test]
    async fn context_follows_sources() {
        let output = SharedBuffer::new();
        dkvp_pipeline(&output)
            .input(text_input("a", "x=1\nx=2\n"))
            .input(text_input("b", "x=3\n"))
            .stage(Box::new(Stamp))
            .options(PipelineOptions { records_per_batch: 1, ..Default::default() })
            .run()
            .await
            .expect("run");

        assert_eq!(
            output.contents(),
            "x=1,file=a,nr=1,fnr=1\nx=2,file=a,nr=2,fnr=2\nx=3,file=b,nr=3,fnr=1\n"
        );
    }

    #[tokio::test]
    async fn side_channel_text_is_interleaved_in_order() {
        let output = SharedBuffer::new();
        let summary = dkvp_pipeline(&output)
            .input(text_input("mem", "n=1\nn=2\n"))
            .stage(Box::new(Announce))
            .stage(Box::new(Identity))
            .run()
            .await
            .expect("run");

        assert_eq!(summary.lines_written, 2);
        assert_eq!(output.contents(), "about to emit 1\nn=1\nabout to emit 2\nn=2\n");
    }

    #[tokio::test]
    async fn first_stage_error_stops_the_pipeline() {
        let input: String = (1..=10_000).map(|n| format!("n={n}\n")).collect();
        let output = SharedBuffer::new();
        let err = dkvp_pipeline(&output)
            .input(text_input("mem", &input))
            .stage(Box::new(FailAt(2)))
            .stage(Box::new(Identity))
            .options(PipelineOptions { records_per_batch: 1, channel_capacity: 1, reshape: Reshape::None })
            .run()
            .await
            .expect_err("stage failure");

        match err {
            EngineError::Stage(e) => assert_eq!(e.message, "fail: record 2 rejected"),
            other => panic!("unexpected {other:?}"),
        }
        assert!(!output.contents().contains("n=10000"));
    }

    #[tokio::test]
    async fn reader_errors_name_the_source() {
        let output = SharedBuffer::new();
        let err = Pipeline::new(Box::new(JsonReader::new()), Box::new(DkvpWriter::new(",", "=")), Box::new(output.clone()))
            .input(text_input("broken.json", "{\"a\": 1} 7"))
            .run()
            .await
            .expect_err("format error");
        assert!(err.to_string().contains("broken.json: top-level JSON values must be objects"), "{err}");
    }

    #[tokio::test]
    async fn missing_file_is_an_io_error() {
        let output = SharedBuffer::new();
        let err = dkvp_pipeline(&output)
            .input(Input::Path(PathBuf::from("/nonexistent/rill-input.dkvp")))
            .run()
            .await
            .expect_err("missing file");
        assert!(matches!(err, EngineError::Io(_)), "{err:?}");
    }

    #[tokio::test]
    async fn nested_values_are_flattened_for_text_output() {
        let output = SharedBuffer::new();
        Pipeline::new(Box::new(JsonReader::new()), Box::new(DkvpWriter::new(",", "=")), Box::new(output.clone()))
            .input(text_input("mem", r#"{"a": {"b": 1, "c": [true, {}]}}"#))
            .options(PipelineOptions { reshape: Reshape::for_formats(Format::Json, Format::Dkvp), ..Default::default() })
            .run()
            .await
            .expect("run");
        assert_eq!(output.contents(), "a.b=1,a.c.1=true,a.c.2={}\n");
    }

    #[test]
    fn reshape_rules() {
        assert_eq!(Reshape::for_formats(Format::Json, Format::Json), Reshape::None);
        assert_eq!(Reshape::for_formats(Format::Csv, Format::Jsonl), Reshape::Unflatten(".".into()));
        assert_eq!(Reshape::for_formats(Format::Json, Format::Csv), Reshape::Flatten(".".into()));
    }

    #[tokio::test]
    async fn from_config_builds_the_chain() {
        let config = RillConfig::parse(
            r#"
            [[stages]]
            verb = "head"
            args = ["-n", "2"]
            "#,
        )
        .expect("config");
        let output = SharedBuffer::new();
        let summary = Pipeline::from_config(&config, Box::new(output.clone()))
            .expect("pipeline")
            .input(text_input("mem", "a=1\na=2\na=3\n"))
            .run()
            .await
            .expect("run");
        assert_eq!(summary.records_written, 2);
        assert_eq!(output.contents(), "a=1\na=2\n");
    }

    #[test]
    fn unknown_verbs_fail_before_running() {
        let config = RillConfig::parse("[[stages]]\nverb = \"frobnicate\"").expect("config");
        let result = Pipeline::from_config(&config, Box::new(std::io::sink()));
        assert!(matches!(result, Err(EngineError::UnknownVerb(_))));
    }
}
