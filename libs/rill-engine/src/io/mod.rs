//! Reader/writer boundary: text lines in, records out, and back.
//!
//! Readers build each record with `put_reference` and infer field types
//! according to [`InferMode`]. Writers own the output format only; the
//! pipeline owns the destination and its buffering.

mod csv;
mod dkvp;
mod json;
mod nidx;

use std::io::{BufRead, Write};
use std::sync::{Arc, Mutex};

use rill_api::{InferMode, Record, RillError};

use crate::config::{Format, InputConfig, OutputConfig};
use crate::error::EngineError;

pub use self::csv::{CsvReader, CsvWriter};
pub use self::dkvp::{DkvpReader, DkvpWriter};
pub use self::json::{JsonReader, JsonWriter};
pub use self::nidx::{NidxReader, NidxWriter};

/// Separator used to flatten nested values for non-JSON output.
pub const FLATTEN_SEPARATOR: &str = ".";

/// Turns the bytes of one input source into records.
pub trait RecordReader: Send {
    /// A new input source begins; per-source state (headers) resets.
    fn begin_source(&mut self, _name: &str) {}

    /// Next record, or None at end of source.
    fn read_record(&mut self, input: &mut dyn BufRead) -> Result<Option<Record>, RillError>;
}

/// Renders records (and side-channel lines) into an output stream.
pub trait RecordWriter: Send {
    fn write_record(&mut self, record: &Record, out: &mut dyn Write) -> Result<(), RillError>;

    fn write_text(&mut self, line: &str, out: &mut dyn Write) -> Result<(), RillError> {
        writeln!(out, "{line}")?;
        Ok(())
    }

    /// End of stream: close any open framing.
    fn finish(&mut self, _out: &mut dyn Write) -> Result<(), RillError> {
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════
//  Options
// ═══════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub struct ReaderOptions {
    pub format: Format,
    pub fs: String,
    pub ps: String,
    pub infer: InferMode,
}

impl ReaderOptions {
    pub fn from_config(config: &InputConfig) -> Result<Self, EngineError> {
        Ok(Self {
            format: config.format,
            fs: separator_or_default(config.fs.as_deref(), config.format.default_fs())?,
            ps: separator_or_default(config.ps.as_deref(), config.format.default_ps())?,
            infer: config.infer,
        })
    }
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self { format: Format::Dkvp, fs: ",".into(), ps: "=".into(), infer: InferMode::Full }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WriterOptions {
    pub format: Format,
    pub fs: String,
    pub ps: String,
}

impl WriterOptions {
    pub fn from_config(config: &OutputConfig) -> Result<Self, EngineError> {
        Ok(Self {
            format: config.format,
            fs: separator_or_default(config.fs.as_deref(), config.format.default_fs())?,
            ps: separator_or_default(config.ps.as_deref(), config.format.default_ps())?,
        })
    }
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self { format: Format::Dkvp, fs: ",".into(), ps: "=".into() }
    }
}

fn separator_or_default(given: Option<&str>, default: &str) -> Result<String, EngineError> {
    match given {
        Some(s) => parse_separator(s),
        None => Ok(default.to_string()),
    }
}

/// Resolve a separator given on the command line or in config.
/// Accepts names for characters that are awkward to quote.
pub fn parse_separator(s: &str) -> Result<String, EngineError> {
    let resolved = match s {
        "tab" | "\\t" => "\t",
        "space" => " ",
        "comma" => ",",
        "semicolon" => ";",
        "pipe" => "|",
        "colon" => ":",
        "equals" => "=",
        "" => return Err(EngineError::Config("separator must not be empty".into())),
        other => other,
    };
    Ok(resolved.to_string())
}

pub fn reader_for(options: &ReaderOptions) -> Box<dyn RecordReader> {
    match options.format {
        Format::Dkvp => Box::new(DkvpReader::new(&options.fs, &options.ps, options.infer)),
        Format::Nidx => Box::new(NidxReader::new(&options.fs, options.infer)),
        Format::Csv => Box::new(CsvReader::new(&options.fs, options.infer)),
        Format::Json | Format::Jsonl => Box::new(JsonReader::new()),
    }
}

pub fn writer_for(options: &WriterOptions) -> Box<dyn RecordWriter> {
    match options.format {
        Format::Dkvp => Box::new(DkvpWriter::new(&options.fs, &options.ps)),
        Format::Nidx => Box::new(NidxWriter::new(&options.fs)),
        Format::Csv => Box::new(CsvWriter::new(&options.fs)),
        Format::Json => Box::new(JsonWriter::new(true)),
        Format::Jsonl => Box::new(JsonWriter::new(false)),
    }
}

// ═══════════════════════════════════════════════════════════════
//  Shared helpers
// ═══════════════════════════════════════════════════════════════

/// Read one line into `buf` without its terminator. False at end of input.
pub(crate) fn read_line(input: &mut dyn BufRead, buf: &mut String) -> Result<bool, RillError> {
    buf.clear();
    if input.read_line(buf)? == 0 {
        return Ok(false);
    }
    if buf.ends_with('\n') {
        buf.pop();
        if buf.ends_with('\r') {
            buf.pop();
        }
    }
    Ok(true)
}

/// In-memory output shared between a pipeline and a test.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        let bytes = self.0.lock().map(|b| b.clone()).unwrap_or_default();
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let mut inner = self.0.lock().map_err(|_| std::io::Error::other("output buffer poisoned"))?;
        inner.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn separator_aliases() {
        assert_eq!(parse_separator("tab").expect("tab"), "\t");
        assert_eq!(parse_separator("semicolon").expect("semicolon"), ";");
        assert_eq!(parse_separator("::").expect("literal"), "::");
        assert!(parse_separator("").is_err());
    }

    #[test]
    fn options_take_format_defaults() {
        let input = InputConfig { format: Format::Nidx, ..Default::default() };
        let options = ReaderOptions::from_config(&input).expect("options");
        assert_eq!(options.fs, " ");

        let output = OutputConfig { format: Format::Csv, fs: Some("tab".into()), ..Default::default() };
        let options = WriterOptions::from_config(&output).expect("options");
        assert_eq!(options.fs, "\t");
    }

    #[test]
    fn lines_lose_their_terminators() {
        let mut input = std::io::Cursor::new(b"a\r\nb\nc".to_vec());
        let mut buf = String::new();
        let mut lines = Vec::new();
        while read_line(&mut input, &mut buf).expect("read") {
            lines.push(buf.clone());
        }
        assert_eq!(lines, ["a", "b", "c"]);
    }

    #[test]
    fn shared_buffer_sees_writes_from_clones() {
        let buffer = SharedBuffer::new();
        let mut writer = buffer.clone();
        writer.write_all(b"hello\n").expect("write");
        assert_eq!(buffer.contents(), "hello\n");
    }
}
