use std::collections::VecDeque;
use std::io::{BufRead, Write};

use rill_api::{Record, RillError};

use super::{RecordReader, RecordWriter};

/// Concatenated top-level JSON objects, or arrays of objects.
///
/// The whole source is parsed on the first read; records are then handed
/// out one at a time.
pub struct JsonReader {
    pending: VecDeque<Record>,
    loaded: bool,
}

impl JsonReader {
    pub fn new() -> Self {
        Self { pending: VecDeque::new(), loaded: false }
    }

    fn load(&mut self, input: &mut dyn BufRead) -> Result<(), RillError> {
        let mut text = String::new();
        input.read_to_string(&mut text)?;
        let stream = serde_json::Deserializer::from_str(&text).into_iter::<serde_json::Value>();
        for item in stream {
            let item = item?;
            match item {
                serde_json::Value::Object(map) => self.pending.push_back(Record::from(map)),
                serde_json::Value::Array(items) => {
                    for element in items {
                        match element {
                            serde_json::Value::Object(map) => self.pending.push_back(Record::from(map)),
                            other => return Err(self.not_an_object(&other)),
                        }
                    }
                }
                other => return Err(self.not_an_object(&other)),
            }
        }
        Ok(())
    }

    fn not_an_object(&self, value: &serde_json::Value) -> RillError {
        RillError::format(format!("top-level JSON values must be objects, got {value}"))
    }
}

impl Default for JsonReader {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordReader for JsonReader {
    fn begin_source(&mut self, _name: &str) {
        self.pending.clear();
        self.loaded = false;
    }

    fn read_record(&mut self, input: &mut dyn BufRead) -> Result<Option<Record>, RillError> {
        if !self.loaded {
            self.loaded = true;
            self.load(input)?;
        }
        Ok(self.pending.pop_front())
    }
}

/// Either a multi-line JSON array of records or JSON Lines.
pub struct JsonWriter {
    multiline: bool,
    written: u64,
    line_open: bool,
}

impl JsonWriter {
    pub fn new(multiline: bool) -> Self {
        Self { multiline, written: 0, line_open: false }
    }
}

impl RecordWriter for JsonWriter {
    fn write_record(&mut self, record: &Record, out: &mut dyn Write) -> Result<(), RillError> {
        let text = record.to_json_string(self.multiline)?;
        if self.multiline {
            out.write_all(if self.written == 0 { b"[\n" } else { b",\n" })?;
            out.write_all(text.as_bytes())?;
            self.line_open = true;
        } else {
            writeln!(out, "{text}")?;
        }
        self.written += 1;
        Ok(())
    }

    fn write_text(&mut self, line: &str, out: &mut dyn Write) -> Result<(), RillError> {
        if self.line_open {
            out.write_all(b"\n")?;
            self.line_open = false;
        }
        writeln!(out, "{line}")?;
        Ok(())
    }

    fn finish(&mut self, out: &mut dyn Write) -> Result<(), RillError> {
        if !self.multiline {
            return Ok(());
        }
        if self.written == 0 {
            out.write_all(b"[\n]\n")?;
        } else {
            if self.line_open {
                out.write_all(b"\n")?;
            }
            out.write_all(b"]\n")?;
        }
        self.line_open = false;
        Ok(())
    }
}
