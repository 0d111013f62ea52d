use std::io::{BufRead, Write};

use rill_api::value::infer_with_mode;
use rill_api::{InferMode, Record, RillError};

use super::{RecordReader, RecordWriter, read_line};

/// Implicitly keyed fields `1..N`. Runs of the separator count as one.
pub struct NidxReader {
    fs: String,
    infer: InferMode,
    line: String,
}

impl NidxReader {
    pub fn new(fs: &str, infer: InferMode) -> Self {
        Self { fs: fs.to_string(), infer, line: String::new() }
    }
}

impl RecordReader for NidxReader {
    fn read_record(&mut self, input: &mut dyn BufRead) -> Result<Option<Record>, RillError> {
        if !read_line(input, &mut self.line)? {
            return Ok(None);
        }
        let mut record = Record::new();
        let fields = self.line.split(self.fs.as_str()).filter(|f| !f.is_empty());
        for (i, field) in fields.enumerate() {
            record.put_reference((i + 1).to_string(), infer_with_mode(field, self.infer));
        }
        Ok(Some(record))
    }
}

/// Values only, joined by the separator.
pub struct NidxWriter {
    fs: String,
    line: String,
}

impl NidxWriter {
    pub fn new(fs: &str) -> Self {
        Self { fs: fs.to_string(), line: String::new() }
    }
}

impl RecordWriter for NidxWriter {
    fn write_record(&mut self, record: &Record, out: &mut dyn Write) -> Result<(), RillError> {
        self.line.clear();
        for (i, value) in record.values().enumerate() {
            if i > 0 {
                self.line.push_str(&self.fs);
            }
            self.line.push_str(&value.render());
        }
        self.line.push('\n');
        out.write_all(self.line.as_bytes())?;
        Ok(())
    }
}
