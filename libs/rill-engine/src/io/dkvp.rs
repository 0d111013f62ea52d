use std::io::{BufRead, Write};

use rill_api::value::infer_with_mode;
use rill_api::{InferMode, Record, RillError};

use super::{RecordReader, RecordWriter, read_line};

/// `key=value,key=value` lines. A field without the pair separator is
/// keyed by its 1-based position. Empty fields are skipped.
pub struct DkvpReader {
    fs: String,
    ps: String,
    infer: InferMode,
    line: String,
}

impl DkvpReader {
    pub fn new(fs: &str, ps: &str, infer: InferMode) -> Self {
        Self { fs: fs.to_string(), ps: ps.to_string(), infer, line: String::new() }
    }

    fn parse_line(&self, line: &str) -> Record {
        let mut record = Record::new();
        if line.is_empty() {
            return record;
        }
        for (i, field) in line.split(self.fs.as_str()).enumerate() {
            // Repeated or trailing separators.
            if field.is_empty() {
                continue;
            }
            match field.split_once(self.ps.as_str()) {
                Some((key, value)) => record.put_reference(key, infer_with_mode(value, self.infer)),
                None => record.put_reference((i + 1).to_string(), infer_with_mode(field, self.infer)),
            }
        }
        record
    }
}

impl RecordReader for DkvpReader {
    fn read_record(&mut self, input: &mut dyn BufRead) -> Result<Option<Record>, RillError> {
        if !read_line(input, &mut self.line)? {
            return Ok(None);
        }
        Ok(Some(self.parse_line(&self.line)))
    }
}

pub struct DkvpWriter {
    fs: String,
    ps: String,
    line: String,
}

impl DkvpWriter {
    pub fn new(fs: &str, ps: &str) -> Self {
        Self { fs: fs.to_string(), ps: ps.to_string(), line: String::new() }
    }
}

impl RecordWriter for DkvpWriter {
    fn write_record(&mut self, record: &Record, out: &mut dyn Write) -> Result<(), RillError> {
        self.line.clear();
        for (i, (key, value)) in record.iter().enumerate() {
            if i > 0 {
                self.line.push_str(&self.fs);
            }
            self.line.push_str(key);
            self.line.push_str(&self.ps);
            self.line.push_str(&value.render());
        }
        self.line.push('\n');
        out.write_all(self.line.as_bytes())?;
        Ok(())
    }
}
