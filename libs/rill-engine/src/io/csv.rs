use std::io::{BufRead, Write};

use rill_api::value::infer_with_mode;
use rill_api::{InferMode, Record, RillError, Value};

use super::{RecordReader, RecordWriter, read_line};

// ═══════════════════════════════════════════════════════════════
//  RFC 4180 field parser
// ═══════════════════════════════════════════════════════════════

/// One parsed field. Quoted fields are never type-inferred.
#[derive(Debug, PartialEq)]
pub(crate) struct Field {
    pub text: String,
    pub quoted: bool,
}

/// Split one logical CSV line. Returns None when a quoted field is still
/// open at end of line (the caller appends the next physical line).
pub(crate) fn parse_fields(line: &str, delimiter: &str) -> Option<Vec<Field>> {
    let mut fields = Vec::new();
    let mut rest = line;

    loop {
        if let Some(after_quote) = rest.strip_prefix('"') {
            // Quoted field: "" is an escaped quote.
            let mut text = String::new();
            let mut chars = after_quote.char_indices();
            let mut end = None;
            while let Some((i, c)) = chars.next() {
                if c != '"' {
                    text.push(c);
                    continue;
                }
                if after_quote[i + 1..].starts_with('"') {
                    chars.next();
                    text.push('"');
                } else {
                    end = Some(i + 1);
                    break;
                }
            }
            let end = end?;
            // Skip stray characters between the closing quote and the delimiter.
            let tail = &after_quote[end..];
            fields.push(Field { text, quoted: true });
            match tail.find(delimiter) {
                Some(pos) => rest = &tail[pos + delimiter.len()..],
                None => return Some(fields),
            }
        } else {
            match rest.find(delimiter) {
                Some(pos) => {
                    fields.push(Field { text: rest[..pos].to_string(), quoted: false });
                    rest = &rest[pos + delimiter.len()..];
                }
                None => {
                    fields.push(Field { text: rest.to_string(), quoted: false });
                    return Some(fields);
                }
            }
        }
    }
}

fn needs_quoting(text: &str, delimiter: &str) -> bool {
    text.contains(delimiter) || text.contains(['"', '\n', '\r'])
}

fn push_quoted(line: &mut String, text: &str, delimiter: &str) {
    if needs_quoting(text, delimiter) {
        line.push('"');
        line.push_str(&text.replace('"', "\"\""));
        line.push('"');
    } else {
        line.push_str(text);
    }
}

// ═══════════════════════════════════════════════════════════════
//  Reader
// ═══════════════════════════════════════════════════════════════

/// Header line, then data lines. A blank line starts a new header block.
pub struct CsvReader {
    fs: String,
    infer: InferMode,
    header: Option<Vec<String>>,
    line_number: u64,
    line: String,
}

impl CsvReader {
    pub fn new(fs: &str, infer: InferMode) -> Self {
        Self {
            fs: fs.to_string(),
            infer,
            header: None,
            line_number: 0,
            line: String::new(),
        }
    }

    /// Next logical line, joining physical lines inside quoted fields.
    fn next_fields(&mut self, input: &mut dyn BufRead) -> Result<Option<Vec<Field>>, RillError> {
        if !read_line(input, &mut self.line)? {
            return Ok(None);
        }
        self.line_number += 1;
        let start = self.line_number;
        let mut logical = std::mem::take(&mut self.line);
        loop {
            if let Some(fields) = parse_fields(&logical, &self.fs) {
                self.line = logical;
                return Ok(Some(fields));
            }
            if !read_line(input, &mut self.line)? {
                return Err(RillError::format(format!("unterminated quoted field starting at line {start}")));
            }
            self.line_number += 1;
            logical.push('\n');
            logical.push_str(&self.line);
        }
    }
}

fn field_value(field: Field, infer: InferMode) -> Value {
    if field.quoted {
        Value::from_string(field.text)
    } else {
        infer_with_mode(&field.text, infer)
    }
}

impl RecordReader for CsvReader {
    fn begin_source(&mut self, _name: &str) {
        self.header = None;
        self.line_number = 0;
    }

    fn read_record(&mut self, input: &mut dyn BufRead) -> Result<Option<Record>, RillError> {
        loop {
            let Some(fields) = self.next_fields(input)? else {
                return Ok(None);
            };
            if self.line.is_empty() {
                self.header = None;
                continue;
            }
            let Some(header) = &self.header else {
                self.header = Some(fields.into_iter().map(|f| f.text).collect());
                continue;
            };
            if header.len() != fields.len() {
                return Err(RillError::format(format!(
                    "CSV header/data length mismatch {} != {} at line {}",
                    header.len(),
                    fields.len(),
                    self.line_number
                )));
            }
            let mut record = Record::with_capacity(header.len());
            for (key, field) in header.iter().zip(fields) {
                record.put_reference(key.as_str(), field_value(field, self.infer));
            }
            return Ok(Some(record));
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  Writer
// ═══════════════════════════════════════════════════════════════

/// Prints a header whenever the key list changes, preceded by a blank
/// line if another block came before.
pub struct CsvWriter {
    fs: String,
    header: Option<Vec<String>>,
    line: String,
}

impl CsvWriter {
    pub fn new(fs: &str) -> Self {
        Self { fs: fs.to_string(), header: None, line: String::new() }
    }

    fn same_header(&self, record: &Record) -> bool {
        match &self.header {
            Some(header) => header.len() == record.len() && header.iter().map(String::as_str).eq(record.keys()),
            None => false,
        }
    }
}

impl RecordWriter for CsvWriter {
    fn write_record(&mut self, record: &Record, out: &mut dyn Write) -> Result<(), RillError> {
        if record.is_empty() {
            out.write_all(b"\n")?;
            self.header = None;
            return Ok(());
        }

        self.line.clear();
        if !self.same_header(record) {
            if self.header.is_some() {
                self.line.push('\n');
            }
            for (i, key) in record.keys().enumerate() {
                if i > 0 {
                    self.line.push_str(&self.fs);
                }
                push_quoted(&mut self.line, key, &self.fs);
            }
            self.line.push('\n');
            self.header = Some(record.keys().map(str::to_string).collect());
        }

        for (i, value) in record.values().enumerate() {
            if i > 0 {
                self.line.push_str(&self.fs);
            }
            push_quoted(&mut self.line, &value.render(), &self.fs);
        }
        self.line.push('\n');
        out.write_all(self.line.as_bytes())?;
        Ok(())
    }
}
