use std::fmt;
use std::io;

/// What went wrong, coarsely. Decides how the driver words the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad option value, e.g. an unparseable float format.
    Config,
    /// Reading input or writing output failed.
    Io,
    /// Input text is not valid for its format (CSV shape, JSON syntax, UTF-8).
    Format,
    /// Positional or indexed record access that cannot be satisfied.
    Index,
    /// A stage refused a record.
    Logic,
}

impl ErrorKind {
    pub fn name(self) -> &'static str {
        match self {
            ErrorKind::Config => "config",
            ErrorKind::Io => "i/o",
            ErrorKind::Format => "format",
            ErrorKind::Index => "index",
            ErrorKind::Logic => "stage",
        }
    }
}

/// Error returned by readers, writers, stages and record operations.
///
/// Value-level problems are not errors: they are `Value::Error` and travel
/// with the data.
#[derive(Debug)]
pub struct RillError {
    pub kind: ErrorKind,
    pub message: String,
}

impl RillError {
    fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into() }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Config, message)
    }

    pub fn format(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Format, message)
    }

    pub fn index(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Index, message)
    }

    pub fn logic(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Logic, message)
    }

    /// Prefix the message with where it happened (a file name, a stage).
    pub fn with_context(mut self, ctx: impl fmt::Display) -> Self {
        self.message = format!("{ctx}: {}", self.message);
        self
    }
}

impl fmt::Display for RillError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} error: {}", self.kind.name(), self.message)
    }
}

impl std::error::Error for RillError {}

/// Invalid UTF-8 surfaces from `read_line` as `InvalidData`; that is bad
/// input, not a failing device.
impl From<io::Error> for RillError {
    fn from(e: io::Error) -> Self {
        let kind = match e.kind() {
            io::ErrorKind::InvalidData => ErrorKind::Format,
            _ => ErrorKind::Io,
        };
        Self::new(kind, e.to_string())
    }
}

impl From<serde_json::Error> for RillError {
    fn from(e: serde_json::Error) -> Self {
        Self::new(if e.is_io() { ErrorKind::Io } else { ErrorKind::Format }, e.to_string())
    }
}

/// Abort on a broken internal invariant.
///
/// Only for states that valid input can never reach (an exhaustive match
/// that fell through, a table hole). Data errors go through `RillError`.
#[track_caller]
pub fn internal_coding_error(what: impl fmt::Display) -> ! {
    let location = std::panic::Location::caller();
    tracing::error!(%location, "internal coding error: {what}");
    eprintln!("rill: internal coding error detected at {location}: {what}");
    std::process::exit(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_is_prepended_and_kind_kept() {
        let err = RillError::index("no such field").with_context("put_indexed");
        assert_eq!(err.kind, ErrorKind::Index);
        assert_eq!(err.message, "put_indexed: no such field");
        assert_eq!(err.to_string(), "index error: put_indexed: no such field");
    }

    #[test]
    fn io_errors_split_into_io_and_format() {
        let gone: RillError = io::Error::new(io::ErrorKind::NotFound, "gone").into();
        assert_eq!(gone.kind, ErrorKind::Io);

        let mut text = String::new();
        let mut bytes: &[u8] = b"ok\xff\n";
        let err: RillError = io::BufRead::read_line(&mut bytes, &mut text).expect_err("invalid utf-8").into();
        assert_eq!(err.kind, ErrorKind::Format);
    }

    #[test]
    fn json_syntax_is_a_format_error() {
        let err: RillError = serde_json::from_str::<serde_json::Value>("{").expect_err("syntax").into();
        assert_eq!(err.kind, ErrorKind::Format);
    }
}
