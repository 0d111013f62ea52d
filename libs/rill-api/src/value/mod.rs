//! Run-time value model: the tagged datum carried in every record field.

mod format;
mod infer;
mod json;

use std::borrow::Cow;
use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::record::Record;

pub use format::{FloatFormat, float_output_format, set_float_output_format};
pub use infer::{InferMode, infer, infer_with_mode};
pub use json::write_json;
pub(crate) use json::write_json_map;

/// Number of value variants; every dispatch table has this many rows and columns.
pub const TYPE_COUNT: usize = 10;

/// Discriminant of a [`Value`], usable as a dispatch-table index.
///
/// The ordering is fixed: tables in `ops` are authored against it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum ValueType {
    Error = 0,
    Absent = 1,
    Null = 2,
    Void = 3,
    String = 4,
    Int = 5,
    Float = 6,
    Bool = 7,
    Array = 8,
    Map = 9,
}

impl ValueType {
    pub const ALL: [ValueType; TYPE_COUNT] = [
        ValueType::Error,
        ValueType::Absent,
        ValueType::Null,
        ValueType::Void,
        ValueType::String,
        ValueType::Int,
        ValueType::Float,
        ValueType::Bool,
        ValueType::Array,
        ValueType::Map,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Name used in diagnostics and type-error messages.
    pub fn name(self) -> &'static str {
        match self {
            ValueType::Error => "error",
            ValueType::Absent => "absent",
            ValueType::Null => "null",
            ValueType::Void => "empty",
            ValueType::String => "string",
            ValueType::Int => "int",
            ValueType::Float => "float",
            ValueType::Bool => "boolean",
            ValueType::Array => "array",
            ValueType::Map => "map",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Numeric payload plus its print representation.
///
/// Values read from text carry the original text. Computed values start
/// with an empty cell that is filled on first render.
#[derive(Debug, Clone)]
pub struct Number<T> {
    value: T,
    printrep: OnceLock<String>,
}

impl<T: Copy> Number<T> {
    pub fn computed(value: T) -> Self {
        Self { value, printrep: OnceLock::new() }
    }

    pub fn with_printrep(value: T, text: impl Into<String>) -> Self {
        Self { value, printrep: OnceLock::from(text.into()) }
    }

    #[inline]
    pub fn get(&self) -> T {
        self.value
    }

    /// Print representation if one has been recorded or rendered already.
    pub fn cached_printrep(&self) -> Option<&str> {
        self.printrep.get().map(String::as_str)
    }

    fn render_with(&self, f: impl FnOnce(T) -> String) -> &str {
        self.printrep.get_or_init(|| f(self.value))
    }
}

/// Numbers compare by payload; print representation is presentation only.
impl<T: PartialEq> PartialEq for Number<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

/// A single field value.
///
/// Collections own their contents: cloning a `Value` deep-copies nested
/// arrays and maps, so a clone can never alias another record's data.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    /// Result of an invalid operation; the optional text says why.
    Error(Option<Arc<str>>),
    /// No such field.
    #[default]
    Absent,
    /// Explicit null, e.g. from JSON.
    Null,
    /// Present but empty.
    Void,
    String(String),
    Int(Number<i64>),
    Float(Number<f64>),
    Bool(bool),
    Array(Vec<Value>),
    Map(Record),
}

impl Value {
    pub fn error() -> Self {
        Value::Error(None)
    }

    pub fn error_because(reason: impl Into<String>) -> Self {
        Value::Error(Some(Arc::from(reason.into())))
    }

    pub fn from_int(i: i64) -> Self {
        Value::Int(Number::computed(i))
    }

    pub fn from_float(f: f64) -> Self {
        Value::Float(Number::computed(f))
    }

    pub fn from_bool(b: bool) -> Self {
        Value::Bool(b)
    }

    /// String without inference; empty text is Void.
    pub fn from_string(s: impl Into<String>) -> Self {
        let s = s.into();
        if s.is_empty() { Value::Void } else { Value::String(s) }
    }

    /// Infer a typed value from raw input text (full inference).
    pub fn infer(text: &str) -> Self {
        infer(text)
    }

    pub fn from_map(record: Record) -> Self {
        Value::Map(record)
    }

    pub fn from_array(items: Vec<Value>) -> Self {
        Value::Array(items)
    }

    #[inline]
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Error(_) => ValueType::Error,
            Value::Absent => ValueType::Absent,
            Value::Null => ValueType::Null,
            Value::Void => ValueType::Void,
            Value::String(_) => ValueType::String,
            Value::Int(_) => ValueType::Int,
            Value::Float(_) => ValueType::Float,
            Value::Bool(_) => ValueType::Bool,
            Value::Array(_) => ValueType::Array,
            Value::Map(_) => ValueType::Map,
        }
    }

    #[inline]
    pub(crate) fn type_index(&self) -> usize {
        self.value_type().index()
    }

    pub fn type_name(&self) -> &'static str {
        self.value_type().name()
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Value::Absent)
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Value::Void)
    }

    /// Void or a string of only whitespace.
    pub fn is_blank(&self) -> bool {
        match self {
            Value::Void => true,
            Value::String(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Float(_))
    }

    pub fn is_collection(&self) -> bool {
        matches!(self, Value::Array(_) | Value::Map(_))
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(n.get()),
            _ => None,
        }
    }

    /// Numeric payload as a float; ints are promoted.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(n.get() as f64),
            Value::Float(n) => Some(n.get()),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Text of String and Void values.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            Value::Void => Some(""),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Record> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_map_mut(&mut self) -> Option<&mut Record> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Boolean reading for filter conditions: `Bool(b)` is `b` and the
    /// strings `true`/`false` parse. Anything else is not a boolean.
    pub fn truthiness(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            Value::String(s) if s == "true" => Some(true),
            Value::String(s) if s == "false" => Some(false),
            _ => None,
        }
    }

    /// Deep copy. Same as `clone`, spelled out at call sites that retain a
    /// value across records.
    pub fn copy(&self) -> Self {
        self.clone()
    }

    /// Print representation.
    ///
    /// Idempotent: numbers cache the formatted text on first call, so a
    /// second call returns the same bytes without reformatting.
    pub fn render(&self) -> Cow<'_, str> {
        match self {
            Value::Error(_) => Cow::Borrowed("(error)"),
            Value::Absent => Cow::Borrowed("(absent)"),
            Value::Null | Value::Void => Cow::Borrowed(""),
            Value::String(s) => Cow::Borrowed(s),
            Value::Int(n) => Cow::Borrowed(n.render_with(|i| i.to_string())),
            Value::Float(n) => Cow::Borrowed(n.render_with(format::format_float)),
            Value::Bool(true) => Cow::Borrowed("true"),
            Value::Bool(false) => Cow::Borrowed("false"),
            Value::Array(_) | Value::Map(_) => {
                let mut out = String::new();
                match write_json(self, &mut out, false, 0) {
                    Ok(()) => Cow::Owned(out),
                    Err(_) => Cow::Borrowed("(error)"),
                }
            }
        }
    }

    /// Reason attached to an Error value, if any.
    pub fn error_reason(&self) -> Option<&str> {
        match self {
            Value::Error(Some(reason)) => Some(reason),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::from_int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::from_float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::from_string(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::from_string(s)
    }
}

impl From<Record> for Value {
    fn from(r: Record) -> Self {
        Value::Map(r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_text_round_trips() {
        for text in [
            "007", "0x1F", "0xff", "1.50", "-0b101", "1e5", "1.5E-03", "+3", "0o17", "089",
            "0xffffffffffffffff", ".5", "5.", "abc", "true",
        ] {
            assert_eq!(Value::infer(text).render(), text, "text {text}");
        }
    }

    #[test]
    fn render_is_idempotent_and_cached() {
        let v = Value::from_float(0.1 + 0.2);
        let first = v.render().into_owned();
        let second = v.render().into_owned();
        assert_eq!(first, second);
        match &v {
            Value::Float(n) => assert_eq!(n.cached_printrep(), Some(first.as_str())),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn computed_values_render_canonically() {
        assert_eq!(Value::from_int(-42).render(), "-42");
        assert_eq!(Value::from_float(1.5).render(), "1.5");
        assert_eq!(Value::from_float(3.0).render(), "3");
        assert_eq!(Value::from_float(f64::INFINITY).render(), "+Inf");
        assert_eq!(Value::from_float(f64::NEG_INFINITY).render(), "-Inf");
        assert_eq!(Value::from_float(f64::NAN).render(), "NaN");
        assert_eq!(Value::Bool(true).render(), "true");
        assert_eq!(Value::error().render(), "(error)");
        assert_eq!(Value::Absent.render(), "(absent)");
        assert_eq!(Value::Void.render(), "");
    }

    #[test]
    fn collections_render_as_single_line_json() {
        let mut inner = Record::new();
        inner.put_reference("x", Value::from_int(1));
        let v = Value::from_array(vec![Value::infer("0x10"), Value::from_string("a"), Value::Map(inner)]);
        assert_eq!(v.render(), r#"[0x10, "a", {"x": 1}]"#);
    }

    #[test]
    fn type_names() {
        assert_eq!(Value::Void.type_name(), "empty");
        assert_eq!(Value::Bool(false).type_name(), "boolean");
        assert_eq!(Value::Null.type_name(), "null");
        for (i, t) in ValueType::ALL.iter().enumerate() {
            assert_eq!(t.index(), i);
        }
    }

    #[test]
    fn numbers_compare_by_payload() {
        assert_eq!(Value::infer("0x10"), Value::from_int(16));
        assert_ne!(Value::from_int(1), Value::from_float(1.0));
    }

    #[test]
    fn truthiness_reads_bools_and_bool_strings() {
        assert_eq!(Value::Bool(true).truthiness(), Some(true));
        assert_eq!(Value::from_string("false").truthiness(), Some(false));
        assert_eq!(Value::from_int(1).truthiness(), None);
    }

    #[test]
    fn clone_is_deep() {
        let mut inner = Record::new();
        inner.put_reference("k", Value::from_int(1));
        let original = Value::Map(inner);
        let mut copy = original.copy();
        if let Some(m) = copy.as_map_mut() {
            m.put_reference("k", Value::from_int(2));
        }
        assert_eq!(original.as_map().and_then(|m| m.get("k")), Some(&Value::from_int(1)));
    }
}
