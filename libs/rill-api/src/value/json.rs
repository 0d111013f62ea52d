use super::{Number, Value, infer};
use crate::error::RillError;
use crate::record::Record;

/// JSON objects become maps, arrays become arrays, `null` is Null.
/// Number text is kept as the print representation.
impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                let text = n.to_string();
                match infer(&text) {
                    v @ (Value::Int(_) | Value::Float(_)) => v,
                    // Out-of-range forms serde_json accepts but we don't infer.
                    _ => match n.as_f64() {
                        Some(f) => Value::Float(Number::with_printrep(f, text)),
                        None => Value::String(text),
                    },
                }
            }
            serde_json::Value::String(s) => Value::from_string(s),
            serde_json::Value::Array(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            serde_json::Value::Object(map) => Value::Map(Record::from(map)),
        }
    }
}

impl From<serde_json::Map<String, serde_json::Value>> for Record {
    fn from(map: serde_json::Map<String, serde_json::Value>) -> Self {
        let mut record = Record::new();
        for (key, value) in map {
            record.put_reference(key, Value::from(value));
        }
        record
    }
}

/// Append the JSON text of `value` to `out`.
///
/// Single-line output separates items with `", "`. Multi-line output puts
/// each map entry on its own line, indented two spaces per level; arrays
/// of scalars stay on one line.
pub fn write_json(value: &Value, out: &mut String, multiline: bool, level: usize) -> Result<(), RillError> {
    match value {
        Value::Map(record) => write_json_map(record, out, multiline, level),
        Value::Array(items) => {
            if items.is_empty() {
                out.push_str("[]");
                return Ok(());
            }
            let nested = multiline && items.iter().any(Value::is_collection);
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if nested {
                    out.push_str(if i == 0 { "\n" } else { ",\n" });
                    indent(out, level + 1);
                } else if i > 0 {
                    out.push_str(", ");
                }
                write_json(item, out, multiline, level + 1)?;
            }
            if nested {
                out.push('\n');
                indent(out, level);
            }
            out.push(']');
            Ok(())
        }
        Value::Int(_) | Value::Float(_) | Value::Bool(_) => {
            out.push_str(&value.render());
            Ok(())
        }
        Value::Null => {
            out.push_str("null");
            Ok(())
        }
        Value::Void => {
            out.push_str("\"\"");
            Ok(())
        }
        Value::String(_) | Value::Error(_) | Value::Absent => write_json_string(&value.render(), out),
    }
}

pub(crate) fn write_json_map(record: &Record, out: &mut String, multiline: bool, level: usize) -> Result<(), RillError> {
    if record.is_empty() {
        out.push_str("{}");
        return Ok(());
    }
    out.push('{');
    for (i, (key, value)) in record.iter().enumerate() {
        if multiline {
            out.push_str(if i == 0 { "\n" } else { ",\n" });
            indent(out, level + 1);
        } else if i > 0 {
            out.push_str(", ");
        }
        write_json_string(key, out)?;
        out.push_str(": ");
        write_json(value, out, multiline, level + 1)?;
    }
    if multiline {
        out.push('\n');
        indent(out, level);
    }
    out.push('}');
    Ok(())
}

fn write_json_string(s: &str, out: &mut String) -> Result<(), RillError> {
    out.push_str(&serde_json::to_string(s)?);
    Ok(())
}

fn indent(out: &mut String, level: usize) {
    for _ in 0..level {
        out.push_str("  ");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ValueType;

    fn parse(text: &str) -> Value {
        serde_json::from_str::<serde_json::Value>(text).map(Value::from).unwrap_or_else(|e| Value::error_because(e.to_string()))
    }

    #[test]
    fn json_numbers_keep_their_text() {
        let v = parse(r#"{"a": 1.500, "b": 7, "c": 1e3}"#);
        let m = v.as_map().expect("map");
        assert_eq!(m.get("a").map(|v| v.render().into_owned()), Some("1.500".to_string()));
        assert_eq!(m.get("b").and_then(Value::as_int), Some(7));
        assert_eq!(m.get("c").map(Value::value_type), Some(ValueType::Float));
    }

    #[test]
    fn json_strings_are_not_inferred() {
        let v = parse(r#"{"a": "12", "b": "", "c": null}"#);
        let m = v.as_map().expect("map");
        assert_eq!(m.get("a").map(Value::value_type), Some(ValueType::String));
        assert_eq!(m.get("b"), Some(&Value::Void));
        assert_eq!(m.get("c"), Some(&Value::Null));
    }

    #[test]
    fn key_order_follows_the_document() {
        let v = parse(r#"{"z": 1, "a": 2, "m": 3}"#);
        let keys: Vec<&str> = v.as_map().expect("map").keys().collect();
        assert_eq!(keys, ["z", "a", "m"]);
    }

    #[test]
    fn multiline_layout() {
        let v = parse(r#"{"a": 1, "b": {"c": [1, 2]}, "d": [{"e": "x"}], "f": {}}"#);
        let mut out = String::new();
        write_json(&v, &mut out, true, 0).expect("write");
        let expected = "{\n  \"a\": 1,\n  \"b\": {\n    \"c\": [1, 2]\n  },\n  \"d\": [\n    {\n      \"e\": \"x\"\n    }\n  ],\n  \"f\": {}\n}";
        assert_eq!(out, expected);
    }

    #[test]
    fn strings_are_escaped() {
        let mut out = String::new();
        write_json(&Value::from_string("say \"hi\"\n"), &mut out, false, 0).expect("write");
        assert_eq!(out, r#""say \"hi\"\n""#);
    }
}
