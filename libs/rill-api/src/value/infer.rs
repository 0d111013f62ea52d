use serde::Deserialize;

use super::{Number, Value};

/// How much typing readers apply to field text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InferMode {
    /// Integers, floats and `true`/`false`.
    #[default]
    Full,
    /// Integers and floats; boolean spellings stay strings.
    NoBool,
    /// No inference: every field is a string (or Void when empty).
    Strings,
    /// Like `NoBool`, but integers are read as floats.
    IntAsFloat,
}

/// Full inference. Total: text that is not a number or boolean is a string.
pub fn infer(text: &str) -> Value {
    infer_with_mode(text, InferMode::Full)
}

pub fn infer_with_mode(text: &str, mode: InferMode) -> Value {
    if text.is_empty() {
        return Value::Void;
    }
    if mode == InferMode::Strings {
        return Value::String(text.to_string());
    }
    if let Some(i) = scan_int(text) {
        return if mode == InferMode::IntAsFloat {
            Value::Float(Number::with_printrep(i as f64, text))
        } else {
            Value::Int(Number::with_printrep(i, text))
        };
    }
    if let Some(f) = scan_float(text) {
        return Value::Float(Number::with_printrep(f, text));
    }
    if mode == InferMode::Full {
        match text {
            "true" => return Value::Bool(true),
            "false" => return Value::Bool(false),
            _ => {}
        }
    }
    Value::String(text.to_string())
}

// ═══════════════════════════════════════════════════════════════
//  Integer scanning
// ═══════════════════════════════════════════════════════════════

fn split_sign(text: &str) -> (bool, &str) {
    match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    }
}

fn prefixed<'a>(body: &'a str, lower: &str, upper: &str) -> Option<&'a str> {
    body.strip_prefix(lower).or_else(|| body.strip_prefix(upper))
}

/// Decimal, hex (`0x`), binary (`0b`), octal (`0o` or leading zero).
///
/// A leading zero followed only by octal digits is octal; a leading zero
/// with any `8` or `9` in the digits is decimal. Decimal text beyond the
/// i64 range is not an int (it reads as a float instead).
fn scan_int(text: &str) -> Option<i64> {
    let (negative, body) = split_sign(text);
    if body.is_empty() {
        return None;
    }

    let magnitude = if let Some(digits) = prefixed(body, "0x", "0X") {
        from_radix_bits(digits, 16, 16)?
    } else if let Some(digits) = prefixed(body, "0b", "0B") {
        from_radix_bits(digits, 2, 64)?
    } else if let Some(digits) = prefixed(body, "0o", "0O") {
        if digits.is_empty() || !digits.bytes().all(|b| (b'0'..=b'7').contains(&b)) {
            return None;
        }
        i64::from_str_radix(digits, 8).ok()?
    } else {
        if !body.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        if body.len() > 1 && body.starts_with('0') && body.bytes().all(|b| b <= b'7') {
            i64::from_str_radix(body, 8).ok()?
        } else {
            // Parse with the sign attached so i64::MIN is reachable.
            return text.parse::<i64>().ok();
        }
    };

    if negative { magnitude.checked_neg() } else { Some(magnitude) }
}

/// Parse unsigned digits of the given radix. When the digit count fills
/// all 64 bits the value is taken as two's complement.
fn from_radix_bits(digits: &str, radix: u32, full_width: usize) -> Option<i64> {
    if digits.is_empty() || digits.len() > full_width {
        return None;
    }
    if !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }
    let unsigned = u64::from_str_radix(digits, radix).ok()?;
    if digits.len() == full_width {
        Some(unsigned as i64)
    } else {
        i64::try_from(unsigned).ok()
    }
}

// ═══════════════════════════════════════════════════════════════
//  Float scanning
// ═══════════════════════════════════════════════════════════════

/// Decimal floats with optional exponent. Spellings such as `inf`, `NaN`
/// or `infinity` are deliberately not floats.
fn scan_float(text: &str) -> Option<f64> {
    let mut has_digit = false;
    for b in text.bytes() {
        match b {
            b'0'..=b'9' => has_digit = true,
            b'.' | b'e' | b'E' | b'+' | b'-' => {}
            _ => return None,
        }
    }
    if !has_digit {
        return None;
    }
    text.parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ValueType;

    fn int(text: &str) -> Option<i64> {
        infer(text).as_int()
    }

    #[test]
    fn decimal_and_signed() {
        assert_eq!(int("42"), Some(42));
        assert_eq!(int("-42"), Some(-42));
        assert_eq!(int("+42"), Some(42));
        assert_eq!(int("-9223372036854775808"), Some(i64::MIN));
    }

    #[test]
    fn leading_zero_octal_versus_decimal() {
        assert_eq!(int("017"), Some(15));
        assert_eq!(int("-017"), Some(-15));
        assert_eq!(int("00"), Some(0));
        assert_eq!(int("018"), Some(18));
        assert_eq!(int("09"), Some(9));
        assert_eq!(int("0o17"), Some(15));
        assert_eq!(int("0"), Some(0));
    }

    #[test]
    fn hex_and_binary() {
        assert_eq!(int("0x1F"), Some(31));
        assert_eq!(int("-0x1f"), Some(-31));
        assert_eq!(int("0xffffffffffffffff"), Some(-1));
        assert_eq!(int("0x7fffffffffffffff"), Some(i64::MAX));
        assert_eq!(int("0b101"), Some(5));
        assert_eq!(int("-0b101"), Some(-5));
        assert_eq!(infer("0x").value_type(), ValueType::String);
        assert_eq!(infer("0xfg").value_type(), ValueType::String);
    }

    #[test]
    fn out_of_range_decimal_becomes_float_with_text() {
        let v = infer("9223372036854775808");
        assert_eq!(v.value_type(), ValueType::Float);
        assert_eq!(v.render(), "9223372036854775808");
    }

    #[test]
    fn floats() {
        assert_eq!(infer("1.5").as_float(), Some(1.5));
        assert_eq!(infer("1e3").as_float(), Some(1000.0));
        assert_eq!(infer("-.5").as_float(), Some(-0.5));
        assert_eq!(infer("1.5").value_type(), ValueType::Float);
    }

    #[test]
    fn never_fails_and_rejects_special_spellings() {
        for text in ["inf", "-inf", "NaN", "nan", "Infinity", "1e", "e5", "--1", "1.2.3", "abc", "1_000", " 1"] {
            assert_eq!(infer(text).value_type(), ValueType::String, "text {text}");
        }
        assert_eq!(infer("").value_type(), ValueType::Void);
    }

    #[test]
    fn modes() {
        assert_eq!(infer("true"), Value::Bool(true));
        assert_eq!(infer_with_mode("true", InferMode::NoBool).value_type(), ValueType::String);
        assert_eq!(infer_with_mode("12", InferMode::Strings).value_type(), ValueType::String);
        assert_eq!(infer_with_mode("", InferMode::Strings).value_type(), ValueType::Void);
        let v = infer_with_mode("0x10", InferMode::IntAsFloat);
        assert_eq!(v.as_float(), Some(16.0));
        assert_eq!(v.render(), "0x10");
    }
}
