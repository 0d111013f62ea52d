use std::sync::OnceLock;

use crate::error::RillError;

/// Process-wide float output format. Installed once during startup and
/// read-only afterwards.
static FLOAT_OUTPUT_FORMAT: OnceLock<FloatFormat> = OnceLock::new();

/// Install the float output format. Fails if one is already installed.
pub fn set_float_output_format(format: FloatFormat) -> Result<(), RillError> {
    FLOAT_OUTPUT_FORMAT
        .set(format)
        .map_err(|_| RillError::config("float output format is already set"))
}

pub fn float_output_format() -> Option<&'static FloatFormat> {
    FLOAT_OUTPUT_FORMAT.get()
}

/// Render a computed float: installed format if any, else shortest round-trip text.
pub(crate) fn format_float(f: f64) -> String {
    match float_output_format() {
        Some(format) => format.format_float(f),
        None => default_float(f),
    }
}

fn default_float(f: f64) -> String {
    if f.is_nan() {
        "NaN".to_string()
    } else if f.is_infinite() {
        if f > 0.0 { "+Inf".to_string() } else { "-Inf".to_string() }
    } else {
        format!("{f}")
    }
}

// ═══════════════════════════════════════════════════════════════
//  C-style format strings
// ═══════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Conversion {
    Decimal,
    LowerHex,
    UpperHex,
    Octal,
    Binary,
    Fixed,
    LowerExp,
    UpperExp,
    LowerGeneral,
    UpperGeneral,
    Text,
}

/// A parsed `printf`-style format with exactly one verb, e.g. `%.4lf`,
/// `%08.3f`, `[%d]`, `%x`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FloatFormat {
    prefix: String,
    suffix: String,
    left_align: bool,
    zero_pad: bool,
    plus_sign: bool,
    space_sign: bool,
    width: usize,
    precision: Option<usize>,
    conversion: Conversion,
}

impl FloatFormat {
    pub fn parse(text: &str) -> Result<Self, RillError> {
        let bad = || RillError::config(format!("invalid number format {text:?}: expected exactly one % verb"));

        if text.matches('%').count() != 1 {
            return Err(bad());
        }
        let (prefix, rest) = text.split_once('%').ok_or_else(bad)?;

        let mut chars = rest.char_indices().peekable();
        let (mut left_align, mut zero_pad, mut plus_sign, mut space_sign) = (false, false, false, false);
        while let Some(&(_, c)) = chars.peek() {
            match c {
                '-' => left_align = true,
                '0' => zero_pad = true,
                '+' => plus_sign = true,
                ' ' => space_sign = true,
                _ => break,
            }
            chars.next();
        }

        let mut width = 0usize;
        while let Some(&(_, c)) = chars.peek() {
            let Some(d) = c.to_digit(10) else { break };
            width = width * 10 + d as usize;
            chars.next();
        }

        let mut precision = None;
        if chars.peek().map(|&(_, c)| c) == Some('.') {
            chars.next();
            let mut p = 0usize;
            while let Some(&(_, c)) = chars.peek() {
                let Some(d) = c.to_digit(10) else { break };
                p = p * 10 + d as usize;
                chars.next();
            }
            precision = Some(p);
        }

        // C length modifiers are accepted and ignored: %lf, %lld, %llx.
        while chars.peek().map(|&(_, c)| c) == Some('l') {
            chars.next();
        }

        let (at, verb) = chars.next().ok_or_else(bad)?;
        let conversion = match verb {
            'd' | 'i' => Conversion::Decimal,
            'x' => Conversion::LowerHex,
            'X' => Conversion::UpperHex,
            'o' => Conversion::Octal,
            'b' => Conversion::Binary,
            'f' | 'F' => Conversion::Fixed,
            'e' => Conversion::LowerExp,
            'E' => Conversion::UpperExp,
            'g' => Conversion::LowerGeneral,
            'G' => Conversion::UpperGeneral,
            's' | 'v' => Conversion::Text,
            _ => return Err(bad()),
        };
        let suffix = &rest[at + verb.len_utf8()..];

        Ok(Self {
            prefix: prefix.to_string(),
            suffix: suffix.to_string(),
            left_align,
            zero_pad,
            plus_sign,
            space_sign,
            width,
            precision,
            conversion,
        })
    }

    /// True when the verb formats integers (`d`, `x`, `o`, `b`).
    pub fn is_integer_verb(&self) -> bool {
        matches!(
            self.conversion,
            Conversion::Decimal | Conversion::LowerHex | Conversion::UpperHex | Conversion::Octal | Conversion::Binary
        )
    }

    pub fn format_float(&self, f: f64) -> String {
        if !f.is_finite() {
            return self.finish(default_float(f), false);
        }
        if self.is_integer_verb() {
            return self.format_int(f as i64);
        }
        let negative = f.is_sign_negative() && f != 0.0;
        let magnitude = f.abs();
        let body = match self.conversion {
            Conversion::Fixed => format!("{:.*}", self.precision.unwrap_or(6), magnitude),
            Conversion::LowerExp => c_exponent(magnitude, self.precision.unwrap_or(6), 'e'),
            Conversion::UpperExp => c_exponent(magnitude, self.precision.unwrap_or(6), 'E'),
            Conversion::LowerGeneral => c_general(magnitude, self.precision.unwrap_or(6), 'e'),
            Conversion::UpperGeneral => c_general(magnitude, self.precision.unwrap_or(6), 'E'),
            _ => default_float(magnitude),
        };
        self.finish(body, negative)
    }

    pub fn format_int(&self, i: i64) -> String {
        let negative = i < 0;
        let magnitude = i.unsigned_abs();
        let body = match self.conversion {
            Conversion::Decimal | Conversion::Text => magnitude.to_string(),
            Conversion::LowerHex => format!("{magnitude:x}"),
            Conversion::UpperHex => format!("{magnitude:X}"),
            Conversion::Octal => format!("{magnitude:o}"),
            Conversion::Binary => format!("{magnitude:b}"),
            _ => return self.format_float(i as f64),
        };
        self.finish(body, negative)
    }

    /// Apply sign, padding, prefix and suffix to an unsigned body.
    fn finish(&self, body: String, negative: bool) -> String {
        let sign = if negative {
            "-"
        } else if self.plus_sign {
            "+"
        } else if self.space_sign {
            " "
        } else {
            ""
        };
        let len = sign.len() + body.len();
        let mut out = String::with_capacity(self.prefix.len() + len.max(self.width) + self.suffix.len());
        out.push_str(&self.prefix);
        if len >= self.width {
            out.push_str(sign);
            out.push_str(&body);
        } else if self.left_align {
            out.push_str(sign);
            out.push_str(&body);
            out.extend(std::iter::repeat_n(' ', self.width - len));
        } else if self.zero_pad && body.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'.' || b == b'+' || b == b'-') {
            out.push_str(sign);
            out.extend(std::iter::repeat_n('0', self.width - len));
            out.push_str(&body);
        } else {
            out.extend(std::iter::repeat_n(' ', self.width - len));
            out.push_str(sign);
            out.push_str(&body);
        }
        out.push_str(&self.suffix);
        out
    }
}

/// `%e` as C prints it: mantissa, `e`, sign, at least two exponent digits.
fn c_exponent(magnitude: f64, precision: usize, e: char) -> String {
    let rust = format!("{magnitude:.precision$e}");
    let (mantissa, exponent) = rust.split_once('e').unwrap_or((&rust, "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let sign = if exponent < 0 { '-' } else { '+' };
    format!("{mantissa}{e}{sign}{:02}", exponent.unsigned_abs())
}

/// `%g`: fixed or exponent depending on the decimal exponent, trailing zeros removed.
fn c_general(magnitude: f64, precision: usize, e: char) -> String {
    let p = precision.max(1);
    if magnitude == 0.0 {
        return "0".to_string();
    }
    let scientific = format!("{magnitude:.*e}", p - 1);
    let exponent: i32 = scientific.split_once('e').and_then(|(_, x)| x.parse().ok()).unwrap_or(0);
    if exponent < -4 || exponent >= p as i32 {
        let text = c_exponent(magnitude, p - 1, e);
        match text.split_once(e) {
            Some((mantissa, exp)) => format!("{}{e}{exp}", trim_fraction(mantissa)),
            None => text,
        }
    } else {
        let decimals = (p as i32 - 1 - exponent).max(0) as usize;
        trim_fraction(&format!("{magnitude:.decimals$}")).to_string()
    }
}

fn trim_fraction(text: &str) -> &str {
    if text.contains('.') { text.trim_end_matches('0').trim_end_matches('.') } else { text }
}
