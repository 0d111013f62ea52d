//! Operator dispatch.
//!
//! Every operator is a complete `TYPE_COUNT × TYPE_COUNT` table of function
//! pointers (or a `TYPE_COUNT` row for unary operators), indexed by the
//! operand discriminants. Rows and columns follow [`ValueType`] order:
//!
//! ```text
//! ERROR ABSENT NULL VOID STRING INT FLOAT BOOL ARRAY MAP
//! ```
//!
//! Implementations inside a table may assume the operand types of their
//! cell; reaching one with other types is an internal coding error.

mod arithmetic;
mod bits;
mod collate;
mod compare;
mod logic;
mod strings;

use std::fmt;

use crate::error::internal_coding_error;
use crate::value::{TYPE_COUNT, Value};
#[cfg(test)]
use crate::value::ValueType;

pub type UnaryFunc = fn(&Value) -> Value;
pub type BinaryFunc = fn(&Value, &Value) -> Value;
pub type UnaryTable = [UnaryFunc; TYPE_COUNT];
pub type BinaryTable = [[BinaryFunc; TYPE_COUNT]; TYPE_COUNT];

#[inline]
pub fn dispatch_unary(table: &UnaryTable, a: &Value) -> Value {
    table[a.type_index()](a)
}

#[inline]
pub fn dispatch_binary(table: &BinaryTable, a: &Value, b: &Value) -> Value {
    table[a.type_index()][b.type_index()](a, b)
}

/// Structural equality as used by `==`: numbers compare numerically,
/// maps ignore key order, arrays compare element-wise.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    matches!(dispatch_binary(&compare::EQ, a, b), Value::Bool(true))
}

// ═══════════════════════════════════════════════════════════════
//  Operator catalog
// ═══════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Plus,
    Minus,
    BitNot,
    LogicalNot,
}

impl UnaryOp {
    pub const ALL: [UnaryOp; 4] = [UnaryOp::Plus, UnaryOp::Minus, UnaryOp::BitNot, UnaryOp::LogicalNot];

    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Plus => "+",
            UnaryOp::Minus => "-",
            UnaryOp::BitNot => "~",
            UnaryOp::LogicalNot => "!",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.symbol() == symbol)
    }

    pub fn table(self) -> &'static UnaryTable {
        match self {
            UnaryOp::Plus => &arithmetic::UNARY_PLUS,
            UnaryOp::Minus => &arithmetic::UNARY_MINUS,
            UnaryOp::BitNot => &bits::BIT_NOT,
            UnaryOp::LogicalNot => &logic::NOT,
        }
    }

    pub fn apply(self, a: &Value) -> Value {
        dispatch_unary(self.table(), a)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Plus,
    Minus,
    Times,
    Divide,
    IntDivide,
    Modulus,
    Pow,
    DotPlus,
    DotMinus,
    DotTimes,
    DotDivide,
    BitAnd,
    BitOr,
    BitXor,
    LeftShift,
    SignedRightShift,
    UnsignedRightShift,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Cmp,
    LogicalAnd,
    LogicalOr,
    LogicalXor,
    Dot,
    Min,
    Max,
}

impl BinaryOp {
    pub const ALL: [BinaryOp; 30] = [
        BinaryOp::Plus,
        BinaryOp::Minus,
        BinaryOp::Times,
        BinaryOp::Divide,
        BinaryOp::IntDivide,
        BinaryOp::Modulus,
        BinaryOp::Pow,
        BinaryOp::DotPlus,
        BinaryOp::DotMinus,
        BinaryOp::DotTimes,
        BinaryOp::DotDivide,
        BinaryOp::BitAnd,
        BinaryOp::BitOr,
        BinaryOp::BitXor,
        BinaryOp::LeftShift,
        BinaryOp::SignedRightShift,
        BinaryOp::UnsignedRightShift,
        BinaryOp::Eq,
        BinaryOp::Ne,
        BinaryOp::Lt,
        BinaryOp::Le,
        BinaryOp::Gt,
        BinaryOp::Ge,
        BinaryOp::Cmp,
        BinaryOp::LogicalAnd,
        BinaryOp::LogicalOr,
        BinaryOp::LogicalXor,
        BinaryOp::Dot,
        BinaryOp::Min,
        BinaryOp::Max,
    ];

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Plus => "+",
            BinaryOp::Minus => "-",
            BinaryOp::Times => "*",
            BinaryOp::Divide => "/",
            BinaryOp::IntDivide => "//",
            BinaryOp::Modulus => "%",
            BinaryOp::Pow => "**",
            BinaryOp::DotPlus => ".+",
            BinaryOp::DotMinus => ".-",
            BinaryOp::DotTimes => ".*",
            BinaryOp::DotDivide => "./",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::LeftShift => "<<",
            BinaryOp::SignedRightShift => ">>",
            BinaryOp::UnsignedRightShift => ">>>",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::Cmp => "<=>",
            BinaryOp::LogicalAnd => "&&",
            BinaryOp::LogicalOr => "||",
            BinaryOp::LogicalXor => "^^",
            BinaryOp::Dot => ".",
            BinaryOp::Min => "min",
            BinaryOp::Max => "max",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.symbol() == symbol)
    }

    pub fn table(self) -> &'static BinaryTable {
        match self {
            BinaryOp::Plus => &arithmetic::PLUS,
            BinaryOp::Minus => &arithmetic::MINUS,
            BinaryOp::Times => &arithmetic::TIMES,
            BinaryOp::Divide => &arithmetic::DIVIDE,
            BinaryOp::IntDivide => &arithmetic::INT_DIVIDE,
            BinaryOp::Modulus => &arithmetic::MODULUS,
            BinaryOp::Pow => &arithmetic::POW,
            BinaryOp::DotPlus => &arithmetic::DOT_PLUS,
            BinaryOp::DotMinus => &arithmetic::DOT_MINUS,
            BinaryOp::DotTimes => &arithmetic::DOT_TIMES,
            BinaryOp::DotDivide => &arithmetic::DOT_DIVIDE,
            BinaryOp::BitAnd => &bits::BIT_AND,
            BinaryOp::BitOr => &bits::BIT_OR,
            BinaryOp::BitXor => &bits::BIT_XOR,
            BinaryOp::LeftShift => &bits::LEFT_SHIFT,
            BinaryOp::SignedRightShift => &bits::SIGNED_RIGHT_SHIFT,
            BinaryOp::UnsignedRightShift => &bits::UNSIGNED_RIGHT_SHIFT,
            BinaryOp::Eq => &compare::EQ,
            BinaryOp::Ne => &compare::NE,
            BinaryOp::Lt => &compare::LT,
            BinaryOp::Le => &compare::LE,
            BinaryOp::Gt => &compare::GT,
            BinaryOp::Ge => &compare::GE,
            BinaryOp::Cmp => &compare::CMP,
            BinaryOp::LogicalAnd => &logic::AND,
            BinaryOp::LogicalOr => &logic::OR,
            BinaryOp::LogicalXor => &logic::XOR,
            BinaryOp::Dot => &strings::DOT,
            BinaryOp::Min => &collate::MIN,
            BinaryOp::Max => &collate::MAX,
        }
    }

    #[inline]
    pub fn apply(self, a: &Value, b: &Value) -> Value {
        dispatch_binary(self.table(), a, b)
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

// ═══════════════════════════════════════════════════════════════
//  Shared cell dispositions
// ═══════════════════════════════════════════════════════════════

/// Error in, error out. The first Error operand is passed through so its
/// reason survives.
pub(crate) fn err(a: &Value, b: &Value) -> Value {
    if a.is_error() {
        a.clone()
    } else if b.is_error() {
        b.clone()
    } else {
        Value::error()
    }
}

pub(crate) fn te(a: &Value, b: &Value) -> Value {
    Value::error_because(format!("unacceptable operand types {} and {}", a.type_name(), b.type_name()))
}

pub(crate) fn absn(_: &Value, _: &Value) -> Value {
    Value::Absent
}

pub(crate) fn void(_: &Value, _: &Value) -> Value {
    Value::Void
}

pub(crate) fn null(_: &Value, _: &Value) -> Value {
    Value::Null
}

pub(crate) fn ret1(a: &Value, _: &Value) -> Value {
    a.clone()
}

pub(crate) fn ret2(_: &Value, b: &Value) -> Value {
    b.clone()
}

pub(crate) fn u_err(a: &Value) -> Value {
    a.clone()
}

pub(crate) fn u_te(a: &Value) -> Value {
    Value::error_because(format!("unacceptable operand type {}", a.type_name()))
}

pub(crate) fn u_absn(_: &Value) -> Value {
    Value::Absent
}

pub(crate) fn u_void(_: &Value) -> Value {
    Value::Void
}

pub(crate) fn u_null(_: &Value) -> Value {
    Value::Null
}

pub(crate) fn u_ret(a: &Value) -> Value {
    a.clone()
}

// Payload accessors for cells whose operand types are fixed by the table.

#[track_caller]
pub(crate) fn int(v: &Value) -> i64 {
    match v {
        Value::Int(n) => n.get(),
        other => internal_coding_error(format!("int cell reached with {}", other.type_name())),
    }
}

#[track_caller]
pub(crate) fn float(v: &Value) -> f64 {
    match v.as_float() {
        Some(f) => f,
        None => internal_coding_error(format!("numeric cell reached with {}", v.type_name())),
    }
}

#[track_caller]
pub(crate) fn boolean(v: &Value) -> bool {
    match v {
        Value::Bool(b) => *b,
        other => internal_coding_error(format!("boolean cell reached with {}", other.type_name())),
    }
}

/// One representative value per type, for table-completeness checks.
#[cfg(test)]
pub(crate) fn sample(t: ValueType) -> Value {
    use crate::record::Record;
    match t {
        ValueType::Error => Value::error_because("sample"),
        ValueType::Absent => Value::Absent,
        ValueType::Null => Value::Null,
        ValueType::Void => Value::Void,
        ValueType::String => Value::from_string("abc"),
        ValueType::Int => Value::infer("0x10"),
        ValueType::Float => Value::infer("2.50"),
        ValueType::Bool => Value::Bool(true),
        ValueType::Array => Value::from_array(vec![Value::from_int(1)]),
        ValueType::Map => {
            let mut r = Record::new();
            r.put_reference("k", Value::from_int(1));
            Value::Map(r)
        }
    }
}
