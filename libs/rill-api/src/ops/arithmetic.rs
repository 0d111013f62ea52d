//! Arithmetic operators.
//!
//! Absent is the identity for every operand these operators accept
//! (numbers, Void, Null), so a field that starts absent can be
//! accumulated into. String and boolean operands are type errors.
//! Arrays and maps are not arithmetic operands and yield Absent.
//!
//! `+ - * / // **` keep Int results while they are exact and in range and
//! promote to Float otherwise. The dot operators `.+ .- .* ./` stay in
//! Int and wrap.

use super::{
    BinaryTable, UnaryTable, absn, err, float, int, null, ret1, ret2, te, u_absn, u_err, u_null, u_ret, u_te,
    u_void, void,
};
use crate::value::Value;

// ═══════════════════════════════════════════════════════════════
//  Unary
// ═══════════════════════════════════════════════════════════════

fn neg_i(a: &Value) -> Value {
    let x = int(a);
    match x.checked_neg() {
        Some(n) => Value::from_int(n),
        None => Value::from_float(-(x as f64)),
    }
}

fn neg_f(a: &Value) -> Value {
    Value::from_float(-float(a))
}

#[rustfmt::skip]
pub(crate) static UNARY_PLUS: UnaryTable =
    //ERROR  ABSENT  NULL    VOID    STRING  INT    FLOAT  BOOL  ARRAY   MAP
    [u_err,  u_absn, u_null, u_void, u_te,   u_ret, u_ret, u_te, u_absn, u_absn];

#[rustfmt::skip]
pub(crate) static UNARY_MINUS: UnaryTable =
    //ERROR  ABSENT  NULL    VOID    STRING  INT    FLOAT  BOOL  ARRAY   MAP
    [u_err,  u_absn, u_null, u_void, u_te,   neg_i, neg_f, u_te, u_absn, u_absn];

// ═══════════════════════════════════════════════════════════════
//  Cell implementations
// ═══════════════════════════════════════════════════════════════

/// Negated second operand: `Void - x` is `-x`.
fn neg2(_: &Value, b: &Value) -> Value {
    match b {
        Value::Int(_) => neg_i(b),
        _ => neg_f(b),
    }
}

fn plus_ii(a: &Value, b: &Value) -> Value {
    let (x, y) = (int(a), int(b));
    match x.checked_add(y) {
        Some(sum) => Value::from_int(sum),
        None => Value::from_float(x as f64 + y as f64),
    }
}

fn plus_ff(a: &Value, b: &Value) -> Value {
    Value::from_float(float(a) + float(b))
}

fn minus_ii(a: &Value, b: &Value) -> Value {
    let (x, y) = (int(a), int(b));
    match x.checked_sub(y) {
        Some(diff) => Value::from_int(diff),
        None => Value::from_float(x as f64 - y as f64),
    }
}

fn minus_ff(a: &Value, b: &Value) -> Value {
    Value::from_float(float(a) - float(b))
}

fn times_ii(a: &Value, b: &Value) -> Value {
    let (x, y) = (int(a), int(b));
    match x.checked_mul(y) {
        Some(product) => Value::from_int(product),
        None => Value::from_float(x as f64 * y as f64),
    }
}

fn times_ff(a: &Value, b: &Value) -> Value {
    Value::from_float(float(a) * float(b))
}

/// Exact quotients stay Int; anything else is a float quotient.
/// Division by zero gives +Inf, -Inf or NaN rather than an error.
fn divide_ii(a: &Value, b: &Value) -> Value {
    let (x, y) = (int(a), int(b));
    if y == 0 {
        return Value::from_float(x as f64 / y as f64);
    }
    match (x.checked_rem(y), x.checked_div(y)) {
        (Some(0), Some(q)) => Value::from_int(q),
        _ => Value::from_float(x as f64 / y as f64),
    }
}

fn divide_ff(a: &Value, b: &Value) -> Value {
    Value::from_float(float(a) / float(b))
}

/// Floor division.
fn int_divide_ii(a: &Value, b: &Value) -> Value {
    let (x, y) = (int(a), int(b));
    if y == 0 {
        return Value::from_float(x as f64 / y as f64);
    }
    let Some(mut q) = x.checked_div(y) else {
        return Value::from_float((x as f64 / y as f64).floor());
    };
    if x % y != 0 && ((x < 0) != (y < 0)) {
        q -= 1;
    }
    Value::from_int(q)
}

fn int_divide_ff(a: &Value, b: &Value) -> Value {
    Value::from_float((float(a) / float(b)).floor())
}

/// Modulus takes the sign of the divisor.
fn modulus_ii(a: &Value, b: &Value) -> Value {
    let (x, y) = (int(a), int(b));
    if y == 0 {
        return Value::from_float(x as f64 / y as f64);
    }
    let mut m = x.wrapping_rem(y);
    if m != 0 && ((m < 0) != (y < 0)) {
        m += y;
    }
    Value::from_int(m)
}

fn modulus_ff(a: &Value, b: &Value) -> Value {
    let (x, y) = (float(a), float(b));
    let mut m = x % y;
    if m != 0.0 && ((m < 0.0) != (y < 0.0)) {
        m += y;
    }
    Value::from_float(m)
}

fn pow_ii(a: &Value, b: &Value) -> Value {
    let (x, y) = (int(a), int(b));
    if let Ok(exp) = u32::try_from(y) {
        if let Some(p) = x.checked_pow(exp) {
            return Value::from_int(p);
        }
    }
    Value::from_float((x as f64).powf(y as f64))
}

fn pow_ff(a: &Value, b: &Value) -> Value {
    Value::from_float(float(a).powf(float(b)))
}

fn dot_plus_ii(a: &Value, b: &Value) -> Value {
    Value::from_int(int(a).wrapping_add(int(b)))
}

fn dot_minus_ii(a: &Value, b: &Value) -> Value {
    Value::from_int(int(a).wrapping_sub(int(b)))
}

fn dot_times_ii(a: &Value, b: &Value) -> Value {
    Value::from_int(int(a).wrapping_mul(int(b)))
}

/// Truncating integer division.
fn dot_divide_ii(a: &Value, b: &Value) -> Value {
    let (x, y) = (int(a), int(b));
    if y == 0 {
        return Value::from_float(x as f64 / y as f64);
    }
    Value::from_int(x.wrapping_div(y))
}

// ═══════════════════════════════════════════════════════════════
//  Tables
// ═══════════════════════════════════════════════════════════════

#[rustfmt::skip]
pub(crate) static PLUS: BinaryTable = [
    //           ERROR ABSENT NULL  VOID  STRING INT      FLOAT    BOOL  ARRAY MAP
    /*ERROR */  [err,  err,   err,  err,  err,   err,     err,     err,  err,  err ],
    /*ABSENT*/  [err,  absn,  ret2, ret2, te,    ret2,    ret2,    te,   absn, absn],
    /*NULL  */  [err,  ret1,  null, te,   te,    ret2,    ret2,    te,   absn, absn],
    /*VOID  */  [err,  ret1,  te,   void, te,    ret2,    ret2,    te,   absn, absn],
    /*STRING*/  [err,  te,    te,   te,   te,    te,      te,      te,   absn, absn],
    /*INT   */  [err,  ret1,  ret1, ret1, te,    plus_ii, plus_ff, te,   absn, absn],
    /*FLOAT */  [err,  ret1,  ret1, ret1, te,    plus_ff, plus_ff, te,   absn, absn],
    /*BOOL  */  [err,  te,    te,   te,   te,    te,      te,      te,   absn, absn],
    /*ARRAY */  [err,  absn,  absn, absn, absn,  absn,    absn,    absn, absn, absn],
    /*MAP   */  [err,  absn,  absn, absn, absn,  absn,    absn,    absn, absn, absn],
];

#[rustfmt::skip]
pub(crate) static MINUS: BinaryTable = [
    //           ERROR ABSENT NULL  VOID  STRING INT       FLOAT     BOOL  ARRAY MAP
    /*ERROR */  [err,  err,   err,  err,  err,   err,      err,      err,  err,  err ],
    /*ABSENT*/  [err,  absn,  ret2, ret2, te,    ret2,     ret2,     te,   absn, absn],
    /*NULL  */  [err,  ret1,  null, te,   te,    ret2,     ret2,     te,   absn, absn],
    /*VOID  */  [err,  ret1,  te,   void, te,    neg2,     neg2,     te,   absn, absn],
    /*STRING*/  [err,  te,    te,   te,   te,    te,       te,       te,   absn, absn],
    /*INT   */  [err,  ret1,  ret1, ret1, te,    minus_ii, minus_ff, te,   absn, absn],
    /*FLOAT */  [err,  ret1,  ret1, ret1, te,    minus_ff, minus_ff, te,   absn, absn],
    /*BOOL  */  [err,  te,    te,   te,   te,    te,       te,       te,   absn, absn],
    /*ARRAY */  [err,  absn,  absn, absn, absn,  absn,     absn,     absn, absn, absn],
    /*MAP   */  [err,  absn,  absn, absn, absn,  absn,     absn,     absn, absn, absn],
];

#[rustfmt::skip]
pub(crate) static TIMES: BinaryTable = [
    //           ERROR ABSENT NULL  VOID  STRING INT       FLOAT     BOOL  ARRAY MAP
    /*ERROR */  [err,  err,   err,  err,  err,   err,      err,      err,  err,  err ],
    /*ABSENT*/  [err,  absn,  ret2, ret2, te,    ret2,     ret2,     te,   absn, absn],
    /*NULL  */  [err,  ret1,  null, te,   te,    ret2,     ret2,     te,   absn, absn],
    /*VOID  */  [err,  ret1,  te,   void, te,    ret2,     ret2,     te,   absn, absn],
    /*STRING*/  [err,  te,    te,   te,   te,    te,       te,       te,   absn, absn],
    /*INT   */  [err,  ret1,  ret1, ret1, te,    times_ii, times_ff, te,   absn, absn],
    /*FLOAT */  [err,  ret1,  ret1, ret1, te,    times_ff, times_ff, te,   absn, absn],
    /*BOOL  */  [err,  te,    te,   te,   te,    te,       te,       te,   absn, absn],
    /*ARRAY */  [err,  absn,  absn, absn, absn,  absn,     absn,     absn, absn, absn],
    /*MAP   */  [err,  absn,  absn, absn, absn,  absn,     absn,     absn, absn, absn],
];

#[rustfmt::skip]
pub(crate) static DIVIDE: BinaryTable = [
    //           ERROR ABSENT NULL  VOID  STRING INT        FLOAT      BOOL  ARRAY MAP
    /*ERROR */  [err,  err,   err,  err,  err,   err,       err,       err,  err,  err ],
    /*ABSENT*/  [err,  absn,  ret2, ret2, te,    ret2,      ret2,      te,   absn, absn],
    /*NULL  */  [err,  ret1,  null, te,   te,    ret2,      ret2,      te,   absn, absn],
    /*VOID  */  [err,  ret1,  te,   void, te,    void,      void,      te,   absn, absn],
    /*STRING*/  [err,  te,    te,   te,   te,    te,        te,        te,   absn, absn],
    /*INT   */  [err,  ret1,  ret1, void, te,    divide_ii, divide_ff, te,   absn, absn],
    /*FLOAT */  [err,  ret1,  ret1, void, te,    divide_ff, divide_ff, te,   absn, absn],
    /*BOOL  */  [err,  te,    te,   te,   te,    te,        te,        te,   absn, absn],
    /*ARRAY */  [err,  absn,  absn, absn, absn,  absn,      absn,      absn, absn, absn],
    /*MAP   */  [err,  absn,  absn, absn, absn,  absn,      absn,      absn, absn, absn],
];

#[rustfmt::skip]
pub(crate) static INT_DIVIDE: BinaryTable = [
    //           ERROR ABSENT NULL  VOID  STRING INT            FLOAT          BOOL  ARRAY MAP
    /*ERROR */  [err,  err,   err,  err,  err,   err,           err,           err,  err,  err ],
    /*ABSENT*/  [err,  absn,  ret2, ret2, te,    ret2,          ret2,          te,   absn, absn],
    /*NULL  */  [err,  ret1,  null, te,   te,    ret2,          ret2,          te,   absn, absn],
    /*VOID  */  [err,  ret1,  te,   void, te,    void,          void,          te,   absn, absn],
    /*STRING*/  [err,  te,    te,   te,   te,    te,            te,            te,   absn, absn],
    /*INT   */  [err,  ret1,  ret1, void, te,    int_divide_ii, int_divide_ff, te,   absn, absn],
    /*FLOAT */  [err,  ret1,  ret1, void, te,    int_divide_ff, int_divide_ff, te,   absn, absn],
    /*BOOL  */  [err,  te,    te,   te,   te,    te,            te,            te,   absn, absn],
    /*ARRAY */  [err,  absn,  absn, absn, absn,  absn,          absn,          absn, absn, absn],
    /*MAP   */  [err,  absn,  absn, absn, absn,  absn,          absn,          absn, absn, absn],
];

#[rustfmt::skip]
pub(crate) static MODULUS: BinaryTable = [
    //           ERROR ABSENT NULL  VOID  STRING INT         FLOAT       BOOL  ARRAY MAP
    /*ERROR */  [err,  err,   err,  err,  err,   err,        err,        err,  err,  err ],
    /*ABSENT*/  [err,  absn,  ret2, ret2, te,    ret2,       ret2,       te,   absn, absn],
    /*NULL  */  [err,  ret1,  null, te,   te,    ret2,       ret2,       te,   absn, absn],
    /*VOID  */  [err,  ret1,  te,   void, te,    void,       void,       te,   absn, absn],
    /*STRING*/  [err,  te,    te,   te,   te,    te,         te,         te,   absn, absn],
    /*INT   */  [err,  ret1,  ret1, void, te,    modulus_ii, modulus_ff, te,   absn, absn],
    /*FLOAT */  [err,  ret1,  ret1, void, te,    modulus_ff, modulus_ff, te,   absn, absn],
    /*BOOL  */  [err,  te,    te,   te,   te,    te,         te,         te,   absn, absn],
    /*ARRAY */  [err,  absn,  absn, absn, absn,  absn,       absn,       absn, absn, absn],
    /*MAP   */  [err,  absn,  absn, absn, absn,  absn,       absn,       absn, absn, absn],
];

#[rustfmt::skip]
pub(crate) static POW: BinaryTable = [
    //           ERROR ABSENT NULL  VOID  STRING INT     FLOAT   BOOL  ARRAY MAP
    /*ERROR */  [err,  err,   err,  err,  err,   err,    err,    err,  err,  err ],
    /*ABSENT*/  [err,  absn,  ret2, ret2, te,    ret2,   ret2,   te,   absn, absn],
    /*NULL  */  [err,  ret1,  null, te,   te,    ret2,   ret2,   te,   absn, absn],
    /*VOID  */  [err,  ret1,  te,   void, te,    void,   void,   te,   absn, absn],
    /*STRING*/  [err,  te,    te,   te,   te,    te,     te,     te,   absn, absn],
    /*INT   */  [err,  ret1,  ret1, void, te,    pow_ii, pow_ff, te,   absn, absn],
    /*FLOAT */  [err,  ret1,  ret1, void, te,    pow_ff, pow_ff, te,   absn, absn],
    /*BOOL  */  [err,  te,    te,   te,   te,    te,     te,     te,   absn, absn],
    /*ARRAY */  [err,  absn,  absn, absn, absn,  absn,   absn,   absn, absn, absn],
    /*MAP   */  [err,  absn,  absn, absn, absn,  absn,   absn,   absn, absn, absn],
];

#[rustfmt::skip]
pub(crate) static DOT_PLUS: BinaryTable = [
    //           ERROR ABSENT NULL  VOID  STRING INT          FLOAT    BOOL  ARRAY MAP
    /*ERROR */  [err,  err,   err,  err,  err,   err,         err,     err,  err,  err ],
    /*ABSENT*/  [err,  absn,  ret2, ret2, te,    ret2,        ret2,    te,   absn, absn],
    /*NULL  */  [err,  ret1,  null, te,   te,    ret2,        ret2,    te,   absn, absn],
    /*VOID  */  [err,  ret1,  te,   void, te,    ret2,        ret2,    te,   absn, absn],
    /*STRING*/  [err,  te,    te,   te,   te,    te,          te,      te,   absn, absn],
    /*INT   */  [err,  ret1,  ret1, ret1, te,    dot_plus_ii, plus_ff, te,   absn, absn],
    /*FLOAT */  [err,  ret1,  ret1, ret1, te,    plus_ff,     plus_ff, te,   absn, absn],
    /*BOOL  */  [err,  te,    te,   te,   te,    te,          te,      te,   absn, absn],
    /*ARRAY */  [err,  absn,  absn, absn, absn,  absn,        absn,    absn, absn, absn],
    /*MAP   */  [err,  absn,  absn, absn, absn,  absn,        absn,    absn, absn, absn],
];

#[rustfmt::skip]
pub(crate) static DOT_MINUS: BinaryTable = [
    //           ERROR ABSENT NULL  VOID  STRING INT           FLOAT     BOOL  ARRAY MAP
    /*ERROR */  [err,  err,   err,  err,  err,   err,          err,      err,  err,  err ],
    /*ABSENT*/  [err,  absn,  ret2, ret2, te,    ret2,         ret2,     te,   absn, absn],
    /*NULL  */  [err,  ret1,  null, te,   te,    ret2,         ret2,     te,   absn, absn],
    /*VOID  */  [err,  ret1,  te,   void, te,    neg2,         neg2,     te,   absn, absn],
    /*STRING*/  [err,  te,    te,   te,   te,    te,           te,       te,   absn, absn],
    /*INT   */  [err,  ret1,  ret1, ret1, te,    dot_minus_ii, minus_ff, te,   absn, absn],
    /*FLOAT */  [err,  ret1,  ret1, ret1, te,    minus_ff,     minus_ff, te,   absn, absn],
    /*BOOL  */  [err,  te,    te,   te,   te,    te,           te,       te,   absn, absn],
    /*ARRAY */  [err,  absn,  absn, absn, absn,  absn,         absn,     absn, absn, absn],
    /*MAP   */  [err,  absn,  absn, absn, absn,  absn,         absn,     absn, absn, absn],
];

#[rustfmt::skip]
pub(crate) static DOT_TIMES: BinaryTable = [
    //           ERROR ABSENT NULL  VOID  STRING INT           FLOAT     BOOL  ARRAY MAP
    /*ERROR */  [err,  err,   err,  err,  err,   err,          err,      err,  err,  err ],
    /*ABSENT*/  [err,  absn,  ret2, ret2, te,    ret2,         ret2,     te,   absn, absn],
    /*NULL  */  [err,  ret1,  null, te,   te,    ret2,         ret2,     te,   absn, absn],
    /*VOID  */  [err,  ret1,  te,   void, te,    ret2,         ret2,     te,   absn, absn],
    /*STRING*/  [err,  te,    te,   te,   te,    te,           te,       te,   absn, absn],
    /*INT   */  [err,  ret1,  ret1, ret1, te,    dot_times_ii, times_ff, te,   absn, absn],
    /*FLOAT */  [err,  ret1,  ret1, ret1, te,    times_ff,     times_ff, te,   absn, absn],
    /*BOOL  */  [err,  te,    te,   te,   te,    te,           te,       te,   absn, absn],
    /*ARRAY */  [err,  absn,  absn, absn, absn,  absn,         absn,     absn, absn, absn],
    /*MAP   */  [err,  absn,  absn, absn, absn,  absn,         absn,     absn, absn, absn],
];

#[rustfmt::skip]
pub(crate) static DOT_DIVIDE: BinaryTable = [
    //           ERROR ABSENT NULL  VOID  STRING INT            FLOAT      BOOL  ARRAY MAP
    /*ERROR */  [err,  err,   err,  err,  err,   err,           err,       err,  err,  err ],
    /*ABSENT*/  [err,  absn,  ret2, ret2, te,    ret2,          ret2,      te,   absn, absn],
    /*NULL  */  [err,  ret1,  null, te,   te,    ret2,          ret2,      te,   absn, absn],
    /*VOID  */  [err,  ret1,  te,   void, te,    void,          void,      te,   absn, absn],
    /*STRING*/  [err,  te,    te,   te,   te,    te,            te,        te,   absn, absn],
    /*INT   */  [err,  ret1,  ret1, void, te,    dot_divide_ii, divide_ff, te,   absn, absn],
    /*FLOAT */  [err,  ret1,  ret1, void, te,    divide_ff,     divide_ff, te,   absn, absn],
    /*BOOL  */  [err,  te,    te,   te,   te,    te,            te,        te,   absn, absn],
    /*ARRAY */  [err,  absn,  absn, absn, absn,  absn,          absn,      absn, absn, absn],
    /*MAP   */  [err,  absn,  absn, absn, absn,  absn,          absn,      absn, absn, absn],
];

#[cfg(test)]
mod tests {
    use super::super::{BinaryOp, UnaryOp};
    use crate::value::{Value, ValueType};

    fn apply(op: BinaryOp, a: &Value, b: &Value) -> Value {
        op.apply(a, b)
    }

    #[test]
    fn integer_overflow_promotes_to_float() {
        let max = Value::from_int(i64::MAX);
        let one = Value::from_int(1);
        let sum = apply(BinaryOp::Plus, &max, &one);
        assert_eq!(sum.value_type(), ValueType::Float);
        assert_eq!(sum.as_float(), Some(i64::MAX as f64 + 1.0));

        let diff = apply(BinaryOp::Minus, &Value::from_int(i64::MIN), &one);
        assert_eq!(diff.value_type(), ValueType::Float);

        let product = apply(BinaryOp::Times, &max, &Value::from_int(2));
        assert_eq!(product.value_type(), ValueType::Float);
    }

    #[test]
    fn dot_operators_wrap() {
        let max = Value::from_int(i64::MAX);
        let one = Value::from_int(1);
        assert_eq!(apply(BinaryOp::DotPlus, &max, &one), Value::from_int(i64::MIN));
        assert_eq!(apply(BinaryOp::DotTimes, &max, &Value::from_int(2)), Value::from_int(-2));
        assert_eq!(apply(BinaryOp::DotDivide, &Value::from_int(7), &Value::from_int(2)), Value::from_int(3));
        assert_eq!(apply(BinaryOp::DotDivide, &Value::from_int(-7), &Value::from_int(2)), Value::from_int(-3));
    }

    #[test]
    fn absent_is_identity_for_numbers_and_keeps_printrep() {
        for x in [Value::infer("0x1F"), Value::infer("1.50"), Value::infer("007")] {
            for op in [BinaryOp::Plus, BinaryOp::Minus, BinaryOp::Times, BinaryOp::Divide] {
                let left = apply(op, &Value::Absent, &x);
                let right = apply(op, &x, &Value::Absent);
                assert_eq!(left.value_type(), x.value_type());
                assert_eq!(left.render(), x.render());
                assert_eq!(right.render(), x.render());
            }
        }
    }

    #[test]
    fn mixed_int_float_is_float() {
        let out = apply(BinaryOp::Plus, &Value::from_int(1), &Value::from_float(0.5));
        assert_eq!(out, Value::from_float(1.5));
        let out = apply(BinaryOp::Times, &Value::from_float(2.0), &Value::from_int(3));
        assert_eq!(out.value_type(), ValueType::Float);
    }

    #[test]
    fn division_is_exact_or_float() {
        assert_eq!(apply(BinaryOp::Divide, &Value::from_int(6), &Value::from_int(2)), Value::from_int(3));
        assert_eq!(apply(BinaryOp::Divide, &Value::from_int(7), &Value::from_int(2)), Value::from_float(3.5));
        let inf = apply(BinaryOp::Divide, &Value::from_int(1), &Value::from_int(0));
        assert_eq!(inf.render(), "+Inf");
        let nan = apply(BinaryOp::Divide, &Value::from_int(0), &Value::from_int(0));
        assert_eq!(nan.render(), "NaN");
        let min_over_minus_one = apply(BinaryOp::Divide, &Value::from_int(i64::MIN), &Value::from_int(-1));
        assert_eq!(min_over_minus_one.value_type(), ValueType::Float);
    }

    #[test]
    fn floor_division_and_modulus_follow_the_divisor_sign() {
        assert_eq!(apply(BinaryOp::IntDivide, &Value::from_int(7), &Value::from_int(2)), Value::from_int(3));
        assert_eq!(apply(BinaryOp::IntDivide, &Value::from_int(-7), &Value::from_int(2)), Value::from_int(-4));
        assert_eq!(apply(BinaryOp::IntDivide, &Value::from_float(-7.0), &Value::from_int(2)), Value::from_float(-4.0));
        assert_eq!(apply(BinaryOp::Modulus, &Value::from_int(-7), &Value::from_int(5)), Value::from_int(3));
        assert_eq!(apply(BinaryOp::Modulus, &Value::from_int(7), &Value::from_int(-5)), Value::from_int(-3));
        assert_eq!(apply(BinaryOp::Modulus, &Value::from_float(-7.5), &Value::from_int(5)), Value::from_float(2.5));
    }

    #[test]
    fn pow_stays_int_when_exact() {
        assert_eq!(apply(BinaryOp::Pow, &Value::from_int(2), &Value::from_int(10)), Value::from_int(1024));
        assert_eq!(apply(BinaryOp::Pow, &Value::from_int(2), &Value::from_int(-1)), Value::from_float(0.5));
        assert_eq!(apply(BinaryOp::Pow, &Value::from_int(2), &Value::from_int(64)).value_type(), ValueType::Float);
    }

    #[test]
    fn void_rules() {
        let five = Value::from_int(5);
        assert_eq!(apply(BinaryOp::Plus, &Value::Void, &five), five);
        assert_eq!(apply(BinaryOp::Plus, &five, &Value::Void), five);
        assert_eq!(apply(BinaryOp::Minus, &Value::Void, &five), Value::from_int(-5));
        assert_eq!(apply(BinaryOp::Divide, &five, &Value::Void), Value::Void);
        assert_eq!(apply(BinaryOp::Plus, &Value::Void, &Value::Void), Value::Void);
    }

    #[test]
    fn strings_and_bools_are_errors_collections_absent() {
        assert!(apply(BinaryOp::Plus, &Value::from_string("a"), &Value::from_int(1)).is_error());
        assert!(apply(BinaryOp::Times, &Value::Bool(true), &Value::from_int(1)).is_error());
        assert!(apply(BinaryOp::Plus, &Value::from_array(vec![]), &Value::from_int(1)).is_absent());
    }

    #[test]
    fn unary_minus() {
        assert_eq!(UnaryOp::Minus.apply(&Value::from_int(3)), Value::from_int(-3));
        assert_eq!(UnaryOp::Minus.apply(&Value::from_int(i64::MIN)).value_type(), ValueType::Float);
        assert_eq!(UnaryOp::Minus.apply(&Value::Void), Value::Void);
        assert!(UnaryOp::Minus.apply(&Value::from_string("x")).is_error());
        assert_eq!(UnaryOp::Plus.apply(&Value::infer("0x10")).render(), "0x10");
    }
}
