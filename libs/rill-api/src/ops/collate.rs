//! Binary `min` and `max` across mixed types, as used by aggregators.
//!
//! Ordering is numbers < booleans < Void < strings, except that Void never
//! wins against a number: an empty cell must not mask numeric data in
//! either direction. Absent and Null are identities. The winning operand
//! is returned unchanged, print representation included.

use std::cmp::Ordering;

use super::{BinaryTable, absn, boolean, err, float, int, ret1, ret2, void};
use crate::value::Value;

fn numeric(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Int(_), Value::Int(_)) => int(a).cmp(&int(b)),
        _ => float(a).partial_cmp(&float(b)).unwrap_or(Ordering::Equal),
    }
}

fn min_nn(a: &Value, b: &Value) -> Value {
    if numeric(a, b) == Ordering::Greater { b.clone() } else { a.clone() }
}

fn max_nn(a: &Value, b: &Value) -> Value {
    if numeric(a, b) == Ordering::Less { b.clone() } else { a.clone() }
}

fn min_ss(a: &Value, b: &Value) -> Value {
    if a.render() > b.render() { b.clone() } else { a.clone() }
}

fn max_ss(a: &Value, b: &Value) -> Value {
    if a.render() < b.render() { b.clone() } else { a.clone() }
}

fn min_bb(a: &Value, b: &Value) -> Value {
    Value::Bool(boolean(a) && boolean(b))
}

fn max_bb(a: &Value, b: &Value) -> Value {
    Value::Bool(boolean(a) || boolean(b))
}

#[rustfmt::skip]
pub(crate) static MIN: BinaryTable = [
    //           ERROR ABSENT NULL  VOID  STRING  INT     FLOAT   BOOL    ARRAY MAP
    /*ERROR */  [err,  err,   err,  err,  err,    err,    err,    err,    err,  err ],
    /*ABSENT*/  [err,  absn,  ret2, ret2, ret2,   ret2,   ret2,   ret2,   absn, absn],
    /*NULL  */  [err,  ret1,  ret1, ret2, ret2,   ret2,   ret2,   ret2,   absn, absn],
    /*VOID  */  [err,  ret1,  ret1, void, ret1,   ret2,   ret2,   ret2,   absn, absn],
    /*STRING*/  [err,  ret1,  ret1, ret2, min_ss, ret2,   ret2,   ret2,   absn, absn],
    /*INT   */  [err,  ret1,  ret1, ret1, ret1,   min_nn, min_nn, ret1,   absn, absn],
    /*FLOAT */  [err,  ret1,  ret1, ret1, ret1,   min_nn, min_nn, ret1,   absn, absn],
    /*BOOL  */  [err,  ret1,  ret1, ret1, ret1,   ret2,   ret2,   min_bb, absn, absn],
    /*ARRAY */  [err,  absn,  absn, absn, absn,   absn,   absn,   absn,   absn, absn],
    /*MAP   */  [err,  absn,  absn, absn, absn,   absn,   absn,   absn,   absn, absn],
];

#[rustfmt::skip]
pub(crate) static MAX: BinaryTable = [
    //           ERROR ABSENT NULL  VOID  STRING  INT     FLOAT   BOOL    ARRAY MAP
    /*ERROR */  [err,  err,   err,  err,  err,    err,    err,    err,    err,  err ],
    /*ABSENT*/  [err,  absn,  ret2, ret2, ret2,   ret2,   ret2,   ret2,   absn, absn],
    /*NULL  */  [err,  ret1,  ret1, ret2, ret2,   ret2,   ret2,   ret2,   absn, absn],
    /*VOID  */  [err,  ret1,  ret1, void, ret2,   ret2,   ret2,   ret1,   absn, absn],
    /*STRING*/  [err,  ret1,  ret1, ret1, max_ss, ret1,   ret1,   ret1,   absn, absn],
    /*INT   */  [err,  ret1,  ret1, ret1, ret2,   max_nn, max_nn, ret2,   absn, absn],
    /*FLOAT */  [err,  ret1,  ret1, ret1, ret2,   max_nn, max_nn, ret2,   absn, absn],
    /*BOOL  */  [err,  ret1,  ret1, ret2, ret2,   ret1,   ret1,   max_bb, absn, absn],
    /*ARRAY */  [err,  absn,  absn, absn, absn,   absn,   absn,   absn,   absn, absn],
    /*MAP   */  [err,  absn,  absn, absn, absn,   absn,   absn,   absn,   absn, absn],
];
