//! Bitwise operators. Defined on Int only; Void passes through.

use super::{BinaryTable, UnaryTable, absn, err, int, ret1, ret2, te, u_absn, u_err, u_te, u_void, void};
use crate::value::Value;

fn bit_not_i(a: &Value) -> Value {
    Value::from_int(!int(a))
}

#[rustfmt::skip]
pub(crate) static BIT_NOT: UnaryTable =
    //ERROR  ABSENT  NULL  VOID    STRING INT        FLOAT BOOL  ARRAY   MAP
    [u_err,  u_absn, u_te, u_void, u_te,  bit_not_i, u_te, u_te, u_absn, u_absn];

fn and_ii(a: &Value, b: &Value) -> Value {
    Value::from_int(int(a) & int(b))
}

fn or_ii(a: &Value, b: &Value) -> Value {
    Value::from_int(int(a) | int(b))
}

fn xor_ii(a: &Value, b: &Value) -> Value {
    Value::from_int(int(a) ^ int(b))
}

/// Shift counts outside 0..64 shift everything out.
fn shift_count(b: &Value) -> Option<u32> {
    u32::try_from(int(b)).ok().filter(|&n| n < 64)
}

fn lsh_ii(a: &Value, b: &Value) -> Value {
    let x = int(a);
    Value::from_int(shift_count(b).map_or(0, |n| x << n))
}

fn srsh_ii(a: &Value, b: &Value) -> Value {
    let x = int(a);
    Value::from_int(shift_count(b).map_or(x >> 63, |n| x >> n))
}

fn ursh_ii(a: &Value, b: &Value) -> Value {
    let x = int(a) as u64;
    Value::from_int(shift_count(b).map_or(0, |n| (x >> n) as i64))
}

#[rustfmt::skip]
pub(crate) static BIT_AND: BinaryTable = [
    //           ERROR ABSENT NULL  VOID  STRING INT     FLOAT BOOL  ARRAY MAP
    /*ERROR */  [err,  err,   err,  err,  err,   err,    err,  err,  err,  err ],
    /*ABSENT*/  [err,  absn,  te,   ret2, te,    ret2,   te,   te,   absn, absn],
    /*NULL  */  [err,  te,    te,   te,   te,    te,     te,   te,   absn, absn],
    /*VOID  */  [err,  ret1,  te,   void, te,    void,   te,   te,   absn, absn],
    /*STRING*/  [err,  te,    te,   te,   te,    te,     te,   te,   absn, absn],
    /*INT   */  [err,  ret1,  te,   void, te,    and_ii, te,   te,   absn, absn],
    /*FLOAT */  [err,  te,    te,   te,   te,    te,     te,   te,   absn, absn],
    /*BOOL  */  [err,  te,    te,   te,   te,    te,     te,   te,   absn, absn],
    /*ARRAY */  [err,  absn,  absn, absn, absn,  absn,   absn, absn, absn, absn],
    /*MAP   */  [err,  absn,  absn, absn, absn,  absn,   absn, absn, absn, absn],
];

#[rustfmt::skip]
pub(crate) static BIT_OR: BinaryTable = [
    //           ERROR ABSENT NULL  VOID  STRING INT    FLOAT BOOL  ARRAY MAP
    /*ERROR */  [err,  err,   err,  err,  err,   err,   err,  err,  err,  err ],
    /*ABSENT*/  [err,  absn,  te,   ret2, te,    ret2,  te,   te,   absn, absn],
    /*NULL  */  [err,  te,    te,   te,   te,    te,    te,   te,   absn, absn],
    /*VOID  */  [err,  ret1,  te,   void, te,    void,  te,   te,   absn, absn],
    /*STRING*/  [err,  te,    te,   te,   te,    te,    te,   te,   absn, absn],
    /*INT   */  [err,  ret1,  te,   void, te,    or_ii, te,   te,   absn, absn],
    /*FLOAT */  [err,  te,    te,   te,   te,    te,    te,   te,   absn, absn],
    /*BOOL  */  [err,  te,    te,   te,   te,    te,    te,   te,   absn, absn],
    /*ARRAY */  [err,  absn,  absn, absn, absn,  absn,  absn, absn, absn, absn],
    /*MAP   */  [err,  absn,  absn, absn, absn,  absn,  absn, absn, absn, absn],
];

#[rustfmt::skip]
pub(crate) static BIT_XOR: BinaryTable = [
    //           ERROR ABSENT NULL  VOID  STRING INT     FLOAT BOOL  ARRAY MAP
    /*ERROR */  [err,  err,   err,  err,  err,   err,    err,  err,  err,  err ],
    /*ABSENT*/  [err,  absn,  te,   ret2, te,    ret2,   te,   te,   absn, absn],
    /*NULL  */  [err,  te,    te,   te,   te,    te,     te,   te,   absn, absn],
    /*VOID  */  [err,  ret1,  te,   void, te,    void,   te,   te,   absn, absn],
    /*STRING*/  [err,  te,    te,   te,   te,    te,     te,   te,   absn, absn],
    /*INT   */  [err,  ret1,  te,   void, te,    xor_ii, te,   te,   absn, absn],
    /*FLOAT */  [err,  te,    te,   te,   te,    te,     te,   te,   absn, absn],
    /*BOOL  */  [err,  te,    te,   te,   te,    te,     te,   te,   absn, absn],
    /*ARRAY */  [err,  absn,  absn, absn, absn,  absn,   absn, absn, absn, absn],
    /*MAP   */  [err,  absn,  absn, absn, absn,  absn,   absn, absn, absn, absn],
];

#[rustfmt::skip]
pub(crate) static LEFT_SHIFT: BinaryTable = [
    //           ERROR ABSENT NULL  VOID  STRING INT     FLOAT BOOL  ARRAY MAP
    /*ERROR */  [err,  err,   err,  err,  err,   err,    err,  err,  err,  err ],
    /*ABSENT*/  [err,  absn,  te,   ret2, te,    ret2,   te,   te,   absn, absn],
    /*NULL  */  [err,  te,    te,   te,   te,    te,     te,   te,   absn, absn],
    /*VOID  */  [err,  ret1,  te,   void, te,    void,   te,   te,   absn, absn],
    /*STRING*/  [err,  te,    te,   te,   te,    te,     te,   te,   absn, absn],
    /*INT   */  [err,  ret1,  te,   void, te,    lsh_ii, te,   te,   absn, absn],
    /*FLOAT */  [err,  te,    te,   te,   te,    te,     te,   te,   absn, absn],
    /*BOOL  */  [err,  te,    te,   te,   te,    te,     te,   te,   absn, absn],
    /*ARRAY */  [err,  absn,  absn, absn, absn,  absn,   absn, absn, absn, absn],
    /*MAP   */  [err,  absn,  absn, absn, absn,  absn,   absn, absn, absn, absn],
];

#[rustfmt::skip]
pub(crate) static SIGNED_RIGHT_SHIFT: BinaryTable = [
    //           ERROR ABSENT NULL  VOID  STRING INT      FLOAT BOOL  ARRAY MAP
    /*ERROR */  [err,  err,   err,  err,  err,   err,     err,  err,  err,  err ],
    /*ABSENT*/  [err,  absn,  te,   ret2, te,    ret2,    te,   te,   absn, absn],
    /*NULL  */  [err,  te,    te,   te,   te,    te,      te,   te,   absn, absn],
    /*VOID  */  [err,  ret1,  te,   void, te,    void,    te,   te,   absn, absn],
    /*STRING*/  [err,  te,    te,   te,   te,    te,      te,   te,   absn, absn],
    /*INT   */  [err,  ret1,  te,   void, te,    srsh_ii, te,   te,   absn, absn],
    /*FLOAT */  [err,  te,    te,   te,   te,    te,      te,   te,   absn, absn],
    /*BOOL  */  [err,  te,    te,   te,   te,    te,      te,   te,   absn, absn],
    /*ARRAY */  [err,  absn,  absn, absn, absn,  absn,    absn, absn, absn, absn],
    /*MAP   */  [err,  absn,  absn, absn, absn,  absn,    absn, absn, absn, absn],
];

#[rustfmt::skip]
pub(crate) static UNSIGNED_RIGHT_SHIFT: BinaryTable = [
    //           ERROR ABSENT NULL  VOID  STRING INT      FLOAT BOOL  ARRAY MAP
    /*ERROR */  [err,  err,   err,  err,  err,   err,     err,  err,  err,  err ],
    /*ABSENT*/  [err,  absn,  te,   ret2, te,    ret2,    te,   te,   absn, absn],
    /*NULL  */  [err,  te,    te,   te,   te,    te,      te,   te,   absn, absn],
    /*VOID  */  [err,  ret1,  te,   void, te,    void,    te,   te,   absn, absn],
    /*STRING*/  [err,  te,    te,   te,   te,    te,      te,   te,   absn, absn],
    /*INT   */  [err,  ret1,  te,   void, te,    ursh_ii, te,   te,   absn, absn],
    /*FLOAT */  [err,  te,    te,   te,   te,    te,      te,   te,   absn, absn],
    /*BOOL  */  [err,  te,    te,   te,   te,    te,      te,   te,   absn, absn],
    /*ARRAY */  [err,  absn,  absn, absn, absn,  absn,    absn, absn, absn, absn],
    /*MAP   */  [err,  absn,  absn, absn, absn,  absn,    absn, absn, absn, absn],
];
