//! Logical operators over booleans. Absent is the identity; every other
//! non-boolean operand is an error. Short-circuiting belongs to the
//! evaluator: these cells always see both operands.

use super::{BinaryTable, UnaryTable, absn, boolean, err, ret1, ret2, te, u_absn, u_err, u_te};
use crate::value::Value;

fn not_b(a: &Value) -> Value {
    Value::Bool(!boolean(a))
}

#[rustfmt::skip]
pub(crate) static NOT: UnaryTable =
    //ERROR  ABSENT  NULL  VOID  STRING INT   FLOAT BOOL   ARRAY MAP
    [u_err,  u_absn, u_te, u_te, u_te,  u_te, u_te, not_b, u_te, u_te];

fn and_bb(a: &Value, b: &Value) -> Value {
    Value::Bool(boolean(a) && boolean(b))
}

fn or_bb(a: &Value, b: &Value) -> Value {
    Value::Bool(boolean(a) || boolean(b))
}

fn xor_bb(a: &Value, b: &Value) -> Value {
    Value::Bool(boolean(a) != boolean(b))
}

#[rustfmt::skip]
pub(crate) static AND: BinaryTable = [
    //           ERROR ABSENT NULL VOID STRING INT FLOAT BOOL    ARRAY MAP
    /*ERROR */  [err,  err,   err, err, err,   err, err, err,    err,  err],
    /*ABSENT*/  [err,  absn,  te,  te,  te,    te,  te,  ret2,   te,   te ],
    /*NULL  */  [err,  te,    te,  te,  te,    te,  te,  te,     te,   te ],
    /*VOID  */  [err,  te,    te,  te,  te,    te,  te,  te,     te,   te ],
    /*STRING*/  [err,  te,    te,  te,  te,    te,  te,  te,     te,   te ],
    /*INT   */  [err,  te,    te,  te,  te,    te,  te,  te,     te,   te ],
    /*FLOAT */  [err,  te,    te,  te,  te,    te,  te,  te,     te,   te ],
    /*BOOL  */  [err,  ret1,  te,  te,  te,    te,  te,  and_bb, te,   te ],
    /*ARRAY */  [err,  te,    te,  te,  te,    te,  te,  te,     te,   te ],
    /*MAP   */  [err,  te,    te,  te,  te,    te,  te,  te,     te,   te ],
];

#[rustfmt::skip]
pub(crate) static OR: BinaryTable = [
    //           ERROR ABSENT NULL VOID STRING INT FLOAT BOOL   ARRAY MAP
    /*ERROR */  [err,  err,   err, err, err,   err, err, err,   err,  err],
    /*ABSENT*/  [err,  absn,  te,  te,  te,    te,  te,  ret2,  te,   te ],
    /*NULL  */  [err,  te,    te,  te,  te,    te,  te,  te,    te,   te ],
    /*VOID  */  [err,  te,    te,  te,  te,    te,  te,  te,    te,   te ],
    /*STRING*/  [err,  te,    te,  te,  te,    te,  te,  te,    te,   te ],
    /*INT   */  [err,  te,    te,  te,  te,    te,  te,  te,    te,   te ],
    /*FLOAT */  [err,  te,    te,  te,  te,    te,  te,  te,    te,   te ],
    /*BOOL  */  [err,  ret1,  te,  te,  te,    te,  te,  or_bb, te,   te ],
    /*ARRAY */  [err,  te,    te,  te,  te,    te,  te,  te,    te,   te ],
    /*MAP   */  [err,  te,    te,  te,  te,    te,  te,  te,    te,   te ],
];

#[rustfmt::skip]
pub(crate) static XOR: BinaryTable = [
    //           ERROR ABSENT NULL VOID STRING INT FLOAT BOOL    ARRAY MAP
    /*ERROR */  [err,  err,   err, err, err,   err, err, err,    err,  err],
    /*ABSENT*/  [err,  absn,  te,  te,  te,    te,  te,  ret2,   te,   te ],
    /*NULL  */  [err,  te,    te,  te,  te,    te,  te,  te,     te,   te ],
    /*VOID  */  [err,  te,    te,  te,  te,    te,  te,  te,     te,   te ],
    /*STRING*/  [err,  te,    te,  te,  te,    te,  te,  te,     te,   te ],
    /*INT   */  [err,  te,    te,  te,  te,    te,  te,  te,     te,   te ],
    /*FLOAT */  [err,  te,    te,  te,  te,    te,  te,  te,     te,   te ],
    /*BOOL  */  [err,  ret1,  te,  te,  te,    te,  te,  xor_bb, te,   te ],
    /*ARRAY */  [err,  te,    te,  te,  te,    te,  te,  te,     te,   te ],
    /*MAP   */  [err,  te,    te,  te,  te,    te,  te,  te,     te,   te ],
];

#[cfg(test)]
mod tests {
    use crate::ops::{BinaryOp, UnaryOp};
    use crate::value::Value;

    const T: Value = Value::Bool(true);
    const F: Value = Value::Bool(false);

    #[test]
    fn truth_tables() {
        assert_eq!(BinaryOp::LogicalAnd.apply(&T, &F), F);
        assert_eq!(BinaryOp::LogicalOr.apply(&T, &F), T);
        assert_eq!(BinaryOp::LogicalXor.apply(&T, &T), F);
        assert_eq!(UnaryOp::LogicalNot.apply(&F), T);
    }

    #[test]
    fn absent_is_identity_and_others_are_errors() {
        assert_eq!(BinaryOp::LogicalAnd.apply(&Value::Absent, &F), F);
        assert_eq!(BinaryOp::LogicalOr.apply(&T, &Value::Absent), T);
        assert!(BinaryOp::LogicalAnd.apply(&T, &Value::from_int(1)).is_error());
        assert!(BinaryOp::LogicalOr.apply(&Value::from_string("true"), &T).is_error());
        assert!(UnaryOp::LogicalNot.apply(&Value::Void).is_error());
    }
}
