//! Dot operator: string concatenation of print representations.
//! Void, Null and Absent act as the empty string; collections are errors.

use super::{BinaryTable, absn, err, ret1, ret2, te, void};
use crate::value::Value;

fn dot_xx(a: &Value, b: &Value) -> Value {
    let mut out = a.render().into_owned();
    out.push_str(&b.render());
    Value::from_string(out)
}

/// First operand as a string.
fn s1(a: &Value, _: &Value) -> Value {
    Value::from_string(a.render().into_owned())
}

/// Second operand as a string.
fn s2(_: &Value, b: &Value) -> Value {
    Value::from_string(b.render().into_owned())
}

#[rustfmt::skip]
pub(crate) static DOT: BinaryTable = [
    //           ERROR ABSENT NULL  VOID  STRING INT    FLOAT  BOOL   ARRAY MAP
    /*ERROR */  [err,  err,   err,  err,  err,   err,   err,   err,   err,  err],
    /*ABSENT*/  [err,  absn,  ret2, ret2, s2,    s2,    s2,    s2,    te,   te ],
    /*NULL  */  [err,  ret1,  ret1, ret2, s2,    s2,    s2,    s2,    te,   te ],
    /*VOID  */  [err,  ret1,  ret1, void, s2,    s2,    s2,    s2,    te,   te ],
    /*STRING*/  [err,  s1,    s1,   s1,   dot_xx, dot_xx, dot_xx, dot_xx, te, te ],
    /*INT   */  [err,  s1,    s1,   s1,   dot_xx, dot_xx, dot_xx, dot_xx, te, te ],
    /*FLOAT */  [err,  s1,    s1,   s1,   dot_xx, dot_xx, dot_xx, dot_xx, te, te ],
    /*BOOL  */  [err,  s1,    s1,   s1,   dot_xx, dot_xx, dot_xx, dot_xx, te, te ],
    /*ARRAY */  [err,  te,    te,   te,   te,    te,    te,    te,    te,   te ],
    /*MAP   */  [err,  te,    te,   te,   te,    te,    te,    te,    te,   te ],
];
