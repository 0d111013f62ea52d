//! Comparison operators.
//!
//! Numbers compare numerically with each other. A number against a string
//! (or Void) is compared lexically using the number's print
//! representation, so `10 < abc` and `"10" < "9"` hold. Booleans only
//! order among themselves, except that Null sorts after every other
//! scalar, booleans included. Absent makes any comparison Absent.

use std::cmp::Ordering;

use super::{BinaryTable, absn, boolean, err, float, int};
use crate::value::Value;

fn t(_: &Value, _: &Value) -> Value {
    Value::Bool(true)
}

fn f(_: &Value, _: &Value) -> Value {
    Value::Bool(false)
}

fn lexical(a: &Value, b: &Value) -> Ordering {
    a.render().as_ref().cmp(b.render().as_ref())
}

fn numeric(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Int(_), Value::Int(_)) => int(a).cmp(&int(b)),
        _ => float(a).partial_cmp(&float(b)).unwrap_or(Ordering::Equal),
    }
}

fn arrays_equal(a: &Value, b: &Value) -> bool {
    match (a.as_array(), b.as_array()) {
        (Some(x), Some(y)) => x.len() == y.len() && x.iter().zip(y).all(|(p, q)| super::values_equal(p, q)),
        _ => false,
    }
}

fn maps_equal(a: &Value, b: &Value) -> bool {
    match (a.as_map(), b.as_map()) {
        (Some(x), Some(y)) => x.equals(y),
        _ => false,
    }
}

/// Cells for one comparison operator: numeric (`_nn`), lexical (`_ss`),
/// boolean (`_bb`).
macro_rules! ordering_cells {
    ($nn:ident, $ss:ident, $bb:ident, $($accept:pat_param)|+) => {
        fn $nn(a: &Value, b: &Value) -> Value {
            // NaN compares unequal to everything.
            if float(a).is_nan() || float(b).is_nan() {
                return Value::Bool(false);
            }
            Value::Bool(matches!(numeric(a, b), $($accept)|+))
        }

        fn $ss(a: &Value, b: &Value) -> Value {
            Value::Bool(matches!(lexical(a, b), $($accept)|+))
        }

        fn $bb(a: &Value, b: &Value) -> Value {
            Value::Bool(matches!(boolean(a).cmp(&boolean(b)), $($accept)|+))
        }
    };
}

ordering_cells!(eq_nn, eq_ss, eq_bb, Ordering::Equal);
ordering_cells!(lt_nn, lt_ss, lt_bb, Ordering::Less);
ordering_cells!(le_nn, le_ss, le_bb, Ordering::Less | Ordering::Equal);
ordering_cells!(gt_nn, gt_ss, gt_bb, Ordering::Greater);
ordering_cells!(ge_nn, ge_ss, ge_bb, Ordering::Greater | Ordering::Equal);

fn ne_nn(a: &Value, b: &Value) -> Value {
    Value::Bool(!matches!(eq_nn(a, b), Value::Bool(true)))
}

fn ne_ss(a: &Value, b: &Value) -> Value {
    Value::Bool(lexical(a, b) != Ordering::Equal)
}

fn ne_bb(a: &Value, b: &Value) -> Value {
    Value::Bool(boolean(a) != boolean(b))
}

fn eq_aa(a: &Value, b: &Value) -> Value {
    Value::Bool(arrays_equal(a, b))
}

fn ne_aa(a: &Value, b: &Value) -> Value {
    Value::Bool(!arrays_equal(a, b))
}

fn eq_mm(a: &Value, b: &Value) -> Value {
    Value::Bool(maps_equal(a, b))
}

fn ne_mm(a: &Value, b: &Value) -> Value {
    Value::Bool(!maps_equal(a, b))
}

fn collection_order(a: &Value, b: &Value) -> Value {
    Value::error_because(format!("cannot order {} against {}", a.type_name(), b.type_name()))
}

#[rustfmt::skip]
pub(crate) static EQ: BinaryTable = [
    //           ERROR ABSENT NULL  VOID   STRING INT    FLOAT  BOOL   ARRAY  MAP
    /*ERROR */  [err,  err,   err,  err,   err,   err,   err,   err,   err,   err  ],
    /*ABSENT*/  [err,  absn,  absn, absn,  absn,  absn,  absn,  absn,  absn,  absn ],
    /*NULL  */  [err,  absn,  t,    f,     f,     f,     f,     f,     f,     f    ],
    /*VOID  */  [err,  absn,  f,    eq_ss, eq_ss, eq_ss, eq_ss, f,     f,     f    ],
    /*STRING*/  [err,  absn,  f,    eq_ss, eq_ss, eq_ss, eq_ss, f,     f,     f    ],
    /*INT   */  [err,  absn,  f,    eq_ss, eq_ss, eq_nn, eq_nn, f,     f,     f    ],
    /*FLOAT */  [err,  absn,  f,    eq_ss, eq_ss, eq_nn, eq_nn, f,     f,     f    ],
    /*BOOL  */  [err,  absn,  f,    f,     f,     f,     f,     eq_bb, f,     f    ],
    /*ARRAY */  [err,  absn,  f,    f,     f,     f,     f,     f,     eq_aa, f    ],
    /*MAP   */  [err,  absn,  f,    f,     f,     f,     f,     f,     f,     eq_mm],
];

#[rustfmt::skip]
pub(crate) static NE: BinaryTable = [
    //           ERROR ABSENT NULL  VOID   STRING INT    FLOAT  BOOL   ARRAY  MAP
    /*ERROR */  [err,  err,   err,  err,   err,   err,   err,   err,   err,   err  ],
    /*ABSENT*/  [err,  absn,  absn, absn,  absn,  absn,  absn,  absn,  absn,  absn ],
    /*NULL  */  [err,  absn,  f,    t,     t,     t,     t,     t,     t,     t    ],
    /*VOID  */  [err,  absn,  t,    ne_ss, ne_ss, ne_ss, ne_ss, t,     t,     t    ],
    /*STRING*/  [err,  absn,  t,    ne_ss, ne_ss, ne_ss, ne_ss, t,     t,     t    ],
    /*INT   */  [err,  absn,  t,    ne_ss, ne_ss, ne_nn, ne_nn, t,     t,     t    ],
    /*FLOAT */  [err,  absn,  t,    ne_ss, ne_ss, ne_nn, ne_nn, t,     t,     t    ],
    /*BOOL  */  [err,  absn,  t,    t,     t,     t,     t,     ne_bb, t,     t    ],
    /*ARRAY */  [err,  absn,  t,    t,     t,     t,     t,     t,     ne_aa, t    ],
    /*MAP   */  [err,  absn,  t,    t,     t,     t,     t,     t,     t,     ne_mm],
];

#[rustfmt::skip]
pub(crate) static LT: BinaryTable = [
    //           ERROR ABSENT NULL  VOID   STRING INT    FLOAT  BOOL   ARRAY  MAP
    /*ERROR */  [err,  err,   err,  err,   err,   err,   err,   err,   err,   err  ],
    /*ABSENT*/  [err,  absn,  absn, absn,  absn,  absn,  absn,  absn,  absn,  absn ],
    /*NULL  */  [err,  absn,  f,    f,     f,     f,     f,     f,     f,     f    ],
    /*VOID  */  [err,  absn,  t,    lt_ss, lt_ss, lt_ss, lt_ss, f,     f,     f    ],
    /*STRING*/  [err,  absn,  t,    lt_ss, lt_ss, lt_ss, lt_ss, f,     f,     f    ],
    /*INT   */  [err,  absn,  t,    lt_ss, lt_ss, lt_nn, lt_nn, f,     f,     f    ],
    /*FLOAT */  [err,  absn,  t,    lt_ss, lt_ss, lt_nn, lt_nn, f,     f,     f    ],
    /*BOOL  */  [err,  absn,  t,    f,     f,     f,     f,     lt_bb, f,     f    ],
    /*ARRAY */  [err,  absn,  f,    f,     f,     f,     f,     f,     collection_order, f],
    /*MAP   */  [err,  absn,  f,    f,     f,     f,     f,     f,     f,     collection_order],
];

#[rustfmt::skip]
pub(crate) static LE: BinaryTable = [
    //           ERROR ABSENT NULL  VOID   STRING INT    FLOAT  BOOL   ARRAY  MAP
    /*ERROR */  [err,  err,   err,  err,   err,   err,   err,   err,   err,   err  ],
    /*ABSENT*/  [err,  absn,  absn, absn,  absn,  absn,  absn,  absn,  absn,  absn ],
    /*NULL  */  [err,  absn,  t,    f,     f,     f,     f,     f,     f,     f    ],
    /*VOID  */  [err,  absn,  t,    le_ss, le_ss, le_ss, le_ss, f,     f,     f    ],
    /*STRING*/  [err,  absn,  t,    le_ss, le_ss, le_ss, le_ss, f,     f,     f    ],
    /*INT   */  [err,  absn,  t,    le_ss, le_ss, le_nn, le_nn, f,     f,     f    ],
    /*FLOAT */  [err,  absn,  t,    le_ss, le_ss, le_nn, le_nn, f,     f,     f    ],
    /*BOOL  */  [err,  absn,  t,    f,     f,     f,     f,     le_bb, f,     f    ],
    /*ARRAY */  [err,  absn,  f,    f,     f,     f,     f,     f,     collection_order, f],
    /*MAP   */  [err,  absn,  f,    f,     f,     f,     f,     f,     f,     collection_order],
];

#[rustfmt::skip]
pub(crate) static GT: BinaryTable = [
    //           ERROR ABSENT NULL  VOID   STRING INT    FLOAT  BOOL   ARRAY  MAP
    /*ERROR */  [err,  err,   err,  err,   err,   err,   err,   err,   err,   err  ],
    /*ABSENT*/  [err,  absn,  absn, absn,  absn,  absn,  absn,  absn,  absn,  absn ],
    /*NULL  */  [err,  absn,  f,    t,     t,     t,     t,     t,     f,     f    ],
    /*VOID  */  [err,  absn,  f,    gt_ss, gt_ss, gt_ss, gt_ss, f,     f,     f    ],
    /*STRING*/  [err,  absn,  f,    gt_ss, gt_ss, gt_ss, gt_ss, f,     f,     f    ],
    /*INT   */  [err,  absn,  f,    gt_ss, gt_ss, gt_nn, gt_nn, f,     f,     f    ],
    /*FLOAT */  [err,  absn,  f,    gt_ss, gt_ss, gt_nn, gt_nn, f,     f,     f    ],
    /*BOOL  */  [err,  absn,  f,    f,     f,     f,     f,     gt_bb, f,     f    ],
    /*ARRAY */  [err,  absn,  f,    f,     f,     f,     f,     f,     collection_order, f],
    /*MAP   */  [err,  absn,  f,    f,     f,     f,     f,     f,     f,     collection_order],
];

#[rustfmt::skip]
pub(crate) static GE: BinaryTable = [
    //           ERROR ABSENT NULL  VOID   STRING INT    FLOAT  BOOL   ARRAY  MAP
    /*ERROR */  [err,  err,   err,  err,   err,   err,   err,   err,   err,   err  ],
    /*ABSENT*/  [err,  absn,  absn, absn,  absn,  absn,  absn,  absn,  absn,  absn ],
    /*NULL  */  [err,  absn,  t,    t,     t,     t,     t,     t,     f,     f    ],
    /*VOID  */  [err,  absn,  f,    ge_ss, ge_ss, ge_ss, ge_ss, f,     f,     f    ],
    /*STRING*/  [err,  absn,  f,    ge_ss, ge_ss, ge_ss, ge_ss, f,     f,     f    ],
    /*INT   */  [err,  absn,  f,    ge_ss, ge_ss, ge_nn, ge_nn, f,     f,     f    ],
    /*FLOAT */  [err,  absn,  f,    ge_ss, ge_ss, ge_nn, ge_nn, f,     f,     f    ],
    /*BOOL  */  [err,  absn,  f,    f,     f,     f,     f,     ge_bb, f,     f    ],
    /*ARRAY */  [err,  absn,  f,    f,     f,     f,     f,     f,     collection_order, f],
    /*MAP   */  [err,  absn,  f,    f,     f,     f,     f,     f,     f,     collection_order],
];

// ═══════════════════════════════════════════════════════════════
//  Three-way comparison
// ═══════════════════════════════════════════════════════════════

fn ordering_value(o: Ordering) -> Value {
    Value::from_int(match o {
        Ordering::Less => -1,
        Ordering::Equal => 0,
        Ordering::Greater => 1,
    })
}

fn cmp_nn(a: &Value, b: &Value) -> Value {
    ordering_value(numeric(a, b))
}

fn cmp_ss(a: &Value, b: &Value) -> Value {
    ordering_value(lexical(a, b))
}

fn cmp_bb(a: &Value, b: &Value) -> Value {
    ordering_value(boolean(a).cmp(&boolean(b)))
}

fn less(_: &Value, _: &Value) -> Value {
    Value::from_int(-1)
}

fn same(_: &Value, _: &Value) -> Value {
    Value::from_int(0)
}

fn more(_: &Value, _: &Value) -> Value {
    Value::from_int(1)
}

/// Collation for sorting: numbers, strings and Void < booleans < Null <
/// arrays < maps. Within the first group numbers compare numerically with
/// each other and lexically against strings, as with `<`. That mix is not
/// transitive across number/string columns.
#[rustfmt::skip]
pub(crate) static CMP: BinaryTable = [
    //           ERROR ABSENT NULL  VOID    STRING  INT     FLOAT   BOOL    ARRAY MAP
    /*ERROR */  [err,  err,   err,  err,    err,    err,    err,    err,    err,  err ],
    /*ABSENT*/  [err,  absn,  absn, absn,   absn,   absn,   absn,   absn,   absn, absn],
    /*NULL  */  [err,  absn,  same, more,   more,   more,   more,   more,   less, less],
    /*VOID  */  [err,  absn,  less, cmp_ss, cmp_ss, cmp_ss, cmp_ss, less,   less, less],
    /*STRING*/  [err,  absn,  less, cmp_ss, cmp_ss, cmp_ss, cmp_ss, less,   less, less],
    /*INT   */  [err,  absn,  less, cmp_ss, cmp_ss, cmp_nn, cmp_nn, less,   less, less],
    /*FLOAT */  [err,  absn,  less, cmp_ss, cmp_ss, cmp_nn, cmp_nn, less,   less, less],
    /*BOOL  */  [err,  absn,  less, more,   more,   more,   more,   cmp_bb, less, less],
    /*ARRAY */  [err,  absn,  more, more,   more,   more,   more,   more,   collection_order, less],
    /*MAP   */  [err,  absn,  more, more,   more,   more,   more,   more,   more, collection_order],
];

#[cfg(test)]
mod tests {
    use crate::ops::BinaryOp;
    use crate::record::Record;
    use crate::value::Value;

    fn s(x: &str) -> Value {
        Value::from_string(x)
    }

    fn i(x: i64) -> Value {
        Value::from_int(x)
    }

    #[test]
    fn numbers_compare_numerically() {
        assert_eq!(BinaryOp::Lt.apply(&i(9), &i(10)), Value::Bool(true));
        assert_eq!(BinaryOp::Eq.apply(&i(2), &Value::from_float(2.0)), Value::Bool(true));
        assert_eq!(BinaryOp::Ge.apply(&Value::infer("0x10"), &i(16)), Value::Bool(true));
        assert_eq!(BinaryOp::Ne.apply(&Value::from_float(f64::NAN), &Value::from_float(f64::NAN)), Value::Bool(true));
    }

    #[test]
    fn number_against_string_is_lexical_on_the_print_representation() {
        // "10" < "9" lexically.
        assert_eq!(BinaryOp::Lt.apply(&i(10), &s("9")), Value::Bool(true));
        assert_eq!(BinaryOp::Lt.apply(&s("abc"), &i(10)), Value::Bool(false));
        assert_eq!(BinaryOp::Eq.apply(&Value::infer("0x10"), &s("0x10")), Value::Bool(true));
        assert_eq!(BinaryOp::Eq.apply(&Value::infer("0x10"), &s("16")), Value::Bool(false));
        assert_eq!(BinaryOp::Lt.apply(&Value::Void, &i(1)), Value::Bool(true));
    }

    #[test]
    fn absent_and_error() {
        assert!(BinaryOp::Lt.apply(&Value::Absent, &i(1)).is_absent());
        assert!(BinaryOp::Eq.apply(&i(1), &Value::Absent).is_absent());
        assert!(BinaryOp::Eq.apply(&Value::error(), &i(1)).is_error());
    }

    #[test]
    fn booleans_and_null() {
        assert_eq!(BinaryOp::Lt.apply(&Value::Bool(false), &Value::Bool(true)), Value::Bool(true));
        assert_eq!(BinaryOp::Lt.apply(&Value::Bool(false), &i(1)), Value::Bool(false));
        assert_eq!(BinaryOp::Gt.apply(&Value::Bool(false), &i(1)), Value::Bool(false));
        assert_eq!(BinaryOp::Eq.apply(&Value::Null, &Value::Null), Value::Bool(true));
        assert_eq!(BinaryOp::Lt.apply(&i(5), &Value::Null), Value::Bool(true));
    }

    #[test]
    fn collections() {
        let a = Value::from_array(vec![i(1), s("x")]);
        let b = Value::from_array(vec![Value::from_float(1.0), s("x")]);
        assert_eq!(BinaryOp::Eq.apply(&a, &b), Value::Bool(true));
        assert!(BinaryOp::Lt.apply(&a, &b).is_error());
        assert_eq!(BinaryOp::Eq.apply(&a, &i(1)), Value::Bool(false));

        let m1: Record = [("x", i(1)), ("y", i(2))].into_iter().collect();
        let m2: Record = [("y", i(2)), ("x", i(1))].into_iter().collect();
        assert_eq!(BinaryOp::Eq.apply(&Value::Map(m1), &Value::Map(m2)), Value::Bool(true));
    }

    #[test]
    fn three_way() {
        assert_eq!(BinaryOp::Cmp.apply(&i(1), &i(2)), i(-1));
        assert_eq!(BinaryOp::Cmp.apply(&s("b"), &s("a")), i(1));
        assert_eq!(BinaryOp::Cmp.apply(&i(3), &Value::Bool(true)), i(-1));
        assert_eq!(BinaryOp::Cmp.apply(&Value::Bool(true), &s("a")), i(1));
        assert_eq!(BinaryOp::Cmp.apply(&Value::Null, &Value::Null), i(0));
    }

    #[test]
    fn null_sorts_after_every_scalar_in_all_tables() {
        let scalars = [Value::Void, s("zz"), i(7), Value::from_float(1.5), Value::Bool(true)];
        for x in &scalars {
            assert_eq!(BinaryOp::Lt.apply(x, &Value::Null), Value::Bool(true), "{x:?} < null");
            assert_eq!(BinaryOp::Le.apply(x, &Value::Null), Value::Bool(true), "{x:?} <= null");
            assert_eq!(BinaryOp::Gt.apply(&Value::Null, x), Value::Bool(true), "null > {x:?}");
            assert_eq!(BinaryOp::Ge.apply(&Value::Null, x), Value::Bool(true), "null >= {x:?}");
            assert_eq!(BinaryOp::Gt.apply(x, &Value::Null), Value::Bool(false), "{x:?} > null");
            assert_eq!(BinaryOp::Cmp.apply(x, &Value::Null), i(-1), "{x:?} <=> null");
            assert_eq!(BinaryOp::Cmp.apply(&Value::Null, x), i(1), "null <=> {x:?}");
        }
    }

    #[test]
    fn booleans_collate_after_numbers_and_strings() {
        for x in [Value::Void, s("zz"), i(7), Value::from_float(1.5)] {
            assert_eq!(BinaryOp::Cmp.apply(&x, &Value::Bool(false)), i(-1), "{x:?}");
            assert_eq!(BinaryOp::Cmp.apply(&Value::Bool(false), &x), i(1), "{x:?}");
        }
    }
}
