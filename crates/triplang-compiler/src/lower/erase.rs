//! Type erasure and recursion closing.

use indexmap::IndexSet;
use triplang_core::free_vars::term_names;
use triplang_core::names::fresh_name;
use triplang_core::term::{TermRef, TripValue};

/// Erase every type-level construct, producing an untyped term:
/// annotations drop, type abstractions and applications vanish, `let`
/// becomes an immediate application, and a surviving `match` becomes its
/// continuation spine.
pub fn erase_types(term: &TermRef) -> TermRef {
    match &**term {
        TripValue::SysFVar { name } => TripValue::lambda_var(name.clone()),
        TripValue::LambdaVar { .. } | TripValue::Terminal { .. } => term.clone(),
        TripValue::TypeVar { .. } | TripValue::Forall { .. } | TripValue::TypeApp { .. } => {
            // Type nodes have no term content; they only reach here through
            // malformed input and erase to themselves.
            term.clone()
        }
        TripValue::LambdaAbs { param, body } => {
            TripValue::lambda_abs(param.clone(), erase_types(body))
        }
        TripValue::TypedAbs { param, body, .. } | TripValue::SysFAbs { param, body, .. } => {
            TripValue::lambda_abs(param.clone(), erase_types(body))
        }
        TripValue::SysFTypeAbs { body, .. } => erase_types(body),
        TripValue::SysFTypeApp { term, .. } => erase_types(term),
        TripValue::SysFLet { name, value, body } => TripValue::app(
            TripValue::lambda_abs(name.clone(), erase_types(body)),
            erase_types(value),
        ),
        TripValue::SysFMatch {
            scrutinee, arms, ..
        } => {
            let mut spine = erase_types(scrutinee);
            for arm in arms {
                let cont = arm
                    .params
                    .iter()
                    .rev()
                    .fold(erase_types(&arm.body), |acc, p| {
                        TripValue::lambda_abs(p.clone(), acc)
                    });
                spine = TripValue::app(spine, cont);
            }
            spine
        }
        TripValue::App { lft, rgt } => TripValue::app(erase_types(lft), erase_types(rgt)),
    }
}

/// The Z combinator `\f => (\x => f (\v => x x v)) (\x => f (\v => x x v))`,
/// with binder names drawn outside `avoid`.
pub fn z_combinator(avoid: &IndexSet<String>) -> TermRef {
    let f = fresh_name("f", |n| avoid.contains(n));
    let x = fresh_name("x", |n| avoid.contains(n) || n == f);
    let v = fresh_name("v", |n| avoid.contains(n) || n == f || n == x);

    // \x => f (\v => x x v)
    let half = TripValue::lambda_abs(
        x.clone(),
        TripValue::app(
            TripValue::lambda_var(&f),
            TripValue::lambda_abs(
                v.clone(),
                TripValue::app(
                    TripValue::app(TripValue::lambda_var(&x), TripValue::lambda_var(&x)),
                    TripValue::lambda_var(&v),
                ),
            ),
        ),
    );
    TripValue::lambda_abs(f, TripValue::app(half.clone(), half))
}

/// Erase a `rec` definition body and close its self-reference:
/// `Z (\name => erased-body)`.
pub fn erase_rec(name: &str, term: &TermRef) -> TermRef {
    let erased = erase_types(term);
    let mut avoid = IndexSet::new();
    term_names(&erased, &mut avoid);
    avoid.insert(name.to_owned());
    let z = z_combinator(&avoid);
    TripValue::app(z, TripValue::lambda_abs(name.to_owned(), erased))
}
