//! Module-local literal expansion.
//!
//! When the module itself defines the Church constructors (`succ`, `zero`)
//! or the binary ones (`b0`, `b1`, `bend`), literals expand here into
//! reference spines and resolve like ordinary code. Otherwise every literal
//! stays an opaque sentinel and the linker expands it against the linked
//! prelude.

use std::rc::Rc;

use triplang_core::def::Def;
use triplang_core::term::{MatchArm, TermRef, TripValue};
use triplang_core::{names, numerals};

use crate::index::SymbolTable;

#[derive(Clone, Copy)]
enum Encoding {
    Church,
    Binary,
}

pub fn expand_local_literals(defs: Vec<Def>, table: &SymbolTable) -> Vec<Def> {
    let encoding = if table.term("succ").is_some() && table.term("zero").is_some() {
        Some(Encoding::Church)
    } else if table.term("b0").is_some()
        && table.term("b1").is_some()
        && table.term("bend").is_some()
    {
        Some(Encoding::Binary)
    } else {
        None
    };
    let Some(encoding) = encoding else {
        return defs;
    };

    defs.into_iter()
        .map(|def| match def.term() {
            Some(term) => {
                let expanded = expand(term, encoding);
                def.with_term(expanded)
            }
            None => def,
        })
        .collect()
}

/// A constructor reference in the same variable namespace as the literal it
/// replaces, so the spine resolves like the surrounding stratum.
fn ctor_ref(sample: &TripValue, name: &str) -> TermRef {
    match sample {
        TripValue::SysFVar { .. } => TripValue::sysf_var(name),
        _ => TripValue::lambda_var(name),
    }
}

fn expand(term: &TermRef, encoding: Encoding) -> TermRef {
    match &**term {
        TripValue::LambdaVar { name } | TripValue::SysFVar { name } => {
            let Some(value) = names::literal_value(name) else {
                return term.clone();
            };
            match encoding {
                Encoding::Church => numerals::church_spine(
                    &value,
                    &ctor_ref(term, "succ"),
                    &ctor_ref(term, "zero"),
                ),
                Encoding::Binary => numerals::bin_spine(
                    &value,
                    &ctor_ref(term, "b0"),
                    &ctor_ref(term, "b1"),
                    &ctor_ref(term, "bend"),
                ),
            }
        }
        TripValue::TypeVar { .. } | TripValue::Terminal { .. } => term.clone(),
        TripValue::LambdaAbs { param, body } => {
            let b = expand(body, encoding);
            if Rc::ptr_eq(&b, body) {
                term.clone()
            } else {
                TripValue::lambda_abs(param.clone(), b)
            }
        }
        TripValue::TypedAbs {
            param,
            param_type,
            body,
        } => {
            let b = expand(body, encoding);
            if Rc::ptr_eq(&b, body) {
                term.clone()
            } else {
                TripValue::typed_abs(param.clone(), param_type.clone(), b)
            }
        }
        TripValue::SysFAbs {
            param,
            param_type,
            body,
        } => {
            let b = expand(body, encoding);
            if Rc::ptr_eq(&b, body) {
                term.clone()
            } else {
                TripValue::sysf_abs(param.clone(), param_type.clone(), b)
            }
        }
        TripValue::SysFTypeAbs { type_var, body } => {
            let b = expand(body, encoding);
            if Rc::ptr_eq(&b, body) {
                term.clone()
            } else {
                TripValue::sysf_type_abs(type_var.clone(), b)
            }
        }
        TripValue::Forall { .. } | TripValue::TypeApp { .. } => term.clone(),
        TripValue::SysFTypeApp {
            term: inner,
            type_arg,
        } => {
            let t = expand(inner, encoding);
            if Rc::ptr_eq(&t, inner) {
                term.clone()
            } else {
                TripValue::sysf_type_app(t, type_arg.clone())
            }
        }
        TripValue::SysFLet { name, value, body } => {
            let v = expand(value, encoding);
            let b = expand(body, encoding);
            if Rc::ptr_eq(&v, value) && Rc::ptr_eq(&b, body) {
                term.clone()
            } else {
                TripValue::sysf_let(name.clone(), v, b)
            }
        }
        TripValue::SysFMatch {
            scrutinee,
            return_type,
            arms,
        } => {
            let s = expand(scrutinee, encoding);
            let mut changed = !Rc::ptr_eq(&s, scrutinee);
            let mut arms2 = Vec::with_capacity(arms.len());
            for arm in arms {
                let b = expand(&arm.body, encoding);
                changed |= !Rc::ptr_eq(&b, &arm.body);
                arms2.push(MatchArm {
                    ctor: arm.ctor.clone(),
                    params: arm.params.clone(),
                    body: b,
                });
            }
            if changed {
                TripValue::sysf_match(s, return_type.clone(), arms2)
            } else {
                term.clone()
            }
        }
        TripValue::App { lft, rgt } => {
            let l = expand(lft, encoding);
            let r = expand(rgt, encoding);
            if Rc::ptr_eq(&l, lft) && Rc::ptr_eq(&r, rgt) {
                term.clone()
            } else {
                TripValue::app(l, r)
            }
        }
    }
}
