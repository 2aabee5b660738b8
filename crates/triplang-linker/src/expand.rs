//! Link-time numeral expansion.
//!
//! Literal sentinels survive substitution and lowering untouched; just
//! before bracket abstraction they expand into numeral spines built from the
//! linked constructors. Church (`succ`/`zero`) is preferred when the link
//! carries a `Nat`, binary (`b0`/`b1`/`bend`) when it carries a `Bin`; a
//! program that uses literals with neither in scope fails to link.

use std::rc::Rc;

use triplang_compiler::lower::lower_to_level;
use triplang_core::def::Level;
use triplang_core::term::{TermRef, TripValue};
use triplang_core::{names, numerals};

use crate::LinkError;
use crate::resolve::LinkResolver;
use crate::space::qualify;

enum Numerals {
    Church { succ: TermRef, zero: TermRef },
    Binary { b0: TermRef, b1: TermRef, end: TermRef },
}

/// Expand every literal sentinel in `term`, consulting the linked numeral
/// definitions. `term` must already be at the untyped stratum.
pub fn expand_literals(
    resolver: &mut LinkResolver<'_>,
    term: &TermRef,
) -> Result<TermRef, LinkError> {
    if !contains_literal(term) {
        return Ok(term.clone());
    }
    let encoding = select_numerals(resolver)?;
    Ok(expand(term, &encoding))
}

fn contains_literal(term: &TermRef) -> bool {
    match &**term {
        TripValue::LambdaVar { name } | TripValue::SysFVar { name } => names::is_literal(name),
        TripValue::TypeVar { .. } | TripValue::Terminal { .. } => false,
        TripValue::LambdaAbs { body, .. }
        | TripValue::TypedAbs { body, .. }
        | TripValue::SysFAbs { body, .. }
        | TripValue::SysFTypeAbs { body, .. }
        | TripValue::Forall { body, .. } => contains_literal(body),
        TripValue::SysFTypeApp { term, .. } => contains_literal(term),
        TripValue::TypeApp { .. } => false,
        TripValue::SysFLet { value, body, .. } => {
            contains_literal(value) || contains_literal(body)
        }
        TripValue::SysFMatch {
            scrutinee, arms, ..
        } => contains_literal(scrutinee) || arms.iter().any(|arm| contains_literal(&arm.body)),
        TripValue::App { lft, rgt } => contains_literal(lft) || contains_literal(rgt),
    }
}

/// The resolved, untyped body of a numeral constructor, if the link has one.
fn ctor_body(resolver: &mut LinkResolver<'_>, name: &str) -> Result<Option<TermRef>, LinkError> {
    let Some(entry) = resolver.space.find_term(name) else {
        return Ok(None);
    };
    let qualified = qualify(&entry.module, name);
    let Some(def) = resolver.resolved.get(&qualified).cloned() else {
        return Ok(None);
    };
    let lowered = lower_to_level(&mut resolver.cache, &def, Level::Untyped)?;
    Ok(lowered.term().cloned())
}

fn select_numerals(resolver: &mut LinkResolver<'_>) -> Result<Numerals, LinkError> {
    let church = match (ctor_body(resolver, "succ")?, ctor_body(resolver, "zero")?) {
        (Some(succ), Some(zero)) => Some(Numerals::Church { succ, zero }),
        _ => None,
    };
    let binary = match (
        ctor_body(resolver, "b0")?,
        ctor_body(resolver, "b1")?,
        ctor_body(resolver, "bend")?,
    ) {
        (Some(b0), Some(b1), Some(end)) => Some(Numerals::Binary { b0, b1, end }),
        _ => None,
    };

    let prefer_binary = resolver.space.has_type("Bin") && !resolver.space.has_type("Nat");
    match (church, binary) {
        (Some(church), _) if !prefer_binary => Ok(church),
        (_, Some(binary)) => Ok(binary),
        (Some(church), None) => Ok(church),
        (None, None) => Err(LinkError::NoNumeralType),
    }
}

fn expand(term: &TermRef, encoding: &Numerals) -> TermRef {
    match &**term {
        TripValue::LambdaVar { name } | TripValue::SysFVar { name } => {
            let Some(value) = names::literal_value(name) else {
                return term.clone();
            };
            match encoding {
                Numerals::Church { succ, zero } => numerals::church_spine(&value, succ, zero),
                Numerals::Binary { b0, b1, end } => numerals::bin_spine(&value, b0, b1, end),
            }
        }
        TripValue::LambdaAbs { param, body } => {
            let b = expand(body, encoding);
            if Rc::ptr_eq(&b, body) {
                term.clone()
            } else {
                TripValue::lambda_abs(param.clone(), b)
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
        // Lowering runs first; nothing else survives to this point.
        _ => term.clone(),
    }
}
