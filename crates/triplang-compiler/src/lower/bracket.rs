//! Bracket abstraction: untyped λ → S/K/I spines.
//!
//! The classical translation, innermost abstractions first:
//! - `T[x] x           = I`
//! - `T[x] M           = K M`        when x is not free in M
//! - `T[x] (M x)       = M`          when x is not free in M
//! - `T[x] (M N)       = S (T[x] M) (T[x] N)`
//!
//! Free-variable queries go through the pass cache, which keeps the
//! translation from going quadratic on long application chains. References
//! to other definitions pass through as atoms; the linker guarantees the
//! final program is closed.

use triplang_core::free_vars::FvCache;
use triplang_core::term::{Combinator, TermRef, TripValue};

use super::LowerError;

/// Translate an untyped term to a combinator spine.
pub fn bracket(cache: &mut FvCache, term: &TermRef) -> Result<TermRef, LowerError> {
    match &**term {
        TripValue::LambdaVar { .. } | TripValue::SysFVar { .. } | TripValue::Terminal { .. } => {
            Ok(term.clone())
        }
        TripValue::App { lft, rgt } => Ok(TripValue::app(
            bracket(cache, lft)?,
            bracket(cache, rgt)?,
        )),
        TripValue::LambdaAbs { param, body } => {
            let body = bracket(cache, body)?;
            abstract_var(cache, param, &body)
        }
        TripValue::TypeVar { .. } => Err(LowerError::UnexpectedNode { node: "type variable" }),
        TripValue::TypedAbs { .. } | TripValue::SysFAbs { .. } => {
            Err(LowerError::UnexpectedNode {
                node: "typed abstraction",
            })
        }
        TripValue::SysFTypeAbs { .. } | TripValue::SysFTypeApp { .. } => {
            Err(LowerError::UnexpectedNode {
                node: "type abstraction",
            })
        }
        TripValue::Forall { .. } | TripValue::TypeApp { .. } => Err(LowerError::UnexpectedNode {
            node: "type expression",
        }),
        TripValue::SysFLet { .. } => Err(LowerError::UnexpectedNode { node: "let" }),
        TripValue::SysFMatch { .. } => Err(LowerError::UnexpectedNode { node: "match" }),
    }
}

/// Abstract `x` out of a term that is already a combinator spine over
/// variables.
fn abstract_var(cache: &mut FvCache, x: &str, term: &TermRef) -> Result<TermRef, LowerError> {
    if term.term_var_name() == Some(x) {
        return Ok(TripValue::terminal(Combinator::I));
    }
    if !cache.free_term_vars(term).contains(x) {
        return Ok(TripValue::app(
            TripValue::terminal(Combinator::K),
            term.clone(),
        ));
    }
    match &**term {
        TripValue::App { lft, rgt } => {
            if rgt.term_var_name() == Some(x) && !cache.free_term_vars(lft).contains(x) {
                return Ok(lft.clone());
            }
            let lft = abstract_var(cache, x, lft)?;
            let rgt = abstract_var(cache, x, rgt)?;
            Ok(TripValue::app(
                TripValue::app(TripValue::terminal(Combinator::S), lft),
                rgt,
            ))
        }
        _ => Err(LowerError::UnexpectedNode {
            node: "non-applicative term",
        }),
    }
}
