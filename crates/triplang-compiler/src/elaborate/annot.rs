//! Annotation propagation for `typed` definitions.
//!
//! The declared arrow type is pushed into unannotated binders: each
//! `\x => body` under an expected `A -> B` becomes `\x:A => body` with `B`
//! propagated onward. Propagation stops at the first shape mismatch; the
//! typechecker reports anything left over.

use triplang_core::term::{TermRef, TripValue};

pub fn propagate(term: &TermRef, expected: &TermRef) -> TermRef {
    match (&**term, &**expected) {
        (
            TripValue::LambdaAbs { param, body },
            TripValue::App { lft: dom, rgt: cod },
        ) => {
            let body = propagate(body, cod);
            TripValue::typed_abs(param.clone(), dom.clone(), body)
        }
        (
            TripValue::TypedAbs {
                param,
                param_type,
                body,
            },
            TripValue::App { rgt: cod, .. },
        ) => {
            let propagated = propagate(body, cod);
            TripValue::typed_abs(param.clone(), param_type.clone(), propagated)
        }
        _ => term.clone(),
    }
}
