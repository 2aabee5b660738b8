//! Stratified lowering: poly → untyped → combinator.
//!
//! - `poly`/`typed` lower by type erasure; a `rec` poly additionally wraps
//!   its erased body in a Z-combinator application, closing the recursive
//!   reference.
//! - `untyped` lowers by bracket abstraction to an S/K/I spine.
//! - `combinator` is the fixed point.
//! - type and data definitions cannot be lowered.

mod bracket;
mod erase;


use thiserror::Error;
use triplang_core::def::{Def, Level};
use triplang_core::free_vars::FvCache;

pub use bracket::bracket;
pub use erase::{erase_types, z_combinator};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LowerError {
    #[error("cannot lower {kind} definition '{name}'")]
    NotLowerable { kind: &'static str, name: String },

    #[error("unexpected {node} during bracket abstraction")]
    UnexpectedNode { node: &'static str },
}

/// Lower a definition one stratum toward `combinator`.
pub fn lower_once(cache: &mut FvCache, def: &Def) -> Result<Def, LowerError> {
    match def {
        Def::Poly {
            name,
            term,
            rec: true,
            ..
        } => Ok(Def::Untyped {
            name: name.clone(),
            term: erase::erase_rec(name, term),
        }),
        Def::Poly { name, term, .. } | Def::Typed { name, term, .. } => Ok(Def::Untyped {
            name: name.clone(),
            term: erase_types(term),
        }),
        Def::Untyped { name, term } => Ok(Def::Combinator {
            name: name.clone(),
            term: bracket(cache, term)?,
        }),
        Def::Combinator { .. } => Ok(def.clone()),
        Def::Type { name, .. } => Err(LowerError::NotLowerable {
            kind: "type",
            name: name.clone(),
        }),
        Def::Data { name, .. } => Err(LowerError::NotLowerable {
            kind: "data",
            name: name.clone(),
        }),
        Def::Module { name } => Err(LowerError::NotLowerable {
            kind: "module",
            name: name.clone(),
        }),
        Def::Import { symbol_ref, .. } => Err(LowerError::NotLowerable {
            kind: "import",
            name: symbol_ref.clone(),
        }),
        Def::Export { symbol_ref } => Err(LowerError::NotLowerable {
            kind: "export",
            name: symbol_ref.clone(),
        }),
    }
}

/// Lower a definition until it reaches `target`.
pub fn lower_to_level(cache: &mut FvCache, def: &Def, target: Level) -> Result<Def, LowerError> {
    let mut def = def.clone();
    // A rec definition keeps its marker until the Z wrap, so one extra step
    // closes it even at equal levels.
    if def.is_rec() {
        def = lower_once(cache, &def)?;
    }
    while def.level().is_some_and(|level| level > target) {
        def = lower_once(cache, &def)?;
    }
    Ok(def)
}
