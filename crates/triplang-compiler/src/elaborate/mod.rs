//! Elaboration: purely syntactic desugaring between parsing and resolution.
//!
//! Four rewrites, in order:
//! 1. `data` declarations expand into a Scott-encoded type alias, one `poly`
//!    constructor per declared constructor, and one eliminator.
//! 2. `match` expressions desugar into constructor-continuation application
//!    spines, in declaration arm order.
//! 3. Declared types of `typed` definitions propagate into unannotated
//!    binders.
//! 4. Numeric literals expand against the module's own numeral constructors
//!    when it has them; otherwise they stay opaque for the linker.
//!
//! Elaboration never typechecks.

mod annot;
mod data;
mod literals;

#[cfg(test)]
mod elaborate_tests;

use thiserror::Error;
use triplang_core::def::{Def, Program};

use crate::index::SymbolTable;

pub use data::CtorIndex;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ElaborateError {
    #[error("malformed data declaration '{name}': {reason}")]
    MalformedData { name: String, reason: String },

    #[error("duplicate match arm '{ctor}'")]
    DuplicateArm { ctor: String },

    #[error("unknown constructor '{ctor}' in match")]
    UnknownCtor { ctor: String },

    #[error("match arm '{ctor}' binds {got} parameters, constructor takes {want}")]
    ArmArity { ctor: String, got: usize, want: usize },

    #[error("match does not cover constructor '{ctor}'")]
    MissingArm { ctor: String },

    #[error("match mixes constructors of '{first}' and '{second}'")]
    MixedCtors { first: String, second: String },
}

/// Run all elaboration rewrites over a program.
pub fn elaborate(program: &Program, table: &SymbolTable) -> Result<Program, ElaborateError> {
    let (mut defs, ctor_index) = data::expand_data_decls(&program.defs)?;

    for def in &mut defs {
        if let Some(term) = def.term() {
            let desugared = data::desugar_matches(term, &ctor_index)?;
            let updated = def.with_term(desugared);
            *def = updated;
        }
    }

    for def in &mut defs {
        if let Def::Typed {
            term, ty: Some(ty), ..
        } = def
        {
            let propagated = annot::propagate(term, ty);
            *term = propagated;
        }
    }

    let defs = literals::expand_local_literals(defs, table);

    Ok(Program::new(defs))
}
