//! Symbol table construction.
//!
//! One pass in source order. Term definitions (poly/typed/untyped/combinator)
//! land in the term namespace, type aliases in the type namespace. Data,
//! module, import, and export declarations are not stored; elaboration and
//! the pipeline inspect them directly on the program.

use indexmap::IndexMap;
use thiserror::Error;
use triplang_core::def::{Def, Program};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IndexError {
    #[error("duplicate definition '{name}'")]
    DuplicateTerm { name: String },

    #[error("duplicate type definition '{name}'")]
    DuplicateType { name: String },

    #[error("missing module declaration")]
    MissingModule,
}

/// Per-module name → definition maps, one per namespace.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    pub terms: IndexMap<String, Def>,
    pub types: IndexMap<String, Def>,
}

impl SymbolTable {
    /// Build the table for a program, rejecting duplicates per namespace.
    pub fn build(program: &Program) -> Result<Self, IndexError> {
        let mut table = Self::default();
        for def in &program.defs {
            match def {
                Def::Poly { name, .. }
                | Def::Typed { name, .. }
                | Def::Untyped { name, .. }
                | Def::Combinator { name, .. } => {
                    if table.terms.contains_key(name) {
                        return Err(IndexError::DuplicateTerm { name: name.clone() });
                    }
                    table.terms.insert(name.clone(), def.clone());
                }
                Def::Type { name, .. } => {
                    if table.types.contains_key(name) {
                        return Err(IndexError::DuplicateType { name: name.clone() });
                    }
                    table.types.insert(name.clone(), def.clone());
                }
                Def::Data { .. } | Def::Module { .. } | Def::Import { .. } | Def::Export { .. } => {
                }
            }
        }
        Ok(table)
    }

    pub fn term(&self, name: &str) -> Option<&Def> {
        self.terms.get(name)
    }

    pub fn ty(&self, name: &str) -> Option<&Def> {
        self.types.get(name)
    }
}
