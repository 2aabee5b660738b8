//! TripLang front end: parser, elaboration, resolution, typechecking, and
//! stratified lowering.
//!
//! The pipeline, leaves first:
//!
//! ```text
//! source → parse → index → elaborate → re-index → resolve → typecheck → object
//! ```
//!
//! Each stage is a pure function from program to program (or table, or
//! object). `compile_source` strings them together; the linker crate reuses
//! `lower` for its own final descent to SKI.

pub mod elaborate;
pub mod index;
pub mod lower;
pub mod parser;
pub mod resolve;
pub mod typecheck;

#[cfg(test)]
mod pipeline_tests;

use thiserror::Error;
use triplang_object::{ImportEntry, ObjectModule};

pub use elaborate::ElaborateError;
pub use index::{IndexError, SymbolTable};
pub use lower::LowerError;
pub use parser::ParseError;
pub use resolve::ResolveError;
pub use typecheck::TypeError;

/// Any failure of the compilation pipeline, tagged by stage.
#[derive(Debug, Error)]
pub enum Error {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("index error: {0}")]
    Index(#[from] IndexError),

    #[error("elaboration error: {0}")]
    Elaborate(#[from] ElaborateError),

    #[error("resolve error: {0}")]
    Resolve(#[from] ResolveError),

    #[error("type error: {0}")]
    Typecheck(#[from] TypeError),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Compile one `.trip` source into an object module.
pub fn compile_source(source: &str) -> Result<ObjectModule> {
    let program = parser::parse_program(source)?;
    let table = SymbolTable::build(&program)?;
    let program = elaborate::elaborate(&program, &table)?;
    let table = SymbolTable::build(&program)?;
    let program = resolve::resolve(&program, &table)?;
    typecheck::typecheck(&program)?;

    let module = program
        .module_name()
        .ok_or(Error::Index(IndexError::MissingModule))?;
    let mut object = ObjectModule::new(module);
    object.exports = program.exports().map(str::to_owned).collect();
    object.imports = program
        .imports()
        .map(|(from, name)| ImportEntry {
            name: name.to_owned(),
            from: from.to_owned(),
        })
        .collect();
    for def in &program.defs {
        if let Some(name) = def.defined_name() {
            object.definitions.insert(name.to_owned(), def.clone());
        }
    }
    Ok(object)
}
