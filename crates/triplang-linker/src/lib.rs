//! Multi-module linker.
//!
//! Loaded object modules are fused into a single closed SKI term:
//!
//! ```text
//! objects → global symbol space → dependency graph → Tarjan SCC
//!         → SCC-ordered resolution (fix-point for cycles)
//!         → numeral expansion → lowering → closed `main`
//! ```
//!
//! Exports are globally unique, imports are re-validated, and the result is
//! the SKI form of the `main` export, guaranteed closed.

pub mod expand;
pub mod graph;
pub mod resolve;
pub mod space;

#[cfg(test)]
mod graph_tests;
#[cfg(test)]
mod link_tests;

use thiserror::Error;
use triplang_compiler::LowerError;
use triplang_compiler::lower::lower_to_level;
use triplang_core::def::{Def, Level};
use triplang_core::free_vars::external_refs;
use triplang_core::term::TermRef;
use triplang_object::{ObjectError, ObjectModule};

use crate::graph::{build_graph, sccs};
use crate::resolve::LinkResolver;
use crate::space::{GlobalSpace, qualify};

#[derive(Debug, Error)]
pub enum LinkError {
    #[error("ambiguous export '{name}' (exported by '{first}' and '{second}')")]
    AmbiguousExport {
        name: String,
        first: String,
        second: String,
    },

    #[error("module '{module}' is linked twice")]
    DuplicateModule { module: String },

    #[error("module '{module}' imports '{symbol}' from missing module '{from}'")]
    MissingModule {
        module: String,
        symbol: String,
        from: String,
    },

    #[error("module '{module}' imports '{symbol}', which '{from}' does not export")]
    NotExported {
        module: String,
        symbol: String,
        from: String,
    },

    #[error("no 'main' function found")]
    MissingMain,

    #[error("'main' must be a term definition, found a {kind}")]
    MainNotTerm { kind: &'static str },

    #[error("unresolved reference '{name}' in '{def}'")]
    Unresolved { name: String, def: String },

    #[error("circular dependency among {names:?}: no fix-point within {limit} rounds")]
    Circular { names: Vec<String>, limit: usize },

    #[error("numeric literals used but no numeral definitions are linked")]
    NoNumeralType,

    #[error(transparent)]
    Object(#[from] ObjectError),

    #[error(transparent)]
    Lower(#[from] LowerError),
}

/// Link loaded modules into the closed SKI form of their `main` export.
pub fn link(objects: &[ObjectModule]) -> Result<TermRef, LinkError> {
    let space = GlobalSpace::build(objects)?;
    let graph = build_graph(&space);
    let components = sccs(&graph);

    let mut resolver = LinkResolver::new(&space);
    resolver.resolve_all(&graph, &components)?;

    let main_module = space.exports.get("main").ok_or(LinkError::MissingMain)?;
    let qualified = qualify(main_module, "main");
    let main = resolver
        .resolved
        .get(&qualified)
        .cloned()
        .ok_or(LinkError::MissingMain)?;
    if !main.is_term_def() {
        return Err(LinkError::MainNotTerm {
            kind: match main {
                Def::Type { .. } => "type",
                Def::Data { .. } => "data declaration",
                _ => "declaration",
            },
        });
    }

    // Descend to the untyped stratum, expand literals there, then bracket.
    let untyped = lower_to_level(&mut resolver.cache, &main, Level::Untyped)?;
    let term = untyped.term().expect("term def after lowering").clone();
    let term = expand::expand_literals(&mut resolver, &term)?;
    let untyped = Def::Untyped {
        name: "main".to_owned(),
        term,
    };
    let combinator = lower_to_level(&mut resolver.cache, &untyped, Level::Combinator)?;
    let term = combinator.term().expect("term def after lowering").clone();

    let leftover = external_refs(&term);
    if let Some(free) = leftover.terms.first() {
        return Err(LinkError::Unresolved {
            name: free.clone(),
            def: qualified,
        });
    }
    Ok(term)
}

/// Read object files from disk and link them, in the given order.
pub fn link_files(paths: &[std::path::PathBuf]) -> Result<TermRef, LinkError> {
    let objects = paths
        .iter()
        .map(|path| ObjectModule::read(path))
        .collect::<Result<Vec<_>, _>>()?;
    link(&objects)
}
