//! Single-module resolution.
//!
//! For every definition, external references are replaced by the referenced
//! definitions' values: type references first, then term references, each
//! through one batched hygienic substitution. Imported names stay free by
//! design; anything else left unresolved is an error.
//!
//! Referents are resolved recursively (dependency first) with an active
//! stack detecting in-module cycles. A referent of a higher stratum is
//! lowered to the referrer's level before substitution, and a `rec` referent
//! is Z-closed first so no open self-reference ever crosses definitions.
//! Recursive type aliases substitute exactly once; their self-references
//! stay symbolic.

use indexmap::{IndexMap, IndexSet};
use thiserror::Error;
use triplang_core::def::{Def, Program};
use triplang_core::free_vars::{FvCache, external_refs};
use triplang_core::subst::{subst_term_batch, subst_type_batch};

use crate::index::SymbolTable;
use crate::lower::{LowerError, lower_to_level};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("unresolved reference '{name}' in definition '{def}'")]
    Unresolved { name: String, def: String },

    #[error("'{name}' is defined as both a term and a type")]
    DuplicateResolution { name: String },

    #[error("circular reference involving '{name}' (only 'poly rec' may recurse)")]
    Circular { name: String },

    #[error(transparent)]
    Lower(#[from] LowerError),
}

struct Resolver<'a> {
    table: &'a SymbolTable,
    imports: IndexSet<String>,
    cache: FvCache,
    resolved_terms: IndexMap<String, Def>,
    resolved_types: IndexMap<String, Def>,
    recursive_types: IndexSet<String>,
    active: IndexSet<String>,
}

/// Resolve every definition of a module against its symbol table.
pub fn resolve(program: &Program, table: &SymbolTable) -> Result<Program, ResolveError> {
    for name in table.terms.keys() {
        if table.types.contains_key(name) {
            return Err(ResolveError::DuplicateResolution { name: name.clone() });
        }
    }

    let mut resolver = Resolver {
        table,
        imports: program.imported_names().map(str::to_owned).collect(),
        cache: FvCache::new(),
        resolved_terms: IndexMap::new(),
        resolved_types: IndexMap::new(),
        recursive_types: table
            .types
            .iter()
            .filter(|(name, def)| match def {
                Def::Type { ty, .. } => external_refs(ty).types.contains(name.as_str()),
                _ => false,
            })
            .map(|(name, _)| name.clone())
            .collect(),
        active: IndexSet::new(),
    };

    let defs = program
        .defs
        .iter()
        .map(|def| match def.defined_name() {
            Some(name) if def.is_term_def() => resolver.resolve_term(name),
            Some(name) if matches!(def, Def::Type { .. }) => resolver.resolve_type(name),
            _ => Ok(def.clone()),
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Program::new(defs))
}

impl Resolver<'_> {
    /// Resolve a type alias: expand the type references in its body, except
    /// a recursive alias's own name, which stays symbolic.
    fn resolve_type(&mut self, name: &str) -> Result<Def, ResolveError> {
        if let Some(def) = self.resolved_types.get(name) {
            return Ok(def.clone());
        }
        if !self.active.insert(name.to_owned()) {
            // A cycle through several aliases; break it by leaving the
            // reference symbolic, like a direct self-reference.
            self.recursive_types.insert(name.to_owned());
            return Ok(self.table.types[name].clone());
        }

        let def = self.table.types[name].clone();
        let Def::Type { ty, .. } = &def else {
            unreachable!("type table holds only type defs");
        };

        let mut refs = external_refs(ty).types;
        refs.shift_remove(name);

        let mut subs = IndexMap::new();
        for ref_name in &refs {
            if self.imports.contains(ref_name) {
                continue;
            }
            let Some(_) = self.table.types.get(ref_name) else {
                self.active.shift_remove(name);
                return Err(ResolveError::Unresolved {
                    name: ref_name.clone(),
                    def: name.to_owned(),
                });
            };
            let resolved = self.resolve_type(ref_name)?;
            let Def::Type { ty: body, .. } = resolved else {
                unreachable!("resolve_type returns type defs");
            };
            subs.insert(ref_name.clone(), body);
        }

        let ty = subst_type_batch(&mut self.cache, ty, &subs);
        let def = Def::Type {
            name: name.to_owned(),
            ty,
        };
        self.active.shift_remove(name);
        self.resolved_types.insert(name.to_owned(), def.clone());
        Ok(def)
    }

    fn resolve_term(&mut self, name: &str) -> Result<Def, ResolveError> {
        if let Some(def) = self.resolved_terms.get(name) {
            return Ok(def.clone());
        }
        if !self.active.insert(name.to_owned()) {
            return Err(ResolveError::Circular {
                name: name.to_owned(),
            });
        }

        let result = self.resolve_term_inner(name);
        self.active.shift_remove(name);
        let def = result?;
        self.resolved_terms.insert(name.to_owned(), def.clone());
        Ok(def)
    }

    fn resolve_term_inner(&mut self, name: &str) -> Result<Def, ResolveError> {
        let def = self.table.terms[name].clone();
        let term = def.term().expect("term table holds only term defs").clone();
        let level = def.level().expect("term defs have a level");

        let mut refs = external_refs(&term);
        if def.is_rec() {
            refs.terms.shift_remove(name);
        }

        // Types first. A recursive alias substitutes its body once here and
        // keeps its self-reference symbolic.
        let mut type_subs = IndexMap::new();
        for ref_name in &refs.types {
            if self.table.types.contains_key(ref_name) {
                let resolved = self.resolve_type(ref_name)?;
                let Def::Type { ty: body, .. } = resolved else {
                    unreachable!("resolve_type returns type defs");
                };
                type_subs.insert(ref_name.clone(), body);
            } else if !self.imports.contains(ref_name) {
                return Err(ResolveError::Unresolved {
                    name: ref_name.clone(),
                    def: name.to_owned(),
                });
            }
        }

        let mut term = subst_type_batch(&mut self.cache, &term, &type_subs);
        let ty = match &def {
            Def::Poly { ty: Some(ty), .. } | Def::Typed { ty: Some(ty), .. } => Some(
                subst_type_batch(&mut self.cache, ty, &type_subs),
            ),
            _ => None,
        };

        // Then terms.
        let mut term_subs = IndexMap::new();
        for ref_name in &refs.terms {
            if self.imports.contains(ref_name) {
                continue;
            }
            if self.table.terms.contains_key(ref_name) {
                let resolved = self.resolve_term(ref_name)?;
                let resolved = if resolved.is_rec() || resolved.level() > Some(level) {
                    lower_to_level(&mut self.cache, &resolved, level)?
                } else {
                    resolved
                };
                term_subs.insert(
                    ref_name.clone(),
                    resolved.term().expect("lowered term def has a term").clone(),
                );
            } else if self.table.types.contains_key(ref_name) {
                // A type name in term position: substitute it into the types
                // mentioned by the term.
                let resolved = self.resolve_type(ref_name)?;
                let Def::Type { ty: body, .. } = resolved else {
                    unreachable!("resolve_type returns type defs");
                };
                term = subst_type_batch(
                    &mut self.cache,
                    &term,
                    &IndexMap::from([(ref_name.clone(), body)]),
                );
            } else {
                return Err(ResolveError::Unresolved {
                    name: ref_name.clone(),
                    def: name.to_owned(),
                });
            }
        }
        term = subst_term_batch(&mut self.cache, &term, &term_subs);

        // Everything still free must be an import, the rec self-name, or a
        // recursive alias kept symbolic on purpose. The substituted term
        // shares inlined subtrees, so the check goes through the cache.
        let leftover_terms = self.cache.free_term_vars(&term);
        let leftover_types = self.cache.free_type_vars(&term);
        for free in leftover_terms.iter() {
            let own_rec = def.is_rec() && free == name;
            if !own_rec && !self.imports.contains(free) {
                return Err(ResolveError::Unresolved {
                    name: free.clone(),
                    def: name.to_owned(),
                });
            }
        }
        for free in leftover_types.iter() {
            if !self.imports.contains(free) && !self.recursive_types.contains(free) {
                return Err(ResolveError::Unresolved {
                    name: free.clone(),
                    def: name.to_owned(),
                });
            }
        }

        let resolved = match ty {
            Some(ty) => match def.with_term(term) {
                Def::Poly {
                    name, term, rec, ..
                } => Def::Poly {
                    name,
                    term,
                    ty: Some(ty),
                    rec,
                },
                Def::Typed { name, term, .. } => Def::Typed {
                    name,
                    term,
                    ty: Some(ty),
                },
                other => other,
            },
            None => def.with_term(term),
        };
        Ok(resolved)
    }
}
