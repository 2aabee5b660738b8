//! SCC-ordered cross-module resolution.
//!
//! Components arrive leaves first, so every dependency outside the current
//! component is already resolved. A singleton without a self-loop resolves
//! with one batched substitution; anything cyclic goes through the bounded
//! fix-point: substitute the other members' current bodies each round, hash,
//! and stop when the hashes are stable. Convergence failure inside the round
//! budget is the circular-dependency error, which is also what a non-`rec`
//! self-loop smuggled in through a hand-written object file runs into.

use indexmap::IndexMap;
use triplang_compiler::lower::lower_to_level;
use triplang_core::def::Def;
use triplang_core::free_vars::FvCache;
use triplang_core::structural_hash;
use triplang_core::subst::{subst_term_batch, subst_type_batch};
use triplang_core::term::TermRef;

use crate::LinkError;
use crate::graph::DepGraph;
use crate::space::GlobalSpace;

/// Fix-point round budget per SCC.
pub const FIXPOINT_ROUNDS: usize = 32;

pub struct LinkResolver<'a> {
    pub space: &'a GlobalSpace,
    pub cache: FvCache,
    /// Fully resolved definitions by qualified name.
    pub resolved: IndexMap<String, Def>,
}

impl<'a> LinkResolver<'a> {
    pub fn new(space: &'a GlobalSpace) -> Self {
        Self {
            space,
            cache: FvCache::new(),
            resolved: IndexMap::new(),
        }
    }

    /// Resolve every component, leaves first.
    pub fn resolve_all(&mut self, graph: &DepGraph, sccs: &[Vec<String>]) -> Result<(), LinkError> {
        for scc in sccs {
            if scc.len() == 1 && !graph.has_self_loop(&scc[0]) {
                self.resolve_single(&scc[0])?;
            } else {
                self.resolve_fixpoint(scc)?;
            }
        }
        Ok(())
    }

    fn lookup(&self, node: &str) -> Def {
        self.space
            .terms
            .get(node)
            .or_else(|| self.space.types.get(node))
            .map(|entry| entry.def.clone())
            .expect("SCC nodes come from the space")
    }

    fn module_of(&self, node: &str) -> String {
        self.space
            .terms
            .get(node)
            .or_else(|| self.space.types.get(node))
            .map(|entry| entry.module.clone())
            .expect("SCC nodes come from the space")
    }

    fn resolve_single(&mut self, node: &str) -> Result<(), LinkError> {
        let def = self.lookup(node);
        let def = self.substitute(node, &def, &|_| false)?;
        self.check_leftovers(node, &def)?;
        self.resolved.insert(node.to_owned(), def);
        Ok(())
    }

    fn resolve_fixpoint(&mut self, scc: &[String]) -> Result<(), LinkError> {
        // Round zero substitutes everything already resolved outside the
        // component; the loop then iterates the members into each other.
        let in_scc = |node: &str| scc.iter().any(|m| m == node);
        let mut working: IndexMap<String, Def> = IndexMap::new();
        for node in scc {
            let def = self.lookup(node);
            let def = self.substitute(node, &def, &in_scc)?;
            working.insert(node.clone(), def);
        }

        let mut hashes: Vec<u64> = working
            .values()
            .map(|def| hash_def(def))
            .collect();

        for _round in 0..FIXPOINT_ROUNDS {
            let snapshot = working.clone();
            for (node, def) in working.iter_mut() {
                let module = self.module_of(node);
                let updated = substitute_from(
                    &mut self.cache,
                    self.space,
                    &module,
                    node,
                    def,
                    &|target| snapshot.get(target).cloned(),
                )?;
                *def = updated;
            }

            let next_hashes: Vec<u64> = working.values().map(hash_def).collect();
            if next_hashes == hashes {
                for (node, def) in working {
                    if let Err(err) = self.check_leftovers(&node, &def) {
                        // A reference that folded back into the component is
                        // unresolvable recursion, not a missing symbol.
                        if let LinkError::Unresolved { name, .. } = &err {
                            let module = self.module_of(&node);
                            let folds_back = self
                                .space
                                .resolve_term_ref(&module, name)
                                .is_some_and(|q| in_scc(&q));
                            if folds_back {
                                return Err(LinkError::Circular {
                                    names: scc.to_vec(),
                                    limit: FIXPOINT_ROUNDS,
                                });
                            }
                        }
                        return Err(err);
                    }
                    self.resolved.insert(node, def);
                }
                return Ok(());
            }
            hashes = next_hashes;
        }

        Err(LinkError::Circular {
            names: scc.to_vec(),
            limit: FIXPOINT_ROUNDS,
        })
    }

    /// Substitute every resolvable reference of `def` from the resolved map,
    /// skipping targets for which `defer` says the fix-point will handle
    /// them.
    fn substitute(
        &mut self,
        node: &str,
        def: &Def,
        defer: &dyn Fn(&str) -> bool,
    ) -> Result<Def, LinkError> {
        let module = self.module_of(node);
        let resolved = &self.resolved;
        substitute_from(&mut self.cache, self.space, &module, node, def, &|target| {
            if defer(target) {
                None
            } else {
                resolved.get(target).cloned()
            }
        })
    }

    /// Unresolved leftovers after substitution: imports were already
    /// validated, so anything left is either the `rec` self-name, a
    /// recursive alias kept symbolic, or a genuine error. Free-variable
    /// queries go through the pass cache: fix-point rounds share subtrees
    /// aggressively and a plain rescan would walk every path.
    fn check_leftovers(&mut self, node: &str, def: &Def) -> Result<(), LinkError> {
        let module = self.module_of(node);
        let (free_terms, free_types, own_name, is_rec) = match def {
            Def::Type { name, ty } => (
                self.cache.free_term_vars(ty),
                self.cache.free_type_vars(ty),
                name.as_str(),
                true,
            ),
            def => {
                let Some(term) = def.term() else {
                    return Ok(());
                };
                (
                    self.cache.free_term_vars(term),
                    self.cache.free_type_vars(term),
                    def.defined_name().unwrap_or_default(),
                    def.is_rec(),
                )
            }
        };

        for free in free_terms.iter() {
            if is_rec && free == own_name {
                continue;
            }
            return Err(LinkError::Unresolved {
                name: free.clone(),
                def: node.to_owned(),
            });
        }
        for free in free_types.iter() {
            let recursive = self
                .space
                .resolve_type_ref(&module, free)
                .is_some_and(|q| self.space.recursive_types.contains(&q));
            if free == own_name || recursive {
                continue;
            }
            return Err(LinkError::Unresolved {
                name: free.clone(),
                def: node.to_owned(),
            });
        }
        Ok(())
    }
}

fn hash_def(def: &Def) -> u64 {
    match def {
        Def::Type { ty, .. } => structural_hash(ty),
        def => def.term().map(structural_hash).unwrap_or_default(),
    }
}

/// One batched substitution round over a definition: type references first,
/// then term references, each referent lowered to the referrer's stratum
/// (and Z-closed if `rec`) before it is inlined. `provide` hands back the
/// current body for a qualified target, or `None` to leave the reference in
/// place for a later round.
fn substitute_from(
    cache: &mut FvCache,
    space: &GlobalSpace,
    module: &str,
    node: &str,
    def: &Def,
    provide: &dyn Fn(&str) -> Option<Def>,
) -> Result<Def, LinkError> {
    let own_name = def.defined_name().unwrap_or_default().to_owned();

    match def {
        Def::Type { name, ty } => {
            let free_types = cache.free_type_vars(ty);

            let mut subs = IndexMap::new();
            for type_ref in free_types.iter() {
                if type_ref == name {
                    continue;
                }
                let Some(target) = space.resolve_type_ref(module, type_ref) else {
                    return Err(LinkError::Unresolved {
                        name: type_ref.clone(),
                        def: node.to_owned(),
                    });
                };
                if let Some(Def::Type { ty: body, .. }) = provide(&target) {
                    subs.insert(type_ref.clone(), body);
                }
            }
            Ok(Def::Type {
                name: name.clone(),
                ty: subst_type_batch(cache, ty, &subs),
            })
        }
        def => {
            let Some(term) = def.term() else {
                return Ok(def.clone());
            };
            let level = def.level().expect("term defs have a level");
            let free_terms = cache.free_term_vars(term);
            let free_types = cache.free_type_vars(term);

            // A recursive alias substitutes its self-referential body exactly
            // once here; the inner reference stays symbolic and is erased
            // with everything else at lowering.
            let mut type_subs = IndexMap::new();
            for type_ref in free_types.iter() {
                let Some(target) = space.resolve_type_ref(module, type_ref) else {
                    return Err(LinkError::Unresolved {
                        name: type_ref.clone(),
                        def: node.to_owned(),
                    });
                };
                if let Some(Def::Type { ty: body, .. }) = provide(&target) {
                    type_subs.insert(type_ref.clone(), body);
                }
            }

            let mut term_subs: IndexMap<String, TermRef> = IndexMap::new();
            for term_ref in free_terms.iter() {
                if def.is_rec() && term_ref == &own_name {
                    continue;
                }
                let Some(target) = space.resolve_term_ref(module, term_ref) else {
                    return Err(LinkError::Unresolved {
                        name: term_ref.clone(),
                        def: node.to_owned(),
                    });
                };
                let Some(referent) = provide(&target) else {
                    continue;
                };
                let referent = if referent.is_rec() || referent.level() > Some(level) {
                    lower_to_level(cache, &referent, level)?
                } else {
                    referent
                };
                term_subs.insert(
                    term_ref.clone(),
                    referent
                        .term()
                        .expect("lowered term def has a term")
                        .clone(),
                );
            }

            let term = subst_type_batch(cache, term, &type_subs);
            let term = subst_term_batch(cache, &term, &term_subs);
            Ok(def.with_term(term))
        }
    }
}
