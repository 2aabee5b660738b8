//! Type-alias environment, normalization, and α-respecting type equality.

use indexmap::IndexMap;
use triplang_core::def::{Def, Program};
use triplang_core::free_vars::FvCache;
use triplang_core::subst::subst_type;
use triplang_core::term::{TermRef, TripValue};

/// Head-expansion budget. Recursive aliases unfold on demand; the budget
/// keeps degenerate aliases (`type X = X`) from spinning.
const EXPANSION_FUEL: usize = 64;

/// Alias environment built from a module's (resolved) type definitions.
#[derive(Debug, Clone, Default)]
pub struct TypeEnv {
    aliases: IndexMap<String, TermRef>,
}

impl TypeEnv {
    pub fn from_program(program: &Program) -> Self {
        let mut aliases = IndexMap::new();
        for def in &program.defs {
            if let Def::Type { name, ty } = def {
                aliases.insert(name.clone(), ty.clone());
            }
        }
        Self { aliases }
    }

    /// Weak head normal form: expand head aliases and β-reduce type-level
    /// applications of `Forall` until the head is rigid or fuel runs out.
    pub fn whnf(&self, cache: &mut FvCache, ty: &TermRef) -> TermRef {
        let mut ty = ty.clone();
        let mut fuel = EXPANSION_FUEL;
        loop {
            match &*ty.clone() {
                TripValue::TypeVar { name } => {
                    let Some(body) = self.aliases.get(name) else {
                        return ty;
                    };
                    if fuel == 0 {
                        return ty;
                    }
                    fuel -= 1;
                    ty = body.clone();
                }
                TripValue::TypeApp { func, arg } => {
                    let head = self.whnf(cache, func);
                    if let TripValue::Forall { type_var, body } = &*head {
                        if fuel == 0 {
                            return ty;
                        }
                        fuel -= 1;
                        ty = subst_type(cache, body, type_var, arg);
                    } else {
                        return TripValue::type_app(head, arg.clone());
                    }
                }
                _ => return ty,
            }
        }
    }

    /// Structural equality up to α-conversion of `Forall` binders and alias
    /// expansion on both sides.
    pub fn type_eq(&self, cache: &mut FvCache, a: &TermRef, b: &TermRef) -> bool {
        let mut pairs = Vec::new();
        self.eq(cache, a, b, &mut pairs, EXPANSION_FUEL)
    }

    fn eq(
        &self,
        cache: &mut FvCache,
        a: &TermRef,
        b: &TermRef,
        pairs: &mut Vec<(String, String)>,
        depth: usize,
    ) -> bool {
        if depth == 0 {
            return false;
        }
        // Syntactic equality short-circuits alias unfolding, which is what
        // keeps recursive aliases from comparing forever. It is only sound
        // while no non-identity binder pairing touches the free variables.
        if a == b {
            let fv = cache.free_type_vars(a);
            let blocked = pairs
                .iter()
                .any(|(x, y)| x != y && (fv.contains(x) || fv.contains(y)));
            if !blocked {
                return true;
            }
        }
        let a = self.whnf(cache, a);
        let b = self.whnf(cache, b);
        match (&*a, &*b) {
            (TripValue::TypeVar { name: x }, TripValue::TypeVar { name: y }) => {
                for (px, py) in pairs.iter().rev() {
                    if px == x || py == y {
                        return px == x && py == y;
                    }
                }
                x == y
            }
            (
                TripValue::App { lft: l1, rgt: r1 },
                TripValue::App { lft: l2, rgt: r2 },
            ) => {
                self.eq(cache, l1, l2, pairs, depth - 1) && self.eq(cache, r1, r2, pairs, depth - 1)
            }
            (
                TripValue::TypeApp { func: f1, arg: a1 },
                TripValue::TypeApp { func: f2, arg: a2 },
            ) => {
                self.eq(cache, f1, f2, pairs, depth - 1) && self.eq(cache, a1, a2, pairs, depth - 1)
            }
            (
                TripValue::Forall {
                    type_var: x1,
                    body: b1,
                },
                TripValue::Forall {
                    type_var: x2,
                    body: b2,
                },
            ) => {
                pairs.push((x1.clone(), x2.clone()));
                let result = self.eq(cache, b1, b2, pairs, depth - 1);
                pairs.pop();
                result
            }
            _ => false,
        }
    }
}

