//! Hygienic capture-avoiding substitution.
//!
//! The batched form is the engine: it precomputes the union of the
//! replacements' free variables once, so the capture check at each binder is
//! a set lookup instead of a traversal, and it shrinks the substitution set
//! as binders shadow names. Single substitution delegates to a singleton
//! batch.
//!
//! Traversals are memoised by node address for the duration of one call.
//! Substituted subtrees are inserted as shared handles, so iterated
//! substitution (the linker's fix-point) produces heavily shared trees; the
//! memo keeps the walk proportional to the number of distinct nodes instead
//! of the number of paths. A memo entry is only valid while the substitution
//! set is unchanged, so entering a binder that shadows a substituted name
//! starts a fresh memo for that subtree.
//!
//! Guarantees, checked by the test suite:
//! - no free variable of a replacement is ever captured by a binder;
//! - substitution stops at binders that shadow the substituted name;
//! - term substitution never touches type binders or type variables, and
//!   vice versa;
//! - a subtree with no free occurrence of any substituted name is returned
//!   unchanged (same `Rc`);
//! - literal sentinel names are never substituted.

use std::collections::HashMap;
use std::rc::Rc;

use indexmap::{IndexMap, IndexSet};

use crate::free_vars::{FvCache, term_names, type_names};
use crate::names;
use crate::term::{MatchArm, TermRef, TripValue};

type Memo = HashMap<*const TripValue, TermRef>;

/// Capture-avoiding substitution of the free term variable `name` in `v`.
pub fn subst_term(cache: &mut FvCache, v: &TermRef, name: &str, replacement: &TermRef) -> TermRef {
    let mut subs = IndexMap::new();
    subs.insert(name.to_owned(), replacement.clone());
    subst_term_batch(cache, v, &subs)
}

/// Capture-avoiding substitution of the free type variable `name` in `v`.
pub fn subst_type(cache: &mut FvCache, v: &TermRef, name: &str, replacement: &TermRef) -> TermRef {
    let mut subs = IndexMap::new();
    subs.insert(name.to_owned(), replacement.clone());
    subst_type_batch(cache, v, &subs)
}

/// Batched capture-avoiding term substitution: all entries of `subs` are
/// applied in a single traversal.
pub fn subst_term_batch(
    cache: &mut FvCache,
    v: &TermRef,
    subs: &IndexMap<String, TermRef>,
) -> TermRef {
    if subs.is_empty() {
        return v.clone();
    }
    debug_assert!(
        subs.keys().all(|k| !names::is_literal(k)),
        "literal sentinels are not substitutable"
    );
    let mut fv_union = IndexSet::new();
    for replacement in subs.values() {
        fv_union.extend(cache.free_term_vars(replacement).iter().cloned());
    }
    let mut memo = Memo::new();
    term_go(cache, v, subs, &fv_union, &mut memo)
}

/// Batched capture-avoiding type substitution.
pub fn subst_type_batch(
    cache: &mut FvCache,
    v: &TermRef,
    subs: &IndexMap<String, TermRef>,
) -> TermRef {
    if subs.is_empty() {
        return v.clone();
    }
    let mut fv_union = IndexSet::new();
    for replacement in subs.values() {
        fv_union.extend(cache.free_type_vars(replacement).iter().cloned());
    }
    let mut memo = Memo::new();
    type_go(cache, v, subs, &fv_union, &mut memo)
}

fn term_applies(cache: &mut FvCache, v: &TermRef, subs: &IndexMap<String, TermRef>) -> bool {
    let fv = cache.free_term_vars(v);
    subs.keys().any(|k| fv.contains(k.as_str()))
}

fn type_applies(cache: &mut FvCache, v: &TermRef, subs: &IndexMap<String, TermRef>) -> bool {
    let fv = cache.free_type_vars(v);
    subs.keys().any(|k| fv.contains(k.as_str()))
}

fn term_go(
    cache: &mut FvCache,
    v: &TermRef,
    subs: &IndexMap<String, TermRef>,
    fv_union: &IndexSet<String>,
    memo: &mut Memo,
) -> TermRef {
    if !term_applies(cache, v, subs) {
        return v.clone();
    }
    let key = Rc::as_ptr(v);
    if let Some(out) = memo.get(&key) {
        return out.clone();
    }

    let out = match &**v {
        TripValue::LambdaVar { name } | TripValue::SysFVar { name } => {
            subs.get(name).cloned().unwrap_or_else(|| v.clone())
        }
        TripValue::TypeVar { .. } | TripValue::Terminal { .. } => v.clone(),
        TripValue::App { lft, rgt } => {
            let l = term_go(cache, lft, subs, fv_union, memo);
            let r = term_go(cache, rgt, subs, fv_union, memo);
            if Rc::ptr_eq(&l, lft) && Rc::ptr_eq(&r, rgt) {
                v.clone()
            } else {
                TripValue::app(l, r)
            }
        }
        TripValue::TypeApp { func, arg } => {
            let f = term_go(cache, func, subs, fv_union, memo);
            let a = term_go(cache, arg, subs, fv_union, memo);
            if Rc::ptr_eq(&f, func) && Rc::ptr_eq(&a, arg) {
                v.clone()
            } else {
                TripValue::type_app(f, a)
            }
        }
        TripValue::SysFTypeApp { term, type_arg } => {
            let t = term_go(cache, term, subs, fv_union, memo);
            if Rc::ptr_eq(&t, term) {
                v.clone()
            } else {
                TripValue::sysf_type_app(t, type_arg.clone())
            }
        }
        TripValue::LambdaAbs { param, body } => {
            let (p, b) = term_binder(cache, std::slice::from_ref(param), body, subs, fv_union, memo);
            if p[0] == *param && Rc::ptr_eq(&b, body) {
                v.clone()
            } else {
                TripValue::lambda_abs(p.into_iter().next().expect("one binder"), b)
            }
        }
        TripValue::TypedAbs {
            param,
            param_type,
            body,
        } => {
            let (p, b) = term_binder(cache, std::slice::from_ref(param), body, subs, fv_union, memo);
            if p[0] == *param && Rc::ptr_eq(&b, body) {
                v.clone()
            } else {
                TripValue::typed_abs(
                    p.into_iter().next().expect("one binder"),
                    param_type.clone(),
                    b,
                )
            }
        }
        TripValue::SysFAbs {
            param,
            param_type,
            body,
        } => {
            let (p, b) = term_binder(cache, std::slice::from_ref(param), body, subs, fv_union, memo);
            if p[0] == *param && Rc::ptr_eq(&b, body) {
                v.clone()
            } else {
                TripValue::sysf_abs(
                    p.into_iter().next().expect("one binder"),
                    param_type.clone(),
                    b,
                )
            }
        }
        TripValue::SysFTypeAbs { type_var, body } => {
            let b = term_go(cache, body, subs, fv_union, memo);
            if Rc::ptr_eq(&b, body) {
                v.clone()
            } else {
                TripValue::sysf_type_abs(type_var.clone(), b)
            }
        }
        TripValue::Forall { type_var, body } => {
            let b = term_go(cache, body, subs, fv_union, memo);
            if Rc::ptr_eq(&b, body) {
                v.clone()
            } else {
                TripValue::forall(type_var.clone(), b)
            }
        }
        TripValue::SysFLet { name, value, body } => {
            let value2 = term_go(cache, value, subs, fv_union, memo);
            let (n, b) = term_binder(cache, std::slice::from_ref(name), body, subs, fv_union, memo);
            if n[0] == *name && Rc::ptr_eq(&value2, value) && Rc::ptr_eq(&b, body) {
                v.clone()
            } else {
                TripValue::sysf_let(n.into_iter().next().expect("one binder"), value2, b)
            }
        }
        TripValue::SysFMatch {
            scrutinee,
            return_type,
            arms,
        } => {
            let scrutinee2 = term_go(cache, scrutinee, subs, fv_union, memo);
            let mut changed = !Rc::ptr_eq(&scrutinee2, scrutinee);
            let mut arms2 = Vec::with_capacity(arms.len());
            for arm in arms {
                let (params2, body2) =
                    term_binder(cache, &arm.params, &arm.body, subs, fv_union, memo);
                changed |= params2 != arm.params || !Rc::ptr_eq(&body2, &arm.body);
                arms2.push(MatchArm {
                    ctor: arm.ctor.clone(),
                    params: params2,
                    body: body2,
                });
            }
            if changed {
                TripValue::sysf_match(scrutinee2, return_type.clone(), arms2)
            } else {
                v.clone()
            }
        }
    };

    memo.insert(key, out.clone());
    out
}

/// Enter a term-binder group: drop shadowed names from the substitution set,
/// α-rename any binder that would capture a replacement's free variable, and
/// substitute in the body.
fn term_binder(
    cache: &mut FvCache,
    params: &[String],
    body: &TermRef,
    subs: &IndexMap<String, TermRef>,
    fv_union: &IndexSet<String>,
    memo: &mut Memo,
) -> (Vec<String>, TermRef) {
    let narrowed: Option<IndexMap<String, TermRef>> =
        if params.iter().any(|p| subs.contains_key(p)) {
            Some(
                subs.iter()
                    .filter(|(k, _)| !params.contains(k))
                    .map(|(k, r)| (k.clone(), r.clone()))
                    .collect(),
            )
        } else {
            None
        };
    let shadowing = narrowed.is_some();
    let subs = narrowed.as_ref().unwrap_or(subs);

    if subs.is_empty() || !term_applies(cache, body, subs) {
        return (params.to_vec(), body.clone());
    }

    let mut params2 = params.to_vec();
    let mut body2 = body.clone();
    for i in 0..params2.len() {
        if fv_union.contains(&params2[i]) {
            let mut avoid = IndexSet::new();
            term_names(&body2, &mut avoid);
            avoid.extend(fv_union.iter().cloned());
            avoid.extend(subs.keys().cloned());
            avoid.extend(params2.iter().cloned());
            let fresh = names::fresh_name(&params2[i], |n| avoid.contains(n));
            body2 = rename_term_var(&body2, &params2[i], &fresh);
            params2[i] = fresh;
        }
    }

    // The memo is keyed against the outer substitution set; a narrowed set
    // gets its own.
    let body2 = if shadowing {
        let mut inner = Memo::new();
        term_go(cache, &body2, subs, fv_union, &mut inner)
    } else {
        term_go(cache, &body2, subs, fv_union, memo)
    };
    (params2, body2)
}

fn type_go(
    cache: &mut FvCache,
    v: &TermRef,
    subs: &IndexMap<String, TermRef>,
    fv_union: &IndexSet<String>,
    memo: &mut Memo,
) -> TermRef {
    if !type_applies(cache, v, subs) {
        return v.clone();
    }
    let key = Rc::as_ptr(v);
    if let Some(out) = memo.get(&key) {
        return out.clone();
    }

    let out = match &**v {
        TripValue::TypeVar { name } => subs.get(name).cloned().unwrap_or_else(|| v.clone()),
        TripValue::LambdaVar { .. } | TripValue::SysFVar { .. } | TripValue::Terminal { .. } => {
            v.clone()
        }
        TripValue::App { lft, rgt } => {
            let l = type_go(cache, lft, subs, fv_union, memo);
            let r = type_go(cache, rgt, subs, fv_union, memo);
            if Rc::ptr_eq(&l, lft) && Rc::ptr_eq(&r, rgt) {
                v.clone()
            } else {
                TripValue::app(l, r)
            }
        }
        TripValue::TypeApp { func, arg } => {
            let f = type_go(cache, func, subs, fv_union, memo);
            let a = type_go(cache, arg, subs, fv_union, memo);
            if Rc::ptr_eq(&f, func) && Rc::ptr_eq(&a, arg) {
                v.clone()
            } else {
                TripValue::type_app(f, a)
            }
        }
        TripValue::SysFTypeApp { term, type_arg } => {
            let t = type_go(cache, term, subs, fv_union, memo);
            let ta = type_go(cache, type_arg, subs, fv_union, memo);
            if Rc::ptr_eq(&t, term) && Rc::ptr_eq(&ta, type_arg) {
                v.clone()
            } else {
                TripValue::sysf_type_app(t, ta)
            }
        }
        TripValue::LambdaAbs { param, body } => {
            let b = type_go(cache, body, subs, fv_union, memo);
            if Rc::ptr_eq(&b, body) {
                v.clone()
            } else {
                TripValue::lambda_abs(param.clone(), b)
            }
        }
        TripValue::TypedAbs {
            param,
            param_type,
            body,
        } => {
            let pt = type_go(cache, param_type, subs, fv_union, memo);
            let b = type_go(cache, body, subs, fv_union, memo);
            if Rc::ptr_eq(&pt, param_type) && Rc::ptr_eq(&b, body) {
                v.clone()
            } else {
                TripValue::typed_abs(param.clone(), pt, b)
            }
        }
        TripValue::SysFAbs {
            param,
            param_type,
            body,
        } => {
            let pt = type_go(cache, param_type, subs, fv_union, memo);
            let b = type_go(cache, body, subs, fv_union, memo);
            if Rc::ptr_eq(&pt, param_type) && Rc::ptr_eq(&b, body) {
                v.clone()
            } else {
                TripValue::sysf_abs(param.clone(), pt, b)
            }
        }
        TripValue::SysFTypeAbs { type_var, body } => {
            let (tv, b) = type_binder(cache, type_var, body, subs, fv_union, memo);
            if tv == *type_var && Rc::ptr_eq(&b, body) {
                v.clone()
            } else {
                TripValue::sysf_type_abs(tv, b)
            }
        }
        TripValue::Forall { type_var, body } => {
            let (tv, b) = type_binder(cache, type_var, body, subs, fv_union, memo);
            if tv == *type_var && Rc::ptr_eq(&b, body) {
                v.clone()
            } else {
                TripValue::forall(tv, b)
            }
        }
        TripValue::SysFLet { name, value, body } => {
            let value2 = type_go(cache, value, subs, fv_union, memo);
            let body2 = type_go(cache, body, subs, fv_union, memo);
            if Rc::ptr_eq(&value2, value) && Rc::ptr_eq(&body2, body) {
                v.clone()
            } else {
                TripValue::sysf_let(name.clone(), value2, body2)
            }
        }
        TripValue::SysFMatch {
            scrutinee,
            return_type,
            arms,
        } => {
            let scrutinee2 = type_go(cache, scrutinee, subs, fv_union, memo);
            let return_type2 = type_go(cache, return_type, subs, fv_union, memo);
            let mut changed =
                !Rc::ptr_eq(&scrutinee2, scrutinee) || !Rc::ptr_eq(&return_type2, return_type);
            let mut arms2 = Vec::with_capacity(arms.len());
            for arm in arms {
                let body2 = type_go(cache, &arm.body, subs, fv_union, memo);
                changed |= !Rc::ptr_eq(&body2, &arm.body);
                arms2.push(MatchArm {
                    ctor: arm.ctor.clone(),
                    params: arm.params.clone(),
                    body: body2,
                });
            }
            if changed {
                TripValue::sysf_match(scrutinee2, return_type2, arms2)
            } else {
                v.clone()
            }
        }
    };

    memo.insert(key, out.clone());
    out
}

/// Enter a type binder: shadowing and capture handling for the type
/// namespace. Term binders are never touched here.
fn type_binder(
    cache: &mut FvCache,
    type_var: &str,
    body: &TermRef,
    subs: &IndexMap<String, TermRef>,
    fv_union: &IndexSet<String>,
    memo: &mut Memo,
) -> (String, TermRef) {
    let narrowed: Option<IndexMap<String, TermRef>> = if subs.contains_key(type_var) {
        Some(
            subs.iter()
                .filter(|(k, _)| k.as_str() != type_var)
                .map(|(k, r)| (k.clone(), r.clone()))
                .collect(),
        )
    } else {
        None
    };
    let shadowing = narrowed.is_some();
    let subs = narrowed.as_ref().unwrap_or(subs);

    if subs.is_empty() || !type_applies(cache, body, subs) {
        return (type_var.to_owned(), body.clone());
    }

    let (tv, body2) = if fv_union.contains(type_var) {
        let mut avoid = IndexSet::new();
        type_names(body, &mut avoid);
        avoid.extend(fv_union.iter().cloned());
        avoid.extend(subs.keys().cloned());
        let fresh = names::fresh_name(type_var, |n| avoid.contains(n));
        let renamed = rename_type_var(body, type_var, &fresh);
        (fresh, renamed)
    } else {
        (type_var.to_owned(), body.clone())
    };

    let body2 = if shadowing {
        let mut inner = Memo::new();
        type_go(cache, &body2, subs, fv_union, &mut inner)
    } else {
        type_go(cache, &body2, subs, fv_union, memo)
    };
    (tv, body2)
}

/// Rename every free occurrence of the term variable `old` in `v` to `new`.
///
/// A binder named `old` shadows: renaming does not descend past it. Literal
/// sentinel names never match. Unchanged subtrees keep their `Rc`. The
/// decision at every node depends only on the node itself, so the walk is
/// memoised by address outright.
pub fn rename_term_var(v: &TermRef, old: &str, new: &str) -> TermRef {
    let mut memo = Memo::new();
    rename_term_go(v, old, new, &mut memo)
}

fn rename_term_go(v: &TermRef, old: &str, new: &str, memo: &mut Memo) -> TermRef {
    let key = Rc::as_ptr(v);
    if let Some(out) = memo.get(&key) {
        return out.clone();
    }

    let out = match &**v {
        TripValue::LambdaVar { name } if name == old => TripValue::lambda_var(new),
        TripValue::SysFVar { name } if name == old => TripValue::sysf_var(new),
        TripValue::LambdaVar { .. }
        | TripValue::SysFVar { .. }
        | TripValue::TypeVar { .. }
        | TripValue::Terminal { .. } => v.clone(),
        TripValue::LambdaAbs { param, body } => {
            if param == old {
                v.clone()
            } else {
                let b = rename_term_go(body, old, new, memo);
                if Rc::ptr_eq(&b, body) {
                    v.clone()
                } else {
                    TripValue::lambda_abs(param.clone(), b)
                }
            }
        }
        TripValue::TypedAbs {
            param,
            param_type,
            body,
        } => {
            if param == old {
                v.clone()
            } else {
                let b = rename_term_go(body, old, new, memo);
                if Rc::ptr_eq(&b, body) {
                    v.clone()
                } else {
                    TripValue::typed_abs(param.clone(), param_type.clone(), b)
                }
            }
        }
        TripValue::SysFAbs {
            param,
            param_type,
            body,
        } => {
            if param == old {
                v.clone()
            } else {
                let b = rename_term_go(body, old, new, memo);
                if Rc::ptr_eq(&b, body) {
                    v.clone()
                } else {
                    TripValue::sysf_abs(param.clone(), param_type.clone(), b)
                }
            }
        }
        TripValue::SysFTypeAbs { type_var, body } => {
            let b = rename_term_go(body, old, new, memo);
            if Rc::ptr_eq(&b, body) {
                v.clone()
            } else {
                TripValue::sysf_type_abs(type_var.clone(), b)
            }
        }
        TripValue::Forall { type_var, body } => {
            let b = rename_term_go(body, old, new, memo);
            if Rc::ptr_eq(&b, body) {
                v.clone()
            } else {
                TripValue::forall(type_var.clone(), b)
            }
        }
        TripValue::SysFTypeApp { term, type_arg } => {
            let t = rename_term_go(term, old, new, memo);
            if Rc::ptr_eq(&t, term) {
                v.clone()
            } else {
                TripValue::sysf_type_app(t, type_arg.clone())
            }
        }
        TripValue::TypeApp { .. } => v.clone(),
        TripValue::SysFLet { name, value, body } => {
            let value2 = rename_term_go(value, old, new, memo);
            let body2 = if name == old {
                body.clone()
            } else {
                rename_term_go(body, old, new, memo)
            };
            if Rc::ptr_eq(&value2, value) && Rc::ptr_eq(&body2, body) {
                v.clone()
            } else {
                TripValue::sysf_let(name.clone(), value2, body2)
            }
        }
        TripValue::SysFMatch {
            scrutinee,
            return_type,
            arms,
        } => {
            let scrutinee2 = rename_term_go(scrutinee, old, new, memo);
            let mut changed = !Rc::ptr_eq(&scrutinee2, scrutinee);
            let mut arms2 = Vec::with_capacity(arms.len());
            for arm in arms {
                let body2 = if arm.params.iter().any(|p| p == old) {
                    arm.body.clone()
                } else {
                    rename_term_go(&arm.body, old, new, memo)
                };
                changed |= !Rc::ptr_eq(&body2, &arm.body);
                arms2.push(MatchArm {
                    ctor: arm.ctor.clone(),
                    params: arm.params.clone(),
                    body: body2,
                });
            }
            if changed {
                TripValue::sysf_match(scrutinee2, return_type.clone(), arms2)
            } else {
                v.clone()
            }
        }
        TripValue::App { lft, rgt } => {
            let l = rename_term_go(lft, old, new, memo);
            let r = rename_term_go(rgt, old, new, memo);
            if Rc::ptr_eq(&l, lft) && Rc::ptr_eq(&r, rgt) {
                v.clone()
            } else {
                TripValue::app(l, r)
            }
        }
    };

    memo.insert(key, out.clone());
    out
}

/// Rename every free occurrence of the type variable `old` in `v` to `new`.
///
/// A `Forall` or type abstraction binding `old` shadows. Term binders are
/// transparent. Unchanged subtrees keep their `Rc`.
pub fn rename_type_var(v: &TermRef, old: &str, new: &str) -> TermRef {
    let mut memo = Memo::new();
    rename_type_go(v, old, new, &mut memo)
}

fn rename_type_go(v: &TermRef, old: &str, new: &str, memo: &mut Memo) -> TermRef {
    let key = Rc::as_ptr(v);
    if let Some(out) = memo.get(&key) {
        return out.clone();
    }

    let out = match &**v {
        TripValue::TypeVar { name } if name == old => TripValue::type_var(new),
        TripValue::TypeVar { .. }
        | TripValue::LambdaVar { .. }
        | TripValue::SysFVar { .. }
        | TripValue::Terminal { .. } => v.clone(),
        TripValue::SysFTypeAbs { type_var, body } => {
            if type_var == old {
                v.clone()
            } else {
                let b = rename_type_go(body, old, new, memo);
                if Rc::ptr_eq(&b, body) {
                    v.clone()
                } else {
                    TripValue::sysf_type_abs(type_var.clone(), b)
                }
            }
        }
        TripValue::Forall { type_var, body } => {
            if type_var == old {
                v.clone()
            } else {
                let b = rename_type_go(body, old, new, memo);
                if Rc::ptr_eq(&b, body) {
                    v.clone()
                } else {
                    TripValue::forall(type_var.clone(), b)
                }
            }
        }
        TripValue::LambdaAbs { param, body } => {
            let b = rename_type_go(body, old, new, memo);
            if Rc::ptr_eq(&b, body) {
                v.clone()
            } else {
                TripValue::lambda_abs(param.clone(), b)
            }
        }
        TripValue::TypedAbs {
            param,
            param_type,
            body,
        } => {
            let pt = rename_type_go(param_type, old, new, memo);
            let b = rename_type_go(body, old, new, memo);
            if Rc::ptr_eq(&pt, param_type) && Rc::ptr_eq(&b, body) {
                v.clone()
            } else {
                TripValue::typed_abs(param.clone(), pt, b)
            }
        }
        TripValue::SysFAbs {
            param,
            param_type,
            body,
        } => {
            let pt = rename_type_go(param_type, old, new, memo);
            let b = rename_type_go(body, old, new, memo);
            if Rc::ptr_eq(&pt, param_type) && Rc::ptr_eq(&b, body) {
                v.clone()
            } else {
                TripValue::sysf_abs(param.clone(), pt, b)
            }
        }
        TripValue::SysFTypeApp { term, type_arg } => {
            let t = rename_type_go(term, old, new, memo);
            let ta = rename_type_go(type_arg, old, new, memo);
            if Rc::ptr_eq(&t, term) && Rc::ptr_eq(&ta, type_arg) {
                v.clone()
            } else {
                TripValue::sysf_type_app(t, ta)
            }
        }
        TripValue::TypeApp { func, arg } => {
            let f = rename_type_go(func, old, new, memo);
            let a = rename_type_go(arg, old, new, memo);
            if Rc::ptr_eq(&f, func) && Rc::ptr_eq(&a, arg) {
                v.clone()
            } else {
                TripValue::type_app(f, a)
            }
        }
        TripValue::SysFLet { name, value, body } => {
            let value2 = rename_type_go(value, old, new, memo);
            let body2 = rename_type_go(body, old, new, memo);
            if Rc::ptr_eq(&value2, value) && Rc::ptr_eq(&body2, body) {
                v.clone()
            } else {
                TripValue::sysf_let(name.clone(), value2, body2)
            }
        }
        TripValue::SysFMatch {
            scrutinee,
            return_type,
            arms,
        } => {
            let scrutinee2 = rename_type_go(scrutinee, old, new, memo);
            let return_type2 = rename_type_go(return_type, old, new, memo);
            let mut changed =
                !Rc::ptr_eq(&scrutinee2, scrutinee) || !Rc::ptr_eq(&return_type2, return_type);
            let mut arms2 = Vec::with_capacity(arms.len());
            for arm in arms {
                let body2 = rename_type_go(&arm.body, old, new, memo);
                changed |= !Rc::ptr_eq(&body2, &arm.body);
                arms2.push(MatchArm {
                    ctor: arm.ctor.clone(),
                    params: arm.params.clone(),
                    body: body2,
                });
            }
            if changed {
                TripValue::sysf_match(scrutinee2, return_type2, arms2)
            } else {
                v.clone()
            }
        }
        TripValue::App { lft, rgt } => {
            let l = rename_type_go(lft, old, new, memo);
            let r = rename_type_go(rgt, old, new, memo);
            if Rc::ptr_eq(&l, lft) && Rc::ptr_eq(&r, rgt) {
                v.clone()
            } else {
                TripValue::app(l, r)
            }
        }
    };

    memo.insert(key, out.clone());
    out
}
