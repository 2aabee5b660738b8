//! Free-variable analysis.
//!
//! Two entry points with different lifetimes:
//!
//! - [`external_refs`] is the one-shot external-reference scanner used on
//!   definition bodies. It walks iteratively with an explicit work stack and
//!   tracks term and type binders in independent bound sets.
//! - [`FvCache`] memoises free-variable sets by node address for the
//!   duration of a pass. Substitution consults it on every node, which is
//!   what keeps batched substitution non-quadratic on long application
//!   chains.
//!
//! Literal sentinel names are suppressed everywhere: they are opaque atoms,
//! not variable references.

use std::collections::HashMap;
use std::rc::Rc;

use indexmap::IndexSet;

use crate::names;
use crate::term::{TermRef, TripValue};

/// Free term and type references of a subtree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExternalRefs {
    pub terms: IndexSet<String>,
    pub types: IndexSet<String>,
}

impl ExternalRefs {
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty() && self.types.is_empty()
    }
}

enum Op {
    Visit(TermRef),
    BindTerm(String),
    UnbindTerm(String),
    BindType(String),
    UnbindType(String),
}

/// Names used as term or type references inside `v` that are not captured by
/// any binder on the path from the root to the use site.
///
/// The two namespaces are tracked separately: a type binder named `X` does
/// not hide a term variable named `X`.
pub fn external_refs(v: &TermRef) -> ExternalRefs {
    let mut refs = ExternalRefs::default();
    let mut bound_terms: HashMap<String, usize> = HashMap::new();
    let mut bound_types: HashMap<String, usize> = HashMap::new();
    let mut stack = vec![Op::Visit(v.clone())];

    fn bind(set: &mut HashMap<String, usize>, name: &str) {
        *set.entry(name.to_owned()).or_insert(0) += 1;
    }
    fn unbind(set: &mut HashMap<String, usize>, name: &str) {
        if let Some(count) = set.get_mut(name) {
            *count -= 1;
            if *count == 0 {
                set.remove(name);
            }
        }
    }

    while let Some(op) = stack.pop() {
        let node = match op {
            Op::Visit(node) => node,
            Op::BindTerm(name) => {
                bind(&mut bound_terms, &name);
                continue;
            }
            Op::UnbindTerm(name) => {
                unbind(&mut bound_terms, &name);
                continue;
            }
            Op::BindType(name) => {
                bind(&mut bound_types, &name);
                continue;
            }
            Op::UnbindType(name) => {
                unbind(&mut bound_types, &name);
                continue;
            }
        };

        match &*node {
            TripValue::LambdaVar { name } | TripValue::SysFVar { name } => {
                if !names::is_literal(name) && !bound_terms.contains_key(name) {
                    refs.terms.insert(name.clone());
                }
            }
            TripValue::TypeVar { name } => {
                if !bound_types.contains_key(name) {
                    refs.types.insert(name.clone());
                }
            }
            TripValue::LambdaAbs { param, body } => {
                stack.push(Op::UnbindTerm(param.clone()));
                stack.push(Op::Visit(body.clone()));
                stack.push(Op::BindTerm(param.clone()));
            }
            TripValue::TypedAbs {
                param,
                param_type,
                body,
            }
            | TripValue::SysFAbs {
                param,
                param_type,
                body,
            } => {
                stack.push(Op::UnbindTerm(param.clone()));
                stack.push(Op::Visit(body.clone()));
                stack.push(Op::BindTerm(param.clone()));
                stack.push(Op::Visit(param_type.clone()));
            }
            TripValue::SysFTypeAbs { type_var, body } | TripValue::Forall { type_var, body } => {
                stack.push(Op::UnbindType(type_var.clone()));
                stack.push(Op::Visit(body.clone()));
                stack.push(Op::BindType(type_var.clone()));
            }
            TripValue::SysFTypeApp { term, type_arg } => {
                stack.push(Op::Visit(type_arg.clone()));
                stack.push(Op::Visit(term.clone()));
            }
            TripValue::TypeApp { func, arg } => {
                stack.push(Op::Visit(arg.clone()));
                stack.push(Op::Visit(func.clone()));
            }
            TripValue::SysFLet { name, value, body } => {
                stack.push(Op::UnbindTerm(name.clone()));
                stack.push(Op::Visit(body.clone()));
                stack.push(Op::BindTerm(name.clone()));
                stack.push(Op::Visit(value.clone()));
            }
            TripValue::SysFMatch {
                scrutinee,
                return_type,
                arms,
            } => {
                for arm in arms.iter().rev() {
                    for param in &arm.params {
                        stack.push(Op::UnbindTerm(param.clone()));
                    }
                    stack.push(Op::Visit(arm.body.clone()));
                    for param in &arm.params {
                        stack.push(Op::BindTerm(param.clone()));
                    }
                }
                stack.push(Op::Visit(return_type.clone()));
                stack.push(Op::Visit(scrutinee.clone()));
            }
            TripValue::App { lft, rgt } => {
                stack.push(Op::Visit(rgt.clone()));
                stack.push(Op::Visit(lft.clone()));
            }
            TripValue::Terminal { .. } => {}
        }
    }

    refs
}

/// Per-pass memoisation of free-variable sets, keyed by node address.
///
/// Each entry pins an `Rc` of the keyed node, so an address can never be
/// recycled for a different node while the cache is alive. Entries are pure
/// and idempotent; a cache lives for one pass and is dropped with it.
#[derive(Default)]
pub struct FvCache {
    terms: HashMap<*const TripValue, (TermRef, Rc<IndexSet<String>>)>,
    types: HashMap<*const TripValue, (TermRef, Rc<IndexSet<String>>)>,
}

impl FvCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Free term-namespace variables of `v`, memoised.
    pub fn free_term_vars(&mut self, v: &TermRef) -> Rc<IndexSet<String>> {
        let key = Rc::as_ptr(v);
        if let Some((_, set)) = self.terms.get(&key) {
            return set.clone();
        }

        let mut set = IndexSet::new();
        match &**v {
            TripValue::LambdaVar { name } | TripValue::SysFVar { name } => {
                if !names::is_literal(name) {
                    set.insert(name.clone());
                }
            }
            TripValue::TypeVar { .. } | TripValue::Terminal { .. } => {}
            TripValue::LambdaAbs { param, body } => {
                set.extend(self.free_term_vars(body).iter().cloned());
                set.shift_remove(param);
            }
            TripValue::TypedAbs {
                param,
                param_type,
                body,
            }
            | TripValue::SysFAbs {
                param,
                param_type,
                body,
            } => {
                let mut body_fv: IndexSet<String> =
                    self.free_term_vars(body).iter().cloned().collect();
                body_fv.shift_remove(param);
                set.extend(self.free_term_vars(param_type).iter().cloned());
                set.extend(body_fv);
            }
            TripValue::SysFTypeAbs { body, .. } | TripValue::Forall { body, .. } => {
                set.extend(self.free_term_vars(body).iter().cloned());
            }
            TripValue::SysFTypeApp { term, type_arg } => {
                set.extend(self.free_term_vars(term).iter().cloned());
                set.extend(self.free_term_vars(type_arg).iter().cloned());
            }
            TripValue::TypeApp { func, arg } => {
                set.extend(self.free_term_vars(func).iter().cloned());
                set.extend(self.free_term_vars(arg).iter().cloned());
            }
            TripValue::SysFLet { name, value, body } => {
                set.extend(self.free_term_vars(value).iter().cloned());
                let mut body_fv: IndexSet<String> =
                    self.free_term_vars(body).iter().cloned().collect();
                body_fv.shift_remove(name);
                set.extend(body_fv);
            }
            TripValue::SysFMatch {
                scrutinee,
                return_type,
                arms,
            } => {
                set.extend(self.free_term_vars(scrutinee).iter().cloned());
                set.extend(self.free_term_vars(return_type).iter().cloned());
                for arm in arms {
                    let mut arm_fv: IndexSet<String> =
                        self.free_term_vars(&arm.body).iter().cloned().collect();
                    for param in &arm.params {
                        arm_fv.shift_remove(param);
                    }
                    set.extend(arm_fv);
                }
            }
            TripValue::App { lft, rgt } => {
                set.extend(self.free_term_vars(lft).iter().cloned());
                set.extend(self.free_term_vars(rgt).iter().cloned());
            }
        }

        let set = Rc::new(set);
        self.terms.insert(key, (v.clone(), set.clone()));
        set
    }

    /// Free type-namespace variables of `v`, memoised.
    pub fn free_type_vars(&mut self, v: &TermRef) -> Rc<IndexSet<String>> {
        let key = Rc::as_ptr(v);
        if let Some((_, set)) = self.types.get(&key) {
            return set.clone();
        }

        let mut set = IndexSet::new();
        match &**v {
            TripValue::TypeVar { name } => {
                set.insert(name.clone());
            }
            TripValue::LambdaVar { .. } | TripValue::SysFVar { .. } | TripValue::Terminal { .. } => {
            }
            TripValue::LambdaAbs { body, .. } => {
                set.extend(self.free_type_vars(body).iter().cloned());
            }
            TripValue::TypedAbs {
                param_type, body, ..
            }
            | TripValue::SysFAbs {
                param_type, body, ..
            } => {
                set.extend(self.free_type_vars(param_type).iter().cloned());
                set.extend(self.free_type_vars(body).iter().cloned());
            }
            TripValue::SysFTypeAbs { type_var, body } | TripValue::Forall { type_var, body } => {
                let mut body_fv: IndexSet<String> =
                    self.free_type_vars(body).iter().cloned().collect();
                body_fv.shift_remove(type_var);
                set.extend(body_fv);
            }
            TripValue::SysFTypeApp { term, type_arg } => {
                set.extend(self.free_type_vars(term).iter().cloned());
                set.extend(self.free_type_vars(type_arg).iter().cloned());
            }
            TripValue::TypeApp { func, arg } => {
                set.extend(self.free_type_vars(func).iter().cloned());
                set.extend(self.free_type_vars(arg).iter().cloned());
            }
            TripValue::SysFLet { value, body, .. } => {
                set.extend(self.free_type_vars(value).iter().cloned());
                set.extend(self.free_type_vars(body).iter().cloned());
            }
            TripValue::SysFMatch {
                scrutinee,
                return_type,
                arms,
            } => {
                set.extend(self.free_type_vars(scrutinee).iter().cloned());
                set.extend(self.free_type_vars(return_type).iter().cloned());
                for arm in arms {
                    set.extend(self.free_type_vars(&arm.body).iter().cloned());
                }
            }
            TripValue::App { lft, rgt } => {
                set.extend(self.free_type_vars(lft).iter().cloned());
                set.extend(self.free_type_vars(rgt).iter().cloned());
            }
        }

        let set = Rc::new(set);
        self.types.insert(key, (v.clone(), set.clone()));
        set
    }
}

/// Every term-namespace name appearing in `v`, bound or free, binder or use.
/// Used as an avoid-set when inventing fresh names.
pub fn term_names(v: &TermRef, out: &mut IndexSet<String>) {
    match &**v {
        TripValue::LambdaVar { name } | TripValue::SysFVar { name } => {
            out.insert(name.clone());
        }
        TripValue::TypeVar { .. } | TripValue::Terminal { .. } => {}
        TripValue::LambdaAbs { param, body } => {
            out.insert(param.clone());
            term_names(body, out);
        }
        TripValue::TypedAbs {
            param,
            param_type,
            body,
        }
        | TripValue::SysFAbs {
            param,
            param_type,
            body,
        } => {
            out.insert(param.clone());
            term_names(param_type, out);
            term_names(body, out);
        }
        TripValue::SysFTypeAbs { body, .. } | TripValue::Forall { body, .. } => {
            term_names(body, out);
        }
        TripValue::SysFTypeApp { term, type_arg } => {
            term_names(term, out);
            term_names(type_arg, out);
        }
        TripValue::TypeApp { func, arg } => {
            term_names(func, out);
            term_names(arg, out);
        }
        TripValue::SysFLet { name, value, body } => {
            out.insert(name.clone());
            term_names(value, out);
            term_names(body, out);
        }
        TripValue::SysFMatch {
            scrutinee,
            return_type,
            arms,
        } => {
            term_names(scrutinee, out);
            term_names(return_type, out);
            for arm in arms {
                out.extend(arm.params.iter().cloned());
                term_names(&arm.body, out);
            }
        }
        TripValue::App { lft, rgt } => {
            term_names(lft, out);
            term_names(rgt, out);
        }
    }
}

/// Every type-namespace name appearing in `v`, bound or free.
pub fn type_names(v: &TermRef, out: &mut IndexSet<String>) {
    match &**v {
        TripValue::TypeVar { name } => {
            out.insert(name.clone());
        }
        TripValue::LambdaVar { .. } | TripValue::SysFVar { .. } | TripValue::Terminal { .. } => {}
        TripValue::LambdaAbs { body, .. } => type_names(body, out),
        TripValue::TypedAbs {
            param_type, body, ..
        }
        | TripValue::SysFAbs {
            param_type, body, ..
        } => {
            type_names(param_type, out);
            type_names(body, out);
        }
        TripValue::SysFTypeAbs { type_var, body } | TripValue::Forall { type_var, body } => {
            out.insert(type_var.clone());
            type_names(body, out);
        }
        TripValue::SysFTypeApp { term, type_arg } => {
            type_names(term, out);
            type_names(type_arg, out);
        }
        TripValue::TypeApp { func, arg } => {
            type_names(func, out);
            type_names(arg, out);
        }
        TripValue::SysFLet { value, body, .. } => {
            type_names(value, out);
            type_names(body, out);
        }
        TripValue::SysFMatch {
            scrutinee,
            return_type,
            arms,
        } => {
            type_names(scrutinee, out);
            type_names(return_type, out);
            for arm in arms {
                type_names(&arm.body, out);
            }
        }
        TripValue::App { lft, rgt } => {
            type_names(lft, out);
            type_names(rgt, out);
        }
    }
}
