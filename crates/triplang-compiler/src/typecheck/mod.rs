//! Typechecking of resolved modules.
//!
//! `poly` definitions check under System F, `typed` ones under the simply
//! typed rules, both against the module's type-alias environment. Checking
//! is synthesis from binder annotations plus comparison against the declared
//! type where one exists.
//!
//! A definition is *skipped*, not rejected, when its body still contains
//! material this stage cannot judge: references left free for the linker
//! (imports), opaque literal sentinels, or lower-stratum nodes inlined by
//! resolution or produced by `match` desugaring. The linker owns those.
//! Recursive definitions must carry an annotation; the definition name is
//! bound to it before the body is checked.

mod env;
mod simple;
mod sysf;


use thiserror::Error;
use triplang_core::def::{Def, Program};
use triplang_core::free_vars::{FvCache, external_refs};
use triplang_core::names;
use triplang_core::pretty::type_to_string;
use triplang_core::term::{TermRef, TripValue};

pub use env::TypeEnv;
pub use simple::SimpleChecker;
pub use sysf::{Ctx, SysFChecker};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("unknown variable '{name}'")]
    UnknownVariable { name: String },

    #[error("expected a function type, found {found}")]
    ArrowExpected { found: String },

    #[error("expected a universal type, found {found}")]
    UniversalExpected { found: String },

    #[error("type mismatch: expected {expected}, found {actual}")]
    Mismatch { expected: String, actual: String },

    #[error("recursive definition '{name}' needs a type annotation")]
    RecNeedsAnnotation { name: String },

    #[error("stratum violation: {node} is not typeable here")]
    StratumViolation { node: &'static str },

    #[error("definition '{def}' has type {actual}, annotation says {expected}")]
    AnnotationMismatch {
        def: String,
        expected: String,
        actual: String,
    },

    #[error("in definition '{def}'")]
    InDefinition {
        def: String,
        #[source]
        source: Box<TypeError>,
    },
}

impl TypeError {
    fn in_def(self, def: &str) -> TypeError {
        TypeError::InDefinition {
            def: def.to_owned(),
            source: Box::new(self),
        }
    }
}

/// Check every checkable definition of a resolved program.
pub fn typecheck(program: &Program) -> Result<(), TypeError> {
    let env = TypeEnv::from_program(program);
    let mut cache = FvCache::new();

    for def in &program.defs {
        match def {
            Def::Poly {
                name,
                term,
                ty,
                rec,
            } => {
                if *rec && ty.is_none() {
                    return Err(TypeError::RecNeedsAnnotation { name: name.clone() });
                }
                if !poly_checkable(term) || has_foreign_refs(term, *rec, name) {
                    continue;
                }
                let mut ctx = Ctx::default();
                if *rec && let Some(annotation) = ty {
                    ctx.bind_term(name.clone(), annotation.clone());
                }
                let mut checker = SysFChecker {
                    env: &env,
                    cache: &mut cache,
                };
                let inferred = checker.infer(&mut ctx, term).map_err(|e| e.in_def(name))?;
                check_annotation(&env, &mut cache, name, ty.as_ref(), &inferred)?;
            }
            Def::Typed { name, term, ty } => {
                if !typed_checkable(term) || has_foreign_refs(term, false, name) {
                    continue;
                }
                let mut ctx = Vec::new();
                let mut checker = SimpleChecker {
                    env: &env,
                    cache: &mut cache,
                };
                let inferred = checker.infer(&mut ctx, term).map_err(|e| e.in_def(name))?;
                check_annotation(&env, &mut cache, name, ty.as_ref(), &inferred)?;
            }
            _ => {}
        }
    }
    Ok(())
}

fn check_annotation(
    env: &TypeEnv,
    cache: &mut FvCache,
    def: &str,
    annotation: Option<&TermRef>,
    inferred: &TermRef,
) -> Result<(), TypeError> {
    let Some(annotation) = annotation else {
        return Ok(());
    };
    if env.type_eq(cache, inferred, annotation) {
        Ok(())
    } else {
        Err(TypeError::AnnotationMismatch {
            def: def.to_owned(),
            expected: type_to_string(annotation),
            actual: type_to_string(inferred),
        })
    }
}

/// Unresolved term references (beyond the rec self-name) mean the linker
/// finishes this definition; skip it here.
fn has_foreign_refs(term: &TermRef, rec: bool, name: &str) -> bool {
    let mut free = external_refs(term).terms;
    if rec {
        free.shift_remove(name);
    }
    !free.is_empty()
}

/// True when every term-position node belongs to the System F stratum and no
/// literal sentinel is left unexpanded.
fn poly_checkable(term: &TermRef) -> bool {
    match &**term {
        TripValue::SysFVar { name } => !names::is_literal(name),
        TripValue::SysFAbs { body, .. } => poly_checkable(body),
        TripValue::SysFTypeAbs { body, .. } => poly_checkable(body),
        TripValue::SysFTypeApp { term, .. } => poly_checkable(term),
        TripValue::SysFLet { value, body, .. } => poly_checkable(value) && poly_checkable(body),
        TripValue::App { lft, rgt } => poly_checkable(lft) && poly_checkable(rgt),
        _ => false,
    }
}

/// True when every term-position node belongs to the simply typed stratum.
fn typed_checkable(term: &TermRef) -> bool {
    match &**term {
        TripValue::LambdaVar { name } => !names::is_literal(name),
        TripValue::TypedAbs { body, .. } => typed_checkable(body),
        TripValue::App { lft, rgt } => typed_checkable(lft) && typed_checkable(rgt),
        _ => false,
    }
}
