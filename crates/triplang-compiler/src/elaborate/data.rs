//! `data` expansion and `match` desugaring.
//!
//! A declaration
//!
//! ```text
//! data D p1 .. pk = C1 a11 .. a1m | C2 .. | Cn ..
//! ```
//!
//! expands to the Scott encoding:
//! - `type D = #p1 => .. #pk => #R => (a11 -> .. -> a1m -> R) -> .. -> R`
//! - one `poly Ci` per constructor, abstracting its fields and the
//!   continuations and selecting its own;
//! - one `poly elimD` applying a scrutinee to its continuations.
//!
//! A `match` on constructors of `D` desugars to the same shape: the
//! scrutinee type-applied at the return type, then applied to one
//! continuation per constructor in declaration order.

use std::rc::Rc;

use indexmap::IndexMap;
use triplang_core::def::{DataCtor, Def};
use triplang_core::free_vars::type_names;
use triplang_core::names::fresh_name;
use triplang_core::term::{MatchArm, TermRef, TripValue};

use super::ElaborateError;

/// One expanded `data` declaration, kept around for match desugaring.
#[derive(Debug, Clone)]
pub struct DataInfo {
    pub name: String,
    pub type_params: Vec<String>,
    pub ctors: Vec<DataCtor>,
}

/// Constructor name → owning data declaration.
pub type CtorIndex = IndexMap<String, Rc<DataInfo>>;

/// Replace every `data` definition with its expansion, in place in the
/// definition order, and build the constructor index.
pub fn expand_data_decls(defs: &[Def]) -> Result<(Vec<Def>, CtorIndex), ElaborateError> {
    let mut out = Vec::with_capacity(defs.len());
    let mut ctor_index = CtorIndex::new();

    for def in defs {
        let Def::Data {
            name,
            type_params,
            ctors,
        } = def
        else {
            out.push(def.clone());
            continue;
        };

        for (i, ctor) in ctors.iter().enumerate() {
            if ctors[..i].iter().any(|c| c.name == ctor.name) {
                return Err(ElaborateError::MalformedData {
                    name: name.clone(),
                    reason: format!("duplicate constructor '{}'", ctor.name),
                });
            }
        }

        let info = Rc::new(DataInfo {
            name: name.clone(),
            type_params: type_params.clone(),
            ctors: ctors.clone(),
        });
        for ctor in ctors {
            if ctor_index.contains_key(&ctor.name) {
                return Err(ElaborateError::MalformedData {
                    name: name.clone(),
                    reason: format!("constructor '{}' already declared", ctor.name),
                });
            }
            ctor_index.insert(ctor.name.clone(), info.clone());
        }

        out.push(alias_def(&info));
        for (i, _) in ctors.iter().enumerate() {
            out.push(ctor_def(&info, i));
        }
        out.push(elim_def(&info));
    }

    Ok((out, ctor_index))
}

/// A result-type name not colliding with the data parameters or anything
/// mentioned in the constructor argument types.
fn result_var(info: &DataInfo) -> String {
    let mut avoid: indexmap::IndexSet<String> = info.type_params.iter().cloned().collect();
    for ctor in &info.ctors {
        for arg in &ctor.arg_types {
            type_names(arg, &mut avoid);
        }
    }
    fresh_name("R", |n| avoid.contains(n))
}

/// `a1 -> .. -> am -> R`, the continuation type of one constructor.
fn ctor_arm_type(ctor: &DataCtor, result: &TermRef) -> TermRef {
    ctor.arg_types
        .iter()
        .rev()
        .fold(result.clone(), |acc, arg| TripValue::arrow(arg.clone(), acc))
}

fn alias_def(info: &DataInfo) -> Def {
    let r = result_var(info);
    let result = TripValue::type_var(&r);
    let body = info
        .ctors
        .iter()
        .rev()
        .fold(result.clone(), |acc, ctor| {
            TripValue::arrow(ctor_arm_type(ctor, &result), acc)
        });
    let body = TripValue::forall(&r, body);
    let ty = info
        .type_params
        .iter()
        .rev()
        .fold(body, |acc, p| TripValue::forall(p.clone(), acc));
    Def::Type {
        name: info.name.clone(),
        ty,
    }
}

fn ctor_def(info: &DataInfo, index: usize) -> Def {
    let ctor = &info.ctors[index];
    let r = result_var(info);
    let result = TripValue::type_var(&r);

    let field_names: Vec<String> = (0..ctor.arg_types.len()).map(|i| format!("x{i}")).collect();
    let cont_names: Vec<String> = (0..info.ctors.len()).map(|i| format!("k{i}")).collect();

    // k_i x0 .. xm
    let selected = TripValue::app_spine(
        TripValue::sysf_var(&cont_names[index]),
        field_names.iter().map(TripValue::sysf_var),
    );

    // \k0:.. => .. => k_i x0 .. xm
    let mut term = selected;
    for (i, cont) in cont_names.iter().enumerate().rev() {
        term = TripValue::sysf_abs(cont.clone(), ctor_arm_type(&info.ctors[i], &result), term);
    }
    term = TripValue::sysf_type_abs(&r, term);

    // \x0:a0 => .. => #R => ..
    for (field, arg) in field_names.iter().zip(&ctor.arg_types).rev() {
        term = TripValue::sysf_abs(field.clone(), arg.clone(), term);
    }
    for p in info.type_params.iter().rev() {
        term = TripValue::sysf_type_abs(p.clone(), term);
    }

    Def::Poly {
        name: ctor.name.clone(),
        term,
        ty: None,
        rec: false,
    }
}

fn elim_def(info: &DataInfo) -> Def {
    let r = result_var(info);
    let result = TripValue::type_var(&r);

    // D p1 .. pk
    let scrutinee_ty = info.type_params.iter().fold(
        TripValue::type_var(&info.name),
        |acc, p| TripValue::type_app(acc, TripValue::type_var(p.clone())),
    );

    let cont_names: Vec<String> = (0..info.ctors.len()).map(|i| format!("k{i}")).collect();

    // s [R] k0 .. kn
    let applied = TripValue::app_spine(
        TripValue::sysf_type_app(TripValue::sysf_var("s"), result.clone()),
        cont_names.iter().map(TripValue::sysf_var),
    );

    let mut term = applied;
    for (i, cont) in cont_names.iter().enumerate().rev() {
        term = TripValue::sysf_abs(cont.clone(), ctor_arm_type(&info.ctors[i], &result), term);
    }
    term = TripValue::sysf_abs("s", scrutinee_ty, term);
    term = TripValue::sysf_type_abs(&r, term);
    for p in info.type_params.iter().rev() {
        term = TripValue::sysf_type_abs(p.clone(), term);
    }

    Def::Poly {
        name: format!("elim{}", info.name),
        term,
        ty: None,
        rec: false,
    }
}

/// Desugar every `match` in `term` into a continuation application spine.
pub fn desugar_matches(term: &TermRef, ctor_index: &CtorIndex) -> Result<TermRef, ElaborateError> {
    match &**term {
        TripValue::SysFMatch {
            scrutinee,
            return_type,
            arms,
        } => {
            let scrutinee = desugar_matches(scrutinee, ctor_index)?;
            let first = arms.first().ok_or_else(|| ElaborateError::UnknownCtor {
                ctor: "<empty match>".to_owned(),
            })?;
            let info = ctor_index
                .get(&first.ctor)
                .ok_or_else(|| ElaborateError::UnknownCtor {
                    ctor: first.ctor.clone(),
                })?
                .clone();

            let mut by_ctor: IndexMap<&str, &MatchArm> = IndexMap::new();
            for arm in arms {
                let owner =
                    ctor_index
                        .get(&arm.ctor)
                        .ok_or_else(|| ElaborateError::UnknownCtor {
                            ctor: arm.ctor.clone(),
                        })?;
                if owner.name != info.name {
                    return Err(ElaborateError::MixedCtors {
                        first: info.name.clone(),
                        second: owner.name.clone(),
                    });
                }
                if by_ctor.insert(&arm.ctor, arm).is_some() {
                    return Err(ElaborateError::DuplicateArm {
                        ctor: arm.ctor.clone(),
                    });
                }
            }

            // One continuation per constructor, in declaration order. The
            // continuations are plain lambdas: the encoding is erased before
            // anything typed ever looks at them again.
            let mut spine = TripValue::sysf_type_app(scrutinee, return_type.clone());
            for ctor in &info.ctors {
                let arm = by_ctor
                    .get(ctor.name.as_str())
                    .ok_or_else(|| ElaborateError::MissingArm {
                        ctor: ctor.name.clone(),
                    })?;
                if arm.params.len() != ctor.arg_types.len() {
                    return Err(ElaborateError::ArmArity {
                        ctor: ctor.name.clone(),
                        got: arm.params.len(),
                        want: ctor.arg_types.len(),
                    });
                }
                let body = desugar_matches(&arm.body, ctor_index)?;
                let cont = arm
                    .params
                    .iter()
                    .rev()
                    .fold(body, |acc, p| TripValue::lambda_abs(p.clone(), acc));
                spine = TripValue::app(spine, cont);
            }
            Ok(spine)
        }
        TripValue::LambdaVar { .. }
        | TripValue::SysFVar { .. }
        | TripValue::TypeVar { .. }
        | TripValue::Terminal { .. } => Ok(term.clone()),
        TripValue::LambdaAbs { param, body } => {
            let b = desugar_matches(body, ctor_index)?;
            Ok(if Rc::ptr_eq(&b, body) {
                term.clone()
            } else {
                TripValue::lambda_abs(param.clone(), b)
            })
        }
        TripValue::TypedAbs {
            param,
            param_type,
            body,
        } => {
            let b = desugar_matches(body, ctor_index)?;
            Ok(if Rc::ptr_eq(&b, body) {
                term.clone()
            } else {
                TripValue::typed_abs(param.clone(), param_type.clone(), b)
            })
        }
        TripValue::SysFAbs {
            param,
            param_type,
            body,
        } => {
            let b = desugar_matches(body, ctor_index)?;
            Ok(if Rc::ptr_eq(&b, body) {
                term.clone()
            } else {
                TripValue::sysf_abs(param.clone(), param_type.clone(), b)
            })
        }
        TripValue::SysFTypeAbs { type_var, body } => {
            let b = desugar_matches(body, ctor_index)?;
            Ok(if Rc::ptr_eq(&b, body) {
                term.clone()
            } else {
                TripValue::sysf_type_abs(type_var.clone(), b)
            })
        }
        TripValue::Forall { .. } => Ok(term.clone()),
        TripValue::SysFTypeApp {
            term: inner,
            type_arg,
        } => {
            let t = desugar_matches(inner, ctor_index)?;
            Ok(if Rc::ptr_eq(&t, inner) {
                term.clone()
            } else {
                TripValue::sysf_type_app(t, type_arg.clone())
            })
        }
        TripValue::TypeApp { .. } => Ok(term.clone()),
        TripValue::SysFLet { name, value, body } => {
            let v = desugar_matches(value, ctor_index)?;
            let b = desugar_matches(body, ctor_index)?;
            Ok(if Rc::ptr_eq(&v, value) && Rc::ptr_eq(&b, body) {
                term.clone()
            } else {
                TripValue::sysf_let(name.clone(), v, b)
            })
        }
        TripValue::App { lft, rgt } => {
            let l = desugar_matches(lft, ctor_index)?;
            let r = desugar_matches(rgt, ctor_index)?;
            Ok(if Rc::ptr_eq(&l, lft) && Rc::ptr_eq(&r, rgt) {
                term.clone()
            } else {
                TripValue::app(l, r)
            })
        }
    }
}
