//! System F inference and checking.

use triplang_core::free_vars::FvCache;
use triplang_core::pretty::type_to_string;
use triplang_core::subst::subst_type;
use triplang_core::term::{TermRef, TripValue};

use super::TypeError;
use super::env::TypeEnv;

/// Scoped contexts: term bindings and type-variable bindings.
#[derive(Debug, Default)]
pub struct Ctx {
    terms: Vec<(String, TermRef)>,
    type_vars: Vec<String>,
}

impl Ctx {
    pub fn bind_term(&mut self, name: impl Into<String>, ty: TermRef) {
        self.terms.push((name.into(), ty));
    }

    fn lookup(&self, name: &str) -> Option<&TermRef> {
        self.terms
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, ty)| ty)
    }
}

pub struct SysFChecker<'a> {
    pub env: &'a TypeEnv,
    pub cache: &'a mut FvCache,
}

impl SysFChecker<'_> {
    /// Synthesize the type of a System F term from its binder annotations.
    pub fn infer(&mut self, ctx: &mut Ctx, term: &TermRef) -> Result<TermRef, TypeError> {
        match &**term {
            TripValue::SysFVar { name } => {
                ctx.lookup(name)
                    .cloned()
                    .ok_or_else(|| TypeError::UnknownVariable { name: name.clone() })
            }
            TripValue::SysFAbs {
                param,
                param_type,
                body,
            } => {
                ctx.terms.push((param.clone(), param_type.clone()));
                let body_ty = self.infer(ctx, body);
                ctx.terms.pop();
                Ok(TripValue::arrow(param_type.clone(), body_ty?))
            }
            TripValue::SysFTypeAbs { type_var, body } => {
                ctx.type_vars.push(type_var.clone());
                let body_ty = self.infer(ctx, body);
                ctx.type_vars.pop();
                Ok(TripValue::forall(type_var.clone(), body_ty?))
            }
            TripValue::App { lft, rgt } => {
                let fn_ty = self.infer(ctx, lft)?;
                let fn_ty = self.env.whnf(self.cache, &fn_ty);
                let TripValue::App { lft: dom, rgt: cod } = &*fn_ty else {
                    return Err(TypeError::ArrowExpected {
                        found: type_to_string(&fn_ty),
                    });
                };
                let arg_ty = self.infer(ctx, rgt)?;
                if !self.env.type_eq(self.cache, &arg_ty, dom) {
                    return Err(TypeError::Mismatch {
                        expected: type_to_string(dom),
                        actual: type_to_string(&arg_ty),
                    });
                }
                Ok(cod.clone())
            }
            TripValue::SysFTypeApp {
                term: inner,
                type_arg,
            } => {
                let fn_ty = self.infer(ctx, inner)?;
                let fn_ty = self.env.whnf(self.cache, &fn_ty);
                let TripValue::Forall { type_var, body } = &*fn_ty else {
                    return Err(TypeError::UniversalExpected {
                        found: type_to_string(&fn_ty),
                    });
                };
                Ok(subst_type(self.cache, body, type_var, type_arg))
            }
            TripValue::SysFLet { name, value, body } => {
                // Typed as the immediate application `(\name:T => body) value`
                // with `T` the value's inferred type.
                let value_ty = self.infer(ctx, value)?;
                ctx.terms.push((name.clone(), value_ty));
                let body_ty = self.infer(ctx, body);
                ctx.terms.pop();
                body_ty
            }
            _ => Err(TypeError::StratumViolation {
                node: node_name(term),
            }),
        }
    }
}

pub(super) fn node_name(term: &TermRef) -> &'static str {
    match &**term {
        TripValue::LambdaVar { .. } => "untyped variable",
        TripValue::SysFVar { .. } => "System F variable",
        TripValue::TypeVar { .. } => "type variable",
        TripValue::LambdaAbs { .. } => "untyped abstraction",
        TripValue::TypedAbs { .. } => "typed abstraction",
        TripValue::SysFAbs { .. } => "System F abstraction",
        TripValue::SysFTypeAbs { .. } => "type abstraction",
        TripValue::Forall { .. } => "universal type",
        TripValue::SysFTypeApp { .. } => "type application",
        TripValue::TypeApp { .. } => "type-constructor application",
        TripValue::SysFLet { .. } => "let",
        TripValue::SysFMatch { .. } => "match",
        TripValue::App { .. } => "application",
        TripValue::Terminal { .. } => "combinator",
    }
}
