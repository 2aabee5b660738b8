//! Simply typed λ checking.

use triplang_core::free_vars::FvCache;
use triplang_core::pretty::type_to_string;
use triplang_core::term::{TermRef, TripValue};

use super::TypeError;
use super::env::TypeEnv;
use super::sysf::node_name;

pub struct SimpleChecker<'a> {
    pub env: &'a TypeEnv,
    pub cache: &'a mut FvCache,
}

impl SimpleChecker<'_> {
    /// Synthesize the type of a simply typed term.
    pub fn infer(
        &mut self,
        ctx: &mut Vec<(String, TermRef)>,
        term: &TermRef,
    ) -> Result<TermRef, TypeError> {
        match &**term {
            TripValue::LambdaVar { name } => ctx
                .iter()
                .rev()
                .find(|(n, _)| n == name)
                .map(|(_, ty)| ty.clone())
                .ok_or_else(|| TypeError::UnknownVariable { name: name.clone() }),
            TripValue::TypedAbs {
                param,
                param_type,
                body,
            } => {
                ctx.push((param.clone(), param_type.clone()));
                let body_ty = self.infer(ctx, body);
                ctx.pop();
                Ok(TripValue::arrow(param_type.clone(), body_ty?))
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
            _ => Err(TypeError::StratumViolation {
                node: node_name(term),
            }),
        }
    }
}
