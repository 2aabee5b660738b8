//! Structural hashing, used by the linker's fix-point convergence check.
//!
//! Fix-point rounds build heavily shared trees (every substitution site gets
//! the same handle), so the hash walks each distinct node once and combines
//! child digests, instead of unfolding the sharing.

use std::collections::HashMap;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::mem::discriminant;
use std::rc::Rc;

use crate::term::{TermRef, TripValue};

/// Hash of the term structure. Two structurally equal terms hash equally
/// regardless of how their nodes are shared.
pub fn structural_hash(v: &TermRef) -> u64 {
    let mut memo = HashMap::new();
    hash_node(v, &mut memo)
}

fn hash_node(v: &TermRef, memo: &mut HashMap<*const TripValue, u64>) -> u64 {
    let key = Rc::as_ptr(v);
    if let Some(&known) = memo.get(&key) {
        return known;
    }

    let mut hasher = DefaultHasher::new();
    discriminant(&**v).hash(&mut hasher);
    match &**v {
        TripValue::LambdaVar { name } | TripValue::SysFVar { name } | TripValue::TypeVar { name } => {
            name.hash(&mut hasher);
        }
        TripValue::Terminal { sym } => sym.hash(&mut hasher),
        TripValue::LambdaAbs { param, body } => {
            param.hash(&mut hasher);
            hash_node(body, memo).hash(&mut hasher);
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
            param.hash(&mut hasher);
            hash_node(param_type, memo).hash(&mut hasher);
            hash_node(body, memo).hash(&mut hasher);
        }
        TripValue::SysFTypeAbs { type_var, body } | TripValue::Forall { type_var, body } => {
            type_var.hash(&mut hasher);
            hash_node(body, memo).hash(&mut hasher);
        }
        TripValue::SysFTypeApp { term, type_arg } => {
            hash_node(term, memo).hash(&mut hasher);
            hash_node(type_arg, memo).hash(&mut hasher);
        }
        TripValue::TypeApp { func, arg } => {
            hash_node(func, memo).hash(&mut hasher);
            hash_node(arg, memo).hash(&mut hasher);
        }
        TripValue::SysFLet { name, value, body } => {
            name.hash(&mut hasher);
            hash_node(value, memo).hash(&mut hasher);
            hash_node(body, memo).hash(&mut hasher);
        }
        TripValue::SysFMatch {
            scrutinee,
            return_type,
            arms,
        } => {
            hash_node(scrutinee, memo).hash(&mut hasher);
            hash_node(return_type, memo).hash(&mut hasher);
            arms.len().hash(&mut hasher);
            for arm in arms {
                arm.ctor.hash(&mut hasher);
                arm.params.hash(&mut hasher);
                hash_node(&arm.body, memo).hash(&mut hasher);
            }
        }
        TripValue::App { lft, rgt } => {
            hash_node(lft, memo).hash(&mut hasher);
            hash_node(rgt, memo).hash(&mut hasher);
        }
    }

    let digest = hasher.finish();
    memo.insert(key, digest);
    digest
}
