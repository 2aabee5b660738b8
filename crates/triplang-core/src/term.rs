//! Term representation shared by all four strata.
//!
//! A single sum type covers System F, simply typed λ, untyped λ, SKI
//! combinators, and the type language. `App` is context-sensitive: in term
//! position it is application, in type position it is the arrow. Types and
//! data-constructor spines reuse the same node shapes, distinguished by the
//! surrounding context.
//!
//! Child links are `Rc` so that:
//! - substitution can return its input unchanged (pointer identity) when a
//!   subtree contains no occurrence of the substituted name;
//! - free-variable sets can be cached by node address across a pass;
//! - the linker's fix-point rounds share unchanged subtrees instead of
//!   copying them.

use std::rc::Rc;

use serde::{Deserialize, Serialize};

/// Shared handle to a term or type node.
pub type TermRef = Rc<TripValue>;

/// SKI combinator atoms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Combinator {
    S,
    K,
    I,
}

impl std::fmt::Display for Combinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Combinator::S => write!(f, "S"),
            Combinator::K => write!(f, "K"),
            Combinator::I => write!(f, "I"),
        }
    }
}

/// One arm of a tagged-sum elimination.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatchArm {
    pub ctor: String,
    #[serde(default)]
    pub params: Vec<String>,
    pub body: TermRef,
}

/// Terms and types of every stratum.
///
/// `LambdaVar` and `SysFVar` play the same runtime role; the tag records
/// which stratum introduced the reference. `TypeVar` lives in the independent
/// type namespace: a type variable named `X` never shadows a term variable
/// named `X`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum TripValue {
    /// Untyped / simply-typed term variable reference.
    LambdaVar {
        #[serde(with = "lit_name")]
        name: String,
    },
    /// System F term variable reference.
    SysFVar {
        #[serde(with = "lit_name")]
        name: String,
    },
    /// Type variable reference.
    TypeVar { name: String },
    /// Untyped abstraction `\x => body`.
    LambdaAbs { param: String, body: TermRef },
    /// Simply typed abstraction `\x:T => body`.
    TypedAbs {
        param: String,
        param_type: TermRef,
        body: TermRef,
    },
    /// System F term abstraction `\x:T => body`.
    SysFAbs {
        param: String,
        param_type: TermRef,
        body: TermRef,
    },
    /// Term-level type abstraction `#X => body`.
    SysFTypeAbs { type_var: String, body: TermRef },
    /// Universal quantification `#X => T` at type level.
    Forall { type_var: String, body: TermRef },
    /// Term-level type application `term [T]`.
    SysFTypeApp { term: TermRef, type_arg: TermRef },
    /// Type-constructor application `F A`.
    TypeApp {
        #[serde(rename = "fn")]
        func: TermRef,
        arg: TermRef,
    },
    /// Non-recursive let binding.
    SysFLet {
        name: String,
        value: TermRef,
        body: TermRef,
    },
    /// Tagged-sum elimination; desugared away by elaboration.
    SysFMatch {
        scrutinee: TermRef,
        return_type: TermRef,
        arms: Vec<MatchArm>,
    },
    /// Applicative composition: term application, ctor spines, and the arrow
    /// in type position.
    App { lft: TermRef, rgt: TermRef },
    /// SKI atom.
    Terminal { sym: Combinator },
}

impl TripValue {
    pub fn lambda_var(name: impl Into<String>) -> TermRef {
        Rc::new(TripValue::LambdaVar { name: name.into() })
    }

    pub fn sysf_var(name: impl Into<String>) -> TermRef {
        Rc::new(TripValue::SysFVar { name: name.into() })
    }

    pub fn type_var(name: impl Into<String>) -> TermRef {
        Rc::new(TripValue::TypeVar { name: name.into() })
    }

    pub fn lambda_abs(param: impl Into<String>, body: TermRef) -> TermRef {
        Rc::new(TripValue::LambdaAbs {
            param: param.into(),
            body,
        })
    }

    pub fn typed_abs(param: impl Into<String>, param_type: TermRef, body: TermRef) -> TermRef {
        Rc::new(TripValue::TypedAbs {
            param: param.into(),
            param_type,
            body,
        })
    }

    pub fn sysf_abs(param: impl Into<String>, param_type: TermRef, body: TermRef) -> TermRef {
        Rc::new(TripValue::SysFAbs {
            param: param.into(),
            param_type,
            body,
        })
    }

    pub fn sysf_type_abs(type_var: impl Into<String>, body: TermRef) -> TermRef {
        Rc::new(TripValue::SysFTypeAbs {
            type_var: type_var.into(),
            body,
        })
    }

    pub fn forall(type_var: impl Into<String>, body: TermRef) -> TermRef {
        Rc::new(TripValue::Forall {
            type_var: type_var.into(),
            body,
        })
    }

    pub fn sysf_type_app(term: TermRef, type_arg: TermRef) -> TermRef {
        Rc::new(TripValue::SysFTypeApp { term, type_arg })
    }

    pub fn type_app(func: TermRef, arg: TermRef) -> TermRef {
        Rc::new(TripValue::TypeApp { func, arg })
    }

    pub fn sysf_let(name: impl Into<String>, value: TermRef, body: TermRef) -> TermRef {
        Rc::new(TripValue::SysFLet {
            name: name.into(),
            value,
            body,
        })
    }

    pub fn sysf_match(scrutinee: TermRef, return_type: TermRef, arms: Vec<MatchArm>) -> TermRef {
        Rc::new(TripValue::SysFMatch {
            scrutinee,
            return_type,
            arms,
        })
    }

    pub fn app(lft: TermRef, rgt: TermRef) -> TermRef {
        Rc::new(TripValue::App { lft, rgt })
    }

    /// Left-associated application spine `head a b c`.
    pub fn app_spine(head: TermRef, args: impl IntoIterator<Item = TermRef>) -> TermRef {
        args.into_iter().fold(head, TripValue::app)
    }

    /// The arrow `dom -> cod`; an `App` read in type position.
    pub fn arrow(dom: TermRef, cod: TermRef) -> TermRef {
        TripValue::app(dom, cod)
    }

    pub fn terminal(sym: Combinator) -> TermRef {
        Rc::new(TripValue::Terminal { sym })
    }

    /// The name of a term-namespace variable reference, if this is one.
    pub fn term_var_name(&self) -> Option<&str> {
        match self {
            TripValue::LambdaVar { name } | TripValue::SysFVar { name } => Some(name),
            _ => None,
        }
    }

    /// True for the three SKI atoms.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TripValue::Terminal { .. })
    }
}

/// Serde codec for variable-name fields: literal sentinel names carry their
/// big-integer value as `{"__trip_bigint__": "<decimal>"}`, plain names as
/// JSON strings.
mod lit_name {
    use serde::de::{self, MapAccess, Visitor};
    use serde::ser::SerializeMap;
    use serde::{Deserializer, Serializer};

    use crate::names;

    pub fn serialize<S: Serializer>(name: &str, ser: S) -> Result<S::Ok, S::Error> {
        match names::literal_digits(name) {
            Some(digits) => {
                let mut map = ser.serialize_map(Some(1))?;
                map.serialize_entry(names::BIGINT_TAG, digits)?;
                map.end()
            }
            None => ser.serialize_str(name),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<String, D::Error> {
        struct NameVisitor;

        impl<'de> Visitor<'de> for NameVisitor {
            type Value = String;

            fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "a variable name or a tagged big integer")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<String, E> {
                Ok(v.to_owned())
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<String, A::Error> {
                let Some((key, digits)) = map.next_entry::<String, String>()? else {
                    return Err(de::Error::custom("empty big-integer object"));
                };
                if key != names::BIGINT_TAG {
                    return Err(de::Error::unknown_field(&key, &[names::BIGINT_TAG]));
                }
                names::literal_name_from_digits(&digits).map_err(de::Error::custom)
            }
        }

        de.deserialize_any(NameVisitor)
    }
}
