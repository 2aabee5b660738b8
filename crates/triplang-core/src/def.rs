//! Top-level definitions and programs.

use serde::{Deserialize, Serialize};

use crate::term::TermRef;

/// Stratum of a term definition. Lowering is monotone: a definition only
/// ever moves toward `Combinator`, which is the fixed point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Combinator = 1,
    Untyped = 2,
    Typed = 3,
    Poly = 4,
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Level::Combinator => write!(f, "combinator"),
            Level::Untyped => write!(f, "untyped"),
            Level::Typed => write!(f, "typed"),
            Level::Poly => write!(f, "poly"),
        }
    }
}

/// One constructor of a `data` declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataCtor {
    pub name: String,
    #[serde(default)]
    pub arg_types: Vec<TermRef>,
}

/// A top-level definition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Def {
    /// `module M`; at most one per program.
    Module { name: String },
    /// `import M sym`.
    Import {
        module_ref: String,
        symbol_ref: String,
    },
    /// `export sym`.
    Export { symbol_ref: String },
    /// System F definition, optionally annotated, optionally recursive.
    Poly {
        name: String,
        term: TermRef,
        #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
        ty: Option<TermRef>,
        #[serde(default)]
        rec: bool,
    },
    /// Simply typed definition, optionally annotated.
    Typed {
        name: String,
        term: TermRef,
        #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
        ty: Option<TermRef>,
    },
    /// Untyped λ definition.
    Untyped { name: String, term: TermRef },
    /// SKI definition.
    Combinator { name: String, term: TermRef },
    /// Type alias.
    Type {
        name: String,
        #[serde(rename = "type")]
        ty: TermRef,
    },
    /// Algebraic data declaration; expanded by elaboration.
    Data {
        name: String,
        #[serde(default)]
        type_params: Vec<String>,
        ctors: Vec<DataCtor>,
    },
}

impl Def {
    /// The name this definition introduces, if any. Module, import, and
    /// export declarations introduce nothing.
    pub fn defined_name(&self) -> Option<&str> {
        match self {
            Def::Module { .. } | Def::Import { .. } | Def::Export { .. } => None,
            Def::Poly { name, .. }
            | Def::Typed { name, .. }
            | Def::Untyped { name, .. }
            | Def::Combinator { name, .. }
            | Def::Type { name, .. }
            | Def::Data { name, .. } => Some(name),
        }
    }

    /// The stratum of a term definition; `None` for everything else.
    pub fn level(&self) -> Option<Level> {
        match self {
            Def::Poly { .. } => Some(Level::Poly),
            Def::Typed { .. } => Some(Level::Typed),
            Def::Untyped { .. } => Some(Level::Untyped),
            Def::Combinator { .. } => Some(Level::Combinator),
            _ => None,
        }
    }

    /// The defined term value, for term definitions.
    pub fn term(&self) -> Option<&TermRef> {
        match self {
            Def::Poly { term, .. }
            | Def::Typed { term, .. }
            | Def::Untyped { term, .. }
            | Def::Combinator { term, .. } => Some(term),
            _ => None,
        }
    }

    /// Replace the term value, keeping everything else.
    pub fn with_term(&self, term: TermRef) -> Def {
        match self {
            Def::Poly { name, ty, rec, .. } => Def::Poly {
                name: name.clone(),
                term,
                ty: ty.clone(),
                rec: *rec,
            },
            Def::Typed { name, ty, .. } => Def::Typed {
                name: name.clone(),
                term,
                ty: ty.clone(),
            },
            Def::Untyped { name, .. } => Def::Untyped {
                name: name.clone(),
                term,
            },
            Def::Combinator { name, .. } => Def::Combinator {
                name: name.clone(),
                term,
            },
            other => other.clone(),
        }
    }

    /// True for poly/typed/untyped/combinator definitions.
    pub fn is_term_def(&self) -> bool {
        self.level().is_some()
    }

    /// True for `rec`-marked definitions.
    pub fn is_rec(&self) -> bool {
        matches!(self, Def::Poly { rec: true, .. })
    }
}

/// An ordered list of definitions with at most one module declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    pub defs: Vec<Def>,
}

impl Program {
    pub fn new(defs: Vec<Def>) -> Self {
        Self { defs }
    }

    /// The declared module name, if present.
    pub fn module_name(&self) -> Option<&str> {
        self.defs.iter().find_map(|d| match d {
            Def::Module { name } => Some(name.as_str()),
            _ => None,
        })
    }

    /// Declared imports as `(module, symbol)` pairs, in source order.
    pub fn imports(&self) -> impl Iterator<Item = (&str, &str)> {
        self.defs.iter().filter_map(|d| match d {
            Def::Import {
                module_ref,
                symbol_ref,
            } => Some((module_ref.as_str(), symbol_ref.as_str())),
            _ => None,
        })
    }

    /// Declared exports, in source order.
    pub fn exports(&self) -> impl Iterator<Item = &str> {
        self.defs.iter().filter_map(|d| match d {
            Def::Export { symbol_ref } => Some(symbol_ref.as_str()),
            _ => None,
        })
    }

    /// Names imported into this module's scope.
    pub fn imported_names(&self) -> impl Iterator<Item = &str> {
        self.imports().map(|(_, sym)| sym)
    }
}
