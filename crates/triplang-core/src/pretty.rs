//! Pretty printer for terms and types.
//!
//! `App` is context-sensitive, so printing is too: in term position it is
//! juxtaposition, in type position it is the arrow. Output uses the surface
//! syntax and re-parses to the same structure. Literal sentinels print as
//! their decimal value.

use crate::names;
use crate::term::{TermRef, TripValue};

/// Render `v` as a term.
pub fn term_to_string(v: &TermRef) -> String {
    let mut out = String::new();
    write_term(&mut out, v, TermPrec::Low);
    out
}

/// Render `v` as a type.
pub fn type_to_string(v: &TermRef) -> String {
    let mut out = String::new();
    write_type(&mut out, v, TypePrec::Low);
    out
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum TermPrec {
    /// Lambda bodies, let/match bodies.
    Low,
    /// Function position of an application.
    App,
    /// Argument position of an application.
    Atom,
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum TypePrec {
    /// Forall bodies, arrow codomains.
    Low,
    /// Arrow domains.
    Arrow,
    /// Type-constructor application operands.
    Atom,
}

fn var_image(name: &str) -> String {
    match names::literal_digits(name) {
        Some(digits) => digits.to_owned(),
        None => name.to_owned(),
    }
}

fn write_term(out: &mut String, v: &TermRef, prec: TermPrec) {
    match &**v {
        TripValue::LambdaVar { name } | TripValue::SysFVar { name } => {
            out.push_str(&var_image(name));
        }
        TripValue::TypeVar { name } => out.push_str(name),
        TripValue::Terminal { sym } => out.push_str(&sym.to_string()),
        TripValue::App { lft, rgt } => {
            parens(out, prec > TermPrec::App, |out| {
                write_term(out, lft, TermPrec::App);
                out.push(' ');
                write_term(out, rgt, TermPrec::Atom);
            });
        }
        TripValue::SysFTypeApp { term, type_arg } => {
            parens(out, prec > TermPrec::App, |out| {
                write_term(out, term, TermPrec::App);
                out.push_str(" [");
                write_type(out, type_arg, TypePrec::Low);
                out.push(']');
            });
        }
        TripValue::LambdaAbs { param, body } => {
            parens(out, prec > TermPrec::Low, |out| {
                out.push('\\');
                out.push_str(param);
                out.push_str(" => ");
                write_term(out, body, TermPrec::Low);
            });
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
            parens(out, prec > TermPrec::Low, |out| {
                out.push('\\');
                out.push_str(param);
                out.push(':');
                write_type(out, param_type, TypePrec::Atom);
                out.push_str(" => ");
                write_term(out, body, TermPrec::Low);
            });
        }
        TripValue::SysFTypeAbs { type_var, body } => {
            parens(out, prec > TermPrec::Low, |out| {
                out.push('#');
                out.push_str(type_var);
                out.push_str(" => ");
                write_term(out, body, TermPrec::Low);
            });
        }
        TripValue::Forall { type_var, body } => {
            parens(out, prec > TermPrec::Low, |out| {
                out.push('#');
                out.push_str(type_var);
                out.push_str(" => ");
                write_type(out, body, TypePrec::Low);
            });
        }
        TripValue::TypeApp { .. } => {
            // Type node in term position; render as a type atom.
            parens(out, true, |out| write_type(out, v, TypePrec::Low));
        }
        TripValue::SysFLet { name, value, body } => {
            parens(out, prec > TermPrec::Low, |out| {
                out.push_str("let ");
                out.push_str(name);
                out.push_str(" = ");
                write_term(out, value, TermPrec::Low);
                out.push_str(" in ");
                write_term(out, body, TermPrec::Low);
            });
        }
        TripValue::SysFMatch {
            scrutinee,
            return_type,
            arms,
        } => {
            parens(out, prec > TermPrec::Low, |out| {
                out.push_str("match ");
                write_term(out, scrutinee, TermPrec::App);
                out.push_str(" return ");
                write_type(out, return_type, TypePrec::Atom);
                out.push_str(" { ");
                for (i, arm) in arms.iter().enumerate() {
                    if i > 0 {
                        out.push_str(" | ");
                    }
                    out.push_str(&arm.ctor);
                    for param in &arm.params {
                        out.push(' ');
                        out.push_str(param);
                    }
                    out.push_str(" => ");
                    write_term(out, &arm.body, TermPrec::Low);
                }
                out.push_str(" }");
            });
        }
    }
}

fn write_type(out: &mut String, v: &TermRef, prec: TypePrec) {
    match &**v {
        TripValue::TypeVar { name } => out.push_str(name),
        TripValue::App { lft, rgt } => {
            // The arrow, right-associative.
            parens(out, prec > TypePrec::Low, |out| {
                write_type(out, lft, TypePrec::Arrow);
                out.push_str(" -> ");
                write_type(out, rgt, TypePrec::Low);
            });
        }
        TripValue::TypeApp { func, arg } => {
            parens(out, prec > TypePrec::Arrow, |out| {
                write_type(out, func, TypePrec::Arrow);
                out.push(' ');
                write_type(out, arg, TypePrec::Atom);
            });
        }
        TripValue::Forall { type_var, body } => {
            parens(out, prec > TypePrec::Low, |out| {
                out.push('#');
                out.push_str(type_var);
                out.push_str(" => ");
                write_type(out, body, TypePrec::Low);
            });
        }
        // Term node in type position; render as a term atom.
        _ => parens(out, true, |out| write_term(out, v, TermPrec::Low)),
    }
}

fn parens(out: &mut String, needed: bool, inner: impl FnOnce(&mut String)) {
    if needed {
        out.push('(');
    }
    inner(out);
    if needed {
        out.push(')');
    }
}
