//! Core data model and substitution engine for TripLang.
//!
//! This crate holds everything the compiler and linker share:
//! - `term` / `def`: the AST sum types (`TripValue`, `Def`, `Program`);
//! - `names`: literal sentinels and fresh-name generation;
//! - `free_vars`: the external-reference scanner and the per-pass
//!   free-variable cache;
//! - `subst`: hygienic capture-avoiding substitution, single and batched,
//!   for both the term and the type namespace;
//! - `pretty`: the surface-syntax printer;
//! - `hash`: structural hashing for fix-point convergence;
//! - `numerals`: Church and binary numeral spine builders.

pub mod def;
pub mod free_vars;
pub mod hash;
pub mod names;
pub mod numerals;
pub mod pretty;
pub mod subst;
pub mod term;

#[cfg(test)]
mod def_tests;
#[cfg(test)]
mod free_vars_tests;
#[cfg(test)]
mod names_tests;
#[cfg(test)]
mod subst_tests;
#[cfg(test)]
mod term_tests;

pub use def::{DataCtor, Def, Level, Program};
pub use free_vars::{ExternalRefs, FvCache, external_refs};
pub use hash::structural_hash;
pub use term::{Combinator, MatchArm, TermRef, TripValue};
