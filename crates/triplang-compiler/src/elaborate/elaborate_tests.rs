//! Unit tests for elaboration.

use indoc::indoc;
use triplang_core::def::Def;
use triplang_core::names;
use triplang_core::pretty::{term_to_string, type_to_string};

use crate::index::SymbolTable;
use crate::parser::parse_program;

use super::{ElaborateError, elaborate};

fn run(source: &str) -> Result<triplang_core::def::Program, ElaborateError> {
    let program = parse_program(source).unwrap();
    let table = SymbolTable::build(&program).unwrap();
    elaborate(&program, &table)
}

fn def<'a>(program: &'a triplang_core::def::Program, name: &str) -> &'a Def {
    program
        .defs
        .iter()
        .find(|d| d.defined_name() == Some(name))
        .unwrap_or_else(|| panic!("no definition named {name}"))
}

#[test]
fn data_expands_to_scott_alias_constructors_and_eliminator() {
    let program = run("module M\ndata Maybe a = Just a | Nothing").unwrap();

    let Def::Type { ty, .. } = def(&program, "Maybe") else {
        panic!("expected type alias");
    };
    assert_eq!(type_to_string(ty), "#a => #R => (a -> R) -> R -> R");

    let just = def(&program, "Just").term().unwrap();
    assert_eq!(
        term_to_string(just),
        "#a => \\x0:a => #R => \\k0:(a -> R) => \\k1:R => k0 x0"
    );

    let nothing = def(&program, "Nothing").term().unwrap();
    assert_eq!(
        term_to_string(nothing),
        "#a => #R => \\k0:(a -> R) => \\k1:R => k1"
    );

    let elim = def(&program, "elimMaybe").term().unwrap();
    assert_eq!(
        term_to_string(elim),
        "#a => #R => \\s:(Maybe a) => \\k0:(a -> R) => \\k1:R => s [R] k0 k1"
    );
}

#[test]
fn recursive_data_mentions_itself_in_the_alias() {
    let program = run("module M\ndata List a = Cons a (List a) | Nil").unwrap();

    let Def::Type { ty, .. } = def(&program, "List") else {
        panic!("expected type alias");
    };
    assert_eq!(
        type_to_string(ty),
        "#a => #R => (a -> List a -> R) -> R -> R"
    );
}

#[test]
fn duplicate_constructors_are_malformed() {
    let err = run("module M\ndata D = C | C").unwrap_err();
    assert!(matches!(err, ElaborateError::MalformedData { .. }));
}

#[test]
fn match_desugars_to_continuations_in_declaration_order() {
    let program = run(indoc! {r"
        module M
        data Maybe a = Just a | Nothing
        poly fromJust = \m:(Maybe Nat) => \d:Nat =>
          match m return Nat { Nothing => d | Just x => x }
    "})
    .unwrap();

    let term = def(&program, "fromJust").term().unwrap();
    assert_eq!(
        term_to_string(term),
        "\\m:(Maybe Nat) => \\d:Nat => m [Nat] (\\x => x) d"
    );
}

#[test]
fn match_with_duplicate_arm_is_rejected() {
    let err = run(indoc! {r"
        module M
        data Maybe a = Just a | Nothing
        poly f = \m:(Maybe Nat) => match m return Nat { Just x => x | Just y => y | Nothing => y }
    "})
    .unwrap_err();
    assert!(matches!(err, ElaborateError::DuplicateArm { .. }));
}

#[test]
fn match_missing_an_arm_is_rejected() {
    let err = run(indoc! {r"
        module M
        data Maybe a = Just a | Nothing
        poly f = \m:(Maybe Nat) => match m return Nat { Just x => x }
    "})
    .unwrap_err();
    assert!(matches!(
        err,
        ElaborateError::MissingArm { ctor } if ctor == "Nothing"
    ));
}

#[test]
fn match_arm_arity_is_checked() {
    let err = run(indoc! {r"
        module M
        data Maybe a = Just a | Nothing
        poly f = \m:(Maybe Nat) => match m return Nat { Just x y => x | Nothing => x }
    "})
    .unwrap_err();
    assert!(matches!(
        err,
        ElaborateError::ArmArity { got: 2, want: 1, .. }
    ));
}

#[test]
fn match_on_unknown_constructor_is_rejected() {
    let err = run(indoc! {r"
        module M
        poly f = \m:Nat => match m return Nat { Whatever => m }
    "})
    .unwrap_err();
    assert!(matches!(err, ElaborateError::UnknownCtor { .. }));
}

#[test]
fn typed_annotations_propagate_into_bare_binders() {
    let program = run(indoc! {r"
        module M
        typed compose : (Nat -> Nat) -> (Nat -> Nat) -> Nat -> Nat =
          \f => \g => \x => f (g x)
    "})
    .unwrap();

    let term = def(&program, "compose").term().unwrap();
    assert_eq!(
        term_to_string(term),
        "\\f:(Nat -> Nat) => \\g:(Nat -> Nat) => \\x:Nat => f (g x)"
    );
}

#[test]
fn literals_expand_against_local_church_constructors() {
    let program = run(indoc! {r"
        module M
        type Nat = #X => (X -> X) -> X -> X
        poly zero = #X => \s:(X -> X) => \z:X => z
        poly succ = \n:Nat => #X => \s:(X -> X) => \z:X => s (n [X] s z)
        poly two = 2
    "})
    .unwrap();

    let term = def(&program, "two").term().unwrap();
    assert_eq!(term_to_string(term), "succ (succ zero)");
}

#[test]
fn literals_stay_opaque_without_local_numerals() {
    let program = run("module M\npoly two = 2").unwrap();

    let term = def(&program, "two").term().unwrap();
    let name = term.term_var_name().unwrap();
    assert!(names::is_literal(name));
}
