//! End-to-end tests for the compilation pipeline.

use indoc::indoc;

use crate::{Error, compile_source};

#[test]
fn identity_module_compiles_to_an_object() {
    let object = compile_source(indoc! {r"
        module M
        export main
        poly main = #X => \x:X => x
    "})
    .unwrap();

    assert_eq!(object.module, "M");
    assert_eq!(object.exports, ["main"]);
    assert!(object.imports.is_empty());
    assert!(object.definitions.contains_key("main"));
}

#[test]
fn imports_are_recorded_and_left_unresolved() {
    let object = compile_source(indoc! {"
        module T
        import Prelude succ
        import Prelude zero
        export main
        poly main = succ zero
    "})
    .unwrap();

    assert_eq!(object.imports.len(), 2);
    assert_eq!(object.imports[0].name, "succ");
    assert_eq!(object.imports[0].from, "Prelude");

    let main = object.definitions.get("main").unwrap().term().unwrap();
    let refs = triplang_core::external_refs(main);
    assert!(refs.terms.contains("succ"));
    assert!(refs.terms.contains("zero"));
}

#[test]
fn local_references_are_resolved_into_the_object() {
    let object = compile_source(indoc! {r"
        module M
        export main
        poly id = #X => \x:X => x
        poly main = id
    "})
    .unwrap();

    let main = object.definitions.get("main").unwrap().term().unwrap();
    assert!(triplang_core::external_refs(main).is_empty());
}

#[test]
fn missing_module_declaration_is_an_index_error() {
    let err = compile_source("poly main = #X => \\x:X => x").unwrap_err();
    assert!(matches!(err, Error::Index(_)));
}

#[test]
fn parse_errors_carry_the_parse_stage() {
    let err = compile_source("module M\npoly = x").unwrap_err();
    assert!(matches!(err, Error::Parse(_)));
}

#[test]
fn unresolved_references_fail_resolution() {
    let err = compile_source("module M\npoly main = mystery").unwrap_err();
    assert!(matches!(err, Error::Resolve(_)));
}

#[test]
fn duplicate_definitions_fail_indexing() {
    let err = compile_source(indoc! {r"
        module M
        poly id = #X => \x:X => x
        poly id = #X => \x:X => x
    "})
    .unwrap_err();
    assert!(matches!(err, Error::Index(_)));
}

#[test]
fn type_errors_carry_the_typecheck_stage() {
    let err = compile_source(indoc! {r"
        module M
        poly id : #X => X -> X -> X = #X => \x:X => x
    "})
    .unwrap_err();
    assert!(matches!(err, Error::Typecheck(_)));
}

#[test]
fn compilation_is_deterministic() {
    let source = indoc! {r"
        module M
        export main
        data Maybe a = Just a | Nothing
        poly main = #X => \x:X => x
    "};

    let first = compile_source(source).unwrap().to_json().unwrap();
    let second = compile_source(source).unwrap().to_json().unwrap();
    assert_eq!(first, second);
}

#[test]
fn object_round_trips_preserve_compiled_definitions() {
    let object = compile_source(indoc! {"
        module T
        import Prelude succ
        export main
        poly main = succ 41
    "})
    .unwrap();

    let text = object.to_json().unwrap();
    let back = triplang_object::ObjectModule::from_json(&text).unwrap();
    assert_eq!(back, object);
}
