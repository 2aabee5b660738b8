//! End-to-end link scenarios, reduced with the SKI evaluator and decoded as
//! Church numerals.

use indoc::indoc;
use num_bigint::BigUint;
use triplang_compiler::compile_source;
use triplang_core::free_vars::external_refs;
use triplang_core::pretty::term_to_string;
use triplang_object::ObjectModule;
use triplang_ski::{decode_church, normalize};

use crate::{LinkError, link};

const FUEL: u64 = 50_000_000;

fn objects(sources: &[&str]) -> Vec<ObjectModule> {
    sources
        .iter()
        .map(|src| compile_source(src).unwrap())
        .collect()
}

fn decode(sources: &[&str]) -> BigUint {
    let term = link(&objects(sources)).unwrap();
    assert!(
        external_refs(&term).is_empty(),
        "linked programs are closed"
    );
    decode_church(&term, FUEL).expect("linked main decodes as a Church numeral")
}

const PRELUDE: &str = indoc! {r"
    module Prelude
    export Nat
    export Bool
    export zero
    export succ
    export add
    export mul
    export pred
    export isZero
    export cond
    export true
    export false
    export one
    type Nat = #X => (X -> X) -> X -> X
    type Bool = #X => X -> X -> X
    poly zero : Nat = #X => \s:(X -> X) => \z:X => z
    poly succ : Nat -> Nat = \n:Nat => #X => \s:(X -> X) => \z:X => s (n [X] s z)
    poly one : Nat = succ zero
    poly add : Nat -> Nat -> Nat = \m:Nat => \n:Nat => #X => \s:(X -> X) => \z:X => m [X] s (n [X] s z)
    poly mul : Nat -> Nat -> Nat = \m:Nat => \n:Nat => #X => \s:(X -> X) => m [X] (n [X] s)
    poly true : Bool = #X => \t:X => \f:X => t
    poly false : Bool = #X => \t:X => \f:X => f
    poly isZero : Nat -> Bool = \n:Nat => n [Bool] (\b:Bool => false) true
    poly cond = #X => \b:Bool => \t:X => \f:X => b [X] t f
    poly pred : Nat -> Nat = \n:Nat => #X => \s:(X -> X) => \z:X => n [(X -> X) -> X] (\g:((X -> X) -> X) => \h:(X -> X) => h (g s)) (\u:(X -> X) => z) (\u:X => u)
"};

#[test]
fn identity_module_links_to_i() {
    let term = link(&objects(&[indoc! {r"
        module M
        export main
        poly main = #X => \x:X => x
    "}]))
    .unwrap();

    assert_eq!(term_to_string(&term), "I");
}

#[test]
fn church_arithmetic_through_the_prelude() {
    let result = decode(&[
        PRELUDE,
        indoc! {"
            module T
            import Prelude zero
            import Prelude succ
            import Prelude mul
            export main
            poly one = succ zero
            poly two = succ one
            poly three = succ two
            poly main = mul two three
        "},
    ]);

    assert_eq!(result, BigUint::from(6u32));
}

#[test]
fn nested_arithmetic_decodes_to_ten() {
    let result = decode(&[
        PRELUDE,
        indoc! {"
            module T
            import Prelude zero
            import Prelude succ
            import Prelude add
            import Prelude mul
            export main
            poly one = succ zero
            poly two = succ one
            poly three = succ two
            poly four = succ three
            poly main = add (mul two three) (mul one four)
        "},
    ]);

    assert_eq!(result, BigUint::from(10u32));
}

#[test]
fn ambiguous_exports_name_both_modules() {
    let sources = [
        indoc! {r"
            module Utils1
            export util
            poly util = #X => \x:X => x
        "},
        indoc! {r"
            module Utils2
            export util
            poly util = #X => \x:X => x
        "},
        indoc! {"
            module C
            import Utils1 util
            export main
            poly main = util
        "},
    ];

    let err = link(&objects(&sources)).unwrap_err();

    let LinkError::AmbiguousExport {
        name,
        first,
        second,
    } = err
    else {
        panic!("expected an ambiguous export error");
    };
    assert_eq!(name, "util");
    assert_eq!(first, "Utils1");
    assert_eq!(second, "Utils2");
}

#[test]
fn missing_main_is_reported() {
    let err = link(&objects(&[indoc! {r"
        module M
        export helper
        poly helper = #X => \x:X => x
    "}]))
    .unwrap_err();

    assert!(matches!(err, LinkError::MissingMain));
    assert_eq!(err.to_string(), "no 'main' function found");
}

#[test]
fn recursive_factorial_reduces_to_120() {
    let result = decode(&[
        PRELUDE,
        indoc! {r"
            module F
            import Prelude Nat
            import Prelude cond
            import Prelude isZero
            import Prelude mul
            import Prelude pred
            import Prelude one
            export main
            poly rec fact : Nat -> Nat = \n:Nat =>
              cond [Nat] (isZero n) one (mul n (fact (pred n)))
            poly main = fact 5
        "},
    ]);

    assert_eq!(result, BigUint::from(120u32));
}

#[test]
fn literals_expand_against_the_linked_prelude() {
    let result = decode(&[
        PRELUDE,
        indoc! {"
            module T
            import Prelude add
            export main
            poly main = add 2 3
        "},
    ]);

    assert_eq!(result, BigUint::from(5u32));
}

const BIN_PRELUDE: &str = indoc! {r"
    module BinPrelude
    export Bin
    export b0
    export b1
    export bend
    type Bin = #X => (X -> X) -> (X -> X) -> X -> X
    poly bend : Bin = #X => \f0:(X -> X) => \f1:(X -> X) => \z:X => z
    poly b0 : Bin -> Bin = \n:Bin => #X => \f0:(X -> X) => \f1:(X -> X) => \z:X => f0 (n [X] f0 f1 z)
    poly b1 : Bin -> Bin = \n:Bin => #X => \f0:(X -> X) => \f1:(X -> X) => \z:X => f1 (n [X] f0 f1 z)
"};

/// Decode a binary numeral: apply to a zero-bit marker, a one-bit marker,
/// and a terminator, then read the bit chain least-significant-first.
fn decode_bin(term: &triplang_core::TermRef) -> u64 {
    use triplang_core::term::TripValue;

    let applied = TripValue::app(
        TripValue::app(
            TripValue::app(term.clone(), TripValue::lambda_var("d0")),
            TripValue::lambda_var("d1"),
        ),
        TripValue::lambda_var("dz"),
    );
    let normal = normalize(&applied, FUEL).unwrap();

    let mut value = 0u64;
    let mut weight = 1u64;
    let mut current = normal;
    loop {
        match &*current.clone() {
            TripValue::LambdaVar { name } if name == "dz" => return value,
            TripValue::App { lft, rgt } => {
                match lft.term_var_name() {
                    Some("d1") => value += weight,
                    Some("d0") => {}
                    other => panic!("unexpected bit head {other:?}"),
                }
                weight *= 2;
                current = rgt.clone();
            }
            other => panic!("not a binary numeral: {other:?}"),
        }
    }
}

#[test]
fn literals_expand_as_binary_when_only_bin_is_linked() {
    let term = link(&objects(&[
        BIN_PRELUDE,
        indoc! {"
            module T
            export main
            poly main = 5
        "},
    ]))
    .unwrap();

    assert!(external_refs(&term).is_empty());
    assert_eq!(decode_bin(&term), 5);
}

#[test]
fn binary_zero_is_the_bare_terminator() {
    let term = link(&objects(&[
        BIN_PRELUDE,
        indoc! {"
            module T
            export main
            poly main = 0
        "},
    ]))
    .unwrap();

    assert_eq!(decode_bin(&term), 0);
}

#[test]
fn literals_without_numerals_in_scope_fail_the_link() {
    let err = link(&objects(&["module M\nexport main\npoly main = 5"])).unwrap_err();
    assert!(matches!(err, LinkError::NoNumeralType));
}

#[test]
fn importing_from_a_missing_module_fails() {
    let err = link(&objects(&[indoc! {"
        module C
        import Prelude succ
        export main
        poly main = succ
    "}]))
    .unwrap_err();

    assert!(matches!(err, LinkError::MissingModule { .. }));
}

#[test]
fn importing_a_non_exported_symbol_fails() {
    let sources = [
        indoc! {r"
            module P
            export visible
            poly visible = #X => \x:X => x
            poly hidden = #X => \x:X => x
        "},
        indoc! {"
            module C
            import P hidden
            export main
            poly main = hidden
        "},
    ];

    let err = link(&objects(&sources)).unwrap_err();
    assert!(matches!(err, LinkError::NotExported { .. }));
}

#[test]
fn local_definitions_do_not_leak_across_modules() {
    // P defines `helper` without exporting it; C references it without an
    // import declaration, which the compiler already rejects.
    let source = indoc! {"
        module C
        export main
        poly main = helper
    "};
    assert!(compile_source(source).is_err());
}

#[test]
fn divergent_rec_definitions_still_link_closed() {
    let term = link(&objects(&[indoc! {r"
        module M
        type Nat = #X => (X -> X) -> X -> X
        export main
        poly rec omega : Nat = omega
        poly main = omega
    "}]))
    .unwrap();

    // Z (\self => self): linked, closed, and deliberately divergent.
    assert!(external_refs(&term).is_empty());
    assert!(normalize(&term, 10_000).is_err());
}

#[test]
fn linking_is_deterministic() {
    let sources = [
        PRELUDE,
        indoc! {"
            module T
            import Prelude zero
            import Prelude succ
            export main
            poly main = succ zero
        "},
    ];

    let first = term_to_string(&link(&objects(&sources)).unwrap());
    let second = term_to_string(&link(&objects(&sources)).unwrap());
    assert_eq!(first, second);
}
