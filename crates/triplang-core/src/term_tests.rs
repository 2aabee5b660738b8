//! Serialization tests for the term and definition model.

use num_bigint::BigUint;
use serde_json::json;

use crate::def::{Def, Program};
use crate::names;
use crate::term::{Combinator, TripValue};

#[test]
fn vars_serialize_with_kind_tags() {
    let v = TripValue::sysf_var("x");
    let out = serde_json::to_value(&*v).unwrap();
    assert_eq!(out, json!({"kind": "sysFVar", "name": "x"}));

    let v = TripValue::terminal(Combinator::S);
    let out = serde_json::to_value(&*v).unwrap();
    assert_eq!(out, json!({"kind": "terminal", "sym": "S"}));
}

#[test]
fn abstraction_fields_are_camel_case() {
    let v = TripValue::sysf_abs("x", TripValue::type_var("X"), TripValue::sysf_var("x"));
    let out = serde_json::to_value(&*v).unwrap();
    assert_eq!(
        out,
        json!({
            "kind": "sysFAbs",
            "param": "x",
            "paramType": {"kind": "typeVar", "name": "X"},
            "body": {"kind": "sysFVar", "name": "x"},
        })
    );
}

#[test]
fn literal_names_serialize_as_tagged_bigints() {
    let lit = names::literal_name(&BigUint::from(12345678901234567890u64));
    let v = TripValue::sysf_var(&lit);

    let out = serde_json::to_value(&*v).unwrap();
    assert_eq!(
        out,
        json!({
            "kind": "sysFVar",
            "name": {"__trip_bigint__": "12345678901234567890"},
        })
    );

    let back: TripValue = serde_json::from_value(out).unwrap();
    assert_eq!(back, *v);
}

#[test]
fn term_round_trips_through_json() {
    let v = TripValue::sysf_type_abs(
        "X",
        TripValue::sysf_abs("x", TripValue::type_var("X"), TripValue::sysf_var("x")),
    );

    let text = serde_json::to_string(&*v).unwrap();
    let back: TripValue = serde_json::from_str(&text).unwrap();

    assert_eq!(back, *v);
}

#[test]
fn def_round_trips_with_rec_flag() {
    let def = Def::Poly {
        name: "fact".to_owned(),
        term: TripValue::sysf_var("fact"),
        ty: Some(TripValue::type_var("Nat")),
        rec: true,
    };

    let out = serde_json::to_value(&def).unwrap();
    assert_eq!(out["kind"], "poly");
    assert_eq!(out["rec"], true);
    assert_eq!(out["type"]["kind"], "typeVar");

    let back: Def = serde_json::from_value(out).unwrap();
    assert_eq!(back, def);
}

#[test]
fn unannotated_poly_omits_type_key() {
    let def = Def::Poly {
        name: "id".to_owned(),
        term: TripValue::sysf_var("x"),
        ty: None,
        rec: false,
    };

    let out = serde_json::to_value(&def).unwrap();
    assert!(out.get("type").is_none());
}

#[test]
fn program_header_accessors() {
    let program = Program::new(vec![
        Def::Module {
            name: "M".to_owned(),
        },
        Def::Import {
            module_ref: "Prelude".to_owned(),
            symbol_ref: "succ".to_owned(),
        },
        Def::Export {
            symbol_ref: "main".to_owned(),
        },
    ]);

    assert_eq!(program.module_name(), Some("M"));
    assert_eq!(program.imports().collect::<Vec<_>>(), [("Prelude", "succ")]);
    assert_eq!(program.exports().collect::<Vec<_>>(), ["main"]);
}

#[test]
fn app_spine_builds_left_associated_applications() {
    let spine = TripValue::app_spine(
        TripValue::sysf_var("f"),
        [TripValue::sysf_var("a"), TripValue::sysf_var("b")],
    );

    let TripValue::App { lft, rgt } = &*spine else {
        panic!("expected App");
    };
    assert_eq!(rgt.term_var_name(), Some("b"));
    let TripValue::App { lft: inner, rgt } = &**lft else {
        panic!("expected inner App");
    };
    assert_eq!(inner.term_var_name(), Some("f"));
    assert_eq!(rgt.term_var_name(), Some("a"));
}
