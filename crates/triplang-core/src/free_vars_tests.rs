//! Unit tests for free-variable analysis.

use std::rc::Rc;

use num_bigint::BigUint;

use crate::free_vars::{FvCache, external_refs};
use crate::names;
use crate::term::TripValue;

#[test]
fn scanner_reports_unbound_term_references() {
    let v = TripValue::lambda_abs(
        "x",
        TripValue::app(TripValue::lambda_var("x"), TripValue::lambda_var("y")),
    );

    let refs = external_refs(&v);

    assert_eq!(refs.terms.len(), 1);
    assert!(refs.terms.contains("y"));
    assert!(refs.types.is_empty());
}

#[test]
fn scanner_tracks_namespaces_independently() {
    // \T:T => T: the term binder named T does not hide the *type* T.
    let v = TripValue::typed_abs("T", TripValue::type_var("T"), TripValue::lambda_var("T"));

    let refs = external_refs(&v);

    assert!(refs.terms.is_empty());
    assert_eq!(refs.types.len(), 1);
    assert!(refs.types.contains("T"));
}

#[test]
fn scanner_suppresses_literal_sentinels() {
    let lit = names::literal_name(&BigUint::from(7u32));
    let v = TripValue::app(TripValue::sysf_var(&lit), TripValue::sysf_var("succ"));

    let refs = external_refs(&v);

    assert_eq!(refs.terms.len(), 1);
    assert!(refs.terms.contains("succ"));
}

#[test]
fn scanner_sees_let_value_outside_the_binding() {
    // let x = x in x: the value's x is a free reference.
    let v = TripValue::sysf_let("x", TripValue::sysf_var("x"), TripValue::sysf_var("x"));

    let refs = external_refs(&v);

    assert_eq!(refs.terms.len(), 1);
    assert!(refs.terms.contains("x"));
}

#[test]
fn scanner_scopes_match_arm_params_to_their_arm() {
    let arms = vec![
        crate::term::MatchArm {
            ctor: "Cons".to_owned(),
            params: vec!["h".to_owned()],
            body: TripValue::sysf_var("h"),
        },
        crate::term::MatchArm {
            ctor: "Nil".to_owned(),
            params: vec![],
            body: TripValue::sysf_var("h"),
        },
    ];
    let v = TripValue::sysf_match(TripValue::sysf_var("s"), TripValue::type_var("T"), arms);

    let refs = external_refs(&v);

    // The second arm's h is free; the first arm's is bound.
    assert!(refs.terms.contains("s"));
    assert!(refs.terms.contains("h"));
    assert!(refs.types.contains("T"));
}

#[test]
fn scanner_sees_annotation_types() {
    let v = TripValue::sysf_abs(
        "x",
        TripValue::type_app(TripValue::type_var("List"), TripValue::type_var("Nat")),
        TripValue::sysf_var("x"),
    );

    let refs = external_refs(&v);

    assert!(refs.terms.is_empty());
    assert!(refs.types.contains("List"));
    assert!(refs.types.contains("Nat"));
}

#[test]
fn cache_returns_shared_sets_for_shared_nodes() {
    let mut cache = FvCache::new();
    let shared = TripValue::app(TripValue::lambda_var("a"), TripValue::lambda_var("b"));
    let v = TripValue::app(shared.clone(), shared.clone());

    let whole = cache.free_term_vars(&v);
    let first = cache.free_term_vars(&shared);
    let second = cache.free_term_vars(&shared);

    assert!(Rc::ptr_eq(&first, &second));
    assert_eq!(whole.len(), 2);
    assert!(whole.contains("a") && whole.contains("b"));
}

#[test]
fn cache_removes_bound_names() {
    let mut cache = FvCache::new();
    let v = TripValue::lambda_abs(
        "x",
        TripValue::app(TripValue::lambda_var("x"), TripValue::lambda_var("y")),
    );

    let fv = cache.free_term_vars(&v);

    assert_eq!(fv.len(), 1);
    assert!(fv.contains("y"));
}

#[test]
fn cache_type_vars_respect_forall() {
    let mut cache = FvCache::new();
    let v = TripValue::forall(
        "X",
        TripValue::arrow(TripValue::type_var("X"), TripValue::type_var("Y")),
    );

    let fv = cache.free_type_vars(&v);

    assert_eq!(fv.len(), 1);
    assert!(fv.contains("Y"));
}
