//! Unit tests for hygienic substitution.

use std::rc::Rc;

use indexmap::IndexMap;
use num_bigint::BigUint;

use crate::free_vars::FvCache;
use crate::names;
use crate::subst::{
    rename_term_var, rename_type_var, subst_term, subst_term_batch, subst_type,
};
use crate::term::{Combinator, TripValue};

#[test]
fn subst_replaces_free_variable() {
    let mut cache = FvCache::new();
    let v = TripValue::app(TripValue::sysf_var("x"), TripValue::sysf_var("z"));
    let r = TripValue::terminal(Combinator::I);

    let out = subst_term(&mut cache, &v, "x", &r);

    let TripValue::App { lft, rgt } = &*out else {
        panic!("expected App");
    };
    assert!(Rc::ptr_eq(lft, &r));
    assert_eq!(**rgt, *TripValue::sysf_var("z"));
}

#[test]
fn subst_avoids_capture_by_renaming_binder() {
    let mut cache = FvCache::new();
    // \y => x, with x := y. The binder must not capture the replacement.
    let v = TripValue::lambda_abs("y", TripValue::lambda_var("x"));
    let r = TripValue::lambda_var("y");

    let out = subst_term(&mut cache, &v, "x", &r);

    let TripValue::LambdaAbs { param, body } = &*out else {
        panic!("expected LambdaAbs");
    };
    assert_ne!(param, "y");
    assert_eq!(body.term_var_name(), Some("y"));
}

#[test]
fn subst_respects_shadowing() {
    let mut cache = FvCache::new();
    // \x => x, with x := I. The binder shadows; nothing changes.
    let v = TripValue::lambda_abs("x", TripValue::lambda_var("x"));
    let r = TripValue::terminal(Combinator::I);

    let out = subst_term(&mut cache, &v, "x", &r);

    assert!(Rc::ptr_eq(&out, &v));
}

#[test]
fn subst_preserves_pointer_identity_on_no_op() {
    let mut cache = FvCache::new();
    let v = TripValue::lambda_abs("a", TripValue::lambda_var("b"));
    let r = TripValue::terminal(Combinator::K);

    let out = subst_term(&mut cache, &v, "x", &r);

    assert!(Rc::ptr_eq(&out, &v));
}

#[test]
fn term_subst_never_renames_type_binder() {
    let mut cache = FvCache::new();
    // #X => x, with x := X (a *term* variable named X). The type binder is
    // in an independent namespace and must stay untouched.
    let v = TripValue::sysf_type_abs("X", TripValue::sysf_var("x"));
    let r = TripValue::sysf_var("X");

    let out = subst_term(&mut cache, &v, "x", &r);

    let TripValue::SysFTypeAbs { type_var, body } = &*out else {
        panic!("expected SysFTypeAbs");
    };
    assert_eq!(type_var, "X");
    assert_eq!(body.term_var_name(), Some("X"));
}

#[test]
fn type_subst_never_renames_term_binder() {
    let mut cache = FvCache::new();
    // \T:Y => body, with Y := T at type level: the *term* binder named T is
    // transparent, the annotation changes.
    let v = TripValue::sysf_abs("T", TripValue::type_var("Y"), TripValue::sysf_var("T"));
    let r = TripValue::type_var("T");

    let out = subst_type(&mut cache, &v, "Y", &r);

    let TripValue::SysFAbs {
        param, param_type, ..
    } = &*out
    else {
        panic!("expected SysFAbs");
    };
    assert_eq!(param, "T");
    assert_eq!(**param_type, *TripValue::type_var("T"));
}

#[test]
fn type_subst_avoids_capture_under_forall() {
    let mut cache = FvCache::new();
    // #X => X -> Y, with Y := X. Binder must be renamed.
    let v = TripValue::forall(
        "X",
        TripValue::arrow(TripValue::type_var("X"), TripValue::type_var("Y")),
    );
    let r = TripValue::type_var("X");

    let out = subst_type(&mut cache, &v, "Y", &r);

    let TripValue::Forall { type_var, body } = &*out else {
        panic!("expected Forall");
    };
    assert_ne!(type_var, "X");
    let TripValue::App { lft, rgt } = &**body else {
        panic!("expected arrow");
    };
    assert_eq!(**lft, *TripValue::type_var(type_var.clone()));
    assert_eq!(**rgt, *TripValue::type_var("X"));
}

#[test]
fn literal_sentinels_are_opaque() {
    let mut cache = FvCache::new();
    let lit = names::literal_name(&BigUint::from(42u32));
    let v = TripValue::app(TripValue::sysf_var(&lit), TripValue::sysf_var("x"));
    let r = TripValue::terminal(Combinator::I);

    let out = subst_term(&mut cache, &v, "x", &r);

    let TripValue::App { lft, .. } = &*out else {
        panic!("expected App");
    };
    assert_eq!(lft.term_var_name(), Some(lit.as_str()));
}

#[test]
fn batch_substitutes_all_names_in_one_pass() {
    let mut cache = FvCache::new();
    let v = TripValue::app(TripValue::lambda_var("x"), TripValue::lambda_var("y"));
    let mut subs = IndexMap::new();
    subs.insert("x".to_owned(), TripValue::terminal(Combinator::S));
    subs.insert("y".to_owned(), TripValue::terminal(Combinator::K));

    let out = subst_term_batch(&mut cache, &v, &subs);

    let TripValue::App { lft, rgt } = &*out else {
        panic!("expected App");
    };
    assert!(lft.is_terminal());
    assert!(rgt.is_terminal());
}

#[test]
fn batch_drops_shadowed_names_at_binders() {
    let mut cache = FvCache::new();
    // \x => x y, with {x := S, y := K}: x is shadowed, y is replaced.
    let v = TripValue::lambda_abs(
        "x",
        TripValue::app(TripValue::lambda_var("x"), TripValue::lambda_var("y")),
    );
    let mut subs = IndexMap::new();
    subs.insert("x".to_owned(), TripValue::terminal(Combinator::S));
    subs.insert("y".to_owned(), TripValue::terminal(Combinator::K));

    let out = subst_term_batch(&mut cache, &v, &subs);

    let TripValue::LambdaAbs { param, body } = &*out else {
        panic!("expected LambdaAbs");
    };
    assert_eq!(param, "x");
    let TripValue::App { lft, rgt } = &**body else {
        panic!("expected App");
    };
    assert_eq!(lft.term_var_name(), Some("x"));
    assert!(rgt.is_terminal());
}

#[test]
fn subst_renames_match_arm_binders_on_capture() {
    let mut cache = FvCache::new();
    // match s return T { Cons h t => x } with x := h.
    let arm = crate::term::MatchArm {
        ctor: "Cons".to_owned(),
        params: vec!["h".to_owned(), "t".to_owned()],
        body: TripValue::sysf_var("x"),
    };
    let v = TripValue::sysf_match(
        TripValue::sysf_var("s"),
        TripValue::type_var("T"),
        vec![arm],
    );
    let r = TripValue::sysf_var("h");

    let out = subst_term(&mut cache, &v, "x", &r);

    let TripValue::SysFMatch { arms, .. } = &*out else {
        panic!("expected SysFMatch");
    };
    assert_ne!(arms[0].params[0], "h");
    assert_eq!(arms[0].body.term_var_name(), Some("h"));
}

#[test]
fn let_value_is_substituted_but_shadowed_body_is_not() {
    let mut cache = FvCache::new();
    // let x = x in x: the value's x is free, the body's is bound.
    let v = TripValue::sysf_let("x", TripValue::sysf_var("x"), TripValue::sysf_var("x"));
    let r = TripValue::terminal(Combinator::I);

    let out = subst_term(&mut cache, &v, "x", &r);

    let TripValue::SysFLet { value, body, .. } = &*out else {
        panic!("expected SysFLet");
    };
    assert!(value.is_terminal());
    assert_eq!(body.term_var_name(), Some("x"));
}

#[test]
fn rename_walks_free_occurrences() {
    let v = TripValue::lambda_abs("x", TripValue::lambda_var("y"));

    let out = rename_term_var(&v, "y", "z");

    let TripValue::LambdaAbs { body, .. } = &*out else {
        panic!("expected LambdaAbs");
    };
    assert_eq!(body.term_var_name(), Some("z"));
}

#[test]
fn rename_stops_at_shadowing_binder() {
    let v = TripValue::lambda_abs("y", TripValue::lambda_var("y"));

    let out = rename_term_var(&v, "y", "z");

    assert!(Rc::ptr_eq(&out, &v));
}

#[test]
fn type_rename_stops_at_shadowing_forall() {
    let v = TripValue::forall("X", TripValue::type_var("X"));

    let out = rename_type_var(&v, "X", "Y");

    assert!(Rc::ptr_eq(&out, &v));
}
