//! Unit tests for definitions and strata.

use crate::def::{Def, Level};
use crate::term::TripValue;

#[test]
fn strata_are_ordered_for_monotone_lowering() {
    assert!(Level::Combinator < Level::Untyped);
    assert!(Level::Untyped < Level::Typed);
    assert!(Level::Typed < Level::Poly);
}

#[test]
fn levels_match_definition_kinds() {
    let term = TripValue::sysf_var("x");
    assert_eq!(
        Def::Poly {
            name: "a".into(),
            term: term.clone(),
            ty: None,
            rec: false
        }
        .level(),
        Some(Level::Poly)
    );
    assert_eq!(
        Def::Typed {
            name: "b".into(),
            term: term.clone(),
            ty: None
        }
        .level(),
        Some(Level::Typed)
    );
    assert_eq!(
        Def::Untyped {
            name: "c".into(),
            term: term.clone(),
        }
        .level(),
        Some(Level::Untyped)
    );
    assert_eq!(
        Def::Combinator {
            name: "d".into(),
            term,
        }
        .level(),
        Some(Level::Combinator)
    );
    assert_eq!(
        Def::Module { name: "M".into() }.level(),
        None
    );
}

#[test]
fn with_term_preserves_annotation_and_rec() {
    let def = Def::Poly {
        name: "f".into(),
        term: TripValue::sysf_var("old"),
        ty: Some(TripValue::type_var("Nat")),
        rec: true,
    };

    let updated = def.with_term(TripValue::sysf_var("new"));

    let Def::Poly { term, ty, rec, .. } = updated else {
        panic!("expected poly");
    };
    assert_eq!(term.term_var_name(), Some("new"));
    assert!(ty.is_some());
    assert!(rec);
}

#[test]
fn only_rec_marked_polys_are_rec() {
    let term = TripValue::sysf_var("x");
    assert!(
        Def::Poly {
            name: "f".into(),
            term: term.clone(),
            ty: None,
            rec: true
        }
        .is_rec()
    );
    assert!(
        !Def::Poly {
            name: "f".into(),
            term: term.clone(),
            ty: None,
            rec: false
        }
        .is_rec()
    );
    assert!(
        !Def::Untyped {
            name: "f".into(),
            term,
        }
        .is_rec()
    );
}
