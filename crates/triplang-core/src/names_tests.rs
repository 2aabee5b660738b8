//! Unit tests for names and sentinels.

use num_bigint::BigUint;

use crate::names::{
    fresh_name, is_literal, literal_digits, literal_name, literal_name_from_digits, literal_value,
};

#[test]
fn literal_names_round_trip_their_value() {
    let value = BigUint::parse_bytes(b"340282366920938463463374607431768211456", 10).unwrap();
    let name = literal_name(&value);

    assert!(is_literal(&name));
    assert_eq!(literal_value(&name), Some(value.clone()));
    assert_eq!(
        literal_digits(&name),
        Some("340282366920938463463374607431768211456")
    );
    assert_eq!(literal_name_from_digits(literal_digits(&name).unwrap()), Ok(name));
}

#[test]
fn ordinary_names_are_not_literals() {
    assert!(!is_literal("succ"));
    assert!(!is_literal("x0"));
    assert_eq!(literal_value("succ"), None);
}

#[test]
fn malformed_digits_are_rejected() {
    assert!(literal_name_from_digits("").is_err());
    assert!(literal_name_from_digits("12a").is_err());
    assert!(literal_name_from_digits("-3").is_err());
}

#[test]
fn fresh_names_append_a_counter_until_free() {
    let taken = ["x", "x0", "x1"];
    let name = fresh_name("x", |n| taken.contains(&n));
    assert_eq!(name, "x2");
}

#[test]
fn fresh_names_prefer_the_base() {
    let name = fresh_name("y", |_| false);
    assert_eq!(name, "y");
}
