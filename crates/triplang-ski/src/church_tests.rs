//! Unit tests for Church decoding.

use num_bigint::BigUint;
use triplang_core::term::{Combinator, TermRef, TripValue};

use super::church::decode_church;

fn s() -> TermRef {
    TripValue::terminal(Combinator::S)
}
fn k() -> TermRef {
    TripValue::terminal(Combinator::K)
}
fn i() -> TermRef {
    TripValue::terminal(Combinator::I)
}
fn app(l: TermRef, r: TermRef) -> TermRef {
    TripValue::app(l, r)
}

/// Church zero as a combinator: λs.λz.z = K I.
fn zero() -> TermRef {
    app(k(), i())
}

/// Church successor: λn.λs.λz.s (n s z) = S (S (K S) K).
fn succ() -> TermRef {
    app(s(), app(app(s(), app(k(), s())), k()))
}

fn church(n: usize) -> TermRef {
    let mut term = zero();
    for _ in 0..n {
        term = app(succ(), term);
    }
    term
}

#[test]
fn zero_decodes() {
    assert_eq!(decode_church(&zero(), 1_000), Some(BigUint::from(0u32)));
}

#[test]
fn successor_spines_decode() {
    assert_eq!(decode_church(&church(1), 10_000), Some(BigUint::from(1u32)));
    assert_eq!(decode_church(&church(7), 10_000), Some(BigUint::from(7u32)));
}

#[test]
fn skk_decodes_as_one() {
    // S K K is the identity, which is Church one: λs.λz.s z.
    let term = app(app(s(), k()), k());
    assert_eq!(decode_church(&term, 1_000), Some(BigUint::from(1u32)));
}

#[test]
fn non_numerals_decode_to_none() {
    assert_eq!(decode_church(&k(), 1_000), None);
}
