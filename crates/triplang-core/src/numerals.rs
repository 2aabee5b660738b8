//! Numeral spine builders.
//!
//! Literal expansion produces constructor spines over caller-supplied terms:
//! Church numerals as iterated `succ`, binary numerals as a little-endian
//! bit spine. The builders are black boxes over the constructor terms; the
//! caller decides where those come from.

use num_bigint::BigUint;
use num_traits::Zero;

use crate::term::{TermRef, TripValue};

/// `succ (succ (... zero))`, `value` applications deep.
pub fn church_spine(value: &BigUint, succ: &TermRef, zero: &TermRef) -> TermRef {
    let mut term = zero.clone();
    let mut n = value.clone();
    while !n.is_zero() {
        term = TripValue::app(succ.clone(), term);
        n -= 1u32;
    }
    term
}

/// Little-endian bit spine: least significant bit outermost, `end` innermost.
/// Zero is the bare `end` terminator.
pub fn bin_spine(value: &BigUint, b0: &TermRef, b1: &TermRef, end: &TermRef) -> TermRef {
    let mut term = end.clone();
    let bits = value.bits();
    for i in (0..bits).rev() {
        let ctor = if value.bit(i) { b1 } else { b0 };
        term = TripValue::app(ctor.clone(), term);
    }
    term
}
