//! Church-numeral decoding.

use num_bigint::BigUint;
use num_traits::Zero;
use triplang_core::term::{TermRef, TripValue};

use crate::reduce::normalize;

const SUCC_MARKER: &str = "__church_s";
const ZERO_MARKER: &str = "__church_z";

/// Decode a closed term as a Church numeral: apply it to two inert markers,
/// normalize, and count the marker applications. `None` when the normal form
/// is not a numeral or the budget runs out.
pub fn decode_church(term: &TermRef, fuel: u64) -> Option<BigUint> {
    let applied = TripValue::app(
        TripValue::app(term.clone(), TripValue::lambda_var(SUCC_MARKER)),
        TripValue::lambda_var(ZERO_MARKER),
    );
    let normal = normalize(&applied, fuel).ok()?;

    let mut count = BigUint::zero();
    let mut current = normal;
    loop {
        match &*current.clone() {
            TripValue::LambdaVar { name } if name == ZERO_MARKER => return Some(count),
            TripValue::App { lft, rgt } if lft.term_var_name() == Some(SUCC_MARKER) => {
                count += 1u32;
                current = rgt.clone();
            }
            _ => return None,
        }
    }
}
