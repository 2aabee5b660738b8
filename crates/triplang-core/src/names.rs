//! Reserved names, literal sentinels, and fresh-name generation.
//!
//! Numeric literals are represented as variable references whose name starts
//! with a reserved sentinel prefix followed by the decimal value. Surface
//! identifiers cannot begin with an underscore, so the prefix is unreachable
//! from source text. Substitution, α-renaming, and free-variable analysis
//! treat sentinel names as opaque atoms.

use num_bigint::BigUint;

/// Prefix of literal sentinel variable names.
pub const LITERAL_PREFIX: &str = "__trip_lit__";

/// JSON tag wrapping big-integer values in object files.
pub const BIGINT_TAG: &str = "__trip_bigint__";

/// Sentinel name carrying a numeric literal.
pub fn literal_name(value: &BigUint) -> String {
    format!("{LITERAL_PREFIX}{value}")
}

/// True if `name` is a literal sentinel.
pub fn is_literal(name: &str) -> bool {
    name.starts_with(LITERAL_PREFIX)
}

/// Decimal digits of a literal sentinel name, if it is one.
pub fn literal_digits(name: &str) -> Option<&str> {
    name.strip_prefix(LITERAL_PREFIX)
}

/// Value of a literal sentinel name, if it is one.
pub fn literal_value(name: &str) -> Option<BigUint> {
    literal_digits(name)?.parse().ok()
}

/// Rebuild a sentinel name from decimal digits, validating them.
pub fn literal_name_from_digits(digits: &str) -> Result<String, String> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("invalid big-integer digits: {digits:?}"));
    }
    Ok(format!("{LITERAL_PREFIX}{digits}"))
}

/// Generate a name based on `base` for which `taken` is false, by appending
/// a counter until one is free.
pub fn fresh_name(base: &str, taken: impl Fn(&str) -> bool) -> String {
    if !taken(base) {
        return base.to_owned();
    }
    let mut counter = 0usize;
    loop {
        let candidate = format!("{base}{counter}");
        if !taken(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}
