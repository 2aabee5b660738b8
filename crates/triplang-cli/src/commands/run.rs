//! `tripc --run <a.tripc> [<b.tripc> ...]`

use std::path::PathBuf;

use triplang_core::pretty::term_to_string;
use triplang_linker::link_files;
use triplang_ski::{decode_church, normalize};

use super::fail;

/// Reduction budget for `--run`.
const FUEL: u64 = 100_000_000;

pub fn run(inputs: &[PathBuf]) {
    let term = match link_files(inputs) {
        Ok(term) => term,
        Err(err) => fail(&err),
    };
    let normal = match normalize(&term, FUEL) {
        Ok(normal) => normal,
        Err(err) => fail(&err),
    };
    println!("{}", term_to_string(&normal));
    if let Some(value) = decode_church(&normal, FUEL) {
        println!("= {value}");
    }
}
