//! `tripc --link <a.tripc> [<b.tripc> ...]`

use std::path::PathBuf;

use triplang_core::pretty::term_to_string;
use triplang_linker::link_files;

use super::fail;

pub fn run(inputs: &[PathBuf]) {
    match link_files(inputs) {
        Ok(term) => println!("{}", term_to_string(&term)),
        Err(err) => fail(&err),
    }
}
