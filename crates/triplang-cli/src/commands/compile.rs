//! `tripc <input.trip> [output.tripc]`

use std::path::{Path, PathBuf};

use triplang_compiler::compile_source;

use super::fail;

pub fn run(inputs: &[PathBuf]) {
    let (input, output) = match inputs {
        [input] => (input.clone(), default_output(input)),
        [input, output] => (input.clone(), output.clone()),
        _ => {
            eprintln!("error: compile takes one input and an optional output path");
            std::process::exit(1);
        }
    };

    let source = match std::fs::read_to_string(&input) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("error: {}: {err}", input.display());
            std::process::exit(1);
        }
    };

    let object = match compile_source(&source) {
        Ok(object) => object,
        Err(err) => fail(&err),
    };

    if let Err(err) = object.write(&output) {
        fail(&err);
    }
}

/// `foo.trip` → `foo.tripc`.
fn default_output(input: &Path) -> PathBuf {
    input.with_extension(triplang_object::EXTENSION)
}
