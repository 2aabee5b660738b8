mod cli;
mod commands;


use std::path::PathBuf;

use cli::build_cli;

fn main() {
    let matches = build_cli().get_matches();
    let inputs: Vec<PathBuf> = matches
        .get_many::<PathBuf>("inputs")
        .expect("inputs are required")
        .cloned()
        .collect();

    if matches.get_flag("link") {
        commands::link::run(&inputs);
    } else if matches.get_flag("run") {
        commands::run::run(&inputs);
    } else {
        commands::compile::run(&inputs);
    }
}
