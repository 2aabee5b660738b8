//! Argument surface of `tripc`.
//!
//! Three shapes share one command:
//! - `tripc <input.trip> [output.tripc]` compiles a module;
//! - `tripc --link <a.tripc> <b.tripc> ...` links objects and prints the SKI
//!   form of `main`;
//! - `tripc --run <a.tripc> ...` links, reduces, and prints the normal form.

use std::path::PathBuf;

use clap::{Arg, ArgAction, Command, value_parser};

fn inputs_arg() -> Arg {
    Arg::new("inputs")
        .value_name("FILE")
        .value_parser(value_parser!(PathBuf))
        .action(ArgAction::Append)
        .required(true)
        .help("Input .trip source (compile) or .tripc objects (link/run)")
}

fn link_arg() -> Arg {
    Arg::new("link")
        .long("link")
        .action(ArgAction::SetTrue)
        .help("Link object files and print the SKI form of 'main'")
}

fn run_arg() -> Arg {
    Arg::new("run")
        .long("run")
        .action(ArgAction::SetTrue)
        .conflicts_with("link")
        .help("Link object files, reduce 'main', and print its normal form")
}

/// Build the complete CLI.
pub fn build_cli() -> Command {
    Command::new("tripc")
        .about("TripLang compiler and linker")
        .arg_required_else_help(true)
        .arg(link_arg())
        .arg(run_arg())
        .arg(inputs_arg())
}
