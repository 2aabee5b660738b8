pub mod compile;
pub mod link;
pub mod run;

/// Print a one-line summary plus the cause chain and exit non-zero. No
/// partial outputs are left behind by any command.
pub fn fail(err: &dyn std::error::Error) -> ! {
    eprintln!("error: {err}");
    let mut source = err.source();
    while let Some(cause) = source {
        eprintln!("  caused by: {cause}");
        source = cause.source();
    }
    std::process::exit(1);
}
