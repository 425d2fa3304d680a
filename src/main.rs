use clap::Parser;
use folio::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
