//! shp - Command-line tool for inspecting, extracting and building SHP containers

use std::process::ExitCode;

use shpkit::cli;

fn main() -> ExitCode {
    cli::run()
}
