//! gitclerk binary entry point.

use std::process::ExitCode;

use gitclerk::ui::output;

fn main() -> ExitCode {
    match gitclerk::cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output::error(format!("{err:#}"));
            ExitCode::FAILURE
        }
    }
}
