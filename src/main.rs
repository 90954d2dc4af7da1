//! Binary entrypoint for the `osport` CLI.

use std::process::ExitCode;

fn main() -> ExitCode {
    // A missing .env file is fine; variables may come from the environment.
    let _ = dotenvy::dotenv();
    match osport::run(std::env::args()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
