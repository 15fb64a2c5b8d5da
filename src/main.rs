use std::process::ExitCode;

fn main() -> ExitCode {
    match linkvault::cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            linkvault::ui::output::error(format!("{:#}", err));
            ExitCode::FAILURE
        }
    }
}
