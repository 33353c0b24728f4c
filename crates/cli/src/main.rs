use std::process::ExitCode;

fn main() -> ExitCode {
    milesquote_cli::run()
}
