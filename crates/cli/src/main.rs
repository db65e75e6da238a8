use std::process::ExitCode;

fn main() -> ExitCode {
    slackline_cli::run()
}
