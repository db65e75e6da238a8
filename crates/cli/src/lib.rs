pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "slackline",
    about = "Slackline operator CLI",
    long_about = "Inspect slackline configuration, check Slack readiness, print the install link and send notifications.",
    after_help = "Examples:\n  slackline doctor --json\n  slackline config\n  slackline notify \"deploy finished\""
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config, the stored Slack credential and the notification target")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(name = "authorize-url", about = "Print the \"Add to Slack\" OAuth link")]
    AuthorizeUrl,
    #[command(about = "Send a notification using the stored Slack credential")]
    Notify {
        #[arg(help = "Message text; defaults to \"Hello!\"")]
        text: Option<String>,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => {
            commands::CommandResult { exit_code: 0, output: commands::doctor::run(json) }
        }
        Command::AuthorizeUrl => commands::authorize_url::run(),
        Command::Notify { text } => commands::notify::run(text.as_deref()),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
