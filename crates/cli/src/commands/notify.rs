use slackline_core::config::{AppConfig, LoadOptions};
use slackline_core::{CredentialStore, FileCredentialStore};
use slackline_slack::{
    NotificationError, SlackClient, DEFAULT_NOTIFICATION_TEXT, NOTIFICATION_SENT_MESSAGE,
};

use crate::commands::CommandResult;

pub fn run(text: Option<&str>) -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "notify",
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
        }
    };

    let store = FileCredentialStore::new(&config.storage.credential_path);
    let client = match SlackClient::new(config.slack.clone()) {
        Ok(client) => client.with_credential(store.load()),
        Err(error) => {
            return CommandResult::failure(
                "notify",
                "http_client",
                format!("failed to build http client: {error}"),
                3,
            );
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                "notify",
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                3,
            );
        }
    };

    let text = text.filter(|text| !text.trim().is_empty()).unwrap_or(DEFAULT_NOTIFICATION_TEXT);
    match runtime.block_on(client.send_notification(text)) {
        Ok(()) => CommandResult::success("notify", NOTIFICATION_SENT_MESSAGE),
        Err(error) => {
            let (error_class, exit_code) = classify(&error);
            CommandResult::failure("notify", error_class, error.to_string(), exit_code)
        }
    }
}

fn classify(error: &NotificationError) -> (&'static str, u8) {
    match error {
        NotificationError::NotAuthenticated => ("not_authenticated", 4),
        NotificationError::NoDestination => ("no_destination", 4),
        NotificationError::Provider(_) => ("slack_provider", 5),
        NotificationError::Transport(_) => ("transport", 6),
    }
}
