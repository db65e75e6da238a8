use serde_json::json;
use slackline_core::config::{AppConfig, LoadOptions};
use slackline_slack::oauth::authorization_url;

use crate::commands::CommandResult;

pub fn run() -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "authorize-url",
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
        }
    };

    let url = authorization_url(
        &config.slack.authorize_url,
        &config.slack.client_id,
        config.slack.scopes.as_slice(),
    );

    CommandResult::success_with_details(
        "authorize-url",
        url.clone(),
        Some(json!({
            "authorization_url": url,
            "client_id": config.slack.client_id,
            "scopes": config.slack.scopes,
        })),
    )
}
