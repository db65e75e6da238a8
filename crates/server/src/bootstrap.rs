use std::sync::Arc;

use slackline_core::config::{AppConfig, ConfigError};
use slackline_core::{CredentialStore, FileCredentialStore};
use slackline_slack::jokes::{joke_command, JOKE_COMMAND};
use slackline_slack::SlackClient;
use tera::Tera;
use thiserror::Error;
use tracing::info;

use crate::page::init_templates;
use crate::web::AppState;

pub struct Application {
    pub config: AppConfig,
    pub slack: SlackClient,
    pub store: Arc<dyn CredentialStore>,
    pub templates: Arc<Tera>,
}

impl Application {
    pub fn state(&self) -> AppState {
        AppState {
            slack: self.slack.clone(),
            store: self.store.clone(),
            templates: self.templates.clone(),
        }
    }
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("http client construction failed: {0}")]
    HttpClient(#[source] reqwest::Error),
    #[error("page templates failed to load: {0}")]
    Templates(#[source] tera::Error),
}

pub fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(event_name = "system.bootstrap.start", "starting application bootstrap");

    let mut slack = SlackClient::new(config.slack.clone()).map_err(BootstrapError::HttpClient)?;
    slack.register_slash_command(JOKE_COMMAND, joke_command);
    info!(
        event_name = "system.bootstrap.commands_registered",
        commands = ?slack.slash_commands().command_names(),
        "slash commands registered"
    );

    let store = FileCredentialStore::new(&config.storage.credential_path);
    info!(
        event_name = "system.bootstrap.store_ready",
        store = %store.describe(),
        authenticated = store.load().has_token(),
        "credential store ready"
    );

    let templates = init_templates().map_err(BootstrapError::Templates)?;

    Ok(Application { config, slack, store: Arc::new(store), templates: Arc::new(templates) })
}

#[cfg(test)]
mod tests {
    use slackline_core::config::{AppConfig, ConfigOverrides, LoadOptions};
    use slackline_slack::jokes::JOKE_COMMAND;
    use tempfile::TempDir;

    use crate::bootstrap::{bootstrap_with_config, Application, BootstrapError};

    fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
        bootstrap_with_config(AppConfig::load(options)?)
    }

    #[test]
    fn bootstrap_fails_fast_without_required_slack_credentials() {
        let dir = TempDir::new().expect("tempdir");
        let result = bootstrap(LoadOptions {
            config_path: Some(dir.path().join("absent.toml")),
            overrides: ConfigOverrides {
                client_id: Some(String::new()),
                client_secret: Some("shh".to_string()),
                verification_token: Some("verify-me".to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        });

        let message = result.err().expect("bootstrap should fail").to_string();
        assert!(message.contains("slack.client_id"));
    }

    #[test]
    fn bootstrap_registers_joke_command_and_file_store() {
        let dir = TempDir::new().expect("tempdir");
        let credential_path = dir.path().join("access.txt");
        let app = bootstrap(LoadOptions {
            config_path: Some(dir.path().join("absent.toml")),
            overrides: ConfigOverrides {
                client_id: Some("1234.5678".to_string()),
                client_secret: Some("shh".to_string()),
                verification_token: Some("verify-me".to_string()),
                credential_path: Some(credential_path.clone()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        })
        .expect("bootstrap should succeed with valid overrides");

        assert!(app.slack.slash_commands().contains(JOKE_COMMAND));
        assert!(!app.slack.is_authenticated());
        assert!(app.store.describe().contains("access.txt"));
        assert!(!app.store.load().has_token());
        assert_eq!(app.config.storage.credential_path, credential_path);
    }
}
