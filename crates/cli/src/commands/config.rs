use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::ExposeSecret;
use slackline_core::config::{AppConfig, LoadOptions};
use toml::Value;

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for entry in effective_values(&config) {
        let source = field_source(
            entry.key_path,
            entry.env_keys,
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        );
        lines.push(render_line(entry.key_path, &entry.value, source));
    }

    lines.join("\n")
}

fn effective_values(config: &AppConfig) -> Vec<ConfigEntry> {
    let slack = &config.slack;
    vec![
        entry("slack.client_id", &["SLACKLINE_SLACK_CLIENT_ID"], or_unset(&slack.client_id)),
        entry(
            "slack.client_secret",
            &["SLACKLINE_SLACK_CLIENT_SECRET"],
            redact_secret(slack.client_secret.expose_secret()),
        ),
        entry(
            "slack.verification_token",
            &["SLACKLINE_SLACK_VERIFICATION_TOKEN"],
            redact_secret(slack.verification_token.expose_secret()),
        ),
        entry("slack.scopes", &["SLACKLINE_SLACK_SCOPES"], slack.scopes.join(",")),
        entry("slack.authorize_url", &["SLACKLINE_SLACK_AUTHORIZE_URL"], slack.authorize_url.clone()),
        entry("slack.api_base_url", &["SLACKLINE_SLACK_API_BASE_URL"], slack.api_base_url.clone()),
        entry(
            "slack.redirect_uri",
            &["SLACKLINE_SLACK_REDIRECT_URI"],
            slack.redirect_uri.as_deref().unwrap_or("<unset>").to_string(),
        ),
        entry(
            "slack.default_channel",
            &["SLACKLINE_SLACK_DEFAULT_CHANNEL"],
            slack.default_channel.as_deref().unwrap_or("<unset>").to_string(),
        ),
        entry(
            "slack.verify_command_token",
            &["SLACKLINE_SLACK_VERIFY_COMMAND_TOKEN"],
            slack.verify_command_token.to_string(),
        ),
        entry(
            "slack.request_timeout_secs",
            &["SLACKLINE_SLACK_REQUEST_TIMEOUT_SECS"],
            slack.request_timeout_secs.to_string(),
        ),
        entry(
            "storage.credential_path",
            &["SLACKLINE_STORAGE_CREDENTIAL_PATH"],
            config.storage.credential_path.display().to_string(),
        ),
        entry(
            "server.bind_address",
            &["SLACKLINE_SERVER_BIND_ADDRESS"],
            config.server.bind_address.clone(),
        ),
        entry("server.port", &["SLACKLINE_SERVER_PORT"], config.server.port.to_string()),
        entry(
            "server.health_check_port",
            &["SLACKLINE_SERVER_HEALTH_CHECK_PORT"],
            config.server.health_check_port.to_string(),
        ),
        entry(
            "server.graceful_shutdown_secs",
            &["SLACKLINE_SERVER_GRACEFUL_SHUTDOWN_SECS"],
            config.server.graceful_shutdown_secs.to_string(),
        ),
        entry(
            "logging.level",
            &["SLACKLINE_LOGGING_LEVEL", "SLACKLINE_LOG_LEVEL"],
            config.logging.level.clone(),
        ),
        entry(
            "logging.format",
            &["SLACKLINE_LOGGING_FORMAT", "SLACKLINE_LOG_FORMAT"],
            format!("{:?}", config.logging.format),
        ),
    ]
}

struct ConfigEntry {
    key_path: &'static str,
    env_keys: &'static [&'static str],
    value: String,
}

fn entry(key_path: &'static str, env_keys: &'static [&'static str], value: String) -> ConfigEntry {
    ConfigEntry { key_path, env_keys, value }
}

fn detect_config_path() -> Option<PathBuf> {
    [PathBuf::from("slackline.toml"), PathBuf::from("config/slackline.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    // Blank values count as unset.
    if let Some(env_key) =
        env_keys.iter().find(|key| env::var(key).is_ok_and(|value| !value.trim().is_empty()))
    {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

fn or_unset(value: &str) -> String {
    if value.trim().is_empty() {
        "<unset>".to_string()
    } else {
        value.to_string()
    }
}

/// Keeps only the last four characters so operators can tell secrets apart.
fn redact_secret(secret: &str) -> String {
    let trimmed = secret.trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }

    let chars = trimmed.chars().collect::<Vec<_>>();
    if chars.len() <= 8 {
        return "<redacted>".to_string();
    }

    let tail = chars[chars.len() - 4..].iter().collect::<String>();
    format!("***{tail}")
}
