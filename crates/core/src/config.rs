use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_AUTHORIZE_URL: &str = "https://slack.com/oauth/authorize";
pub const DEFAULT_API_BASE_URL: &str = "https://slack.com/api";
pub const DEFAULT_CREDENTIAL_PATH: &str = "access.txt";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub slack: SlackConfig,
    pub storage: StorageConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct SlackConfig {
    pub client_id: String,
    pub client_secret: SecretString,
    pub verification_token: SecretString,
    pub scopes: Vec<String>,
    pub authorize_url: String,
    pub api_base_url: String,
    pub redirect_uri: Option<String>,
    pub default_channel: Option<String>,
    pub verify_command_token: bool,
    pub request_timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub credential_path: PathBuf,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub health_check_port: u16,
    pub graceful_shutdown_secs: u64,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub verification_token: Option<String>,
    pub api_base_url: Option<String>,
    pub credential_path: Option<PathBuf>,
    pub verify_command_token: Option<bool>,
    pub log_level: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            slack: SlackConfig {
                client_id: String::new(),
                client_secret: String::new().into(),
                verification_token: String::new().into(),
                scopes: vec!["incoming-webhook".to_string(), "commands".to_string()],
                authorize_url: DEFAULT_AUTHORIZE_URL.to_string(),
                api_base_url: DEFAULT_API_BASE_URL.to_string(),
                redirect_uri: None,
                default_channel: None,
                verify_command_token: true,
                request_timeout_secs: 10,
            },
            storage: StorageConfig { credential_path: PathBuf::from(DEFAULT_CREDENTIAL_PATH) },
            server: ServerConfig {
                bind_address: "127.0.0.1".to_string(),
                port: 3000,
                health_check_port: 8080,
                graceful_shutdown_secs: 15,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("slackline.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(slack) = patch.slack {
            if let Some(client_id) = slack.client_id {
                self.slack.client_id = client_id;
            }
            if let Some(client_secret) = slack.client_secret {
                self.slack.client_secret = secret_value(client_secret);
            }
            if let Some(verification_token) = slack.verification_token {
                self.slack.verification_token = secret_value(verification_token);
            }
            if let Some(scopes) = slack.scopes {
                self.slack.scopes = scopes;
            }
            if let Some(authorize_url) = slack.authorize_url {
                self.slack.authorize_url = authorize_url;
            }
            if let Some(api_base_url) = slack.api_base_url {
                self.slack.api_base_url = api_base_url;
            }
            if let Some(redirect_uri) = slack.redirect_uri {
                self.slack.redirect_uri = Some(redirect_uri);
            }
            if let Some(default_channel) = slack.default_channel {
                self.slack.default_channel = Some(default_channel);
            }
            if let Some(verify_command_token) = slack.verify_command_token {
                self.slack.verify_command_token = verify_command_token;
            }
            if let Some(request_timeout_secs) = slack.request_timeout_secs {
                self.slack.request_timeout_secs = request_timeout_secs;
            }
        }

        if let Some(storage) = patch.storage {
            if let Some(credential_path) = storage.credential_path {
                self.storage.credential_path = credential_path;
            }
        }

        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
            if let Some(health_check_port) = server.health_check_port {
                self.server.health_check_port = health_check_port;
            }
            if let Some(graceful_shutdown_secs) = server.graceful_shutdown_secs {
                self.server.graceful_shutdown_secs = graceful_shutdown_secs;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("SLACKLINE_SLACK_CLIENT_ID") {
            self.slack.client_id = value;
        }
        if let Some(value) = read_env("SLACKLINE_SLACK_CLIENT_SECRET") {
            self.slack.client_secret = secret_value(value);
        }
        if let Some(value) = read_env("SLACKLINE_SLACK_VERIFICATION_TOKEN") {
            self.slack.verification_token = secret_value(value);
        }
        if let Some(value) = read_env("SLACKLINE_SLACK_SCOPES") {
            self.slack.scopes = split_scopes(&value);
        }
        if let Some(value) = read_env("SLACKLINE_SLACK_AUTHORIZE_URL") {
            self.slack.authorize_url = value;
        }
        if let Some(value) = read_env("SLACKLINE_SLACK_API_BASE_URL") {
            self.slack.api_base_url = value;
        }
        if let Some(value) = read_env("SLACKLINE_SLACK_REDIRECT_URI") {
            self.slack.redirect_uri = Some(value);
        }
        if let Some(value) = read_env("SLACKLINE_SLACK_DEFAULT_CHANNEL") {
            self.slack.default_channel = Some(value);
        }
        if let Some(value) = read_env("SLACKLINE_SLACK_VERIFY_COMMAND_TOKEN") {
            self.slack.verify_command_token =
                parse_bool("SLACKLINE_SLACK_VERIFY_COMMAND_TOKEN", &value)?;
        }
        if let Some(value) = read_env("SLACKLINE_SLACK_REQUEST_TIMEOUT_SECS") {
            self.slack.request_timeout_secs =
                parse_u64("SLACKLINE_SLACK_REQUEST_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("SLACKLINE_STORAGE_CREDENTIAL_PATH") {
            self.storage.credential_path = PathBuf::from(value);
        }

        if let Some(value) = read_env("SLACKLINE_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("SLACKLINE_SERVER_PORT") {
            self.server.port = parse_u16("SLACKLINE_SERVER_PORT", &value)?;
        }
        if let Some(value) = read_env("SLACKLINE_SERVER_HEALTH_CHECK_PORT") {
            self.server.health_check_port =
                parse_u16("SLACKLINE_SERVER_HEALTH_CHECK_PORT", &value)?;
        }
        if let Some(value) = read_env("SLACKLINE_SERVER_GRACEFUL_SHUTDOWN_SECS") {
            self.server.graceful_shutdown_secs =
                parse_u64("SLACKLINE_SERVER_GRACEFUL_SHUTDOWN_SECS", &value)?;
        }

        let log_level =
            read_env("SLACKLINE_LOGGING_LEVEL").or_else(|| read_env("SLACKLINE_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("SLACKLINE_LOGGING_FORMAT").or_else(|| read_env("SLACKLINE_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(client_id) = overrides.client_id {
            self.slack.client_id = client_id;
        }
        if let Some(client_secret) = overrides.client_secret {
            self.slack.client_secret = secret_value(client_secret);
        }
        if let Some(verification_token) = overrides.verification_token {
            self.slack.verification_token = secret_value(verification_token);
        }
        if let Some(api_base_url) = overrides.api_base_url {
            self.slack.api_base_url = api_base_url;
        }
        if let Some(credential_path) = overrides.credential_path {
            self.storage.credential_path = credential_path;
        }
        if let Some(verify_command_token) = overrides.verify_command_token {
            self.slack.verify_command_token = verify_command_token;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_slack(&self.slack)?;
        validate_storage(&self.storage)?;
        validate_server(&self.server)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("slackline.toml"), PathBuf::from("config/slackline.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn split_scopes(raw: &str) -> Vec<String> {
    raw.split(|c: char| c == ',' || c.is_ascii_whitespace())
        .map(str::trim)
        .filter(|scope| !scope.is_empty())
        .map(ToString::to_string)
        .collect()
}

fn validate_slack(slack: &SlackConfig) -> Result<(), ConfigError> {
    if slack.client_id.trim().is_empty() {
        return Err(ConfigError::Validation(
            "slack.client_id is required. Get it from https://api.slack.com/apps > Your App > Basic Information > App Credentials".to_string(),
        ));
    }

    if slack.client_secret.expose_secret().trim().is_empty() {
        return Err(ConfigError::Validation(
            "slack.client_secret is required. Get it from https://api.slack.com/apps > Your App > Basic Information > App Credentials".to_string(),
        ));
    }

    if slack.verify_command_token && slack.verification_token.expose_secret().trim().is_empty() {
        return Err(ConfigError::Validation(
            "slack.verification_token is required while slack.verify_command_token is enabled (set verify_command_token = false to accept unverified slash commands)".to_string(),
        ));
    }

    if slack.scopes.iter().all(|scope| scope.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "slack.scopes must list at least one OAuth scope".to_string(),
        ));
    }

    for (key, url) in [
        ("slack.authorize_url", slack.authorize_url.as_str()),
        ("slack.api_base_url", slack.api_base_url.as_str()),
    ] {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ConfigError::Validation(format!(
                "{key} must start with http:// or https://"
            )));
        }
    }

    if let Some(redirect_uri) = &slack.redirect_uri {
        if !redirect_uri.starts_with("http://") && !redirect_uri.starts_with("https://") {
            return Err(ConfigError::Validation(
                "slack.redirect_uri must start with http:// or https://".to_string(),
            ));
        }
    }

    if slack.request_timeout_secs == 0 || slack.request_timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "slack.request_timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    Ok(())
}

fn validate_storage(storage: &StorageConfig) -> Result<(), ConfigError> {
    if storage.credential_path.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "storage.credential_path must not be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.port == 0 {
        return Err(ConfigError::Validation("server.port must be greater than zero".to_string()));
    }

    if server.health_check_port == 0 {
        return Err(ConfigError::Validation(
            "server.health_check_port must be greater than zero".to_string(),
        ));
    }

    if server.health_check_port == server.port {
        return Err(ConfigError::Validation(
            "server.health_check_port must differ from server.port".to_string(),
        ));
    }

    if server.graceful_shutdown_secs == 0 {
        return Err(ConfigError::Validation(
            "server.graceful_shutdown_secs must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value.parse::<u16>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    value.trim().parse::<bool>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    slack: Option<SlackPatch>,
    storage: Option<StoragePatch>,
    server: Option<ServerPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct SlackPatch {
    client_id: Option<String>,
    client_secret: Option<String>,
    verification_token: Option<String>,
    scopes: Option<Vec<String>>,
    authorize_url: Option<String>,
    api_base_url: Option<String>,
    redirect_uri: Option<String>,
    default_channel: Option<String>,
    verify_command_token: Option<bool>,
    request_timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct StoragePatch {
    credential_path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
    health_check_port: Option<u16>,
    graceful_shutdown_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::io;
    use std::path::PathBuf;
    use std::sync::{Mutex, OnceLock};

    use secrecy::ExposeSecret;
    use tempfile::TempDir;

    use super::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    fn env_lock() -> &'static Mutex<()> {
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    fn clear_vars(vars: &[&str]) {
        for var in vars {
            env::remove_var(var);
        }
    }

    fn ensure(condition: bool, message: &'static str) -> Result<(), String> {
        if condition {
            Ok(())
        } else {
            Err(message.to_string())
        }
    }

    const CREDENTIAL_VARS: [&str; 3] = [
        "SLACKLINE_SLACK_CLIENT_ID",
        "SLACKLINE_SLACK_CLIENT_SECRET",
        "SLACKLINE_SLACK_VERIFICATION_TOKEN",
    ];

    fn set_valid_credentials() {
        env::set_var("SLACKLINE_SLACK_CLIENT_ID", "1234.5678");
        env::set_var("SLACKLINE_SLACK_CLIENT_SECRET", "client-secret-value");
        env::set_var("SLACKLINE_SLACK_VERIFICATION_TOKEN", "verification-token-value");
    }

    #[test]
    fn file_load_supports_env_interpolation() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("TEST_SLACKLINE_CLIENT_SECRET", "secret-from-env");
        env::set_var("TEST_SLACKLINE_VERIFICATION", "verify-from-env");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("slackline.toml");
            fs::write(
                &path,
                r#"
[slack]
client_id = "1111.2222"
client_secret = "${TEST_SLACKLINE_CLIENT_SECRET}"
verification_token = "${TEST_SLACKLINE_VERIFICATION}"
scopes = ["incoming-webhook", "commands", "chat:write"]

[storage]
credential_path = "state/access.json"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config =
                AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
                    .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.slack.client_id == "1111.2222", "client id should come from file")?;
            ensure(
                config.slack.client_secret.expose_secret() == "secret-from-env",
                "client secret should be interpolated from environment",
            )?;
            ensure(
                config.slack.verification_token.expose_secret() == "verify-from-env",
                "verification token should be interpolated from environment",
            )?;
            ensure(config.slack.scopes.len() == 3, "scopes should be read from file")?;
            ensure(
                config.storage.credential_path == PathBuf::from("state/access.json"),
                "credential path should be read from file",
            )?;
            Ok(())
        })();

        clear_vars(&["TEST_SLACKLINE_CLIENT_SECRET", "TEST_SLACKLINE_VERIFICATION"]);
        result
    }

    #[test]
    fn unterminated_interpolation_is_rejected() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
        let path = dir.path().join("slackline.toml");
        fs::write(&path, "[slack]\nclient_id = \"${BROKEN\"\n").map_err(|err| err.to_string())?;

        let result = AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() });
        ensure(
            matches!(result, Err(ConfigError::UnterminatedInterpolation)),
            "unterminated interpolation should fail",
        )
    }

    #[test]
    fn logging_env_aliases_are_supported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        set_valid_credentials();
        env::set_var("SLACKLINE_LOG_LEVEL", "warn");
        env::set_var("SLACKLINE_LOG_FORMAT", "pretty");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.logging.level == "warn", "warning log level should be set from env var")?;
            ensure(
                matches!(config.logging.format, LogFormat::Pretty),
                "pretty logging format should be set from env var",
            )?;
            Ok(())
        })();

        clear_vars(&CREDENTIAL_VARS);
        clear_vars(&["SLACKLINE_LOG_LEVEL", "SLACKLINE_LOG_FORMAT"]);
        result
    }

    #[test]
    fn precedence_defaults_file_env_overrides() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("SLACKLINE_SLACK_CLIENT_SECRET", "secret-from-env");
        env::set_var("SLACKLINE_SLACK_SCOPES", "incoming-webhook, commands chat:write");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("slackline.toml");
            fs::write(
                &path,
                r#"
[slack]
client_id = "from-file"
client_secret = "secret-from-file"
verification_token = "verify-from-file"

[logging]
level = "warn"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config = AppConfig::load(LoadOptions {
                config_path: Some(path),
                overrides: ConfigOverrides {
                    client_id: Some("from-override".to_string()),
                    log_level: Some("debug".to_string()),
                    ..ConfigOverrides::default()
                },
                ..LoadOptions::default()
            })
            .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.slack.client_id == "from-override", "override client id should win")?;
            ensure(config.logging.level == "debug", "overridden log level should be debug")?;
            ensure(
                config.slack.client_secret.expose_secret() == "secret-from-env",
                "env client secret should win over file and defaults",
            )?;
            ensure(
                config.slack.verification_token.expose_secret() == "verify-from-file",
                "file verification token should win over defaults",
            )?;
            ensure(
                config.slack.scopes == ["incoming-webhook", "commands", "chat:write"],
                "env scopes should be split on commas and whitespace",
            )?;
            Ok(())
        })();

        clear_vars(&["SLACKLINE_SLACK_CLIENT_SECRET", "SLACKLINE_SLACK_SCOPES"]);
        result
    }

    #[test]
    fn validation_fails_fast_with_actionable_error() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("SLACKLINE_SLACK_CLIENT_SECRET", "client-secret-value");

        let result = (|| -> Result<(), String> {
            let error = match AppConfig::load(LoadOptions::default()) {
                Ok(_) => {
                    return Err("expected validation failure but config load succeeded".to_string())
                }
                Err(error) => error,
            };
            let has_message = matches!(
                error,
                ConfigError::Validation(ref message) if message.contains("slack.client_id")
            );
            ensure(has_message, "validation failure should mention slack.client_id")
        })();

        clear_vars(&["SLACKLINE_SLACK_CLIENT_SECRET"]);
        result
    }

    #[test]
    fn verification_token_is_optional_when_checks_are_disabled() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("SLACKLINE_SLACK_CLIENT_ID", "1234.5678");
        env::set_var("SLACKLINE_SLACK_CLIENT_SECRET", "client-secret-value");

        let result = (|| -> Result<(), String> {
            let strict = AppConfig::load(LoadOptions::default());
            ensure(
                matches!(
                    strict,
                    Err(ConfigError::Validation(ref message)) if message.contains("slack.verification_token")
                ),
                "missing verification token should fail while checks are enabled",
            )?;

            let relaxed = AppConfig::load(LoadOptions {
                overrides: ConfigOverrides {
                    verify_command_token: Some(false),
                    ..ConfigOverrides::default()
                },
                ..LoadOptions::default()
            })
            .map_err(|err| format!("config load failed: {err}"))?;
            ensure(!relaxed.slack.verify_command_token, "override should disable token checks")
        })();

        clear_vars(&["SLACKLINE_SLACK_CLIENT_ID", "SLACKLINE_SLACK_CLIENT_SECRET"]);
        result
    }

    #[test]
    fn invalid_numeric_env_override_is_reported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        set_valid_credentials();
        env::set_var("SLACKLINE_SERVER_PORT", "not-a-port");

        let result = match AppConfig::load(LoadOptions::default()) {
            Err(ConfigError::InvalidEnvOverride { key, .. }) => {
                ensure(key == "SLACKLINE_SERVER_PORT", "error should name the offending key")
            }
            _ => Err("expected invalid env override error".to_string()),
        };

        clear_vars(&CREDENTIAL_VARS);
        clear_vars(&["SLACKLINE_SERVER_PORT"]);
        result
    }

    #[test]
    fn secret_values_are_not_leaked_by_debug() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        set_valid_credentials();

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;
            let debug = format!("{config:?}");

            ensure(
                !debug.contains("client-secret-value"),
                "debug output should not contain client secret",
            )?;
            ensure(
                !debug.contains("verification-token-value"),
                "debug output should not contain verification token",
            )?;
            ensure(
                matches!(config.logging.format, LogFormat::Compact),
                "default logging format should be compact",
            )?;
            ensure(
                config.slack.scopes == ["incoming-webhook", "commands"],
                "default scopes should request webhook and commands",
            )?;
            Ok(())
        })();

        clear_vars(&CREDENTIAL_VARS);
        result
    }
}
