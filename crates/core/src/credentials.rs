//! Persistence for the OAuth access state returned by Slack.
//!
//! An absent or unreadable credential file is not an error: it is how the
//! unauthenticated state is represented. Writes overwrite the file in place
//! without locking, so concurrent writers race and the last one wins.

use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::warn;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AccessCredential {
    #[serde(default)]
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incoming_webhook: Option<IncomingWebhook>,
    /// Provider fields this crate does not model, kept so a reload writes them back.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomingWebhook {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configuration_url: Option<String>,
}

impl AccessCredential {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self { access_token: access_token.into(), ..Self::default() }
    }

    pub fn has_token(&self) -> bool {
        !self.access_token.trim().is_empty()
    }

    pub fn webhook_url(&self) -> Option<&str> {
        self.incoming_webhook
            .as_ref()
            .map(|webhook| webhook.url.trim())
            .filter(|url| !url.is_empty())
    }

    pub fn to_json(&self) -> Result<String, CredentialStoreError> {
        serde_json::to_string(self).map_err(CredentialStoreError::Serialize)
    }
}

#[derive(Debug, Error)]
pub enum CredentialStoreError {
    #[error("could not read credential file `{path}`: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("credential file `{path}` is not valid JSON: {source}")]
    Parse { path: PathBuf, source: serde_json::Error },
    #[error("could not write credential file `{path}`: {source}")]
    Write { path: PathBuf, source: io::Error },
    #[error("could not serialize access credential: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("credential store is unavailable: {0}")]
    Unavailable(String),
}

pub trait CredentialStore: Send + Sync {
    /// Returns the stored credential, or the empty credential when nothing usable is stored.
    fn load(&self) -> AccessCredential;

    fn save(&self, credential: &AccessCredential) -> Result<(), CredentialStoreError>;

    fn describe(&self) -> String;

    /// Fails when the backing storage exists but cannot be used. An empty
    /// store is usable.
    fn check(&self) -> Result<(), CredentialStoreError> {
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read(&self) -> Result<AccessCredential, CredentialStoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                return Ok(AccessCredential::default());
            }
            Err(source) => {
                return Err(CredentialStoreError::Read { path: self.path.clone(), source });
            }
        };

        serde_json::from_str::<AccessCredential>(&raw)
            .map_err(|source| CredentialStoreError::Parse { path: self.path.clone(), source })
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> AccessCredential {
        match self.read() {
            Ok(credential) => credential,
            Err(error) => {
                warn!(
                    event_name = "credentials.load.failed",
                    error = %error,
                    "credential file is unusable; treating as unauthenticated"
                );
                AccessCredential::default()
            }
        }
    }

    fn save(&self, credential: &AccessCredential) -> Result<(), CredentialStoreError> {
        let payload = credential.to_json()?;
        if let Some(parent) = self.path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| CredentialStoreError::Write {
                path: self.path.clone(),
                source,
            })?;
        }

        fs::write(&self.path, payload)
            .map_err(|source| CredentialStoreError::Write { path: self.path.clone(), source })
    }

    fn describe(&self) -> String {
        format!("file `{}`", self.path.display())
    }

    fn check(&self) -> Result<(), CredentialStoreError> {
        self.read().map(|_| ())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    credential: Mutex<Option<AccessCredential>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credential(credential: AccessCredential) -> Self {
        Self { credential: Mutex::new(Some(credential)) }
    }
}

impl CredentialStore for InMemoryCredentialStore {
    fn load(&self) -> AccessCredential {
        self.credential
            .lock()
            .map(|guard| guard.clone().unwrap_or_default())
            .unwrap_or_default()
    }

    fn save(&self, credential: &AccessCredential) -> Result<(), CredentialStoreError> {
        let mut guard = self
            .credential
            .lock()
            .map_err(|_| CredentialStoreError::Unavailable("in-memory store lock is poisoned".to_string()))?;
        *guard = Some(credential.clone());
        Ok(())
    }

    fn describe(&self) -> String {
        "in-memory".to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use serde_json::json;
    use tempfile::TempDir;

    use super::{
        AccessCredential, CredentialStore, CredentialStoreError, FileCredentialStore,
        InMemoryCredentialStore, IncomingWebhook,
    };

    #[test]
    fn missing_file_loads_as_empty_credential() {
        let dir = TempDir::new().expect("tempdir");
        let store = FileCredentialStore::new(dir.path().join("access.txt"));

        let credential = store.load();

        assert_eq!(credential, AccessCredential::default());
        assert!(!credential.has_token());
    }

    #[test]
    fn unparseable_file_loads_as_empty_credential() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("access.txt");
        fs::write(&path, "{not json").expect("write fixture");

        let credential = FileCredentialStore::new(&path).load();

        assert!(!credential.has_token());
    }

    #[test]
    fn empty_object_is_unauthenticated() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("access.txt");
        fs::write(&path, "{}").expect("write fixture");

        assert!(!FileCredentialStore::new(&path).load().has_token());
    }

    #[test]
    fn save_then_load_preserves_token_and_metadata() {
        let dir = TempDir::new().expect("tempdir");
        let store = FileCredentialStore::new(dir.path().join("state").join("access.txt"));
        let credential = AccessCredential {
            access_token: "xoxp-tok-1".to_string(),
            scope: Some("incoming-webhook,commands".to_string()),
            team_name: Some("Acme".to_string()),
            team_id: Some("T123".to_string()),
            incoming_webhook: Some(IncomingWebhook {
                url: "https://hooks.slack.com/services/T/B/X".to_string(),
                channel: Some("#general".to_string()),
                channel_id: Some("C1".to_string()),
                configuration_url: None,
            }),
            ..AccessCredential::default()
        };

        store.save(&credential).expect("save should succeed");
        let reloaded = store.load();

        assert_eq!(reloaded, credential);
        assert_eq!(reloaded.webhook_url(), Some("https://hooks.slack.com/services/T/B/X"));
    }

    #[test]
    fn save_overwrites_previous_contents() {
        let dir = TempDir::new().expect("tempdir");
        let store = FileCredentialStore::new(dir.path().join("access.txt"));

        store.save(&AccessCredential::new("first")).expect("first save");
        store.save(&AccessCredential::new("second")).expect("second save");

        assert_eq!(store.load().access_token, "second");
    }

    #[test]
    fn unknown_provider_fields_survive_round_trip() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("access.txt");
        fs::write(
            &path,
            json!({"access_token": "tok", "user_id": "U1", "bot": {"bot_user_id": "B1"}})
                .to_string(),
        )
        .expect("write fixture");
        let store = FileCredentialStore::new(&path);

        let loaded = store.load();
        store.save(&loaded).expect("save");
        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).expect("read")).expect("json");

        assert_eq!(raw["user_id"], "U1");
        assert_eq!(raw["bot"]["bot_user_id"], "B1");
    }

    #[test]
    fn blank_webhook_url_is_treated_as_absent() {
        let credential = AccessCredential {
            access_token: "tok".to_string(),
            incoming_webhook: Some(IncomingWebhook { url: "  ".to_string(), ..Default::default() }),
            ..AccessCredential::default()
        };

        assert_eq!(credential.webhook_url(), None);
    }

    #[test]
    fn in_memory_store_starts_empty_and_keeps_last_save() {
        let store = InMemoryCredentialStore::new();
        assert!(!store.load().has_token());

        store.save(&AccessCredential::new("tok-1")).expect("save");

        assert_eq!(store.load().access_token, "tok-1");
    }

    #[test]
    fn check_accepts_a_missing_file() {
        let dir = TempDir::new().expect("tempdir");
        let store = FileCredentialStore::new(dir.path().join("access.txt"));

        store.check().expect("an empty store is usable");
    }

    #[test]
    fn check_reports_unreadable_and_garbled_files() {
        let dir = TempDir::new().expect("tempdir");

        let unreadable = FileCredentialStore::new(dir.path()).check();
        assert!(matches!(unreadable, Err(CredentialStoreError::Read { .. })));

        let path = dir.path().join("access.txt");
        fs::write(&path, "{not json").expect("write fixture");
        let garbled = FileCredentialStore::new(&path).check();
        assert!(matches!(garbled, Err(CredentialStoreError::Parse { .. })));
    }
}
