pub mod config;
pub mod credentials;

pub use config::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};
pub use credentials::{
    AccessCredential, CredentialStore, CredentialStoreError, FileCredentialStore,
    InMemoryCredentialStore, IncomingWebhook,
};
