use entities_host::HostError;
use thiserror::Error;

/// Errors that can occur in the suggestion engine
#[derive(Error, Debug)]
pub enum EntitiesError {
    #[error("Unknown provider type: {0}")]
    UnknownProviderType(String),

    #[error("Invalid settings for provider '{provider_type_id}': {message}")]
    InvalidSettings {
        provider_type_id: String,
        message: String,
    },

    #[error("Provider registry has not been initialized")]
    RegistryNotInitialized,

    #[error("Dependency missing: {0}")]
    DependencyMissing(String),

    #[error("Provider '{provider}' failed: {message}")]
    ProviderFailed { provider: String, message: String },

    #[error("Suggestion action failed: {0}")]
    ActionFailed(String),

    #[error("Host error: {0}")]
    Host(#[from] HostError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl EntitiesError {
    pub fn invalid_settings(provider_type_id: &str, message: impl Into<String>) -> Self {
        Self::InvalidSettings {
            provider_type_id: provider_type_id.to_string(),
            message: message.into(),
        }
    }
}

pub type EntitiesResult<T> = std::result::Result<T, EntitiesError>;
