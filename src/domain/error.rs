use thiserror::Error;

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Connection error: {backend} - {message}")]
    Connection { backend: String, message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

impl DomainError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn connection(backend: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Connection {
            backend: backend.into(),
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }
}

impl From<bson::ser::Error> for DomainError {
    fn from(err: bson::ser::Error) -> Self {
        Self::serialization(err.to_string())
    }
}
