//! Error types and handling for the skiforecast service

use thiserror::Error;

/// Main error type for the skiforecast service
#[derive(Error, Debug)]
pub enum ForecastError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Weather API communication errors
    #[error("API error: {message}")]
    Api { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// Region identifier is not one of the known regions
    #[error("Invalid region: {region}")]
    UnknownRegion { region: String },

    /// Region is known but no mountains are configured for it
    #[error("No mountains found for region: {region}")]
    EmptyRegion { region: String },

    /// Mountain identifier is not in the catalogue
    #[error("Unknown mountain: {id}")]
    UnknownMountain { id: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl ForecastError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new API error
    pub fn api<S: Into<String>>(message: S) -> Self {
        Self::Api {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            ForecastError::Config { .. } => {
                "Configuration error. Please check your config file and environment.".to_string()
            }
            ForecastError::Api { .. } => {
                "Unable to reach the weather service. Please try again later.".to_string()
            }
            ForecastError::Validation { message } => format!("Invalid input: {message}"),
            ForecastError::UnknownRegion { region } => format!("Invalid region: {region}"),
            ForecastError::EmptyRegion { region } => {
                format!("No mountains found for region: {region}")
            }
            ForecastError::UnknownMountain { id } => format!("Mountain not found: {id}"),
            ForecastError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
        }
    }
}
