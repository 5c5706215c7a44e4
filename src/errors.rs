use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error, Serialize)]
pub enum AppError {
    // The one rejection the protocol surfaces to clients
    #[error("A player with this name is already in the lobby.")]
    DuplicateName {
        player_name: String,
        lobby_id: String,
    },

    // Connection-related errors
    #[error("Connection '{connection_id}' not found")]
    ConnectionNotFound { connection_id: String },

    #[error("Failed to send message to connection '{connection_id}'")]
    MessageSendFailed { connection_id: String },

    // Validation errors
    #[error("Invalid player name: {reason}")]
    InvalidPlayerName { reason: String },

    #[error("Invalid lobby id: {reason}")]
    InvalidLobbyId { reason: String },

    // Serialization errors
    #[error("Failed to serialize response: {message}")]
    SerializationError { message: String },
}

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Clone, Copy)]
pub enum ErrorCategory {
    ClientError,
    ValidationError,
    ServerError,
}

impl AppError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            AppError::DuplicateName { .. } => ErrorCategory::ClientError,

            AppError::InvalidPlayerName { .. } | AppError::InvalidLobbyId { .. } => {
                ErrorCategory::ValidationError
            }

            AppError::ConnectionNotFound { .. }
            | AppError::MessageSendFailed { .. }
            | AppError::SerializationError { .. } => ErrorCategory::ServerError,
        }
    }

    pub fn should_log(&self) -> bool {
        matches!(self.category(), ErrorCategory::ServerError)
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            AppError::SerializationError { .. } => "Invalid message format".to_string(),
            _ => self.to_string(), // Use the error's display message
        }
    }
}

pub mod validation {
    use super::AppError;

    pub fn validate_player_name(name: &str) -> Result<(), AppError> {
        if name.trim().is_empty() {
            return Err(AppError::InvalidPlayerName {
                reason: "Player name cannot be empty".to_string(),
            });
        }
        if name.len() > 50 {
            return Err(AppError::InvalidPlayerName {
                reason: "Player name cannot exceed 50 characters".to_string(),
            });
        }
        if name
            .chars()
            .any(|c| !c.is_alphanumeric() && c != '_' && c != '-')
        {
            return Err(AppError::InvalidPlayerName {
                reason: "Player name can only contain letters, numbers, underscore, and dash"
                    .to_string(),
            });
        }
        Ok(())
    }

    pub fn validate_lobby_id(id: &str) -> Result<(), AppError> {
        if id.trim().is_empty() {
            return Err(AppError::InvalidLobbyId {
                reason: "Lobby id cannot be empty".to_string(),
            });
        }
        if id.len() > 100 {
            return Err(AppError::InvalidLobbyId {
                reason: "Lobby id cannot exceed 100 characters".to_string(),
            });
        }
        Ok(())
    }
}
