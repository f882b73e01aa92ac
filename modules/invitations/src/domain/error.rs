use thiserror::Error;

use crate::contract::model::{AccountId, EventId};

/// Domain-specific errors using thiserror
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Event not found: {id}")]
    EventNotFound { id: EventId },

    #[error("Account not found: {id}")]
    AccountNotFound { id: AccountId },

    #[error("Email '{email}' is already registered")]
    EmailAlreadyRegistered { email: String },

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Forbidden: {reason}")]
    Forbidden { reason: String },

    #[error("Validation failed: {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Database error: {message}")]
    Database { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn event_not_found(id: EventId) -> Self {
        Self::EventNotFound { id }
    }

    pub fn account_not_found(id: AccountId) -> Self {
        Self::AccountNotFound { id }
    }

    pub fn email_already_registered(email: impl Into<String>) -> Self {
        Self::EmailAlreadyRegistered {
            email: email.into(),
        }
    }

    pub fn forbidden(reason: impl Into<String>) -> Self {
        Self::Forbidden {
            reason: reason.into(),
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Errors whose details must not reach clients.
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Database { .. } | Self::Internal { .. })
    }
}
