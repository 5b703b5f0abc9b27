/// Error handling for the table layer
///
/// This module provides:
/// - `TableError`, the single error type returned by `TableManager`
/// - Severity classification that decides how loudly a failure is logged
/// - A serializable `ErrorResponse` for the command layer to render
use fairdeal_engine::errors::GameError;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::ledger::LedgerError;
use crate::TableId;
use fairdeal_engine::player::UserId;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TableError {
    #[error("Table not found: {0}")]
    NotFound(TableId),
    #[error("Table already exists: {0}")]
    AlreadyExists(TableId),
    #[error("Only the host of table {table_id} can do that (requested by {user_id})")]
    NotHost { table_id: TableId, user_id: UserId },
    #[error("Table {0} is closed")]
    Closed(TableId),
    #[error(transparent)]
    Game(#[from] GameError),
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),
    #[error("Table storage poisoned")]
    StoragePoisoned,
}

/// Error classification for logging levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Bad input or out-of-sequence request; expected during normal play
    Client,
    /// A collaborator failed; needs investigation
    Server,
    /// Fairness or state integrity at risk
    Critical,
}

/// Standard error payload handed to the command layer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    /// Machine-readable error code (e.g., "not_your_turn")
    pub error: String,
    /// Human-readable error message
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl TableError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            TableError::Game(e) if e.is_integrity() => ErrorSeverity::Critical,
            TableError::StoragePoisoned => ErrorSeverity::Critical,
            TableError::Ledger(LedgerError::InsufficientFunds { .. }) => ErrorSeverity::Client,
            TableError::Ledger(_) => ErrorSeverity::Server,
            _ => ErrorSeverity::Client,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            TableError::NotFound(_) => "table_not_found",
            TableError::AlreadyExists(_) => "table_exists",
            TableError::NotHost { .. } => "not_host",
            TableError::Closed(_) => "table_closed",
            TableError::Ledger(LedgerError::InsufficientFunds { .. }) => "insufficient_funds",
            TableError::Ledger(_) => "ledger_error",
            TableError::StoragePoisoned => "table_storage_error",
            TableError::Game(e) => match e {
                GameError::NotPlayersTurn { .. } => "not_your_turn",
                GameError::PlayerNotFound(_) => "not_seated",
                GameError::AlreadySeated(_) => "already_seated",
                GameError::TableFull(_) => "table_full",
                GameError::NotEnoughPlayers(_) => "not_enough_players",
                GameError::WrongPhase(_) | GameError::NoHandInProgress => "wrong_phase",
                GameError::TurnNotExpired => "turn_not_expired",
                _ if e.is_integrity() => "integrity_error",
                _ => "invalid_action",
            },
        }
    }

    pub fn to_error_response(&self) -> ErrorResponse {
        ErrorResponse::new(self.error_code(), self.to_string())
    }

    /// Logs the error at the level its severity calls for and returns the
    /// payload to show the user.
    pub fn report(&self, table_id: &str) -> ErrorResponse {
        let response = self.to_error_response();
        match self.severity() {
            ErrorSeverity::Client => tracing::info!(
                table_id = %table_id,
                error = %response.error,
                "request rejected: {}",
                response.message
            ),
            ErrorSeverity::Server => tracing::error!(
                table_id = %table_id,
                error = %response.error,
                "collaborator failure: {}",
                response.message
            ),
            ErrorSeverity::Critical => tracing::error!(
                table_id = %table_id,
                error = %response.error,
                critical = true,
                "integrity failure: {}",
                response.message
            ),
        }
        response
    }
}
