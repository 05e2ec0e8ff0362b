use chrono::{DateTime, Utc};
use thiserror::Error;

/// Coarse failure taxonomy, used by boundaries (HTTP, CLI) to pick a
/// presentation without matching every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    PermissionDenied,
    NotFound,
    Conflict,
    Validation,
    Internal,
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    PermissionDenied(#[from] grants::PermissionDenied),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("desk tag '{tag}' already exists")]
    TagConflict { tag: String },

    #[error("desk {desk_id} is already reserved for {date}")]
    SlotConflict { desk_id: i64, date: DateTime<Utc> },

    #[error("actor {actor_id} already holds a reservation for {date}")]
    ActorSlotConflict { actor_id: i64, date: DateTime<Utc> },

    #[error("actor handle '{handle}' is already taken")]
    HandleConflict { handle: String },

    #[error("desk {desk_id} is unavailable")]
    DeskUnavailable { desk_id: i64 },

    #[error("invalid {field}: {message}")]
    Validation { field: &'static str, message: String },

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("{message}")]
    Internal { message: String },
}

pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        Self::NotFound { entity, id }
    }

    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::PermissionDenied(_) => ErrorKind::PermissionDenied,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::TagConflict { .. }
            | Self::SlotConflict { .. }
            | Self::ActorSlotConflict { .. }
            | Self::HandleConflict { .. }
            | Self::DeskUnavailable { .. } => ErrorKind::Conflict,
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Storage(_) | Self::Internal { .. } => ErrorKind::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_family_maps_to_conflict_kind() {
        let date = DateTime::<Utc>::from_timestamp(0, 0).unwrap();
        assert_eq!(
            CoreError::TagConflict { tag: "CD1".into() }.kind(),
            ErrorKind::Conflict
        );
        assert_eq!(
            CoreError::SlotConflict { desk_id: 1, date }.kind(),
            ErrorKind::Conflict
        );
        assert_eq!(
            CoreError::ActorSlotConflict { actor_id: 1, date }.kind(),
            ErrorKind::Conflict
        );
        assert_eq!(
            CoreError::DeskUnavailable { desk_id: 1 }.kind(),
            ErrorKind::Conflict
        );
    }

    #[test]
    fn not_found_message_names_entity_and_id() {
        assert_eq!(
            CoreError::not_found("desk", 7).to_string(),
            "desk 7 not found"
        );
    }
}
