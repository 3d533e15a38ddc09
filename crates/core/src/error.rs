use crate::types::StationId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Unknown station: {0}")]
    UnknownStation(StationId),

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
