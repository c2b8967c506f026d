use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid patch: {0}")]
    InvalidPatch(String),

    #[error("Snapshot not found: {0}")]
    SnapshotNotFound(String),

    #[error("IO error: {0}")]
    IoError(String),

    #[error("JSON parsing error: {0}")]
    JsonError(String),

    #[error("Malformed snapshot for champion {champion_id} ({role}): {reason}")]
    MalformedSnapshot {
        champion_id: String,
        role: String,
        reason: String,
    },

    #[error("Unknown role: {0}. Use top, jungle, middle, bottom or support")]
    UnknownRole(String),

    #[error("Champion not found: {0}")]
    UnknownChampion(String),

    #[error("No data available: {0}")]
    NoData(String),
}

impl AppError {
    pub fn malformed(champion_id: impl ToString, role: impl ToString, reason: impl Into<String>) -> Self {
        AppError::MalformedSnapshot {
            champion_id: champion_id.to_string(),
            role: role.to_string(),
            reason: reason.into(),
        }
    }
}
