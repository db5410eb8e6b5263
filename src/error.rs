//! Error types for the replay engine.
//!
//! Book mutations are total and never fail; only stream priming and report
//! export can go wrong, so the error surface is small.

use thiserror::Error;

/// Result type alias for replay operations.
pub type Result<T> = std::result::Result<T, LobError>;

#[derive(Error, Debug)]
pub enum LobError {
    /// The snapshot stream produced no rows; the book cannot be seeded.
    #[error("snapshot stream is empty")]
    EmptySnapshotStream,

    /// The message stream produced no rows; nothing to align against.
    #[error("message stream is empty")]
    EmptyMessageStream,

    /// I/O failure while exporting a report.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization failure while exporting a report.
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}
