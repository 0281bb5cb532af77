//! Error types
//!
//! Every error here is a deterministic precondition violation or a failure
//! reported by a collaborator (file I/O, CSV parsing, the GL window). None of
//! them are worth retrying.

use thiserror::Error;

/// Errors raised by the contact graph, the simulator and their collaborators
#[derive(Debug, Error)]
pub enum Error {
    /// An edge, seed or query named a person that is not in the graph
    #[error("Unknown person: {id}")]
    UnknownVertex { id: String },

    /// An edge from a person to themselves
    #[error("A person cannot be in contact with themselves: {id}")]
    SelfContact { id: String },

    /// Edge weight outside of `[0, 1]`
    #[error("Contact level must be within [0, 1], got {weight}")]
    InvalidContactLevel { weight: f64 },

    /// Simulation was configured with out-of-range parameters
    #[error("Invalid simulation conditions: {0}")]
    InvalidConditions(String),

    /// Degrees apart were queried before a labeling pass for the current infected set
    #[error("Degrees apart not computed for {id}")]
    DegreeNotComputed { id: String },

    /// Contact level name other than `high`, `medium` or `low`
    #[error("Unknown contact level: {0}")]
    UnknownContactLevel(String),

    /// Connectivity answer other than `yes` or `no`
    #[error("Unknown connectivity: {0}")]
    UnknownConnectivity(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Window or GL failure while playing back frames
    #[error("Render error: {0}")]
    Render(String),
}

/// Result type for contact graph operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn unknown_vertex(id: impl Into<String>) -> Self {
        Self::UnknownVertex { id: id.into() }
    }

    pub(crate) fn render(err: impl std::fmt::Display) -> Self {
        Self::Render(err.to_string())
    }
}
