//! Error types for the flow engine

use crate::types::{Cell, Color};

/// Fatal wiring and configuration errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// A collaborator the engine cannot run without was not supplied
    #[error("missing required collaborator: {0}")]
    MissingCollaborator(&'static str),
    /// Board dimensions must both be at least one
    #[error("invalid board dimensions {cols}x{rows}")]
    InvalidBoard { rows: u32, cols: u32 },
}

/// Reasons a committed path is rejected by the authoritative evaluation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    #[error("path for color {color} must contain at least two cells")]
    TooShort { color: Color },
    #[error("path for color {color} leaves the {cols}x{rows} board at {cell}")]
    OutOfBounds {
        color: Color,
        cell: Cell,
        rows: u32,
        cols: u32,
    },
    #[error("path for color {color} is not contiguous between {from} and {to}")]
    NotContiguous { color: Color, from: Cell, to: Cell },
    #[error("path for color {color} visits {cell} more than once")]
    SelfIntersects { color: Color, cell: Cell },
    #[error("no points found for color {color}")]
    UnknownColor { color: Color },
    #[error("color {color} must have exactly two points, found {found}")]
    NotPaired { color: Color, found: usize },
    #[error("path for color {color} does not start and end on its point pair")]
    WrongEndpoints { color: Color },
}

/// Result type for persistence operations
pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Errors surfaced by a persistence collaborator
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PersistenceError {
    /// Transport failure before a response arrived
    #[error("network error: {0}")]
    Network(String),
    /// Remote side answered with an error
    #[error("server error: {0}")]
    Server(String),
    /// Response could not be understood
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    /// Local storage failure
    #[error("storage error: {0}")]
    Storage(String),
    /// One or more submitted paths failed validation; nothing was stored
    #[error("some paths could not be saved: {}", join_errors(.0))]
    Rejected(Vec<PathError>),
    /// Backend is switched off or unreachable
    #[error("persistence backend unavailable")]
    Unavailable,
    /// No session has been established for this board
    #[error("session not found")]
    MissingSession,
}

fn join_errors(errors: &[PathError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_lists_every_path() {
        let err = PersistenceError::Rejected(vec![
            PathError::TooShort {
                color: Color::from("red"),
            },
            PathError::UnknownColor {
                color: Color::from("teal"),
            },
        ]);
        let text = err.to_string();
        assert!(text.contains("color red must contain at least two cells"));
        assert!(text.contains("no points found for color teal"));
    }

    #[test]
    fn test_out_of_bounds_names_cell() {
        let err = PathError::OutOfBounds {
            color: Color::from("blue"),
            cell: Cell::new(4, 1),
            rows: 3,
            cols: 3,
        };
        assert_eq!(
            err.to_string(),
            "path for color blue leaves the 3x3 board at (4,1)"
        );
    }
}
