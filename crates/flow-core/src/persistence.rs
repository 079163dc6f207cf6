//! Session persistence collaborator
//!
//! The engine never talks to a network or a disk itself. Hosts implement
//! [`SessionBackend`] (or drive the controller's two-phase save hooks by hand)
//! and the engine only sees the wire types below.
//!
//! Backends:
//! - [`MemoryBackend`]: in-memory stand-in for tests and offline play
//! - hosts add their own (a JSON file store in the terminal UI, `fetch` in the
//!   browser)

use crate::error::{PathError, PersistenceError, PersistenceResult};
use crate::path_store::validate_path;
use crate::types::{BoardConfig, Cell, Color, Path, Point, PointSet};
use serde::{Deserialize, Serialize};
use std::cell::{Cell as StdCell, RefCell};
use std::collections::{BTreeSet, HashSet};

/// Server-assigned play session identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub u64);

/// Which board and session the controller is working on.
///
/// Passed to the controller at construction and handed to every backend
/// call, so nothing about the session lives in globals.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionContext {
    pub board_id: String,
    pub session_id: Option<SessionId>,
}

impl SessionContext {
    pub fn new(board_id: impl Into<String>) -> Self {
        Self {
            board_id: board_id.into(),
            session_id: None,
        }
    }
}

/// One path on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedPath {
    pub color: Color,
    pub path_data: Vec<Cell>,
}

impl From<Path> for SavedPath {
    fn from(path: Path) -> Self {
        Self {
            color: path.color,
            path_data: path.segments,
        }
    }
}

impl From<SavedPath> for Path {
    fn from(saved: SavedPath) -> Self {
        Path::new(saved.color, saved.path_data)
    }
}

/// Everything needed to (re)start play on a board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    #[serde(rename = "sessionId", alias = "id")]
    pub session_id: SessionId,
    pub board: BoardConfig,
    pub points: Vec<Point>,
    #[serde(default)]
    pub paths: Vec<SavedPath>,
    #[serde(default)]
    pub is_solved: bool,
}

/// Body of a save call: the full set of committed paths
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SaveRequest {
    pub paths: Vec<SavedPath>,
}

/// Reply to a save call. `is_solved` is authoritative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveResponse {
    pub is_solved: bool,
    pub message: String,
    #[serde(default)]
    pub paths_count: usize,
}

/// Trait for session storage backends
pub trait SessionBackend {
    /// Fetch (creating if needed) the session for `context.board_id`
    fn fetch_session(&self, context: &SessionContext) -> PersistenceResult<SessionData>;

    /// Replace every stored path of the session with `request.paths`
    fn save_paths(&self, context: &SessionContext, request: &SaveRequest) -> PersistenceResult<SaveResponse>;

    /// Check if backend is available/connected
    fn is_available(&self) -> bool;

    /// Get backend name for display
    fn backend_name(&self) -> &'static str;
}

/// Authoritative evaluation of a save.
///
/// Every path must pass [`validate_path`]; any failure rejects the whole save.
/// The board then counts as solved when every point color has a path, no
/// two paths share a cell, and all cells are covered.
pub fn evaluate_save(board: &BoardConfig, points: &PointSet, paths: &[SavedPath]) -> Result<bool, Vec<PathError>> {
    let errors: Vec<PathError> = paths
        .iter()
        .filter_map(|saved| {
            let path = Path::new(saved.color.clone(), saved.path_data.clone());
            validate_path(board, points, &path).err()
        })
        .collect();
    if !errors.is_empty() {
        return Err(errors);
    }

    let required = points.colors();
    let drawn: BTreeSet<Color> = paths.iter().map(|p| p.color.clone()).collect();
    if required != drawn {
        return Ok(false);
    }

    let mut covered = HashSet::with_capacity(board.cell_count());
    for cell in paths.iter().flat_map(|p| p.path_data.iter()) {
        if !covered.insert(*cell) {
            return Ok(false);
        }
    }
    Ok(covered.len() == board.cell_count())
}

// ==================== In-Memory Backend ====================

/// In-memory backend that applies the same rules as the remote service
pub struct MemoryBackend {
    session: RefCell<SessionData>,
    available: StdCell<bool>,
    saves: StdCell<usize>,
}

impl MemoryBackend {
    pub fn new(board: BoardConfig, points: Vec<Point>) -> Self {
        Self::with_session(SessionData {
            session_id: SessionId(1),
            board,
            points,
            paths: Vec::new(),
            is_solved: false,
        })
    }

    pub fn with_session(session: SessionData) -> Self {
        Self {
            session: RefCell::new(session),
            available: StdCell::new(true),
            saves: StdCell::new(0),
        }
    }

    /// Simulate the backend going away
    pub fn set_available(&self, available: bool) {
        self.available.set(available);
    }

    pub fn stored_paths(&self) -> Vec<SavedPath> {
        self.session.borrow().paths.clone()
    }

    pub fn stored_solved(&self) -> bool {
        self.session.borrow().is_solved
    }

    /// Number of accepted saves
    pub fn save_count(&self) -> usize {
        self.saves.get()
    }
}

impl SessionBackend for MemoryBackend {
    fn fetch_session(&self, _context: &SessionContext) -> PersistenceResult<SessionData> {
        if !self.available.get() {
            return Err(PersistenceError::Unavailable);
        }
        Ok(self.session.borrow().clone())
    }

    fn save_paths(&self, context: &SessionContext, request: &SaveRequest) -> PersistenceResult<SaveResponse> {
        if !self.available.get() {
            return Err(PersistenceError::Unavailable);
        }
        let mut session = self.session.borrow_mut();
        if context.session_id != Some(session.session_id) {
            return Err(PersistenceError::MissingSession);
        }

        let points = PointSet::new(session.points.clone());
        let is_solved =
            evaluate_save(&session.board, &points, &request.paths).map_err(PersistenceError::Rejected)?;

        session.paths = request.paths.clone();
        session.is_solved = is_solved;
        self.saves.set(self.saves.get() + 1);

        Ok(SaveResponse {
            is_solved,
            message: "Paths saved successfully.".to_string(),
            paths_count: request.paths.len(),
        })
    }

    fn is_available(&self) -> bool {
        self.available.get()
    }

    fn backend_name(&self) -> &'static str {
        "Memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn saved(color: &str, coords: &[(i32, i32)]) -> SavedPath {
        SavedPath {
            color: Color::from(color),
            path_data: coords.iter().map(|&(x, y)| Cell::new(x, y)).collect(),
        }
    }

    /// 2x3 board, red along the top row, blue along the bottom row
    fn two_rows() -> (BoardConfig, Vec<Point>) {
        (
            BoardConfig::new(2, 3),
            vec![
                Point::new(1, 1, 1, "red"),
                Point::new(2, 3, 1, "red"),
                Point::new(3, 1, 2, "blue"),
                Point::new(4, 3, 2, "blue"),
            ],
        )
    }

    fn context() -> SessionContext {
        SessionContext {
            board_id: "demo".to_string(),
            session_id: Some(SessionId(1)),
        }
    }

    #[test]
    fn test_evaluate_solved() {
        let (board, points) = two_rows();
        let points = PointSet::new(points);
        let paths = [
            saved("red", &[(1, 1), (2, 1), (3, 1)]),
            saved("blue", &[(3, 2), (2, 2), (1, 2)]),
        ];
        assert_eq!(evaluate_save(&board, &points, &paths), Ok(true));
    }

    #[test]
    fn test_evaluate_partial_is_unsolved() {
        let (board, points) = two_rows();
        let points = PointSet::new(points);
        let paths = [saved("red", &[(1, 1), (2, 1), (3, 1)])];
        assert_eq!(evaluate_save(&board, &points, &paths), Ok(false));
        assert_eq!(evaluate_save(&board, &points, &[]), Ok(false));
    }

    #[test]
    fn test_evaluate_rejects_invalid_paths() {
        let (board, points) = two_rows();
        let points = PointSet::new(points);
        let paths = [
            saved("red", &[(1, 1), (3, 1)]),
            saved("blue", &[(1, 2), (2, 2), (3, 2)]),
            saved("teal", &[(1, 1), (1, 2)]),
        ];
        let errors = evaluate_save(&board, &points, &paths).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(matches!(errors[0], PathError::NotContiguous { .. }));
        assert!(matches!(errors[1], PathError::UnknownColor { .. }));
    }

    #[test]
    fn test_memory_backend_save_round() {
        let (board, points) = two_rows();
        let backend = MemoryBackend::new(board, points);
        let request = SaveRequest {
            paths: vec![
                saved("red", &[(1, 1), (2, 1), (3, 1)]),
                saved("blue", &[(1, 2), (2, 2), (3, 2)]),
            ],
        };

        let response = backend.save_paths(&context(), &request).unwrap();
        assert!(response.is_solved);
        assert_eq!(response.paths_count, 2);
        assert_eq!(backend.stored_paths(), request.paths);
        assert!(backend.stored_solved());

        let session = backend.fetch_session(&context()).unwrap();
        assert!(session.is_solved);
        assert_eq!(session.paths.len(), 2);
    }

    #[test]
    fn test_memory_backend_rejection_keeps_previous_paths() {
        let (board, points) = two_rows();
        let backend = MemoryBackend::new(board, points);
        let good = SaveRequest {
            paths: vec![saved("red", &[(1, 1), (2, 1), (3, 1)])],
        };
        backend.save_paths(&context(), &good).unwrap();

        let bad = SaveRequest {
            paths: vec![saved("red", &[(1, 1)])],
        };
        let err = backend.save_paths(&context(), &bad).unwrap_err();
        assert!(matches!(err, PersistenceError::Rejected(_)));
        assert_eq!(backend.stored_paths(), good.paths);
        assert_eq!(backend.save_count(), 1);
    }

    #[test]
    fn test_memory_backend_unavailable() {
        let (board, points) = two_rows();
        let backend = MemoryBackend::new(board, points);
        backend.set_available(false);
        assert!(!backend.is_available());
        assert_eq!(
            backend.fetch_session(&context()),
            Err(PersistenceError::Unavailable)
        );
        assert_eq!(
            backend.save_paths(&context(), &SaveRequest::default()),
            Err(PersistenceError::Unavailable)
        );
    }

    #[test]
    fn test_memory_backend_requires_session() {
        let (board, points) = two_rows();
        let backend = MemoryBackend::new(board, points);
        let anonymous = SessionContext::new("demo");
        assert_eq!(
            backend.save_paths(&anonymous, &SaveRequest::default()),
            Err(PersistenceError::MissingSession)
        );
    }

    #[test]
    fn test_session_wire_format() {
        let json = r##"{
            "sessionId": 42,
            "board": {"rows": 2, "cols": 3, "name": "Starter"},
            "points": [{"id": 7, "x": 1, "y": 1, "color": "#ff0000"}],
            "paths": [{"color": "#ff0000", "path_data": [{"x": 1, "y": 1}, {"x": 2, "y": 1}]}],
            "is_solved": false
        }"##;
        let session: SessionData = serde_json::from_str(json).unwrap();
        assert_eq!(session.session_id, SessionId(42));
        assert_eq!(session.board.name, "Starter");
        assert_eq!(session.paths[0].path_data[1], Cell::new(2, 1));

        let legacy = r#"{"id": 3, "board": {"rows": 1, "cols": 1}, "points": []}"#;
        let session: SessionData = serde_json::from_str(legacy).unwrap();
        assert_eq!(session.session_id, SessionId(3));
        assert!(session.paths.is_empty());
        assert!(!session.is_solved);
    }

    #[test]
    fn test_save_request_wire_format() {
        let request = SaveRequest {
            paths: vec![saved("red", &[(1, 1), (1, 2)])],
        };
        assert_eq!(
            serde_json::to_string(&request).unwrap(),
            r#"{"paths":[{"color":"red","path_data":[{"x":1,"y":1},{"x":1,"y":2}]}]}"#
        );
    }
}
