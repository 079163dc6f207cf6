//! Board files and on-disk session storage
//!
//! Sessions live at `<data dir>/flow/<board id>.json`. The file backend runs
//! the same acceptance rules as the web service so a terminal session behaves
//! the same way offline.

use flow_core::{
    evaluate_save, BoardConfig, PersistenceError, PersistenceResult, Point, PointSet, SaveRequest, SaveResponse,
    SessionBackend, SessionContext, SessionData, SessionId,
};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Largest row or column count a terminal board may have
pub const MAX_BOARD_SIDE: u32 = 200;

/// A puzzle definition loaded from `--board`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardFile {
    pub id: String,
    pub board: BoardConfig,
    pub points: Vec<Point>,
}

impl BoardFile {
    pub fn read(path: &Path) -> io::Result<Self> {
        let json = fs::read_to_string(path)?;
        let file: Self =
            serde_json::from_str(&json).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        file.board
            .validate()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        if file.board.rows > MAX_BOARD_SIDE || file.board.cols > MAX_BOARD_SIDE {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "board {}x{} exceeds the {MAX_BOARD_SIDE}x{MAX_BOARD_SIDE} terminal limit",
                    file.board.rows, file.board.cols
                ),
            ));
        }
        Ok(file)
    }

    /// Built-in 5x5 starter puzzle
    ///
    /// ```text
    /// R . G . Y
    /// . . B . O
    /// . . . . .
    /// . G . Y .
    /// . R B O .
    /// ```
    pub fn demo() -> Self {
        let pairs = [
            ("#e53935", (1, 1), (2, 5)),
            ("#43a047", (3, 1), (2, 4)),
            ("#fdd835", (5, 1), (4, 4)),
            ("#1e88e5", (3, 2), (3, 5)),
            ("#fb8c00", (5, 2), (4, 5)),
        ];
        let points = pairs
            .iter()
            .enumerate()
            .flat_map(|(i, &(color, (x1, y1), (x2, y2)))| {
                let id = i as u64 * 2 + 1;
                [Point::new(id, x1, y1, color), Point::new(id + 1, x2, y2, color)]
            })
            .collect();

        Self {
            id: "starter".to_string(),
            board: BoardConfig::new(5, 5).with_name("Starter"),
            points,
        }
    }

    fn fresh_session(&self) -> SessionData {
        SessionData {
            session_id: SessionId(1),
            board: self.board.clone(),
            points: self.points.clone(),
            paths: Vec::new(),
            is_solved: false,
        }
    }
}

/// JSON file backend, one file per board
pub struct LocalSessionStore {
    path: PathBuf,
    board: BoardFile,
    cache: RefCell<Option<SessionData>>,
}

impl LocalSessionStore {
    /// `data_dir` overrides the platform data directory
    pub fn new(data_dir: Option<PathBuf>, board: BoardFile) -> Self {
        let dir = data_dir.unwrap_or_else(|| {
            dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("flow")
        });
        let path = dir.join(format!("{}.json", board.id));

        Self {
            path,
            board,
            cache: RefCell::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn board_id(&self) -> &str {
        &self.board.id
    }

    /// Forget the saved session for this board
    pub fn discard(&self) -> io::Result<()> {
        *self.cache.borrow_mut() = None;
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }

    fn load(&self) -> PersistenceResult<SessionData> {
        if let Some(ref session) = *self.cache.borrow() {
            return Ok(session.clone());
        }

        let session = match fs::read_to_string(&self.path) {
            Ok(json) => {
                let stored: SessionData =
                    serde_json::from_str(&json).map_err(|e| PersistenceError::InvalidResponse(e.to_string()))?;
                if stored.board == self.board.board && stored.points == self.board.points {
                    stored
                } else {
                    warn!(path = %self.path.display(), "board changed since last save, starting over");
                    self.board.fresh_session()
                }
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => self.board.fresh_session(),
            Err(e) => return Err(PersistenceError::Storage(e.to_string())),
        };

        *self.cache.borrow_mut() = Some(session.clone());
        Ok(session)
    }

    fn write(&self, session: &SessionData) -> PersistenceResult<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).map_err(|e| PersistenceError::Storage(e.to_string()))?;
        }
        let json = serde_json::to_string_pretty(session).map_err(|e| PersistenceError::Storage(e.to_string()))?;
        fs::write(&self.path, json).map_err(|e| PersistenceError::Storage(e.to_string()))?;

        debug!(path = %self.path.display(), "session written");
        *self.cache.borrow_mut() = Some(session.clone());
        Ok(())
    }
}

impl SessionBackend for LocalSessionStore {
    fn fetch_session(&self, _context: &SessionContext) -> PersistenceResult<SessionData> {
        self.load()
    }

    fn save_paths(&self, context: &SessionContext, request: &SaveRequest) -> PersistenceResult<SaveResponse> {
        let mut session = self.load()?;
        if context.session_id != Some(session.session_id) {
            return Err(PersistenceError::MissingSession);
        }

        let points = PointSet::new(session.points.clone());
        let is_solved =
            evaluate_save(&session.board, &points, &request.paths).map_err(PersistenceError::Rejected)?;

        session.paths = request.paths.clone();
        session.is_solved = is_solved;
        self.write(&session)?;

        Ok(SaveResponse {
            is_solved,
            message: "Paths saved successfully.".to_string(),
            paths_count: request.paths.len(),
        })
    }

    fn is_available(&self) -> bool {
        true
    }

    fn backend_name(&self) -> &'static str {
        "Local"
    }
}
