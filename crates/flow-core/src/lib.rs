//! Flow puzzle engine
//!
//! Turns pointer drags into colored paths on a grid and decides when the
//! paths solve the board: every paired color connected, every cell covered
//! exactly once.
//!
//! ```
//! use flow_core::{BoardConfig, Cell, CellGrid, GameController, Point, SessionContext, SessionData, SessionId};
//!
//! let mut game = GameController::builder()
//!     .geometry(CellGrid::square(30.0, 2, 1))
//!     .context(SessionContext::new("tiny"))
//!     .build()
//!     .unwrap();
//! game.load_session(SessionData {
//!     session_id: SessionId(1),
//!     board: BoardConfig::new(1, 2),
//!     points: vec![Point::new(1, 1, 1, "red"), Point::new(2, 2, 1, "red")],
//!     paths: Vec::new(),
//!     is_solved: false,
//! })
//! .unwrap();
//!
//! game.pointer_down_cell(Cell::new(1, 1));
//! game.pointer_move_cell(Cell::new(2, 1));
//! game.pointer_up();
//! assert!(game.check().solved);
//! ```

pub mod controller;
pub mod error;
pub mod geometry;
pub mod path_store;
pub mod persistence;
pub mod solution;
pub mod stroke;
pub mod types;

pub use controller::{Controls, GameController, GameControllerBuilder, Phase, Status, StrokePreview};
pub use error::{EngineError, PathError, PersistenceError, PersistenceResult};
pub use geometry::{
    fit_cell_size, CellGrid, GridGeometry, PointerSample, ResizeDebouncer, DEFAULT_CELL_SIZE, MIN_CELL_SIZE,
    RELAYOUT_DEBOUNCE_MS,
};
pub use path_store::{validate_path, PathStore};
pub use persistence::{
    evaluate_save, MemoryBackend, SaveRequest, SaveResponse, SavedPath, SessionBackend, SessionContext, SessionData,
    SessionId,
};
pub use solution::{check_solution, Severity, Verdict};
pub use stroke::{choose_diagonal, DiagonalRoute, StrokeChange, StrokeFinish, StrokeTracker};
pub use types::{BoardConfig, Cell, Color, Path, Point, PointId, PointSet};
