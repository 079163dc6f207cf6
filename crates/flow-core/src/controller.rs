//! Game controller: pointer dispatch, solved/dirty bookkeeping and the
//! persistence handshake.

use crate::error::{EngineError, PersistenceError, PersistenceResult};
use crate::geometry::{GridGeometry, PointerSample};
use crate::path_store::{validate_path, PathStore};
use crate::persistence::{SaveRequest, SaveResponse, SavedPath, SessionBackend, SessionContext, SessionData};
use crate::solution::{check_solution, Severity, Verdict};
use crate::stroke::{StrokeFinish, StrokeTracker};
use crate::types::{BoardConfig, Cell, Color, Path, PointSet};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

/// Controller lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// No session loaded yet
    Uninitialized,
    Ready,
    Drawing,
}

/// User-facing status line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    pub message: String,
    pub severity: Severity,
}

impl Status {
    pub fn new(message: impl Into<String>, severity: Severity) -> Self {
        Self {
            message: message.into(),
            severity,
        }
    }
}

impl From<&Verdict> for Status {
    fn from(verdict: &Verdict) -> Self {
        Self::new(verdict.message.clone(), verdict.severity)
    }
}

/// Which controls a host should enable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Controls {
    pub drawing: bool,
    pub check: bool,
    pub save: bool,
    pub reset: bool,
    /// Show the unsaved-changes indicator
    pub unsaved: bool,
}

/// The stroke being drawn, for live preview
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrokePreview<'a> {
    pub color: &'a Color,
    pub cells: &'a [Cell],
}

/// Builder for [`GameController`]
pub struct GameControllerBuilder<G> {
    geometry: Option<G>,
    context: Option<SessionContext>,
}

impl<G: GridGeometry> GameControllerBuilder<G> {
    pub fn geometry(mut self, geometry: G) -> Self {
        self.geometry = Some(geometry);
        self
    }

    pub fn context(mut self, context: SessionContext) -> Self {
        self.context = Some(context);
        self
    }

    pub fn build(self) -> Result<GameController<G>, EngineError> {
        let geometry = self.geometry.ok_or(EngineError::MissingCollaborator("grid geometry"))?;
        let context = self.context.ok_or(EngineError::MissingCollaborator("session context"))?;
        let (cols, rows) = geometry.dimensions();

        Ok(GameController {
            geometry,
            context,
            board: BoardConfig::new(rows, cols),
            points: PointSet::default(),
            store: PathStore::new(),
            tracker: StrokeTracker::new(),
            phase: Phase::Uninitialized,
            solved: false,
            dirty: false,
            revision: 0,
            pending_save: None,
            status: Status::new("Loading board...", Severity::Info),
        })
    }
}

/// Orchestrates one play session on one board
pub struct GameController<G> {
    geometry: G,
    context: SessionContext,
    board: BoardConfig,
    points: PointSet,
    store: PathStore,
    tracker: StrokeTracker,
    phase: Phase,
    solved: bool,
    dirty: bool,
    /// Bumped on every unsaved change
    revision: u64,
    /// Revision captured when the in-flight save started
    pending_save: Option<u64>,
    status: Status,
}

impl<G: GridGeometry> GameController<G> {
    pub fn builder() -> GameControllerBuilder<G> {
        GameControllerBuilder {
            geometry: None,
            context: None,
        }
    }

    // ==================== Session ====================

    /// Replace all board state with a freshly fetched session
    pub fn load_session(&mut self, session: SessionData) -> Result<(), EngineError> {
        session.board.validate()?;

        self.tracker.cancel();
        self.context.session_id = Some(session.session_id);
        self.geometry.set_dimensions(session.board.cols, session.board.rows);
        self.points = PointSet::new(session.points);
        self.store = session.paths.into_iter().map(Path::from).collect();

        for path in self.store.iter() {
            if let Err(e) = validate_path(&session.board, &self.points, path) {
                warn!(color = %path.color, error = %e, "loaded path does not validate");
            }
        }

        self.board = session.board;
        self.solved = session.is_solved;
        self.dirty = false;
        self.pending_save = None;
        self.phase = Phase::Ready;
        self.status = if self.solved {
            Status::new("Board is already solved!", Severity::Success)
        } else {
            Status::new("Draw paths to connect the dots!", Severity::Info)
        };

        info!(
            board = %self.context.board_id,
            rows = self.board.rows,
            cols = self.board.cols,
            paths = self.store.size(),
            solved = self.solved,
            "session loaded"
        );
        Ok(())
    }

    /// Fetch the session from `backend` and load it
    pub fn load(&mut self, backend: &dyn SessionBackend) -> PersistenceResult<()> {
        let result = backend
            .fetch_session(&self.context)
            .and_then(|session| {
                self.load_session(session)
                    .map_err(|e| PersistenceError::InvalidResponse(e.to_string()))
            });

        if let Err(e) = &result {
            self.fail_load(e);
        }
        result
    }

    /// Report a session fetch that failed outside the controller
    pub fn fail_load(&mut self, error: &PersistenceError) {
        warn!(board = %self.context.board_id, %error, "failed to load session");
        self.status = Status::new(format!("Error loading board: {error}"), Severity::Error);
    }

    // ==================== Pointer input ====================

    pub fn pointer_down(&mut self, sample: PointerSample) -> bool {
        match self.geometry.cell_from_sample(sample) {
            Some(cell) => self.pointer_down_cell(cell),
            None => false,
        }
    }

    pub fn pointer_move(&mut self, sample: PointerSample) -> bool {
        if self.phase != Phase::Drawing {
            return false;
        }
        match self.geometry.cell_from_sample(sample) {
            Some(cell) => self.pointer_move_cell(cell),
            None => false,
        }
    }

    /// Start a stroke on `cell`. Returns true when a stroke began.
    pub fn pointer_down_cell(&mut self, cell: Cell) -> bool {
        if self.phase == Phase::Uninitialized || self.solved {
            return false;
        }
        if let Some(color) = self.tracker.cancel() {
            debug!(%color, "unfinished stroke dropped by new pointer-down");
        }

        match self.tracker.start(cell, &self.points, &mut self.store) {
            Some(change) => {
                if change.is_dirty() {
                    self.mark_dirty();
                }
                self.phase = Phase::Drawing;
                true
            }
            None => {
                self.phase = Phase::Ready;
                false
            }
        }
    }

    /// Extend the stroke toward `cell`. Returns true when anything changed.
    pub fn pointer_move_cell(&mut self, cell: Cell) -> bool {
        if self.phase != Phase::Drawing {
            return false;
        }
        let change = self.tracker.extend(cell, &self.points, &mut self.store);
        if change.is_dirty() {
            self.mark_dirty();
        }
        !change.is_noop()
    }

    /// Release the pointer, committing or discarding the stroke
    pub fn pointer_up(&mut self) -> Option<StrokeFinish> {
        if self.phase != Phase::Drawing {
            return None;
        }
        self.phase = Phase::Ready;
        let finish = self.tracker.finish(&self.points, &mut self.store)?;
        if finish.dirty {
            self.mark_dirty();
        }
        Some(finish)
    }

    // ==================== Board actions ====================

    /// Run the solution check and fold the verdict into the solved flag
    #[instrument(skip_all, fields(board = %self.context.board_id))]
    pub fn check(&mut self) -> Verdict {
        let verdict = check_solution(&self.board, &self.points, &self.store);

        if verdict.solved != self.solved {
            self.solved = verdict.solved;
            self.mark_dirty();
            if self.solved {
                self.tracker.cancel();
                if self.phase == Phase::Drawing {
                    self.phase = Phase::Ready;
                }
            }
        }

        info!(solved = verdict.solved, message = %verdict.message, "solution checked");
        self.status = Status::from(&verdict);
        verdict
    }

    /// Clear every path and the solved flag
    pub fn reset(&mut self) {
        self.tracker.cancel();
        self.store.clear();
        self.solved = false;
        self.mark_dirty();
        if self.phase == Phase::Drawing {
            self.phase = Phase::Ready;
        }
        self.status = Status::new("Board reset. Draw new paths!", Severity::Info);
        info!(board = %self.context.board_id, "board reset");
    }

    // ==================== Saving ====================

    /// First half of a save: snapshot the paths and mark the save in flight.
    ///
    /// Returns `None` (with an explanatory status) when there is nothing to
    /// send or a save is already running.
    pub fn begin_save(&mut self) -> Option<SaveRequest> {
        if self.pending_save.is_some() {
            return None;
        }
        if self.context.session_id.is_none() {
            self.status = Status::new("Session ID not found. Cannot save.", Severity::Error);
            return None;
        }
        if !self.dirty {
            self.status = Status::new("No changes to save.", Severity::Info);
            return None;
        }

        self.pending_save = Some(self.revision);
        self.status = Status::new("Saving...", Severity::Info);
        Some(SaveRequest {
            paths: self.store.snapshot().into_iter().map(SavedPath::from).collect(),
        })
    }

    /// Second half of a save: apply the collaborator's answer.
    ///
    /// The response's solved flag overrides whatever `check` concluded. On
    /// failure local state is untouched so the user can retry.
    pub fn complete_save(&mut self, result: PersistenceResult<SaveResponse>) -> bool {
        let Some(revision) = self.pending_save.take() else {
            warn!("save completion without a save in flight");
            return false;
        };

        match result {
            Ok(response) => {
                // Edits made while the request was in flight stay unsaved
                if self.revision == revision {
                    self.dirty = false;
                }
                self.solved = response.is_solved;
                if self.solved {
                    self.tracker.cancel();
                    if self.phase == Phase::Drawing {
                        self.phase = Phase::Ready;
                    }
                }
                let (suffix, severity) = if self.solved {
                    ("Board is solved!", Severity::Success)
                } else {
                    ("Progress saved.", Severity::Info)
                };
                self.status = Status::new(format!("{} {suffix}", response.message), severity);
                info!(
                    board = %self.context.board_id,
                    solved = self.solved,
                    paths = response.paths_count,
                    "paths saved"
                );
                true
            }
            Err(e) => {
                warn!(board = %self.context.board_id, error = %e, "save failed");
                self.status = Status::new(format!("Error saving paths: {e}"), Severity::Error);
                false
            }
        }
    }

    /// Save through a synchronous backend
    #[instrument(skip_all, fields(board = %self.context.board_id, backend = backend.backend_name()))]
    pub fn save(&mut self, backend: &dyn SessionBackend) -> bool {
        let Some(request) = self.begin_save() else {
            return false;
        };
        let result = backend.save_paths(&self.context, &request);
        self.complete_save(result)
    }

    // ==================== Accessors ====================

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_solved(&self) -> bool {
        self.solved
    }

    /// Unsaved changes exist; hosts use this to guard leaving the page
    pub fn has_unsaved_changes(&self) -> bool {
        self.dirty
    }

    pub fn is_saving(&self) -> bool {
        self.pending_save.is_some()
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn controls(&self) -> Controls {
        let ready = self.phase != Phase::Uninitialized;
        Controls {
            drawing: ready && !self.solved,
            check: ready && !self.solved && !self.store.is_empty(),
            save: ready && self.dirty && self.pending_save.is_none(),
            reset: ready && (!self.store.is_empty() || self.dirty),
            unsaved: self.dirty,
        }
    }

    pub fn board(&self) -> &BoardConfig {
        &self.board
    }

    pub fn points(&self) -> &PointSet {
        &self.points
    }

    pub fn store(&self) -> &PathStore {
        &self.store
    }

    /// Committed paths ordered by color
    pub fn paths(&self) -> Vec<Path> {
        self.store.snapshot()
    }

    pub fn active_stroke(&self) -> Option<StrokePreview<'_>> {
        let color = self.tracker.active_color()?;
        Some(StrokePreview {
            color,
            cells: self.tracker.segments(),
        })
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    pub fn geometry(&self) -> &G {
        &self.geometry
    }

    /// Layout changes only; never touches paths
    pub fn geometry_mut(&mut self) -> &mut G {
        &mut self.geometry
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
        self.revision += 1;
    }
}
