//! WebAssembly binding of the flow puzzle engine
//!
//! The page owns rendering and networking. This crate adapts DOM pointer
//! events into engine calls and hands JavaScript plain objects to draw and
//! send. A typical host:
//!
//! ```js
//! const game = new FlowGame(boardId, "board");
//! game.load_session(await (await fetch(sessionUrl)).json());
//! board.addEventListener("mousedown", (e) => game.pointer_down(e) && draw());
//! saveButton.onclick = async () => {
//!     const body = game.begin_save();
//!     if (body === undefined) return;
//!     try {
//!         const res = await fetch(saveUrl(game.session_id()), { method: "POST", body });
//!         res.ok ? game.complete_save(await res.json()) : game.fail_save(await res.text());
//!     } catch (err) {
//!         game.fail_save(String(err));
//!     }
//!     draw();
//! };
//! ```

use flow_core::{
    fit_cell_size, GameController, GridGeometry, PersistenceError, ResizeDebouncer, SaveResponse, SessionContext,
    SessionData,
};
use serde::Serialize;
use wasm_bindgen::prelude::*;
use web_sys::{Element, Event, HtmlElement};

mod geometry;
mod pointer;


pub use geometry::DomGeometry;
pub use pointer::sample_from_event;

// Initialize panic hook for better error messages
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

#[derive(Serialize)]
struct StrokeView<'a> {
    color: &'a flow_core::Color,
    cells: &'a [flow_core::Cell],
}

fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(JsValue::from)
}

fn log_warning(message: &str) {
    web_sys::console::warn_1(&JsValue::from_str(message));
}

/// The main WASM game controller
#[wasm_bindgen]
pub struct FlowGame {
    game: GameController<DomGeometry>,
    relayout: ResizeDebouncer,
}

#[wasm_bindgen]
impl FlowGame {
    /// Attach to the board element with id `element_id`
    #[wasm_bindgen(constructor)]
    pub fn new(board_id: &str, element_id: &str) -> Result<FlowGame, JsValue> {
        let document = web_sys::window()
            .ok_or("No window")?
            .document()
            .ok_or("No document")?;

        let element = document
            .get_element_by_id(element_id)
            .ok_or("Board element not found")?;

        let game = GameController::builder()
            .geometry(DomGeometry::new(element))
            .context(SessionContext::new(board_id))
            .build()
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        Ok(FlowGame {
            game,
            relayout: ResizeDebouncer::default(),
        })
    }

    // ==================== Session ====================

    /// Load the parsed session JSON returned by the server
    #[wasm_bindgen]
    pub fn load_session(&mut self, session: JsValue) -> Result<(), JsValue> {
        let session: SessionData = match serde_wasm_bindgen::from_value(session) {
            Ok(session) => session,
            Err(e) => {
                let error = PersistenceError::InvalidResponse(e.to_string());
                self.game.fail_load(&error);
                log_warning(&error.to_string());
                return Err(JsValue::from_str(&error.to_string()));
            }
        };

        if let Err(e) = self.game.load_session(session) {
            let error = PersistenceError::InvalidResponse(e.to_string());
            self.game.fail_load(&error);
            log_warning(&error.to_string());
            return Err(JsValue::from_str(&error.to_string()));
        }

        self.apply_layout();
        Ok(())
    }

    /// The session fetch failed before producing a session
    #[wasm_bindgen]
    pub fn fail_load(&mut self, message: &str) {
        log_warning(message);
        self.game.fail_load(&PersistenceError::Network(message.to_string()));
    }

    /// Server session id; `undefined` until a session is loaded
    #[wasm_bindgen]
    pub fn session_id(&self) -> Option<f64> {
        self.game.context().session_id.map(|id| id.0 as f64)
    }

    // ==================== Pointer input ====================

    /// mousedown / touchstart
    #[wasm_bindgen]
    pub fn pointer_down(&mut self, event: &Event) -> bool {
        let started = sample_from_event(event).is_some_and(|sample| self.game.pointer_down(sample));
        if started {
            // Keep touch drags from scrolling the page
            event.prevent_default();
        }
        started
    }

    /// mousemove / touchmove
    #[wasm_bindgen]
    pub fn pointer_move(&mut self, event: &Event) -> bool {
        if self.game.active_stroke().is_none() {
            return false;
        }
        event.prevent_default();
        sample_from_event(event).is_some_and(|sample| self.game.pointer_move(sample))
    }

    /// mouseup / mouseleave / touchend / touchcancel.
    /// Returns true when a path was committed.
    #[wasm_bindgen]
    pub fn pointer_up(&mut self) -> bool {
        self.game.pointer_up().is_some_and(|finish| finish.committed)
    }

    // ==================== Board actions ====================

    /// Run the solution check; returns `{solved, message, severity}`
    #[wasm_bindgen]
    pub fn check(&mut self) -> Result<JsValue, JsValue> {
        let verdict = self.game.check();
        to_js(&verdict)
    }

    #[wasm_bindgen]
    pub fn reset(&mut self) {
        self.game.reset();
    }

    // ==================== Saving ====================

    /// JSON request body for the save call, or `undefined` when there is
    /// nothing to save
    #[wasm_bindgen]
    pub fn begin_save(&mut self) -> Option<String> {
        let request = self.game.begin_save()?;
        match serde_json::to_string(&request) {
            Ok(body) => Some(body),
            Err(e) => {
                self.game.complete_save(Err(PersistenceError::InvalidResponse(e.to_string())));
                None
            }
        }
    }

    /// Feed the parsed save response
    #[wasm_bindgen]
    pub fn complete_save(&mut self, response: JsValue) -> bool {
        let result = serde_wasm_bindgen::from_value::<SaveResponse>(response)
            .map_err(|e| PersistenceError::InvalidResponse(e.to_string()));
        if let Err(e) = &result {
            log_warning(&e.to_string());
        }
        self.game.complete_save(result)
    }

    /// The save request failed; local paths stay as they are
    #[wasm_bindgen]
    pub fn fail_save(&mut self, message: &str) {
        log_warning(message);
        self.game
            .complete_save(Err(PersistenceError::Server(message.to_string())));
    }

    // ==================== State for rendering ====================

    /// Committed paths: `[{color, segments: [{x, y}]}]`
    #[wasm_bindgen]
    pub fn paths(&self) -> Result<JsValue, JsValue> {
        to_js(&self.game.paths())
    }

    /// Points: `[{id, x, y, color}]`
    #[wasm_bindgen]
    pub fn points(&self) -> Result<JsValue, JsValue> {
        let points: Vec<_> = self.game.points().iter().collect();
        to_js(&points)
    }

    /// Stroke in progress as `{color, cells}`, or `undefined`
    #[wasm_bindgen]
    pub fn active_stroke(&self) -> Result<JsValue, JsValue> {
        match self.game.active_stroke() {
            Some(stroke) => to_js(&StrokeView {
                color: stroke.color,
                cells: stroke.cells,
            }),
            None => Ok(JsValue::UNDEFINED),
        }
    }

    /// `{drawing, check, save, reset, unsaved}`
    #[wasm_bindgen]
    pub fn controls(&self) -> Result<JsValue, JsValue> {
        to_js(&self.game.controls())
    }

    #[wasm_bindgen]
    pub fn status_message(&self) -> String {
        self.game.status().message.clone()
    }

    /// `info`, `warning`, `success` or `error`
    #[wasm_bindgen]
    pub fn status_severity(&self) -> String {
        self.game.status().severity.to_string()
    }

    #[wasm_bindgen]
    pub fn is_solved(&self) -> bool {
        self.game.is_solved()
    }

    /// For a `beforeunload` guard
    #[wasm_bindgen]
    pub fn has_unsaved_changes(&self) -> bool {
        self.game.has_unsaved_changes()
    }

    #[wasm_bindgen]
    pub fn rows(&self) -> u32 {
        self.game.board().rows
    }

    #[wasm_bindgen]
    pub fn cols(&self) -> u32 {
        self.game.board().cols
    }

    #[wasm_bindgen]
    pub fn cell_size(&self) -> f64 {
        self.game.geometry().cell_size()
    }

    // ==================== Layout ====================

    /// Window resized; the relayout runs once things settle
    #[wasm_bindgen]
    pub fn request_relayout(&mut self, now_ms: f64) {
        self.relayout.request(now_ms);
    }

    /// Call from a timer or animation frame. Returns true when the cell
    /// size was recomputed and the board should be redrawn.
    #[wasm_bindgen]
    pub fn poll_relayout(&mut self, now_ms: f64) -> bool {
        if !self.relayout.poll(now_ms) {
            return false;
        }
        self.apply_layout();
        true
    }
}

impl FlowGame {
    /// Fit the cell size to the container and publish it as `--cell-size`
    fn apply_layout(&mut self) {
        let geometry = self.game.geometry_mut();
        let (width, height) = geometry.available_size();
        let (cols, rows) = geometry.dimensions();
        let cell_size = fit_cell_size(width, height, cols, rows);
        geometry.set_cell_size(cell_size);
        tracing::debug!(cell_size, cols, rows, "board relayout");

        let element: &Element = geometry.element();
        if let Some(html) = element.dyn_ref::<HtmlElement>() {
            let _ = html.style().set_property("--cell-size", &format!("{}px", cell_size));
        }
    }
}
