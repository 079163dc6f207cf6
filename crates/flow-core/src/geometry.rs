//! Pointer-to-cell mapping and layout helpers
//!
//! Hosts translate their native mouse or touch events into a [`PointerSample`]
//! before anything reaches the engine, so nothing below this module ever
//! branches on the kind of input device.

use crate::types::Cell;

/// Cell size used when the available space cannot be measured
pub const DEFAULT_CELL_SIZE: f64 = 30.0;
/// Smallest cell size a layout pass will choose
pub const MIN_CELL_SIZE: f64 = 10.0;
/// Delay between the last resize notification and the relayout
pub const RELAYOUT_DEBOUNCE_MS: f64 = 250.0;

/// A single pointer position in host coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    pub client_x: f64,
    pub client_y: f64,
}

impl PointerSample {
    pub fn new(client_x: f64, client_y: f64) -> Self {
        Self { client_x, client_y }
    }
}

/// Maps pointer samples onto board cells
pub trait GridGeometry {
    /// The cell under `sample`, or `None` outside the grid
    fn cell_from_sample(&self, sample: PointerSample) -> Option<Cell>;

    /// Current cell edge length in host units
    fn cell_size(&self) -> f64;

    /// `(cols, rows)`
    fn dimensions(&self) -> (u32, u32);

    /// Called when a session (re)load changes the board shape
    fn set_dimensions(&mut self, cols: u32, rows: u32);
}

/// Axis-aligned grid anchored at a host-space origin
#[derive(Debug, Clone, PartialEq)]
pub struct CellGrid {
    left: f64,
    top: f64,
    cell_width: f64,
    cell_height: f64,
    cols: u32,
    rows: u32,
}

impl CellGrid {
    /// Square cells
    pub fn square(cell_size: f64, cols: u32, rows: u32) -> Self {
        Self::new(cell_size, cell_size, cols, rows)
    }

    /// Rectangular cells, e.g. terminal character cells
    pub fn new(cell_width: f64, cell_height: f64, cols: u32, rows: u32) -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            cell_width,
            cell_height,
            cols,
            rows,
        }
    }

    pub fn with_origin(mut self, left: f64, top: f64) -> Self {
        self.set_origin(left, top);
        self
    }

    pub fn set_origin(&mut self, left: f64, top: f64) {
        self.left = left;
        self.top = top;
    }

    pub fn origin(&self) -> (f64, f64) {
        (self.left, self.top)
    }

    pub fn set_cell_size(&mut self, cell_width: f64, cell_height: f64) {
        self.cell_width = cell_width;
        self.cell_height = cell_height;
    }

    pub fn cell_height(&self) -> f64 {
        self.cell_height
    }

    /// Host-space extent of the whole grid
    pub fn board_size(&self) -> (f64, f64) {
        (
            self.cols as f64 * self.cell_width,
            self.rows as f64 * self.cell_height,
        )
    }

    /// Host-space center of `cell`, for drawing path polylines
    pub fn cell_center(&self, cell: Cell) -> (f64, f64) {
        (
            self.left + (cell.x as f64 - 0.5) * self.cell_width,
            self.top + (cell.y as f64 - 0.5) * self.cell_height,
        )
    }
}

impl GridGeometry for CellGrid {
    fn cell_from_sample(&self, sample: PointerSample) -> Option<Cell> {
        if self.cell_width <= 0.0 || self.cell_height <= 0.0 {
            return None;
        }
        let x = ((sample.client_x - self.left) / self.cell_width).floor();
        let y = ((sample.client_y - self.top) / self.cell_height).floor();
        if !x.is_finite() || !y.is_finite() || x < 0.0 || y < 0.0 {
            return None;
        }
        if x >= self.cols as f64 || y >= self.rows as f64 {
            return None;
        }
        Some(Cell::new(x as i32 + 1, y as i32 + 1))
    }

    fn cell_size(&self) -> f64 {
        self.cell_width
    }

    fn dimensions(&self) -> (u32, u32) {
        (self.cols, self.rows)
    }

    fn set_dimensions(&mut self, cols: u32, rows: u32) {
        self.cols = cols;
        self.rows = rows;
    }
}

/// Largest whole cell size that fits `cols x rows` into the available area.
///
/// Falls back to [`DEFAULT_CELL_SIZE`] when nothing sensible can be computed
/// (no rows or columns, non-positive or non-finite space).
pub fn fit_cell_size(available_width: f64, available_height: f64, cols: u32, rows: u32) -> f64 {
    let by_width = if cols > 0 {
        available_width / cols as f64
    } else {
        f64::INFINITY
    };
    let by_height = if rows > 0 {
        available_height / rows as f64
    } else {
        f64::INFINITY
    };
    let potential = by_width.min(by_height);

    if !potential.is_finite() || potential <= 0.0 {
        DEFAULT_CELL_SIZE
    } else {
        potential.floor().max(MIN_CELL_SIZE)
    }
}

/// Trailing-edge debounce for window resize notifications.
///
/// Timestamps are plain milliseconds so browser (`performance.now()`) and
/// native hosts can both drive it.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeDebouncer {
    delay_ms: f64,
    deadline: Option<f64>,
}

impl Default for ResizeDebouncer {
    fn default() -> Self {
        Self::new(RELAYOUT_DEBOUNCE_MS)
    }
}

impl ResizeDebouncer {
    pub fn new(delay_ms: f64) -> Self {
        Self {
            delay_ms,
            deadline: None,
        }
    }

    /// Record a resize; restarts the wait
    pub fn request(&mut self, now_ms: f64) {
        self.deadline = Some(now_ms + self.delay_ms);
    }

    /// True exactly once, when the wait has elapsed
    pub fn poll(&mut self, now_ms: f64) -> bool {
        match self.deadline {
            Some(deadline) if now_ms >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }
}
