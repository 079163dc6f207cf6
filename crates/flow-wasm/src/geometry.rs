use flow_core::{Cell, CellGrid, GridGeometry, PointerSample, DEFAULT_CELL_SIZE};
use web_sys::Element;

/// Grid geometry over the board element's on-screen rectangle.
///
/// The rectangle is read on every lookup so scrolling and relayout never
/// leave the mapping stale.
pub struct DomGeometry {
    element: Element,
    cell_size: f64,
    cols: u32,
    rows: u32,
}

impl DomGeometry {
    pub fn new(element: Element) -> Self {
        Self {
            element,
            cell_size: DEFAULT_CELL_SIZE,
            cols: 0,
            rows: 0,
        }
    }

    pub fn element(&self) -> &Element {
        &self.element
    }

    pub fn set_cell_size(&mut self, cell_size: f64) {
        self.cell_size = cell_size;
    }

    /// Space the board may grow into: the parent's client area, or the
    /// element's own when it has no parent
    pub fn available_size(&self) -> (f64, f64) {
        let container = self.element.parent_element().unwrap_or_else(|| self.element.clone());
        (container.client_width() as f64, container.client_height() as f64)
    }
}

impl GridGeometry for DomGeometry {
    fn cell_from_sample(&self, sample: PointerSample) -> Option<Cell> {
        let rect = self.element.get_bounding_client_rect();
        CellGrid::square(self.cell_size, self.cols, self.rows)
            .with_origin(rect.left(), rect.top())
            .cell_from_sample(sample)
    }

    fn cell_size(&self) -> f64 {
        self.cell_size
    }

    fn dimensions(&self) -> (u32, u32) {
        (self.cols, self.rows)
    }

    fn set_dimensions(&mut self, cols: u32, rows: u32) {
        self.cols = cols;
        self.rows = rows;
    }
}
