use crate::store::LocalSessionStore;
use crate::theme::Theme;
use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use flow_core::{CellGrid, GameController, GridGeometry, PointerSample, ResizeDebouncer, SessionContext};
use std::io;
use tracing::info;

/// Terminal columns per board cell
pub const CELL_WIDTH: u16 = 4;
/// Terminal rows per board cell
pub const CELL_HEIGHT: u16 = 2;
/// Rows reserved above the board for the title and status line
pub const HEADER_ROWS: u16 = 4;

/// Ticks a transient message stays visible
const MESSAGE_TICKS: u32 = 30;

/// Result of handling a key press
pub enum AppAction {
    Continue,
    Quit,
}

/// Actions that need a second key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirm {
    Reset,
    Quit,
}

/// The main application state
pub struct App {
    pub game: GameController<CellGrid>,
    store: LocalSessionStore,
    pub theme: Theme,
    /// Transient message shown over the status line
    pub message: Option<String>,
    message_timer: u32,
    /// Action waiting for confirmation
    pub confirm: Option<Confirm>,
    relayout: ResizeDebouncer,
    term_size: (u16, u16),
}

impl App {
    pub fn new(store: LocalSessionStore, term_size: (u16, u16)) -> io::Result<Self> {
        let geometry = CellGrid::new(CELL_WIDTH as f64, CELL_HEIGHT as f64, 1, 1);
        let game = GameController::builder()
            .geometry(geometry)
            .context(SessionContext::new(store.board_id()))
            .build()
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

        let mut app = Self {
            game,
            store,
            theme: Theme::dark(),
            message: None,
            message_timer: 0,
            confirm: None,
            relayout: ResizeDebouncer::default(),
            term_size,
        };
        // A failed load leaves an error status on screen
        let _ = app.game.load(&app.store);
        app.layout();
        Ok(app)
    }

    pub fn show_message(&mut self, msg: &str) {
        self.message = Some(msg.to_string());
        self.message_timer = MESSAGE_TICKS;
    }

    /// Expire messages and run a pending relayout
    pub fn tick(&mut self, now_ms: f64) {
        if self.message_timer > 0 {
            self.message_timer -= 1;
            if self.message_timer == 0 {
                self.message = None;
            }
        }
        if self.relayout.poll(now_ms) {
            self.layout();
        }
    }

    pub fn on_resize(&mut self, width: u16, height: u16, now_ms: f64) {
        self.term_size = (width, height);
        self.relayout.request(now_ms);
    }

    pub fn term_size(&self) -> (u16, u16) {
        self.term_size
    }

    /// Top-left terminal cell of the board
    pub fn board_origin(&self) -> (u16, u16) {
        let (x, y) = self.game.geometry().origin();
        (x as u16, y as u16)
    }

    /// Center the board in the terminal. Paths are left alone.
    fn layout(&mut self) {
        let (cols, rows) = self.game.geometry().dimensions();
        let board_width = u16::try_from(cols).unwrap_or(u16::MAX).saturating_mul(CELL_WIDTH);
        let board_height = u16::try_from(rows).unwrap_or(u16::MAX).saturating_mul(CELL_HEIGHT);
        let (term_width, term_height) = self.term_size;

        let left = term_width.saturating_sub(board_width) / 2;
        let top = (term_height.saturating_sub(board_height.saturating_add(HEADER_ROWS + 4)) / 2).max(HEADER_ROWS);
        self.game.geometry_mut().set_origin(left as f64, top as f64);
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        let sample = PointerSample::new(mouse.column as f64, mouse.row as f64);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.confirm = None;
                self.game.pointer_down(sample);
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                self.game.pointer_move(sample);
            }
            MouseEventKind::Up(MouseButton::Left) => {
                self.game.pointer_up();
            }
            _ => {}
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> AppAction {
        let pending = self.confirm.take();

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                if !self.game.has_unsaved_changes() || pending == Some(Confirm::Quit) {
                    info!("quitting");
                    return AppAction::Quit;
                }
                self.confirm = Some(Confirm::Quit);
                self.show_message("Unsaved changes! Press q again to quit, s to save");
            }
            KeyCode::Char('c') => {
                if self.game.controls().check {
                    self.game.check();
                } else if self.game.is_solved() {
                    self.show_message("Board is already solved!");
                } else {
                    self.show_message("Draw a path first");
                }
            }
            KeyCode::Char('s') => {
                self.message = None;
                self.game.save(&self.store);
            }
            KeyCode::Char('r') => {
                if !self.game.controls().reset {
                    self.show_message("Nothing to reset");
                } else if pending == Some(Confirm::Reset) {
                    self.message = None;
                    self.game.reset();
                } else {
                    self.confirm = Some(Confirm::Reset);
                    self.show_message("Press r again to clear all paths");
                }
            }
            _ => {}
        }

        AppAction::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::tests::{demo_solution, temp_dir};
    use crate::store::BoardFile;
    use crossterm::event::KeyModifiers;
    use flow_core::{Cell, Color, Path};

    fn key(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    fn app(name: &str) -> App {
        let store = LocalSessionStore::new(Some(temp_dir(name)), BoardFile::demo());
        App::new(store, (80, 30)).unwrap()
    }

    /// Terminal position inside board cell `(x, y)`
    fn at(app: &App, x: i32, y: i32) -> (u16, u16) {
        let (left, top) = app.board_origin();
        (
            left + (x as u16 - 1) * CELL_WIDTH + 1,
            top + (y as u16 - 1) * CELL_HEIGHT,
        )
    }

    fn drag(app: &mut App, cells: &[(i32, i32)]) {
        for (i, &(x, y)) in cells.iter().enumerate() {
            let (column, row) = at(app, x, y);
            let kind = if i == 0 {
                MouseEventKind::Down(MouseButton::Left)
            } else {
                MouseEventKind::Drag(MouseButton::Left)
            };
            app.handle_mouse(mouse(kind, column, row));
        }
        app.handle_mouse(mouse(MouseEventKind::Up(MouseButton::Left), 0, 0));
    }

    fn solve(app: &mut App) {
        for path in demo_solution() {
            let cells: Vec<(i32, i32)> = path.path_data.iter().map(|c| (c.x, c.y)).collect();
            drag(app, &cells);
        }
    }

    #[test]
    fn test_layout_centers_board() {
        let app = app("layout");
        assert_eq!(app.game.geometry().dimensions(), (5, 5));
        assert_eq!(app.board_origin(), (30, 6));
    }

    #[test]
    fn test_mouse_drag_draws_path() {
        let mut app = app("drag");
        drag(&mut app, &[(5, 2), (5, 3), (5, 4), (5, 5), (4, 5)]);
        let orange = app.game.store().get(&Color::from("#fb8c00")).unwrap();
        assert_eq!(orange.len(), 5);
        assert!(app.game.has_unsaved_changes());
    }

    #[test]
    fn test_solve_check_and_save() {
        let mut app = app("solve");
        solve(&mut app);
        app.handle_key(key('c'));
        assert!(app.game.is_solved());

        app.handle_key(key('s'));
        assert!(!app.game.has_unsaved_changes());
        assert_eq!(
            app.game.status().message,
            "Paths saved successfully. Board is solved!"
        );
        assert!(matches!(app.handle_key(key('q')), AppAction::Quit));
    }

    #[test]
    fn test_reset_needs_confirmation() {
        let mut app = app("reset");
        drag(&mut app, &[(5, 2), (5, 3), (5, 4), (5, 5), (4, 5)]);

        app.handle_key(key('r'));
        assert_eq!(app.confirm, Some(Confirm::Reset));
        assert_eq!(app.game.store().size(), 1);

        app.handle_key(key('r'));
        assert!(app.game.store().is_empty());
        assert_eq!(app.game.status().message, "Board reset. Draw new paths!");
    }

    #[test]
    fn test_other_key_cancels_confirmation() {
        let mut app = app("cancel");
        drag(&mut app, &[(5, 2), (5, 3), (5, 4), (5, 5), (4, 5)]);
        app.handle_key(key('r'));
        app.handle_key(key('x'));
        app.handle_key(key('r'));
        assert_eq!(app.game.store().size(), 1);
    }

    #[test]
    fn test_quit_with_unsaved_changes_asks_first() {
        let mut app = app("quit");
        drag(&mut app, &[(5, 2), (5, 3), (5, 4), (5, 5), (4, 5)]);
        assert!(matches!(app.handle_key(key('q')), AppAction::Continue));
        assert_eq!(app.confirm, Some(Confirm::Quit));
        assert!(matches!(app.handle_key(key('q')), AppAction::Quit));
    }

    #[test]
    fn test_saved_progress_is_restored() {
        let dir = temp_dir("restore");
        let store = LocalSessionStore::new(Some(dir.clone()), BoardFile::demo());
        let mut first = App::new(store, (80, 30)).unwrap();
        drag(&mut first, &[(5, 2), (5, 3), (5, 4), (5, 5), (4, 5)]);
        first.handle_key(key('s'));

        let store = LocalSessionStore::new(Some(dir), BoardFile::demo());
        let second = App::new(store, (80, 30)).unwrap();
        let expected = Path::new(
            Color::from("#fb8c00"),
            vec![
                Cell::new(5, 2),
                Cell::new(5, 3),
                Cell::new(5, 4),
                Cell::new(5, 5),
                Cell::new(4, 5),
            ],
        );
        assert_eq!(second.game.paths(), vec![expected]);
        assert!(!second.game.has_unsaved_changes());
    }

    #[test]
    fn test_resize_is_debounced() {
        let mut app = app("resize");
        app.on_resize(120, 40, 0.0);
        assert_eq!(app.board_origin(), (30, 6));
        app.tick(100.0);
        assert_eq!(app.board_origin(), (30, 6));
        app.tick(300.0);
        assert_eq!(app.board_origin(), (50, 11));
    }
}
