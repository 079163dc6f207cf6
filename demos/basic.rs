//! Basic example of driving the flow engine without a UI

use flow_core::{
    BoardConfig, Cell, CellGrid, GameController, GridGeometry, MemoryBackend, Point, PointerSample, SessionContext,
};

fn main() {
    // A 3x3 board with two color pairs
    let backend = MemoryBackend::new(
        BoardConfig::new(3, 3).with_name("Demo"),
        vec![
            Point::new(1, 1, 1, "red"),
            Point::new(2, 3, 1, "red"),
            Point::new(3, 1, 2, "blue"),
            Point::new(4, 1, 3, "blue"),
        ],
    );

    let mut game = match GameController::builder()
        .geometry(CellGrid::square(30.0, 3, 3))
        .context(SessionContext::new("demo"))
        .build()
    {
        Ok(game) => game,
        Err(e) => {
            eprintln!("Failed to set up the game: {}", e);
            return;
        }
    };

    if let Err(e) = game.load(&backend) {
        eprintln!("Failed to load the session: {}", e);
        return;
    }
    println!("{}", game.status().message);

    // Drag red across the top row using pixel coordinates
    let size = game.geometry().cell_size();
    let px = |x: i32, y: i32| PointerSample::new((x as f64 - 0.5) * size, (y as f64 - 0.5) * size);
    game.pointer_down(px(1, 1));
    game.pointer_move(px(2, 1));
    game.pointer_move(px(3, 1));
    game.pointer_up();

    // Check a half-finished board
    let verdict = game.check();
    println!("After red: {} ({})", verdict.message, verdict.severity);

    // Blue snakes through the rest, one diagonal jump included
    game.pointer_down_cell(Cell::new(1, 2));
    for cell in [Cell::new(2, 2), Cell::new(3, 3), Cell::new(2, 3), Cell::new(1, 3)] {
        game.pointer_move_cell(cell);
    }
    game.pointer_up();

    for path in game.paths() {
        let cells: Vec<String> = path.segments.iter().map(|c| c.to_string()).collect();
        println!("{:>5}: {}", path.color.as_str(), cells.join(" -> "));
    }

    let verdict = game.check();
    println!("After blue: {} ({})", verdict.message, verdict.severity);

    // Save through the in-memory backend
    game.save(&backend);
    println!("{}", game.status().message);
    println!("Unsaved changes: {}", game.has_unsaved_changes());
}
