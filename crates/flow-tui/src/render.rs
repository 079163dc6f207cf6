use crate::app::{App, CELL_HEIGHT, CELL_WIDTH};
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    execute,
    style::{Color, Print, SetBackgroundColor, SetForegroundColor},
    terminal::{Clear, ClearType},
};
use flow_core::{Cell, GridGeometry};
use std::io;

pub fn render(stdout: &mut io::Stdout, app: &App) -> io::Result<()> {
    let (term_width, _) = app.term_size();

    execute!(stdout, Hide, SetBackgroundColor(app.theme.bg), Clear(ClearType::All))?;

    let (left, top) = app.board_origin();
    render_header(stdout, app, term_width, top)?;
    render_board(stdout, app, left, top)?;

    let (_, rows) = app.game.geometry().dimensions();
    let below = top + rows as u16 * CELL_HEIGHT + 2;
    render_controls(stdout, app, left, below)?;

    execute!(stdout, Show)?;
    Ok(())
}

fn centered(text: &str, term_width: u16) -> u16 {
    term_width.saturating_sub(text.chars().count() as u16) / 2
}

fn render_header(stdout: &mut io::Stdout, app: &App, term_width: u16, board_top: u16) -> io::Result<()> {
    let theme = &app.theme;
    let board = app.game.board();

    let mut title = if board.name.is_empty() {
        "Flow".to_string()
    } else {
        format!("Flow: {}", board.name)
    };
    if app.game.controls().unsaved {
        title.push_str(" *");
    }
    let title_y = board_top.saturating_sub(3);
    execute!(
        stdout,
        MoveTo(centered(&title, term_width), title_y),
        SetForegroundColor(theme.title),
        Print(&title)
    )?;

    // Transient messages take the status line while they last
    let (text, color) = match &app.message {
        Some(msg) => (msg.clone(), theme.key),
        None => {
            let status = app.game.status();
            (status.message.clone(), theme.severity(status.severity))
        }
    };
    execute!(
        stdout,
        MoveTo(centered(&text, term_width), title_y + 1),
        SetForegroundColor(color),
        Print(&text)
    )?;

    Ok(())
}

fn render_board(stdout: &mut io::Stdout, app: &App, left: u16, top: u16) -> io::Result<()> {
    let theme = &app.theme;
    let game = &app.game;
    let (cols, rows) = game.geometry().dimensions();
    let stroke = game.active_stroke();

    // Frame
    let width = cols as u16 * CELL_WIDTH;
    let height = rows as u16 * CELL_HEIGHT;
    let horizontal = "─".repeat(width as usize);
    execute!(
        stdout,
        SetBackgroundColor(theme.bg),
        SetForegroundColor(theme.border),
        MoveTo(left.saturating_sub(1), top.saturating_sub(1)),
        Print(format!("┌{}┐", horizontal)),
        MoveTo(left.saturating_sub(1), top + height),
        Print(format!("└{}┘", horizontal))
    )?;
    for dy in 0..height {
        execute!(
            stdout,
            MoveTo(left.saturating_sub(1), top + dy),
            Print("│"),
            MoveTo(left + width, top + dy),
            Print("│")
        )?;
    }

    for y in 1..=rows as i32 {
        for x in 1..=cols as i32 {
            let cell = Cell::new(x, y);
            let base = if (x + y) % 2 == 0 { theme.cell_a } else { theme.cell_b };

            let in_stroke = stroke.filter(|s| s.cells.contains(&cell)).map(|s| theme.path_color(s.color));
            let committed = game.store().occupant_at(cell, None).map(|p| theme.committed(&p.color));
            let bg = in_stroke.or(committed).unwrap_or(base);

            let (glyph, fg) = match game.points().at(cell) {
                Some(point) => (" ██ ", theme.path_color(&point.color)),
                None => ("    ", theme.fg),
            };

            let cx = left + (x as u16 - 1) * CELL_WIDTH;
            let cy = top + (y as u16 - 1) * CELL_HEIGHT;
            execute!(
                stdout,
                SetBackgroundColor(bg),
                SetForegroundColor(fg),
                MoveTo(cx, cy),
                Print(glyph),
                MoveTo(cx, cy + 1),
                Print(blank_row(glyph))
            )?;
        }
    }

    execute!(stdout, SetBackgroundColor(theme.bg))?;
    Ok(())
}

/// Lower half of a cell; points stay two rows tall
fn blank_row(glyph: &str) -> &str {
    if glyph.trim().is_empty() {
        "    "
    } else {
        " ▀▀ "
    }
}

fn render_controls(stdout: &mut io::Stdout, app: &App, x: u16, y: u16) -> io::Result<()> {
    let theme = &app.theme;
    let controls = app.game.controls();

    let keys = [
        ("mouse", "Draw", controls.drawing),
        ("c", "Check", controls.check),
        ("s", "Save", controls.save),
        ("r", "Reset", controls.reset),
        ("q", "Quit", true),
    ];

    for (i, (key, desc, enabled)) in keys.iter().enumerate() {
        let (key_color, desc_color) = if *enabled {
            (theme.key, theme.info)
        } else {
            (theme.disabled, theme.disabled)
        };
        execute!(
            stdout,
            MoveTo(x.saturating_sub(4), y + i as u16),
            SetForegroundColor(key_color),
            Print(format!("{:>6}", key)),
            SetForegroundColor(desc_color),
            Print(format!(" {}", desc))
        )?;
    }

    execute!(stdout, SetForegroundColor(Color::Reset), SetBackgroundColor(Color::Reset))?;
    Ok(())
}
