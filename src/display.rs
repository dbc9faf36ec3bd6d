use std::io;
use tui::backend::CrosstermBackend;
use tui::layout::{Constraint, Direction, Layout, Rect};
use tui::style::{Color, Style};
use tui::symbols::Marker;
use tui::widgets::canvas::{Canvas, Points};
use tui::widgets::{Block, Borders, Paragraph};
use tui::Terminal;

use crate::framebuffer::{Framebuffer, Resolution};

/// Display is used by the environment to put the framebuffer on a screen. It
/// should abstract the implementation details, so a variety of kinds of
/// screen would work.
pub trait Display {
    /// draw the whole framebuffer, plus an optional line of debug text
    fn draw(&mut self, screen: &Framebuffer, status: Option<&str>) -> Result<(), io::Error>;
}

fn x_bounds(res: Resolution) -> [f64; 2] {
    [0.0, (res.width() - 1) as f64]
}

// the canvas y axis points up, chip8's points down
fn y_bounds(res: Resolution) -> [f64; 2] {
    [-1.0 * (res.height() - 1) as f64, 0.0]
}

/// expand lit pixels into x, y float coords, suitable for rendering with TUI
fn lit_points(screen: &Framebuffer) -> Vec<(f64, f64)> {
    screen
        .rows()
        .enumerate()
        .flat_map(|(y, row)| {
            row.iter()
                .enumerate()
                .filter(|(_, lit)| **lit)
                .map(move |(x, _)| (x as f64, -1.0 * y as f64))
        })
        .collect()
}

/// one terminal cell per pixel up to 64 wide; braille beyond that so
/// 128x64 fits in an ordinary terminal
fn marker_for(res: Resolution) -> Marker {
    if res.width() > 64 {
        Marker::Braille
    } else {
        Marker::Block
    }
}

/// terminal cells needed for the canvas, including its border
fn canvas_size(res: Resolution) -> (u16, u16) {
    match marker_for(res) {
        Marker::Braille => (2 + res.width() as u16 / 2, 2 + res.height() as u16 / 4),
        _ => (2 + res.width() as u16, 2 + res.height() as u16),
    }
}

/// monochrome display in a terminal, rendered using TUI and crossterm
pub struct MonoTermDisplay {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    last_resolution: Option<Resolution>,
}

impl MonoTermDisplay {
    pub fn new() -> Result<MonoTermDisplay, io::Error> {
        let backend = CrosstermBackend::new(io::stdout());
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;
        terminal.hide_cursor()?;
        Ok(MonoTermDisplay {
            terminal,
            last_resolution: None,
        })
    }
}

impl Display for MonoTermDisplay {
    fn draw(&mut self, screen: &Framebuffer, status: Option<&str>) -> Result<(), io::Error> {
        let res = screen.resolution();
        // a mode switch changes the canvas size; don't leave the old one behind
        if self.last_resolution != Some(res) {
            self.terminal.clear()?;
            self.last_resolution = Some(res);
        }
        let coords = lit_points(screen);
        let (w, h) = canvas_size(res);

        self.terminal.draw(|f| {
            let area = Rect::new(0, 0, w, h + if status.is_some() { 1 } else { 0 })
                .intersection(f.size());
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(h), Constraint::Min(0)].as_ref())
                .split(area);

            let canvas = Canvas::default()
                .block(
                    Block::default()
                        .title("CHIP-8")
                        .borders(Borders::ALL)
                        .style(Style::default().bg(Color::Black)),
                )
                .x_bounds(x_bounds(res))
                .y_bounds(y_bounds(res))
                .marker(marker_for(res))
                .paint(|ctx| {
                    ctx.draw(&Points {
                        coords: &coords,
                        color: Color::White,
                    });
                });
            f.render_widget(canvas, chunks[0]);

            if let Some(text) = status {
                f.render_widget(Paragraph::new(text.to_string()), chunks[1]);
            }
        })?;
        Ok(())
    }
}

impl Drop for MonoTermDisplay {
    fn drop(&mut self) {
        let _ = self.terminal.show_cursor();
    }
}

/// useful for testing non-display routines; counts frames
#[derive(Debug, Default)]
pub struct DummyDisplay {
    pub frames: usize,
    pub last_status: Option<String>,
}

impl DummyDisplay {
    pub fn new() -> DummyDisplay {
        DummyDisplay::default()
    }
}

impl Display for DummyDisplay {
    fn draw(&mut self, _screen: &Framebuffer, status: Option<&str>) -> Result<(), io::Error> {
        self.frames += 1;
        self.last_status = status.map(str::to_string);
        Ok(())
    }
}
