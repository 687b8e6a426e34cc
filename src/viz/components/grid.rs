use ratatui::{
    prelude::*,
    symbols::Marker,
    widgets::{
        canvas::{Canvas, Line as Segment, Points},
        Block, BorderType,
    },
};

use crate::{gym::GridPosition, render::Frame};

/// Samples along one cell edge when filling a shape with points
const FILL_RESOLUTION: usize = 24;

/// Drone radius as a fraction of the cell size
const AGENT_RADIUS: f64 = 1.0 / 3.0;

/// The grid world of one [`Frame`]
///
/// Canvas coordinates are cell units with the y axis pointing up, so grid row `y` is
/// drawn at `size - y - 1` to keep row 0 at the top.
pub struct GridView<'a> {
    frame: &'a Frame,
}

impl<'a> GridView<'a> {
    pub fn new(frame: &'a Frame) -> Self {
        Self { frame }
    }
}

impl Widget for GridView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let n = self.frame.grid_size;
        let size = n as f64;
        let target = fill_square(cell_origin(self.frame.target, n));
        let (x, y) = cell_origin(self.frame.agent, n);
        let agent = fill_disc((x + 0.5, y + 0.5), AGENT_RADIUS);

        Canvas::default()
            .block(
                Block::bordered()
                    .border_type(BorderType::Rounded)
                    .title(format!(" {n}x{n} ")),
            )
            .marker(Marker::Braille)
            .x_bounds([0.0, size])
            .y_bounds([0.0, size])
            .paint(|ctx| {
                ctx.draw(&Points {
                    coords: &target,
                    color: Color::Red,
                });
                ctx.layer();
                ctx.draw(&Points {
                    coords: &agent,
                    color: Color::Blue,
                });
                ctx.layer();
                for i in 0..=n {
                    let v = i as f64;
                    ctx.draw(&Segment {
                        x1: 0.0,
                        y1: v,
                        x2: size,
                        y2: v,
                        color: Color::DarkGray,
                    });
                    ctx.draw(&Segment {
                        x1: v,
                        y1: 0.0,
                        x2: v,
                        y2: size,
                        color: Color::DarkGray,
                    });
                }
            })
            .render(area, buf);
    }
}

/// Bottom left corner of the cell at `pos` in canvas coordinates
fn cell_origin(pos: GridPosition, grid_size: usize) -> (f64, f64) {
    (pos.x as f64, (grid_size - pos.y - 1) as f64)
}

fn fill_square((x0, y0): (f64, f64)) -> Vec<(f64, f64)> {
    let step = 1.0 / FILL_RESOLUTION as f64;
    (0..=FILL_RESOLUTION)
        .flat_map(|i| {
            (0..=FILL_RESOLUTION).map(move |j| (x0 + i as f64 * step, y0 + j as f64 * step))
        })
        .collect()
}

fn fill_disc((cx, cy): (f64, f64), radius: f64) -> Vec<(f64, f64)> {
    fill_square((cx - 0.5, cy - 0.5))
        .into_iter()
        .filter(|(x, y)| (x - cx).powi(2) + (y - cy).powi(2) <= radius * radius)
        .collect()
}
