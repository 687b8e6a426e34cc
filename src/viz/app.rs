use std::{
    io::{self, stdout, Stdout},
    panic,
    sync::Once,
};

use crossterm::{
    cursor, execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, prelude::*, widgets::*};

use super::{
    components::{GridView, Logs, StatusBar},
    util::quit_requested,
};
use crate::render::{Frame, FrameClock, Progress, Render, Signal};

/// Viewport height used when the viewer is drawn before being initialized
const DEFAULT_WINDOW_SIZE: u16 = 32;

type Tui = Terminal<CrosstermBackend<Stdout>>;

static RESTORE_ON_PANIC: Once = Once::new();

/// Take over the terminal: raw mode on the alternate screen, cursor hidden
///
/// The first call also chains a panic hook that hands the terminal back before the
/// panic message is printed.
fn open_terminal() -> io::Result<Tui> {
    RESTORE_ON_PANIC.call_once(|| {
        let print_panic = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            let _ = release_terminal();
            print_panic(info);
        }));
    });

    execute!(stdout(), EnterAlternateScreen, cursor::Hide)?;
    enable_raw_mode()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    terminal.clear()?;
    Ok(terminal)
}

fn release_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(stdout(), LeaveAlternateScreen, cursor::Show)
}

/// State shown on screen
#[derive(Default)]
struct View {
    window_size: u16,
    frame: Option<Frame>,
    progress: Option<Progress>,
}

impl Widget for &View {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let [main_area, status_area] =
            Layout::vertical([Constraint::Fill(1), Constraint::Length(3)]).areas(area);

        // Cells are about twice as tall as wide, so a square grid is twice as many columns
        let rows = self.window_size.min(main_area.height);
        let [grid_area, log_area] =
            Layout::horizontal([Constraint::Length(rows.saturating_mul(2)), Constraint::Fill(1)])
                .areas(main_area);
        let grid_area = Rect {
            height: rows,
            ..grid_area
        };

        match &self.frame {
            Some(frame) => GridView::new(frame).render(grid_area, buf),
            None => Paragraph::new("Training")
                .alignment(Alignment::Center)
                .block(Block::bordered().border_type(BorderType::Rounded))
                .render(grid_area, buf),
        }
        Logs.render(log_area, buf);
        StatusBar {
            frame: self.frame.as_ref(),
            progress: self.progress.as_ref(),
        }
        .render(status_area, buf);
    }
}

/// Terminal implementation of [`Render`]
///
/// The terminal is taken over on the first draw and handed back by [`Render::close`] or on
/// drop. Episode frames are throttled to the configured frame rate, training progress is
/// drawn as it comes.
pub struct Viewer {
    terminal: Option<Tui>,
    clock: FrameClock,
    view: View,
}

impl Viewer {
    pub fn new(fps: u32) -> Self {
        Self {
            terminal: None,
            clock: FrameClock::new(fps),
            view: View {
                window_size: DEFAULT_WINDOW_SIZE,
                ..Default::default()
            },
        }
    }

    pub fn is_open(&self) -> bool {
        self.terminal.is_some()
    }

    fn draw(&mut self) -> io::Result<Signal> {
        let Self { terminal, view, .. } = self;
        let terminal = match *terminal {
            Some(ref mut terminal) => terminal,
            None => terminal.insert(open_terminal()?),
        };

        tui_logger::move_events();
        terminal.draw(|f| f.render_widget(&*view, f.size()))?;

        if quit_requested()? {
            log::info!("Quit requested");
            Ok(Signal::Quit)
        } else {
            Ok(Signal::Continue)
        }
    }
}

impl Render for Viewer {
    fn initialize(&mut self, window_size: u16) -> io::Result<()> {
        self.view.window_size = window_size;
        if self.terminal.is_none() {
            self.terminal = Some(open_terminal()?);
        }
        Ok(())
    }

    fn draw_frame(&mut self, frame: &Frame) -> io::Result<Signal> {
        self.clock.tick();
        self.view.frame = Some(frame.clone());
        self.draw()
    }

    fn draw_progress(&mut self, progress: &Progress) -> io::Result<Signal> {
        self.view.frame = None;
        self.view.progress = Some(progress.clone());
        self.draw()
    }

    fn close(&mut self) -> io::Result<()> {
        if self.terminal.take().is_some() {
            release_terminal()?;
        }
        Ok(())
    }
}

impl Drop for Viewer {
    fn drop(&mut self) {
        let _ = self.close();
    }
}
