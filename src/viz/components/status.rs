use ratatui::{
    prelude::*,
    widgets::{
        block::{Position, Title},
        *,
    },
};

use crate::render::{Frame, Progress};

/// Bottom bar: the current episode while rendering, a progress gauge while training
pub struct StatusBar<'a> {
    pub frame: Option<&'a Frame>,
    pub progress: Option<&'a Progress>,
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .title("Status")
            .title(
                Title::from(" q: quit ")
                    .position(Position::Bottom)
                    .alignment(Alignment::Right),
            );

        if let Some(frame) = self.frame {
            Paragraph::new(Line::from(vec![
                Span::from(frame.algorithm.to_string()).light_cyan().bold(),
                Span::raw(format!(
                    "  episode {}  step {}  reward {:.2}",
                    frame.episode, frame.step, frame.reward
                )),
            ]))
            .block(block)
            .render(area, buf);
        } else if let Some(progress) = self.progress {
            Gauge::default()
                .block(block)
                .gauge_style(Color::Cyan)
                .ratio(progress_ratio(progress))
                .label(format!(
                    "{} iteration {}/{}  success {:.0}%",
                    progress.algorithm,
                    progress.iteration,
                    progress.iterations,
                    progress.summary.success_rate * 100.0
                ))
                .render(area, buf);
        } else {
            block.render(area, buf);
        }
    }
}

fn progress_ratio(progress: &Progress) -> f64 {
    (progress.iteration as f64 / progress.iterations.max(1) as f64).clamp(0.0, 1.0)
}
