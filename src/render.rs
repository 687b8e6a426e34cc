//! The visualization capability used by the driver
//!
//! Rendering is a side effect only. Nothing in the environment depends on it.

use std::{
    io, thread,
    time::{Duration, Instant},
};

use crate::{
    gym::GridPosition,
    policy::{Algorithm, LearnSummary},
};

/// Everything needed to draw one state of an episode
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub agent: GridPosition,
    pub target: GridPosition,
    pub grid_size: usize,
    pub algorithm: Algorithm,
    pub episode: u32,
    pub step: usize,
    /// Reward accumulated so far in the episode
    pub reward: f64,
}

/// Training progress after one learner finished an iteration
#[derive(Debug, Clone, PartialEq)]
pub struct Progress {
    pub algorithm: Algorithm,
    pub iteration: u32,
    pub iterations: u32,
    pub summary: LearnSummary,
}

/// Whether the caller should keep going after a draw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Continue,
    /// The user asked to stop
    Quit,
}

/// A surface rollouts are drawn on
pub trait Render {
    /// Open the output, `window_size` being the height of the grid viewport
    fn initialize(&mut self, window_size: u16) -> io::Result<()>;

    fn draw_frame(&mut self, frame: &Frame) -> io::Result<Signal>;

    fn draw_progress(&mut self, progress: &Progress) -> io::Result<Signal>;

    /// Release the output, a no-op if it was never opened
    fn close(&mut self) -> io::Result<()>;
}

/// Draws nothing and never asks to stop
#[derive(Debug, Default, Clone, Copy)]
pub struct Headless;

impl Render for Headless {
    fn initialize(&mut self, _window_size: u16) -> io::Result<()> {
        Ok(())
    }

    fn draw_frame(&mut self, _frame: &Frame) -> io::Result<Signal> {
        Ok(Signal::Continue)
    }

    fn draw_progress(&mut self, _progress: &Progress) -> io::Result<Signal> {
        Ok(Signal::Continue)
    }

    fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Caps the rate of a loop by sleeping off the rest of each period
#[derive(Debug, Clone)]
pub struct FrameClock {
    period: Duration,
    last: Option<Instant>,
}

impl FrameClock {
    /// A clock ticking at most `fps` times per second, `0` disables the cap
    pub fn new(fps: u32) -> Self {
        let period = match fps {
            0 => Duration::ZERO,
            fps => Duration::from_secs(1) / fps,
        };
        Self { period, last: None }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Time left in the current period at `now`
    pub fn remaining(&self, now: Instant) -> Duration {
        match self.last {
            Some(last) => self.period.saturating_sub(now.saturating_duration_since(last)),
            None => Duration::ZERO,
        }
    }

    /// Block until a period has passed since the previous tick
    pub fn tick(&mut self) {
        let delay = self.remaining(Instant::now());
        if !delay.is_zero() {
            thread::sleep(delay);
        }
        self.last = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_clock_period() {
        assert_eq!(FrameClock::new(4).period(), Duration::from_millis(250));
        assert_eq!(FrameClock::new(0).period(), Duration::ZERO, "Uncapped");
    }

    #[test]
    fn frame_clock_remaining() {
        let mut clock = FrameClock::new(10);
        let start = Instant::now();
        assert_eq!(clock.remaining(start), Duration::ZERO, "First tick never waits");

        clock.last = Some(start);
        assert_eq!(
            clock.remaining(start + Duration::from_millis(30)),
            Duration::from_millis(70)
        );
        assert_eq!(
            clock.remaining(start + Duration::from_millis(150)),
            Duration::ZERO,
            "Late frames do not wait"
        );
    }

    #[test]
    fn frame_clock_throttles() {
        let mut clock = FrameClock::new(50);
        let start = Instant::now();
        for _ in 0..3 {
            clock.tick();
        }
        assert!(start.elapsed() >= Duration::from_millis(40), "Two full periods waited");
    }
}
