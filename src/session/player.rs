//! Time slider mapping and stepped playback.
//!
//! The slider has `resolution + 1` integer positions spread evenly between
//! the session's minimum and maximum time:
//! `time = position * ((max - min) / resolution) + min`.
//! Playback moves one position per frame and asks the session for the delta
//! from the previous frame's window. A `CancelToken` stops playback between
//! frames; queries never mutate, so stopping never leaves partial state.

use super::{Session, WindowDelta};
use crate::error::Result;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tempograph_types::interval::Window;

/// Shared stop flag, checked before every frame.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// Maps integer slider positions to time stamps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeSlider {
    min: f64,
    max: f64,
    resolution: u32,
}

impl TimeSlider {
    /// A zero resolution is treated as one step.
    pub fn new(min: f64, max: f64, resolution: u32) -> Self {
        Self {
            min,
            max: max.max(min),
            resolution: resolution.max(1),
        }
    }

    /// Slider over the session's finite time range, or `None` when the
    /// session has no finite time stamps.
    pub fn for_session(session: &Session) -> Option<Self> {
        Some(Self::new(
            session.min_time()?,
            session.max_time()?,
            session.config().slider_resolution,
        ))
    }

    /// Time between two adjacent positions.
    pub fn step(&self) -> f64 {
        (self.max - self.min) / self.resolution as f64
    }

    pub fn time_at(&self, position: u32) -> f64 {
        position.min(self.resolution) as f64 * self.step() + self.min
    }

    /// Nearest position for `t`, clamped to the slider range.
    pub fn position_of(&self, t: f64) -> u32 {
        let step = self.step();
        if step <= 0.0 || t <= self.min {
            return 0;
        }
        (((t - self.min) / step).round() as u32).min(self.resolution)
    }

    /// Window rendered at `position`: one step wide so that intervals
    /// starting exactly at the position's time are visible.
    pub fn window_at(&self, position: u32) -> Window {
        let t = self.time_at(position);
        let step = self.step();
        if step > 0.0 {
            Window::new(t, t + step)
        } else {
            Window::point(t)
        }
    }

    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    pub fn last_position(&self) -> u32 {
        self.resolution
    }
}

/// Plays a session frame by frame.
#[derive(Debug, Clone)]
pub struct WindowPlayer {
    slider: TimeSlider,
    position: u32,
    shown: Window,
    cancel: CancelToken,
}

impl WindowPlayer {
    pub fn new(slider: TimeSlider, cancel: CancelToken) -> Self {
        Self {
            slider,
            position: 0,
            shown: Window::EMPTY,
            cancel,
        }
    }

    pub fn position(&self) -> u32 {
        self.position
    }

    pub fn current_time(&self) -> f64 {
        self.slider.time_at(self.position)
    }

    /// The window rendered by the last frame, `Window::EMPTY` before any.
    pub fn shown(&self) -> Window {
        self.shown
    }

    pub fn slider(&self) -> &TimeSlider {
        &self.slider
    }

    /// Jump to `position` and return the delta from the previous frame.
    pub fn seek(&mut self, session: &Session, position: u32) -> Result<WindowDelta> {
        let position = position.min(self.slider.last_position());
        let window = self.slider.window_at(position);
        let delta = session.advance_window(self.shown, window)?;
        self.position = position;
        self.shown = window;
        Ok(delta)
    }

    /// Step through positions in `direction` until the end of the slider or
    /// cancellation, handing each frame's delta to `on_frame`.
    ///
    /// Returns the number of frames played.
    pub fn play<F>(
        &mut self,
        session: &Session,
        direction: Direction,
        mut on_frame: F,
    ) -> Result<usize>
    where
        F: FnMut(u32, &WindowDelta),
    {
        let mut frames = 0;
        loop {
            if self.cancel.is_cancelled() {
                log::debug!("Playback cancelled at position {}", self.position);
                break;
            }

            let next = match direction {
                Direction::Forward if self.position < self.slider.last_position() => {
                    self.position + 1
                }
                Direction::Backward if self.position > 0 => self.position - 1,
                _ => break,
            };

            let delta = self.seek(session, next)?;
            on_frame(next, &delta);
            frames += 1;
        }
        Ok(frames)
    }
}
