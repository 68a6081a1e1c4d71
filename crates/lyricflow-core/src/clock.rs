//! Media and wall clocks.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Media clock in milliseconds; may jump (seek) or stall (pause)
pub trait Clock {
    fn now_ms(&self) -> i64;
}

/// Monotonic wall time used for timers and playback
pub trait WallClock {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemWallClock;

impl WallClock for SystemWallClock {
    #[inline]
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Wall clock advanced by hand; clones share the same time
#[derive(Debug, Clone)]
pub struct ManualWallClock {
    now: Rc<Cell<Instant>>,
}

impl Default for ManualWallClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualWallClock {
    pub fn new() -> Self {
        Self {
            now: Rc::new(Cell::new(Instant::now())),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    pub fn advance_ms(&self, ms: u64) {
        self.advance(Duration::from_millis(ms));
    }
}

impl WallClock for ManualWallClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}

pub const MIN_RATE: f64 = 0.25;
pub const MAX_RATE: f64 = 4.0;

/// Media clock driven by wall time with pause, seek and playback rate
#[derive(Debug, Clone)]
pub struct PlaybackClock<W: WallClock = SystemWallClock> {
    wall: W,
    anchor_wall: Instant,
    anchor_ms: i64,
    rate: f64,
    paused: bool,
    duration_ms: Option<i64>,
}

impl PlaybackClock<SystemWallClock> {
    pub fn system() -> Self {
        Self::new(SystemWallClock)
    }
}

impl<W: WallClock> PlaybackClock<W> {
    /// New clock at position 0, paused
    pub fn new(wall: W) -> Self {
        let anchor_wall = wall.now();
        Self {
            wall,
            anchor_wall,
            anchor_ms: 0,
            rate: 1.0,
            paused: true,
            duration_ms: None,
        }
    }

    /// Clamp seeks to the end of the media
    pub fn with_duration(mut self, duration_ms: i64) -> Self {
        self.duration_ms = Some(duration_ms.max(0));
        self
    }

    fn position_at(&self, wall: Instant) -> i64 {
        if self.paused {
            return self.anchor_ms;
        }
        let elapsed = wall.saturating_duration_since(self.anchor_wall);
        let advanced = (elapsed.as_secs_f64() * 1000.0 * self.rate).round() as i64;
        let position = self.anchor_ms + advanced;
        match self.duration_ms {
            Some(end) => position.min(end),
            None => position,
        }
    }

    fn rebase(&mut self) {
        let wall = self.wall.now();
        self.anchor_ms = self.position_at(wall);
        self.anchor_wall = wall;
    }

    pub fn play(&mut self) {
        if self.paused {
            self.anchor_wall = self.wall.now();
            self.paused = false;
        }
    }

    pub fn pause(&mut self) {
        if !self.paused {
            self.rebase();
            self.paused = true;
        }
    }

    pub fn toggle(&mut self) {
        if self.paused {
            self.play();
        } else {
            self.pause();
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn seek(&mut self, position_ms: i64) {
        let mut position = position_ms.max(0);
        if let Some(end) = self.duration_ms {
            position = position.min(end);
        }
        self.anchor_ms = position;
        self.anchor_wall = self.wall.now();
    }

    pub fn seek_by(&mut self, delta_ms: i64) {
        let current = self.now_ms();
        self.seek(current + delta_ms);
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn set_rate(&mut self, rate: f64) {
        self.rebase();
        self.rate = rate.clamp(MIN_RATE, MAX_RATE);
    }

    pub fn duration_ms(&self) -> Option<i64> {
        self.duration_ms
    }
}

impl<W: WallClock> Clock for PlaybackClock<W> {
    fn now_ms(&self) -> i64 {
        self.position_at(self.wall.now())
    }
}
