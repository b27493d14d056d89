// Copyright (c) 2026 rezky_nightky

use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameHandle(u64);

impl FrameHandle {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(self) -> u64 {
        self.0
    }
}

pub trait FrameScheduler {
    fn request_frame(&mut self) -> FrameHandle;

    fn cancel_frame(&mut self, handle: FrameHandle);
}

#[derive(Debug)]
pub struct PacedScheduler {
    period: Duration,
    origin: Instant,
    next_due: Instant,
    pending: Option<FrameHandle>,
    next_id: u64,
    paused: bool,
}

impl PacedScheduler {
    pub fn new(fps: f64, now: Instant) -> Self {
        let fps = if fps.is_finite() && fps > 0.0 { fps } else { 60.0 };
        Self {
            period: Duration::from_secs_f64(1.0 / fps),
            origin: now,
            next_due: now,
            pending: None,
            next_id: 1,
            paused: false,
        }
    }

    #[allow(dead_code)]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn set_paused(&mut self, paused: bool, now: Instant) {
        if self.paused && !paused && self.next_due < now {
            self.next_due = now;
        }
        self.paused = paused;
    }

    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        if self.paused || self.pending.is_none() {
            return None;
        }
        Some(self.next_due.saturating_duration_since(now))
    }

    /// Release the pending frame if its slot has come, together with the
    /// callback timestamp (time since the scheduler was created).
    pub fn take_due(&mut self, now: Instant) -> Option<(FrameHandle, Duration)> {
        if self.paused || now < self.next_due {
            return None;
        }
        let handle = self.pending.take()?;

        self.next_due += self.period;
        if now > self.next_due {
            self.next_due = now;
        }
        Some((handle, now.saturating_duration_since(self.origin)))
    }
}

impl FrameScheduler for PacedScheduler {
    fn request_frame(&mut self) -> FrameHandle {
        let handle = FrameHandle(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.pending = Some(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if self.pending == Some(handle) {
            self.pending = None;
        }
    }
}
