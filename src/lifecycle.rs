// Copyright (c) 2026 rezky_nightky

use std::time::Duration;

use tracing::{debug, trace, warn};

use crate::canvas::{Context2d, Point, Size};
use crate::scheduler::{FrameHandle, FrameScheduler};

pub const NOMINAL_FRAME: Duration = Duration::from_nanos(16_666_667);

/// Upper bound on simulated frames per callback, so a long pause does not
/// fling every particle across the surface in one step.
pub const MAX_FRAME_STEPS: f32 = 4.0;

pub fn frame_steps(delta: Duration) -> f32 {
    (delta.as_secs_f32() / NOMINAL_FRAME.as_secs_f32()).clamp(0.0, MAX_FRAME_STEPS)
}

pub trait Animation {
    fn name(&self) -> &'static str;

    fn on_initialize(&mut self, size: Size);

    fn on_resize(&mut self, size: Size);

    fn on_mouse_move(&mut self, _position: Point) {}

    fn on_destroy(&mut self) {}

    fn update(&mut self, delta: Duration);

    fn render(&mut self, ctx: &mut dyn Context2d);
}

impl<T: Animation + ?Sized> Animation for Box<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn on_initialize(&mut self, size: Size) {
        (**self).on_initialize(size)
    }

    fn on_resize(&mut self, size: Size) {
        (**self).on_resize(size)
    }

    fn on_mouse_move(&mut self, position: Point) {
        (**self).on_mouse_move(position)
    }

    fn on_destroy(&mut self) {
        (**self).on_destroy()
    }

    fn update(&mut self, delta: Duration) {
        (**self).update(delta)
    }

    fn render(&mut self, ctx: &mut dyn Context2d) {
        (**self).render(ctx)
    }
}

#[derive(Debug)]
struct Session<C> {
    ctx: C,
    size: Size,
    mouse: Option<Point>,
    last_frame: Option<Duration>,
    pending: Option<FrameHandle>,
}

#[derive(Debug)]
pub struct Lifecycle<A, C, S> {
    animation: A,
    scheduler: S,
    session: Option<Session<C>>,
}

impl<A, C, S> Lifecycle<A, C, S>
where
    A: Animation,
    C: Context2d,
    S: FrameScheduler,
{
    pub fn new(animation: A, scheduler: S) -> Self {
        Self {
            animation,
            scheduler,
            session: None,
        }
    }

    pub fn initialize(&mut self, ctx: C) {
        if self.session.is_some() {
            warn!(
                "{}: initialize called on an active session, ignoring",
                self.animation.name()
            );
            return;
        }

        let size = ctx.size();
        self.animation.on_initialize(size);
        let pending = Some(self.scheduler.request_frame());
        self.session = Some(Session {
            ctx,
            size,
            mouse: None,
            last_frame: None,
            pending,
        });
        debug!(
            "{}: session started at {}x{}",
            self.animation.name(),
            size.width,
            size.height
        );
    }

    pub fn resize(&mut self, size: Size) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        session.size = size;
        session.ctx.resize_surface(size);
        self.animation.on_resize(size);
        debug!(
            "{}: resized to {}x{}",
            self.animation.name(),
            size.width,
            size.height
        );
    }

    pub fn handle_mouse_move(&mut self, position: Point) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        session.mouse = Some(position);
        self.animation.on_mouse_move(position);
    }

    pub fn destroy(&mut self) {
        let Some(mut session) = self.session.take() else {
            return;
        };
        if let Some(handle) = session.pending.take() {
            self.scheduler.cancel_frame(handle);
        }
        self.animation.on_destroy();
        debug!("{}: session destroyed", self.animation.name());
    }

    /// Frame callback entry point for the host. Returns `false` when the
    /// handle is not the one this session is waiting on.
    ///
    /// The next frame is requested before the strategy hooks run, so the
    /// session keeps its handle even if a hook unwinds.
    pub fn on_animation_frame(&mut self, handle: FrameHandle, timestamp: Duration) -> bool {
        let Some(session) = self.session.as_mut() else {
            trace!("frame {} delivered without a session", handle.id());
            return false;
        };
        if session.pending != Some(handle) {
            trace!("stale frame {} ignored", handle.id());
            return false;
        }
        session.pending = Some(self.scheduler.request_frame());

        let delta = session
            .last_frame
            .map(|last| timestamp.saturating_sub(last))
            .unwrap_or(Duration::ZERO);
        session.last_frame = Some(timestamp);

        self.animation.update(delta);
        self.animation.render(&mut session.ctx);
        true
    }

    #[allow(dead_code)]
    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    #[allow(dead_code)]
    pub fn size(&self) -> Option<Size> {
        self.session.as_ref().map(|s| s.size)
    }

    #[allow(dead_code)]
    pub fn mouse(&self) -> Option<Point> {
        self.session.as_ref().and_then(|s| s.mouse)
    }

    #[allow(dead_code)]
    pub fn pending_frame(&self) -> Option<FrameHandle> {
        self.session.as_ref().and_then(|s| s.pending)
    }

    pub fn context(&self) -> Option<&C> {
        self.session.as_ref().map(|s| &s.ctx)
    }

    pub fn animation(&self) -> &A {
        &self.animation
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }
}
