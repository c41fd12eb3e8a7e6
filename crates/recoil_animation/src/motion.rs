//! Single-value driver
//!
//! [`Motion`] animates one [`Style`] toward its target. The host owns the
//! frame loop: the driver requests a frame, the host reports it back through
//! [`Motion::on_frame`] (or the caller runs it with [`Motion::tick`]), and the
//! driver requests the next one until every property has converged.

use std::marker::PhantomData;

use recoil_core::{ensure_available, FrameHost, FrameId, Lifecycle, LifecycleEvent, LifecycleState};

use crate::config::MotionConfig;
use crate::error::Result;
use crate::frame_clock::{FrameClock, StyleState};
use crate::style::{PlainStyle, Style, Velocity};

/// Receives the interpolated style after every frame that produced one
pub type FrameListener = Box<dyn FnMut(&PlainStyle)>;

/// Fires once when an animating driver comes to rest
pub type RestListener = Box<dyn FnMut()>;

/// Builder for [`Motion`]
pub struct MotionBuilder<H> {
    style: Style,
    default_style: Option<PlainStyle>,
    config: MotionConfig,
    on_frame: Option<FrameListener>,
    on_rest: Option<RestListener>,
    _host: PhantomData<H>,
}

impl<H: FrameHost> MotionBuilder<H> {
    /// Start from `style` instead of the stripped target
    pub fn default_style(mut self, style: PlainStyle) -> Self {
        self.default_style = Some(style);
        self
    }

    pub fn config(mut self, config: MotionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn on_frame(mut self, listener: impl FnMut(&PlainStyle) + 'static) -> Self {
        self.on_frame = Some(Box::new(listener));
        self
    }

    pub fn on_rest(mut self, listener: impl FnMut() + 'static) -> Self {
        self.on_rest = Some(Box::new(listener));
        self
    }

    /// Validate the inputs and schedule the first frame on `host`
    pub fn mount(self, host: H) -> Result<Motion<H>> {
        ensure_available(&host)?;
        self.config.validate()?;
        self.style.validate_for_step(self.config.step_seconds())?;

        let start = match self.default_style {
            Some(plain) => {
                plain.validate()?;
                plain
            }
            None => self.style.strip(),
        };

        let clock = FrameClock::new(self.config, host.now());
        let mut motion = Motion {
            host,
            clock,
            lifecycle: Lifecycle::new(),
            frame: None,
            style: self.style,
            unread_style: None,
            state: StyleState::at_rest(start),
            was_animating: false,
            frame_listener: self.on_frame,
            rest_listener: self.on_rest,
        };

        tracing::debug!(properties = motion.style.len(), "motion mounted");
        motion.schedule();
        Ok(motion)
    }
}

/// Drives one style toward its target on frames from `H`
pub struct Motion<H: FrameHost> {
    host: H,
    clock: FrameClock,
    lifecycle: Lifecycle,
    frame: Option<FrameId>,
    style: Style,
    /// Target set since the last frame that integrated
    unread_style: Option<Style>,
    state: StyleState,
    was_animating: bool,
    frame_listener: Option<FrameListener>,
    rest_listener: Option<RestListener>,
}

impl<H: FrameHost> Motion<H> {
    pub fn builder(style: Style) -> MotionBuilder<H> {
        MotionBuilder {
            style,
            default_style: None,
            config: MotionConfig::default(),
            on_frame: None,
            on_rest: None,
            _host: PhantomData,
        }
    }

    /// Mount with default settings
    pub fn new(host: H, style: Style) -> Result<Self> {
        Self::builder(style).mount(host)
    }

    /// Replace the target.
    ///
    /// A pending frame picks up the new target when it runs. If a previous
    /// target was never read by a frame, its numeric properties are applied
    /// now so replacing it does not lose them.
    pub fn set_style(&mut self, style: Style) -> Result<()> {
        if self.lifecycle.is_unmounted() {
            tracing::debug!("set_style after unmount ignored");
            return Ok(());
        }
        style.validate_for_step(self.clock.config().step_seconds())?;

        if let Some(unread) = self.unread_style.take() {
            self.state.snap_numeric(&unread);
        }
        self.unread_style = Some(style.clone());
        self.style = style;

        if self.frame.is_none() {
            self.clock.restart(self.host.now());
            self.schedule();
        }
        Ok(())
    }

    /// Host callback for a fired frame. Handles other than the pending one
    /// are stale and ignored.
    pub fn on_frame(&mut self, id: FrameId, timestamp: f64) {
        if self.frame != Some(id) {
            return;
        }
        self.frame = None;
        self.run_frame(timestamp);
    }

    /// Run the pending frame at `timestamp`, if there is one
    pub fn tick(&mut self, timestamp: f64) {
        if let Some(id) = self.frame.take() {
            self.host.cancel_frame(id);
            self.run_frame(timestamp);
        }
    }

    /// Unmount. Cancels the pending frame; later input is ignored.
    pub fn cancel(&mut self) {
        if let Some(id) = self.frame.take() {
            self.host.cancel_frame(id);
        }
        if !self.lifecycle.is_unmounted() {
            self.lifecycle.send(LifecycleEvent::Unmount);
            tracing::debug!("motion unmounted");
        }
    }

    pub fn style(&self) -> &Style {
        &self.style
    }

    pub fn current_style(&self) -> &PlainStyle {
        &self.state.current
    }

    pub fn current_velocity(&self) -> &Velocity {
        &self.state.current_velocity
    }

    pub fn last_ideal_style(&self) -> &PlainStyle {
        &self.state.ideal
    }

    pub fn last_ideal_velocity(&self) -> &Velocity {
        &self.state.ideal_velocity
    }

    /// Whether the rendered state already satisfies the target
    pub fn is_resting(&self) -> bool {
        self.state.is_at_rest(&self.style)
    }

    pub fn state(&self) -> LifecycleState {
        self.lifecycle.current()
    }

    pub fn pending_frame(&self) -> Option<FrameId> {
        self.frame
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    fn schedule(&mut self) {
        self.frame = Some(self.host.request_frame());
        self.lifecycle.send(LifecycleEvent::FrameRequested);
    }

    fn run_frame(&mut self, timestamp: f64) {
        if self.lifecycle.is_unmounted() {
            return;
        }

        if self.state.is_at_rest(&self.style) {
            if self.was_animating {
                tracing::debug!("motion at rest");
                if let Some(listener) = self.rest_listener.as_mut() {
                    listener();
                }
            }
            self.was_animating = false;
            self.clock.settle();
            self.lifecycle.send(LifecycleEvent::Settled);
            return;
        }
        self.was_animating = true;

        let Some(step) = self.clock.advance(timestamp) else {
            self.schedule();
            return;
        };
        tracing::trace!(
            frames = step.frames_to_catch_up,
            completion = step.frame_completion,
            "motion frame"
        );

        let step_seconds = self.clock.config().step_seconds();
        self.state = self.state.advance(&self.style, step, step_seconds);
        self.clock.commit(step);
        self.unread_style = None;

        if let Some(listener) = self.frame_listener.as_mut() {
            listener(&self.state.current);
        }
        self.schedule();
    }
}

impl<H: FrameHost> Drop for Motion<H> {
    fn drop(&mut self) {
        self.cancel();
    }
}
