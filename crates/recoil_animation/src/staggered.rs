//! Staggered driver
//!
//! Animates an index-aligned list of styles whose targets are recomputed
//! every frame from the previous frame's ideal styles. Pointing each item at
//! its predecessor's position gives "follow the leader" chains.

use std::marker::PhantomData;

use recoil_core::{ensure_available, FrameHost, FrameId, Lifecycle, LifecycleEvent, LifecycleState};

use crate::config::MotionConfig;
use crate::error::Result;
use crate::frame_clock::{FrameClock, StyleState};
use crate::motion::RestListener;
use crate::stop::should_stop_indexed;
use crate::style::{PlainStyle, Style};

/// Computes target styles from the previous frame's ideal styles. Called
/// with an empty slice when there is no previous frame.
pub type StylesFn = Box<dyn FnMut(&[PlainStyle]) -> Vec<Style>>;

/// Receives the interpolated styles after every frame that produced them
pub type StaggeredFrameListener = Box<dyn FnMut(&[PlainStyle])>;

/// Builder for [`StaggeredMotion`]
pub struct StaggeredMotionBuilder<H> {
    styles: StylesFn,
    default_styles: Option<Vec<PlainStyle>>,
    config: MotionConfig,
    on_frame: Option<StaggeredFrameListener>,
    on_rest: Option<RestListener>,
    _host: PhantomData<H>,
}

impl<H: FrameHost> StaggeredMotionBuilder<H> {
    pub fn default_styles(mut self, styles: Vec<PlainStyle>) -> Self {
        self.default_styles = Some(styles);
        self
    }

    pub fn config(mut self, config: MotionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn on_frame(mut self, listener: impl FnMut(&[PlainStyle]) + 'static) -> Self {
        self.on_frame = Some(Box::new(listener));
        self
    }

    pub fn on_rest(mut self, listener: impl FnMut() + 'static) -> Self {
        self.on_rest = Some(Box::new(listener));
        self
    }

    pub fn mount(mut self, host: H) -> Result<StaggeredMotion<H>> {
        ensure_available(&host)?;
        self.config.validate()?;

        let start = match self.default_styles {
            Some(defaults) => {
                defaults.iter().try_for_each(PlainStyle::validate)?;
                defaults
            }
            None => {
                let targets = (self.styles)(&[]);
                validate_styles(&targets, self.config.step_seconds())?;
                targets.iter().map(Style::strip).collect()
            }
        };

        let clock = FrameClock::new(self.config, host.now());
        let mut motion = StaggeredMotion {
            host,
            clock,
            lifecycle: Lifecycle::new(),
            frame: None,
            styles: self.styles,
            unread_styles: None,
            states: start.into_iter().map(StyleState::at_rest).collect(),
            was_animating: false,
            frame_listener: self.on_frame,
            rest_listener: self.on_rest,
        };

        tracing::debug!(items = motion.states.len(), "staggered motion mounted");
        motion.schedule();
        Ok(motion)
    }
}

/// Drives a list of styles computed from their own previous state
pub struct StaggeredMotion<H: FrameHost> {
    host: H,
    clock: FrameClock,
    lifecycle: Lifecycle,
    frame: Option<FrameId>,
    styles: StylesFn,
    /// Targets computed when the function was replaced, not yet read by a frame
    unread_styles: Option<Vec<Style>>,
    states: Vec<StyleState>,
    was_animating: bool,
    frame_listener: Option<StaggeredFrameListener>,
    rest_listener: Option<RestListener>,
}

impl<H: FrameHost> StaggeredMotion<H> {
    pub fn builder(
        styles: impl FnMut(&[PlainStyle]) -> Vec<Style> + 'static,
    ) -> StaggeredMotionBuilder<H> {
        StaggeredMotionBuilder {
            styles: Box::new(styles),
            default_styles: None,
            config: MotionConfig::default(),
            on_frame: None,
            on_rest: None,
            _host: PhantomData,
        }
    }

    pub fn new(host: H, styles: impl FnMut(&[PlainStyle]) -> Vec<Style> + 'static) -> Result<Self> {
        Self::builder(styles).mount(host)
    }

    /// Replace the styles function.
    ///
    /// Numeric properties of targets computed by the previous function that
    /// no frame read yet are applied by index first.
    pub fn set_styles(
        &mut self,
        styles: impl FnMut(&[PlainStyle]) -> Vec<Style> + 'static,
    ) -> Result<()> {
        if self.lifecycle.is_unmounted() {
            tracing::debug!("set_styles after unmount ignored");
            return Ok(());
        }

        let mut styles: StylesFn = Box::new(styles);
        let targets = styles(&self.ideal_styles());
        validate_styles(&targets, self.clock.config().step_seconds())?;

        if let Some(unread) = self.unread_styles.take() {
            for (state, style) in self.states.iter_mut().zip(&unread) {
                state.snap_numeric(style);
            }
        }
        self.unread_styles = Some(targets);
        self.styles = styles;

        if self.frame.is_none() {
            self.clock.restart(self.host.now());
            self.schedule();
        }
        Ok(())
    }

    /// Host callback for a fired frame. Handles other than the pending one
    /// are stale and ignored.
    pub fn on_frame(&mut self, id: FrameId, timestamp: f64) -> Result<()> {
        if self.frame != Some(id) {
            return Ok(());
        }
        self.frame = None;
        self.run_frame(timestamp)
    }

    /// Run the pending frame at `timestamp`, if there is one
    pub fn tick(&mut self, timestamp: f64) -> Result<()> {
        match self.frame.take() {
            Some(id) => {
                self.host.cancel_frame(id);
                self.run_frame(timestamp)
            }
            None => Ok(()),
        }
    }

    pub fn cancel(&mut self) {
        if let Some(id) = self.frame.take() {
            self.host.cancel_frame(id);
        }
        if !self.lifecycle.is_unmounted() {
            self.lifecycle.send(LifecycleEvent::Unmount);
            tracing::debug!("staggered motion unmounted");
        }
    }

    pub fn current_styles(&self) -> Vec<PlainStyle> {
        self.states.iter().map(|state| state.current.clone()).collect()
    }

    pub fn ideal_styles(&self) -> Vec<PlainStyle> {
        self.states.iter().map(|state| state.ideal.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn state(&self) -> LifecycleState {
        self.lifecycle.current()
    }

    pub fn pending_frame(&self) -> Option<FrameId> {
        self.frame
    }

    fn schedule(&mut self) {
        self.frame = Some(self.host.request_frame());
        self.lifecycle.send(LifecycleEvent::FrameRequested);
    }

    fn run_frame(&mut self, timestamp: f64) -> Result<()> {
        if self.lifecycle.is_unmounted() {
            return Ok(());
        }

        let ideals = self.ideal_styles();
        let targets = (self.styles)(&ideals);
        if let Err(err) = validate_styles(&targets, self.clock.config().step_seconds()) {
            self.schedule();
            return Err(err);
        }

        if should_stop_indexed(&self.states, &targets) {
            if self.was_animating {
                tracing::debug!(items = self.states.len(), "staggered motion at rest");
                if let Some(listener) = self.rest_listener.as_mut() {
                    listener();
                }
            }
            self.was_animating = false;
            self.clock.settle();
            self.lifecycle.send(LifecycleEvent::Settled);
            return Ok(());
        }
        self.was_animating = true;

        let Some(step) = self.clock.advance(timestamp) else {
            self.schedule();
            return Ok(());
        };
        tracing::trace!(
            items = targets.len(),
            frames = step.frames_to_catch_up,
            completion = step.frame_completion,
            "staggered frame"
        );

        let step_seconds = self.clock.config().step_seconds();
        let empty = StyleState::default();
        self.states = targets
            .iter()
            .enumerate()
            .map(|(i, style)| {
                self.states
                    .get(i)
                    .unwrap_or(&empty)
                    .advance(style, step, step_seconds)
            })
            .collect();
        self.clock.commit(step);
        self.unread_styles = None;

        if let Some(listener) = self.frame_listener.as_mut() {
            let current: Vec<PlainStyle> = self.states.iter().map(|s| s.current.clone()).collect();
            listener(&current);
        }
        self.schedule();
        Ok(())
    }
}

impl<H: FrameHost> Drop for StaggeredMotion<H> {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn validate_styles(styles: &[Style], step_seconds: f64) -> Result<()> {
    styles
        .iter()
        .try_for_each(|style| style.validate_for_step(step_seconds))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presets::{spring, spring_with, SpringConfig};
    use recoil_core::ManualHost;
    use std::cell::Cell;
    use std::rc::Rc;

    const FRAME: f64 = 1000.0 / 60.0;

    /// Item 0 chases `leader`, every other item chases its predecessor
    fn chain(leader: f64, count: usize) -> impl FnMut(&[PlainStyle]) -> Vec<Style> {
        move |prev: &[PlainStyle]| {
            (0..count)
                .map(|i| {
                    let target = if i == 0 {
                        leader
                    } else {
                        prev.get(i - 1).and_then(|p| p.get("x")).unwrap_or(leader)
                    };
                    Style::new().with("x", spring(target))
                })
                .collect()
        }
    }

    fn run_until_idle(motion: &mut StaggeredMotion<ManualHost>, host: &ManualHost) {
        for _ in 0..5_000 {
            if motion.pending_frame().is_none() {
                return;
            }
            motion.tick(host.advance(FRAME)).unwrap();
        }
        panic!("staggered motion did not come to rest");
    }

    #[test]
    fn test_chain_follows_the_leader() {
        let host = ManualHost::new();
        let rests = Rc::new(Cell::new(0));
        let counter = rests.clone();
        let mut motion = StaggeredMotion::builder(chain(0.0, 3))
            .on_rest(move || counter.set(counter.get() + 1))
            .mount(host.clone())
            .unwrap();
        run_until_idle(&mut motion, &host);
        assert_eq!(rests.get(), 0);

        motion.set_styles(chain(50.0, 3)).unwrap();
        motion.tick(host.advance(FRAME)).unwrap();
        let first = motion.current_styles();
        let lead = first[0].get("x").unwrap();
        let tail = first[2].get("x").unwrap();
        assert!(lead > 0.0);
        assert!(tail < lead, "tail should lag, lead {lead} tail {tail}");

        run_until_idle(&mut motion, &host);
        for style in motion.current_styles() {
            assert_eq!(style.get("x"), Some(50.0));
        }
        assert_eq!(rests.get(), 1);
    }

    #[test]
    fn test_mount_strips_initial_targets() {
        let host = ManualHost::new();
        let motion = StaggeredMotion::new(host, chain(3.0, 2)).unwrap();
        assert_eq!(motion.len(), 2);
        assert_eq!(motion.current_styles()[1].get("x"), Some(3.0));
    }

    #[test]
    fn test_growing_list_starts_new_items_at_target() {
        let host = ManualHost::new();
        let mut motion = StaggeredMotion::new(host.clone(), chain(1.0, 1)).unwrap();
        run_until_idle(&mut motion, &host);

        motion.set_styles(chain(1.0, 2)).unwrap();
        run_until_idle(&mut motion, &host);
        assert_eq!(motion.len(), 2);
        assert_eq!(motion.current_styles()[1].get("x"), Some(1.0));
    }

    #[test]
    fn test_unread_numeric_targets_snap_by_index() {
        let host = ManualHost::new();
        let numeric = |o: f64| move |_: &[PlainStyle]| vec![Style::new().with("o", o)];
        let mut motion = StaggeredMotion::new(host.clone(), numeric(0.0)).unwrap();
        run_until_idle(&mut motion, &host);

        motion.set_styles(numeric(0.5)).unwrap();
        motion
            .set_styles(|_: &[PlainStyle]| vec![Style::new().with("o", spring(0.5))])
            .unwrap();
        assert_eq!(motion.current_styles()[0].get("o"), Some(0.5));
    }

    #[test]
    fn test_divergent_targets_are_rejected() {
        let host = ManualHost::new();
        let mut motion = StaggeredMotion::new(host.clone(), chain(1.0, 2)).unwrap();
        run_until_idle(&mut motion, &host);

        let divergent = |_: &[PlainStyle]| {
            vec![Style::new().with("x", spring_with(9.0, SpringConfig::new(20_000.0, 1.0)))]
        };
        assert!(matches!(
            motion.set_styles(divergent),
            Err(crate::AnimationError::InvalidSpring { .. })
        ));
        assert_eq!(motion.state(), LifecycleState::Idle);
        assert_eq!(motion.current_styles()[0].get("x"), Some(1.0));
    }

    #[test]
    fn test_cancel_releases_frame() {
        let host = ManualHost::new();
        let mut motion = StaggeredMotion::new(host.clone(), chain(1.0, 2)).unwrap();
        motion.cancel();
        assert_eq!(motion.state(), LifecycleState::Unmounted);
        assert_eq!(host.pending_count(), 0);
    }
}
