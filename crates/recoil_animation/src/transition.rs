//! Keyed-list driver
//!
//! [`TransitionMotion`] animates an ordered list of keyed items. Items that
//! appear go through [`TransitionPolicy::will_enter`] to pick a starting
//! point, and items that disappear go through [`TransitionPolicy::will_leave`]
//! to pick a style to animate out toward. Leaving items stay in the merged
//! list, at their old position, until they reach that style.

use std::marker::PhantomData;

use recoil_core::{ensure_available, FrameHost, FrameId, Lifecycle, LifecycleEvent, LifecycleState};
use rustc_hash::FxHashMap;

use crate::config::MotionConfig;
use crate::error::{AnimationError, PolicyResult, Result};
use crate::frame_clock::{FrameClock, StyleState};
use crate::merge::{ensure_unique_keys, merge_diff, Keyed};
use crate::motion::RestListener;
use crate::stop::should_stop_keyed;
use crate::style::{PlainStyle, Style};

/// One keyed item of a target list. `data` is carried through untouched.
#[derive(Clone, Debug, PartialEq)]
pub struct TransitionStyle<D> {
    pub key: String,
    pub data: D,
    pub style: Style,
}

impl<D> TransitionStyle<D> {
    pub fn new(key: impl Into<String>, data: D, style: Style) -> Self {
        Self {
            key: key.into(),
            data,
            style,
        }
    }
}

impl<D> Keyed for TransitionStyle<D> {
    fn key(&self) -> &str {
        &self.key
    }
}

/// One keyed item of an interpolated snapshot or of the default styles
#[derive(Clone, Debug, PartialEq)]
pub struct TransitionPlainStyle<D> {
    pub key: String,
    pub data: D,
    pub style: PlainStyle,
}

impl<D> TransitionPlainStyle<D> {
    pub fn new(key: impl Into<String>, data: D, style: PlainStyle) -> Self {
        Self {
            key: key.into(),
            data,
            style,
        }
    }
}

impl<D> Keyed for TransitionPlainStyle<D> {
    fn key(&self) -> &str {
        &self.key
    }
}

/// Enter and leave behavior for keyed items
pub trait TransitionPolicy<D> {
    /// Starting point for an item that just appeared. Defaults to the
    /// item's target with springs resolved, so nothing animates in.
    fn will_enter(&mut self, item: &TransitionStyle<D>) -> PolicyResult<PlainStyle> {
        Ok(item.style.strip())
    }

    /// Style to animate a disappearing item toward, or `None` to remove it
    /// right away
    fn will_leave(&mut self, item: &TransitionStyle<D>) -> PolicyResult<Option<Style>> {
        let _ = item;
        Ok(None)
    }

    /// An item finished leaving and is gone from the merged list
    fn did_leave(&mut self, key: &str, data: &D) {
        let _ = (key, data);
    }
}

/// Items enter at their target and leave immediately
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultTransitionPolicy;

impl<D> TransitionPolicy<D> for DefaultTransitionPolicy {}

/// Receives the interpolated list after every frame that produced one
pub type ListFrameListener<D> = Box<dyn FnMut(&[TransitionPlainStyle<D>])>;

/// Builder for [`TransitionMotion`]
pub struct TransitionMotionBuilder<D: 'static, H> {
    styles: Vec<TransitionStyle<D>>,
    default_styles: Option<Vec<TransitionPlainStyle<D>>>,
    policy: Box<dyn TransitionPolicy<D>>,
    config: MotionConfig,
    on_frame: Option<ListFrameListener<D>>,
    on_rest: Option<RestListener>,
    _host: PhantomData<H>,
}

impl<D: Clone + 'static, H: FrameHost> TransitionMotionBuilder<D, H> {
    /// Start from these items instead of the stripped targets. Items not in
    /// the first target list leave on mount.
    pub fn default_styles(mut self, styles: Vec<TransitionPlainStyle<D>>) -> Self {
        self.default_styles = Some(styles);
        self
    }

    pub fn policy(mut self, policy: impl TransitionPolicy<D> + 'static) -> Self {
        self.policy = Box::new(policy);
        self
    }

    pub fn config(mut self, config: MotionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn on_frame(mut self, listener: impl FnMut(&[TransitionPlainStyle<D>]) + 'static) -> Self {
        self.on_frame = Some(Box::new(listener));
        self
    }

    pub fn on_rest(mut self, listener: impl FnMut() + 'static) -> Self {
        self.on_rest = Some(Box::new(listener));
        self
    }

    /// Validate the inputs, reconcile the starting list with the first
    /// target list, and schedule the first frame on `host`
    pub fn mount(mut self, host: H) -> Result<TransitionMotion<D, H>> {
        ensure_available(&host)?;
        self.config.validate()?;
        let step_seconds = self.config.step_seconds();
        validate_list(&self.styles, step_seconds)?;

        let (start, start_states) = match self.default_styles {
            Some(defaults) => {
                ensure_unique_keys(&defaults)?;
                let by_key = index_by_key(&self.styles);
                let mut items = Vec::with_capacity(defaults.len());
                let mut states = Vec::with_capacity(defaults.len());
                for default in defaults {
                    default.style.validate()?;
                    let item = match by_key.get(default.key.as_str()) {
                        Some(&i) => self.styles[i].clone(),
                        None => TransitionStyle::new(
                            default.key.clone(),
                            default.data.clone(),
                            Style::from(&default.style),
                        ),
                    };
                    items.push(item);
                    states.push(StyleState::at_rest(default.style));
                }
                (items, states)
            }
            None => {
                let states = self
                    .styles
                    .iter()
                    .map(|item| StyleState::at_rest(item.style.strip()))
                    .collect();
                (self.styles.clone(), states)
            }
        };

        let (merged, states) = merge_and_sync(
            self.policy.as_mut(),
            &start,
            &start_states,
            &self.styles,
            step_seconds,
        )?;

        let clock = FrameClock::new(self.config, host.now());
        let mut motion = TransitionMotion {
            host,
            clock,
            lifecycle: Lifecycle::new(),
            frame: None,
            styles: self.styles,
            unread_styles: None,
            merged,
            states,
            policy: self.policy,
            was_animating: false,
            frame_listener: self.on_frame,
            rest_listener: self.on_rest,
        };

        tracing::debug!(items = motion.merged.len(), "transition motion mounted");
        motion.schedule();
        Ok(motion)
    }
}

/// Drives a keyed list of styles on frames from `H`
pub struct TransitionMotion<D: Clone + 'static, H: FrameHost> {
    host: H,
    clock: FrameClock,
    lifecycle: Lifecycle,
    frame: Option<FrameId>,
    /// Freshest target list
    styles: Vec<TransitionStyle<D>>,
    /// Target list set since the last frame that integrated
    unread_styles: Option<Vec<TransitionStyle<D>>>,
    /// Target items plus retained leaving items, in display order
    merged: Vec<TransitionStyle<D>>,
    /// Aligned with `merged`
    states: Vec<StyleState>,
    policy: Box<dyn TransitionPolicy<D>>,
    was_animating: bool,
    frame_listener: Option<ListFrameListener<D>>,
    rest_listener: Option<RestListener>,
}

impl<D: Clone + 'static, H: FrameHost> TransitionMotion<D, H> {
    pub fn builder(styles: Vec<TransitionStyle<D>>) -> TransitionMotionBuilder<D, H> {
        TransitionMotionBuilder {
            styles,
            default_styles: None,
            policy: Box::new(DefaultTransitionPolicy),
            config: MotionConfig::default(),
            on_frame: None,
            on_rest: None,
            _host: PhantomData,
        }
    }

    /// Mount with the default policy and settings
    pub fn new(host: H, styles: Vec<TransitionStyle<D>>) -> Result<Self> {
        Self::builder(styles).mount(host)
    }

    /// Replace the target list.
    ///
    /// The last list set before a frame is the one that frame animates
    /// toward. If the previous list was never read by a frame, it is merged
    /// in now and its numeric properties applied per key, so replacing it
    /// loses neither its snaps nor its enter/leave notifications.
    ///
    /// On error nothing is committed.
    pub fn set_styles(&mut self, styles: Vec<TransitionStyle<D>>) -> Result<()> {
        if self.lifecycle.is_unmounted() {
            tracing::debug!("set_styles after unmount ignored");
            return Ok(());
        }
        let step_seconds = self.clock.config().step_seconds();
        validate_list(&styles, step_seconds)?;

        if let Some(unread) = self.unread_styles.as_deref() {
            let (merged, mut states) = merge_and_sync(
                self.policy.as_mut(),
                &self.merged,
                &self.states,
                unread,
                step_seconds,
            )?;
            let unread_by_key = index_by_key(unread);
            for (item, state) in merged.iter().zip(states.iter_mut()) {
                if let Some(&i) = unread_by_key.get(item.key.as_str()) {
                    state.snap_numeric(&unread[i].style);
                }
            }
            self.merged = merged;
            self.states = states;
        }

        self.unread_styles = Some(styles.clone());
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

    /// Unmount. Cancels the pending frame; later input is ignored.
    pub fn cancel(&mut self) {
        if let Some(id) = self.frame.take() {
            self.host.cancel_frame(id);
        }
        if !self.lifecycle.is_unmounted() {
            self.lifecycle.send(LifecycleEvent::Unmount);
            tracing::debug!("transition motion unmounted");
        }
    }

    /// Interpolated snapshot in display order.
    ///
    /// Data comes from the newest target list that mentions the key, so a
    /// list set since the last frame is already reflected.
    pub fn interpolated_styles(&self) -> Vec<TransitionPlainStyle<D>> {
        let fresh: FxHashMap<&str, &D> = self
            .unread_styles
            .iter()
            .flatten()
            .map(|item| (item.key.as_str(), &item.data))
            .collect();

        self.merged
            .iter()
            .zip(&self.states)
            .map(|(item, state)| {
                let data = fresh.get(item.key.as_str()).copied().unwrap_or(&item.data);
                TransitionPlainStyle::new(item.key.clone(), data.clone(), state.current.clone())
            })
            .collect()
    }

    /// Keys of the merged list, including items still leaving
    pub fn merged_keys(&self) -> impl Iterator<Item = &str> {
        self.merged.iter().map(|item| item.key.as_str())
    }

    pub fn styles(&self) -> &[TransitionStyle<D>] {
        &self.styles
    }

    /// Per-item state, aligned with [`merged_keys`](Self::merged_keys)
    pub fn item_states(&self) -> &[StyleState] {
        &self.states
    }

    /// Whether every item has converged and no item is still leaving
    pub fn is_resting(&self) -> bool {
        should_stop_keyed(&self.states, &self.styles, &self.merged)
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

    fn run_frame(&mut self, timestamp: f64) -> Result<()> {
        if self.lifecycle.is_unmounted() {
            return Ok(());
        }

        if self.is_resting() {
            if self.was_animating {
                tracing::debug!(items = self.merged.len(), "transition motion at rest");
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

        // Leaving items that reached their leave style drop out here
        let step_seconds = self.clock.config().step_seconds();
        let synced = merge_and_sync(
            self.policy.as_mut(),
            &self.merged,
            &self.states,
            &self.styles,
            step_seconds,
        );
        let (merged, states) = match synced {
            Ok(synced) => synced,
            Err(err) => {
                self.schedule();
                return Err(err);
            }
        };

        tracing::trace!(
            items = merged.len(),
            frames = step.frames_to_catch_up,
            completion = step.frame_completion,
            "transition frame"
        );

        self.states = merged
            .iter()
            .zip(&states)
            .map(|(item, state)| state.advance(&item.style, step, step_seconds))
            .collect();
        self.merged = merged;
        self.clock.commit(step);
        self.unread_styles = None;

        if self.frame_listener.is_some() {
            let snapshot = self.interpolated_styles();
            if let Some(listener) = self.frame_listener.as_mut() {
                listener(&snapshot);
            }
        }
        self.schedule();
        Ok(())
    }
}

impl<D: Clone + 'static, H: FrameHost> Drop for TransitionMotion<D, H> {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn validate_list<D>(items: &[TransitionStyle<D>], step_seconds: f64) -> Result<()> {
    ensure_unique_keys(items)?;
    items
        .iter()
        .try_for_each(|item| item.style.validate_for_step(step_seconds))
}

fn index_by_key<T: Keyed>(items: &[T]) -> FxHashMap<&str, usize> {
    items.iter().enumerate().map(|(i, item)| (item.key(), i)).collect()
}

/// Reconcile `merged` (with aligned `states`) against `destination`.
///
/// Leaving items ask the policy for a leave style; those without one, or
/// already resting at it, are dropped. Entering items ask the policy for a
/// starting point and start with zero velocity. Everything else keeps its
/// state. Dropped items are reported through `did_leave` only once the whole
/// merge has succeeded, so on error nothing is mutated or reported.
fn merge_and_sync<D: Clone>(
    policy: &mut dyn TransitionPolicy<D>,
    merged: &[TransitionStyle<D>],
    states: &[StyleState],
    destination: &[TransitionStyle<D>],
    step_seconds: f64,
) -> Result<(Vec<TransitionStyle<D>>, Vec<StyleState>)> {
    let mut gone: Vec<usize> = Vec::new();
    let next_merged = merge_diff(merged, destination, |old_index, leaving| {
        let Some(leave_style) = policy.will_leave(leaving).map_err(AnimationError::Policy)? else {
            gone.push(old_index);
            return Ok(None);
        };
        leave_style.validate_for_step(step_seconds)?;

        let arrived = states
            .get(old_index)
            .is_some_and(|state| state.is_at_rest(&leave_style));
        if arrived {
            gone.push(old_index);
            return Ok(None);
        }

        Ok(Some(TransitionStyle::new(
            leaving.key.clone(),
            leaving.data.clone(),
            leave_style,
        )))
    })?;

    let old_by_key = index_by_key(merged);
    let mut next_states = Vec::with_capacity(next_merged.len());
    for item in &next_merged {
        match old_by_key.get(item.key.as_str()).and_then(|&i| states.get(i)) {
            Some(state) => next_states.push(state.clone()),
            None => {
                let start = policy.will_enter(item).map_err(AnimationError::Policy)?;
                start.validate()?;
                let velocity = item.style.zeroed();
                next_states.push(StyleState::from_parts(start, velocity));
            }
        }
    }

    for item in gone.into_iter().filter_map(|i| merged.get(i)) {
        policy.did_leave(&item.key, &item.data);
    }
    Ok((next_merged, next_states))
}
