//! Frame host contract
//!
//! Drivers never run a display loop themselves. They ask a [`FrameHost`] for
//! one frame at a time, remember the returned [`FrameId`], and are told by
//! the embedder when that frame fires.

use crate::error::{HostError, Result};
use slotmap::{new_key_type, SlotMap};
use std::cell::RefCell;
use std::rc::Rc;

new_key_type! {
    /// Handle for a requested frame, used for cancellation and dispatch
    pub struct FrameId;
}

/// The host's frame-scheduling primitive and monotonic clock.
///
/// Implementations map onto whatever the platform offers (a vsync callback,
/// a display link, an event-loop redraw request).
pub trait FrameHost {
    /// Request a single callback before the next repaint
    fn request_frame(&mut self) -> FrameId;

    /// Cancel a requested frame. Unknown or already fired ids are ignored.
    fn cancel_frame(&mut self, id: FrameId);

    /// Monotonic clock in milliseconds
    fn now(&self) -> f64;

    /// Whether frames can be scheduled at all
    fn is_available(&self) -> bool {
        true
    }
}

impl<H: FrameHost + ?Sized> FrameHost for Box<H> {
    fn request_frame(&mut self) -> FrameId {
        (**self).request_frame()
    }

    fn cancel_frame(&mut self, id: FrameId) {
        (**self).cancel_frame(id)
    }

    fn now(&self) -> f64 {
        (**self).now()
    }

    fn is_available(&self) -> bool {
        (**self).is_available()
    }
}

/// Fail fast when a host cannot schedule frames.
///
/// Drivers call this once at construction; a missing frame primitive is not
/// something they can recover from later.
pub fn ensure_available<H: FrameHost + ?Sized>(host: &H) -> Result<()> {
    if host.is_available() {
        Ok(())
    } else {
        tracing::debug!("frame host reported unavailable");
        Err(HostError::Unavailable(
            "request_frame is not supported by this host".to_string(),
        ))
    }
}

/// A frame host driven by hand.
///
/// Time only moves when [`advance`](Self::advance) or
/// [`set_time`](Self::set_time) is called, and requested frames only fire
/// when the embedder drains them with [`fire_pending`](Self::fire_pending).
/// Cloning yields another handle to the same host, so one clone can be
/// handed to a driver while another drives the clock.
#[derive(Clone, Debug)]
pub struct ManualHost {
    inner: Rc<RefCell<ManualHostState>>,
}

#[derive(Debug)]
struct ManualHostState {
    /// Pending frames, valued by the time they were requested
    pending: SlotMap<FrameId, f64>,
    now_ms: f64,
    available: bool,
    requested_total: u64,
}

impl ManualHost {
    pub fn new() -> Self {
        Self::with_state(true)
    }

    /// A host whose frame primitive is missing
    pub fn unavailable() -> Self {
        Self::with_state(false)
    }

    fn with_state(available: bool) -> Self {
        Self {
            inner: Rc::new(RefCell::new(ManualHostState {
                pending: SlotMap::with_key(),
                now_ms: 0.0,
                available,
                requested_total: 0,
            })),
        }
    }

    /// Move the clock forward, returning the new time
    pub fn advance(&self, delta_ms: f64) -> f64 {
        let mut state = self.inner.borrow_mut();
        state.now_ms += delta_ms.max(0.0);
        state.now_ms
    }

    /// Jump the clock to an absolute time
    pub fn set_time(&self, now_ms: f64) {
        self.inner.borrow_mut().now_ms = now_ms;
    }

    pub fn is_pending(&self, id: FrameId) -> bool {
        self.inner.borrow().pending.contains_key(id)
    }

    pub fn pending_count(&self) -> usize {
        self.inner.borrow().pending.len()
    }

    /// Total number of frames ever requested
    pub fn requested_total(&self) -> u64 {
        self.inner.borrow().requested_total
    }

    /// Fire every pending frame, oldest request first.
    ///
    /// Fired frames are forgotten; the caller dispatches the returned ids to
    /// whichever drivers own them.
    pub fn fire_pending(&self) -> Vec<FrameId> {
        let mut state = self.inner.borrow_mut();
        let mut fired: Vec<(FrameId, f64)> = state.pending.drain().collect();
        fired.sort_by(|a, b| a.1.total_cmp(&b.1));
        fired.into_iter().map(|(id, _)| id).collect()
    }
}

impl Default for ManualHost {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameHost for ManualHost {
    fn request_frame(&mut self) -> FrameId {
        let mut state = self.inner.borrow_mut();
        state.requested_total += 1;
        let now = state.now_ms;
        state.pending.insert(now)
    }

    fn cancel_frame(&mut self, id: FrameId) {
        self.inner.borrow_mut().pending.remove(id);
    }

    fn now(&self) -> f64 {
        self.inner.borrow().now_ms
    }

    fn is_available(&self) -> bool {
        self.inner.borrow().available
    }
}
