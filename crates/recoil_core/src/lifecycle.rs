//! Driver lifecycle state machine
//!
//! Every animation driver moves through the same three states:
//!
//! ```text
//!          FrameRequested             Unmount
//!   Idle ─────────────────▶ Animating ───────▶ Unmounted
//!    ▲  ◀───────────────────    │                  ▲
//!    │        Settled           │                  │
//!    └──────────────────────────┴──── Unmount ─────┘
//! ```
//!
//! Events with no matching transition leave the state unchanged, which makes
//! `Unmounted` terminal and repeated scheduling while animating a no-op.

use smallvec::SmallVec;

/// Number of transitions kept for debugging
const HISTORY_LIMIT: usize = 16;

/// Driver state
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LifecycleState {
    /// No frame scheduled
    #[default]
    Idle,
    /// A frame is scheduled
    Animating,
    /// Terminal; input is ignored
    Unmounted,
}

/// Events that drive the lifecycle
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LifecycleEvent {
    /// A frame was requested from the host
    FrameRequested,
    /// A frame found nothing left to animate
    Settled,
    /// The driver was torn down
    Unmount,
}

/// A transition in the lifecycle table
#[derive(Clone, Copy, Debug)]
struct Transition {
    from: LifecycleState,
    event: LifecycleEvent,
    to: LifecycleState,
}

const fn on(from: LifecycleState, event: LifecycleEvent, to: LifecycleState) -> Transition {
    Transition { from, event, to }
}

const TRANSITIONS: &[Transition] = &[
    on(
        LifecycleState::Idle,
        LifecycleEvent::FrameRequested,
        LifecycleState::Animating,
    ),
    on(
        LifecycleState::Animating,
        LifecycleEvent::Settled,
        LifecycleState::Idle,
    ),
    on(
        LifecycleState::Idle,
        LifecycleEvent::Unmount,
        LifecycleState::Unmounted,
    ),
    on(
        LifecycleState::Animating,
        LifecycleEvent::Unmount,
        LifecycleState::Unmounted,
    ),
];

/// Lifecycle of a single driver
#[derive(Clone, Debug, Default)]
pub struct Lifecycle {
    current: LifecycleState,
    /// Recent transitions, oldest first
    history: SmallVec<[(LifecycleState, LifecycleEvent, LifecycleState); HISTORY_LIMIT]>,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the current state
    pub fn current(&self) -> LifecycleState {
        self.current
    }

    /// Check if we're in a specific state
    pub fn is(&self, state: LifecycleState) -> bool {
        self.current == state
    }

    pub fn is_unmounted(&self) -> bool {
        self.current == LifecycleState::Unmounted
    }

    /// Check if an event would trigger a transition from the current state
    pub fn can_send(&self, event: LifecycleEvent) -> bool {
        self.find(event).is_some()
    }

    /// Send an event, returning the resulting state
    pub fn send(&mut self, event: LifecycleEvent) -> LifecycleState {
        let Some(transition) = self.find(event) else {
            return self.current;
        };

        let from = self.current;
        self.current = transition.to;

        if self.history.len() == HISTORY_LIMIT {
            self.history.remove(0);
        }
        self.history.push((from, event, transition.to));

        tracing::trace!(?from, ?event, to = ?transition.to, "lifecycle transition");
        self.current
    }

    /// Recent transitions, oldest first
    pub fn history(&self) -> &[(LifecycleState, LifecycleEvent, LifecycleState)] {
        &self.history
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    fn find(&self, event: LifecycleEvent) -> Option<&'static Transition> {
        TRANSITIONS
            .iter()
            .find(|t| t.from == self.current && t.event == event)
    }
}
