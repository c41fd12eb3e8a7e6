//! Recoil Core Runtime
//!
//! The pieces every animation driver leans on but none of them owns:
//!
//! - **Frame Host**: the "run this once before the next repaint" contract,
//!   with a deterministic [`ManualHost`] for headless runs and tests
//! - **Lifecycle**: the Idle / Animating / Unmounted driver state machine
//!
//! # Example
//!
//! ```rust
//! use recoil_core::{FrameHost, ManualHost};
//!
//! let mut host = ManualHost::new();
//! let id = host.request_frame();
//! assert!(host.is_pending(id));
//!
//! host.advance(16.0);
//! assert_eq!(host.fire_pending(), vec![id]);
//! assert_eq!(host.now(), 16.0);
//! ```

pub mod error;
pub mod frame;
pub mod lifecycle;

pub use error::{HostError, Result};
pub use frame::{ensure_available, FrameHost, FrameId, ManualHost};
pub use lifecycle::{Lifecycle, LifecycleEvent, LifecycleState};
