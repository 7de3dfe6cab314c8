#![forbid(unsafe_code)]

//! `pagefx-core` is the host-driven page transition engine for static,
//! multi-page sites.
//!
//! It intercepts same-origin link clicks, covers the page with an overlay,
//! waits for the covering animation, then asks the host to navigate. On
//! arrival (including back/forward restoration from the session cache) it
//! resets to an idle, uncovered state.
//!
//! Design goals:
//! - **Host-driven**: the embedding environment reports clicks, frames,
//!   timers and page-show events; the core answers with [`Effect`] lists.
//! - **No blocking**: every wait is a scheduled task identified by a
//!   [`TaskToken`]; stale tokens are ignored, so any task can be cancelled.
//! - **Deterministic**: no clock, no DOM, no globals. Everything is testable
//!   natively.
//!
//! The `pagefx-web` crate wires this to the browser with `web-sys`.

pub mod classify;
pub mod config;
pub mod controller;
pub mod effect;
pub mod motion;
pub mod phase;

pub use classify::{
    ClickSnapshot, IgnoreReason, Interception, LinkSnapshot, Modifiers, NavigationIntent,
    PageLocation, PointerButton, classify,
};
pub use config::{ConfigError, DEFAULT_FALLBACK_DURATION_MS, RevealMode, TransitionConfig};
pub use controller::{ClickOutcome, ControllerSnapshot, TransitionController};
pub use effect::{Effect, TaskKind, TaskToken};
pub use motion::{MotionPreference, MotionProbe, parse_css_time};
pub use phase::{ClassOp, ClassTarget, TransitionPhase, VisualState};
