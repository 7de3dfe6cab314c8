#![forbid(unsafe_code)]

//! Host commands emitted by the controller.
//!
//! The controller never waits. Every suspension is expressed as a scheduled
//! task identified by a [`TaskToken`]; the host arms the matching browser
//! primitive and reports back with the same token. Tokens that no longer
//! match controller state are stale and are dropped, which is what makes
//! every task cancellable even when the host cannot cancel the underlying
//! callback (animation frames).

use core::time::Duration;

use crate::phase::ClassOp;

/// Identity of one scheduled frame callback or timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskToken(u64);

impl TaskToken {
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// What a frame callback is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    /// First frame after load; collapses Revealing into Idle.
    RevealFrame,
    /// Frame after the covering classes were applied; arms the timer.
    CoverFrame,
}

/// One command for the host to execute, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Set or clear classes. Each op is idempotent.
    ApplyClasses(Vec<ClassOp>),
    /// Call back `frame_ready(token)` on the next animation frame.
    RequestFrame { token: TaskToken, kind: TaskKind },
    /// Call back `timer_elapsed(token)` after `delay` without blocking.
    ArmTimer { token: TaskToken, delay: Duration },
    /// Clear a timer armed earlier.
    CancelTimer { token: TaskToken },
    /// Assign the browser location (full document load).
    Navigate { url: String },
    /// Dispatch a payload-less event on the document.
    DispatchEvent { name: String },
}

impl Effect {
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::ApplyClasses(_) => "apply_classes",
            Self::RequestFrame { .. } => "request_frame",
            Self::ArmTimer { .. } => "arm_timer",
            Self::CancelTimer { .. } => "cancel_timer",
            Self::Navigate { .. } => "navigate",
            Self::DispatchEvent { .. } => "dispatch_event",
        }
    }
}
