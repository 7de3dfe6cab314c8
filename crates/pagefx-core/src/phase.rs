#![forbid(unsafe_code)]

//! Transition phase and its visual projection.
//!
//! The document's class list is derived state: [`VisualState::for_phase`]
//! maps the single owned [`TransitionPhase`] to the classes that must be
//! present, and [`VisualState::class_ops`] turns that into an idempotent
//! add/remove list for the host. Applying the same ops twice is a no-op.
//!
//! # Invariants
//!
//! 1. Exactly one phase is active.
//! 2. The leaving class is present only in [`TransitionPhase::Leaving`].
//! 3. Every op list names every managed class, so applying it overwrites
//!    whatever stale classes a cached render carried.

use serde::Serialize;

use crate::config::{RevealMode, TransitionConfig};

/// Current animation state of the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionPhase {
    /// Content visible, overlay off-screen, clicks may start a transition.
    Idle,
    /// First frame after load: content hidden, overlay about to uncover.
    Revealing,
    /// Content fading out, overlay covering, navigation pending.
    Leaving,
}

impl TransitionPhase {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Revealing => "revealing",
            Self::Leaving => "leaving",
        }
    }
}

/// Element a class operation applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassTarget {
    Body,
    Overlay,
}

/// One idempotent class-list mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassOp {
    pub target: ClassTarget,
    pub class: String,
    pub present: bool,
}

/// Classes required by a phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VisualState {
    pub body_loading: bool,
    pub body_leaving: bool,
    pub overlay_covering: bool,
}

impl VisualState {
    /// Project a phase onto the managed classes.
    #[must_use]
    pub const fn for_phase(phase: TransitionPhase, reveal: RevealMode) -> Self {
        match phase {
            TransitionPhase::Idle => Self {
                body_loading: false,
                body_leaving: false,
                overlay_covering: false,
            },
            TransitionPhase::Revealing => match reveal {
                RevealMode::Uncover => Self {
                    body_loading: true,
                    body_leaving: false,
                    overlay_covering: true,
                },
                RevealMode::Static => Self {
                    body_loading: false,
                    body_leaving: false,
                    overlay_covering: false,
                },
            },
            TransitionPhase::Leaving => Self {
                body_loading: false,
                body_leaving: true,
                overlay_covering: true,
            },
        }
    }

    /// Full op list for this state.
    #[must_use]
    pub fn class_ops(&self, config: &TransitionConfig) -> Vec<ClassOp> {
        vec![
            ClassOp {
                target: ClassTarget::Body,
                class: config.loading_class.clone(),
                present: self.body_loading,
            },
            ClassOp {
                target: ClassTarget::Body,
                class: config.leaving_class.clone(),
                present: self.body_leaving,
            },
            ClassOp {
                target: ClassTarget::Overlay,
                class: config.covering_class.clone(),
                present: self.overlay_covering,
            },
        ]
    }
}
