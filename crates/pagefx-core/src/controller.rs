#![forbid(unsafe_code)]

//! Page transition controller.
//!
//! Owns the single [`TransitionPhase`] for the document and drives it from
//! three kinds of input: boot/page-show lifecycle signals, document clicks,
//! and the frame/timer callbacks it asked the host to schedule.
//!
//! ```text
//! boot ──▶ Revealing ──frame──▶ Idle ──click(navigate)──▶ Leaving
//!                                 ▲                          │ frame: arm timer
//!                                 │                          │ timer: Navigate
//!                                 └──────── page_show ───────┘
//! ```
//!
//! # Invariants
//!
//! 1. At most one navigation is ever accepted per page instance until a
//!    page-show resets the guard. Later link clicks are swallowed with their
//!    default suppressed (drop policy, never queued).
//! 2. The covering classes are applied, and one frame is rendered, before the
//!    navigation timer is armed.
//! 3. With reduced motion the timer is armed with a zero delay, so navigation
//!    happens on the next tick, never synchronously inside the click.
//! 4. A page-show that restores from the session cache always ends in Idle
//!    with every managed class cleared, and cancels any armed timer.

use serde::Serialize;
use tracing::{debug, trace};

use crate::classify::{
    ClickSnapshot, Interception, LinkSnapshot, NavigationIntent, PageLocation, classify,
};
use crate::config::TransitionConfig;
use crate::effect::{Effect, TaskKind, TaskToken};
use crate::motion::MotionPreference;
use crate::phase::{ClassOp, ClassTarget, TransitionPhase, VisualState};

#[derive(Debug, Clone, PartialEq, Eq)]
enum PendingStage {
    AwaitingFrame(TaskToken),
    Armed(TaskToken),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingNavigation {
    url: String,
    stage: PendingStage,
}

/// Result of routing one click through the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickOutcome {
    pub intent: NavigationIntent,
    pub effects: Vec<Effect>,
}

impl ClickOutcome {
    /// Whether the host must call `preventDefault()` on the event.
    #[must_use]
    pub const fn prevents_default(&self) -> bool {
        self.intent.prevents_default()
    }
}

/// Serializable view of controller state for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControllerSnapshot {
    pub phase: TransitionPhase,
    pub pending_target: Option<String>,
    pub navigation_armed: bool,
    pub navigation_dispatched: bool,
    pub motion: MotionPreference,
}

impl ControllerSnapshot {
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_owned())
    }
}

/// Host-driven transition state machine.
#[derive(Debug, Clone)]
pub struct TransitionController {
    config: TransitionConfig,
    motion: MotionPreference,
    phase: TransitionPhase,
    reveal_frame: Option<TaskToken>,
    pending: Option<PendingNavigation>,
    navigation_dispatched: bool,
    next_token: u64,
}

impl TransitionController {
    /// Build an idle controller. Call [`Self::boot`] once the overlay is known to exist.
    #[must_use]
    pub fn new(config: TransitionConfig, motion: MotionPreference) -> Self {
        Self {
            config,
            motion,
            phase: TransitionPhase::Idle,
            reveal_frame: None,
            pending: None,
            navigation_dispatched: false,
            next_token: 1,
        }
    }

    #[must_use]
    pub const fn phase(&self) -> TransitionPhase {
        self.phase
    }

    #[must_use]
    pub const fn motion(&self) -> MotionPreference {
        self.motion
    }

    /// Whether a navigation has been accepted and not reset by a page-show.
    #[must_use]
    pub const fn in_flight(&self) -> bool {
        matches!(self.phase, TransitionPhase::Leaving)
    }

    #[must_use]
    pub fn snapshot(&self) -> ControllerSnapshot {
        ControllerSnapshot {
            phase: self.phase,
            pending_target: self.pending.as_ref().map(|pending| pending.url.clone()),
            navigation_armed: matches!(
                self.pending,
                Some(PendingNavigation {
                    stage: PendingStage::Armed(_),
                    ..
                })
            ),
            navigation_dispatched: self.navigation_dispatched,
            motion: self.motion,
        }
    }

    /// Script initialization: clear any stale leaving state, then reveal.
    pub fn boot(&mut self) -> Vec<Effect> {
        debug!(
            reduced_motion = self.motion.reduced,
            delay_ms = self.motion.duration_ms(),
            reveal = ?self.config.reveal,
            "page transitions armed"
        );
        let mut effects = vec![self.clear_leaving_effect()];
        effects.extend(self.reveal_on_load());
        effects
    }

    /// Show the page content. Repeated calls before the reveal frame fires
    /// schedule nothing new and converge on the same uncovered state.
    pub fn reveal_on_load(&mut self) -> Vec<Effect> {
        if self.in_flight() {
            trace!("reveal requested while leaving; ignored");
            return Vec::new();
        }
        self.set_phase(TransitionPhase::Revealing);
        let mut effects = vec![self.visual_effect()];
        if self.reveal_frame.is_none() {
            let token = self.next_token();
            self.reveal_frame = Some(token);
            effects.push(Effect::RequestFrame {
                token,
                kind: TaskKind::RevealFrame,
            });
        }
        effects
    }

    /// Classify a click and, when it is an accepted same-origin navigation,
    /// start the transition.
    pub fn on_click(
        &mut self,
        link: Option<&LinkSnapshot>,
        click: &ClickSnapshot,
        location: &PageLocation,
    ) -> ClickOutcome {
        let intent = if self.in_flight() && link.is_some() {
            NavigationIntent::Intercepted {
                interception: Interception::InFlight,
            }
        } else {
            classify(link, click, location)
        };

        let reason = match &intent {
            NavigationIntent::Ignored { reason } => Some(reason.as_str()),
            _ => None,
        };
        debug!(
            intent = intent.label(),
            reason,
            detail = ?intent,
            phase = self.phase.as_str(),
            "click classified"
        );

        let effects = match intent.navigation_target() {
            Some(url) => {
                let url = url.to_owned();
                self.cover_then_navigate(url)
            }
            None => Vec::new(),
        };
        ClickOutcome { intent, effects }
    }

    /// Mark content as leaving, cover the page, then navigate after the
    /// transition duration. The timer is armed on the frame after the
    /// classes are applied.
    pub fn cover_then_navigate(&mut self, url: impl Into<String>) -> Vec<Effect> {
        let url = url.into();
        if self.in_flight() {
            debug!(%url, "navigation already in flight; dropped");
            return Vec::new();
        }
        self.reveal_frame = None;
        self.set_phase(TransitionPhase::Leaving);
        let token = self.next_token();
        self.pending = Some(PendingNavigation {
            url,
            stage: PendingStage::AwaitingFrame(token),
        });
        vec![
            self.visual_effect(),
            Effect::RequestFrame {
                token,
                kind: TaskKind::CoverFrame,
            },
        ]
    }

    /// Animation frame callback for a token handed out earlier.
    pub fn frame_ready(&mut self, token: TaskToken) -> Vec<Effect> {
        if self.reveal_frame == Some(token) {
            self.reveal_frame = None;
            self.set_phase(TransitionPhase::Idle);
            return vec![
                self.visual_effect(),
                Effect::DispatchEvent {
                    name: self.config.complete_event.clone(),
                },
            ];
        }

        let awaiting = matches!(
            &self.pending,
            Some(PendingNavigation {
                stage: PendingStage::AwaitingFrame(pending),
                ..
            }) if *pending == token
        );
        if !awaiting {
            trace!(token = token.get(), "stale frame callback dropped");
            return Vec::new();
        }

        let timer = self.next_token();
        if let Some(pending) = self.pending.as_mut() {
            pending.stage = PendingStage::Armed(timer);
        }
        let delay = self.motion.navigation_delay();
        debug!(
            token = timer.get(),
            delay_ms = self.motion.duration_ms(),
            "navigation timer armed"
        );
        vec![Effect::ArmTimer {
            token: timer,
            delay,
        }]
    }

    /// Timer callback for a token handed out earlier.
    pub fn timer_elapsed(&mut self, token: TaskToken) -> Vec<Effect> {
        let armed = matches!(
            &self.pending,
            Some(PendingNavigation {
                stage: PendingStage::Armed(pending),
                ..
            }) if *pending == token
        );
        if !armed {
            trace!(token = token.get(), "stale timer callback dropped");
            return Vec::new();
        }
        let Some(pending) = self.pending.take() else {
            return Vec::new();
        };
        self.navigation_dispatched = true;
        debug!(url = %pending.url, "navigating");
        vec![Effect::Navigate { url: pending.url }]
    }

    /// Page became visible (fresh load or session-cache restoration).
    pub fn page_show(&mut self, persisted: bool) -> Vec<Effect> {
        let mut effects = Vec::new();
        if let Some(PendingNavigation {
            stage: PendingStage::Armed(token),
            url,
        }) = self.pending.take()
        {
            debug!(%url, "pending navigation cancelled by page show");
            effects.push(Effect::CancelTimer { token });
        }
        self.navigation_dispatched = false;

        if persisted || self.in_flight() {
            debug!(persisted, from = self.phase.as_str(), "restoring idle state");
            self.reveal_frame = None;
            self.set_phase(TransitionPhase::Idle);
            effects.push(self.visual_effect());
        } else {
            effects.push(self.clear_leaving_effect());
        }
        effects
    }

    /// Abandon an accepted navigation whose timer has not fired yet.
    pub fn cancel_pending(&mut self) -> Vec<Effect> {
        let Some(pending) = self.pending.take() else {
            return Vec::new();
        };
        debug!(url = %pending.url, "pending navigation cancelled");
        let mut effects = Vec::new();
        if let PendingStage::Armed(token) = pending.stage {
            effects.push(Effect::CancelTimer { token });
        }
        self.set_phase(TransitionPhase::Idle);
        effects.push(self.visual_effect());
        effects
    }

    fn next_token(&mut self) -> TaskToken {
        let token = TaskToken::new(self.next_token);
        self.next_token = self.next_token.saturating_add(1);
        token
    }

    fn set_phase(&mut self, next: TransitionPhase) {
        if self.phase != next {
            debug!(from = self.phase.as_str(), to = next.as_str(), "phase transition");
        }
        self.phase = next;
    }

    fn visual_effect(&self) -> Effect {
        Effect::ApplyClasses(
            VisualState::for_phase(self.phase, self.config.reveal).class_ops(&self.config),
        )
    }

    /// Leaving-class-only update, for lifecycle signals that do not change phase.
    fn clear_leaving_effect(&self) -> Effect {
        Effect::ApplyClasses(vec![ClassOp {
            target: ClassTarget::Body,
            class: self.config.leaving_class.clone(),
            present: false,
        }])
    }
}
