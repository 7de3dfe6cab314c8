#![forbid(unsafe_code)]

//! Effect execution against a DOM-shaped host.
//!
//! [`DomHost`] is the seam between the controller and the browser: the wasm
//! module implements it with `web-sys`, tests implement it in memory.
//! [`drive`] executes effects in order and keeps navigation reachable when
//! the host cannot schedule something: a frame or timer that fails to arm is
//! run immediately instead, so a click that suppressed the default action
//! still ends in a navigation.

use core::time::Duration;
use std::collections::VecDeque;

use pagefx_core::{ClassTarget, Effect, TaskToken, TransitionController};
use tracing::{trace, warn};

/// DOM operation failure reported by a host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    /// A browser API threw.
    Dom(String),
    /// A required object was not available.
    Missing(&'static str),
}

impl core::fmt::Display for HostError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Dom(msg) => write!(f, "dom error: {msg}"),
            Self::Missing(what) => write!(f, "missing: {what}"),
        }
    }
}

impl std::error::Error for HostError {}

/// Browser primitives the controller's effects map onto.
pub trait DomHost {
    fn set_class(&mut self, target: ClassTarget, class: &str, present: bool)
    -> Result<(), HostError>;

    /// Schedule `frame_ready(token)` for the next animation frame.
    fn request_frame(&mut self, token: TaskToken) -> Result<(), HostError>;

    /// Schedule `timer_elapsed(token)` after `delay_ms`.
    fn arm_timer(&mut self, token: TaskToken, delay_ms: i32) -> Result<(), HostError>;

    fn cancel_timer(&mut self, token: TaskToken);

    fn navigate(&mut self, url: &str) -> Result<(), HostError>;

    fn dispatch(&mut self, name: &str) -> Result<(), HostError>;
}

/// Clamp a delay to the `setTimeout` argument range.
#[must_use]
pub fn timeout_ms(delay: Duration) -> i32 {
    i32::try_from(delay.as_millis()).unwrap_or(i32::MAX)
}

/// Execute `effects` in order against `host`.
pub fn drive<H: DomHost>(host: &mut H, controller: &mut TransitionController, effects: Vec<Effect>) {
    let mut queue: VecDeque<Effect> = effects.into();
    while let Some(effect) = queue.pop_front() {
        trace!(effect = effect.label(), "executing");
        match effect {
            Effect::ApplyClasses(ops) => {
                for op in ops {
                    if let Err(err) = host.set_class(op.target, &op.class, op.present) {
                        warn!(class = %op.class, target = ?op.target, %err, "class update failed");
                    }
                }
            }
            Effect::RequestFrame { token, kind } => {
                if let Err(err) = host.request_frame(token) {
                    warn!(token = token.get(), ?kind, %err, "frame unavailable; running now");
                    queue.extend(controller.frame_ready(token));
                }
            }
            Effect::ArmTimer { token, delay } => {
                if let Err(err) = host.arm_timer(token, timeout_ms(delay)) {
                    warn!(token = token.get(), %err, "timer unavailable; firing now");
                    queue.extend(controller.timer_elapsed(token));
                }
            }
            Effect::CancelTimer { token } => host.cancel_timer(token),
            Effect::Navigate { url } => {
                if let Err(err) = host.navigate(&url) {
                    warn!(%url, %err, "location assignment failed");
                }
            }
            Effect::DispatchEvent { name } => {
                if let Err(err) = host.dispatch(&name) {
                    warn!(event = %name, %err, "event dispatch failed");
                }
            }
        }
    }
}
