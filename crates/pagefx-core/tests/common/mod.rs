//! In-memory host that executes controller effects the way the browser
//! binding does: frames run on the next `pump_frame`, timers fire when the
//! fake clock passes their deadline.

#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use pagefx_core::{
    ClassTarget, ClickSnapshot, Effect, LinkSnapshot, MotionPreference, PageLocation, TaskToken,
    TransitionConfig, TransitionController,
};

pub struct FakeHost {
    pub controller: TransitionController,
    pub location: PageLocation,
    pub body: BTreeSet<String>,
    pub overlay: BTreeSet<String>,
    pub frames: Vec<TaskToken>,
    pub timers: BTreeMap<TaskToken, Duration>,
    pub now: Duration,
    pub navigations: Vec<String>,
    pub events: Vec<String>,
    pub prevented: usize,
}

impl FakeHost {
    pub fn new(motion: MotionPreference, href: &str) -> Self {
        Self::with_config(TransitionConfig::default(), motion, href)
    }

    pub fn with_config(config: TransitionConfig, motion: MotionPreference, href: &str) -> Self {
        Self {
            controller: TransitionController::new(config, motion),
            location: PageLocation::parse(href).expect("fake location parses"),
            body: BTreeSet::new(),
            overlay: BTreeSet::new(),
            frames: Vec::new(),
            timers: BTreeMap::new(),
            now: Duration::ZERO,
            navigations: Vec::new(),
            events: Vec::new(),
            prevented: 0,
        }
    }

    pub fn boot(&mut self) {
        let effects = self.controller.boot();
        self.run(effects);
    }

    pub fn click(&mut self, href: &str) {
        self.click_link(Some(LinkSnapshot::href(href)), ClickSnapshot::primary());
    }

    pub fn click_link(&mut self, link: Option<LinkSnapshot>, click: ClickSnapshot) {
        let outcome = self
            .controller
            .on_click(link.as_ref(), &click, &self.location);
        if outcome.prevents_default() {
            self.prevented += 1;
        }
        self.run(outcome.effects);
    }

    pub fn page_show(&mut self, persisted: bool) {
        let effects = self.controller.page_show(persisted);
        self.run(effects);
    }

    /// Run every frame callback queued so far (one rendering opportunity).
    pub fn pump_frame(&mut self) {
        let frames = std::mem::take(&mut self.frames);
        for token in frames {
            let effects = self.controller.frame_ready(token);
            self.run(effects);
        }
    }

    /// Advance the fake clock and fire due timers in deadline order.
    pub fn advance(&mut self, dt: Duration) {
        self.now += dt;
        loop {
            let due = self
                .timers
                .iter()
                .filter(|(_, deadline)| **deadline <= self.now)
                .min_by_key(|(_, deadline)| **deadline)
                .map(|(token, _)| *token);
            let Some(token) = due else { break };
            self.timers.remove(&token);
            let effects = self.controller.timer_elapsed(token);
            self.run(effects);
        }
    }

    pub fn has_body(&self, class: &str) -> bool {
        self.body.contains(class)
    }

    pub fn has_overlay(&self, class: &str) -> bool {
        self.overlay.contains(class)
    }

    pub fn run(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::ApplyClasses(ops) => {
                    for op in ops {
                        let set = match op.target {
                            ClassTarget::Body => &mut self.body,
                            ClassTarget::Overlay => &mut self.overlay,
                        };
                        if op.present {
                            set.insert(op.class);
                        } else {
                            set.remove(&op.class);
                        }
                    }
                }
                Effect::RequestFrame { token, .. } => self.frames.push(token),
                Effect::ArmTimer { token, delay } => {
                    self.timers.insert(token, self.now + delay);
                }
                Effect::CancelTimer { token } => {
                    self.timers.remove(&token);
                }
                Effect::Navigate { url } => self.navigations.push(url),
                Effect::DispatchEvent { name } => self.events.push(name),
            }
        }
    }
}

pub fn animated_600() -> MotionPreference {
    MotionPreference::animated(Duration::from_millis(600), Duration::ZERO)
}
