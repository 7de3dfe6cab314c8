//! End-to-end transition scenarios against an in-memory host.

mod common;

use std::time::Duration;

use common::{FakeHost, animated_600};
use pagefx_core::{MotionPreference, RevealMode, TransitionConfig, TransitionPhase};
use pretty_assertions::assert_eq;

const HOME: &str = "https://mediabrilliance.io/index.html";

fn booted(motion: MotionPreference) -> FakeHost {
    let mut host = FakeHost::new(motion, HOME);
    host.boot();
    host.pump_frame();
    host
}

#[test]
fn initial_load_reveals_without_waiting_for_a_timer() {
    let mut host = FakeHost::new(animated_600(), HOME);
    host.boot();
    assert!(host.has_overlay("is-covering"));
    assert!(host.has_body("is-loading"));
    assert!(host.timers.is_empty());

    host.pump_frame();
    assert!(!host.has_overlay("is-covering"));
    assert!(!host.has_body("is-loading"));
    assert_eq!(host.controller.phase(), TransitionPhase::Idle);
    assert_eq!(host.events, vec!["page-transition-complete".to_owned()]);
}

#[test]
fn static_reveal_never_covers_at_load() {
    let config = TransitionConfig {
        reveal: RevealMode::Static,
        ..TransitionConfig::default()
    };
    let mut host = FakeHost::with_config(config, animated_600(), HOME);
    host.boot();
    assert!(host.overlay.is_empty());
    assert!(host.body.is_empty());
    host.pump_frame();
    assert_eq!(host.events.len(), 1);
}

#[test]
fn boot_clears_stale_leaving_class() {
    let mut host = FakeHost::new(animated_600(), HOME);
    host.body.insert("is-leaving".to_owned());
    host.boot();
    assert!(!host.has_body("is-leaving"));
}

#[test]
fn contact_link_covers_then_navigates_after_duration() {
    let mut host = booted(animated_600());
    host.click("/pages/contact.html");

    assert_eq!(host.prevented, 1);
    assert!(host.has_body("is-leaving"));
    assert!(host.has_overlay("is-covering"));
    assert!(host.navigations.is_empty());

    host.pump_frame();
    host.advance(Duration::from_millis(599));
    assert!(host.navigations.is_empty());
    host.advance(Duration::from_millis(1));
    assert_eq!(
        host.navigations,
        vec!["https://mediabrilliance.io/pages/contact.html".to_owned()]
    );
}

#[test]
fn mailto_link_is_left_alone() {
    let mut host = booted(animated_600());
    let body_before = host.body.clone();
    let overlay_before = host.overlay.clone();

    host.click("mailto:dez@mediabrilliance.io");

    assert_eq!(host.prevented, 0);
    assert_eq!(host.body, body_before);
    assert_eq!(host.overlay, overlay_before);
    assert!(host.frames.is_empty());
}

#[test]
fn self_link_is_swallowed_silently() {
    let mut host = booted(animated_600());
    host.click("/index.html");
    host.click("/index.html?lang=fr");
    host.click("index.html#team");

    assert_eq!(host.prevented, 3);
    assert!(host.body.is_empty());
    assert!(host.overlay.is_empty());
    host.pump_frame();
    host.advance(Duration::from_secs(5));
    assert!(host.navigations.is_empty());
}

#[test]
fn external_link_gets_no_overlay() {
    let mut host = booted(animated_600());
    host.click("https://other.example/");
    assert_eq!(host.prevented, 0);
    assert!(host.overlay.is_empty());
    assert_eq!(host.controller.phase(), TransitionPhase::Idle);
}

#[test]
fn reduced_motion_navigates_on_next_tick() {
    let mut host = booted(MotionPreference::reduced());
    host.click("/services.html");
    assert!(host.navigations.is_empty(), "never synchronous in the click");

    host.pump_frame();
    host.advance(Duration::ZERO);
    assert_eq!(
        host.navigations,
        vec!["https://mediabrilliance.io/services.html".to_owned()]
    );
}

#[test]
fn rapid_second_click_is_dropped() {
    let mut host = booted(animated_600());
    host.click("/services.html");
    host.pump_frame();
    host.advance(Duration::from_millis(100));
    host.click("/portfolio.html");
    assert_eq!(host.prevented, 2);
    host.pump_frame();
    host.advance(Duration::from_secs(2));

    assert_eq!(
        host.navigations,
        vec!["https://mediabrilliance.io/services.html".to_owned()]
    );
}

#[test]
fn restored_page_is_idle_and_does_not_navigate() {
    let mut host = booted(animated_600());
    host.click("/services.html");
    host.pump_frame();
    host.advance(Duration::from_millis(300));

    host.page_show(true);
    assert!(host.body.is_empty());
    assert!(host.overlay.is_empty());
    assert_eq!(host.controller.phase(), TransitionPhase::Idle);

    host.advance(Duration::from_secs(2));
    assert!(host.navigations.is_empty());

    host.click("/portfolio.html");
    host.pump_frame();
    host.advance(Duration::from_millis(600));
    assert_eq!(
        host.navigations,
        vec!["https://mediabrilliance.io/portfolio.html".to_owned()]
    );
}

#[test]
fn restoration_after_navigation_resets_guard() {
    let mut host = booted(animated_600());
    host.click("/services.html");
    host.pump_frame();
    host.advance(Duration::from_millis(600));
    assert_eq!(host.navigations.len(), 1);

    // Back button restores this document from the session cache.
    host.page_show(true);
    assert!(!host.has_overlay("is-covering"));
    assert!(!host.has_body("is-leaving"));
    assert!(!host.controller.in_flight());
}

#[test]
fn restoration_before_cover_frame_drops_the_frame() {
    let mut host = booted(animated_600());
    host.click("/services.html");
    host.page_show(true);
    host.pump_frame();
    host.advance(Duration::from_secs(2));
    assert!(host.navigations.is_empty());
    assert!(host.timers.is_empty());
}
