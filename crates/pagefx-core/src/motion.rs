#![forbid(unsafe_code)]

//! Reduced-motion policy and transition durations.
//!
//! The preference is resolved once when the controller is built. A live
//! change of the OS setting mid-session is not observed.
//!
//! Durations come from CSS custom properties so the wait before navigation
//! stays in sync with the stylesheet. Accepted forms are `0.6s`, `600ms`
//! and a bare number of seconds (`0.6`). Anything else falls back.

use core::time::Duration;

use serde::Serialize;

use crate::config::TransitionConfig;

/// Environment the preference is read from.
///
/// Implemented by the browser host; tests use closures through
/// [`MotionPreference::resolve_with`].
pub trait MotionProbe {
    /// Result of `prefers-reduced-motion: reduce`, `None` when unsupported.
    fn prefers_reduced_motion(&self) -> Option<bool>;

    /// Value of a document-level custom property, `None` when unset.
    fn custom_property(&self, name: &str) -> Option<String>;
}

/// Effective animation speed for this page instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MotionPreference {
    /// The user asked for reduced motion; every wait collapses to zero.
    pub reduced: bool,
    /// Overlay cover/uncover duration.
    #[serde(serialize_with = "serialize_ms")]
    pub overlay: Duration,
    /// Content fade duration.
    #[serde(serialize_with = "serialize_ms")]
    pub fade: Duration,
}

impl MotionPreference {
    /// Resolve the preference once from the host environment.
    #[must_use]
    pub fn resolve(probe: &impl MotionProbe, config: &TransitionConfig) -> Self {
        Self::resolve_with(
            probe.prefers_reduced_motion(),
            |name| probe.custom_property(name),
            config,
        )
    }

    /// Resolve the preference from explicit probe results.
    ///
    /// `reduced` is the result of the `prefers-reduced-motion: reduce` media
    /// query, or `None` when the runtime has no such query. `lookup` reads a
    /// document-level custom property by name.
    #[must_use]
    pub fn resolve_with<F>(reduced: Option<bool>, lookup: F, config: &TransitionConfig) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if reduced.unwrap_or(false) {
            return Self::reduced();
        }

        let fallback = Duration::from_millis(u64::from(config.fallback_duration_ms));
        let overlay = match lookup(config.duration_property.as_str()) {
            Some(raw) => parse_css_time(&raw).unwrap_or_else(|| {
                tracing::warn!(
                    property = %config.duration_property,
                    value = %raw,
                    fallback_ms = config.fallback_duration_ms,
                    "unparsable transition duration; using fallback"
                );
                fallback
            }),
            None => fallback,
        };
        let fade = config
            .fade_duration_property
            .as_deref()
            .and_then(&lookup)
            .and_then(|raw| parse_css_time(&raw))
            .unwrap_or(Duration::ZERO);

        Self {
            reduced: false,
            overlay,
            fade,
        }
    }

    /// Preference with all motion disabled.
    #[must_use]
    pub const fn reduced() -> Self {
        Self {
            reduced: true,
            overlay: Duration::ZERO,
            fade: Duration::ZERO,
        }
    }

    /// Animated preference with explicit durations.
    #[must_use]
    pub const fn animated(overlay: Duration, fade: Duration) -> Self {
        Self {
            reduced: false,
            overlay,
            fade,
        }
    }

    /// Whether reduced motion is in effect.
    #[must_use]
    pub const fn enabled(&self) -> bool {
        self.reduced
    }

    /// Wait between covering the page and assigning the location.
    ///
    /// Both the overlay slide and the content fade must finish, so this is
    /// the longer of the two.
    #[must_use]
    pub fn navigation_delay(&self) -> Duration {
        if self.reduced {
            return Duration::ZERO;
        }
        self.overlay.max(self.fade)
    }

    /// [`Self::navigation_delay`] in whole milliseconds, as timers expect.
    #[must_use]
    pub fn duration_ms(&self) -> u32 {
        u32::try_from(self.navigation_delay().as_millis()).unwrap_or(u32::MAX)
    }
}

fn serialize_ms<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
}

/// Parse a CSS `<time>` value (or a bare number of seconds).
#[must_use]
pub fn parse_css_time(raw: &str) -> Option<Duration> {
    let value = raw.trim().to_ascii_lowercase();
    let (number, scale_ms) = if let Some(ms) = value.strip_suffix("ms") {
        (ms, 1.0)
    } else if let Some(secs) = value.strip_suffix('s') {
        (secs, 1000.0)
    } else {
        (value.as_str(), 1000.0)
    };
    let parsed: f64 = number.trim().parse().ok()?;
    let millis = parsed * scale_ms;
    if !millis.is_finite() || millis < 0.0 || millis > f64::from(u32::MAX) {
        return None;
    }
    Some(Duration::from_millis(millis.round() as u64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn css_time_forms() {
        assert_eq!(parse_css_time("0.6s"), Some(Duration::from_millis(600)));
        assert_eq!(parse_css_time(" 750ms "), Some(Duration::from_millis(750)));
        assert_eq!(parse_css_time("0.35"), Some(Duration::from_millis(350)));
        assert_eq!(parse_css_time("1S"), Some(Duration::from_secs(1)));
        assert_eq!(parse_css_time("0"), Some(Duration::ZERO));
    }

    #[test]
    fn css_time_rejects_garbage() {
        assert_eq!(parse_css_time(""), None);
        assert_eq!(parse_css_time("fast"), None);
        assert_eq!(parse_css_time("-1s"), None);
        assert_eq!(parse_css_time("NaNs"), None);
        assert_eq!(parse_css_time("infms"), None);
        assert_eq!(parse_css_time("1e30s"), None);
    }

    #[test]
    fn reduced_motion_zeroes_everything() {
        let config = TransitionConfig::default();
        let lookup = lookup_from(&[("--page-transition-duration", "2s")]);
        let pref = MotionPreference::resolve_with(Some(true), lookup, &config);
        assert!(pref.enabled());
        assert_eq!(pref.duration_ms(), 0);
        assert_eq!(pref.navigation_delay(), Duration::ZERO);
    }

    #[test]
    fn missing_query_is_not_reduced() {
        let config = TransitionConfig::default();
        let pref = MotionPreference::resolve_with(None, |_| None, &config);
        assert!(!pref.enabled());
        assert_eq!(pref.duration_ms(), 600);
    }

    #[test]
    fn unparsable_duration_uses_fallback() {
        let config = TransitionConfig {
            fallback_duration_ms: 450,
            ..TransitionConfig::default()
        };
        let lookup = lookup_from(&[("--page-transition-duration", "soon")]);
        let pref = MotionPreference::resolve_with(Some(false), lookup, &config);
        assert_eq!(pref.overlay, Duration::from_millis(450));
    }

    #[test]
    fn delay_is_longest_of_overlay_and_fade() {
        let config = TransitionConfig::default();
        let lookup = lookup_from(&[
            ("--page-transition-duration", "0.75s"),
            ("--page-transition-fade-duration", "350ms"),
        ]);
        let pref = MotionPreference::resolve_with(Some(false), lookup, &config);
        assert_eq!(pref.duration_ms(), 750);

        let slow_fade = MotionPreference::animated(
            Duration::from_millis(300),
            Duration::from_millis(900),
        );
        assert_eq!(slow_fade.duration_ms(), 900);
    }

    #[test]
    fn fade_ignored_when_not_configured() {
        let config = TransitionConfig {
            fade_duration_property: None,
            ..TransitionConfig::default()
        };
        let lookup = lookup_from(&[("--page-transition-fade-duration", "5s")]);
        let pref = MotionPreference::resolve_with(Some(false), lookup, &config);
        assert_eq!(pref.fade, Duration::ZERO);
        assert_eq!(pref.duration_ms(), 600);
    }

    struct FixedProbe {
        reduced: Option<bool>,
        duration: Option<&'static str>,
    }

    impl MotionProbe for FixedProbe {
        fn prefers_reduced_motion(&self) -> Option<bool> {
            self.reduced
        }

        fn custom_property(&self, name: &str) -> Option<String> {
            (name == "--page-transition-duration")
                .then_some(self.duration)
                .flatten()
                .map(str::to_owned)
        }
    }

    #[test]
    fn resolve_reads_probe() {
        let config = TransitionConfig::default();
        let probe = FixedProbe {
            reduced: Some(false),
            duration: Some("0.9s"),
        };
        assert_eq!(MotionPreference::resolve(&probe, &config).duration_ms(), 900);

        let reduced = FixedProbe {
            reduced: Some(true),
            duration: Some("0.9s"),
        };
        assert_eq!(
            MotionPreference::resolve(&reduced, &config),
            MotionPreference::reduced()
        );
    }

    #[test]
    fn serializes_durations_as_millis() {
        let pref = MotionPreference::animated(Duration::from_millis(600), Duration::ZERO);
        let json = serde_json::to_string(&pref).expect("serialize");
        assert_eq!(json, r#"{"reduced":false,"overlay":600,"fade":0}"#);
    }
}
