#![forbid(unsafe_code)]

//! Markup/style contract shared between the controller and the page.
//!
//! Every identifier the host touches (overlay id, class names, the CSS custom
//! properties that carry durations, the completion event name) lives here so
//! a site can rename them without recompiling. Missing JSON fields take the
//! defaults below.

use serde::{Deserialize, Serialize};

/// Fallback navigation delay when the stylesheet does not publish one.
pub const DEFAULT_FALLBACK_DURATION_MS: u32 = 600;

const MAX_FALLBACK_DURATION_MS: u32 = 10_000;

/// How the overlay behaves on first load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevealMode {
    /// The overlay is rendered covering the page and slides away on the first frame.
    #[default]
    Uncover,
    /// The overlay starts off-screen through static styling; nothing is applied at load.
    Static,
}

/// Configuration error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The JSON document could not be parsed.
    InvalidJson(String),
    /// A required identifier was empty or contained whitespace.
    InvalidIdentifier { field: &'static str },
    /// The fallback duration is outside the accepted range.
    FallbackOutOfRange { value: u32 },
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidJson(msg) => write!(f, "invalid transition config json: {msg}"),
            Self::InvalidIdentifier { field } => {
                write!(f, "{field} must be a non-empty token without whitespace")
            }
            Self::FallbackOutOfRange { value } => write!(
                f,
                "fallback_duration_ms must be <= {MAX_FALLBACK_DURATION_MS}, got {value}"
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Page transition configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionConfig {
    /// Element id of the full-viewport overlay.
    pub overlay_id: String,
    /// Overlay class while it covers the viewport.
    pub covering_class: String,
    /// Body class while content fades out before navigation.
    pub leaving_class: String,
    /// Body class while content is hidden during the initial reveal.
    pub loading_class: String,
    /// Document-level custom property holding the overlay duration (CSS time).
    pub duration_property: String,
    /// Optional custom property holding the content fade duration.
    pub fade_duration_property: Option<String>,
    /// Delay used when the duration property is absent or unparsable.
    pub fallback_duration_ms: u32,
    /// Initial overlay behavior.
    pub reveal: RevealMode,
    /// Event dispatched on the document once the reveal completes.
    pub complete_event: String,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            overlay_id: "page-transition".to_owned(),
            covering_class: "is-covering".to_owned(),
            leaving_class: "is-leaving".to_owned(),
            loading_class: "is-loading".to_owned(),
            duration_property: "--page-transition-duration".to_owned(),
            fade_duration_property: Some("--page-transition-fade-duration".to_owned()),
            fallback_duration_ms: DEFAULT_FALLBACK_DURATION_MS,
            reveal: RevealMode::Uncover,
            complete_event: "page-transition-complete".to_owned(),
        }
    }
}

impl TransitionConfig {
    /// Parse and validate a JSON document. Absent fields keep their defaults.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(raw).map_err(|err| ConfigError::InvalidJson(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check identifiers and ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let tokens: [(&'static str, &str); 6] = [
            ("overlay_id", &self.overlay_id),
            ("covering_class", &self.covering_class),
            ("leaving_class", &self.leaving_class),
            ("loading_class", &self.loading_class),
            ("duration_property", &self.duration_property),
            ("complete_event", &self.complete_event),
        ];
        for (field, value) in tokens {
            if !is_token(value) {
                return Err(ConfigError::InvalidIdentifier { field });
            }
        }
        if let Some(fade) = &self.fade_duration_property
            && !is_token(fade)
        {
            return Err(ConfigError::InvalidIdentifier {
                field: "fade_duration_property",
            });
        }
        if self.fallback_duration_ms > MAX_FALLBACK_DURATION_MS {
            return Err(ConfigError::FallbackOutOfRange {
                value: self.fallback_duration_ms,
            });
        }
        Ok(())
    }
}

fn is_token(value: &str) -> bool {
    !value.is_empty() && !value.chars().any(char::is_whitespace)
}
