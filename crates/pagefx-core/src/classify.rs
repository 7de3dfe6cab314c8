#![forbid(unsafe_code)]

//! Click classification for document-level link interception.
//!
//! [`classify`] is a pure function of the clicked link, the click itself and
//! the current page location. Rules are evaluated in order and the first
//! match wins:
//!
//! 1. no anchor under the click target: ignored
//! 2. missing href or `#fragment` href: ignored
//! 3. `mailto:`/`tel:`, non-self target, or `download`: ignored
//! 4. modifier keys or non-primary button: ignored
//! 5. different origin: external (browser navigates natively)
//! 6. same path as the current page (any query or fragment): self link,
//!    default suppressed, no navigation
//! 7. otherwise: intercepted, navigate through the transition
//!
//! The in-flight guard is not a classification rule; it is applied by
//! [`crate::TransitionController`], which swallows every link click while a
//! transition is running.

use bitflags::bitflags;
use serde::Serialize;
use url::Url;

bitflags! {
    /// Modifier keys held during a click.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0001;
        const ALT   = 0b0010;
        const CTRL  = 0b0100;
        const META  = 0b1000;
    }
}

/// Pointer button reported by the click (`MouseEvent.button`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerButton {
    Primary,
    Auxiliary,
    Secondary,
    Other(i16),
}

impl PointerButton {
    #[must_use]
    pub const fn from_dom(button: i16) -> Self {
        match button {
            0 => Self::Primary,
            1 => Self::Auxiliary,
            2 => Self::Secondary,
            other => Self::Other(other),
        }
    }
}

/// The click as seen by the document listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClickSnapshot {
    pub button: PointerButton,
    pub modifiers: Modifiers,
}

impl ClickSnapshot {
    /// Unmodified primary-button click.
    #[must_use]
    pub const fn primary() -> Self {
        Self {
            button: PointerButton::Primary,
            modifiers: Modifiers::empty(),
        }
    }
}

/// Attributes of the nearest anchor ancestor of the click target.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LinkSnapshot {
    /// Raw `href` attribute, as authored.
    pub href: Option<String>,
    /// Raw `target` attribute.
    pub target: Option<String>,
    /// Whether the `download` attribute is present.
    pub download: bool,
}

impl LinkSnapshot {
    /// Anchor with only an href.
    #[must_use]
    pub fn href(href: impl Into<String>) -> Self {
        Self {
            href: Some(href.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    #[must_use]
    pub fn with_download(mut self) -> Self {
        self.download = true;
        self
    }
}

/// The current document location and the base URL links resolve against.
///
/// The two differ when the document carries a `<base href>`: hrefs resolve
/// against the base, while origin and self-link checks use the location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLocation {
    url: Url,
    base: Url,
}

impl PageLocation {
    /// Parse `location.href`; the base URL is the location itself.
    pub fn parse(href: &str) -> Result<Self, url::ParseError> {
        let url = Url::parse(href)?;
        Ok(Self {
            base: url.clone(),
            url,
        })
    }

    /// Replace the base URL with `document.baseURI`.
    pub fn with_base(mut self, base: &str) -> Result<Self, url::ParseError> {
        self.base = Url::parse(base)?;
        Ok(self)
    }
}

/// Why a click was left to the browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreReason {
    NoAnchor,
    MissingHref,
    Fragment,
    SchemeHandoff,
    NewBrowsingContext,
    Download,
    ModifiedClick,
    NonPrimaryButton,
    UnresolvableHref,
}

impl IgnoreReason {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NoAnchor => "no_anchor",
            Self::MissingHref => "missing_href",
            Self::Fragment => "fragment",
            Self::SchemeHandoff => "scheme_handoff",
            Self::NewBrowsingContext => "new_browsing_context",
            Self::Download => "download",
            Self::ModifiedClick => "modified_click",
            Self::NonPrimaryButton => "non_primary_button",
            Self::UnresolvableHref => "unresolvable_href",
        }
    }
}

/// What the interceptor does with a click it has taken over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", content = "url", rename_all = "snake_case")]
pub enum Interception {
    /// Cover the page, then navigate to the absolute URL.
    Navigate(String),
    /// Link to the current page: swallow the click.
    SelfLink,
    /// A transition is already running: swallow the click.
    InFlight,
}

/// Outcome of classifying one click.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum NavigationIntent {
    /// Default browser behavior proceeds untouched.
    Ignored { reason: IgnoreReason },
    /// Cross-origin link, navigated natively without the overlay.
    External { url: String },
    /// Default suppressed; see [`Interception`].
    Intercepted { interception: Interception },
}

impl NavigationIntent {
    /// Whether the host must call `preventDefault()`.
    #[must_use]
    pub const fn prevents_default(&self) -> bool {
        matches!(self, Self::Intercepted { .. })
    }

    /// Navigation target, when the click starts a transition.
    #[must_use]
    pub fn navigation_target(&self) -> Option<&str> {
        match self {
            Self::Intercepted {
                interception: Interception::Navigate(url),
            } => Some(url),
            _ => None,
        }
    }

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Ignored { .. } => "ignored",
            Self::External { .. } => "external",
            Self::Intercepted { .. } => "intercepted",
        }
    }

    const fn ignored(reason: IgnoreReason) -> Self {
        Self::Ignored { reason }
    }

    const fn intercepted(interception: Interception) -> Self {
        Self::Intercepted { interception }
    }
}

fn has_scheme(href: &str, scheme: &str) -> bool {
    href.get(..scheme.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
}

fn opens_new_context(target: Option<&str>) -> bool {
    target
        .map(str::trim)
        .is_some_and(|target| !target.is_empty() && !target.eq_ignore_ascii_case("_self"))
}

/// Classify a click against the current location.
#[must_use]
pub fn classify(
    link: Option<&LinkSnapshot>,
    click: &ClickSnapshot,
    location: &PageLocation,
) -> NavigationIntent {
    let Some(link) = link else {
        return NavigationIntent::ignored(IgnoreReason::NoAnchor);
    };

    let href = match link.href.as_deref().map(str::trim) {
        None | Some("") => return NavigationIntent::ignored(IgnoreReason::MissingHref),
        Some(href) if href.starts_with('#') => {
            return NavigationIntent::ignored(IgnoreReason::Fragment);
        }
        Some(href) => href,
    };

    if has_scheme(href, "mailto:") || has_scheme(href, "tel:") {
        return NavigationIntent::ignored(IgnoreReason::SchemeHandoff);
    }
    if opens_new_context(link.target.as_deref()) {
        return NavigationIntent::ignored(IgnoreReason::NewBrowsingContext);
    }
    if link.download {
        return NavigationIntent::ignored(IgnoreReason::Download);
    }

    if !click.modifiers.is_empty() {
        return NavigationIntent::ignored(IgnoreReason::ModifiedClick);
    }
    if click.button != PointerButton::Primary {
        return NavigationIntent::ignored(IgnoreReason::NonPrimaryButton);
    }

    let Ok(resolved) = location.base.join(href) else {
        return NavigationIntent::ignored(IgnoreReason::UnresolvableHref);
    };

    if resolved.origin() != location.url.origin() {
        return NavigationIntent::External {
            url: resolved.into(),
        };
    }

    if resolved.path() == location.url.path() {
        return NavigationIntent::intercepted(Interception::SelfLink);
    }

    NavigationIntent::intercepted(Interception::Navigate(resolved.into()))
}
