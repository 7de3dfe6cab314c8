#![forbid(unsafe_code)]

//! Browser binding for `pagefx-core`.
//!
//! On `wasm32` this crate exports two functions to JavaScript:
//!
//! - `installPageTransitions(configJson?)`: find the overlay, resolve the
//!   motion preference, attach the document `click` and window `pageshow`
//!   listeners, and reveal the page. Returns `false` and stays inert when
//!   the overlay element is missing.
//! - `pageTransitionState()`: controller snapshot as JSON, for debugging.
//!
//! ```js
//! import init, { installPageTransitions } from "./pkg/pagefx_web.js";
//! await init();
//! installPageTransitions(JSON.stringify({ overlay_id: "page-transition" }));
//! ```
//!
//! Effect execution ([`host::drive`]) is target-independent and tested
//! natively against an in-memory host.

pub mod host;

#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::{install_page_transitions, page_transition_state};
