#![forbid(unsafe_code)]

//! `wasm-bindgen` exports and the `web-sys` host.
//!
//! Only compiled on `wasm32` targets.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use js_sys::Function;
use pagefx_core::{
    ClassTarget, ClickSnapshot, LinkSnapshot, Modifiers, MotionPreference, MotionProbe,
    PageLocation, PointerButton, TaskToken, TransitionConfig, TransitionController,
};
use tracing::{debug, trace, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    Document, Element, Event, HtmlElement, MouseEvent, Node, PageTransitionEvent, Window,
};

use crate::host::{DomHost, HostError, drive};

const REDUCED_MOTION_QUERY: &str = "(prefers-reduced-motion: reduce)";

thread_local! {
    static PAGE: RefCell<Option<Rc<Page>>> = const { RefCell::new(None) };
}

fn install_panic_hook() {
    use std::sync::Once;

    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            web_sys::console::error_1(&JsValue::from_str(&format!("pagefx panic: {info}")));
            previous(info);
        }));
    });
}

fn js_error(err: &JsValue) -> HostError {
    HostError::Dom(err.as_string().unwrap_or_else(|| format!("{err:?}")))
}

/// Document-lifetime state shared by the listeners and scheduled callbacks.
struct Page {
    window: Window,
    document: Document,
    body: HtmlElement,
    overlay: Element,
    controller: RefCell<TransitionController>,
    timers: RefCell<HashMap<TaskToken, i32>>,
}

impl Page {
    fn run<F>(self: &Rc<Self>, step: F)
    where
        F: FnOnce(&mut TransitionController) -> Vec<pagefx_core::Effect>,
    {
        let Ok(mut controller) = self.controller.try_borrow_mut() else {
            warn!("controller re-entered from a synchronous listener; event dropped");
            return;
        };
        let effects = step(&mut controller);
        let mut dom = BrowserDom { page: self };
        drive(&mut dom, &mut controller, effects);
    }

    fn on_click(self: &Rc<Self>, event: &MouseEvent) {
        if event.default_prevented() {
            trace!("click already handled by another listener");
            return;
        }
        let link = anchor_for(event).map(|anchor| LinkSnapshot {
            href: anchor.get_attribute("href"),
            target: anchor.get_attribute("target"),
            download: anchor.has_attribute("download"),
        });
        let click = click_snapshot(event);
        let location = match self.window.location().href() {
            Ok(href) => PageLocation::parse(&href),
            Err(err) => {
                warn!(err = ?err, "location unavailable; click left to the browser");
                return;
            }
        };
        let Ok(mut location) = location else {
            warn!("location is not an absolute url; click left to the browser");
            return;
        };
        // Hrefs resolve against `<base href>` when the document has one.
        if let Ok(Some(base)) = self.document.base_uri() {
            match location.clone().with_base(&base) {
                Ok(rebased) => location = rebased,
                Err(err) => warn!(%err, %base, "unparsable base uri; resolving against location"),
            }
        }

        let Ok(mut controller) = self.controller.try_borrow_mut() else {
            warn!("controller re-entered from a synchronous listener; click left to the browser");
            return;
        };
        let outcome = controller.on_click(link.as_ref(), &click, &location);
        if outcome.prevents_default() {
            event.prevent_default();
        }
        let mut dom = BrowserDom { page: self };
        drive(&mut dom, &mut controller, outcome.effects);
    }

    fn element(&self, target: ClassTarget) -> &Element {
        match target {
            ClassTarget::Body => self.body.as_ref(),
            ClassTarget::Overlay => &self.overlay,
        }
    }
}

fn anchor_for(event: &MouseEvent) -> Option<Element> {
    let target = event.target()?;
    let element = match target.dyn_into::<Element>() {
        Ok(element) => element,
        Err(target) => target.dyn_into::<Node>().ok()?.parent_element()?,
    };
    element.closest("a").ok().flatten()
}

fn click_snapshot(event: &MouseEvent) -> ClickSnapshot {
    let mut modifiers = Modifiers::empty();
    modifiers.set(Modifiers::SHIFT, event.shift_key());
    modifiers.set(Modifiers::ALT, event.alt_key());
    modifiers.set(Modifiers::CTRL, event.ctrl_key());
    modifiers.set(Modifiers::META, event.meta_key());
    ClickSnapshot {
        button: PointerButton::from_dom(event.button()),
        modifiers,
    }
}

struct BrowserDom<'a> {
    page: &'a Rc<Page>,
}

impl DomHost for BrowserDom<'_> {
    fn set_class(
        &mut self,
        target: ClassTarget,
        class: &str,
        present: bool,
    ) -> Result<(), HostError> {
        let list = self.page.element(target).class_list();
        let result = if present {
            list.add_1(class)
        } else {
            list.remove_1(class)
        };
        result.map_err(|err| js_error(&err))
    }

    fn request_frame(&mut self, token: TaskToken) -> Result<(), HostError> {
        let page = Rc::clone(self.page);
        let callback = Closure::once_into_js(move || {
            page.run(|controller| controller.frame_ready(token));
        });
        self.page
            .window
            .request_animation_frame(callback.unchecked_ref::<Function>())
            .map(|_| ())
            .map_err(|err| js_error(&err))
    }

    fn arm_timer(&mut self, token: TaskToken, delay_ms: i32) -> Result<(), HostError> {
        let page = Rc::clone(self.page);
        let callback = Closure::once_into_js(move || {
            page.timers.borrow_mut().remove(&token);
            page.run(|controller| controller.timer_elapsed(token));
        });
        let handle = self
            .page
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                callback.unchecked_ref::<Function>(),
                delay_ms,
            )
            .map_err(|err| js_error(&err))?;
        self.page.timers.borrow_mut().insert(token, handle);
        Ok(())
    }

    fn cancel_timer(&mut self, token: TaskToken) {
        if let Some(handle) = self.page.timers.borrow_mut().remove(&token) {
            self.page.window.clear_timeout_with_handle(handle);
        }
    }

    fn navigate(&mut self, url: &str) -> Result<(), HostError> {
        self.page
            .window
            .location()
            .set_href(url)
            .map_err(|err| js_error(&err))
    }

    fn dispatch(&mut self, name: &str) -> Result<(), HostError> {
        let event = Event::new(name).map_err(|err| js_error(&err))?;
        self.page
            .document
            .dispatch_event(&event)
            .map(|_| ())
            .map_err(|err| js_error(&err))
    }
}

struct BrowserProbe<'a> {
    window: &'a Window,
    document: &'a Document,
}

impl MotionProbe for BrowserProbe<'_> {
    fn prefers_reduced_motion(&self) -> Option<bool> {
        self.window
            .match_media(REDUCED_MOTION_QUERY)
            .ok()
            .flatten()
            .map(|query| query.matches())
    }

    fn custom_property(&self, name: &str) -> Option<String> {
        let root = self.document.document_element()?;
        let style = self.window.get_computed_style(&root).ok().flatten()?;
        let value = style.get_property_value(name).ok()?;
        let value = value.trim();
        (!value.is_empty()).then(|| value.to_owned())
    }
}

fn listen<F>(target: &web_sys::EventTarget, name: &str, handler: F) -> Result<(), HostError>
where
    F: FnMut(Event) + 'static,
{
    let closure = Closure::<dyn FnMut(Event)>::new(handler);
    target
        .add_event_listener_with_callback(name, closure.as_ref().unchecked_ref())
        .map_err(|err| js_error(&err))?;
    // Listeners live as long as the document.
    closure.forget();
    Ok(())
}

fn load_config(config_json: Option<String>) -> TransitionConfig {
    let Some(raw) = config_json else {
        return TransitionConfig::default();
    };
    TransitionConfig::from_json_str(&raw).unwrap_or_else(|err| {
        warn!(%err, "invalid transition config; using defaults");
        TransitionConfig::default()
    })
}

/// Install page transitions on the current document.
///
/// Returns `false` (and stays inert) when there is no window, body, or
/// overlay element. Calling it again after a successful install is a no-op.
#[wasm_bindgen(js_name = installPageTransitions)]
pub fn install_page_transitions(config_json: Option<String>) -> bool {
    install_panic_hook();

    if PAGE.with(|page| page.borrow().is_some()) {
        return true;
    }

    let config = load_config(config_json);
    let Some(window) = web_sys::window() else {
        return false;
    };
    let Some(document) = window.document() else {
        return false;
    };
    let Some(overlay) = document.get_element_by_id(&config.overlay_id) else {
        debug!(overlay_id = %config.overlay_id, "overlay missing; transitions inert");
        return false;
    };
    let Some(body) = document.body() else {
        return false;
    };

    let motion = MotionPreference::resolve(
        &BrowserProbe {
            window: &window,
            document: &document,
        },
        &config,
    );
    let page = Rc::new(Page {
        controller: RefCell::new(TransitionController::new(config, motion)),
        timers: RefCell::new(HashMap::new()),
        window,
        document,
        body,
        overlay,
    });

    let click_page = Rc::clone(&page);
    let clicks = listen(&page.document, "click", move |event| {
        if let Ok(event) = event.dyn_into::<MouseEvent>() {
            click_page.on_click(&event);
        }
    });
    let show_page = Rc::clone(&page);
    let shows = listen(&page.window, "pageshow", move |event| {
        let persisted = event
            .dyn_ref::<PageTransitionEvent>()
            .is_some_and(PageTransitionEvent::persisted);
        show_page.run(|controller| controller.page_show(persisted));
    });
    if let Err(err) = clicks.and(shows) {
        warn!(%err, "listener registration failed; transitions inert");
        return false;
    }

    PAGE.with(|slot| *slot.borrow_mut() = Some(Rc::clone(&page)));
    page.run(TransitionController::boot);
    true
}

/// JSON snapshot of the controller, or `undefined` before install.
#[wasm_bindgen(js_name = pageTransitionState)]
pub fn page_transition_state() -> Option<String> {
    PAGE.with(|page| {
        let page = page.borrow();
        let page = page.as_ref()?;
        let controller = page.controller.try_borrow().ok()?;
        Some(controller.snapshot().to_json())
    })
}
