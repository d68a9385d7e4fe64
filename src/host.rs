//! Minimal component host.
//!
//! Finds `[data-controller~="popup"]` elements, attaches a
//! [`ModalController`] to each and binds the `data-action` descriptors that
//! address the popup controller.  Pages that bring their own component
//! framework can skip this and drive [`PopupHandle`] from JavaScript.

use std::cell::RefCell;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event, EventTarget};

use crate::action::{self, ListenerScope};
use crate::config::PopupOptions;
use crate::constants::{
    CLOSE_METHOD, CLOSE_WITH_KEYBOARD_METHOD, CONTROLLER_IDENTIFIER, OPEN_METHOD,
};
use crate::controller::{Attachment, ModalController};
use crate::debug_log;
use crate::dom_utils::EventListener;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PopupAction {
    Open,
    Close,
    CloseWithKeyboard,
}

impl PopupAction {
    fn from_method(method: &str) -> Option<Self> {
        match method {
            OPEN_METHOD => Some(PopupAction::Open),
            CLOSE_METHOD => Some(PopupAction::Close),
            CLOSE_WITH_KEYBOARD_METHOD => Some(PopupAction::CloseWithKeyboard),
            _ => None,
        }
    }

    fn run(self, controller: &ModalController, event: &Event) {
        match self {
            PopupAction::Open => controller.open(event),
            // A declarative close carries no reason and counts as completed.
            PopupAction::Close => controller.close(Some(event), false),
            PopupAction::CloseWithKeyboard => controller.close_with_keyboard(event),
        }
    }
}

struct Mounted {
    controller: ModalController,
    bindings: Vec<EventListener>,
}

impl Mounted {
    fn teardown(self) {
        for binding in self.bindings {
            binding.release();
        }
        self.controller.disconnect();
    }
}

thread_local! {
    static MOUNTED: RefCell<Vec<Mounted>> = RefCell::new(Vec::new());
}

fn controller_selector() -> String {
    format!("[data-controller~=\"{}\"]", CONTROLLER_IDENTIFIER)
}

/// Attach to every popup root in `document` that is not attached yet.
/// Returns how many controllers were attached by this call.
pub fn connect_all(document: &Document) -> Result<usize, JsValue> {
    let roots = document.query_selector_all(&controller_selector())?;
    let mut attached = 0;

    for i in 0..roots.length() {
        let Some(root) = roots.item(i).and_then(|n| n.dyn_into::<Element>().ok()) else {
            continue;
        };
        if is_mounted(&root) {
            continue;
        }
        if mount(&root, &PopupOptions::default())?.is_some() {
            attached += 1;
        }
    }

    debug_log!("host attached {} popup(s)", attached);
    Ok(attached)
}

/// Attach one root and bind its actions.  `Ok(None)` when the element is
/// not a usable trigger.
pub fn mount(root: &Element, options: &PopupOptions) -> Result<Option<ModalController>, JsValue> {
    let controller = match ModalController::connect_with_options(root, options) {
        Attachment::Attached(controller) => controller,
        Attachment::Unattached(_) => return Ok(None),
    };
    let bindings = bind_actions(&controller)?;
    MOUNTED.with(|mounted| {
        mounted.borrow_mut().push(Mounted {
            controller: controller.clone(),
            bindings,
        });
    });
    Ok(Some(controller))
}

pub fn is_mounted(root: &Element) -> bool {
    MOUNTED.with(|mounted| mounted.borrow().iter().any(|m| &m.controller.root() == root))
}

/// Detach the controller mounted on `root`, if any.
pub fn unmount(root: &Element) {
    let found = MOUNTED.with(|mounted| {
        let mut mounted = mounted.borrow_mut();
        let index = mounted.iter().position(|m| &m.controller.root() == root)?;
        Some(mounted.remove(index))
    });
    if let Some(entry) = found {
        entry.teardown();
    }
}

/// Detach every host-managed controller.
pub fn disconnect_all() {
    let all = MOUNTED.with(|mounted| std::mem::take(&mut *mounted.borrow_mut()));
    for entry in all {
        entry.teardown();
    }
}

/// Bind the popup actions declared on the root and its descendants.
/// Elements owned by a nested popup root are left to that controller.
pub fn bind_actions(controller: &ModalController) -> Result<Vec<EventListener>, JsValue> {
    let root = controller.root();
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no global window exists"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document on window"))?;

    let mut elements = vec![root.clone()];
    let descendants = root.query_selector_all("[data-action]")?;
    elements.extend(
        (0..descendants.length())
            .filter_map(|i| descendants.item(i))
            .filter_map(|n| n.dyn_into::<Element>().ok())
            .filter(|el| owning_root(el).as_ref() == Some(&root)),
    );

    let mut bindings = Vec::new();
    for element in elements {
        let Some(value) = element.get_attribute("data-action") else {
            continue;
        };
        for descriptor in action::parse_actions(&value) {
            if descriptor.controller != CONTROLLER_IDENTIFIER {
                continue;
            }
            let Some(popup_action) = PopupAction::from_method(&descriptor.method) else {
                debug_log!("unknown popup action {}", descriptor.method);
                continue;
            };
            let input_type = element.get_attribute("type");
            let Some(event_name) = descriptor.event_name(&element.tag_name(), input_type.as_deref()) else {
                debug_log!("no default event for <{}>", element.tag_name().to_lowercase());
                continue;
            };

            let target: EventTarget = match descriptor.scope {
                ListenerScope::Element => element.clone().into(),
                ListenerScope::Window => window.clone().into(),
                ListenerScope::Document => document.clone().into(),
            };
            let controller = controller.clone();
            let (stop, prevent) = (descriptor.has_option("stop"), descriptor.has_option("prevent"));
            bindings.push(EventListener::new(&target, &event_name, move |event: Event| {
                if stop {
                    event.stop_propagation();
                }
                if prevent {
                    event.prevent_default();
                }
                popup_action.run(&controller, &event);
            })?);
        }
    }
    Ok(bindings)
}

fn owning_root(element: &Element) -> Option<Element> {
    element.closest(&controller_selector()).ok().flatten()
}

// ---------------------------------------------------------------------------
// JavaScript surface
// ---------------------------------------------------------------------------

/// Attach controllers to all popup roots on the page.
#[wasm_bindgen(js_name = connectPopups)]
pub fn connect_popups() -> Result<usize, JsValue> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document on window"))?;
    connect_all(&document)
}

#[wasm_bindgen(js_name = disconnectPopups)]
pub fn disconnect_popups() {
    disconnect_all();
}

/// Handle for hosts that manage attachment themselves: they call
/// `connect` / `disconnect` from their lifecycle hooks and route events to
/// the action methods.
#[wasm_bindgen]
pub struct PopupHandle {
    controller: ModalController,
}

#[wasm_bindgen]
impl PopupHandle {
    /// `undefined` when the element has no usable opener or URL.
    pub fn connect(element: Element) -> Option<PopupHandle> {
        ModalController::connect(&element)
            .controller()
            .map(|controller| PopupHandle { controller })
    }

    /// `options` is a plain object such as `{ url, showClass, modalSize }`;
    /// set fields win over the element's data attributes.
    #[wasm_bindgen(js_name = connectWithOptions)]
    pub fn connect_with_options(element: Element, options: JsValue) -> Result<Option<PopupHandle>, JsValue> {
        let options: PopupOptions = if options.is_undefined() || options.is_null() {
            PopupOptions::default()
        } else {
            serde_wasm_bindgen::from_value(options)?
        };
        Ok(ModalController::connect_with_options(&element, &options)
            .controller()
            .map(|controller| PopupHandle { controller }))
    }

    #[wasm_bindgen(js_name = openModal)]
    pub fn open_modal(&self, event: Event) {
        self.controller.open(&event);
    }

    pub fn close(&self, event: Option<Event>, cancelled: bool) {
        self.controller.close(event.as_ref(), cancelled);
    }

    #[wasm_bindgen(js_name = closeWithKeyboard)]
    pub fn close_with_keyboard(&self, event: Event) {
        self.controller.close_with_keyboard(&event);
    }

    pub fn disconnect(&self) {
        self.controller.disconnect();
    }

    #[wasm_bindgen(getter, js_name = isOpen)]
    pub fn is_open(&self) -> bool {
        self.controller.is_open()
    }

    #[wasm_bindgen(getter, js_name = portalId)]
    pub fn portal_id(&self) -> Option<String> {
        self.controller.portal_id()
    }
}
