//! dom_utils.rs: thin helper layer for repetitive DOM operations.
//!
//! Owned event listeners, containment checks and the small style toggles
//! the controller needs, so `set_attribute("style", …)` and raw `Closure`
//! bookkeeping don't spread across the code-base.

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{AddEventListenerOptions, Element, Event, EventTarget, HtmlElement, Node};

/// A registered DOM listener that unregisters itself when dropped.
///
/// Listeners often tear themselves down from inside their own callback
/// (the dismiss button closes the modal, which drops the dismiss
/// listener).  Freeing a closure while wasm-bindgen is still executing it
/// is undefined behaviour, so [`EventListener::release`] unregisters
/// immediately but defers freeing the closure to a later microtask.
pub struct EventListener {
    target: EventTarget,
    event_type: String,
    callback: Option<Closure<dyn FnMut(Event)>>,
}

impl EventListener {
    pub fn new<F>(target: &EventTarget, event_type: &str, callback: F) -> Result<Self, JsValue>
    where
        F: FnMut(Event) + 'static,
    {
        Self::register(target, event_type, callback, false)
    }

    /// Like [`EventListener::new`] but the browser drops the registration
    /// after the first event.
    pub fn once<F>(target: &EventTarget, event_type: &str, callback: F) -> Result<Self, JsValue>
    where
        F: FnMut(Event) + 'static,
    {
        Self::register(target, event_type, callback, true)
    }

    fn register<F>(target: &EventTarget, event_type: &str, callback: F, once: bool) -> Result<Self, JsValue>
    where
        F: FnMut(Event) + 'static,
    {
        let closure = Closure::<dyn FnMut(Event)>::wrap(Box::new(callback));
        let options = AddEventListenerOptions::new();
        options.set_once(once);
        target.add_event_listener_with_callback_and_add_event_listener_options(
            event_type,
            closure.as_ref().unchecked_ref(),
            &options,
        )?;
        Ok(Self {
            target: target.clone(),
            event_type: event_type.to_string(),
            callback: Some(closure),
        })
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    /// Unregister now, free the closure once the current task is done.
    pub fn release(mut self) {
        if let Some(closure) = self.unregister() {
            wasm_bindgen_futures::spawn_local(async move {
                drop(closure);
            });
        }
    }

    fn unregister(&mut self) -> Option<Closure<dyn FnMut(Event)>> {
        let closure = self.callback.take()?;
        let _ = self
            .target
            .remove_event_listener_with_callback(&self.event_type, closure.as_ref().unchecked_ref());
        Some(closure)
    }
}

impl Drop for EventListener {
    fn drop(&mut self) {
        // Only reached for listeners not passed through `release`, which
        // are never dropped from inside their own callback.
        drop(self.unregister());
    }
}

/// True when `target` is `root` or one of its descendants.
pub fn contains_target(root: &Element, target: Option<&EventTarget>) -> bool {
    match target.and_then(|t| t.dyn_ref::<Node>()) {
        Some(node) => root.contains(Some(node)),
        None => false,
    }
}

/// Make an element visible regardless of the `display: none` its CSS class
/// may carry.
pub fn show_block(el: &Element) {
    if let Some(html) = el.dyn_ref::<HtmlElement>() {
        let _ = html.style().set_property("display", "block");
    }
}

pub fn add_class(el: &Element, class: &str) {
    let _ = el.class_list().add_1(class);
}

pub fn remove_class(el: &Element, class: &str) {
    let _ = el.class_list().remove_1(class);
}

/// Detach an element from wherever it currently lives.
pub fn remove(el: &Element) {
    el.remove();
}

/// Siblings strictly between `start` and `end`, in document order.  A
/// `start` of `None` means from the first child of `end`'s parent.
pub fn siblings_between(start: Option<&Node>, end: &Node) -> Vec<Node> {
    let mut nodes = Vec::new();
    let mut cursor = end.previous_sibling();
    while let Some(node) = cursor {
        if Some(&node) == start {
            break;
        }
        cursor = node.previous_sibling();
        nodes.push(node);
    }
    nodes.reverse();
    nodes
}

/// Detach nodes of any kind (elements, text, comments).
pub fn remove_nodes(nodes: &[Node]) {
    for node in nodes {
        if let Some(parent) = node.parent_node() {
            let _ = parent.remove_child(node);
        }
    }
}

