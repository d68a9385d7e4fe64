//! Typed views over the two custom events the popup speaks.
//!
//! * `modal:closed` - emitted on the opener when the modal goes away, with
//!   `detail = { cancelled, modalOriginator }`.
//! * `turbo:submit-end` - consumed from forms inside the portal, with
//!   `detail = { success, formSubmission }` where `formSubmission.stop()`
//!   suppresses the default post-submit navigation.

use js_sys::{Function, Object, Reflect};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CustomEvent, CustomEventInit, Element, Event};

use crate::constants::{MODAL_CLOSED_EVENT, SUBMIT_END_EVENT};
use crate::dom_utils::EventListener;

/// Payload of `modal:closed`.
#[derive(Debug, Clone, PartialEq)]
pub struct CloseNotification {
    /// `true` for close button / Escape, `false` when an in-modal form
    /// completed successfully.
    pub cancelled: bool,
    pub originator: Element,
}

impl CloseNotification {
    fn detail(&self) -> Result<JsValue, JsValue> {
        let detail = Object::new();
        Reflect::set(&detail, &"cancelled".into(), &JsValue::from_bool(self.cancelled))?;
        Reflect::set(&detail, &"modalOriginator".into(), &self.originator)?;
        Ok(detail.into())
    }

    /// Dispatch on the originator.  Returns the `dispatchEvent` result.
    pub fn dispatch(&self) -> Result<bool, JsValue> {
        let init = CustomEventInit::new();
        init.set_detail(&self.detail()?);
        let event = CustomEvent::new_with_event_init_dict(MODAL_CLOSED_EVENT, &init)?;
        self.originator.dispatch_event(&event)
    }

    /// Decode a received `modal:closed` event.  `None` for anything else.
    pub fn from_event(event: &Event) -> Option<Self> {
        if event.type_() != MODAL_CLOSED_EVENT {
            return None;
        }
        let detail = event.dyn_ref::<CustomEvent>()?.detail();
        let cancelled = Reflect::get(&detail, &"cancelled".into()).ok()?.as_bool()?;
        let originator = Reflect::get(&detail, &"modalOriginator".into())
            .ok()?
            .dyn_into::<Element>()
            .ok()?;
        Some(Self { cancelled, originator })
    }
}

/// Subscribe to `modal:closed` on an opener.  The subscription lasts as
/// long as the returned listener.
pub fn on_modal_closed<F>(opener: &Element, mut handler: F) -> Result<EventListener, JsValue>
where
    F: FnMut(CloseNotification) + 'static,
{
    EventListener::new(opener, MODAL_CLOSED_EVENT, move |event: Event| {
        if let Some(notification) = CloseNotification::from_event(&event) {
            handler(notification);
        }
    })
}

/// The `turbo:submit-end` signal bubbling out of a form in the portal.
pub struct SubmitEnd<'a> {
    event: &'a Event,
    detail: JsValue,
}

impl<'a> SubmitEnd<'a> {
    pub fn from_event(event: &'a Event) -> Option<Self> {
        if event.type_() != SUBMIT_END_EVENT {
            return None;
        }
        let detail = event.dyn_ref::<CustomEvent>()?.detail();
        Some(Self { event, detail })
    }

    /// Missing or non-boolean `success` counts as failure.
    pub fn success(&self) -> bool {
        Reflect::get(&self.detail, &"success".into())
            .ok()
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
    }

    /// The submitting form: the target itself or its nearest `<form>`
    /// ancestor.
    pub fn form(&self) -> Option<Element> {
        let target = self.event.target()?.dyn_into::<Element>().ok()?;
        if target.tag_name().eq_ignore_ascii_case("form") {
            return Some(target);
        }
        target.closest("form").ok().flatten()
    }

    /// Call `formSubmission.stop()` and keep the signal from bubbling past
    /// the portal.
    pub fn stop(&self) -> Result<(), JsValue> {
        self.event.stop_propagation();
        let submission = Reflect::get(&self.detail, &"formSubmission".into())?;
        if submission.is_undefined() || submission.is_null() {
            return Ok(());
        }
        let stop = Reflect::get(&submission, &"stop".into())?;
        if let Some(stop) = stop.dyn_ref::<Function>() {
            stop.call0(&submission)?;
        }
        Ok(())
    }
}
