//! `ModalController`: one popup instance bound to a trigger element.
//!
//! DOM events are translated into [`Message`]s for the [`ModalState`]
//! reducer and the returned [`Command`]s are executed here, in order.  The
//! controller owns every handle it creates (portal, overlay, listeners,
//! scroll guard, in-flight fetch), so tearing it down cannot leave
//! anything behind in the page.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{AbortController, Document, Element, Event, KeyboardEvent, Node};

use crate::config::{self, PopupConfig, PopupOptions, UnattachedReason};
use crate::constants::{ESCAPE_KEY, ESCAPE_KEY_CODE, SUBMIT_END_EVENT};
use crate::debug_log;
use crate::dom_utils::{self, EventListener};
use crate::messages::{Command, Message};
use crate::network::{self, FetchOutcome};
use crate::notify::{CloseNotification, SubmitEnd};
use crate::portal::Portal;
use crate::scroll_lock::PageScrollGuard;
use crate::state::{ContentStatus, ModalState};
use crate::template;

/// Result of connecting to an element.
pub enum Attachment {
    Attached(ModalController),
    /// The element is not a usable trigger; nothing was bound.
    Unattached(UnattachedReason),
}

impl Attachment {
    pub fn controller(self) -> Option<ModalController> {
        match self {
            Attachment::Attached(controller) => Some(controller),
            Attachment::Unattached(_) => None,
        }
    }
}

struct Inner {
    root: Element,
    opener: Element,
    config: PopupConfig,
    state: ModalState,
    portal: Option<Portal>,
    /// Nodes of the overlay this instance inserted; a foreign one is never
    /// touched.
    background: Vec<Node>,
    scroll_guard: Option<PageScrollGuard>,
    fetch: Option<AbortController>,
    listeners: Vec<EventListener>,
}

impl Drop for Inner {
    fn drop(&mut self) {
        for listener in self.listeners.drain(..) {
            listener.release();
        }
        if let Some(fetch) = self.fetch.take() {
            fetch.abort();
        }
        if let Some(portal) = self.portal.take() {
            forget_owner(portal.id());
            portal.remove();
        }
        dom_utils::remove_nodes(&std::mem::take(&mut self.background));
    }
}

thread_local! {
    /// Portal id -> owning controller, for introspection from outside.
    static PORTAL_OWNERS: RefCell<HashMap<String, Weak<RefCell<Inner>>>> = RefCell::new(HashMap::new());
}

fn forget_owner(portal_id: &str) {
    PORTAL_OWNERS.with(|owners| {
        owners.borrow_mut().remove(portal_id);
    });
}

fn document() -> Result<Document, JsValue> {
    web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document on window"))
}

#[derive(Clone)]
pub struct ModalController {
    inner: Rc<RefCell<Inner>>,
}

impl ModalController {
    /// Read configuration from `root` and resolve its opener.
    pub fn connect(root: &Element) -> Attachment {
        Self::connect_with_options(root, &PopupOptions::default())
    }

    pub fn connect_with_options(root: &Element, options: &PopupOptions) -> Attachment {
        let resolved = match config::resolve(root, options) {
            Ok(resolved) => resolved,
            Err(reason) => {
                debug_log!("popup not attached to <{}>: {}", root.tag_name().to_lowercase(), reason);
                return Attachment::Unattached(reason);
            }
        };
        debug_log!("popup attached, url {}", resolved.config.url);

        let inner = Inner {
            root: root.clone(),
            opener: resolved.opener,
            state: ModalState::new(resolved.config.url.clone()),
            config: resolved.config,
            portal: None,
            background: Vec::new(),
            scroll_guard: None,
            fetch: None,
            listeners: Vec::new(),
        };
        Attachment::Attached(Self {
            inner: Rc::new(RefCell::new(inner)),
        })
    }

    /// Controller owning the portal with this id, while it is open.
    pub fn for_portal(portal_id: &str) -> Option<Self> {
        PORTAL_OWNERS.with(|owners| {
            owners
                .borrow()
                .get(portal_id)
                .and_then(Weak::upgrade)
                .map(|inner| Self { inner })
        })
    }

    // ---------------------------------------------------------------------
    // Actions
    // ---------------------------------------------------------------------

    /// `popup#openModal`.  Events whose target lies outside the root
    /// element are swallowed without opening.
    pub fn open(&self, event: &Event) {
        event.prevent_default();
        let within = dom_utils::contains_target(&self.inner.borrow().root, event.target().as_ref());
        self.dispatch(Message::Open { target_within_root: within }, Some(event));
    }

    /// `popup#close`.  Without an event this is a teardown close and the
    /// opener is not notified.
    pub fn close(&self, event: Option<&Event>, cancelled: bool) {
        let msg = match event {
            Some(event) => {
                if event.cancelable() {
                    event.prevent_default();
                }
                if let Some(signal) = SubmitEnd::from_event(event) {
                    if let Err(e) = signal.stop() {
                        web_sys::console::warn_1(&format!("failed to stop form submission: {:?}", e).into());
                    }
                }
                Message::Close { cancelled }
            }
            None => Message::Detach,
        };
        self.dispatch(msg, event);
    }

    /// `popup#closeWithKeyboard`.  Only Escape closes (as cancelled).
    pub fn close_with_keyboard(&self, event: &Event) {
        let Some(key_event) = event.dyn_ref::<KeyboardEvent>() else {
            return;
        };
        let key = if key_event.key_code() == ESCAPE_KEY_CODE {
            ESCAPE_KEY.to_string()
        } else {
            key_event.key()
        };
        if key == ESCAPE_KEY && self.is_open() && event.cancelable() {
            event.prevent_default();
        }
        self.dispatch(Message::KeyDown { key }, Some(event));
    }

    /// Component teardown: close silently and drop every listener.
    pub fn disconnect(&self) {
        self.dispatch(Message::Detach, None);
    }

    fn handle_submit_end(&self, event: &Event) {
        let Some(signal) = SubmitEnd::from_event(event) else {
            return;
        };
        let msg = Message::SubmitEnded {
            success: signal.success(),
            within_form: signal.form().is_some(),
        };
        self.dispatch(msg, Some(event));
    }

    // ---------------------------------------------------------------------
    // Introspection
    // ---------------------------------------------------------------------

    pub fn is_open(&self) -> bool {
        self.inner.borrow().state.is_open()
    }

    pub fn portal_id(&self) -> Option<String> {
        self.inner.borrow().state.portal_id().map(str::to_string)
    }

    pub fn wrapper(&self) -> Option<Element> {
        self.inner.borrow().portal.as_ref().map(|p| p.wrapper().clone())
    }

    pub fn content_status(&self) -> Option<ContentStatus> {
        self.inner.borrow().state.content_status().cloned()
    }

    pub fn config(&self) -> PopupConfig {
        self.inner.borrow().config.clone()
    }

    pub fn root(&self) -> Element {
        self.inner.borrow().root.clone()
    }

    pub fn opener(&self) -> Element {
        self.inner.borrow().opener.clone()
    }

    pub fn listener_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }

    // ---------------------------------------------------------------------
    // Reducer plumbing
    // ---------------------------------------------------------------------

    fn dispatch(&self, msg: Message, event: Option<&Event>) {
        // Notifications run foreign listeners, which may call back into
        // this controller, so they go out only after the borrow ends.
        let notifications = {
            let Ok(mut inner) = self.inner.try_borrow_mut() else {
                web_sys::console::warn_1(&format!("popup busy, dropped {:?}", msg).into());
                return;
            };
            let commands = inner.state.update(msg);
            let mut notifications = Vec::new();
            for command in commands {
                if let Err(e) = self.execute(&mut inner, command, event, &mut notifications) {
                    web_sys::console::error_1(&format!("popup command failed: {:?}", e).into());
                }
            }
            notifications
        };

        for notification in notifications {
            if let Err(e) = notification.dispatch() {
                web_sys::console::error_1(&format!("failed to dispatch modal:closed: {:?}", e).into());
            }
        }
    }

    fn execute(
        &self,
        inner: &mut Inner,
        command: Command,
        event: Option<&Event>,
        notifications: &mut Vec<CloseNotification>,
    ) -> Result<(), JsValue> {
        match command {
            Command::MountPortal { portal_id } => {
                if inner.portal.is_none() {
                    let portal = Portal::mount(&document()?, &portal_id)?;
                    PORTAL_OWNERS.with(|owners| {
                        owners
                            .borrow_mut()
                            .insert(portal_id.clone(), Rc::downgrade(&self.inner));
                    });
                    debug_log!("portal {} mounted", portal_id);
                    inner.portal = Some(portal);
                }
            }
            Command::FetchContent { url, generation } => {
                if let Some(previous) = inner.fetch.take() {
                    previous.abort();
                }
                let abort = AbortController::new()?;
                let signal = abort.signal();
                inner.fetch = Some(abort);

                let weak = Rc::downgrade(&self.inner);
                spawn_local(async move {
                    let msg = match network::fetch_fragment(&url, Some(&signal)).await {
                        Ok(FetchOutcome::Fragment(html)) => Message::ContentLoaded { generation, html },
                        Ok(FetchOutcome::Rejected { status }) => {
                            web_sys::console::warn_1(&format!("popup content {} answered {}", url, status).into());
                            Message::ContentFailed { generation, status: Some(status) }
                        }
                        Err(e) if network::is_abort(&e) => {
                            debug_log!("fetch for generation {} aborted", generation);
                            Message::ContentFailed { generation, status: None }
                        }
                        Err(e) => {
                            web_sys::console::warn_1(&format!("popup content {} failed: {:?}", url, e).into());
                            Message::ContentFailed { generation, status: None }
                        }
                    };
                    if let Some(inner) = weak.upgrade() {
                        ModalController { inner }.dispatch(msg, None);
                    }
                });
            }
            Command::RenderDialog => {
                let markup = template::dialog_html(&inner.config.heading, inner.config.modal_size);
                if let Some(portal) = inner.portal.as_mut() {
                    portal.render_dialog(&markup)?;
                }
            }
            Command::BindDismiss => {
                let button = inner
                    .portal
                    .as_ref()
                    .and_then(|p| p.dialog())
                    .and_then(|d| d.close_button.clone());
                if let Some(button) = button {
                    let weak = Rc::downgrade(&self.inner);
                    let listener = EventListener::once(&button, "click", move |e: Event| {
                        if let Some(inner) = weak.upgrade() {
                            ModalController { inner }.close(Some(&e), true);
                        }
                    })?;
                    inner.listeners.push(listener);
                }
            }
            Command::BindSubmissionEnd => {
                if let Some(wrapper) = inner.portal.as_ref().map(|p| p.wrapper().clone()) {
                    let weak = Rc::downgrade(&self.inner);
                    let listener = EventListener::new(&wrapper, SUBMIT_END_EVENT, move |e: Event| {
                        if let Some(inner) = weak.upgrade() {
                            ModalController { inner }.handle_submit_end(&e);
                        }
                    })?;
                    inner.listeners.push(listener);
                }
            }
            Command::LockScroll => {
                if inner.scroll_guard.is_none() {
                    inner.scroll_guard = Some(PageScrollGuard::acquire());
                }
            }
            Command::ShowBackground => {
                let document = document()?;
                if inner.background.is_empty()
                    && document.get_element_by_id(&inner.config.background_id).is_none()
                {
                    if let Some(portal) = inner.portal.as_ref() {
                        let markup = inner
                            .config
                            .background_html
                            .clone()
                            .unwrap_or_else(|| template::background_html(&inner.config.background_id));
                        // Directly before the wrapper so the dialog stacks above it.
                        // The markup may expand to several nodes or to none.
                        let wrapper = portal.wrapper();
                        let before = wrapper.previous_sibling();
                        wrapper.insert_adjacent_html("beforebegin", &markup)?;
                        inner.background = dom_utils::siblings_between(before.as_ref(), wrapper);
                    }
                }
            }
            Command::ShowDialog => {
                if let Some(portal) = inner.portal.as_ref() {
                    portal.show(&inner.config.show_class);
                }
            }
            Command::InjectContent(html) => {
                if let Some(portal) = inner.portal.as_ref() {
                    portal.set_content(&html);
                }
            }
            Command::StopSubmission => {
                if let Some(event) = event {
                    if event.cancelable() {
                        event.prevent_default();
                    }
                    if let Some(signal) = SubmitEnd::from_event(event) {
                        signal.stop()?;
                    }
                }
            }
            Command::HideDialog => {
                if let Some(portal) = inner.portal.as_ref() {
                    portal.hide(&inner.config.show_class);
                }
            }
            Command::RemovePortal => {
                for listener in inner.listeners.drain(..) {
                    listener.release();
                }
                if let Some(portal) = inner.portal.take() {
                    forget_owner(portal.id());
                    debug_log!("portal {} removed", portal.id());
                    portal.remove();
                }
            }
            Command::AbortFetch => {
                if let Some(fetch) = inner.fetch.take() {
                    fetch.abort();
                }
            }
            Command::NotifyOpener { cancelled } => {
                notifications.push(CloseNotification {
                    cancelled,
                    originator: inner.opener.clone(),
                });
            }
            Command::RemoveBackground => {
                dom_utils::remove_nodes(&std::mem::take(&mut inner.background));
            }
            Command::UnlockScroll => {
                // Dropping the guard hands the page lock back.
                inner.scroll_guard = None;
            }
        }
        Ok(())
    }
}
