//! Page scroll lock.
//!
//! While a modal is open the body is pinned in place: right padding
//! replaces the vanished scrollbar, the body becomes `position: fixed` via
//! [`BODY_LOCK_CLASSES`] and a negative `top` keeps the visible content
//! where it was.  Unlocking reverses the steps and restores the scroll
//! offset saved at lock time.
//!
//! The body is shared by every popup on the page, so the lock is counted:
//! the first holder engages it, the last one to leave releases it.

use std::cell::RefCell;

use wasm_bindgen::JsValue;
use web_sys::HtmlElement;

use crate::constants::BODY_LOCK_CLASSES;
use crate::debug_log;

/// The few page-level knobs the lock turns.
pub trait ScrollSurface {
    /// Viewport width minus document content width.
    fn scrollbar_width(&self) -> f64;
    fn scroll_offset(&self) -> f64;
    fn restore_scroll_offset(&mut self, offset: f64);
    fn set_padding_right(&mut self, px: Option<f64>);
    fn set_top(&mut self, px: Option<f64>);
    fn add_classes(&mut self, classes: &[&str]);
    fn remove_classes(&mut self, classes: &[&str]);
}

pub struct ScrollLock<S> {
    surface: S,
    holders: usize,
    saved_offset: Option<f64>,
}

impl<S: ScrollSurface> ScrollLock<S> {
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            holders: 0,
            saved_offset: None,
        }
    }

    pub fn holders(&self) -> usize {
        self.holders
    }

    /// Offset captured by the first holder; `None` while unlocked.
    pub fn saved_offset(&self) -> Option<f64> {
        self.saved_offset
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn acquire(&mut self) {
        if self.holders == 0 {
            self.engage();
        }
        self.holders += 1;
    }

    /// Releasing an unheld lock does nothing.
    pub fn release(&mut self) {
        match self.holders {
            0 => {}
            1 => {
                self.holders = 0;
                self.disengage();
            }
            _ => self.holders -= 1,
        }
    }

    fn engage(&mut self) {
        let scrollbar = self.surface.scrollbar_width().max(0.0);
        self.surface.set_padding_right(Some(scrollbar));

        let offset = self.surface.scroll_offset();
        self.saved_offset = Some(offset);

        self.surface.add_classes(&BODY_LOCK_CLASSES);
        self.surface.set_top(Some(-offset));
    }

    fn disengage(&mut self) {
        self.surface.set_padding_right(None);
        self.surface.remove_classes(&BODY_LOCK_CLASSES);
        if let Some(offset) = self.saved_offset.take() {
            self.surface.restore_scroll_offset(offset);
        }
        self.surface.set_top(None);
    }
}

/// [`ScrollSurface`] over the live `document.body`.
#[derive(Debug, Default, Clone, Copy)]
pub struct BodySurface;

impl BodySurface {
    fn body() -> Option<HtmlElement> {
        web_sys::window()?.document()?.body()
    }

    fn set_style(name: &str, value: Option<String>) -> Result<(), JsValue> {
        let Some(body) = Self::body() else {
            return Ok(());
        };
        let style = body.style();
        match value {
            Some(v) => style.set_property(name, &v),
            None => style.remove_property(name).map(|_| ()),
        }
    }
}

impl ScrollSurface for BodySurface {
    fn scrollbar_width(&self) -> f64 {
        let Some(window) = web_sys::window() else {
            return 0.0;
        };
        let viewport = window
            .inner_width()
            .ok()
            .and_then(|w| w.as_f64())
            .unwrap_or(0.0);
        let content = window
            .document()
            .and_then(|d| d.document_element())
            .map(|el| f64::from(el.client_width()))
            .unwrap_or(viewport);
        viewport - content
    }

    fn scroll_offset(&self) -> f64 {
        web_sys::window()
            .and_then(|w| w.scroll_y().ok())
            .filter(|y| *y > 0.0)
            .or_else(|| Self::body().map(|b| f64::from(b.scroll_top())))
            .unwrap_or(0.0)
    }

    fn restore_scroll_offset(&mut self, offset: f64) {
        if let Some(root) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.document_element())
        {
            root.set_scroll_top(offset.round() as i32);
        }
    }

    fn set_padding_right(&mut self, px: Option<f64>) {
        if let Err(e) = Self::set_style("padding-right", px.map(|v| format!("{}px", v))) {
            web_sys::console::warn_1(&format!("scroll lock: padding-right failed: {:?}", e).into());
        }
    }

    fn set_top(&mut self, px: Option<f64>) {
        if let Err(e) = Self::set_style("top", px.map(|v| format!("{}px", v))) {
            web_sys::console::warn_1(&format!("scroll lock: top failed: {:?}", e).into());
        }
    }

    fn add_classes(&mut self, classes: &[&str]) {
        if let Some(body) = Self::body() {
            for class in classes {
                let _ = body.class_list().add_1(class);
            }
        }
    }

    fn remove_classes(&mut self, classes: &[&str]) {
        if let Some(body) = Self::body() {
            for class in classes {
                let _ = body.class_list().remove_1(class);
            }
        }
    }
}

thread_local! {
    static PAGE_LOCK: RefCell<ScrollLock<BodySurface>> = RefCell::new(ScrollLock::new(BodySurface));
}

/// One hold on the page-wide lock.  Dropping the guard releases it, so a
/// controller torn down mid-flight still hands the page back.
#[derive(Debug)]
pub struct PageScrollGuard {
    /// False when the lock was busy at acquire time; such a guard must not
    /// release someone else's hold.
    held: bool,
}

impl PageScrollGuard {
    pub fn acquire() -> Self {
        let held = PAGE_LOCK.with(|lock| match lock.try_borrow_mut() {
            Ok(mut lock) => {
                lock.acquire();
                true
            }
            Err(_) => {
                debug_log!("scroll lock busy; acquire skipped");
                false
            }
        });
        Self { held }
    }

    pub fn is_held(&self) -> bool {
        self.held
    }

    /// Number of live guards on the page.
    pub fn holders() -> usize {
        PAGE_LOCK.with(|lock| lock.borrow().holders())
    }
}

impl Drop for PageScrollGuard {
    fn drop(&mut self) {
        if !self.held {
            return;
        }
        PAGE_LOCK.with(|lock| {
            if let Ok(mut lock) = lock.try_borrow_mut() {
                lock.release();
            }
        });
    }
}
