//! The portal: a wrapper `<div>` appended to `<body>` that hosts the dialog
//! away from the trigger's stacking context.
//!
//! Element handles are looked up once, right after the markup is inserted,
//! and kept on the struct; a `Portal` value exists exactly while its modal
//! is open.

use wasm_bindgen::prelude::*;
use web_sys::{Document, Element};

use crate::constants::{DISMISS_SELECTOR, TARGET_CONTAINER, TARGET_CONTENT, TARGET_HEADER};
use crate::dom_utils;
use crate::template;

/// Handles into the rendered dialog.
#[derive(Debug, Clone)]
pub struct DialogRegions {
    pub container: Element,
    pub header: Option<Element>,
    pub content: Element,
    pub close_button: Option<Element>,
}

#[derive(Debug)]
pub struct Portal {
    id: String,
    wrapper: Element,
    dialog: Option<DialogRegions>,
}

impl Portal {
    /// Append an empty wrapper to `<body>`.
    pub fn mount(document: &Document, portal_id: &str) -> Result<Self, JsValue> {
        let body = document
            .body()
            .ok_or_else(|| JsValue::from_str("document has no <body>"))?;
        body.insert_adjacent_html("beforeend", &template::wrapper_html(portal_id))?;

        let wrapper = document
            .get_element_by_id(portal_id)
            .ok_or_else(|| JsValue::from_str(&format!("portal #{} missing after insert", portal_id)))?;

        Ok(Self {
            id: portal_id.to_string(),
            wrapper,
            dialog: None,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn wrapper(&self) -> &Element {
        &self.wrapper
    }

    pub fn dialog(&self) -> Option<&DialogRegions> {
        self.dialog.as_ref()
    }

    /// Insert the dialog markup at the top of the wrapper and capture its
    /// regions.
    pub fn render_dialog(&mut self, markup: &str) -> Result<&DialogRegions, JsValue> {
        self.wrapper.insert_adjacent_html("afterbegin", markup)?;

        let find = |selector: &str| self.wrapper.query_selector(selector);
        let container = find(TARGET_CONTAINER)?
            .ok_or_else(|| JsValue::from_str("dialog markup lacks a container region"))?;
        let content = find(TARGET_CONTENT)?
            .ok_or_else(|| JsValue::from_str("dialog markup lacks a content region"))?;
        let regions = DialogRegions {
            container,
            header: find(TARGET_HEADER)?,
            content,
            close_button: find(DISMISS_SELECTOR)?,
        };

        Ok(&*self.dialog.insert(regions))
    }

    pub fn show(&self, toggle_class: &str) {
        if let Some(dialog) = &self.dialog {
            dom_utils::add_class(&dialog.container, toggle_class);
            dom_utils::show_block(&dialog.container);
        }
    }

    pub fn hide(&self, toggle_class: &str) {
        if let Some(dialog) = &self.dialog {
            dom_utils::remove_class(&dialog.container, toggle_class);
        }
    }

    /// Replace the spinner with the fetched fragment.  The fragment comes
    /// from our own origin and is injected as-is.
    pub fn set_content(&self, html: &str) {
        if let Some(dialog) = &self.dialog {
            dialog.content.set_inner_html(html);
        }
    }

    /// Take the wrapper (and everything in it) out of the document.
    pub fn remove(self) {
        dom_utils::remove(&self.wrapper);
    }
}
