//! Per-instance configuration, read once when a controller attaches.
//!
//! Values come from the root element's `data-popup-*` attributes and can be
//! overridden by [`PopupOptions`] handed in from JavaScript.  The element
//! carrying `popup#openModal` (the *opener*) supplies the fallback URL and
//! heading.  Resolution is written against [`AttributeSource`] so it runs
//! on the host in unit tests as well as on `web_sys::Element`.

use serde::Deserialize;
use wasm_bindgen::JsCast;
use web_sys::Element;

use crate::action;
use crate::constants::{
    ATTR_BACKGROUND_HTML, ATTR_BACKGROUND_ID, ATTR_HEADING, ATTR_MODAL_SIZE, ATTR_SHOW_CLASS,
    ATTR_URL, CONTROLLER_IDENTIFIER, DEFAULT_BACKGROUND_ID, DEFAULT_SHOW_CLASS, OPEN_METHOD,
};

/// Typed read access to the element attributes configuration is built from.
pub trait AttributeSource: Clone {
    fn attribute(&self, name: &str) -> Option<String>;
    /// Upper- or lower-case tag name; comparisons are case-insensitive.
    fn tag_name(&self) -> String;
    fn visible_text(&self) -> String;
    /// First descendant (document order) whose `data-action` binds the
    /// open action.
    fn first_open_descendant(&self) -> Option<Self>;

    fn binds_open(&self) -> bool {
        self.attribute("data-action")
            .map(|value| action::binds_open(&value))
            .unwrap_or(false)
    }
}

impl AttributeSource for Element {
    fn attribute(&self, name: &str) -> Option<String> {
        self.get_attribute(name)
    }

    fn tag_name(&self) -> String {
        Element::tag_name(self)
    }

    fn visible_text(&self) -> String {
        self.text_content().unwrap_or_default()
    }

    fn first_open_descendant(&self) -> Option<Self> {
        let selector = format!("[data-action*=\"{}#{}\"]", CONTROLLER_IDENTIFIER, OPEN_METHOD);
        let candidates = self.query_selector_all(&selector).ok()?;
        // The substring selector is looser than the descriptor grammar, so
        // confirm each candidate before accepting it.
        (0..candidates.length())
            .filter_map(|i| candidates.item(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .find(|el| AttributeSource::binds_open(el))
    }
}

/// Size variant hint, mapped onto the dialog's `modal-{sm,lg,xl}` class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModalSize {
    Small,
    #[default]
    Default,
    Large,
    ExtraLarge,
}

impl ModalSize {
    /// Unknown hints fall back to the default size.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "sm" | "small" => ModalSize::Small,
            "lg" | "large" => ModalSize::Large,
            "xl" | "extra-large" | "extra_large" => ModalSize::ExtraLarge,
            _ => ModalSize::Default,
        }
    }

    pub fn dialog_class(self) -> Option<&'static str> {
        match self {
            ModalSize::Small => Some("modal-sm"),
            ModalSize::Default => None,
            ModalSize::Large => Some("modal-lg"),
            ModalSize::ExtraLarge => Some("modal-xl"),
        }
    }
}

/// Explicit configuration passed by a JavaScript host.  Every field that is
/// set wins over the matching `data-popup-*` attribute.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PopupOptions {
    pub url: Option<String>,
    pub show_class: Option<String>,
    pub background_id: Option<String>,
    pub background_html: Option<String>,
    pub modal_size: Option<String>,
    pub heading: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopupConfig {
    pub url: String,
    pub show_class: String,
    pub background_id: String,
    /// Raw markup from the trigger; `None` means the built-in overlay.
    pub background_html: Option<String>,
    pub modal_size: ModalSize,
    pub heading: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnattachedReason {
    /// Neither the root nor any descendant binds `popup#openModal`.
    NoOpener,
    /// No URL attribute and the opener is not a link with an `href`.
    NoUrl,
}

impl std::fmt::Display for UnattachedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnattachedReason::NoOpener => write!(f, "no element binds {}#{}", CONTROLLER_IDENTIFIER, OPEN_METHOD),
            UnattachedReason::NoUrl => write!(f, "no {} attribute and the opener is not a link", ATTR_URL),
        }
    }
}

/// Configuration together with the opener it was derived from.
#[derive(Debug, Clone)]
pub struct Resolved<E> {
    pub config: PopupConfig,
    pub opener: E,
}

/// The root itself if it binds the open action, else its first descendant
/// that does.
pub fn resolve_opener<E: AttributeSource>(root: &E) -> Option<E> {
    if root.binds_open() {
        Some(root.clone())
    } else {
        root.first_open_descendant()
    }
}

pub fn resolve<E: AttributeSource>(root: &E, options: &PopupOptions) -> Result<Resolved<E>, UnattachedReason> {
    let opener = resolve_opener(root).ok_or(UnattachedReason::NoOpener)?;

    let read = |explicit: &Option<String>, attr: &str| -> Option<String> {
        explicit
            .clone()
            .or_else(|| root.attribute(attr))
            .filter(|v| !v.is_empty())
    };

    let url = read(&options.url, ATTR_URL)
        .or_else(|| {
            if opener.tag_name().eq_ignore_ascii_case("a") {
                opener.attribute("href").filter(|href| !href.is_empty())
            } else {
                None
            }
        })
        .ok_or(UnattachedReason::NoUrl)?;

    let heading = read(&options.heading, ATTR_HEADING)
        .unwrap_or_else(|| opener.visible_text().trim().to_string());

    let config = PopupConfig {
        url,
        show_class: read(&options.show_class, ATTR_SHOW_CLASS)
            .unwrap_or_else(|| DEFAULT_SHOW_CLASS.to_string()),
        background_id: read(&options.background_id, ATTR_BACKGROUND_ID)
            .unwrap_or_else(|| DEFAULT_BACKGROUND_ID.to_string()),
        background_html: read(&options.background_html, ATTR_BACKGROUND_HTML),
        modal_size: read(&options.modal_size, ATTR_MODAL_SIZE)
            .map(|v| ModalSize::parse(&v))
            .unwrap_or_default(),
        heading,
    };

    Ok(Resolved { config, opener })
}
