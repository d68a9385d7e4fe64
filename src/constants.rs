// Defaults and fixed names for the popup widget - the single source of truth
// for attribute names and markup hooks shared by config, template and host.

/// Identifier used in `data-controller` and in action descriptors.
pub const CONTROLLER_IDENTIFIER: &str = "popup";

// Action method names as written in `data-action` (`popup#openModal`).
pub const OPEN_METHOD: &str = "openModal";
pub const CLOSE_METHOD: &str = "close";
pub const CLOSE_WITH_KEYBOARD_METHOD: &str = "closeWithKeyboard";

// `data-popup-*` configuration attributes
pub const ATTR_URL: &str = "data-popup-url";
pub const ATTR_SHOW_CLASS: &str = "data-popup-show-class";
pub const ATTR_BACKGROUND_ID: &str = "data-popup-background-id";
pub const ATTR_BACKGROUND_HTML: &str = "data-popup-background-html";
pub const ATTR_MODAL_SIZE: &str = "data-popup-modal-size";
pub const ATTR_HEADING: &str = "data-popup-heading";

pub const DEFAULT_SHOW_CLASS: &str = "show";
pub const DEFAULT_BACKGROUND_ID: &str = "modal-background";

// Portal / dialog markup hooks
pub const PORTAL_ID_PREFIX: &str = "modal-wrapper-";
pub const TARGET_CONTAINER: &str = "[data-popup-target=\"container\"]";
pub const TARGET_HEADER: &str = "[data-popup-target=\"header\"]";
pub const TARGET_CONTENT: &str = "[data-popup-target=\"content\"]";
pub const DISMISS_SELECTOR: &str = "[data-dismiss=\"modal\"]";

// Events
pub const MODAL_CLOSED_EVENT: &str = "modal:closed";
pub const SUBMIT_END_EVENT: &str = "turbo:submit-end";

/// Marker header telling the server to answer with a fragment, not a page.
pub const REQUESTED_WITH_HEADER: (&str, &str) = ("X-Requested-With", "XMLHttpRequest");

pub const ESCAPE_KEY: &str = "Escape";
pub const ESCAPE_KEY_CODE: u32 = 27;

/// Classes added to `<body>` while the page scroll is locked.
pub const BODY_LOCK_CLASSES: [&str; 4] = ["modal-open", "fixed", "inset-x-0", "overflow-hidden"];
