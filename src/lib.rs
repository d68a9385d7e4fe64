use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

pub mod macros;
pub mod constants;
pub mod action;
pub mod config;
pub mod template;
pub mod messages;
pub mod state;
pub mod scroll_lock;
pub mod network;
pub mod dom_utils;
pub mod notify;
pub mod portal;
pub mod controller;
pub mod host;

pub use config::{ModalSize, PopupConfig, PopupOptions, UnattachedReason};
pub use controller::{Attachment, ModalController};
pub use host::PopupHandle;
pub use notify::{on_modal_closed, CloseNotification};

// Entry point when the WASM module is instantiated
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    // Initialize better panic messages
    console_error_panic_hook::set_once();

    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        // Worker or other window-less context: nothing to attach to.
        return Ok(());
    };

    // Scripts loaded from <head> run before the body is parsed; wait for it.
    if document.ready_state() == "loading" {
        let on_ready = Closure::once_into_js(move || {
            if let Err(e) = host::connect_popups() {
                web_sys::console::error_1(&format!("Failed to attach popups: {:?}", e).into());
            }
        });
        document.add_event_listener_with_callback("DOMContentLoaded", on_ready.unchecked_ref())?;
    } else {
        host::connect_popups()?;
    }

    Ok(())
}
