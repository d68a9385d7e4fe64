//! Fragment loading for the dialog body.

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{AbortSignal, Headers, Request, RequestInit, Response};

use crate::constants::REQUESTED_WITH_HEADER;

/// What the server answered.  Transport failures (offline, aborted) come
/// back as `Err` instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// 2xx; the body is injected verbatim.
    Fragment(String),
    Rejected { status: u16 },
}

/// GET `url` flagged as a programmatic request so the server renders a
/// fragment instead of a full page.
pub async fn fetch_fragment(url: &str, signal: Option<&AbortSignal>) -> Result<FetchOutcome, JsValue> {
    let opts = RequestInit::new();
    opts.set_method("GET");

    let headers = Headers::new()?;
    let (name, value) = REQUESTED_WITH_HEADER;
    headers.append(name, value)?;
    opts.set_headers(&headers);
    opts.set_signal(signal);

    let request = Request::new_with_str_and_init(url, &opts)?;

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no global window exists"))?;
    let resp_value = JsFuture::from(window.fetch_with_request(&request)).await?;
    let resp: Response = resp_value.dyn_into()?;

    if !resp.ok() {
        return Ok(FetchOutcome::Rejected { status: resp.status() });
    }

    let text = JsFuture::from(resp.text()?).await?;
    Ok(FetchOutcome::Fragment(text.as_string().unwrap_or_default()))
}

/// True when the rejection came from our own `AbortController`.
pub fn is_abort(err: &JsValue) -> bool {
    err.dyn_ref::<js_sys::Error>()
        .map(|e| String::from(e.name()) == "AbortError")
        .unwrap_or(false)
}
