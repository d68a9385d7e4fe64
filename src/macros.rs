//! Small crate-wide convenience macros.

/// Lifecycle tracing to the browser console.  The branch is constant-folded
/// away in release builds so the hot event paths skip the formatting.
///
/// ```rust,ignore
/// debug_log!("portal {} mounted", portal_id);
/// ```
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {{
        if cfg!(debug_assertions) {
            $crate::macros::log_line(&format!($($arg)*));
        }
    }};
}

#[doc(hidden)]
pub fn log_line(line: &str) {
    // Host-side unit tests run without a JS runtime; calling into
    // `console` there would abort the test binary.
    #[cfg(target_arch = "wasm32")]
    web_sys::console::log_1(&format!("[popup] {}", line).into());
    #[cfg(not(target_arch = "wasm32"))]
    let _ = line;
}
