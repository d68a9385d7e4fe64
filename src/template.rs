//! Markup for the portal wrapper, the background overlay and the dialog.

use crate::config::ModalSize;

pub fn wrapper_html(portal_id: &str) -> String {
    format!(r#"<div id="{}" class="modal-portal"></div>"#, escape_html(portal_id))
}

/// Built-in full-viewport overlay, used when the trigger has no markup of
/// its own.
pub fn background_html(background_id: &str) -> String {
    format!(
        r#"<div id="{}" class="fixed top-0 left-0 w-full h-full" style="background-color: rgba(0, 0, 0, 0.8); z-index: 9998;"></div>"#,
        escape_html(background_id)
    )
}

/// Dialog shell with a spinner in the body; the fetched fragment replaces
/// the spinner once it arrives.
pub fn dialog_html(heading: &str, size: ModalSize) -> String {
    let dialog_class = match size.dialog_class() {
        Some(extra) => format!("modal-dialog modal-dialog-centered {}", extra),
        None => "modal-dialog modal-dialog-centered".to_string(),
    };

    format!(
        r#"
      <div data-popup-target="container" class="modal fade" data-backdrop="static" tabindex="-1" role="dialog" aria-labelledby="staticBackdrop" aria-hidden="true">
        <div class="{dialog_class}">
          <div class="modal-content">
            <div class="modal-header" data-popup-target="header">
              <h5 class="modal-title">{heading}</h5>

              <button type="button" class="close" data-dismiss="modal" aria-label="Close">
                <i aria-hidden="true" class="fas fa-times"></i>
              </button>
            </div>

            <div class="modal-body" data-popup-target="content">
              <span class="spinner-border text-secondary"></span>
            </div>
          </div>
        </div>
      </div>
    "#,
        dialog_class = dialog_class,
        heading = escape_html(heading),
    )
}

/// Minimal escaping for text and attribute values interpolated into markup.
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dialog_exposes_all_regions() {
        let html = dialog_html("Edit", ModalSize::Default);
        assert!(html.contains(r#"data-popup-target="container""#));
        assert!(html.contains(r#"data-popup-target="header""#));
        assert!(html.contains(r#"data-popup-target="content""#));
        assert!(html.contains(r#"data-dismiss="modal""#));
        assert!(html.contains("spinner-border"));
        assert!(html.contains(r#"<h5 class="modal-title">Edit</h5>"#));
        assert!(html.contains(r#"class="modal-dialog modal-dialog-centered""#));
    }

    #[test]
    fn size_variant_adds_dialog_class() {
        let html = dialog_html("Edit", ModalSize::Large);
        assert!(html.contains(r#"class="modal-dialog modal-dialog-centered modal-lg""#));
    }

    #[test]
    fn heading_is_escaped() {
        let html = dialog_html("<b>Tom & Jerry</b>", ModalSize::Default);
        assert!(html.contains("&lt;b&gt;Tom &amp; Jerry&lt;/b&gt;"));
        assert!(!html.contains("<b>"));
    }

    #[test]
    fn wrapper_and_background_carry_ids() {
        assert_eq!(
            wrapper_html("modal-wrapper-1"),
            r#"<div id="modal-wrapper-1" class="modal-portal"></div>"#
        );
        let bg = background_html("modal-background");
        assert!(bg.starts_with(r#"<div id="modal-background""#));
        assert!(bg.contains("z-index: 9998"));
    }
}
