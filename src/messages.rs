// src/messages.rs
//
// Inputs to the modal reducer and the side effects it asks the controller
// to perform.
//

/// Everything that can happen to one popup instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// The open action fired.  `target_within_root` is false when the
    /// event originated outside the controller's root element.
    Open { target_within_root: bool },

    /// Close with an event attached (dismiss button, explicit action).
    Close { cancelled: bool },

    /// Key pressed while the keyboard action is bound.
    KeyDown { key: String },

    /// A form inside the portal finished submitting.
    SubmitEnded { success: bool, within_form: bool },

    ContentLoaded { generation: u64, html: String },
    ContentFailed { generation: u64, status: Option<u16> },

    /// Controller teardown.  Closes without notifying the opener.
    Detach,
}

/// Side effects, executed by the controller in the order emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    // -- open ------------------------------------------------------------
    MountPortal { portal_id: String },
    FetchContent { url: String, generation: u64 },
    RenderDialog,
    BindDismiss,
    BindSubmissionEnd,
    LockScroll,
    ShowBackground,
    ShowDialog,

    // -- content ---------------------------------------------------------
    InjectContent(String),

    // -- close -----------------------------------------------------------
    /// Suppress the submission's own post-submit navigation and stop the
    /// signal from bubbling past the portal.
    StopSubmission,
    HideDialog,
    RemovePortal,
    AbortFetch,
    NotifyOpener { cancelled: bool },
    RemoveBackground,
    UnlockScroll,
}
