//! Modal lifecycle state machine.
//!
//! `ModalState::update` is a pure reducer: it owns the open/closed flag and
//! the fetch generation, and answers every [`Message`] with the ordered list
//! of [`Command`]s the controller must run.  All idempotence rules live
//! here; the controller never second-guesses them.

use crate::constants::{ESCAPE_KEY, PORTAL_ID_PREFIX};
use crate::debug_log;
use crate::messages::{Command, Message};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentStatus {
    Loading,
    Loaded,
    /// Non-2xx status or a network error (`None`).  The spinner stays.
    Failed(Option<u16>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Closed,
    Open {
        portal_id: String,
        generation: u64,
        content: ContentStatus,
    },
}

#[derive(Debug, Clone)]
pub struct ModalState {
    url: String,
    phase: Phase,
    /// Bumped on every open so late fetch results can be told apart.
    generation: u64,
}

impl ModalState {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            phase: Phase::Closed,
            generation: 0,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn is_open(&self) -> bool {
        matches!(self.phase, Phase::Open { .. })
    }

    pub fn portal_id(&self) -> Option<&str> {
        match &self.phase {
            Phase::Open { portal_id, .. } => Some(portal_id),
            Phase::Closed => None,
        }
    }

    pub fn content_status(&self) -> Option<&ContentStatus> {
        match &self.phase {
            Phase::Open { content, .. } => Some(content),
            Phase::Closed => None,
        }
    }

    pub fn update(&mut self, msg: Message) -> Vec<Command> {
        match msg {
            Message::Open { target_within_root } => {
                if !target_within_root {
                    debug_log!("open ignored: event target outside the popup root");
                    return Vec::new();
                }
                self.open()
            }
            Message::Close { cancelled } => self.close(Some(cancelled)),
            Message::KeyDown { key } => {
                if key == ESCAPE_KEY {
                    self.close(Some(true))
                } else {
                    Vec::new()
                }
            }
            Message::SubmitEnded { success, within_form } => {
                // A failed submission re-renders the form; leave the modal
                // up so the user can correct it.
                if !success || !within_form || !self.is_open() {
                    return Vec::new();
                }
                let mut commands = vec![Command::StopSubmission];
                commands.extend(self.close(Some(false)));
                commands
            }
            Message::ContentLoaded { generation, html } => {
                match self.current_content(generation) {
                    Some(content) => {
                        *content = ContentStatus::Loaded;
                        vec![Command::InjectContent(html)]
                    }
                    None => {
                        debug_log!("dropping stale fragment for generation {}", generation);
                        Vec::new()
                    }
                }
            }
            Message::ContentFailed { generation, status } => {
                if let Some(content) = self.current_content(generation) {
                    *content = ContentStatus::Failed(status);
                }
                Vec::new()
            }
            Message::Detach => self.close(None),
        }
    }

    fn open(&mut self) -> Vec<Command> {
        if self.is_open() {
            return Vec::new();
        }

        self.generation += 1;
        let portal_id = new_portal_id();
        self.phase = Phase::Open {
            portal_id: portal_id.clone(),
            generation: self.generation,
            content: ContentStatus::Loading,
        };
        debug_log!("opening {} (generation {})", portal_id, self.generation);

        vec![
            Command::MountPortal { portal_id },
            Command::FetchContent {
                url: self.url.clone(),
                generation: self.generation,
            },
            Command::RenderDialog,
            Command::BindDismiss,
            Command::BindSubmissionEnd,
            Command::LockScroll,
            Command::ShowBackground,
            Command::ShowDialog,
        ]
    }

    /// `notify` carries the cancelled flag for closes that came with an
    /// event; teardown passes `None` and the opener hears nothing.
    fn close(&mut self, notify: Option<bool>) -> Vec<Command> {
        if !self.is_open() {
            return Vec::new();
        }
        self.phase = Phase::Closed;

        let mut commands = vec![Command::HideDialog, Command::RemovePortal, Command::AbortFetch];
        if let Some(cancelled) = notify {
            commands.push(Command::NotifyOpener { cancelled });
        }
        commands.push(Command::RemoveBackground);
        commands.push(Command::UnlockScroll);
        commands
    }

    fn current_content(&mut self, generation: u64) -> Option<&mut ContentStatus> {
        match &mut self.phase {
            Phase::Open {
                generation: current,
                content,
                ..
            } if *current == generation => Some(content),
            _ => None,
        }
    }
}

pub fn new_portal_id() -> String {
    format!("{}{}", PORTAL_ID_PREFIX, uuid::Uuid::new_v4().simple())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn opened() -> (ModalState, Vec<Command>) {
        let mut state = ModalState::new("/items/5/edit");
        let commands = state.update(Message::Open { target_within_root: true });
        (state, commands)
    }

    fn count(commands: &[Command], wanted: &Command) -> usize {
        commands.iter().filter(|c| *c == wanted).count()
    }

    #[test]
    fn open_emits_full_sequence_in_order() {
        let (state, commands) = opened();
        let portal_id = state.portal_id().unwrap().to_string();
        assert!(portal_id.starts_with("modal-wrapper-"));

        assert_eq!(
            commands,
            vec![
                Command::MountPortal { portal_id },
                Command::FetchContent { url: "/items/5/edit".into(), generation: 1 },
                Command::RenderDialog,
                Command::BindDismiss,
                Command::BindSubmissionEnd,
                Command::LockScroll,
                Command::ShowBackground,
                Command::ShowDialog,
            ]
        );
        assert_eq!(state.content_status(), Some(&ContentStatus::Loading));
    }

    #[test]
    fn reopen_is_a_no_op() {
        let (mut state, _) = opened();
        let portal_before = state.portal_id().map(str::to_string);

        assert!(state.update(Message::Open { target_within_root: true }).is_empty());
        assert_eq!(state.portal_id().map(str::to_string), portal_before);
    }

    #[test]
    fn open_from_foreign_target_is_ignored() {
        let mut state = ModalState::new("/x");
        assert!(state.update(Message::Open { target_within_root: false }).is_empty());
        assert!(!state.is_open());
    }

    #[test]
    fn close_when_closed_is_a_no_op() {
        let mut state = ModalState::new("/x");
        assert!(state.update(Message::Close { cancelled: true }).is_empty());
        assert!(state.update(Message::Detach).is_empty());
    }

    #[test]
    fn escape_closes_as_cancelled() {
        let (mut state, _) = opened();
        let commands = state.update(Message::KeyDown { key: "Escape".into() });
        assert_eq!(
            commands,
            vec![
                Command::HideDialog,
                Command::RemovePortal,
                Command::AbortFetch,
                Command::NotifyOpener { cancelled: true },
                Command::RemoveBackground,
                Command::UnlockScroll,
            ]
        );
        assert!(!state.is_open());
    }

    #[test]
    fn other_keys_leave_modal_open() {
        let (mut state, _) = opened();
        assert!(state.update(Message::KeyDown { key: "Enter".into() }).is_empty());
        assert!(state.is_open());
    }

    #[test]
    fn successful_submission_completes() {
        let (mut state, _) = opened();
        let commands = state.update(Message::SubmitEnded { success: true, within_form: true });
        assert_eq!(commands.first(), Some(&Command::StopSubmission));
        assert_eq!(count(&commands, &Command::NotifyOpener { cancelled: false }), 1);
        assert!(!state.is_open());
    }

    #[test]
    fn failed_submission_keeps_modal_open() {
        let (mut state, _) = opened();
        assert!(state.update(Message::SubmitEnded { success: false, within_form: true }).is_empty());
        assert!(state.update(Message::SubmitEnded { success: true, within_form: false }).is_empty());
        assert!(state.is_open());
    }

    #[test]
    fn detach_closes_without_notification() {
        let (mut state, _) = opened();
        let commands = state.update(Message::Detach);
        assert!(commands.contains(&Command::UnlockScroll));
        assert!(!commands.iter().any(|c| matches!(c, Command::NotifyOpener { .. })));
    }

    #[test]
    fn fragment_injected_only_for_current_generation() {
        let (mut state, _) = opened();
        assert_eq!(
            state.update(Message::ContentLoaded { generation: 1, html: "<form></form>".into() }),
            vec![Command::InjectContent("<form></form>".into())]
        );
        assert_eq!(state.content_status(), Some(&ContentStatus::Loaded));

        state.update(Message::Close { cancelled: true });
        state.update(Message::Open { target_within_root: true });
        // generation 1 resolved late, after a close and a reopen
        assert!(state
            .update(Message::ContentLoaded { generation: 1, html: "late".into() })
            .is_empty());
        assert_eq!(state.content_status(), Some(&ContentStatus::Loading));
    }

    #[test]
    fn late_fragment_after_close_is_dropped() {
        let (mut state, _) = opened();
        state.update(Message::Close { cancelled: true });
        assert!(state
            .update(Message::ContentLoaded { generation: 1, html: "late".into() })
            .is_empty());
    }

    #[test]
    fn failed_fetch_keeps_spinner() {
        let (mut state, _) = opened();
        assert!(state.update(Message::ContentFailed { generation: 1, status: Some(500) }).is_empty());
        assert_eq!(state.content_status(), Some(&ContentStatus::Failed(Some(500))));
        assert!(state.is_open());
    }

    fn message_strategy() -> impl Strategy<Value = Message> {
        prop_oneof![
            any::<bool>().prop_map(|inside| Message::Open { target_within_root: inside }),
            any::<bool>().prop_map(|cancelled| Message::Close { cancelled }),
            prop_oneof![Just("Escape".to_string()), Just("a".to_string())]
                .prop_map(|key| Message::KeyDown { key }),
            (any::<bool>(), any::<bool>())
                .prop_map(|(success, within_form)| Message::SubmitEnded { success, within_form }),
            (0u64..4).prop_map(|generation| Message::ContentLoaded { generation, html: String::new() }),
            Just(Message::Detach),
        ]
    }

    proptest! {
        /// Open side effects and close side effects stay paired 1:1 for any
        /// interleaving of inputs.
        #[test]
        fn side_effects_stay_paired(messages in prop::collection::vec(message_strategy(), 0..40)) {
            let mut state = ModalState::new("/x");
            let mut all = Vec::new();
            for msg in messages {
                all.extend(state.update(msg));
            }

            let open = usize::from(state.is_open());
            let locks = count(&all, &Command::LockScroll);
            let unlocks = count(&all, &Command::UnlockScroll);
            prop_assert_eq!(locks, unlocks + open);

            let mounts = all.iter().filter(|c| matches!(c, Command::MountPortal { .. })).count();
            let removals = count(&all, &Command::RemovePortal);
            prop_assert_eq!(mounts, removals + open);

            let notifications = all.iter().filter(|c| matches!(c, Command::NotifyOpener { .. })).count();
            prop_assert!(notifications <= removals);
        }
    }
}
