//! Declarative action descriptors as written in `data-action`.
//!
//! The component host binds DOM events to controller methods from strings
//! such as `click->popup#openModal keydown@window->popup#closeWithKeyboard`.
//! Parsing lives here so the opener lookup in `config` and the binding loop
//! in `host` agree on one grammar.

use crate::constants::{
    CLOSE_WITH_KEYBOARD_METHOD, CONTROLLER_IDENTIFIER, OPEN_METHOD,
};

/// Where the listener for an action is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerScope {
    /// The element carrying the `data-action` attribute.
    Element,
    Window,
    Document,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionDescriptor {
    /// `None` means "the default event for this element's tag".
    pub event: Option<String>,
    pub scope: ListenerScope,
    pub controller: String,
    pub method: String,
    /// `:stop`, `:prevent` and similar suffixes after the method.
    pub options: Vec<String>,
}

impl ActionDescriptor {
    /// Parse a single descriptor token.  Returns `None` for malformed tokens
    /// so one typo does not disable the remaining actions on the element.
    pub fn parse(token: &str) -> Option<Self> {
        let token = token.trim();
        if token.is_empty() {
            return None;
        }

        let (event_part, handler) = match token.split_once("->") {
            Some((event, handler)) => (Some(event), handler),
            None => (None, token),
        };

        let (controller, method_part) = handler.split_once('#')?;
        let mut method_and_options = method_part.split(':');
        let method = method_and_options.next().unwrap_or_default();
        let options: Vec<String> = method_and_options
            .filter(|option| !option.is_empty())
            .map(str::to_string)
            .collect();
        if controller.is_empty() || method.is_empty() {
            return None;
        }

        let (event, scope) = match event_part {
            None => (None, ListenerScope::Element),
            Some(raw) => {
                let (name, scope) = match raw.split_once('@') {
                    Some((name, "window")) => (name, ListenerScope::Window),
                    Some((name, "document")) => (name, ListenerScope::Document),
                    Some(_) => return None,
                    None => (raw, ListenerScope::Element),
                };
                if name.is_empty() {
                    return None;
                }
                (Some(name.to_string()), scope)
            }
        };

        Some(Self {
            event,
            scope,
            controller: controller.to_string(),
            method: method.to_string(),
            options,
        })
    }

    /// Resolve the DOM event name, falling back to the tag's default event.
    pub fn event_name(&self, tag_name: &str, input_type: Option<&str>) -> Option<String> {
        self.event
            .clone()
            .or_else(|| default_event_for(tag_name, input_type).map(str::to_string))
    }

    pub fn has_option(&self, option: &str) -> bool {
        self.options.iter().any(|o| o == option)
    }

    pub fn targets(&self, controller: &str, method: &str) -> bool {
        self.controller == controller && self.method == method
    }
}

/// Parse a whole `data-action` attribute value.
pub fn parse_actions(value: &str) -> Vec<ActionDescriptor> {
    value
        .split_whitespace()
        .filter_map(ActionDescriptor::parse)
        .collect()
}

/// True when the attribute value binds `popup#openModal`.
pub fn binds_open(value: &str) -> bool {
    parse_actions(value)
        .iter()
        .any(|a| a.targets(CONTROLLER_IDENTIFIER, OPEN_METHOD))
}

/// The action string a server-side link helper puts on a popup link.
pub fn popup_link_actions() -> String {
    format!(
        "click->{c}#{open} keydown@window->{c}#{close}",
        c = CONTROLLER_IDENTIFIER,
        open = OPEN_METHOD,
        close = CLOSE_WITH_KEYBOARD_METHOD,
    )
}

/// Event used when a descriptor omits it, keyed on the element tag.
pub fn default_event_for(tag_name: &str, input_type: Option<&str>) -> Option<&'static str> {
    match tag_name.to_ascii_lowercase().as_str() {
        "a" | "button" => Some("click"),
        "form" => Some("submit"),
        "input" => match input_type.map(str::to_ascii_lowercase).as_deref() {
            Some("submit") => Some("click"),
            _ => Some("input"),
        },
        "textarea" => Some("input"),
        "select" => Some("change"),
        "details" => Some("toggle"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_link_helper_actions() {
        let actions = parse_actions(&popup_link_actions());
        assert_eq!(actions.len(), 2);

        assert_eq!(actions[0].event.as_deref(), Some("click"));
        assert_eq!(actions[0].scope, ListenerScope::Element);
        assert!(actions[0].targets("popup", "openModal"));

        assert_eq!(actions[1].event.as_deref(), Some("keydown"));
        assert_eq!(actions[1].scope, ListenerScope::Window);
        assert!(actions[1].targets("popup", "closeWithKeyboard"));
    }

    #[test]
    fn event_less_descriptor_uses_tag_default() {
        let action = ActionDescriptor::parse("popup#openModal").unwrap();
        assert_eq!(action.event, None);
        assert_eq!(action.event_name("A", None).as_deref(), Some("click"));
        assert_eq!(action.event_name("form", None).as_deref(), Some("submit"));
        assert_eq!(action.event_name("input", Some("submit")).as_deref(), Some("click"));
        assert_eq!(action.event_name("div", None), None);
    }

    #[test]
    fn malformed_tokens_are_skipped() {
        let actions = parse_actions("click->popup nonsense click@nowhere->popup#x ->popup#y click->popup#openModal");
        assert_eq!(actions.len(), 1);
        assert!(actions[0].targets("popup", "openModal"));
    }

    #[test]
    fn binds_open_requires_exact_method() {
        assert!(binds_open("click->popup#openModal"));
        assert!(binds_open("other#thing click->popup#openModal"));
        assert!(!binds_open("click->popup#openModalLater"));
        assert!(!binds_open("click->popover#openModal"));
        assert!(!binds_open(""));
    }

    #[test]
    fn method_options_are_split_off() {
        assert!(binds_open("click->popup#openModal:prevent"));
        assert!(!binds_open("click->popup#openModalLater:prevent"));

        let action = ActionDescriptor::parse("click->popup#close:stop:prevent").unwrap();
        assert!(action.targets("popup", "close"));
        assert_eq!(action.options, vec!["stop".to_string(), "prevent".to_string()]);
        assert!(action.has_option("stop"));
        assert!(!action.has_option("once"));

        assert!(ActionDescriptor::parse("click->popup#:prevent").is_none());
    }
}
