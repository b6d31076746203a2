//! Multi-page wizard navigation.
//!
//! [`WizardPageState`] tracks where the user is in an ordered page list.
//! [`WizardNavigation`] turns that position plus a set of
//! [`NavigationFlags`] into the button bar shown at the bottom of every
//! closeout page, and dispatches clicks to a [`WizardHandlers`]
//! implementation.

use crate::domain::WizardError;

/// Position of the current page within the page list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagePosition {
    First,
    Middle,
    /// Also reported for a single-page list.
    Last,
}

/// Current page plus the validity of its form.
///
/// # Examples
///
/// ```
/// use ppm_closeout::application::{PagePosition, WizardPageState};
///
/// let pages = vec!["about".to_string(), "review".to_string()];
/// let mut state = WizardPageState::new(pages, "about").unwrap();
/// assert_eq!(state.position(), PagePosition::First);
/// assert!(state.advance());
/// assert_eq!(state.current_page_key(), "review");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardPageState {
    page_list: Vec<String>,
    current: usize,
    /// Whether the current page's form passes validation.
    pub is_valid: bool,
    /// Whether a submit for the current page is in flight.
    pub is_submitting: bool,
}

impl WizardPageState {
    /// Creates a state positioned on `current_page_key`.
    ///
    /// # Errors
    ///
    /// [`WizardError::EmptyPageList`] when `page_list` is empty and
    /// [`WizardError::UnknownPage`] when the key is not in the list.
    pub fn new(page_list: Vec<String>, current_page_key: &str) -> Result<Self, WizardError> {
        if page_list.is_empty() {
            return Err(WizardError::EmptyPageList);
        }
        let current = page_list
            .iter()
            .position(|key| key == current_page_key)
            .ok_or_else(|| WizardError::UnknownPage(current_page_key.to_string()))?;
        Ok(Self {
            page_list,
            current,
            is_valid: false,
            is_submitting: false,
        })
    }

    pub fn current_page_key(&self) -> &str {
        &self.page_list[self.current]
    }

    pub fn page_list(&self) -> &[String] {
        &self.page_list
    }

    pub fn index(&self) -> usize {
        self.current
    }

    pub fn position(&self) -> PagePosition {
        if self.current + 1 == self.page_list.len() {
            PagePosition::Last
        } else if self.current == 0 {
            PagePosition::First
        } else {
            PagePosition::Middle
        }
    }

    pub fn is_first_page(&self) -> bool {
        self.current == 0
    }

    pub fn is_last_page(&self) -> bool {
        self.position() == PagePosition::Last
    }

    /// Moves to the next page. Returns false on the last page.
    pub fn advance(&mut self) -> bool {
        if self.is_last_page() {
            return false;
        }
        self.current += 1;
        self.is_valid = false;
        self.is_submitting = false;
        true
    }

    /// Moves to the previous page. Returns false on the first page.
    pub fn go_back(&mut self) -> bool {
        if self.is_first_page() {
            return false;
        }
        self.current -= 1;
        self.is_valid = false;
        self.is_submitting = false;
        true
    }

    /// Jumps to a named page, e.g. when editing an item from the review.
    pub fn go_to(&mut self, page_key: &str) -> Result<(), WizardError> {
        let index = self
            .page_list
            .iter()
            .position(|key| key == page_key)
            .ok_or_else(|| WizardError::UnknownPage(page_key.to_string()))?;
        self.current = index;
        self.is_valid = false;
        self.is_submitting = false;
        Ok(())
    }

    /// Replaces the page list, keeping the current key when it survives.
    ///
    /// Used when an answer changes which pages apply (e.g. pro-gear).
    pub fn replace_pages(&mut self, page_list: Vec<String>) -> Result<(), WizardError> {
        let key = self.current_page_key().to_string();
        let replacement = Self::new(page_list, &key)?;
        self.page_list = replacement.page_list;
        self.current = replacement.current;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NavigationFlags {
    /// Editing one item reached from the review page.
    pub edit_mode: bool,
    /// The closeout was submitted; nothing can change.
    pub read_only: bool,
    pub show_finish_later: bool,
    pub show_add_shipment: bool,
}

/// Everything a button in the bar can do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WizardAction {
    Back,
    Next,
    Complete,
    Save,
    Cancel,
    AddShipment,
    ReturnHome,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionButton {
    pub action: WizardAction,
    pub label: &'static str,
    pub enabled: bool,
}

impl ActionButton {
    fn new(action: WizardAction, label: &'static str, enabled: bool) -> Self {
        Self { action, label, enabled }
    }
}

/// Callbacks fired by [`WizardNavigation::click`].
///
/// `on_next_click` handles Next, Complete and Save alike; the caller knows
/// which from the page it is on.
pub trait WizardHandlers {
    fn on_back_click(&mut self);
    fn on_next_click(&mut self);
    fn on_cancel_click(&mut self);
    fn on_add_shipment_click(&mut self) {}
    fn on_return_home_click(&mut self) {}
}

/// Computes and dispatches the navigation buttons for one render.
#[derive(Debug, Clone, Copy)]
pub struct WizardNavigation<'a> {
    state: &'a WizardPageState,
    flags: NavigationFlags,
}

impl<'a> WizardNavigation<'a> {
    pub fn new(state: &'a WizardPageState, flags: NavigationFlags) -> Self {
        Self { state, flags }
    }

    /// Buttons in display order.
    pub fn actions(&self) -> Vec<ActionButton> {
        if self.flags.read_only {
            return vec![ActionButton::new(WizardAction::ReturnHome, "Return home", true)];
        }

        let mut buttons = Vec::new();
        if !self.state.is_first_page() && !self.flags.edit_mode {
            buttons.push(ActionButton::new(WizardAction::Back, "Back", true));
        }

        let forward_enabled = self.state.is_valid && !self.state.is_submitting;
        let forward = if self.flags.edit_mode {
            ActionButton::new(WizardAction::Save, "Save", forward_enabled)
        } else if self.state.is_last_page() {
            ActionButton::new(WizardAction::Complete, "Complete", forward_enabled)
        } else {
            ActionButton::new(WizardAction::Next, "Next", forward_enabled)
        };
        buttons.push(forward);

        if self.flags.show_finish_later || self.flags.edit_mode {
            let label = if self.flags.edit_mode { "Cancel" } else { "Finish later" };
            buttons.push(ActionButton::new(WizardAction::Cancel, label, true));
        }
        if self.flags.show_add_shipment {
            let add = ActionButton::new(WizardAction::AddShipment, "Add another shipment", true);
            buttons.push(add);
        }
        buttons
    }

    pub fn button(&self, action: WizardAction) -> Option<ActionButton> {
        self.actions().into_iter().find(|button| button.action == action)
    }

    /// The forward button (Next, Complete or Save) if shown.
    pub fn forward_button(&self) -> Option<ActionButton> {
        self.actions().into_iter().find(|button| {
            matches!(
                button.action,
                WizardAction::Next | WizardAction::Complete | WizardAction::Save
            )
        })
    }

    /// Fires the handler for `action` when its button is shown and enabled.
    ///
    /// Returns whether a handler ran.
    pub fn click(&self, action: WizardAction, handlers: &mut impl WizardHandlers) -> bool {
        match self.button(action) {
            Some(button) if button.enabled => {}
            _ => return false,
        }
        match action {
            WizardAction::Back => handlers.on_back_click(),
            WizardAction::Next | WizardAction::Complete | WizardAction::Save => {
                handlers.on_next_click()
            }
            WizardAction::Cancel => handlers.on_cancel_click(),
            WizardAction::AddShipment => handlers.on_add_shipment_click(),
            WizardAction::ReturnHome => handlers.on_return_home_click(),
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Clicks {
        back: usize,
        next: usize,
        cancel: usize,
        add_shipment: usize,
        home: usize,
    }

    impl WizardHandlers for Clicks {
        fn on_back_click(&mut self) {
            self.back += 1;
        }
        fn on_next_click(&mut self) {
            self.next += 1;
        }
        fn on_cancel_click(&mut self) {
            self.cancel += 1;
        }
        fn on_add_shipment_click(&mut self) {
            self.add_shipment += 1;
        }
        fn on_return_home_click(&mut self) {
            self.home += 1;
        }
    }

    fn pages(keys: &[&str]) -> Vec<String> {
        keys.iter().map(|k| k.to_string()).collect()
    }

    fn labels(nav: &WizardNavigation) -> Vec<&'static str> {
        nav.actions().iter().map(|b| b.label).collect()
    }

    #[test]
    fn test_new_rejects_bad_input() {
        assert_eq!(WizardPageState::new(Vec::new(), "a"), Err(WizardError::EmptyPageList));
        assert_eq!(
            WizardPageState::new(pages(&["a"]), "b"),
            Err(WizardError::UnknownPage("b".to_string()))
        );
    }

    #[test]
    fn test_positions() {
        let mut state = WizardPageState::new(pages(&["a", "b", "c"]), "a").unwrap();
        assert_eq!(state.position(), PagePosition::First);
        assert!(!state.go_back());

        assert!(state.advance());
        assert_eq!(state.position(), PagePosition::Middle);
        assert!(state.advance());
        assert_eq!(state.position(), PagePosition::Last);
        assert!(!state.advance());
        assert_eq!(state.current_page_key(), "c");

        let single = WizardPageState::new(pages(&["only"]), "only").unwrap();
        assert_eq!(single.position(), PagePosition::Last);
        assert!(single.is_first_page());
    }

    #[test]
    fn test_no_back_on_first_page() {
        let mut state = WizardPageState::new(pages(&["a", "b"]), "a").unwrap();
        state.is_valid = true;
        let nav = WizardNavigation::new(&state, NavigationFlags::default());

        assert!(nav.button(WizardAction::Back).is_none());
        assert_eq!(labels(&nav), vec!["Next"]);

        let mut clicks = Clicks::default();
        assert!(!nav.click(WizardAction::Back, &mut clicks));
        assert_eq!(clicks.back, 0);
    }

    #[test]
    fn test_disabled_next_never_fires() {
        let mut state = WizardPageState::new(pages(&["a", "b"]), "a").unwrap();
        let mut clicks = Clicks::default();

        for submitting in [false, true] {
            state.is_valid = false;
            state.is_submitting = submitting;
            let nav = WizardNavigation::new(&state, NavigationFlags::default());
            assert_eq!(nav.forward_button().map(|b| b.enabled), Some(false));
            assert!(!nav.click(WizardAction::Next, &mut clicks));
        }

        state.is_valid = true;
        state.is_submitting = true;
        let nav = WizardNavigation::new(&state, NavigationFlags::default());
        assert!(!nav.click(WizardAction::Next, &mut clicks));
        assert_eq!(clicks.next, 0);

        state.is_submitting = false;
        let nav = WizardNavigation::new(&state, NavigationFlags::default());
        assert!(nav.click(WizardAction::Next, &mut clicks));
        assert_eq!(clicks.next, 1);
    }

    #[test]
    fn test_last_page_completes() {
        let mut state = WizardPageState::new(pages(&["a", "b"]), "b").unwrap();
        state.is_valid = true;
        let flags = NavigationFlags { show_finish_later: true, ..Default::default() };
        let nav = WizardNavigation::new(&state, flags);

        assert_eq!(labels(&nav), vec!["Back", "Complete", "Finish later"]);

        let mut clicks = Clicks::default();
        assert!(!nav.click(WizardAction::Next, &mut clicks));
        assert!(nav.click(WizardAction::Complete, &mut clicks));
        assert!(nav.click(WizardAction::Cancel, &mut clicks));
        assert!(nav.click(WizardAction::Back, &mut clicks));
        assert_eq!((clicks.next, clicks.cancel, clicks.back), (1, 1, 1));
    }

    #[test]
    fn test_edit_mode_buttons() {
        let mut state = WizardPageState::new(pages(&["a", "b", "c"]), "b").unwrap();
        state.is_valid = true;
        let flags = NavigationFlags { edit_mode: true, ..Default::default() };
        let nav = WizardNavigation::new(&state, flags);

        assert_eq!(labels(&nav), vec!["Save", "Cancel"]);

        let mut clicks = Clicks::default();
        assert!(nav.click(WizardAction::Save, &mut clicks));
        assert_eq!(clicks.next, 1);
    }

    #[test]
    fn test_read_only_only_returns_home() {
        let mut state = WizardPageState::new(pages(&["a", "b"]), "b").unwrap();
        state.is_valid = true;
        let flags = NavigationFlags {
            read_only: true,
            show_finish_later: true,
            show_add_shipment: true,
            ..Default::default()
        };
        let nav = WizardNavigation::new(&state, flags);
        assert_eq!(labels(&nav), vec!["Return home"]);

        let mut clicks = Clicks::default();
        assert!(!nav.click(WizardAction::Complete, &mut clicks));
        assert!(nav.click(WizardAction::ReturnHome, &mut clicks));
        assert_eq!((clicks.next, clicks.home), (0, 1));
    }

    #[test]
    fn test_add_shipment_button() {
        let state = WizardPageState::new(pages(&["a", "b"]), "a").unwrap();
        let flags = NavigationFlags { show_add_shipment: true, ..Default::default() };
        let nav = WizardNavigation::new(&state, flags);

        let mut clicks = Clicks::default();
        assert!(nav.click(WizardAction::AddShipment, &mut clicks));
        assert_eq!(clicks.add_shipment, 1);
    }

    #[test]
    fn test_replace_pages_keeps_position() {
        let mut state =
            WizardPageState::new(pages(&["about", "weight", "review"]), "weight").unwrap();
        state.replace_pages(pages(&["about", "weight", "pro-gear", "review"])).unwrap();
        assert_eq!(state.current_page_key(), "weight");
        assert!(state.advance());
        assert_eq!(state.current_page_key(), "pro-gear");

        assert!(state.replace_pages(pages(&["about", "review"])).is_err());
        assert_eq!(state.current_page_key(), "pro-gear");
    }
}
