/// Main menu entries
pub const MAIN_MENU: &[&str] = &[
    "User Accounts",
    "Disk Usage Report",
    "System Information",
    "Quit",
];

/// Accounts submenu entries
pub const ACCOUNTS_MENU: &[&str] = &["Add User", "Delete User", "User Info", "Back"];

/// System information submenu entries
pub const SYSINFO_MENU: &[&str] = &[
    "Block Devices",
    "Mounted Filesystems",
    "Disk Usage Check",
    "I/O Statistics",
    "Back",
];

/// Top-level screens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    MainMenu,
    AccountsMenu,
    SysinfoMenu,
    Form,
    Viewer,
}

/// Which form is active
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    AddUser,
    DeleteUser,
    UserInfo,
    Report,
    UsageCheck,
}

impl FormKind {
    /// Form title shown in the popup border
    pub fn title(&self) -> &'static str {
        match self {
            FormKind::AddUser => " Add User ",
            FormKind::DeleteUser => " Delete User ",
            FormKind::UserInfo => " User Info ",
            FormKind::Report => " Disk Usage Report ",
            FormKind::UsageCheck => " Disk Usage Check ",
        }
    }
}

/// One labeled text field in a form
#[derive(Debug, Clone)]
pub struct FormField {
    /// Label shown left of the value
    pub label: &'static str,
    /// Hint shown while the value is empty
    pub hint: &'static str,
    /// Current value
    pub value: String,
    /// Render the value as dots (passwords)
    pub masked: bool,
}

impl FormField {
    /// Create an empty field
    pub fn new(label: &'static str, hint: &'static str) -> Self {
        Self {
            label,
            hint,
            value: String::new(),
            masked: false,
        }
    }

    /// Create an empty masked field
    pub fn masked(label: &'static str, hint: &'static str) -> Self {
        Self {
            masked: true,
            ..Self::new(label, hint)
        }
    }

    /// Pre-fill the field
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }
}

/// An in-progress form: fields, active field index, cursor within it
#[derive(Debug, Clone)]
pub struct FormState {
    pub kind: FormKind,
    pub fields: Vec<FormField>,
    pub active: usize,
    /// Byte offset of the cursor within the active field's value
    pub cursor: usize,
}

impl FormState {
    /// Create a form starting on its first field
    pub fn new(kind: FormKind, fields: Vec<FormField>) -> Self {
        Self {
            kind,
            fields,
            active: 0,
            cursor: 0,
        }
    }

    /// Trimmed value of field `index`
    pub fn value(&self, index: usize) -> &str {
        self.fields
            .get(index)
            .map(|f| f.value.trim())
            .unwrap_or("")
    }

    /// The field currently being edited
    pub fn active_field(&self) -> &FormField {
        &self.fields[self.active]
    }

    /// Whether the active field is the last one
    pub fn on_last_field(&self) -> bool {
        self.active + 1 >= self.fields.len()
    }

    /// Move to the next field, wrapping to the first
    pub fn next_field(&mut self) {
        self.active = (self.active + 1) % self.fields.len();
        self.cursor = self.fields[self.active].value.len();
    }

    /// Move to the previous field, wrapping to the last
    pub fn prev_field(&mut self) {
        self.active = (self.active + self.fields.len() - 1) % self.fields.len();
        self.cursor = self.fields[self.active].value.len();
    }

    /// Insert a character at the cursor
    pub fn input_char(&mut self, c: char) {
        // Fields are single-line
        if c == '\n' || c == '\r' {
            return;
        }
        let cursor = self.cursor;
        self.fields[self.active].value.insert(cursor, c);
        self.cursor += c.len_utf8();
    }

    /// Delete the character before the cursor
    pub fn input_backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let value = &mut self.fields[self.active].value;
        let prev = value[..self.cursor]
            .chars()
            .next_back()
            .map(|c| self.cursor - c.len_utf8())
            .unwrap_or(0);
        value.remove(prev);
        self.cursor = prev;
    }

    /// Delete the character at the cursor
    pub fn input_delete(&mut self) {
        let value = &mut self.fields[self.active].value;
        if self.cursor < value.len() {
            value.remove(self.cursor);
        }
    }

    /// Move the cursor one character left
    pub fn cursor_left(&mut self) {
        let value = &self.fields[self.active].value;
        if let Some(c) = value[..self.cursor].chars().next_back() {
            self.cursor -= c.len_utf8();
        }
    }

    /// Move the cursor one character right
    pub fn cursor_right(&mut self) {
        let value = &self.fields[self.active].value;
        if let Some(c) = value[self.cursor..].chars().next() {
            self.cursor += c.len_utf8();
        }
    }

    /// Move the cursor to the start of the field
    pub fn cursor_home(&mut self) {
        self.cursor = 0;
    }

    /// Move the cursor to the end of the field
    pub fn cursor_end(&mut self) {
        self.cursor = self.fields[self.active].value.len();
    }
}

/// Scrollable read-only text view
#[derive(Debug, Clone)]
pub struct ViewerState {
    pub title: String,
    pub content: String,
    pub scroll: u16,
}

impl ViewerState {
    /// Create a viewer at the top of the content
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            scroll: 0,
        }
    }

    /// Scroll down by `step` lines, clamped to the content length
    pub fn scroll_down(&mut self, step: u16) {
        let max = self.content.lines().count().saturating_sub(1) as u16;
        self.scroll = self.scroll.saturating_add(step).min(max);
    }

    /// Scroll up by `step` lines
    pub fn scroll_up(&mut self, step: u16) {
        self.scroll = self.scroll.saturating_sub(step);
    }
}

/// Action awaiting y/n confirmation
#[derive(Debug, Clone)]
pub enum ConfirmAction {
    DeleteUser {
        username: String,
        remove_home: bool,
        archive_home: bool,
    },
}

/// A pending confirmation popup
#[derive(Debug, Clone)]
pub struct ConfirmationState {
    pub action: ConfirmAction,
    pub message: String,
}

/// Application state
#[derive(Debug, Default)]
pub struct AppState {
    /// Current screen
    pub screen: Screen,
    /// Screen to return to when a form or viewer closes
    pub return_screen: Screen,
    /// Main menu cursor
    pub main_cursor: usize,
    /// Accounts menu cursor
    pub accounts_cursor: usize,
    /// System information menu cursor
    pub sysinfo_cursor: usize,
    /// Active form, when on the form screen
    pub form: Option<FormState>,
    /// Active viewer, when on the viewer screen
    pub viewer: Option<ViewerState>,
    /// Pending confirmation popup
    pub confirmation: Option<ConfirmationState>,
    /// Whether help popup is shown
    pub show_help: bool,
    /// Error message to display
    pub error_message: Option<String>,
    /// Status message to display (last completed action)
    pub status_message: Option<String>,
    /// Whether the app is running
    pub running: bool,
}

impl AppState {
    /// Create a new application state
    pub fn new() -> Self {
        Self {
            running: true,
            ..Self::default()
        }
    }

    /// Stop the application
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Toggle help popup
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Set the error message, clearing any status message
    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error_message = Some(message.into());
        self.status_message = None;
    }

    /// Clear the error message
    pub fn clear_error(&mut self) {
        self.error_message = None;
    }

    /// Set the status message, clearing any error
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
        self.error_message = None;
    }

    /// Items of the menu on the current screen
    pub fn menu_items(&self) -> &'static [&'static str] {
        match self.screen {
            Screen::MainMenu => MAIN_MENU,
            Screen::AccountsMenu => ACCOUNTS_MENU,
            Screen::SysinfoMenu => SYSINFO_MENU,
            _ => &[],
        }
    }

    /// Cursor of the menu on the current screen
    pub fn menu_cursor(&self) -> usize {
        match self.screen {
            Screen::MainMenu => self.main_cursor,
            Screen::AccountsMenu => self.accounts_cursor,
            Screen::SysinfoMenu => self.sysinfo_cursor,
            _ => 0,
        }
    }

    fn menu_cursor_mut(&mut self) -> Option<&mut usize> {
        match self.screen {
            Screen::MainMenu => Some(&mut self.main_cursor),
            Screen::AccountsMenu => Some(&mut self.accounts_cursor),
            Screen::SysinfoMenu => Some(&mut self.sysinfo_cursor),
            _ => None,
        }
    }

    /// Move the menu selection down, wrapping
    pub fn select_next(&mut self) {
        let len = self.menu_items().len();
        if let Some(cursor) = self.menu_cursor_mut() {
            if len > 0 {
                *cursor = (*cursor + 1) % len;
            }
        }
    }

    /// Move the menu selection up, wrapping
    pub fn select_previous(&mut self) {
        let len = self.menu_items().len();
        if let Some(cursor) = self.menu_cursor_mut() {
            if len > 0 {
                *cursor = (*cursor + len - 1) % len;
            }
        }
    }

    /// Open a form over the current screen
    pub fn open_form(&mut self, form: FormState) {
        self.return_screen = self.screen;
        self.form = Some(form);
        self.screen = Screen::Form;
        self.clear_error();
    }

    /// Close the form and return to the previous screen
    pub fn close_form(&mut self) {
        self.form = None;
        self.screen = self.return_screen;
    }

    /// Open the viewer.
    /// A viewer replacing a form inherits the form's return screen.
    pub fn open_viewer(&mut self, title: impl Into<String>, content: impl Into<String>) {
        if self.screen != Screen::Form {
            self.return_screen = self.screen;
        }
        self.form = None;
        self.viewer = Some(ViewerState::new(title, content));
        self.screen = Screen::Viewer;
    }

    /// Close the viewer and return to the previous screen
    pub fn close_viewer(&mut self) {
        self.viewer = None;
        self.screen = self.return_screen;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_menu_navigation_wraps() {
        let mut state = AppState::new();
        assert_eq!(state.menu_items().len(), MAIN_MENU.len());

        state.select_previous();
        assert_eq!(state.menu_cursor(), MAIN_MENU.len() - 1);
        state.select_next();
        assert_eq!(state.menu_cursor(), 0);
    }

    #[test]
    fn test_per_screen_cursors_are_independent() {
        let mut state = AppState::new();
        state.select_next();
        state.screen = Screen::AccountsMenu;
        assert_eq!(state.menu_cursor(), 0);
        state.select_next();
        state.screen = Screen::MainMenu;
        assert_eq!(state.menu_cursor(), 1);
    }

    #[test]
    fn test_form_open_close_restores_screen() {
        let mut state = AppState::new();
        state.screen = Screen::AccountsMenu;
        state.open_form(FormState::new(
            FormKind::UserInfo,
            vec![FormField::new("Username", "")],
        ));
        assert_eq!(state.screen, Screen::Form);
        state.close_form();
        assert_eq!(state.screen, Screen::AccountsMenu);
        assert!(state.form.is_none());
    }

    #[test]
    fn test_viewer_from_form_inherits_return_screen() {
        let mut state = AppState::new();
        state.screen = Screen::AccountsMenu;
        state.open_form(FormState::new(
            FormKind::UserInfo,
            vec![FormField::new("Username", "")],
        ));
        state.open_viewer("Info", "uid=0");
        assert_eq!(state.screen, Screen::Viewer);
        assert!(state.form.is_none());
        state.close_viewer();
        assert_eq!(state.screen, Screen::AccountsMenu);
    }

    #[test]
    fn test_form_editing() {
        let mut form = FormState::new(FormKind::AddUser, vec![FormField::new("Username", "")]);
        form.input_char('a');
        form.input_char('b');
        form.input_char('c');
        assert_eq!(form.value(0), "abc");

        form.cursor_left();
        form.input_backspace();
        assert_eq!(form.value(0), "ac");

        form.cursor_home();
        form.input_delete();
        assert_eq!(form.value(0), "c");

        form.cursor_end();
        assert_eq!(form.cursor, 1);
    }

    #[test]
    fn test_form_editing_multibyte() {
        let mut form = FormState::new(FormKind::AddUser, vec![FormField::new("Full name", "")]);
        form.input_char('é');
        form.input_char('x');
        form.cursor_left();
        form.cursor_left();
        form.cursor_right();
        form.input_backspace();
        assert_eq!(form.value(0), "x");
    }

    #[test]
    fn test_form_rejects_newlines() {
        let mut form = FormState::new(FormKind::AddUser, vec![FormField::new("Username", "")]);
        form.input_char('\n');
        form.input_char('a');
        assert_eq!(form.value(0), "a");
    }

    #[test]
    fn test_form_field_cycling() {
        let mut form = FormState::new(
            FormKind::AddUser,
            vec![
                FormField::new("Username", ""),
                FormField::new("Full name", "").with_value("Alice"),
            ],
        );
        assert!(!form.on_last_field());
        form.next_field();
        assert!(form.on_last_field());
        // Cursor lands at the end of the prefilled value
        assert_eq!(form.cursor, 5);
        form.next_field();
        assert_eq!(form.active, 0);
        form.prev_field();
        assert_eq!(form.active, 1);
    }

    #[test]
    fn test_viewer_scroll_clamps() {
        let mut viewer = ViewerState::new("t", "a\nb\nc\nd");
        viewer.scroll_down(10);
        assert_eq!(viewer.scroll, 3);
        viewer.scroll_up(1);
        assert_eq!(viewer.scroll, 2);
        viewer.scroll_up(10);
        assert_eq!(viewer.scroll, 0);
    }

    #[test]
    fn test_messages_displace_each_other() {
        let mut state = AppState::new();
        state.set_error("boom");
        state.set_status("done");
        assert_eq!(state.error_message, None);
        assert_eq!(state.status_message.as_deref(), Some("done"));
        state.set_error("boom again");
        assert_eq!(state.status_message, None);
    }
}
