use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyModifiers};
use ratatui::{backend::CrosstermBackend, Frame, Terminal};
use std::io;
use std::time::Duration;

use hostadm_core::accounts::{Accounts, NewUser};
use hostadm_core::report::{
    render, ReportConfig, ReportError, ReportGenerator, ReportOptions,
};
use hostadm_core::sysinfo::SystemInfo;

use crate::audit::{ts_now, AuditEvent, AuditLogger};
use crate::config::Settings;
use crate::state::{
    AppState, ConfirmAction, ConfirmationState, FormField, FormKind, FormState, Screen,
    ACCOUNTS_MENU, MAIN_MENU, SYSINFO_MENU,
};

use super::components::{ConfirmationPopup, Form, HelpPopup, Menu, StatusBar, Viewer};
use super::Layout;

/// Main application
pub struct App {
    state: AppState,
    settings: Settings,
    generator: ReportGenerator,
    accounts: Accounts,
    sysinfo: SystemInfo,
    audit: AuditLogger,
    layout: Layout,
}

impl App {
    /// Create a new application
    pub fn new(settings: Settings) -> Self {
        let config = ReportConfig::with_additional_excludes(&settings.report.additional_excludes);
        let generator = ReportGenerator::new(config);
        let accounts = Accounts::new(settings.accounts.archive_dir.clone());
        let audit = AuditLogger::new(settings.audit.enabled, settings.audit.max_size_bytes);

        Self {
            state: AppState::new(),
            settings,
            generator,
            accounts,
            sysinfo: SystemInfo::new(),
            audit,
            layout: Layout::new(),
        }
    }

    /// Run the application
    pub fn run(&mut self) -> Result<()> {
        // Setup terminal
        crossterm::terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        crossterm::execute!(stdout, crossterm::terminal::EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.main_loop(&mut terminal);

        // Restore terminal
        crossterm::terminal::disable_raw_mode()?;
        crossterm::execute!(
            terminal.backend_mut(),
            crossterm::terminal::LeaveAlternateScreen
        )?;
        terminal.show_cursor()?;

        result
    }

    fn main_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        loop {
            if !self.state.running {
                break;
            }

            terminal.draw(|frame| self.draw(frame))?;

            // Handle events with timeout
            if event::poll(Duration::from_millis(250))? {
                if let Event::Key(key) = event::read()? {
                    self.handle_key(key.code, key.modifiers);
                }
            }
        }

        Ok(())
    }

    /// Draw the current screen
    fn draw(&self, frame: &mut Frame) {
        let areas = self.layout.calculate(frame.area());

        match self.state.screen {
            Screen::MainMenu | Screen::AccountsMenu | Screen::SysinfoMenu => {
                Self::draw_menu(frame, areas.body, self.state.screen, &self.state);
            }
            Screen::Form => {
                // Keep the menu the form came from as the backdrop
                Self::draw_menu(frame, areas.body, self.state.return_screen, &self.state);
                if let Some(form) = &self.state.form {
                    let height_pct =
                        (u32::from(Form::required_height(form)) * 100 / u32::from(frame.area().height.max(1)))
                            .clamp(30, 90) as u16;
                    let popup_area = self.layout.popup_area(frame.area(), 70, height_pct);
                    Form::render(frame, popup_area, form);
                }
            }
            Screen::Viewer => {
                if let Some(viewer) = &self.state.viewer {
                    Viewer::render(frame, areas.body, viewer);
                }
            }
        }

        // Render popups
        if let Some(confirmation) = &self.state.confirmation {
            let popup_area = self.layout.popup_area(frame.area(), 50, 30);
            ConfirmationPopup::render(frame, popup_area, confirmation);
        }

        if self.state.show_help {
            let popup_area = self.layout.popup_area(frame.area(), 60, 70);
            HelpPopup::render(frame, popup_area);
        }

        StatusBar::render(frame, areas.status_bar, &self.state);
    }

    /// Render the menu belonging to `screen`
    fn draw_menu(frame: &mut Frame, area: ratatui::layout::Rect, screen: Screen, state: &AppState) {
        match screen {
            Screen::AccountsMenu => {
                Menu::render(frame, area, " User Accounts ", ACCOUNTS_MENU, state.accounts_cursor)
            }
            Screen::SysinfoMenu => Menu::render(
                frame,
                area,
                " System Information ",
                SYSINFO_MENU,
                state.sysinfo_cursor,
            ),
            _ => Menu::render(frame, area, " hostadm ", MAIN_MENU, state.main_cursor),
        }
    }

    /// Dispatch a key press to the active screen
    fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) {
        // Confirmation has priority over everything
        if self.state.confirmation.is_some() {
            self.handle_confirmation_key(code);
            return;
        }

        // Handle help popup first
        if self.state.show_help {
            self.state.show_help = false;
            return;
        }

        match self.state.screen {
            Screen::MainMenu | Screen::AccountsMenu | Screen::SysinfoMenu => {
                self.handle_menu_key(code)
            }
            Screen::Form => self.handle_form_key(code),
            Screen::Viewer => self.handle_viewer_key(code, modifiers),
        }
    }

    /// Handle keys in menus
    fn handle_menu_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('j') | KeyCode::Down => self.state.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.state.select_previous(),
            KeyCode::Char('?') => self.state.toggle_help(),
            KeyCode::Enter => self.select_menu_item(),
            KeyCode::Char('q') | KeyCode::Esc => {
                if self.state.screen == Screen::MainMenu {
                    self.state.quit();
                } else {
                    self.state.screen = Screen::MainMenu;
                }
            }
            _ => {}
        }
    }

    /// Act on the selected menu entry
    fn select_menu_item(&mut self) {
        self.state.clear_error();

        match (self.state.screen, self.state.menu_cursor()) {
            (Screen::MainMenu, 0) => self.state.screen = Screen::AccountsMenu,
            (Screen::MainMenu, 1) => {
                let form = self.report_form();
                self.state.open_form(form);
            }
            (Screen::MainMenu, 2) => self.state.screen = Screen::SysinfoMenu,
            (Screen::MainMenu, 3) => self.state.quit(),

            (Screen::AccountsMenu, 0) => self.state.open_form(add_user_form()),
            (Screen::AccountsMenu, 1) => {
                let form = self.delete_user_form();
                self.state.open_form(form);
            }
            (Screen::AccountsMenu, 2) => self.state.open_form(user_info_form()),
            (Screen::AccountsMenu, 3) => self.state.screen = Screen::MainMenu,

            (Screen::SysinfoMenu, 0) => self.show_command_output(" Block Devices ", |app| {
                app.sysinfo.block_devices()
            }),
            (Screen::SysinfoMenu, 1) => self.show_command_output(" Mounted Filesystems ", |app| {
                app.sysinfo.mount_table()
            }),
            (Screen::SysinfoMenu, 2) => {
                let form = self.usage_check_form();
                self.state.open_form(form);
            }
            (Screen::SysinfoMenu, 3) => {
                self.show_command_output(" I/O Statistics ", |app| app.sysinfo.io_stats())
            }
            (Screen::SysinfoMenu, 4) => self.state.screen = Screen::MainMenu,

            _ => {}
        }
    }

    /// Run a system information command and open its output in the viewer
    fn show_command_output<F>(&mut self, title: &str, run: F)
    where
        F: FnOnce(&Self) -> Result<String>,
    {
        match run(self) {
            Ok(output) => self.state.open_viewer(title, output),
            Err(e) => {
                tracing::warn!("system info command failed: {:#}", e);
                self.state.set_error(format!("{:#}", e));
            }
        }
    }

    /// Handle keys in the viewer
    fn handle_viewer_key(&mut self, code: KeyCode, modifiers: KeyModifiers) {
        let step = self.settings.ui.scroll_step;
        let Some(viewer) = self.state.viewer.as_mut() else {
            self.state.close_viewer();
            return;
        };

        match code {
            KeyCode::Char('j') | KeyCode::Down => viewer.scroll_down(1),
            KeyCode::Char('k') | KeyCode::Up => viewer.scroll_up(1),
            KeyCode::Char('d') if modifiers.contains(KeyModifiers::CONTROL) => {
                viewer.scroll_down(step)
            }
            KeyCode::Char('u') if modifiers.contains(KeyModifiers::CONTROL) => {
                viewer.scroll_up(step)
            }
            KeyCode::Char('g') => viewer.scroll = 0,
            KeyCode::Char('G') => viewer.scroll_down(u16::MAX),
            KeyCode::Char('q') | KeyCode::Esc => self.state.close_viewer(),
            _ => {}
        }
    }

    /// Handle keys in forms
    fn handle_form_key(&mut self, code: KeyCode) {
        let Some(form) = self.state.form.as_mut() else {
            self.state.close_form();
            return;
        };

        match code {
            KeyCode::Esc => self.state.close_form(),
            KeyCode::Enter => {
                if form.on_last_field() {
                    self.submit_form();
                } else {
                    form.next_field();
                }
            }
            KeyCode::Tab => form.next_field(),
            KeyCode::BackTab => form.prev_field(),
            KeyCode::Down => form.next_field(),
            KeyCode::Up => form.prev_field(),
            KeyCode::Char(c) => form.input_char(c),
            KeyCode::Backspace => form.input_backspace(),
            KeyCode::Delete => form.input_delete(),
            KeyCode::Left => form.cursor_left(),
            KeyCode::Right => form.cursor_right(),
            KeyCode::Home => form.cursor_home(),
            KeyCode::End => form.cursor_end(),
            _ => {}
        }
    }

    /// Handle keys while a confirmation popup is open
    fn handle_confirmation_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('y') | KeyCode::Enter => {
                if let Some(confirmation) = self.state.confirmation.take() {
                    self.execute_confirmed(confirmation.action);
                }
            }
            KeyCode::Char('n') | KeyCode::Esc => {
                self.state.confirmation = None;
            }
            _ => {}
        }
    }

    /// Run the confirmed action
    fn execute_confirmed(&mut self, action: ConfirmAction) {
        match action {
            ConfirmAction::DeleteUser {
                username,
                remove_home,
                archive_home,
            } => match self.accounts.delete_user(&username, remove_home, archive_home) {
                Ok(archive) => {
                    self.audit.log(&AuditEvent::UserDeleted {
                        ts: ts_now(),
                        username: username.clone(),
                        removed_home: remove_home,
                        archive: archive
                            .as_ref()
                            .map(|p| p.display().to_string()),
                    });
                    self.state.close_form();
                    match archive {
                        Some(path) => self.state.set_status(format!(
                            "User {} deleted, home archived to {}",
                            username,
                            path.display()
                        )),
                        None => self.state.set_status(format!("User {} deleted", username)),
                    }
                }
                Err(e) => {
                    tracing::warn!("user deletion failed: {:#}", e);
                    self.state.set_error(format!("{:#}", e));
                }
            },
        }
    }

    /// Validate and execute the active form
    fn submit_form(&mut self) {
        let Some(form) = self.state.form.clone() else {
            return;
        };

        match form.kind {
            FormKind::Report => self.submit_report(&form),
            FormKind::AddUser => self.submit_add_user(&form),
            FormKind::DeleteUser => self.submit_delete_user(&form),
            FormKind::UserInfo => self.submit_user_info(&form),
            FormKind::UsageCheck => self.submit_usage_check(&form),
        }
    }

    fn submit_report(&mut self, form: &FormState) {
        let defaults = &self.settings.report;

        let target_dir = non_empty_or(form.value(0), ".");
        let max_depth = match parse_or(form.value(1), defaults.max_depth) {
            Ok(depth) => depth,
            Err(_) => return self.state.set_error("Max depth must be a number"),
        };
        let unit = non_empty_or(form.value(2), &defaults.unit);
        let format = non_empty_or(form.value(3), &defaults.format);
        let sort = non_empty_or(form.value(4), &defaults.sort);
        let size_threshold = match parse_or(form.value(5), defaults.size_threshold) {
            Ok(threshold) => threshold,
            Err(_) => return self.state.set_error("Size threshold must be a number"),
        };
        let modified_within_days = match form.value(6) {
            "" => None,
            value => match value.parse() {
                Ok(days) => Some(days),
                Err(_) => return self.state.set_error("Modified-within days must be a number"),
            },
        };

        let opts = ReportOptions {
            target_dir,
            max_depth,
            unit,
            format,
            sort,
            size_threshold,
            modified_within_days,
        };

        match self.generator.collect(&opts) {
            Ok((report, format)) => match render(&report, format) {
                Ok(rendered) => {
                    self.audit.log(&AuditEvent::ReportGenerated {
                        ts: ts_now(),
                        target: report.target.clone(),
                        format: format.display_name().to_string(),
                        entries: report.entries.len(),
                        total_size: report.total_size,
                        unit: report.unit.to_string(),
                    });
                    self.state.open_viewer(" Disk Usage Report ", rendered);
                }
                Err(e) => self.state.set_error(format!("{:#}", e)),
            },
            Err(ReportError::NoData { target }) => self
                .state
                .set_error(format!("No usage data collected under {}", target)),
            Err(e) => self.state.set_error(format!("{:#}", e)),
        }
    }

    fn submit_add_user(&mut self, form: &FormState) {
        let username = form.value(0).to_string();
        if username.is_empty() {
            return self.state.set_error("Username is required");
        }
        // Passwords are taken verbatim, never trimmed
        let password = form
            .fields
            .get(2)
            .map(|f| f.value.clone())
            .unwrap_or_default();
        if password.is_empty() {
            return self.state.set_error("Password is required");
        }

        let user = NewUser {
            username: username.clone(),
            full_name: form.value(1).to_string(),
            password,
        };

        match self.accounts.create_user(&user) {
            Ok(()) => {
                self.audit.log(&AuditEvent::UserCreated {
                    ts: ts_now(),
                    username: username.clone(),
                });
                self.state.close_form();
                self.state.set_status(format!("User {} created", username));
            }
            Err(e) => self.state.set_error(format!("{:#}", e)),
        }
    }

    fn submit_delete_user(&mut self, form: &FormState) {
        let username = form.value(0).to_string();
        if username.is_empty() {
            return self.state.set_error("Username is required");
        }
        let remove_home = match parse_yes_no(form.value(1), true) {
            Ok(value) => value,
            Err(_) => return self.state.set_error("Remove home must be y or n"),
        };
        let archive_home =
            match parse_yes_no(form.value(2), self.settings.accounts.archive_by_default) {
                Ok(value) => value,
                Err(_) => return self.state.set_error("Archive home must be y or n"),
            };

        let message = if remove_home {
            format!("Delete user {} and remove the home directory?", username)
        } else {
            format!("Delete user {}?", username)
        };

        self.state.confirmation = Some(ConfirmationState {
            action: ConfirmAction::DeleteUser {
                username,
                remove_home,
                archive_home,
            },
            message,
        });
    }

    fn submit_user_info(&mut self, form: &FormState) {
        let username = form.value(0);
        if username.is_empty() {
            return self.state.set_error("Username is required");
        }

        match self.accounts.user_info(username) {
            Ok(info) => self.state.open_viewer(" User Info ", info),
            Err(e) => self.state.set_error(format!("{:#}", e)),
        }
    }

    fn submit_usage_check(&mut self, form: &FormState) {
        let threshold = match parse_or(form.value(0), self.settings.sysinfo.usage_threshold_pct) {
            Ok(pct) if pct <= 100 => pct,
            _ => return self.state.set_error("Threshold must be a percentage (0-100)"),
        };

        match self.sysinfo.usage_check(threshold) {
            Ok(output) => self.state.open_viewer(" Disk Usage Check ", output),
            Err(e) => self.state.set_error(format!("{:#}", e)),
        }
    }

    /// Report options form, pre-filled from the [report] settings
    fn report_form(&self) -> FormState {
        let defaults = &self.settings.report;
        FormState::new(
            FormKind::Report,
            vec![
                FormField::new("Target directory", "default: ."),
                FormField::new("Max depth", "default: unlimited").with_value(if defaults.max_depth > 0 {
                    defaults.max_depth.to_string()
                } else {
                    String::new()
                }),
                FormField::new("Unit", "K, M or G").with_value(defaults.unit.clone()),
                FormField::new("Format", "text, csv, html or json")
                    .with_value(defaults.format.clone()),
                FormField::new("Sort", "name, size_asc, size_desc, mtime")
                    .with_value(defaults.sort.clone()),
                FormField::new("Size threshold", "default: 0").with_value(
                    if defaults.size_threshold > 0 {
                        defaults.size_threshold.to_string()
                    } else {
                        String::new()
                    },
                ),
                FormField::new("Modified within days", "empty = no filter"),
            ],
        )
    }

    /// Delete form, with the archive toggle pre-set from settings
    fn delete_user_form(&self) -> FormState {
        let archive = if self.settings.accounts.archive_by_default {
            "y"
        } else {
            "n"
        };
        FormState::new(
            FormKind::DeleteUser,
            vec![
                FormField::new("Username", "account to delete"),
                FormField::new("Remove home", "y/n").with_value("y"),
                FormField::new("Archive home", "y/n").with_value(archive),
            ],
        )
    }

    /// Usage check form, pre-filled from the [sysinfo] settings
    fn usage_check_form(&self) -> FormState {
        FormState::new(
            FormKind::UsageCheck,
            vec![FormField::new("Threshold %", "flag filesystems at or above")
                .with_value(self.settings.sysinfo.usage_threshold_pct.to_string())],
        )
    }
}

/// Add form: username, GECOS full name, masked password
fn add_user_form() -> FormState {
    FormState::new(
        FormKind::AddUser,
        vec![
            FormField::new("Username", "lowercase, up to 32 chars"),
            FormField::new("Full name", "optional"),
            FormField::masked("Password", "required"),
        ],
    )
}

fn user_info_form() -> FormState {
    FormState::new(
        FormKind::UserInfo,
        vec![FormField::new("Username", "account to inspect")],
    )
}

/// The value, or the default when it is empty
fn non_empty_or(value: &str, default: &str) -> String {
    if value.is_empty() {
        default.to_string()
    } else {
        value.to_string()
    }
}

/// Parse the value, or take the default when it is empty
fn parse_or<T: std::str::FromStr>(value: &str, default: T) -> Result<T, T::Err> {
    if value.is_empty() {
        Ok(default)
    } else {
        value.parse()
    }
}

/// Parse a y/n answer, or take the default when it is empty
fn parse_yes_no(value: &str, default: bool) -> Result<bool, ()> {
    match value.to_ascii_lowercase().as_str() {
        "" => Ok(default),
        "y" | "yes" => Ok(true),
        "n" | "no" => Ok(false),
        _ => Err(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_creation() {
        let settings = Settings::default();
        let _app = App::new(settings);
    }

    #[test]
    fn test_parse_yes_no() {
        assert_eq!(parse_yes_no("", true), Ok(true));
        assert_eq!(parse_yes_no("", false), Ok(false));
        assert_eq!(parse_yes_no("y", false), Ok(true));
        assert_eq!(parse_yes_no("YES", false), Ok(true));
        assert_eq!(parse_yes_no("n", true), Ok(false));
        assert_eq!(parse_yes_no("maybe", true), Err(()));
    }

    #[test]
    fn test_parse_or_defaults_on_empty() {
        assert_eq!(parse_or("", 5u32), Ok(5));
        assert_eq!(parse_or("7", 5u32), Ok(7));
        assert!(parse_or("x", 5u32).is_err());
    }

    #[test]
    fn test_non_empty_or() {
        assert_eq!(non_empty_or("", "."), ".");
        assert_eq!(non_empty_or("/var", "."), "/var");
    }

    #[test]
    fn test_report_form_prefills_settings() {
        let mut settings = Settings::default();
        settings.report.unit = "G".to_string();
        settings.report.max_depth = 3;
        let app = App::new(settings);
        let form = app.report_form();
        assert_eq!(form.value(1), "3");
        assert_eq!(form.value(2), "G");
        assert_eq!(form.value(3), "text");
    }

    #[test]
    fn test_menu_selection_opens_accounts() {
        let mut app = App::new(Settings::default());
        app.handle_key(KeyCode::Enter, KeyModifiers::NONE);
        assert_eq!(app.state.screen, Screen::AccountsMenu);
        app.handle_key(KeyCode::Esc, KeyModifiers::NONE);
        assert_eq!(app.state.screen, Screen::MainMenu);
    }

    #[test]
    fn test_quit_from_main_menu() {
        let mut app = App::new(Settings::default());
        app.handle_key(KeyCode::Char('q'), KeyModifiers::NONE);
        assert!(!app.state.running);
    }

    #[test]
    fn test_report_form_flow_to_error_on_bad_depth() {
        let mut app = App::new(Settings::default());
        // Main menu: move to "Disk Usage Report" and open it
        app.handle_key(KeyCode::Char('j'), KeyModifiers::NONE);
        app.handle_key(KeyCode::Enter, KeyModifiers::NONE);
        assert_eq!(app.state.screen, Screen::Form);

        // Type garbage into the depth field and submit from the last field
        app.handle_key(KeyCode::Tab, KeyModifiers::NONE);
        app.handle_key(KeyCode::Char('x'), KeyModifiers::NONE);
        if let Some(form) = app.state.form.as_mut() {
            while !form.on_last_field() {
                form.next_field();
            }
        }
        app.handle_key(KeyCode::Enter, KeyModifiers::NONE);

        assert!(app
            .state
            .error_message
            .as_deref()
            .unwrap_or("")
            .contains("Max depth"));
        // Form stays open for correction
        assert_eq!(app.state.screen, Screen::Form);
    }

    #[test]
    fn test_delete_form_requires_confirmation() {
        let mut app = App::new(Settings::default());
        app.state.screen = Screen::AccountsMenu;
        app.state.accounts_cursor = 1;
        app.handle_key(KeyCode::Enter, KeyModifiers::NONE);
        assert_eq!(app.state.screen, Screen::Form);

        for c in "alice".chars() {
            app.handle_key(KeyCode::Char(c), KeyModifiers::NONE);
        }
        if let Some(form) = app.state.form.as_mut() {
            while !form.on_last_field() {
                form.next_field();
            }
        }
        app.handle_key(KeyCode::Enter, KeyModifiers::NONE);

        let confirmation = app.state.confirmation.as_ref().expect("Should confirm");
        assert!(confirmation.message.contains("alice"));

        // 'n' cancels, leaving the form open
        app.handle_key(KeyCode::Char('n'), KeyModifiers::NONE);
        assert!(app.state.confirmation.is_none());
        assert_eq!(app.state.screen, Screen::Form);
    }
}
