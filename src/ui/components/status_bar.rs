use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::state::{AppState, Screen};

/// Status bar widget
pub struct StatusBar;

impl StatusBar {
    /// Render the status bar: screen name, message, right-aligned key hints
    pub fn render(frame: &mut Frame, area: Rect, state: &AppState) {
        let mut spans = vec![Span::styled(
            format!(" {} ", Self::screen_name(state)),
            Style::default().fg(Color::White).bg(Color::DarkGray),
        )];

        if let Some(error) = &state.error_message {
            spans.push(Span::styled(
                format!(" {} ", error),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ));
        } else if let Some(status) = &state.status_message {
            spans.push(Span::styled(
                format!(" {} ", status),
                Style::default().fg(Color::Green),
            ));
        }

        // Right-align the key hints when there is room
        let hints = Self::hints(state);
        let used: usize = spans.iter().map(|s| s.content.width()).sum();
        let padding = (area.width as usize)
            .saturating_sub(used)
            .saturating_sub(hints.width() + 1);
        if padding > 0 {
            spans.push(Span::raw(" ".repeat(padding)));
        }
        spans.push(Span::styled(
            format!("{} ", hints),
            Style::default().fg(Color::DarkGray),
        ));

        let paragraph = Paragraph::new(Line::from(spans));
        frame.render_widget(paragraph, area);
    }

    /// Name of the current screen
    fn screen_name(state: &AppState) -> &'static str {
        if state.confirmation.is_some() {
            return "Confirm";
        }
        match state.screen {
            Screen::MainMenu => "Main",
            Screen::AccountsMenu => "Accounts",
            Screen::SysinfoMenu => "System Info",
            Screen::Form => "Form",
            Screen::Viewer => "Viewer",
        }
    }

    /// Context-sensitive key hints
    fn hints(state: &AppState) -> &'static str {
        if state.confirmation.is_some() {
            return "y: confirm  n: cancel";
        }
        match state.screen {
            Screen::Form => "Enter: next/submit  Esc: cancel",
            Screen::Viewer => "j/k: scroll  Esc: back",
            Screen::MainMenu => "j/k: move  Enter: select  ?: help  q: quit",
            _ => "j/k: move  Enter: select  Esc: back",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{ConfirmAction, ConfirmationState};

    #[test]
    fn test_screen_names() {
        let mut state = AppState::new();
        assert_eq!(StatusBar::screen_name(&state), "Main");
        state.screen = Screen::Viewer;
        assert_eq!(StatusBar::screen_name(&state), "Viewer");
        state.confirmation = Some(ConfirmationState {
            action: ConfirmAction::DeleteUser {
                username: "a".to_string(),
                remove_home: false,
                archive_home: false,
            },
            message: String::new(),
        });
        assert_eq!(StatusBar::screen_name(&state), "Confirm");
    }
}
