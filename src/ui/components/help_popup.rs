use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
    Frame,
};

/// Help popup widget
pub struct HelpPopup;

/// Key bindings shown in the help popup
const BINDINGS: &[(&str, &str)] = &[
    ("j/k, Up/Down", "Move selection"),
    ("Enter", "Select menu item / next form field"),
    ("Tab / Shift-Tab", "Next / previous form field"),
    ("Esc", "Cancel form, close viewer, back"),
    ("Ctrl-d / Ctrl-u", "Scroll viewer by a page step"),
    ("y / n", "Answer a confirmation"),
    ("?", "Toggle this help"),
    ("q", "Back / quit"),
];

impl HelpPopup {
    /// Render the help popup
    pub fn render(frame: &mut Frame, area: Rect) {
        // Clear the area first
        frame.render_widget(Clear, area);

        let mut lines = vec![
            Line::from(vec![Span::styled(
                "Keys",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )]),
            Line::from(""),
        ];

        for (keys, action) in BINDINGS {
            lines.push(Line::from(vec![
                Span::styled(
                    format!("  {:<16}", keys),
                    Style::default()
                        .fg(Color::Green)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(action.to_string(), Style::default().fg(Color::White)),
            ]));
        }

        lines.push(Line::from(""));
        lines.push(Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().fg(Color::DarkGray),
        )]));

        let block = Block::default()
            .title(" Help ")
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Yellow));

        let paragraph = Paragraph::new(lines).block(block);

        frame.render_widget(paragraph, area);
    }
}
