use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
    Frame,
};

use crate::state::{FormField, FormState};

/// Multi-field input form popup
pub struct Form;

impl Form {
    /// Render the form with the active field's cursor highlighted
    pub fn render(frame: &mut Frame, area: Rect, form: &FormState) {
        // Clear the area first
        frame.render_widget(Clear, area);

        let mut lines = vec![Line::from("")];

        for (i, field) in form.fields.iter().enumerate() {
            let active = i == form.active;
            lines.push(Self::field_line(field, active, form.cursor));
        }

        lines.push(Line::from(""));
        lines.push(Line::from(vec![Span::styled(
            "Enter: next/submit  Tab: next field  Esc: cancel",
            Style::default().fg(Color::DarkGray),
        )]));

        let block = Block::default()
            .title(form.kind.title())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Cyan));

        let paragraph = Paragraph::new(lines).block(block);

        frame.render_widget(paragraph, area);
    }

    /// Build one field line: label, value (or hint), cursor block when active
    fn field_line(field: &FormField, active: bool, cursor: usize) -> Line<'static> {
        let label_style = if active {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        let text_style = Style::default().fg(Color::White);
        let hint_style = Style::default().fg(Color::DarkGray);
        let cursor_style = Style::default().fg(Color::Black).bg(Color::Green);

        let marker = if active { "> " } else { "  " };
        let mut spans = vec![
            Span::styled(marker.to_string(), label_style),
            Span::styled(format!("{:<18}", field.label), label_style),
        ];

        let display = Self::display_value(field);

        if display.is_empty() && !field.hint.is_empty() {
            if active {
                spans.push(Span::styled("\u{2588}", cursor_style));
                spans.push(Span::styled(format!(" ({})", field.hint), hint_style));
            } else {
                spans.push(Span::styled(format!("({})", field.hint), hint_style));
            }
            return Line::from(spans);
        }

        if !active {
            spans.push(Span::styled(display, text_style));
            return Line::from(spans);
        }

        // Masked cursor arithmetic works on the dot string: one dot per
        // character, so the byte cursor has to be remapped
        let cursor = if field.masked {
            field.value[..cursor].chars().count() * "\u{2022}".len()
        } else {
            cursor
        };

        let before = display[..cursor].to_string();
        let after = &display[cursor..];
        let cursor_char = after.chars().next();
        let rest = cursor_char
            .map(|c| after[c.len_utf8()..].to_string())
            .unwrap_or_default();

        spans.push(Span::styled(before, text_style));
        spans.push(Span::styled(
            cursor_char
                .map(|c| c.to_string())
                .unwrap_or_else(|| "\u{2588}".to_string()),
            cursor_style,
        ));
        spans.push(Span::styled(rest, text_style));
        Line::from(spans)
    }

    /// Value as rendered: masked fields show one dot per character
    fn display_value(field: &FormField) -> String {
        if field.masked {
            "\u{2022}".repeat(field.value.chars().count())
        } else {
            field.value.clone()
        }
    }

    /// Required popup height: one line per field plus chrome
    pub fn required_height(form: &FormState) -> u16 {
        form.fields.len() as u16 + 5
    }
}
