use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, List, ListItem, ListState},
    Frame,
};

/// Menu list widget
pub struct Menu;

impl Menu {
    /// Render a bordered menu with the selected item highlighted
    pub fn render(frame: &mut Frame, area: Rect, title: &str, items: &[&str], cursor: usize) {
        let list_items: Vec<ListItem> = items
            .iter()
            .map(|item| {
                ListItem::new(Line::from(vec![
                    Span::raw("  "),
                    Span::styled(item.to_string(), Style::default().fg(Color::White)),
                ]))
            })
            .collect();

        let block = Block::default()
            .title(title.to_string())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Cyan));

        let list = List::new(list_items)
            .block(block)
            .highlight_style(
                Style::default()
                    .bg(Color::DarkGray)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("> ");

        let mut list_state = ListState::default();
        list_state.select(Some(cursor));

        frame.render_stateful_widget(list, area, &mut list_state);
    }
}
