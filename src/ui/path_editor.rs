use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use super::centered_rect;
use crate::app::App;

pub fn draw_path_editor(f: &mut Frame, app: &App) {
    let area = centered_rect(70, 3, f.size());

    let block = Block::default()
        .borders(Borders::ALL)
        .title("Go to path")
        .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .border_style(Style::default().fg(Color::Cyan));

    let line = Line::from(vec![
        Span::styled("> ", Style::default().fg(Color::Green)),
        Span::raw(app.path_input.as_str()),
        Span::styled("█", Style::default().fg(Color::Gray)),
    ]);

    f.render_widget(Clear, area);
    f.render_widget(Paragraph::new(line).block(block), area);
}
