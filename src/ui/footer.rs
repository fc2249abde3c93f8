use crate::app::{App, InputMode};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};

pub fn draw_footer(f: &mut Frame, app: &App, area: Rect) {
    let footer = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let loading = app.navigator.is_loading();
    let (nav_text, action_text) = match app.input_mode {
        InputMode::Normal if loading => ("Waiting for the agent...", "[Ctrl+C] Quit"),
        InputMode::Normal => (
            "↑/k: Up  ↓/j: Down  [Enter] Open  [Backspace] Back",
            "[e] Path [d] Download [r] Reload [R] Retry [q] Quit",
        ),
        InputMode::EditPath => ("Type a remote path", "[Enter] Go  [Esc] Cancel"),
        InputMode::Details => ("File details", "[p] Preview  [d] Download  [Esc] Close"),
    };

    let nav_help = Paragraph::new(nav_text).style(Style::default().fg(if loading {
        Color::Yellow
    } else {
        Color::Gray
    }));

    let action_help = Paragraph::new(action_text)
        .style(Style::default().fg(Color::Gray))
        .alignment(ratatui::layout::Alignment::Right);

    f.render_widget(nav_help, footer[0]);
    f.render_widget(action_help, footer[1]);
}
