use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};

use crate::app::App;
use crate::explorer::NavStatus;

pub fn draw_status_bar(f: &mut Frame, app: &mut App, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);

    let summary = listing_summary(app);
    f.render_widget(
        Paragraph::new(summary).style(Style::default().fg(Color::Cyan)),
        columns[0],
    );

    if let Some((message, timestamp)) = &app.status_message {
        // Loading and error lines stay until the navigation settles
        let sticky = matches!(app.navigator.status(), NavStatus::Loading | NavStatus::Error);
        if sticky || timestamp.elapsed().as_secs() < 5 {
            let paragraph = Paragraph::new(message.as_str())
                .style(message_style(message))
                .alignment(ratatui::layout::Alignment::Right);
            f.render_widget(paragraph, columns[1]);
        } else {
            app.clear_status_message();
        }
    }
}

fn listing_summary(app: &App) -> String {
    let listing = app.navigator.listing();
    let mut summary = format!("{} items", listing.entries.len());
    if !listing.timezone.is_empty() {
        summary.push_str(&format!(" | {} ({})", listing.timezone, listing.utc_offset_label()));
    }
    if app.downloads_in_flight > 0 {
        summary.push_str(&format!(" | ⬇ {}", app.downloads_in_flight));
    }
    summary
}

fn message_style(message: &str) -> Style {
    let lower = message.to_lowercase();
    if lower.contains("error") || lower.contains("failed") {
        Style::default().fg(Color::Red)
    } else if lower.contains("downloaded") || lower.contains("items in") {
        Style::default().fg(Color::Green)
    } else if lower.ends_with("...") {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::Yellow)
    }
}
