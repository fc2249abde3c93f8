use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use super::centered_rect;
use super::listing::{format_file_size, format_modified};
use crate::app::preview::PreviewState;
use crate::app::{App, FileDetails};

pub fn draw_details_popup(f: &mut Frame, app: &App) {
    let Some(details) = &app.details else {
        return;
    };

    let block = Block::default()
        .title("File details")
        .borders(Borders::ALL)
        .style(Style::default().fg(Color::White));

    let offset = app.navigator.listing().timezone_offset_seconds;
    let mut text = details_text(details, offset);
    if let Some(preview) = &app.preview {
        text.extend(preview_lines(preview));
    }

    let height = (text.lines.len() as u16 + 2).min(f.size().height);
    let area = centered_rect(70, height, f.size());

    f.render_widget(Clear, area);
    f.render_widget(Paragraph::new(text).block(block), area);
}

fn details_text(details: &FileDetails, offset_seconds: i64) -> Text<'static> {
    let entry = &details.entry;
    let row = |label: &'static str, value: String| {
        Line::from(vec![
            Span::styled(format!("  {:<10}", label), Style::default().fg(Color::Green)),
            Span::raw(value),
        ])
    };

    Text::from(vec![
        Line::from(Span::styled(
            entry.name.clone(),
            Style::default().add_modifier(Modifier::BOLD).fg(Color::Cyan),
        )),
        row("Path", details.location.clone()),
        row("Type", if entry.is_dir { "Directory" } else { "File" }.to_string()),
        row(
            "Size",
            format!("{} ({} bytes)", format_file_size(entry.size_bytes), entry.size_bytes),
        ),
        row("Modified", format_modified(entry.modified_at, offset_seconds)),
        row("Mode", entry.mode.clone()),
        Line::from(""),
        Line::from(vec![
            Span::styled("  p", Style::default().fg(Color::Green)),
            Span::raw(" - Preview    "),
            Span::styled("d", Style::default().fg(Color::Green)),
            Span::raw(" - Download    "),
            Span::styled("Esc", Style::default().fg(Color::Green)),
            Span::raw(" - Close"),
        ]),
    ])
}

fn preview_lines(state: &PreviewState) -> Vec<Line<'static>> {
    let header = |title: String| {
        Line::from(Span::styled(
            title,
            Style::default().add_modifier(Modifier::BOLD).fg(Color::Cyan),
        ))
    };

    let mut lines = vec![Line::from("")];
    match state {
        PreviewState::Loading { name } => {
            lines.push(header(format!("Preview of {}", name)));
            lines.push(Line::styled("  ⏳ Fetching...", Style::default().fg(Color::Yellow)));
        }
        PreviewState::Failed { message, .. } => {
            lines.push(header("Preview".to_string()));
            lines.push(Line::styled(format!("  ❌ {}", message), Style::default().fg(Color::Red)));
        }
        PreviewState::Ready(preview) => {
            let kind = if preview.binary { "hex" } else { "text" };
            lines.push(header(format!(
                "Preview ({}, {})",
                kind,
                format_file_size(preview.total_bytes as u64)
            )));
            lines.extend(
                preview
                    .lines
                    .iter()
                    .map(|l| Line::styled(format!("  {}", l), Style::default().fg(Color::Gray))),
            );
            if preview.lines.is_empty() {
                lines.push(Line::styled("  (empty file)", Style::default().fg(Color::DarkGray)));
            } else if preview.truncated {
                lines.push(Line::styled("  ...", Style::default().fg(Color::DarkGray)));
            }
        }
    }
    lines
}
