use chrono::{DateTime, FixedOffset};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::app::App;
use crate::explorer::{FileEntry, NavStatus};

pub fn draw_listing(f: &mut Frame, app: &mut App, area: Rect) {
    let nav = &app.navigator;
    let listing = nav.listing();

    let title = if listing.path.is_empty() {
        " Remote filesystem ".to_string()
    } else {
        format!(" {} ", listing.path)
    };
    let border_color = match nav.status() {
        NavStatus::Loading => Color::Yellow,
        NavStatus::Error => Color::Red,
        _ => Color::Green,
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title)
        .title_style(Style::default().fg(border_color).add_modifier(Modifier::BOLD));

    // Nothing to list: explain why instead of drawing an empty box
    let placeholder = match nav.status() {
        NavStatus::Idle => Some(("Not connected".to_string(), Color::Gray)),
        NavStatus::Loading if listing.entries.is_empty() => {
            Some(("⏳ Loading...".to_string(), Color::Yellow))
        }
        NavStatus::Error => Some((
            nav.last_error()
                .map(|e| format!("❌ {}\n\n[R] Retry  [r] Reload  [e] Edit path", e))
                .unwrap_or_default(),
            Color::Red,
        )),
        _ if !listing.exists => Some(("Directory does not exist".to_string(), Color::Gray)),
        _ if listing.entries.is_empty() => Some(("(empty)".to_string(), Color::Gray)),
        _ => None,
    };
    if let Some((text, color)) = placeholder {
        let paragraph = Paragraph::new(text)
            .block(block)
            .style(Style::default().fg(color))
            .alignment(ratatui::layout::Alignment::Center);
        f.render_widget(paragraph, area);
        return;
    }

    let offset = listing.timezone_offset_seconds;
    let items: Vec<ListItem> = listing
        .entries
        .iter()
        .enumerate()
        .map(|(i, entry)| entry_row(entry, i == app.selected, offset))
        .collect();

    let list = List::new(items).block(block);
    f.render_stateful_widget(list, area, &mut app.list_state);
}

fn entry_row(entry: &FileEntry, is_selected: bool, offset_seconds: i64) -> ListItem<'static> {
    let fg = |color| {
        Style::default().fg(if is_selected { Color::Black } else { color })
    };

    let (icon, name_color) = if entry.is_dir {
        ("📁 ", Color::Blue)
    } else {
        ("📄 ", Color::White)
    };
    let size = if entry.is_dir {
        String::new()
    } else {
        format_file_size(entry.size_bytes)
    };

    let spans = vec![
        Span::styled(if is_selected { "> " } else { "  " }, Style::default().fg(Color::Yellow)),
        Span::styled(icon, Style::default().fg(Color::Yellow)),
        Span::styled(entry.name.clone(), fg(name_color)),
        Span::styled(format!("  {:>10}", size), fg(Color::Gray)),
        Span::styled(
            format!("  {}", format_modified(entry.modified_at, offset_seconds)),
            fg(Color::DarkGray),
        ),
        Span::styled(format!("  {}", entry.mode), fg(Color::DarkGray)),
    ];

    let style = if is_selected {
        Style::default().bg(Color::Green).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    ListItem::new(Line::from(spans)).style(style)
}

pub(super) fn format_file_size(size: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut value = size as f64;
    let mut unit = 0;

    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{} {}", size, UNITS[0])
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

/// Modification time rendered in the remote host's own timezone
pub(super) fn format_modified(timestamp: i64, offset_seconds: i64) -> String {
    if timestamp <= 0 {
        return "-".to_string();
    }
    let offset = i32::try_from(offset_seconds)
        .ok()
        .and_then(FixedOffset::east_opt)
        .or_else(|| FixedOffset::east_opt(0));
    match (DateTime::from_timestamp(timestamp, 0), offset) {
        (Some(utc), Some(offset)) => utc.with_timezone(&offset).format("%Y-%m-%d %H:%M").to_string(),
        _ => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_use_binary_units() {
        assert_eq!(format_file_size(0), "0 B");
        assert_eq!(format_file_size(1023), "1023 B");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(5 * 1024 * 1024), "5.0 MB");
    }

    #[test]
    fn modified_time_uses_remote_offset() {
        // 2023-11-14 22:13:20 UTC
        assert_eq!(format_modified(1_700_000_000, 0), "2023-11-14 22:13");
        assert_eq!(format_modified(1_700_000_000, 19_800), "2023-11-15 03:43");
        assert_eq!(format_modified(0, 19_800), "-");
    }

    #[test]
    fn out_of_range_offset_falls_back_to_utc() {
        assert_eq!(format_modified(1_700_000_000, 999_999), "2023-11-14 22:13");
    }
}
