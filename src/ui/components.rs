//! Shared UI components: status bar, toast, alert, help and layout helpers.
//!
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::app::AppState;
use crate::app::InputMode;
use crate::app::keymap::KeyAction;

/// Render the bottom status bar with mode, counts and pending requests.
pub fn render_status_bar(f: &mut Frame, area: Rect, app: &AppState) {
    let (mode, hints) = match app.input_mode {
        InputMode::Normal => ("NORMAL", "a: add  /: search  e: edit  d: delete  r: reload  ?: help  q: quit"),
        InputMode::AddForm => ("ADD", "Tab: next field  Enter: add  Esc: back"),
        InputMode::Search => ("SEARCH", "type to filter  Enter: keep  Esc: clear"),
        InputMode::Modal => ("MODAL", "Esc: close"),
    };
    let search = if app.search_query.is_empty() {
        String::new()
    } else {
        format!("  filter:'{}'", app.search_query)
    };
    let pending = if app.in_flight > 0 {
        format!("  pending:{}", app.in_flight)
    } else {
        String::new()
    };
    let msg = format!(
        "mode: {mode}  customers:{}  shown:{}{search}{pending}  | {hints}",
        app.customers_all.len(),
        app.customers.len(),
    );
    let p = Paragraph::new(msg).style(
        Style::default()
            .fg(app.theme.status_fg)
            .bg(app.theme.status_bg),
    );
    f.render_widget(p, area);
}

/// Compute a rectangle centered within `area` with a maximum size.
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect {
        x,
        y,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

/// Rectangle anchored to the bottom-right corner, just above the status bar.
pub fn bottom_right_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height.saturating_sub(1));
    Rect {
        x: area.right().saturating_sub(width + 1).max(area.x),
        y: area.bottom().saturating_sub(height + 1).max(area.y),
        width,
        height,
    }
}

/// Render the notification toast.
pub fn render_toast(f: &mut Frame, area: Rect, app: &AppState) {
    let Some(toast) = &app.toast else {
        return;
    };
    let width = (toast.message.chars().count() as u16 + 4).clamp(24, 48);
    let rect = bottom_right_rect(width, 3, area);
    let p = Paragraph::new(toast.message.clone())
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(app.theme.text))
        .block(
            Block::default()
                .title(Span::styled(
                    "Notification",
                    Style::default().fg(app.theme.toast).add_modifier(Modifier::BOLD),
                ))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.toast)),
        );
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}

/// Render the blocking validation alert.
pub fn render_alert(f: &mut Frame, area: Rect, app: &AppState) {
    let Some(message) = &app.alert else {
        return;
    };
    let width = (message.chars().count() as u16 + 6).max(30);
    let rect = centered_rect(width, 6, area);
    let lines = vec![
        Line::raw(message.clone()),
        Line::raw(""),
        Line::from(Span::styled("[Enter] OK", Style::default().add_modifier(Modifier::BOLD))),
    ];
    let p = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .title("Alert")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(app.theme.alert)),
    );
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}

/// Render the help modal from the live keymap.
pub fn render_help_modal(f: &mut Frame, area: Rect, app: &AppState, scroll: u16) {
    let width = 72u16.min(area.width.saturating_sub(4)).max(40);
    let height = 24u16.min(area.height.saturating_sub(4)).max(10);
    let rect = centered_rect(width, height, area);

    let bold = Style::default().add_modifier(Modifier::BOLD);
    let italic = Style::default().add_modifier(Modifier::ITALIC);
    let row = |label: &str, keys: String| {
        Line::from(vec![
            Span::raw(format!("  {:<22}", label)),
            Span::styled(keys, italic),
        ])
    };
    let bound = |action: KeyAction| app.keymap.keys_for(action).join(", ");

    let mut lines: Vec<Line> = vec![Line::from(Span::styled("Cards", bold))];
    for (label, action) in [
        ("Move up (one row)", KeyAction::MoveUp),
        ("Move down (one row)", KeyAction::MoveDown),
        ("Previous card", KeyAction::MoveLeft),
        ("Next card", KeyAction::MoveRight),
        ("Page up", KeyAction::PageUp),
        ("Page down", KeyAction::PageDown),
        ("Edit customer", KeyAction::EditSelection),
        ("Delete customer", KeyAction::DeleteSelection),
    ] {
        lines.push(row(label, bound(action)));
    }
    lines.push(Line::raw(""));
    lines.push(Line::from(Span::styled("General", bold)));
    for (label, action) in [
        ("Add customer", KeyAction::FocusAddForm),
        ("Search", KeyAction::StartSearch),
        ("Reload list", KeyAction::Reload),
        ("Dismiss notification", KeyAction::DismissToast),
        ("Help", KeyAction::OpenHelp),
        ("Quit", KeyAction::Quit),
    ] {
        lines.push(row(label, bound(action)));
    }
    lines.push(Line::raw(""));
    lines.push(Line::from(Span::styled("Forms and search", bold)));
    for (label, keys) in [
        ("Next / previous field", "Tab, Down / Shift+Tab, Up"),
        ("Submit", "Enter"),
        ("Leave / cancel", "Esc"),
    ] {
        lines.push(row(label, keys.to_string()));
    }
    lines.push(Line::raw(""));
    lines.push(row("Close help", "Esc, Enter, ?".to_string()));

    let p = Paragraph::new(lines)
        .scroll((scroll, 0))
        .block(
            Block::default()
                .title("Help")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.border)),
        );
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_rect_fits_inside() {
        let area = Rect::new(0, 0, 100, 40);
        let r = centered_rect(40, 10, area);
        assert_eq!(r, Rect::new(30, 15, 40, 10));
        let small = centered_rect(200, 80, area);
        assert_eq!((small.width, small.height), (100, 40));
    }

    #[test]
    fn toast_rect_sits_bottom_right_above_status_bar() {
        let area = Rect::new(0, 0, 80, 24);
        let r = bottom_right_rect(30, 3, area);
        assert_eq!(r, Rect::new(49, 20, 30, 3));
    }
}
