use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap};

use crate::api::Customer;
use crate::app::form::{CustomerDraft, DraftField};
use crate::app::keymap::KeyAction;
use crate::app::{AppState, InputMode, ModalState};

/// Height of one card: border, email, phone, address, border.
pub const CARD_HEIGHT: u16 = 5;

/// How many cards fit side by side in `width` columns.
pub fn cards_per_row(width: u16) -> usize {
    match width {
        w if w >= 96 => 3,
        w if w >= 60 => 2,
        _ => 1,
    }
}

pub fn render_add_form(f: &mut Frame, area: Rect, app: &AppState) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(24),
            Constraint::Percentage(24),
            Constraint::Percentage(18),
            Constraint::Percentage(22),
            Constraint::Min(9),
        ])
        .split(area);

    let editing = app.input_mode == InputMode::AddForm;
    for (field, rect) in DraftField::ALL.into_iter().zip(cols.iter()) {
        let focused = editing && app.add_form.active == field;
        render_input(f, *rect, app, &app.add_form, field, focused);
    }

    let button_style = if editing {
        Style::default().fg(app.theme.highlight_fg).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(app.theme.text)
    };
    let button = Paragraph::new(Span::styled("+ Add", button_style)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(app.theme.border)),
    );
    f.render_widget(button, cols[4]);
}

/// One labelled text box; empty boxes show the label as placeholder.
fn render_input(
    f: &mut Frame,
    area: Rect,
    app: &AppState,
    draft: &CustomerDraft,
    field: DraftField,
    focused: bool,
) {
    let value = draft.value(field);
    let content = if value.is_empty() && !focused {
        Span::styled(field.label(), Style::default().fg(app.theme.muted))
    } else if focused {
        Span::styled(format!("{value}_"), Style::default().fg(app.theme.text))
    } else {
        Span::styled(value.to_string(), Style::default().fg(app.theme.text))
    };
    let border = if focused {
        Style::default().fg(app.theme.highlight_fg)
    } else {
        Style::default().fg(app.theme.border)
    };
    let p = Paragraph::new(content).block(
        Block::default()
            .title(field.label())
            .borders(Borders::ALL)
            .border_style(border),
    );
    f.render_widget(p, area);
}

pub fn render_search_bar(f: &mut Frame, area: Rect, app: &AppState) {
    let active = app.input_mode == InputMode::Search;
    let content = if app.search_query.is_empty() && !active {
        Span::styled("Search by Name or Email...", Style::default().fg(app.theme.muted))
    } else if active {
        Span::styled(format!("{}_", app.search_query), Style::default().fg(app.theme.text))
    } else {
        Span::styled(app.search_query.clone(), Style::default().fg(app.theme.text))
    };
    let border = if active { app.theme.highlight_fg } else { app.theme.border };
    let p = Paragraph::new(content).block(
        Block::default()
            .title("Search")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border)),
    );
    f.render_widget(p, area);
}

/// Grid of customer cards for the page holding the selection.
///
/// Records the grid shape in `app` so navigation keys can move by row and page.
pub fn render_customer_cards(f: &mut Frame, area: Rect, app: &mut AppState) {
    let block = Block::default()
        .title(format!("Customers ({})", app.customers.len()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.border));
    let inner = block.inner(area);
    f.render_widget(block, area);

    if app.customers.is_empty() {
        let p = Paragraph::new(Line::from(Span::styled(
            "No customers found",
            Style::default().fg(app.theme.muted).add_modifier(Modifier::BOLD),
        )))
        .centered();
        let y = inner.y + inner.height / 2;
        f.render_widget(p, Rect { y, height: 1.min(inner.height), ..inner });
        return;
    }

    let cols = cards_per_row(inner.width);
    let rows = ((inner.height / CARD_HEIGHT) as usize).max(1);
    app.cards_per_row = cols;
    app.cards_per_page = rows * cols;

    let per_page = app.cards_per_page;
    let start = (app.selected_index / per_page) * per_page;
    let end = (start + per_page).min(app.customers.len());

    let row_rects = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Length(CARD_HEIGHT); rows])
        .split(inner);

    for (row_idx, chunk) in app.customers[start..end].chunks(cols).enumerate() {
        let Some(row_rect) = row_rects.get(row_idx) else {
            break;
        };
        let cells = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Ratio(1, cols as u32); cols])
            .split(*row_rect);
        for (col_idx, customer) in chunk.iter().enumerate() {
            let index = start + row_idx * cols + col_idx;
            render_card(f, cells[col_idx], app, customer, index);
        }
    }
}

fn render_card(f: &mut Frame, area: Rect, app: &AppState, c: &Customer, index: usize) {
    let selected = index == app.selected_index;
    let color = app.theme.card_color(index);
    let label = Style::default().fg(color).add_modifier(Modifier::BOLD);
    let text = Style::default().fg(app.theme.text);
    let lines = vec![
        Line::from(vec![Span::styled("Email: ", label), Span::styled(c.email.clone(), text)]),
        Line::from(vec![Span::styled("Phone: ", label), Span::styled(c.phone.clone(), text)]),
        Line::from(vec![Span::styled("Address: ", label), Span::styled(c.address.clone(), text)]),
    ];

    let mut block = Block::default()
        .title(Span::styled(c.name.clone(), label))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color));
    if selected {
        block = block
            .border_type(BorderType::Thick)
            .title_bottom(Line::from(card_hint(app)).right_aligned())
            .style(Style::default().bg(app.theme.highlight_bg));
    }
    f.render_widget(Paragraph::new(lines).block(block), area);
}

/// Bottom hint for the selected card, from the current edit and delete bindings.
pub fn card_hint(app: &AppState) -> String {
    let mut hint = String::from(" ");
    for (action, label) in [
        (KeyAction::EditSelection, "edit"),
        (KeyAction::DeleteSelection, "delete"),
    ] {
        let keys = app.keymap.keys_for(action);
        if keys.is_empty() {
            continue;
        }
        // single-character keys keep the hint short
        let short: Vec<&str> = keys
            .iter()
            .filter(|k| k.chars().count() == 1)
            .map(String::as_str)
            .collect();
        let shown = if short.is_empty() { keys.join("/") } else { short.join("/") };
        hint.push_str(&format!("{shown}: {label}  "));
    }
    hint.truncate(hint.trim_end().len());
    hint.push(' ');
    hint
}

/// Render the edit dialog for `state` (an `Edit` modal).
pub fn render_edit_modal(f: &mut Frame, area: Rect, app: &AppState, state: &ModalState) {
    let ModalState::Edit { target, draft } = state else {
        return;
    };
    let width = 64u16.min(area.width.saturating_sub(4)).max(40);
    let rect = crate::ui::components::centered_rect(width, 10, area);

    let mut lines: Vec<Line> = Vec::with_capacity(7);
    for field in DraftField::ALL {
        let active = draft.active == field;
        let marker = if active { "▶ " } else { "  " };
        let value = if active {
            format!("{}_", draft.value(field))
        } else {
            draft.value(field).to_string()
        };
        let style = if active {
            Style::default().fg(app.theme.highlight_fg)
        } else {
            Style::default().fg(app.theme.text)
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{marker}{:<9}", format!("{}:", field.label())), style),
            Span::styled(value, style),
        ]));
    }
    lines.push(Line::raw(""));
    lines.push(Line::from(vec![
        Span::styled("[Esc] Cancel", Style::default().fg(app.theme.muted)),
        Span::raw("   "),
        Span::styled("[Enter] Update", Style::default().add_modifier(Modifier::BOLD)),
    ]));

    let p = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .title(format!("Edit Customer #{}", target.id))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(app.theme.title)),
    );
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::keymap::Keymap;

    #[test]
    fn card_hint_follows_keymap() {
        let app = AppState::default();
        assert_eq!(card_hint(&app), " e: edit  d: delete ");

        let mut app = AppState::default();
        app.keymap = Keymap::parse("EditSelection = z\nDeleteSelection = Ctrl+x\n");
        let hint = card_hint(&app);
        assert!(hint.contains("e/z: edit"), "{hint}");
        assert!(hint.contains("d: delete"), "{hint}");
    }

    #[test]
    fn grid_width_breakpoints() {
        assert_eq!(cards_per_row(40), 1);
        assert_eq!(cards_per_row(60), 2);
        assert_eq!(cards_per_row(120), 3);
    }
}
