pub mod components;
pub mod customers;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::Style;
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::app::{AppState, ModalState};

pub fn render(f: &mut Frame, app: &mut AppState) {
    let root = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(1),
        ])
        .split(f.area());

    let header = Paragraph::new(format!(
        "Customer Management System  {}  customers:{}  shown:{}",
        app.api_url,
        app.customers_all.len(),
        app.customers.len()
    ))
    .block(
        Block::default()
            .title("customer-manager")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(app.theme.border)),
    )
    .style(Style::default().fg(app.theme.header_fg).bg(app.theme.header_bg));
    f.render_widget(header, root[0]);

    customers::render_add_form(f, root[1], app);
    customers::render_search_bar(f, root[2], app);
    customers::render_customer_cards(f, root[3], app);
    components::render_status_bar(f, root[4], app);

    let area = f.area();
    match app.modal.clone() {
        Some(state @ ModalState::Edit { .. }) => customers::render_edit_modal(f, area, app, &state),
        Some(ModalState::Help { scroll }) => components::render_help_modal(f, area, app, scroll),
        None => {}
    }
    if app.toast.is_some() {
        components::render_toast(f, area, app);
    }
    if app.alert.is_some() {
        components::render_alert(f, area, app);
    }
}
