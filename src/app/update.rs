//! Event loop, key handling and the customer operations.
//!
//! Operations never touch the network themselves: they validate, update
//! local state and queue an [`ApiRequest`] in `app.outbox`. The loop hands
//! the outbox to the [`Dispatcher`] and feeds completions back through
//! [`AppState::apply_event`].
use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::Terminal;
use ratatui::backend::Backend;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use crate::api::{ApiEvent, ApiRequest, Customer, CustomerId, Dispatcher};
use crate::app::form::CustomerDraft;
use crate::app::keymap::KeyAction;
use crate::app::{AppState, InputMode, ModalState, Toast};
use crate::search::apply_search;
use crate::ui;

pub const REQUIRED_FIELDS_ALERT: &str = "All fields are required!";
pub const ADDED_MSG: &str = "Customer added successfully!";
pub const UPDATED_MSG: &str = "Customer updated successfully!";
pub const DELETED_MSG: &str = "Customer deleted successfully!";

/// Whether the loop keeps going after a key press.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut AppState,
    dispatcher: &mut Dispatcher,
) -> Result<()> {
    app.load_customers();

    loop {
        pump(app, dispatcher);
        app.expire_toast(Instant::now());

        terminal.draw(|f| {
            ui::render(f, app);
        })?;

        if event::poll(Duration::from_millis(100))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
            && handle_key(app, key) == Flow::Quit
        {
            break;
        }
    }

    tracing::info!(uptime = ?app.started_at.elapsed(), "exiting");
    Ok(())
}

/// Send queued requests and apply every completion that has arrived.
pub fn pump(app: &mut AppState, dispatcher: &mut Dispatcher) {
    flush_outbox(app, dispatcher);
    while let Some(event) = dispatcher.try_next() {
        app.apply_event(event);
    }
    // completions may have queued reloads
    flush_outbox(app, dispatcher);
    app.in_flight = dispatcher.in_flight();
}

fn flush_outbox(app: &mut AppState, dispatcher: &mut Dispatcher) {
    for request in app.outbox.drain(..) {
        dispatcher.dispatch(request);
    }
}

fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

impl AppState {
    /// Queue a fetch of the whole list.
    pub fn load_customers(&mut self) {
        self.last_reload_seq += 1;
        self.outbox.push(ApiRequest::List {
            seq: self.last_reload_seq,
        });
    }

    /// Validate the add form and queue a create. Returns whether a request was queued.
    ///
    /// The form is cleared only once the server accepts the customer.
    pub fn add_customer(&mut self) -> bool {
        let missing = self.add_form.missing_fields();
        if !missing.is_empty() {
            tracing::debug!(?missing, "add rejected by validation");
            self.show_alert(REQUIRED_FIELDS_ALERT);
            return false;
        }
        let id = self.next_customer_id(now_millis());
        let customer = Customer::with_id(id, self.add_form.to_fields());
        tracing::info!(id, "creating customer");
        self.outbox.push(ApiRequest::Create(customer));
        true
    }

    pub fn delete_customer(&mut self, id: CustomerId) {
        tracing::info!(id, "deleting customer");
        self.outbox.push(ApiRequest::Delete { id });
    }

    pub fn delete_selected(&mut self) {
        if let Some(id) = self.selected_customer().map(|c| c.id) {
            self.delete_customer(id);
        }
    }

    /// Open the edit modal with a copy of `customer`'s fields.
    pub fn open_edit_modal(&mut self, customer: Customer) {
        let draft = CustomerDraft::from_customer(&customer);
        self.modal = Some(ModalState::Edit {
            target: customer,
            draft,
        });
        self.input_mode = InputMode::Modal;
    }

    /// Validate the edit draft and queue an update. Returns whether a request was queued.
    ///
    /// The modal stays open until the server accepts the change.
    pub fn update_customer(&mut self) -> bool {
        let Some(ModalState::Edit { target, draft }) = &self.modal else {
            return false;
        };
        if !draft.is_complete() {
            tracing::debug!(id = target.id, missing = ?draft.missing_fields(), "update rejected by validation");
            self.show_alert(REQUIRED_FIELDS_ALERT);
            return false;
        }
        let request = ApiRequest::Update {
            id: target.id,
            fields: draft.to_fields(),
        };
        tracing::info!(id = target.id, "updating customer");
        self.outbox.push(request);
        true
    }

    /// Close the edit modal without saving.
    pub fn cancel_edit(&mut self) {
        if matches!(self.modal, Some(ModalState::Edit { .. })) {
            self.close_modal();
        }
    }

    pub fn open_help(&mut self) {
        self.modal = Some(ModalState::Help { scroll: 0 });
        self.input_mode = InputMode::Modal;
    }

    pub fn close_modal(&mut self) {
        self.modal = None;
        self.input_mode = InputMode::Normal;
    }

    pub fn show_toast(&mut self, message: impl Into<String>) {
        self.toast = Some(Toast {
            message: message.into(),
            shown_at: Instant::now(),
        });
    }

    pub fn dismiss_toast(&mut self) {
        self.toast = None;
    }

    /// Hide the toast once it has been visible for `toast_duration`.
    pub fn expire_toast(&mut self, now: Instant) {
        if let Some(t) = &self.toast
            && now.saturating_duration_since(t.shown_at) >= self.toast_duration
        {
            self.toast = None;
        }
    }

    pub fn show_alert(&mut self, message: impl Into<String>) {
        self.alert = Some(message.into());
    }

    pub fn dismiss_alert(&mut self) {
        self.alert = None;
    }

    /// Time-based id, bumped past the previous one when two land in the same millisecond.
    pub fn next_customer_id(&mut self, now_ms: i64) -> CustomerId {
        let id = now_ms.max(self.last_issued_id + 1);
        self.last_issued_id = id;
        id
    }

    /// Apply a completed request.
    ///
    /// Successful mutations reload the list and notify; failures change
    /// nothing (the dispatcher has already logged them).
    pub fn apply_event(&mut self, event: ApiEvent) {
        match event {
            ApiEvent::Listed { seq, customers } => {
                if seq < self.applied_reload_seq {
                    tracing::debug!(seq, applied = self.applied_reload_seq, "dropping stale list response");
                    return;
                }
                self.applied_reload_seq = seq;
                tracing::debug!(seq, count = customers.len(), "customer list replaced");
                self.customers_all = customers;
                apply_search(self);
            }
            ApiEvent::Created { id } => {
                tracing::info!(id, "customer created");
                self.load_customers();
                self.show_toast(ADDED_MSG);
                self.add_form.clear();
            }
            ApiEvent::Updated { id } => {
                tracing::info!(id, "customer updated");
                self.load_customers();
                self.show_toast(UPDATED_MSG);
                if self.edit_target().map(|c| c.id) == Some(id) {
                    self.close_modal();
                }
            }
            ApiEvent::Deleted { id } => {
                tracing::info!(id, "customer deleted");
                self.load_customers();
                self.show_toast(DELETED_MSG);
            }
            ApiEvent::Failed { .. } => {}
        }
    }
}

/// Route a key press according to the current mode.
pub fn handle_key(app: &mut AppState, key: KeyEvent) -> Flow {
    // The alert blocks everything until acknowledged.
    if app.alert.is_some() {
        if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
            app.dismiss_alert();
        }
        return Flow::Continue;
    }
    match app.input_mode {
        InputMode::Normal => return handle_normal_key(app, key),
        InputMode::AddForm => handle_add_form_key(app, key),
        InputMode::Search => handle_search_key(app, key),
        InputMode::Modal => handle_modal_key(app, key),
    }
    Flow::Continue
}

fn handle_normal_key(app: &mut AppState, key: KeyEvent) -> Flow {
    let Some(action) = app.keymap.resolve(&key) else {
        return Flow::Continue;
    };
    let row = app.cards_per_row.max(1);
    let page = app.cards_per_page.max(1);
    match action {
        KeyAction::Quit => return Flow::Quit,
        KeyAction::FocusAddForm => app.input_mode = InputMode::AddForm,
        KeyAction::StartSearch => app.input_mode = InputMode::Search,
        KeyAction::EditSelection => {
            if let Some(c) = app.selected_customer().cloned() {
                app.open_edit_modal(c);
            }
        }
        KeyAction::DeleteSelection => app.delete_selected(),
        KeyAction::Reload => app.load_customers(),
        KeyAction::DismissToast => app.dismiss_toast(),
        KeyAction::OpenHelp => app.open_help(),
        KeyAction::MoveUp => move_back(app, row),
        KeyAction::MoveDown => move_forward(app, row),
        KeyAction::MoveLeft => move_back(app, 1),
        KeyAction::MoveRight => move_forward(app, 1),
        KeyAction::PageUp => move_back(app, page),
        KeyAction::PageDown => move_forward(app, page),
        KeyAction::Ignore => {}
    }
    Flow::Continue
}

fn move_back(app: &mut AppState, step: usize) {
    app.selected_index = app.selected_index.saturating_sub(step);
}

fn move_forward(app: &mut AppState, step: usize) {
    if app.customers.is_empty() {
        return;
    }
    app.selected_index = app
        .selected_index
        .saturating_add(step)
        .min(app.customers.len() - 1);
}

fn handle_add_form_key(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.input_mode = InputMode::Normal,
        KeyCode::Enter => {
            app.add_customer();
        }
        _ => {
            edit_draft(&mut app.add_form, key);
        }
    }
}

fn handle_search_key(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => app.input_mode = InputMode::Normal,
        KeyCode::Esc => {
            app.search_query.clear();
            apply_search(app);
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Backspace => {
            app.search_query.pop();
            apply_search(app);
        }
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.search_query.push(c);
            apply_search(app);
        }
        _ => {}
    }
}

fn handle_modal_key(app: &mut AppState, key: KeyEvent) {
    match app.modal.as_mut() {
        Some(ModalState::Edit { draft, .. }) => match key.code {
            KeyCode::Esc => app.cancel_edit(),
            KeyCode::Enter => {
                app.update_customer();
            }
            _ => {
                edit_draft(draft, key);
            }
        },
        Some(ModalState::Help { scroll }) => match key.code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('?') | KeyCode::Char('q') => {
                app.close_modal()
            }
            KeyCode::Up | KeyCode::Char('k') => *scroll = scroll.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => *scroll = scroll.saturating_add(1),
            _ => {}
        },
        None => app.input_mode = InputMode::Normal,
    }
}

/// Field navigation and typing shared by the add form and the edit modal.
fn edit_draft(draft: &mut CustomerDraft, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Tab | KeyCode::Down => draft.focus_next(),
        KeyCode::BackTab | KeyCode::Up => draft.focus_prev(),
        KeyCode::Backspace => draft.backspace(),
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => draft.push_char(c),
        _ => return false,
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::RequestKind;
    use crate::app::form::DraftField;

    fn mk(id: i64, name: &str, email: &str) -> Customer {
        Customer {
            id,
            name: name.to_string(),
            email: email.to_string(),
            phone: "555-0100".to_string(),
            address: "1 Main St".to_string(),
        }
    }

    fn press(app: &mut AppState, code: KeyCode) -> Flow {
        handle_key(app, KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_str(app: &mut AppState, s: &str) {
        for c in s.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn loaded(list: Vec<Customer>) -> AppState {
        let mut app = AppState::default();
        app.apply_event(ApiEvent::Listed { seq: 0, customers: list });
        app
    }

    fn fill_add_form(app: &mut AppState) {
        app.add_form = CustomerDraft {
            name: "Cara".into(),
            email: "cara@x.com".into(),
            phone: "123".into(),
            address: "Elm St".into(),
            active: DraftField::Name,
        };
    }

    #[test]
    fn add_with_empty_name_queues_nothing_and_alerts() {
        let mut app = loaded(vec![mk(1, "Ann", "ann@x.com")]);
        fill_add_form(&mut app);
        app.add_form.name.clear();

        assert!(!app.add_customer());
        assert!(app.outbox.is_empty());
        assert_eq!(app.alert.as_deref(), Some(REQUIRED_FIELDS_ALERT));
        assert_eq!(app.customers_all.len(), 1);
    }

    #[test]
    fn alert_blocks_keys_until_dismissed() {
        let mut app = AppState::default();
        app.show_alert(REQUIRED_FIELDS_ALERT);
        assert_eq!(press(&mut app, KeyCode::Char('q')), Flow::Continue);
        assert!(app.alert.is_some());
        press(&mut app, KeyCode::Enter);
        assert!(app.alert.is_none());
        assert_eq!(press(&mut app, KeyCode::Char('q')), Flow::Quit);
    }

    #[test]
    fn add_queues_create_then_clears_form_on_success() {
        let mut app = AppState::default();
        fill_add_form(&mut app);
        assert!(app.add_customer());

        let Some(ApiRequest::Create(c)) = app.outbox.pop() else {
            panic!("expected a create request");
        };
        assert_eq!(c.name, "Cara");
        assert_eq!(c.address, "Elm St");
        assert!(c.id > 0);
        // still filled while the request is in flight
        assert_eq!(app.add_form.name, "Cara");

        app.apply_event(ApiEvent::Created { id: c.id });
        assert_eq!(app.add_form, CustomerDraft::default());
        assert_eq!(app.toast.as_ref().map(|t| t.message.as_str()), Some(ADDED_MSG));
        assert!(matches!(app.outbox.as_slice(), [ApiRequest::List { .. }]));
    }

    #[test]
    fn typing_in_add_form_and_submitting_with_enter() {
        let mut app = AppState::default();
        press(&mut app, KeyCode::Char('a'));
        assert_eq!(app.input_mode, InputMode::AddForm);
        type_str(&mut app, "Dee");
        press(&mut app, KeyCode::Tab);
        type_str(&mut app, "dee@x.com");
        press(&mut app, KeyCode::Tab);
        type_str(&mut app, "9");
        press(&mut app, KeyCode::Tab);
        type_str(&mut app, "Oak");
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.outbox.len(), 1);
        assert_eq!(app.outbox[0].kind(), RequestKind::Create);
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.input_mode, InputMode::Normal);
    }

    #[test]
    fn failed_create_keeps_form_and_list() {
        let mut app = loaded(vec![mk(1, "Ann", "ann@x.com")]);
        fill_add_form(&mut app);
        app.add_customer();
        app.outbox.clear();

        app.apply_event(ApiEvent::Failed {
            kind: RequestKind::Create,
            id: Some(5),
            error: "connection refused".into(),
        });
        assert!(app.outbox.is_empty());
        assert!(app.toast.is_none());
        assert_eq!(app.add_form.name, "Cara");
        assert_eq!(app.customers_all.len(), 1);
    }

    #[test]
    fn delete_selected_then_reload_drops_the_id() {
        let mut app = loaded(vec![mk(1, "Ann", "ann@x.com"), mk(2, "Bob", "bob@x.com")]);
        app.selected_index = 1;
        press(&mut app, KeyCode::Char('d'));
        assert_eq!(app.outbox, vec![ApiRequest::Delete { id: 2 }]);
        app.outbox.clear();

        app.apply_event(ApiEvent::Deleted { id: 2 });
        assert_eq!(app.toast.as_ref().map(|t| t.message.as_str()), Some(DELETED_MSG));
        let Some(ApiRequest::List { seq }) = app.outbox.pop() else {
            panic!("expected a reload");
        };
        app.apply_event(ApiEvent::Listed {
            seq,
            customers: vec![mk(1, "Ann", "ann@x.com")],
        });
        assert!(app.customers_all.iter().all(|c| c.id != 2));
        assert_eq!(app.selected_index, 0);
    }

    #[test]
    fn edit_modal_is_seeded_and_cancel_leaves_list() {
        let list = vec![mk(1, "Ann", "ann@x.com"), mk(2, "Bob", "bob@x.com")];
        let mut app = loaded(list.clone());
        app.selected_index = 1;
        press(&mut app, KeyCode::Char('e'));

        let Some(ModalState::Edit { target, draft }) = &app.modal else {
            panic!("edit modal should be open");
        };
        assert_eq!(target.id, 2);
        assert_eq!(draft.name, "Bob");
        assert_eq!(draft.email, "bob@x.com");
        assert_eq!(draft.phone, "555-0100");
        assert_eq!(draft.address, "1 Main St");
        assert_eq!(app.input_mode, InputMode::Modal);

        type_str(&mut app, "by");
        press(&mut app, KeyCode::Esc);
        assert!(app.modal.is_none());
        assert!(app.edit_target().is_none());
        assert_eq!(app.customers_all, list);
        assert!(app.outbox.is_empty());
    }

    #[test]
    fn edit_does_not_touch_add_form() {
        let mut app = loaded(vec![mk(1, "Ann", "ann@x.com")]);
        fill_add_form(&mut app);
        app.open_edit_modal(mk(1, "Ann", "ann@x.com"));
        type_str(&mut app, "e");
        assert_eq!(app.add_form.name, "Cara");
    }

    #[test]
    fn update_sends_fields_and_closes_on_success() {
        let mut app = loaded(vec![mk(1, "Ann", "ann@x.com")]);
        app.open_edit_modal(mk(1, "Ann", "ann@x.com"));
        type_str(&mut app, "ie");
        press(&mut app, KeyCode::Enter);

        let [ApiRequest::Update { id, fields }] = app.outbox.as_slice() else {
            panic!("expected one update");
        };
        assert_eq!(*id, 1);
        assert_eq!(fields.name, "Annie");
        // modal waits for the server
        assert!(app.edit_target().is_some());
        app.outbox.clear();

        app.apply_event(ApiEvent::Updated { id: 1 });
        assert!(app.modal.is_none());
        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(app.toast.as_ref().map(|t| t.message.as_str()), Some(UPDATED_MSG));
        assert!(matches!(app.outbox.as_slice(), [ApiRequest::List { .. }]));
    }

    #[test]
    fn update_with_blank_field_is_rejected() {
        let mut app = AppState::default();
        app.open_edit_modal(mk(1, "Ann", "ann@x.com"));
        if let Some(ModalState::Edit { draft, .. }) = app.modal.as_mut() {
            draft.phone.clear();
        }
        assert!(!app.update_customer());
        assert!(app.outbox.is_empty());
        assert_eq!(app.alert.as_deref(), Some(REQUIRED_FIELDS_ALERT));
        assert!(app.edit_target().is_some());
    }

    #[test]
    fn stale_reload_is_dropped() {
        let mut app = AppState::default();
        app.load_customers();
        app.load_customers();
        let seqs: Vec<u64> = app
            .outbox
            .iter()
            .filter_map(|r| match r {
                ApiRequest::List { seq } => Some(*seq),
                _ => None,
            })
            .collect();
        assert_eq!(seqs, vec![1, 2]);

        app.apply_event(ApiEvent::Listed { seq: 2, customers: vec![mk(7, "New", "n@x")] });
        app.apply_event(ApiEvent::Listed { seq: 1, customers: vec![mk(6, "Old", "o@x")] });
        assert_eq!(app.customers_all[0].id, 7);
    }

    #[test]
    fn search_filters_live_and_escape_resets() {
        let mut app = loaded(vec![mk(1, "Ann", "ann@x.com"), mk(2, "Bob", "bob@x.com")]);
        press(&mut app, KeyCode::Char('/'));
        type_str(&mut app, "AN");
        assert_eq!(app.customers.iter().map(|c| c.id).collect::<Vec<_>>(), vec![1]);
        press(&mut app, KeyCode::Esc);
        assert!(app.search_query.is_empty());
        assert_eq!(app.customers.len(), 2);
        assert_eq!(app.input_mode, InputMode::Normal);
    }

    #[test]
    fn reload_respects_active_search() {
        let mut app = AppState::default();
        app.search_query = "bob".into();
        app.apply_event(ApiEvent::Listed {
            seq: 1,
            customers: vec![mk(1, "Ann", "ann@x.com"), mk(2, "Bob", "bob@x.com")],
        });
        assert_eq!(app.customers_all.len(), 2);
        assert_eq!(app.customers.len(), 1);
    }

    #[test]
    fn ids_are_time_based_and_strictly_increasing() {
        let mut app = AppState::default();
        assert_eq!(app.next_customer_id(1_000), 1_000);
        assert_eq!(app.next_customer_id(1_000), 1_001);
        assert_eq!(app.next_customer_id(999), 1_002);
        assert_eq!(app.next_customer_id(5_000), 5_000);
    }

    #[test]
    fn toast_expires_after_duration_and_can_be_dismissed() {
        let mut app = AppState::default();
        app.toast_duration = Duration::from_millis(50);
        app.show_toast("hi");
        let shown = app.toast.as_ref().unwrap().shown_at;
        app.expire_toast(shown + Duration::from_millis(10));
        assert!(app.toast.is_some());
        app.expire_toast(shown + Duration::from_millis(50));
        assert!(app.toast.is_none());

        app.show_toast("again");
        press(&mut app, KeyCode::Char('x'));
        assert!(app.toast.is_none());
    }

    #[test]
    fn card_navigation_moves_by_row_and_clamps() {
        let list = (1..=7).map(|i| mk(i, "N", "e")).collect();
        let mut app = loaded(list);
        app.cards_per_row = 3;
        app.cards_per_page = 6;
        press(&mut app, KeyCode::Down);
        assert_eq!(app.selected_index, 3);
        press(&mut app, KeyCode::Right);
        assert_eq!(app.selected_index, 4);
        press(&mut app, KeyCode::PageDown);
        assert_eq!(app.selected_index, 6);
        press(&mut app, KeyCode::Up);
        assert_eq!(app.selected_index, 3);
        press(&mut app, KeyCode::PageUp);
        assert_eq!(app.selected_index, 0);
    }

    #[test]
    fn help_opens_and_closes() {
        let mut app = AppState::default();
        press(&mut app, KeyCode::Char('?'));
        assert!(matches!(app.modal, Some(ModalState::Help { scroll: 0 })));
        press(&mut app, KeyCode::Down);
        assert!(matches!(app.modal, Some(ModalState::Help { scroll: 1 })));
        press(&mut app, KeyCode::Esc);
        assert!(app.modal.is_none());
    }
}
