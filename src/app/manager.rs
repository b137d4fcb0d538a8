//! Tabbed create/edit/list/delete screen

use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::requests::Requests;
use super::Flow;
use crate::api::{ApiError, ErrorBody, PersonClient, PersonId, PersonRecord};
use crate::form::{Draft, Field, FieldErrors, REQUIRED_MESSAGE};

/// Substring the backend uses for unique-constraint violations (phone)
pub const DUPLICATE_MARKER: &str = "Duplicate entry";
pub const DUPLICATE_PHONE_MESSAGE: &str = "This phone number is already in use";

pub const CREATED_NOTICE: &str = "Details submitted successfully";
pub const UPDATED_NOTICE: &str = "Details updated successfully";
pub const DELETED_NOTICE: &str = "Person deleted successfully";

pub const SUBMIT_REJECTED: &str = "Error: Failed to submit details";
pub const SUBMIT_UNREACHABLE: &str = "Error: Unable to submit details. Please try again later.";
pub const NO_DATA: &str = "No data found.";
pub const LIST_FALLBACK: &str = "Failed to fetch saved persons";
pub const LIST_UNREACHABLE: &str = "Error: Unable to fetch saved persons. Please try again later.";
pub const DELETE_FALLBACK: &str = "Failed to delete person";
pub const DELETE_UNREACHABLE: &str = "Error: Unable to delete person. Please try again later.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Form,
    List,
}

impl View {
    pub const ALL: [View; 2] = [View::Form, View::List];

    pub fn title(self) -> &'static str {
        match self {
            View::Form => "Person Data",
            View::List => "Saved Persons",
        }
    }

    pub fn index(self) -> usize {
        match self {
            View::Form => 0,
            View::List => 1,
        }
    }
}

pub(crate) enum ManagerEvent {
    Submitted {
        updated: bool,
        result: Result<(), ApiError>,
    },
    Listed(Result<Vec<PersonRecord>, ApiError>),
    Deleted(Result<(), ApiError>),
}

pub struct PersonManager {
    client: Arc<PersonClient>,
    requests: Requests<ManagerEvent>,
    view: View,

    // Person Data view
    pub draft: Draft,
    pub focus: Field,
    pub errors: FieldErrors,

    // Saved Persons view
    pub persons: Vec<PersonRecord>,
    pub selected: usize,

    /// Success message waiting to be shown
    pub notice: Option<String>,
}

impl PersonManager {
    pub fn new(client: Arc<PersonClient>) -> Self {
        Self {
            client,
            requests: Requests::new(),
            view: View::Form,
            draft: Draft::default(),
            focus: Field::FirstName,
            errors: FieldErrors::default(),
            persons: Vec::new(),
            selected: 0,
            notice: None,
        }
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn is_loading(&self) -> bool {
        self.requests.is_busy()
    }

    pub fn is_editing(&self) -> bool {
        self.draft.is_editing()
    }

    pub fn take_notice(&mut self) -> Option<String> {
        self.notice.take()
    }

    /// Switch views. Entering the list fetches it; entering the form does nothing else.
    pub fn set_view(&mut self, view: View) {
        if self.view == view {
            return;
        }
        self.view = view;
        if view == View::List {
            self.fetch();
        }
    }

    /// Set one field and drop the error shown for it
    pub fn update_field(&mut self, field: Field, value: impl Into<String>) {
        self.draft.set(field, value);
        self.errors.clear(field);
    }

    fn type_char(&mut self, c: char) {
        self.draft.push(self.focus, c);
        self.errors.clear(self.focus);
    }

    fn backspace(&mut self) {
        self.draft.pop(self.focus);
        self.errors.clear(self.focus);
    }

    /// Create or update depending on edit mode
    pub fn submit(&mut self) {
        if self.requests.is_busy() {
            tracing::debug!("Submit ignored while a request is in flight");
            return;
        }
        if let Some(field) = self.draft.first_missing() {
            self.errors.set(field, REQUIRED_MESSAGE);
            self.focus = field;
            return;
        }

        self.errors.clear_all();
        let client = Arc::clone(&self.client);
        let payload = self.draft.payload();
        let editing = self.draft.editing_id.clone();

        self.requests.spawn(async move {
            let result = match &editing {
                Some(id) => client.update(id, &payload).await,
                None => client.create(&payload).await,
            };
            ManagerEvent::Submitted {
                updated: editing.is_some(),
                result,
            }
        });
    }

    /// Re-fetch the whole collection
    pub fn fetch(&mut self) {
        self.errors.clear_all();
        let client = Arc::clone(&self.client);
        self.requests
            .spawn(async move { ManagerEvent::Listed(client.list().await) });
    }

    pub fn delete(&mut self, id: PersonId) {
        self.errors.clear_all();
        let client = Arc::clone(&self.client);
        self.requests
            .spawn(async move { ManagerEvent::Deleted(client.delete(&id).await) });
    }

    pub fn delete_selected(&mut self) {
        if let Some(id) = self.persons.get(self.selected).and_then(|p| p.id.clone()) {
            self.delete(id);
        }
    }

    /// Load a listed record into the draft and go back to the form
    pub fn edit(&mut self, index: usize) {
        let Some(record) = self.persons.get(index) else {
            return;
        };
        self.draft.load(record);
        self.focus = Field::FirstName;
        self.view = View::Form;
    }

    pub fn edit_selected(&mut self) {
        self.edit(self.selected);
    }

    pub fn select_next(&mut self) {
        if !self.persons.is_empty() {
            self.selected = (self.selected + 1) % self.persons.len();
        }
    }

    pub fn select_prev(&mut self) {
        if !self.persons.is_empty() {
            self.selected = self.selected.checked_sub(1).unwrap_or(self.persons.len() - 1);
        }
    }

    /// Apply whatever completions have already arrived
    pub fn poll(&mut self) {
        while let Some(event) = self.requests.try_next() {
            self.apply(event);
        }
    }

    /// Wait until no request is in flight, applying completions (and any
    /// follow-up refreshes they trigger) as they arrive
    pub async fn settle(&mut self) {
        while let Some(event) = self.requests.next().await {
            self.apply(event);
        }
    }

    pub(crate) fn apply(&mut self, event: ManagerEvent) {
        match event {
            ManagerEvent::Submitted { updated, result } => match result {
                Ok(()) => {
                    tracing::info!(updated, "Person saved");
                    let notice = if updated { UPDATED_NOTICE } else { CREATED_NOTICE };
                    self.notice = Some(notice.to_string());
                    self.draft.reset();
                    self.focus = Field::FirstName;
                    self.fetch();
                }
                Err(e) => {
                    tracing::warn!("Submit failed: {}", e);
                    record_submit_failure(&mut self.errors, &e);
                }
            },
            ManagerEvent::Listed(result) => match result {
                Ok(persons) => {
                    tracing::debug!(count = persons.len(), "Fetched saved persons");
                    self.persons = persons;
                    if self.selected >= self.persons.len() {
                        self.selected = self.persons.len().saturating_sub(1);
                    }
                }
                Err(e) => {
                    tracing::warn!("Fetch failed: {}", e);
                    self.errors.set_general(list_failure_message(&e));
                }
            },
            ManagerEvent::Deleted(result) => match result {
                Ok(()) => {
                    tracing::info!("Person deleted");
                    self.notice = Some(DELETED_NOTICE.to_string());
                    self.fetch();
                }
                Err(e) => {
                    tracing::warn!("Delete failed: {}", e);
                    self.errors.set_general(delete_failure_message(&e));
                }
            },
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Flow {
        match key.code {
            KeyCode::F(1) => {
                self.set_view(View::Form);
                return Flow::Continue;
            }
            KeyCode::F(2) => {
                self.set_view(View::List);
                return Flow::Continue;
            }
            KeyCode::F(10) => return Flow::Help,
            _ => {}
        }

        match self.view {
            View::Form => self.handle_form_key(key),
            View::List => self.handle_list_key(key),
        }
    }

    fn handle_form_key(&mut self, key: KeyEvent) -> Flow {
        match key.code {
            KeyCode::Tab | KeyCode::Down => self.focus = self.focus.next(),
            KeyCode::BackTab | KeyCode::Up => self.focus = self.focus.prev(),
            KeyCode::Enter => self.submit(),
            KeyCode::Backspace => self.backspace(),
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => self.type_char(c),
            _ => {}
        }
        Flow::Continue
    }

    fn handle_list_key(&mut self, key: KeyEvent) -> Flow {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.select_prev(),
            KeyCode::Char('e') | KeyCode::Enter => self.edit_selected(),
            KeyCode::Char('d') | KeyCode::Delete => self.delete_selected(),
            KeyCode::Char('r') => self.fetch(),
            KeyCode::Tab | KeyCode::BackTab => self.set_view(View::Form),
            KeyCode::Char('?') => return Flow::Help,
            KeyCode::Char('q') => return Flow::Quit,
            _ => {}
        }
        Flow::Continue
    }
}

/// Map a failed create/update onto the error record.
///
/// Only the first server error is considered.
pub fn record_submit_failure(errors: &mut FieldErrors, err: &ApiError) {
    match err {
        ApiError::Status { .. } => match err.body().and_then(ErrorBody::first_error) {
            Some(message) if message.contains(DUPLICATE_MARKER) => {
                errors.set(Field::Phone, DUPLICATE_PHONE_MESSAGE)
            }
            Some(message) => errors.set_general(message),
            None => errors.set_general(SUBMIT_REJECTED),
        },
        ApiError::Transport(_) | ApiError::Malformed | ApiError::Decode(_) => {
            errors.set_general(SUBMIT_UNREACHABLE)
        }
    }
}

pub fn list_failure_message(err: &ApiError) -> String {
    match err {
        ApiError::Malformed => NO_DATA.to_string(),
        ApiError::Status { .. } => format!("Error: {}", server_message(err).unwrap_or(LIST_FALLBACK)),
        ApiError::Transport(_) | ApiError::Decode(_) => LIST_UNREACHABLE.to_string(),
    }
}

pub fn delete_failure_message(err: &ApiError) -> String {
    match err {
        ApiError::Status { .. } => format!("Error: {}", server_message(err).unwrap_or(DELETE_FALLBACK)),
        _ => DELETE_UNREACHABLE.to_string(),
    }
}

fn server_message(err: &ApiError) -> Option<&str> {
    err.body().and_then(|b| b.message.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    fn manager() -> PersonManager {
        let client = PersonClient::new("http://127.0.0.1:9", None).unwrap();
        PersonManager::new(Arc::new(client))
    }

    fn rejected(errors: &[&str], message: Option<&str>) -> ApiError {
        ApiError::Status {
            status: StatusCode::BAD_REQUEST,
            body: Some(ErrorBody {
                errors: errors.iter().map(|e| e.to_string()).collect(),
                message: message.map(str::to_string),
            }),
        }
    }

    fn person(id: &str, first: &str) -> PersonRecord {
        PersonRecord {
            id: Some(PersonId::new(id)),
            first_name: first.to_string(),
            last_name: "Lee".to_string(),
            email: format!("{}@example.com", first.to_lowercase()),
            phone: "555-0000".to_string(),
            address: "1 Main St".to_string(),
            city: "Springfield".to_string(),
            state: "IL".to_string(),
            postal_code: "62701".to_string(),
        }
    }

    #[test]
    fn test_duplicate_entry_only_sets_phone_error() {
        let mut m = manager();
        m.update_field(Field::FirstName, "Ann");
        m.update_field(Field::Phone, "555-1111");

        m.apply(ManagerEvent::Submitted {
            updated: false,
            result: Err(rejected(&["Duplicate entry for phone"], None)),
        });

        assert_eq!(m.errors.get(Field::Phone), Some(DUPLICATE_PHONE_MESSAGE));
        assert_eq!(m.errors.fields_with_errors(), vec![Field::Phone]);
        assert!(m.errors.general().is_none());
        // Draft survives the failure
        assert_eq!(m.draft.first_name, "Ann");
        assert_eq!(m.draft.phone, "555-1111");
        assert!(m.notice.is_none());
    }

    #[test]
    fn test_other_submit_errors_go_to_general_slot() {
        let mut errors = FieldErrors::default();
        record_submit_failure(&mut errors, &rejected(&["Email is invalid", "Duplicate entry"], None));
        assert_eq!(errors.general(), Some("Email is invalid"));
        assert!(errors.fields_with_errors().is_empty());

        let mut errors = FieldErrors::default();
        record_submit_failure(&mut errors, &rejected(&[], Some("ignored")));
        assert_eq!(errors.general(), Some(SUBMIT_REJECTED));

        let mut errors = FieldErrors::default();
        record_submit_failure(
            &mut errors,
            &ApiError::Status {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                body: None,
            },
        );
        assert_eq!(errors.general(), Some(SUBMIT_REJECTED));
    }

    #[test]
    fn test_list_failure_messages() {
        assert_eq!(list_failure_message(&ApiError::Malformed), NO_DATA);
        assert_eq!(
            list_failure_message(&rejected(&[], Some("Database offline"))),
            "Error: Database offline"
        );
        assert_eq!(
            list_failure_message(&rejected(&[], None)),
            "Error: Failed to fetch saved persons"
        );
        assert_eq!(
            list_failure_message(&ApiError::Decode("eof".to_string())),
            LIST_UNREACHABLE
        );
    }

    #[test]
    fn test_delete_failure_messages() {
        assert_eq!(
            delete_failure_message(&rejected(&[], Some("Person not found"))),
            "Error: Person not found"
        );
        assert_eq!(
            delete_failure_message(&ApiError::Status {
                status: StatusCode::NOT_FOUND,
                body: None,
            }),
            "Error: Failed to delete person"
        );
    }

    #[test]
    fn test_malformed_list_keeps_previous_persons() {
        let mut m = manager();
        m.persons = vec![person("1", "Ann"), person("2", "Bob")];

        m.apply(ManagerEvent::Listed(Err(ApiError::Malformed)));

        assert_eq!(m.persons.len(), 2);
        assert_eq!(m.errors.general(), Some(NO_DATA));
    }

    #[test]
    fn test_listed_replaces_and_clamps_selection() {
        let mut m = manager();
        m.persons = vec![person("1", "Ann"), person("2", "Bob"), person("3", "Cy")];
        m.selected = 2;

        m.apply(ManagerEvent::Listed(Ok(vec![person("9", "Dee")])));

        assert_eq!(m.persons, vec![person("9", "Dee")]);
        assert_eq!(m.selected, 0);
    }

    #[test]
    fn test_edit_loads_record_and_returns_to_form() {
        let mut m = manager();
        m.persons = vec![person("1", "Ann"), person("2", "Bob")];
        m.view = View::List;
        m.selected = 1;

        m.edit_selected();

        assert_eq!(m.view(), View::Form);
        assert!(m.is_editing());
        assert_eq!(m.draft.editing_id, Some(PersonId::new("2")));
        let mut expected = Draft::default();
        expected.load(&person("2", "Bob"));
        for field in Field::ALL {
            assert_eq!(m.draft.get(field), expected.get(field));
        }
    }

    #[test]
    fn test_submit_with_missing_field_is_refused() {
        let mut m = manager();
        m.update_field(Field::FirstName, "Ann");
        m.focus = Field::City;

        m.submit();

        assert!(!m.is_loading());
        assert_eq!(m.errors.get(Field::LastName), Some(REQUIRED_MESSAGE));
        assert_eq!(m.focus, Field::LastName);

        // Typing into the field clears its error
        m.handle_key(KeyEvent::new(KeyCode::Char('L'), KeyModifiers::NONE));
        assert!(m.errors.get(Field::LastName).is_none());
        assert_eq!(m.draft.last_name, "L");
    }

    #[test]
    fn test_form_navigation_keys() {
        let mut m = manager();
        m.handle_key(KeyEvent::new(KeyCode::Tab, KeyModifiers::NONE));
        assert_eq!(m.focus, Field::LastName);
        m.handle_key(KeyEvent::new(KeyCode::BackTab, KeyModifiers::SHIFT));
        m.handle_key(KeyEvent::new(KeyCode::Up, KeyModifiers::NONE));
        assert_eq!(m.focus, Field::PostalCode);
    }

    #[test]
    fn test_list_keys() {
        let mut m = manager();
        m.view = View::List;
        m.persons = vec![person("1", "Ann"), person("2", "Bob")];

        m.handle_key(KeyEvent::new(KeyCode::Char('j'), KeyModifiers::NONE));
        assert_eq!(m.selected, 1);
        m.handle_key(KeyEvent::new(KeyCode::Char('j'), KeyModifiers::NONE));
        assert_eq!(m.selected, 0);

        assert_eq!(
            m.handle_key(KeyEvent::new(KeyCode::Char('?'), KeyModifiers::NONE)),
            Flow::Help
        );
        assert_eq!(
            m.handle_key(KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE)),
            Flow::Quit
        );

        // Switching to the form never fetches
        m.handle_key(KeyEvent::new(KeyCode::F(1), KeyModifiers::NONE));
        assert_eq!(m.view(), View::Form);
        assert!(!m.is_loading());
    }

    #[tokio::test]
    async fn test_successful_submit_resets_draft_and_refreshes() {
        let mut m = manager();
        m.draft.load(&person("4", "Ann"));

        m.apply(ManagerEvent::Submitted {
            updated: true,
            result: Ok(()),
        });

        assert_eq!(m.draft, Draft::default());
        assert!(!m.is_editing());
        assert_eq!(m.take_notice().as_deref(), Some(UPDATED_NOTICE));
        // Refresh is on its way
        assert!(m.is_loading());
    }
}
