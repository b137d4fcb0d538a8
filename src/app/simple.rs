//! Submit-only details form

use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::requests::Requests;
use super::Flow;
use crate::api::{ApiError, PersonClient};
use crate::form::{Draft, Field, FieldErrors, REQUIRED_MESSAGE};

pub const SUBMITTED_NOTICE: &str = "Details submitted successfully";
pub const FAILED_NOTICE: &str = "Failed to submit details";

/// Eight fields and a single POST. The draft is kept after submitting.
pub struct DetailsForm {
    client: Arc<PersonClient>,
    requests: Requests<Result<(), ApiError>>,
    pub draft: Draft,
    pub focus: Field,
    pub errors: FieldErrors,
    pub notice: Option<String>,
}

impl DetailsForm {
    pub fn new(client: Arc<PersonClient>) -> Self {
        Self {
            client,
            requests: Requests::new(),
            draft: Draft::default(),
            focus: Field::FirstName,
            errors: FieldErrors::default(),
            notice: None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.requests.is_busy()
    }

    pub fn take_notice(&mut self) -> Option<String> {
        self.notice.take()
    }

    pub fn update_field(&mut self, field: Field, value: impl Into<String>) {
        self.draft.set(field, value);
        self.errors.clear(field);
    }

    pub fn submit(&mut self) {
        if let Some(field) = self.draft.first_missing() {
            self.errors.set(field, REQUIRED_MESSAGE);
            self.focus = field;
            return;
        }

        let client = Arc::clone(&self.client);
        let payload = self.draft.payload();
        self.requests
            .spawn(async move { client.create(&payload).await });
    }

    pub fn poll(&mut self) {
        while let Some(result) = self.requests.try_next() {
            self.apply(result);
        }
    }

    pub async fn settle(&mut self) {
        while let Some(result) = self.requests.next().await {
            self.apply(result);
        }
    }

    fn apply(&mut self, result: Result<(), ApiError>) {
        match result {
            Ok(()) => {
                tracing::info!("Details submitted");
                self.notice = Some(SUBMITTED_NOTICE.to_string());
            }
            Err(e @ ApiError::Status { .. }) => {
                tracing::warn!("Submit rejected: {}", e);
                self.notice = Some(FAILED_NOTICE.to_string());
            }
            Err(e) => {
                tracing::error!("Error: {}", e);
                self.notice = Some(FAILED_NOTICE.to_string());
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Flow {
        match key.code {
            KeyCode::Esc => return Flow::Quit,
            KeyCode::F(10) => return Flow::Help,
            KeyCode::Tab | KeyCode::Down => self.focus = self.focus.next(),
            KeyCode::BackTab | KeyCode::Up => self.focus = self.focus.prev(),
            KeyCode::Enter => self.submit(),
            KeyCode::Backspace => {
                self.draft.pop(self.focus);
                self.errors.clear(self.focus);
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.draft.push(self.focus, c);
                self.errors.clear(self.focus);
            }
            _ => {}
        }
        Flow::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> DetailsForm {
        let client = PersonClient::new("http://127.0.0.1:9", None).unwrap();
        DetailsForm::new(Arc::new(client))
    }

    #[test]
    fn test_typing_fills_focused_field() {
        let mut f = form();
        for c in "Ann".chars() {
            f.handle_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE));
        }
        f.handle_key(KeyEvent::new(KeyCode::Tab, KeyModifiers::NONE));
        f.handle_key(KeyEvent::new(KeyCode::Char('L'), KeyModifiers::SHIFT));

        assert_eq!(f.draft.first_name, "Ann");
        assert_eq!(f.draft.last_name, "L");
        assert_eq!(f.focus, Field::LastName);
    }

    #[test]
    fn test_empty_submit_marks_first_field() {
        let mut f = form();
        f.submit();

        assert!(!f.is_loading());
        assert_eq!(f.errors.get(Field::FirstName), Some(REQUIRED_MESSAGE));
    }

    #[test]
    fn test_escape_quits() {
        let mut f = form();
        assert_eq!(
            f.handle_key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE)),
            Flow::Quit
        );
    }
}
