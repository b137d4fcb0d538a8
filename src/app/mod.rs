mod manager;
mod requests;
mod simple;

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::time::{Duration, Instant};

pub use manager::{
    delete_failure_message, list_failure_message, record_submit_failure, PersonManager, View,
    CREATED_NOTICE, DELETED_NOTICE, DUPLICATE_PHONE_MESSAGE, NO_DATA, SUBMIT_UNREACHABLE,
    UPDATED_NOTICE,
};
pub use requests::Requests;
pub use simple::{DetailsForm, FAILED_NOTICE, SUBMITTED_NOTICE};

/// How long a status message stays in the info line
const STATUS_TIMEOUT: Duration = Duration::from_secs(3);

/// What a screen wants the app to do after a key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Help,
    Quit,
}

pub enum Screen {
    Manager(PersonManager),
    Simple(DetailsForm),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Popup {
    None,
    Help,
}

pub struct App {
    pub screen: Screen,
    pub popup: Popup,

    // Status message (shown in info line, auto-clears after timeout)
    pub status_message: Option<String>,
    pub status_message_time: Option<Instant>,

    /// Mirror success notices as desktop notifications
    pub notifications: bool,
    pub should_quit: bool,
}

impl App {
    pub fn new(screen: Screen, notifications: bool) -> Self {
        Self {
            screen,
            popup: Popup::None,
            status_message: None,
            status_message_time: None,
            notifications,
            should_quit: false,
        }
    }

    pub fn is_loading(&self) -> bool {
        match &self.screen {
            Screen::Manager(m) => m.is_loading(),
            Screen::Simple(s) => s.is_loading(),
        }
    }

    fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some(msg.into());
        self.status_message_time = Some(Instant::now());
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        if self.popup == Popup::Help {
            if matches!(
                key.code,
                KeyCode::Esc | KeyCode::Enter | KeyCode::Char('?') | KeyCode::Char('q') | KeyCode::F(10)
            ) {
                self.popup = Popup::None;
            }
            return;
        }

        let flow = match &mut self.screen {
            Screen::Manager(m) => m.handle_key(key),
            Screen::Simple(s) => s.handle_key(key),
        };

        match flow {
            Flow::Continue => {}
            Flow::Help => self.popup = Popup::Help,
            Flow::Quit => self.should_quit = true,
        }
    }

    /// Apply finished requests and expire the status message
    pub fn tick(&mut self) {
        let notice = match &mut self.screen {
            Screen::Manager(m) => {
                m.poll();
                m.take_notice()
            }
            Screen::Simple(s) => {
                s.poll();
                s.take_notice()
            }
        };
        if let Some(msg) = notice {
            self.announce(msg);
        }

        if let Some(time) = self.status_message_time {
            if time.elapsed() >= STATUS_TIMEOUT {
                self.status_message = None;
                self.status_message_time = None;
            }
        }
    }

    fn announce(&mut self, msg: String) {
        if self.notifications {
            if let Err(e) = notify("persondesk", &msg) {
                tracing::warn!("Could not send notification: {}", e);
            }
        }
        self.set_status(msg);
    }
}

fn notify(summary: &str, body: &str) -> Result<()> {
    notify_rust::Notification::new()
        .summary(summary)
        .body(body)
        .icon("contact-new")
        .show()?;
    Ok(())
}
