//! Application State
//!
//! Core application logic tying together the credential store, UI, and input.

mod actions;
mod clipboard;
mod config;
mod credentials;
mod input;
mod runner;

use std::time::{Duration, Instant};

use ratatui::layout::Rect;
use ratatui::Frame;

use crate::input::modes::ModeState;
use crate::ssh::SshCommand;
use crate::store::{Credential, CredentialStore};
use crate::ui::components::{CredentialDetail, CredentialForm, CredentialItem, HelpState, ListViewState, MessageType};
use crate::ui::renderer::{Renderer, UiState, View};

pub use config::{AppConfig, PendingAction};
pub use runner::run;

/// A connection waiting for the terminal to be handed over
#[derive(Debug)]
pub struct PendingConnect {
    pub name: String,
    pub command: SshCommand,
}

pub struct App {
    pub config: AppConfig,
    pub store: CredentialStore,
    pub mode_state: ModeState,
    pub view: View,
    pub terminal_size: Rect,
    pub list_state: ListViewState,
    pub credentials: Vec<Credential>,
    pub credential_items: Vec<CredentialItem>,
    pub filter: Option<String>,
    pub selected_detail: Option<CredentialDetail>,
    pub message: Option<(String, MessageType, Instant)>,
    pub pending_action: Option<PendingAction>,
    pub pending_connect: Option<PendingConnect>,
    pub password_visible: bool,
    pub should_quit: bool,
    pub credential_form: Option<CredentialForm>,
    pub help_state: HelpState,
}

impl App {
    pub fn new(config: AppConfig, store: CredentialStore) -> Self {
        let mut app = Self {
            config,
            store,
            mode_state: ModeState::new(),
            view: View::List,
            terminal_size: Rect::default(),
            list_state: ListViewState::new(),
            credentials: Vec::new(),
            credential_items: Vec::new(),
            filter: None,
            selected_detail: None,
            message: None,
            pending_action: None,
            pending_connect: None,
            password_visible: false,
            should_quit: false,
            credential_form: None,
            help_state: HelpState::new(),
        };
        app.rebuild_list();
        app
    }

    pub fn render(&mut self, frame: &mut Frame) {
        self.terminal_size = frame.area();
        self.check_message_expiry();

        let message = self.message.as_ref().map(|(m, t, _)| (m.as_str(), *t));
        let command_buffer = self.mode_state.mode.is_text_input().then(|| self.mode_state.get_buffer());
        let confirm_message = self.pending_action.as_ref().map(|a| a.confirm_message());

        let mut state = UiState {
            view: self.view,
            mode: self.mode_state.mode,
            credentials: &self.credential_items,
            list_state: &mut self.list_state,
            selected_detail: self.selected_detail.as_ref(),
            command_buffer,
            message,
            filter: self.filter.as_deref(),
            confirm_message: confirm_message.as_deref(),
            credential_form: self.credential_form.as_ref(),
            help_state: &self.help_state,
        };

        Renderer::render(frame, &mut state);
    }

    fn check_message_expiry(&mut self) {
        let expired = self
            .message
            .as_ref()
            .is_some_and(|(_, _, time)| time.elapsed() > Duration::from_secs(5));

        if expired {
            self.message = None;
        }
    }

    pub fn set_message(&mut self, msg: &str, msg_type: MessageType) {
        self.message = Some((msg.to_string(), msg_type, Instant::now()));
    }

    /// Hand the queued connection to the caller that owns the terminal
    pub fn take_pending_connect(&mut self) -> Option<PendingConnect> {
        self.pending_connect.take()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::path::PathBuf;

    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use tempfile::{NamedTempFile, TempDir};

    use super::{App, AppConfig};
    use crate::store::{Credential, CredentialStore};

    pub struct Fixture {
        pub dir: TempDir,
        pub key: NamedTempFile,
    }

    impl Fixture {
        pub fn new() -> Self {
            Self {
                dir: TempDir::new().unwrap(),
                key: NamedTempFile::new().unwrap(),
            }
        }

        pub fn store_path(&self) -> PathBuf {
            self.dir.path().join("credentials.json")
        }

        pub fn key_path(&self) -> String {
            self.key.path().display().to_string()
        }

        pub fn key_cred(&self, name: &str, host: &str) -> Credential {
            Credential::with_key(name, host, 22, "deploy", self.key_path())
        }

        /// App over a store seeded with `creds`
        pub fn app(&self, creds: Vec<Credential>) -> App {
            let mut store = CredentialStore::open_at(self.store_path()).unwrap();
            for cred in creds {
                store.save(cred).unwrap();
            }
            App::new(AppConfig::with_store_path(self.store_path()), store)
        }

        pub fn reopen(&self) -> CredentialStore {
            CredentialStore::open_at(self.store_path()).unwrap()
        }
    }

    pub fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    pub fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    /// Feed every character of `keys` as a plain key press
    pub fn press(app: &mut App, keys: &str) {
        for c in keys.chars() {
            app.handle_key_event(key(KeyCode::Char(c))).unwrap();
        }
    }

    pub fn names(app: &App) -> Vec<&str> {
        app.credential_items.iter().map(|i| i.name.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use ratatui::{backend::TestBackend, Terminal};

    use super::test_support::Fixture;
    use super::*;

    #[test]
    fn test_new_app_lists_store_in_order() {
        let fx = Fixture::new();
        let app = fx.app(vec![fx.key_cred("web", "10.0.0.1"), fx.key_cred("db", "10.0.0.2")]);

        assert_eq!(super::test_support::names(&app), vec!["web", "db"]);
        assert_eq!(app.list_state.selected(), Some(0));
        assert_eq!(app.selected_detail.as_ref().map(|d| d.name.as_str()), Some("web"));
    }

    #[test]
    fn test_render_draws_list() {
        let fx = Fixture::new();
        let mut app = fx.app(vec![fx.key_cred("web", "10.0.0.1")]);
        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();

        terminal.draw(|frame| app.render(frame)).unwrap();

        assert_eq!(app.terminal_size, Rect::new(0, 0, 80, 20));
        let buf = terminal.backend().buffer();
        let text: String = (0..20)
            .flat_map(|y| (0..80).map(move |x| (x, y)))
            .map(|pos| buf[pos].symbol().to_string())
            .collect();
        assert!(text.contains("deploy@10.0.0.1:22"));
    }

    #[test]
    fn test_message_expiry() {
        let fx = Fixture::new();
        let mut app = fx.app(vec![]);
        app.set_message("hello", MessageType::Info);
        app.check_message_expiry();
        assert!(app.message.is_some());

        app.message = Some(("old".into(), MessageType::Info, Instant::now() - Duration::from_secs(6)));
        app.check_message_expiry();
        assert!(app.message.is_none());
    }
}
