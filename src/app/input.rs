use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::input::keymap::{confirm_action, normal_mode_action, text_input_action, Action, Motion};
use crate::input::modes::InputMode;
use crate::ui::components::form::FieldType;
use crate::ui::components::{CredentialForm, HelpScreen};
use crate::ui::renderer::View;

use super::App;

impl App {
    /// Route one key press. Returns true when the app should exit.
    pub fn handle_key_event(&mut self, key: KeyEvent) -> Result<bool, Box<dyn std::error::Error>> {
        if key.kind != KeyEventKind::Press {
            return Ok(false);
        }

        if self.view == View::Form && self.credential_form.is_some() {
            self.handle_form_key(key);
            return Ok(false);
        }

        let action = self.resolve_action(key);
        self.execute_action(action)
    }

    fn resolve_action(&mut self, key: KeyEvent) -> Action {
        match self.mode_state.mode {
            InputMode::Normal => self.resolve_normal_action(key),
            InputMode::Command | InputMode::Search | InputMode::Rename => {
                let action = text_input_action(key);
                self.handle_text_input(action)
            }
            InputMode::Confirm => confirm_action(key),
            InputMode::Help => {
                self.handle_help_key(key);
                Action::None
            }
        }
    }

    fn resolve_normal_action(&mut self, key: KeyEvent) -> Action {
        let (action, pending) = normal_mode_action(key, self.mode_state.pending);
        self.mode_state.pending = pending;
        action
    }

    fn handle_text_input(&mut self, action: Action) -> Action {
        match action {
            Action::Line(edit) => self.mode_state.apply(edit),
            Action::Submit => return self.submit_text_input(),
            Action::Cancel => self.mode_state.to_normal(),
            _ => return action,
        }
        Action::None
    }

    fn submit_text_input(&mut self) -> Action {
        let buffer = self.mode_state.get_buffer().to_string();
        let result = match self.mode_state.mode {
            InputMode::Command => Action::ExecuteCommand(buffer),
            InputMode::Search => Action::Search(buffer),
            InputMode::Rename => Action::Rename(buffer),
            _ => Action::None,
        };
        self.mode_state.to_normal();
        result
    }

    fn handle_form_key(&mut self, key: KeyEvent) {
        match (key.code, key.modifiers) {
            (KeyCode::Esc, _) => {
                if let Some(form) = self.credential_form.take() {
                    self.view = form.previous_view;
                }
            }
            (KeyCode::Enter, KeyModifiers::NONE) => self.save_credential_form(),
            _ => {
                if let Some(form) = self.credential_form.as_mut() {
                    dispatch_form_key(form, key);
                }
            }
        }
    }

    /// Help reuses the list motions for scrolling; q, ? and Esc close it
    fn handle_help_key(&mut self, key: KeyEvent) {
        let (action, pending) = normal_mode_action(key, self.mode_state.pending);
        self.mode_state.pending = pending;

        let max = HelpScreen::max_scroll(self.terminal_size);
        let page = usize::from(self.terminal_size.height).saturating_sub(4).max(1);
        let half = (page / 2) as isize;
        let page = page as isize;
        let delta = match action {
            Action::Quit | Action::ShowHelp | Action::Back => {
                self.mode_state.to_normal();
                return;
            }
            Action::Move(Motion::Up) => -1,
            Action::Move(Motion::Down) => 1,
            Action::Move(Motion::Top) => isize::MIN,
            Action::Move(Motion::Bottom) => isize::MAX,
            Action::Move(Motion::HalfPageUp) => -half,
            Action::Move(Motion::HalfPageDown) => half,
            Action::Move(Motion::PageUp) => -page,
            Action::Move(Motion::PageDown) => page,
            _ => return,
        };
        self.help_state.scroll_by(delta, max);
    }
}

fn dispatch_form_key(form: &mut CredentialForm, key: KeyEvent) {
    let on_select = form.active_field().field_type == FieldType::Select;
    match (key.code, key.modifiers) {
        (KeyCode::Tab | KeyCode::Down, _) => form.next_field(),
        (KeyCode::BackTab | KeyCode::Up, _) => form.prev_field(),
        (KeyCode::Char('s'), KeyModifiers::CONTROL) => form.toggle_password_visibility(),
        (KeyCode::Char(' ') | KeyCode::Left | KeyCode::Right, _) if on_select => form.cycle_auth(),
        _ => {
            if let Action::Line(edit) = text_input_action(key) {
                form.apply(edit);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::KeyEventState;

    use super::super::test_support::{ctrl, key, names, press, Fixture};
    use super::*;
    use crate::store::AuthType;

    #[test]
    fn test_add_credential_through_form() {
        let fx = Fixture::new();
        let mut app = fx.app(vec![]);

        press(&mut app, "n");
        assert_eq!(app.view, View::Form);

        // Name, Host, keep port 22, Username, Auth stays key
        press(&mut app, "Web-01");
        app.handle_key_event(key(KeyCode::Tab)).unwrap();
        press(&mut app, "10.0.0.1");
        app.handle_key_event(key(KeyCode::Tab)).unwrap();
        app.handle_key_event(key(KeyCode::Tab)).unwrap();
        press(&mut app, "deploy");
        app.handle_key_event(key(KeyCode::Tab)).unwrap();
        app.handle_key_event(key(KeyCode::Tab)).unwrap();

        // Replace the default key path with the fixture key
        let form = app.credential_form.as_mut().unwrap();
        form.fields[6].value.clear();
        form.cursor = 0;
        press(&mut app, &fx.key_path());
        app.handle_key_event(key(KeyCode::Enter)).unwrap();

        assert_eq!(app.view, View::List);
        assert!(app.credential_form.is_none());
        assert_eq!(names(&app), vec!["web-01"]);
        let stored = fx.reopen();
        let cred = stored.get("web-01").unwrap();
        assert_eq!(cred.port, 22);
        assert_eq!(cred.username, "deploy");
        assert_eq!(cred.auth_type, AuthType::KeyFile);
    }

    #[test]
    fn test_form_space_cycles_auth_and_esc_cancels() {
        let fx = Fixture::new();
        let mut app = fx.app(vec![fx.key_cred("web", "10.0.0.1")]);
        press(&mut app, "l");
        assert_eq!(app.view, View::Detail);

        press(&mut app, "e");
        for _ in 0..4 {
            app.handle_key_event(key(KeyCode::Tab)).unwrap();
        }
        press(&mut app, " ");
        assert_eq!(app.credential_form.as_ref().unwrap().auth_type, AuthType::Password);

        app.handle_key_event(key(KeyCode::Esc)).unwrap();
        assert!(app.credential_form.is_none());
        assert_eq!(app.view, View::Detail);
        assert_eq!(fx.reopen().get("web").unwrap().auth_type, AuthType::KeyFile);
    }

    #[test]
    fn test_dd_deletes_after_confirm() {
        let fx = Fixture::new();
        let mut app = fx.app(vec![fx.key_cred("web", "10.0.0.1"), fx.key_cred("db", "10.0.0.2")]);

        press(&mut app, "jdd");
        assert_eq!(app.mode_state.mode, InputMode::Confirm);
        assert_eq!(app.pending_action.as_ref().unwrap().confirm_message(), "Delete credential 'db'?");

        press(&mut app, "y");
        assert_eq!(names(&app), vec!["web"]);
        assert_eq!(app.mode_state.mode, InputMode::Normal);
    }

    #[test]
    fn test_rename_mode() {
        let fx = Fixture::new();
        let mut app = fx.app(vec![fx.key_cred("web", "10.0.0.1")]);

        press(&mut app, "r");
        assert_eq!(app.mode_state.mode, InputMode::Rename);
        assert_eq!(app.mode_state.get_buffer(), "web");

        app.handle_key_event(ctrl('u')).unwrap();
        press(&mut app, "edge");
        app.handle_key_event(key(KeyCode::Enter)).unwrap();

        assert_eq!(app.mode_state.mode, InputMode::Normal);
        assert_eq!(names(&app), vec!["edge"]);
        assert!(fx.reopen().get("edge").is_ok());
    }

    #[test]
    fn test_search_mode_and_escape() {
        let fx = Fixture::new();
        let mut app = fx.app(vec![fx.key_cred("web-01", "10.0.0.1"), fx.key_cred("db", "10.0.0.2")]);

        press(&mut app, "/web");
        assert_eq!(app.mode_state.mode, InputMode::Search);
        app.handle_key_event(key(KeyCode::Enter)).unwrap();
        assert_eq!(names(&app), vec!["web-01"]);

        app.handle_key_event(key(KeyCode::Esc)).unwrap();
        assert_eq!(names(&app), vec!["web-01", "db"]);
    }

    #[test]
    fn test_command_mode_quit() {
        let fx = Fixture::new();
        let mut app = fx.app(vec![]);

        press(&mut app, ":q");
        assert!(app.handle_key_event(key(KeyCode::Enter)).unwrap());
        assert!(app.should_quit);
    }

    #[test]
    fn test_q_quits_and_release_ignored() {
        let fx = Fixture::new();
        let mut app = fx.app(vec![]);

        let release = KeyEvent {
            code: KeyCode::Char('q'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        assert!(!app.handle_key_event(release).unwrap());
        assert!(app.handle_key_event(key(KeyCode::Char('q'))).unwrap());
    }

    #[test]
    fn test_toggle_password_visibility() {
        let fx = Fixture::new();
        let mut app = fx.app(vec![crate::store::Credential::with_password("db", "10.0.0.2", 22, "root", "pw")]);

        press(&mut app, "s");
        assert!(app.password_visible);
        assert!(app.selected_detail.as_ref().unwrap().secret_visible);
    }

    #[test]
    fn test_help_opens_scrolls_and_closes() {
        let fx = Fixture::new();
        let mut app = fx.app(vec![]);
        app.terminal_size = ratatui::layout::Rect::new(0, 0, 80, 20);

        press(&mut app, "?");
        assert_eq!(app.mode_state.mode, InputMode::Help);
        press(&mut app, "jj");
        assert_eq!(app.help_state.scroll, 2);
        press(&mut app, "gg");
        assert_eq!(app.help_state.scroll, 0);
        press(&mut app, "q");
        assert_eq!(app.mode_state.mode, InputMode::Normal);
        assert!(!app.should_quit);
    }

    #[test]
    fn test_connect_queues_pending_launch() {
        let fx = Fixture::new();
        let mut app = fx.app(vec![fx.key_cred("web", "10.0.0.1")]);
        // Any executable stands in for ssh; only the PATH check runs here.
        app.config.ssh.ssh_binary = "/bin/sh".to_string();

        press(&mut app, "c");
        let pending = app.take_pending_connect().unwrap();
        assert_eq!(pending.name, "web");
        assert_eq!(pending.command.program(), "/bin/sh");
        assert!(pending.command.args().contains(&"deploy@10.0.0.1".to_string()));
    }
}
