use crate::input::keymap::{parse_command, Action, Motion};
use crate::input::InputMode;
use crate::ui::components::MessageType;
use crate::ui::renderer::View;

use super::config::PendingAction;
use super::App;

impl App {
    /// Apply one action. Returns true when the app should exit.
    pub fn execute_action(&mut self, action: Action) -> Result<bool, Box<dyn std::error::Error>> {
        match action {
            Action::Move(motion) => self.move_selection(motion),
            Action::ShowHelp => self.show_help(),

            Action::Select => self.select_credential(),
            Action::Back => self.go_back(),

            Action::New => self.new_credential(),
            Action::Edit => self.edit_credential(),
            Action::Delete => self.initiate_delete(),
            Action::StartRename => self.start_rename(),
            Action::Rename(name) => self.rename_selected(&name),

            Action::Connect => self.request_connect(),

            Action::CopyPassword => self.copy_password(),
            Action::CopyCommand => self.copy_command(),
            Action::TogglePasswordVisibility => self.toggle_password(),

            Action::EnterCommand => self.mode_state.enter(InputMode::Command),
            Action::EnterSearch => self.mode_state.enter(InputMode::Search),

            Action::ExecuteCommand(cmd) => return self.execute_action(parse_command(&cmd)),
            Action::Search(query) => self.search_credentials(&query),

            Action::Confirm => self.handle_confirm(),
            Action::Cancel => self.cancel_pending(),

            Action::Quit | Action::ForceQuit => return Ok(self.quit()),
            Action::Refresh => self.refresh_data()?,
            Action::Invalid(cmd) => self.set_message(&format!("Unknown command: {}", cmd), MessageType::Error),

            _ => {}
        }

        Ok(false)
    }

    fn move_selection(&mut self, motion: Motion) {
        let rows = self.list_visible_height();
        let list = &mut self.list_state;
        match motion {
            Motion::Up => list.move_up(),
            Motion::Down => list.move_down(),
            Motion::Top => list.move_to_top(),
            Motion::Bottom => list.move_to_bottom(),
            Motion::PageUp => list.page_up(rows.saturating_sub(1)),
            Motion::PageDown => list.page_down(rows.saturating_sub(1)),
            Motion::HalfPageUp => list.page_up(rows / 2),
            Motion::HalfPageDown => list.page_down(rows / 2),
        }
        self.update_selected_detail();
    }

    /// Rows available to the list: screen minus borders, status and help bars
    pub fn list_visible_height(&self) -> usize {
        (self.terminal_size.height as usize).saturating_sub(4)
    }

    fn show_help(&mut self) {
        self.help_state.home();
        self.mode_state.enter(InputMode::Help);
    }

    fn select_credential(&mut self) {
        if self.selected_credential().is_some() {
            self.view = View::Detail;
        }
    }

    fn go_back(&mut self) {
        if self.view == View::Detail {
            self.view = View::List;
        } else if self.filter.is_some() {
            self.search_credentials("");
        }
    }

    fn toggle_password(&mut self) {
        self.password_visible = !self.password_visible;
        self.update_selected_detail();
    }

    fn start_rename(&mut self) {
        match self.selected_credential().map(|c| c.name.clone()) {
            Some(name) => self.mode_state.enter_with(InputMode::Rename, &name),
            None => self.set_message("No credential selected", MessageType::Warning),
        }
    }

    fn initiate_delete(&mut self) {
        let Some(name) = self.selected_credential().map(|c| c.name.clone()) else { return };

        self.pending_action = Some(PendingAction::DeleteCredential(name));
        self.mode_state.enter(InputMode::Confirm);
    }

    fn cancel_pending(&mut self) {
        self.pending_action = None;
        self.mode_state.to_normal();
    }

    fn handle_confirm(&mut self) {
        let action = self.pending_action.take();
        self.mode_state.to_normal();

        if let Some(PendingAction::DeleteCredential(name)) = action {
            self.delete_credential(&name);
        }
    }

    fn quit(&mut self) -> bool {
        self.should_quit = true;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{names, Fixture};
    use super::*;

    #[test]
    fn test_select_and_back() {
        let fx = Fixture::new();
        let mut app = fx.app(vec![fx.key_cred("web", "10.0.0.1")]);

        app.execute_action(Action::Select).unwrap();
        assert_eq!(app.view, View::Detail);
        app.execute_action(Action::Back).unwrap();
        assert_eq!(app.view, View::List);
    }

    #[test]
    fn test_select_on_empty_list_stays() {
        let fx = Fixture::new();
        let mut app = fx.app(vec![]);
        app.execute_action(Action::Select).unwrap();
        assert_eq!(app.view, View::List);
    }

    #[test]
    fn test_back_clears_search() {
        let fx = Fixture::new();
        let mut app = fx.app(vec![fx.key_cred("web", "10.0.0.1"), fx.key_cred("db", "10.0.0.2")]);

        app.execute_action(Action::Search("db".into())).unwrap();
        assert_eq!(names(&app), vec!["db"]);
        app.execute_action(Action::Back).unwrap();
        assert_eq!(app.filter, None);
        assert_eq!(names(&app), vec!["web", "db"]);
    }

    #[test]
    fn test_delete_needs_confirmation() {
        let fx = Fixture::new();
        let mut app = fx.app(vec![fx.key_cred("web", "10.0.0.1"), fx.key_cred("db", "10.0.0.2")]);

        app.execute_action(Action::Delete).unwrap();
        assert_eq!(app.mode_state.mode, InputMode::Confirm);
        app.execute_action(Action::Cancel).unwrap();
        assert_eq!(app.mode_state.mode, InputMode::Normal);
        assert_eq!(fx.reopen().count(), 2);

        app.execute_action(Action::Delete).unwrap();
        app.execute_action(Action::Confirm).unwrap();
        assert_eq!(names(&app), vec!["db"]);
        assert_eq!(fx.reopen().count(), 1);
    }

    #[test]
    fn test_command_line_dispatch() {
        let fx = Fixture::new();
        let mut app = fx.app(vec![fx.key_cred("web", "10.0.0.1")]);

        assert!(!app.execute_action(Action::ExecuteCommand("rename edge".into())).unwrap());
        assert_eq!(names(&app), vec!["edge"]);

        app.execute_action(Action::ExecuteCommand("frobnicate".into())).unwrap();
        assert!(app.message.as_ref().unwrap().0.contains("Unknown command: frobnicate"));

        assert!(app.execute_action(Action::ExecuteCommand("q".into())).unwrap());
        assert!(app.should_quit);
    }

    #[test]
    fn test_paging_uses_terminal_height() {
        let fx = Fixture::new();
        let creds = (0..30).map(|i| fx.key_cred(&format!("host{i:02}"), "10.0.0.1")).collect();
        let mut app = fx.app(creds);
        app.terminal_size = ratatui::layout::Rect::new(0, 0, 80, 24);

        app.execute_action(Action::Move(Motion::HalfPageDown)).unwrap();
        assert_eq!(app.list_state.selected(), Some(10));
        app.execute_action(Action::Move(Motion::PageDown)).unwrap();
        assert_eq!(app.list_state.selected(), Some(29));
        assert_eq!(app.selected_detail.as_ref().unwrap().name, "host29");
    }
}
