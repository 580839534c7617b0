//! Keymap
//!
//! Vim-style bindings. Normal mode resolves two-key chords (gg, dd, yy)
//! first, then control keys, then single keys.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::modes::LineEdit;

/// Cursor movement over a list or a scrollable page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    Up,
    Down,
    Top,
    Bottom,
    PageUp,
    PageDown,
    HalfPageUp,
    HalfPageDown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Move(Motion),
    Select,
    Back,

    New,
    Edit,
    Delete,
    StartRename,
    Rename(String),
    Connect,

    CopyPassword,
    CopyCommand,
    TogglePasswordVisibility,

    EnterCommand,
    EnterSearch,
    ShowHelp,
    ExecuteCommand(String),
    Search(String),

    Confirm,
    Cancel,

    Quit,
    ForceQuit,
    Refresh,
    Invalid(String),

    /// Prompt-line editing
    Line(LineEdit),
    Submit,

    None,
}

/// Keys that start a chord
const CHORD_LEADERS: [char; 3] = ['g', 'd', 'y'];

fn chord(first: char, second: char) -> Option<Action> {
    match (first, second) {
        ('g', 'g') => Some(Action::Move(Motion::Top)),
        ('d', 'd') => Some(Action::Delete),
        ('y', 'y') => Some(Action::CopyPassword),
        _ => None,
    }
}

fn control_action(code: KeyCode) -> Action {
    match code {
        KeyCode::Char('d') => Action::Move(Motion::HalfPageDown),
        KeyCode::Char('u') => Action::Move(Motion::HalfPageUp),
        KeyCode::Char('r') => Action::Refresh,
        _ => Action::None,
    }
}

fn single_key_action(code: KeyCode) -> Action {
    match code {
        KeyCode::Char('j') | KeyCode::Down => Action::Move(Motion::Down),
        KeyCode::Char('k') | KeyCode::Up => Action::Move(Motion::Up),
        KeyCode::Char('G') | KeyCode::End => Action::Move(Motion::Bottom),
        KeyCode::Home => Action::Move(Motion::Top),
        KeyCode::PageDown => Action::Move(Motion::PageDown),
        KeyCode::PageUp => Action::Move(Motion::PageUp),

        KeyCode::Enter | KeyCode::Char('l') | KeyCode::Right => Action::Select,
        KeyCode::Esc | KeyCode::Char('h') | KeyCode::Left => Action::Back,

        KeyCode::Char('n' | 'a') => Action::New,
        KeyCode::Char('e') => Action::Edit,
        KeyCode::Char('r') => Action::StartRename,
        KeyCode::Char('x') => Action::Delete,
        KeyCode::Char('c') => Action::Connect,
        KeyCode::Char('Y') => Action::CopyCommand,
        KeyCode::Char('s') => Action::TogglePasswordVisibility,

        KeyCode::Char(':') => Action::EnterCommand,
        KeyCode::Char('/') => Action::EnterSearch,
        KeyCode::Char('?') => Action::ShowHelp,
        KeyCode::Char('q') => Action::Quit,
        KeyCode::Char('Q') => Action::ForceQuit,
        _ => Action::None,
    }
}

/// Resolve a normal-mode key given the pending chord leader. Returns the
/// action and the leader to keep for the next key.
pub fn normal_mode_action(key: KeyEvent, pending: Option<char>) -> (Action, Option<char>) {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return (control_action(key.code), None);
    }

    if let KeyCode::Char(c) = key.code {
        if let Some(action) = pending.and_then(|first| chord(first, c)) {
            return (action, None);
        }
        if CHORD_LEADERS.contains(&c) {
            return (Action::None, Some(c));
        }
    }

    (single_key_action(key.code), None)
}

/// Keys in the `:`, `/` and rename prompts
pub fn text_input_action(key: KeyEvent) -> Action {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let edit = match key.code {
        KeyCode::Esc => return Action::Cancel,
        KeyCode::Enter => return Action::Submit,
        KeyCode::Char('a') if ctrl => LineEdit::Home,
        KeyCode::Char('e') if ctrl => LineEdit::End,
        KeyCode::Char('u') if ctrl => LineEdit::Clear,
        KeyCode::Char(_) if ctrl => return Action::None,
        KeyCode::Char(c) => LineEdit::Insert(c),
        KeyCode::Backspace => LineEdit::Backspace,
        KeyCode::Delete => LineEdit::Delete,
        KeyCode::Left => LineEdit::Left,
        KeyCode::Right => LineEdit::Right,
        KeyCode::Home => LineEdit::Home,
        KeyCode::End => LineEdit::End,
        _ => return Action::None,
    };
    Action::Line(edit)
}

pub fn confirm_action(key: KeyEvent) -> Action {
    match key.code {
        KeyCode::Char('y' | 'Y') | KeyCode::Enter => Action::Confirm,
        KeyCode::Char('n' | 'N') | KeyCode::Esc => Action::Cancel,
        _ => Action::None,
    }
}

/// Parse a `:` command line. `rename` takes the new name as its argument
/// and opens the rename prompt without one.
pub fn parse_command(line: &str) -> Action {
    let line = line.trim();
    let (command, arg) = line
        .split_once(char::is_whitespace)
        .map_or((line, ""), |(c, a)| (c, a.trim()));

    match (command, arg.is_empty()) {
        ("", _) => Action::None,
        ("q" | "quit", true) => Action::Quit,
        ("q!" | "quit!", true) => Action::ForceQuit,
        ("new" | "n" | "add", true) => Action::New,
        ("edit" | "e", true) => Action::Edit,
        ("rename" | "mv", true) => Action::StartRename,
        ("rename" | "mv", false) => Action::Rename(arg.to_string()),
        ("delete" | "del", true) => Action::Delete,
        ("connect" | "c", true) => Action::Connect,
        ("help" | "h", true) => Action::ShowHelp,
        ("refresh", true) => Action::Refresh,
        _ => Action::Invalid(line.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn normal(code: KeyCode) -> Action {
        normal_mode_action(key(code), None).0
    }

    #[test]
    fn test_motions() {
        assert_eq!(normal(KeyCode::Char('j')), Action::Move(Motion::Down));
        assert_eq!(normal(KeyCode::Up), Action::Move(Motion::Up));
        assert_eq!(normal(KeyCode::Char('G')), Action::Move(Motion::Bottom));
        assert_eq!(normal(KeyCode::PageDown), Action::Move(Motion::PageDown));
        assert_eq!(normal_mode_action(ctrl('d'), None).0, Action::Move(Motion::HalfPageDown));
        assert_eq!(normal_mode_action(ctrl('u'), Some('g')), (Action::Move(Motion::HalfPageUp), None));
    }

    #[test]
    fn test_chords() {
        for (leader, expected) in [
            ('g', Action::Move(Motion::Top)),
            ('d', Action::Delete),
            ('y', Action::CopyPassword),
        ] {
            let (first, pending) = normal_mode_action(key(KeyCode::Char(leader)), None);
            assert_eq!(first, Action::None);
            assert_eq!(pending, Some(leader));

            assert_eq!(normal_mode_action(key(KeyCode::Char(leader)), pending), (expected, None));
        }
    }

    #[test]
    fn test_broken_chord_falls_through() {
        // "dy" starts a fresh y chord rather than deleting
        assert_eq!(normal_mode_action(key(KeyCode::Char('y')), Some('d')), (Action::None, Some('y')));
        // "gj" just moves
        assert_eq!(normal_mode_action(key(KeyCode::Char('j')), Some('g')), (Action::Move(Motion::Down), None));
    }

    #[test]
    fn test_credential_bindings() {
        assert_eq!(normal(KeyCode::Char('c')), Action::Connect);
        assert_eq!(normal(KeyCode::Char('Y')), Action::CopyCommand);
        assert_eq!(normal(KeyCode::Char('r')), Action::StartRename);
        assert_eq!(normal(KeyCode::Char('a')), Action::New);
        assert_eq!(normal(KeyCode::Char('x')), Action::Delete);
        assert_eq!(normal_mode_action(ctrl('r'), None).0, Action::Refresh);
    }

    #[test]
    fn test_text_input() {
        assert_eq!(text_input_action(key(KeyCode::Char('a'))), Action::Line(LineEdit::Insert('a')));
        assert_eq!(
            text_input_action(KeyEvent::new(KeyCode::Char('A'), KeyModifiers::SHIFT)),
            Action::Line(LineEdit::Insert('A'))
        );
        assert_eq!(text_input_action(key(KeyCode::Backspace)), Action::Line(LineEdit::Backspace));
        assert_eq!(text_input_action(key(KeyCode::Enter)), Action::Submit);
        assert_eq!(text_input_action(key(KeyCode::Esc)), Action::Cancel);
    }

    #[test]
    fn test_text_input_control_keys() {
        assert_eq!(text_input_action(ctrl('a')), Action::Line(LineEdit::Home));
        assert_eq!(text_input_action(ctrl('e')), Action::Line(LineEdit::End));
        assert_eq!(text_input_action(ctrl('u')), Action::Line(LineEdit::Clear));
        assert_eq!(text_input_action(ctrl('z')), Action::None);
    }

    #[test]
    fn test_parse_command() {
        assert_eq!(parse_command("q"), Action::Quit);
        assert_eq!(parse_command("quit"), Action::Quit);
        assert_eq!(parse_command("q!"), Action::ForceQuit);
        assert_eq!(parse_command("add"), Action::New);
        assert_eq!(parse_command(" connect "), Action::Connect);
        assert_eq!(parse_command("rename"), Action::StartRename);
        assert_eq!(parse_command("rename  web-01 "), Action::Rename("web-01".to_string()));
        assert_eq!(parse_command(""), Action::None);
        assert_eq!(parse_command("bogus"), Action::Invalid("bogus".to_string()));
        assert_eq!(parse_command("quit now"), Action::Invalid("quit now".to_string()));
    }

    #[test]
    fn test_confirm_action() {
        assert_eq!(confirm_action(key(KeyCode::Char('y'))), Action::Confirm);
        assert_eq!(confirm_action(key(KeyCode::Char('N'))), Action::Cancel);
        assert_eq!(confirm_action(key(KeyCode::Enter)), Action::Confirm);
        assert_eq!(confirm_action(key(KeyCode::Esc)), Action::Cancel);
        assert_eq!(confirm_action(key(KeyCode::Char('q'))), Action::None);
    }
}
