//! Input Modes
//!
//! Which mode the menu is in, plus the one-line buffer the prompt modes
//! (`:`, `/`, rename) type into.

/// Input mode enum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    /// `:` command line
    Command,
    /// `/` name filter
    Search,
    /// New name for the selected credential
    Rename,
    /// Yes/no dialog
    Confirm,
    Help,
}

impl InputMode {
    /// Mode indicator for the status line
    pub fn indicator(&self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::Command => "COMMAND",
            Self::Search => "SEARCH",
            Self::Rename => "RENAME",
            Self::Confirm => "CONFIRM",
            Self::Help => "HELP",
        }
    }

    /// Prompt shown before the buffer in the status line
    pub fn prompt(&self) -> &'static str {
        match self {
            Self::Command => ":",
            Self::Search => "/",
            Self::Rename => "rename: ",
            _ => "",
        }
    }

    pub fn is_text_input(&self) -> bool {
        !self.prompt().is_empty()
    }
}

/// One editing operation on the prompt line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEdit {
    Insert(char),
    Backspace,
    Delete,
    Left,
    Right,
    Home,
    End,
    Clear,
}

/// Current mode with its prompt line. `cursor` counts characters.
#[derive(Debug, Clone)]
pub struct ModeState {
    pub mode: InputMode,
    buffer: String,
    pub cursor: usize,
    /// First key of a two-key chord (gg, dd, yy)
    pub pending: Option<char>,
}

impl Default for ModeState {
    fn default() -> Self {
        Self {
            mode: InputMode::Normal,
            buffer: String::new(),
            cursor: 0,
            pending: None,
        }
    }
}

impl ModeState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Switch mode, dropping the line and any half-typed chord
    pub fn enter(&mut self, mode: InputMode) {
        self.mode = mode;
        self.buffer.clear();
        self.cursor = 0;
        self.pending = None;
    }

    /// Switch mode with `text` already on the line, cursor at the end
    pub fn enter_with(&mut self, mode: InputMode, text: &str) {
        self.enter(mode);
        self.buffer.push_str(text);
        self.cursor = self.len();
    }

    pub fn to_normal(&mut self) {
        self.enter(InputMode::Normal);
    }

    pub fn get_buffer(&self) -> &str {
        &self.buffer
    }

    fn len(&self) -> usize {
        self.buffer.chars().count()
    }

    pub fn apply(&mut self, edit: LineEdit) {
        edit_line(&mut self.buffer, &mut self.cursor, edit);
    }
}

/// Apply `edit` to `text` at a character cursor. Shared by the prompt line
/// and the credential form fields.
pub fn edit_line(text: &mut String, cursor: &mut usize, edit: LineEdit) {
    let len = text.chars().count();
    let offset = |chars: usize| text.char_indices().nth(chars).map_or(text.len(), |(i, _)| i);

    match edit {
        LineEdit::Insert(c) => {
            let at = offset(*cursor);
            text.insert(at, c);
            *cursor += 1;
        }
        LineEdit::Backspace if *cursor > 0 => {
            *cursor -= 1;
            let at = offset(*cursor);
            text.remove(at);
        }
        LineEdit::Delete if *cursor < len => {
            let at = offset(*cursor);
            text.remove(at);
        }
        LineEdit::Left => *cursor = cursor.saturating_sub(1),
        LineEdit::Right => *cursor = (*cursor + 1).min(len),
        LineEdit::Home => *cursor = 0,
        LineEdit::End => *cursor = len,
        LineEdit::Clear => {
            text.clear();
            *cursor = 0;
        }
        LineEdit::Backspace | LineEdit::Delete => {}
    }
}
