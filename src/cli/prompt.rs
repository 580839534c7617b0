//! Line prompts for the interactive commands.
//!
//! Reads from any `BufRead` and writes to any `Write`, so the command
//! handlers run the same against a terminal or an in-memory buffer.

use std::io::{self, BufRead, IsTerminal, Stdin, StdinLock, Stdout, Write};

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::{cursor, execute, terminal};
use zeroize::Zeroizing;

pub struct Prompter<R, W> {
    input: R,
    output: W,
    interactive: bool,
}

impl Prompter<StdinLock<'static>, Stdout> {
    /// Prompter bound to the process's stdin/stdout
    pub fn stdio() -> Self {
        let stdin: Stdin = io::stdin();
        let interactive = stdin.is_terminal();
        let mut prompter = Self::new(stdin.lock(), io::stdout());
        prompter.interactive = interactive;
        prompter
    }
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            interactive: false,
        }
    }

    /// Whether input comes from a terminal
    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    pub fn out(&mut self) -> &mut W {
        &mut self.output
    }

    /// Print `prompt: ` and read one trimmed line
    pub fn line(&mut self, prompt: &str) -> io::Result<String> {
        write!(self.output, "{prompt}: ")?;
        self.output.flush()?;
        self.read_line()
    }

    /// Like `line`, but a blank answer yields `default`
    pub fn with_default(&mut self, prompt: &str, default: &str) -> io::Result<String> {
        write!(self.output, "{prompt} [{default}]: ")?;
        self.output.flush()?;
        let answer = self.read_line()?;
        Ok(if answer.is_empty() { default.to_string() } else { answer })
    }

    /// `(y/n)` question; only `y`/`yes` count as yes
    pub fn confirm(&mut self, prompt: &str) -> io::Result<bool> {
        let answer = self.line(&format!("{prompt} (y/n)"))?;
        Ok(matches!(answer.to_lowercase().as_str(), "y" | "yes"))
    }

    /// Read a secret without echo when attached to a terminal
    pub fn password(&mut self, prompt: &str) -> io::Result<Zeroizing<String>> {
        write!(self.output, "{prompt}: ")?;
        self.output.flush()?;

        if !self.interactive {
            return self.read_line().map(Zeroizing::new);
        }

        terminal::enable_raw_mode()?;
        let secret = read_hidden();
        terminal::disable_raw_mode()?;
        writeln!(self.output)?;
        secret
    }

    /// Wait for Enter
    pub fn pause(&mut self) -> io::Result<()> {
        write!(self.output, "\nPress Enter to continue...")?;
        self.output.flush()?;
        self.read_line().map(|_| ())
    }

    pub fn clear_screen(&mut self) -> io::Result<()> {
        if self.interactive {
            execute!(
                self.output,
                terminal::Clear(terminal::ClearType::All),
                cursor::MoveTo(0, 0)
            )?;
        }
        Ok(())
    }

    fn read_line(&mut self) -> io::Result<String> {
        let mut buf = String::new();
        if self.input.read_line(&mut buf)? == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "input closed"));
        }
        Ok(buf.trim().to_string())
    }
}

fn read_hidden() -> io::Result<Zeroizing<String>> {
    let mut secret = Zeroizing::new(String::new());
    loop {
        let Event::Key(key) = event::read()? else { continue };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        match key.code {
            KeyCode::Enter => return Ok(secret),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return Err(io::Error::new(io::ErrorKind::Interrupted, "cancelled"));
            }
            KeyCode::Backspace => {
                secret.pop();
            }
            KeyCode::Char(c) => secret.push(c),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn prompter(input: &str) -> Prompter<Cursor<Vec<u8>>, Vec<u8>> {
        Prompter::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn test_line_trims() {
        let mut p = prompter("  hello  \n");
        assert_eq!(p.line("Name").unwrap(), "hello");
        assert_eq!(String::from_utf8_lossy(p.out()), "Name: ");
    }

    #[test]
    fn test_with_default() {
        let mut p = prompter("\nnew\n");
        assert_eq!(p.with_default("Host", "old").unwrap(), "old");
        assert_eq!(p.with_default("Host", "old").unwrap(), "new");
    }

    #[test]
    fn test_confirm() {
        let mut p = prompter("y\nYES\nn\nmaybe\n");
        assert!(p.confirm("Sure?").unwrap());
        assert!(p.confirm("Sure?").unwrap());
        assert!(!p.confirm("Sure?").unwrap());
        assert!(!p.confirm("Sure?").unwrap());
    }

    #[test]
    fn test_eof_is_error() {
        let mut p = prompter("");
        let err = p.line("Name").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_password_reads_line_when_piped() {
        let mut p = prompter("s3cret\n");
        assert_eq!(p.password("Password").unwrap().as_str(), "s3cret");
    }
}
