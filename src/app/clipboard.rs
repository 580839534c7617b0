//! Clipboard copies that clear themselves.
//!
//! Each copy runs on its own thread which reports whether the text landed,
//! then waits out the timeout and clears the clipboard unless a newer copy
//! has replaced it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Sender};
use std::thread;
use std::time::Duration;

use thiserror::Error;
use zeroize::Zeroizing;

static CLIPBOARD_COPY_ID: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("clipboard unavailable: {0}")]
    Unavailable(String),

    #[error("clipboard write failed: {0}")]
    Write(String),
}

/// Clipboard mechanism for the current session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Backend {
    #[cfg(target_os = "linux")]
    WlCopy,
    #[cfg(target_os = "linux")]
    Xclip,
    Arboard,
}

impl Backend {
    #[cfg(target_os = "linux")]
    fn detect() -> Self {
        let wayland = std::env::var_os("WAYLAND_DISPLAY").is_some();
        if wayland && crate::ssh::find_in_path("wl-copy").is_some() {
            Self::WlCopy
        } else if crate::ssh::find_in_path("xclip").is_some() {
            Self::Xclip
        } else {
            Self::Arboard
        }
    }

    #[cfg(not(target_os = "linux"))]
    fn detect() -> Self {
        Self::Arboard
    }
}

/// Put `text` on the clipboard and clear it after `timeout`
pub fn copy_with_timeout(text: &str, timeout: Duration) -> Result<(), ClipboardError> {
    let copy_id = next_copy_id();
    let text = Zeroizing::new(text.to_string());
    let backend = Backend::detect();
    let (tx, rx) = mpsc::channel();

    tracing::debug!(?backend, "copying to clipboard");
    thread::spawn(move || match backend {
        #[cfg(target_os = "linux")]
        Backend::WlCopy | Backend::Xclip => tool_thread(backend, &text, timeout, copy_id, tx),
        Backend::Arboard => arboard_thread(&text, timeout, copy_id, tx),
    });

    rx.recv()
        .unwrap_or_else(|_| Err(ClipboardError::Write("clipboard thread exited".to_string())))
}

fn next_copy_id() -> u64 {
    CLIPBOARD_COPY_ID.fetch_add(1, Ordering::SeqCst) + 1
}

fn is_latest(copy_id: u64) -> bool {
    CLIPBOARD_COPY_ID.load(Ordering::SeqCst) == copy_id
}

fn arboard_thread(text: &str, timeout: Duration, copy_id: u64, tx: Sender<Result<(), ClipboardError>>) {
    // The clipboard handle must outlive the copy on X11, so it stays on this thread.
    let mut clipboard = match arboard::Clipboard::new() {
        Ok(clipboard) => clipboard,
        Err(e) => {
            let _ = tx.send(Err(ClipboardError::Unavailable(e.to_string())));
            return;
        }
    };

    if let Err(e) = clipboard.set_text(text) {
        let _ = tx.send(Err(ClipboardError::Write(e.to_string())));
        return;
    }
    let _ = tx.send(Ok(()));

    thread::sleep(timeout);
    if is_latest(copy_id) {
        let _ = clipboard.clear();
    }
}

#[cfg(target_os = "linux")]
fn tool_thread(backend: Backend, text: &str, timeout: Duration, copy_id: u64, tx: Sender<Result<(), ClipboardError>>) {
    let (program, args): (&str, &[&str]) = match backend {
        Backend::WlCopy => ("wl-copy", &[]),
        _ => ("xclip", &["-selection", "clipboard"]),
    };

    let result = pipe_to(program, args, text);
    let copied = result.is_ok();
    let _ = tx.send(result);
    if !copied {
        return;
    }

    thread::sleep(timeout);
    if !is_latest(copy_id) {
        return;
    }
    match backend {
        Backend::WlCopy => {
            let _ = std::process::Command::new("wl-copy").arg("--clear").output();
        }
        _ => {
            let _ = pipe_to("xclip", &["-selection", "clipboard"], "");
        }
    }
}

#[cfg(target_os = "linux")]
fn pipe_to(program: &str, args: &[&str], text: &str) -> Result<(), ClipboardError> {
    use std::io::Write;
    use std::process::{Command, Stdio};

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| ClipboardError::Unavailable(format!("{program}: {e}")))?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin
            .write_all(text.as_bytes())
            .map_err(|e| ClipboardError::Write(format!("{program}: {e}")))?;
    }

    let status = child.wait().map_err(|e| ClipboardError::Write(format!("{program}: {e}")))?;
    if !status.success() {
        return Err(ClipboardError::Write(format!("{program} exited with {status}")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newer_copy_supersedes_older() {
        let first = next_copy_id();
        assert!(is_latest(first));

        let second = next_copy_id();
        assert!(second > first);
        assert!(!is_latest(first));
        assert!(is_latest(second));
    }
}
