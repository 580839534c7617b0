//! UI Components
//!
//! Reusable TUI widgets for the credential menu.

pub mod detail;
pub mod form;
pub mod help;
pub mod list;
pub mod popup;
pub mod statusline;

// Re-exports
pub use detail::{CredentialDetail, DetailView};
pub use form::{CredentialForm, CredentialFormWidget};
pub use help::{HelpScreen, HelpState};
pub use list::{CredentialItem, CredentialList, EmptyState, ListViewState};
pub use popup::ConfirmDialog;
pub use statusline::{HelpBar, MessageType, StatusLine};
