use crate::ssh::{default_key_path, LaunchError, SshCommand};
use crate::store::credential::normalize_name;
use crate::store::{AuthType, Credential, CredentialStore, StoreError};
use crate::ui::components::{CredentialDetail, CredentialForm, CredentialItem, MessageType};
use crate::ui::renderer::View;

use super::{App, PendingConnect};

impl App {
    /// Reload the store from disk, picking up edits made by other processes
    pub fn refresh_data(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        match CredentialStore::open(self.config.store_config()) {
            Ok(store) => {
                self.store = store;
                self.rebuild_list();
                let count = self.store.count();
                self.set_message(&format!("Loaded {count} credential(s)"), MessageType::Info);
            }
            Err(e) => {
                tracing::warn!(error = %e, "reload failed");
                self.set_message(&format!("Reload failed: {e}"), MessageType::Error);
            }
        }
        Ok(())
    }

    /// Rebuild the visible rows from the store and the active search
    pub fn rebuild_list(&mut self) {
        self.credentials = match &self.filter {
            Some(query) => self.store.find_by_name_substring(query).into_iter().cloned().collect(),
            None => self.store.list().to_vec(),
        };
        self.credential_items = self.credentials.iter().map(CredentialItem::from).collect();
        self.list_state.set_total(self.credential_items.len());
        self.update_selected_detail();
    }

    pub fn search_credentials(&mut self, query: &str) {
        let query = query.trim();
        self.filter = (!query.is_empty()).then(|| query.to_string());
        self.rebuild_list();

        if self.filter.is_some() {
            let count = self.credentials.len();
            self.set_message(&format!("{count} match(es) for '{query}'"), MessageType::Info);
        }
    }

    pub fn selected_credential(&self) -> Option<&Credential> {
        self.credentials.get(self.list_state.selected()?)
    }

    pub fn update_selected_detail(&mut self) {
        self.selected_detail = self.selected_credential().map(|cred| {
            let command = SshCommand::for_credential(cred, &self.config.ssh).display();
            CredentialDetail::new(cred, command, self.password_visible)
        });
    }

    /// Move the cursor onto the row named `name`, if it is visible
    fn select_by_name(&mut self, name: &str) {
        let key = normalize_name(name);
        if let Some(idx) = self.credentials.iter().position(|c| c.name == key) {
            self.list_state.select(Some(idx));
            self.update_selected_detail();
        }
    }

    pub fn new_credential(&mut self) {
        let mut form = CredentialForm::new(default_key_path().display().to_string());
        form.previous_view = self.view;
        self.credential_form = Some(form);
        self.view = View::Form;
    }

    pub fn edit_credential(&mut self) {
        let Some(cred) = self.selected_credential() else {
            self.set_message("No credential selected", MessageType::Warning);
            return;
        };
        let form = CredentialForm::for_edit(cred, default_key_path().display().to_string(), self.view);
        self.credential_form = Some(form);
        self.view = View::Form;
    }

    /// Submit the open form. Failures leave the form open with the reason in
    /// the status line.
    pub fn save_credential_form(&mut self) {
        let Some(form) = self.credential_form.as_ref() else { return };
        let built = form.to_credential();
        let editing = form.editing_name.clone();
        let return_to = form.previous_view;

        let cred = match built {
            Ok(cred) => cred,
            Err(msg) => {
                self.set_message(&msg, MessageType::Error);
                return;
            }
        };
        let name = normalize_name(&cred.name);

        let result = match &editing {
            Some(current) => self.store.update(current, cred),
            None if self.store.exists(&name, &[]) => Err(StoreError::Conflict(name.clone())),
            None => self.store.save(cred),
        };

        match result {
            Ok(()) => {
                tracing::info!(name = %name, "saved credential from form");
                self.credential_form = None;
                self.view = return_to;
                self.rebuild_list();
                self.select_by_name(&name);
                let verb = if editing.is_some() { "updated" } else { "created" };
                self.set_message(&format!("Credential '{name}' {verb}"), MessageType::Success);
            }
            Err(e) => self.set_message(&e.to_string(), MessageType::Error),
        }
    }

    pub fn delete_credential(&mut self, name: &str) {
        match self.store.delete(name) {
            Ok(removed) => {
                self.rebuild_list();
                if self.credentials.is_empty() {
                    self.view = View::List;
                }
                self.set_message(&format!("Credential '{}' deleted", removed.name), MessageType::Success);
            }
            Err(e) => self.set_message(&e.to_string(), MessageType::Error),
        }
    }

    pub fn rename_selected(&mut self, new_name: &str) {
        let Some(old) = self.selected_credential().map(|c| c.name.clone()) else {
            self.set_message("No credential selected", MessageType::Warning);
            return;
        };

        match self.store.rename(&old, new_name) {
            Ok(()) => {
                let new = normalize_name(new_name);
                self.rebuild_list();
                self.select_by_name(&new);
                self.set_message(&format!("Renamed '{old}' to '{new}'"), MessageType::Success);
            }
            Err(e) => self.set_message(&e.to_string(), MessageType::Error),
        }
    }

    pub fn copy_password(&mut self) {
        let Some(cred) = self.selected_credential() else { return };
        let name = cred.name.clone();

        let password = match (cred.auth_type, cred.password.clone()) {
            (AuthType::Password, Some(password)) => zeroize::Zeroizing::new(password),
            _ => {
                self.set_message(&format!("'{name}' uses key authentication"), MessageType::Warning);
                return;
            }
        };

        self.copy_text(&password, "Password");
    }

    pub fn copy_command(&mut self) {
        let Some(cred) = self.selected_credential() else { return };
        let command = SshCommand::for_credential(cred, &self.config.ssh).display();
        self.copy_text(&command, "Command");
    }

    fn copy_text(&mut self, text: &str, what: &str) {
        let timeout = self.config.clipboard_timeout;
        match super::clipboard::copy_with_timeout(text, timeout) {
            Ok(()) => self.set_message(&format!("{what} copied ({}s)", timeout.as_secs()), MessageType::Success),
            Err(e) => {
                tracing::warn!(error = %e, "clipboard copy failed");
                self.set_message(&e.to_string(), MessageType::Error);
            }
        }
    }

    /// Queue a connection for the selected credential. The runner suspends
    /// the terminal before launching it.
    pub fn request_connect(&mut self) {
        let Some(cred) = self.selected_credential() else {
            self.set_message("No credential selected", MessageType::Warning);
            return;
        };
        let name = cred.name.clone();
        let command = SshCommand::for_credential(cred, &self.config.ssh);

        if let Err(e) = command.check_binaries() {
            self.set_message(&e.to_string(), MessageType::Error);
            return;
        }
        self.pending_connect = Some(PendingConnect { name, command });
    }

    pub fn finish_connect(&mut self, name: &str, result: Result<(), LaunchError>) {
        match result {
            Ok(()) => self.set_message(&format!("Session with '{name}' closed"), MessageType::Info),
            Err(e) => self.set_message(&e.to_string(), MessageType::Error),
        }
    }
}
