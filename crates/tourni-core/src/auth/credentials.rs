use keyring::Entry;
use tracing::debug;

const SERVICE_NAME: &str = "tourni";

/// "Remember me" storage: passwords live in the OS keychain, never in the
/// session file.
pub struct CredentialStore;

impl CredentialStore {
    /// Store the password for `username` in the OS keychain
    pub fn store(username: &str, password: &str) -> anyhow::Result<()> {
        let entry = Entry::new(SERVICE_NAME, username)?;
        entry.set_password(password)?;
        debug!(user = username, "Stored credentials in keychain");
        Ok(())
    }

    /// Retrieve the remembered password, if any
    pub fn get_password(username: &str) -> Option<String> {
        let entry = Entry::new(SERVICE_NAME, username).ok()?;
        match entry.get_password() {
            Ok(password) => Some(password),
            Err(e) => {
                debug!(user = username, error = %e, "No remembered password");
                None
            }
        }
    }

    /// Forget the remembered password. Missing entries are not an error.
    pub fn delete(username: &str) -> anyhow::Result<()> {
        let entry = Entry::new(SERVICE_NAME, username)?;
        match entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
