use crate::core::{AuditError, AuditResult};
use keyring::Entry;

/// Service name for keyring entries
const KEYRING_SERVICE: &str = "lockaudit";

/// Manages credential storage using OS keychain
///
/// Platform support:
/// - macOS: Keychain
/// - Windows: Credential Manager
/// - Linux: Secret Service (libsecret)
pub struct CredentialStore;

impl CredentialStore {
    /// Store a credential in the OS keychain
    pub fn store(key: &str, value: &str) -> AuditResult<()> {
        let entry = Self::entry(key)?;

        entry.set_password(value).map_err(|e| {
            AuditError::Config(format!("Failed to store credential in keychain: {}", e))
        })?;

        Ok(())
    }

    /// Retrieve a credential from the OS keychain
    pub fn retrieve(key: &str) -> AuditResult<String> {
        let entry = Self::entry(key)?;

        let password = entry.get_password().map_err(|e| {
            AuditError::Config(format!("Failed to retrieve credential from keychain: {}", e))
        })?;

        Ok(password)
    }

    /// Delete a credential from the OS keychain
    pub fn delete(key: &str) -> AuditResult<()> {
        let entry = Self::entry(key)?;

        entry.delete_credential().map_err(|e| {
            AuditError::Config(format!("Failed to delete credential from keychain: {}", e))
        })?;

        Ok(())
    }

    /// Check if a credential exists in the keychain
    pub fn exists(key: &str) -> bool {
        Self::retrieve(key).is_ok()
    }

    fn entry(key: &str) -> AuditResult<Entry> {
        Entry::new(KEYRING_SERVICE, key)
            .map_err(|e| AuditError::Config(format!("Failed to create keyring entry: {}", e)))
    }
}
