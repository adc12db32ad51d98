// Core functionality
pub mod core;

// Re-export commonly used types
pub use self::core::{format_error_with_help, AuditError, AuditResult, CredentialStore, ErrorHelp};
