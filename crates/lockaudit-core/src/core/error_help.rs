use crate::core::AuditError;

/// Provides helpful suggestions for common errors
pub trait ErrorHelp {
    fn help(&self) -> Option<String>;
}

impl ErrorHelp for AuditError {
    fn help(&self) -> Option<String> {
        match self {
            AuditError::NotAuthenticated(_) => Some(
                "💡 Suggestion: Export GITHUB_TOKEN (or GH_TOKEN), or run 'lockaudit login' to store a token in your keychain"
                    .to_string(),
            ),
            AuditError::NotFound(msg) => {
                if msg.contains("organization") {
                    Some(
                        "💡 Suggestion: Check the --org spelling, and that your token can see the organization"
                            .to_string(),
                    )
                } else {
                    None
                }
            }
            AuditError::Corpus(msg) => {
                if msg.contains("no provenance header") {
                    Some(
                        "💡 Suggestion: The corpus file looks damaged. Rebuild it with '--force'"
                            .to_string(),
                    )
                } else {
                    None
                }
            }
            AuditError::Advisory(_) => Some(
                "💡 Suggestion: Check your internet connection, or pass a saved feed with '--feed-file'"
                    .to_string(),
            ),
            AuditError::Config(_) => Some(
                "💡 Suggestion: Fix or delete your config.yaml; a default one is written on the next run"
                    .to_string(),
            ),
            AuditError::Yaml(e) => Some(format!(
                "💡 Suggestion: Check your YAML syntax. Common issues:\n  - Missing colons after keys\n  - Incorrect indentation\n  - Unclosed quotes\n\nError details: {}",
                e
            )),
            AuditError::Http(e) => {
                if e.is_timeout() {
                    Some(
                        "💡 Suggestion: Check your internet connection, or raise request_timeout_secs in config.yaml"
                            .to_string(),
                    )
                } else if e.is_connect() {
                    Some(
                        "💡 Suggestion: Check your internet connection and firewall settings"
                            .to_string(),
                    )
                } else {
                    Some(
                        "💡 Suggestion: Check your internet connection, or verify the GitHub API is reachable"
                            .to_string(),
                    )
                }
            }
            AuditError::Io(e) => {
                if e.kind() == std::io::ErrorKind::PermissionDenied {
                    Some(
                        "💡 Suggestion: Check file permissions on the output path".to_string(),
                    )
                } else if e.kind() == std::io::ErrorKind::NotFound {
                    Some(
                        "💡 Suggestion: The file or directory may not exist. Check the path and try again"
                            .to_string(),
                    )
                } else {
                    None
                }
            }
            AuditError::Path(msg) => {
                if msg.contains("Could not determine") {
                    Some(
                        "💡 Suggestion: Check your system environment variables (HOME, APPDATA, etc.), or pass --config"
                            .to_string(),
                    )
                } else {
                    None
                }
            }
            _ => None,
        }
    }
}

/// Format an error with helpful suggestions
pub fn format_error_with_help(error: &AuditError) -> String {
    let mut output = format!("❌ Error: {}", error);

    if let Some(help) = error.help() {
        output.push_str("\n\n");
        output.push_str(&help);
    }

    output
}
