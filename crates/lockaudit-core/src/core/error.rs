use thiserror::Error;

pub type AuditResult<T> = Result<T, AuditError>;

#[derive(Error, Debug)]
pub enum AuditError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Path error: {0}")]
    Path(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not authenticated: {0}")]
    NotAuthenticated(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Repository source error: {0}")]
    Source(String),

    #[error("Advisory feed error: {0}")]
    Advisory(String),

    #[error("Corpus error: {0}")]
    Corpus(String),

    #[error("Operation cancelled")]
    Cancelled,
}

impl AuditError {
    /// Process exit status for a run that ended with this error.
    pub fn exit_code(&self) -> i32 {
        1
    }

    /// Whether a retry could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            AuditError::Http(e) => {
                e.is_timeout()
                    || e.is_connect()
                    || e
                        .status()
                        .map(|s| s.is_server_error() || s.as_u16() == 429)
                        .unwrap_or(false)
            }
            _ => false,
        }
    }
}
