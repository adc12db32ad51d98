//! lockaudit: audit an organization's npm lock files for compromised versions
//!
//! The crate has two halves. The collector walks every repository of an
//! organization and concatenates its `package-lock.json` files into one
//! provenance-tagged corpus file; the scanner then looks for literal
//! `"name": "version"` declarations of advisory pairs and attributes each
//! hit to the file it came from.

pub use lockaudit_core::{format_error_with_help, AuditError, AuditResult, CredentialStore, ErrorHelp};

/// Core module re-exported from lockaudit-core.
pub mod core {
    pub use lockaudit_core::core::*;
    pub use lockaudit_core::*;

    /// Path module re-exported from lockaudit-core.
    pub mod path {
        pub use lockaudit_core::core::path::*;
    }
}

/// Configuration management.
pub mod config;

/// Shared HTTP client construction and retry.
pub mod http;

/// Advisory feed parsing and sources.
pub mod advisory;

/// Repository hosting sources (GitHub).
pub mod source;

/// Corpus format, collection and persistence.
pub mod corpus;

/// Literal scanning of the corpus.
pub mod scanner;

/// Findings and run summaries.
pub mod report;
