use dialoguer::Password;
use lockaudit::core::{AuditError, AuditResult, CredentialStore};
use lockaudit::source::TOKEN_CREDENTIAL_KEY;

pub fn run() -> AuditResult<()> {
    println!("GitHub Login");
    println!("Create a token with read access to the organization's repositories.");
    println!();

    let token = Password::new()
        .with_prompt("GitHub token")
        .interact()
        .map_err(|e| AuditError::Config(format!("Failed to read token: {}", e)))?;
    let token = token.trim().to_string();

    if token.is_empty() {
        return Err(AuditError::Config("Token cannot be empty".to_string()));
    }

    CredentialStore::store(TOKEN_CREDENTIAL_KEY, &token)?;

    println!();
    println!("✓ Token stored securely");
    println!("  Token: {}...", token_preview(&token));

    Ok(())
}

fn token_preview(token: &str) -> String {
    token.chars().take(4).collect()
}

pub fn logout() -> AuditResult<()> {
    if !CredentialStore::exists(TOKEN_CREDENTIAL_KEY) {
        println!("No stored token");
        return Ok(());
    }

    CredentialStore::delete(TOKEN_CREDENTIAL_KEY)?;
    println!("✓ Token removed from keychain");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_preview_respects_char_boundaries() {
        assert_eq!(token_preview("ghp_abcdefgh"), "ghp_");
        assert_eq!(token_preview("€€€"), "€€€");
        assert_eq!(token_preview("ab"), "ab");
    }
}
