use clap::{Parser, Subcommand};
use lockaudit::format_error_with_help;
use tracing_subscriber::EnvFilter;

mod cli;

#[derive(Parser)]
#[command(name = "lockaudit")]
#[command(about = "Audit an organization's package-lock.json files for compromised versions")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    audit: cli::audit::AuditArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Store a GitHub token in the OS keychain
    Login,
    /// Remove the stored GitHub token
    Logout,
}

#[tokio::main]
async fn main() {
    // Diagnostics go to stderr; stdout carries the report
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Login) => cli::login::run().map(|_| 0),
        Some(Commands::Logout) => cli::login::logout().map(|_| 0),
        None => cli::audit::run(cli.audit).await,
    };

    match result {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            // Display error with helpful suggestions
            eprintln!("\n{}", format_error_with_help(&e));
            std::process::exit(e.exit_code());
        }
    }
}
