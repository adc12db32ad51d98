use clap::Args;
use lockaudit::advisory::{load_advisories, AdvisorySource, FileFeed, HttpFeed};
use lockaudit::config::Config;
use lockaudit::core::AuditResult;
use lockaudit::corpus::{build_corpus, read_corpus, CollectOptions};
use lockaudit::report::{format_report, format_summary, render_json, AuditReport};
use lockaudit::scanner::scan_corpus;
use lockaudit::source::{GitHubSource, RepositorySource};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[derive(Args, Debug)]
pub struct AuditArgs {
    /// Rebuild the corpus even if the output file already exists
    #[arg(short, long)]
    pub force: bool,

    /// GitHub organization to audit
    #[arg(long, default_value = "your-org")]
    pub org: String,

    /// Corpus file (reused on later runs unless --force)
    #[arg(long, default_value = "all-package-locks.txt")]
    pub out: PathBuf,

    /// Also collect archived repositories
    #[arg(long)]
    pub include_archived: bool,

    /// Config file (defaults to the platform config directory)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Read the advisory feed from a file instead of fetching it
    #[arg(long)]
    pub feed_file: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Collect (if needed), scan, report. Returns the process exit status.
pub async fn run(args: AuditArgs) -> AuditResult<i32> {
    let config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, stopping after the current repository");
            on_interrupt.cancel();
        }
    });

    let summary = if args.force || !args.out.exists() {
        let source = GitHubSource::new(&config)?;
        source.verify_access().await?;

        let options = CollectOptions::from_config(&config, &args.org, args.include_archived);
        let summary = build_corpus(&source, options, &args.out, cancel).await?;

        if !args.json {
            println!("\n{}", format_summary(&summary)?);
        }
        Some(summary)
    } else {
        info!(path = %args.out.display(), "Reusing existing corpus (pass --force to rebuild)");
        None
    };

    let corpus = read_corpus(&args.out)?;

    let feed: Box<dyn AdvisorySource> = match &args.feed_file {
        Some(path) => Box::new(FileFeed::new(path)),
        None => Box::new(HttpFeed::new(&config)?),
    };
    let advisories = load_advisories(feed.as_ref()).await?;

    let findings = scan_corpus(&corpus, &advisories)?;
    let report = AuditReport::new(summary, advisories, findings);

    if args.json {
        println!("{}", render_json(&report)?);
    } else {
        print!("{}", format_report(&report));
    }

    Ok(report.exit_code())
}
