//! reactji CLI: count the emoji reactions of everyone in a Slack workspace.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use reactji::cache::{DirStore, cache_key};
use reactji::collect::Collector;
use reactji::collect::retry::RetryPolicy;
use reactji::config::Config;
use reactji::config::secrets::{ExposeSecret, SecretString};
use reactji::job::run_workspace;
use reactji::report::write_report;
use reactji::slack::SlackClient;
use reactji::telemetry::{TelemetryConfig, init_telemetry};

#[derive(Parser)]
#[command(name = "reactji", about = "Tally Slack emoji reactions per member")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Collect every member not yet cached, then write the report
    Run {
        /// Items requested per reactions page
        #[arg(long)]
        page_size: Option<u32>,
        /// Directory holding per-user results
        #[arg(long)]
        cache_dir: Option<PathBuf>,
        /// Report file to write
        #[arg(long)]
        output: Option<PathBuf>,
        /// Leave out bots and deactivated accounts
        #[arg(long)]
        skip_inactive: bool,
    },
    /// Collect a single user and print their tally
    User {
        /// Slack user ID (e.g. U012AB3CD)
        user_id: String,
        /// Items requested per reactions page
        #[arg(long)]
        page_size: Option<u32>,
    },
    /// Merge cached results into the report without querying Slack
    Merge {
        #[arg(long)]
        cache_dir: Option<PathBuf>,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// List workspace members and their cache keys
    Members {
        #[arg(long)]
        skip_inactive: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = Config::from_env()?;

    let _guard = init_telemetry(TelemetryConfig {
        endpoint: config.otel_endpoint.clone(),
        service_name: "reactji".to_string(),
        default_filter: config.log_level.clone(),
    })?;

    match cli.command {
        Command::Run {
            page_size,
            cache_dir,
            output,
            skip_inactive,
        } => {
            let run = cmd_run(&config, page_size, cache_dir, output, skip_inactive);
            match config.deadline {
                Some(deadline) => tokio::time::timeout(deadline, run).await.map_err(|_| {
                    anyhow::anyhow!(
                        "run exceeded {}s deadline; finished members stay cached",
                        deadline.as_secs()
                    )
                })?,
                None => run.await,
            }
        }
        Command::User { user_id, page_size } => cmd_user(&config, user_id, page_size).await,
        Command::Merge { cache_dir, output } => cmd_merge(&config, cache_dir, output),
        Command::Members { skip_inactive } => cmd_members(&config, skip_inactive).await,
    }
}

fn client(config: &Config) -> anyhow::Result<SlackClient> {
    let token = SecretString::from(config.require_token()?.expose_secret().to_owned());
    Ok(SlackClient::new(token, config.api_base.clone())?)
}

async fn cmd_run(
    config: &Config,
    page_size: Option<u32>,
    cache_dir: Option<PathBuf>,
    output: Option<PathBuf>,
    skip_inactive: bool,
) -> anyhow::Result<()> {
    let slack = client(config)?;
    let policy = RetryPolicy::default();
    let members = slack.list_members(&policy, skip_inactive).await?;

    let mut store = DirStore::open(cache_dir.unwrap_or_else(|| config.cache_dir.clone()))?;
    let collector = Collector::new(&slack)
        .page_size(page_size.unwrap_or(config.page_size))
        .policy(policy);

    let summary = run_workspace(&collector, &mut store, &members).await?;
    println!(
        "Collected {} member(s), {} already cached.",
        summary.collected, summary.skipped
    );

    let output = output.unwrap_or_else(|| config.output.clone());
    let rows = write_report(&store, &output)?;
    println!("Wrote {rows} row(s) to {}", output.display());
    Ok(())
}

async fn cmd_user(config: &Config, user_id: String, page_size: Option<u32>) -> anyhow::Result<()> {
    let slack = client(config)?;
    let collector = Collector::new(&slack).page_size(page_size.unwrap_or(config.page_size));
    let tally = collector.collect(&user_id).await?;

    if tally.is_empty() {
        println!("No reactions found for {user_id}.");
        return Ok(());
    }

    let mut rows = tally.to_sequence();
    rows.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.emoji.cmp(&b.emoji)));

    println!("{:<32}  {:>8}  {:>8}", "EMOJI", "COUNT", "FIRST");
    println!("{}", "-".repeat(52));
    for row in &rows {
        println!("{:<32}  {:>8}  {:>8}", row.emoji, row.total, row.first);
    }
    println!("\n{} emoji, {} reaction(s)", rows.len(), tally.reactions_placed());
    Ok(())
}

fn cmd_merge(
    config: &Config,
    cache_dir: Option<PathBuf>,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let store = DirStore::open(cache_dir.unwrap_or_else(|| config.cache_dir.clone()))?;
    let output = output.unwrap_or_else(|| config.output.clone());
    let rows = write_report(&store, &output)?;
    println!("Wrote {rows} row(s) to {}", output.display());
    Ok(())
}

async fn cmd_members(config: &Config, skip_inactive: bool) -> anyhow::Result<()> {
    let slack = client(config)?;
    let members = slack
        .list_members(&RetryPolicy::default(), skip_inactive)
        .await?;

    println!("{:<12}  {:<32}  CACHE KEY", "ID", "NAME");
    println!("{}", "-".repeat(80));
    for member in &members {
        println!(
            "{:<12}  {:<32}  {}",
            member.id,
            member.display_name,
            cache_key(member)
        );
    }
    println!("\n{} member(s)", members.len());
    Ok(())
}
