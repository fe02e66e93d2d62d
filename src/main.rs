use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use console::Emoji;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use podledger::{
    Catalog, LoftyTagWriter, NoopReporter, ProgressEvent, ProgressReporter, ReqwestClient,
    RunContext, SharedProgressReporter, SyncError, ingest_feeds, plan_downloads, read_feed_list,
    record_downloads, tag_downloads, write_download_script,
};

// Emoji with fallback for terminals without Unicode support
static MICROPHONE: Emoji<'_, '_> = Emoji("🎙️  ", "");
static SEARCH: Emoji<'_, '_> = Emoji("🔍 ", "[~] ");
static HEADPHONES: Emoji<'_, '_> = Emoji("🎧 ", "[i] ");
static SCROLL: Emoji<'_, '_> = Emoji("📜 ", "[>] ");
static SUCCESS: Emoji<'_, '_> = Emoji("✅ ", "[+] ");
static FAILURE: Emoji<'_, '_> = Emoji("❌ ", "[!] ");
static FOLDER: Emoji<'_, '_> = Emoji("📁 ", "");
static LABEL: Emoji<'_, '_> = Emoji("🏷️  ", "[t] ");

/// Keep a podcast catalog in step with the episodes on disk
#[derive(Parser, Debug)]
#[command(name = "podledger")]
#[command(about = "Catalog podcast feeds and plan downloads of missing episodes")]
#[command(version)]
struct Args {
    /// SQLite catalog file
    #[arg(long, env = "PODLEDGER_DB", default_value = "podledger.sqlite", global = true)]
    db: PathBuf,

    /// Directory holding downloaded episodes (defaults to the current directory)
    #[arg(long, env = "PODLEDGER_DIR", global = true)]
    podcasts_dir: Option<PathBuf>,

    /// File listing one feed URL per line
    #[arg(long, env = "PODLEDGER_FEEDS", default_value = "podledger.conf", global = true)]
    feeds: PathBuf,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode - suppress progress output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum Command {
    /// Fetch every feed and add new episodes to the catalog
    Ingest,
    /// Work out missing episodes and write the download script
    Plan {
        /// Also print the fetch list as JSON on stdout
        #[arg(long)]
        json: bool,
    },
    /// Record the episode files present in the podcast directory
    Record,
    /// Write audio tags to recorded downloads that have none yet
    Tag,
    /// Ingest, plan, record and tag in one go
    ///
    /// The download script is written but not run, so only files already
    /// on disk are recorded and tagged.
    All,
}

/// Progress reporter using an indicatif spinner for terminal output
struct IndicatifReporter {
    bar: ProgressBar,
}

impl IndicatifReporter {
    fn new() -> Self {
        let style = ProgressStyle::default_spinner()
            .template("{spinner:.green} {wide_msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());

        let bar = ProgressBar::new_spinner();
        bar.set_style(style);
        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }
}

impl Drop for IndicatifReporter {
    fn drop(&mut self) {
        self.bar.finish_and_clear();
    }
}

impl ProgressReporter for IndicatifReporter {
    fn report(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::FetchingFeed { source } => {
                self.bar
                    .set_message(format!("{SEARCH}Fetching feed: {}", source.cyan()));
            }

            ProgressEvent::FeedIngested {
                podcast_title,
                new_episodes,
                seen_episodes,
            } => {
                self.bar.println(format!(
                    "{HEADPHONES}{} • {} new, {} already known",
                    podcast_title.bold().green(),
                    new_episodes.to_string().yellow(),
                    seen_episodes.to_string().cyan()
                ));
            }

            ProgressEvent::FeedFailed { source, error } => {
                self.bar.println(format!(
                    "{FAILURE}{} - {}",
                    truncate(&source, 50).red(),
                    error.dimmed()
                ));
            }

            ProgressEvent::IngestCompleted {
                ingested,
                failed,
                new_episodes,
            } => {
                self.bar.println(format!(
                    "{SUCCESS}{} {} feeds, {} new episodes, {} failed",
                    "Ingest complete:".bold().green(),
                    ingested.to_string().green().bold(),
                    new_episodes.to_string().yellow(),
                    if failed > 0 {
                        failed.to_string().red().bold()
                    } else {
                        failed.to_string().green()
                    }
                ));
            }

            ProgressEvent::DirectoryScanned { files } => {
                self.bar.set_message(format!(
                    "{SEARCH}Found {} episode files on disk",
                    files.to_string().cyan()
                ));
            }

            ProgressEvent::CatalogScanned { episodes } => {
                self.bar.set_message(format!(
                    "{SEARCH}Read {} downloadable episodes from the catalog",
                    episodes.to_string().cyan()
                ));
            }

            ProgressEvent::Reconciled { stats } => {
                self.bar.println(format!(
                    "{HEADPHONES}{} catalog / {} on disk • missing by id {}, by title {}, by token {}",
                    stats.catalog_ids.to_string().cyan(),
                    stats.file_ids.to_string().cyan(),
                    stats.by_content_id.to_string().yellow(),
                    stats.after_substring_match.to_string().yellow(),
                    stats.after_token_match.to_string().yellow().bold()
                ));
            }

            ProgressEvent::FetchListReady { count } => {
                self.bar.set_message(format!(
                    "{SCROLL}{} episodes to download",
                    count.to_string().yellow()
                ));
            }

            ProgressEvent::ScriptWritten { path, lines } => {
                self.bar.println(format!(
                    "{SCROLL}{} {} lines written to {}",
                    "Download script:".bold().green(),
                    lines.to_string().yellow(),
                    path.display().to_string().cyan()
                ));
            }

            ProgressEvent::DownloadsRecorded {
                new_downloads,
                seen_downloads,
            } => {
                self.bar.println(format!(
                    "{SUCCESS}{} {} new, {} already recorded",
                    "Downloads recorded:".bold().green(),
                    new_downloads.to_string().green().bold(),
                    seen_downloads.to_string().cyan()
                ));
            }

            ProgressEvent::FileTagged { filename } => {
                self.bar
                    .set_message(format!("{LABEL}Tagged {}", truncate(&filename, 60).cyan()));
            }

            ProgressEvent::TagFailed { filename, error } => {
                self.bar.println(format!(
                    "{FAILURE}{} - {}",
                    truncate(&filename, 50).red(),
                    error.dimmed()
                ));
            }

            ProgressEvent::TaggingCompleted { tagged, failed } => {
                self.bar.println(format!(
                    "{SUCCESS}{} {} files, {} failed",
                    "Tagging complete:".bold().green(),
                    tagged.to_string().green().bold(),
                    if failed > 0 {
                        failed.to_string().red().bold()
                    } else {
                        failed.to_string().green()
                    }
                ));
            }
        }
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let head: String = text.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{head}...")
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run_ingest(
    args: &Args,
    catalog: &Catalog,
    ctx: &RunContext,
    reporter: SharedProgressReporter,
) -> Result<()> {
    let sources = read_feed_list(&args.feeds)?;
    let client = ReqwestClient::new().context("Failed to build HTTP client")?;

    ingest_feeds(&client, catalog, &sources, ctx, reporter).await?;
    Ok(())
}

fn run_plan(
    catalog: &Catalog,
    ctx: &RunContext,
    reporter: SharedProgressReporter,
    json: bool,
) -> Result<()> {
    let plan = plan_downloads(catalog, ctx, reporter.clone())?;

    if json {
        let rendered =
            serde_json::to_string_pretty(&plan).context("Failed to serialize fetch list")?;
        println!("{rendered}");
    }

    let path = write_download_script(&ctx.podcasts_dir, &plan.instructions).map_err(SyncError::from)?;
    reporter.report(ProgressEvent::ScriptWritten {
        path,
        lines: plan.instructions.len(),
    });

    Ok(())
}

async fn run(args: &Args, reporter: SharedProgressReporter) -> Result<()> {
    let podcasts_dir = match &args.podcasts_dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().context("Failed to determine current directory")?,
    };
    let ctx = RunContext::new(podcasts_dir);

    let catalog = Catalog::open(&args.db)
        .with_context(|| format!("Failed to open catalog {}", args.db.display()))?;

    match args.command {
        Command::Ingest => run_ingest(args, &catalog, &ctx, reporter).await?,
        Command::Plan { json } => run_plan(&catalog, &ctx, reporter, json)?,
        Command::Record => {
            record_downloads(&catalog, &ctx, reporter)?;
        }
        Command::Tag => {
            tag_downloads(&LoftyTagWriter, &catalog, &ctx, reporter)?;
        }
        Command::All => {
            run_ingest(args, &catalog, &ctx, reporter.clone()).await?;
            run_plan(&catalog, &ctx, reporter.clone(), false)?;
            record_downloads(&catalog, &ctx, reporter.clone())?;
            tag_downloads(&LoftyTagWriter, &catalog, &ctx, reporter)?;
        }
    }

    if !args.quiet {
        println!(
            "\n{FOLDER}Podcasts: {}\n",
            ctx.podcasts_dir.display().to_string().cyan()
        );
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    if !args.quiet {
        println!(
            "\n{}{} {}\n",
            MICROPHONE,
            "podledger".bold().magenta(),
            "- Podcast Catalog".dimmed()
        );
    }

    let reporter: SharedProgressReporter = if args.quiet {
        NoopReporter::shared()
    } else {
        Arc::new(IndicatifReporter::new())
    };

    let result = run(&args, reporter).await;

    if let Err(err) = &result {
        let integrity = err
            .downcast_ref::<SyncError>()
            .is_some_and(SyncError::is_integrity_violation);
        if integrity {
            eprintln!(
                "{FAILURE}{}",
                "Catalog integrity violation, run aborted".red().bold()
            );
        }
    }

    result
}
