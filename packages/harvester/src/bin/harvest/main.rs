mod config;
mod prompt;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use console::style;
use harvester::report::{launch_banner, notification_text, outcome_message, stats_block};
use harvester::stores::{CsvInput, CsvWorkbook};
use harvester::{
    ingest_urls, notify_quietly, project, seed_jobs, HarvestConfig, HttpBrowser, InputSource,
    Notifier, Sink, StartMode, StopReason, StopSignal, TelegramNotifier, WorkerPool,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;

/// Extract business listings and mine their websites for contacts.
#[derive(Parser, Debug)]
#[command(name = "harvest", version, about)]
struct Args {
    /// CSV file whose first column holds the listing URLs
    #[arg(short, long)]
    input: Option<std::path::PathBuf>,

    /// Output workbook directory (one CSV per project tab)
    #[arg(short, long)]
    output_dir: Option<std::path::PathBuf>,

    /// Project to use; reused if a tab with this name exists
    #[arg(short, long)]
    project: Option<String>,

    /// Always create a new tab for the project
    #[arg(long)]
    new: bool,

    /// Clear the project's progress log before starting
    #[arg(long, conflicts_with = "resume")]
    restart: bool,

    /// Skip URLs already processed for the project (default)
    #[arg(long)]
    resume: bool,

    /// Number of parallel workers
    #[arg(short, long)]
    workers: Option<usize>,

    /// Never prompt; fail if something required is missing
    #[arg(long)]
    non_interactive: bool,
}

fn init_tracing(log_file: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .with_context(|| format!("cannot open log file {}", log_file.display()))?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,harvester=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .init();
    Ok(())
}

fn create_progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    if let Ok(template) = ProgressStyle::default_bar()
        .template("{spinner:.green} Extracting [{bar:40.green/dim}] {pos}/{len} {elapsed_precise}")
    {
        pb.set_style(template.progress_chars("█▓░"));
    }
    pb
}

/// Ctrl-C before launch exits at once; during a session it only raises the
/// stop flag so in-flight jobs finish.
fn install_interrupt_handler(stop: StopSignal, session_running: Arc<AtomicBool>) {
    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            if session_running.load(Ordering::SeqCst) {
                println!("\n⚠️  Interrupt received, finishing in-flight jobs...");
                stop.stop(StopReason::Interrupted);
            } else {
                println!("\n⚠️  Interrupted by user");
                std::process::exit(0);
            }
        }
    });
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;
    let args = Args::parse();
    init_tracing(&config.log_file)?;

    let stop = StopSignal::new();
    let session_running = Arc::new(AtomicBool::new(false));
    install_interrupt_handler(stop.clone(), session_running.clone());

    match harvest(args, config, stop, session_running).await {
        Err(e) if prompt::is_interrupted(&e) => {
            println!("\n⚠️  Interrupted by user");
            Ok(())
        }
        other => other,
    }
}

async fn harvest(
    args: Args,
    config: Config,
    stop: StopSignal,
    session_running: Arc<AtomicBool>,
) -> Result<()> {
    println!("{}", style("=".repeat(60)).cyan());
    println!("{}", style("🔍 BUSINESS LISTING HARVESTER").cyan().bold());
    println!("{}", style("=".repeat(60)).cyan());

    let interactive = !args.non_interactive;

    let input_path = match args.input.or(config.input.clone()) {
        Some(path) => path,
        None if interactive => prompt::ask_path("📊 Input CSV (first column holds the URLs)")?,
        None => anyhow::bail!("no input given: pass --input or set HARVEST_INPUT"),
    };
    let output_dir = match args.output_dir.or(config.output_dir.clone()) {
        Some(path) => path,
        None if interactive => prompt::ask_path("📊 Output directory")?,
        None => anyhow::bail!("no output directory given: pass --output-dir or set HARVEST_OUTPUT_DIR"),
    };

    let workbook = Arc::new(
        CsvWorkbook::open(&output_dir)
            .with_context(|| format!("cannot open output directory {}", output_dir.display()))?,
    );

    let tab = match args.project.or(config.project.clone()) {
        Some(name) if args.new => project::create_project(workbook.as_ref(), &name).await?,
        Some(name) => project::open_or_create(workbook.as_ref(), &name).await?,
        None if interactive => prompt::choose_project(workbook.as_ref()).await?,
        None => anyhow::bail!("no project given: pass --project or set PROJECT_NAME"),
    };

    let mode = if args.restart {
        StartMode::Restart
    } else if args.resume || !interactive {
        StartMode::Resume
    } else {
        prompt::choose_mode(&tab)?
    };

    println!("\n📥 Reading URLs from {}...", input_path.display());
    let raw = CsvInput::new(&input_path)
        .read_column()
        .await
        .with_context(|| format!("cannot read input {}", input_path.display()))?;
    let urls = ingest_urls(&raw);
    println!("✅ Found {} URLs", urls.len());

    let dedup = Arc::new(project::prepare_progress(&config.progress_dir, &tab, mode)?);
    let jobs = seed_jobs(&urls, &dedup);
    let skipped = urls.len() - jobs.len();
    if skipped > 0 {
        println!("⏭️  Skipped {} URLs already processed in this project", skipped);
    }
    println!("🎯 To process: {} URLs\n", jobs.len());

    if jobs.is_empty() {
        println!("✅ Every URL has already been processed for this project!");
        return Ok(());
    }

    let notifier: Option<TelegramNotifier> = config
        .telegram
        .as_ref()
        .map(|t| TelegramNotifier::new(&t.bot_token, &t.chat_id));
    if notifier.is_some() {
        println!("📱 Telegram notifications ON");
    } else {
        println!("📱 Telegram notifications not configured (optional)");
    }

    let mut settings = HarvestConfig::default();
    if let Some(workers) = args.workers.or(config.workers) {
        settings = settings.with_workers(workers);
    }
    let deadline = Local::now()
        + chrono::Duration::from_std(settings.session_limit()).context("session limit out of range")?;
    println!("{}\n", launch_banner(settings.workers.min(jobs.len()), deadline));

    let browser = HttpBrowser::new().with_page_timeout(settings.navigation_timeout());
    let sink = Arc::new(Sink::new(workbook, tab.clone(), dedup));
    let progress = create_progress_bar(jobs.len() as u64);
    let pool = WorkerPool::new(Arc::new(browser), settings, sink)
        .with_progress(progress.clone())
        .with_stop_signal(stop);

    session_running.store(true, Ordering::SeqCst);
    let report = pool.run(jobs).await;
    progress.finish_and_clear();

    println!("\n{}", stats_block(&report.stats));
    println!("\n{}", outcome_message(&tab, &report));

    notify_quietly(
        notifier.as_ref().map(|n| n as &dyn Notifier),
        &notification_text(&tab, &report),
    )
    .await;

    println!("\n📊 Data saved in {}", workbook_tab_path(&output_dir, &tab).display());
    Ok(())
}

fn workbook_tab_path(dir: &Path, tab: &str) -> std::path::PathBuf {
    dir.join(format!("{}.csv", tab))
}
