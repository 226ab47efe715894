use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use garmin_connect_client::auth::authenticate;
use garmin_connect_client::config::Config;
use garmin_connect_client::session::SessionStore;
use garmin_export::aggregate::export_all;
use garmin_export::history::FetchPool;
use garmin_export::output::write_outputs;

#[derive(Parser)]
#[command(name = "garmin-export")]
#[command(about = "Export Garmin Connect health data to local JSON and Markdown files")]
struct Args {
    /// Days of history to retrieve
    #[arg(long, default_value_t = 30)]
    days: u32,

    /// Directory the output artifacts are written to
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Worker count for per-day history fetches
    #[arg(long, default_value_t = 4)]
    workers: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Configure logging from env var `GARMIN_EXPORT_LOG_LEVEL` (or fallback to `RUST_LOG`, default `info`).
    let log_env = std::env::var("GARMIN_EXPORT_LOG_LEVEL")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "info".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_new(&log_env)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .compact()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .with_env_filter(env_filter)
        .init();

    let args = Args::parse();
    let config = Config::from_env()?;
    let store = SessionStore::new(config.session_file.clone());

    let client = authenticate(&config, &store).await?;

    let pool = FetchPool {
        workers: args.workers,
        ..FetchPool::default()
    };
    let record = export_all(
        Arc::new(client),
        args.days,
        &pool,
        chrono::Local::now().naive_local(),
    )
    .await;

    let paths = write_outputs(&record, &args.data_dir)?;

    let dump_size = std::fs::metadata(&paths.full_dump).map(|m| m.len()).unwrap_or(0);
    tracing::info!(
        path = %paths.full_dump.display(),
        size_kb = dump_size / 1024,
        "full dump written"
    );
    tracing::info!(path = %paths.summary.display(), "summary written");
    tracing::info!(path = %paths.split_dir.display(), "split files written");
    tracing::info!(path = %paths.digest.display(), "markdown digest written");

    Ok(())
}
