use price_sniper::access::authorize;
use price_sniper::analyzer::BatchSummary;
use price_sniper::batch::{plan_table, run_batch, BatchOptions, Checkpoint};
use price_sniper::cli::{default_output_path, Cli, ColumnArgs, Commands};
use price_sniper::config::{load_config, AppConfig};
use price_sniper::model::ColumnMapping;
use price_sniper::scraper::NaverShopClient;
use price_sniper::sheet::{detect_mapping, read_table, write_results, ColumnOverrides, Table};
use price_sniper::storage::SqliteStorage;

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

struct SearchArgs {
    input: PathBuf,
    output: Option<PathBuf>,
    columns: ColumnArgs,
    min_price: Option<u64>,
    max_price: Option<u64>,
    delay_ms: Option<u64>,
    concurrency: Option<usize>,
    checkpoint: Option<String>,
    fresh: bool,
    access_code: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Set panic hook to log details about any panic
    std::panic::set_hook(Box::new(|panic_info| {
        error!("😱 Panic occurred: {}", panic_info);
    }));

    let cli = Cli::parse();

    let mut config = match load_config(&cli.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Config load error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    config.apply_env(|key| std::env::var(key).ok());

    match cli.command {
        Commands::Plan { input, columns } => plan(&input, columns),
        Commands::Search {
            input,
            output,
            columns,
            min_price,
            max_price,
            delay_ms,
            concurrency,
            checkpoint,
            fresh,
            access_code,
        } => {
            let args = SearchArgs {
                input,
                output,
                columns,
                min_price,
                max_price,
                delay_ms,
                concurrency,
                checkpoint,
                fresh,
                access_code,
            };
            search(config, args).await
        }
    }
}

fn load_input(input: &Path, columns: ColumnArgs) -> Option<(Table, ColumnMapping)> {
    let table = match read_table(input) {
        Ok(t) => t,
        Err(e) => {
            error!("Cannot read {}: {}", input.display(), e);
            return None;
        }
    };
    match detect_mapping(&table.headers, &ColumnOverrides::from(columns)) {
        Ok(mapping) => Some((table, mapping)),
        Err(e) => {
            error!("{}", e);
            None
        }
    }
}

fn plan(input: &Path, columns: ColumnArgs) -> ExitCode {
    let Some((table, mapping)) = load_input(input, columns) else {
        return ExitCode::FAILURE;
    };
    for (index, queries) in plan_table(&table, &mapping).iter().enumerate() {
        println!("[{}] {}", index + 1, queries.join(" | "));
    }
    ExitCode::SUCCESS
}

async fn search(mut config: AppConfig, args: SearchArgs) -> ExitCode {
    // Command-line values override the config file
    if let Some(min) = args.min_price {
        config.price_filter.min_price = min;
    }
    if let Some(max) = args.max_price {
        config.price_filter.max_price = max;
    }
    if let Some(delay) = args.delay_ms {
        config.row_delay_millis = delay;
    }
    if let Some(n) = args.concurrency {
        config.concurrency = n;
    }
    if args.checkpoint.is_some() {
        config.checkpoint_db = args.checkpoint.clone();
    }
    if let Err(e) = config.validate() {
        error!("{}", e);
        return ExitCode::FAILURE;
    }

    let grant = match authorize(config.access_code.as_deref(), args.access_code.as_deref()) {
        Ok(grant) => grant,
        Err(e) => {
            error!("⛔ {}", e);
            return ExitCode::FAILURE;
        }
    };

    if config.naver.client_id.is_empty() || config.naver.client_secret.is_empty() {
        error!("Naver API credentials missing: set naver.client_id / naver.client_secret or NAVER_CLIENT_ID / NAVER_CLIENT_SECRET");
        return ExitCode::FAILURE;
    }
    let lookup = match NaverShopClient::new(&config.naver, config.request_timeout()) {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to build HTTP client: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let Some((table, mapping)) = load_input(&args.input, args.columns) else {
        return ExitCode::FAILURE;
    };
    info!("Found {} items in {}", table.rows.len(), args.input.display());

    let storage = match config.checkpoint_db.as_deref() {
        Some(path) => match SqliteStorage::new(path) {
            Ok(s) => Some(Mutex::new(s)),
            Err(e) => {
                error!("Failed to open checkpoint {}: {}", path, e);
                return ExitCode::FAILURE;
            }
        },
        None => None,
    };
    let batch_key = args
        .input
        .canonicalize()
        .unwrap_or_else(|_| args.input.clone())
        .display()
        .to_string();
    let max_age = config.checkpoint_max_age();
    let checkpoint = storage.as_ref().map(|storage| Checkpoint { storage, batch_key, max_age });
    if let (Some(cp), true) = (&checkpoint, args.fresh) {
        match cp.storage.lock().await.clear_batch(&cp.batch_key) {
            Ok(n) => info!("Cleared {} checkpointed rows", n),
            Err(e) => warn!("Failed to clear checkpoint: {}", e),
        }
    }

    let options = BatchOptions {
        filter: config.price_filter,
        row_delay: config.row_delay(),
        concurrency: config.concurrency,
    };
    info!(
        "Price range: {} ~ {}",
        options.filter.min_price,
        if options.filter.is_unbounded() { "unbounded".to_string() } else { options.filter.max_price.to_string() }
    );

    let progress = ProgressBar::new(table.rows.len() as u64);
    progress.set_style(
        ProgressStyle::with_template("{spinner} [{bar:40}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    progress.enable_steady_tick(Duration::from_millis(200));

    let results = run_batch(&grant, &table, &mapping, &lookup, &options, checkpoint.as_ref(), |entry| {
        progress.set_message(entry.result.query_or_marker());
        progress.inc(1);
    })
    .await;
    progress.finish_and_clear();

    let summary = BatchSummary::from_results(&results);
    info!(
        "✅ Done: {} rows, {} found, {} missed (out of range {}, lookup failed {}, no query {}, errors {})",
        summary.total,
        summary.found,
        summary.missed(),
        summary.none_in_range,
        summary.transport_failed,
        summary.no_usable_query,
        summary.faults
    );
    if let (Some(low), Some(high)) = (summary.lowest_price, summary.highest_price) {
        info!("Matched prices: avg = {:.0}, min = {}, max = {}", summary.avg_price, low, high);
    }

    let output = args.output.unwrap_or_else(|| default_output_path(&args.input));
    if let Err(e) = write_results(&output, &table, &results) {
        error!("Failed to write {}: {}", output.display(), e);
        return ExitCode::FAILURE;
    }
    info!("📥 Results saved to {}", output.display());
    ExitCode::SUCCESS
}
