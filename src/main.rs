use anyhow::{bail, Context};
use std::process;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use vulngate::adapters::outbound::console::StderrProgressReporter;
use vulngate::adapters::outbound::filesystem::FileSystemReader;
use vulngate::adapters::outbound::network::VulnersClient;
use vulngate::application::dto::{ResolutionMode, ScanRequest, ScanSummary};
use vulngate::application::factories::StoreFactory;
use vulngate::application::use_cases::{ScanComponentsUseCase, SyncCollectionsUseCase};
use vulngate::cli::{Args, Command, OfflineCommand, ScanArgs, SyncArgs, Threshold};
use vulngate::config::Settings;
use vulngate::logging;
use vulngate::ports::inbound::VulnerabilityResolutionPort;
use vulngate::ports::outbound::BulletinStore;
use vulngate::resolution::policies::Policy;
use vulngate::shared::error::ExitCode;
use vulngate::shared::Result;

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn main() {
    // clap exits with 2 on invalid arguments
    let args = Args::parse_args();

    let code = match run(args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("\n❌ An error occurred:\n");
            eprintln!("{}", e);

            // Display error chain
            for cause in e.chain().skip(1) {
                eprintln!("\nCaused by: {}", cause);
            }

            eprintln!();
            ExitCode::ApplicationError
        }
    };

    process::exit(code.as_i32());
}

fn run(args: Args) -> Result<ExitCode> {
    let mut settings = Settings::load(args.config.as_deref())?;
    if args.offline {
        settings.offline = true;
    }
    if let Some(level) = args.log_level {
        settings.log_level = level;
    }
    if let Some(format) = args.log_format {
        settings.log_format = format;
    }

    logging::init(settings.log_format, &settings.log_level);
    for warning in &settings.warnings {
        warn!("{}", warning);
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start the async runtime")?;

    runtime.block_on(dispatch(args.command, settings))
}

async fn dispatch(command: Command, settings: Settings) -> Result<ExitCode> {
    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, canceling");
            interrupt.cancel();
        }
    });

    match command {
        Command::Scan(scan) => run_scan(scan, settings, &cancel).await,
        Command::Offline { command } => match command {
            OfflineCommand::Sync(sync) => run_sync(sync, &settings, &cancel).await,
            OfflineCommand::Status => run_status(&settings),
            OfflineCommand::Purge => run_purge(&settings),
        },
    }
}

async fn run_scan(scan: ScanArgs, settings: Settings, cancel: &CancellationToken) -> Result<ExitCode> {
    let reader = FileSystemReader::new();
    let components = reader.read_components(&scan.components)?;
    let external_findings = match scan.findings {
        Some(ref path) => reader.read_findings(path)?,
        None => Vec::new(),
    };

    let fail_on = match scan.fail_on {
        Some(Threshold(threshold)) => threshold,
        None => settings.fail_on,
    };
    let ignore_ids = settings
        .ignore
        .iter()
        .map(|entry| entry.id.clone())
        .chain(scan.ignore);
    let mut policy = Policy::new(fail_on, ignore_ids);
    if let Some(path) = scan.vex.or(settings.vex) {
        policy = policy.with_suppressions(reader.read_suppression_document(&path)?);
    }

    let mode = if settings.offline {
        ResolutionMode::Offline
    } else {
        ResolutionMode::Online
    };

    let client = match (mode, settings.api_key.as_deref()) {
        (ResolutionMode::Online, Some(key)) => Some(VulnersClient::new(key, VERSION)?),
        _ => None,
    };
    let store: Option<Arc<dyn BulletinStore>> = match mode {
        ResolutionMode::Offline => Some(Arc::from(StoreFactory::open(&settings.db_path))),
        ResolutionMode::Online => None,
    };

    let use_case = ScanComponentsUseCase::new(
        client,
        store.clone(),
        StderrProgressReporter::new(),
        policy,
    )
    .with_concurrency(scan.concurrency.unwrap_or(settings.concurrency))
    .with_ai_score(scan.ai_score || settings.enable_ai_score);

    let request = ScanRequest::new(components, mode).with_external_findings(external_findings);
    let response = use_case.scan(request, cancel).await;

    if let Some(store) = store {
        if let Err(e) = store.close() {
            warn!(error = %e, "Failed to close the offline cache");
        }
    }
    let response = response?;

    let output = serde_json::to_string_pretty(&response.findings)
        .context("Failed to serialize findings")?;
    println!("{}", output);
    print_summary(&response.summary, response.exit_code);

    Ok(response.exit_code)
}

async fn run_sync(sync: SyncArgs, settings: &Settings, cancel: &CancellationToken) -> Result<ExitCode> {
    let Some(api_key) = settings.api_key.as_deref() else {
        bail!(
            "An API key is required to sync the offline cache\n\n\
             💡 Hint: Set VULNGATE_API_KEY or 'api_key' in the config file."
        );
    };
    let client = VulnersClient::new(api_key, VERSION)?;
    let store = open_cache(settings);

    let collections = if sync.collections.is_empty() {
        settings.collections.clone()
    } else {
        sync.collections
    };

    eprintln!("🔄 Syncing {} collection(s)...", collections.len());
    let use_case = SyncCollectionsUseCase::new(client, store.clone());
    let result = use_case.sync(&collections, sync.full, cancel).await;
    close_cache(store.as_ref());

    for outcome in result? {
        eprintln!(
            "   ✅ {} ({}): fetched {}, stored {}, skipped {}",
            outcome.collection, outcome.mode, outcome.fetched, outcome.stored, outcome.skipped
        );
    }

    Ok(ExitCode::Success)
}

fn run_status(settings: &Settings) -> Result<ExitCode> {
    let store = open_cache(settings);
    let meta = store.collection_meta();
    close_cache(store.as_ref());
    let meta = meta?;

    if meta.is_empty() {
        eprintln!("📭 No collections synced yet ({})", settings.db_path.display());
    }
    let output =
        serde_json::to_string_pretty(&meta).context("Failed to serialize collection status")?;
    println!("{}", output);

    Ok(ExitCode::Success)
}

fn run_purge(settings: &Settings) -> Result<ExitCode> {
    let store = open_cache(settings);
    let result = store.purge();
    close_cache(store.as_ref());
    result?;

    info!(path = %settings.db_path.display(), "Offline cache purged");
    eprintln!("🧹 Offline cache purged");

    Ok(ExitCode::Success)
}

fn open_cache(settings: &Settings) -> Arc<dyn BulletinStore> {
    Arc::from(StoreFactory::open(&settings.db_path))
}

fn close_cache(store: &dyn BulletinStore) {
    if let Err(e) = store.close() {
        warn!(error = %e, "Failed to close the offline cache");
    }
}

fn print_summary(summary: &ScanSummary, exit_code: ExitCode) {
    eprintln!(
        "\n📊 {} component(s), {} finding(s): {} critical, {} high, {} medium, {} low",
        summary.component_count,
        summary.finding_count,
        summary.critical,
        summary.high,
        summary.medium,
        summary.low
    );
    if summary.exploited_count > 0 || summary.high_epss_count > 0 {
        eprintln!(
            "   ⚠️  {} exploited, {} with high EPSS",
            summary.exploited_count, summary.high_epss_count
        );
    }
    if exit_code == ExitCode::VulnerabilitiesDetected {
        eprintln!("   ❌ Findings at or above the configured threshold");
    }
}
