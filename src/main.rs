//! Daily sports value picks.
//!
//! Fetches the day's football and baseball events with their odds,
//! estimates fair probabilities, keeps the best-edge picks and delivers
//! a text report.
//!
//! Usage: `daily-picks [send | preview-next-period | recheck-current-period]`
//! (default `send`). One invocation is one run; scheduling is external.

use chrono::{Offset, Utc};
use tracing::{error, info, warn};

use daily_picks::api::client::SportsApiClient;
use daily_picks::config::Settings;
use daily_picks::data::source::ApiSportsSource;
use daily_picks::delivery::{ConsoleNotifier, Notifier, TelegramNotifier};
use daily_picks::pipeline::{self, PipelineConfig, RunMode};
use daily_picks::storage::{JsonlPickStore, PickStore};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Load configuration.
    let settings = Settings::from_env();

    // Initialize logging.
    init_logging(&settings);

    let arg = std::env::args().nth(1);
    let mode = match arg.as_deref().map(str::parse::<RunMode>) {
        None => RunMode::Send,
        Some(Ok(mode)) => mode,
        Some(Err(e)) => {
            error!(error = %e, "Unrecognized mode, nothing to do");
            eprintln!("{e}");
            return Ok(());
        }
    };

    info!(
        %mode,
        sports = ?settings.sports(),
        utc_offset_minutes = settings.report_utc_offset_minutes,
        "Configuration loaded"
    );

    // Validate settings.
    if let Err(errors) = settings.validate() {
        for e in &errors {
            error!(error = %e, "Configuration error");
        }
        anyhow::bail!("Configuration validation failed");
    }

    if settings.api_sports_key.is_empty() {
        warn!("API_SPORTS_KEY is empty, provider calls will be rejected");
    }

    let football = SportsApiClient::new(&settings.football_api())?;
    let baseball = SportsApiClient::new(&settings.baseball_api())?;
    let source = ApiSportsSource::new(football, baseball, settings.source_config());

    let (notifier, destination): (Box<dyn Notifier>, String) = match settings.telegram() {
        Some((token, chat)) => (
            Box::new(TelegramNotifier::new(token, settings.http_timeout())?),
            chat.to_string(),
        ),
        None => {
            warn!("TELEGRAM_BOT_TOKEN / TELEGRAM_CHAT_ID not set, printing report to stdout");
            (Box::new(ConsoleNotifier), "stdout".to_string())
        }
    };

    let store = settings.picks_log().map(JsonlPickStore::new);
    if let Some(store) = &store {
        info!(path = %store.path().display(), "Audit log enabled");
    }

    let config = PipelineConfig {
        sports: settings.sports(),
        estimator: settings.estimator_config(),
        football_selector: settings.football_selector(),
        baseball_selector: settings.baseball_selector(),
        ranker: settings.ranker_config(),
        report: settings.report_config(),
        destination,
    };

    // Validation guarantees the offset exists.
    let offset = settings.report_offset().unwrap_or_else(|| Utc.fix());
    let today = Utc::now().with_timezone(&offset).date_naive();

    let outcome = pipeline::run(
        mode,
        today,
        &source,
        notifier.as_ref(),
        store.as_ref().map(|s| s as &dyn PickStore),
        &config,
    )
    .await;

    if outcome.delivered < outcome.messages.len() {
        warn!(
            run_id = %outcome.run_id,
            delivered = outcome.delivered,
            chunks = outcome.messages.len(),
            "Report only partially delivered"
        );
    }

    Ok(())
}

fn init_logging(settings: &Settings) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log_level));

    if settings.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .compact()
            .init();
    }
}
