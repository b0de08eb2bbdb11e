use docvoice_backend::controllers::{
    conversion::ConversionController, health::HealthController, jobs::JobsController,
};
use docvoice_backend::domain::conversion::ConversionService;
use docvoice_backend::domain::job::{JobService, JobServiceApi};
use docvoice_backend::infrastructure::config::{Config, LogFormat, TtsBackend};
use docvoice_backend::infrastructure::extractors::ExtractorRegistry;
use docvoice_backend::infrastructure::http::{
    build_router, shutdown_signal, start_http_server, AppControllers,
};
use docvoice_backend::infrastructure::repositories::{
    EspeakSynthesizer, JobRepository, OpenAiSynthesizer, PollySynthesizer, Synthesizer,
};
use docvoice_backend::infrastructure::storage::ArtifactStore;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Upper bound between two retention sweeps
const MAX_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    init_logging(&config);

    tracing::info!(
        "Starting DocVoice Backend on {}:{}",
        config.host,
        config.port
    );

    // === DEPENDENCY INJECTION SETUP ===
    // 1. Storage, registry and synthesis backend
    let store = Arc::new(ArtifactStore::open(config.storage_dir.as_deref())?);
    let job_repo = Arc::new(JobRepository::new());
    let synthesizer = create_synthesizer(&config).await;
    tracing::info!(
        provider = synthesizer.name(),
        audio_format = %synthesizer.audio_format(),
        max_chunk_chars = synthesizer.max_chunk_chars(),
        "Synthesizer initialized"
    );

    // 2. Services
    let settings = config.conversion_settings();
    let extractors = Arc::new(ExtractorRegistry::with_defaults(
        settings.allowed_extensions.clone(),
    ));
    tracing::info!(
        allowed_extensions = ?extractors.allowed_extensions(),
        max_upload_bytes = settings.max_upload_bytes,
        "Document extractors registered"
    );

    let max_upload_bytes = settings.max_upload_bytes;
    let conversion_service = Arc::new(ConversionService::new(
        synthesizer,
        extractors,
        store.clone(),
        job_repo.clone(),
        settings,
    ));
    let job_service = Arc::new(JobService::new(job_repo));

    // 3. Controllers
    let controllers = AppControllers {
        health: Arc::new(HealthController::new(
            store.clone(),
            conversion_service.clone(),
            job_service.clone(),
        )),
        conversion: Arc::new(ConversionController::new(
            conversion_service,
            job_service.clone(),
            store.clone(),
        )),
        jobs: Arc::new(JobsController::new(job_service.clone())),
        max_upload_bytes,
    };

    let retention = (config.artifact_ttl_secs > 0).then(|| {
        spawn_retention_task(job_service, Duration::from_secs(config.artifact_ttl_secs))
    });

    // Start HTTP server with all routes
    let result = start_http_server(&config, build_router(controllers), shutdown_signal()).await;

    if let Some(retention) = retention {
        retention.abort();
    }

    // Dropping the last store handle removes a temporary storage directory
    drop(store);
    tracing::info!("Server stopped");

    result
}

async fn create_synthesizer(config: &Config) -> Arc<dyn Synthesizer> {
    match config.tts_backend {
        TtsBackend::Espeak => Arc::new(EspeakSynthesizer::new(config.espeak_binary.clone())),
        TtsBackend::Polly => {
            tracing::info!("Initializing AWS Polly client with region: {}", config.aws_region);

            let has_access_key = std::env::var("AWS_ACCESS_KEY_ID").is_ok();
            let has_secret_key = std::env::var("AWS_SECRET_ACCESS_KEY").is_ok();
            if !has_access_key || !has_secret_key {
                tracing::warn!("AWS credentials not found in environment variables. Will attempt to use other credential providers (instance metadata, etc.)");
            }

            let aws_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
                .region(aws_config::Region::new(config.aws_region.clone()))
                .load()
                .await;

            let polly_client = aws_sdk_polly::Client::new(&aws_config);
            Arc::new(PollySynthesizer::new(Arc::new(polly_client)))
        }
        TtsBackend::OpenAi => {
            let mut openai_config = async_openai::config::OpenAIConfig::new();
            if let Some(key) = &config.openai_api_key {
                openai_config = openai_config.with_api_key(key);
            }
            let client = async_openai::Client::with_config(openai_config);
            Arc::new(OpenAiSynthesizer::new(
                Arc::new(client),
                config.openai_tts_model.clone(),
            ))
        }
    }
}

/// Periodically drop artifacts older than `ttl`
fn spawn_retention_task(
    job_service: Arc<JobService>,
    ttl: Duration,
) -> tokio::task::JoinHandle<()> {
    let period = ttl.min(MAX_SWEEP_INTERVAL);
    tracing::info!(ttl_secs = ttl.as_secs(), sweep_secs = period.as_secs(), "Artifact retention enabled");

    tokio::spawn(async move {
        let ttl = match chrono::Duration::from_std(ttl) {
            Ok(ttl) => ttl,
            Err(e) => {
                tracing::error!(error = %e, "Retention period out of range, retention disabled");
                return;
            }
        };

        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            job_service.remove_expired(ttl).await;
        }
    })
}

fn init_logging(config: &Config) {
    if config.log_format == LogFormat::Json {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| config.default_log_filter().into()),
            )
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| config.default_log_filter().into()),
            )
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}
