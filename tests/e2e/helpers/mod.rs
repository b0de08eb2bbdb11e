use async_trait::async_trait;
use docvoice_backend::controllers::{
    conversion::ConversionController, health::HealthController, jobs::JobsController,
};
use docvoice_backend::domain::audio::AudioFormat;
use docvoice_backend::domain::conversion::{
    CatalogVoice, ConversionService, ConversionSettings, LanguageCode, VoiceSpec,
};
use docvoice_backend::domain::job::JobService;
use docvoice_backend::infrastructure::extractors::ExtractorRegistry;
use docvoice_backend::infrastructure::http::{build_router, AppControllers};
use docvoice_backend::infrastructure::repositories::{JobRepository, Synthesizer};
use docvoice_backend::infrastructure::storage::ArtifactStore;
use std::io::Cursor;
use std::sync::Arc;
use tempfile::TempDir;
use test_context::AsyncTestContext;
use tokio::net::TcpListener;

pub mod api_client;
pub mod assertions;

use api_client::TestClient;

/// Chunks containing this marker fail to synthesize
pub const FAIL_MARKER: &str = "FAILCHUNK";

/// Upload limit used by the test server
pub const TEST_MAX_UPLOAD_BYTES: usize = 64 * 1024;

const VOICES: &[CatalogVoice] = &[
    CatalogVoice::new("tone-en", LanguageCode::English),
    CatalogVoice::new("tone-es", LanguageCode::Spanish),
    CatalogVoice::new("tone-pt", LanguageCode::Portuguese),
];

/// Local synthesizer emitting a short 16 kHz mono tone per chunk
pub struct ToneSynthesizer;

impl ToneSynthesizer {
    fn tone() -> Vec<u8> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 16000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let mut cursor = Cursor::new(Vec::new());
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for _ in 0..1600 {
            writer.write_sample(1000i16).unwrap();
        }
        writer.finalize().unwrap();
        cursor.into_inner()
    }
}

#[async_trait]
impl Synthesizer for ToneSynthesizer {
    fn name(&self) -> &'static str {
        "tone"
    }

    fn audio_format(&self) -> AudioFormat {
        AudioFormat::Wav
    }

    fn max_chunk_chars(&self) -> usize {
        200
    }

    fn voices(&self) -> &'static [CatalogVoice] {
        VOICES
    }

    async fn synthesize(&self, text: &str, _voice: &VoiceSpec) -> Result<Vec<u8>, String> {
        if text.contains(FAIL_MARKER) {
            return Err("tone engine rejected the chunk".to_string());
        }
        Ok(Self::tone())
    }
}

pub struct TestContext {
    pub client: TestClient,
    #[allow(dead_code)]
    pub jobs: Arc<JobRepository>,
    #[allow(dead_code)]
    pub store: Arc<ArtifactStore>,
    _dir: TempDir,
}

impl AsyncTestContext for TestContext {
    fn setup() -> impl std::future::Future<Output = Self> + Send {
        async {
            let dir = tempfile::tempdir().expect("Failed to create storage dir");
            let store = Arc::new(
                ArtifactStore::open(Some(dir.path())).expect("Failed to open artifact store"),
            );
            let jobs = Arc::new(JobRepository::new());

            let settings = ConversionSettings {
                max_upload_bytes: TEST_MAX_UPLOAD_BYTES,
                default_language: LanguageCode::English,
                ..Default::default()
            };
            let extractors = Arc::new(ExtractorRegistry::with_defaults(
                settings.allowed_extensions.clone(),
            ));

            let conversion_service = Arc::new(ConversionService::new(
                Arc::new(ToneSynthesizer),
                extractors,
                store.clone(),
                jobs.clone(),
                settings,
            ));
            let job_service = Arc::new(JobService::new(jobs.clone()));

            let app = build_router(AppControllers {
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
                jobs: Arc::new(JobsController::new(job_service)),
                max_upload_bytes: TEST_MAX_UPLOAD_BYTES,
            });

            // Start server
            let listener = TcpListener::bind("127.0.0.1:0")
                .await
                .expect("Failed to bind listener");
            let addr = listener.local_addr().expect("Failed to get local addr");
            let base_url = format!("http://{}", addr);

            tokio::spawn(async move {
                axum::serve(listener, app).await.unwrap();
            });

            Self {
                client: TestClient::new(&base_url),
                jobs,
                store,
                _dir: dir,
            }
        }
    }

    fn teardown(self) -> impl std::future::Future<Output = ()> + Send {
        async {
            // Storage is removed when the TempDir drops
        }
    }
}
