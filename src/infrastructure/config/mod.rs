use crate::domain::conversion::{ConversionSettings, LanguageCode, SpeedRange};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub environment: Environment,
    pub log_format: LogFormat,
    pub tts_backend: TtsBackend,
    pub aws_region: String,
    pub openai_api_key: Option<String>,
    pub openai_tts_model: String,
    pub espeak_binary: String,
    /// Unset means a temp dir removed at shutdown
    pub storage_dir: Option<PathBuf>,
    pub max_upload_bytes: usize,
    pub allowed_extensions: Vec<String>,
    pub chunk_max_chars: usize,
    pub min_text_chars: usize,
    pub speed_min: f32,
    pub speed_max: f32,
    pub default_language: LanguageCode,
    pub inter_chunk_silence_ms: u32,
    pub synthesis_concurrency: usize,
    /// Artifact retention in seconds, 0 keeps artifacts until cleanup
    pub artifact_ttl_secs: u64,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Speech engine behind the synthesizer
#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum TtsBackend {
    Espeak,
    Polly,
    OpenAi,
}

impl FromStr for TtsBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "espeak" | "espeak-ng" | "local" => Ok(Self::Espeak),
            "polly" => Ok(Self::Polly),
            "openai" => Ok(Self::OpenAi),
            other => Err(format!(
                "TTS_BACKEND must be one of espeak, polly, openai (got '{}')",
                other
            )),
        }
    }
}

type ConfigResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Parse `name` when set, `default` otherwise
fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: T) -> ConfigResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| format!("invalid value '{}' for {}: {}", raw, name, e).into()),
        None => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> ConfigResult<Self> {
        dotenvy::dotenv().ok();

        Self::from_lookup(|name| env::var(name).ok().filter(|v| !v.is_empty()))
    }

    /// Build the configuration from any variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ConfigResult<Self> {
        let defaults = ConversionSettings::default();

        let default_language = match lookup("DEFAULT_LANGUAGE") {
            Some(code) => LanguageCode::from_code(&code)
                .ok_or_else(|| format!("unsupported DEFAULT_LANGUAGE '{}'", code))?,
            None => defaults.default_language,
        };

        let config = Config {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_var(&lookup, "PORT", 5000)?,
            environment: match lookup("ENVIRONMENT").as_deref() {
                Some("production") => Environment::Production,
                _ => Environment::Development,
            },
            log_format: match lookup("LOG_FORMAT").as_deref() {
                Some("json") => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
            tts_backend: parse_var(&lookup, "TTS_BACKEND", TtsBackend::Espeak)?,
            aws_region: lookup("AWS_REGION").unwrap_or_else(|| "us-east-1".to_string()),
            openai_api_key: lookup("OPENAI_API_KEY"),
            openai_tts_model: lookup("OPENAI_TTS_MODEL").unwrap_or_else(|| "tts-1".to_string()),
            espeak_binary: lookup("ESPEAK_BINARY").unwrap_or_else(|| "espeak-ng".to_string()),
            storage_dir: lookup("STORAGE_DIR").map(PathBuf::from),
            max_upload_bytes: parse_var(&lookup, "MAX_UPLOAD_BYTES", defaults.max_upload_bytes)?,
            allowed_extensions: match lookup("ALLOWED_EXTENSIONS") {
                Some(list) => list
                    .split(',')
                    .map(|ext| ext.trim().trim_start_matches('.').to_lowercase())
                    .filter(|ext| !ext.is_empty())
                    .collect(),
                None => defaults.allowed_extensions,
            },
            chunk_max_chars: parse_var(&lookup, "CHUNK_MAX_CHARS", defaults.chunk_max_chars)?,
            min_text_chars: parse_var(&lookup, "MIN_TEXT_CHARS", defaults.min_text_chars)?,
            speed_min: parse_var(&lookup, "SPEED_MIN", defaults.speed_range.min)?,
            speed_max: parse_var(&lookup, "SPEED_MAX", defaults.speed_range.max)?,
            default_language,
            inter_chunk_silence_ms: parse_var(
                &lookup,
                "INTER_CHUNK_SILENCE_MS",
                defaults.inter_chunk_silence_ms,
            )?,
            synthesis_concurrency: parse_var(
                &lookup,
                "SYNTHESIS_CONCURRENCY",
                defaults.synthesis_concurrency,
            )?,
            artifact_ttl_secs: parse_var(&lookup, "ARTIFACT_TTL_SECS", 0)?,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> ConfigResult<()> {
        if !(self.speed_min.is_finite() && self.speed_max.is_finite())
            || self.speed_min <= 0.0
            || self.speed_min > self.speed_max
        {
            return Err(format!(
                "SPEED_MIN ({}) must be positive and not above SPEED_MAX ({})",
                self.speed_min, self.speed_max
            )
            .into());
        }

        if self.chunk_max_chars == 0 {
            return Err("CHUNK_MAX_CHARS must be greater than 0".into());
        }

        if self.synthesis_concurrency == 0 {
            return Err("SYNTHESIS_CONCURRENCY must be greater than 0".into());
        }

        if self.allowed_extensions.is_empty() {
            return Err("ALLOWED_EXTENSIONS must name at least one extension".into());
        }

        if self.tts_backend == TtsBackend::OpenAi && self.openai_api_key.is_none() {
            return Err("OPENAI_API_KEY is required when TTS_BACKEND=openai".into());
        }

        Ok(())
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }

    /// Log filter used when `RUST_LOG` is unset
    pub fn default_log_filter(&self) -> &'static str {
        if self.is_development() {
            "docvoice_backend=debug,tower_http=debug"
        } else {
            "docvoice_backend=info,tower_http=info"
        }
    }

    pub fn conversion_settings(&self) -> ConversionSettings {
        ConversionSettings {
            max_upload_bytes: self.max_upload_bytes,
            allowed_extensions: self.allowed_extensions.clone(),
            chunk_max_chars: self.chunk_max_chars,
            speed_range: SpeedRange {
                min: self.speed_min,
                max: self.speed_max,
            },
            min_text_chars: self.min_text_chars,
            inter_chunk_silence_ms: self.inter_chunk_silence_ms,
            synthesis_concurrency: self.synthesis_concurrency,
            default_language: self.default_language,
        }
    }
}
