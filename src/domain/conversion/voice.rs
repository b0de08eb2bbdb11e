use super::language::LanguageCode;
use serde::{Deserialize, Serialize};

/// Inclusive range speed multipliers are clamped to
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedRange {
    pub min: f32,
    pub max: f32,
}

impl Default for SpeedRange {
    fn default() -> Self {
        Self { min: 0.5, max: 2.0 }
    }
}

impl SpeedRange {
    /// Clamp a requested speed; missing or non-finite values mean normal speed
    pub fn clamp(&self, requested: Option<f32>) -> f32 {
        match requested {
            Some(speed) if speed.is_finite() => speed.clamp(self.min, self.max),
            _ => 1.0_f32.clamp(self.min, self.max),
        }
    }
}

/// Normalized voice parameters handed to a synthesizer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceSpec {
    pub voice: String,
    pub language: LanguageCode,
    pub speed: f32,
}

/// One voice a synthesis backend offers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogVoice {
    pub id: &'static str,
    pub language: LanguageCode,
}

impl CatalogVoice {
    pub const fn new(id: &'static str, language: LanguageCode) -> Self {
        Self { id, language }
    }
}

/// Case-insensitive lookup of a requested voice id in a backend's catalog
pub fn match_voice(requested: &str, catalog: &[CatalogVoice]) -> Option<CatalogVoice> {
    let requested = requested.trim();
    catalog
        .iter()
        .copied()
        .find(|voice| voice.id.eq_ignore_ascii_case(requested))
}

/// First catalog voice for a language; catalogs list each language's default first
pub fn default_voice(language: LanguageCode, catalog: &[CatalogVoice]) -> Option<CatalogVoice> {
    catalog.iter().copied().find(|voice| voice.language == language)
}

/// Pick the voice for a request.
///
/// An exact catalog id wins, then a bare language code (`"pt"`, `"en-US"`).
/// Anything else falls back to the default voice of `language()`, which is
/// only evaluated when needed.
pub fn resolve_voice(
    requested: Option<&str>,
    language: impl FnOnce() -> LanguageCode,
    catalog: &[CatalogVoice],
) -> Option<CatalogVoice> {
    if let Some(requested) = requested.map(str::trim).filter(|r| !r.is_empty()) {
        if let Some(voice) = match_voice(requested, catalog) {
            return Some(voice);
        }
        if let Some(voice) =
            LanguageCode::from_code(requested).and_then(|code| default_voice(code, catalog))
        {
            return Some(voice);
        }
        tracing::warn!(requested, "Unknown voice, falling back to language default");
    }

    default_voice(language(), catalog).or_else(|| catalog.first().copied())
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &[CatalogVoice] = &[
        CatalogVoice::new("Joanna", LanguageCode::English),
        CatalogVoice::new("Matthew", LanguageCode::English),
        CatalogVoice::new("Camila", LanguageCode::Portuguese),
        CatalogVoice::new("Vitoria", LanguageCode::Portuguese),
    ];

    #[test]
    fn test_speed_is_clamped_to_range() {
        let range = SpeedRange::default();
        assert_eq!(range.clamp(Some(5.0)), 2.0);
        assert_eq!(range.clamp(Some(0.1)), 0.5);
        assert_eq!(range.clamp(Some(1.25)), 1.25);
    }

    #[test]
    fn test_missing_or_invalid_speed_is_normal() {
        let range = SpeedRange::default();
        assert_eq!(range.clamp(None), 1.0);
        assert_eq!(range.clamp(Some(f32::NAN)), 1.0);
        assert_eq!(range.clamp(Some(f32::INFINITY)), 1.0);

        let fast_only = SpeedRange { min: 1.5, max: 3.0 };
        assert_eq!(fast_only.clamp(None), 1.5);
    }

    #[test]
    fn test_match_voice_ignores_case() {
        assert_eq!(match_voice("camila", CATALOG).map(|v| v.id), Some("Camila"));
        assert_eq!(match_voice(" JOANNA ", CATALOG).map(|v| v.id), Some("Joanna"));
        assert_eq!(match_voice("pt-BR-FranciscaNeural", CATALOG), None);
    }

    #[test]
    fn test_resolve_prefers_requested_voice() {
        let voice = resolve_voice(Some("vitoria"), || LanguageCode::English, CATALOG).unwrap();
        assert_eq!(voice.id, "Vitoria");
        assert_eq!(voice.language, LanguageCode::Portuguese);
    }

    #[test]
    fn test_resolve_accepts_language_codes() {
        let voice = resolve_voice(Some("pt-BR"), || LanguageCode::English, CATALOG).unwrap();
        assert_eq!(voice.id, "Camila");
    }

    #[test]
    fn test_resolve_unknown_voice_falls_back_to_language_default() {
        let voice = resolve_voice(Some("Hal9000"), || LanguageCode::English, CATALOG).unwrap();
        assert_eq!(voice.id, "Joanna");

        let voice = resolve_voice(None, || LanguageCode::Portuguese, CATALOG).unwrap();
        assert_eq!(voice.id, "Camila");
    }

    #[test]
    fn test_resolve_language_without_voices_uses_first_entry() {
        let voice = resolve_voice(None, || LanguageCode::German, CATALOG).unwrap();
        assert_eq!(voice.id, "Joanna");
        assert_eq!(resolve_voice(None, || LanguageCode::German, &[]), None);
    }

    #[test]
    fn test_resolve_skips_detection_for_known_voice() {
        let voice = resolve_voice(
            Some("Matthew"),
            || panic!("language should not be detected"),
            CATALOG,
        );
        assert_eq!(voice.map(|v| v.id), Some("Matthew"));
    }
}
