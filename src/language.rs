//! Language detection and language-to-country inference.
//!
//! Detection is an injected capability: the mapper only sees the
//! [`LanguageDetector`] trait. The detector is built once per run and passed
//! by reference, so expensive models are never re-initialized per row.
//!
//! The country attached to a detected language is not global. Each rule
//! carries its own [`CountryTable`] because the output vocabularies disagree
//! (`en` maps to `US` in some and to `GB` in others).

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// A short language code such as `es` or `en`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LanguageCode(CompactString);

impl LanguageCode {
    pub fn new(code: &str) -> Self {
        Self(CompactString::new(code.trim().to_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PartialEq<&str> for LanguageCode {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

/// Capability to guess the language of a piece of text.
pub trait LanguageDetector {
    /// Detect the language of `text`; `None` when no language can be determined.
    fn detect(&self, text: &str) -> Option<LanguageCode>;
}

impl<T: LanguageDetector + ?Sized> LanguageDetector for &T {
    fn detect(&self, text: &str) -> Option<LanguageCode> {
        (**self).detect(text)
    }
}

/// Detector that never recognises anything, so every text falls back to the
/// base language of the schema.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDetection;

impl LanguageDetector for NoDetection {
    fn detect(&self, _text: &str) -> Option<LanguageCode> {
        None
    }
}

/// Statistical detector backed by `whatlang`.
///
/// Unreliable guesses (typically short titles) and languages without a
/// two-letter code count as undetected.
#[cfg(feature = "whatlang")]
#[derive(Debug, Clone, Copy, Default)]
pub struct WhatlangDetector;

#[cfg(feature = "whatlang")]
impl LanguageDetector for WhatlangDetector {
    fn detect(&self, text: &str) -> Option<LanguageCode> {
        let info = whatlang::detect(text)?;
        if !info.is_reliable() {
            tracing::debug!("Unreliable language guess '{}' ignored", info.lang().code());
            return None;
        }
        iso_639_1(info.lang().code()).map(LanguageCode::new)
    }
}

/// ISO 639-3 codes reported by `whatlang` and their ISO 639-1 equivalents.
const ISO_639_1: &[(&str, &str)] = &[
    ("afr", "af"), ("aka", "ak"), ("amh", "am"), ("ara", "ar"), ("aze", "az"),
    ("bel", "be"), ("ben", "bn"), ("bul", "bg"), ("cat", "ca"), ("ces", "cs"),
    ("cmn", "zh"), ("dan", "da"), ("deu", "de"), ("ell", "el"), ("eng", "en"),
    ("epo", "eo"), ("est", "et"), ("fin", "fi"), ("fra", "fr"), ("guj", "gu"),
    ("heb", "he"), ("hin", "hi"), ("hrv", "hr"), ("hun", "hu"), ("hye", "hy"),
    ("ind", "id"), ("ita", "it"), ("jav", "jv"), ("jpn", "ja"), ("kan", "kn"),
    ("kat", "ka"), ("khm", "km"), ("kor", "ko"), ("lat", "la"), ("lav", "lv"),
    ("lit", "lt"), ("mal", "ml"), ("mar", "mr"), ("mkd", "mk"), ("mya", "my"),
    ("nep", "ne"), ("nld", "nl"), ("nob", "nb"), ("ori", "or"), ("pan", "pa"),
    ("pes", "fa"), ("pol", "pl"), ("por", "pt"), ("ron", "ro"), ("rus", "ru"),
    ("sin", "si"), ("slk", "sk"), ("slv", "sl"), ("sna", "sn"), ("spa", "es"),
    ("srp", "sr"), ("swe", "sv"), ("tam", "ta"), ("tel", "te"), ("tgl", "tl"),
    ("tha", "th"), ("tuk", "tk"), ("tur", "tr"), ("ukr", "uk"), ("urd", "ur"),
    ("uzb", "uz"), ("vie", "vi"), ("yid", "yi"), ("zul", "zu"),
];

/// Two-letter code of a three-letter language code, if it has one.
#[cfg_attr(not(feature = "whatlang"), allow(dead_code))]
fn iso_639_1(code: &str) -> Option<&'static str> {
    ISO_639_1
        .iter()
        .find(|(long, _)| *long == code)
        .map(|(_, short)| *short)
}

/// Fixed language → country table, with an optional catch-all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountryTable {
    pub entries: &'static [(&'static str, &'static str)],
    /// Country for languages missing from `entries`; `None` leaves them without a country.
    pub otherwise: Option<&'static str>,
}

impl CountryTable {
    pub const fn new(
        entries: &'static [(&'static str, &'static str)],
        otherwise: Option<&'static str>,
    ) -> Self {
        Self { entries, otherwise }
    }

    /// Look up the country for a language.
    pub fn country_for(&self, language: &LanguageCode) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|(lang, _)| language == lang)
            .map(|(_, country)| *country)
            .or(self.otherwise)
    }
}

/// Determine the language of `text`.
///
/// Blank text resolves to `base` without calling the detector. A detection
/// failure, or a detected language outside `allowed`, also resolves to `base`.
pub fn resolve_language(
    detector: &dyn LanguageDetector,
    text: &str,
    base: &str,
    allowed: Option<&[&str]>,
) -> LanguageCode {
    if text.trim().is_empty() {
        return LanguageCode::new(base);
    }

    match detector.detect(text) {
        Some(code) if allowed.is_none_or(|allowed| allowed.contains(&code.as_str())) => code,
        Some(code) => {
            tracing::debug!("Detected language '{}' is not accepted, using '{}'", code, base);
            LanguageCode::new(base)
        }
        None => LanguageCode::new(base),
    }
}
