//! The analysis result contract
//!
//! The backend has returned three incompatible shapes over its lifetime.
//! They are modelled as one tagged union, [`AnalysisResult`], and every
//! response passes through [`adapter`] at the network boundary so nothing
//! downstream reads raw JSON fields.
//!
//! | Variant | Wire shape |
//! |---------|------------|
//! | `Structured` | `{ text, polarity: { pred, detail }, emotion: { detail } }` |
//! | `Flat` | `{ "入力された文章": text, "<emotion>": score, ... }` (legacy) |
//! | `Error` | `{ error }` |

pub mod adapter;
pub mod catalogue;
pub mod degree;

pub use adapter::{adapt, ShapeError, FLAT_TEXT_KEY};
pub use catalogue::{Emotion, Polarity};
pub use degree::Degree;

use serde::Serialize;
use std::collections::BTreeMap;

/// A decoded backend response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnalysisResult {
    Structured(StructuredResult),
    Flat(FlatResult),
    Error(ErrorResult),
}

impl AnalysisResult {
    /// Decode a raw response body.
    pub fn from_json(body: &str) -> Result<Self, ShapeError> {
        let value: serde_json::Value = serde_json::from_str(body)?;
        adapt(value)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, AnalysisResult::Error(_))
    }

    /// The analysed text, if the result carries one.
    pub fn text(&self) -> Option<&str> {
        match self {
            AnalysisResult::Structured(s) => Some(&s.text),
            AnalysisResult::Flat(f) => Some(&f.text),
            AnalysisResult::Error(_) => None,
        }
    }
}

/// Canonical response shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructuredResult {
    pub text: String,
    pub polarity: PolarityBlock,
    pub emotion: EmotionBlock,
}

impl StructuredResult {
    /// Exactly one row per emotion, in canonical order.
    ///
    /// Emotions the payload did not mention come back with probability 0.
    /// If the payload repeats an emotion, the first occurrence wins.
    pub fn emotion_rows(&self) -> Vec<EmotionScore> {
        Emotion::ALL
            .into_iter()
            .map(|emotion| {
                self.emotion
                    .detail
                    .iter()
                    .find(|s| s.emotion == emotion)
                    .cloned()
                    .unwrap_or_else(|| EmotionScore::missing(emotion))
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolarityBlock {
    pub pred: Prediction,
    pub detail: Vec<Prediction>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmotionBlock {
    pub detail: Vec<EmotionScore>,
}

/// One polarity class with its probability.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    /// Label exactly as the backend sent it (English key or Japanese name).
    pub label: String,
    /// Resolved class, if the label is one we know.
    pub polarity: Option<Polarity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub prob: f64,
    pub degree: String,
}

impl Prediction {
    /// Icon sent by the backend, falling back to the catalogue icon.
    pub fn icon(&self) -> &str {
        match (&self.icon, self.polarity) {
            (Some(icon), _) => icon,
            (None, Some(p)) => p.icon(),
            (None, None) => "",
        }
    }
}

/// One emotion with its probability.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmotionScore {
    pub emotion: Emotion,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub prob: f64,
    pub degree: String,
}

impl EmotionScore {
    fn missing(emotion: Emotion) -> Self {
        Self {
            emotion,
            icon: None,
            prob: 0.0,
            degree: Degree::from_prob(0.0).label().to_string(),
        }
    }

    pub fn icon(&self) -> &str {
        self.icon.as_deref().unwrap_or_else(|| self.emotion.icon())
    }
}

/// Legacy response: raw per-emotion scores keyed by emotion.
///
/// Scores are kept as display strings because older backends sent either
/// integers or strings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlatResult {
    pub text: String,
    pub scores: BTreeMap<Emotion, String>,
}

impl FlatResult {
    /// One `(emotion, score)` pair per emotion, in canonical order.
    pub fn rows(&self) -> Vec<(Emotion, &str)> {
        Emotion::ALL
            .into_iter()
            .map(|e| (e, self.scores.get(&e).map(String::as_str).unwrap_or("0")))
            .collect()
    }
}

/// The backend accepted the request but reported a failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorResult {
    pub message: String,
}
