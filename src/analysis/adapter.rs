//! Response adapter: raw JSON to [`AnalysisResult`]
//!
//! Shape detection is by marker field, checked in this order:
//!
//! 1. `error` present (and not null) → [`AnalysisResult::Error`]
//! 2. `polarity` present → [`AnalysisResult::Structured`]
//! 3. `入力された文章` present → [`AnalysisResult::Flat`]
//!
//! Anything else is a [`ShapeError`].

use super::{
    AnalysisResult, Degree, Emotion, EmotionBlock, EmotionScore, ErrorResult, FlatResult, Polarity,
    PolarityBlock, Prediction, StructuredResult,
};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

/// Key carrying the input text in the legacy flat shape.
pub const FLAT_TEXT_KEY: &str = "入力された文章";

#[derive(Debug, Error)]
pub enum ShapeError {
    #[error("response is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("response is not a JSON object")]
    NotAnObject,

    #[error("response matches no known result shape")]
    Unrecognized,
}

#[derive(Deserialize)]
struct WireLabelled {
    label: Option<String>,
    ja: Option<String>,
    icon: Option<String>,
    prob: f64,
    degree: Option<String>,
}

impl WireLabelled {
    fn degree(&self) -> String {
        self.degree
            .clone()
            .unwrap_or_else(|| Degree::from_prob(self.prob).label().to_string())
    }

    fn spellings(&self) -> impl Iterator<Item = &str> {
        self.label.as_deref().into_iter().chain(self.ja.as_deref())
    }

    fn into_prediction(self) -> Prediction {
        let polarity = self.spellings().find_map(Polarity::from_label);
        let degree = self.degree();
        let label = self
            .ja
            .or(self.label)
            .or_else(|| polarity.map(|p| p.ja().to_string()))
            .unwrap_or_default();

        Prediction {
            label,
            polarity,
            icon: self.icon,
            prob: self.prob,
            degree,
        }
    }

    fn into_emotion_score(self) -> Option<EmotionScore> {
        let Some(emotion) = self.spellings().find_map(Emotion::from_label) else {
            debug!(label = ?self.label, ja = ?self.ja, "skipping unknown emotion label");
            return None;
        };
        let degree = self.degree();

        Some(EmotionScore {
            emotion,
            icon: self.icon,
            prob: self.prob,
            degree,
        })
    }
}

#[derive(Deserialize)]
struct WirePolarity {
    pred: WireLabelled,
    #[serde(default)]
    detail: Vec<WireLabelled>,
}

#[derive(Deserialize, Default)]
struct WireEmotion {
    #[serde(default)]
    detail: Vec<WireLabelled>,
}

#[derive(Deserialize)]
struct WireStructured {
    #[serde(default)]
    text: String,
    polarity: WirePolarity,
    #[serde(default)]
    emotion: WireEmotion,
}

/// Convert a decoded response body into the tagged union.
pub fn adapt(value: Value) -> Result<AnalysisResult, ShapeError> {
    let Value::Object(map) = value else {
        return Err(ShapeError::NotAnObject);
    };

    if let Some(error) = map.get("error").filter(|v| !v.is_null()) {
        let message = match error {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        return Ok(AnalysisResult::Error(ErrorResult { message }));
    }

    if map.contains_key("polarity") {
        let wire: WireStructured = serde_json::from_value(Value::Object(map))?;
        return Ok(AnalysisResult::Structured(structured(wire)));
    }

    if map.contains_key(FLAT_TEXT_KEY) {
        return Ok(AnalysisResult::Flat(flat(map)));
    }

    Err(ShapeError::Unrecognized)
}

fn structured(wire: WireStructured) -> StructuredResult {
    StructuredResult {
        text: wire.text,
        polarity: PolarityBlock {
            pred: wire.polarity.pred.into_prediction(),
            detail: wire
                .polarity
                .detail
                .into_iter()
                .map(WireLabelled::into_prediction)
                .collect(),
        },
        emotion: EmotionBlock {
            detail: wire
                .emotion
                .detail
                .into_iter()
                .filter_map(WireLabelled::into_emotion_score)
                .collect(),
        },
    }
}

fn flat(map: Map<String, Value>) -> FlatResult {
    let mut text = String::new();
    let mut scores = BTreeMap::new();

    for (key, value) in map {
        if key == FLAT_TEXT_KEY {
            text = display_value(value);
            continue;
        }
        match Emotion::from_label(&key) {
            Some(emotion) => {
                scores.entry(emotion).or_insert_with(|| display_value(value));
            }
            None => debug!(%key, "ignoring unknown field in flat result"),
        }
    }

    FlatResult { text, scores }
}

fn display_value(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}
