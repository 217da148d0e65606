//! Fixed label catalogues for emotions and polarity
//!
//! The backend has shipped several label vocabularies over time: English keys
//! (`joy`), Japanese display names (`喜び`) and the raw classifier indices
//! (`LABEL_0`). Everything is resolved onto the enums here so the renderer
//! only ever deals with one canonical set.

use serde::{Serialize, Serializer};
use std::fmt;

/// The 8 basic emotions, declared in canonical display order.
///
/// `Ord` follows declaration order, so sorting or a `BTreeMap<Emotion, _>`
/// yields rows in the order they are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Emotion {
    Joy,
    Sadness,
    Anger,
    Surprise,
    Fear,
    Disgust,
    Trust,
    Anticipation,
}

impl Emotion {
    /// Canonical display order.
    pub const ALL: [Emotion; 8] = [
        Emotion::Joy,
        Emotion::Sadness,
        Emotion::Anger,
        Emotion::Surprise,
        Emotion::Fear,
        Emotion::Disgust,
        Emotion::Trust,
        Emotion::Anticipation,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Emotion::Joy => "joy",
            Emotion::Sadness => "sadness",
            Emotion::Anger => "anger",
            Emotion::Surprise => "surprise",
            Emotion::Fear => "fear",
            Emotion::Disgust => "disgust",
            Emotion::Trust => "trust",
            Emotion::Anticipation => "anticipation",
        }
    }

    pub fn ja(self) -> &'static str {
        match self {
            Emotion::Joy => "喜び",
            Emotion::Sadness => "悲しみ",
            Emotion::Anger => "怒り",
            Emotion::Surprise => "驚き",
            Emotion::Fear => "恐怖",
            Emotion::Disgust => "嫌悪",
            Emotion::Trust => "信頼",
            Emotion::Anticipation => "期待",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Emotion::Joy => "😊",
            Emotion::Sadness => "😢",
            Emotion::Anger => "😠",
            Emotion::Surprise => "😲",
            Emotion::Fear => "😨",
            Emotion::Disgust => "🤢",
            Emotion::Trust => "🤝",
            Emotion::Anticipation => "✨",
        }
    }

    /// Classifier output index (`LABEL_<n>`). This is the model's own
    /// ordering and differs from the display order.
    fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Emotion::Joy),
            1 => Some(Emotion::Sadness),
            2 => Some(Emotion::Anticipation),
            3 => Some(Emotion::Surprise),
            4 => Some(Emotion::Anger),
            5 => Some(Emotion::Fear),
            6 => Some(Emotion::Disgust),
            7 => Some(Emotion::Trust),
            _ => None,
        }
    }

    /// Resolve any of the known label spellings.
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();

        if let Some(index) = label.strip_prefix("LABEL_") {
            return index.parse().ok().and_then(Self::from_index);
        }

        Self::ALL
            .into_iter()
            .find(|e| e.key().eq_ignore_ascii_case(label) || e.ja() == label)
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl Serialize for Emotion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.key())
    }
}

/// Sentiment polarity classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Polarity {
    Negative,
    Neutral,
    Positive,
}

impl Polarity {
    pub const ALL: [Polarity; 3] = [Polarity::Negative, Polarity::Neutral, Polarity::Positive];

    pub fn key(self) -> &'static str {
        match self {
            Polarity::Negative => "negative",
            Polarity::Neutral => "neutral",
            Polarity::Positive => "positive",
        }
    }

    pub fn ja(self) -> &'static str {
        match self {
            Polarity::Negative => "ネガティブ",
            Polarity::Neutral => "ニュートラル",
            Polarity::Positive => "ポジティブ",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Polarity::Negative => "😞",
            Polarity::Neutral => "😐",
            Polarity::Positive => "😄",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|p| p.key().eq_ignore_ascii_case(label) || p.ja() == label)
    }
}

impl fmt::Display for Polarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl Serialize for Polarity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.key())
    }
}
