//! Qualitative degree labels for probabilities

use serde::Serialize;
use std::fmt;

/// How strongly a prediction holds, bucketed from its probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Degree {
    VeryStrong,
    Strong,
    Moderate,
    Weak,
    VeryWeak,
}

impl Degree {
    pub fn from_prob(prob: f64) -> Self {
        if prob >= 0.85 {
            Degree::VeryStrong
        } else if prob >= 0.70 {
            Degree::Strong
        } else if prob >= 0.55 {
            Degree::Moderate
        } else if prob >= 0.40 {
            Degree::Weak
        } else {
            Degree::VeryWeak
        }
    }

    /// Display label, in the same vocabulary the backend uses.
    pub fn label(self) -> &'static str {
        match self {
            Degree::VeryStrong => "とても",
            Degree::Strong => "かなり",
            Degree::Moderate => "やや",
            Degree::Weak => "弱め",
            Degree::VeryWeak => "ごく弱い",
        }
    }
}

impl fmt::Display for Degree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
