//! Error types for submitting an analysis
//!
//! Three failure classes reach the user:
//!
//! - [`ValidationError`]: bad input, caught before any request is sent
//! - [`NetworkError`]: non-2xx status, transport failure or undecodable body
//! - server-reported errors, which are not errors here at all but the
//!   [`AnalysisResult::Error`](crate::AnalysisResult::Error) variant, shown verbatim
//!
//! None of them are retried.

use std::fmt;
use thiserror::Error;

/// Which submit action an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Text,
    Image,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Text => write!(f, "text"),
            Action::Image => write!(f, "image"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("input text is empty")]
    EmptyText,

    #[error("no image file selected")]
    NoImage,

    #[error("'{name}' is not an image (type: {mime})")]
    NotAnImage { name: String, mime: String },
}

impl ValidationError {
    /// Message shown to the user.
    pub fn user_message(&self) -> &'static str {
        match self {
            ValidationError::EmptyText => "文章を入力してください。",
            ValidationError::NoImage | ValidationError::NotAnImage { .. } => {
                "画像ファイルを選択してください。"
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("server responded with HTTP {0}")]
    Status(u16),

    #[error("request failed: {0}")]
    Transport(String),

    #[error("could not decode response: {0}")]
    Decode(String),
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{action} analysis failed: {source}")]
    Network {
        action: Action,
        #[source]
        source: NetworkError,
    },

    #[error("a {0} analysis is already in progress")]
    InFlight(Action),
}

impl SubmitError {
    /// Localized message for display. Network detail is not included;
    /// it only goes to the log.
    pub fn user_message(&self) -> &'static str {
        match self {
            SubmitError::Validation(e) => e.user_message(),
            SubmitError::Network { action: Action::Text, .. } => {
                "テキスト分析中にエラーが発生しました。"
            }
            SubmitError::Network { action: Action::Image, .. } => {
                "画像分析中にエラーが発生しました。"
            }
            SubmitError::InFlight(_) => "分析中です。しばらくお待ちください。",
        }
    }
}
