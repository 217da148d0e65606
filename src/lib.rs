//! Sentiview - front end for a text/image sentiment-analysis service
//!
//! Sentiview collects text or an image, sends it to an analysis backend
//! (`POST /analyze` or `POST /analyze_image`), and renders the response.
//! The backend does the actual classification; this crate owns the
//! contract around it.
//!
//! # Overview
//!
//! The backend's response format changed several times without versioning.
//! Every response is run through [`analysis::adapt`] into one tagged union,
//! [`AnalysisResult`], and rendering works from that union only.
//!
//! # Quick Start
//!
//! ```no_run
//! use sentiview::{Config, Dispatcher, HttpTransport, AnalysisResult};
//!
//! let transport = HttpTransport::new(Config::new("http://127.0.0.1:5000")).unwrap();
//! let mut dispatcher = Dispatcher::new(transport);
//!
//! let mut input = String::from("今日は最高の気分！");
//! match dispatcher.submit_text(&mut input) {
//!     Ok(AnalysisResult::Error(e)) => println!("Backend said: {}", e.message),
//!     Ok(result) => println!("{}", sentiview::report::text::render(&result)),
//!     Err(e) => println!("{}", e.user_message()),
//! }
//! ```
//!
//! # Result Shapes
//!
//! | Variant | Rendered as |
//! |---------|-------------|
//! | Structured | input text, 8 emotions, polarity prediction and breakdown |
//! | Flat (legacy) | input text, 8 raw emotion scores |
//! | Error | the message only |
//!
//! # Modules
//!
//! - [`analysis`]: result types, label catalogues and the response adapter
//! - [`dispatch`]: input validation, in-flight guard and transports
//! - [`staging`]: drop-zone state machine and image previews
//! - [`report`]: HTML, text and JSON renderers

pub mod analysis;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod report;
pub mod staging;

pub use analysis::{AnalysisResult, Degree, Emotion, Polarity};
pub use config::Config;
#[cfg(feature = "client")]
pub use dispatch::http::HttpTransport;
pub use dispatch::{AnalysisRequest, Dispatcher, Flight, Transport};
pub use error::{Action, NetworkError, SubmitError, ValidationError};
pub use report::percent_format;
pub use staging::{DropZone, ImageSource, StagedImage, ZoneState};

#[cfg(test)]
mod tests {
    use super::*;

    // ==========================================================================
    // PUBLIC API TESTS
    // ==========================================================================
    //
    // These tests verify the public API surface is correct and documented.
    // ==========================================================================

    #[test]
    fn test_public_exports() {
        assert_eq!(Emotion::ALL.len(), 8);
        assert_eq!(Emotion::ALL[0], Emotion::Joy);
        assert_eq!(Polarity::Positive.to_string(), "positive");

        let zone: DropZone<StagedImage> = DropZone::new();
        assert_eq!(zone.state(), ZoneState::Idle);
        assert!(!zone.can_submit());

        assert_eq!(Config::default().url("/analyze"), "http://127.0.0.1:5000/analyze");
    }

    #[test]
    fn test_render_from_crate_root() {
        let result = AnalysisResult::from_json(
            r#"{"text":"hello","polarity":{"pred":{"label":"positive","prob":0.8,"degree":"strong"},"detail":[]},"emotion":{"detail":[]}}"#,
        )
        .unwrap();
        let html = report::html::render(&result, None);
        for needle in ["hello", "positive", "80.0%", "strong"] {
            assert!(html.contains(needle), "missing {}", needle);
        }
        assert_eq!(percent_format(0.3333), "33.3%");
    }

    #[test]
    fn test_zone_walks_through_states() {
        let mut zone: DropZone<StagedImage> = DropZone::new();
        assert_eq!(zone.state(), ZoneState::Idle);

        zone.stage(StagedImage::new("a.png", "image/png", vec![0])).unwrap();
        assert_eq!(zone.state(), ZoneState::FileStaged);

        zone.take_for_submit().unwrap();
        assert_eq!(zone.state(), ZoneState::Submitting);

        zone.finish(false);
        assert_eq!(zone.state(), ZoneState::Errored);

        zone.stage(StagedImage::new("b.png", "image/png", vec![0])).unwrap();
        zone.take_for_submit().unwrap();
        zone.finish(true);
        assert_eq!(zone.state(), ZoneState::Rendered);
    }
}
