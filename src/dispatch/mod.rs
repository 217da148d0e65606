//! Request dispatch
//!
//! [`Dispatcher`] validates input, sends exactly one request through a
//! [`Transport`], and adapts the response at the boundary. Input controls
//! are cleared as soon as a request is dispatched so the same payload cannot
//! be sent twice by accident.
//!
//! Natively a submit borrows the dispatcher mutably and blocks until the
//! response is in, so text submits cannot overlap; images additionally go
//! through the zone's `Submitting` state. The browser front end does its own
//! `fetch`, where handlers can interleave across `.await`, and guards text
//! submits with a [`Flight`]. It also reuses [`validate_text`] and
//! [`decode_response`] from here.

#[cfg(feature = "client")]
pub mod http;

use crate::analysis::AnalysisResult;
use crate::error::{Action, NetworkError, SubmitError, ValidationError};
use crate::staging::{DropZone, StagedImage};
use serde_json::{json, Value};
use tracing::{info, warn};

pub const ANALYZE_TEXT_PATH: &str = "/analyze";
pub const ANALYZE_IMAGE_PATH: &str = "/analyze_image";
/// Multipart field carrying the image.
pub const IMAGE_FIELD: &str = "image_file";

#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisRequest {
    Text { text: String },
    Image(StagedImage),
}

impl AnalysisRequest {
    pub fn path(&self) -> &'static str {
        match self {
            AnalysisRequest::Text { .. } => ANALYZE_TEXT_PATH,
            AnalysisRequest::Image(_) => ANALYZE_IMAGE_PATH,
        }
    }

    pub fn action(&self) -> Action {
        match self {
            AnalysisRequest::Text { .. } => Action::Text,
            AnalysisRequest::Image(_) => Action::Image,
        }
    }
}

/// JSON body for `POST /analyze`.
pub fn text_body(text: &str) -> Value {
    json!({ "text": text })
}

pub fn validate_text(text: &str) -> Result<(), ValidationError> {
    if text.trim().is_empty() {
        return Err(ValidationError::EmptyText);
    }
    Ok(())
}

/// Adapt a successful response body, treating an unknown shape as a
/// network-level failure.
pub fn decode_response(action: Action, body: Value) -> Result<AnalysisResult, SubmitError> {
    crate::analysis::adapt(body).map_err(|e| SubmitError::Network {
        action,
        source: NetworkError::Decode(e.to_string()),
    })
}

/// Sends one request and returns the decoded JSON body.
///
/// Implementations must map any non-2xx status to [`NetworkError::Status`]
/// without reading the body.
pub trait Transport {
    fn send(&self, request: &AnalysisRequest) -> Result<Value, NetworkError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(&self, request: &AnalysisRequest) -> Result<Value, NetworkError> {
        (**self).send(request)
    }
}

/// Per-action `Idle/Submitting` guard.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Flight {
    submitting: bool,
}

impl Flight {
    pub fn begin(&mut self, action: Action) -> Result<(), SubmitError> {
        if self.submitting {
            warn!(%action, "ignoring submit while a request is in flight");
            return Err(SubmitError::InFlight(action));
        }
        self.submitting = true;
        Ok(())
    }

    pub fn end(&mut self) {
        self.submitting = false;
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }
}

/// Result of an image submission, with the preview that was staged
/// alongside the file.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageOutcome {
    pub result: AnalysisResult,
    pub preview: Option<String>,
}

pub struct Dispatcher<T> {
    transport: T,
}

impl<T: Transport> Dispatcher<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Validate and send the text box contents. The box is emptied once
    /// the request is dispatched; on validation failure it is left alone.
    pub fn submit_text(&mut self, input: &mut String) -> Result<AnalysisResult, SubmitError> {
        validate_text(input)?;

        let text = std::mem::take(input);
        info!(chars = text.chars().count(), "submitting text for analysis");
        self.exchange(&AnalysisRequest::Text { text })
    }

    /// Send the staged image. The zone's slot is emptied on dispatch and
    /// its state updated with the outcome.
    pub fn submit_image(
        &mut self,
        zone: &mut DropZone<StagedImage>,
    ) -> Result<ImageOutcome, SubmitError> {
        let submission = zone.take_for_submit()?;
        info!(
            name = %submission.file.name,
            bytes = submission.file.bytes.len(),
            "submitting image for analysis"
        );

        let outcome = self.exchange(&AnalysisRequest::Image(submission.file));
        zone.finish(outcome.is_ok());

        outcome.map(|result| ImageOutcome {
            result,
            preview: submission.preview,
        })
    }

    fn exchange(&self, request: &AnalysisRequest) -> Result<AnalysisResult, SubmitError> {
        let action = request.action();
        let body = self.transport.send(request).map_err(|source| {
            warn!(%action, error = %source, "analysis request failed");
            SubmitError::Network { action, source }
        })?;

        let result = decode_response(action, body)?;
        if let AnalysisResult::Error(ref e) = result {
            warn!(%action, message = %e.message, "backend reported an error");
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::staging::ZoneState;
    use std::cell::RefCell;

    enum Reply {
        Json(Value),
        Status(u16),
    }

    struct FakeTransport {
        reply: Reply,
        sent: RefCell<Vec<AnalysisRequest>>,
    }

    impl FakeTransport {
        fn replying(reply: Reply) -> Self {
            Self {
                reply,
                sent: RefCell::new(Vec::new()),
            }
        }

        fn sent(&self) -> usize {
            self.sent.borrow().len()
        }
    }

    impl Transport for FakeTransport {
        fn send(&self, request: &AnalysisRequest) -> Result<Value, NetworkError> {
            self.sent.borrow_mut().push(request.clone());
            match &self.reply {
                Reply::Json(v) => Ok(v.clone()),
                Reply::Status(code) => Err(NetworkError::Status(*code)),
            }
        }
    }

    fn structured_reply() -> Value {
        json!({
            "text": "hello",
            "polarity": {"pred": {"label": "positive", "prob": 0.8, "degree": "strong"}, "detail": []},
            "emotion": {"detail": []}
        })
    }

    // ==========================================================================
    // TEXT SUBMISSION TESTS
    // ==========================================================================

    #[test]
    fn test_blank_text_sends_nothing() {
        let transport = FakeTransport::replying(Reply::Json(structured_reply()));
        let mut dispatcher = Dispatcher::new(&transport);

        for blank in ["", "   ", "\n\t  \n", "\u{3000}"] {
            let mut input = blank.to_string();
            let err = dispatcher.submit_text(&mut input).unwrap_err();
            assert!(matches!(err, SubmitError::Validation(ValidationError::EmptyText)));
            // Left alone so the user can fix it
            assert_eq!(input, blank);
        }
        assert_eq!(transport.sent(), 0);
    }

    #[test]
    fn test_text_is_sent_and_input_cleared() {
        let transport = FakeTransport::replying(Reply::Json(structured_reply()));
        let mut dispatcher = Dispatcher::new(&transport);

        let mut input = "hello".to_string();
        let result = dispatcher.submit_text(&mut input).unwrap();

        assert!(input.is_empty());
        assert_eq!(result.text(), Some("hello"));
        let sent = transport.sent.borrow();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0], AnalysisRequest::Text { text: "hello".to_string() });
        assert_eq!(sent[0].path(), "/analyze");
    }

    #[test]
    fn test_http_failure_is_network_error() {
        let transport = FakeTransport::replying(Reply::Status(500));
        let mut dispatcher = Dispatcher::new(&transport);

        let mut input = "hello".to_string();
        let err = dispatcher.submit_text(&mut input).unwrap_err();
        assert!(matches!(
            err,
            SubmitError::Network { action: Action::Text, source: NetworkError::Status(500) }
        ));
        // Cleared even though the request failed
        assert!(input.is_empty());
    }

    #[test]
    fn test_server_error_is_a_result() {
        let transport = FakeTransport::replying(Reply::Json(json!({"error": "解析に失敗しました"})));
        let mut dispatcher = Dispatcher::new(&transport);

        let mut input = "x".to_string();
        let result = dispatcher.submit_text(&mut input).unwrap();
        assert!(result.is_error());
    }

    #[test]
    fn test_unknown_shape_is_decode_error() {
        let transport = FakeTransport::replying(Reply::Json(json!({"unexpected": true})));
        let mut dispatcher = Dispatcher::new(&transport);

        let mut input = "x".to_string();
        let err = dispatcher.submit_text(&mut input).unwrap_err();
        assert!(matches!(
            err,
            SubmitError::Network { source: NetworkError::Decode(_), .. }
        ));
    }

    #[test]
    fn test_failed_submit_does_not_block_the_next() {
        let transport = FakeTransport::replying(Reply::Status(502));
        let mut dispatcher = Dispatcher::new(&transport);

        let mut first = "one".to_string();
        assert!(dispatcher.submit_text(&mut first).is_err());
        let mut second = "two".to_string();
        assert!(dispatcher.submit_text(&mut second).is_err());
        assert_eq!(transport.sent(), 2);
    }

    // ==========================================================================
    // FLIGHT GUARD TESTS
    // ==========================================================================

    #[test]
    fn test_flight_guard() {
        let mut flight = Flight::default();
        assert!(!flight.is_submitting());
        flight.begin(Action::Text).unwrap();
        assert!(flight.is_submitting());
        assert!(matches!(flight.begin(Action::Text), Err(SubmitError::InFlight(Action::Text))));
        flight.end();
        assert!(flight.begin(Action::Text).is_ok());
    }

    // ==========================================================================
    // IMAGE SUBMISSION TESTS
    // ==========================================================================

    #[test]
    fn test_image_without_file_sends_nothing() {
        let transport = FakeTransport::replying(Reply::Json(structured_reply()));
        let mut dispatcher = Dispatcher::new(&transport);
        let mut zone = DropZone::new();

        let err = dispatcher.submit_image(&mut zone).unwrap_err();
        assert!(matches!(err, SubmitError::Validation(ValidationError::NoImage)));
        assert_eq!(transport.sent(), 0);
    }

    #[test]
    fn test_image_submission_round() {
        let transport = FakeTransport::replying(Reply::Json(structured_reply()));
        let mut dispatcher = Dispatcher::new(&transport);
        let mut zone = DropZone::new();

        let image = StagedImage::new("photo.png", "image/png", vec![1, 2, 3]);
        let preview = image.data_url();
        let ticket = zone.stage(image).unwrap();
        zone.set_preview(ticket, preview.clone());

        let outcome = dispatcher.submit_image(&mut zone).unwrap();
        assert_eq!(outcome.preview, Some(preview));
        assert_eq!(zone.state(), ZoneState::Rendered);
        assert!(!zone.can_submit());

        let sent = transport.sent.borrow();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].path(), "/analyze_image");
        assert_eq!(sent[0].action(), Action::Image);
    }

    #[test]
    fn test_image_failure_marks_zone_errored() {
        let transport = FakeTransport::replying(Reply::Status(404));
        let mut dispatcher = Dispatcher::new(&transport);
        let mut zone = DropZone::new();
        zone.stage(StagedImage::new("p.jpg", "image/jpeg", vec![0])).unwrap();

        let err = dispatcher.submit_image(&mut zone).unwrap_err();
        assert_eq!(err.user_message(), "画像分析中にエラーが発生しました。");
        assert_eq!(zone.state(), ZoneState::Errored);
    }

    #[test]
    fn test_text_body() {
        assert_eq!(text_body("こんにちは"), json!({"text": "こんにちは"}));
    }
}
