//! Image staging for the drop zone
//!
//! A [`DropZone`] holds at most one staged image and tracks where the image
//! flow is:
//!
//! ```text
//! Idle ─stage(valid)─▶ FileStaged ─take_for_submit─▶ Submitting ─finish─▶ Rendered | Errored
//!  ▲                                                                          │
//!  └──────────────────────────────── reset / stage ◀─────────────────────────┘
//! ```
//!
//! The zone is generic over the file handle so the browser front end can
//! stage a DOM `File` while the CLI stages bytes read from disk.

use crate::error::{Action, SubmitError, ValidationError};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::io;
use std::path::Path;
use tracing::debug;

/// Anything that can be staged: it only needs a name and a MIME type.
pub trait ImageSource {
    fn name(&self) -> String;
    fn mime_type(&self) -> String;
}

pub fn is_image_mime(mime: &str) -> bool {
    mime.starts_with("image/")
}

/// Guess an image MIME type from a file extension.
///
/// Returns `application/octet-stream` for anything unrecognised, which then
/// fails validation like any other non-image.
pub fn mime_from_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" | "jpe" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "svg" => "image/svg+xml",
        "txt" => "text/plain",
        "pdf" => "application/pdf",
        _ => "application/octet-stream",
    }
}

/// An image file loaded into memory.
#[derive(Debug, Clone, PartialEq)]
pub struct StagedImage {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl StagedImage {
    pub fn new(name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            bytes,
        }
    }

    /// Read a file from disk, inferring its MIME type from the extension.
    pub fn from_path<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());

        Ok(Self::new(name, mime_from_path(path), bytes))
    }

    /// `data:` URL suitable for an `<img src>` preview.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime, STANDARD.encode(&self.bytes))
    }
}

impl ImageSource for StagedImage {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn mime_type(&self) -> String {
        self.mime.clone()
    }
}

/// Observable state of the image flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneState {
    Idle,
    FileStaged,
    Submitting,
    Rendered,
    Errored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Submitting,
    Rendered,
    Errored,
}

/// Identifies one staging; previews for an older staging are discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageTicket(u64);

/// What [`DropZone::take_for_submit`] hands to the dispatcher.
#[derive(Debug)]
pub struct Submission<F> {
    pub file: F,
    pub preview: Option<String>,
}

#[derive(Debug)]
pub struct DropZone<F> {
    staged: Option<F>,
    preview: Option<String>,
    phase: Phase,
    generation: u64,
    drag_over: bool,
}

impl<F> Default for DropZone<F> {
    fn default() -> Self {
        Self {
            staged: None,
            preview: None,
            phase: Phase::Idle,
            generation: 0,
            drag_over: false,
        }
    }
}

impl<F: ImageSource> DropZone<F> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ZoneState {
        match (self.phase, self.staged.is_some()) {
            (Phase::Submitting, _) => ZoneState::Submitting,
            (_, true) => ZoneState::FileStaged,
            (Phase::Idle, false) => ZoneState::Idle,
            (Phase::Rendered, false) => ZoneState::Rendered,
            (Phase::Errored, false) => ZoneState::Errored,
        }
    }

    /// Submit is enabled only with a staged file and no request in flight.
    pub fn can_submit(&self) -> bool {
        self.staged.is_some() && self.phase != Phase::Submitting
    }

    pub fn staged(&self) -> Option<&F> {
        self.staged.as_ref()
    }

    pub fn preview(&self) -> Option<&str> {
        self.preview.as_deref()
    }

    pub fn is_drag_over(&self) -> bool {
        self.drag_over
    }

    pub fn drag_enter(&mut self) {
        self.drag_over = true;
    }

    pub fn drag_leave(&mut self) {
        self.drag_over = false;
    }

    /// Stage a dropped or selected file.
    ///
    /// A non-image clears whatever was staged before, so submit ends up
    /// disabled. A request already in flight is unaffected either way.
    pub fn stage(&mut self, file: F) -> Result<StageTicket, ValidationError> {
        self.drag_over = false;
        self.generation += 1;
        self.preview = None;

        let mime = file.mime_type();
        if !is_image_mime(&mime) {
            self.staged = None;
            debug!(name = %file.name(), %mime, "rejected non-image file");
            return Err(ValidationError::NotAnImage {
                name: file.name(),
                mime,
            });
        }

        debug!(name = %file.name(), %mime, "staged image");
        self.staged = Some(file);
        Ok(StageTicket(self.generation))
    }

    /// Attach a decoded preview. Ignored if the file was replaced or
    /// submitted since `ticket` was issued.
    pub fn set_preview(&mut self, ticket: StageTicket, data_url: String) -> bool {
        if ticket.0 != self.generation || self.staged.is_none() {
            return false;
        }
        self.preview = Some(data_url);
        true
    }

    /// Move the staged file out for dispatch and enter `Submitting`.
    pub fn take_for_submit(&mut self) -> Result<Submission<F>, SubmitError> {
        if self.phase == Phase::Submitting {
            return Err(SubmitError::InFlight(Action::Image));
        }
        let file = self.staged.take().ok_or(ValidationError::NoImage)?;

        self.generation += 1;
        self.phase = Phase::Submitting;
        Ok(Submission {
            file,
            preview: self.preview.take(),
        })
    }

    /// Record the outcome of the submission started by `take_for_submit`.
    pub fn finish(&mut self, rendered: bool) {
        self.phase = if rendered { Phase::Rendered } else { Phase::Errored };
    }

    pub fn reset(&mut self) {
        self.staged = None;
        self.preview = None;
        self.phase = Phase::Idle;
        self.generation += 1;
        self.drag_over = false;
    }
}
