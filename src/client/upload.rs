//! Upload controller: file selection → preview + normalization → session.
//!
//! `on_file_selected` is the single entry point. A browser would call it
//! from a file input's change event; the CLI calls it once per path.

use std::path::Path;

use crate::client::session::{ImagePayload, Slot, UploadSession};
use crate::pipeline::normalize::{ImageNormalizer, NormalizeError, NormalizedImage};

/// A file the user picked, as raw bytes.
#[derive(Debug, Clone)]
pub struct SelectedFile {
    pub name: String,
    pub mime_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let name = name.into();
        let mime_type = mime_guess::from_path(&name)
            .first()
            .map(|m| m.essence_str().to_string());
        Self {
            name,
            mime_type,
            bytes,
        }
    }

    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(name, bytes))
    }
}

/// Shows the raw selected file for immediate feedback.
pub trait PreviewSink: Send + Sync {
    fn show_preview(&self, slot: Slot, file: &SelectedFile);
}

/// Preview sink that only logs. Used where there is no screen.
pub struct LogPreview;

impl PreviewSink for LogPreview {
    fn show_preview(&self, slot: Slot, file: &SelectedFile) {
        tracing::info!(
            slot = %slot,
            file = %file.name,
            mime = file.mime_type.as_deref().unwrap_or("unknown"),
            bytes = file.bytes.len(),
            "Preview updated"
        );
    }
}

pub struct UploadController {
    normalizer: Box<dyn ImageNormalizer>,
    preview: Box<dyn PreviewSink>,
}

impl UploadController {
    pub fn new(normalizer: Box<dyn ImageNormalizer>, preview: Box<dyn PreviewSink>) -> Self {
        Self {
            normalizer,
            preview,
        }
    }

    /// Handle a file picked for `slot`.
    ///
    /// The preview always shows the raw file. On normalization failure the
    /// error is logged and returned, and the slot keeps its prior payload.
    pub fn on_file_selected(
        &self,
        session: &mut UploadSession,
        slot: Slot,
        file: &SelectedFile,
    ) -> Result<NormalizedImage, NormalizeError> {
        self.preview.show_preview(slot, file);

        match self.normalizer.normalize(&file.bytes) {
            Ok(normalized) => {
                let replaced = session
                    .store(ImagePayload::new(slot, normalized.base64.clone()))
                    .is_some();
                tracing::info!(
                    slot = %slot,
                    file = %file.name,
                    width = normalized.width,
                    height = normalized.height,
                    replaced,
                    "Card image stored"
                );
                Ok(normalized)
            }
            Err(e) => {
                tracing::warn!(
                    slot = %slot,
                    file = %file.name,
                    error = %e,
                    "Error reading file, keeping previous image"
                );
                Err(e)
            }
        }
    }
}
