//! `hawiya analyze`: the client-side flow run headlessly.
//!
//! Each path goes through the upload controller exactly as a file picked in
//! the browser would. The session is then submitted once and the result
//! rendered as `label: value` lines, or as JSON with `--json`.

use std::path::Path;
use std::time::Duration;

use serde::Serialize;

use crate::client::render::{DisplayEntry, ResultView};
use crate::client::request::{AnalysisClient, AnalysisTransport, HttpTransport};
use crate::client::session::{Slot, UploadSession};
use crate::client::upload::{LogPreview, SelectedFile, UploadController};
use crate::commands::{CommandError, JsonOut};
use crate::models::identity::IdentityRecord;
use crate::pipeline::normalize::{ExifOrientationCorrector, JpegNormalizer, NormalizeConfig};

#[derive(Debug, Serialize)]
struct AnalyzeOutput<'a> {
    record: &'a IdentityRecord,
    entries: &'a [DisplayEntry],
}

pub fn analyze(
    front: &Path,
    back: &Path,
    server: &str,
    timeout_secs: u64,
    normalize: NormalizeConfig,
    json: bool,
) -> Result<(), CommandError> {
    let transport = HttpTransport::new(server, Duration::from_secs(timeout_secs))?;
    tracing::debug!(endpoint = %transport.endpoint(), "Submitting to server");

    let (record, view) = run_flow(front, back, normalize, Box::new(transport))?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&JsonOut {
                ok: true,
                data: AnalyzeOutput {
                    record: &record,
                    entries: view.entries(),
                },
            })?
        );
    } else if view.is_empty() {
        println!("(no fields extracted)");
    } else {
        print!("{view}");
    }
    Ok(())
}

/// Upload both sides, submit, and render.
pub fn run_flow(
    front: &Path,
    back: &Path,
    normalize: NormalizeConfig,
    transport: Box<dyn AnalysisTransport>,
) -> Result<(IdentityRecord, ResultView), CommandError> {
    let normalizer = JpegNormalizer::new(Box::new(ExifOrientationCorrector), normalize);
    tracing::debug!(resize = ?normalizer.config().resize_filter, "Normalizer ready");
    let controller = UploadController::new(Box::new(normalizer), Box::new(LogPreview));
    let mut session = UploadSession::new();

    for (slot, path) in [(Slot::Front, front), (Slot::Back, back)] {
        let file = SelectedFile::from_path(path).map_err(|source| CommandError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        // A failed side stays empty; the client reports it as missing.
        let _ = controller.on_file_selected(&mut session, slot, &file);
    }

    let client = AnalysisClient::new(transport);
    let mut view = ResultView::new();
    let record = client.analyze(&session)?;
    view.show(&record);
    Ok((record, view))
}
