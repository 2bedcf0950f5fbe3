use crate::error::ApiError;
use std::path::Path;
use uuid::Uuid;

/// The one extension the gate lets through, compared case-insensitively.
const ACCEPTED_EXTENSION: &str = "pdf";

/// accept
///
/// The upload gate: accepts a filename only when its extension is ".pdf"
/// (case-insensitive, so "report.PDF" passes). This is the single PDF check
/// in the codebase; both the presigned-upload handler and the content field
/// validators call it, so the rule cannot drift between paths.
///
/// The check is by name only. No bytes are sniffed, which is a known weak
/// validation, not a content guarantee.
pub fn accept(filename: &str) -> Result<(), ApiError> {
    let extension = Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .ok_or(ApiError::UnsupportedUpload)?;

    if extension.eq_ignore_ascii_case(ACCEPTED_EXTENSION) {
        Ok(())
    } else {
        Err(ApiError::UnsupportedUpload)
    }
}

/// document_key
///
/// Derives the object-storage key for an accepted document. Keys live under
/// a flat `documents/` prefix and are named by a fresh UUID rather than the
/// client filename, so uploads can never collide or traverse paths. The
/// record store holds only this key, never the file itself.
pub fn document_key() -> String {
    format!("documents/{}.{}", Uuid::new_v4(), ACCEPTED_EXTENSION)
}
