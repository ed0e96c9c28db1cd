use std::{io::Write, path::Path};

use tempfile::NamedTempFile;
use umya_spreadsheet::Spreadsheet;

use crate::error::WorkbookError;

/// Writes `book` next to `path` and renames it over the target, so that a crash mid-write never
/// leaves a truncated workbook behind.
pub fn save_atomically(book: &Spreadsheet, path: &Path) -> Result<(), WorkbookError> {
    let failed = |reason: String| WorkbookError::Save {
        path: path.to_path_buf(),
        reason,
    };

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| failed(e.to_string()))?;
    umya_spreadsheet::writer::xlsx::write_writer(book, tmp.as_file_mut())
        .map_err(|e| failed(e.to_string()))?;
    tmp.as_file_mut()
        .flush()
        .and_then(|_| tmp.as_file().sync_all())
        .map_err(|e| failed(e.to_string()))?;
    // Temp files are created owner-only; keep whatever the replaced workbook had.
    if let Ok(existing) = std::fs::metadata(path) {
        tmp.as_file()
            .set_permissions(existing.permissions())
            .map_err(|e| failed(e.to_string()))?;
    }
    tmp.persist(path).map_err(|e| failed(e.error.to_string()))?;
    Ok(())
}
