use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;

use adlens_core::export::ExportDocument;

/// Write an export document under `out_dir`, creating the directory as
/// needed. Returns the written path.
pub fn write_export<P: AsRef<Path>>(out_dir: P, doc: &ExportDocument) -> Result<PathBuf> {
    let out_dir = out_dir.as_ref();
    fs::create_dir_all(out_dir)?;

    let path = out_dir.join(doc.file_name());
    fs::write(&path, doc.content())?;
    Ok(path)
}
