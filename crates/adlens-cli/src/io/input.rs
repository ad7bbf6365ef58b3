use std::ffi::OsStr;
use std::fs;
use std::io::Read;
use std::path::Path;

use anyhow::{anyhow, Result};

use crate::output;

pub fn read_json_file<P: AsRef<Path>>(path: P) -> Result<serde_json::Value> {
    let raw = fs::read_to_string(path.as_ref())?;
    let v: serde_json::Value =
        serde_json::from_str(&raw).map_err(|e| anyhow!("invalid json: {e}"))?;
    Ok(v)
}

/// Read override text from a file or, with no path, from stdin.
///
/// Files go through the JSON-transfer eligibility check; an ineligible file
/// is a warned no-op and yields `None`. Pasted (stdin) text always counts.
pub fn read_override_text(input: Option<&str>) -> Result<Option<String>> {
    let Some(path) = input else {
        return Ok(Some(read_stdin()?));
    };

    let name = Path::new(path)
        .file_name()
        .and_then(OsStr::to_str)
        .unwrap_or(path);
    if !adlens_core::ingest::is_json_transfer(name, None) {
        output::eprintln_line(&format!("ignoring non-JSON file: {path}"));
        return Ok(None);
    }

    Ok(Some(fs::read_to_string(path)?))
}

fn read_stdin() -> Result<String> {
    let mut text = String::new();
    std::io::stdin().read_to_string(&mut text)?;
    Ok(text)
}
