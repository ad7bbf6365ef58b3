use anyhow::Result;
use serde::Serialize;

use adlens_core::export::build_export;
use adlens_core::ingest::split_document;
use adlens_core::model::ReportMetadata;

use crate::io::{export, input};
use crate::output;

#[derive(Debug, Serialize)]
pub struct ExportOut {
    pub wrote_to: String,
    pub kind: String,
    pub bytes: usize,
}

pub async fn run(
    input_arg: Option<&str>,
    out_dir: &str,
    seller: Option<&str>,
    period: Option<&str>,
) -> Result<()> {
    let Some(text) = input::read_override_text(input_arg)? else {
        return Ok(());
    };

    // Flags win; otherwise whatever metadata the document itself carries.
    let doc_metadata = serde_json::from_str::<serde_json::Value>(&text)
        .ok()
        .map(|doc| split_document(&doc).1)
        .unwrap_or_default();
    let metadata = ReportMetadata {
        seller: seller.map(str::to_string).or(doc_metadata.seller),
        report_period: period.map(str::to_string).or(doc_metadata.report_period),
    };

    let doc = build_export(&text, &metadata);
    let path = export::write_export(out_dir, &doc)?;

    let out = ExportOut {
        wrote_to: path.display().to_string(),
        kind: if doc.is_json() { "json" } else { "text" }.to_string(),
        bytes: doc.content().len(),
    };
    if output::is_json() {
        output::print(&out)?;
    } else {
        println!("wrote {} ({} bytes)", out.wrote_to, out.bytes);
    }
    Ok(())
}
