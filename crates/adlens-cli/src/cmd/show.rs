use anyhow::Result;
use serde::Serialize;

use adlens_core::prelude::*;

use crate::io::input;
use crate::output;

#[derive(Debug, Serialize)]
pub struct ShowOut {
    pub metadata: ReportMetadata,
    pub view: ViewModel,
}

pub async fn run(input_path: &str) -> Result<()> {
    let doc = input::read_json_file(input_path)?;
    let (blocks, metadata) = split_document(&doc);
    let view = reduce(&classify(&blocks));

    let out = ShowOut { metadata, view };
    if output::is_json() {
        output::print(&out)?;
    } else {
        output::render_view(&out.view)?;
    }
    Ok(())
}
