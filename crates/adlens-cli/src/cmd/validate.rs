use anyhow::Result;
use serde::Serialize;

use adlens_core::ingest::accept_override;

use crate::io::input;
use crate::output;

#[derive(Debug, Serialize)]
pub struct ValidateOut {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub blocks: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seller: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_period: Option<String>,
}

pub async fn run(input_arg: Option<&str>) -> Result<()> {
    let Some(text) = input::read_override_text(input_arg)? else {
        return Ok(());
    };

    let out = match accept_override(&text) {
        Ok(payload) => ValidateOut {
            ok: true,
            error: None,
            blocks: payload.blocks.len(),
            seller: payload.metadata.seller,
            report_period: payload.metadata.report_period,
        },
        Err(e) => {
            let message = format!("Invalid JSON format: {e}");
            if !output::is_json() {
                output::eprintln_line(&message);
            }
            ValidateOut {
                ok: false,
                error: Some(message),
                blocks: 0,
                seller: None,
                report_period: None,
            }
        }
    };

    if output::is_json() {
        output::print(&out)?;
    } else if out.ok {
        println!("ok: {} block(s)", out.blocks);
    }
    Ok(())
}
