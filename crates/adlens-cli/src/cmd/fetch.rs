use std::time::Duration;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use adlens_client::{HttpBackend, ReportParams, Session, SessionConfig};
use adlens_core::model::ReportMetadata;
use adlens_core::view::ViewModel;

use crate::output;

#[derive(Debug, Serialize)]
pub struct FetchOut {
    pub phase: String,
    pub generation: u64,
    pub metadata: ReportMetadata,
    pub view: ViewModel,
}

pub async fn run(
    seller: Option<&str>,
    date: Option<&str>,
    url: Option<&str>,
    base_url: Option<&str>,
    poll_interval_ms: u64,
    max_poll_attempts: Option<u32>,
) -> Result<()> {
    let params = resolve_params(seller, date, url)?;

    let mut config = SessionConfig::default();
    if let Some(base) = base_url {
        config.base_url = base.to_string();
    }
    config.poll_interval = Duration::from_millis(poll_interval_ms);
    config.max_poll_attempts = max_poll_attempts;

    let backend = HttpBackend::new(&config)?;
    let session = Session::spawn(params, config, backend)?;

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::with_template("{spinner} {msg}").unwrap());
    pb.enable_steady_tick(Duration::from_millis(80));

    let mut rx = session.watch();
    let state = loop {
        {
            let snapshot = rx.borrow_and_update();
            if snapshot.phase.is_terminal() {
                break snapshot.clone();
            }
            pb.set_message(snapshot.phase.to_string());
        }
        if rx.changed().await.is_err() {
            break session.state();
        }
    };
    pb.finish_and_clear();

    let out = FetchOut {
        phase: state.phase.to_string(),
        generation: state.generation,
        metadata: state.metadata.clone(),
        view: state.view(),
    };
    if output::is_json() {
        output::print(&out)?;
    } else {
        output::render_view(&out.view)?;
    }
    Ok(())
}

/// Explicit seller/date flags win; otherwise the parameters are read from
/// the dashboard URL's query string. Missing parameters are not an error
/// here: the session turns them into the terminal missing-parameter state.
fn resolve_params(
    seller: Option<&str>,
    date: Option<&str>,
    url: Option<&str>,
) -> Result<Option<ReportParams>> {
    if let (Some(seller), Some(date)) = (seller, date) {
        return Ok(Some(ReportParams::new(seller, date)));
    }

    let Some(url) = url else {
        return Ok(None);
    };
    let parsed = url::Url::parse(url)?;
    Ok(parsed.query().and_then(ReportParams::from_query))
}
