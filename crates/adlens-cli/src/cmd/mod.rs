use anyhow::Result;

use crate::args::{Cli, Command};

mod export;
mod fetch;
mod show;
mod validate;

pub async fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Fetch {
            seller,
            date,
            url,
            base_url,
            poll_interval_ms,
            max_poll_attempts,
        } => {
            fetch::run(
                seller.as_deref(),
                date.as_deref(),
                url.as_deref(),
                base_url.as_deref(),
                poll_interval_ms,
                max_poll_attempts,
            )
            .await
        }
        Command::Show { input } => show::run(&input).await,
        Command::Validate { input } => validate::run(input.as_deref()).await,
        Command::Export {
            input,
            out,
            seller,
            period,
        } => export::run(input.as_deref(), &out, seller.as_deref(), period.as_deref()).await,
    }
}
