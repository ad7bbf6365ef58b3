use clap::{Parser, Subcommand};

#[derive(Parser, Debug, Clone)]
#[command(name = "adlens", version, about = "Ad-performance report dashboard CLI")]
pub struct Cli {
    /// Emit JSON output on stdout.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Acquire a report from the remote endpoint and print the settled view.
    Fetch {
        /// Seller id.
        #[arg(long)]
        seller: Option<String>,

        /// Report date, e.g. 2025-05.
        #[arg(long)]
        date: Option<String>,

        /// Full dashboard URL; seller/date are taken from its query string.
        #[arg(long, conflicts_with_all = ["seller", "date"])]
        url: Option<String>,

        /// Report endpoint override.
        #[arg(long)]
        base_url: Option<String>,

        /// Milliseconds between pending-poll retries.
        #[arg(long, default_value_t = 5000)]
        poll_interval_ms: u64,

        /// Give up after this many pending responses (default: poll forever).
        #[arg(long)]
        max_poll_attempts: Option<u32>,
    },

    /// Classify and reduce a local report document.
    Show {
        /// Report JSON file (envelope or bare block array).
        input: String,
    },

    /// Validate override text without committing it.
    Validate {
        /// Override file; reads stdin when omitted.
        input: Option<String>,
    },

    /// Build the export document from override text and write it to disk.
    Export {
        /// Override file; reads stdin when omitted.
        input: Option<String>,

        /// Output directory.
        #[arg(long, default_value = "./out")]
        out: String,

        /// Seller recorded in the export metadata.
        #[arg(long)]
        seller: Option<String>,

        /// Report period recorded in the export metadata.
        #[arg(long)]
        period: Option<String>,
    },
}
