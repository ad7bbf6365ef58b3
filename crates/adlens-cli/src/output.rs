use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use adlens_core::view::ViewModel;

static JSON_MODE: AtomicBool = AtomicBool::new(false);

pub fn init(json: bool) {
    JSON_MODE.store(json, Ordering::Relaxed);
}

pub fn is_json() -> bool {
    JSON_MODE.load(Ordering::Relaxed)
}

pub fn print<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    println!("{s}");
    Ok(())
}

pub fn eprintln_line(msg: &str) {
    let _ = writeln!(io::stderr(), "{msg}");
}

pub fn stdout() -> StandardStream {
    StandardStream::stdout(ColorChoice::Auto)
}

fn print_heading(text: &str) -> io::Result<()> {
    let mut out = stdout();
    out.set_color(ColorSpec::new().set_bold(true).set_fg(Some(Color::Cyan)))?;
    writeln!(out, "{text}")?;
    out.reset()
}

fn print_status(color: Color, title: &str, message: &str) -> io::Result<()> {
    let mut out = stdout();
    out.set_color(ColorSpec::new().set_bold(true).set_fg(Some(color)))?;
    write!(out, "{title}")?;
    out.reset()?;
    writeln!(out, "  {message}")
}

/// Human-readable rendering of a view model. Skipped in JSON mode.
pub fn render_view(view: &ViewModel) -> anyhow::Result<()> {
    match view {
        ViewModel::AuthError(status) => print_status(Color::Red, &status.title, &status.message)?,
        ViewModel::Loading(status) => print_status(Color::Yellow, &status.title, &status.message)?,
        ViewModel::Report(report) => {
            print_heading(&report.performance_title)?;
            println!("{} rows", report.performance_rows.len());

            print_heading(&report.insight_title)?;
            for entry in &report.insights {
                println!(
                    "- {} (最佳: {}): {}",
                    entry.insight.g_name, entry.insight.best_ad, entry.suggestion
                );
            }

            print_heading(&report.chart_title)?;
            println!("{} charts", report.charts.len());

            if !report.combined_summary.is_empty() {
                print_heading("摘要")?;
                for line in &report.combined_summary {
                    println!("- {line}");
                }
            }

            for warning in &report.warnings {
                eprintln_line(&format!("warning: {warning}"));
            }
        }
    }
    Ok(())
}
