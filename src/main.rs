use chrono::Local;
use clap::Parser;
use revscrap::config::{Cli, Config};
use revscrap::{info_time, process::run, Result};

#[tokio::main]
async fn main() -> Result<()> {
    let start_time = Local::now();
    let config = Config::from(Cli::parse());

    let summary = run(&config).await?;
    info_time!(
        start_time,
        "Full program time: {} URLs, {} rows",
        summary.urls,
        summary.rows
    );

    Ok(())
}
