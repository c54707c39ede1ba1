use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::browser::DriverOptions;
use crate::record::WriteMode;
use crate::settle::Timing;
use crate::{DEFAULT_INPUT, DEFAULT_OUTPUT, DEFAULT_WEBDRIVER_URL};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    /// Drive a real browser through a WebDriver server.
    Webdriver,
    /// Fetch pages over plain HTTP, no browser involved.
    Html,
}

#[derive(Debug, Parser)]
#[command(name = "revscrap", about = "Scrape product details and reviews into a CSV file")]
pub struct Cli {
    /// CSV file with one product URL in the first column of each row
    #[arg(short, long, env = "REVSCRAP_INPUT", default_value = DEFAULT_INPUT)]
    pub input: PathBuf,

    /// CSV file the rows are appended to
    #[arg(short, long, env = "REVSCRAP_OUTPUT", default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// Empty the output file before writing instead of appending to it
    #[arg(long)]
    pub truncate: bool,

    #[arg(long, value_enum, default_value_t = Backend::Webdriver)]
    pub backend: Backend,

    #[arg(long, env = "WEBDRIVER_URL", default_value = DEFAULT_WEBDRIVER_URL)]
    pub webdriver_url: String,

    /// Start this chromedriver executable instead of using a running one
    #[arg(long, env = "CHROMEDRIVER_PATH")]
    pub driver_path: Option<PathBuf>,

    #[arg(long)]
    pub headless: bool,

    /// Sleep fixed times after navigation instead of polling for content
    #[arg(long)]
    pub fixed_delays: bool,

    /// Readiness checks after each navigation before reading anyway
    #[arg(long, default_value_t = 8)]
    pub settle_attempts: u32,

    /// Stop after this many review pages per product
    #[arg(long)]
    pub max_review_pages: Option<usize>,

    /// Pause once all URLs are done
    #[arg(long, default_value_t = 5000)]
    pub finish_pause_ms: u64,
}

#[derive(Debug, Clone, Default)]
pub struct ScrapeOptions {
    pub timing: Timing,
    pub max_review_pages: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub input: PathBuf,
    pub output: PathBuf,
    pub write_mode: WriteMode,
    pub backend: Backend,
    pub driver: DriverOptions,
    pub scrape: ScrapeOptions,
}

impl From<Cli> for Config {
    fn from(cli: Cli) -> Self {
        let mut timing = if cli.fixed_delays {
            Timing::fixed()
        } else {
            Timing::polling(cli.settle_attempts)
        };
        timing.finish = Duration::from_millis(cli.finish_pause_ms);

        Self {
            input: cli.input,
            output: cli.output,
            write_mode: if cli.truncate {
                WriteMode::Truncate
            } else {
                WriteMode::Append
            },
            backend: cli.backend,
            driver: DriverOptions {
                server_url: cli.webdriver_url,
                driver_path: cli.driver_path,
                headless: cli.headless,
            },
            scrape: ScrapeOptions {
                timing,
                max_review_pages: cli.max_review_pages,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settle::SettlePolicy;

    fn parse(args: &[&str]) -> Config {
        Cli::try_parse_from(std::iter::once("revscrap").chain(args.iter().copied()))
            .unwrap()
            .into()
    }

    #[test]
    fn defaults_append_and_poll() {
        let config = parse(&["--input", "in.csv", "--output", "out.csv"]);
        assert_eq!(config.input, PathBuf::from("in.csv"));
        assert_eq!(config.write_mode, WriteMode::Append);
        assert_eq!(config.backend, Backend::Webdriver);
        assert!(matches!(
            config.scrape.timing.policy,
            SettlePolicy::Poll { attempts: 8, .. }
        ));
        assert_eq!(config.scrape.timing.finish, Duration::from_secs(5));
        assert_eq!(config.scrape.max_review_pages, None);
    }

    #[test]
    fn flags_map_onto_config() {
        let config = parse(&[
            "-i",
            "in.csv",
            "-o",
            "out.csv",
            "--truncate",
            "--backend",
            "html",
            "--fixed-delays",
            "--max-review-pages",
            "3",
            "--finish-pause-ms",
            "0",
        ]);
        assert_eq!(config.write_mode, WriteMode::Truncate);
        assert_eq!(config.backend, Backend::Html);
        assert_eq!(config.scrape.timing.policy, SettlePolicy::Fixed);
        assert_eq!(config.scrape.timing.product_page, Duration::from_secs(3));
        assert_eq!(config.scrape.timing.finish, Duration::ZERO);
        assert_eq!(config.scrape.max_review_pages, Some(3));
    }
}
