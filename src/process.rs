use std::path::Path;

use chrono::Local;

use crate::browser::{Browser, HtmlBrowser, WebDriverBrowser};
use crate::config::{Backend, Config, ScrapeOptions};
use crate::extract::extract_product;
use crate::paginate::{scrape_reviews, PaginationSummary};
use crate::record::RecordWriter;
use crate::settle::{settle, Stage};
use crate::{info_time, warn_time, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub urls: usize,
    pub rows: usize,
}

/// Opens the configured browser, scrapes every input URL into the output
/// file and closes the browser again, whether the scrape succeeded or not.
pub async fn run(config: &Config) -> Result<RunSummary> {
    let writer = RecordWriter::new(&config.output, config.write_mode);

    match config.backend {
        Backend::Webdriver => {
            let browser = WebDriverBrowser::connect(&config.driver).await?;
            run_with(browser, &config.input, &writer, &config.scrape).await
        }
        Backend::Html => {
            let browser = HtmlBrowser::new()?;
            run_with(browser, &config.input, &writer, &config.scrape).await
        }
    }
}

async fn run_with<B: Browser>(
    mut browser: B,
    input: &Path,
    writer: &RecordWriter,
    options: &ScrapeOptions,
) -> Result<RunSummary> {
    let scraped = scrape_all(&mut browser, input, writer, options).await;
    let closed = browser.close().await;

    let summary = scraped?;
    closed?;
    Ok(summary)
}

/// Writes the header, then every product and its reviews, one URL at a time
/// in input order.
pub async fn scrape_all<B: Browser>(
    browser: &mut B,
    input: &Path,
    writer: &RecordWriter,
    options: &ScrapeOptions,
) -> Result<RunSummary> {
    let start_time = Local::now();
    info_time!("Started scraping {} into {}", input.display(), writer.path().display());

    writer.write_header()?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(input)?;

    let mut summary = RunSummary::default();
    for (line, record) in reader.records().enumerate() {
        let record = record?;
        let url = record.get(0).map(str::trim).unwrap_or_default();
        if url.is_empty() {
            warn_time!("Skipping input row {} without a URL", line + 1);
            continue;
        }

        summary.urls += 1;
        info_time!("Scraping {}: {}", summary.urls, url);
        let product_time = Local::now();

        let reviews = scrape_product(browser, url, writer, options).await?;
        summary.rows += reviews.rows;
        info_time!(
            product_time,
            "Wrote {} rows from {} review pages",
            reviews.rows,
            reviews.pages
        );
    }

    info_time!(
        start_time,
        "Scraping Complete! {} URLs, {} rows",
        summary.urls,
        summary.rows
    );
    tokio::time::sleep(options.timing.finish).await;

    Ok(summary)
}

/// Loads one product page, reads its fields and hands over to the review
/// walk, which does all the writing.
pub async fn scrape_product<B: Browser>(
    browser: &mut B,
    url: &str,
    writer: &RecordWriter,
    options: &ScrapeOptions,
) -> Result<PaginationSummary> {
    browser.goto(url).await?;
    settle(browser, &options.timing, &Stage::ProductPage).await;

    let product = extract_product(browser, url).await;
    scrape_reviews(
        browser,
        &product,
        writer,
        &options.timing,
        options.max_review_pages,
    )
    .await
}
