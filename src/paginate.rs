use crate::browser::Browser;
use crate::extract::{extract_review, ProductSummary};
use crate::locator;
use crate::record::{OutputRow, RecordWriter};
use crate::settle::{first_review_text, settle, Stage, Timing};
use crate::{info_time, warn_time, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Scanning,
    Done,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaginationSummary {
    /// Review pages read. Zero when the reviews view could not be opened.
    pub pages: usize,
    pub rows: usize,
}

/// Opens the full review list of the product currently loaded and writes one
/// row per review, page after page, until there is no next page.
///
/// Without a "see all reviews" control the product is written once with the
/// review columns empty. Missing elements and failed clicks end the walk;
/// write errors and broken sessions are returned.
pub async fn scrape_reviews<B: Browser>(
    browser: &mut B,
    product: &ProductSummary,
    writer: &RecordWriter,
    timing: &Timing,
    max_pages: Option<usize>,
) -> Result<PaginationSummary> {
    if let Err(e) = open_reviews(browser).await {
        info_time!("No review list for {}: {}", product.url, e);
        writer.append_row(&OutputRow::bare(product))?;
        return Ok(PaginationSummary { pages: 0, rows: 1 });
    }
    settle(browser, timing, &Stage::ReviewsView).await;

    let mut summary = PaginationSummary::default();
    let mut state = State::Scanning;
    while state == State::Scanning {
        summary.pages += 1;

        let blocks = match browser.find_all(&locator::REVIEW_BLOCKS).await {
            Ok(blocks) => blocks,
            Err(e) if e.is_lookup() => Vec::new(),
            Err(e) => return Err(e),
        };
        for block in &blocks {
            let review = extract_review(browser, block).await;
            writer.append_row(&OutputRow::new(product, &review))?;
            summary.rows += 1;
        }

        state = if max_pages.is_some_and(|max| summary.pages >= max) {
            info_time!("Stopping at the review page limit ({})", summary.pages);
            State::Done
        } else {
            next_page(browser, timing).await
        };
    }

    Ok(summary)
}

async fn open_reviews<B: Browser>(browser: &mut B) -> Result<()> {
    let control = browser.find(&locator::ALL_REVIEWS).await?;
    browser.click(&control).await
}

async fn next_page<B: Browser>(browser: &mut B, timing: &Timing) -> State {
    let previous_first = first_review_text(browser).await;
    let previous_url = browser.page_url().await.ok();

    let Ok(next) = browser.find(&locator::NEXT_PAGE).await else {
        return State::Done;
    };
    if browser.click(&next).await.is_err() {
        return State::Done;
    }

    let stage = Stage::NextPage {
        previous_first: previous_first.clone(),
    };
    if settle(browser, timing, &stage).await {
        return State::Scanning;
    }

    // Nothing new showed up. Only a control that led back to the page just
    // written ends the walk; empty pages and repeated reviews are read on.
    let same_url = browser.page_url().await.ok() == previous_url;
    if same_url && first_review_text(browser).await == previous_first {
        warn_time!("Next page control led back to the same reviews, stopping");
        return State::Done;
    }
    State::Scanning
}
