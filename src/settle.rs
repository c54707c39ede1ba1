//! Waiting for freshly loaded content before reading it.

use std::time::Duration;

use tokio::time::sleep;

use crate::browser::Browser;
use crate::locator;
use crate::warn_time;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettlePolicy {
    /// Sleep a fixed time after every navigation.
    Fixed,
    /// Check for the expected content, backing off between checks. Gives up
    /// after `attempts` checks and leaves the caller to carry on with
    /// whatever has loaded.
    Poll {
        attempts: u32,
        initial_backoff: Duration,
        max_backoff: Duration,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timing {
    pub policy: SettlePolicy,
    pub product_page: Duration,
    pub reviews_view: Duration,
    pub next_page: Duration,
    /// Pause after the last URL.
    pub finish: Duration,
}

impl Timing {
    /// The delays the scraper always used before it could poll.
    pub fn fixed() -> Self {
        Self {
            policy: SettlePolicy::Fixed,
            product_page: Duration::from_secs(3),
            reviews_view: Duration::from_secs(4),
            next_page: Duration::from_millis(1500),
            finish: Duration::from_secs(5),
        }
    }

    pub fn polling(attempts: u32) -> Self {
        Self {
            policy: SettlePolicy::Poll {
                attempts: attempts.max(1),
                initial_backoff: Duration::from_millis(100),
                max_backoff: Duration::from_secs(1),
            },
            ..Self::fixed()
        }
    }

    /// Check once, never sleep. For content that is complete on arrival.
    pub fn immediate() -> Self {
        Self {
            policy: SettlePolicy::Poll {
                attempts: 1,
                initial_backoff: Duration::ZERO,
                max_backoff: Duration::ZERO,
            },
            product_page: Duration::ZERO,
            reviews_view: Duration::ZERO,
            next_page: Duration::ZERO,
            finish: Duration::ZERO,
        }
    }

    fn fixed_delay(&self, stage: &Stage) -> Duration {
        match stage {
            Stage::ProductPage => self.product_page,
            Stage::ReviewsView => self.reviews_view,
            Stage::NextPage { .. } => self.next_page,
        }
    }
}

impl Default for Timing {
    fn default() -> Self {
        Self::polling(8)
    }
}

/// What just happened in the browser, and so what "ready" means.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    ProductPage,
    ReviewsView,
    /// `previous_first` is the text of the first review before the click; the
    /// new page is ready once the first review differs from it.
    NextPage { previous_first: Option<String> },
}

/// Waits until `stage` looks ready. Returns `false` if polling gave up.
pub async fn settle<B: Browser>(browser: &mut B, timing: &Timing, stage: &Stage) -> bool {
    let (attempts, mut backoff, max_backoff) = match timing.policy {
        SettlePolicy::Fixed => {
            sleep(timing.fixed_delay(stage)).await;
            return true;
        }
        SettlePolicy::Poll {
            attempts,
            initial_backoff,
            max_backoff,
        } => (attempts, initial_backoff, max_backoff),
    };

    for attempt in 1..=attempts {
        if is_ready(browser, stage).await {
            return true;
        }
        if attempt < attempts {
            sleep(backoff).await;
            backoff = (backoff * 2).min(max_backoff);
        }
    }

    warn_time!("{:?} not ready after {} checks", stage, attempts);
    false
}

async fn is_ready<B: Browser>(browser: &mut B, stage: &Stage) -> bool {
    match stage {
        Stage::ProductPage => browser.find(&locator::TITLE).await.is_ok(),
        Stage::ReviewsView => browser.find(&locator::REVIEW_LIST).await.is_ok(),
        Stage::NextPage { previous_first } => match first_review_text(browser).await {
            Some(first) => previous_first.as_ref() != Some(&first),
            None => false,
        },
    }
}

/// Text of the first review block on the page, if there is one.
pub async fn first_review_text<B: Browser>(browser: &mut B) -> Option<String> {
    let block = browser.find(&locator::REVIEW_BLOCKS).await.ok()?;
    browser.text(&block).await.ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::HtmlBrowser;

    const REVIEWS: &str = r#"<html><body><div id="cm_cr-review_list">
        <div><span data-hook="review-body"><span>Good</span></span></div>
    </div></body></html>"#;

    async fn browser() -> HtmlBrowser {
        let mut browser = HtmlBrowser::from_pages([("https://shop.test/r/1", REVIEWS)]).unwrap();
        browser.goto("https://shop.test/r/1").await.unwrap();
        browser
    }

    #[tokio::test]
    async fn reviews_view_ready_when_list_present() {
        let mut browser = browser().await;
        assert!(settle(&mut browser, &Timing::immediate(), &Stage::ReviewsView).await);
    }

    #[tokio::test]
    async fn product_page_without_title_gives_up() {
        let mut browser = browser().await;
        let timing = Timing {
            policy: SettlePolicy::Poll {
                attempts: 3,
                initial_backoff: Duration::from_millis(1),
                max_backoff: Duration::from_millis(2),
            },
            ..Timing::immediate()
        };
        assert!(!settle(&mut browser, &timing, &Stage::ProductPage).await);
    }

    #[tokio::test]
    async fn next_page_needs_new_first_review() {
        let mut browser = browser().await;
        let unchanged = Stage::NextPage {
            previous_first: Some("Good".into()),
        };
        let changed = Stage::NextPage {
            previous_first: Some("Bad".into()),
        };

        assert!(!settle(&mut browser, &Timing::immediate(), &unchanged).await);
        assert!(settle(&mut browser, &Timing::immediate(), &changed).await);
    }

    #[test]
    fn polling_keeps_at_least_one_check() {
        let timing = Timing::polling(0);
        assert!(matches!(timing.policy, SettlePolicy::Poll { attempts: 1, .. }));
    }
}
