//! Field extraction for product pages and review blocks.
//!
//! Every lookup goes through a helper returning `Result`, and the public
//! extractors turn a failed lookup into an empty string. A product with a
//! missing brand or a review without a date still produces a row.

use std::sync::OnceLock;

use regex::Regex;

use crate::browser::Browser;
use crate::locator::{self, Locator};
use crate::{warn_time, Error, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductSummary {
    pub url: String,
    pub title: String,
    pub brand: String,
    pub energy_rating: String,
    pub capacity: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewRecord {
    /// 1-5 as text.
    pub rating: String,
    pub body: String,
    pub date: String,
}

/// Reads every product field from the page currently loaded in `browser`.
pub async fn extract_product<B: Browser>(browser: &mut B, url: &str) -> ProductSummary {
    let brand = extract_field(browser, &locator::BRAND).await;
    let title = extract_field(browser, &locator::TITLE).await;
    let capacity = extract_field(browser, &locator::CAPACITY).await;
    let energy_rating = extract_energy_rating(browser).await;

    ProductSummary {
        url: url.to_string(),
        title,
        brand,
        energy_rating,
        capacity,
    }
}

/// Text of the first element matching `locator`, or empty.
pub async fn extract_field<B: Browser>(browser: &mut B, locator: &Locator) -> String {
    or_empty(locator, try_text(browser, locator).await)
}

/// Text of the first element below `parent` matching `locator`, or empty.
pub async fn extract_field_in<B: Browser>(
    browser: &mut B,
    parent: &B::Element,
    locator: &Locator,
) -> String {
    let text = match browser.find_in(parent, locator).await {
        Ok(element) => browser.text(&element).await,
        Err(e) => Err(e),
    };
    or_empty(locator, text)
}

pub async fn try_text<B: Browser>(browser: &mut B, locator: &Locator) -> Result<String> {
    let element = browser.find(locator).await?;
    browser.text(&element).await
}

/// Tries the structured energy field first, then falls back to searching the
/// whole page text.
pub async fn extract_energy_rating<B: Browser>(browser: &mut B) -> String {
    if let Ok(text) = try_text(browser, &locator::ENERGY_RATING).await {
        return strip_star_suffix(&text);
    }

    match browser.page_text().await {
        Ok(text) => energy_rating_from_text(&text).unwrap_or_default(),
        Err(e) => or_empty(&locator::BODY, Err(e)),
    }
}

pub async fn extract_review<B: Browser>(browser: &mut B, block: &B::Element) -> ReviewRecord {
    let rating = extract_review_rating(browser, block).await;
    let body = extract_field_in(browser, block, &locator::REVIEW_BODY).await;
    let date = strip_review_locale(&extract_field_in(browser, block, &locator::REVIEW_DATE).await);

    ReviewRecord { rating, body, date }
}

async fn extract_review_rating<B: Browser>(browser: &mut B, block: &B::Element) -> String {
    let class = match browser.find_in(block, &locator::REVIEW_RATING).await {
        Ok(star) => browser.attr(&star, "class").await.and_then(|class| {
            class.ok_or_else(|| Error::AttributeMissing {
                locator: locator::REVIEW_RATING.to_string(),
                attribute: "class".into(),
            })
        }),
        Err(e) => Err(e),
    };
    let class = or_empty(&locator::REVIEW_RATING, class);
    rating_from_class(&class).unwrap_or_default()
}

/// Anticipated lookup failures become an empty value silently, anything else
/// (a dead session, a network error) is logged first.
fn or_empty(locator: &Locator, res: Result<String>) -> String {
    match res {
        Ok(text) => text,
        Err(e) => {
            if !e.is_lookup() {
                warn_time!("Reading {} failed: {}", locator, e);
            }
            String::new()
        }
    }
}

/// `"3 Star"` -> `"3"`.
pub fn strip_star_suffix(text: &str) -> String {
    text.replace(" Star", "")
}

/// Searches free text for an energy rating, trying each known label in turn.
pub fn energy_rating_from_text(text: &str) -> Option<String> {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    let patterns = PATTERNS.get_or_init(|| {
        [
            r"Energy Rating:\s*(\d+)",
            r"Energy Rating :\s*(\d+)",
            r"Energy Star Rating:\s*(\d+)",
        ]
        .iter()
        .map(|pattern| Regex::new(pattern).expect("energy rating pattern is valid"))
        .collect()
    });

    patterns
        .iter()
        .find_map(|re| re.captures(text))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Star icons encode the rating as a `-<n>` suffix in their class list,
/// e.g. `a-icon a-icon-star a-star-4 review-rating`.
pub fn rating_from_class(class: &str) -> Option<String> {
    static RATING: OnceLock<Regex> = OnceLock::new();
    let re = RATING.get_or_init(|| Regex::new(r"-(\d+)").expect("rating pattern is valid"));

    re.captures(class)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// `"Reviewed in India on 1 Jan 2023"` -> `"1 Jan 2023"`. Text without the
/// prefix is returned as is.
pub fn strip_review_locale(raw: &str) -> String {
    static PREFIX: OnceLock<Regex> = OnceLock::new();
    let re = PREFIX
        .get_or_init(|| Regex::new(r"^Reviewed in .+? on ").expect("locale pattern is valid"));

    re.replace(raw, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::HtmlBrowser;

    #[test]
    fn energy_rating_patterns() {
        assert_eq!(energy_rating_from_text("Energy Rating: 4"), Some("4".into()));
        assert_eq!(
            energy_rating_from_text("Specs\nEnergy Rating :  5 stars"),
            Some("5".into())
        );
        assert_eq!(
            energy_rating_from_text("Energy Star Rating:3"),
            Some("3".into())
        );
        assert_eq!(energy_rating_from_text("Energy efficient"), None);
    }

    #[test]
    fn energy_rating_prefers_earlier_patterns() {
        let text = "Energy Star Rating: 2 ... Energy Rating: 5";
        assert_eq!(energy_rating_from_text(text), Some("5".into()));
    }

    #[test]
    fn rating_from_star_class() {
        assert_eq!(
            rating_from_class("a-icon a-icon-star a-star-4 review-rating"),
            Some("4".into())
        );
        assert_eq!(rating_from_class("a-icon a-icon-star"), None);
        assert_eq!(rating_from_class(""), None);
    }

    #[test]
    fn review_locale_prefix() {
        assert_eq!(strip_review_locale("Reviewed in India on 1 Jan 2023"), "1 Jan 2023");
        assert_eq!(
            strip_review_locale("Reviewed in the United States on March 3, 2024"),
            "March 3, 2024"
        );
        assert_eq!(strip_review_locale("2 Jan 2023"), "2 Jan 2023");
        assert_eq!(strip_review_locale(""), "");
    }

    #[test]
    fn star_suffix() {
        assert_eq!(strip_star_suffix("3 Star"), "3");
        assert_eq!(strip_star_suffix("5"), "5");
    }

    async fn load(html: &str) -> HtmlBrowser {
        let mut browser = HtmlBrowser::from_pages([("https://shop.test/dp/1", html)]).unwrap();
        browser.goto("https://shop.test/dp/1").await.unwrap();
        browser
    }

    #[tokio::test]
    async fn product_fields_default_to_empty() {
        let mut browser = load(r#"<html><body><span id="productTitle">Fan</span></body></html>"#).await;
        let product = extract_product(&mut browser, "https://shop.test/dp/1").await;

        assert_eq!(
            product,
            ProductSummary {
                url: "https://shop.test/dp/1".into(),
                title: "Fan".into(),
                ..Default::default()
            }
        );
    }

    #[tokio::test]
    async fn structured_energy_rating_wins() {
        let mut browser = load(
            r#"<html><body><table>
                <tr class="a-spacing-small po-energy_star"><td>Energy</td><td><span>3 Star</span></td></tr>
               </table><p>Energy Rating: 5</p></body></html>"#,
        )
        .await;
        assert_eq!(extract_energy_rating(&mut browser).await, "3");
    }

    #[tokio::test]
    async fn energy_rating_from_page_text() {
        let mut browser =
            load("<html><body><ul><li>Energy Rating: 4</li></ul></body></html>").await;
        assert_eq!(extract_energy_rating(&mut browser).await, "4");

        let mut browser = load("<html><body><p>No label here</p></body></html>").await;
        assert_eq!(extract_energy_rating(&mut browser).await, "");
    }

    #[tokio::test]
    async fn review_without_star_icon() {
        let mut browser = load(
            r#"<html><body><div id="cm_cr-review_list"><div>
                <span data-hook="review-body"><span>Loud</span></span>
               </div></div></body></html>"#,
        )
        .await;
        let block = browser.find(&locator::REVIEW_BLOCKS).await.unwrap();
        let review = extract_review(&mut browser, &block).await;

        assert_eq!(
            review,
            ReviewRecord {
                rating: String::new(),
                body: "Loud".into(),
                date: String::new(),
            }
        );
    }
}
