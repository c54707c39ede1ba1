use std::fmt;

/// A named CSS query for one element on a product or review page.
///
/// The name is only used for logs and error messages, the CSS is what gets
/// handed to the browser backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Locator {
    pub name: &'static str,
    pub css: &'static str,
}

impl Locator {
    pub const fn new(name: &'static str, css: &'static str) -> Self {
        Self { name, css }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.css)
    }
}

// Product page
pub const TITLE: Locator = Locator::new("title", r#"span[id="productTitle"]"#);
pub const BRAND: Locator = Locator::new(
    "brand",
    r#"tr[class="a-spacing-small po-brand"] > td:nth-of-type(2) > span"#,
);
pub const CAPACITY: Locator = Locator::new(
    "capacity",
    r#"tr[class="a-spacing-small po-capacity"] > td:nth-of-type(2) > span"#,
);
pub const ENERGY_RATING: Locator = Locator::new(
    "energy rating",
    r#"tr[class="a-spacing-small po-energy_star"] > td:nth-of-type(2) > span"#,
);
pub const BODY: Locator = Locator::new("page body", "body");
pub const ALL_REVIEWS: Locator =
    Locator::new("see all reviews", r#"a[class="a-link-emphasis a-text-bold"]"#);

// Reviews view
pub const REVIEW_LIST: Locator = Locator::new("review list", r#"div[id="cm_cr-review_list"]"#);
pub const REVIEW_BLOCKS: Locator =
    Locator::new("review blocks", r#"div[id="cm_cr-review_list"] > div"#);
pub const NEXT_PAGE: Locator = Locator::new("next page", r#"li[class="a-last"] > a"#);

// Inside a single review block
pub const REVIEW_RATING: Locator =
    Locator::new("review rating", r#"i[data-hook="review-star-rating"]"#);
pub const REVIEW_BODY: Locator =
    Locator::new("review body", r#"span[data-hook="review-body"] > span"#);
pub const REVIEW_DATE: Locator = Locator::new("review date", r#"span[data-hook="review-date"]"#);
