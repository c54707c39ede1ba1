//! What the scraper needs from a browser automation engine.
//!
//! Everything above this module only talks to [`Browser`], so the same
//! extraction and pagination code runs against a real WebDriver session or
//! against plain fetched HTML.

mod html;
mod webdriver;

pub use html::{HtmlBrowser, HtmlElement};
pub use webdriver::{DriverOptions, WebDriverBrowser};

use crate::locator::{self, Locator};
use crate::Result;

#[allow(async_fn_in_trait)]
pub trait Browser {
    type Element;

    /// Load `url` as the current page.
    async fn goto(&mut self, url: &str) -> Result<()>;

    /// All elements on the current page matching `locator`, in document order.
    /// No match is an empty `Vec`, not an error.
    async fn find_all(&mut self, locator: &Locator) -> Result<Vec<Self::Element>>;

    /// All elements below `parent` matching `locator`.
    async fn find_all_in(
        &mut self,
        parent: &Self::Element,
        locator: &Locator,
    ) -> Result<Vec<Self::Element>>;

    /// Visible text of the element.
    async fn text(&mut self, element: &Self::Element) -> Result<String>;

    async fn attr(&mut self, element: &Self::Element, name: &str) -> Result<Option<String>>;

    async fn click(&mut self, element: &Self::Element) -> Result<()>;

    /// Address of the page currently shown.
    async fn page_url(&mut self) -> Result<String>;

    /// End the session.
    async fn close(self) -> Result<()>
    where
        Self: Sized;

    /// First element matching `locator`.
    async fn find(&mut self, locator: &Locator) -> Result<Self::Element> {
        self.find_all(locator)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| crate::Error::ElementNotFound(locator.to_string()))
    }

    /// First element below `parent` matching `locator`.
    async fn find_in(&mut self, parent: &Self::Element, locator: &Locator) -> Result<Self::Element> {
        self.find_all_in(parent, locator)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| crate::Error::ElementNotFound(locator.to_string()))
    }

    /// Text of the whole `<body>`.
    async fn page_text(&mut self) -> Result<String> {
        let body = self.find(&locator::BODY).await?;
        self.text(&body).await
    }
}
