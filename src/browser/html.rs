use std::collections::HashMap;

use reqwest::{Client, Url};

use super::Browser;
use crate::locator::Locator;
use crate::parse::{select_document, select_fragment};
use crate::request::{build_client, request_page_html};
use crate::{Error, Result};

/// Script-free backend: pages are plain GET responses and locators are
/// evaluated with `scraper`. Clicking a link follows its `href`.
pub struct HtmlBrowser {
    source: PageSource,
    current: Option<LoadedPage>,
}

enum PageSource {
    Http(Client),
    /// Pages keyed by their normalised URL.
    Stored(HashMap<String, String>),
}

struct LoadedPage {
    url: Url,
    html: String,
}

/// Snapshot of an element taken when it was located.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlElement {
    text: String,
    attrs: Vec<(String, String)>,
    html: String,
}

impl HtmlElement {
    pub(crate) fn new(text: String, attrs: Vec<(String, String)>, html: String) -> Self {
        Self { text, attrs, html }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn html(&self) -> &str {
        &self.html
    }
}

impl HtmlBrowser {
    /// Fetches every page over HTTP.
    pub fn new() -> Result<Self> {
        Ok(Self {
            source: PageSource::Http(build_client()?),
            current: None,
        })
    }

    /// Serves pages from memory instead of the network, e.g. saved copies of
    /// product pages.
    pub fn from_pages<I, K, V>(pages: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut stored = HashMap::new();
        for (url, html) in pages {
            let url = Url::parse(url.as_ref())?;
            stored.insert(url.to_string(), html.into());
        }
        Ok(Self {
            source: PageSource::Stored(stored),
            current: None,
        })
    }

    /// URL of the page currently loaded.
    pub fn current_url(&self) -> Option<&Url> {
        self.current.as_ref().map(|page| &page.url)
    }

    async fn load(&mut self, url: Url) -> Result<()> {
        let html = match &self.source {
            PageSource::Http(client) => request_page_html(client, &url).await?,
            PageSource::Stored(pages) => pages
                .get(url.as_str())
                .cloned()
                .ok_or_else(|| Error::PageMissing(url.to_string()))?,
        };
        self.current = Some(LoadedPage { url, html });
        Ok(())
    }

    fn page(&self) -> Result<&LoadedPage> {
        self.current.as_ref().ok_or(Error::NotNavigated)
    }
}

impl Browser for HtmlBrowser {
    type Element = HtmlElement;

    async fn goto(&mut self, url: &str) -> Result<()> {
        let url = Url::parse(url)?;
        self.load(url).await
    }

    async fn find_all(&mut self, locator: &Locator) -> Result<Vec<HtmlElement>> {
        select_document(&self.page()?.html, locator.css)
    }

    async fn find_all_in(
        &mut self,
        parent: &HtmlElement,
        locator: &Locator,
    ) -> Result<Vec<HtmlElement>> {
        select_fragment(parent, locator.css)
    }

    async fn text(&mut self, element: &HtmlElement) -> Result<String> {
        Ok(element.text.clone())
    }

    async fn attr(&mut self, element: &HtmlElement, name: &str) -> Result<Option<String>> {
        Ok(element.attr(name).map(str::to_string))
    }

    async fn click(&mut self, element: &HtmlElement) -> Result<()> {
        let href = element
            .attr("href")
            .ok_or_else(|| Error::ClickFailed(format!("element without href: {}", element.html)))?;
        let target = self.page()?.url.join(href)?;
        self.load(target).await
    }

    async fn page_url(&mut self) -> Result<String> {
        Ok(self.page()?.url.to_string())
    }

    async fn close(self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locator::{NEXT_PAGE, TITLE};

    fn shop() -> HtmlBrowser {
        HtmlBrowser::from_pages([
            (
                "https://shop.test/dp/1",
                r#"<html><body><span id="productTitle">Kettle</span>
                   <ul><li class="a-last"><a href="/reviews/1?page=2">Next</a></li></ul>
                   </body></html>"#,
            ),
            (
                "https://shop.test/reviews/1?page=2",
                r#"<html><body><p>second page</p>
                   <ul><li class="a-last"><a>Next</a></li></ul></body></html>"#,
            ),
        ])
        .unwrap()
    }

    #[tokio::test]
    async fn queries_before_navigation_fail() {
        let mut browser = shop();
        let err = browser.find(&TITLE).await.unwrap_err();
        assert!(matches!(err, Error::NotNavigated));
    }

    #[tokio::test]
    async fn finds_text_on_current_page() {
        let mut browser = shop();
        browser.goto("https://shop.test/dp/1").await.unwrap();
        let title = browser.find(&TITLE).await.unwrap();
        assert_eq!(browser.text(&title).await.unwrap(), "Kettle");
    }

    #[tokio::test]
    async fn click_follows_relative_links() {
        let mut browser = shop();
        browser.goto("https://shop.test/dp/1").await.unwrap();
        let next = browser.find(&NEXT_PAGE).await.unwrap();
        browser.click(&next).await.unwrap();

        assert_eq!(
            browser.current_url().map(Url::as_str),
            Some("https://shop.test/reviews/1?page=2")
        );
        assert_eq!(
            browser.page_url().await.unwrap(),
            "https://shop.test/reviews/1?page=2"
        );
        assert_eq!(browser.page_text().await.unwrap(), "second page Next");
    }

    #[tokio::test]
    async fn click_without_href_fails() {
        let mut browser = shop();
        browser.goto("https://shop.test/reviews/1?page=2").await.unwrap();
        let next = browser.find(&NEXT_PAGE).await.unwrap();
        let err = browser.click(&next).await.unwrap_err();
        assert!(matches!(err, Error::ClickFailed(_)));
    }

    #[tokio::test]
    async fn unknown_pages_are_reported() {
        let mut browser = shop();
        let err = browser.goto("https://shop.test/dp/404").await.unwrap_err();
        assert!(matches!(err, Error::PageMissing(_)));
    }
}
