use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("No element matches the locator: {0}")]
    ElementNotFound(String),
    #[error("Element was found but clicking it failed: {0}")]
    ClickFailed(String),
    #[error("Element `{locator}` has no `{attribute}` attribute")]
    AttributeMissing { locator: String, attribute: String },
    #[error("The selector you are trying to scrape for is invalid. Selector: {0}")]
    InvalidSelector(String),

    #[error("No page has been loaded yet.")]
    NotNavigated,
    #[error("No stored page for URL: {0}")]
    PageMissing(String),
    #[error("Couldn't parse URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Io Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Csv Error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Reqwest Error: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("WebDriver Error: {0}")]
    WebDriver(#[from] thirtyfour::error::WebDriverError),
    #[error("Couldn't start the browser driver: {0}")]
    DriverStartup(String),
}

impl Error {
    /// Anticipated lookup failures that extractors replace with an empty value.
    pub fn is_lookup(&self) -> bool {
        matches!(
            self,
            Error::ElementNotFound(_)
                | Error::ClickFailed(_)
                | Error::AttributeMissing { .. }
                | Error::InvalidSelector(_)
        )
    }
}
