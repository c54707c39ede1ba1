use reqwest::{Client, Url};

use crate::{info_time, Result, USER_AGENT};

pub(crate) fn build_client() -> Result<Client> {
    let client = Client::builder().user_agent(USER_AGENT).build()?;
    Ok(client)
}

/// Requests a page and returns a `Result<String>` containing the HTML.
/// Non-success statuses are treated as errors.
pub(crate) async fn request_page_html(client: &Client, url: &Url) -> Result<String> {
    info_time!("Requesting page: {url}");
    let res = client.get(url.clone()).send().await?.error_for_status()?;
    let html = res.text().await?;
    Ok(html)
}
