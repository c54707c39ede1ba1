use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use reqwest::Url;
use thirtyfour::prelude::*;
use thirtyfour::ChromeCapabilities;
use tokio::process::{Child, Command};

use super::Browser;
use crate::locator::Locator;
use crate::{info_time, warn_time, Error, Result};

const CONNECT_ATTEMPTS: u32 = 10;
const CONNECT_RETRY_DELAY: Duration = Duration::from_millis(500);
const DEFAULT_DRIVER_PORT: u16 = 9515;

#[derive(Debug, Clone)]
pub struct DriverOptions {
    /// Where the WebDriver server listens.
    pub server_url: String,
    /// When set, the driver executable is started (and killed) by us.
    pub driver_path: Option<PathBuf>,
    pub headless: bool,
}

/// A real browser session driven over the WebDriver protocol.
pub struct WebDriverBrowser {
    driver: WebDriver,
    // Held so the spawned driver dies with the session.
    _driver_process: Option<Child>,
}

impl WebDriverBrowser {
    /// Opens a Chrome session with images and scripting switched off.
    pub async fn connect(options: &DriverOptions) -> Result<Self> {
        let driver_process = match &options.driver_path {
            Some(path) => Some(spawn_driver(path, &options.server_url)?),
            None => None,
        };

        let caps = chrome_capabilities(options.headless)?;

        // A freshly spawned driver needs a moment before it accepts sessions.
        let mut attempt = 1;
        let driver = loop {
            match WebDriver::new(options.server_url.as_str(), caps.clone()).await {
                Ok(driver) => break driver,
                Err(e) if attempt < CONNECT_ATTEMPTS => {
                    warn_time!(
                        "WebDriver connection attempt {}/{} failed: {}",
                        attempt,
                        CONNECT_ATTEMPTS,
                        e
                    );
                    attempt += 1;
                    tokio::time::sleep(CONNECT_RETRY_DELAY).await;
                }
                Err(e) => return Err(e.into()),
            }
        };
        info_time!("Browser session open on {}", options.server_url);

        Ok(Self {
            driver,
            _driver_process: driver_process,
        })
    }
}

fn chrome_capabilities(headless: bool) -> Result<ChromeCapabilities> {
    let mut caps = DesiredCapabilities::chrome();
    caps.add_arg("--disable-javascript")?;
    caps.add_arg("--blink-settings=imagesEnabled=false")?;
    if headless {
        caps.set_headless()?;
    }
    Ok(caps)
}

fn spawn_driver(path: &Path, server_url: &str) -> Result<Child> {
    let port = Url::parse(server_url)?
        .port()
        .unwrap_or(DEFAULT_DRIVER_PORT);

    let child = Command::new(path)
        .arg(format!("--port={port}"))
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| Error::DriverStartup(format!("{}: {e}", path.display())))?;
    info_time!("Started {} on port {port}", path.display());
    Ok(child)
}

impl Browser for WebDriverBrowser {
    type Element = WebElement;

    async fn goto(&mut self, url: &str) -> Result<()> {
        self.driver.goto(url).await?;
        Ok(())
    }

    async fn find_all(&mut self, locator: &Locator) -> Result<Vec<WebElement>> {
        let found = self.driver.find_all(By::Css(locator.css)).await?;
        Ok(found)
    }

    async fn find_all_in(
        &mut self,
        parent: &WebElement,
        locator: &Locator,
    ) -> Result<Vec<WebElement>> {
        let found = parent.find_all(By::Css(locator.css)).await?;
        Ok(found)
    }

    async fn text(&mut self, element: &WebElement) -> Result<String> {
        let text = element.text().await?;
        Ok(text)
    }

    async fn attr(&mut self, element: &WebElement, name: &str) -> Result<Option<String>> {
        let value = element.attr(name).await?;
        Ok(value)
    }

    async fn click(&mut self, element: &WebElement) -> Result<()> {
        element
            .click()
            .await
            .map_err(|e| Error::ClickFailed(e.to_string()))
    }

    async fn page_url(&mut self) -> Result<String> {
        let url = self.driver.current_url().await?;
        Ok(url.to_string())
    }

    async fn close(self) -> Result<()> {
        self.driver.quit().await?;
        info_time!("Browser session closed");
        Ok(())
    }
}
