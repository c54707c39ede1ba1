//! PRODUCT REVIEW SCRAPER
//! Reads product URLs, writes one CSV row per review.

pub mod browser;
pub mod config;
mod error;
pub mod extract;
pub mod locator;
mod macros;
pub mod paginate;
mod parse;
pub mod process;
pub mod record;
mod request;
pub mod settle;

pub use error::{Error, Result};

const DEFAULT_INPUT: &str = "products_input.csv";
const DEFAULT_OUTPUT: &str = "output.csv";
const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:9515";
const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
