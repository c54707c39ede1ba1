use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use crate::extract::{ProductSummary, ReviewRecord};
use crate::Result;

pub const HEADER: [&str; 8] = [
    "URL",
    "Product Name",
    "Brand",
    "Rating",
    "Review",
    "Review Date",
    "Energy Star",
    "Capacity",
];

/// One line of output: a product with at most one of its reviews.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputRow {
    pub url: String,
    pub title: String,
    pub brand: String,
    pub rating: String,
    pub review: String,
    pub date: String,
    pub energy_rating: String,
    pub capacity: String,
}

impl OutputRow {
    pub fn new(product: &ProductSummary, review: &ReviewRecord) -> Self {
        Self {
            rating: review.rating.clone(),
            review: review.body.clone(),
            date: review.date.clone(),
            ..Self::bare(product)
        }
    }

    /// Product row with the review columns left empty.
    pub fn bare(product: &ProductSummary) -> Self {
        Self {
            url: product.url.clone(),
            title: product.title.clone(),
            brand: product.brand.clone(),
            energy_rating: product.energy_rating.clone(),
            capacity: product.capacity.clone(),
            ..Default::default()
        }
    }

    /// Columns in `HEADER` order.
    pub fn as_record(&self) -> [&str; 8] {
        [
            self.url.as_str(),
            self.title.as_str(),
            self.brand.as_str(),
            self.rating.as_str(),
            self.review.as_str(),
            self.date.as_str(),
            self.energy_rating.as_str(),
            self.capacity.as_str(),
        ]
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WriteMode {
    /// Keep whatever the file holds; every run adds its own header.
    #[default]
    Append,
    /// Start the file over when the header is written.
    Truncate,
}

/// Appends CSV rows to a file, opening and closing it for every row so that
/// each written row is on disk even if the run dies later.
#[derive(Debug, Clone)]
pub struct RecordWriter {
    path: PathBuf,
    mode: WriteMode,
}

impl RecordWriter {
    pub fn new(path: impl Into<PathBuf>, mode: WriteMode) -> Self {
        Self {
            path: path.into(),
            mode,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write_header(&self) -> Result<()> {
        let file = match self.mode {
            WriteMode::Append => self.open_append()?,
            WriteMode::Truncate => File::create(&self.path)?,
        };
        write_record(file, &HEADER)
    }

    pub fn append_row(&self, row: &OutputRow) -> Result<()> {
        write_record(self.open_append()?, &row.as_record())
    }

    fn open_append(&self) -> Result<File> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        Ok(file)
    }
}

fn write_record(file: File, record: &[&str]) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);
    wtr.write_record(record)?;
    wtr.flush()?;
    Ok(())
}
