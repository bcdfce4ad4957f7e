//! Spreadsheet connection: where activity rows come from, and how long a read stays fresh.
//!
//! A [`SheetSource`] fetches the raw sheet (CSV export over HTTP, or a local
//! file). [`SheetConnection`] wraps one source with a freshness window so a
//! burst of page loads hits the external service at most once per window.

use crate::schema::ActivityRecord;
use crate::sheet_parser::{self, RawSheet};
use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::{debug, info};

pub const ACTIVITY_COLUMN: &str = "Aktivitet";
pub const MONTH_COLUMN: &str = "Månad";
pub const CATEGORY_COLUMN: &str = "Kategori";

/// Every activity weighs the same on the wheel.
const ACTIVITY_VALUE: f64 = 1.0;

const MONTH_NAMES: [&str; 12] = [
    "Januari", "Februari", "Mars", "April", "Maj", "Juni", "Juli", "Augusti", "September",
    "Oktober", "November", "December",
];

/// Async trait implemented by each sheet backend.
#[async_trait::async_trait]
pub trait SheetSource: Send + Sync {
    fn name(&self) -> &str;
    async fn fetch(&self) -> Result<RawSheet>;
}

/// Published CSV export of a sheet (e.g. Google Sheets `export?format=csv`).
pub struct CsvUrlSource {
    url: String,
    client: reqwest::Client,
}

impl CsvUrlSource {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client,
        }
    }
}

#[async_trait::async_trait]
impl SheetSource for CsvUrlSource {
    fn name(&self) -> &str {
        "csv_url"
    }

    async fn fetch(&self) -> Result<RawSheet> {
        debug!("CsvUrlSource: GET {}", self.url);

        let resp = self
            .client
            .get(&self.url)
            .send()
            .await
            .context("Failed to request sheet export")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            anyhow::bail!("Sheet export error ({}): {}", status, text);
        }

        let body = resp.bytes().await.context("Failed to read sheet export")?;
        sheet_parser::parse_csv("sheet", &body)
    }
}

/// Local `.csv` / `.xlsx` / `.xlsb` file.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait::async_trait]
impl SheetSource for FileSource {
    fn name(&self) -> &str {
        "file"
    }

    async fn fetch(&self) -> Result<RawSheet> {
        let data = tokio::fs::read(&self.path)
            .await
            .with_context(|| format!("Failed to read sheet file: {:?}", self.path))?;
        sheet_parser::parse_file(&self.path.to_string_lossy(), &data)
    }
}

#[derive(Clone)]
struct CachedSheet {
    sheet: Arc<RawSheet>,
    fetched_at: Instant,
}

/// Handle to one sheet source with a read cache of `ttl`.
#[derive(Clone)]
pub struct SheetConnection {
    source: Arc<dyn SheetSource>,
    ttl: Duration,
    cache: Arc<Mutex<Option<CachedSheet>>>,
}

impl SheetConnection {
    pub fn new(source: Arc<dyn SheetSource>, ttl: Duration) -> Self {
        Self {
            source,
            ttl,
            cache: Arc::new(Mutex::new(None)),
        }
    }

    /// Current sheet, refetched once the cached copy is older than the window.
    pub async fn read(&self) -> Result<Arc<RawSheet>> {
        // Check cache
        {
            let cache = self.cache.lock().unwrap();
            if let Some(ref cached) = *cache {
                if cached.fetched_at.elapsed() < self.ttl {
                    debug!("Using cached sheet from {}", self.source.name());
                    return Ok(cached.sheet.clone());
                }
            }
        }

        let sheet = Arc::new(self.source.fetch().await?);
        info!(
            "Fetched sheet '{}' from {} ({} rows)",
            sheet.name,
            self.source.name(),
            sheet.rows.len()
        );

        *self.cache.lock().unwrap() = Some(CachedSheet {
            sheet: sheet.clone(),
            fetched_at: Instant::now(),
        });

        Ok(sheet)
    }

    /// Read the sheet and turn its rows into activities.
    pub async fn activities(&self) -> Result<Vec<ActivityRecord>> {
        let sheet = self.read().await?;
        activities_from_sheet(&sheet)
    }
}

/// Map rows to activities in source order with a 1-based running id counter.
pub fn activities_from_sheet(sheet: &RawSheet) -> Result<Vec<ActivityRecord>> {
    let column = |name: &str| {
        sheet.column(name).with_context(|| {
            format!(
                "Sheet '{}' has no '{}' column (headers: {:?})",
                sheet.name, name, sheet.headers
            )
        })
    };
    let activity_col = column(ACTIVITY_COLUMN)?;
    let month_col = column(MONTH_COLUMN)?;
    let category_col = column(CATEGORY_COLUMN)?;

    let activities = sheet
        .rows
        .iter()
        .enumerate()
        .map(|(idx, row)| {
            let name = RawSheet::cell(row, activity_col);
            let month = month_abbrev(RawSheet::cell(row, month_col));
            ActivityRecord {
                id: format!("{}_{}_{}", name, month, idx + 1),
                label: name.to_string(),
                parent: month,
                value: ACTIVITY_VALUE,
                description: format!("Description of {}", name),
                category: RawSheet::cell(row, category_col).to_string(),
            }
        })
        .collect();

    Ok(activities)
}

/// First three characters of a month name ("Januari" -> "Jan").
/// Date cells ("2024-03-01") count as the month they fall in.
fn month_abbrev(month: &str) -> String {
    let name = month
        .get(..10)
        .and_then(|day| NaiveDate::parse_from_str(day, "%Y-%m-%d").ok())
        .map(|date| MONTH_NAMES[date.month0() as usize])
        .unwrap_or(month);
    name.chars().take(3).collect()
}
