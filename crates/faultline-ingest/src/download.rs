//! Per-month bulletin download with a local file cache.
//!
//! Bulletins are published as one XML file per calendar month. A file
//! already present in the cache is reused unless it is the current
//! month's, which may still be growing and is always re-fetched.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{Datelike, Local};

use faultline_core::config::YearMonth;

use crate::error::Result;

const DEFAULT_BASE_URL: &str = "http://udim.koeri.boun.edu.tr/zeqmap/xmlt";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// A response shorter than this is an empty month, not a bulletin.
const MIN_BULLETIN_BYTES: usize = 100;

/// Downloads and caches monthly bulletin files.
pub struct BulletinStore {
    cache_dir: PathBuf,
    base_url: String,
    client: reqwest::Client,
}

impl BulletinStore {
    /// Open a store rooted at `cache_dir`, creating the directory if
    /// needed.
    pub fn new(cache_dir: impl Into<PathBuf>) -> Result<Self> {
        let cache_dir = cache_dir.into();
        fs::create_dir_all(&cache_dir)?;

        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self { cache_dir, base_url: DEFAULT_BASE_URL.to_string(), client })
    }

    /// Point the store at a different bulletin server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    fn month_file(&self, month: YearMonth) -> PathBuf {
        self.cache_dir.join(format!("{:04}{:02}.xml", month.year, month.month))
    }

    fn month_url(&self, month: YearMonth) -> String {
        format!("{}/{:04}{:02}.xml", self.base_url, month.year, month.month)
    }

    /// Fetch every month in the inclusive period, returning the paths of
    /// the bulletin files now present, in period order.
    ///
    /// Already-cached non-current months are reused without a request.
    /// Per-month failures (HTTP errors, empty responses) are logged and
    /// skipped; they never abort the period.
    pub async fn fetch_period(&self, start: YearMonth, end: YearMonth) -> Result<Vec<PathBuf>> {
        let now = Local::now();
        let current = YearMonth::new(now.year(), now.month());

        let mut files = Vec::new();

        for month in months_in(start, end) {
            let file = self.month_file(month);

            if file.exists() && month != current {
                tracing::debug!(month = %month, "bulletin already cached");
                files.push(file);
                continue;
            }

            match self.fetch_month(month, &file).await {
                Ok(true) => files.push(file),
                Ok(false) => {}
                Err(e) => {
                    tracing::warn!(month = %month, error = %e, "failed to fetch bulletin");
                }
            }
        }

        tracing::info!(files = files.len(), %start, %end, "bulletin period ready");

        Ok(files)
    }

    /// Fetch one month into `file`. Returns false when the month has no
    /// usable bulletin (empty response).
    async fn fetch_month(&self, month: YearMonth, file: &Path) -> Result<bool> {
        let url = self.month_url(month);
        let response = self.client.get(&url).send().await?.error_for_status()?;
        let body = response.bytes().await?;

        if body.len() < MIN_BULLETIN_BYTES {
            tracing::warn!(month = %month, bytes = body.len(), "empty bulletin response");
            return Ok(false);
        }

        fs::write(file, &body)?;
        tracing::info!(month = %month, bytes = body.len(), "downloaded bulletin");
        Ok(true)
    }

    /// List the bulletin files already cached for the period, without
    /// touching the network. Months with no cached file are skipped.
    pub fn cached_period(&self, start: YearMonth, end: YearMonth) -> Vec<PathBuf> {
        months_in(start, end)
            .into_iter()
            .map(|month| self.month_file(month))
            .filter(|file| file.exists())
            .collect()
    }
}

/// Every year-month from `start` through `end`, inclusive. Empty when the
/// period is inverted.
pub fn months_in(start: YearMonth, end: YearMonth) -> Vec<YearMonth> {
    let mut months = Vec::new();
    if start > end {
        return months;
    }

    for year in start.year..=end.year {
        let first = if year == start.year { start.month } else { 1 };
        let last = if year == end.year { end.month } else { 12 };
        for month in first..=last {
            months.push(YearMonth::new(year, month));
        }
    }

    months
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_months_in_single_year() {
        let months = months_in(YearMonth::new(2023, 2), YearMonth::new(2023, 4));
        assert_eq!(
            months,
            vec![YearMonth::new(2023, 2), YearMonth::new(2023, 3), YearMonth::new(2023, 4)]
        );
    }

    #[test]
    fn test_months_in_spanning_years() {
        let months = months_in(YearMonth::new(2022, 11), YearMonth::new(2023, 2));
        assert_eq!(months.len(), 4);
        assert_eq!(months.first(), Some(&YearMonth::new(2022, 11)));
        assert_eq!(months.last(), Some(&YearMonth::new(2023, 2)));
    }

    #[test]
    fn test_months_in_inverted_period_is_empty() {
        assert!(months_in(YearMonth::new(2023, 3), YearMonth::new(2023, 2)).is_empty());
    }

    #[test]
    fn test_cached_period_lists_only_existing_files() {
        let dir = tempdir().unwrap();
        let store = BulletinStore::new(dir.path()).unwrap();

        fs::write(dir.path().join("202302.xml"), "x").unwrap();
        fs::write(dir.path().join("202304.xml"), "x").unwrap();

        let cached = store.cached_period(YearMonth::new(2023, 2), YearMonth::new(2023, 4));
        assert_eq!(
            cached,
            vec![dir.path().join("202302.xml"), dir.path().join("202304.xml")]
        );
    }

    #[test]
    fn test_store_creates_cache_dir() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("bulletins/cache");
        let store = BulletinStore::new(&nested).unwrap();
        assert!(store.cache_dir().exists());
    }

    #[tokio::test]
    async fn test_fetch_period_reuses_cached_past_months() {
        let dir = tempdir().unwrap();
        // Unroutable base URL: any actual fetch attempt fails, so only the
        // cached path can satisfy the period.
        let store = BulletinStore::new(dir.path())
            .unwrap()
            .with_base_url("http://127.0.0.1:1/xmlt");

        fs::write(dir.path().join("202302.xml"), "cached bulletin").unwrap();

        let files = store
            .fetch_period(YearMonth::new(2023, 2), YearMonth::new(2023, 3))
            .await
            .unwrap();

        // 2023-02 came from the cache; 2023-03 failed to download and was
        // skipped without aborting the period.
        assert_eq!(files, vec![dir.path().join("202302.xml")]);
    }
}
