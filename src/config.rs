//! Runtime configuration read from the environment (and `.env`).

use crate::merge::OverflowTarget;
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_TEMPLATE_PATH: &str = "template.json";
const DEFAULT_EDIT_URL: &str = "https://docs.google.com/spreadsheets/d/1fYiKbV1Cl0DZAwVA50J8xjBeYnxhUFHiHhmP6qvVoV0/edit?usp=sharing";
const DEFAULT_TITLE: &str = "Näringslivsavdelningen Årshjul";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_TTL_SECS: u64 = 60;

/// Where activity rows are read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetLocation {
    CsvUrl(String),
    File(PathBuf),
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub template_path: PathBuf,
    pub sheet: SheetLocation,
    /// Link shown under the chart so people can edit the rows.
    pub sheet_edit_url: String,
    /// How long a sheet read is reused before it is fetched again.
    pub sheet_ttl: Duration,
    pub chart_title: String,
    pub overflow: OverflowTarget,
    pub bind_addr: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| get(key).filter(|v| !v.trim().is_empty());

        let sheet = match (get("WHEEL_SHEET_PATH"), get("WHEEL_SHEET_CSV_URL")) {
            (Some(path), _) => SheetLocation::File(PathBuf::from(path)),
            (None, Some(url)) => SheetLocation::CsvUrl(url),
            (None, None) => {
                anyhow::bail!("Either WHEEL_SHEET_CSV_URL or WHEEL_SHEET_PATH must be set")
            }
        };

        let sheet_ttl = match get("WHEEL_SHEET_TTL_SECS") {
            Some(raw) => Duration::from_secs(
                raw.trim()
                    .parse()
                    .with_context(|| format!("Invalid WHEEL_SHEET_TTL_SECS: {}", raw))?,
            ),
            None => Duration::from_secs(DEFAULT_TTL_SECS),
        };

        let overflow = match get("WHEEL_OVERFLOW_TARGET") {
            Some(raw) => raw
                .trim()
                .parse::<OverflowTarget>()
                .context("Invalid WHEEL_OVERFLOW_TARGET")?,
            None => OverflowTarget::default(),
        };

        Ok(Self {
            template_path: get("WHEEL_TEMPLATE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_TEMPLATE_PATH)),
            sheet,
            sheet_edit_url: get("WHEEL_SHEET_EDIT_URL")
                .unwrap_or_else(|| DEFAULT_EDIT_URL.to_string()),
            sheet_ttl,
            chart_title: get("WHEEL_CHART_TITLE").unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            overflow,
            bind_addr: get("WHEEL_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let cfg = config(&[("WHEEL_SHEET_CSV_URL", "https://example.com/export?format=csv")]).unwrap();
        assert_eq!(
            cfg.sheet,
            SheetLocation::CsvUrl("https://example.com/export?format=csv".to_string())
        );
        assert_eq!(cfg.template_path, PathBuf::from("template.json"));
        assert_eq!(cfg.sheet_ttl, Duration::from_secs(60));
        assert_eq!(cfg.overflow, OverflowTarget::QuarterIds);
        assert_eq!(cfg.bind_addr, "0.0.0.0:3000");
        assert_eq!(cfg.chart_title, "Näringslivsavdelningen Årshjul");
    }

    #[test]
    fn test_sheet_path_wins_over_url() {
        let cfg = config(&[
            ("WHEEL_SHEET_CSV_URL", "https://example.com"),
            ("WHEEL_SHEET_PATH", "rows.xlsx"),
        ])
        .unwrap();
        assert_eq!(cfg.sheet, SheetLocation::File(PathBuf::from("rows.xlsx")));
    }

    #[test]
    fn test_missing_sheet_fails() {
        assert!(config(&[("WHEEL_SHEET_CSV_URL", "  ")]).is_err());
    }

    #[test]
    fn test_overrides() {
        let cfg = config(&[
            ("WHEEL_SHEET_PATH", "rows.csv"),
            ("WHEEL_SHEET_TTL_SECS", "5"),
            ("WHEEL_OVERFLOW_TARGET", "quarter_children"),
            ("WHEEL_CHART_TITLE", "Årshjul 2025"),
        ])
        .unwrap();
        assert_eq!(cfg.sheet_ttl, Duration::from_secs(5));
        assert_eq!(cfg.overflow, OverflowTarget::QuarterChildren);
        assert_eq!(cfg.chart_title, "Årshjul 2025");
    }

    #[test]
    fn test_invalid_values_fail() {
        assert!(config(&[("WHEEL_SHEET_PATH", "r.csv"), ("WHEEL_SHEET_TTL_SECS", "soon")]).is_err());
        assert!(config(&[("WHEEL_SHEET_PATH", "r.csv"), ("WHEEL_OVERFLOW_TARGET", "months")]).is_err());
    }
}
