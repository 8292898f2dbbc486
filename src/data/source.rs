use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};

// ---------------------------------------------------------------------------
// SourceLocation – where readings come from
// ---------------------------------------------------------------------------

/// A local file or an HTTP(S) URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SourceLocation {
    Path(PathBuf),
    Url(String),
}

/// File formats the loader understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
    Parquet,
}

impl SourceLocation {
    /// Interpret a user-supplied location string.
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        let lower = s.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            SourceLocation::Url(s.to_string())
        } else {
            SourceLocation::Path(PathBuf::from(s))
        }
    }

    /// Stable cache key.
    pub fn key(&self) -> String {
        self.to_string()
    }

    /// Format chosen by extension; anything unrecognised is read as CSV.
    pub fn format(&self) -> SourceFormat {
        let name = match self {
            SourceLocation::Path(p) => p.to_string_lossy().into_owned(),
            // drop query string / fragment before looking at the extension
            SourceLocation::Url(u) => u
                .split(['?', '#'])
                .next()
                .unwrap_or_default()
                .to_string(),
        };
        let ext = Path::new(&name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        match ext.as_str() {
            "parquet" | "pq" => SourceFormat::Parquet,
            _ => SourceFormat::Csv,
        }
    }

    /// Read the whole source into memory.
    ///
    /// Remote fetches are bounded by `timeout`; local reads are not.
    pub fn read_bytes(&self, timeout: Duration) -> Result<Vec<u8>> {
        match self {
            SourceLocation::Path(p) => {
                std::fs::read(p).with_context(|| format!("reading {}", p.display()))
            }
            SourceLocation::Url(u) => fetch(u, timeout),
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceLocation::Path(p) => write!(f, "{}", p.display()),
            SourceLocation::Url(u) => write!(f, "{u}"),
        }
    }
}

fn fetch(url: &str, timeout: Duration) -> Result<Vec<u8>> {
    let client = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .build()
        .context("building HTTP client")?;

    let resp = client
        .get(url)
        .send()
        .with_context(|| format!("GET {url}"))?
        .error_for_status()
        .with_context(|| format!("GET {url}"))?;

    let body = resp.bytes().context("reading response body")?;
    Ok(body.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_distinguishes_urls() {
        assert_eq!(
            SourceLocation::parse(" https://host/data.csv "),
            SourceLocation::Url("https://host/data.csv".into())
        );
        assert_eq!(
            SourceLocation::parse("HTTP://host/x"),
            SourceLocation::Url("HTTP://host/x".into())
        );
        assert_eq!(
            SourceLocation::parse("data/df_clean.csv"),
            SourceLocation::Path(PathBuf::from("data/df_clean.csv"))
        );
    }

    #[test]
    fn format_by_extension() {
        assert_eq!(SourceLocation::parse("a.csv").format(), SourceFormat::Csv);
        assert_eq!(SourceLocation::parse("a.PARQUET").format(), SourceFormat::Parquet);
        assert_eq!(SourceLocation::parse("a.pq").format(), SourceFormat::Parquet);
        assert_eq!(SourceLocation::parse("readings").format(), SourceFormat::Csv);
        assert_eq!(
            SourceLocation::parse("https://h/x.parquet?token=1").format(),
            SourceFormat::Parquet
        );
    }

    #[test]
    fn missing_file_is_an_error() {
        let loc = SourceLocation::parse("/definitely/not/here.csv");
        assert!(loc.read_bytes(Duration::from_secs(1)).is_err());
    }
}
