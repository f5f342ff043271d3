//! Tabular export of crawl results
//!
//! Writes one CSV row per record, columns in the order the result table
//! shows them. Values are passed through exactly as extracted; the engine
//! does no further formatting.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use csv::WriterBuilder;
use tracing::info;

use crate::domain::product::CrawlResult;

const HEADERS: [&str; 5] = ["name", "price", "rating", "review_count", "link"];

/// Write `result` to a CSV file at `path`.
pub fn export_csv(result: &CrawlResult, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create export directory: {}", parent.display())
            })?;
        }
    }

    let mut writer = WriterBuilder::new()
        .from_path(path)
        .with_context(|| format!("Failed to create export file: {}", path.display()))?;

    writer
        .write_record(HEADERS)
        .context("Failed to write CSV header")?;

    for record in &result.records {
        writer
            .write_record([
                record.name.as_str(),
                record.price.as_str(),
                record.rating.as_str(),
                record.review_count.as_str(),
                record.link.as_str(),
            ])
            .context("Failed to write CSV record")?;
    }

    writer.flush().context("Failed to flush CSV writer")?;
    info!(
        rows = result.len(),
        path = %path.display(),
        "Exported crawl result"
    );
    Ok(())
}

/// Timestamped default export filename inside `dir`, matching the desktop
/// tool's naming scheme.
pub fn default_export_path(dir: &Path) -> PathBuf {
    let stamp = Local::now().format("%Y%m%d_%H%M%S");
    dir.join(format!("coupang_products_{stamp}.csv"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::product::ProductRecord;

    fn sample_result() -> CrawlResult {
        CrawlResult {
            records: vec![
                ProductRecord {
                    name: "무선 키보드".to_string(),
                    price: "32900".to_string(),
                    rating: "4.5".to_string(),
                    review_count: "1203".to_string(),
                    link: "https://www.coupang.com/vp/products/1".to_string(),
                },
                ProductRecord {
                    name: "모니터, 27인치".to_string(),
                    price: "199000".to_string(),
                    rating: "no rating".to_string(),
                    review_count: "0".to_string(),
                    link: "https://www.coupang.com/vp/products/2".to_string(),
                },
            ],
            pages_visited: 1,
        }
    }

    #[test]
    fn writes_header_and_one_row_per_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");

        export_csv(&sample_result(), &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "name,price,rating,review_count,link");
        assert!(lines[1].starts_with("무선 키보드,32900,4.5,1203,"));
    }

    #[test]
    fn values_with_commas_survive_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");

        export_csv(&sample_result(), &path).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows[1].get(0).unwrap(), "모니터, 27인치");
        assert_eq!(rows[1].get(2).unwrap(), "no rating");
    }

    #[test]
    fn empty_result_still_writes_the_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");

        export_csv(&CrawlResult::default(), &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 1);
    }

    #[test]
    fn default_path_carries_the_naming_scheme() {
        let path = default_export_path(Path::new("/tmp/exports"));
        let name = path.file_name().unwrap().to_string_lossy();
        assert!(name.starts_with("coupang_products_"));
        assert!(name.ends_with(".csv"));
    }
}
