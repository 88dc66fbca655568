//! Month-by-month export of a gauge's traffic feed.
//!
//! Pages are walked from the newest month to the oldest by following the
//! older-page link of each response. Every page with records lands in its
//! own `<root>/<site>/<site>-<YYYY-MM>.csv`.

use crate::client::Fetch;
use crate::error::GaugesError;
use crate::models::{SiteDescriptor, decode_month_page, decode_profile};
use crate::output::{ensure_dir, month_file_path, site_dir_name, write_records};
use log::{error, info, warn};
use std::collections::HashSet;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportSummary {
    pub pages: usize,
    pub files_written: usize,
    pub records: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub sites: usize,
    pub exported: usize,
    pub failed: usize,
    pub files_written: usize,
}

/// Fetch the profile and list the gauges it contains.
pub async fn list_sites<F: Fetch>(
    fetcher: &F,
    profile_url: &str,
) -> Result<Vec<SiteDescriptor>, GaugesError> {
    let body = fetcher.fetch(profile_url).await?;
    let sites = decode_profile(&body)?;
    info!("Found {} gauges", sites.len());
    Ok(sites)
}

pub struct MonthExporter<'a, F> {
    fetcher: &'a F,
    output_root: PathBuf,
}

impl<'a, F: Fetch> MonthExporter<'a, F> {
    pub fn new(fetcher: &'a F, output_root: impl Into<PathBuf>) -> Self {
        Self {
            fetcher,
            output_root: output_root.into(),
        }
    }

    /// Export every site in order. A failing site is logged and skipped.
    pub async fn export_all(&self, sites: &[SiteDescriptor]) -> RunSummary {
        let mut summary = RunSummary {
            sites: sites.len(),
            ..Default::default()
        };
        for site in sites {
            let id = site.id.as_deref().unwrap_or("-");
            info!("Exporting traffic for site {} (gauge {})", site.title, id);
            match self.export(&site.traffic_url, &site.title).await {
                Ok(export) => {
                    summary.exported += 1;
                    summary.files_written += export.files_written;
                    info!(
                        "Exported {} months ({} days) for site {} (gauge {})",
                        export.files_written, export.records, site.title, id
                    );
                }
                Err(err) => {
                    summary.failed += 1;
                    error!(
                        "Error while exporting monthly data for site {} (gauge {}): {}",
                        site.title, id, err
                    );
                }
            }
        }
        summary
    }

    /// Follow the feed from `feed_url` until no older page remains.
    ///
    /// Files written before a failure are kept.
    pub async fn export(
        &self,
        feed_url: &str,
        site_name: &str,
    ) -> Result<ExportSummary, GaugesError> {
        let site = site_dir_name(site_name);
        let site_dir = self.output_root.join(&site);
        let mut summary = ExportSummary::default();
        let mut visited = HashSet::new();
        let mut next = Some(feed_url.to_string());

        while let Some(url) = next.take() {
            if !visited.insert(url.clone()) {
                warn!(
                    "Older page {} for site {} was already exported, stopping",
                    url, site_name
                );
                break;
            }

            let body = self.fetcher.fetch(&url).await?;
            let page = decode_month_page(&body)?;
            summary.pages += 1;

            match page.month()? {
                Some(month) => {
                    ensure_dir(&site_dir)?;
                    let path = month_file_path(&site_dir, &site, &month);
                    write_records(&path, &page.records)?;
                    summary.files_written += 1;
                    summary.records += page.records.len();
                    info!("Wrote {} days to {}", page.records.len(), path.display());
                }
                None => warn!("Skipping empty traffic page {} for site {}", url, site_name),
            }

            next = page.older_url;
        }

        Ok(summary)
    }
}
