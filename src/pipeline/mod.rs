//! Pipeline orchestrator: ties page source → extractor → CSV sink together.
//!
//! ## Run modes
//!
//! `run()` — every catalog chart in the fixed order, one file per chart.
//!   With `stop_on_error` (default) the first failing chart ends the run and
//!   its error is returned; otherwise the failure is logged, counted in
//!   `PipelineStats::errors`, and the remaining charts still run.
//!
//! `scrape_chart()` — a single chart. The page is fetched and fully extracted
//! before the output file is opened, so a failed fetch never touches it.
//!
//! `resolve_identifier()` — search-page lookup of a single title's ID.

use crate::catalog::{self, ChartDefinition};
use crate::config::AppConfig;
use crate::error::ScrapeError;
use crate::models::Record;
use crate::scraper::document::HtmlDocument;
use crate::scraper::extractor::{extract, extract_first};
use crate::scraper::http_client::HttpClient;
use crate::scraper::PageSource;
use crate::storage;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};
use url::Url;

pub struct Pipeline {
    config: AppConfig,
    source: Arc<dyn PageSource>,
}

impl Pipeline {
    pub fn new(config: AppConfig) -> Result<Self> {
        let client = HttpClient::new(&config.scraper).context("Failed to build scraper")?;
        Ok(Self::with_source(config, Arc::new(client)))
    }

    pub fn with_source(config: AppConfig, source: Arc<dyn PageSource>) -> Self {
        Self { config, source }
    }

    pub async fn run(&self, data_dir: &Path) -> Result<PipelineStats> {
        std::fs::create_dir_all(data_dir)
            .with_context(|| format!("Could not create dir {:?}", data_dir))?;

        let started = Instant::now();
        let mut stats = PipelineStats::default();

        for def in catalog::CHARTS {
            let path = data_dir.join(def.file_name);
            info!("=== {} ===", def.name);

            match self.scrape_chart(def, &path).await {
                Ok(chart) => {
                    stats.charts_written += 1;
                    stats.records_written += chart.records;
                }
                Err(e) if self.config.pipeline.stop_on_error => return Err(e),
                Err(e) => {
                    warn!("{}: {:#}", def.name, e);
                    stats.errors += 1;
                }
            }
        }

        stats.elapsed = started.elapsed();
        info!(
            "=== Done: {} charts | {} records | {} errors | {:.2?} ===",
            stats.charts_written, stats.records_written, stats.errors, stats.elapsed
        );
        Ok(stats)
    }

    pub async fn scrape_chart(&self, def: &ChartDefinition, path: &Path) -> Result<ChartStats> {
        let started = Instant::now();
        let url = def.url(&self.config.scraper);
        info!("Fetching {} ({})", def.name, url);

        let body = self
            .source
            .fetch_page(&url)
            .await
            .with_context(|| format!("{} fetch failed", def.name))?;

        let records = extract_chart(&body, def)
            .with_context(|| format!("{}: extraction from {} failed", def.name, url))?;
        info!("{}: {} records", def.name, records.len());

        let written = storage::write_all(path, def.header, &records)
            .with_context(|| format!("{}: output failed", def.name))?;

        let elapsed = started.elapsed();
        info!("{}: {} records written in {:.2?}", def.name, written, elapsed);

        Ok(ChartStats {
            kind: def.kind,
            records: written,
            path: path.to_path_buf(),
            elapsed,
        })
    }

    /// IMDb ID of the first search hit for `title`, `None` without results.
    pub async fn resolve_identifier(&self, title: &str) -> Result<Option<String>> {
        let base = format!(
            "{}{}",
            catalog::Site::Imdb.base_url(&self.config.scraper),
            catalog::SEARCH_PATH
        );
        let url = Url::parse_with_params(&base, &[("q", title)])
            .map_err(|source| ScrapeError::InvalidUrl { url: base.clone(), source })?;

        let body = self
            .source
            .fetch_page(url.as_str())
            .await
            .with_context(|| format!("Lookup of {:?} failed", title))?;

        let doc = HtmlDocument::parse(&body)
            .with_context(|| format!("Search page for {:?} ({}) is unreadable", title, url))?;
        let first = extract_first(&doc, catalog::SEARCH_ROW_SELECTOR, &[catalog::SEARCH_ID])
            .with_context(|| format!("Extracting {:?} from {} failed", title, url))?;

        Ok(first
            .map(|r| r.identifier().to_string())
            .filter(|id| !id.is_empty()))
    }
}

/// Parse and extract without letting the document outlive the call.
fn extract_chart(body: &[u8], def: &ChartDefinition) -> Result<Vec<Record>, ScrapeError> {
    let doc = HtmlDocument::parse(body)?;
    extract(&doc, def.row_selector, def.fields)
}

#[derive(Debug)]
pub struct ChartStats {
    pub kind: catalog::ChartKind,
    pub records: usize,
    pub path: PathBuf,
    pub elapsed: Duration,
}

#[derive(Debug, Default)]
pub struct PipelineStats {
    pub charts_written: usize,
    pub records_written: usize,
    pub errors: usize,
    pub elapsed: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScraperConfig;
    use async_trait::async_trait;
    use reqwest::StatusCode;
    use std::collections::HashMap;

    /// Serves canned bodies by URL; anything unknown is a 404.
    struct StaticSource {
        pages: HashMap<String, String>,
    }

    #[async_trait]
    impl PageSource for StaticSource {
        async fn fetch_page(&self, url: &str) -> Result<Vec<u8>, ScrapeError> {
            match self.pages.get(url) {
                Some(body) => Ok(body.clone().into_bytes()),
                None => Err(ScrapeError::Status {
                    url: url.to_string(),
                    status: StatusCode::NOT_FOUND,
                }),
            }
        }
    }

    fn pipeline(pages: &[(&ChartDefinition, &str)], stop_on_error: bool) -> Pipeline {
        let mut config = AppConfig::default();
        config.pipeline.stop_on_error = stop_on_error;
        let pages = pages
            .iter()
            .map(|(def, body)| (def.url(&config.scraper), body.to_string()))
            .collect();
        Pipeline::with_source(config, Arc::new(StaticSource { pages }))
    }

    const BOX_OFFICE_PAGE: &str = r#"
        <html><body><table class="chart full-width"><tbody>
          <tr><td class="titleColumn"><a href="/title/tt001/?ref_=cht_bo_1">Movie A</a></td></tr>
          <tr><td class="titleColumn"><a href="/title/tt002/">Movie B</a></td></tr>
          <tr><td class="titleColumn"><a href="/title/tt003/?ref_=cht_bo_3">Movie C</a></td></tr>
        </tbody></table></body></html>
    "#;

    const TOP_PAGE: &str = r#"
        <html><body><table><tbody class="lister-list">
          <tr><td class="titleColumn"><a href="/title/tt0111161/">The Shawshank Redemption</a> <span class="secondaryInfo">(1994)</span></td></tr>
          <tr><td class="titleColumn"><a href="/title/tt0068646/">The Godfather</a></td></tr>
        </tbody></table></body></html>
    "#;

    const MOST_POPULAR_PAGE: &str = r#"
        <html><body><table><tbody class="lister-list">
          <tr><td class="titleColumn"><a href="/title/tt15398776/?ref_=chtmvm_t_1">Oppenheimer</a>
              <span class="secondaryInfo">(2023)</span>
              <div class="velocity"><span class="global-sprite titlemeter up"></span>12</div></td></tr>
          <tr><td class="titleColumn"><a href="/title/tt1160419/">Dune</a>
              <span class="secondaryInfo">(2021)</span></td></tr>
        </tbody></table></body></html>
    "#;

    const CERTIFIED_FRESH_PAGE: &str = r#"
        <html><body><div class="discovery-tiles__wrap">
          <div data-qa="discovery-media-list-item">
            <a href="/m/the_godfather" data-qa="discovery-media-list-item-caption">
              <span data-qa="discovery-media-list-item-title">
                  The   Godfather
              </span>
            </a>
          </div>
          <div data-qa="discovery-media-list-item">
            <a href="/m/parasite_2019?ref=tile"><span data-qa="discovery-media-list-item-title"> Parasite </span></a>
          </div>
        </div></body></html>
    "#;

    #[tokio::test]
    async fn test_most_popular_reads_year_from_secondary_info() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(catalog::MOST_POPULAR.file_name);
        let p = pipeline(&[(&catalog::MOST_POPULAR, MOST_POPULAR_PAGE)], true);

        let stats = p.scrape_chart(&catalog::MOST_POPULAR, &path).await.unwrap();
        assert_eq!(stats.records, 2);
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "rank,title,year,IMDb ID\n1,Oppenheimer,2023,tt15398776\n2,Dune,2021,tt1160419\n"
        );
    }

    #[tokio::test]
    async fn test_certified_fresh_tiles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(catalog::CERTIFIED_FRESH.file_name);
        let p = pipeline(&[(&catalog::CERTIFIED_FRESH, CERTIFIED_FRESH_PAGE)], true);

        let stats = p.scrape_chart(&catalog::CERTIFIED_FRESH, &path).await.unwrap();
        assert_eq!(stats.records, 2);
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "rank,title,RT ID\n1,The Godfather,the_godfather\n2,Parasite,parasite_2019\n"
        );
    }

    #[test]
    fn test_records_match_rows_for_every_chart() {
        let fixtures = [
            (&catalog::TOP_250, TOP_PAGE, 2),
            (&catalog::MOST_POPULAR, MOST_POPULAR_PAGE, 2),
            (&catalog::BOX_OFFICE, BOX_OFFICE_PAGE, 3),
            (&catalog::CERTIFIED_FRESH, CERTIFIED_FRESH_PAGE, 2),
        ];
        for (def, page, rows) in fixtures {
            let records = extract_chart(page.as_bytes(), def).unwrap();
            assert_eq!(records.len(), rows, "{}", def.name);
            assert!(records.iter().all(|r| r.arity() == def.header.len()), "{}", def.name);
            assert!(records.iter().enumerate().all(|(i, r)| r.rank == i + 1), "{}", def.name);
        }
    }

    #[test]
    fn test_mis_encoded_title_keeps_every_row() {
        let (head, tail) = BOX_OFFICE_PAGE.split_once("Movie A").unwrap();
        let mut body = head.as_bytes().to_vec();
        body.extend_from_slice(b"Movie \xE9A");
        body.extend_from_slice(tail.as_bytes());

        let records = extract_chart(&body, &catalog::BOX_OFFICE).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].to_row(), vec!["1", "Movie \u{FFFD}A", "tt001"]);
        assert_eq!(records[1].to_row(), vec!["2", "Movie B", "tt002"]);
    }

    #[tokio::test]
    async fn test_box_office_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(catalog::BOX_OFFICE.file_name);
        let p = pipeline(&[(&catalog::BOX_OFFICE, BOX_OFFICE_PAGE)], true);

        let stats = p.scrape_chart(&catalog::BOX_OFFICE, &path).await.unwrap();
        assert_eq!(stats.records, 3);
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "rank,title,IMDb ID\n1,Movie A,tt001\n2,Movie B,tt002\n3,Movie C,tt003\n"
        );
    }

    #[tokio::test]
    async fn test_rerun_is_byte_identical() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("top.csv");
        let p = pipeline(&[(&catalog::TOP_250, TOP_PAGE)], true);

        p.scrape_chart(&catalog::TOP_250, &path).await.unwrap();
        let first = std::fs::read(&path).unwrap();
        p.scrape_chart(&catalog::TOP_250, &path).await.unwrap();
        assert_eq!(first, std::fs::read(&path).unwrap());

        // Missing year stays as an empty column.
        let text = String::from_utf8(first).unwrap();
        assert_eq!(text.lines().nth(2), Some("2,The Godfather,,tt0068646"));
    }

    #[tokio::test]
    async fn test_404_leaves_existing_file_alone() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(catalog::BOX_OFFICE.file_name);
        std::fs::write(&path, "previous run\n").unwrap();
        let p = pipeline(&[], true);

        let err = p.scrape_chart(&catalog::BOX_OFFICE, &path).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ScrapeError>(),
            Some(ScrapeError::Status { status, .. }) if *status == StatusCode::NOT_FOUND
        ));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "previous run\n");
    }

    #[tokio::test]
    async fn test_404_creates_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(catalog::TOP_250.file_name);
        let p = pipeline(&[], true);

        assert!(p.scrape_chart(&catalog::TOP_250, &path).await.is_err());
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_run_stops_at_first_failure() {
        let dir = tempfile::tempdir().unwrap();
        // Top 250 succeeds, most-popular 404s, box office never runs.
        let p = pipeline(
            &[(&catalog::TOP_250, TOP_PAGE), (&catalog::BOX_OFFICE, BOX_OFFICE_PAGE)],
            true,
        );

        assert!(p.run(dir.path()).await.is_err());
        assert!(dir.path().join(catalog::TOP_250.file_name).exists());
        assert!(!dir.path().join(catalog::BOX_OFFICE.file_name).exists());
    }

    #[tokio::test]
    async fn test_run_keeps_going_when_configured() {
        let dir = tempfile::tempdir().unwrap();
        let p = pipeline(
            &[(&catalog::TOP_250, TOP_PAGE), (&catalog::BOX_OFFICE, BOX_OFFICE_PAGE)],
            false,
        );

        let stats = p.run(dir.path()).await.unwrap();
        assert_eq!(stats.charts_written, 2);
        assert_eq!(stats.records_written, 5);
        assert_eq!(stats.errors, 2);
        assert!(dir.path().join(catalog::BOX_OFFICE.file_name).exists());
        assert!(!dir.path().join(catalog::MOST_POPULAR.file_name).exists());
    }

    fn search_pipeline(query: &str, body: &str) -> Pipeline {
        let config = AppConfig::default();
        let url = format!("{}/find?q={}", config.scraper.imdb_base_url, query);
        let pages = HashMap::from([(url, body.to_string())]);
        Pipeline::with_source(config, Arc::new(StaticSource { pages }))
    }

    #[tokio::test]
    async fn test_resolve_identifier_takes_first_result() {
        let body = r#"
            <table class="findList">
              <tr><td class="result_text"><a href="/title/tt0133093/?ref_=fn_al_tt_1">The Matrix</a> (1999)</td></tr>
              <tr><td class="result_text"><a href="/title/tt0234215/?ref_=fn_al_tt_2">The Matrix Reloaded</a> (2003)</td></tr>
            </table>
        "#;
        let p = search_pipeline("The+Matrix", body);

        let id = p.resolve_identifier("The Matrix").await.unwrap();
        assert_eq!(id.as_deref(), Some("tt0133093"));
    }

    #[tokio::test]
    async fn test_resolve_identifier_without_results() {
        let p = search_pipeline("zzzz", "<html><body><p>No results</p></body></html>");
        assert_eq!(p.resolve_identifier("zzzz").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_unreadable_search_page_names_the_title() {
        let p = search_pipeline("Heat", "<html>\0\0</html>");

        let err = p.resolve_identifier("Heat").await.unwrap_err();
        assert!(format!("{:#}", err).contains("\"Heat\""));
        assert!(matches!(err.downcast_ref::<ScrapeError>(), Some(ScrapeError::Parse(_))));
    }

    #[test]
    fn test_site_base_is_configurable() {
        let config = ScraperConfig {
            rt_base_url: "http://localhost:9000".into(),
            ..ScraperConfig::default()
        };
        assert!(catalog::CERTIFIED_FRESH.url(&config).starts_with("http://localhost:9000/browse/"));
    }
}
