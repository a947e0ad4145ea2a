//! The fixed set of supported charts.
//!
//! Each [`ChartDefinition`] is static data: where the page lives, which nodes
//! are rows, and how every column is pulled out of a row. The base URL of a
//! site comes from configuration so the same definitions can be pointed at a
//! local server.

use crate::config::ScraperConfig;
use crate::scraper::cleaner::Normalize;
use crate::scraper::extractor::FieldRule;
use clap::ValueEnum;

// ── Sites ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Site {
    Imdb,
    RottenTomatoes,
}

impl Site {
    pub fn base_url<'a>(&self, config: &'a ScraperConfig) -> &'a str {
        let base = match self {
            Site::Imdb => &config.imdb_base_url,
            Site::RottenTomatoes => &config.rt_base_url,
        };
        base.trim_end_matches('/')
    }
}

// ── Definitions ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ChartKind {
    /// IMDb Top 250
    Top250,
    /// IMDb Most Popular
    MostPopular,
    /// IMDb US weekend box office
    BoxOffice,
    /// Rotten Tomatoes certified fresh, streaming and DVD
    CertifiedFresh,
}

#[derive(Debug)]
pub struct ChartDefinition {
    pub kind: ChartKind,
    pub name: &'static str,
    pub site: Site,
    pub path: &'static str,
    pub row_selector: &'static str,
    pub fields: &'static [FieldRule],
    pub header: &'static [&'static str],
    pub file_name: &'static str,
}

impl ChartDefinition {
    pub fn url(&self, config: &ScraperConfig) -> String {
        format!("{}{}", self.site.base_url(config), self.path)
    }
}

/// "/title/tt0111161/?ref_=…" → "tt0111161"
const LINK_ID: &[Normalize] = &[
    Normalize::Segment { separator: '/', index: 2 },
    Normalize::TruncateAt('?'),
];

const DECORATED_YEAR: &[Normalize] = &[Normalize::TrimChars("()")];

const IMDB_TITLE: FieldRule = FieldRule::text("title", ".titleColumn a");
const IMDB_ID: FieldRule = FieldRule::attribute("IMDb ID", ".titleColumn a", "href").then(LINK_ID);

pub static TOP_250: ChartDefinition = ChartDefinition {
    kind: ChartKind::Top250,
    name: "IMDb Top 250",
    site: Site::Imdb,
    path: "/chart/top/",
    row_selector: ".lister-list tr",
    fields: &[
        IMDB_TITLE,
        FieldRule::text("year", ".titleColumn span").then(DECORATED_YEAR),
        IMDB_ID,
    ],
    header: &["rank", "title", "year", "IMDb ID"],
    file_name: "imdb-top-250.csv",
};

// The moviemeter page nests the year differently from the top chart; the two
// rules are kept separate on purpose.
pub static MOST_POPULAR: ChartDefinition = ChartDefinition {
    kind: ChartKind::MostPopular,
    name: "IMDb Most Popular",
    site: Site::Imdb,
    path: "/chart/moviemeter",
    row_selector: ".lister-list tr",
    fields: &[
        IMDB_TITLE,
        FieldRule::text("year", ".titleColumn .secondaryInfo").then(DECORATED_YEAR),
        IMDB_ID,
    ],
    header: &["rank", "title", "year", "IMDb ID"],
    file_name: "imdb-most-popular.csv",
};

pub static BOX_OFFICE: ChartDefinition = ChartDefinition {
    kind: ChartKind::BoxOffice,
    name: "IMDb Box Office (US weekend)",
    site: Site::Imdb,
    path: "/chart/boxoffice",
    row_selector: ".chart tbody tr",
    fields: &[IMDB_TITLE, IMDB_ID],
    header: &["rank", "title", "IMDb ID"],
    file_name: "top-box-office-us.csv",
};

pub static CERTIFIED_FRESH: ChartDefinition = ChartDefinition {
    kind: ChartKind::CertifiedFresh,
    name: "Rotten Tomatoes Certified Fresh",
    site: Site::RottenTomatoes,
    path: "/browse/movies_at_home/critics:certified_fresh",
    row_selector: r#"[data-qa="discovery-media-list-item"]"#,
    fields: &[
        FieldRule::text("title", r#"[data-qa="discovery-media-list-item-title"]"#)
            .then(&[Normalize::CollapseWhitespace]),
        FieldRule::attribute("RT ID", "a", "href").then(LINK_ID),
    ],
    header: &["rank", "title", "RT ID"],
    file_name: "rt-certified-fresh.csv",
};

/// Run order used by `scrape`.
pub static CHARTS: [&ChartDefinition; 4] = [&TOP_250, &MOST_POPULAR, &BOX_OFFICE, &CERTIFIED_FRESH];

pub fn chart(kind: ChartKind) -> &'static ChartDefinition {
    match kind {
        ChartKind::Top250 => &TOP_250,
        ChartKind::MostPopular => &MOST_POPULAR,
        ChartKind::BoxOffice => &BOX_OFFICE,
        ChartKind::CertifiedFresh => &CERTIFIED_FRESH,
    }
}

// ── Identifier lookup ─────────────────────────────────────────────────────────

pub const SEARCH_PATH: &str = "/find";
pub const SEARCH_ROW_SELECTOR: &str = ".result_text";
pub const SEARCH_ID: FieldRule = FieldRule::attribute("IMDb ID", "a", "href").then(LINK_ID);
