//! OMDb request and response shapes.
//!
//! OMDb speaks PascalCase with a few `imdb*` exceptions. Search hits are
//! passed through in that shape; movie details are renamed to camelCase.

use serde::{Deserialize, Serialize};

/// OMDb returns ten search hits per page.
pub const RESULTS_PER_PAGE: u32 = 10;

const NOT_APPLICABLE: &str = "N/A";

/// Title search parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    /// Title fragment (`s`).
    pub title: String,
    /// Result page (`page`), passed to OMDb as given.
    pub page: String,
    /// Release year filter (`y`).
    pub year: Option<String>,
    /// `movie`, `series` or `episode` (`type`).
    pub kind: Option<String>,
}

impl SearchQuery {
    /// Search for `title`, first page, unfiltered.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            page: "1".to_string(),
            year: None,
            kind: None,
        }
    }

    /// Request another page.
    pub fn page(mut self, page: impl Into<String>) -> Self {
        self.page = page.into();
        self
    }

    /// Filter by year.
    pub fn year(mut self, year: impl Into<String>) -> Self {
        self.year = Some(year.into());
        self
    }

    /// Filter by result type.
    pub fn kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub(crate) fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("s", self.title.clone()), ("page", self.page.clone())];
        if let Some(year) = &self.year {
            params.push(("y", year.clone()));
        }
        if let Some(kind) = &self.kind {
            params.push(("type", kind.clone()));
        }
        params
    }
}

/// A single search hit, kept in OMDb's own field names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchItem {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Year")]
    pub year: String,
    #[serde(rename = "imdbID")]
    pub imdb_id: String,
    #[serde(rename = "Type")]
    pub kind: String,
    #[serde(rename = "Poster")]
    pub poster: String,
}

/// One page of search results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
    /// Hits on this page.
    pub movies: Vec<SearchItem>,
    /// Hits across all pages.
    pub total_results: u32,
    /// The requested page read as an integer, `null` when it is not one.
    pub page: Option<i64>,
    /// `ceil(total_results / 10)`.
    pub total_pages: u32,
}

impl SearchResults {
    pub(crate) fn from_raw(raw: RawSearch, page: &str) -> Self {
        let total_results = raw
            .total_results
            .as_deref()
            .and_then(|total| total.trim().parse().ok())
            .unwrap_or(0);

        Self {
            movies: raw.search,
            total_results,
            page: leading_int(page),
            total_pages: total_results.div_ceil(RESULTS_PER_PAGE),
        }
    }
}

/// Integer at the start of `text` after leading whitespace, ignoring
/// whatever follows it: `"02"` is 2, `"3rd"` is 3, `"abc"` is `None`.
fn leading_int(text: &str) -> Option<i64> {
    let text = text.trim_start();
    let unsigned = text.strip_prefix(|c: char| c == '+' || c == '-').unwrap_or(text);
    let digits = unsigned.len() - unsigned.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    let sign_len = text.len() - unsigned.len();
    text[..sign_len + digits].parse().ok()
}

/// A review-site score, in OMDb's field names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rating {
    #[serde(rename = "Source")]
    pub source: String,
    #[serde(rename = "Value")]
    pub value: String,
}

/// Full movie record.
///
/// `poster`, `metascore`, `imdb_rating`, `imdb_votes`, `box_office` and
/// `website` are `None` where OMDb says `"N/A"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieDetails {
    #[serde(rename = "imdbID")]
    pub imdb_id: Option<String>,
    pub title: Option<String>,
    pub year: Option<String>,
    pub rated: Option<String>,
    pub released: Option<String>,
    pub runtime: Option<String>,
    pub genre: Option<String>,
    pub director: Option<String>,
    pub writer: Option<String>,
    pub actors: Option<String>,
    pub plot: Option<String>,
    pub language: Option<String>,
    pub country: Option<String>,
    pub awards: Option<String>,
    pub poster: Option<String>,
    #[serde(default)]
    pub ratings: Vec<Rating>,
    pub metascore: Option<String>,
    pub imdb_rating: Option<String>,
    pub imdb_votes: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub dvd: Option<String>,
    pub box_office: Option<String>,
    pub production: Option<String>,
    pub website: Option<String>,
}

fn applicable(value: Option<String>) -> Option<String> {
    value.filter(|v| v != NOT_APPLICABLE)
}

impl From<RawMovie> for MovieDetails {
    fn from(raw: RawMovie) -> Self {
        Self {
            imdb_id: raw.imdb_id,
            title: raw.title,
            year: raw.year,
            rated: raw.rated,
            released: raw.released,
            runtime: raw.runtime,
            genre: raw.genre,
            director: raw.director,
            writer: raw.writer,
            actors: raw.actors,
            plot: raw.plot,
            language: raw.language,
            country: raw.country,
            awards: raw.awards,
            poster: applicable(raw.poster),
            ratings: raw.ratings,
            metascore: applicable(raw.metascore),
            imdb_rating: applicable(raw.imdb_rating),
            imdb_votes: applicable(raw.imdb_votes),
            kind: raw.kind,
            dvd: raw.dvd,
            box_office: applicable(raw.box_office),
            production: raw.production,
            website: applicable(raw.website),
        }
    }
}

/// `?s=` payload.
#[derive(Debug, Deserialize)]
pub(crate) struct RawSearch {
    #[serde(rename = "Search", default)]
    search: Vec<SearchItem>,
    #[serde(rename = "totalResults")]
    total_results: Option<String>,
}

/// `?i=` / `?t=` payload.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct RawMovie {
    #[serde(rename = "imdbID")]
    imdb_id: Option<String>,
    title: Option<String>,
    year: Option<String>,
    rated: Option<String>,
    released: Option<String>,
    runtime: Option<String>,
    genre: Option<String>,
    director: Option<String>,
    writer: Option<String>,
    actors: Option<String>,
    plot: Option<String>,
    language: Option<String>,
    country: Option<String>,
    awards: Option<String>,
    poster: Option<String>,
    #[serde(default)]
    ratings: Vec<Rating>,
    metascore: Option<String>,
    #[serde(rename = "imdbRating")]
    imdb_rating: Option<String>,
    #[serde(rename = "imdbVotes")]
    imdb_votes: Option<String>,
    #[serde(rename = "Type")]
    kind: Option<String>,
    #[serde(rename = "DVD")]
    dvd: Option<String>,
    box_office: Option<String>,
    production: Option<String>,
    website: Option<String>,
}
