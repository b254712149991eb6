//! Reelcache OMDb client
//!
//! A thin client over the [OMDb API](https://www.omdbapi.com/): title search,
//! lookup by IMDb id and lookup by exact title. Upstream payloads are
//! normalised into the shapes the HTTP layer serves and caches.

#![warn(missing_docs)]

pub mod client;
pub mod config;
pub mod error;
pub mod models;

pub use client::{build_client, HttpConfig, OmdbClient};
pub use config::OmdbConfig;
pub use error::{OmdbError, OmdbResult};
pub use models::{MovieDetails, Rating, SearchItem, SearchQuery, SearchResults};
