//! Cache key construction.
//!
//! The cache treats keys as opaque strings; these helpers only fix the
//! colon-delimited layout the route layer has always used, so that existing
//! Redis deployments keep hitting the same entries.

/// Cache key builder for consistent key generation.
pub struct CacheKeyBuilder {
    parts: Vec<String>,
}

impl CacheKeyBuilder {
    /// Create a new key builder with the given prefix.
    pub fn new(prefix: &str) -> Self {
        Self {
            parts: vec![prefix.to_string()],
        }
    }

    /// Add a part to the key.
    pub fn add(mut self, part: impl ToString) -> Self {
        self.parts.push(part.to_string());
        self
    }

    /// Add an optional part; an absent part still occupies its position as
    /// an empty segment.
    pub fn add_opt(mut self, part: Option<impl ToString>) -> Self {
        self.parts
            .push(part.map(|p| p.to_string()).unwrap_or_default());
        self
    }

    /// Build the final key by joining parts with colons.
    pub fn build(self) -> String {
        self.parts.join(":")
    }
}

/// `search:<title>:<page>:<year>:<type>`
pub fn search(title: &str, page: &str, year: Option<&str>, kind: Option<&str>) -> String {
    CacheKeyBuilder::new("search")
        .add(title)
        .add(page)
        .add_opt(year)
        .add_opt(kind)
        .build()
}

/// `movie:<id>:<plot>`
pub fn movie(id: &str, plot: &str) -> String {
    CacheKeyBuilder::new("movie").add(id).add(plot).build()
}

/// `title:<title>:<year>:<plot>`
pub fn title(title: &str, year: Option<&str>, plot: &str) -> String {
    CacheKeyBuilder::new("title")
        .add(title)
        .add_opt(year)
        .add(plot)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_builder() {
        let key = CacheKeyBuilder::new("movie").add("tt0133093").add("short").build();
        assert_eq!(key, "movie:tt0133093:short");
    }

    #[test]
    fn test_cache_key_builder_keeps_empty_placeholders() {
        let key = CacheKeyBuilder::new("search")
            .add("alien")
            .add(1)
            .add_opt(None::<String>)
            .add_opt(Some("movie"))
            .build();

        assert_eq!(key, "search:alien:1::movie");
    }

    #[test]
    fn test_route_keys() {
        assert_eq!(search("Batman", "1", None, None), "search:Batman:1::");
        assert_eq!(
            search("Batman", "2", Some("1989"), Some("movie")),
            "search:Batman:2:1989:movie"
        );
        assert_eq!(movie("tt0096895", "full"), "movie:tt0096895:full");
        assert_eq!(title("Batman", None, "short"), "title:Batman::short");
        assert_eq!(title("Batman", Some("1989"), "full"), "title:Batman:1989:full");
    }

    #[test]
    fn test_absent_and_empty_optionals_collide() {
        // `year=` and a missing year address the same entry.
        assert_eq!(search("Up", "1", Some(""), None), search("Up", "1", None, None));
    }
}
