//! Canned OMDb payloads.

use serde_json::{json, Value};

/// A successful `?s=` search response.
pub fn search_response(title: &str, total_results: u32) -> Value {
    json!({
        "Search": [
            {
                "Title": title,
                "Year": "2010",
                "imdbID": "tt1375666",
                "Type": "movie",
                "Poster": "https://m.media-amazon.com/images/M/inception.jpg"
            },
            {
                "Title": format!("{}: The Cobol Job", title),
                "Year": "2010",
                "imdbID": "tt5295894",
                "Type": "movie",
                "Poster": "N/A"
            }
        ],
        "totalResults": total_results.to_string(),
        "Response": "True"
    })
}

/// A successful `?i=` / `?t=` detail response.
pub fn movie_response(imdb_id: &str, title: &str) -> Value {
    json!({
        "Title": title,
        "Year": "2010",
        "Rated": "PG-13",
        "Released": "16 Jul 2010",
        "Runtime": "148 min",
        "Genre": "Action, Adventure, Sci-Fi",
        "Director": "Christopher Nolan",
        "Writer": "Christopher Nolan",
        "Actors": "Leonardo DiCaprio, Joseph Gordon-Levitt, Elliot Page",
        "Plot": "A thief who steals corporate secrets through dream-sharing technology.",
        "Language": "English, Japanese, French",
        "Country": "United States, United Kingdom",
        "Awards": "Won 4 Oscars. 159 wins & 220 nominations total",
        "Poster": "https://m.media-amazon.com/images/M/inception.jpg",
        "Ratings": [
            { "Source": "Internet Movie Database", "Value": "8.8/10" },
            { "Source": "Rotten Tomatoes", "Value": "87%" }
        ],
        "Metascore": "74",
        "imdbRating": "8.8",
        "imdbVotes": "2,512,000",
        "imdbID": imdb_id,
        "Type": "movie",
        "DVD": "07 Dec 2010",
        "BoxOffice": "N/A",
        "Production": "N/A",
        "Website": "N/A",
        "Response": "True"
    })
}

/// OMDb's in-band failure: HTTP 200 with `"Response": "False"`.
pub fn not_found_response(message: &str) -> Value {
    json!({
        "Response": "False",
        "Error": message
    })
}
