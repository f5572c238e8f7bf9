//! Query-string extraction.
//!
//! The first `?` in a DSN separates the pattern-matched portion from the
//! query parameters. Keys and values are kept exactly as written: no URL
//! decoding, and bracket syntax such as `header[Authorization]` survives
//! verbatim because downstream consumers key on the raw text.

use indexmap::IndexMap;

/// Raw query parameters, keyed exactly as written in the DSN.
pub type QueryMap = IndexMap<String, String>;

/// Split a DSN into its path portion and its parsed query parameters.
///
/// Pairs are separated by `&` and split on the first `=` only, so values may
/// contain `=`. A pair without `=` maps to the empty string. An absent or
/// empty query yields an empty map, never an error.
pub fn split_query(input: &str) -> (&str, QueryMap) {
    let Some((path, query)) = input.split_once('?') else {
        return (input, QueryMap::new());
    };

    let mut map = QueryMap::new();
    for pair in query.split('&') {
        if pair.is_empty() {
            continue;
        }
        match pair.split_once('=') {
            Some((key, value)) => map.insert(key.to_string(), value.to_string()),
            None => map.insert(pair.to_string(), String::new()),
        };
    }

    (path, map)
}
