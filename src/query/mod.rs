//! Builds provider path-and-query strings from filter sets.
//!
//! Pure string assembly; the provider's parameter exclusivity rules live
//! here and nowhere else. Because filter sets iterate sorted and
//! deduplicated, the built string is deterministic for a given logical
//! query and doubles as its cache key.

use std::collections::BTreeSet;

use url::form_urlencoded;

use crate::app::{NewsError, Result};
use crate::domain::FilterSet;

pub const TOP_HEADLINES_PATH: &str = "/top-headlines";
pub const EVERYTHING_PATH: &str = "/everything";
pub const SOURCES_PATH: &str = "/sources";

/// Build the top-headlines query.
///
/// The provider rejects `sources` combined with `country` or `category`,
/// so a non-empty sources set wins and the other two are dropped entirely.
/// Without sources, `country` is always emitted and defaults to `us`.
/// Languages are appended in either branch.
pub fn top_headlines(filter: &FilterSet) -> String {
    let mut query = String::from(TOP_HEADLINES_PATH);

    if !filter.sources().is_empty() {
        query.push_str("?sources=");
        query.push_str(&join(filter.sources()));
    } else {
        query.push_str("?country=");
        if filter.countries().is_empty() {
            query.push_str("us");
        } else {
            query.push_str(&join(filter.countries()));
        }

        if !filter.categories().is_empty() {
            query.push_str("&category=");
            query.push_str(&join(filter.categories()));
        }
    }

    if !filter.languages().is_empty() {
        query.push(if query.contains('?') { '&' } else { '?' });
        query.push_str("language=");
        query.push_str(&join(filter.languages()));
    }

    query
}

/// Build the everything (search) query.
///
/// The keyword is mandatory and form-encoded; the endpoint has no
/// `category` parameter, so categories, countries and languages are
/// ignored even when present. Results are always sorted by publish date.
pub fn search(filter: &FilterSet) -> Result<String> {
    let keyword = filter.keyword().ok_or_else(|| {
        NewsError::InvalidArgument("search keyword must not be empty".to_string())
    })?;

    let mut query = String::from(EVERYTHING_PATH);
    query.push_str("?q=");
    query.push_str(&encode(keyword));

    if !filter.sources().is_empty() {
        query.push_str("&sources=");
        query.push_str(&join(filter.sources()));
    }

    query.push_str("&sortBy=publishedAt");
    Ok(query)
}

fn join(tokens: &BTreeSet<String>) -> String {
    tokens.iter().map(String::as_str).collect::<Vec<_>>().join(",")
}

/// Form-encode a free-text keyword ("a b" becomes "a+b").
fn encode(keyword: &str) -> String {
    form_urlencoded::byte_serialize(keyword.as_bytes()).collect()
}
