use std::collections::BTreeSet;

/// One logical news query: optional category/source/country/language token
/// sets plus an optional free-text keyword.
///
/// Token sets are canonical by construction: tokens are trimmed, lowercased
/// and deduplicated on entry, and `BTreeSet` keeps iteration sorted. Two
/// filter sets describing the same query therefore compare equal and render
/// to identical query strings no matter how callers ordered their input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    categories: BTreeSet<String>,
    sources: BTreeSet<String>,
    countries: BTreeSet<String>,
    languages: BTreeSet<String>,
    keyword: Option<String>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_categories<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.categories = normalize_tokens(tokens);
        self
    }

    pub fn with_sources<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.sources = normalize_tokens(tokens);
        self
    }

    pub fn with_countries<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.countries = normalize_tokens(tokens);
        self
    }

    pub fn with_languages<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.languages = normalize_tokens(tokens);
        self
    }

    /// Keyword is free text: trimmed but not lowercased. An empty or
    /// whitespace-only keyword is stored as absent.
    pub fn with_keyword(mut self, keyword: impl AsRef<str>) -> Self {
        let keyword = keyword.as_ref().trim();
        self.keyword = if keyword.is_empty() {
            None
        } else {
            Some(keyword.to_string())
        };
        self
    }

    pub fn categories(&self) -> &BTreeSet<String> {
        &self.categories
    }

    pub fn sources(&self) -> &BTreeSet<String> {
        &self.sources
    }

    pub fn countries(&self) -> &BTreeSet<String> {
        &self.countries
    }

    pub fn languages(&self) -> &BTreeSet<String> {
        &self.languages
    }

    pub fn keyword(&self) -> Option<&str> {
        self.keyword.as_deref()
    }
}

fn normalize_tokens<I, S>(tokens: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    tokens
        .into_iter()
        .map(|t| t.as_ref().trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}
