use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::{FilterSet, UserId};
use crate::prefs::PreferenceResolver;

/// Preference store backed by a plain map, seeded from configuration.
#[derive(Debug, Default)]
pub struct InMemoryPreferences {
    by_user: HashMap<UserId, FilterSet>,
}

impl InMemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, user: UserId, filter: FilterSet) {
        self.by_user.insert(user, filter);
    }

    pub fn len(&self) -> usize {
        self.by_user.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_user.is_empty()
    }
}

impl FromIterator<(UserId, FilterSet)> for InMemoryPreferences {
    fn from_iter<I: IntoIterator<Item = (UserId, FilterSet)>>(iter: I) -> Self {
        Self {
            by_user: iter.into_iter().collect(),
        }
    }
}

#[async_trait]
impl PreferenceResolver for InMemoryPreferences {
    async fn resolve(&self, user: &UserId) -> Option<FilterSet> {
        self.by_user.get(user).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_resolve_missing_user_is_none() {
        let prefs = InMemoryPreferences::new();
        assert!(prefs.resolve(&UserId::from("nobody")).await.is_none());
    }

    #[tokio::test]
    async fn test_resolve_returns_saved_filters() {
        let mut prefs = InMemoryPreferences::new();
        prefs.insert(
            UserId::from("alice"),
            FilterSet::new().with_categories(["technology"]),
        );

        let filter = prefs.resolve(&UserId::from("alice")).await.unwrap();
        assert!(filter.categories().contains("technology"));
    }
}
