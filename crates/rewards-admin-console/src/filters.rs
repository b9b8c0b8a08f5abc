//! Per-page filter state and its reconciliation into query parameters
//!
//! Every filter set is plain in-memory state. Unset fields never reach the
//! wire: an empty search, a `None` tri-state or a default sort order is
//! omitted from [`FilterSet::query_params`].

use crate::error::ConsoleError;
use chrono::NaiveDate;
use rewards_admin_client::QueryParams;
use rewards_admin_core::{AccountStatus, Category, RecordId};
use std::{fmt, str::FromStr};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Removable indicator for one active filter field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterChip {
    /// Field key, also the query parameter name
    pub field: &'static str,
    /// Display label
    pub label: String,
}

impl FilterChip {
    fn new(field: &'static str, label: impl Into<String>) -> Self {
        Self {
            field,
            label: label.into(),
        }
    }
}

/// Shared behaviour of every page's filter state
pub trait FilterSet: Default + PartialEq {
    /// Reset every field to its default
    fn clear(&mut self) {
        *self = Self::default();
    }

    /// Whether any field differs from its default
    fn has_active_filters(&self) -> bool {
        *self != Self::default()
    }

    /// One chip per active field
    fn chips(&self) -> Vec<FilterChip>;

    /// Reset exactly the field behind a chip; returns whether it was active
    fn remove_chip(&mut self, field: &str) -> bool;

    /// Request parameters for the current state, unset fields omitted
    fn query_params(&self) -> QueryParams;
}

fn push_search(params: &mut QueryParams, search: &str) {
    let search = search.trim();
    if !search.is_empty() {
        params.push(("search".to_string(), search.to_string()));
    }
}

fn search_chip(search: &str) -> Option<FilterChip> {
    let search = search.trim();
    (!search.is_empty()).then(|| FilterChip::new("search", format!("Search: {search}")))
}

/// Filters on the businesses page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BusinessFilters {
    /// Committed search text
    pub search: String,
    /// Category id
    pub category: Option<RecordId>,
    /// Tri-state verification filter; `None` means all
    pub verified: Option<bool>,
    /// Account status
    pub status: Option<AccountStatus>,
}

impl FilterSet for BusinessFilters {
    fn chips(&self) -> Vec<FilterChip> {
        let mut chips: Vec<FilterChip> = search_chip(&self.search).into_iter().collect();
        if let Some(category) = &self.category {
            chips.push(FilterChip::new("category", format!("Category: {category}")));
        }
        if let Some(verified) = self.verified {
            let label = if verified { "Verified" } else { "Unverified" };
            chips.push(FilterChip::new("isVerified", label));
        }
        if let Some(status) = self.status {
            chips.push(FilterChip::new("status", format!("Status: {status}")));
        }
        chips
    }

    fn remove_chip(&mut self, field: &str) -> bool {
        match field {
            "search" => !std::mem::take(&mut self.search).is_empty(),
            "category" => self.category.take().is_some(),
            "isVerified" => self.verified.take().is_some(),
            "status" => self.status.take().is_some(),
            _ => false,
        }
    }

    fn query_params(&self) -> QueryParams {
        let mut params = QueryParams::new();
        push_search(&mut params, &self.search);
        if let Some(category) = &self.category {
            params.push(("category".to_string(), category.to_string()));
        }
        if let Some(verified) = self.verified {
            params.push(("isVerified".to_string(), verified.to_string()));
        }
        if let Some(status) = self.status {
            params.push(("status".to_string(), status.to_string()));
        }
        params
    }
}

/// Sort orders offered on the creators page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum CreatorSort {
    /// Newest first
    #[default]
    CreatedAtDesc,
    /// Oldest first
    CreatedAtAsc,
    /// Name A-Z
    NameAsc,
    /// Name Z-A
    NameDesc,
    /// Most submissions first
    SubmissionsDesc,
    /// Most points first
    PointsDesc,
}

impl CreatorSort {
    /// Every sort order, in menu order
    pub const ALL: [Self; 6] = [
        Self::CreatedAtDesc,
        Self::CreatedAtAsc,
        Self::NameAsc,
        Self::NameDesc,
        Self::SubmissionsDesc,
        Self::PointsDesc,
    ];

    /// Wire value
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreatedAtDesc => "createdAt_desc",
            Self::CreatedAtAsc => "createdAt_asc",
            Self::NameAsc => "name_asc",
            Self::NameDesc => "name_desc",
            Self::SubmissionsDesc => "submissions_desc",
            Self::PointsDesc => "points_desc",
        }
    }

    /// Menu label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::CreatedAtDesc => "Newest First",
            Self::CreatedAtAsc => "Oldest First",
            Self::NameAsc => "Name (A-Z)",
            Self::NameDesc => "Name (Z-A)",
            Self::SubmissionsDesc => "Most Submissions",
            Self::PointsDesc => "Most Points",
        }
    }
}

impl fmt::Display for CreatorSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CreatorSort {
    type Err = ConsoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|sort| sort.as_str() == s)
            .ok_or_else(|| ConsoleError::validation("sort", format!("unknown sort order '{s}'")))
    }
}

/// Filters on the creators page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreatorFilters {
    /// Committed search text, matched against name and email
    pub search: String,
    /// Account status
    pub status: Option<AccountStatus>,
    /// Joined on or after
    pub start_date: Option<NaiveDate>,
    /// Joined on or before
    pub end_date: Option<NaiveDate>,
    /// Sort order
    pub sort: CreatorSort,
}

impl FilterSet for CreatorFilters {
    fn chips(&self) -> Vec<FilterChip> {
        let mut chips: Vec<FilterChip> = search_chip(&self.search).into_iter().collect();
        if let Some(status) = self.status {
            chips.push(FilterChip::new("status", format!("Status: {status}")));
        }
        if let Some(date) = self.start_date {
            chips.push(FilterChip::new("startDate", format!("From: {}", date.format(DATE_FORMAT))));
        }
        if let Some(date) = self.end_date {
            chips.push(FilterChip::new("endDate", format!("To: {}", date.format(DATE_FORMAT))));
        }
        if self.sort != CreatorSort::default() {
            chips.push(FilterChip::new("sortBy", format!("Sort: {}", self.sort.label())));
        }
        chips
    }

    fn remove_chip(&mut self, field: &str) -> bool {
        match field {
            "search" => !std::mem::take(&mut self.search).is_empty(),
            "status" => self.status.take().is_some(),
            "startDate" => self.start_date.take().is_some(),
            "endDate" => self.end_date.take().is_some(),
            "sortBy" => std::mem::take(&mut self.sort) != CreatorSort::default(),
            _ => false,
        }
    }

    fn query_params(&self) -> QueryParams {
        let mut params = QueryParams::new();
        push_search(&mut params, &self.search);
        if let Some(status) = self.status {
            params.push(("status".to_string(), status.to_string()));
        }
        if let Some(date) = self.start_date {
            params.push(("startDate".to_string(), date.format(DATE_FORMAT).to_string()));
        }
        if let Some(date) = self.end_date {
            params.push(("endDate".to_string(), date.format(DATE_FORMAT).to_string()));
        }
        if self.sort != CreatorSort::default() {
            params.push(("sortBy".to_string(), self.sort.to_string()));
        }
        params
    }
}

/// Filters on the categories page, applied locally
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryFilters {
    /// Search text, matched against name and description
    pub search: String,
}

impl CategoryFilters {
    /// Categories matching the search, case-insensitively
    #[must_use]
    pub fn apply<'a>(&self, categories: &'a [Category]) -> Vec<&'a Category> {
        let needle = self.search.trim().to_lowercase();
        categories
            .iter()
            .filter(|category| {
                needle.is_empty()
                    || category.name.to_lowercase().contains(&needle)
                    || category
                        .description
                        .as_deref()
                        .is_some_and(|d| d.to_lowercase().contains(&needle))
            })
            .collect()
    }
}

impl FilterSet for CategoryFilters {
    fn chips(&self) -> Vec<FilterChip> {
        search_chip(&self.search).into_iter().collect()
    }

    fn remove_chip(&mut self, field: &str) -> bool {
        field == "search" && !std::mem::take(&mut self.search).is_empty()
    }

    fn query_params(&self) -> QueryParams {
        // The categories endpoint takes no filters.
        QueryParams::new()
    }
}

/// Filters on the content moderation page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentFilters {
    /// Committed search text
    pub search: String,
    /// Moderation status
    pub status: Option<String>,
    /// Content type
    pub content_type: Option<String>,
}

impl FilterSet for ContentFilters {
    fn chips(&self) -> Vec<FilterChip> {
        let mut chips: Vec<FilterChip> = search_chip(&self.search).into_iter().collect();
        if let Some(status) = &self.status {
            chips.push(FilterChip::new("status", format!("Status: {status}")));
        }
        if let Some(kind) = &self.content_type {
            chips.push(FilterChip::new("type", format!("Type: {kind}")));
        }
        chips
    }

    fn remove_chip(&mut self, field: &str) -> bool {
        match field {
            "search" => !std::mem::take(&mut self.search).is_empty(),
            "status" => self.status.take().is_some(),
            "type" => self.content_type.take().is_some(),
            _ => false,
        }
    }

    fn query_params(&self) -> QueryParams {
        let mut params = QueryParams::new();
        push_search(&mut params, &self.search);
        if let Some(status) = &self.status {
            params.push(("status".to_string(), status.clone()));
        }
        if let Some(kind) = &self.content_type {
            params.push(("type".to_string(), kind.clone()));
        }
        params
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use rstest::rstest;

    fn pair(key: &str, value: &str) -> (String, String) {
        (key.to_string(), value.to_string())
    }

    #[test]
    fn test_unset_verification_is_omitted() {
        let filters = BusinessFilters {
            search: "cafe".to_string(),
            ..BusinessFilters::default()
        };

        assert_eq!(filters.query_params(), vec![pair("search", "cafe")]);
    }

    #[test]
    fn test_false_verification_is_sent() {
        let filters = BusinessFilters {
            verified: Some(false),
            ..BusinessFilters::default()
        };

        assert_eq!(filters.query_params(), vec![pair("isVerified", "false")]);
        assert!(filters.has_active_filters());
    }

    #[test]
    fn test_business_params_in_field_order() {
        let filters = BusinessFilters {
            search: " bakery ".to_string(),
            category: Some(RecordId::from("c1")),
            verified: Some(true),
            status: Some(AccountStatus::Suspended),
        };

        assert_eq!(
            filters.query_params(),
            vec![
                pair("search", "bakery"),
                pair("category", "c1"),
                pair("isVerified", "true"),
                pair("status", "suspended"),
            ]
        );
    }

    #[test]
    fn test_remove_chip_resets_only_that_field() {
        let mut filters = BusinessFilters {
            search: "cafe".to_string(),
            verified: Some(false),
            ..BusinessFilters::default()
        };

        assert!(filters.remove_chip("isVerified"));
        assert_eq!(filters.verified, None);
        assert_eq!(filters.search, "cafe");
        assert!(!filters.remove_chip("isVerified"));
        assert!(!filters.remove_chip("unknown"));
    }

    #[test]
    fn test_business_chips() {
        let filters = BusinessFilters {
            verified: Some(true),
            status: Some(AccountStatus::Active),
            ..BusinessFilters::default()
        };

        let labels: Vec<_> = filters.chips().into_iter().map(|c| c.label).collect();
        assert_eq!(labels, vec!["Verified", "Status: active"]);
    }

    #[test]
    fn test_creator_default_sort_is_not_active() {
        let filters = CreatorFilters::default();

        assert!(!filters.has_active_filters());
        assert!(filters.query_params().is_empty());
        assert!(filters.chips().is_empty());
    }

    #[test]
    fn test_creator_dates_serialize_as_iso_dates() {
        let filters = CreatorFilters {
            start_date: NaiveDate::from_ymd_opt(2026, 1, 5),
            end_date: NaiveDate::from_ymd_opt(2026, 2, 28),
            sort: CreatorSort::PointsDesc,
            ..CreatorFilters::default()
        };

        assert_eq!(
            filters.query_params(),
            vec![
                pair("startDate", "2026-01-05"),
                pair("endDate", "2026-02-28"),
                pair("sortBy", "points_desc"),
            ]
        );
    }

    #[test]
    fn test_removing_sort_chip_restores_default() {
        let mut filters = CreatorFilters {
            sort: CreatorSort::NameAsc,
            ..CreatorFilters::default()
        };

        assert!(filters.remove_chip("sortBy"));
        assert_eq!(filters.sort, CreatorSort::CreatedAtDesc);
        assert!(!filters.remove_chip("sortBy"));
    }

    #[rstest]
    #[case("createdAt_desc", CreatorSort::CreatedAtDesc)]
    #[case("name_desc", CreatorSort::NameDesc)]
    #[case("submissions_desc", CreatorSort::SubmissionsDesc)]
    fn test_creator_sort_parses(#[case] raw: &str, #[case] expected: CreatorSort) {
        assert_eq!(raw.parse::<CreatorSort>().unwrap(), expected);
    }

    #[test]
    fn test_unknown_sort_is_rejected() {
        assert!("popularity".parse::<CreatorSort>().is_err());
    }

    #[test]
    fn test_category_search_is_local_and_case_insensitive() {
        let categories: Vec<Category> = serde_json::from_value(serde_json::json!([
            {"_id": "c1", "name": "Food & Drink", "description": "Cafes and restaurants"},
            {"_id": "c2", "name": "Fitness"},
            {"_id": "c3", "name": "Books", "description": "Independent CAFE bookshops"}
        ]))
        .unwrap();
        let filters = CategoryFilters {
            search: "cafe".to_string(),
        };

        let names: Vec<_> = filters
            .apply(&categories)
            .into_iter()
            .map(|c| c.name.as_str())
            .collect();

        assert_eq!(names, vec!["Food & Drink", "Books"]);
        assert!(filters.query_params().is_empty());
    }

    #[test]
    fn test_content_type_param_name() {
        let filters = ContentFilters {
            content_type: Some("video".to_string()),
            ..ContentFilters::default()
        };

        assert_eq!(filters.query_params(), vec![pair("type", "video")]);
    }

    fn arb_status() -> impl Strategy<Value = Option<AccountStatus>> {
        prop_oneof![
            Just(None),
            Just(Some(AccountStatus::Active)),
            Just(Some(AccountStatus::Suspended)),
        ]
    }

    fn arb_sort() -> impl Strategy<Value = CreatorSort> {
        proptest::sample::select(CreatorSort::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn prop_clear_business_filters_leaves_nothing_active(
            search in ".{0,12}",
            category in proptest::option::of("[a-f0-9]{4,8}"),
            verified in proptest::option::of(any::<bool>()),
            status in arb_status(),
        ) {
            let mut filters = BusinessFilters {
                search,
                category: category.map(RecordId::new),
                verified,
                status,
            };

            filters.clear();

            prop_assert!(!filters.has_active_filters());
            prop_assert!(filters.query_params().is_empty());
            prop_assert!(filters.chips().is_empty());
        }

        #[test]
        fn prop_clear_creator_filters_leaves_nothing_active(
            search in ".{0,12}",
            status in arb_status(),
            start in proptest::option::of(0_i64..3650),
            sort in arb_sort(),
        ) {
            let base = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
            let mut filters = CreatorFilters {
                search,
                status,
                start_date: start.map(|d| base + chrono::Duration::days(d)),
                end_date: None,
                sort,
            };

            filters.clear();

            prop_assert!(!filters.has_active_filters());
            prop_assert!(filters.query_params().is_empty());
        }

        #[test]
        fn prop_params_never_contain_empty_values(
            search in ".{0,12}",
            verified in proptest::option::of(any::<bool>()),
        ) {
            let filters = BusinessFilters { search, verified, ..BusinessFilters::default() };

            for (_, value) in filters.query_params() {
                prop_assert!(!value.is_empty());
            }
        }
    }
}
