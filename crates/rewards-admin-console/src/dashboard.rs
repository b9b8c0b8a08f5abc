//! Dashboard metric cards
//!
//! The stats endpoint reports only current totals, so each card's
//! previous-period baseline is an estimate derived from those totals. The
//! growth figures are indicative and must not be read as exact period deltas.

use rewards_admin_core::{
    DashboardStats,
    types::{ActivityEntry, GrowthCharts},
};
use serde::Serialize;

/// One summary card
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricCard {
    /// Card title
    pub title: &'static str,
    /// Current value
    pub value: u64,
    /// Estimated growth over the previous period, in whole percent
    pub growth_percent: i64,
}

/// Growth from `previous` to `current` in whole percent, rounded half up
///
/// A zero baseline reports 100 when anything exists now and 0 otherwise.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
pub fn growth_percent(current: f64, previous: f64) -> i64 {
    if previous == 0.0 {
        return if current > 0.0 { 100 } else { 0 };
    }
    ((current - previous) / previous).mul_add(100.0, 0.5).floor() as i64
}

#[allow(clippy::cast_precision_loss)]
const fn as_f64(value: u64) -> f64 {
    value as f64
}

/// Cards shown at the top of the dashboard
#[must_use]
pub fn metric_cards(stats: &DashboardStats) -> Vec<MetricCard> {
    let users = &stats.user_statistics;
    let businesses = &stats.business_statistics;
    let content = &stats.content_statistics;
    // New sign-ups this week stand in for weekly active users.
    let active_users = users.new_users_this_week;

    vec![
        MetricCard {
            title: "Total Users",
            value: users.total_users,
            growth_percent: growth_percent(
                as_f64(users.total_users),
                as_f64(users.total_users.saturating_sub(users.new_users_this_week)),
            ),
        },
        MetricCard {
            title: "Total Businesses",
            value: businesses.total_businesses,
            growth_percent: growth_percent(
                as_f64(businesses.total_businesses),
                as_f64(businesses.unverified_businesses)
                    .mul_add(-0.1, as_f64(businesses.total_businesses)),
            ),
        },
        MetricCard {
            title: "Total Content",
            value: content.total_content,
            growth_percent: growth_percent(
                as_f64(content.total_content),
                as_f64(content.total_content.saturating_sub(content.this_week_content)),
            ),
        },
        MetricCard {
            title: "Active Users (7 days)",
            value: active_users,
            growth_percent: growth_percent(as_f64(active_users), as_f64(active_users) * 0.8),
        },
    ]
}

/// Banner text when businesses await verification
#[must_use]
pub fn action_required(stats: &DashboardStats) -> Option<String> {
    match stats.business_statistics.unverified_businesses {
        0 => None,
        1 => Some("1 unverified business needs verification".to_string()),
        n => Some(format!("{n} unverified businesses need verification")),
    }
}

/// Businesses in one category, with its share of all categorized businesses
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySlice {
    /// Category name, `Unknown` when the server omits it
    pub name: String,
    /// Businesses in the category
    pub count: u64,
    /// Share of the total, in percent with one decimal
    pub percent: f64,
}

/// Category distribution, largest first
#[must_use]
pub fn category_breakdown(stats: &DashboardStats) -> Vec<CategorySlice> {
    let shares = &stats.category_distribution.businesses_by_category;
    let total: u64 = shares.iter().map(|share| share.count).sum();
    let mut slices: Vec<CategorySlice> = shares
        .iter()
        .map(|share| CategorySlice {
            name: share
                .category_name
                .clone()
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| "Unknown".to_string()),
            count: share.count,
            percent: if total == 0 {
                0.0
            } else {
                (as_f64(share.count) * 1000.0 / as_f64(total)).round() / 10.0
            },
        })
        .collect();
    slices.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    slices
}

/// Everything the dashboard shows
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    /// Summary cards
    pub cards: Vec<MetricCard>,
    /// Unverified-business banner
    pub action_required: Option<String>,
    /// Businesses per category
    pub categories: Vec<CategorySlice>,
    /// Recent activity, newest first as sent by the server
    pub recent_activity: Vec<ActivityEntry>,
    /// Growth series
    pub growth_charts: GrowthCharts,
}

/// Assemble the dashboard from the stats endpoint
#[must_use]
pub fn summarize(stats: &DashboardStats) -> DashboardSummary {
    DashboardSummary {
        cards: metric_cards(stats),
        action_required: action_required(stats),
        categories: category_breakdown(stats),
        recent_activity: stats.recent_activity.clone(),
        growth_charts: stats.growth_charts.clone(),
    }
}
