//! Records returned by the rewards platform admin API
//!
//! Records are passed through as the API sends them: field names follow the
//! API's camelCase JSON, unknown fields are ignored and missing counters
//! default to zero.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Opaque record identifier assigned by the API
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub String);

impl RecordId {
    /// Create a new record id
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the id as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Account status shared by businesses and creators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    /// Account in good standing
    #[default]
    Active,
    /// Account suspended by an operator
    Suspended,
}

impl AccountStatus {
    /// Wire representation
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Suspended => "suspended",
        }
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountStatus {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "suspended" => Ok(Self::Suspended),
            other => Err(crate::Error::validation(
                "status",
                format!("expected 'active' or 'suspended', got '{other}'"),
            )),
        }
    }
}

/// Nested profile block used by users and creators
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// Display name
    #[serde(default)]
    pub name: Option<String>,
    /// Avatar URL
    #[serde(default)]
    pub avatar: Option<String>,
}

/// A populated reference to another record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbeddedRef {
    /// Referenced record id
    #[serde(rename = "_id")]
    pub id: RecordId,
    /// Name of the referenced record (`businessName` for businesses)
    #[serde(default, alias = "businessName")]
    pub name: Option<String>,
    /// Email, for user references
    #[serde(default)]
    pub email: Option<String>,
    /// Profile, for user references
    #[serde(default)]
    pub profile: Option<Profile>,
}

/// Reference that the API returns either as a bare id or populated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Reference {
    /// Unpopulated reference
    Id(RecordId),
    /// Populated reference
    Embedded(EmbeddedRef),
}

impl Reference {
    /// Id of the referenced record
    #[must_use]
    pub const fn id(&self) -> &RecordId {
        match self {
            Self::Id(id) => id,
            Self::Embedded(embedded) => &embedded.id,
        }
    }

    /// Best human-readable label: name, then profile name, then email, then id
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Id(id) => id.as_str(),
            Self::Embedded(embedded) => embedded
                .name
                .as_deref()
                .or_else(|| embedded.profile.as_ref().and_then(|p| p.name.as_deref()))
                .or(embedded.email.as_deref())
                .unwrap_or_else(|| embedded.id.as_str()),
        }
    }
}

/// Business location
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// City
    #[serde(default)]
    pub city: Option<String>,
    /// Country
    #[serde(default)]
    pub country: Option<String>,
    /// Street address
    #[serde(default)]
    pub address: Option<String>,
}

/// Public contact details of a business
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    /// Phone number
    #[serde(default)]
    pub phone: Option<String>,
    /// Contact email
    #[serde(default)]
    pub email: Option<String>,
}

/// Kinds of submissions a business accepts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentSettings {
    /// Photos accepted
    #[serde(default)]
    pub accepts_photo: bool,
    /// Videos accepted
    #[serde(default)]
    pub accepts_video: bool,
}

/// Reward unlocked at a points threshold
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    /// Points needed
    #[serde(default)]
    pub points: u64,
    /// Reward title
    #[serde(default)]
    pub reward_title: String,
    /// Reward description
    #[serde(default)]
    pub reward_description: Option<String>,
    /// Terms attached to the reward
    #[serde(default)]
    pub terms_and_conditions: Option<String>,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.city.as_deref(), self.country.as_deref()) {
            (Some(city), Some(country)) => write!(f, "{city}, {country}"),
            (Some(only), None) | (None, Some(only)) => f.write_str(only),
            (None, None) => f.write_str("N/A"),
        }
    }
}

/// A business registered on the platform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Business {
    /// Record id
    #[serde(rename = "_id")]
    pub id: RecordId,
    /// Business display name
    #[serde(default)]
    pub business_name: String,
    /// Free-text description
    #[serde(default)]
    pub description: Option<String>,
    /// Category reference
    #[serde(default)]
    pub category: Option<Reference>,
    /// Owning user
    #[serde(default, rename = "userId")]
    pub owner: Option<Reference>,
    /// Verification flag, independent of status
    #[serde(default)]
    pub is_verified: bool,
    /// Active or suspended
    #[serde(default)]
    pub status: AccountStatus,
    /// Location
    #[serde(default)]
    pub location: Option<Location>,
    /// Logo URL
    #[serde(default)]
    pub logo: Option<String>,
    /// Contact details
    #[serde(default)]
    pub contact_info: Option<ContactInfo>,
    /// Accepted submission kinds
    #[serde(default)]
    pub content_settings: Option<ContentSettings>,
    /// Reward milestones
    #[serde(default)]
    pub milestones: Vec<Milestone>,
    /// Content items received
    #[serde(default)]
    pub total_content: u64,
    /// Distinct creators who submitted content
    #[serde(default)]
    pub total_unique_creators: u64,
    /// Points awarded through this business
    #[serde(default)]
    pub total_points: u64,
    /// When the business was verified
    #[serde(default)]
    pub verified_at: Option<DateTime<Utc>>,
    /// Creation timestamp
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Last update timestamp
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Business category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// Record id
    #[serde(rename = "_id")]
    pub id: RecordId,
    /// Category name
    pub name: String,
    /// Free-form description
    #[serde(default)]
    pub description: Option<String>,
    /// Icon URL
    #[serde(default)]
    pub icon: Option<String>,
    /// Number of businesses using the category; advisory only
    #[serde(default)]
    pub business_count: u64,
    /// Creation timestamp
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Last update timestamp
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Payload for creating or updating a category
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryInput {
    /// Category name
    pub name: String,
    /// Description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Icon URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

/// Content creator account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Creator {
    /// Record id
    #[serde(rename = "_id")]
    pub id: RecordId,
    /// Email address
    #[serde(default)]
    pub email: Option<String>,
    /// Profile
    #[serde(default)]
    pub profile: Profile,
    /// Content submissions made
    #[serde(default)]
    pub total_submissions: u64,
    /// Points earned
    #[serde(default)]
    pub total_points: u64,
    /// Active or suspended
    #[serde(default)]
    pub status: AccountStatus,
    /// Creation timestamp
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Creator {
    /// Display name, falling back to email then id
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.profile
            .name
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or_else(|| self.id.as_str())
    }
}

/// A piece of submitted content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    /// Record id
    #[serde(rename = "_id")]
    pub id: RecordId,
    /// Submitting creator
    #[serde(default)]
    pub creator: Option<Reference>,
    /// Business the content was submitted for
    #[serde(default)]
    pub business: Option<Reference>,
    /// Content type (photo, video, review, ...)
    #[serde(default, rename = "type")]
    pub content_type: Option<String>,
    /// Review status (pending, accepted, rejected)
    #[serde(default)]
    pub status: Option<String>,
    /// Points awarded
    #[serde(default)]
    pub points: u64,
    /// Creation timestamp
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Aggregate counts returned with every business page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessFilterCounts {
    /// All businesses matching the non-status filters
    #[serde(default)]
    pub total: u64,
    /// Verified businesses
    #[serde(default)]
    pub verified: u64,
    /// Unverified businesses
    #[serde(default)]
    pub unverified: u64,
    /// Suspended businesses
    #[serde(default)]
    pub suspended: u64,
}

/// Server-side pagination block
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// Current page (1-based)
    #[serde(default)]
    pub page: u64,
    /// Page size
    #[serde(default)]
    pub limit: u64,
    /// Total records
    #[serde(default)]
    pub total: u64,
    /// Total pages
    #[serde(default)]
    pub total_pages: u64,
}

/// User statistics section of the dashboard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStatistics {
    /// All users
    #[serde(default)]
    pub total_users: u64,
    /// Users with the creator role
    #[serde(default)]
    pub content_creators: u64,
    /// Users with the business role
    #[serde(default)]
    pub local_businesses: u64,
    /// Users registered in the last seven days
    #[serde(default)]
    pub new_users_this_week: u64,
}

/// Business statistics section of the dashboard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessStatistics {
    /// All businesses
    #[serde(default)]
    pub total_businesses: u64,
    /// Verified businesses
    #[serde(default)]
    pub verified_businesses: u64,
    /// Businesses awaiting verification
    #[serde(default)]
    pub unverified_businesses: u64,
}

/// Content statistics section of the dashboard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentStatistics {
    /// All content
    #[serde(default)]
    pub total_content: u64,
    /// Submitted today
    #[serde(default)]
    pub today_content: u64,
    /// Submitted in the last seven days
    #[serde(default)]
    pub this_week_content: u64,
    /// Submitted this month
    #[serde(default)]
    pub this_month_content: u64,
}

/// One point of the user growth series
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserGrowthPoint {
    /// Bucket date
    pub date: String,
    /// New creators in the bucket
    #[serde(default)]
    pub content_creators: u64,
    /// New businesses in the bucket
    #[serde(default)]
    pub local_businesses: u64,
}

/// One point of the content generation series
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentGrowthPoint {
    /// Bucket date
    pub date: String,
    /// Accepted submissions
    #[serde(default)]
    pub accepted: u64,
    /// Rejected submissions
    #[serde(default)]
    pub rejected: u64,
    /// Pending submissions
    #[serde(default)]
    pub pending: u64,
}

/// Time series shown on the dashboard
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthCharts {
    /// User growth series
    #[serde(default)]
    pub user_growth: Vec<UserGrowthPoint>,
    /// Content generation series
    #[serde(default)]
    pub content_growth: Vec<ContentGrowthPoint>,
}

/// Share of businesses in one category
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryShare {
    /// Category name
    #[serde(default)]
    pub category_name: Option<String>,
    /// Businesses in the category
    #[serde(default)]
    pub count: u64,
}

/// Category distribution section of the dashboard
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDistribution {
    /// Businesses grouped by category
    #[serde(default)]
    pub businesses_by_category: Vec<CategoryShare>,
}

/// Entry of the recent activity feed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityEntry {
    /// Activity type, e.g. `user_registration`
    #[serde(default, rename = "type")]
    pub kind: String,
    /// Human-readable description
    #[serde(default)]
    pub description: String,
    /// When it happened
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

/// Platform-wide dashboard summary
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    /// User statistics
    #[serde(default)]
    pub user_statistics: UserStatistics,
    /// Business statistics
    #[serde(default)]
    pub business_statistics: BusinessStatistics,
    /// Content statistics
    #[serde(default)]
    pub content_statistics: ContentStatistics,
    /// Growth series
    #[serde(default)]
    pub growth_charts: GrowthCharts,
    /// Category distribution
    #[serde(default)]
    pub category_distribution: CategoryDistribution,
    /// Recent activity feed
    #[serde(default)]
    pub recent_activity: Vec<ActivityEntry>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    #[test]
    fn test_business_deserializes_populated_references() {
        let value = json!({
            "_id": "b1",
            "businessName": "Corner Cafe",
            "category": {"_id": "c1", "name": "Food"},
            "userId": {"_id": "u1", "email": "owner@example.com", "profile": {"name": "Ada"}},
            "isVerified": true,
            "status": "suspended",
            "location": {"city": "Lyon", "country": "FR"},
            "createdAt": "2024-03-01T10:00:00.000Z",
            "someFutureField": 42
        });

        let business: Business = serde_json::from_value(value).unwrap();

        assert_eq!(business.id, RecordId::from("b1"));
        assert_eq!(business.category.as_ref().unwrap().label(), "Food");
        assert_eq!(business.owner.as_ref().unwrap().label(), "Ada");
        assert!(business.is_verified);
        assert_eq!(business.status, AccountStatus::Suspended);
        assert_eq!(business.location.unwrap().to_string(), "Lyon, FR");
        assert!(business.created_at.is_some());
        assert_eq!(business.total_content, 0);
    }

    #[test]
    fn test_business_detail_fields() {
        let value = json!({
            "_id": "b3",
            "businessName": "Harbor Books",
            "description": "Independent bookshop",
            "contactInfo": {"phone": "+33 4 00 00 00 00"},
            "contentSettings": {"acceptsPhoto": true},
            "milestones": [
                {"points": 100, "rewardTitle": "Free coffee"},
                {"points": 500, "rewardTitle": "Tote bag", "termsAndConditions": "While stocks last"}
            ],
            "totalUniqueCreators": 12,
            "verifiedAt": "2024-04-02T09:30:00Z"
        });

        let business: Business = serde_json::from_value(value).unwrap();

        assert_eq!(business.description.as_deref(), Some("Independent bookshop"));
        assert_eq!(
            business.content_settings,
            Some(ContentSettings {
                accepts_photo: true,
                accepts_video: false
            })
        );
        assert_eq!(business.milestones.len(), 2);
        assert_eq!(business.milestones[1].reward_title, "Tote bag");
        assert_eq!(business.total_unique_creators, 12);
        assert!(business.verified_at.is_some());
        assert!(business.contact_info.unwrap().email.is_none());
    }

    #[test]
    fn test_business_accepts_bare_id_reference() {
        let value = json!({"_id": "b2", "businessName": "Shop", "category": "c9"});

        let business: Business = serde_json::from_value(value).unwrap();

        assert_eq!(business.category.unwrap().id(), &RecordId::from("c9"));
        assert_eq!(business.status, AccountStatus::Active);
        assert!(!business.is_verified);
    }

    #[test]
    fn test_category_defaults_business_count() {
        let category: Category =
            serde_json::from_value(json!({"_id": "c1", "name": "Food"})).unwrap();

        assert_eq!(category.business_count, 0);
        assert!(category.description.is_none());
    }

    #[test]
    fn test_category_input_omits_empty_optionals() {
        let input = CategoryInput {
            name: "Books".to_string(),
            description: None,
            icon: None,
        };

        assert_eq!(serde_json::to_value(&input).unwrap(), json!({"name": "Books"}));
    }

    #[test]
    fn test_dashboard_stats_tolerates_missing_sections() {
        let stats: DashboardStats =
            serde_json::from_value(json!({"userStatistics": {"totalUsers": 12}})).unwrap();

        assert_eq!(stats.user_statistics.total_users, 12);
        assert_eq!(stats.business_statistics, BusinessStatistics::default());
        assert!(stats.recent_activity.is_empty());
    }

    #[rstest]
    #[case("active", AccountStatus::Active)]
    #[case("Suspended", AccountStatus::Suspended)]
    #[case(" suspended ", AccountStatus::Suspended)]
    fn test_account_status_from_str(#[case] input: &str, #[case] expected: AccountStatus) {
        assert_eq!(input.parse::<AccountStatus>().unwrap(), expected);
    }

    #[test]
    fn test_account_status_rejects_unknown() {
        assert!("banned".parse::<AccountStatus>().is_err());
    }

    #[test]
    fn test_creator_display_name_fallbacks() {
        let creator: Creator =
            serde_json::from_value(json!({"_id": "u7", "email": "c@example.com"})).unwrap();

        assert_eq!(creator.display_name(), "c@example.com");
    }
}
