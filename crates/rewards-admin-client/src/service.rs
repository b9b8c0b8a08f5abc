//! Typed endpoints of the `/admin` API surface

use crate::{
    api_client::ApiClient,
    error::{ApiError, ApiResult},
};
use rewards_admin_core::{
    Business, BusinessFilterCounts, Category, CategoryInput, ContentItem, Creator, DashboardStats,
    RecordId, types::Pagination,
};
use serde::{Deserialize, Serialize};
use reqwest::Url;
use serde_json::{Value, json};

const ADMIN_PREFIX: &str = "/admin";

// Only the path of this URL is used.
const SEGMENT_BASE: &str = "http://admin.invalid/";

/// Acknowledgement returned by every mutation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationAck {
    /// Server message, preferred over the local success text
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StatsEnvelope {
    #[serde(default)]
    statistics: DashboardStats,
}

#[derive(Debug, Deserialize)]
struct CategoriesEnvelope {
    #[serde(default)]
    categories: Vec<Category>,
}

#[derive(Debug, Deserialize)]
struct CreatorEnvelope {
    creator: Creator,
}

/// One page of businesses with the aggregate counts shown above the table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessPage {
    /// Matching businesses
    #[serde(default)]
    pub businesses: Vec<Business>,
    /// Aggregate counts
    #[serde(default)]
    pub filter_counts: BusinessFilterCounts,
    /// Pagination, when the server paginates
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

/// One page of creators
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreatorPage {
    /// Matching creators
    #[serde(default)]
    pub creators: Vec<Creator>,
    /// Pagination, when the server paginates
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

/// One page of submitted content
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentPage {
    /// Matching content
    #[serde(default)]
    pub content: Vec<ContentItem>,
    /// Pagination, when the server paginates
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

/// Admin API endpoints
#[derive(Debug, Clone)]
pub struct AdminService {
    client: ApiClient,
}

fn admin_path(path: &str) -> String {
    format!("{ADMIN_PREFIX}/{path}")
}

/// `/admin/<collection>/<id>[/<action>]` with the id encoded as one segment
fn record_path(collection: &str, id: &RecordId, action: Option<&str>) -> ApiResult<String> {
    let mut url = Url::parse(SEGMENT_BASE).map_err(|e| ApiError::Configuration {
        message: e.to_string(),
    })?;
    url.path_segments_mut()
        .map_err(|()| ApiError::Configuration {
            message: format!("{SEGMENT_BASE} cannot carry a path"),
        })?
        .pop_if_empty()
        .extend([ADMIN_PREFIX.trim_start_matches('/'), collection, id.as_str()])
        .extend(action);
    Ok(url.path().to_string())
}

impl AdminService {
    /// Wrap a configured client
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Underlying client
    #[must_use]
    pub const fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Platform-wide dashboard summary
    ///
    /// # Errors
    ///
    /// Returns the normalized API error.
    pub async fn dashboard_stats(&self) -> ApiResult<DashboardStats> {
        let envelope: StatsEnvelope = self.client.get(&admin_path("dashboard/stats"), &[]).await?;
        Ok(envelope.statistics)
    }

    /// All categories
    ///
    /// # Errors
    ///
    /// Returns the normalized API error.
    pub async fn list_categories(&self) -> ApiResult<Vec<Category>> {
        let envelope: CategoriesEnvelope = self.client.get(&admin_path("categories"), &[]).await?;
        Ok(envelope.categories)
    }

    /// Create a category
    ///
    /// # Errors
    ///
    /// Returns the normalized API error.
    pub async fn create_category(&self, input: &CategoryInput) -> ApiResult<MutationAck> {
        self.client
            .post(&admin_path("categories"), &serde_json::to_value(input)?)
            .await
    }

    /// Partially update a category
    ///
    /// # Errors
    ///
    /// Returns the normalized API error.
    pub async fn update_category(&self, id: &RecordId, input: &CategoryInput) -> ApiResult<MutationAck> {
        let body = serde_json::to_value(input)?;
        self.client
            .patch(&record_path("categories", id, None)?, Some(&body))
            .await
    }

    /// Delete a category; fails with a conflict while businesses use it
    ///
    /// # Errors
    ///
    /// Returns the normalized API error.
    pub async fn delete_category(&self, id: &RecordId) -> ApiResult<MutationAck> {
        self.client.delete(&record_path("categories", id, None)?).await
    }

    /// Businesses matching `params`
    ///
    /// # Errors
    ///
    /// Returns the normalized API error.
    pub async fn list_businesses(&self, params: &[(String, String)]) -> ApiResult<BusinessPage> {
        self.client.get(&admin_path("businesses"), params).await
    }

    /// Mark a business verified
    ///
    /// # Errors
    ///
    /// Returns the normalized API error.
    pub async fn verify_business(&self, id: &RecordId) -> ApiResult<MutationAck> {
        self.client
            .patch(&record_path("businesses", id, Some("verify"))?, None)
            .await
    }

    /// Suspend a business with an operator-supplied reason
    ///
    /// # Errors
    ///
    /// Returns the normalized API error.
    pub async fn suspend_business(&self, id: &RecordId, reason: &str) -> ApiResult<MutationAck> {
        self.client
            .patch(
                &record_path("businesses", id, Some("suspend"))?,
                Some(&json!({ "reason": reason })),
            )
            .await
    }

    /// Lift a business suspension
    ///
    /// # Errors
    ///
    /// Returns the normalized API error.
    pub async fn unsuspend_business(&self, id: &RecordId) -> ApiResult<MutationAck> {
        self.client
            .patch(&record_path("businesses", id, Some("unsuspend"))?, None)
            .await
    }

    /// Delete a business
    ///
    /// # Errors
    ///
    /// Returns the normalized API error.
    pub async fn delete_business(&self, id: &RecordId) -> ApiResult<MutationAck> {
        self.client.delete(&record_path("businesses", id, None)?).await
    }

    /// Creators matching `params`
    ///
    /// # Errors
    ///
    /// Returns the normalized API error.
    pub async fn list_creators(&self, params: &[(String, String)]) -> ApiResult<CreatorPage> {
        self.client.get(&admin_path("creators"), params).await
    }

    /// Single creator
    ///
    /// # Errors
    ///
    /// Returns the normalized API error.
    pub async fn creator_details(&self, id: &RecordId) -> ApiResult<Creator> {
        let envelope: CreatorEnvelope = self
            .client
            .get(&record_path("creators", id, None)?, &[])
            .await?;
        Ok(envelope.creator)
    }

    /// Suspend a creator with an operator-supplied reason
    ///
    /// # Errors
    ///
    /// Returns the normalized API error.
    pub async fn suspend_creator(&self, id: &RecordId, reason: &str) -> ApiResult<MutationAck> {
        self.client
            .patch(
                &record_path("creators", id, Some("suspend"))?,
                Some(&json!({ "reason": reason })),
            )
            .await
    }

    /// Lift a creator suspension
    ///
    /// # Errors
    ///
    /// Returns the normalized API error.
    pub async fn unsuspend_creator(&self, id: &RecordId) -> ApiResult<MutationAck> {
        self.client
            .patch(&record_path("creators", id, Some("unsuspend"))?, None)
            .await
    }

    /// Submitted content matching `params`
    ///
    /// # Errors
    ///
    /// Returns the normalized API error.
    pub async fn list_content(&self, params: &[(String, String)]) -> ApiResult<ContentPage> {
        self.client.get(&admin_path("content"), params).await
    }

    /// Generate a report; the shape depends on the requested report type
    ///
    /// # Errors
    ///
    /// Returns the normalized API error.
    pub async fn generate_report(&self, params: &[(String, String)]) -> ApiResult<Value> {
        self.client.get(&admin_path("reports"), params).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_admin_path_prefix() {
        assert_eq!(admin_path("dashboard/stats"), "/admin/dashboard/stats");
    }

    #[test]
    fn test_record_path_keeps_plain_ids() {
        assert_eq!(
            record_path("businesses", &RecordId::new("b1"), Some("verify")).unwrap(),
            "/admin/businesses/b1/verify"
        );
        assert_eq!(
            record_path("categories", &RecordId::new("c1"), None).unwrap(),
            "/admin/categories/c1"
        );
    }

    #[test]
    fn test_record_path_encodes_id_as_one_segment() {
        assert_eq!(
            record_path("creators", &RecordId::new("a/b?c#d"), Some("suspend")).unwrap(),
            "/admin/creators/a%2Fb%3Fc%23d/suspend"
        );
        assert_eq!(
            record_path("businesses", &RecordId::new("../stats"), None).unwrap(),
            "/admin/businesses/..%2Fstats"
        );
    }

    #[test]
    fn test_business_page_defaults_filter_counts() {
        let page: BusinessPage = serde_json::from_str(r#"{"businesses": []}"#)
            .unwrap_or_else(|e| panic!("{e}"));

        assert_eq!(page.filter_counts, BusinessFilterCounts::default());
        assert!(page.pagination.is_none());
    }

    #[test]
    fn test_mutation_ack_without_message() {
        let ack: MutationAck = serde_json::from_str("{}").unwrap_or_else(|e| panic!("{e}"));

        assert!(ack.message.is_none());
    }
}
