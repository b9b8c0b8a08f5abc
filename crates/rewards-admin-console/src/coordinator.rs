//! Query caching, retry and invalidate-on-mutation
//!
//! Reads go through [`Coordinator`], which keys every result by
//! `(collection, params)`, deduplicates identical in-flight fetches and
//! retries transient failures once. Mutations never patch cached data: they
//! mark every affected collection stale so the next read refetches.

use crate::{
    filters::{BusinessFilters, ContentFilters, CreatorFilters, FilterSet},
    notify::Notifier,
};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rewards_admin_client::{
    AdminService, ApiError, ApiResult, BusinessPage, ContentPage, CreatorPage, ErrorKind,
    MutationAck, QueryParams,
};
use rewards_admin_core::{Category, CategoryInput, DashboardStats, RecordId};
use std::{collections::HashMap, fmt, future::Future, sync::Arc};
use tokio::sync::Notify;
use tracing::{debug, info, warn};

/// Remote collections the console reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    /// Dashboard summary
    DashboardStats,
    /// Categories
    Categories,
    /// Businesses
    Businesses,
    /// Creators
    Creators,
    /// Submitted content
    Content,
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::DashboardStats => "dashboardStats",
            Self::Categories => "categories",
            Self::Businesses => "businesses",
            Self::Creators => "creators",
            Self::Content => "content",
        })
    }
}

/// Cache key: a collection plus the exact parameters sent
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    collection: Collection,
    params: QueryParams,
}

impl QueryKey {
    /// Key for `collection` queried with `params`
    #[must_use]
    pub const fn new(collection: Collection, params: QueryParams) -> Self {
        Self { collection, params }
    }

    /// Key for an unparameterized query
    #[must_use]
    pub const fn bare(collection: Collection) -> Self {
        Self::new(collection, Vec::new())
    }

    /// Queried collection
    #[must_use]
    pub const fn collection(&self) -> Collection {
        self.collection
    }

    /// Parameters, in wire order
    #[must_use]
    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }
}

/// A cached query result
#[derive(Debug, Clone, PartialEq)]
pub enum QueryData {
    /// Dashboard summary
    DashboardStats(DashboardStats),
    /// All categories
    Categories(Vec<Category>),
    /// One page of businesses
    Businesses(BusinessPage),
    /// One page of creators
    Creators(CreatorPage),
    /// One page of content
    Content(ContentPage),
}

/// Freshness of a cache entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    /// Safe to show without refetching
    Fresh,
    /// Invalidated by a mutation; must be refetched before being shown
    Stale,
}

/// Cached result with its freshness
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Result
    pub data: QueryData,
    /// Freshness
    pub state: CacheState,
    /// When the result was fetched
    pub fetched_at: DateTime<Utc>,
}

/// Outcome of looking a key up before fetching
#[derive(Debug)]
pub enum Lookup {
    /// A fresh result is cached
    Hit(QueryData),
    /// No identical fetch is running; the caller must fetch
    Leader,
    /// An identical fetch is running; wait on the handle and look up again
    Wait(Arc<Notify>),
}

#[derive(Debug)]
struct InFlight {
    notify: Arc<Notify>,
    /// Collection generation when the fetch started
    generation: u64,
}

#[derive(Debug, Default)]
struct CacheInner {
    entries: HashMap<QueryKey, CacheEntry>,
    in_flight: HashMap<QueryKey, InFlight>,
    /// Bumped by every invalidation of a collection
    generations: HashMap<Collection, u64>,
}

impl CacheInner {
    fn generation(&self, collection: Collection) -> u64 {
        self.generations.get(&collection).copied().unwrap_or_default()
    }
}

/// Shared query cache with in-flight tracking
#[derive(Debug, Default)]
pub struct QueryCache {
    inner: Mutex<CacheInner>,
}

impl QueryCache {
    /// Empty cache
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `key` against the cache and the in-flight set
    ///
    /// Returns [`Lookup::Leader`] at most once per key until
    /// [`QueryCache::finish`] is called for it.
    pub fn lookup(&self, key: &QueryKey) -> Lookup {
        let mut inner = self.inner.lock();
        if let Some(entry) = inner.entries.get(key)
            && entry.state == CacheState::Fresh
        {
            return Lookup::Hit(entry.data.clone());
        }
        if let Some(flight) = inner.in_flight.get(key) {
            return Lookup::Wait(Arc::clone(&flight.notify));
        }
        let generation = inner.generation(key.collection);
        inner.in_flight.insert(
            key.clone(),
            InFlight {
                notify: Arc::new(Notify::new()),
                generation,
            },
        );
        Lookup::Leader
    }

    /// Whether an identical fetch is running
    #[must_use]
    pub fn is_in_flight(&self, key: &QueryKey) -> bool {
        self.inner.lock().in_flight.contains_key(key)
    }

    /// End the in-flight fetch for `key`, storing its result when it succeeded
    ///
    /// A result whose collection was invalidated while the fetch ran is
    /// stored as stale, so the next read refetches.
    pub fn finish(&self, key: &QueryKey, data: Option<QueryData>) {
        let mut inner = self.inner.lock();
        let flight = inner.in_flight.remove(key);
        if let Some(data) = data {
            let current = inner.generation(key.collection);
            let state = match &flight {
                Some(flight) if flight.generation == current => CacheState::Fresh,
                _ => {
                    debug!(collection = %key.collection, "Result predates an invalidation");
                    CacheState::Stale
                }
            };
            inner.entries.insert(
                key.clone(),
                CacheEntry {
                    data,
                    state,
                    fetched_at: Utc::now(),
                },
            );
        }
        if let Some(flight) = flight {
            flight.notify.notify_waiters();
        }
    }

    /// Entry for `key`, whatever its freshness
    #[must_use]
    pub fn get(&self, key: &QueryKey) -> Option<CacheEntry> {
        self.inner.lock().entries.get(key).cloned()
    }

    /// Mark every entry of `collection` stale, including results of fetches
    /// still running; returns how many stored entries were marked
    pub fn invalidate(&self, collection: Collection) -> usize {
        let mut inner = self.inner.lock();
        *inner.generations.entry(collection).or_default() += 1;
        let mut marked = 0;
        for (key, entry) in &mut inner.entries {
            if key.collection == collection && entry.state == CacheState::Fresh {
                entry.state = CacheState::Stale;
                marked += 1;
            }
        }
        marked
    }

    /// Number of cached entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    /// Whether nothing is cached
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Ends an in-flight fetch even when the fetching future is dropped
struct InFlightGuard<'a> {
    cache: &'a QueryCache,
    key: &'a QueryKey,
    result: Option<QueryData>,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.cache.finish(self.key, self.result.take());
    }
}

/// Automatic retry for failed reads
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    max_retries: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_retries: 1 }
    }
}

impl RetryPolicy {
    /// Policy that never retries
    #[must_use]
    pub const fn none() -> Self {
        Self { max_retries: 0 }
    }

    /// Whether a read that failed with `err` after `failures` failures should
    /// be attempted again
    #[must_use]
    pub fn should_retry(&self, err: &ApiError, failures: u32) -> bool {
        if failures > self.max_retries {
            return false;
        }
        if !matches!(err.kind(), ErrorKind::Transient | ErrorKind::NotFound) {
            return false;
        }
        let hard_status = matches!(err.status(), Some(401 | 403 | 500 | 502 | 503));
        let message = err.message();
        let database_failure = message.contains("database") || message.contains("Failed to");
        !(hard_status || database_failure)
    }

    /// Run `op`, retrying per policy
    ///
    /// # Errors
    ///
    /// Returns the last error once the policy gives up.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> ApiResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ApiResult<T>>,
    {
        let mut failures = 0;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    failures += 1;
                    if !self.should_retry(&err, failures) {
                        return Err(err);
                    }
                    warn!(error = %err, attempt = failures, "Retrying failed request");
                }
            }
        }
    }
}

/// A write operation against the admin API
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    /// Mark a business verified
    VerifyBusiness {
        /// Business id
        id: RecordId,
    },
    /// Suspend a business
    SuspendBusiness {
        /// Business id
        id: RecordId,
        /// Operator-supplied reason
        reason: String,
    },
    /// Lift a business suspension
    UnsuspendBusiness {
        /// Business id
        id: RecordId,
    },
    /// Delete a business
    DeleteBusiness {
        /// Business id
        id: RecordId,
    },
    /// Create a category
    CreateCategory {
        /// New category
        input: CategoryInput,
    },
    /// Update a category
    UpdateCategory {
        /// Category id
        id: RecordId,
        /// Updated fields
        input: CategoryInput,
    },
    /// Delete a category
    DeleteCategory {
        /// Category id
        id: RecordId,
    },
    /// Suspend a creator
    SuspendCreator {
        /// Creator id
        id: RecordId,
        /// Operator-supplied reason
        reason: String,
    },
    /// Lift a creator suspension
    UnsuspendCreator {
        /// Creator id
        id: RecordId,
    },
}

const BUSINESS_COLLECTIONS: &[Collection] = &[Collection::Businesses, Collection::DashboardStats];
const CATEGORY_COLLECTIONS: &[Collection] = &[
    Collection::Categories,
    Collection::Businesses,
    Collection::DashboardStats,
];
const CREATOR_COLLECTIONS: &[Collection] = &[Collection::Creators, Collection::DashboardStats];

impl Mutation {
    /// Collections whose cached results this mutation makes stale
    #[must_use]
    pub const fn affected_collections(&self) -> &'static [Collection] {
        match self {
            Self::VerifyBusiness { .. }
            | Self::SuspendBusiness { .. }
            | Self::UnsuspendBusiness { .. }
            | Self::DeleteBusiness { .. } => BUSINESS_COLLECTIONS,
            Self::CreateCategory { .. }
            | Self::UpdateCategory { .. }
            | Self::DeleteCategory { .. } => CATEGORY_COLLECTIONS,
            Self::SuspendCreator { .. } | Self::UnsuspendCreator { .. } => CREATOR_COLLECTIONS,
        }
    }

    /// Toast text when the server sends no message
    #[must_use]
    pub const fn success_message(&self) -> &'static str {
        match self {
            Self::VerifyBusiness { .. } => "Business verified successfully",
            Self::SuspendBusiness { .. } => "Business suspended successfully",
            Self::UnsuspendBusiness { .. } => "Business unsuspended successfully",
            Self::DeleteBusiness { .. } => "Business deleted successfully",
            Self::CreateCategory { .. } => "Category created successfully",
            Self::UpdateCategory { .. } => "Category updated successfully",
            Self::DeleteCategory { .. } => "Category deleted successfully",
            Self::SuspendCreator { .. } => "Creator suspended successfully",
            Self::UnsuspendCreator { .. } => "Creator unsuspended successfully",
        }
    }

    /// Toast text when the server error carries no message
    #[must_use]
    pub const fn failure_message(&self) -> &'static str {
        match self {
            Self::VerifyBusiness { .. } => "Failed to verify business",
            Self::SuspendBusiness { .. } => "Failed to suspend business",
            Self::UnsuspendBusiness { .. } => "Failed to unsuspend business",
            Self::DeleteBusiness { .. } => "Failed to delete business",
            Self::CreateCategory { .. } => "Failed to create category",
            Self::UpdateCategory { .. } => "Failed to update category",
            Self::DeleteCategory { .. } => "Failed to delete category",
            Self::SuspendCreator { .. } => "Failed to suspend creator",
            Self::UnsuspendCreator { .. } => "Failed to unsuspend creator",
        }
    }

    async fn execute(&self, service: &AdminService) -> ApiResult<MutationAck> {
        match self {
            Self::VerifyBusiness { id } => service.verify_business(id).await,
            Self::SuspendBusiness { id, reason } => service.suspend_business(id, reason).await,
            Self::UnsuspendBusiness { id } => service.unsuspend_business(id).await,
            Self::DeleteBusiness { id } => service.delete_business(id).await,
            Self::CreateCategory { input } => service.create_category(input).await,
            Self::UpdateCategory { id, input } => service.update_category(id, input).await,
            Self::DeleteCategory { id } => service.delete_category(id).await,
            Self::SuspendCreator { id, reason } => service.suspend_creator(id, reason).await,
            Self::UnsuspendCreator { id } => service.unsuspend_creator(id).await,
        }
    }
}

/// Per-page view of one list query
///
/// The view remembers which key it currently wants. A fetch that resolves
/// for any other key is discarded, so a slow response for old filters can
/// never overwrite the result for the current ones.
#[derive(Debug)]
pub struct ListView<T> {
    current: Option<QueryKey>,
    data: Option<T>,
    error: Option<ApiError>,
    loading: bool,
}

impl<T> Default for ListView<T> {
    fn default() -> Self {
        Self {
            current: None,
            data: None,
            error: None,
            loading: false,
        }
    }
}

impl<T> ListView<T> {
    /// Empty view
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Switch to `key`; returns whether the key changed
    pub fn request(&mut self, key: QueryKey) -> bool {
        if self.current.as_ref() == Some(&key) {
            return false;
        }
        self.current = Some(key);
        self.loading = true;
        self.error = None;
        true
    }

    /// Apply a resolved fetch; returns whether it was current and applied
    pub fn resolve(&mut self, key: &QueryKey, result: ApiResult<T>) -> bool {
        if self.current.as_ref() != Some(key) {
            debug!(collection = %key.collection(), "Discarding stale response");
            return false;
        }
        self.loading = false;
        match result {
            Ok(data) => {
                self.data = Some(data);
                self.error = None;
            }
            Err(err) => self.error = Some(err),
        }
        true
    }

    /// Key currently wanted
    #[must_use]
    pub const fn current_key(&self) -> Option<&QueryKey> {
        self.current.as_ref()
    }

    /// Most recently applied result
    #[must_use]
    pub const fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    /// Failure of the most recent fetch for the current key
    #[must_use]
    pub const fn error(&self) -> Option<&ApiError> {
        self.error.as_ref()
    }

    /// Whether a fetch for the current key is outstanding
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }
}

/// Point `view` at `key`, fetch, and apply the result if `key` is still current
///
/// Returns whether the result was applied. The view's lock is released while
/// the fetch is outstanding.
pub async fn load_into<T, F, Fut>(view: &Mutex<ListView<T>>, key: QueryKey, fetch: F) -> bool
where
    F: FnOnce(QueryKey) -> Fut,
    Fut: Future<Output = ApiResult<T>>,
{
    view.lock().request(key.clone());
    let result = fetch(key.clone()).await;
    view.lock().resolve(&key, result)
}

fn unexpected_shape(key: &QueryKey) -> ApiError {
    ApiError::Decode {
        message: format!("cached {} entry has an unexpected shape", key.collection()),
    }
}

/// Reads and writes the admin API through a shared cache
#[derive(Debug, Clone)]
pub struct Coordinator {
    service: AdminService,
    cache: Arc<QueryCache>,
    retry: RetryPolicy,
    notifier: Notifier,
}

impl Coordinator {
    /// Coordinator with an empty cache and the default retry policy
    #[must_use]
    pub fn new(service: AdminService, notifier: Notifier) -> Self {
        Self {
            service,
            cache: Arc::new(QueryCache::new()),
            retry: RetryPolicy::default(),
            notifier,
        }
    }

    /// Replace the retry policy
    #[must_use]
    pub const fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Shared cache
    #[must_use]
    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    /// Toast queue
    #[must_use]
    pub const fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    /// Underlying service
    #[must_use]
    pub const fn service(&self) -> &AdminService {
        &self.service
    }

    /// Fetch `key`, serving fresh cache hits and joining identical in-flight fetches
    ///
    /// # Errors
    ///
    /// Returns the normalized API error once retries are exhausted.
    pub async fn fetch<F, Fut>(&self, key: &QueryKey, load: F) -> ApiResult<QueryData>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ApiResult<QueryData>>,
    {
        let mut load = load;
        loop {
            match self.cache.lookup(key) {
                Lookup::Hit(data) => {
                    debug!(collection = %key.collection(), "Serving cached result");
                    return Ok(data);
                }
                Lookup::Wait(notify) => {
                    let notified = notify.notified();
                    tokio::pin!(notified);
                    notified.as_mut().enable();
                    if self.cache.is_in_flight(key) {
                        debug!(collection = %key.collection(), "Joining in-flight fetch");
                        notified.await;
                    }
                }
                Lookup::Leader => {
                    let mut guard = InFlightGuard {
                        cache: &self.cache,
                        key,
                        result: None,
                    };
                    let result = self.retry.run(&mut load).await;
                    match &result {
                        Ok(data) => guard.result = Some(data.clone()),
                        Err(err) => self.report_read_failure(key, err),
                    }
                    drop(guard);
                    return result;
                }
            }
        }
    }

    fn report_read_failure(&self, key: &QueryKey, err: &ApiError) {
        // Auth failures already redirected; a toast would only add noise.
        if matches!(err, ApiError::Unauthorized { server_misconfigured: false, .. })
            || matches!(err, ApiError::Forbidden { .. })
        {
            return;
        }
        warn!(collection = %key.collection(), error = %err, "Query failed");
        self.notifier.error(err.message());
    }

    /// Dashboard summary
    ///
    /// # Errors
    ///
    /// Returns the normalized API error.
    pub async fn dashboard_stats(&self) -> ApiResult<DashboardStats> {
        let key = QueryKey::bare(Collection::DashboardStats);
        let service = &self.service;
        match self
            .fetch(&key, || async {
                service.dashboard_stats().await.map(QueryData::DashboardStats)
            })
            .await?
        {
            QueryData::DashboardStats(stats) => Ok(stats),
            _ => Err(unexpected_shape(&key)),
        }
    }

    /// All categories
    ///
    /// # Errors
    ///
    /// Returns the normalized API error.
    pub async fn categories(&self) -> ApiResult<Vec<Category>> {
        let key = QueryKey::bare(Collection::Categories);
        let service = &self.service;
        match self
            .fetch(&key, || async {
                service.list_categories().await.map(QueryData::Categories)
            })
            .await?
        {
            QueryData::Categories(categories) => Ok(categories),
            _ => Err(unexpected_shape(&key)),
        }
    }

    /// Key for the businesses query under `filters`
    #[must_use]
    pub fn businesses_key(filters: &BusinessFilters) -> QueryKey {
        QueryKey::new(Collection::Businesses, filters.query_params())
    }

    /// Businesses matching `filters`
    ///
    /// # Errors
    ///
    /// Returns the normalized API error.
    pub async fn businesses(&self, filters: &BusinessFilters) -> ApiResult<BusinessPage> {
        self.businesses_for(&Self::businesses_key(filters)).await
    }

    /// Businesses for an explicit key
    ///
    /// # Errors
    ///
    /// Returns the normalized API error.
    pub async fn businesses_for(&self, key: &QueryKey) -> ApiResult<BusinessPage> {
        let service = &self.service;
        match self
            .fetch(key, || async {
                service
                    .list_businesses(key.params())
                    .await
                    .map(QueryData::Businesses)
            })
            .await?
        {
            QueryData::Businesses(page) => Ok(page),
            _ => Err(unexpected_shape(key)),
        }
    }

    /// Creators matching `filters`
    ///
    /// # Errors
    ///
    /// Returns the normalized API error.
    pub async fn creators(&self, filters: &CreatorFilters) -> ApiResult<CreatorPage> {
        let key = QueryKey::new(Collection::Creators, filters.query_params());
        let service = &self.service;
        match self
            .fetch(&key, || async {
                service
                    .list_creators(key.params())
                    .await
                    .map(QueryData::Creators)
            })
            .await?
        {
            QueryData::Creators(page) => Ok(page),
            _ => Err(unexpected_shape(&key)),
        }
    }

    /// Content matching `filters`
    ///
    /// # Errors
    ///
    /// Returns the normalized API error.
    pub async fn content(&self, filters: &ContentFilters) -> ApiResult<ContentPage> {
        let key = QueryKey::new(Collection::Content, filters.query_params());
        let service = &self.service;
        match self
            .fetch(&key, || async {
                service
                    .list_content(key.params())
                    .await
                    .map(QueryData::Content)
            })
            .await?
        {
            QueryData::Content(page) => Ok(page),
            _ => Err(unexpected_shape(&key)),
        }
    }

    /// Run a mutation, then invalidate and notify
    ///
    /// Mutations are never retried.
    ///
    /// # Errors
    ///
    /// Returns the normalized API error; an error toast has already been
    /// pushed.
    pub async fn mutate(&self, mutation: &Mutation) -> ApiResult<MutationAck> {
        match mutation.execute(&self.service).await {
            Ok(ack) => {
                for &collection in mutation.affected_collections() {
                    let marked = self.cache.invalidate(collection);
                    debug!(%collection, marked, "Invalidated cached queries");
                }
                let message = ack
                    .message
                    .clone()
                    .unwrap_or_else(|| mutation.success_message().to_string());
                info!(?mutation, "Mutation applied");
                self.notifier.success(message);
                Ok(ack)
            }
            Err(err) => {
                let message = if err.message().is_empty() {
                    mutation.failure_message()
                } else {
                    err.message()
                };
                self.notifier.error(message);
                Err(err)
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn key(params: &[(&str, &str)]) -> QueryKey {
        QueryKey::new(
            Collection::Businesses,
            params
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        )
    }

    fn page(name: &str) -> BusinessPage {
        serde_json::from_value(serde_json::json!({
            "businesses": [{"_id": "b1", "businessName": name}]
        }))
        .unwrap()
    }

    #[test]
    fn test_identical_params_share_a_key() {
        assert_eq!(key(&[("search", "cafe")]), key(&[("search", "cafe")]));
        assert_ne!(key(&[("search", "cafe")]), key(&[("search", "bar")]));
    }

    #[test]
    fn test_lookup_elects_one_leader() {
        let cache = QueryCache::new();
        let k = key(&[]);

        assert!(matches!(cache.lookup(&k), Lookup::Leader));
        assert!(matches!(cache.lookup(&k), Lookup::Wait(_)));

        cache.finish(&k, Some(QueryData::Businesses(page("Cafe"))));
        assert!(matches!(cache.lookup(&k), Lookup::Hit(_)));
    }

    #[test]
    fn test_invalidate_marks_only_that_collection() {
        let cache = QueryCache::new();
        let businesses = key(&[]);
        let categories = QueryKey::bare(Collection::Categories);
        cache.lookup(&businesses);
        cache.finish(&businesses, Some(QueryData::Businesses(page("Cafe"))));
        cache.lookup(&categories);
        cache.finish(&categories, Some(QueryData::Categories(Vec::new())));

        assert_eq!(cache.invalidate(Collection::Businesses), 1);

        assert_eq!(cache.get(&businesses).unwrap().state, CacheState::Stale);
        assert_eq!(cache.get(&categories).unwrap().state, CacheState::Fresh);
        assert!(matches!(cache.lookup(&businesses), Lookup::Leader));
    }

    #[test]
    fn test_result_of_fetch_running_across_invalidation_is_stale() {
        let cache = QueryCache::new();
        let k = key(&[]);
        assert!(matches!(cache.lookup(&k), Lookup::Leader));

        assert_eq!(cache.invalidate(Collection::Businesses), 0);
        cache.finish(&k, Some(QueryData::Businesses(page("Before verify"))));

        assert_eq!(cache.get(&k).unwrap().state, CacheState::Stale);
        assert!(matches!(cache.lookup(&k), Lookup::Leader));
        cache.finish(&k, Some(QueryData::Businesses(page("After verify"))));
        assert!(matches!(cache.lookup(&k), Lookup::Hit(_)));
    }

    #[test]
    fn test_failed_fetch_leaves_no_entry() {
        let cache = QueryCache::new();
        let k = key(&[]);
        cache.lookup(&k);

        cache.finish(&k, None);

        assert!(cache.is_empty());
        assert!(!cache.is_in_flight(&k));
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let mut view: ListView<BusinessPage> = ListView::new();
        let a = key(&[("search", "a")]);
        let b = key(&[("search", "b")]);

        view.request(a.clone());
        view.request(b.clone());

        assert!(view.resolve(&b, Ok(page("B result"))));
        assert!(!view.resolve(&a, Ok(page("A result"))));

        let shown = view.data().unwrap();
        assert_eq!(shown.businesses[0].business_name, "B result");
        assert!(!view.is_loading());
    }

    #[test]
    fn test_error_for_current_key_keeps_previous_data() {
        let mut view: ListView<BusinessPage> = ListView::new();
        let a = key(&[]);
        view.request(a.clone());
        view.resolve(&a, Ok(page("Cafe")));

        let b = key(&[("status", "suspended")]);
        view.request(b.clone());
        view.resolve(
            &b,
            Err(ApiError::Network {
                message: "connection reset".to_string(),
            }),
        );

        assert!(view.error().is_some());
        assert!(view.data().is_some());
    }

    #[test]
    fn test_request_same_key_is_noop() {
        let mut view: ListView<BusinessPage> = ListView::new();

        assert!(view.request(key(&[])));
        assert!(!view.request(key(&[])));
    }

    #[rstest]
    #[case(401, "Token expired", false)]
    #[case(403, "Admins only", false)]
    #[case(500, "Internal error", false)]
    #[case(502, "Bad gateway", false)]
    #[case(503, "Unavailable", false)]
    #[case(504, "Gateway timeout", true)]
    #[case(404, "Not found", true)]
    #[case(429, "Failed to create user", false)]
    #[case(400, "database connection lost", false)]
    fn test_retry_policy(#[case] status: u16, #[case] message: &str, #[case] retry: bool) {
        let err = ApiError::from_response(status, None, &serde_json::json!({ "message": message }));

        assert_eq!(RetryPolicy::default().should_retry(&err, 1), retry);
        assert!(!RetryPolicy::default().should_retry(&err, 2));
    }

    #[rstest]
    #[case(ApiError::Decode { message: "expected a map".to_string() })]
    #[case(ApiError::Validation { message: "limit must be positive".to_string() })]
    #[case(ApiError::Conflict { message: "in use".to_string(), dependent_count: Some(2) })]
    fn test_non_transient_failures_never_retry(#[case] err: ApiError) {
        assert!(!RetryPolicy::default().should_retry(&err, 1));
    }

    #[test]
    fn test_network_errors_retry_once() {
        let err = ApiError::Network {
            message: "timed out".to_string(),
        };

        assert!(RetryPolicy::default().should_retry(&err, 1));
        assert!(!RetryPolicy::none().should_retry(&err, 1));
    }

    #[tokio::test]
    async fn test_run_retries_at_most_once() {
        let attempts = AtomicU32::new(0);

        let result: ApiResult<()> = RetryPolicy::default()
            .run(|| async {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err(ApiError::Network {
                    message: "timed out".to_string(),
                })
            })
            .await;

        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_mutation_invalidation_map() {
        let id = RecordId::from("x");

        assert_eq!(
            Mutation::VerifyBusiness { id: id.clone() }.affected_collections(),
            &[Collection::Businesses, Collection::DashboardStats]
        );
        assert_eq!(
            Mutation::DeleteCategory { id: id.clone() }.affected_collections(),
            &[
                Collection::Categories,
                Collection::Businesses,
                Collection::DashboardStats
            ]
        );
        assert_eq!(
            Mutation::UnsuspendCreator { id }.affected_collections(),
            &[Collection::Creators, Collection::DashboardStats]
        );
    }
}
