//! Pull request aggregation
//!
//! Builds the two-category view of open pull requests for one user in one
//! organization: pulls awaiting their review, and pulls they have reviewed.

use std::collections::HashSet;
use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::Result;

/// Which relationship between user and pull a search selects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    /// Review has been requested of the user
    ReviewRequested,
    /// The user has submitted a review
    ReviewedBy,
}

impl QueryKind {
    fn qualifier(self) -> &'static str {
        match self {
            QueryKind::ReviewRequested => "review-requested",
            QueryKind::ReviewedBy => "reviewed-by",
        }
    }
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.qualifier())
    }
}

/// A search over open pull requests in one organization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub organization: String,
    pub user: String,
    pub kind: QueryKind,
}

impl SearchQuery {
    pub fn new(organization: impl Into<String>, user: impl Into<String>, kind: QueryKind) -> Self {
        Self {
            organization: organization.into(),
            user: user.into(),
            kind,
        }
    }

    /// Render as GitHub search syntax, oldest first
    pub fn to_query_string(&self) -> String {
        format!(
            "is:pr is:open org:{} {}:{} sort:created-asc",
            self.organization,
            self.kind.qualifier(),
            self.user
        )
    }
}

/// A raw search hit as returned by the source-control host
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SearchItem {
    pub html_url: String,
    pub number: u64,
    pub title: String,
    /// Login of the pull request author
    pub author: String,
}

/// Source of pull request search results
#[async_trait]
pub trait PullSearch: Send + Sync {
    /// Run a search, returning every matching item in upstream order
    async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchItem>>;
}

/// A pull request as shown in a digest
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PullSummary {
    /// Organization derived from the pull URL
    pub organization: String,
    pub url: String,
    pub number: u64,
    pub title: String,
}

/// Categorized pulls for one user in one organization
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReviewQueue {
    pub review_requested: Vec<PullSummary>,
    pub reviewed: Vec<PullSummary>,
}

impl ReviewQueue {
    pub fn is_empty(&self) -> bool {
        self.review_requested.is_empty() && self.reviewed.is_empty()
    }
}

/// Run both searches for `user` in `organization` and categorize the results
///
/// Both queries must succeed; a failure in either aborts the aggregation.
/// Pulls authored by `user` are never listed as reviewed.
pub async fn aggregate(
    search: &dyn PullSearch,
    organization: &str,
    user: &str,
) -> Result<ReviewQueue> {
    let requested_query = SearchQuery::new(organization, user, QueryKind::ReviewRequested);
    let reviewed_query = SearchQuery::new(organization, user, QueryKind::ReviewedBy);

    let (requested, reviewed) = tokio::try_join!(
        search.search(&requested_query),
        search.search(&reviewed_query)
    )?;

    debug!(
        organization,
        user,
        requested = requested.len(),
        reviewed = reviewed.len(),
        "Search results received"
    );

    let review_requested = summarize(requested, organization, |_| true);
    let reviewed = summarize(reviewed, organization, |item| {
        !item.author.eq_ignore_ascii_case(user)
    });

    Ok(ReviewQueue {
        review_requested,
        reviewed,
    })
}

fn summarize(
    items: Vec<SearchItem>,
    fallback_org: &str,
    keep: impl Fn(&SearchItem) -> bool,
) -> Vec<PullSummary> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| keep(item))
        .filter(|item| seen.insert(item.html_url.clone()))
        .map(|item| PullSummary {
            organization: organization_from_url(&item.html_url)
                .unwrap_or_else(|| fallback_org.to_string()),
            url: item.html_url,
            number: item.number,
            title: item.title,
        })
        .collect()
}

/// Extract the owner segment of a pull URL
///
/// `https://github.com/acme/widgets/pull/7` yields `acme`.
pub fn organization_from_url(html_url: &str) -> Option<String> {
    let url = url::Url::parse(html_url).ok()?;
    url.path_segments()?
        .find(|segment| !segment.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::Error;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory search keyed by (organization, kind)
    #[derive(Default)]
    pub(crate) struct FakeSearch {
        pub results: HashMap<(String, String), Vec<SearchItem>>,
        pub fail_kind: Option<QueryKind>,
        pub queries: Mutex<Vec<SearchQuery>>,
    }

    impl FakeSearch {
        pub fn with(mut self, org: &str, kind: QueryKind, items: Vec<SearchItem>) -> Self {
            self.results
                .insert((org.to_string(), kind.to_string()), items);
            self
        }
    }

    #[async_trait]
    impl PullSearch for FakeSearch {
        async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchItem>> {
            self.queries.lock().unwrap().push(query.clone());
            if self.fail_kind == Some(query.kind) {
                return Err(Error::Upstream("search unavailable".to_string()));
            }
            Ok(self
                .results
                .get(&(query.organization.clone(), query.kind.to_string()))
                .cloned()
                .unwrap_or_default())
        }
    }

    pub(crate) fn item(url: &str, number: u64, title: &str, author: &str) -> SearchItem {
        SearchItem {
            html_url: url.to_string(),
            number,
            title: title.to_string(),
            author: author.to_string(),
        }
    }

    #[test]
    fn test_query_string() {
        let q = SearchQuery::new("acme", "bob", QueryKind::ReviewRequested);
        assert_eq!(
            q.to_query_string(),
            "is:pr is:open org:acme review-requested:bob sort:created-asc"
        );

        let q = SearchQuery::new("acme", "bob", QueryKind::ReviewedBy);
        assert!(q.to_query_string().contains("reviewed-by:bob"));
    }

    #[test]
    fn test_organization_from_url() {
        assert_eq!(
            organization_from_url("https://github.com/acme/widgets/pull/7"),
            Some("acme".to_string())
        );
        assert_eq!(organization_from_url("https://github.com/"), None);
        assert_eq!(organization_from_url("not a url"), None);
    }

    #[tokio::test]
    async fn test_self_authored_excluded_from_reviewed() {
        let search = FakeSearch::default().with(
            "acme",
            QueryKind::ReviewedBy,
            vec![
                item("https://github.com/acme/a/pull/1", 1, "Mine", "Bob"),
                item("https://github.com/acme/a/pull/2", 2, "Theirs", "alice"),
            ],
        );

        let queue = aggregate(&search, "acme", "bob").await.unwrap();
        assert_eq!(queue.reviewed.len(), 1);
        assert_eq!(queue.reviewed[0].number, 2);
    }

    #[tokio::test]
    async fn test_self_authored_kept_in_review_requested() {
        let search = FakeSearch::default().with(
            "acme",
            QueryKind::ReviewRequested,
            vec![item("https://github.com/acme/a/pull/1", 1, "Mine", "bob")],
        );

        let queue = aggregate(&search, "acme", "bob").await.unwrap();
        assert_eq!(queue.review_requested.len(), 1);
    }

    #[tokio::test]
    async fn test_upstream_order_preserved() {
        let search = FakeSearch::default().with(
            "acme",
            QueryKind::ReviewRequested,
            vec![
                item("https://github.com/acme/a/pull/9", 9, "Oldest", "alice"),
                item("https://github.com/acme/b/pull/3", 3, "Middle", "carol"),
                item("https://github.com/acme/a/pull/12", 12, "Newest", "alice"),
            ],
        );

        let queue = aggregate(&search, "acme", "bob").await.unwrap();
        let numbers: Vec<u64> = queue.review_requested.iter().map(|p| p.number).collect();
        assert_eq!(numbers, vec![9, 3, 12]);
    }

    #[tokio::test]
    async fn test_duplicates_removed_within_category() {
        let search = FakeSearch::default().with(
            "acme",
            QueryKind::ReviewRequested,
            vec![
                item("https://github.com/acme/a/pull/1", 1, "One", "alice"),
                item("https://github.com/acme/a/pull/1", 1, "One", "alice"),
            ],
        );

        let queue = aggregate(&search, "acme", "bob").await.unwrap();
        assert_eq!(queue.review_requested.len(), 1);
    }

    #[tokio::test]
    async fn test_organization_taken_from_url() {
        let search = FakeSearch::default().with(
            "acme",
            QueryKind::ReviewRequested,
            vec![item("https://github.com/acme-forks/a/pull/4", 4, "Fork", "alice")],
        );

        let queue = aggregate(&search, "acme", "bob").await.unwrap();
        assert_eq!(queue.review_requested[0].organization, "acme-forks");
    }

    #[tokio::test]
    async fn test_either_failure_fails_aggregation() {
        for kind in [QueryKind::ReviewRequested, QueryKind::ReviewedBy] {
            let search = FakeSearch {
                fail_kind: Some(kind),
                ..Default::default()
            }
            .with(
                "acme",
                QueryKind::ReviewRequested,
                vec![item("https://github.com/acme/a/pull/1", 1, "One", "alice")],
            );

            let err = aggregate(&search, "acme", "bob").await.unwrap_err();
            assert!(matches!(err, Error::Upstream(_)));
        }
    }

    /// Search whose queries only complete once both are in flight
    struct RendezvousSearch {
        barrier: tokio::sync::Barrier,
    }

    #[async_trait]
    impl PullSearch for RendezvousSearch {
        async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchItem>> {
            self.barrier.wait().await;
            Ok(vec![item(
                &format!("https://github.com/acme/a/pull/{}", query.kind as u8 + 1),
                1,
                "Pull",
                "alice",
            )])
        }
    }

    /// Fails review-requested immediately; reviewed-by never completes
    struct FailFastSearch;

    #[async_trait]
    impl PullSearch for FailFastSearch {
        async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchItem>> {
            match query.kind {
                QueryKind::ReviewRequested => Err(Error::Upstream("rate limited".to_string())),
                QueryKind::ReviewedBy => std::future::pending().await,
            }
        }
    }

    #[tokio::test]
    async fn test_queries_run_concurrently() {
        let search = RendezvousSearch {
            barrier: tokio::sync::Barrier::new(2),
        };

        let queue = tokio::time::timeout(
            std::time::Duration::from_secs(5),
            aggregate(&search, "acme", "bob"),
        )
        .await
        .expect("queries were not issued concurrently")
        .unwrap();

        assert_eq!(queue.review_requested.len(), 1);
        assert_eq!(queue.reviewed.len(), 1);
    }

    #[tokio::test]
    async fn test_failure_does_not_wait_for_other_query() {
        let result = tokio::time::timeout(
            std::time::Duration::from_secs(5),
            aggregate(&FailFastSearch, "acme", "bob"),
        )
        .await
        .expect("aggregation waited on the pending query");

        assert!(matches!(result, Err(Error::Upstream(_))));
    }

    #[tokio::test]
    async fn test_both_queries_issued() {
        let search = FakeSearch::default();
        let queue = aggregate(&search, "acme", "bob").await.unwrap();
        assert!(queue.is_empty());

        let queries = search.queries.lock().unwrap();
        assert_eq!(queries.len(), 2);
        assert!(queries.iter().all(|q| q.organization == "acme" && q.user == "bob"));
    }
}
