//! Pull request search
//!
//! Uses the REST issue search endpoint directly so only the fields the relay
//! needs are decoded.

use async_trait::async_trait;
use relay_core::{PullSearch, SearchItem, SearchQuery};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{Error, GitHubClient, Result};

const PER_PAGE: u32 = 100;

/// GitHub returns at most this many results for any search
const MAX_RESULTS: usize = 1000;

#[derive(Debug, Serialize)]
struct SearchParams<'a> {
    q: &'a str,
    sort: &'a str,
    order: &'a str,
    per_page: u32,
    page: u32,
}

#[derive(Debug, Deserialize)]
struct SearchPage {
    total_count: u64,
    #[serde(default)]
    items: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    html_url: String,
    number: u64,
    title: String,
    user: Option<Account>,
}

#[derive(Debug, Deserialize)]
struct Account {
    login: String,
}

impl From<SearchHit> for SearchItem {
    fn from(hit: SearchHit) -> Self {
        SearchItem {
            html_url: hit.html_url,
            number: hit.number,
            title: hit.title,
            author: hit.user.map(|u| u.login).unwrap_or_default(),
        }
    }
}

impl GitHubClient {
    /// Search issues and pulls, following pages oldest first
    pub async fn search_pulls(&self, query: &str) -> Result<Vec<SearchItem>> {
        debug!(query, "Searching pull requests");

        let mut items = Vec::new();
        let mut page = 1u32;
        loop {
            let params = SearchParams {
                q: query,
                sort: "created",
                order: "asc",
                per_page: PER_PAGE,
                page,
            };

            let result: SearchPage = self
                .client()
                .get("/search/issues", Some(&params))
                .await
                .map_err(|e| match &e {
                    octocrab::Error::GitHub { source, .. }
                        if source.message.contains("Validation Failed") =>
                    {
                        Error::InvalidQuery {
                            query: query.to_string(),
                            message: source.message.clone(),
                        }
                    }
                    _ => Error::Api(e),
                })?;

            let fetched = result.items.len();
            items.extend(result.items.into_iter().map(SearchItem::from));

            let total = usize::try_from(result.total_count).unwrap_or(usize::MAX);
            if fetched < PER_PAGE as usize || items.len() >= total.min(MAX_RESULTS) {
                break;
            }
            page += 1;
        }

        info!(query, count = items.len(), "Fetched search results");

        Ok(items)
    }
}

#[async_trait]
impl PullSearch for GitHubClient {
    async fn search(&self, query: &SearchQuery) -> relay_core::Result<Vec<SearchItem>> {
        Ok(self.search_pulls(&query.to_query_string()).await?)
    }
}
