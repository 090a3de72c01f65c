/// TMDB metadata provider
///
/// Fetches film and series records from The Movie Database REST API. All
/// responses are cached in Redis: summary lists briefly (they churn with
/// popularity), detail records for a week (runtime, budget and episode counts
/// are effectively immutable once published).
use crate::{
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    models::{Category, DetailAttributes, ListKind, MediaItem, TmdbMovie, TmdbPage, TmdbShow},
    services::providers::MetadataProvider,
};
use reqwest::Client as HttpClient;

const LIST_CACHE_TTL: u64 = 3600; // 1 hour
const DETAIL_CACHE_TTL: u64 = 604800; // 1 week

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    cache: Cache,
}

impl TmdbProvider {
    pub fn new(cache: Cache, api_key: String, api_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url,
            cache,
        }
    }

    /// API path segment for a category
    fn segment(category: Category) -> &'static str {
        match category {
            Category::Film => "movie",
            Category::Series => "tv",
        }
    }

    /// Endpoint path for a curated list
    fn list_path(category: Category, list: ListKind) -> String {
        let segment = Self::segment(category);
        match list {
            ListKind::Popular => format!("/{}/popular", segment),
            ListKind::TopRated => format!("/{}/top_rated", segment),
            ListKind::Trending => format!("/trending/{}/week", segment),
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> AppResult<T> {
        let url = format!("{}{}", self.api_url, path);

        let response = self
            .http_client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .query(query)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "TMDB API returned status {}: {}",
                status, body
            )));
        }

        Ok(response.json().await?)
    }

    async fn fetch_items(
        &self,
        category: Category,
        path: &str,
        query: &[(&str, &str)],
    ) -> AppResult<Vec<MediaItem>> {
        let items = match category {
            Category::Film => self
                .get_json::<TmdbPage<TmdbMovie>>(path, query)
                .await?
                .results
                .into_iter()
                .map(MediaItem::from)
                .collect::<Vec<_>>(),
            Category::Series => self
                .get_json::<TmdbPage<TmdbShow>>(path, query)
                .await?
                .results
                .into_iter()
                .map(MediaItem::from)
                .collect::<Vec<_>>(),
        };
        Ok(items)
    }
}

#[async_trait::async_trait]
impl MetadataProvider for TmdbProvider {
    async fn search(&self, category: Category, query: &str) -> AppResult<Vec<MediaItem>> {
        if query.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Search query cannot be empty".to_string(),
            ));
        }

        let key = CacheKey::Search(category, query.to_string());
        if let Some(cached) = self.cache.get_from_cache(&key).await? {
            return Ok(cached);
        }

        let path = format!("/search/{}", Self::segment(category));
        let items = self.fetch_items(category, &path, &[("query", query)]).await?;

        tracing::info!(
            query = %query,
            category = %category,
            results = items.len(),
            provider = "tmdb",
            "Title search completed"
        );

        self.cache.set_in_background(&key, &items, LIST_CACHE_TTL);
        Ok(items)
    }

    async fn fetch_list(
        &self,
        category: Category,
        list: ListKind,
        page: u32,
    ) -> AppResult<Vec<MediaItem>> {
        let key = CacheKey::List(category, list, page);
        if let Some(cached) = self.cache.get_from_cache(&key).await? {
            return Ok(cached);
        }

        let path = Self::list_path(category, list);
        let page_param = page.to_string();
        let items = self
            .fetch_items(category, &path, &[("page", page_param.as_str())])
            .await?;

        tracing::info!(
            category = %category,
            list = %list,
            page = page,
            results = items.len(),
            provider = "tmdb",
            "List page fetched"
        );

        self.cache.set_in_background(&key, &items, LIST_CACHE_TTL);
        Ok(items)
    }

    async fn fetch_detail(&self, category: Category, id: u64) -> AppResult<DetailAttributes> {
        let key = CacheKey::Detail(category, id);
        if let Some(cached) = self.cache.get_from_cache(&key).await? {
            return Ok(cached);
        }

        let path = format!("/{}/{}", Self::segment(category), id);
        let details = match category {
            Category::Film => {
                let movie: TmdbMovie = self.get_json(&path, &[]).await?;
                DetailAttributes::from(&movie)
            }
            Category::Series => {
                let show: TmdbShow = self.get_json(&path, &[]).await?;
                DetailAttributes::from(&show)
            }
        };

        tracing::info!(
            category = %category,
            id = id,
            provider = "tmdb",
            "Detail record fetched"
        );

        self.cache
            .set_in_background(&key, &details, DETAIL_CACHE_TTL);
        Ok(details)
    }
}
