use std::cell::RefCell;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::{Client, Response};
use tracing::{debug, info};

use crate::error::{ChatError, Result};
use crate::models::{CommerceError, Product, Settings};

pub const CATALOG_PAGE_SIZE: u32 = 100;
pub const CATALOG_MAX_PAGES: u32 = 5;
pub const CACHE_TTL_MINUTES: i64 = 5;

/// Parameters of a `GET /products` call.
#[derive(Clone, Debug, PartialEq)]
pub struct ProductQuery {
    pub per_page: u32,
    pub page: u32,
    pub search: Option<String>,
    pub category: Option<String>,
    pub status: String,
    pub orderby: String,
    pub order: String,
}

impl Default for ProductQuery {
    fn default() -> Self {
        Self {
            per_page: CATALOG_PAGE_SIZE,
            page: 1,
            search: None,
            category: None,
            status: "publish".to_string(),
            orderby: "date".to_string(),
            order: "desc".to_string(),
        }
    }
}

impl ProductQuery {
    fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("per_page", self.per_page.to_string()),
            ("page", self.page.to_string()),
            ("status", self.status.clone()),
            ("orderby", self.orderby.clone()),
            ("order", self.order.clone()),
        ];
        if let Some(search) = &self.search {
            params.push(("search", search.clone()));
        }
        if let Some(category) = &self.category {
            params.push(("category", category.clone()));
        }
        params
    }
}

#[async_trait(?Send)]
pub trait CatalogSource {
    /// Re-reads store URL and credentials.
    fn configure(&self, settings: &Settings);

    async fn fetch_products(&self, query: &ProductQuery) -> Result<Vec<Product>>;

    /// Walks pages until a short page or `max_pages`.
    async fn fetch_catalog(&self, max_pages: u32) -> Result<Vec<Product>> {
        let mut all = Vec::new();
        for page in 1..=max_pages {
            let query = ProductQuery {
                page,
                ..ProductQuery::default()
            };
            let batch = self.fetch_products(&query).await?;
            let short_page = (batch.len() as u32) < query.per_page;
            all.extend(batch);
            if short_page {
                break;
            }
        }
        Ok(all)
    }
}

#[derive(Clone, Default, Debug)]
struct StoreCredentials {
    base_url: String,
    consumer_key: String,
    consumer_secret: String,
}

/// Client for a WooCommerce-style `/wp-json/wc/v3` REST API.
pub struct CatalogClient {
    client: Client,
    credentials: RefCell<Option<StoreCredentials>>,
}

impl CatalogClient {
    pub fn new(settings: &Settings) -> Self {
        let client = Self {
            client: Client::new(),
            credentials: RefCell::new(None),
        };
        client.configure(settings);
        client
    }

    fn get_clean_url(base: &str) -> String {
        format!("{}/wp-json/wc/v3", base.trim().trim_end_matches('/'))
    }

    fn credentials(&self) -> Result<StoreCredentials> {
        self.credentials.borrow().clone().ok_or_else(|| {
            ChatError::Configuration("Store URL and API credentials are not set".to_string())
        })
    }

    async fn get(&self, path: &str, params: &[(&str, String)]) -> Result<Response> {
        let creds = self.credentials()?;
        let url = format!("{}{}", creds.base_url, path);
        debug!(%url, ?params, "commerce request");

        let resp = self
            .client
            .get(url)
            .query(params)
            .query(&[
                ("consumer_key", creds.consumer_key.as_str()),
                ("consumer_secret", creds.consumer_secret.as_str()),
            ])
            .send()
            .await?;

        if resp.status().is_success() {
            Ok(resp)
        } else {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            Err(map_http_error(status, &body))
        }
    }
}

#[async_trait(?Send)]
impl CatalogSource for CatalogClient {
    fn configure(&self, settings: &Settings) {
        let creds = settings.is_store_configured().then(|| StoreCredentials {
            base_url: Self::get_clean_url(&settings.store_url),
            consumer_key: settings.consumer_key.trim().to_string(),
            consumer_secret: settings.consumer_secret.trim().to_string(),
        });
        *self.credentials.borrow_mut() = creds;
    }

    async fn fetch_products(&self, query: &ProductQuery) -> Result<Vec<Product>> {
        let resp = self.get("/products", &query.params()).await?;
        let products = resp.json::<Vec<Product>>().await?;
        debug!(page = query.page, count = products.len(), "fetched product page");
        Ok(products)
    }
}

/// Turns a commerce error body `{code, message, data.status}` into a
/// `ChatError`, falling back to the raw body.
pub(crate) fn map_http_error(status: u16, body: &str) -> ChatError {
    match serde_json::from_str::<CommerceError>(body) {
        Ok(err) => {
            debug!(code = %err.code, "commerce API error");
            ChatError::Upstream {
                status: err.data.status.unwrap_or(status),
                message: err.message,
            }
        }
        Err(_) if body.trim().is_empty() => ChatError::Upstream {
            status,
            message: format!("Store API returned HTTP {}", status),
        },
        Err(_) => ChatError::Upstream {
            status,
            message: body.trim().to_string(),
        },
    }
}

/// The last fetched catalog and when it was fetched.
#[derive(Default, Debug)]
pub struct ProductCache {
    products: Vec<Product>,
    fetched_at: Option<DateTime<Utc>>,
}

impl ProductCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        match self.fetched_at {
            Some(at) => now - at >= Duration::minutes(CACHE_TTL_MINUTES),
            None => true,
        }
    }

    pub fn replace(&mut self, products: Vec<Product>, now: DateTime<Utc>) {
        info!(count = products.len(), "product cache refreshed");
        self.products = products;
        self.fetched_at = Some(now);
    }

    pub fn invalidate(&mut self) {
        self.fetched_at = None;
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }
}
