//! HTTP client for the upstream product-catalog REST API.

mod fetch_all;

use std::time::Duration;

use heatshop_core::Category;
use reqwest::Client;
use serde::Serialize;

use crate::envelope::extract_products;
use crate::error::UpstreamError;
use crate::types::UpstreamProduct;

/// Maximum number of pages to fetch before returning an error.
/// Prevents infinite loops on an upstream that ignores `skip`.
pub(super) const MAX_PAGES: usize = 200;

/// Status and JSON body relayed back from `POST /orders`.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderReply {
    pub status: u16,
    pub body: serde_json::Value,
}

/// HTTP client for the upstream catalog backend.
///
/// Non-2xx responses come back as typed errors; a request exceeding the
/// configured timeout is cancelled and reported as [`UpstreamError::Timeout`].
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    pub(super) client: Client,
    pub(super) base_url: String,
}

impl UpstreamClient {
    /// Creates an `UpstreamClient` for `base_url` with a request timeout and
    /// `User-Agent`.
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamError::InvalidBaseUrl`] if `base_url` is not an
    /// absolute http(s) URL, or [`UpstreamError::Http`] if the underlying
    /// `reqwest::Client` cannot be constructed.
    pub fn new(base_url: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, UpstreamError> {
        let trimmed = base_url.trim_end_matches('/');
        let parsed = reqwest::Url::parse(trimmed).map_err(|e| UpstreamError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(UpstreamError::InvalidBaseUrl {
                base_url: base_url.to_owned(),
                reason: format!("unsupported scheme \"{}\"", parsed.scheme()),
            });
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(timeout_secs.min(10)))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            base_url: trimmed.to_owned(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetches one page of products for `category`.
    ///
    /// Returns the deserialized records and the number of raw elements the
    /// page contained.
    ///
    /// # Errors
    ///
    /// - [`UpstreamError::NotFound`]: HTTP 404.
    /// - [`UpstreamError::UnexpectedStatus`]: any other non-2xx status.
    /// - [`UpstreamError::Timeout`]: the request exceeded the timeout.
    /// - [`UpstreamError::Http`]: network or TLS failure.
    /// - [`UpstreamError::Deserialize`]: body is not valid JSON.
    /// - [`UpstreamError::UnexpectedShape`]: body has no product array.
    pub async fn fetch_category_page(
        &self,
        category: Category,
        skip: u32,
        limit: u32,
    ) -> Result<(Vec<UpstreamProduct>, usize), UpstreamError> {
        let url = Self::products_url(&self.base_url, category, skip, limit)?;

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| UpstreamError::from_transport(e, &url))?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(UpstreamError::NotFound { url });
        }

        if !status.is_success() {
            return Err(UpstreamError::UnexpectedStatus {
                status: status.as_u16(),
                url,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| UpstreamError::from_transport(e, &url))?;
        let parsed = serde_json::from_str::<serde_json::Value>(&body).map_err(|e| {
            UpstreamError::Deserialize {
                context: format!("products page for {category} (skip={skip})"),
                source: e,
            }
        })?;

        extract_products(parsed, category)
    }

    /// Forwards an order to `POST {base_url}/orders` and relays the
    /// upstream status with its JSON body, whether or not it is a success.
    ///
    /// # Errors
    ///
    /// - [`UpstreamError::Timeout`] / [`UpstreamError::Http`]: transport failure.
    /// - [`UpstreamError::Deserialize`]: the upstream reply is not JSON.
    pub async fn submit_order<T>(&self, order: &T) -> Result<OrderReply, UpstreamError>
    where
        T: Serialize + ?Sized,
    {
        let url = format!("{}/orders", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(order)
            .send()
            .await
            .map_err(|e| UpstreamError::from_transport(e, &url))?;
        let status = response.status().as_u16();

        let body = response
            .text()
            .await
            .map_err(|e| UpstreamError::from_transport(e, &url))?;
        let body = serde_json::from_str(&body).map_err(|e| UpstreamError::Deserialize {
            context: format!("order reply (status {status})"),
            source: e,
        })?;

        Ok(OrderReply { status, body })
    }

    /// Builds the `products/{category}` URL with `skip`/`limit` paging.
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamError::InvalidBaseUrl`] if the joined URL cannot be
    /// parsed.
    fn products_url(
        base_url: &str,
        category: Category,
        skip: u32,
        limit: u32,
    ) -> Result<String, UpstreamError> {
        let base = format!("{}/products/{category}", base_url.trim_end_matches('/'));
        let mut url = reqwest::Url::parse(&base).map_err(|e| UpstreamError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason: format!("\"{base}\" is not a valid URL: {e}"),
        })?;

        url.query_pairs_mut()
            .append_pair("skip", &skip.to_string())
            .append_pair("limit", &limit.to_string());

        Ok(url.to_string())
    }
}

#[cfg(test)]
#[path = "../client_test.rs"]
mod tests;
