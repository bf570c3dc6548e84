//! Multi-page category fetch loop for `UpstreamClient`.

use std::time::Duration;

use heatshop_core::Category;

use crate::error::UpstreamError;
use crate::types::UpstreamProduct;

use super::UpstreamClient;
use super::MAX_PAGES;

impl UpstreamClient {
    /// Fetches every product of `category` by walking `skip`/`limit` pages.
    ///
    /// Stops after the first page that holds fewer than `page_size` raw
    /// elements. `inter_request_delay_ms` is applied before every page except
    /// the first.
    ///
    /// **All-or-nothing semantics**: on any page failure the products from
    /// earlier pages are discarded and the error is returned, so a partial
    /// category is never cached as if it were complete.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`Self::fetch_category_page`].
    /// Returns [`UpstreamError::PaginationLimit`] if the number of pages
    /// exceeds [`MAX_PAGES`].
    pub async fn fetch_all_category(
        &self,
        category: Category,
        page_size: u32,
        inter_request_delay_ms: u64,
    ) -> Result<Vec<UpstreamProduct>, UpstreamError> {
        let page_size = page_size.max(1);
        let mut all_products: Vec<UpstreamProduct> = Vec::new();
        let mut skip = 0u32;
        let mut page_count = 0usize;

        loop {
            page_count += 1;
            if page_count > MAX_PAGES {
                return Err(UpstreamError::PaginationLimit {
                    category: category.to_string(),
                    max_pages: MAX_PAGES,
                });
            }

            if page_count > 1 && inter_request_delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(inter_request_delay_ms)).await;
            }

            let (products, raw_count) = self
                .fetch_category_page(category, skip, page_size)
                .await?;
            tracing::debug!(%category, skip, raw_count, "fetched upstream page");
            all_products.extend(products);

            if raw_count < page_size as usize {
                break;
            }
            skip = skip.saturating_add(page_size);
        }

        Ok(all_products)
    }
}
