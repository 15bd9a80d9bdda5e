use std::num::NonZeroUsize;
use std::sync::Arc;

use futures_util::{stream, StreamExt, TryStreamExt};
use restsync_core::{plan_pages, PageAssembler, PendingPage};
use serde_json::Value;
use sync_logging::sync_debug;

use crate::{FailureKind, Method, SyncError, Transport};

#[derive(Debug, Clone, Default)]
pub struct AggregatorSettings {
    /// Upper bound on page requests in flight. `None` sends every page at once.
    pub max_concurrency: Option<NonZeroUsize>,
}

/// Fetches a known number of pages concurrently and flattens them in page order.
pub struct PaginatedAggregator {
    transport: Arc<dyn Transport>,
    settings: AggregatorSettings,
}

impl PaginatedAggregator {
    pub fn new(transport: Arc<dyn Transport>, settings: AggregatorSettings) -> Self {
        Self {
            transport,
            settings,
        }
    }

    pub fn settings(&self) -> &AggregatorSettings {
        &self.settings
    }

    /// Fetches pages `1..=page_count` and concatenates the payload that
    /// `extract_payload` pulls out of each, in ascending page order.
    ///
    /// The first failing page fails the whole call; pages still in flight are
    /// dropped and nothing partial is returned. Dropping the returned future
    /// discards the run the same way.
    pub async fn fetch_all<T, U, E>(
        &self,
        page_count: usize,
        url_for_page: U,
        extract_payload: E,
    ) -> Result<Vec<T>, SyncError>
    where
        U: Fn(usize) -> String,
        E: Fn(Value) -> Result<Vec<T>, SyncError>,
    {
        if page_count == 0 {
            return Ok(Vec::new());
        }

        let pages = plan_pages(page_count, url_for_page);
        let limit = self
            .settings
            .max_concurrency
            .map_or(page_count, NonZeroUsize::get);
        sync_debug!("fetching {} pages, at most {} at a time", page_count, limit);

        let extract = &extract_payload;
        let mut in_flight = stream::iter(pages)
            .map(move |page| async move {
                let body = self.fetch_page(&page).await?;
                let items = extract(body).map_err(|err| for_page(page.index, err))?;
                Ok::<_, SyncError>((page.index, items))
            })
            .buffer_unordered(limit);

        let mut assembler = PageAssembler::new(page_count);
        while let Some((index, items)) = in_flight.try_next().await? {
            assembler
                .insert(index, items)
                .map_err(|err| SyncError::malformed(err.to_string()))?;
        }
        assembler
            .finish()
            .map_err(|err| SyncError::malformed(err.to_string()))
    }

    async fn fetch_page(&self, page: &PendingPage) -> Result<Value, SyncError> {
        let body = self
            .transport
            .request(Method::Get, &page.url, None)
            .await
            .and_then(|response| response.into_success_body())
            .map_err(|err| for_page(page.index, err))?;
        body.ok_or_else(|| {
            SyncError::new(
                FailureKind::MalformedResponse,
                format!("page {} returned no JSON body", page.index),
            )
        })
    }
}

fn for_page(index: usize, err: SyncError) -> SyncError {
    SyncError::new(err.kind, format!("page {index}: {}", err.message))
}
