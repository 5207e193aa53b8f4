use std::sync::Arc;
use std::time::Duration;

use metrics::{counter, histogram};
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::{info, instrument, warn};

use crate::catalog::DatasetCatalog;
use crate::config::Config;
use crate::dedup::dedup_pool;
use crate::domain::{ListingCategory, Property, RawRecord};
use crate::error::Result;
use crate::filter::{filter_pool, FilterSpec, RangeFilter};
use crate::normalize::normalize_record;
use crate::paginate::paginate;
use crate::rank::{rank, RankingContext};
use crate::registry::SourceRegistry;
use crate::sources::DatasetProvider;

/// One search request as the presentation layer submits it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchRequest {
    pub location_query: String,
    pub listing_category: Option<ListingCategory>,
    pub property_type: Option<String>,
    /// (min, max); malformed ranges are ignored, not rejected.
    pub price_range: Option<(f64, f64)>,
    pub size_range: Option<(f64, f64)>,
    /// 1-based.
    pub page: usize,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub total_count: usize,
    pub page_items: Vec<Property>,
    pub page: usize,
    pub page_size: usize,
}

/// Runs the aggregation pipeline for one query: resolve sources, fetch
/// them concurrently, then normalize, dedup, filter, rank and paginate the
/// merged pool. The pool is owned by the single in-flight query; nothing
/// is shared across queries.
pub struct SearchService {
    catalog: DatasetCatalog,
    registry: SourceRegistry,
    provider: Arc<dyn DatasetProvider>,
    config: Config,
}

impl SearchService {
    pub fn new(
        catalog: DatasetCatalog,
        registry: SourceRegistry,
        provider: Arc<dyn DatasetProvider>,
        config: Config,
    ) -> Self {
        Self {
            catalog,
            registry,
            provider,
            config,
        }
    }

    /// Fetch every resolved source concurrently and merge the raw records
    /// back in catalog order. The join is wait-for-all: a slow or failing
    /// source never aborts its siblings, and completion order has no
    /// bearing on merge order (dedup's first-wins policy depends on that).
    async fn fetch_all(&self, source_ids: &[String]) -> Vec<RawRecord> {
        let timeout = Duration::from_secs(self.config.fetch_timeout_seconds);

        let mut tasks: Vec<(String, JoinHandle<Option<Vec<RawRecord>>>)> = Vec::new();
        for source_id in source_ids {
            let Some(descriptor) = self.registry.get(source_id) else {
                warn!(source_id = %source_id, "source missing from registry, skipping");
                continue;
            };
            if !descriptor.enabled {
                warn!(source_id = %source_id, "source disabled, skipping");
                continue;
            }

            let descriptor = descriptor.clone();
            let provider = Arc::clone(&self.provider);
            let id = source_id.clone();
            let handle = tokio::spawn(async move {
                match tokio::time::timeout(timeout, provider.fetch(&descriptor)).await {
                    Ok(Ok(records)) => Some(records),
                    Ok(Err(e)) => {
                        warn!(source_id = %id, "source fetch failed: {e}");
                        None
                    }
                    Err(_) => {
                        warn!(source_id = %id, "source fetch timed out after {timeout:?}");
                        None
                    }
                }
            });
            tasks.push((source_id.clone(), handle));
        }

        // Awaiting the handles in the order they were spawned re-imposes
        // the declared dataset order on the merged pool.
        let mut pool = Vec::new();
        for (source_id, handle) in tasks {
            match handle.await {
                Ok(Some(records)) => {
                    counter!("propfeed_sources_fetched_total").increment(1);
                    counter!("propfeed_raw_records_total", "source" => source_id)
                        .increment(records.len() as u64);
                    pool.extend(records);
                }
                Ok(None) => {
                    counter!("propfeed_sources_failed_total", "source" => source_id).increment(1);
                }
                Err(e) => {
                    warn!(source_id = %source_id, "fetch task panicked: {e}");
                    counter!("propfeed_sources_failed_total", "source" => source_id).increment(1);
                }
            }
        }
        pool
    }

    #[instrument(skip(self), fields(location = %request.location_query))]
    pub async fn search(&self, request: SearchRequest) -> Result<SearchResponse> {
        let started = std::time::Instant::now();
        counter!("propfeed_queries_total").increment(1);

        let source_ids = self.catalog.resolve(&request.location_query);
        info!("resolved {} dataset sources", source_ids.len());

        let raw_pool = self.fetch_all(&source_ids).await;

        let mut dropped = 0usize;
        let mut pool: Vec<Property> = Vec::with_capacity(raw_pool.len());
        for raw in &raw_pool {
            match normalize_record(raw) {
                Some(property) => pool.push(property),
                None => dropped += 1,
            }
        }
        counter!("propfeed_records_dropped_total").increment(dropped as u64);
        info!(
            "normalized {} of {} raw records ({} dropped)",
            pool.len(),
            raw_pool.len(),
            dropped
        );

        let pool = dedup_pool(pool);

        let spec = FilterSpec {
            listing_category: request.listing_category,
            location_query: Some(request.location_query.clone())
                .filter(|q| !q.trim().is_empty()),
            property_type: request.property_type.clone(),
            price_range: request
                .price_range
                .and_then(|(min, max)| RangeFilter::new(min, max)),
            size_range: request
                .size_range
                .and_then(|(min, max)| RangeFilter::new(min, max)),
        };
        let filtered = filter_pool(pool, &spec);

        let ctx = RankingContext::new(
            spec.location_query.as_deref(),
            spec.property_type.as_deref(),
        );
        let ranked = rank(filtered, &ctx);

        let page = paginate(ranked, request.page, self.config.page_size);

        histogram!("propfeed_query_duration_seconds").record(started.elapsed().as_secs_f64());
        info!(
            "query returned {} of {} matches (page {})",
            page.items.len(),
            page.total_count,
            page.page
        );

        Ok(SearchResponse {
            total_count: page.total_count,
            page_items: page.items,
            page: page.page,
            page_size: page.page_size,
        })
    }
}
