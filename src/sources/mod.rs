use std::collections::HashMap;

use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, instrument};

use crate::domain::RawRecord;
use crate::error::{AggregatorError, Result};
use crate::registry::{SourceDescriptor, SourceEndpoint};

/// Abstract byte/record source keyed by a source descriptor. The pipeline
/// requires only `fetch`; a failing fetch is handled per-source by the
/// orchestrator and never aborts sibling fetches.
#[async_trait::async_trait]
pub trait DatasetProvider: Send + Sync {
    async fn fetch(&self, source: &SourceDescriptor) -> Result<Vec<RawRecord>>;
}

/// Fetches dataset payloads from file or HTTP endpoints and tags each
/// record with the descriptor's declared shape.
pub struct DatasetFetcher {
    client: reqwest::Client,
}

impl DatasetFetcher {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for DatasetFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl DatasetProvider for DatasetFetcher {
    #[instrument(skip(self), fields(source_id = %source.source_id))]
    async fn fetch(&self, source: &SourceDescriptor) -> Result<Vec<RawRecord>> {
        let text = match &source.endpoint {
            SourceEndpoint::File { path } => tokio::fs::read_to_string(path).await?,
            SourceEndpoint::Http { url } => {
                self.client.get(url).send().await?.error_for_status()?.text().await?
            }
        };

        let payload: Value = serde_json::from_str(&text)?;
        let records = split_records(payload, source)?;
        debug!("fetched {} raw records", records.len());
        Ok(records)
    }
}

/// Datasets arrive either as a bare JSON array or as an object wrapping the
/// array under one of a few well-known keys.
fn split_records(payload: Value, source: &SourceDescriptor) -> Result<Vec<RawRecord>> {
    let items = match payload {
        Value::Array(items) => items,
        Value::Object(mut map) => {
            let key = ["records", "listings", "results", "properties"]
                .iter()
                .find(|k| map.contains_key(**k))
                .copied();
            match key.and_then(|k| map.remove(k)) {
                Some(Value::Array(items)) => items,
                _ => {
                    return Err(AggregatorError::Source {
                        message: format!(
                            "Source {} payload has no record array",
                            source.source_id
                        ),
                    })
                }
            }
        }
        _ => {
            return Err(AggregatorError::Source {
                message: format!("Source {} payload is not JSON records", source.source_id),
            })
        }
    };

    Ok(items
        .into_iter()
        .map(|payload| RawRecord {
            source_id: source.source_id.clone(),
            shape: source.shape,
            payload,
        })
        .collect())
}

/// Load-once wrapper around another provider. Replaces the original
/// system's ambient module-level cache with an explicit repository object:
/// instantiate one per process (or per test) and every repeated fetch of a
/// source id is served from memory.
pub struct MemoizingProvider<P> {
    inner: P,
    cache: Mutex<HashMap<String, Vec<RawRecord>>>,
}

impl<P> MemoizingProvider<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            cache: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait::async_trait]
impl<P: DatasetProvider> DatasetProvider for MemoizingProvider<P> {
    async fn fetch(&self, source: &SourceDescriptor) -> Result<Vec<RawRecord>> {
        // The lock is never held across the inner fetch: sibling sources
        // must fetch in parallel, and one slow source must not stall them.
        // Concurrent first fetches of the same source may race; the inner
        // fetch is idempotent and the last insert wins.
        {
            let cache = self.cache.lock().await;
            if let Some(records) = cache.get(&source.source_id) {
                debug!(source_id = %source.source_id, "serving records from memo cache");
                return Ok(records.clone());
            }
        }
        let records = self.inner.fetch(source).await?;
        self.cache
            .lock()
            .await
            .insert(source.source_id.clone(), records.clone());
        Ok(records)
    }
}
