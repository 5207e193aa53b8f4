use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{json, Value};

use propfeed::registry::SourceDescriptor;
use propfeed::{
    Config, DatasetCatalog, DatasetProvider, ListingCategory, RawRecord, SearchRequest,
    SearchService, SourceEndpoint, SourceRegistry, SourceShape,
};

/// In-memory provider: each source id maps to a fixed record list, with an
/// optional failure set to exercise partial-failure tolerance.
struct StaticProvider {
    datasets: HashMap<String, Vec<Value>>,
    failing: Vec<String>,
}

#[async_trait::async_trait]
impl DatasetProvider for StaticProvider {
    async fn fetch(&self, source: &SourceDescriptor) -> propfeed::Result<Vec<RawRecord>> {
        if self.failing.contains(&source.source_id) {
            return Err(propfeed::AggregatorError::Source {
                message: format!("{} unavailable", source.source_id),
            });
        }
        Ok(self
            .datasets
            .get(&source.source_id)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .map(|payload| RawRecord {
                source_id: source.source_id.clone(),
                shape: source.shape,
                payload,
            })
            .collect())
    }
}

fn descriptor(id: &str, shape: SourceShape) -> SourceDescriptor {
    SourceDescriptor {
        source_id: id.to_string(),
        shape,
        endpoint: SourceEndpoint::File {
            path: format!("unused/{id}.json"),
        },
        enabled: true,
    }
}

fn fixture_catalog() -> DatasetCatalog {
    DatasetCatalog::new(
        vec![
            ("miami", vec!["miami_commercial", "aggregator_sale"]),
            ("miami beach", vec!["beach_commercial", "aggregator_sale"]),
        ],
        vec!["combined", "aggregator_sale"],
    )
}

fn fixture_registry() -> SourceRegistry {
    SourceRegistry::from_descriptors(vec![
        descriptor("miami_commercial", SourceShape::Commercial),
        descriptor("beach_commercial", SourceShape::Commercial),
        descriptor("combined", SourceShape::Commercial),
        descriptor("aggregator_sale", SourceShape::AggregatorSale),
    ])
}

/// Two-source fixture: a city-dedicated commercial export and an
/// aggregator sale feed that overlaps it.
fn service(datasets: HashMap<String, Vec<Value>>, failing: Vec<String>) -> SearchService {
    SearchService::new(
        fixture_catalog(),
        fixture_registry(),
        Arc::new(StaticProvider { datasets, failing }),
        Config::default(),
    )
}

fn miami_record(id: &str, price: Option<f64>) -> Value {
    let mut record = json!({
        "id": id,
        "listingType": "For Sale",
        "propertyType": "Office",
        "location": {"address1": format!("{id} Flagler St"), "city": "Miami", "state": "FL"}
    });
    if let Some(price) = price {
        record["price"] = json!(price);
    }
    record
}

// Scenario: two raw records sharing an id arrive from two different
// sources; the merged pool keeps exactly one, from the source that loads
// first in the declared order.
#[tokio::test]
async fn duplicate_id_across_sources_keeps_first_declared_source() -> anyhow::Result<()> {
    let mut datasets = HashMap::new();
    datasets.insert(
        "miami_commercial".to_string(),
        vec![miami_record("p-100", Some(500_000.0))],
    );
    datasets.insert(
        "aggregator_sale".to_string(),
        vec![json!({
            "listingId": "p-100",
            "listPrice": 999_999,
            "propertyAddress": {"streetAddress": "1 Flagler St", "city": "Miami", "state": "FL"}
        })],
    );

    let response = service(datasets, vec![])
        .search(SearchRequest {
            location_query: "Miami, FL".to_string(),
            page: 1,
            ..Default::default()
        })
        .await?;

    let hits: Vec<_> = response
        .page_items
        .iter()
        .filter(|p| p.id == "p-100")
        .collect();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].source_dataset, "miami_commercial");
    assert_eq!(hits[0].price.amount, Some(500_000.0));
    Ok(())
}

/// Wraps the static provider and stalls one source id, so sources finish
/// out of declared order.
struct StallingProvider {
    inner: StaticProvider,
    slow: String,
}

#[async_trait::async_trait]
impl DatasetProvider for StallingProvider {
    async fn fetch(&self, source: &SourceDescriptor) -> propfeed::Result<Vec<RawRecord>> {
        if source.source_id == self.slow {
            tokio::time::sleep(std::time::Duration::from_millis(150)).await;
        }
        self.inner.fetch(source).await
    }
}

// Scenario: the first-declared source is the slowest, so its records
// arrive last. The merge must still honor declared order, keeping the
// duplicate from the first-declared source.
#[tokio::test]
async fn dedup_honors_declared_order_when_sources_finish_out_of_order() -> anyhow::Result<()> {
    let mut datasets = HashMap::new();
    datasets.insert(
        "miami_commercial".to_string(),
        vec![miami_record("p-200", Some(500_000.0))],
    );
    datasets.insert(
        "aggregator_sale".to_string(),
        vec![json!({
            "listingId": "p-200",
            "listPrice": 999_999,
            "propertyAddress": {"streetAddress": "2 Flagler St", "city": "Miami", "state": "FL"}
        })],
    );

    let svc = SearchService::new(
        fixture_catalog(),
        fixture_registry(),
        Arc::new(StallingProvider {
            inner: StaticProvider {
                datasets,
                failing: vec![],
            },
            slow: "miami_commercial".to_string(),
        }),
        Config::default(),
    );

    let response = svc
        .search(SearchRequest {
            location_query: "Miami, FL".to_string(),
            page: 1,
            ..Default::default()
        })
        .await?;

    let hits: Vec<_> = response
        .page_items
        .iter()
        .filter(|p| p.id == "p-200")
        .collect();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].source_dataset, "miami_commercial");
    assert_eq!(hits[0].price.amount, Some(500_000.0));
    Ok(())
}

// Scenario: lease filtering over free-text listing-type strings.
#[tokio::test]
async fn lease_filter_selects_only_lease_classified_records() {
    let mut datasets = HashMap::new();
    datasets.insert(
        "miami_commercial".to_string(),
        vec![
            json!({"id": "lease-1", "listingType": "For Lease", "city": "Miami", "state": "FL"}),
            json!({"id": "sale-1", "listingType": "For Sale", "city": "Miami", "state": "FL"}),
            json!({"id": "auction-1", "listingType": "Auction Ending Soon", "city": "Miami", "state": "FL"}),
        ],
    );

    let response = service(datasets, vec![])
        .search(SearchRequest {
            location_query: "Miami".to_string(),
            listing_category: Some(ListingCategory::Lease),
            page: 1,
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(response.total_count, 1);
    assert_eq!(response.page_items[0].id, "lease-1");
}

// Scenario: missing price defaults to zero, so "Contact for Price"
// listings fall below any non-zero range floor.
#[tokio::test]
async fn price_range_excludes_missing_price_records() {
    let mut datasets = HashMap::new();
    datasets.insert(
        "miami_commercial".to_string(),
        vec![
            miami_record("cheap", Some(400_000.0)),
            miami_record("mid", Some(750_000.0)),
            miami_record("unpriced", None),
        ],
    );

    let response = service(datasets, vec![])
        .search(SearchRequest {
            location_query: "Miami".to_string(),
            price_range: Some((500_000.0, 1_000_000.0)),
            page: 1,
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(response.total_count, 1);
    assert_eq!(response.page_items[0].id, "mid");
}

// Scenario: no constraints beyond location resolution — every deduplicated
// record comes back, ordered by image presence, image count, completeness,
// price, then ingestion position.
#[tokio::test]
async fn unconstrained_query_returns_all_ranked() {
    let mut datasets = HashMap::new();
    datasets.insert(
        "combined".to_string(),
        vec![
            json!({"id": "plain-first"}),
            json!({"id": "pricey", "price": 5_000_000}),
            json!({
                "id": "pictured",
                "images": ["https://x/1.jpg", "https://x/2.jpg"]
            }),
            json!({"id": "plain-second"}),
        ],
    );

    let response = service(datasets, vec![])
        .search(SearchRequest {
            // Unroutable location falls back to the combined dataset.
            location_query: String::new(),
            page: 1,
            ..Default::default()
        })
        .await
        .unwrap();

    let ids: Vec<&str> = response.page_items.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(
        ids,
        vec!["pictured", "pricey", "plain-first", "plain-second"]
    );
}

// Routing precedence: a two-word sub-locality must select its own source
// set, not the shorter city's it textually contains.
#[tokio::test]
async fn sub_locality_routes_to_its_dedicated_sources() {
    let mut datasets = HashMap::new();
    datasets.insert(
        "beach_commercial".to_string(),
        vec![json!({"id": "beach-1", "city": "Miami Beach", "state": "FL"})],
    );
    datasets.insert(
        "miami_commercial".to_string(),
        vec![json!({"id": "mainland-1", "city": "Miami", "state": "FL"})],
    );

    let response = service(datasets, vec![])
        .search(SearchRequest {
            location_query: "Miami Beach, FL".to_string(),
            page: 1,
            ..Default::default()
        })
        .await
        .unwrap();

    let ids: Vec<&str> = response.page_items.iter().map(|p| p.id.as_str()).collect();
    assert!(ids.contains(&"beach-1"));
    assert!(!ids.contains(&"mainland-1"));
}

// A failing source is skipped with a warning; the query succeeds on the
// records the healthy sources produced.
#[tokio::test]
async fn failing_source_does_not_abort_the_query() {
    let mut datasets = HashMap::new();
    datasets.insert(
        "miami_commercial".to_string(),
        vec![miami_record("survivor", Some(600_000.0))],
    );

    let response = service(datasets, vec!["aggregator_sale".to_string()])
        .search(SearchRequest {
            location_query: "Miami".to_string(),
            page: 1,
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(response.total_count, 1);
    assert_eq!(response.page_items[0].id, "survivor");
}

// Malformed numeric ranges are lenient: the constraint is dropped, the
// request is not rejected.
#[tokio::test]
async fn malformed_range_is_ignored() {
    let mut datasets = HashMap::new();
    datasets.insert(
        "miami_commercial".to_string(),
        vec![miami_record("kept", Some(100.0))],
    );

    let response = service(datasets, vec![])
        .search(SearchRequest {
            location_query: "Miami".to_string(),
            price_range: Some((1_000_000.0, 5.0)),
            page: 1,
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(response.total_count, 1);
}

// Pagination is a pure slice of the ranked order.
#[tokio::test]
async fn pagination_slices_the_ranked_result() -> anyhow::Result<()> {
    let records: Vec<Value> = (0..25)
        .map(|i| miami_record(&format!("p-{i:02}"), Some(100_000.0 + i as f64)))
        .collect();
    let mut datasets = HashMap::new();
    datasets.insert("miami_commercial".to_string(), records);

    let svc = service(datasets, vec![]);
    let page_two = svc
        .search(SearchRequest {
            location_query: "Miami".to_string(),
            page: 2,
            ..Default::default()
        })
        .await?;

    assert_eq!(page_two.total_count, 25);
    assert_eq!(page_two.page_size, 20);
    assert_eq!(page_two.page_items.len(), 5);
    // Ranked by price descending within equal tiers, so page 2 holds the
    // five cheapest.
    assert_eq!(page_two.page_items[0].id, "p-04");
    Ok(())
}
