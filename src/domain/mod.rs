use serde::{Deserialize, Serialize};

/// How a listing is offered, derived from free-text listing-type strings.
/// Never absent on a canonical record; unclassifiable text maps to `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ListingCategory {
    Sale,
    Lease,
    Auction,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyCategory {
    Residential,
    Commercial,
}

/// Postal address. Every field is optional; sources routinely omit parts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Address {
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub country: Option<String>,
}

impl Address {
    /// True when no component carries any text.
    pub fn is_empty(&self) -> bool {
        [&self.street, &self.city, &self.state, &self.zip, &self.country]
            .iter()
            .all(|f| f.as_deref().map_or(true, |s| s.trim().is_empty()))
    }
}

/// Asking price. The display string, when present, takes precedence for
/// user-facing output; the numeric amount is authoritative for filtering
/// and sorting.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Price {
    pub amount: Option<f64>,
    pub currency: Option<String>,
    pub display: Option<String>,
}

/// Size figures kept as source text. Square footage arrives in wildly
/// inconsistent formats ("12,500 SF", "12500", "±12,500") so it is stored
/// raw and parsed leniently at filter time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SizeMetrics {
    pub square_footage: Option<String>,
    pub lot_size: Option<String>,
    pub building_size: Option<String>,
    pub unit_count: Option<u32>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// The canonical, source-agnostic listing record. Constructed once by a
/// shape adapter and never mutated afterward; the pool it belongs to lives
/// for a single query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Property {
    /// Unique within a merged pool after deduplication.
    pub id: String,
    /// Origin dataset, for traceability. Not shown to callers by default.
    pub source_dataset: String,
    pub listing_category: ListingCategory,
    pub property_category: PropertyCategory,
    pub property_type: Option<String>,
    pub property_subtype: Option<String>,
    pub address: Address,
    pub price: Price,
    pub size: SizeMetrics,
    /// Validated absolute URLs only; relative paths are discarded upstream.
    pub images: Vec<String>,
    pub cap_rate: Option<String>,
    pub coordinates: Option<Coordinates>,
    pub description: Option<String>,
    pub highlights: Vec<String>,
    /// Weighted display-data score, computed once at normalization.
    pub completeness: u32,
    /// Opaque pass-through of the source record for detail views. Never
    /// inspected by the filter or ranking stages.
    pub raw: serde_json::Value,
}

/// The distinct source shapes the normalizer knows how to adapt. Attached
/// at fetch time from the source descriptor, so each record is dispatched
/// to exactly one adapter rather than shape-sniffed at every call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceShape {
    Commercial,
    AggregatorSale,
    AggregatorLease,
    Residential,
}

/// One raw record as fetched, tagged with its origin and shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawRecord {
    pub source_id: String,
    pub shape: SourceShape,
    pub payload: serde_json::Value,
}
