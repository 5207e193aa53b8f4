pub mod adapters;
pub mod classify;
pub mod completeness;

use chrono::{DateTime, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use crate::domain::{
    Address, Coordinates, ListingCategory, Price, Property, PropertyCategory, RawRecord,
    SizeMetrics, SourceShape,
};
use adapters::{
    AggregatorLeaseAdapter, AggregatorSaleAdapter, CommercialAdapter, ResidentialAdapter,
};

/// One adapter per distinct source shape. Adapters convert a raw tagged
/// record into the canonical model, or drop it when nothing identifies it.
pub trait ShapeAdapter: Send + Sync {
    fn normalize(&self, raw: &RawRecord) -> Option<Property>;
    fn name(&self) -> &'static str;
}

static COMMERCIAL: CommercialAdapter = CommercialAdapter;
static AGGREGATOR_SALE: AggregatorSaleAdapter = AggregatorSaleAdapter;
static AGGREGATOR_LEASE: AggregatorLeaseAdapter = AggregatorLeaseAdapter;
static RESIDENTIAL: ResidentialAdapter = ResidentialAdapter;

pub fn adapter_for(shape: SourceShape) -> &'static dyn ShapeAdapter {
    match shape {
        SourceShape::Commercial => &COMMERCIAL,
        SourceShape::AggregatorSale => &AGGREGATOR_SALE,
        SourceShape::AggregatorLease => &AGGREGATOR_LEASE,
        SourceShape::Residential => &RESIDENTIAL,
    }
}

/// Normalize one raw record. `None` means the record carried nothing that
/// identifies it (no id, no address, no price, no type) and was dropped.
pub fn normalize_record(raw: &RawRecord) -> Option<Property> {
    adapter_for(raw.shape).normalize(raw)
}

/// Intermediate carrier the adapters fill before the shared finishing pass
/// applies the drop rule, classification and completeness scoring.
pub(crate) struct PropertyDraft {
    pub id: Option<String>,
    pub source_id: String,
    pub listing_text: Option<String>,
    /// Category to assume when the listing text classifies as Unknown.
    /// Aggregator exports are already segregated by transaction kind.
    pub shape_default: Option<ListingCategory>,
    pub property_category: PropertyCategory,
    pub property_type: Option<String>,
    pub property_subtype: Option<String>,
    pub address: Address,
    pub price: Price,
    pub size: SizeMetrics,
    pub images: Vec<String>,
    pub cap_rate: Option<String>,
    pub coordinates: Option<Coordinates>,
    pub description: Option<String>,
    pub highlights: Vec<String>,
    pub raw: Value,
}

impl PropertyDraft {
    pub fn new(raw: &RawRecord, property_category: PropertyCategory) -> Self {
        Self {
            id: None,
            source_id: raw.source_id.clone(),
            listing_text: None,
            shape_default: None,
            property_category,
            property_type: None,
            property_subtype: None,
            address: Address::default(),
            price: Price::default(),
            size: SizeMetrics::default(),
            images: Vec::new(),
            cap_rate: None,
            coordinates: None,
            description: None,
            highlights: Vec::new(),
            raw: raw.payload.clone(),
        }
    }

    /// Apply the drop rule, derive the listing category and completeness
    /// score, and produce the immutable canonical record.
    pub fn finish(mut self) -> Option<Property> {
        let has_id = self.id.as_deref().map_or(false, |s| !s.trim().is_empty());
        let has_price = self.price.amount.is_some() || self.price.display.is_some();
        let has_type = self.property_type.is_some() || self.property_subtype.is_some();

        if !has_id && self.address.is_empty() && !has_price && !has_type {
            debug!(source_id = %self.source_id, "dropping unidentifiable record");
            return None;
        }

        // Negative amounts are source garbage, not listings.
        if self.price.amount.map_or(false, |a| a < 0.0) {
            self.price.amount = None;
        }

        let mut category = self
            .listing_text
            .as_deref()
            .map(classify::classify_listing)
            .unwrap_or(ListingCategory::Unknown);
        if category == ListingCategory::Unknown {
            if let Some(default) = self.shape_default {
                category = default;
            }
        }

        let id = match self.id {
            Some(id) if !id.trim().is_empty() => id.trim().to_string(),
            _ => fallback_id(&self.source_id, &self.address, &self.raw),
        };

        let completeness = completeness::completeness_score(
            &self.images,
            &self.price,
            &self.address,
            has_type,
            self.description.as_deref(),
            &self.highlights,
        );

        Some(Property {
            id,
            source_dataset: self.source_id,
            listing_category: category,
            property_category: self.property_category,
            property_type: self.property_type,
            property_subtype: self.property_subtype,
            address: self.address,
            price: self.price,
            size: self.size,
            images: self.images,
            cap_rate: self.cap_rate,
            coordinates: self.coordinates,
            description: self.description,
            highlights: self.highlights,
            completeness,
            raw: self.raw,
        })
    }
}

/// Stable synthetic id for records without one. Address-keyed when an
/// address exists, otherwise a v5 UUID over the raw payload so the same
/// record always gets the same id.
fn fallback_id(source_id: &str, address: &Address, raw: &Value) -> String {
    if !address.is_empty() {
        let slug: String = [&address.street, &address.city, &address.state]
            .iter()
            .filter_map(|f| f.as_deref())
            .collect::<Vec<_>>()
            .join("-")
            .to_lowercase()
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { '-' })
            .collect();
        return slug.trim_matches('-').to_string();
    }
    let digest = Uuid::new_v5(&Uuid::NAMESPACE_OID, raw.to_string().as_bytes());
    format!("{source_id}-{digest}")
}

/// First non-empty string found under the given keys.
pub(crate) fn first_string(data: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| data.get(k))
        .filter_map(|v| v.as_str())
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(String::from)
}

/// First numeric value found under the given keys.
pub(crate) fn first_number(data: &Value, keys: &[&str]) -> Option<f64> {
    keys.iter().filter_map(|k| data.get(k)).find_map(|v| v.as_f64())
}

static CURRENCY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d[\d,]*(?:\.\d+)?").expect("currency regex"));

/// Parse a currency-formatted string ("$1,250,000", "1.2M" is out of
/// scope) to its numeric amount.
pub(crate) fn parse_currency(text: &str) -> Option<f64> {
    let m = CURRENCY_RE.find(text)?;
    m.as_str().replace(',', "").parse().ok()
}

/// Scheme-qualified absolute URL check; everything else is discarded from
/// image lists.
pub(crate) fn is_absolute_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

const IMAGE_LIST_KEYS: &[&str] = &["images", "photos", "media", "gallery"];
const IMAGE_URL_KEYS: &[&str] = &["url", "imageUrl", "image_url", "src", "href"];
const PRIMARY_IMAGE_KEYS: &[&str] = &["primaryImage", "image", "mainImage", "thumbnail"];

/// Extract image URLs defensively: a list of plain strings, a list of
/// URL-bearing objects, or a single primary-image field. The first key
/// yielding a list wins; anything non-absolute is dropped silently.
pub(crate) fn extract_images(data: &Value) -> Vec<String> {
    for key in IMAGE_LIST_KEYS {
        if let Some(items) = data.get(key).and_then(|v| v.as_array()) {
            return items
                .iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s.clone()),
                    Value::Object(_) => first_string(item, IMAGE_URL_KEYS),
                    _ => None,
                })
                .filter(|url| is_absolute_url(url))
                .collect();
        }
    }

    first_string(data, PRIMARY_IMAGE_KEYS)
        .filter(|url| is_absolute_url(url))
        .map(|url| vec![url])
        .unwrap_or_default()
}

const HISTORY_TYPE_KEYS: &[&str] = &["type", "event", "status"];
const HISTORY_DATE_KEYS: &[&str] = &["date", "timestamp", "recordedAt"];
const HISTORY_AMOUNT_KEYS: &[&str] = &["amount", "price", "value"];

fn history_date(entry: &Value) -> Option<NaiveDate> {
    let text = first_string(entry, HISTORY_DATE_KEYS)?;
    NaiveDate::parse_from_str(&text, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(&text).map(|dt| dt.date_naive()).ok())
}

/// Price from a transaction-history list: entries whose type text says
/// "list", most recent first. Entries with unparseable dates sort last.
pub(crate) fn latest_listed_price(data: &Value, list_keys: &[&str]) -> Option<f64> {
    let history = list_keys
        .iter()
        .find_map(|k| data.get(*k))
        .and_then(|v| v.as_array())?;

    history
        .iter()
        .filter(|entry| {
            first_string(entry, HISTORY_TYPE_KEYS)
                .map_or(false, |t| t.to_lowercase().contains("list"))
        })
        .max_by_key(|entry| history_date(entry))
        .and_then(|entry| {
            first_number(entry, HISTORY_AMOUNT_KEYS)
                .or_else(|| first_string(entry, HISTORY_AMOUNT_KEYS).and_then(|s| parse_currency(&s)))
        })
}

/// Coordinates when both legs are present and numeric.
pub(crate) fn extract_coordinates(data: &Value) -> Option<Coordinates> {
    let latitude = first_number(data, &["latitude", "lat"])?;
    let longitude = first_number(data, &["longitude", "lng", "lon"])?;
    Some(Coordinates {
        latitude,
        longitude,
    })
}

/// A numeric or string field rendered as display text, for size fields
/// that sources send either way.
pub(crate) fn string_or_number(data: &Value, keys: &[&str]) -> Option<String> {
    for key in keys {
        match data.get(*key) {
            Some(Value::String(s)) if !s.trim().is_empty() => return Some(s.trim().to_string()),
            Some(Value::Number(n)) => return Some(n.to_string()),
            _ => {}
        }
    }
    None
}
