use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::normalize_location;
use crate::domain::{ListingCategory, Property};

/// Inclusive numeric range. Construction is lenient: a malformed range
/// (NaN bound, or min above max) yields `None`, which downstream treats as
/// "no constraint" rather than rejecting the whole request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RangeFilter {
    pub min: f64,
    pub max: f64,
}

impl RangeFilter {
    pub fn new(min: f64, max: f64) -> Option<Self> {
        if min.is_nan() || max.is_nan() || min > max {
            debug!(min, max, "ignoring malformed range filter");
            return None;
        }
        Some(Self { min, max })
    }

    fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// The composable search predicates. Every field is optional; an absent
/// field always passes. Active predicates are ANDed.
#[derive(Debug, Clone, Default)]
pub struct FilterSpec {
    pub listing_category: Option<ListingCategory>,
    pub location_query: Option<String>,
    pub property_type: Option<String>,
    pub price_range: Option<RangeFilter>,
    pub size_range: Option<RangeFilter>,
}

/// Square footage text to a number: strip everything but digits and the
/// decimal point, parse leniently. Unparseable or absent values count as
/// zero, mirroring the price-range treatment of missing prices.
pub(crate) fn parse_square_feet(text: Option<&str>) -> f64 {
    let digits: String = text
        .unwrap_or("")
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    digits.parse().unwrap_or(0.0)
}

fn matches_location(property: &Property, query: &str) -> bool {
    let city = property
        .address
        .city
        .as_deref()
        .map(|c| c.trim().to_lowercase())
        .unwrap_or_default();

    if !city.is_empty() && (city == query || city.contains(query) || query.contains(&city)) {
        return true;
    }

    // Fall through to the wider fields; any one substring hit passes.
    [
        property.address.street.as_deref(),
        property.address.zip.as_deref(),
        property.address.state.as_deref(),
        property.description.as_deref(),
    ]
    .iter()
    .flatten()
    .any(|field| field.to_lowercase().contains(query))
}

fn matches_type(property: &Property, wanted: &str) -> bool {
    let wanted = wanted.trim().to_lowercase();
    let label = property
        .property_type
        .as_deref()
        .or(property.property_subtype.as_deref())
        .unwrap_or("");
    label.to_lowercase().contains(&wanted)
}

fn matches(property: &Property, spec: &FilterSpec) -> bool {
    if let Some(category) = spec.listing_category {
        if property.listing_category != category {
            return false;
        }
    }

    if let Some(query) = spec.location_query.as_deref() {
        let query = normalize_location(query);
        if !query.is_empty() && !matches_location(property, &query) {
            return false;
        }
    }

    if let Some(wanted) = spec.property_type.as_deref() {
        if !wanted.trim().is_empty() && !matches_type(property, wanted) {
            return false;
        }
    }

    if let Some(range) = spec.price_range {
        // A record with no numeric price is tested as zero, so listings
        // without a price fall out of any range with a non-zero floor.
        // Long-standing behavior, kept as-is.
        let amount = property.price.amount.unwrap_or(0.0);
        if !range.contains(amount) {
            return false;
        }
    }

    if let Some(range) = spec.size_range {
        let sqft = parse_square_feet(property.size.square_footage.as_deref());
        if !range.contains(sqft) {
            return false;
        }
    }

    true
}

/// Apply every active predicate to the deduplicated pool.
pub fn filter_pool(pool: Vec<Property>, spec: &FilterSpec) -> Vec<Property> {
    pool.into_iter().filter(|p| matches(p, spec)).collect()
}
