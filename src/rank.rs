use std::cmp::Ordering;

use crate::catalog::normalize_location;
use crate::domain::Property;

/// The active filters ranking tie-breaks depend on.
#[derive(Debug, Clone, Default)]
pub struct RankingContext {
    /// Normalized at construction so every comparison sees the same form.
    location_query: Option<String>,
    property_type: Option<String>,
}

impl RankingContext {
    pub fn new(location_query: Option<&str>, property_type: Option<&str>) -> Self {
        Self {
            location_query: location_query
                .map(normalize_location)
                .filter(|q| !q.is_empty()),
            property_type: property_type
                .map(|t| t.trim().to_lowercase())
                .filter(|t| !t.is_empty()),
        }
    }
}

/// 2 = exact city match, 1 = partial (either containment direction),
/// 0 = no relation to the query.
fn city_match_level(property: &Property, query: &str) -> u8 {
    let city = property
        .address
        .city
        .as_deref()
        .map(|c| c.trim().to_lowercase())
        .unwrap_or_default();
    if city.is_empty() {
        return 0;
    }
    if city == query {
        2
    } else if city.contains(query) || query.contains(&city) {
        1
    } else {
        0
    }
}

fn type_matches(property: &Property, wanted: &str) -> bool {
    property
        .property_type
        .as_deref()
        .or(property.property_subtype.as_deref())
        .map_or(false, |label| label.to_lowercase().contains(wanted))
}

/// Deterministic multi-tier comparison; the first tier that separates the
/// two records decides. Returns `Less` when `a` should rank ahead of `b`.
fn compare(a: &Property, b: &Property, ctx: &RankingContext) -> Ordering {
    if let Some(query) = ctx.location_query.as_deref() {
        let ord = city_match_level(b, query).cmp(&city_match_level(a, query));
        if ord != Ordering::Equal {
            return ord;
        }
    }

    let ord = a.images.is_empty().cmp(&b.images.is_empty());
    if ord != Ordering::Equal {
        return ord;
    }

    let ord = b.images.len().cmp(&a.images.len());
    if ord != Ordering::Equal {
        return ord;
    }

    if let Some(wanted) = ctx.property_type.as_deref() {
        let ord = type_matches(b, wanted).cmp(&type_matches(a, wanted));
        if ord != Ordering::Equal {
            return ord;
        }
    }

    let ord = b.completeness.cmp(&a.completeness);
    if ord != Ordering::Equal {
        return ord;
    }

    let price_a = a.price.amount.unwrap_or(0.0);
    let price_b = b.price.amount.unwrap_or(0.0);
    price_b.partial_cmp(&price_a).unwrap_or(Ordering::Equal)
}

/// Order the filtered pool by relevance. The sort is stable, so records the
/// comparator cannot separate keep their original ingestion order, which is
/// the final tie-break.
pub fn rank(mut pool: Vec<Property>, ctx: &RankingContext) -> Vec<Property> {
    pool.sort_by(|a, b| compare(a, b, ctx));
    pool
}
