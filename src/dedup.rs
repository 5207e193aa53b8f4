use std::collections::HashSet;

use metrics::counter;
use tracing::debug;

use crate::domain::Property;

/// Dedup key: the explicit id when non-empty, otherwise a composite of the
/// lowercased/trimmed street, city and state. Records with neither an id
/// nor any address component have no key and pass through untouched.
fn dedup_key(property: &Property) -> Option<String> {
    if !property.id.trim().is_empty() {
        return Some(format!("id:{}", property.id.trim()));
    }

    let part = |field: &Option<String>| {
        field
            .as_deref()
            .map(|s| s.trim().to_lowercase())
            .unwrap_or_default()
    };
    let street = part(&property.address.street);
    let city = part(&property.address.city);
    let state = part(&property.address.state);
    if street.is_empty() && city.is_empty() && state.is_empty() {
        return None;
    }
    Some(format!("addr:{street}|{city}|{state}"))
}

/// Collapse duplicate records across overlapping sources. First occurrence
/// wins, where "first" is the declared dataset-load order of the merged
/// pool, so the outcome is reproducible from the ordered source list.
pub fn dedup_pool(pool: Vec<Property>) -> Vec<Property> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut unique = Vec::with_capacity(pool.len());

    for property in pool {
        match dedup_key(&property) {
            Some(key) => {
                if seen.insert(key) {
                    unique.push(property);
                } else {
                    debug!(id = %property.id, source = %property.source_dataset, "dropping duplicate record");
                    counter!("propfeed_dedup_dropped_total").increment(1);
                }
            }
            None => unique.push(property),
        }
    }

    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Address, ListingCategory, Price, PropertyCategory, SizeMetrics};

    fn property(id: &str, source: &str) -> Property {
        Property {
            id: id.to_string(),
            source_dataset: source.to_string(),
            listing_category: ListingCategory::Sale,
            property_category: PropertyCategory::Commercial,
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
            completeness: 0,
            raw: serde_json::Value::Null,
        }
    }

    fn property_at(street: &str, city: &str, state: &str) -> Property {
        let mut p = property("", "test");
        p.address = Address {
            street: Some(street.to_string()),
            city: Some(city.to_string()),
            state: Some(state.to_string()),
            zip: None,
            country: None,
        };
        p
    }

    #[test]
    fn shared_id_keeps_earliest_source_record() {
        let pool = vec![
            property("p-100", "first_source"),
            property("p-100", "second_source"),
            property("p-200", "second_source"),
        ];
        let unique = dedup_pool(pool);
        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0].id, "p-100");
        assert_eq!(unique[0].source_dataset, "first_source");
    }

    #[test]
    fn composite_address_key_is_case_and_whitespace_insensitive() {
        let pool = vec![
            property_at("1 Main St", "Miami", "FL"),
            property_at("1 MAIN ST ", " miami", "fl"),
        ];
        assert_eq!(dedup_pool(pool).len(), 1);
    }

    #[test]
    fn keyless_records_survive() {
        let pool = vec![property("", "a"), property("", "b")];
        assert_eq!(dedup_pool(pool).len(), 2);
    }

    #[test]
    fn id_key_outranks_address_key() {
        // Same address, different ids: not duplicates.
        let mut a = property_at("1 Main St", "Miami", "FL");
        a.id = "x".to_string();
        let mut b = property_at("1 Main St", "Miami", "FL");
        b.id = "y".to_string();
        assert_eq!(dedup_pool(vec![a, b]).len(), 2);
    }
}
