use serde_json::Value;

use crate::domain::{Address, ListingCategory, Property, PropertyCategory, RawRecord};
use crate::normalize::{
    extract_coordinates, extract_images, first_number, first_string, parse_currency,
    string_or_number, PropertyDraft, ShapeAdapter,
};

/// Adapter for the third-party aggregator's lease export shape. Lease
/// feeds carry rates rather than sale prices and advertise available space
/// instead of building size.
pub struct AggregatorLeaseAdapter;

impl AggregatorLeaseAdapter {
    fn extract_address(data: &Value) -> Address {
        if let Some(nested) = data.get("propertyAddress").filter(|v| v.is_object()) {
            return Address {
                street: first_string(nested, &["streetAddress", "line1"]),
                city: first_string(nested, &["city"]),
                state: first_string(nested, &["state", "stateAbbr"]),
                zip: first_string(nested, &["postalCode", "zip"]),
                country: first_string(nested, &["country"]),
            };
        }
        Address {
            street: first_string(data, &["fullAddress", "address"]),
            city: first_string(data, &["city"]),
            state: first_string(data, &["state"]),
            zip: first_string(data, &["postalCode"]),
            country: None,
        }
    }
}

impl ShapeAdapter for AggregatorLeaseAdapter {
    fn normalize(&self, raw: &RawRecord) -> Option<Property> {
        let data = &raw.payload;
        let mut draft = PropertyDraft::new(raw, PropertyCategory::Commercial);

        draft.id = first_string(data, &["listingId", "id", "externalId"]);
        draft.listing_text = first_string(data, &["status", "listingStatus"]);
        draft.shape_default = Some(ListingCategory::Lease);
        draft.property_type = first_string(data, &["spaceType", "assetType", "propertyType"]);
        draft.property_subtype = first_string(data, &["spaceSubtype"]);
        draft.address = Self::extract_address(data);

        draft.price.amount = first_number(data, &["leaseRate"])
            .or_else(|| first_number(data, &["rate"]))
            .or_else(|| first_string(data, &["rateText"]).and_then(|s| parse_currency(&s)));
        draft.price.display = first_string(data, &["rateText"]);
        draft.price.currency = first_string(data, &["currencyCode"]);

        draft.size.square_footage = string_or_number(data, &["spaceAvailable", "availableSqft"]);
        draft.size.building_size = string_or_number(data, &["buildingSize"]);
        draft.size.unit_count = first_number(data, &["suiteCount"]).map(|n| n as u32);

        draft.images = extract_images(data);
        draft.coordinates = extract_coordinates(data);
        draft.description = first_string(data, &["marketingDescription", "description"]);
        draft.highlights = data
            .get("spaceHighlights")
            .and_then(|v| v.as_array())
            .map(|items| {
                items
                    .iter()
                    .filter_map(|v| v.as_str())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        draft.finish()
    }

    fn name(&self) -> &'static str {
        "aggregator lease export"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SourceShape;
    use serde_json::json;

    fn raw(payload: Value) -> RawRecord {
        RawRecord {
            source_id: "aggregator_lease".to_string(),
            shape: SourceShape::AggregatorLease,
            payload,
        }
    }

    #[test]
    fn normalizes_lease_shape_with_rate_text() {
        let record = raw(json!({
            "listingId": "agg-l-3",
            "status": "Available",
            "spaceType": "Office",
            "rateText": "$38.50/SF/YR",
            "spaceAvailable": "4,200 SF",
            "propertyAddress": {
                "streetAddress": "350 Royal Palm Way",
                "city": "Palm Beach",
                "state": "FL"
            }
        }));

        let property = AggregatorLeaseAdapter.normalize(&record).unwrap();
        assert_eq!(property.listing_category, ListingCategory::Lease);
        assert_eq!(property.price.amount, Some(38.5));
        assert_eq!(property.price.display.as_deref(), Some("$38.50/SF/YR"));
        assert_eq!(
            property.size.square_footage.as_deref(),
            Some("4,200 SF")
        );
    }

    #[test]
    fn numeric_rate_takes_precedence_over_text() {
        let record = raw(json!({
            "listingId": "agg-l-4",
            "leaseRate": 42.0,
            "rateText": "$40.00/SF/YR"
        }));
        let property = AggregatorLeaseAdapter.normalize(&record).unwrap();
        assert_eq!(property.price.amount, Some(42.0));
    }
}
