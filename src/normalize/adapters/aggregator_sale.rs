use serde_json::Value;

use crate::domain::{Address, ListingCategory, Property, PropertyCategory, RawRecord};
use crate::normalize::{
    extract_coordinates, extract_images, first_number, first_string, latest_listed_price,
    parse_currency, string_or_number, PropertyDraft, ShapeAdapter,
};

/// Adapter for the third-party aggregator's sale export shape. The feed is
/// already segregated to sale listings, so unclassifiable status text
/// defaults to Sale instead of Unknown.
pub struct AggregatorSaleAdapter;

impl AggregatorSaleAdapter {
    fn extract_address(data: &Value) -> Address {
        // This export nests under `propertyAddress`; older feed versions
        // sent `fullAddress` as one string.
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

impl ShapeAdapter for AggregatorSaleAdapter {
    fn normalize(&self, raw: &RawRecord) -> Option<Property> {
        let data = &raw.payload;
        let mut draft = PropertyDraft::new(raw, PropertyCategory::Commercial);

        draft.id = first_string(data, &["listingId", "id", "externalId"]);
        draft.listing_text = first_string(data, &["status", "listingStatus"]);
        draft.shape_default = Some(ListingCategory::Sale);
        draft.property_type = first_string(data, &["assetType", "propertyType"]);
        draft.property_subtype = first_string(data, &["assetSubtype"]);
        draft.address = Self::extract_address(data);

        draft.price.amount = first_number(data, &["listPrice"])
            .or_else(|| first_number(data, &["price"]))
            .or_else(|| first_string(data, &["priceText"]).and_then(|s| parse_currency(&s)))
            .or_else(|| latest_listed_price(data, &["saleHistory"]));
        draft.price.display = first_string(data, &["priceText"]);
        draft.price.currency = first_string(data, &["currencyCode"]);

        draft.size.square_footage = string_or_number(data, &["buildingSize", "totalSqft"]);
        draft.size.lot_size = string_or_number(data, &["lotSizeAcres", "lotSize"]);
        draft.size.building_size = string_or_number(data, &["buildingSizeText"]);
        draft.size.unit_count = first_number(data, &["numberOfUnits"]).map(|n| n as u32);

        draft.cap_rate = string_or_number(data, &["capRate", "capRatePct"]);
        draft.images = extract_images(data);
        draft.coordinates = extract_coordinates(data);
        draft.description = first_string(data, &["marketingDescription", "description"]);
        draft.highlights = data
            .get("investmentHighlights")
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
        "aggregator sale export"
    }
}
