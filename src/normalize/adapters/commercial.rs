use serde_json::Value;

use crate::domain::{Address, Property, PropertyCategory, RawRecord};
use crate::normalize::{
    extract_coordinates, extract_images, first_number, first_string, latest_listed_price,
    parse_currency, string_or_number, PropertyDraft, ShapeAdapter,
};

/// Adapter for the generic commercial listing export shape: nested
/// `location` object, numeric `price` with a display sibling, transaction
/// history for delisted records.
pub struct CommercialAdapter;

impl CommercialAdapter {
    /// Address fallback chain: nested location object, then flat top-level
    /// fields, then a single address string used as the street line.
    fn extract_address(data: &Value) -> Address {
        if let Some(location) = data.get("location").filter(|v| v.is_object()) {
            return Address {
                street: first_string(location, &["address1", "address", "street"]),
                city: first_string(location, &["city", "locality"]),
                state: first_string(location, &["state", "stateCode", "region"]),
                zip: first_string(location, &["zip", "postalCode", "zipCode"]),
                country: first_string(location, &["country"]),
            };
        }

        if data.get("city").is_some() || data.get("state").is_some() || data.get("zip").is_some() {
            return Address {
                street: first_string(data, &["street", "address"]),
                city: first_string(data, &["city"]),
                state: first_string(data, &["state"]),
                zip: first_string(data, &["zip", "zipCode"]),
                country: first_string(data, &["country"]),
            };
        }

        Address {
            street: first_string(data, &["address"]),
            ..Default::default()
        }
    }
}

impl ShapeAdapter for CommercialAdapter {
    fn normalize(&self, raw: &RawRecord) -> Option<Property> {
        let data = &raw.payload;
        let mut draft = PropertyDraft::new(raw, PropertyCategory::Commercial);

        draft.id = first_string(data, &["id", "listingId", "propertyId"]);
        draft.listing_text = first_string(data, &["listingType", "saleType", "status"]);
        draft.property_type = first_string(data, &["propertyType", "assetClass"]);
        draft.property_subtype = first_string(data, &["propertySubtype", "subtype"]);
        draft.address = Self::extract_address(data);

        draft.price.amount = first_number(data, &["price"])
            .or_else(|| first_number(data, &["askingPrice"]))
            .or_else(|| first_string(data, &["price", "priceDisplay"]).and_then(|s| parse_currency(&s)))
            .or_else(|| latest_listed_price(data, &["transactionHistory", "transactions"]));
        draft.price.display = first_string(data, &["priceDisplay", "price"]);
        draft.price.currency = first_string(data, &["currency"]);

        draft.size.square_footage = string_or_number(data, &["squareFootage", "sqft"]);
        draft.size.lot_size = string_or_number(data, &["lotSize", "acreage"]);
        draft.size.building_size = string_or_number(data, &["buildingSize"]);
        draft.size.unit_count = first_number(data, &["unitCount", "units"]).map(|n| n as u32);

        draft.cap_rate = string_or_number(data, &["capRate"]);
        draft.images = extract_images(data);
        draft.coordinates = extract_coordinates(data);
        draft.description = first_string(data, &["description", "overview"]);
        draft.highlights = data
            .get("highlights")
            .or_else(|| data.get("dataPoints"))
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
        "commercial export"
    }
}
