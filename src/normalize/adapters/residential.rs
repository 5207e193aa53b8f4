use serde_json::Value;

use crate::domain::{Address, Property, PropertyCategory, RawRecord};
use crate::normalize::{
    extract_coordinates, extract_images, first_number, first_string, parse_currency,
    string_or_number, PropertyDraft, ShapeAdapter,
};

/// Adapter for the residential sale/lease export shape (MLS-style flat
/// records). Listing category comes entirely from the free-text `status`
/// field ("For Sale", "For Rent"); there is no shape default because the
/// feed mixes both.
pub struct ResidentialAdapter;

impl ShapeAdapter for ResidentialAdapter {
    fn normalize(&self, raw: &RawRecord) -> Option<Property> {
        let data = &raw.payload;
        let mut draft = PropertyDraft::new(raw, PropertyCategory::Residential);

        draft.id = first_string(data, &["mlsNumber", "id", "listingKey"]);
        draft.listing_text = first_string(data, &["status", "listingType"]);
        draft.property_type = first_string(data, &["homeType", "propertyType"]);
        draft.address = Address {
            street: first_string(data, &["streetAddress", "address"]),
            city: first_string(data, &["city"]),
            state: first_string(data, &["state"]),
            zip: first_string(data, &["zipCode", "zip"]),
            country: first_string(data, &["country"]),
        };

        draft.price.amount = first_number(data, &["listPrice"])
            .or_else(|| first_number(data, &["price"]))
            .or_else(|| first_string(data, &["price"]).and_then(|s| parse_currency(&s)));
        draft.price.display = first_string(data, &["priceDisplay"]);
        draft.price.currency = first_string(data, &["currency"]);

        draft.size.square_footage = string_or_number(data, &["livingArea", "sqft"]);
        draft.size.lot_size = string_or_number(data, &["lotSize"]);

        draft.images = extract_images(data);
        draft.coordinates = extract_coordinates(data);
        draft.description = first_string(data, &["remarks", "description"]);

        draft.finish()
    }

    fn name(&self) -> &'static str {
        "residential export"
    }
}
